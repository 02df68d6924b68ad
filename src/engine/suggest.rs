/// Maximum edit distance for two identifiers to count as similar
pub const MAX_DISTANCE: usize = 2;

/// Default number of suggestions attached to a not-matched warning
pub const MAX_SUGGESTIONS: usize = 3;

/// Edit distance between two strings, counted in characters
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Master identifiers that look like `target`, in master order
///
/// A candidate is similar when either lowercased string contains the other or
/// they are within `MAX_DISTANCE` edits. Blank and repeated candidates are
/// ignored.
pub fn similar_ids<'a, I>(target: &str, candidates: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = target.trim().to_lowercase();
    let mut suggestions: Vec<String> = Vec::new();

    for candidate in candidates.into_iter().map(str::trim) {
        if suggestions.len() >= max {
            break;
        }
        if candidate.is_empty() || suggestions.iter().any(|s| s == candidate) {
            continue;
        }
        let lower = candidate.to_lowercase();
        if lower.contains(&target)
            || target.contains(&lower)
            || levenshtein(&target, &lower) <= MAX_DISTANCE
        {
            suggestions.push(candidate.to_string());
        }
    }

    suggestions
}
