use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mark_consolidator::domain::{Column, Mark, StudentId, is_valid_identifier};
use mark_consolidator::engine::{IdentifierColumn, similar_ids};

/// Master rows with a header and `n` students in column B
fn master_rows(n: usize) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["No".to_string(), "Student ID".to_string()]];
    rows.extend((1..=n).map(|i| vec![i.to_string(), format!("STU{:05}", i)]));
    rows
}

fn bench_validators(c: &mut Criterion) {
    let mut group = c.benchmark_group("validators");

    let identifiers = ["STU001", "  stu002  ", "STU-003", "", "A1B2C3D4E5F6G7H8"];
    group.bench_function("identifier", |b| {
        b.iter(|| {
            for id in identifiers {
                black_box(is_valid_identifier(black_box(id.trim())));
            }
        })
    });

    let marks = ["85.5", "", "100", "100.01", "abc", " 42 "];
    group.bench_function("mark_parse", |b| {
        b.iter(|| {
            for raw in marks {
                let _ = black_box(Mark::parse("C6", black_box(raw)));
            }
        })
    });

    group.finish();
}

fn bench_identifier_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifier_lookup");
    let column = Column::parse("B").unwrap();

    for size in [100, 1_000, 10_000] {
        let rows = master_rows(size);
        let identifiers = IdentifierColumn::from_rows(&rows, &column);
        // Worst case: last row, then a miss that scans everything
        let last = StudentId::parse(&format!("STU{:05}", size)).unwrap();
        let missing = StudentId::parse("NOPE0").unwrap();

        group.bench_with_input(BenchmarkId::new("locate_last", size), &size, |b, _| {
            b.iter(|| black_box(identifiers.locate(black_box(&last))))
        });
        group.bench_with_input(BenchmarkId::new("locate_miss", size), &size, |b, _| {
            b.iter(|| black_box(identifiers.locate(black_box(&missing))))
        });
        group.bench_with_input(BenchmarkId::new("suggest", size), &rows, |b, rows| {
            b.iter(|| {
                black_box(similar_ids(
                    "STU0000",
                    rows.iter().skip(1).map(|row| row[1].as_str()),
                    3,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validators, bench_identifier_lookup);
criterion_main!(benches);
