use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the spreadsheet capability (opening, reading, writing workbooks)
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Spreadsheet read error: {0}")]
    Read(#[from] calamine::Error),

    #[error("Workbook read error: {0}")]
    XlsxRead(#[from] umya_spreadsheet::reader::xlsx::XlsxError),

    #[error("Workbook write error: {0}")]
    XlsxWrite(#[from] umya_spreadsheet::writer::xlsx::XlsxError),

    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),
}

/// Errors while taking a backup or writing the output copy
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid file name: {0}")]
    InvalidFileName(PathBuf),
}
