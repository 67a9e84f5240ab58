//! Error types for recording I/O and schema reconciliation.

use thiserror::Error;

/// Result type for recording operations.
pub type RecordingResult<T> = Result<T, RecordingError>;

/// Errors that can occur while reading, validating, or writing a recording.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// The file has more columns than the supplied sensor set accounts for.
    #[error(
        "too few sensors specified for {path}: file has {file_columns} columns, schema expects {schema_columns}"
    )]
    TooFewSensors {
        /// Path of the offending file.
        path: String,
        /// Number of columns in the raw file header.
        file_columns: usize,
        /// Number of columns the reconstructed schema expects.
        schema_columns: usize,
    },

    /// The file has fewer columns than the supplied sensor set accounts for.
    #[error(
        "too many sensors specified for {path}: file has {file_columns} columns, schema expects {schema_columns}"
    )]
    TooManySensors {
        /// Path of the offending file.
        path: String,
        /// Number of columns in the raw file header.
        file_columns: usize,
        /// Number of columns the reconstructed schema expects.
        schema_columns: usize,
    },

    /// The file contains no header line.
    #[error("empty recording file: {path}")]
    EmptyFile {
        /// Path of the offending file.
        path: String,
    },

    /// A data row's field count disagrees with the header.
    #[error("ragged row in {path} at line {line}: expected {expected} fields, got {actual}")]
    RaggedRow {
        /// Path of the offending file.
        path: String,
        /// 1-based line number of the offending row.
        line: usize,
        /// Expected field count (header width).
        expected: usize,
        /// Actual field count.
        actual: usize,
    },

    /// A named column is not present in the recording.
    #[error("column not found: {column}")]
    ColumnNotFound {
        /// Name of the missing column.
        column: String,
    },

    /// Columns supplied to a table constructor have unequal lengths.
    #[error("column {column} has {actual} samples, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Expected sample count.
        expected: usize,
        /// Actual sample count.
        actual: usize,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_sensors_message_names_file() {
        let err = RecordingError::TooFewSensors {
            path: "calib.tsv".to_string(),
            file_columns: 141,
            schema_columns: 131,
        };
        assert!(err.to_string().contains("too few sensors"));
        assert!(err.to_string().contains("calib.tsv"));
    }

    #[test]
    fn too_many_sensors_message_names_counts() {
        let err = RecordingError::TooManySensors {
            path: "calib.tsv".to_string(),
            file_columns: 121,
            schema_columns: 131,
        };
        assert!(err.to_string().contains("too many sensors"));
        assert!(err.to_string().contains("121"));
        assert!(err.to_string().contains("131"));
    }

    #[test]
    fn column_not_found_names_column() {
        let err = RecordingError::ColumnNotFound {
            column: "TT_x".to_string(),
        };
        assert!(err.to_string().contains("TT_x"));
    }
}
