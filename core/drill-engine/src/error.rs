//! FILENAME: core/drill-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrillError {
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Category has no deeper level worth drilling into")]
    NotDrillable,

    #[error("Already at the root level")]
    AtRoot,

    #[error("Level {level} out of range ({levels} levels available)")]
    LevelOutOfRange { level: usize, levels: usize },
}

pub type DrillResult<T> = Result<T, DrillError>;
