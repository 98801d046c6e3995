//! Error types shared by every stage of the pH adjustment pass.
//!
//! All variants except the loader ones describe a structurally invalid input. They abort the
//! whole pass and are never retried. Per-reaction outcomes (exchange, unanalyzable) are not
//! errors, they end up in the [`AdjustmentReport`](crate::Rebalancing::auto_adjust::AdjustmentReport).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhAdjustError {
    /// metabolite identifier without a parseable compartment suffix
    #[error("Format error: {0}")]
    FormatError(String),
    #[error("Compartment mismatch: model declares {declared:?}, identifiers resolve to {resolved:?}")]
    CompartmentMismatch {
        declared: Vec<String>,
        resolved: Vec<String>,
    },
    #[error("Ambiguous proton species: {0}")]
    AmbiguousProton(String),
    #[error(
        "Negative atom count: metabolite '{metabolite}' has {hydrogens} H atoms, proton delta is {delta}"
    )]
    NegativeAtomCount {
        metabolite: String,
        hydrogens: i64,
        delta: i64,
    },
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid task: {0}")]
    InvalidTask(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PhAdjustError {
    pub fn dimension(what: &str, expected: usize, found: usize) -> Self {
        PhAdjustError::DimensionMismatch {
            what: what.to_string(),
            expected,
            found,
        }
    }
}
