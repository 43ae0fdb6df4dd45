//! Error types for the reconciliation engine.

use miette::Diagnostic;

use crate::host::HostError;

/// Main error type for engine operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ReconcileError {
    /// `update` was called while another pass on the same engine was running.
    #[error("update called while a reconciliation pass is already running")]
    #[diagnostic(
        code(weft::reconcile::reentrant),
        help("defer the call until the running update returns")
    )]
    Reentrant,

    /// An earlier pass failed part-way; tables may not match the host tree.
    #[error("a previous reconciliation pass failed; call clear() before updating again")]
    #[diagnostic(code(weft::reconcile::poisoned))]
    Poisoned,

    /// Host tree rejected a mutation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Host(#[from] HostError),

    /// Invalid engine configuration.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration validation errors.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("match weight `{name}` must be finite and non-negative, got {value}")]
    #[diagnostic(code(weft::config::invalid_weight))]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("match weight `{lower}` ({lower_value}) must stay below `{higher}` ({higher_value})")]
    #[diagnostic(
        code(weft::config::weight_order),
        help("similarity must rank structure above logical overlap above location overlap")
    )]
    WeightOrder {
        higher: &'static str,
        higher_value: f64,
        lower: &'static str,
        lower_value: f64,
    },
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
