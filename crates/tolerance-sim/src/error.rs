//! Errors raised by robustness simulations.

use tolerance_graph::GraphError;

/// Errors from argument validation and from the removal loop.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A policy parameter is out of range or the measure list is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A measure, centrality or vertex lookup failed before the run started.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A measure failed after some batches were applied. The partial table
    /// is discarded.
    #[error("measure failed after {rows_completed} completed rows: {source}")]
    Measure {
        /// Rows recorded before the failure.
        rows_completed: usize,
        /// The measure's error.
        #[source]
        source: GraphError,
    },
}

impl SimError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}
