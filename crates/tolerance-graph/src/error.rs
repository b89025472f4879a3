//! Errors raised by the graph adapter, the measure registry and the trip
//! graph builder.

/// Errors from graph mutation, measure dispatch and graph construction.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A removal referenced a vertex that is not in the current graph.
    #[error("vertex not found in graph: {0}")]
    UnknownVertex(String),

    /// A measure or centrality name is not registered.
    #[error("measure not registered: {0}")]
    UnknownMeasure(String),

    /// A measure name was rejected at registration time.
    #[error("invalid measure name {0:?}: names must be non-empty and contain no whitespace")]
    InvalidMeasureName(String),

    /// A measure with the same name is already registered.
    #[error("measure already registered: {0}")]
    DuplicateMeasure(String),

    /// A measure parameter was not accepted or had the wrong type.
    #[error("invalid parameter `{key}` for measure `{measure}`: {reason}")]
    InvalidParameter {
        /// Measure the parameter was passed to.
        measure: String,
        /// Offending parameter key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A measure refused to produce a value for the current topology.
    #[error("measure `{measure}` is undefined for this graph: {reason}")]
    Undefined {
        /// Measure that failed.
        measure: String,
        /// Why the topology is unsupported.
        reason: String,
    },

    /// A trip record line could not be decoded.
    #[error("trip record on line {line}: {reason}")]
    TripRecord {
        /// 1-based line number in the input.
        line: usize,
        /// Decoder message.
        reason: String,
    },

    /// Reading trip input failed.
    #[error("failed to read trip records: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// Build an [`GraphError::InvalidParameter`].
    pub fn invalid_parameter(
        measure: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            measure: measure.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}
