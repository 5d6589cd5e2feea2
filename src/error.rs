//! Failure taxonomy for the reading core
//!
//! No failure here is process-fatal: everything is scoped to the current
//! document session and reported upward instead of panicking across
//! component boundaries.

/// Faults produced by the render pipeline and the document source.
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    /// The request was superseded. Not an error: dropped silently, no
    /// callback fires and no result is ever applied.
    #[error("render canceled")]
    Canceled,

    /// A single render attempt failed. Reported to the caller; the
    /// previously displayed frame is retained.
    #[error("transient render failure: {detail}")]
    Transient { detail: String },

    /// The document could not be opened or read at all. Terminal for the
    /// session: no further rendering is attempted.
    #[error("document source unavailable: {detail}")]
    SourceUnavailable { detail: String },
}

impl RenderFault {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient { detail: msg.into() }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable { detail: msg.into() }
    }

    /// True for faults that end the session rather than a single frame.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

/// Faults produced by text pagination.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaginateFault {
    /// The measurement surface is not ready. Pagination is deferred and
    /// retried once the surface becomes measurable.
    #[error("measurement surface not ready")]
    MeasurementUnavailable,
}
