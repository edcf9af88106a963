use thiserror::Error;

/// Error that can happen when building or running a conversion [`Plan`](crate::Plan)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CvtError {
    /// Channel count, sample rate or format word can't be converted
    #[error("Invalid format: {0}")]
    InvalidFormat(&'static str),
    /// There is no plan to run (never built, or building it failed)
    #[error("No converter given")]
    NullPlan,
    /// There is no buffer to convert
    #[error("No buffer allocated for conversion")]
    NullBuffer,
    /// The buffer can't hold the worst case output of the plan.
    ///
    /// See [`Plan::required_len`](crate::Plan::required_len).
    #[error("Buffer too small: {needed} bytes needed, but only {capacity} available")]
    BufferTooSmall {
        /// Bytes required for the conversion
        needed: usize,
        /// Bytes the buffer actually has
        capacity: usize,
    },
    /// The conversion would need more stages than a plan can hold.
    ///
    /// Can't happen for specs that pass validation, but the plan is bounded.
    #[error("Too many conversion stages")]
    TooManyStages,
}

/// Result of building or running a conversion
pub type CvtResult<T = ()> = Result<T, CvtError>;
