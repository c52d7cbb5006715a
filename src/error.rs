#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The producer has no record yet (progress) or no report yet
    /// (latest). Transient from the tracker's point of view.
    #[error("record not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The body could not be decoded into the expected shape. For the
    /// report fetch this is fatal; during polling it is retried.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// The producer refused to start a run (unknown site, or a run
    /// already in flight). Tracking never begins.
    #[error("analysis run rejected: {reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}
