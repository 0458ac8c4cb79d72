/// Errors surfaced by the sink to whoever builds or drives it.
///
/// Write-path failures never show up here: they are [`StoreError`]s that
/// the emitter discards.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("the connection descriptor must be provided")]
    MissingDescriptor,

    #[error("the connection descriptor must not be blank")]
    BlankDescriptor,

    #[error("the list key must be provided")]
    MissingListKey,

    #[error("the list key must not be blank")]
    BlankListKey,

    #[error("failed to connect to the log store: {0}")]
    Connect(#[source] StoreError),

    #[error("the sink provider has been disposed")]
    Disposed,

    #[error("a message formatter must be supplied")]
    MissingFormatter,
}

/// Errors raised by a store connection or its factory.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("connection has been closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}
