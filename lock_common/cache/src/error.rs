use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedisError {
    #[error("Redis connect error: {0}")]
    ConnectionError(#[source] redis::RedisError),

    #[error("Redis command error: {0}")]
    CommandError(#[from] redis::RedisError),

    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    #[error("Unexpected Redis reply: {0}")]
    UnexpectedReply(String),
}
