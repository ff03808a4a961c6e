use diesel_async::pooled_connection::deadpool::BuildError;
use tokio::task::JoinError;

/// Errors that can occur while establishing the connection pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("certificate loading task failed: {0}")]
    Join(#[from] JoinError),

    #[error("failed to build pool: {0}")]
    Build(#[from] BuildError),

    #[error("tls setup failed: {0}")]
    Rustls(#[from] rustls::Error),
}
