use std::borrow::Cow;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

/// Errors surfaced by the raw query layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("{0}")]
    Other(Cow<'static, str>),
}

impl StoreError {
    pub fn other(message: impl Into<Cow<'static, str>>) -> Self {
        StoreError::Other(message.into())
    }
}
