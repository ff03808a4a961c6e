use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use safe_history_engine::{HistoryEngineError, SubmissionRejected};

#[derive(Debug, thiserror::Error)]
pub(crate) enum AppError {
    #[error("history engine error: {0}")]
    Engine(Box<HistoryEngineError>),

    #[error("invalid wallet address: {0}")]
    InvalidWalletAddress(Cow<'static, str>),

    #[error("invalid owners filter: {0}")]
    InvalidOwnersFilter(Cow<'static, str>),

    #[error("no transactions recorded for this wallet")]
    EmptyHistory,
}

impl From<HistoryEngineError> for AppError {
    fn from(err: HistoryEngineError) -> Self {
        Self::Engine(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::InvalidWalletAddress(_) | AppError::InvalidOwnersFilter(_) => {
                StatusCode::BAD_REQUEST
            },
            AppError::EmptyHistory => StatusCode::NOT_FOUND,
            AppError::Engine(err) => engine_status(err),
        };

        match code {
            StatusCode::NOT_FOUND => tracing::info!("not found: {self}"),
            code if code.is_client_error() => tracing::warn!("client error: {self}"),
            _ => tracing::error!("server error: {self}"),
        }

        (code, self.to_string()).into_response()
    }
}

fn engine_status(err: &HistoryEngineError) -> StatusCode {
    match err {
        HistoryEngineError::Rejected(rejected) => match rejected {
            SubmissionRejected::MalformedInput { .. } | SubmissionRejected::HashMismatch { .. } => {
                StatusCode::BAD_REQUEST
            },
            SubmissionRejected::UnknownWallet { .. }
            | SubmissionRejected::UnauthorizedSender { .. }
            | SubmissionRejected::NotYetApproved { .. }
            | SubmissionRejected::ExecutionUnverified { .. }
            | SubmissionRejected::ConflictingProposal { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        },
        HistoryEngineError::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        HistoryEngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
