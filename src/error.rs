use actix_web::{body, http::StatusCode, HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::{auth::AuthError, payroll::PayrollError};

#[derive(Debug, Serialize)]
struct Message<'a> {
    message: &'a str,
}

/// Every error leaves the server as `{ "message": ... }`
pub(crate) fn message_response(status: StatusCode, message: impl AsRef<str>) -> HttpResponse<body::BoxBody> {
    HttpResponse::build(status).json(Message { message: message.as_ref() })
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Payroll(#[from] PayrollError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("database error")]
    Database(#[from] DbErr),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("you do not have access to this site")]
    Forbidden,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        match self {
            ApiError::Payroll(err) => err.error_response(),
            ApiError::Auth(err) => err.error_response(),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "query failed");
                message_response(self.status_code(), self.to_string())
            }
            _ => message_response(self.status_code(), self.to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Payroll(err) => err.status_code(),
            ApiError::Auth(err) => err.status_code(),
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}
