use actix_web::{body, http::StatusCode, HttpResponse};
use chrono::NaiveDate;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::message_response;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("invalid shift type `{0}`")]
    InvalidShiftType(String),

    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("site {0} not found")]
    SiteNotFound(Uuid),

    #[error("worker {0} not found")]
    WorkerNotFound(Uuid),

    #[error("salary log {0} not found")]
    SalaryLogNotFound(Uuid),

    #[error("no daily rate available for worker {worker_id} on site {site_id}")]
    RateResolutionFailure { worker_id: Uuid, site_id: Uuid },

    #[error("database error")]
    Database(#[from] DbErr),
}

impl actix_web::error::ResponseError for PayrollError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let PayrollError::Database(err) = self {
            tracing::error!(error = %err, "payroll query failed");
        }

        message_response(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::InvalidShiftType(_)
            | PayrollError::InvalidDateRange { .. }
            | PayrollError::InvalidAmount => StatusCode::BAD_REQUEST,
            PayrollError::SiteNotFound(_)
            | PayrollError::WorkerNotFound(_)
            | PayrollError::SalaryLogNotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::RateResolutionFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
