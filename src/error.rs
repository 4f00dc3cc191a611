//! Service error type and its JSON response shape.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("Lab not found: {0}")]
  LabNotFound(String),

  #[error("Day {day} not found in lab {lab}")]
  DayNotFound { lab: String, day: u32 },

  #[error("Block not found: {0}")]
  BlockNotFound(String),

  #[error("No day is open in this session")]
  NoOpenDay,

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl ApiError {
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::LabNotFound(_) => "LAB_NOT_FOUND",
      ApiError::DayNotFound { .. } => "DAY_NOT_FOUND",
      ApiError::BlockNotFound(_) => "BLOCK_NOT_FOUND",
      ApiError::NoOpenDay => "NO_OPEN_DAY",
      ApiError::InvalidInput(_) => "INVALID_INPUT",
      ApiError::Serialization(_) => "SERIALIZATION_ERROR",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::LabNotFound(_) | ApiError::DayNotFound { .. } | ApiError::BlockNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::NoOpenDay | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub code: &'static str,
  pub message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "labs_backend", code = self.code(), error = %self, "Request failed");
    }
    (status, Json(ErrorOut { code: self.code(), message: self.to_string() })).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;
