//! Defines the app level error type and its conversions to JSON responses and HTML pages.
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::html::error_view;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A query parameter was missing, malformed or out of range.
    ///
    /// `name` is the name of the offending parameter and `reason` is a
    /// human readable explanation that is safe to show to the client.
    #[error("invalid {name}: {reason}")]
    InvalidArgument {
        /// The query parameter that was rejected, e.g. "month".
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The seed data could not be fetched from, or parsed from, the seed source.
    ///
    /// The string describes the underlying failure and is returned to the
    /// client as the error details.
    #[error("could not load seed data: {0}")]
    UpstreamFailure(String),

    /// An unhandled/unexpected SQL error.
    ///
    /// The inner error should only be logged on the server. Clients only
    /// receive a generic message.
    #[error("an unexpected SQL error occurred: {0}")]
    StoreFailure(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::StoreFailure(value)
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    /// A short summary of what went wrong.
    pub error: String,
    /// More information about the failure, if it is safe to share.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Error::UpstreamFailure(_) | Error::StoreFailure(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Error::InvalidArgument { name, reason } => ErrorBody {
                error: format!("Invalid {name}"),
                details: Some(reason.clone()),
            },
            Error::UpstreamFailure(details) => ErrorBody {
                error: "Failed to initialize database".to_owned(),
                details: Some(details.clone()),
            },
            Error::StoreFailure(_) | Error::DatabaseLockError => ErrorBody {
                error: "Something went wrong".to_owned(),
                details: Some(
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                ),
            },
        }
    }

    /// Convert the error into a full HTML error page.
    ///
    /// Used by the handlers that serve pages rather than JSON.
    pub fn into_page_response(self) -> Response {
        tracing::error!("Could not render page: {self}");

        let status_code = self.status_code();
        let body = self.body();
        let header = status_code.as_u16().to_string();
        let fix = body.details.unwrap_or_default();

        (
            status_code,
            Html(error_view(&body.error, &header, &body.error, &fix).into_string()),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::InvalidArgument { .. } => tracing::warn!("Rejected request: {self}"),
            error => tracing::error!("Request failed: {error}"),
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}
