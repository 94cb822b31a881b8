#[cfg(debug_assertions)]
use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use diesel_async::pooled_connection::deadpool::PoolError;
use serde::Serialize;
#[cfg(debug_assertions)]
use serde_json::Value;

/// Errors that map onto a specific HTTP status code.
pub trait ApiRequestError: std::error::Error {
    fn status_code(&self) -> StatusCode;
}

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("could not get a database connection: {0}")]
    Pool(#[from] PoolError),
}

impl Serialize for ServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}

#[derive(Debug)]
pub enum AppError {
    ServerError {
        error: ServerError,

        #[cfg(debug_assertions)]
        backtrace: backtrace::Backtrace,
    },
    /// The request was understood but cannot be fulfilled.
    Request { status: StatusCode, msg: String },
    Unhandled(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(%error, "Request failed with a server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: match error {
                            ServerError::Database(_) => "DATABASE_ERR".into(),
                            ServerError::Pool(_) => "SERVER_ERR".into(),
                        },
                        msg: Some("Internal server error".into()),
                        #[cfg(debug_assertions)]
                        debug_info: Some(HashMap::from([
                            (
                                "backtrace",
                                serde_json::to_value(filter_backtrace(&backtrace))
                                    .unwrap_or_default(),
                            ),
                            ("error", serde_json::to_value(&error).unwrap_or_default()),
                        ])),
                    },
                )
            }
            AppError::Request { status, msg } => (
                status,
                ErrorResponse {
                    code: status
                        .canonical_reason()
                        .unwrap_or("ERR")
                        .to_uppercase()
                        .replace(' ', "_"),
                    msg: Some(msg),
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
            AppError::Unhandled(e) => {
                tracing::error!(error = %e, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: "ERR".into(),
                        msg: Some(e),
                        #[cfg(debug_assertions)]
                        debug_info: None,
                    },
                )
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<ServerError> for AppError {
    fn from(error: ServerError) -> Self {
        AppError::ServerError {
            error,

            #[cfg(debug_assertions)]
            backtrace: backtrace::Backtrace::new(),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => AppError::Request {
                status: StatusCode::NOT_FOUND,
                msg: "Not found".into(),
            },
            e => ServerError::Database(e).into(),
        }
    }
}

impl From<PoolError> for AppError {
    fn from(e: PoolError) -> Self {
        ServerError::Pool(e).into()
    }
}

impl From<&'static str> for AppError {
    fn from(e: &'static str) -> Self {
        AppError::Unhandled(e.into())
    }
}

impl From<String> for AppError {
    fn from(e: String) -> Self {
        AppError::Unhandled(e)
    }
}

impl<M: Into<String>> From<(M, StatusCode)> for AppError {
    fn from((msg, status): (M, StatusCode)) -> Self {
        AppError::Request {
            status,
            msg: msg.into(),
        }
    }
}

impl AppError {
    pub fn from_request_error<E: ApiRequestError>(e: E) -> Self {
        AppError::Request {
            status: e.status_code(),
            msg: e.to_string(),
        }
    }
}

#[cfg(debug_assertions)]
#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = "studyhub_api::";
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
