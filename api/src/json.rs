use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};

use crate::error::AppError;

/// `axum::Json` whose rejections come back in the API's error shape, as
/// `422 {"code": "UNPROCESSABLE_ENTITY", "msg": ...}`.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "Rejected request body");
                AppError::from((rejection.body_text(), StatusCode::UNPROCESSABLE_ENTITY))
            })?;

        Ok(Json(value))
    }
}
