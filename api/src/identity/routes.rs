use axum::{Json, Router, routing::get};

use crate::{App, error::AppError};

use super::{MaybeAuthUser, models::user::User};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/me", get(handle_whoami))
        .route("/is_auth", get(is_auth))
}

#[derive(serde::Serialize)]
struct IsAuth {
    is_auth: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_admin: bool,
}

async fn is_auth(MaybeAuthUser(user): MaybeAuthUser) -> Json<IsAuth> {
    let user = user.ok();
    Json(IsAuth {
        is_auth: user.is_some(),
        id: user.as_ref().map(|u| u.id),
        username: user.as_ref().map(|u| u.username.clone()),
        is_admin: user.as_ref().is_some_and(|u| u.is_admin),
    })
}

async fn handle_whoami(MaybeAuthUser(user): MaybeAuthUser) -> Result<Json<User>, AppError> {
    Ok(Json(user?))
}
