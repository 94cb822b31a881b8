use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    App,
    error::{ApiRequestError, AppError},
    schema::{sessions, users},
};

use self::models::{session::Session, user::User};

pub mod models;
pub mod routes;

pub const COOKIE_NAME: &str = "auth_token";

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error(
        "Authentication required, but no bearer token or cookie `{COOKIE_NAME}` found in headers."
    )]
    NoToken,

    #[error(
        "Unauthorized, please check if you're logged in by refreshing the \
         page. This could be due to an expired session or token has became invalid."
    )]
    Unauthorized,
}

impl ApiRequestError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl From<AuthenticationError> for AppError {
    fn from(e: AuthenticationError) -> Self {
        AppError::from_request_error(e)
    }
}

/// Takes the token from `Authorization: Bearer <token>`, falling back to the
/// auth cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            let (scheme, token) = h.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    let jar = axum_extra::extract::cookie::CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty())
}

pub struct MaybeAuthUser(pub Result<User, AuthenticationError>);

impl axum::extract::FromRequestParts<App> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeAuthUser(Err(AuthenticationError::NoToken)));
        };

        let mut conn = state.diesel.get().await?;

        let found = sessions::table
            .inner_join(users::table)
            .filter(sessions::token.eq(&token))
            .filter(sessions::active.eq(true))
            .filter(users::is_active.eq(true))
            .select((Session::as_select(), User::as_select()))
            .first::<(Session, User)>(&mut conn)
            .await
            .optional()?;

        let user = match found {
            Some((session, user)) if session.is_valid_at(Utc::now()) => Ok(user),
            Some((session, _)) => {
                tracing::debug!(session_id = session.id, "Rejected expired session");
                Err(AuthenticationError::Unauthorized)
            }
            None => Err(AuthenticationError::Unauthorized),
        };

        Ok(MaybeAuthUser(user))
    }
}

pub struct AuthUser(pub User);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(auth_user) = MaybeAuthUser::from_request_parts(parts, state).await?;

        Ok(AuthUser(auth_user?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    fn headers(pairs: &[(axum::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (name, value) in pairs {
            h.append(name.clone(), HeaderValue::from_static(value));
        }
        h
    }

    #[test]
    fn test_bearer_token() {
        let h = headers(&[(AUTHORIZATION, "Bearer abc123")]);
        assert_eq!(session_token(&h).as_deref(), Some("abc123"));

        let h = headers(&[(AUTHORIZATION, "bearer   abc123 ")]);
        assert_eq!(session_token(&h).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_takes_precedence_over_cookie() {
        let h = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "auth_token=from-cookie"),
        ]);
        assert_eq!(session_token(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let h = headers(&[(COOKIE, "theme=dark; auth_token=from-cookie")]);
        assert_eq!(session_token(&h).as_deref(), Some("from-cookie"));

        let h = headers(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz"), (COOKIE, "auth_token=c")]);
        assert_eq!(session_token(&h).as_deref(), Some("c"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers(&[(AUTHORIZATION, "Bearer ")])), None);
    }
}
