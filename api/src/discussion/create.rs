use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::{App, error::AppError, identity::AuthUser, schema::discussions};

use super::{
    DiscussionWithAuthor, ensure_course_exists,
    models::discussion::{Discussion, NewDiscussion},
    validate_body, validate_title,
};

#[derive(Deserialize)]
pub struct DiscussionSubmission {
    title: String,
    content: String,
}

#[debug_handler]
pub async fn create_discussion(
    State(ctx): State<App>,
    Path(course_id): Path<i32>,
    AuthUser(user): AuthUser,
    crate::json::Json(submission): crate::json::Json<DiscussionSubmission>,
) -> Result<(StatusCode, Json<DiscussionWithAuthor>), AppError> {
    let new_discussion = NewDiscussion {
        title: validate_title(&submission.title).map_err(|e| (e, StatusCode::BAD_REQUEST))?,
        content: validate_body(&submission.content).map_err(|e| (e, StatusCode::BAD_REQUEST))?,
        author_id: user.id,
        course_id: Some(course_id),
    };

    let mut conn = ctx.diesel.get().await?;

    ensure_course_exists(&mut conn, course_id).await?;

    let discussion: Discussion = diesel::insert_into(discussions::table)
        .values(&new_discussion)
        .returning(Discussion::as_returning())
        .get_result(&mut conn)
        .await?;

    tracing::info!(
        discussion_id = discussion.id,
        course_id,
        author_id = user.id,
        "Created discussion"
    );

    Ok((
        StatusCode::CREATED,
        Json(DiscussionWithAuthor::new(discussion, user.as_author(), 0)),
    ))
}
