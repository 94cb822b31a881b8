use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::{
    App,
    discussion::{ensure_discussion_exists, models::comment::NewDiscussionComment},
    error::AppError,
    identity::AuthUser,
    schema::comments,
    thread::Comment,
};

use super::{DiscussionComment, check_parent, parent_discussion, validate_content};

#[derive(Deserialize)]
pub struct CommentSubmission {
    content: String,
    parent_comment_id: Option<i32>,
}

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
    AuthUser(user): AuthUser,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let content =
        validate_content(&submission.content).map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    ensure_discussion_exists(&mut conn, discussion_id).await?;

    if let Some(parent_id) = submission.parent_comment_id {
        check_parent(discussion_id, parent_discussion(&mut conn, parent_id).await?)?;
    }

    let inserted: DiscussionComment = diesel::insert_into(comments::table)
        .values(&NewDiscussionComment {
            content,
            author_id: user.id,
            discussion_id,
            parent_comment_id: submission.parent_comment_id,
        })
        .returning(DiscussionComment::as_returning())
        .get_result(&mut conn)
        .await?;

    tracing::debug!(
        comment_id = inserted.id,
        discussion_id,
        parent_comment_id = ?inserted.parent_comment_id,
        "Created comment"
    );

    Ok((StatusCode::CREATED, Json(inserted.with_author(user.as_author()))))
}
