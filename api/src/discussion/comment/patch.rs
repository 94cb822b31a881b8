use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::{
    App, discussion::models::comment::UpdateDiscussionComment, error::AppError,
    identity::AuthUser, schema::comments, thread::Comment,
};

use super::{DiscussionComment, ensure_owner, find_comment, validate_content};

#[derive(Deserialize)]
pub struct CommentPatch {
    content: String,
}

#[debug_handler]
pub async fn patch_comment(
    State(ctx): State<App>,
    Path(comment_id): Path<i32>,
    AuthUser(user): AuthUser,
    crate::json::Json(patch): crate::json::Json<CommentPatch>,
) -> Result<Json<Comment>, AppError> {
    let content = validate_content(&patch.content).map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let comment = find_comment(&mut conn, comment_id).await?;
    ensure_owner(&comment, &user, "You are not the owner of this comment")?;

    let updated: DiscussionComment = diesel::update(comments::table.find(comment_id))
        .set(&UpdateDiscussionComment {
            content: Some(content),
            updated_at: Some(Utc::now()),
        })
        .returning(DiscussionComment::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(updated.with_author(user.as_author())))
}
