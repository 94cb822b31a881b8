pub mod create;
pub mod delete;
pub mod get;
pub mod patch;
pub mod vote;

use axum::http::StatusCode;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::{error::AppError, identity::models::user::User, schema::comments};

use super::models::comment::DiscussionComment;

pub const MAX_COMMENT_LENGTH: usize = 5000;

/// Trims and checks a comment body.
pub fn validate_content(content: &str) -> Result<String, &'static str> {
    let content = content.trim();

    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err("Content too long (max 5000 characters)");
    }

    if content.is_empty() {
        return Err("No content provided");
    }

    Ok(content.to_owned())
}

pub(crate) async fn find_comment(
    conn: &mut AsyncPgConnection,
    comment_id: i32,
) -> Result<DiscussionComment, AppError> {
    let comment = comments::table
        .find(comment_id)
        .select(DiscussionComment::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or(("Comment not found", StatusCode::NOT_FOUND))?;

    Ok(comment)
}

/// The discussion of comment `parent_id`, `None` when there is no such comment.
pub(crate) async fn parent_discussion(
    conn: &mut AsyncPgConnection,
    parent_id: i32,
) -> Result<Option<i32>, AppError> {
    let discussion_id = comments::table
        .find(parent_id)
        .select(comments::discussion_id)
        .first::<i32>(conn)
        .await
        .optional()?;

    Ok(discussion_id)
}

/// A reply goes under an existing comment of the same discussion.
pub(crate) fn check_parent(
    discussion_id: i32,
    parent_discussion_id: Option<i32>,
) -> Result<(), AppError> {
    match parent_discussion_id {
        None => Err(("Parent comment not found", StatusCode::NOT_FOUND).into()),
        Some(id) if id != discussion_id => Err((
            "Parent comment is not on this discussion",
            StatusCode::BAD_REQUEST,
        )
            .into()),
        Some(_) => Ok(()),
    }
}

/// Only the author may edit or delete a comment, admins included.
pub(crate) fn ensure_owner(
    comment: &DiscussionComment,
    user: &User,
    denied: &'static str,
) -> Result<(), AppError> {
    if comment.author_id != user.id {
        return Err((denied, StatusCode::FORBIDDEN))?;
    }
    Ok(())
}
