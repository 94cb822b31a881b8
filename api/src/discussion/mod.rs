pub mod comment;
pub mod create;
pub mod delete;
pub mod get;
pub mod models;
pub mod patch;
pub mod routes;

use std::collections::HashMap;

use axum::http::StatusCode;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use crate::{
    error::AppError,
    identity::models::user::Author,
    schema::{comments, courses, discussions},
};

use self::models::discussion::Discussion;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 20000;

/// A discussion as returned to clients.
#[derive(Debug, Serialize, Clone)]
pub struct DiscussionWithAuthor {
    #[serde(flatten)]
    pub discussion: Discussion,
    pub author_username: String,
    pub author_full_name: String,
    pub comment_count: i64,
}

impl DiscussionWithAuthor {
    pub fn new(discussion: Discussion, author: Author, comment_count: i64) -> Self {
        DiscussionWithAuthor {
            discussion,
            author_username: author.username,
            author_full_name: author.full_name,
            comment_count,
        }
    }
}

/// Trims and checks a discussion title.
pub fn validate_title(title: &str) -> Result<String, &'static str> {
    let title = title.trim();
    if title.is_empty() {
        return Err("No title provided");
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err("Title too long (max 200 characters)");
    }
    Ok(title.to_owned())
}

/// Trims and checks a discussion body.
pub fn validate_body(content: &str) -> Result<String, &'static str> {
    let content = content.trim();
    if content.is_empty() {
        return Err("No content provided");
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err("Content too long (max 20000 characters)");
    }
    Ok(content.to_owned())
}

pub(crate) async fn ensure_course_exists(
    conn: &mut AsyncPgConnection,
    course_id: i32,
) -> Result<(), AppError> {
    courses::table
        .find(course_id)
        .select(courses::id)
        .first::<i32>(conn)
        .await
        .optional()?
        .ok_or(("Course not found", StatusCode::NOT_FOUND))?;

    Ok(())
}

pub(crate) async fn ensure_discussion_exists(
    conn: &mut AsyncPgConnection,
    discussion_id: i32,
) -> Result<(), AppError> {
    discussions::table
        .find(discussion_id)
        .select(discussions::id)
        .first::<i32>(conn)
        .await
        .optional()?
        .ok_or(("Discussion not found", StatusCode::NOT_FOUND))?;

    Ok(())
}

pub(crate) async fn find_discussion(
    conn: &mut AsyncPgConnection,
    discussion_id: i32,
) -> Result<Discussion, AppError> {
    let discussion = discussions::table
        .find(discussion_id)
        .select(Discussion::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or(("Discussion not found", StatusCode::NOT_FOUND))?;

    Ok(discussion)
}

/// Counts one more view and returns the discussion as it is now.
pub(crate) async fn record_view(
    conn: &mut AsyncPgConnection,
    discussion_id: i32,
) -> Result<Discussion, AppError> {
    let discussion = diesel::update(discussions::table.find(discussion_id))
        .set(discussions::view_count.eq(discussions::view_count + 1))
        .returning(Discussion::as_returning())
        .get_result(conn)
        .await
        .optional()?
        .ok_or(("Discussion not found", StatusCode::NOT_FOUND))?;

    Ok(discussion)
}

/// Number of comments per discussion, for every id in `discussion_ids`.
pub(crate) async fn comment_counts(
    conn: &mut AsyncPgConnection,
    discussion_ids: &[i32],
) -> Result<HashMap<i32, i64>, AppError> {
    if discussion_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let counts = comments::table
        .filter(comments::discussion_id.eq_any(discussion_ids))
        .group_by(comments::discussion_id)
        .select((comments::discussion_id, diesel::dsl::count(comments::id)))
        .load::<(i32, i64)>(conn)
        .await?;

    Ok(counts.into_iter().collect())
}
