use axum::{
    Json,
    extract::{Path, Query, State},
};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;

use crate::{
    App,
    discussion::{ensure_discussion_exists, models::comment::DiscussionComment},
    error::AppError,
    identity::models::user::Author,
    schema::{comments, users},
    thread::{self, Comment, CommentNode, SortMode},
};

#[derive(Deserialize)]
pub struct TreeQueries {
    sort: Option<SortMode>,
}

async fn load_comments(
    conn: &mut AsyncPgConnection,
    discussion_id: i32,
) -> Result<Vec<Comment>, AppError> {
    ensure_discussion_exists(conn, discussion_id).await?;

    let rows = comments::table
        .inner_join(users::table)
        .filter(comments::discussion_id.eq(discussion_id))
        .order((comments::created_at.asc(), comments::id.asc()))
        .select((DiscussionComment::as_select(), Author::as_select()))
        .load::<(DiscussionComment, Author)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(comment, author)| comment.with_author(author))
        .collect())
}

/// The flat comment list, oldest first.
pub async fn get_comments(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    Ok(Json(load_comments(&mut conn, discussion_id).await?))
}

pub async fn get_comment_tree(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
    Query(q): Query<TreeQueries>,
) -> Result<Json<Vec<CommentNode>>, AppError> {
    let sort = q.sort.unwrap_or_default();

    let mut conn = ctx.diesel.get().await?;
    let flat = load_comments(&mut conn, discussion_id).await?;

    Ok(Json(thread::build(flat, sort)))
}
