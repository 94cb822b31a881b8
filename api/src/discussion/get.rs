use axum::{
    Json,
    extract::{Path, State},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    App,
    error::AppError,
    identity::models::user::Author,
    schema::{discussions, users},
};

use super::{
    DiscussionWithAuthor, comment_counts, ensure_course_exists, models::discussion::Discussion,
    record_view,
};

/// Pinned discussions first, then the newest.
pub async fn list_course_discussions(
    State(ctx): State<App>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<DiscussionWithAuthor>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    ensure_course_exists(&mut conn, course_id).await?;

    let rows = discussions::table
        .inner_join(users::table)
        .filter(discussions::course_id.eq(course_id))
        .order((discussions::is_pinned.desc(), discussions::created_at.desc()))
        .select((Discussion::as_select(), Author::as_select()))
        .load::<(Discussion, Author)>(&mut conn)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|(d, _)| d.id).collect();
    let counts = comment_counts(&mut conn, &ids).await?;

    Ok(Json(
        rows.into_iter()
            .map(|(discussion, author)| {
                let count = counts.get(&discussion.id).copied().unwrap_or(0);
                DiscussionWithAuthor::new(discussion, author, count)
            })
            .collect(),
    ))
}

/// Every read counts as a view.
pub async fn get_discussion(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
) -> Result<Json<DiscussionWithAuthor>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let discussion = record_view(&mut conn, discussion_id).await?;

    let author = users::table
        .find(discussion.author_id)
        .select(Author::as_select())
        .first(&mut conn)
        .await?;

    let count = comment_counts(&mut conn, &[discussion.id])
        .await?
        .get(&discussion.id)
        .copied()
        .unwrap_or(0);

    Ok(Json(DiscussionWithAuthor::new(discussion, author, count)))
}
