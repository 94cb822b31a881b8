use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{App, error::AppError, identity::AuthUser, schema::discussions};

use super::find_discussion;

/// Comments and their votes go with the discussion.
#[debug_handler]
pub async fn delete_discussion(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let discussion = find_discussion(&mut conn, discussion_id).await?;
    if !user.can_manage(discussion.author_id) {
        return Err((
            "You don't have permission to delete this discussion",
            StatusCode::FORBIDDEN,
        ))?;
    }

    diesel::delete(discussions::table.find(discussion_id))
        .execute(&mut conn)
        .await?;

    tracing::info!(discussion_id, user_id = user.id, "Deleted discussion");

    Ok(StatusCode::NO_CONTENT)
}
