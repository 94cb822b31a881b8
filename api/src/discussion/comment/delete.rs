use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{App, error::AppError, identity::AuthUser, schema::comments};

use super::{ensure_owner, find_comment};

/// Replies to the deleted comment lose their parent (`ON DELETE SET NULL`).
#[debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path(comment_id): Path<i32>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let comment = find_comment(&mut conn, comment_id).await?;
    ensure_owner(&comment, &user, "You can only delete your own comments")?;

    diesel::delete(comments::table.find(comment_id))
        .execute(&mut conn)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
