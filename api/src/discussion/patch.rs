use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::{App, error::AppError, identity::AuthUser, schema::discussions};

use super::{
    find_discussion,
    models::discussion::{Discussion, UpdateDiscussion},
    validate_body, validate_title,
};

/// Fields left out are kept as they are.
#[derive(Deserialize)]
pub struct DiscussionPatch {
    title: Option<String>,
    content: Option<String>,
}

impl DiscussionPatch {
    fn into_changeset(self) -> Result<UpdateDiscussion, &'static str> {
        Ok(UpdateDiscussion {
            title: self.title.as_deref().map(validate_title).transpose()?,
            content: self.content.as_deref().map(validate_body).transpose()?,
            updated_at: Some(Utc::now()),
        })
    }
}

#[debug_handler]
pub async fn update_discussion(
    State(ctx): State<App>,
    Path(discussion_id): Path<i32>,
    AuthUser(user): AuthUser,
    crate::json::Json(patch): crate::json::Json<DiscussionPatch>,
) -> Result<Json<Discussion>, AppError> {
    let changes = patch
        .into_changeset()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let discussion = find_discussion(&mut conn, discussion_id).await?;
    if !user.can_manage(discussion.author_id) {
        return Err((
            "You don't have permission to update this discussion",
            StatusCode::FORBIDDEN,
        ))?;
    }

    let updated = diesel::update(discussions::table.find(discussion_id))
        .set(&changes)
        .returning(Discussion::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(updated))
}
