use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use serde::Deserialize;

use crate::{
    App,
    discussion::models::comment_vote::{CommentVote, NewCommentVote, VoteType},
    error::AppError,
    identity::{AuthUser, models::user::Author},
    schema::{comment_votes, comments, users},
    thread::Comment,
};

use super::DiscussionComment;

#[derive(Deserialize)]
pub struct VoteSubmission {
    vote_type: VoteType,
}

/// One vote per user and comment. Voting the other way moves the vote,
/// voting the same way again changes nothing.
#[debug_handler]
pub async fn vote_comment(
    State(ctx): State<App>,
    Path(comment_id): Path<i32>,
    AuthUser(user): AuthUser,
    crate::json::Json(VoteSubmission { vote_type }): crate::json::Json<VoteSubmission>,
) -> Result<Json<Comment>, AppError> {
    let user_id = user.id;
    let mut conn = ctx.diesel.get().await?;

    let comment = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                let comment = comments::table
                    .find(comment_id)
                    .select(DiscussionComment::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(("Comment not found", StatusCode::NOT_FOUND))?;

                let existing = comment_votes::table
                    .filter(comment_votes::user_id.eq(user_id))
                    .filter(comment_votes::comment_id.eq(comment_id))
                    .select(CommentVote::as_select())
                    .first(conn)
                    .await
                    .optional()?;

                let previous = existing.as_ref().map(CommentVote::kind).transpose()?;
                let (up, down) = vote_type.counter_delta(previous);

                if (up, down) == (0, 0) {
                    return Ok(comment);
                }

                match existing {
                    Some(vote) => {
                        diesel::update(comment_votes::table.find(vote.id))
                            .set((
                                comment_votes::vote_type.eq(vote_type.as_str()),
                                comment_votes::updated_at.eq(Some(Utc::now())),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    None => {
                        diesel::insert_into(comment_votes::table)
                            .values(&NewCommentVote {
                                vote_type: vote_type.as_str().to_owned(),
                                user_id,
                                comment_id,
                            })
                            .execute(conn)
                            .await?;
                    }
                }

                let updated = diesel::update(comments::table.find(comment_id))
                    .set((
                        comments::upvotes.eq(comments::upvotes + up),
                        comments::downvotes.eq(comments::downvotes + down),
                    ))
                    .returning(DiscussionComment::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(updated)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(comment_id, user_id, vote = vote_type.as_str(), "Recorded vote");

    let author = users::table
        .find(comment.author_id)
        .select(Author::as_select())
        .first(&mut conn)
        .await?;

    Ok(Json(comment.with_author(author)))
}
