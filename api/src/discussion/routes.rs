use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::App;

use super::{
    comment::{
        create::create_comment,
        delete::delete_comment,
        get::{get_comment_tree, get_comments},
        patch::patch_comment,
        vote::vote_comment,
    },
    create::create_discussion,
    delete::delete_discussion,
    get::{get_discussion, list_course_discussions},
    patch::update_discussion,
};

pub fn route() -> Router<App> {
    // TODO rate limit comment creation and voting
    Router::<App>::new()
        .route(
            "/courses/{course_id}/discussions",
            get(list_course_discussions).post(create_discussion),
        )
        .route(
            "/discussions/{id}",
            get(get_discussion)
                .put(update_discussion)
                .delete(delete_discussion),
        )
        .route(
            "/discussions/{id}/comments",
            get(get_comments).post(create_comment),
        )
        .route("/discussions/{id}/comments/tree", get(get_comment_tree))
        .route("/comments/{id}", patch(patch_comment).delete(delete_comment))
        .route("/comments/{id}/vote", post(vote_comment))
}
