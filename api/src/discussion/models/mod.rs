pub mod comment;
pub mod comment_vote;
pub mod discussion;
