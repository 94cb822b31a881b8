use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{identity::models::user::Author, thread::Comment};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiscussionComment {
    pub id: i32,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub parent_comment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author_id: i32,
    pub discussion_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewDiscussionComment {
    pub content: String,
    pub author_id: i32,
    pub discussion_id: i32,
    pub parent_comment_id: Option<i32>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct UpdateDiscussionComment {
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DiscussionComment {
    /// The wire form served to clients.
    pub fn with_author(self, author: Author) -> Comment {
        Comment {
            id: self.id,
            discussion_id: self.discussion_id,
            author_id: self.author_id,
            parent_comment_id: self.parent_comment_id,
            content: self.content,
            author_username: author.username,
            author_full_name: author.full_name,
            author_profile_image: author.profile_image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }
}
