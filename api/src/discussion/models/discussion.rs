use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::discussions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Discussion {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub view_count: i32,
    pub vote_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author_id: i32,
    pub course_id: Option<i32>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::discussions)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub course_id: Option<i32>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::discussions)]
pub struct UpdateDiscussion {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
