use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub profile_image_url: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The public part of a user, shown next to the things they wrote.
#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Author {
    pub username: String,
    pub full_name: String,
    pub profile_image_url: Option<String>,
}

impl User {
    /// Whether this user may moderate content written by `author_id`.
    pub fn can_manage(&self, author_id: i32) -> bool {
        self.id == author_id || self.is_admin
    }

    pub fn as_author(&self) -> Author {
        Author {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            profile_image_url: self.profile_image_url.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn mock_user(id: i32, is_admin: bool) -> User {
    User {
        id,
        username: format!("student{id}"),
        email: format!("student{id}@uni.test"),
        full_name: format!("Student {id}"),
        profile_image_url: None,
        is_active: true,
        is_admin,
        created_at: Utc::now(),
        updated_at: None,
    }
}
