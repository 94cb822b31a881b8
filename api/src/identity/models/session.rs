use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Sessions are issued by the authentication service; this crate only reads
/// them to resolve bearer tokens.
#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub id: i32,
    pub token: String,
    pub active: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.issued_at <= now && now < self.expires_at
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn mock_session(active: bool, issued: i64, expires: i64) -> Session {
        let now = Utc::now();
        Session {
            id: 1,
            token: "token".into(),
            active,
            issued_at: now + Duration::seconds(issued),
            expires_at: now + Duration::seconds(expires),
            user_id: 1,
            created_at: now,
        }
    }

    #[test]
    fn test_session_validity() {
        let now = Utc::now();
        assert!(mock_session(true, -60, 60).is_valid_at(now));
        assert!(!mock_session(false, -60, 60).is_valid_at(now));
        assert!(!mock_session(true, -120, -60).is_valid_at(now));
        assert!(!mock_session(true, 60, 120).is_valid_at(now));
    }
}
