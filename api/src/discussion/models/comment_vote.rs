use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::comment_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentVote {
    pub id: i32,
    pub vote_type: String,
    pub user_id: i32,
    pub comment_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comment_votes)]
pub struct NewCommentVote {
    pub vote_type: String,
    pub user_id: i32,
    pub comment_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }

    /// How `(upvotes, downvotes)` change when a user whose current vote is
    /// `previous` votes `self`.
    pub fn counter_delta(self, previous: Option<VoteType>) -> (i32, i32) {
        let unit = |v: VoteType| match v {
            VoteType::Upvote => (1, 0),
            VoteType::Downvote => (0, 1),
        };

        match previous {
            None => unit(self),
            Some(prev) if prev == self => (0, 0),
            Some(prev) => {
                let (add_up, add_down) = unit(self);
                let (sub_up, sub_down) = unit(prev);
                (add_up - sub_up, add_down - sub_down)
            }
        }
    }
}

impl FromStr for VoteType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            _ => Err("Invalid vote type. Use 'upvote' or 'downvote'"),
        }
    }
}

impl<'de> Deserialize<'de> for VoteType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl Serialize for VoteType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl CommentVote {
    pub fn kind(&self) -> Result<VoteType, &'static str> {
        self.vote_type.parse()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_vote_counts_once() {
        assert_eq!(VoteType::Upvote.counter_delta(None), (1, 0));
        assert_eq!(VoteType::Downvote.counter_delta(None), (0, 1));
    }

    #[test]
    fn test_repeated_vote_is_noop() {
        assert_eq!(VoteType::Upvote.counter_delta(Some(VoteType::Upvote)), (0, 0));
        assert_eq!(VoteType::Downvote.counter_delta(Some(VoteType::Downvote)), (0, 0));
    }

    #[test]
    fn test_changed_vote_moves_counter() {
        assert_eq!(VoteType::Downvote.counter_delta(Some(VoteType::Upvote)), (-1, 1));
        assert_eq!(VoteType::Upvote.counter_delta(Some(VoteType::Downvote)), (1, -1));
    }

    #[test]
    fn test_vote_type_parsing() {
        assert_eq!("upvote".parse::<VoteType>(), Ok(VoteType::Upvote));
        assert!("UPVOTE".parse::<VoteType>().is_err());
        assert!(serde_json::from_str::<VoteType>("\"sideways\"").is_err());
        assert_eq!(
            serde_json::from_str::<VoteType>("\"downvote\"").unwrap(),
            VoteType::Downvote
        );
    }
}
