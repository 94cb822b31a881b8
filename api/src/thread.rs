//! Turns the flat comment list of a discussion into an ordered reply tree.

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment as served by `GET /discussions/{id}/comments`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub id: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discussion_id: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_id: i32,
    #[serde(default)]
    pub parent_comment_id: Option<i32>,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_full_name: String,
    #[serde(default)]
    pub author_profile_image: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub upvotes: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub downvotes: i32,
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A comment together with its direct replies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn new(comment: Comment) -> Self {
        CommentNode {
            comment,
            replies: vec![],
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.replies.iter());
        }
        count
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Newest,
    MostVoted,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::MostVoted => "most_voted",
        }
    }

    fn compare(&self, a: &CommentNode, b: &CommentNode) -> Ordering {
        match self {
            SortMode::Newest => b.comment.created_at.cmp(&a.comment.created_at),
            SortMode::MostVoted => b.comment.upvotes.cmp(&a.comment.upvotes),
        }
    }
}

impl FromStr for SortMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "most_voted" => Ok(SortMode::MostVoted),
            _ => Err("invalid sort mode, expected `newest` or `most_voted`"),
        }
    }
}

impl<'de> Deserialize<'de> for SortMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl Serialize for SortMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Builds the reply forest. Roots and replies keep the order in which they
/// appear in `comments`. A reply whose parent is not part of `comments` is
/// dropped along with its own replies.
pub fn assemble(comments: Vec<Comment>) -> Vec<CommentNode> {
    let positions: HashMap<i32, usize> = comments
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.id, pos))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![vec![]; comments.len()];
    let mut roots = vec![];
    let mut orphans = 0usize;

    for (pos, comment) in comments.iter().enumerate() {
        match comment.parent_comment_id {
            None => roots.push(pos),
            Some(parent_id) => match positions.get(&parent_id) {
                Some(&parent) => children[parent].push(pos),
                None => orphans += 1,
            },
        }
    }

    let total = comments.len();
    let mut pending: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode>> = (0..total).map(|_| None).collect();

    // Post-order walk: a node is built once all of its children are.
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&pos| (pos, false)).collect();
    while let Some((pos, children_built)) = stack.pop() {
        if children_built {
            if let Some(comment) = pending[pos].take() {
                let mut node = CommentNode::new(comment);
                node.replies = children[pos]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[pos] = Some(node);
            }
        } else {
            stack.push((pos, true));
            stack.extend(children[pos].iter().rev().map(|&child| (child, false)));
        }
    }

    let forest: Vec<CommentNode> = roots
        .into_iter()
        .filter_map(|pos| built[pos].take())
        .collect();

    let unreachable = pending.iter().filter(|c| c.is_some()).count();
    if unreachable > 0 {
        tracing::debug!(
            orphans,
            unreachable,
            "Dropped comments whose parent is not in the thread"
        );
    }

    forest
}

/// Returns a copy of `forest` ordered by `mode` at every depth.
pub fn sort(forest: &[CommentNode], mode: SortMode) -> Vec<CommentNode> {
    let mut sorted = forest.to_vec();
    sort_in_place(&mut sorted, mode);
    sorted
}

pub fn sort_in_place(forest: &mut Vec<CommentNode>, mode: SortMode) {
    let mut levels = vec![forest];
    while let Some(level) = levels.pop() {
        // stable, so ties keep their previous order
        level.sort_by(|a, b| mode.compare(a, b));
        for node in level {
            levels.push(&mut node.replies);
        }
    }
}

/// Convenience for `sort(&assemble(comments), mode)` without the extra copy.
pub fn build(comments: Vec<Comment>, mode: SortMode) -> Vec<CommentNode> {
    let mut forest = assemble(comments);
    sort_in_place(&mut forest, mode);
    forest
}

/// Lenient ISO-8601 parsing: RFC 3339, naive date-times and plain dates are
/// all read as UTC. Serialization is always RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{s}`")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match dt {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => super::parse(&s).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp `{s}`"))
                }),
                None => Ok(None),
            }
        }
    }
}
