use crate::{
    discussion::models::comment_vote::VoteType,
    thread::{self, CommentNode, SortMode},
};

use super::{ClientError, StudyHubClient};

/// The comment section of one discussion as a frontend shows it.
///
/// Every mutation is followed by a full re-fetch, so the view always mirrors
/// the server. When two refreshes race, whichever finishes last wins.
pub struct DiscussionView<'a> {
    client: &'a StudyHubClient,
    discussion_id: i32,
    sort: SortMode,
    forest: Vec<CommentNode>,
}

impl<'a> DiscussionView<'a> {
    /// An empty view. Call [`DiscussionView::refresh`] to load it.
    pub fn new(client: &'a StudyHubClient, discussion_id: i32, sort: SortMode) -> Self {
        DiscussionView {
            client,
            discussion_id,
            sort,
            forest: vec![],
        }
    }

    pub fn discussion_id(&self) -> i32 {
        self.discussion_id
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn forest(&self) -> &[CommentNode] {
        &self.forest
    }

    /// Total number of comments shown, replies included.
    pub fn comment_count(&self) -> usize {
        self.forest.iter().map(CommentNode::subtree_size).sum()
    }

    pub async fn refresh(&mut self) -> Result<&[CommentNode], ClientError> {
        let comments = self.client.comments(self.discussion_id).await?;
        self.forest = thread::build(comments, self.sort);
        Ok(&self.forest)
    }

    /// Re-sorts what is already loaded.
    pub fn set_sort(&mut self, sort: SortMode) {
        if self.sort == sort {
            return;
        }
        self.sort = sort;
        thread::sort_in_place(&mut self.forest, sort);
    }

    pub async fn comment(&mut self, content: &str) -> Result<(), ClientError> {
        self.client
            .create_comment(self.discussion_id, content, None)
            .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn reply(&mut self, parent_comment_id: i32, content: &str) -> Result<(), ClientError> {
        self.client
            .create_comment(self.discussion_id, content, Some(parent_comment_id))
            .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn vote(&mut self, comment_id: i32, vote_type: VoteType) -> Result<(), ClientError> {
        self.client.vote(comment_id, vote_type).await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn delete(&mut self, comment_id: i32) -> Result<(), ClientError> {
        self.client.delete_comment(comment_id).await?;
        self.refresh().await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::client::{
        Session,
        test_server::{FakeServer, comment, spawn},
    };

    async fn setup() -> (FakeServer, StudyHubClient) {
        let server = FakeServer::default();
        *server.comments.lock().unwrap() = vec![
            comment(1, None, 5, 1),
            comment(2, None, 0, 2),
            comment(3, Some(1), 1, 3),
            comment(4, Some(1), 2, 4),
        ];
        let addr = spawn(server.clone()).await;
        let session = Session::new(&format!("http://{addr}"))
            .unwrap()
            .with_token("secret");
        (server, StudyHubClient::new(session))
    }

    fn ids(forest: &[CommentNode]) -> Vec<i32> {
        forest.iter().map(|n| n.comment.id).collect()
    }

    #[tokio::test]
    async fn test_refresh_builds_sorted_forest() {
        let (_, client) = setup().await;
        let mut view = DiscussionView::new(&client, 1, SortMode::Newest);
        assert!(view.forest().is_empty());

        view.refresh().await.unwrap();
        assert_eq!(ids(view.forest()), vec![2, 1]);
        assert_eq!(ids(&view.forest()[1].replies), vec![4, 3]);
        assert_eq!(view.comment_count(), 4);
    }

    #[tokio::test]
    async fn test_set_sort_does_not_fetch() {
        let (server, client) = setup().await;
        let mut view = DiscussionView::new(&client, 1, SortMode::Newest);
        view.refresh().await.unwrap();
        let fetches = server.fetches.load(Ordering::SeqCst);

        view.set_sort(SortMode::MostVoted);

        assert_eq!(view.sort_mode(), SortMode::MostVoted);
        assert_eq!(ids(view.forest()), vec![1, 2]);
        assert_eq!(ids(&view.forest()[0].replies), vec![4, 3]);
        assert_eq!(server.fetches.load(Ordering::SeqCst), fetches);
    }

    #[tokio::test]
    async fn test_mutations_refetch() {
        let (server, client) = setup().await;
        let mut view = DiscussionView::new(&client, 1, SortMode::MostVoted);
        view.refresh().await.unwrap();

        view.reply(2, "a reply").await.unwrap();
        assert_eq!(view.forest()[1].replies.len(), 1);
        assert_eq!(view.forest()[1].replies[0].comment.content, "a reply");

        view.vote(2, VoteType::Upvote).await.unwrap();
        view.vote(2, VoteType::Upvote).await.unwrap();
        // the fake server counts every vote, so comment 2 now has 2 upvotes
        assert_eq!(view.forest()[1].comment.upvotes, 2);

        view.comment("top level").await.unwrap();
        assert_eq!(view.forest().len(), 3);

        view.delete(1).await.unwrap();
        // 3 and 4 are left without a parent and drop out of the view
        assert_eq!(view.comment_count(), 3);
        assert!(server.fetches.load(Ordering::SeqCst) >= 5);
    }
}
