//! A typed client for the discussion endpoints, for frontends and tools that
//! talk to a StudyHub server.

use std::{sync::Arc, time::Duration};

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use url::Url;

use crate::{
    discussion::models::comment_vote::VoteType,
    thread::{self, Comment, CommentNode, SortMode},
};

pub mod poll;
pub mod view;

pub use view::DiscussionView;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Where to reach the server and who is asking. Passed explicitly to
/// everything that talks to the server.
#[derive(Clone, Debug)]
pub struct Session {
    pub base_url: Url,
    pub token: Option<String>,
}

impl Session {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // so that `join` appends instead of replacing the last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Session {
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Serialize)]
struct NewComment<'a> {
    content: &'a str,
    parent_comment_id: Option<i32>,
}

#[derive(Serialize)]
struct Vote {
    vote_type: VoteType,
}

#[derive(Serialize)]
struct EditComment<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StudyHubClient {
    http: reqwest::Client,
    session: Session,
}

impl StudyHubClient {
    pub fn new(session: Session) -> Self {
        StudyHubClient {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.session.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.session.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.msg)
            .unwrap_or(text);

        tracing::debug!(%status, %message, "StudyHub request failed");
        Err(ClientError::Status { status, message })
    }

    async fn send_json<T: DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        Ok(Self::send(builder).await?.json().await?)
    }

    /// The flat comment list of a discussion.
    pub async fn comments(&self, discussion_id: i32) -> Result<Vec<Comment>, ClientError> {
        let builder = self.request(
            Method::GET,
            &format!("api/v1/discussions/{discussion_id}/comments"),
        )?;
        Self::send_json(builder).await
    }

    /// Fetches the flat list and assembles it locally.
    pub async fn thread(
        &self,
        discussion_id: i32,
        sort: SortMode,
    ) -> Result<Vec<CommentNode>, ClientError> {
        Ok(thread::build(self.comments(discussion_id).await?, sort))
    }

    pub async fn create_comment(
        &self,
        discussion_id: i32,
        content: &str,
        parent_comment_id: Option<i32>,
    ) -> Result<Comment, ClientError> {
        let builder = self
            .request(
                Method::POST,
                &format!("api/v1/discussions/{discussion_id}/comments"),
            )?
            .json(&NewComment {
                content,
                parent_comment_id,
            });
        Self::send_json(builder).await
    }

    pub async fn edit_comment(&self, comment_id: i32, content: &str) -> Result<Comment, ClientError> {
        let builder = self
            .request(Method::PATCH, &format!("api/v1/comments/{comment_id}"))?
            .json(&EditComment { content });
        Self::send_json(builder).await
    }

    pub async fn vote(&self, comment_id: i32, vote_type: VoteType) -> Result<Comment, ClientError> {
        let builder = self
            .request(Method::POST, &format!("api/v1/comments/{comment_id}/vote"))?
            .json(&Vote { vote_type });
        Self::send_json(builder).await
    }

    pub async fn delete_comment(&self, comment_id: i32) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("api/v1/comments/{comment_id}"))?;
        Self::send(builder).await?;
        Ok(())
    }
}

/// Re-fetches a discussion's thread every `period` and publishes it on the
/// returned channel. Failed fetches are logged and leave the last thread in
/// place. Polling stops when the handle is cancelled or dropped.
pub fn watch_thread(
    client: Arc<StudyHubClient>,
    discussion_id: i32,
    sort: SortMode,
    period: Duration,
) -> (watch::Receiver<Vec<CommentNode>>, poll::PollHandle) {
    let (tx, rx) = watch::channel(vec![]);
    let tx = Arc::new(tx);

    let handle = poll::every(period, move || {
        let client = client.clone();
        let tx = tx.clone();
        async move {
            match client.thread(discussion_id, sort).await {
                Ok(forest) => {
                    tx.send_replace(forest);
                }
                Err(e) => {
                    tracing::warn!(error = %e, discussion_id, "Failed to refresh discussion");
                }
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::{
        net::SocketAddr,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        routing::{delete, get, post},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use crate::thread::Comment;

    /// An in-memory stand-in for the discussion endpoints of one discussion.
    #[derive(Clone, Default)]
    pub struct FakeServer {
        pub comments: Arc<Mutex<Vec<Comment>>>,
        pub fetches: Arc<AtomicUsize>,
    }

    pub fn comment(id: i32, parent: Option<i32>, upvotes: i32, day: u32) -> Comment {
        Comment {
            id,
            discussion_id: 1,
            author_id: 1,
            parent_comment_id: parent,
            content: format!("comment {id}"),
            author_username: "ada".into(),
            author_full_name: "Ada Lovelace".into(),
            author_profile_image: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            updated_at: None,
            upvotes,
            downvotes: 0,
        }
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h == "Bearer secret")
    }

    fn unauthorized() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "UNAUTHORIZED", "msg": "no session" })),
        )
    }

    async fn list(
        State(s): State<FakeServer>,
        Path(id): Path<i32>,
    ) -> Result<Json<Vec<Comment>>, (StatusCode, Json<Value>)> {
        s.fetches.fetch_add(1, Ordering::SeqCst);
        if id != 1 {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "code": "NOT_FOUND", "msg": "Discussion not found" })),
            ));
        }
        Ok(Json(s.comments.lock().unwrap().clone()))
    }

    async fn create(
        State(s): State<FakeServer>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<(StatusCode, Json<Comment>), (StatusCode, Json<Value>)> {
        if !authorized(&headers) {
            return Err(unauthorized());
        }
        let mut comments = s.comments.lock().unwrap();
        let id = comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let mut c = comment(id, body["parent_comment_id"].as_i64().map(|p| p as i32), 0, 20);
        c.content = body["content"].as_str().unwrap_or_default().to_owned();
        comments.push(c.clone());
        Ok((StatusCode::CREATED, Json(c)))
    }

    async fn vote(
        State(s): State<FakeServer>,
        headers: HeaderMap,
        Path(id): Path<i32>,
        Json(body): Json<Value>,
    ) -> Result<Json<Comment>, (StatusCode, Json<Value>)> {
        if !authorized(&headers) {
            return Err(unauthorized());
        }
        let mut comments = s.comments.lock().unwrap();
        let c = comments.iter_mut().find(|c| c.id == id).unwrap();
        match body["vote_type"].as_str() {
            Some("upvote") => c.upvotes += 1,
            _ => c.downvotes += 1,
        }
        Ok(Json(c.clone()))
    }

    async fn remove(
        State(s): State<FakeServer>,
        headers: HeaderMap,
        Path(id): Path<i32>,
    ) -> Result<StatusCode, (StatusCode, Json<Value>)> {
        if !authorized(&headers) {
            return Err(unauthorized());
        }
        s.comments.lock().unwrap().retain(|c| c.id != id);
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn spawn(server: FakeServer) -> SocketAddr {
        let app = Router::new()
            .route("/api/v1/discussions/{id}/comments", get(list).post(create))
            .route("/api/v1/comments/{id}/vote", post(vote))
            .route("/api/v1/comments/{id}", delete(remove))
            .with_state(server);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::test_server::{FakeServer, comment, spawn};

    async fn client_for(server: FakeServer, token: Option<&str>) -> StudyHubClient {
        let addr = spawn(server).await;
        let mut session = Session::new(&format!("http://{addr}")).unwrap();
        if let Some(token) = token {
            session = session.with_token(token);
        }
        StudyHubClient::new(session)
    }

    #[test]
    fn test_session_base_url_keeps_prefix() {
        let session = Session::new("https://studyhub.test/backend").unwrap();
        assert_eq!(
            session.base_url.join("api/v1/comments/1").unwrap().as_str(),
            "https://studyhub.test/backend/api/v1/comments/1"
        );
        assert!(Session::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_thread_is_assembled_locally() {
        let server = FakeServer::default();
        *server.comments.lock().unwrap() = vec![
            comment(1, None, 0, 1),
            comment(2, Some(1), 3, 2),
            comment(3, None, 1, 3),
            comment(4, Some(999), 9, 4),
        ];
        let client = client_for(server, None).await;

        let forest = client.thread(1, SortMode::MostVoted).await.unwrap();
        let roots: Vec<i32> = forest.iter().map(|n| n.comment.id).collect();
        assert_eq!(roots, vec![3, 1]);
        assert_eq!(forest[1].replies[0].comment.id, 2);
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let client = client_for(FakeServer::default(), None).await;

        match client.comments(2).await {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Discussion not found");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mutations_send_bearer_token() {
        let server = FakeServer::default();
        *server.comments.lock().unwrap() = vec![comment(1, None, 0, 1)];

        let anonymous = client_for(server.clone(), None).await;
        assert!(matches!(
            anonymous.vote(1, VoteType::Upvote).await,
            Err(ClientError::Status { status: StatusCode::UNAUTHORIZED, .. })
        ));

        let client = client_for(server.clone(), Some("secret")).await;
        let voted = client.vote(1, VoteType::Upvote).await.unwrap();
        assert_eq!(voted.upvotes, 1);

        let reply = client.create_comment(1, "me too", Some(1)).await.unwrap();
        assert_eq!(reply.parent_comment_id, Some(1));
        assert_eq!(reply.content, "me too");

        client.delete_comment(reply.id).await.unwrap();
        assert_eq!(server.comments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_watch_thread_publishes_and_stops() {
        let server = FakeServer::default();
        *server.comments.lock().unwrap() = vec![comment(1, None, 0, 1)];
        let client = Arc::new(client_for(server.clone(), None).await);

        let (mut rx, handle) =
            watch_thread(client, 1, SortMode::Newest, Duration::from_millis(20));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        server.comments.lock().unwrap().push(comment(2, None, 0, 2));
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                rx.changed().await.unwrap();
                if rx.borrow_and_update().len() == 2 {
                    break;
                }
            }
        })
        .await
        .expect("the second comment should show up");

        handle.cancel().await;
        // a request aborted mid-flight may still land on the server
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fetches = server.fetches.load(std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            server.fetches.load(std::sync::atomic::Ordering::SeqCst),
            fetches,
            "No fetches after cancellation"
        );
    }
}
