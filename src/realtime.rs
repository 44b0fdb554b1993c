// In-process change feed for comments and votes. Writers publish after the
// row change commits; subscribers hold a filtered handle onto a shared
// broadcast channel. Dropping (or closing) the handle unsubscribes. There
// is no replay and no reconnect: a lagged subscriber skips what it missed.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::db::models::{Comment, CommentVote};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct CommentEvent {
    pub review_id: String,
    pub comment: Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One insert/update/delete on a comment's votes, with the old and new
/// row state where each exists.
#[derive(Debug, Clone, Serialize)]
pub struct VoteEvent {
    pub comment_id: String,
    pub kind: ChangeKind,
    pub old: Option<CommentVote>,
    pub new: Option<CommentVote>,
}

#[derive(Clone)]
pub struct EventHub {
    comments: broadcast::Sender<CommentEvent>,
    votes: broadcast::Sender<VoteEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (comments, _) = broadcast::channel(capacity);
        let (votes, _) = broadcast::channel(capacity);
        Self { comments, votes }
    }

    /// Publishing with no subscribers is a no-op.
    pub fn publish_comment(&self, event: CommentEvent) {
        let _ = self.comments.send(event);
    }

    pub fn publish_vote(&self, event: VoteEvent) {
        let _ = self.votes.send(event);
    }

    /// Live feed of comments inserted on one review.
    pub fn subscribe_review_comments(&self, review_id: &str) -> CommentFeed {
        CommentFeed {
            review_id: review_id.to_string(),
            rx: self.comments.subscribe(),
        }
    }

    /// Live feed of vote changes on one comment.
    pub fn subscribe_comment_votes(&self, comment_id: &str) -> VoteFeed {
        VoteFeed {
            comment_id: comment_id.to_string(),
            rx: self.votes.subscribe(),
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

pub struct CommentFeed {
    review_id: String,
    rx: broadcast::Receiver<CommentEvent>,
}

impl CommentFeed {
    /// Next comment inserted on the subscribed review, or `None` once the
    /// hub has shut down.
    pub async fn recv(&mut self) -> Option<Comment> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.review_id == self.review_id => return Some(event.comment),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicit teardown; equivalent to dropping the handle.
    pub fn close(self) {}
}

pub struct VoteFeed {
    comment_id: String,
    rx: broadcast::Receiver<VoteEvent>,
}

impl VoteFeed {
    /// Next vote change on the subscribed comment, or `None` once the hub
    /// has shut down.
    pub async fn recv(&mut self) -> Option<VoteEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.comment_id == self.comment_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn close(self) {}
}
