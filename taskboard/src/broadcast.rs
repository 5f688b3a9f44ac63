//! Change broadcasting
//!
//! Every board has one topic. Committed changes are published to it in
//! commit order and fan out to every subscriber of that board. Publishing
//! never blocks the committer: a slow subscriber that falls more than the
//! channel capacity behind observes a lag error and must refetch.

use crate::error::{BoardError, Result};
use crate::types::{BoardEvent, BoardId};
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Sink for committed board events
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: BoardEvent);
}

/// In-process topic per board backed by a tokio broadcast channel
pub struct ChangeBroadcaster {
    topics: DashMap<BoardId, broadcast::Sender<BoardEvent>>,
    capacity: usize,
}

impl ChangeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, board_id: &BoardId) -> broadcast::Sender<BoardEvent> {
        self.topics
            .entry(board_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Subscribe to a board topic without any permission check.
    ///
    /// Callers outside the engine go through `BoardContext::subscribe`,
    /// which authorizes the user first.
    pub fn subscribe_topic(&self, board_id: &BoardId) -> Subscription {
        Subscription {
            board_id: board_id.clone(),
            receiver: self.sender(board_id).subscribe(),
        }
    }

    /// Drop a board's topic. Subscribers drain what is buffered and then
    /// see [`BoardError::SubscriptionClosed`].
    pub fn close_topic(&self, board_id: &BoardId) -> bool {
        let closed = self.topics.remove(board_id).is_some();
        if closed {
            tracing::debug!(%board_id, "topic closed");
        }
        closed
    }

    /// Number of live subscribers on a board topic
    pub fn subscriber_count(&self, board_id: &BoardId) -> usize {
        self.topics
            .get(board_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(crate::config::BoardConfig::default().broadcast_capacity)
    }
}

impl EventPublisher for ChangeBroadcaster {
    fn publish(&self, event: BoardEvent) {
        let board_id = event.board_id.clone();
        let sequence = event.sequence;
        match self.sender(&board_id).send(event) {
            Ok(receivers) => {
                tracing::trace!(%board_id, sequence, receivers, "event published");
            }
            Err(_) => {
                tracing::trace!(%board_id, sequence, "event published with no subscribers");
            }
        }
    }
}

/// Receiving end of a board topic
#[derive(Debug)]
pub struct Subscription {
    board_id: BoardId,
    receiver: broadcast::Receiver<BoardEvent>,
}

impl Subscription {
    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// Wait for the next event.
    ///
    /// A lagged subscriber gets [`BoardError::SubscriptionLagged`] once and
    /// then resumes from the oldest event still buffered.
    pub async fn recv(&mut self) -> Result<BoardEvent> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(board_id = %self.board_id, skipped, "subscriber lagged");
                Err(BoardError::SubscriptionLagged {
                    board_id: self.board_id.to_string(),
                    skipped,
                })
            }
            Err(broadcast::error::RecvError::Closed) => Err(BoardError::SubscriptionClosed {
                board_id: self.board_id.to_string(),
            }),
        }
    }

    /// Next buffered event, if any
    pub fn try_recv(&mut self) -> Result<Option<BoardEvent>> {
        use broadcast::error::TryRecvError;
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Lagged(skipped)) => Err(BoardError::SubscriptionLagged {
                board_id: self.board_id.to_string(),
                skipped,
            }),
            Err(TryRecvError::Closed) => Err(BoardError::SubscriptionClosed {
                board_id: self.board_id.to_string(),
            }),
        }
    }
}
