//! Board context, sessions and transactions
//!
//! [`BoardContext`] bundles the store, the broadcaster and configuration.
//! Commands run against a [`Session`], which carries the authenticated user
//! and optionally the client connection that issued the request. Every
//! mutation happens inside a [`Transaction`]: the board lock is taken, the
//! latest committed state is loaded, the command edits it in memory, and
//! `commit_and_publish` saves and broadcasts before the lock is released.

use crate::broadcast::{ChangeBroadcaster, EventPublisher, Subscription};
use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::logging::Pretty;
use crate::policy::{self, Permission};
use crate::store::{BoardStore, LockOptions};
use crate::types::{
    AffectedState, BoardChange, BoardEvent, BoardId, BoardState, ClientId, ColumnId, TaskId,
    UserId,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use taskboard_operations::{ExecutionResult, LogEntry};

/// Shared handle to the engine's collaborators
pub struct BoardContext<S: BoardStore> {
    store: Arc<S>,
    broadcaster: Arc<ChangeBroadcaster>,
    publishers: Arc<Vec<Arc<dyn EventPublisher>>>,
    config: Arc<BoardConfig>,
}

impl<S: BoardStore> Clone for BoardContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            broadcaster: Arc::clone(&self.broadcaster),
            publishers: Arc::clone(&self.publishers),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: BoardStore> BoardContext<S> {
    pub fn new(store: S, config: BoardConfig) -> Self {
        Self {
            store: Arc::new(store),
            broadcaster: Arc::new(ChangeBroadcaster::new(config.broadcast_capacity)),
            publishers: Arc::new(Vec::new()),
            config: Arc::new(config),
        }
    }

    /// Forward committed events to an additional sink, e.g. a websocket relay
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        let mut publishers: Vec<_> = self.publishers.iter().cloned().collect();
        publishers.push(publisher);
        self.publishers = Arc::new(publishers);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn broadcaster(&self) -> &ChangeBroadcaster {
        &self.broadcaster
    }

    /// Start acting as `user_id`
    pub fn session(&self, user_id: impl Into<UserId>) -> Session<S> {
        Session {
            ctx: self.clone(),
            user_id: user_id.into(),
            client_id: None,
        }
    }

    /// Subscribe to a board topic; only users who may view the board can listen
    pub async fn subscribe(&self, board_id: &BoardId, user_id: &UserId) -> Result<Subscription> {
        let state = self.store.load(board_id).await?;
        policy::authorize(&state, user_id, Permission::View)?;
        let subscription = self.broadcaster.subscribe_topic(board_id);
        tracing::debug!(board_id = %board_id, user = %user_id, "subscribed to board");
        Ok(subscription)
    }

    fn publish(&self, event: BoardEvent) {
        for publisher in self.publishers.iter() {
            publisher.publish(event.clone());
        }
        self.broadcaster.publish(event);
    }
}

/// A user (and optionally one of their client connections) acting on boards
pub struct Session<S: BoardStore> {
    ctx: BoardContext<S>,
    user_id: UserId,
    client_id: Option<ClientId>,
}

impl<S: BoardStore> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            user_id: self.user_id.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

impl<S: BoardStore> Session<S> {
    /// Tag published events with the issuing client connection
    pub fn with_client(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn context(&self) -> &BoardContext<S> {
        &self.ctx
    }

    pub fn config(&self) -> &BoardConfig {
        self.ctx.config()
    }

    pub fn store(&self) -> &S {
        self.ctx.store()
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Actor recorded in the activity log: `user` or `user[client]`
    pub fn actor_label(&self) -> String {
        match &self.client_id {
            Some(client) => format!("{}[{}]", self.user_id, client),
            None => self.user_id.to_string(),
        }
    }

    /// Lock a board and load its latest committed state
    pub async fn begin(&self, board_id: &BoardId) -> Result<Transaction<'_, S>> {
        let options = LockOptions::from(self.config());
        let guard = self.store().lock_board(board_id, options).await?;
        let state = self.store().load(board_id).await?;
        tracing::trace!(board_id = %board_id, version = state.version, "transaction started");
        Ok(Transaction {
            session: self,
            guard,
            state,
        })
    }

    /// Read the latest committed state of a board the user may view
    pub async fn snapshot(&self, board_id: &BoardId) -> Result<BoardState> {
        let state = self.store().load(board_id).await?;
        policy::authorize(&state, &self.user_id, Permission::View)?;
        Ok(state)
    }

    /// Subscribe to a board and fetch its state.
    ///
    /// The subscription is opened before the snapshot is read, so every
    /// event after `snapshot.version` is delivered.
    pub async fn open(&self, board_id: &BoardId) -> Result<(BoardState, Subscription)> {
        let subscription = self.ctx.subscribe(board_id, &self.user_id).await?;
        let state = self.snapshot(board_id).await?;
        Ok((state, subscription))
    }

    /// Board currently holding a task
    pub async fn locate_task(&self, task_id: &TaskId) -> Result<BoardId> {
        self.store()
            .locate_task(task_id)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound {
                id: task_id.to_string(),
            })
    }

    /// Board currently holding a column
    pub async fn locate_column(&self, column_id: &ColumnId) -> Result<BoardId> {
        self.store()
            .locate_column(column_id)
            .await?
            .ok_or_else(|| BoardError::ColumnNotFound {
                id: column_id.to_string(),
            })
    }
}

/// Exclusive read-modify-write of one board
pub struct Transaction<'a, S: BoardStore> {
    session: &'a Session<S>,
    guard: S::Guard,
    state: BoardState,
}

impl<S: BoardStore> Transaction<'_, S> {
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BoardState {
        &mut self.state
    }

    /// Fail unless the session user holds `permission` on this board
    pub fn authorize(&self, permission: Permission) -> Result<()> {
        policy::authorize(&self.state, &self.session.user_id, permission)
    }

    /// Save the state under a new version and publish the change.
    ///
    /// The event goes out while the lock is still held, so per board the
    /// broadcast order equals the commit order and `sequence == version`.
    pub async fn commit_and_publish(mut self, change: BoardChange) -> Result<AffectedState> {
        self.state.check_density()?;
        self.state.version += 1;
        self.session.store().save(&self.state, &self.guard).await?;

        let affected = AffectedState {
            board_id: self.state.board.id.clone(),
            version: self.state.version,
            change,
        };
        let event = BoardEvent::from_affected(&affected, self.session.client_id.clone());

        tracing::info!(
            board_id = %affected.board_id,
            version = affected.version,
            event = affected.change.event_name(),
            user = %self.session.user_id,
            "committed"
        );
        tracing::debug!("change: {}", Pretty(&affected.change));

        self.session.ctx.publish(event);
        drop(self.guard);
        Ok(affected)
    }

    /// Save a change that does not alter any ordering and is not broadcast
    pub async fn commit(self) -> Result<BoardState> {
        self.state.check_density()?;
        self.session.store().save(&self.state, &self.guard).await?;
        tracing::info!(
            board_id = %self.state.board.id,
            version = self.state.version,
            user = %self.session.user_id,
            "committed without event"
        );
        Ok(self.state)
    }

    /// Delete the board and close its topic, returning the final state
    pub async fn remove(self) -> Result<BoardState> {
        let board_id = self.state.board.id.clone();
        self.session.store().remove(&board_id, self.guard).await?;
        self.session.ctx.broadcaster.close_topic(&board_id);
        tracing::info!(
            board_id = %board_id,
            version = self.state.version,
            user = %self.session.user_id,
            "board deleted"
        );
        Ok(self.state)
    }
}

/// Wrap a command's outcome with its activity log entry
pub(crate) fn finish<T: Serialize>(
    op: String,
    input: Value,
    started: Instant,
    result: Result<T>,
) -> ExecutionResult<T, BoardError> {
    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(value) => {
            let output = serde_json::to_value(&value).unwrap_or(Value::Null);
            ExecutionResult::Logged {
                value,
                log_entry: LogEntry::new(op, input, output, None, duration_ms),
            }
        }
        Err(error) => {
            let message = error.to_string();
            ExecutionResult::Failed {
                error,
                log_entry: Some(LogEntry::failure(op, input, &message, duration_ms)),
            }
        }
    }
}
