//! Asynchronous post-write event dispatch.
//!
//! The engine hands a `DispatchBatch` to an `EventPublisher` after every persisted
//! transition. A background `VoteEventDispatcher` task resyncs the item in the
//! search index once per batch, then emits each event through the notifier.
//! Collaborator failures are logged and dropped; they never reach the voter.
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use vote_ledger_shared::types::{ScoredItem, VoteEvent};

use crate::collaborators::{Notifier, SearchIndexer};

/// The events produced by one transition, with the item as it stands afterwards.
#[derive(Debug, Clone)]
pub struct DispatchBatch {
    pub item: ScoredItem,
    pub events: Vec<VoteEvent>,
}

/// Sending half of the dispatch channel.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: mpsc::Sender<DispatchBatch>,
}

impl EventPublisher {
    /// Queues a batch without waiting.
    ///
    /// # Returns
    ///
    /// `true` if the batch was queued. A full or closed channel is logged and the
    /// batch is dropped.
    pub fn publish(&self, batch: DispatchBatch) -> bool {
        let item_id = batch.item.id;
        match self.sender.try_send(batch) {
            Ok(()) => true,
            Err(TrySendError::Full(batch)) => {
                warn!(
                    item_id = %item_id,
                    events = batch.events.len(),
                    "Vote event channel full, dropping batch"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(item_id = %item_id, "Vote event dispatcher stopped, dropping batch");
                false
            }
        }
    }
}

/// Delivers vote events to the search index and notification collaborators.
pub struct VoteEventDispatcher {
    search_indexer: Arc<dyn SearchIndexer>,
    notifier: Arc<dyn Notifier>,
}

impl VoteEventDispatcher {
    pub fn new(search_indexer: Arc<dyn SearchIndexer>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            search_indexer,
            notifier,
        }
    }

    /// Starts the dispatcher on the current runtime.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the channel between publisher and dispatcher
    ///
    /// # Returns
    ///
    /// The publisher to hand to the engine and the dispatcher task handle. The task
    /// ends once every publisher clone has been dropped and the queue is drained.
    pub fn spawn(self, buffer_size: usize) -> (EventPublisher, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let handle = tokio::spawn(self.run(receiver));
        (EventPublisher { sender }, handle)
    }

    /// Processes batches until the channel closes.
    pub async fn run(self, mut receiver: mpsc::Receiver<DispatchBatch>) {
        info!("Vote event dispatcher started");
        let mut delivered: u64 = 0;
        while let Some(batch) = receiver.recv().await {
            self.dispatch(&batch).await;
            delivered += 1;
        }
        info!(batches = delivered, "Vote event dispatcher stopped");
    }

    /// Delivers one batch.
    #[instrument(skip(self, batch), fields(item_id = %batch.item.id, events = batch.events.len()))]
    pub async fn dispatch(&self, batch: &DispatchBatch) {
        if let Err(e) = self.search_indexer.resync_document(&batch.item).await {
            error!(error = %e, "Failed to resync search document");
        }

        for event in &batch.events {
            match self.notifier.emit(event.name(), &event.payload).await {
                Ok(()) => debug!(event = event.name(), "Vote event emitted"),
                Err(e) => error!(event = event.name(), error = %e, "Failed to emit vote event"),
            }
        }
    }
}
