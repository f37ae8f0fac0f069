//! Cross-tab relay over a shared broadcast channel.
//!
//! A [`SyncHub`] plays the role of a named broadcast channel shared by every
//! open tab. Each [`TabSync`] posts to the hub and fans incoming messages out
//! to its own local subscribers. A tab never receives its own messages.

use super::message::{SyncEnvelope, SyncMessage};
use chatstream_core::error::{ChatstreamError, Result};
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Local subscriber callback.
pub type SyncCallback = Arc<dyn Fn(&SyncMessage) + Send + Sync>;

/// Handle returned by [`TabSync::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// The shared medium every tab is attached to.
pub struct SyncHub {
    name: String,
    sender: broadcast::Sender<SyncEnvelope>,
}

impl SyncHub {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, Self::DEFAULT_CAPACITY)
    }

    /// Creates a hub whose per-tab backlog holds at most `capacity` messages
    /// (at least one). Slower tabs skip the oldest messages beyond that.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches a new tab. It receives every message posted after this call.
    pub fn open_tab(&self) -> Arc<TabSync> {
        let tab = TabSync {
            tab_id: Uuid::new_v4(),
            channel: self.name.clone(),
            sender: self.sender.clone(),
            receiver: Mutex::new(Some(self.sender.subscribe())),
            subscribers: RwLock::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        };

        tracing::debug!("Opened tab {} on channel '{}'", tab.tab_id, self.name);
        Arc::new(tab)
    }

    /// Returns the number of tabs with a live receiver.
    pub fn tab_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One tab's view of the hub.
pub struct TabSync {
    tab_id: Uuid,
    channel: String,
    sender: broadcast::Sender<SyncEnvelope>,
    receiver: Mutex<Option<broadcast::Receiver<SyncEnvelope>>>,
    subscribers: RwLock<BTreeMap<SubscriptionId, SyncCallback>>,
    next_subscription: AtomicU64,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl TabSync {
    pub fn tab_id(&self) -> Uuid {
        self.tab_id
    }

    /// Registers a local callback for messages from other tabs.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SyncMessage) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        id
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sends `message` to every other tab.
    ///
    /// # Errors
    ///
    /// Returns a channel error if this tab has been closed.
    pub fn post(&self, message: SyncMessage) -> Result<()> {
        if self.is_closed() {
            return Err(ChatstreamError::channel(format!(
                "tab {} on '{}' is closed",
                self.tab_id, self.channel
            )));
        }

        let envelope = SyncEnvelope::new(self.tab_id, message);
        if self.sender.send(envelope).is_err() {
            // Nobody is listening, same as posting to an empty channel.
            tracing::debug!("No receivers on channel '{}'", self.channel);
        }
        Ok(())
    }

    /// Delivers `envelope` to every local subscriber and returns how many
    /// callbacks completed.
    ///
    /// Callbacks run synchronously, in subscription order, outside the
    /// subscriber lock. A panicking callback is logged and skipped; the rest
    /// still receive the message.
    pub fn dispatch(&self, envelope: &SyncEnvelope) -> usize {
        if envelope.origin == self.tab_id || self.is_closed() {
            return 0;
        }

        let callbacks: Vec<(SubscriptionId, SyncCallback)> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, callback)| (*id, callback.clone()))
            .collect();

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(&envelope.message))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!(
                        "Subscriber {:?} on tab {} panicked while handling a sync message",
                        id,
                        self.tab_id
                    );
                }
            }
        }
        delivered
    }

    /// Receives messages from the hub and dispatches them until the tab is
    /// closed. Returns at once on a tab that is already closed.
    ///
    /// # Errors
    ///
    /// Returns a channel error if another `listen` call already owns the
    /// receiver.
    pub async fn listen(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        let mut receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| ChatstreamError::channel("tab is already listening"))?;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(envelope) => {
                        self.dispatch(&envelope);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Tab {} lagged behind on '{}', skipped {} message(s)",
                            self.tab_id,
                            self.channel,
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::debug!("Tab {} stopped listening", self.tab_id);
        Ok(())
    }

    /// Closes the tab: stops `listen`, drops all subscribers and rejects
    /// further posts.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.cancel();
        // A running `listen` owns the receiver and drops it on exit.
        if let Ok(mut receiver) = self.receiver.try_lock() {
            receiver.take();
        }
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
