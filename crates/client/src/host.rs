//! Host environment seam.
//!
//! The controller never touches pages directly. Everything it needs from the
//! embedding environment (which pages are open, claiming them, posting
//! messages, surfacing notifications) goes through [`Host`].

use crate::lifecycle::WorkerMessage;
use crate::push::Notification;
use std::collections::BTreeMap;
use std::sync::Mutex;
use swcache_core::Error;
use tokio::sync::mpsc;

/// Identifier of an open page.
pub type PageId = u64;

/// Operations the embedding environment provides.
#[async_trait::async_trait]
pub trait Host: Send + Sync + 'static {
    /// Pages currently open under the controller's scope.
    async fn pages(&self) -> Vec<PageId>;

    /// Take control of every open page.
    async fn claim(&self) -> Result<(), Error>;

    /// Deliver a message to one page.
    async fn post_message(&self, page: PageId, message: &WorkerMessage) -> Result<(), Error>;

    /// Surface a user-visible notification.
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;
}

#[derive(Default)]
struct LocalHostState {
    next_id: PageId,
    pages: BTreeMap<PageId, mpsc::UnboundedSender<WorkerMessage>>,
    claimed: bool,
    notifications: Vec<Notification>,
}

/// In-process [`Host`] backed by channels.
///
/// Each opened page receives worker messages on its own channel. A page
/// whose receiver was dropped is treated as closed.
#[derive(Default)]
pub struct LocalHost {
    state: Mutex<LocalHostState>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocalHostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new page and return its message receiver.
    pub fn open_page(&self) -> (PageId, mpsc::UnboundedReceiver<WorkerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.pages.insert(id, tx);
        (id, rx)
    }

    pub fn close_page(&self, page: PageId) -> bool {
        self.lock().pages.remove(&page).is_some()
    }

    /// Whether [`Host::claim`] has been called.
    pub fn is_claimed(&self) -> bool {
        self.lock().claimed
    }

    /// Notifications shown so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }
}

#[async_trait::async_trait]
impl Host for LocalHost {
    async fn pages(&self) -> Vec<PageId> {
        let mut state = self.lock();
        state.pages.retain(|_, tx| !tx.is_closed());
        state.pages.keys().copied().collect()
    }

    async fn claim(&self) -> Result<(), Error> {
        self.lock().claimed = true;
        Ok(())
    }

    async fn post_message(&self, page: PageId, message: &WorkerMessage) -> Result<(), Error> {
        let mut state = self.lock();
        let Some(tx) = state.pages.get(&page) else {
            return Err(Error::InvalidInput(format!("page {page} is not open")));
        };
        if tx.send(message.clone()).is_err() {
            state.pages.remove(&page);
            return Err(Error::InvalidInput(format!("page {page} closed")));
        }
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, "showing notification");
        self.lock().notifications.push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_and_close_pages() {
        let host = LocalHost::new();
        let (a, _rx_a) = host.open_page();
        let (b, _rx_b) = host.open_page();
        assert_ne!(a, b);
        assert_eq!(host.pages().await, vec![a, b]);

        assert!(host.close_page(a));
        assert_eq!(host.pages().await, vec![b]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_closes_page() {
        let host = LocalHost::new();
        let (_a, rx) = host.open_page();
        drop(rx);
        assert!(host.pages().await.is_empty());
    }

    #[tokio::test]
    async fn test_post_message_delivers() {
        let host = LocalHost::new();
        let (page, mut rx) = host.open_page();
        host.post_message(page, &WorkerMessage::UpdateApplied).await.unwrap();
        assert_eq!(rx.recv().await, Some(WorkerMessage::UpdateApplied));

        assert!(host.post_message(page + 1, &WorkerMessage::UpdateApplied).await.is_err());
    }

    #[tokio::test]
    async fn test_claim() {
        let host = LocalHost::new();
        assert!(!host.is_claimed());
        host.claim().await.unwrap();
        assert!(host.is_claimed());
    }
}
