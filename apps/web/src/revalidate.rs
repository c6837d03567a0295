//! # View Revalidation
//!
//! After a successful mutation the UI's cached views are stale. Actions
//! announce which ones through a [`Revalidator`]; the `/api/events` stream
//! forwards each announcement to connected browsers.
//!
//! ```text
//! add_sale ──► Revalidator::revalidate([dashboard, inventory, catalog, sales])
//!                    │ broadcast
//!        ┌───────────┼───────────┐
//!        ▼           ▼           ▼
//!     SSE tab 1   SSE tab 2    (none: dropped)
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// A cached UI view that can go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Inventory,
    Catalog,
    Sales,
}

impl View {
    /// Every view; book and sale mutations touch all of them.
    pub const ALL: [View; 4] = [View::Dashboard, View::Inventory, View::Catalog, View::Sales];
}

/// Fan-out of stale-view announcements.
#[derive(Debug, Clone)]
pub struct Revalidator {
    tx: broadcast::Sender<Vec<View>>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Revalidator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Revalidator { tx }
    }

    /// Marks `views` stale. Having no listeners is not an error.
    pub fn revalidate(&self, views: &[View]) {
        let listeners = self.tx.send(views.to_vec()).unwrap_or(0);
        debug!(?views, listeners, "Views revalidated");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<View>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_views() {
        let revalidator = Revalidator::new();
        let mut rx = revalidator.subscribe();

        revalidator.revalidate(&View::ALL);
        assert_eq!(rx.try_recv().unwrap(), View::ALL.to_vec());
    }

    #[test]
    fn test_revalidate_without_listeners() {
        Revalidator::new().revalidate(&[View::Sales]);
    }

    #[test]
    fn test_view_wire_names() {
        let json = serde_json::to_string(&View::ALL).unwrap();
        assert_eq!(json, r#"["dashboard","inventory","catalog","sales"]"#);
    }
}
