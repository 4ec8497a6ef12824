//! Network reachability signal for the sync engine

use tokio::sync::watch;

/// Reports whether the device currently has network access
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;

    /// Called when a sync cycle could not reach the remote
    fn report_unreachable(&self) {}
}

/// Connectivity that never reports offline
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Connectivity state shared between the sync engine and its triggers
///
/// Goes offline when a sync cycle reports the remote unreachable, or when
/// the host calls [`set_online`](Self::set_online) on a network change.
/// The sync manager's reachability check flips it back. Subscribers (the
/// sync manager) observe transitions.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Update the connectivity state; subscribers are only woken on change
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn report_unreachable(&self) {
        self.set_online(false);
    }
}
