//! Background sync triggers: periodic timer and came-back-online listener

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, error, info};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::connectivity::ConnectivityMonitor;
use super::coordinator::{SyncCoordinator, SyncOutcome};
use super::remote::RemoteStore;

/// Handles for the background tasks
struct ManagerTasks {
    timer: JoinHandle<()>,
    online_listener: JoinHandle<()>,
    reachability: Option<JoinHandle<()>>,
}

/// Periodic reachability check that feeds a connectivity monitor
struct ReachabilityCheck {
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteStore>,
    period: Duration,
}

/// Runs sync cycles on a timer and whenever connectivity returns
///
/// Both triggers go through the coordinator's in-flight guard, so a tick
/// that fires during a running cycle is dropped.
pub struct SyncManager {
    coordinator: Arc<SyncCoordinator>,
    online: watch::Receiver<bool>,
    reachability: Option<ReachabilityCheck>,
    tasks: Mutex<Option<ManagerTasks>>,
}

impl SyncManager {
    /// Create a stopped manager
    ///
    /// `online` is usually [`ConnectivityMonitor::subscribe`](super::ConnectivityMonitor::subscribe).
    pub fn new(coordinator: Arc<SyncCoordinator>, online: watch::Receiver<bool>) -> Self {
        Self {
            coordinator,
            online,
            reachability: None,
            tasks: Mutex::new(None),
        }
    }

    /// Also poll `remote` every `period` and publish the result to `monitor`
    ///
    /// A check that finds the remote again after an outage flips the monitor
    /// online, which wakes the online listener.
    pub fn with_reachability_check(
        mut self,
        monitor: Arc<ConnectivityMonitor>,
        remote: Arc<dyn RemoteStore>,
        period: Duration,
    ) -> Self {
        self.reachability = Some(ReachabilityCheck {
            monitor,
            remote,
            period,
        });
        self
    }

    /// Start the timer and online listener on the given runtime
    ///
    /// The timer's first tick fires immediately, giving one startup cycle.
    /// Returns false (and spawns nothing) if already running.
    pub fn start(&self, runtime: &Handle) -> bool {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.is_some() {
            debug!("Sync manager already running");
            return false;
        }

        let period = self.coordinator.options().interval;
        let timer = runtime.spawn(run_timer(self.coordinator.clone(), period));
        let online_listener =
            runtime.spawn(run_online_listener(self.coordinator.clone(), self.online.clone()));

        let reachability = self.reachability.as_ref().map(|check| {
            runtime.spawn(run_reachability_check(
                check.monitor.clone(),
                check.remote.clone(),
                check.period,
            ))
        });

        *tasks = Some(ManagerTasks {
            timer,
            online_listener,
            reachability,
        });
        info!("Sync manager started (interval {:?})", period);
        true
    }

    /// Cancel the timer and online listener
    ///
    /// A cycle already executing finishes on the blocking pool.
    /// Returns false if the manager was not running.
    pub fn stop(&self) -> bool {
        let Some(tasks) = self.tasks.lock().unwrap().take() else {
            return false;
        };
        tasks.timer.abort();
        tasks.online_listener.abort();
        if let Some(check) = tasks.reachability {
            check.abort();
        }
        info!("Sync manager stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().unwrap().is_some()
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }
}

impl Drop for SyncManager {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(coordinator: Arc<SyncCoordinator>, period: Duration) {
    // tokio::time::interval panics on a zero period
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        run_cycle(&coordinator).await;
    }
}

async fn run_online_listener(coordinator: Arc<SyncCoordinator>, mut online: watch::Receiver<bool>) {
    let mut was_online = *online.borrow_and_update();

    while online.changed().await.is_ok() {
        let is_online = *online.borrow_and_update();
        if is_online && !was_online {
            info!("Device back online, triggering sync");
            run_cycle(&coordinator).await;
        }
        was_online = is_online;
    }
}

async fn run_reachability_check(
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteStore>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let remote = remote.clone();
        match tokio::task::spawn_blocking(move || remote.is_reachable()).await {
            Ok(reachable) => monitor.set_online(reachable),
            Err(e) => error!("Reachability check task failed: {}", e),
        }
    }
}

/// Run one blocking sync cycle off the async workers
async fn run_cycle(coordinator: &Arc<SyncCoordinator>) -> Option<SyncOutcome> {
    let coordinator = coordinator.clone();
    match tokio::task::spawn_blocking(move || coordinator.sync_vocabularies()).await {
        Ok(outcome) => {
            debug!("Background sync: {}", outcome.user_message());
            Some(outcome)
        }
        Err(e) => {
            error!("Background sync task failed: {}", e);
            None
        }
    }
}
