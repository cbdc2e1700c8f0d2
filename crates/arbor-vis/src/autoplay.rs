//! Timer-driven auto-play on the tokio runtime.
//!
//! A single driver task owns the only timer. It sleeps until the
//! controller's pending tick is due, or until a command wakes it early, and
//! then re-reads the pending tick. Commands therefore cancel and reschedule
//! the timer just by changing the controller's state.

use std::sync::Arc;

use tokio::sync::{watch, Notify, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::replay::{Replay, ReplayCommand, ReplayStatus};

/// Shared replay controller with a background auto-play driver.
pub struct AutoPlay {
    replay: Arc<RwLock<Replay>>,
    wake: Arc<Notify>,
    revision: Arc<watch::Sender<u64>>,
    driver: JoinHandle<()>,
}

impl AutoPlay {
    /// Start driving `replay`. Must be called from within a tokio runtime.
    pub fn spawn(replay: Replay) -> Self {
        let replay = Arc::new(RwLock::new(replay));
        let wake = Arc::new(Notify::new());
        let (revision, _) = watch::channel(0u64);
        let revision = Arc::new(revision);

        let driver = tokio::spawn(drive(
            Arc::clone(&replay),
            Arc::clone(&wake),
            Arc::clone(&revision),
        ));

        Self {
            replay,
            wake,
            revision,
            driver,
        }
    }

    /// Read access to the controller.
    pub async fn read(&self) -> RwLockReadGuard<'_, Replay> {
        self.replay.read().await
    }

    /// Mutate the controller, then wake the driver and notify subscribers.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Replay) -> R) -> R {
        let result = {
            let mut replay = self.replay.write().await;
            f(&mut replay)
        };
        self.wake.notify_one();
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    /// Apply a user command and return the resulting status.
    pub async fn apply(&self, command: ReplayCommand) -> ReplayStatus {
        self.update(|replay| {
            replay.apply(command);
            replay.status()
        })
        .await
    }

    /// Current status.
    pub async fn status(&self) -> ReplayStatus {
        self.replay.read().await.status()
    }

    /// Receive a new revision number on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Latest revision number.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}

impl Drop for AutoPlay {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(replay: Arc<RwLock<Replay>>, wake: Arc<Notify>, revision: Arc<watch::Sender<u64>>) {
    loop {
        let pending = replay.read().await.pending();

        let Some(tick) = pending else {
            wake.notified().await;
            continue;
        };

        tokio::select! {
            _ = tokio::time::sleep(tick.delay) => {
                let fired = replay.write().await.on_tick(tick.id);
                if fired {
                    revision.send_modify(|rev| *rev += 1);
                }
            }
            _ = wake.notified() => {
                trace!(tick = tick.id.0, "pending tick superseded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn player(input: Vec<Option<i32>>, speed_ms: u64) -> AutoPlay {
        AutoPlay::spawn(Replay::new(input, Duration::from_millis(speed_ms)))
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_the_end_and_stops() {
        let player = player(vec![], 100);
        let status = player.apply(ReplayCommand::Toggle).await;
        assert!(status.is_playing);

        sleep(Duration::from_millis(150)).await;

        let replay = player.read().await;
        assert_eq!(replay.position(), 1);
        assert!(!replay.is_playing());
        assert!(replay.pending().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn advances_once_per_delay() {
        let player = player(vec![Some(1)], 100);
        player.apply(ReplayCommand::Toggle).await;

        sleep(Duration::from_millis(350)).await;
        assert_eq!(player.read().await.position(), 3);
        assert!(player.read().await.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn user_step_cancels_auto_play() {
        let player = player(vec![Some(1)], 100);
        player.apply(ReplayCommand::Toggle).await;

        sleep(Duration::from_millis(50)).await;
        let status = player.apply(ReplayCommand::Next).await;
        assert_eq!(status.position, 1);
        assert!(!status.is_playing);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(player.read().await.position(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_reschedules_pending_advance() {
        let player = player(vec![Some(1)], 1000);
        player.apply(ReplayCommand::Toggle).await;

        sleep(Duration::from_millis(100)).await;
        player.apply(ReplayCommand::Speed { millis: 50 }).await;

        // Advance now due 50ms after the speed change, not 1000ms after start.
        sleep(Duration::from_millis(60)).await;
        assert_eq!(player.read().await.position(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn data_change_stops_playback() {
        let player = player(vec![Some(1)], 100);
        player.apply(ReplayCommand::Toggle).await;
        sleep(Duration::from_millis(250)).await;

        let changed = player.update(|replay| replay.data_changed(&[Some(4), Some(5)])).await;
        assert!(changed);

        sleep(Duration::from_millis(500)).await;
        let replay = player.read().await;
        assert_eq!(replay.position(), 0);
        assert!(!replay.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_revisions() {
        let player = player(vec![Some(1)], 100);
        let mut updates = player.subscribe();

        player.apply(ReplayCommand::Next).await;
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow_and_update(), 1);

        // Auto-play ticks bump the revision too.
        player.apply(ReplayCommand::Toggle).await;
        updates.changed().await.unwrap();
        sleep(Duration::from_millis(150)).await;
        assert!(player.revision() >= 3);
    }
}
