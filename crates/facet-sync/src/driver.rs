//! Async driving of a coordinator on the tokio clock.

use facet_persist::Sinks;

use crate::coordinator::{Commit, SyncCoordinator};

/// Current time on the tokio clock, as a std instant.
///
/// Under a paused test runtime this follows the virtual clock.
pub fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

/// Sleep until the next pending deadline and fire what is due.
///
/// Returns the fired commits, or an empty list when nothing is armed.
pub async fn tick(coordinator: &mut SyncCoordinator, sinks: &mut Sinks) -> Vec<Commit> {
    let Some(deadline) = coordinator.next_deadline() else {
        return Vec::new();
    };
    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    coordinator.poll(now().max(deadline), sinks)
}

/// Keep firing commits until nothing is pending.
///
/// `on_commit` is the fire callback: it receives each commit after the
/// sinks were written, in firing order.
pub async fn settle<F>(coordinator: &mut SyncCoordinator, sinks: &mut Sinks, mut on_commit: F) -> usize
where
    F: FnMut(Commit),
{
    let mut fired = 0;
    while coordinator.pending_len() > 0 {
        for commit in tick(coordinator, sinks).await {
            fired += 1;
            on_commit(commit);
        }
    }
    tracing::debug!(fired, "coordinator settled");
    fired
}
