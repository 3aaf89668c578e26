//! Driving a mounted panel through a script.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use facet_model::Tristate;
use facet_persist::Sinks;
use facet_state::{FilterPanel, PanelConfig};
use facet_sync::{Commit, StaggerRegistry, SyncCoordinator, SyncSettings, driver};

use crate::script::Script;

/// One fired commit, with times relative to the start of the replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub key: String,
    pub due_ms: u64,
    pub fired_ms: u64,
    pub entry: Tristate<String>,
}

impl CommitRecord {
    fn new(start: Instant, commit: &Commit) -> Self {
        Self {
            key: commit.key().to_string(),
            due_ms: millis_since(start, commit.deadline),
            fired_ms: millis_since(start, commit.fired_at),
            entry: commit.entry.clone(),
        }
    }
}

fn millis_since(start: Instant, at: Instant) -> u64 {
    u64::try_from(at.saturating_duration_since(start).as_millis()).unwrap_or(u64::MAX)
}

/// A panel, its coordinator and its sinks, advanced step by step.
#[derive(Debug)]
pub struct Replay {
    pub panel: FilterPanel,
    pub sinks: Sinks,
    pub commits: Vec<CommitRecord>,
    coordinator: SyncCoordinator,
    start: Instant,
}

impl Replay {
    pub fn mount(config: PanelConfig, sinks: Sinks, settings: SyncSettings) -> Result<Self> {
        let coordinator = SyncCoordinator::new(Arc::new(StaggerRegistry::new()), settings);
        let panel = FilterPanel::mount(config, &sinks, &coordinator).context("mount panel")?;
        Ok(Self {
            panel,
            sinks,
            commits: Vec::new(),
            coordinator,
            start: Instant::now(),
        })
    }

    /// Run the script on a virtual clock: no sleeping, deadlines are
    /// visited in order. Commits due after the last step stay pending.
    pub fn run_virtual(&mut self, script: &Script) -> Result<()> {
        for (index, step) in script.steps.iter().enumerate() {
            let at = self.start + Duration::from_millis(step.at_ms);
            self.fire_until(at);
            self.panel
                .dispatch(step.command.clone(), at, &mut self.coordinator, &mut self.sinks)
                .with_context(|| format!("step {index} at {}ms", step.at_ms))?;
        }
        Ok(())
    }

    /// Let every pending commit fire on the virtual clock.
    pub fn settle_virtual(&mut self) {
        while let Some(deadline) = self.coordinator.next_deadline() {
            self.fire_until(deadline);
        }
    }

    /// Run the script against the tokio clock. Commits due after the last
    /// step stay pending.
    pub async fn run_realtime(&mut self, script: &Script) -> Result<()> {
        self.start = driver::now();
        for (index, step) in script.steps.iter().enumerate() {
            let at = self.start + Duration::from_millis(step.at_ms);
            while self.coordinator.next_deadline().is_some_and(|deadline| deadline <= at) {
                for commit in driver::tick(&mut self.coordinator, &mut self.sinks).await {
                    self.record(&commit);
                }
            }
            tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
            self.panel
                .dispatch(
                    step.command.clone(),
                    driver::now(),
                    &mut self.coordinator,
                    &mut self.sinks,
                )
                .with_context(|| format!("step {index} at {}ms", step.at_ms))?;
        }
        Ok(())
    }

    /// Sleep through every pending deadline on the tokio clock.
    pub async fn settle_realtime(&mut self) {
        let start = self.start;
        let panel = &mut self.panel;
        let commits = &mut self.commits;
        driver::settle(&mut self.coordinator, &mut self.sinks, |commit| {
            panel.apply_commit(&commit);
            commits.push(CommitRecord::new(start, &commit));
        })
        .await;
    }

    /// Fire everything due at or before `at`.
    fn fire_until(&mut self, at: Instant) {
        while let Some(deadline) = self.coordinator.next_deadline().filter(|d| *d <= at) {
            for commit in self.coordinator.poll(deadline, &mut self.sinks) {
                self.record(&commit);
            }
        }
    }

    fn record(&mut self, commit: &Commit) {
        self.panel.apply_commit(commit);
        self.commits.push(CommitRecord::new(self.start, commit));
    }

    pub fn pending_len(&self) -> usize {
        self.coordinator.pending_len()
    }

    /// Cancel anything still pending, as if the page were closed.
    pub fn unmount(&mut self) -> usize {
        self.panel.unmount(&mut self.coordinator)
    }
}
