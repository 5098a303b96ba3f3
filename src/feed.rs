// src/feed.rs - Async frame feed owning a single session
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{CoachError, Result};
use crate::pose::Frame;
use crate::session::{FrameReport, Session, SessionSnapshot, TaggedFrame};

const COMMAND_BUFFER: usize = 64;
const REPORT_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub enum FeedCommand {
    Frame(TaggedFrame),
    Switch(String),
}

/// Hands frames to a task that owns the session, so they are applied one
/// at a time and in the order they were pushed.
pub struct SessionFeed {
    commands: mpsc::Sender<FeedCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    reports: broadcast::Sender<FrameReport>,
    task: JoinHandle<Session>,
}

impl SessionFeed {
    /// Must be called from within a tokio runtime.
    pub fn spawn(session: Session) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(session.snapshot());
        let (reports, _) = broadcast::channel(REPORT_BUFFER);

        debug!(session = %session.id(), "spawning session feed");
        let task = tokio::spawn(run(session, command_rx, snapshot_tx, reports.clone()));

        Self {
            commands,
            snapshots,
            reports,
            task,
        }
    }

    /// Queues a frame for the session that is current at the time of the
    /// call. Frames still queued when the exercise switches are dropped.
    pub async fn push(&self, frame: Frame, at: DateTime<Utc>) -> Result<()> {
        let session = self.snapshots.borrow().session_id;
        self.send(FeedCommand::Frame(TaggedFrame { session, frame, at }))
            .await
    }

    /// Switches exercise and waits until the new session is live.
    pub async fn switch(&mut self, exercise_id: &str) -> Result<SessionSnapshot> {
        let previous = self.snapshots.borrow().session_id;
        self.send(FeedCommand::Switch(exercise_id.to_string()))
            .await?;

        let snapshot = self
            .snapshots
            .wait_for(|snapshot| snapshot.session_id != previous)
            .await
            .map_err(|_| CoachError::FeedClosed)?;
        Ok(snapshot.clone())
    }

    /// Latest state published by the session task.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Per-frame reports from now on. Slow subscribers may lag.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameReport> {
        self.reports.subscribe()
    }

    /// Stops accepting frames, drains the queue and hands the session back.
    pub async fn finish(self) -> Result<Session> {
        let Self { commands, task, .. } = self;
        drop(commands);
        task.await.map_err(|_| CoachError::FeedClosed)
    }

    async fn send(&self, command: FeedCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoachError::FeedClosed)
    }
}

async fn run(
    mut session: Session,
    mut commands: mpsc::Receiver<FeedCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    reports: broadcast::Sender<FrameReport>,
) -> Session {
    while let Some(command) = commands.recv().await {
        match command {
            FeedCommand::Frame(tagged) => {
                if let Some(report) = session.on_tagged(tagged) {
                    // no subscribers is fine
                    let _ = reports.send(report);
                }
            }
            FeedCommand::Switch(exercise_id) => {
                session.switch_exercise(&exercise_id);
            }
        }
        snapshots.send_replace(session.snapshot());
    }

    debug!(session = %session.id(), "session feed closed");
    session
}
