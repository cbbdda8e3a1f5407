use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{ErrorKind, ProgressError};
use crate::progress::clock::{Clock, SystemClock};
use crate::progress::model::{MasteryPoint, ProgressState, UpdateEvent};
use crate::progress::service;
use crate::progress::store::StateFile;

/// Lifecycle of the repository. `Ready` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryPhase {
    Uninitialized,
    Ready,
}

/// Result of applying an update.
///
/// A failed write-back does not roll the in-memory state back: the caller
/// still gets the updated state, tagged with the persistence error.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Persisted(ProgressState),
    Ephemeral {
        state: ProgressState,
        error: ProgressError,
    },
}

impl UpdateOutcome {
    pub fn state(&self) -> &ProgressState {
        match self {
            UpdateOutcome::Persisted(state) => state,
            UpdateOutcome::Ephemeral { state, .. } => state,
        }
    }

    pub fn into_state(self) -> ProgressState {
        match self {
            UpdateOutcome::Persisted(state) => state,
            UpdateOutcome::Ephemeral { state, .. } => state,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, UpdateOutcome::Persisted(_))
    }

    pub fn persist_error(&self) -> Option<&ProgressError> {
        match self {
            UpdateOutcome::Persisted(_) => None,
            UpdateOutcome::Ephemeral { error, .. } => Some(error),
        }
    }

    /// Strict view: a failed write-back becomes an error.
    pub fn into_result(self) -> Result<ProgressState, ProgressError> {
        match self {
            UpdateOutcome::Persisted(state) => Ok(state),
            UpdateOutcome::Ephemeral { error, .. } => Err(error),
        }
    }
}

/// Owner of the single progress record.
///
/// Every operation runs inside one lock scope, so an update's
/// read-modify-persist cannot interleave with reads or other updates.
pub struct Repository {
    file: StateFile,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<ProgressState>>,
}

impl Repository {
    pub fn new(file: StateFile, clock: Arc<dyn Clock>) -> Self {
        Repository {
            file,
            clock,
            state: Mutex::new(None),
        }
    }

    pub fn with_system_clock(file: StateFile) -> Self {
        Self::new(file, Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn phase(&self) -> RepositoryPhase {
        if self.state.lock().await.is_some() {
            RepositoryPhase::Ready
        } else {
            RepositoryPhase::Uninitialized
        }
    }

    /// Load the persisted record, seeding and persisting the default when none
    /// exists. No-op once the repository is `Ready`.
    pub async fn load(&self) -> Result<(), ProgressError> {
        let mut slot = self.state.lock().await;
        self.ensure_loaded(&mut slot).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<ProgressState, ProgressError> {
        let mut slot = self.state.lock().await;
        let state = self.ensure_loaded(&mut slot).await?;
        Ok(state.clone())
    }

    pub async fn timeline(&self) -> Result<Vec<MasteryPoint>, ProgressError> {
        let mut slot = self.state.lock().await;
        let state = self.ensure_loaded(&mut slot).await?;
        Ok(state.mastery_trend.clone())
    }

    /// Record a completed lesson stamped with the repository clock.
    pub async fn apply_update(&self, lesson_id: &str, delta: f64) -> Result<UpdateOutcome, ProgressError> {
        let event = UpdateEvent::new(lesson_id, delta, self.clock.now());
        self.apply_event(&event).await
    }

    pub async fn apply_event(&self, event: &UpdateEvent) -> Result<UpdateOutcome, ProgressError> {
        let mut slot = self.state.lock().await;
        let current = self.ensure_loaded(&mut slot).await?;

        let next = service::apply_update(current, event, self.clock.now());
        *current = next.clone();

        tracing::info!(
            lesson_id = %event.lesson_id,
            delta = event.delta,
            event_at = %event.timestamp,
            mastery = next.mastery,
            streak = next.streak,
            skills = next.skills.len(),
            "Progress update applied"
        );

        match self.file.write(&next).await {
            Ok(()) => Ok(UpdateOutcome::Persisted(next)),
            Err(error) => {
                tracing::warn!(
                    path = ?self.file.path(),
                    error = %error,
                    "Progress update kept in memory only"
                );
                Ok(UpdateOutcome::Ephemeral { state: next, error })
            }
        }
    }

    async fn ensure_loaded<'a>(
        &self,
        slot: &'a mut Option<ProgressState>,
    ) -> Result<&'a mut ProgressState, ProgressError> {
        if slot.is_none() {
            *slot = Some(self.read_or_seed().await?);
        }
        slot.as_mut()
            .ok_or_else(|| ProgressError::new("Progress state not loaded", ErrorKind::Startup))
    }

    async fn read_or_seed(&self) -> Result<ProgressState, ProgressError> {
        let path = self.file.path();
        match self.file.read().await? {
            Some(state) => {
                tracing::info!(
                    path = ?path,
                    mastery = state.mastery,
                    streak = state.streak,
                    "Progress state loaded"
                );
                Ok(state)
            }
            None => {
                let state = ProgressState::seeded(self.clock.now());
                self.file.write(&state).await?;
                tracing::info!(path = ?path, "No progress state found, seeded default");
                Ok(state)
            }
        }
    }
}
