use std::path::{Path, PathBuf};

use crate::error::ProgressError;
use crate::progress::model::ProgressState;

/// JSON file holding the single progress record.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        StateFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record.
    ///
    /// `Ok(None)` means nothing has been persisted yet. Anything present that
    /// cannot be read back as a `ProgressState` is a `StorageCorrupt` error.
    pub async fn read(&self) -> Result<Option<ProgressState>, ProgressError> {
        let path = &self.path;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str::<ProgressState>(&content)
                .map(Some)
                .map_err(|e| {
                    ProgressError::storage_corrupt(format!("Failed to parse progress state: {}", e))
                        .with_context(format!("path: {:?}", path))
                        .with_source("serde_json")
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProgressError::storage_corrupt(format!(
                "Failed to read progress state: {}",
                e
            ))
            .with_context(format!("path: {:?}", path))
            .with_source("std::io")),
        }
    }

    /// Persist the full record, creating parent directories on demand.
    ///
    /// The record is written to a sibling temp file and renamed over the old
    /// one, so a crash mid-write never leaves a truncated record behind.
    /// Non-finite numbers are refused: JSON would store them as `null` and the
    /// record could not be loaded again.
    pub async fn write(&self, state: &ProgressState) -> Result<(), ProgressError> {
        let path = &self.path;
        if let Some(field) = non_finite_field(state) {
            return Err(ProgressError::persistence(format!(
                "Refusing to persist non-finite {}",
                field
            ))
            .with_context(format!("path: {:?}", path)));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ProgressError::persistence(format!("Failed to create directory: {}", e))
                    .with_context(format!("path: {:?}", parent))
            })?;
        }

        let json = serde_json::to_string_pretty(state).map_err(|e| {
            ProgressError::persistence(format!("Failed to serialize progress state: {}", e))
                .with_source("serde_json")
        })?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            ProgressError::persistence(format!("Failed to write progress state: {}", e))
                .with_context(format!("path: {:?}", tmp_path))
        })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(ProgressError::persistence(format!(
                "Failed to replace progress state: {}",
                e
            ))
            .with_context(format!("path: {:?}", path)));
        }

        Ok(())
    }
}

fn non_finite_field(state: &ProgressState) -> Option<&'static str> {
    if !state.mastery.is_finite() {
        return Some("mastery");
    }
    if !state.lesson_completion_rate.is_finite() {
        return Some("lessonCompletionRate");
    }
    if state.skills.iter().any(|skill| !skill.level.is_finite()) {
        return Some("skill level");
    }
    if state.mastery_trend.iter().any(|point| !point.value.is_finite()) {
        return Some("masteryTrend value");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));

        assert!(file.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("data").join("state.json"));
        let state = ProgressState::seeded(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());

        file.write(&state).await.unwrap();

        assert_eq!(file.read().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn write_replaces_record_without_leaving_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "old contents").unwrap();
        let file = StateFile::new(&path);
        let state = ProgressState::seeded(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());

        file.write(&state).await.unwrap();

        assert_eq!(file.read().await.unwrap(), Some(state));
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[tokio::test]
    async fn non_finite_values_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let file = StateFile::new(&path);
        let seeded = ProgressState::seeded(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        file.write(&seeded).await.unwrap();

        let mut broken = seeded.clone();
        broken.lesson_completion_rate = f64::NEG_INFINITY;
        let err = file.write(&broken).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Persistence);
        assert!(err.message.contains("lessonCompletionRate"));
        assert_eq!(file.read().await.unwrap(), Some(seeded));
    }

    #[tokio::test]
    async fn garbage_is_storage_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = StateFile::new(&path).read().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::StorageCorrupt);
        assert!(err.context.unwrap().contains("state.json"));
    }
}
