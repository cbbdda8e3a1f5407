#[cfg(test)]
mod tests {
    use learnmate_progress::error::{ErrorKind, ProgressError};

    #[test]
    fn test_error_creation() {
        let error = ProgressError::new("Test error", ErrorKind::Io);
        assert_eq!(error.message, "Test error");
        assert_eq!(error.kind, ErrorKind::Io);
        assert!(error.context.is_none());
    }

    #[test]
    fn test_error_with_context() {
        let error = ProgressError::persistence("Disk full").with_context("path: \"/tmp/state.json\"");
        assert_eq!(error.kind, ErrorKind::Persistence);
        assert_eq!(error.context.unwrap(), "path: \"/tmp/state.json\"");
    }

    #[test]
    fn test_error_display() {
        let error = ProgressError::storage_corrupt("Failed to parse progress state")
            .with_context("path: state.json")
            .with_source("serde_json");
        let display = format!("{}", error);
        assert_eq!(
            display,
            "[storage_corrupt] Failed to parse progress state (context: path: state.json) (source: serde_json)"
        );
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ProgressError::storage_corrupt("bad").is_fatal());
        assert!(ProgressError::new("no bind", ErrorKind::Startup).is_fatal());
        assert!(!ProgressError::persistence("read-only").is_fatal());
    }

    #[test]
    fn test_json_error_is_storage_corrupt() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ProgressError::from(err);
        assert_eq!(error.kind, ErrorKind::StorageCorrupt);
        assert_eq!(error.source.as_deref(), Some("serde_json"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ProgressError::from(err);
        assert_eq!(error.kind, ErrorKind::Io);
        assert!(error.message.contains("denied"));
    }
}
