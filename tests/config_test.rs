#[cfg(test)]
mod tests {
    use learnmate_progress::config::{LogFormat, ServiceConfig};
    use learnmate_progress::error::ErrorKind;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8001);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.data_path.ends_with("data/state.json"));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8001");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ServiceConfig::from_file(&dir.path().join("progress.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.toml");
        std::fs::write(&path, "port = 9100\ndata_path = \"/srv/progress/state.json\"\nlog_format = \"json\"\n").unwrap();

        let config = ServiceConfig::from_file(&path).unwrap().unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.data_path, PathBuf::from("/srv/progress/state.json"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unparseable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();

        let err = ServiceConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(lookup(&[
                ("PROGRESS_HOST", "127.0.0.1"),
                ("PORT", "7000"),
                ("PROGRESS_DATA_PATH", "/var/lib/progress/state.json"),
                ("PROGRESS_LOG_FORMAT", "JSON"),
                ("RUST_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:7000");
        assert_eq!(config.data_path, PathBuf::from("/var/lib/progress/state.json"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_progress_port_wins_over_port() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(lookup(&[("PORT", "7000"), ("PROGRESS_PORT", "7100")]))
            .unwrap();
        assert_eq!(config.port, 7100);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PROGRESS_PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(config.port, 8001);
    }
}
