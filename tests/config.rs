#[cfg(test)]
mod tests {
    use livelife::libs::config::{Config, LocationConfig, MonitorConfig};
    use livelife::libs::monitor::DEFAULT_CHECK_INTERVAL_MS;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("config.json");
            ConfigTestContext { _temp_dir: temp_dir, path }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_gives_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.monitor.unwrap_or_default().check_interval, DEFAULT_CHECK_INTERVAL_MS);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_saved_config_reads_back(ctx: &mut ConfigTestContext) {
        let config = Config {
            monitor: Some(MonitorConfig {
                check_interval: 120_000,
                input_events: false,
            }),
            location: Some(LocationConfig {
                latitude: Some(31.23),
                longitude: Some(121.47),
                ..Default::default()
            }),
        };
        config.save_to(&ctx.path).unwrap();

        let loaded = Config::read_from(&ctx.path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.location.unwrap().fixed_position(), Some((31.23, 121.47)));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_sections_are_optional(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.path, r#"{"monitor":{"check_interval":60000,"input_events":true}}"#).unwrap();

        let config = Config::read_from(&ctx.path).unwrap();
        assert_eq!(config.monitor.map(|m| m.check_interval), Some(60_000));
        assert!(config.location.is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_fields_take_defaults(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.path, r#"{"monitor":{"check_interval":60000},"location":{"latitude":31.23,"longitude":121.47}}"#).unwrap();

        let config = Config::read_from(&ctx.path).unwrap();
        let monitor = config.monitor.unwrap();
        assert_eq!(monitor.check_interval, 60_000);
        assert!(monitor.input_events);
        let location = config.location.unwrap();
        assert_eq!(location.fixed_position(), Some((31.23, 121.47)));
        assert_eq!(location.interval, LocationConfig::default().interval);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unreadable_config_is_an_error(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.path, "monitor = true").unwrap();
        assert!(Config::read_from(&ctx.path).is_err());
    }
}
