//! Loading configuration files from disk.

use std::fs;

use biopac_lsl::config::BridgeConfig;
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_shipped_example_config_loads() {
    let config = BridgeConfig::load_from("config/config.example.toml").unwrap();

    config.validate().unwrap();
    assert!(!config.device.channels.is_empty());
    assert_eq!(config.sink.stream_name, "biopac");
}

#[test]
fn test_minimal_file_uses_defaults() {
    let (_dir, path) = write_config(
        r#"
        [device]
        channels = "1,2,3"
        "#,
    );

    let config = BridgeConfig::load_from(&path).unwrap();

    assert_eq!(config.device.channels, vec![1, 2, 3]);
    assert!(config.device.digital_channels.is_empty());
    assert_eq!(config.device.sampletime, 1.0);
    assert!(config.device.dll_dir.is_none());
    assert_eq!(config.logging.level, "info");

    let settings = config.acquisition_settings();
    assert_eq!(settings.channels.sample_len(), 3);
}

#[test]
fn test_dll_dir_is_kept_verbatim() {
    let (_dir, path) = write_config(
        r#"
        [device]
        dll_dir = "C:/Program Files/BIOPAC Systems, Inc/BIOPAC Hardware API 2.2 Research"
        channels = [1]
        digital_channels = 4
        "#,
    );

    let config = BridgeConfig::load_from(&path).unwrap();

    assert_eq!(
        config.device.dll_dir.unwrap().to_string_lossy(),
        "C:/Program Files/BIOPAC Systems, Inc/BIOPAC Hardware API 2.2 Research"
    );
    assert_eq!(config.device.digital_channels, vec![4]);
}

#[test]
fn test_missing_device_section_is_an_error() {
    let (_dir, path) = write_config(
        r#"
        [sink]
        stream_name = "ecg"
        "#,
    );

    let err = BridgeConfig::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("device"));
}

#[test]
fn test_malformed_channel_list_is_an_error() {
    let (_dir, path) = write_config(
        r#"
        [device]
        channels = "1,two"
        "#,
    );

    assert!(BridgeConfig::load_from(&path).is_err());
}
