use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use framepump::config::read_config_file;
use framepump::{
    CliOverrides, FeedConfig, FeedError, InputSelect, IterationBudget, PixelFormat, ResultFormat,
};

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_every_field_from_the_config_file() {
    let file = write_config(
        r#"{
            "width": 720,
            "height": 480,
            "pixel_format": "i420",
            "detect_rate": 12,
            "count": -1,
            "directory": "/data/frames",
            "result_output": "/tmp/result.txt",
            "result_format": "json"
        }"#,
    );

    let parsed = read_config_file(file.path()).expect("read config");
    let cfg = FeedConfig::resolve(CliOverrides::default(), parsed).expect("resolve");

    assert_eq!(cfg.width, 720);
    assert_eq!(cfg.height, 480);
    assert_eq!(cfg.pixel_format, PixelFormat::I420);
    assert_eq!(cfg.detect_rate, 12);
    assert_eq!(cfg.count, Some(IterationBudget::Unbounded));
    assert_eq!(
        cfg.input,
        InputSelect::Directory(PathBuf::from("/data/frames"))
    );
    assert_eq!(cfg.result_output, Some(PathBuf::from("/tmp/result.txt")));
    assert_eq!(cfg.result_format, ResultFormat::Json);
}

#[test]
fn cli_values_override_the_file() {
    let file = write_config(r#"{ "detect_rate": 12, "directory": "/data/frames" }"#);

    let parsed = read_config_file(file.path()).expect("read config");
    let cli = CliOverrides {
        detect_rate: Some(30),
        // A CLI input selection replaces the file's directory entirely.
        path: Some(PathBuf::from("/data/one.yuv")),
        ..CliOverrides::default()
    };
    let cfg = FeedConfig::resolve(cli, parsed).expect("resolve");

    assert_eq!(cfg.detect_rate, 30);
    assert_eq!(cfg.input, InputSelect::File(PathBuf::from("/data/one.yuv")));
}

#[test]
fn malformed_config_file_is_a_config_error() {
    let file = write_config("{ not json");
    let err = read_config_file(file.path()).unwrap_err();
    assert!(matches!(err, FeedError::Config(_)));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let err = read_config_file(std::path::Path::new("/nonexistent/framepump.json")).unwrap_err();
    assert!(matches!(err, FeedError::Config(_)));
}
