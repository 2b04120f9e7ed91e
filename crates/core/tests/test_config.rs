//! Tests for configuration parsing

use structlens_core::config::{CallgraphConfig, CONFIG_FILE_NAME};
use structlens_core::resolve::DEFAULT_IGNORED_CALLEES;
use structlens_core::{DiffFormat, ResolutionMode, StructlensConfig};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = StructlensConfig::default();
    assert!(!config.callgraph.light_mode);
    assert!(config.callgraph.ignored_callees.is_none());
    assert_eq!(config.diff.format, DiffFormat::Json);

    let ignore = config.callgraph.ignore_set();
    assert_eq!(ignore.len(), DEFAULT_IGNORED_CALLEES.len());
    assert!(ignore.contains("console.log"));
    assert!(ignore.contains("require"));
}

#[test]
fn test_empty_file_gives_defaults() {
    let config: StructlensConfig = toml::from_str("").unwrap();
    assert_eq!(config, StructlensConfig::default());
}

#[test]
fn test_serialize_config() {
    let config = StructlensConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("light_mode"));
    assert!(toml_str.contains("format = \"json\""));

    let back: StructlensConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_parse_full_config() {
    let toml_str = r#"
[callgraph]
light_mode = true
extra_ignored_callees = ["logger.debug", "assert"]

[diff]
format = "markdown"
"#;

    let config: StructlensConfig = toml::from_str(toml_str).unwrap();
    assert!(config.callgraph.light_mode);
    assert_eq!(config.diff.format, DiffFormat::Markdown);
    let mode = config.callgraph.resolution_mode(None);
    assert_eq!(mode, ResolutionMode::Light);

    let ignore = config.callgraph.ignore_set();
    assert_eq!(ignore.len(), DEFAULT_IGNORED_CALLEES.len() + 2);
    assert!(ignore.contains("logger.debug"));
    assert!(ignore.contains("JSON.parse"));
}

#[test]
fn test_ignored_callees_replace_defaults() {
    let config = CallgraphConfig {
        ignored_callees: Some(vec!["track".to_string()]),
        extra_ignored_callees: vec!["emit".to_string()],
        ..CallgraphConfig::default()
    };

    let ignore = config.ignore_set();
    assert_eq!(ignore.len(), 2);
    assert!(ignore.contains("track"));
    assert!(ignore.contains("emit"));
    assert!(!ignore.contains("console.log"));
}

#[test]
fn test_empty_replace_list_ignores_nothing() {
    let config: StructlensConfig = toml::from_str("[callgraph]\nignored_callees = []\n").unwrap();
    assert!(config.callgraph.ignore_set().is_empty());
}

#[test]
fn test_unknown_format_rejected() {
    let result: Result<StructlensConfig, _> = toml::from_str("[diff]\nformat = \"html\"\n");
    assert!(result.is_err());
}

// ── Loading from disk ──────────────────────────────────────────────────────

#[test]
fn test_find_and_load_walks_up() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[diff]\nformat = \"markdown\"\n",
    )
    .unwrap();
    let nested = dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).unwrap();

    let config = StructlensConfig::find_and_load(&nested).unwrap();
    assert_eq!(config.diff.format, DiffFormat::Markdown);
}

#[test]
fn test_find_and_load_nearest_wins() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[callgraph]\nlight_mode = true\n",
    )
    .unwrap();
    let nested = dir.path().join("pkg");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(
        nested.join(CONFIG_FILE_NAME),
        "[callgraph]\nlight_mode = false\n",
    )
    .unwrap();

    let config = StructlensConfig::find_and_load(&nested).unwrap();
    assert!(!config.callgraph.light_mode);
}

#[test]
fn test_malformed_file_errors_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[callgraph\nlight_mode = ").unwrap();

    let err = StructlensConfig::find_and_load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains(CONFIG_FILE_NAME));
}

#[test]
fn test_directory_named_like_config_is_skipped() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("inner");
    std::fs::create_dir_all(nested.join(CONFIG_FILE_NAME)).unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[diff]\nformat = \"markdown\"\n",
    )
    .unwrap();

    let config = StructlensConfig::find_and_load(&nested).unwrap();
    assert_eq!(config.diff.format, DiffFormat::Markdown);
}
