//! Tests for configuration loading.
use snapchain_codegen::error::ConfigError;
use snapchain_codegen::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| vars.get(name).map(|value| value.to_string())
}

#[test]
fn test_defaults() {
    let config = CodegenConfig::default();
    assert_eq!(config.emitter.indent_width, 4);
    assert_eq!(config.emitter.indent_unit(), "    ");
    assert_eq!(config.scheduler.batch_size, 25);
    assert_eq!(config.scheduler.batch_delay(), Duration::from_millis(10));
    assert_eq!(config.scheduler.debounce(), Duration::from_millis(300));
    assert_eq!(config.refinement.endpoint, "https://openrouter.ai/api/v1");
    assert_eq!(config.refinement.model, "openai/gpt-oss-120b:free");
    assert_eq!(config.refinement.timeout(), Duration::from_secs(60));
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = CodegenConfig::from_toml_str(
        r#"
        [scheduler]
        batch_size = 50

        [refinement]
        model = "local/coder"
        "#,
    )
    .unwrap();

    assert_eq!(config.scheduler.batch_size, 50);
    assert_eq!(config.scheduler.debounce_ms, 300);
    assert_eq!(config.refinement.model, "local/coder");
    assert_eq!(config.refinement.api_key_env, "OPENROUTER_API_KEY");
    assert_eq!(config.emitter, EmitterConfig::default());
}

#[test]
fn test_empty_toml_is_default() {
    assert_eq!(
        CodegenConfig::from_toml_str("").unwrap(),
        CodegenConfig::default()
    );
}

#[test]
fn test_validation_rejects_zero_sizes() {
    match CodegenConfig::from_toml_str("[scheduler]\nbatch_size = 0\n") {
        Err(ConfigError::Invalid(message)) => assert!(message.contains("batch_size")),
        other => panic!("Expected Invalid, got {:?}", other),
    }
    match CodegenConfig::from_toml_str("[emitter]\nindent_width = 0\n") {
        Err(ConfigError::Invalid(message)) => assert!(message.contains("indent_width")),
        other => panic!("Expected Invalid, got {:?}", other),
    }
}

#[test]
fn test_parse_error() {
    match CodegenConfig::from_toml_str("[scheduler\nbatch_size = 1") {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("Expected Parse, got {:?}", other),
    }
    match CodegenConfig::from_toml_str("[scheduler]\nbatch_size = \"many\"\n") {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("Expected Parse, got {:?}", other),
    }
}

#[test]
fn test_env_overrides() {
    let vars = HashMap::from([
        ("SNAPCHAIN_BATCH_SIZE", " 8 "),
        ("SNAPCHAIN_REFINE_MODEL", "other/model"),
        ("SNAPCHAIN_REFINE_TEMPERATURE", "0.7"),
    ]);
    let mut config = CodegenConfig::default();
    config.apply_env_overrides(lookup(&vars)).unwrap();

    assert_eq!(config.scheduler.batch_size, 8);
    assert_eq!(config.refinement.model, "other/model");
    assert_eq!(config.refinement.temperature, 0.7);
    assert_eq!(config.scheduler.debounce_ms, 300);
}

#[test]
fn test_bad_env_value() {
    let vars = HashMap::from([("SNAPCHAIN_DEBOUNCE_MS", "soon")]);
    let mut config = CodegenConfig::default();
    match config.apply_env_overrides(lookup(&vars)) {
        Err(ConfigError::InvalidEnv { name, value }) => {
            assert_eq!(name, "SNAPCHAIN_DEBOUNCE_MS");
            assert_eq!(value, "soon");
        }
        other => panic!("Expected InvalidEnv, got {:?}", other),
    }
}

#[test]
fn test_env_override_is_validated() {
    let vars = HashMap::from([("SNAPCHAIN_INDENT_WIDTH", "0")]);
    let mut config = CodegenConfig::default();
    assert!(matches!(
        config.apply_env_overrides(lookup(&vars)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[emitter]\nindent_width = 2").unwrap();

    let config = CodegenConfig::from_file(file.path()).unwrap();
    assert_eq!(config.emitter.indent_unit(), "  ");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match CodegenConfig::from_file(&path) {
        Err(ConfigError::Io { path: reported, .. }) => {
            assert!(reported.ends_with("absent.toml"))
        }
        other => panic!("Expected Io, got {:?}", other),
    }
}
