use super::*;
use crate::config::mock_fs::MockFileSystem;

#[test]
fn parse_bool_accepts_documented_spellings() {
    for truthy in ["true", "TRUE", "1", "yes", "Yes"] {
        assert_eq!(parse_bool(truthy), Some(true), "{truthy}");
    }
    for falsy in ["false", "FALSE", "0", "no", "No"] {
        assert_eq!(parse_bool(falsy), Some(false), "{falsy}");
    }
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

#[test]
fn env_layer_maps_variables_to_config_keys() {
    let fs = MockFileSystem::new()
        .with_env("HARVX_MAX_TOKENS", "128000")
        .with_env("HARVX_FORMAT", "xml")
        .with_env("HARVX_REDACT", "no");
    let layer = env_layer(&fs).unwrap();
    let table = layer.as_table().unwrap();
    assert_eq!(table["max_tokens"].as_integer(), Some(128_000));
    assert_eq!(table["format"].as_str(), Some("xml"));
    assert_eq!(table["redact"].as_bool(), Some(false));
}

#[test]
fn env_layer_is_empty_without_variables() {
    let fs = MockFileSystem::new();
    let layer = env_layer(&fs).unwrap();
    assert!(layer.as_table().unwrap().is_empty());
}

#[test]
fn invalid_boolean_is_a_descriptive_error() {
    let fs = MockFileSystem::new().with_env("HARVX_STDOUT", "maybe");
    let err = env_layer(&fs).unwrap_err();
    match err {
        crate::error::HarvxError::InvalidEnvValue { var, value, reason } => {
            assert_eq!(var, "HARVX_STDOUT");
            assert_eq!(value, "maybe");
            assert!(reason.contains("boolean"));
        }
        other => panic!("expected InvalidEnvValue, got: {other:?}"),
    }
}

#[test]
fn invalid_integer_is_a_descriptive_error() {
    let fs = MockFileSystem::new().with_env("HARVX_MAX_TOKENS", "lots");
    let err = env_layer(&fs).unwrap_err();
    match err {
        crate::error::HarvxError::InvalidEnvValue { var, .. } => {
            assert_eq!(var, "HARVX_MAX_TOKENS");
        }
        other => panic!("expected InvalidEnvValue, got: {other:?}"),
    }
}

#[test]
fn profile_and_dir_selectors_are_read_separately() {
    let fs = MockFileSystem::new()
        .with_env("HARVX_PROFILE", "ci")
        .with_env("HARVX_DIR", "/srv/repo");
    assert_eq!(env_profile(&fs).as_deref(), Some("ci"));
    assert_eq!(env_dir(&fs).as_deref(), Some("/srv/repo"));

    let layer = env_layer(&fs).unwrap();
    assert!(layer.as_table().unwrap().is_empty());
}
