use std::path::Path;

use super::*;
use crate::config::mock_fs::MockFileSystem;

fn resolver(fs: MockFileSystem) -> ConfigResolver<MockFileSystem> {
    ConfigResolver::with_fs(fs)
}

#[test]
fn no_config_files_yields_builtin_defaults_exactly() {
    let fs = MockFileSystem::new().with_dir("/repo");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile, Profile::default());
    assert_eq!(resolved.profile_name, "default");
    assert!(resolved.repo_config_path.is_none());
    assert!(resolved.unknown_keys.is_empty());
}

#[test]
fn defaults_have_provenance_for_every_key() {
    let fs = MockFileSystem::new().with_dir("/repo");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    for key in ["format", "tokenizer", "max_tokens", "redaction.confidence_threshold"] {
        assert_eq!(
            resolved.source_map.get(key),
            Some(&ConfigLayer::Defaults),
            "missing provenance for {key}"
        );
    }
}

#[test]
fn repo_config_overrides_defaults() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "format = \"xml\"\nmax_tokens = 1000");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.format, "xml");
    assert_eq!(resolved.profile.max_tokens, 1000);
    assert_eq!(
        resolved.source_map.get("format"),
        Some(&ConfigLayer::RepoFile)
    );
    assert_eq!(
        resolved.source_map.get("tokenizer"),
        Some(&ConfigLayer::Defaults)
    );
}

#[test]
fn repo_config_found_by_walking_upward() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "max_tokens = 7")
        .with_dir("/repo/src/nested");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo/src/nested"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.max_tokens, 7);
    assert_eq!(
        resolved.repo_config_path.as_deref(),
        Some(Path::new("/repo/harvx.toml"))
    );
}

#[test]
fn upward_walk_stops_at_git_boundary() {
    // harvx.toml above the repo root must not be picked up.
    let fs = MockFileSystem::new()
        .with_file("/home/harvx.toml", "max_tokens = 99")
        .with_dir("/home/repo/.git")
        .with_dir("/home/repo/src");
    let resolved = resolver(fs)
        .resolve(Path::new("/home/repo/src"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.max_tokens, 0);
    assert!(resolved.repo_config_path.is_none());
}

#[test]
fn git_boundary_directory_itself_is_still_searched() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "max_tokens = 42")
        .with_dir("/repo/.git")
        .with_dir("/repo/src");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo/src"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.max_tokens, 42);
}

#[test]
fn global_config_sits_below_repo_config() {
    let fs = MockFileSystem::new()
        .with_config_dir("/home/user/.config/harvx")
        .with_file(
            "/home/user/.config/harvx/config.toml",
            "format = \"xml\"\nmax_tokens = 5",
        )
        .with_file("/repo/harvx.toml", "max_tokens = 10");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.format, "xml");
    assert_eq!(resolved.profile.max_tokens, 10);
    assert_eq!(
        resolved.source_map.get("max_tokens"),
        Some(&ConfigLayer::RepoFile)
    );
}

#[test]
fn environment_overrides_repo_config() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "max_tokens = 10")
        .with_env("HARVX_MAX_TOKENS", "20");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.max_tokens, 20);
    assert_eq!(
        resolved.source_map.get("max_tokens"),
        Some(&ConfigLayer::Environment)
    );
}

#[test]
fn explicit_overrides_beat_everything() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "max_tokens = 10")
        .with_env("HARVX_MAX_TOKENS", "20");
    let mut overrides = OverrideSet::new();
    overrides.set("max_tokens", toml::Value::Integer(30));
    let resolved = resolver(fs).resolve(Path::new("/repo"), &overrides).unwrap();
    assert_eq!(resolved.profile.max_tokens, 30);
    assert_eq!(
        resolved.source_map.get("max_tokens"),
        Some(&ConfigLayer::Override)
    );
}

#[test]
fn dotted_override_reaches_nested_struct() {
    let fs = MockFileSystem::new().with_dir("/repo");
    let mut overrides = OverrideSet::new();
    overrides.set(
        "redaction.confidence_threshold",
        toml::Value::String("low".into()),
    );
    let resolved = resolver(fs).resolve(Path::new("/repo"), &overrides).unwrap();
    assert_eq!(resolved.profile.redaction.confidence_threshold, "low");
}

#[test]
fn target_preset_applies_between_repo_and_env() {
    let fs = MockFileSystem::new().with_file("/repo/harvx.toml", "target = \"claude\"");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.format, "xml");
    assert_eq!(resolved.profile.max_tokens, 200_000);
    assert_eq!(
        resolved.source_map.get("format"),
        Some(&ConfigLayer::TargetPreset)
    );
}

#[test]
fn env_beats_preset_keys() {
    let fs = MockFileSystem::new()
        .with_file("/repo/harvx.toml", "target = \"claude\"")
        .with_env("HARVX_FORMAT", "markdown");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    // Preset picked xml; env wins.
    assert_eq!(resolved.profile.format, "markdown");
    assert_eq!(resolved.profile.max_tokens, 200_000);
}

#[test]
fn target_from_override_still_selects_preset() {
    let fs = MockFileSystem::new().with_dir("/repo");
    let mut overrides = OverrideSet::new();
    overrides.set("target", toml::Value::String("chatgpt".into()));
    let resolved = resolver(fs).resolve(Path::new("/repo"), &overrides).unwrap();
    assert_eq!(resolved.profile.max_tokens, 128_000);
    assert_eq!(resolved.profile.format, "markdown");
}

#[test]
fn named_profile_resolves_through_inheritance() {
    let fs = MockFileSystem::new()
        .with_file(
            "/repo/harvx.toml",
            r#"
max_tokens = 100
format = "xml"

[profile.ci]
extends = "default"
max_tokens = 50
"#,
        )
        .with_env("HARVX_PROFILE", "ci");
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile_name, "ci");
    assert_eq!(resolved.profile.max_tokens, 50);
    assert_eq!(resolved.profile.format, "xml");
}

#[test]
fn override_profile_selection_beats_env() {
    let fs = MockFileSystem::new()
        .with_file(
            "/repo/harvx.toml",
            r#"
[profile.ci]
max_tokens = 50

[profile.dev]
max_tokens = 75
"#,
        )
        .with_env("HARVX_PROFILE", "ci");
    let mut overrides = OverrideSet::new();
    overrides.select_profile("dev");
    let resolved = resolver(fs).resolve(Path::new("/repo"), &overrides).unwrap();
    assert_eq!(resolved.profile_name, "dev");
    assert_eq!(resolved.profile.max_tokens, 75);
}

#[test]
fn unknown_profile_is_fatal_and_lists_available() {
    let fs = MockFileSystem::new().with_file(
        "/repo/harvx.toml",
        "[profile.ci]\nmax_tokens = 50",
    );
    let mut overrides = OverrideSet::new();
    overrides.select_profile("prod");
    let err = resolver(fs)
        .resolve(Path::new("/repo"), &overrides)
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("prod"));
    assert!(msg.contains("ci"));
}

#[test]
fn circular_inheritance_surfaces_from_loader() {
    let fs = MockFileSystem::new()
        .with_file(
            "/repo/harvx.toml",
            r#"
[profile.a]
extends = "b"

[profile.b]
extends = "a"
"#,
        )
        .with_env("HARVX_PROFILE", "a");
    let err = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap_err();
    assert!(matches!(
        err,
        crate::error::HarvxError::CircularInheritance { .. }
    ));
}

#[test]
fn unknown_keys_warn_but_do_not_fail() {
    let fs = MockFileSystem::new().with_file(
        "/repo/harvx.toml",
        r#"
max_tokens = 10
max_tokenz = 20

[redaction]
confidence = "high"
"#,
    );
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert!(resolved.unknown_keys.contains(&"max_tokenz".to_string()));
    assert!(
        resolved
            .unknown_keys
            .contains(&"redaction.confidence".to_string())
    );
    assert_eq!(resolved.profile.max_tokens, 10);
}

#[test]
fn invalid_merged_value_fails_validation() {
    let fs = MockFileSystem::new().with_file("/repo/harvx.toml", "format = \"pdf\"");
    let err = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap_err();
    assert!(err.to_string().contains("format"));
}

#[test]
fn arrays_replace_across_layers() {
    let fs = MockFileSystem::new()
        .with_config_dir("/cfg")
        .with_file("/cfg/config.toml", r#"ignore = ["a/**"]"#)
        .with_file("/repo/harvx.toml", r#"ignore = ["b/**"]"#);
    let resolved = resolver(fs)
        .resolve(Path::new("/repo"), &OverrideSet::new())
        .unwrap();
    assert_eq!(resolved.profile.ignore, vec!["b/**".to_string()]);
}
