use super::*;
use crate::config::model::TierConfig;

#[test]
fn default_profile_is_valid() {
    validate_profile(&Profile::default()).unwrap();
    assert!(lint_profile(&Profile::default()).is_empty());
}

#[test]
fn invalid_format_names_the_field() {
    let profile = Profile {
        format: "html".into(),
        ..Profile::default()
    };
    let err = validate_profile(&profile).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("format"));
    assert!(msg.contains("markdown, xml"));
}

#[test]
fn invalid_tokenizer_rejected() {
    let profile = Profile {
        tokenizer: "p50k_base".into(),
        ..Profile::default()
    };
    assert!(validate_profile(&profile).is_err());
}

#[test]
fn empty_target_is_valid_but_unknown_is_not() {
    let mut profile = Profile::default();
    validate_profile(&profile).unwrap();

    profile.target = "claude".into();
    validate_profile(&profile).unwrap();

    profile.target = "grok".into();
    assert!(validate_profile(&profile).is_err());
}

#[test]
fn max_tokens_range_enforced() {
    let mut profile = Profile {
        max_tokens: 2_000_000,
        ..Profile::default()
    };
    validate_profile(&profile).unwrap();

    profile.max_tokens = 2_000_001;
    assert!(validate_profile(&profile).is_err());

    profile.max_tokens = -1;
    assert!(validate_profile(&profile).is_err());
}

#[test]
fn stdout_and_output_are_mutually_exclusive() {
    let profile = Profile {
        stdout: true,
        output: Some("out.md".into()),
        ..Profile::default()
    };
    assert!(validate_profile(&profile).is_err());
}

#[test]
fn bad_glob_is_an_invalid_pattern_error() {
    let profile = Profile {
        ignore: vec!["src/[".into()],
        ..Profile::default()
    };
    match validate_profile(&profile).unwrap_err() {
        crate::error::HarvxError::InvalidPattern { pattern, .. } => {
            assert_eq!(pattern, "src/[");
        }
        other => panic!("expected InvalidPattern, got: {other:?}"),
    }
}

#[test]
fn tier_out_of_range_rejected() {
    let profile = Profile {
        tiers: vec![TierConfig {
            tier: 6,
            patterns: vec!["src/**".into()],
        }],
        ..Profile::default()
    };
    assert!(validate_profile(&profile).is_err());
}

#[test]
fn overlapping_tier_patterns_warn() {
    let profile = Profile {
        tiers: vec![
            TierConfig {
                tier: 0,
                patterns: vec!["src/**".into()],
            },
            TierConfig {
                tier: 3,
                patterns: vec!["src/**".into()],
            },
        ],
        ..Profile::default()
    };
    let warnings = lint_profile(&profile);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("src/**"));
}

#[test]
fn priority_in_ignore_warns() {
    let profile = Profile {
        priority_files: vec!["README.md".into()],
        ignore: vec!["README.md".into()],
        ..Profile::default()
    };
    let warnings = lint_profile(&profile);
    assert!(warnings.iter().any(|w| w.contains("priority_files")));
}

#[test]
fn huge_budget_warns() {
    let profile = Profile {
        max_tokens: 600_000,
        ..Profile::default()
    };
    let warnings = lint_profile(&profile);
    assert!(warnings.iter().any(|w| w.contains("max_tokens")));
}
