use std::fs;

use tempfile::TempDir;

use super::*;

fn chain(profile_ignore: &[&str]) -> IgnoreChain {
    let patterns: Vec<String> = profile_ignore.iter().map(|s| (*s).to_string()).collect();
    IgnoreChain::new(&patterns, true).unwrap()
}

#[test]
fn default_member_ignores_build_directories() {
    let chain = chain(&[]);
    let decision = chain.decide(std::path::Path::new("node_modules"), "node_modules", true);
    assert_eq!(decision.verdict, Verdict::Ignore);
    assert!(chain.should_prune(decision));
}

#[test]
fn plain_source_files_have_no_verdict() {
    let chain = chain(&[]);
    let decision = chain.decide(std::path::Path::new("src/main.rs"), "src/main.rs", false);
    assert_eq!(decision.verdict, Verdict::None);
    assert!(!chain.should_prune(decision));
}

#[test]
fn sensitive_files_are_ignored_by_default() {
    let chain = chain(&[]);
    for rel in [
        ".env.production",
        "certs/server.pem",
        "id_rsa.pub",
        "config/credentials.yml",
        ".netrc",
    ] {
        let decision = chain.decide(std::path::Path::new(rel), rel, false);
        assert_eq!(decision.verdict, Verdict::Ignore, "{rel}");
        assert!(decision.by_sensitive, "{rel}");
        assert!(chain.is_sensitive(rel), "{rel}");
    }
}

#[test]
fn profile_ignore_applies_to_relative_paths() {
    let chain = chain(&["generated/**"]);
    let decision = chain.decide(
        std::path::Path::new("generated/api.rs"),
        "generated/api.rs",
        false,
    );
    assert_eq!(decision.verdict, Verdict::Ignore);
    assert!(!decision.by_sensitive);
}

#[test]
fn gitignore_member_stacks_hierarchically() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join(".gitignore"), "!keep.log\n").unwrap();

    let mut chain = chain(&[]);
    chain.enter_dir(dir.path());

    let root_log = dir.path().join("app.log");
    let decision = chain.decide(&root_log, "app.log", false);
    assert_eq!(decision.verdict, Verdict::Ignore);

    chain.enter_dir(&sub);
    let kept = sub.join("keep.log");
    let decision = chain.decide(&kept, "sub/keep.log", false);
    assert_eq!(decision.verdict, Verdict::Whitelist);

    let dropped = sub.join("other.log");
    let decision = chain.decide(&dropped, "sub/other.log", false);
    assert_eq!(decision.verdict, Verdict::Ignore);

    chain.exit_dir();
    chain.exit_dir();
}

#[test]
fn harvxignore_negation_readmits_gitignored_path() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".gitignore"), "dist/\n").unwrap();
    fs::write(dir.path().join(".harvxignore"), "!dist/out.js\n").unwrap();

    let mut chain = chain(&[]);
    chain.enter_dir(dir.path());

    // The directory itself is ignored, but a later member holds a
    // whitelist, so the walker must descend rather than prune.
    let dist = dir.path().join("dist");
    let decision = chain.decide(&dist, "dist", true);
    assert_eq!(decision.verdict, Verdict::Ignore);
    assert!(!chain.should_prune(decision));

    let readmitted = dist.join("out.js");
    let decision = chain.decide(&readmitted, "dist/out.js", false);
    assert_eq!(decision.verdict, Verdict::Whitelist);

    let still_ignored = dist.join("bundle.js");
    let decision = chain.decide(&still_ignored, "dist/bundle.js", false);
    assert_eq!(decision.verdict, Verdict::Ignore);

    chain.exit_dir();
}

#[test]
fn exit_dir_pops_members() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".gitignore"), "*.tmp\n").unwrap();

    let mut chain = chain(&[]);
    chain.enter_dir(dir.path());
    let scratch = dir.path().join("x.tmp");
    assert_eq!(
        chain.decide(&scratch, "x.tmp", false).verdict,
        Verdict::Ignore
    );
    chain.exit_dir();
    assert_eq!(
        chain.decide(&scratch, "x.tmp", false).verdict,
        Verdict::None
    );
}

#[test]
fn gitignore_disabled_skips_git_members() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();

    let mut chain = IgnoreChain::new(&[], false).unwrap();
    chain.enter_dir(dir.path());
    let log = dir.path().join("app.log");
    assert_eq!(chain.decide(&log, "app.log", false).verdict, Verdict::None);
    chain.exit_dir();
}

#[test]
fn sensitive_matcher_is_shared_with_redaction() {
    let matcher = sensitive_matcher();
    assert!(matches!(
        matcher.matched("app/.env.production", false),
        ignore::Match::Ignore(_)
    ));
    assert!(matches!(
        matcher.matched("src/main.rs", false),
        ignore::Match::None
    ));
}
