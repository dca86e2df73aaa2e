//! Layered config resolution.
//!
//! Five layers, lowest to highest precedence:
//!
//! 1. Built-in defaults (compile-time [`Profile::default`]).
//! 2. Global config at the platform config dir (`harvx/config.toml`).
//! 3. Repository config: nearest `harvx.toml` walking upward from the
//!    target directory (hard cap [`MAX_ASCENT`] levels, stopping at the
//!    filesystem root or the first `.git`-bearing directory).
//! 4. Environment variables with the `HARVX_` prefix.
//! 5. Explicit overrides (the CLI-flag boundary).
//!
//! A target preset slots in between layers 3 and 4. Each file layer first
//! resolves its selected profile (inheritance included) before merging.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{HarvxError, Result};

use super::env::{env_layer, env_profile};
use super::filesystem::{FileSystem, RealFileSystem};
use super::inherit::{DEFAULT_PROFILE, ProfileSet};
use super::merge::merge_values;
use super::model::{
    KNOWN_PROFILE_KEYS, KNOWN_REDACTION_KEYS, KNOWN_TIER_KEYS, Profile,
};
use super::presets::target_preset;
use super::validation::{lint_profile, validate_profile};

/// Filename of the repository config.
pub const REPO_CONFIG_NAME: &str = "harvx.toml";

/// Filename of the global config inside the platform config dir.
pub const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Upper bound on upward directory traversal while searching for the
/// repository config.
pub const MAX_ASCENT: usize = 20;

/// Which layer supplied a config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    Defaults,
    GlobalFile,
    RepoFile,
    TargetPreset,
    Environment,
    Override,
}

impl ConfigLayer {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defaults => "defaults",
            Self::GlobalFile => "global",
            Self::RepoFile => "repo",
            Self::TargetPreset => "preset",
            Self::Environment => "env",
            Self::Override => "override",
        }
    }
}

/// Explicit caller-supplied overrides, the highest layer. Represents CLI
/// flags: only keys the caller marked as set are present.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    profile: Option<String>,
    values: IndexMap<String, toml::Value>,
}

impl OverrideSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a profile by name (the `--profile` flag).
    pub fn select_profile(&mut self, name: impl Into<String>) {
        self.profile = Some(name.into());
    }

    /// Mark a dotted config key as set.
    pub fn set(&mut self, key: impl Into<String>, value: toml::Value) {
        self.values.insert(key.into(), value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.values.is_empty()
    }

    #[must_use]
    pub fn selected_profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(toml::Value::as_str)
    }

    /// Expand dotted keys into a nested TOML table.
    fn to_value(&self) -> toml::Value {
        let mut root = toml::Table::new();
        for (key, value) in &self.values {
            insert_dotted(&mut root, key, value.clone());
        }
        toml::Value::Table(root)
    }
}

fn insert_dotted(table: &mut toml::Table, key: &str, value: toml::Value) {
    match key.split_once('.') {
        None => {
            table.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = table
                .entry(head.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if let toml::Value::Table(nested) = entry {
                insert_dotted(nested, rest, value);
            }
        }
    }
}

/// A fully resolved configuration plus its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub profile: Profile,
    pub profile_name: String,
    /// Dotted key → the highest layer that supplied it.
    pub source_map: IndexMap<String, ConfigLayer>,
    pub warnings: Vec<String>,
    pub unknown_keys: Vec<String>,
    pub repo_config_path: Option<PathBuf>,
    pub global_config_path: Option<PathBuf>,
}

/// Resolves configuration from the filesystem, environment, and overrides.
#[derive(Debug, Default)]
pub struct ConfigResolver<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl ConfigResolver<RealFileSystem> {
    #[must_use]
    pub const fn new() -> Self {
        Self { fs: RealFileSystem }
    }
}

impl<F: FileSystem> ConfigResolver<F> {
    #[must_use]
    pub const fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// Resolve the configuration for a target directory.
    ///
    /// # Errors
    /// Fatal on parse failures, circular inheritance, unknown profile names,
    /// invalid environment values, and post-merge validation failures.
    pub fn resolve(&self, target_dir: &Path, overrides: &OverrideSet) -> Result<ResolvedConfig> {
        let mut warnings = Vec::new();
        let mut unknown_keys = Vec::new();

        let located = self.locate_configs(target_dir, &mut unknown_keys)?;
        let profile_name = self.select_profile_name(overrides, &located)?;

        let layers = Layers {
            defaults: value_of_defaults()?,
            global: match &located.global_set {
                Some(set) => Some(Self::resolve_selected(set, &profile_name, &mut warnings)?),
                None => None,
            },
            repo: match &located.repo_set {
                Some(set) => Some(Self::resolve_selected(set, &profile_name, &mut warnings)?),
                None => None,
            },
        };
        let (merged, source_map) = self.merge_all(layers, overrides)?;

        let profile = finalize_value_to_profile(merged)?;
        validate_profile(&profile)?;
        warnings.extend(lint_profile(&profile));
        for key in &unknown_keys {
            warnings.push(format!("unknown config key '{key}'"));
        }

        Ok(ResolvedConfig {
            profile,
            profile_name,
            source_map,
            warnings,
            unknown_keys,
            repo_config_path: located.repo_path,
            global_config_path: located.global_path,
        })
    }

    /// Find and parse the global and repository config files.
    fn locate_configs(
        &self,
        target_dir: &Path,
        unknown_keys: &mut Vec<String>,
    ) -> Result<LocatedConfigs> {
        let global_path = self
            .fs
            .config_dir()
            .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
            .filter(|path| self.fs.exists(path));
        let repo_path = self.find_repo_config(target_dir);

        let global_set = match &global_path {
            Some(path) => Some(self.load_profile_set(path, unknown_keys)?),
            None => None,
        };
        let repo_set = match &repo_path {
            Some(path) => Some(self.load_profile_set(path, unknown_keys)?),
            None => None,
        };
        Ok(LocatedConfigs {
            global_path,
            repo_path,
            global_set,
            repo_set,
        })
    }

    /// Pick the profile name (override > env > `default`) and verify a
    /// non-default name is defined by at least one file layer.
    fn select_profile_name(
        &self,
        overrides: &OverrideSet,
        located: &LocatedConfigs,
    ) -> Result<String> {
        let profile_name = overrides
            .selected_profile()
            .map(String::from)
            .or_else(|| env_profile(&self.fs))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        if profile_name == DEFAULT_PROFILE {
            return Ok(profile_name);
        }
        let sets = [&located.global_set, &located.repo_set];
        if sets
            .into_iter()
            .flatten()
            .any(|set| set.defines(&profile_name))
        {
            return Ok(profile_name);
        }

        let mut available: Vec<String> = vec![DEFAULT_PROFILE.to_string()];
        for set in sets.into_iter().flatten() {
            for name in set.available() {
                if !available.contains(&name) {
                    available.push(name);
                }
            }
        }
        Err(HarvxError::Config(format!(
            "unknown profile '{profile_name}'. Available profiles: {}",
            available.join(", ")
        )))
    }

    /// Fold the preset, environment, and override layers on top of the
    /// file layers, recording provenance in the same order.
    fn merge_all(
        &self,
        layers: Layers,
        overrides: &OverrideSet,
    ) -> Result<(toml::Value, IndexMap<String, ConfigLayer>)> {
        let mut merged = layers.defaults.clone();
        for value in [&layers.global, &layers.repo].into_iter().flatten() {
            merged = merge_values(merged, value.clone());
        }

        // Layers 4-5 are computed up front: the preset layer sits *below*
        // them but is selected by the effective target, wherever it came from.
        let env_value = env_layer(&self.fs)?;
        let override_value = overrides.to_value();

        let effective_target = overrides
            .get_str("target")
            .map(String::from)
            .or_else(|| {
                env_value
                    .get("target")
                    .and_then(toml::Value::as_str)
                    .map(String::from)
            })
            .or_else(|| {
                merged
                    .get("target")
                    .and_then(toml::Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_default();
        let preset_value = target_preset(&effective_target);

        if let Some(preset) = &preset_value {
            merged = merge_values(merged, preset.clone());
        }
        merged = merge_values(merged, env_value.clone());
        merged = merge_values(merged, override_value.clone());

        let mut source_map = IndexMap::new();
        record_layer(&mut source_map, &layers.defaults, "", ConfigLayer::Defaults);
        if let Some(value) = &layers.global {
            record_layer(&mut source_map, value, "", ConfigLayer::GlobalFile);
        }
        if let Some(value) = &layers.repo {
            record_layer(&mut source_map, value, "", ConfigLayer::RepoFile);
        }
        if let Some(value) = &preset_value {
            record_layer(&mut source_map, value, "", ConfigLayer::TargetPreset);
        }
        record_layer(&mut source_map, &env_value, "", ConfigLayer::Environment);
        record_layer(&mut source_map, &override_value, "", ConfigLayer::Override);

        Ok((merged, source_map))
    }

    fn load_profile_set(&self, path: &Path, unknown_keys: &mut Vec<String>) -> Result<ProfileSet> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| HarvxError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
        let value: toml::Value = toml::from_str(&content)?;
        collect_unknown_keys(&value, unknown_keys);
        ProfileSet::from_value(value)
    }

    fn resolve_selected(
        set: &ProfileSet,
        profile_name: &str,
        warnings: &mut Vec<String>,
    ) -> Result<toml::Value> {
        // A file lacking the selected profile contributes its root table.
        if set.defines(profile_name) {
            set.resolve(profile_name, warnings)
        } else {
            set.resolve(DEFAULT_PROFILE, warnings)
        }
    }

    /// Find the nearest `harvx.toml` walking upward from `start`, stopping
    /// at the filesystem root or the first directory containing `.git`.
    fn find_repo_config(&self, start: &Path) -> Option<PathBuf> {
        let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
        let mut dir = start.as_path();
        for _ in 0..MAX_ASCENT {
            let candidate = dir.join(REPO_CONFIG_NAME);
            if self.fs.exists(&candidate) {
                return Some(candidate);
            }
            if self.fs.exists(&dir.join(".git")) {
                return None;
            }
            dir = dir.parent()?;
        }
        None
    }
}

/// The config files found for a run, parsed into profile sets.
struct LocatedConfigs {
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
    global_set: Option<ProfileSet>,
    repo_set: Option<ProfileSet>,
}

/// The three file-backed layers, resolved to the selected profile.
struct Layers {
    defaults: toml::Value,
    global: Option<toml::Value>,
    repo: Option<toml::Value>,
}

/// The built-in defaults as a TOML value.
fn value_of_defaults() -> Result<toml::Value> {
    let text = toml::to_string(&Profile::default())
        .map_err(|e| HarvxError::Config(format!("internal defaults serialization: {e}")))?;
    Ok(toml::from_str(&text)?)
}

/// Deserialize the merged value into a [`Profile`] via a string
/// round-trip, keeping the error type uniform with file parsing.
fn finalize_value_to_profile(value: toml::Value) -> Result<Profile> {
    let text =
        toml::to_string(&value).map_err(|e| HarvxError::Config(e.to_string()))?;
    Ok(toml::from_str(&text)?)
}

fn record_layer(
    map: &mut IndexMap<String, ConfigLayer>,
    value: &toml::Value,
    prefix: &str,
    layer: ConfigLayer,
) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let child = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                record_layer(map, val, &child, layer);
            }
        }
        _ => {
            if !prefix.is_empty() {
                map.insert(prefix.to_string(), layer);
            }
        }
    }
}

/// Collect unrecognized keys from a parsed config file. Never fails.
fn collect_unknown_keys(value: &toml::Value, out: &mut Vec<String>) {
    let Some(root) = value.as_table() else {
        return;
    };
    for (key, val) in root {
        if key == "profile" {
            if let Some(profiles) = val.as_table() {
                for (name, profile_value) in profiles {
                    if let Some(table) = profile_value.as_table() {
                        collect_unknown_profile_keys(table, &format!("profile.{name}"), out);
                    }
                }
            }
            continue;
        }
        check_profile_key(key, val, "", out);
    }
}

fn collect_unknown_profile_keys(table: &toml::Table, prefix: &str, out: &mut Vec<String>) {
    for (key, val) in table {
        check_profile_key(key, val, prefix, out);
    }
}

fn check_profile_key(key: &str, val: &toml::Value, prefix: &str, out: &mut Vec<String>) {
    let dotted = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{prefix}.{k}")
        }
    };
    if !KNOWN_PROFILE_KEYS.contains(&key) {
        out.push(dotted(key));
        return;
    }
    match key {
        "redaction" => {
            if let Some(table) = val.as_table() {
                for nested in table.keys() {
                    if !KNOWN_REDACTION_KEYS.contains(&nested.as_str()) {
                        out.push(dotted(&format!("redaction.{nested}")));
                    }
                }
            }
        }
        "tiers" => {
            if let Some(entries) = val.as_array() {
                for (i, entry) in entries.iter().enumerate() {
                    if let Some(table) = entry.as_table() {
                        for nested in table.keys() {
                            if !KNOWN_TIER_KEYS.contains(&nested.as_str()) {
                                out.push(dotted(&format!("tiers[{i}].{nested}")));
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
