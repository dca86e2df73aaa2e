//! Profile inheritance within a single config file.
//!
//! A config file is a root table (the file's `default` profile) plus any
//! number of `[profile.<name>]` tables. A named profile may set
//! `extends = "<other>"`; resolution merges the parent beneath the child,
//! depth-first. Cycles are fatal, missing parents are fatal, chains deeper
//! than [`INHERIT_DEPTH_WARN`] succeed with a warning.

use indexmap::{IndexMap, IndexSet};

use crate::error::{HarvxError, Result};

use super::merge::merge_values;

/// Name of the implicit root profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Inheritance chains longer than this draw a warning but still resolve.
pub const INHERIT_DEPTH_WARN: usize = 3;

/// The profiles defined by one config file, pre-resolution.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    root: toml::Table,
    named: IndexMap<String, toml::Table>,
}

impl ProfileSet {
    /// Split a parsed config file into its root table and `[profile.*]`
    /// tables. Non-table `profile` entries are a config error.
    pub fn from_value(value: toml::Value) -> Result<Self> {
        let toml::Value::Table(mut root) = value else {
            return Err(HarvxError::Config(
                "config file must be a TOML table".to_string(),
            ));
        };

        let mut named = IndexMap::new();
        if let Some(profiles) = root.remove("profile") {
            let toml::Value::Table(profiles) = profiles else {
                return Err(HarvxError::Config(
                    "'profile' must be a table of [profile.<name>] sections".to_string(),
                ));
            };
            for (name, value) in profiles {
                let toml::Value::Table(table) = value else {
                    return Err(HarvxError::Config(format!(
                        "[profile.{name}] must be a table"
                    )));
                };
                named.insert(name, table);
            }
        }

        Ok(Self { root, named })
    }

    /// All profile names this file defines, `default` first.
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        let mut names = vec![DEFAULT_PROFILE.to_string()];
        names.extend(self.named.keys().cloned());
        names
    }

    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        name == DEFAULT_PROFILE || self.named.contains_key(name)
    }

    /// Resolve a profile to a flattened table with no `extends` key.
    ///
    /// Returns the resolved value and any depth warnings. Falls back to the
    /// root table when `name` is `default`.
    pub fn resolve(&self, name: &str, warnings: &mut Vec<String>) -> Result<toml::Value> {
        let mut visited = IndexSet::new();
        let resolved = self.resolve_chain(name, &mut visited)?;
        if visited.len() > INHERIT_DEPTH_WARN {
            warnings.push(format!(
                "profile '{name}' inheritance chain is {} levels deep ({})",
                visited.len(),
                visited.iter().cloned().collect::<Vec<_>>().join(" -> "),
            ));
        }
        Ok(resolved)
    }

    fn resolve_chain(&self, name: &str, visited: &mut IndexSet<String>) -> Result<toml::Value> {
        if !visited.insert(name.to_string()) {
            let mut chain: Vec<String> = visited.iter().cloned().collect();
            chain.push(name.to_string());
            return Err(HarvxError::CircularInheritance { chain });
        }

        let mut table = self.table_for(name).ok_or_else(|| {
            // The entry profile is checked by the caller; reaching here means
            // an extends link named a profile this file does not define.
            let child = visited
                .iter()
                .rev()
                .nth(1)
                .cloned()
                .unwrap_or_else(|| name.to_string());
            HarvxError::MissingParent {
                name: child,
                parent: name.to_string(),
                available: self.available(),
            }
        })?;

        let extends = table
            .remove("extends")
            .and_then(|v| v.as_str().map(String::from));

        let value = toml::Value::Table(table);
        match extends {
            Some(parent) => {
                let base = self.resolve_chain(&parent, visited)?;
                Ok(merge_values(base, value))
            }
            None => Ok(value),
        }
    }

    fn table_for(&self, name: &str) -> Option<toml::Table> {
        if name == DEFAULT_PROFILE && !self.named.contains_key(DEFAULT_PROFILE) {
            return Some(self.root.clone());
        }
        self.named.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "inherit_tests.rs"]
mod tests;
