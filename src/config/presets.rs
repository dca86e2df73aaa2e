//! Target presets.
//!
//! A `target` names the model family the document is destined for; each
//! preset pins the format and token budget that family expects. The preset
//! sits between the repo config layer and the environment layer, so explicit
//! env/override values still win.

/// The preset layer for a target, or `None` when the target carries no
/// preset keys.
#[must_use]
pub fn target_preset(target: &str) -> Option<toml::Value> {
    let mut table = toml::Table::new();
    match target {
        "claude" => {
            table.insert("format".into(), toml::Value::String("xml".into()));
            table.insert("max_tokens".into(), toml::Value::Integer(200_000));
        }
        "chatgpt" => {
            table.insert("format".into(), toml::Value::String("markdown".into()));
            table.insert("max_tokens".into(), toml::Value::Integer(128_000));
        }
        "generic" => {
            table.insert("format".into(), toml::Value::String("markdown".into()));
        }
        _ => return None,
    }
    Some(toml::Value::Table(table))
}
