//! Layered TOML value merging.
//!
//! Tables merge field-by-field, recursively. Arrays and scalars from the
//! higher layer replace the lower layer's value outright — slices are never
//! concatenated across layers.

/// Merge two TOML values. `overlay` is the higher-precedence layer.
#[must_use]
pub fn merge_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                match base_table.remove(&key) {
                    Some(base_val) => {
                        base_table.insert(key, merge_values(base_val, overlay_val));
                    }
                    None => {
                        base_table.insert(key, overlay_val);
                    }
                }
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an ordered stack of layers, lowest precedence first.
#[must_use]
pub fn merge_layers(layers: Vec<toml::Value>) -> toml::Value {
    let mut iter = layers.into_iter();
    let Some(first) = iter.next() else {
        return toml::Value::Table(toml::Table::new());
    };
    iter.fold(first, merge_values)
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
