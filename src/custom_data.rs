//! Conversion between Paddle custom data and flat string maps.
//!
//! Declarations only carry homogeneous `string -> string` maps, so values
//! coming back from the API are flattened into text. The conversion is lossy
//! on purpose: decoding never tries to recover the original JSON types.

use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::error::{Error, Result};
use crate::types::CustomData;

/// Flatten remote custom data into a string map. `None` stays `None`.
pub fn encode(custom_data: Option<&CustomData>) -> Result<Option<HashMap<String, String>>> {
    let Some(custom_data) = custom_data else {
        return Ok(None);
    };

    let mut result = HashMap::with_capacity(custom_data.len());
    for (key, value) in custom_data {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => render_number(n),
            Value::Bool(b) => b.to_string(),
            other => serde_json::to_string(other).map_err(|source| Error::Conversion {
                key: key.clone(),
                source,
            })?,
        };
        result.insert(key.clone(), rendered);
    }
    Ok(Some(result))
}

/// Lift a string map back into custom data. `None` stays `None`.
pub fn decode(map: Option<&HashMap<String, String>>) -> Option<CustomData> {
    map.map(|map| {
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    })
}

// Integral floats print without a fraction so `42.0` reads back as "42".
fn render_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
            return f.to_string();
        }
    }
    n.to_string()
}
