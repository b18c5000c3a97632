//! Built-in seed document used on first load and as the parse-failure fallback.

use log::error;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

const SEED_JSON: &str = include_str!("../../data/seed.json");

static SEED: Lazy<Value> = Lazy::new(|| match serde_json::from_str::<Value>(SEED_JSON) {
    Ok(doc) if doc.is_object() => doc,
    Ok(_) => {
        error!("event=seed_load module=state status=error error_code=seed_not_object");
        Value::Object(Map::new())
    }
    Err(err) => {
        error!("event=seed_load module=state status=error error_code=seed_parse_failed error={err}");
        Value::Object(Map::new())
    }
});

/// Returns a fresh copy of the seed document.
pub fn seed_document() -> Value {
    SEED.clone()
}

#[cfg(test)]
mod tests {
    use super::seed_document;

    #[test]
    fn seed_has_every_top_level_collection() {
        let doc = seed_document();
        for key in ["user", "people", "org", "requests", "approvals", "settings", "events", "app"] {
            assert!(doc.get(key).is_some(), "seed is missing `{key}`");
        }
        assert_eq!(doc["org"]["root"]["id"], "p1");
    }
}
