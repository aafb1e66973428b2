//! List response normalization.

use desk_client::Payload;
use serde_json::Value;

/// A normalized list response: `{items, total}` regardless of whether the
/// server answered with a bare array or a `{results, count}` envelope.
///
/// This is the single place envelope shapes are understood; screens never
/// branch on response shape themselves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    pub items: Vec<Value>,
    pub total: u64,
}

impl ListPage {
    /// An empty page.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a payload into a page.
    ///
    /// Anything that is neither a bare array nor a results envelope
    /// normalizes to an empty page.
    pub fn from_payload(payload: &Payload) -> Self {
        let Some(json) = payload.as_json() else {
            return Self::empty();
        };

        if let Value::Array(items) = json {
            return Self {
                items: items.clone(),
                total: items.len() as u64,
            };
        }

        if let Some(Value::Array(items)) = json.get("results") {
            let total = json
                .get("count")
                .and_then(|v| v.as_u64())
                .unwrap_or(items.len() as u64);
            return Self {
                items: items.clone(),
                total,
            };
        }

        Self::empty()
    }

    /// True when the page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items on this page (not the server-side total).
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
