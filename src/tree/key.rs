//! Stable keys: the identity of an element across generations.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::node::Element;

/// Identifier that lets an element be recognized as the same logical widget
/// in a later generation. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableKey(Arc<str>);

impl StableKey {
    /// Wrap a key string.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Extract the key embedded in an element's payload.
    ///
    /// Empty identifiers are treated as absent.
    pub fn from_element(element: &Element) -> Option<Self> {
        element
            .payload
            .id()
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StableKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StableKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for StableKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::ElementPayload;

    #[test]
    fn key_from_widget_id() {
        let element = Element::new(ElementPayload::Checkbox {
            id: Some("agree".into()),
            label: "I agree".into(),
            value: false,
        });
        assert_eq!(StableKey::from_element(&element), Some(StableKey::from("agree")));
    }

    #[test]
    fn outputs_are_unkeyed() {
        let element = Element::new(ElementPayload::Markdown { body: "# hi".into() });
        assert_eq!(StableKey::from_element(&element), None);
    }

    #[test]
    fn empty_id_is_unkeyed() {
        let element = Element::new(ElementPayload::Button {
            id: Some(String::new()),
            label: "Go".into(),
        });
        assert_eq!(element.stable_key(), None);
    }

    #[test]
    fn borrow_as_str_for_map_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(StableKey::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&StableKey::from("w-1")).unwrap();
        assert_eq!(json, "\"w-1\"");
    }
}
