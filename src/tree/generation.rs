//! Generation tokens.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque token identifying one full update cycle.
///
/// Only compared for equality. Observers that need ordering (see
/// [`Reconciler`](crate::reconcile::Reconciler)) count distinct tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(Arc<str>);

impl Generation {
    /// Wrap a generation token.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Generation {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Generation {
    fn from(token: String) -> Self {
        Self(Arc::from(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_token() {
        assert_eq!(Generation::from("run-1"), Generation::new(String::from("run-1")));
        assert_ne!(Generation::from("run-1"), Generation::from("run-2"));
    }

    #[test]
    fn display_is_token() {
        assert_eq!(Generation::from("abc").to_string(), "abc");
    }
}
