//! Reconciler entries and mounted output.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::tree::key::StableKey;
use crate::tree::node::Node;

new_key_type! {
    /// Slot of a retained entry inside a reconciler's arena.
    pub struct EntryId;
}

/// One keyed element remembered across generations.
#[derive(Debug)]
pub struct Entry<R> {
    pub key: StableKey,
    /// The node the output was rendered from. Compared by pointer.
    pub node: Arc<Node>,
    pub output: Rc<R>,
    /// Reconciler epoch in which the key last appeared.
    pub last_seen: u64,
    pub hidden: bool,
}

/// Whether a mounted output should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    /// Mounted but not displayed (the `display: none` case). The consumer
    /// must keep it alive rather than unmount it.
    Hidden,
}

/// One item of reconciler output.
pub struct Mounted<R> {
    pub output: Rc<R>,
    /// `None` for un-keyed nodes, which are rendered fresh every pass.
    pub key: Option<StableKey>,
    pub visibility: Visibility,
}

impl<R> Mounted<R> {
    /// A displayed output.
    pub fn visible(output: Rc<R>, key: Option<StableKey>) -> Self {
        Self {
            output,
            key,
            visibility: Visibility::Visible,
        }
    }

    /// A retained output that stays mounted but is not displayed. Only keyed
    /// outputs can be hidden.
    pub fn hidden(output: Rc<R>, key: StableKey) -> Self {
        Self {
            output,
            key: Some(key),
            visibility: Visibility::Hidden,
        }
    }

    /// Whether this output should be displayed.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

// Manual impl so Mounted<R> is Clone without R: Clone.
impl<R> Clone for Mounted<R> {
    fn clone(&self) -> Self {
        Self {
            output: Rc::clone(&self.output),
            key: self.key.clone(),
            visibility: self.visibility,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Mounted<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mounted")
            .field("output", &self.output)
            .field("key", &self.key)
            .field("visibility", &self.visibility)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_output() {
        let mounted = Mounted::visible(Rc::new(String::from("x")), None);
        let copy = mounted.clone();
        assert!(Rc::ptr_eq(&mounted.output, &copy.output));
    }

    #[test]
    fn hidden_constructor() {
        let mounted = Mounted::hidden(Rc::new(1), StableKey::from("k"));
        assert!(!mounted.is_visible());
        assert_eq!(mounted.key, Some(StableKey::from("k")));
    }

    #[test]
    fn entry_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<EntryId>();
    }
}
