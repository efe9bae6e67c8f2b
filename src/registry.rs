//! In-process mirror of kernel-side thread handles.
//!
//! The registry never talks to the kernel itself. Entries are inserted only
//! after the kernel confirms a creation and removed only after it confirms a
//! destruction; the session enforces that ordering.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A kernel-assigned thread identifier paired with its caller-given name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle {
    pub id: u32,
    pub name: String,
}

/// Insertion-ordered id-to-name mapping.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    handles: Vec<ThreadHandle>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle. Identifiers are unique among live entries; a
    /// duplicate means the kernel and the registry have diverged.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) -> Result<()> {
        if self.contains(id) {
            return Err(Error::inconsistency(format!(
                "thread id {id} is already registered"
            )));
        }
        self.handles.push(ThreadHandle {
            id,
            name: name.into(),
        });
        Ok(())
    }

    /// Remove a handle, returning whether it was present.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| h.id != id);
        self.handles.len() != before
    }

    pub fn contains(&self, id: u32) -> bool {
        self.handles.iter().any(|h| h.id == id)
    }

    /// Current entries in insertion order.
    pub fn list(&self) -> &[ThreadHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_list_in_insertion_order() {
        let mut reg = ThreadRegistry::new();
        reg.insert(3, "worker-3").unwrap();
        reg.insert(1, "worker-1").unwrap();
        reg.insert(2, "worker-2").unwrap();

        let names: Vec<&str> = reg.list().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["worker-3", "worker-1", "worker-2"]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_list_is_restartable() {
        let mut reg = ThreadRegistry::new();
        reg.insert(1, "a").unwrap();
        reg.insert(2, "b").unwrap();

        let first: Vec<u32> = reg.list().iter().map(|h| h.id).collect();
        let second: Vec<u32> = reg.list().iter().map(|h| h.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_insert_is_inconsistency() {
        let mut reg = ThreadRegistry::new();
        reg.insert(7, "first").unwrap();

        let err = reg.insert(7, "second").unwrap_err();
        assert!(matches!(err, Error::Inconsistency { .. }));
        // The first entry must be untouched
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.list()[0].name, "first");
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut reg = ThreadRegistry::new();
        reg.insert(5, "worker").unwrap();

        assert!(reg.remove(5));
        assert!(!reg.remove(5));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut reg = ThreadRegistry::new();
        reg.insert(1, "a").unwrap();
        reg.insert(2, "b").unwrap();
        reg.insert(3, "c").unwrap();

        assert!(reg.remove(2));
        let ids: Vec<u32> = reg.list().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_clear_empties_registry() {
        let mut reg = ThreadRegistry::new();
        reg.insert(1, "a").unwrap();
        reg.insert(2, "b").unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.list(), &[]);
    }

    #[test]
    fn test_id_reuse_after_removal_is_allowed() {
        let mut reg = ThreadRegistry::new();
        reg.insert(1, "old").unwrap();
        assert!(reg.remove(1));
        reg.insert(1, "new").unwrap();
        assert_eq!(reg.list()[0].name, "new");
    }
}
