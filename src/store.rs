//! Per-session analyzer storage

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::analysis::AclAnalyzer;

/// Session id to analyzer map.
///
/// Re-uploading under the same id replaces the previous analyzer. Entries are
/// only removed on request.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<AclAnalyzer>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an analyzer, returning true if it replaced an earlier one
    pub fn insert(&self, session_id: impl Into<String>, analyzer: AclAnalyzer) -> bool {
        let session_id = session_id.into();
        let replaced = self
            .sessions
            .insert(session_id.clone(), Arc::new(analyzer))
            .is_some();
        debug!(session_id = %session_id, replaced, "Stored session");
        replaced
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<AclAnalyzer>> {
        self.sessions.get(session_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, session_id: &str) -> Option<Arc<AclAnalyzer>> {
        self.sessions.remove(session_id).map(|(_, analyzer)| analyzer)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stored session ids, sorted
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::parse_str;
    use std::thread;

    fn analyzer(content: &str) -> AclAnalyzer {
        AclAnalyzer::new(parse_str(content).unwrap())
    }

    #[test]
    fn test_insert_and_get() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        assert!(store.get("a.acl").is_none());

        assert!(!store.insert("a.acl", analyzer("user a\n")));
        let found = store.get("a.acl").unwrap();
        assert!(found.rule_set().contains_client("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reupload_overwrites() {
        let store = SessionStore::new();
        store.insert("s", analyzer("user old\n"));
        let held = store.get("s").unwrap();

        assert!(store.insert("s", analyzer("user new\n")));
        assert_eq!(store.len(), 1);
        assert!(store.get("s").unwrap().rule_set().contains_client("new"));
        // Readers holding the old analyzer keep it
        assert!(held.rule_set().contains_client("old"));
    }

    #[test]
    fn test_remove_and_ids() {
        let store = SessionStore::new();
        store.insert("b", analyzer(""));
        store.insert("a", analyzer(""));
        assert_eq!(store.session_ids(), vec!["a", "b"]);

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert_eq!(store.session_ids(), vec!["b"]);
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.insert(format!("s{}", i), analyzer("user a\ntopic read t\n"));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
