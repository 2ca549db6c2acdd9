use crate::history::History;
use crate::store::{PersistentStore, STORAGE_KEY};
use crate::templates::DEFAULT_DOCUMENT;

/// The document model: current text, its undo log, and the store every
/// mutation is mirrored to.
pub struct Session {
    content: String,
    history: History,
    store: Box<dyn PersistentStore>,
}

impl Session {
    /// Seeds the document from the store, or from the built-in welcome
    /// document when nothing usable is stored.
    pub fn open(store: Box<dyn PersistentStore>) -> Self {
        let stored = match store.get(STORAGE_KEY) {
            Ok(stored) => stored.filter(|text| !text.is_empty()),
            Err(err) => {
                tracing::warn!(%err, "could not read stored document");
                None
            }
        };

        let mut session = Self {
            content: String::new(),
            history: History::default(),
            store,
        };

        match stored {
            Some(text) => {
                session.history = History::new(text.clone());
                session.content = text;
            }
            None => {
                session.history = History::new(DEFAULT_DOCUMENT.to_string());
                session.content = DEFAULT_DOCUMENT.to_string();
                session.persist();
            }
        }
        session
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Sets the document to `next`, recording a snapshot only when the text
    /// actually changed.
    pub fn apply(&mut self, next: String) -> bool {
        let recorded = self.history.record(&next);
        if next != self.content {
            self.content = next;
            self.persist();
        }
        recorded
    }

    /// Loads an imported file. Always recorded, even when identical.
    pub fn import(&mut self, text: String) {
        self.history.force_record(&text);
        self.content = text;
        self.persist();
    }

    pub fn clear(&mut self) -> bool {
        self.apply(String::new())
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.undo() else {
            return false;
        };
        self.content = prev.to_string();
        self.persist();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo() else {
            return false;
        };
        self.content = next.to_string();
        self.persist();
        true
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.set(STORAGE_KEY, &self.content) {
            tracing::warn!(%err, "document not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use crate::store::{MemoryStore, PersistentStore, STORAGE_KEY, StoreError};
    use crate::templates::DEFAULT_DOCUMENT;

    use super::Session;

    /// Shares its map with the test so writes can be observed.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl PersistentStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    struct BrokenStore;

    impl PersistentStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Read {
                key: key.to_string(),
                source: io::Error::other("disk gone"),
            })
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                key: key.to_string(),
                source: io::Error::other("disk gone"),
            })
        }
    }

    fn stored(store: &SharedStore) -> Option<String> {
        store.0.borrow().get(STORAGE_KEY).expect("get")
    }

    #[test]
    fn empty_store_seeds_and_persists_default_document() {
        let store = SharedStore::default();
        let session = Session::open(Box::new(store.clone()));

        assert_eq!(session.content(), DEFAULT_DOCUMENT);
        assert_eq!(stored(&store).as_deref(), Some(DEFAULT_DOCUMENT));
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn stored_document_wins_over_default() {
        let session = Session::open(Box::new(MemoryStore::with_value(STORAGE_KEY, "# mine")));
        assert_eq!(session.content(), "# mine");
    }

    #[test]
    fn every_mutation_is_mirrored_to_the_store() {
        let store = SharedStore::default();
        let mut session = Session::open(Box::new(store.clone()));

        session.apply("one".into());
        assert_eq!(stored(&store).as_deref(), Some("one"));

        session.undo();
        assert_eq!(stored(&store).as_deref(), Some(DEFAULT_DOCUMENT));

        session.redo();
        assert_eq!(stored(&store).as_deref(), Some("one"));

        session.import("imported".into());
        assert_eq!(stored(&store).as_deref(), Some("imported"));

        session.clear();
        assert_eq!(stored(&store).as_deref(), Some(""));
    }

    #[test]
    fn identical_apply_does_not_grow_history() {
        let mut session = Session::open(Box::new(MemoryStore::new()));
        assert!(session.apply("a".into()));
        assert!(!session.apply("a".into()));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.content(), "a");
    }

    #[test]
    fn import_records_even_identical_text() {
        let mut session = Session::open(Box::new(MemoryStore::with_value(STORAGE_KEY, "same")));
        session.import("same".into());
        assert_eq!(session.history().len(), 2);
        assert!(session.can_undo());
    }

    #[test]
    fn undo_redo_report_noops() {
        let mut session = Session::open(Box::new(MemoryStore::new()));
        assert!(!session.undo());
        assert!(!session.redo());

        session.apply("x".into());
        assert!(session.undo());
        assert!(session.redo());
        assert!(!session.redo());
        assert_eq!(session.content(), "x");
    }

    #[test]
    fn clear_is_undoable() {
        let mut session = Session::open(Box::new(MemoryStore::with_value(STORAGE_KEY, "text")));
        assert!(session.clear());
        assert_eq!(session.content(), "");
        assert!(session.undo());
        assert_eq!(session.content(), "text");
    }

    #[test]
    fn broken_store_never_breaks_the_session() {
        let mut session = Session::open(Box::new(BrokenStore));
        assert_eq!(session.content(), DEFAULT_DOCUMENT);

        session.apply("still works".into());
        assert!(session.undo());
        assert_eq!(session.content(), DEFAULT_DOCUMENT);
    }
}
