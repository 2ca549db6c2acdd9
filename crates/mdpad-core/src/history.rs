use std::collections::VecDeque;

pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Linear snapshot log with a cursor pointing at the displayed entry.
///
/// Recording after an undo discards every entry past the cursor. Once the
/// log grows past [`MAX_HISTORY_ENTRIES`] the oldest snapshot is evicted.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    cursor: Option<usize>,
}

impl History {
    pub fn new(initial: String) -> Self {
        let mut entries = VecDeque::with_capacity(MAX_HISTORY_ENTRIES + 1);
        entries.push_back(initial);
        Self {
            entries,
            cursor: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` iff the log is empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|idx| self.entries.get(idx))
            .map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(idx) if idx > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(idx) if idx + 1 < self.entries.len())
    }

    /// Appends `content` unless it equals the current snapshot.
    pub fn record(&mut self, content: &str) -> bool {
        if self.current() == Some(content) {
            return false;
        }
        self.push(content.to_string());
        true
    }

    /// Appends `content` even when it matches the current snapshot.
    pub fn force_record(&mut self, content: &str) {
        self.push(content.to_string());
    }

    pub fn undo(&mut self) -> Option<&str> {
        let idx = self.cursor.filter(|idx| *idx > 0)? - 1;
        self.cursor = Some(idx);
        self.entries.get(idx).map(String::as_str)
    }

    pub fn redo(&mut self) -> Option<&str> {
        let idx = self.cursor.filter(|idx| idx + 1 < self.entries.len())? + 1;
        self.cursor = Some(idx);
        self.entries.get(idx).map(String::as_str)
    }

    fn push(&mut self, content: String) {
        let keep = self.cursor.map_or(0, |idx| idx + 1);
        self.entries.truncate(keep);
        self.entries.push_back(content);

        if self.entries.len() > MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
            tracing::debug!(cap = MAX_HISTORY_ENTRIES, "evicted oldest history entry");
        }
        self.cursor = Some(self.entries.len() - 1);
    }
}
