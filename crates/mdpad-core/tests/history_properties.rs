use mdpad_core::{History, MAX_HISTORY_ENTRIES};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Record(String),
    Force(String),
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => "[a-c]{0,3}".prop_map(Op::Record),
        1 => "[a-c]{0,3}".prop_map(Op::Force),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn apply(history: &mut History, op: &Op) {
    match op {
        Op::Record(text) => {
            history.record(text);
        }
        Op::Force(text) => history.force_record(text),
        Op::Undo => {
            history.undo();
        }
        Op::Redo => {
            history.redo();
        }
    }
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(ops in prop::collection::vec(op(), 0..200)) {
        let mut history = History::new(String::new());
        for op in &ops {
            apply(&mut history, op);
            let cursor = history.cursor().expect("non-empty log has a cursor");
            prop_assert!(cursor < history.len());
            prop_assert!(history.len() <= MAX_HISTORY_ENTRIES);
            prop_assert_eq!(history.can_undo(), cursor > 0);
            prop_assert_eq!(history.can_redo(), cursor + 1 < history.len());
        }
    }

    #[test]
    fn undo_then_redo_restores_content(
        edits in prop::collection::vec("[a-z]{1,8}", 1..80),
    ) {
        let mut history = History::new("initial".to_string());
        for (idx, edit) in edits.iter().enumerate() {
            history.record(&format!("{idx}:{edit}"));
        }
        let before = history.current().map(str::to_string);

        prop_assert!(history.undo().is_some());
        prop_assert!(history.redo().is_some());
        prop_assert_eq!(history.current().map(str::to_string), before);
    }

    #[test]
    fn identical_record_changes_nothing(
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let mut history = History::new("seed".to_string());
        for op in &ops {
            apply(&mut history, op);
        }
        let current = history.current().unwrap_or_default().to_string();
        let len = history.len();
        let (undo, redo) = (history.can_undo(), history.can_redo());

        prop_assert!(!history.record(&current));
        prop_assert_eq!(history.len(), len);
        prop_assert_eq!(history.can_undo(), undo);
        prop_assert_eq!(history.can_redo(), redo);
    }
}

#[test]
fn oldest_entry_unreachable_after_cap_overflow() {
    let mut history = History::new("initial".to_string());
    for idx in 0..=MAX_HISTORY_ENTRIES {
        history.record(&format!("edit-{idx}"));
    }
    assert_eq!(history.len(), MAX_HISTORY_ENTRIES);

    let mut seen = Vec::new();
    while let Some(text) = history.undo() {
        seen.push(text.to_string());
    }
    assert!(!seen.iter().any(|text| text == "initial"));
    assert_eq!(history.current(), Some("edit-1"));
}
