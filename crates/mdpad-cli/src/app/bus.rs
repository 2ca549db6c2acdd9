use std::sync::mpsc::{self, Receiver, Sender};

use super::action::Action;

/// Typed command channel owned by the top-level app.
pub struct CommandBus {
    tx: Sender<Action>,
    rx: Receiver<Action>,
}

/// Send-only handle given to input sources.
#[derive(Clone)]
pub struct Dispatcher {
    tx: Sender<Action>,
}

impl CommandBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    pub fn try_next(&self) -> Option<Action> {
        self.rx.try_recv().ok()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn send(&self, action: Action) {
        if self.tx.send(action).is_err() {
            tracing::debug!("command bus closed, action dropped");
        }
    }
}
