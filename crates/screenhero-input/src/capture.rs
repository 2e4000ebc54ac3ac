//! Viewer-side input capture: turns local UI events into wire `InputEvent`s.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::InputError;
use crate::event::InputEvent;

#[async_trait]
pub trait InputCapture: Send {
    async fn start(&mut self) -> Result<(), InputError>;
    async fn stop(&mut self);
    /// Returns `None` once the capture source is stopped and drained.
    async fn next_event(&mut self) -> Option<InputEvent>;
}

/// Feeds a pre-scripted sequence of events, for pipeline tests that don't
/// need a real windowing toolkit.
pub struct ScriptedInputCapture {
    events: Option<mpsc::Receiver<InputEvent>>,
    sender: Option<mpsc::Sender<InputEvent>>,
}

impl ScriptedInputCapture {
    #[must_use]
    pub fn new(script: Vec<InputEvent>) -> Self {
        let (tx, rx) = mpsc::channel(script.len().max(1));
        for event in script {
            let _ = tx.try_send(event);
        }
        Self {
            events: Some(rx),
            sender: Some(tx),
        }
    }
}

#[async_trait]
impl InputCapture for ScriptedInputCapture {
    async fn start(&mut self) -> Result<(), InputError> {
        // Drop our sender half so the receiver drains to `None` once the
        // scripted events are consumed, rather than waiting forever.
        self.sender = None;
        Ok(())
    }

    async fn stop(&mut self) {
        self.events = None;
    }

    async fn next_event(&mut self) -> Option<InputEvent> {
        match self.events.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}
