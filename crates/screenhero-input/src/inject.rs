//! Host-side input injection: drives OS input APIs from received
//! `InputEvent`s, synthesizing the right drag/move flavor when multiple
//! mouse buttons are held at once.

use async_trait::async_trait;

use crate::error::InputError;
use crate::event::{InputEvent, InputEventType};

/// Mouse button identifiers as carried on the wire `button` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    #[must_use]
    pub fn from_wire_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Middle),
            _ => None,
        }
    }

    fn mask_bit(self) -> u8 {
        match self {
            Self::Left => 1 << 0,
            Self::Right => 1 << 1,
            Self::Middle => 1 << 2,
        }
    }
}

/// Tracks which mouse buttons are currently held, so a `MouseMove` while
/// dragging can be attributed to the correct button.
///
/// When more than one button is held, the dominant button for a synthesized
/// drag is chosen by priority: left, then right, then middle.
#[derive(Debug, Default, Clone, Copy)]
pub struct ButtonState(u8);

impl ButtonState {
    #[must_use]
    pub fn new() -> Self {
        Self(0)
    }

    pub fn press(&mut self, button: MouseButton) {
        self.0 |= button.mask_bit();
    }

    pub fn release(&mut self, button: MouseButton) {
        self.0 &= !button.mask_bit();
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.0 != 0
    }

    /// The button a synthesized drag event should be attributed to, by
    /// left > right > middle priority.
    #[must_use]
    pub fn dominant(&self) -> Option<MouseButton> {
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            if self.0 & button.mask_bit() != 0 {
                return Some(button);
            }
        }
        None
    }
}

/// The concrete OS action an `InputEvent` resolves to, after button-state
/// tracking. This is what an `InputInjection` implementation actually
/// performs; it is exposed so tests can assert on synthesized behavior
/// without a real OS backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InjectedAction {
    MouseMoved { x: f32, y: f32 },
    MouseDragged { x: f32, y: f32, button: MouseButton },
    MouseDown { x: f32, y: f32, button: MouseButton },
    MouseUp { x: f32, y: f32, button: MouseButton },
    Scroll { dx: f32, dy: f32 },
    KeyDown { key_code: u16, modifiers: u8 },
    KeyUp { key_code: u16, modifiers: u8 },
    ReleaseAllButtons,
}

#[async_trait]
pub trait InputInjection: Send {
    async fn perform(&mut self, action: InjectedAction) -> Result<(), InputError>;
}

/// Resolves a raw wire `InputEvent` into the `InjectedAction` an
/// `InputInjection` backend should perform, updating button state along
/// the way. A `MouseMove` while any button is held becomes a
/// `MouseDragged` for the dominant button rather than a plain move.
pub struct InputInjector<B> {
    backend: B,
    buttons: ButtonState,
}

impl<B: InputInjection> InputInjector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            buttons: ButtonState::new(),
        }
    }

    pub async fn handle(&mut self, event: &InputEvent) -> Result<(), InputError> {
        let action = match event.event_type {
            InputEventType::MouseMove => {
                if let Some(button) = self.buttons.dominant() {
                    InjectedAction::MouseDragged {
                        x: event.x,
                        y: event.y,
                        button,
                    }
                } else {
                    InjectedAction::MouseMoved { x: event.x, y: event.y }
                }
            }
            InputEventType::MouseDown => {
                let button = MouseButton::from_wire_u8(event.button)
                    .ok_or_else(|| InputError::Malformed("unknown mouse button".to_string()))?;
                self.buttons.press(button);
                InjectedAction::MouseDown {
                    x: event.x,
                    y: event.y,
                    button,
                }
            }
            InputEventType::MouseUp => {
                let button = MouseButton::from_wire_u8(event.button)
                    .ok_or_else(|| InputError::Malformed("unknown mouse button".to_string()))?;
                self.buttons.release(button);
                InjectedAction::MouseUp {
                    x: event.x,
                    y: event.y,
                    button,
                }
            }
            InputEventType::Scroll => InjectedAction::Scroll {
                dx: event.x,
                dy: event.y,
            },
            InputEventType::KeyDown => InjectedAction::KeyDown {
                key_code: event.key_code,
                modifiers: event.modifiers,
            },
            InputEventType::KeyUp => InjectedAction::KeyUp {
                key_code: event.key_code,
                modifiers: event.modifiers,
            },
            InputEventType::ReleaseCapture => {
                self.buttons = ButtonState::new();
                InjectedAction::ReleaseAllButtons
            }
            InputEventType::CursorPosition => return Ok(()),
        };
        self.backend.perform(action).await
    }
}

/// Records every action performed, for assertions in tests.
#[derive(Default)]
pub struct RecordingInjector {
    pub actions: Vec<InjectedAction>,
}

#[async_trait]
impl InputInjection for RecordingInjector {
    async fn perform(&mut self, action: InjectedAction) -> Result<(), InputError> {
        self.actions.push(action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_event(x: f32, y: f32) -> InputEvent {
        InputEvent {
            event_type: InputEventType::MouseMove,
            timestamp_ns: 0,
            x,
            y,
            button: 0,
            key_code: 0,
            modifiers: 0,
        }
    }

    fn button_event(ty: InputEventType, button: u8) -> InputEvent {
        InputEvent {
            event_type: ty,
            timestamp_ns: 0,
            x: 0.0,
            y: 0.0,
            button,
            key_code: 0,
            modifiers: 0,
        }
    }

    #[tokio::test]
    async fn plain_move_with_no_buttons_held() {
        let mut injector = InputInjector::new(RecordingInjector::default());
        injector.handle(&move_event(0.1, 0.2)).await.unwrap();
        assert_eq!(
            injector.backend.actions,
            vec![InjectedAction::MouseMoved { x: 0.1, y: 0.2 }]
        );
    }

    #[tokio::test]
    async fn move_while_left_held_synthesizes_left_drag() {
        let mut injector = InputInjector::new(RecordingInjector::default());
        injector
            .handle(&button_event(InputEventType::MouseDown, 0))
            .await
            .unwrap();
        injector.handle(&move_event(0.3, 0.4)).await.unwrap();
        assert_eq!(
            injector.backend.actions[1],
            InjectedAction::MouseDragged {
                x: 0.3,
                y: 0.4,
                button: MouseButton::Left
            }
        );
    }

    #[tokio::test]
    async fn left_takes_priority_over_right_and_middle() {
        let mut injector = InputInjector::new(RecordingInjector::default());
        injector
            .handle(&button_event(InputEventType::MouseDown, 2))
            .await
            .unwrap(); // middle
        injector
            .handle(&button_event(InputEventType::MouseDown, 1))
            .await
            .unwrap(); // right
        injector
            .handle(&button_event(InputEventType::MouseDown, 0))
            .await
            .unwrap(); // left
        injector.handle(&move_event(0.5, 0.5)).await.unwrap();
        let last = injector.backend.actions.last().unwrap();
        assert_eq!(
            *last,
            InjectedAction::MouseDragged {
                x: 0.5,
                y: 0.5,
                button: MouseButton::Left
            }
        );
    }

    #[tokio::test]
    async fn releasing_left_falls_back_to_right_drag() {
        let mut injector = InputInjector::new(RecordingInjector::default());
        injector
            .handle(&button_event(InputEventType::MouseDown, 1))
            .await
            .unwrap();
        injector
            .handle(&button_event(InputEventType::MouseDown, 0))
            .await
            .unwrap();
        injector
            .handle(&button_event(InputEventType::MouseUp, 0))
            .await
            .unwrap();
        injector.handle(&move_event(0.1, 0.1)).await.unwrap();
        let last = injector.backend.actions.last().unwrap();
        assert_eq!(
            *last,
            InjectedAction::MouseDragged {
                x: 0.1,
                y: 0.1,
                button: MouseButton::Right
            }
        );
    }

    #[tokio::test]
    async fn release_capture_clears_button_state() {
        let mut injector = InputInjector::new(RecordingInjector::default());
        injector
            .handle(&button_event(InputEventType::MouseDown, 0))
            .await
            .unwrap();
        injector
            .handle(&button_event(InputEventType::ReleaseCapture, 0))
            .await
            .unwrap();
        injector.handle(&move_event(0.2, 0.2)).await.unwrap();
        let last = injector.backend.actions.last().unwrap();
        assert_eq!(*last, InjectedAction::MouseMoved { x: 0.2, y: 0.2 });
    }
}
