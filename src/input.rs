use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};

/// Snapshot of the pointer and keyboard state consumed once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Pointer position in device pixels, origin top-left.
    pub cursor: Option<(f64, f64)>,
    /// Pointer movement since the previous poll, device pixels.
    pub delta: (f64, f64),
    pub primary_down: bool,
    /// True only on the poll following a secondary-button press.
    pub secondary_clicked: bool,
    pub reset_requested: bool,
}

/// Accumulates winit window events between polls.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    cursor: Option<(f64, f64)>,
    last_polled: Option<(f64, f64)>,
    primary_down: bool,
    secondary_down: bool,
    secondary_clicked: bool,
    reset_requested: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one window event; returns whether it was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent<'_>) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left();
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_input(*state, *button);
                true
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode,
                        ..
                    },
                ..
            } => {
                self.key_input(*state, *virtual_keycode);
                true
            }
            _ => false,
        }
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some((position.x, position.y));
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
        self.last_polled = None;
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.primary_down = pressed,
            MouseButton::Right => {
                if pressed && !self.secondary_down {
                    self.secondary_clicked = true;
                }
                self.secondary_down = pressed;
            }
            _ => {}
        }
    }

    pub fn key_input(&mut self, state: ElementState, key: Option<VirtualKeyCode>) {
        if state == ElementState::Pressed && key == Some(VirtualKeyCode::R) {
            self.reset_requested = true;
        }
    }

    /// Returns the state since the last poll and clears the edge flags.
    pub fn poll(&mut self) -> InputFrame {
        let delta = match (self.cursor, self.last_polled) {
            (Some(now), Some(before)) => (now.0 - before.0, now.1 - before.1),
            _ => (0.0, 0.0),
        };
        self.last_polled = self.cursor;
        let frame = InputFrame {
            cursor: self.cursor,
            delta,
            primary_down: self.primary_down,
            secondary_clicked: self.secondary_clicked,
            reset_requested: self.reset_requested,
        };
        self.secondary_clicked = false;
        self.reset_requested = false;
        frame
    }
}
