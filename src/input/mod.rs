//! # Input Snapshot
//!
//! A per-frame view of keyboard, mouse, and cursor state, filled from
//! winit window events by the host. The editor components only ever poll
//! this snapshot — no callbacks, no global controller instance.

use std::collections::HashSet;

use cgmath::Vector2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    cursor: Vector2<f32>,
    window_size: Vector2<f32>,
}

impl InputState {
    pub fn new(window_width: f32, window_height: f32) -> Self {
        Self {
            keys: HashSet::new(),
            buttons: HashSet::new(),
            cursor: Vector2::new(0.0, 0.0),
            window_size: Vector2::new(window_width, window_height),
        }
    }

    /// Fold a winit window event into the snapshot.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.keys.insert(code);
                        }
                        ElementState::Released => {
                            self.keys.remove(&code);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.buttons.insert(*button);
                }
                ElementState::Released => {
                    self.buttons.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vector2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::Resized(size) => {
                self.window_size = Vector2::new(size.width as f32, size.height as f32);
            }
            _ => {}
        }
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Either control key, the multi-select modifier.
    pub fn ctrl_down(&self) -> bool {
        self.key_down(KeyCode::ControlLeft) || self.key_down(KeyCode::ControlRight)
    }

    /// Cursor position in window pixel coordinates, Y down.
    pub fn cursor(&self) -> Vector2<f32> {
        self.cursor
    }

    pub fn window_size(&self) -> Vector2<f32> {
        self.window_size
    }

    // Direct setters for hosts that poll their own input layer (and for
    // driving the components in tests).

    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.cursor = Vector2::new(x, y);
    }

    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Vector2::new(width, height);
    }

    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        if down {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }
}

/// Rising-edge detector for "fire once per press" handling.
///
/// Click and key actions must trigger on the not-pressed to pressed
/// transition, not on every frame the button is held.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeDetector {
    was_down: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level; returns true exactly once per press.
    pub fn rising(&mut self, down: bool) -> bool {
        let fired = down && !self.was_down;
        self.was_down = down;
        fired
    }
}
