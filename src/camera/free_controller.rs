//! Keyboard flight controls for free mode.
//!
//! Polls the input snapshot each frame: WASD/QE translate along the
//! camera's local axes, arrow keys look around. Yaw composes in the world
//! frame (left-multiplied) and pitch in the local frame (right-multiplied)
//! so roll never accumulates; pitch is deliberately unclamped.

use cgmath::{InnerSpace, Rad, Rotation, Vector3};
use winit::keyboard::KeyCode;

use crate::camera::{Camera, NavigationMode};
use crate::input::InputState;

pub struct KeyBindings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub look_left: KeyCode,
    pub look_right: KeyCode,
    pub look_up: KeyCode,
    pub look_down: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            move_up: KeyCode::KeyQ,
            move_down: KeyCode::KeyE,
            look_left: KeyCode::ArrowLeft,
            look_right: KeyCode::ArrowRight,
            look_up: KeyCode::ArrowUp,
            look_down: KeyCode::ArrowDown,
        }
    }
}

pub struct FreeLookController {
    pub bindings: KeyBindings,
    pub move_speed: f32,
    pub look_speed: f32,
}

impl Default for FreeLookController {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl FreeLookController {
    pub fn new(move_speed: f32, look_speed: f32) -> Self {
        Self {
            bindings: KeyBindings::default(),
            move_speed,
            look_speed,
        }
    }

    /// Apply one frame of keyboard motion. No-op unless the camera is in
    /// free mode.
    pub fn update(&self, input: &InputState, dt: f32, camera: &mut Camera) {
        if camera.mode() != NavigationMode::Free {
            return;
        }

        let axis = |pos: KeyCode, neg: KeyCode| -> f32 {
            (input.key_down(pos) as i8 - input.key_down(neg) as i8) as f32
        };

        let yaw = axis(self.bindings.look_right, self.bindings.look_left);
        let pitch = axis(self.bindings.look_down, self.bindings.look_up);
        if yaw != 0.0 || pitch != 0.0 {
            let transform = camera.free_transform_mut();
            // World-frame yaw first, then pitch about the (new) local
            // right axis. Both renormalize internally.
            if yaw != 0.0 {
                transform.rotate_world(Rad(yaw * self.look_speed * dt), Vector3::unit_y());
            }
            if pitch != 0.0 {
                transform.rotate_local(Rad(pitch * self.look_speed * dt), Vector3::unit_x());
            }
        }

        // Local-frame move direction. Y points down in this world, so
        // "up" is -Y.
        let step = Vector3::new(
            axis(self.bindings.move_right, self.bindings.move_left),
            axis(self.bindings.move_down, self.bindings.move_up),
            axis(self.bindings.move_forward, self.bindings.move_backward),
        );
        if step.magnitude2() > 0.0 {
            let transform = camera.free_transform_mut();
            let world_step = transform.rotation.rotate_vector(step.normalize());
            transform.translation += world_step * (self.move_speed * dt);
        }
    }
}
