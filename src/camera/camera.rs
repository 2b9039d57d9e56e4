//! The camera: derived matrices plus orbit/free navigation state.

use cgmath::{
    Angle, InnerSpace, Matrix4, Quaternion, Rad, Rotation, Rotation3, SquareMatrix, Vector2,
    Vector3, Vector4,
};
use log::debug;

use crate::camera::CameraError;
use crate::geometry::intersect::Ray;
use crate::scene::Transform;

/// Orbit distance never collapses below this (perspective zoom clamp).
const MIN_ORBIT_DISTANCE: f32 = 0.5;
/// Orthographic half-size clamp.
const MIN_ORTHO_SIZE: f32 = 0.1;
/// Default orbit distance after a view reset.
const DEFAULT_ORBIT_DISTANCE: f32 = 10.0;
/// Default orthographic half-size after a view reset.
const DEFAULT_ORTHO_SIZE: f32 = 5.0;
/// Fixed reference half-fov used to scale perspective panning so it
/// matches apparent on-screen movement.
const REFERENCE_HALF_FOV: Rad<f32> = Rad(std::f32::consts::PI * 25.0 / 180.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// First-person flight driven by the free transform.
    Free,
    /// Orbit around the target point.
    Cad,
}

/// The tracked view orientation. Presets come from [`Camera::reset_to_preset`];
/// any interactive orbit degrades the type to `Free` so dependent systems
/// (construction-plane derivation) can react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Front,
    Top,
    Right,
    Isometric,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

pub struct Camera {
    // Derived state, rebuilt each frame. Never the source of truth.
    projection: Matrix4<f32>,
    view: Matrix4<f32>,

    mode: NavigationMode,
    projection_kind: ProjectionKind,

    // CAD state
    target: Vector3<f32>,
    orbit_distance: f32,
    orbit_rotation: Quaternion<f32>,
    ortho_size: f32,
    view_type: ViewType,

    // Free state (scale unused)
    free_transform: Transform,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            mode: NavigationMode::Cad,
            projection_kind: ProjectionKind::Perspective,
            target: Vector3::new(0.0, 0.0, 0.0),
            orbit_distance: DEFAULT_ORBIT_DISTANCE,
            orbit_rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            ortho_size: DEFAULT_ORTHO_SIZE,
            view_type: ViewType::Front,
            free_transform: Transform::default(),
        };
        camera.update_view();
        camera
    }

    // ------------------------------------------------------------------
    // Projection

    /// Vulkan-style perspective projection, depth 0..1.
    ///
    /// A non-positive or non-finite aspect would make the matrix singular,
    /// so it is rejected and the current projection left untouched.
    pub fn set_perspective(
        &mut self,
        fovy: Rad<f32>,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<(), CameraError> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidAspect(aspect));
        }

        let tan_half = (fovy / 2.0).tan();
        self.projection = Matrix4::new(
            1.0 / (aspect * tan_half),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0 / tan_half,
            0.0,
            0.0,
            0.0,
            0.0,
            far / (far - near),
            1.0,
            0.0,
            0.0,
            -(far * near) / (far - near),
            0.0,
        );
        self.projection_kind = ProjectionKind::Perspective;
        Ok(())
    }

    /// Vulkan-style orthographic projection, depth 0..1.
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Matrix4::new(
            2.0 / (right - left),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / (bottom - top),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0 / (far - near),
            0.0,
            -(right + left) / (right - left),
            -(bottom + top) / (bottom - top),
            -near / (far - near),
            1.0,
        );
        self.projection_kind = ProjectionKind::Orthographic;
    }

    /// Orthographic projection derived from the current half-size and an
    /// aspect ratio, the shape CAD mode wants each frame.
    pub fn set_orthographic_from_size(&mut self, aspect: f32, near: f32, far: f32) {
        let size = self.ortho_size;
        self.set_orthographic(-size * aspect, size * aspect, -size, size, near, far);
    }

    // ------------------------------------------------------------------
    // Accessors

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn inverse_view(&self) -> Matrix4<f32> {
        self.view.invert().unwrap_or_else(Matrix4::identity)
    }

    /// Camera world position: the translation column of the inverse view.
    pub fn position(&self) -> Vector3<f32> {
        self.inverse_view().w.truncate()
    }

    /// The direction the camera looks along, from the active mode's state.
    pub fn forward(&self) -> Vector3<f32> {
        match self.mode {
            NavigationMode::Cad => self.orbit_rotation.rotate_vector(Vector3::unit_z()),
            NavigationMode::Free => self.free_transform.forward(),
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn projection_kind(&self) -> ProjectionKind {
        self.projection_kind
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    pub fn orbit_distance(&self) -> f32 {
        self.orbit_distance
    }

    pub fn ortho_size(&self) -> f32 {
        self.ortho_size
    }

    pub fn orbit_rotation(&self) -> Quaternion<f32> {
        self.orbit_rotation
    }

    pub fn free_transform(&self) -> &Transform {
        &self.free_transform
    }

    pub fn free_transform_mut(&mut self) -> &mut Transform {
        &mut self.free_transform
    }

    // ------------------------------------------------------------------
    // Mode

    /// Switch navigation modes. The new mode's stored state is
    /// authoritative; the view is recomputed from it immediately so the
    /// next frame doesn't render with a stale matrix.
    pub fn set_mode(&mut self, mode: NavigationMode) {
        if self.mode != mode {
            debug!("camera mode -> {mode:?}");
        }
        self.mode = mode;
        self.update_view();
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            NavigationMode::Free => NavigationMode::Cad,
            NavigationMode::Cad => NavigationMode::Free,
        };
        self.set_mode(next);
    }

    // ------------------------------------------------------------------
    // CAD navigation

    /// Orbit the camera around the target: incremental yaw about the
    /// current local up axis, then pitch about the local right axis,
    /// composed onto the accumulated rotation. Renormalizing after every
    /// composition keeps the quaternion from drifting off unit length.
    pub fn orbit(&mut self, delta_yaw: Rad<f32>, delta_pitch: Rad<f32>) {
        if self.mode != NavigationMode::Cad {
            return;
        }

        let up = self.orbit_rotation.rotate_vector(Vector3::unit_y());
        let right = self.orbit_rotation.rotate_vector(Vector3::unit_x());

        let yaw = Quaternion::from_axis_angle(up.normalize(), delta_yaw);
        let pitch = Quaternion::from_axis_angle(right.normalize(), delta_pitch);

        self.orbit_rotation = (pitch * (yaw * self.orbit_rotation)).normalize();
        self.view_type = ViewType::Free;
    }

    /// Move the target along the view's local right/up axes. The step is
    /// scaled so pan speed matches apparent on-screen movement for either
    /// projection type.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        if self.mode != NavigationMode::Cad {
            return;
        }

        let scale = match self.projection_kind {
            ProjectionKind::Orthographic => self.ortho_size,
            ProjectionKind::Perspective => self.orbit_distance * REFERENCE_HALF_FOV.tan(),
        };

        let right = self.orbit_rotation.rotate_vector(Vector3::unit_x());
        let up = self.orbit_rotation.rotate_vector(-Vector3::unit_y());
        self.target += right * (delta_x * scale) + up * (delta_y * scale);
    }

    /// Zoom in (positive delta) or out. Perspective adjusts the orbit
    /// distance, orthographic the half-size, each clamped to a sane
    /// minimum.
    ///
    /// With an anchor point (the world position under the cursor), the
    /// target is re-centered so the anchor keeps its screen position
    /// approximately: the anchor is projected onto the target's plane
    /// along the view forward axis and the target slides toward it in
    /// proportion to the zoom ratio.
    pub fn zoom(&mut self, delta: f32, anchor: Option<Vector3<f32>>) {
        if self.mode != NavigationMode::Cad {
            return;
        }

        let (old, new) = match self.projection_kind {
            ProjectionKind::Perspective => {
                let old = self.orbit_distance;
                self.orbit_distance = (old - delta).max(MIN_ORBIT_DISTANCE);
                (old, self.orbit_distance)
            }
            ProjectionKind::Orthographic => {
                let old = self.ortho_size;
                self.ortho_size = (old - delta).max(MIN_ORTHO_SIZE);
                (old, self.ortho_size)
            }
        };

        if let Some(anchor) = anchor {
            let ratio = new / old;
            let forward = self.orbit_rotation.rotate_vector(Vector3::unit_z());
            let projected = anchor - forward * (anchor - self.target).dot(forward);
            self.target = projected + (self.target - projected) * ratio;
        }
    }

    /// Snap the orbit to a preset orientation, re-centering the target at
    /// the world origin and restoring the default distances.
    pub fn reset_to_preset(&mut self, view: ViewType) {
        self.orbit_rotation = preset_rotation(view);
        self.target = Vector3::new(0.0, 0.0, 0.0);
        self.orbit_distance = DEFAULT_ORBIT_DISTANCE;
        self.ortho_size = DEFAULT_ORTHO_SIZE;
        self.view_type = view;
        debug!("camera preset -> {view:?}");
        self.update_view();
    }

    // ------------------------------------------------------------------
    // View matrix

    /// Recompute the view matrix from the active mode's state. Call once
    /// per frame, before any component builds a pick ray.
    pub fn update_view(&mut self) {
        match self.mode {
            NavigationMode::Cad => {
                let back = self.orbit_rotation.rotate_vector(Vector3::unit_z());
                let position = self.target - back * self.orbit_distance;
                let up = self.orbit_rotation.rotate_vector(-Vector3::unit_y());
                self.set_view_target(position, self.target, up);
            }
            NavigationMode::Free => {
                self.set_view_from_transform(
                    self.free_transform.translation,
                    self.free_transform.rotation,
                );
            }
        }
    }

    /// Look-at style view matrix. A forward vector parallel to the up
    /// vector would make the basis singular, so a fallback up is
    /// substituted before orthonormalizing.
    pub fn set_view_direction(
        &mut self,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        up: Vector3<f32>,
    ) {
        let w = direction.normalize();
        let mut up = up;
        if w.dot(up.normalize()).abs() > 0.99 {
            up = Vector3::unit_x();
        }
        let u = w.cross(up).normalize();
        let v = w.cross(u);

        self.view = Matrix4::new(
            u.x,
            v.x,
            w.x,
            0.0,
            u.y,
            v.y,
            w.y,
            0.0,
            u.z,
            v.z,
            w.z,
            0.0,
            -u.dot(position),
            -v.dot(position),
            -w.dot(position),
            1.0,
        );
    }

    pub fn set_view_target(
        &mut self,
        position: Vector3<f32>,
        target: Vector3<f32>,
        up: Vector3<f32>,
    ) {
        self.set_view_direction(position, target - position, up);
    }

    /// View matrix from a camera transform: the inverse of translate *
    /// rotate, built directly from the conjugate rotation.
    pub fn set_view_from_transform(&mut self, position: Vector3<f32>, rotation: Quaternion<f32>) {
        self.view = Matrix4::from(rotation.conjugate()) * Matrix4::from_translation(-position);
    }

    // ------------------------------------------------------------------
    // Picking support

    /// Build the world-space ray under a window pixel by unprojecting the
    /// near and far clip points. Returns `None` for a degenerate window
    /// size or non-invertible matrices — a malformed frame picks nothing
    /// rather than crashing.
    pub fn screen_ray(&self, cursor: Vector2<f32>, window: Vector2<f32>) -> Option<Ray> {
        if window.x <= 0.0 || window.y <= 0.0 {
            return None;
        }

        // Window pixels to NDC. Vulkan: Y already points down, no flip.
        let ndc_x = 2.0 * cursor.x / window.x - 1.0;
        let ndc_y = 2.0 * cursor.y / window.y - 1.0;

        let inv_projection = self.projection.invert()?;
        let inv_view = self.view.invert()?;

        let mut near = inv_projection * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let mut far = inv_projection * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        if near.w.abs() < f32::EPSILON || far.w.abs() < f32::EPSILON {
            return None;
        }
        near /= near.w;
        far /= far.w;

        let world_near = (inv_view * near).truncate();
        let world_far = (inv_view * far).truncate();

        let direction = world_far - world_near;
        if direction.magnitude2() < f32::EPSILON {
            return None;
        }

        // Origin is the camera position, not the near point, so hit
        // distances rank from the eye.
        Some(Ray::new(inv_view.w.truncate(), direction))
    }

    /// Project a world point to window pixel coordinates. `None` when the
    /// point sits on the camera plane (w ~ 0).
    pub fn project_to_screen(
        &self,
        point: Vector3<f32>,
        window: Vector2<f32>,
    ) -> Option<Vector2<f32>> {
        let clip = self.projection * self.view * point.extend(1.0);
        if clip.w.abs() < f32::EPSILON {
            return None;
        }
        let ndc = clip / clip.w;
        Some(Vector2::new(
            (ndc.x + 1.0) * 0.5 * window.x,
            (ndc.y + 1.0) * 0.5 * window.y,
        ))
    }
}

/// Preset orbit orientations. Front is the identity; the others are the
/// standard CAD rotations about the world axes.
fn preset_rotation(view: ViewType) -> Quaternion<f32> {
    let deg = |d: f32| Rad(d.to_radians());
    match view {
        ViewType::Front | ViewType::Free => Quaternion::new(1.0, 0.0, 0.0, 0.0),
        ViewType::Top => Quaternion::from_axis_angle(Vector3::unit_x(), deg(-90.0)),
        ViewType::Right => Quaternion::from_axis_angle(Vector3::unit_y(), deg(-90.0)),
        ViewType::Isometric => {
            (Quaternion::from_axis_angle(Vector3::unit_x(), deg(-45.0))
                * Quaternion::from_axis_angle(Vector3::unit_y(), deg(-45.0)))
            .normalize()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective_camera() -> Camera {
        let mut camera = Camera::new();
        camera
            .set_perspective(Rad(50f32.to_radians()), 800.0 / 600.0, 0.1, 100.0)
            .unwrap();
        camera.update_view();
        camera
    }

    #[test]
    fn invalid_aspect_is_rejected() {
        let mut camera = Camera::new();
        let before = camera.projection();
        assert_eq!(
            camera.set_perspective(Rad(1.0), 0.0, 0.1, 100.0),
            Err(CameraError::InvalidAspect(0.0))
        );
        assert_eq!(camera.projection(), before);
        assert!(camera
            .set_perspective(Rad(1.0), f32::NAN, 0.1, 100.0)
            .is_err());
    }

    #[test]
    fn orbit_rotation_norm_stays_bounded() {
        let mut camera = perspective_camera();
        for i in 0..1000 {
            let sign = if i % 2 == 0 { 1.0 } else { -0.7 };
            camera.orbit(Rad(0.01 * sign), Rad(0.013));
        }
        let norm = camera.orbit_rotation().magnitude();
        assert!((norm - 1.0).abs() < 1e-3, "norm drifted to {norm}");
    }

    #[test]
    fn top_preset_looks_along_world_y() {
        let mut camera = perspective_camera();
        camera.reset_to_preset(ViewType::Top);

        let forward = camera.forward();
        assert!(forward.x.abs() < 1e-5);
        assert!(forward.z.abs() < 1e-5);
        assert!((forward.y.abs() - 1.0).abs() < 1e-5);

        // The view matrix rows carry the same basis: its forward row must
        // be collinear with world Y.
        let view = camera.view();
        let view_forward = Vector3::new(view.x.z, view.y.z, view.z.z);
        assert!(view_forward.cross(Vector3::unit_y()).magnitude() < 1e-5);
    }

    #[test]
    fn zoom_clamps_to_minimum_distance() {
        let mut camera = perspective_camera();
        camera.zoom(1000.0, None);
        assert!((camera.orbit_distance() - 0.5).abs() < 1e-6);

        camera.set_orthographic_from_size(800.0 / 600.0, 0.1, 100.0);
        camera.zoom(1000.0, None);
        assert!((camera.ortho_size() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn zoom_anchor_preserves_screen_position() {
        let mut camera = perspective_camera();
        camera.reset_to_preset(ViewType::Front);
        camera
            .set_perspective(Rad(50f32.to_radians()), 800.0 / 600.0, 0.1, 100.0)
            .unwrap();
        camera.update_view();

        let anchor = Vector3::new(2.0, 1.0, 0.0);
        let window = Vector2::new(800.0, 600.0);
        let before = camera.project_to_screen(anchor, window).unwrap();

        camera.zoom(2.0, Some(anchor));
        camera.update_view();
        let after = camera.project_to_screen(anchor, window).unwrap();

        assert!(
            (before - after).magnitude() < 10.0,
            "anchor moved {:?} -> {:?}",
            before,
            after
        );
    }

    #[test]
    fn screen_center_ray_passes_through_target() {
        let mut camera = perspective_camera();
        camera.reset_to_preset(ViewType::Isometric);
        camera
            .set_perspective(Rad(50f32.to_radians()), 800.0 / 600.0, 0.1, 100.0)
            .unwrap();
        camera.update_view();

        let ray = camera
            .screen_ray(Vector2::new(400.0, 300.0), Vector2::new(800.0, 600.0))
            .unwrap();
        // Target is at the origin; the center ray must pass within a hair
        // of it.
        let to_target = camera.target() - ray.origin;
        let closest = ray.point_at(to_target.dot(ray.direction));
        assert!((closest - camera.target()).magnitude() < 1e-3);
    }

    #[test]
    fn degenerate_window_produces_no_ray() {
        let camera = perspective_camera();
        assert!(camera
            .screen_ray(Vector2::new(0.0, 0.0), Vector2::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn mode_switch_recomputes_view_from_own_state() {
        let mut camera = perspective_camera();
        camera.free_transform_mut().translation = Vector3::new(0.0, 0.0, -5.0);
        camera.set_mode(NavigationMode::Free);

        // Free state is authoritative now: position comes from it.
        assert!((camera.position() - Vector3::new(0.0, 0.0, -5.0)).magnitude() < 1e-4);

        camera.set_mode(NavigationMode::Cad);
        let expected = camera.target()
            - camera.orbit_rotation().rotate_vector(Vector3::unit_z())
                * camera.orbit_distance();
        assert!((camera.position() - expected).magnitude() < 1e-4);
    }
}
