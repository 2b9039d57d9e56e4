//! # Sketch and Extrude
//!
//! Three-click box creation on a construction plane:
//!
//! 1. first click anchors one footprint corner
//! 2. second click fixes the opposite corner and calibrates how cursor
//!    motion maps to extrusion height
//! 3. third click commits the box into the scene
//!
//! The session is a small state machine; Escape cancels from any state.
//! Preview geometry is rebuilt from scratch every frame, so there is no
//! stale preview to invalidate.

use std::sync::Arc;

use cgmath::{Vector2, Vector3};
use log::{debug, info};
use rand::Rng;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::{Camera, NavigationMode};
use crate::geometry::plane::ConstructionPlane;
use crate::input::{EdgeDetector, InputState};
use crate::scene::{MeshData, Scene, SceneObject};

/// Smallest committed extent on any axis. A degenerate box (double-click
/// in place) still produces visible geometry.
const MIN_EXTENT: f32 = 0.1;
/// Thickness of the flat footprint preview slab.
const PREVIEW_THICKNESS: f32 = 0.05;
/// Cursor-to-height factor when screen calibration is degenerate (the
/// plane normal points straight at the camera).
const FALLBACK_HEIGHT_SCALE: f32 = 0.02;
const PREVIEW_COLOR: Vector3<f32> = Vector3::new(0.2, 0.8, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchState {
    Idle,
    WaitingFirstClick,
    WaitingSecondClick,
    WaitingHeight,
}

pub struct SketchSession {
    state: SketchState,
    plane: ConstructionPlane,
    /// Footprint corners in plane-local coordinates. Only meaningful in
    /// the states that have recorded them.
    first: Vector2<f32>,
    second: Vector2<f32>,
    /// World units of height per pixel of vertical cursor travel, signed.
    height_scale: f32,
    /// Cursor Y at the second click; extrusion height is measured from it.
    reference_screen_y: f32,
    click_edge: EdgeDetector,
    cancel_edge: EdgeDetector,
    cube_mesh: Arc<MeshData>,
    preview: Vec<SceneObject>,
}

impl Default for SketchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchSession {
    pub fn new() -> Self {
        Self {
            state: SketchState::Idle,
            plane: ConstructionPlane::from_view(
                crate::camera::ViewType::Top,
                Vector3::unit_y(),
                Vector3::new(0.0, 0.0, 0.0),
            ),
            first: Vector2::new(0.0, 0.0),
            second: Vector2::new(0.0, 0.0),
            height_scale: FALLBACK_HEIGHT_SCALE,
            reference_screen_y: 0.0,
            click_edge: EdgeDetector::new(),
            cancel_edge: EdgeDetector::new(),
            cube_mesh: MeshData::unit_cube(),
            preview: Vec::new(),
        }
    }

    pub fn state(&self) -> SketchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SketchState::Idle
    }

    /// Preview geometry for the current frame, ready to render. Empty
    /// outside an active sketch.
    pub fn preview(&self) -> &[SceneObject] {
        &self.preview
    }

    pub fn plane(&self) -> &ConstructionPlane {
        &self.plane
    }

    /// Begin a sketch on the plane implied by the camera's current view.
    /// In CAD mode the plane passes through the orbit target; in free
    /// mode it passes through the world origin.
    pub fn start(&mut self, camera: &Camera) {
        let origin = match camera.mode() {
            NavigationMode::Cad => camera.target(),
            NavigationMode::Free => Vector3::new(0.0, 0.0, 0.0),
        };
        self.plane = ConstructionPlane::from_view(camera.view_type(), camera.forward(), origin);
        self.state = SketchState::WaitingFirstClick;
        self.preview.clear();
        debug!("sketch started, plane normal {:?}", self.plane.normal);
    }

    /// Abandon the sketch without touching the scene.
    pub fn cancel(&mut self) {
        if self.state != SketchState::Idle {
            debug!("sketch cancelled in {:?}", self.state);
        }
        self.state = SketchState::Idle;
        self.preview.clear();
    }

    /// Per-frame update: advance the state machine on click edges and
    /// rebuild the preview.
    pub fn update(&mut self, input: &InputState, camera: &Camera, scene: &mut Scene) {
        // Edges are fed every frame so a press that started while idle
        // doesn't fire late.
        let clicked = self
            .click_edge
            .rising(input.mouse_down(MouseButton::Left));
        let cancelled = self.cancel_edge.rising(input.key_down(KeyCode::Escape));

        if self.state == SketchState::Idle {
            return;
        }
        if cancelled {
            self.cancel();
            return;
        }

        let local = self.cursor_on_plane(input, camera);

        if clicked {
            match self.state {
                SketchState::WaitingFirstClick => {
                    self.first = local;
                    self.state = SketchState::WaitingSecondClick;
                }
                SketchState::WaitingSecondClick => {
                    self.second = local;
                    self.calibrate(camera, input.window_size(), input.cursor().y);
                    self.state = SketchState::WaitingHeight;
                }
                SketchState::WaitingHeight => {
                    self.commit(input.cursor().y, scene);
                    return;
                }
                SketchState::Idle => unreachable!(),
            }
        }

        self.rebuild_preview(local, input.cursor().y);
    }

    /// Project the cursor onto the construction plane, in plane-local
    /// coordinates. Falls back to the plane origin when the ray misses
    /// (grazing view angle or degenerate window).
    fn cursor_on_plane(&self, input: &InputState, camera: &Camera) -> Vector2<f32> {
        let world = camera
            .screen_ray(input.cursor(), input.window_size())
            .and_then(|ray| self.plane.intersect_ray(ray.origin, ray.direction))
            .unwrap_or(self.plane.origin);
        self.plane.world_to_local(world)
    }

    /// Measure how far the footprint center moves on screen per world
    /// unit along the plane normal. The signed reciprocal becomes the
    /// cursor-to-height factor, so dragging toward the normal's screen
    /// direction extrudes positively regardless of view orientation.
    fn calibrate(&mut self, camera: &Camera, window: Vector2<f32>, cursor_y: f32) {
        let center = (self.first + self.second) / 2.0;
        let base = self.plane.local_to_world(center, 0.0);
        let tip = self.plane.local_to_world(center, 1.0);

        self.height_scale = match (
            camera.project_to_screen(base, window),
            camera.project_to_screen(tip, window),
        ) {
            (Some(b), Some(t)) if (t.y - b.y).abs() > 1e-3 => 1.0 / (t.y - b.y),
            _ => FALLBACK_HEIGHT_SCALE,
        };
        self.reference_screen_y = cursor_y;
    }

    fn current_height(&self, cursor_y: f32) -> f32 {
        (cursor_y - self.reference_screen_y) * self.height_scale
    }

    /// Spawn the final box and return to idle.
    fn commit(&mut self, cursor_y: f32, scene: &mut Scene) {
        let mut height = self.current_height(cursor_y);
        if height.abs() < MIN_EXTENT {
            height = MIN_EXTENT * height.signum();
        }
        let size = footprint_size(self.first, self.second);
        let center = (self.first + self.second) / 2.0;

        let id = scene.spawn();
        if let Some(object) = scene.get_mut(id) {
            object.mesh = Some(self.cube_mesh.clone());
            object
                .transform
                .set_rotation_from_axes(self.plane.right, self.plane.normal, self.plane.up);
            object.transform.scale = Vector3::new(size.x, height.abs(), size.y);
            object.transform.translation = self.plane.local_to_world(center, height * 0.5);

            let mut rng = rand::rng();
            object.color = Vector3::new(
                rng.random_range(0.3..1.0),
                rng.random_range(0.3..1.0),
                rng.random_range(0.3..1.0),
            );
            info!(
                "sketched box {id}: footprint {:.2} x {:.2}, height {height:.2}",
                size.x, size.y
            );
        }

        self.state = SketchState::Idle;
        self.preview.clear();
    }

    /// Replace the preview with this frame's geometry: a thin footprint
    /// slab while rubber-banding the rectangle, the growing box while
    /// extruding.
    fn rebuild_preview(&mut self, local: Vector2<f32>, cursor_y: f32) {
        self.preview.clear();
        match self.state {
            SketchState::WaitingSecondClick => {
                self.preview.push(self.preview_box(self.first, local, 0.0));
            }
            SketchState::WaitingHeight => {
                let height = self.current_height(cursor_y);
                self.preview
                    .push(self.preview_box(self.first, self.second, height));
            }
            SketchState::Idle | SketchState::WaitingFirstClick => {}
        }
    }

    fn preview_box(&self, a: Vector2<f32>, b: Vector2<f32>, height: f32) -> SceneObject {
        let size = footprint_size(a, b);
        let center = (a + b) / 2.0;

        let mut object = SceneObject::new(0);
        object.mesh = Some(self.cube_mesh.clone());
        object.color = PREVIEW_COLOR;
        object
            .transform
            .set_rotation_from_axes(self.plane.right, self.plane.normal, self.plane.up);
        object.transform.scale =
            Vector3::new(size.x, height.abs().max(PREVIEW_THICKNESS), size.y);
        object.transform.translation = self.plane.local_to_world(center, height * 0.5);
        object
    }
}

fn footprint_size(a: Vector2<f32>, b: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        (b.x - a.x).abs().max(MIN_EXTENT),
        (b.y - a.y).abs().max(MIN_EXTENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewType;
    use cgmath::{InnerSpace, Rad};

    const WINDOW: Vector2<f32> = Vector2::new(800.0, 600.0);

    /// Top preset camera 10 units above the origin, looking down +Y.
    fn top_camera() -> Camera {
        let mut camera = Camera::new();
        camera
            .set_perspective(Rad(50f32.to_radians()), WINDOW.x / WINDOW.y, 0.1, 100.0)
            .unwrap();
        camera.reset_to_preset(ViewType::Top);
        camera
    }

    fn cursor_to(input: &mut InputState, camera: &Camera, world: Vector3<f32>) {
        let screen = camera.project_to_screen(world, WINDOW).unwrap();
        input.set_cursor(screen.x, screen.y);
    }

    fn click(
        session: &mut SketchSession,
        input: &mut InputState,
        camera: &Camera,
        scene: &mut Scene,
    ) {
        input.set_mouse_button(MouseButton::Left, true);
        session.update(input, camera, scene);
        input.set_mouse_button(MouseButton::Left, false);
        session.update(input, camera, scene);
    }

    #[test]
    fn three_clicks_produce_a_box() {
        let _ = env_logger::builder().is_test(true).try_init();
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        session.start(&camera);
        assert_eq!(session.state(), SketchState::WaitingFirstClick);

        // Corner at the origin, opposite corner at (2, 0, 3) on the
        // ground plane.
        cursor_to(&mut input, &camera, Vector3::new(0.0, 0.0, 0.0));
        click(&mut session, &mut input, &camera, &mut scene);
        assert_eq!(session.state(), SketchState::WaitingSecondClick);

        cursor_to(&mut input, &camera, Vector3::new(2.0, 0.0, 3.0));
        session.update(&input, &camera, &mut scene);
        assert_eq!(session.preview().len(), 1);
        click(&mut session, &mut input, &camera, &mut scene);
        assert_eq!(session.state(), SketchState::WaitingHeight);

        // Pin the calibration so the extrusion is exact: 0.02 world units
        // per pixel, measured from the current cursor row.
        session.height_scale = 0.02;
        session.reference_screen_y = input.cursor().y;
        let cursor = input.cursor();
        input.set_cursor(cursor.x, cursor.y - 50.0);
        click(&mut session, &mut input, &camera, &mut scene);

        assert_eq!(session.state(), SketchState::Idle);
        assert!(session.preview().is_empty());
        assert_eq!(scene.len(), 1);

        let object = scene.iter().next().unwrap();
        let scale = object.transform.scale;
        assert!((scale - Vector3::new(2.0, 1.0, 3.0)).magnitude() < 1e-2, "{scale:?}");

        // Height is -1 (cursor moved up 50px at 0.02/px), so the box
        // hangs below the ground plane, centered at y = -0.5.
        let translation = object.transform.translation;
        assert!(
            (translation - Vector3::new(1.0, -0.5, 1.5)).magnitude() < 1e-2,
            "{translation:?}"
        );

        for channel in [object.color.x, object.color.y, object.color.z] {
            assert!((0.3..1.0).contains(&channel));
        }
    }

    #[test]
    fn escape_discards_without_spawning() {
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        session.start(&camera);
        cursor_to(&mut input, &camera, Vector3::new(1.0, 0.0, 1.0));
        click(&mut session, &mut input, &camera, &mut scene);
        assert_eq!(session.state(), SketchState::WaitingSecondClick);

        input.set_key(KeyCode::Escape, true);
        session.update(&input, &camera, &mut scene);

        assert_eq!(session.state(), SketchState::Idle);
        assert!(session.preview().is_empty());
        assert!(scene.is_empty());

        // A fresh start works after cancelling.
        input.set_key(KeyCode::Escape, false);
        session.start(&camera);
        assert_eq!(session.state(), SketchState::WaitingFirstClick);
    }

    #[test]
    fn clicks_while_idle_do_nothing() {
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        input.set_cursor(400.0, 300.0);
        click(&mut session, &mut input, &camera, &mut scene);
        click(&mut session, &mut input, &camera, &mut scene);

        assert_eq!(session.state(), SketchState::Idle);
        assert!(scene.is_empty());
    }

    #[test]
    fn head_on_plane_falls_back_to_default_scale() {
        // Under the top view the ground normal points straight at the
        // camera; for a rectangle centered at the origin the calibration
        // points land on the same pixel and the fallback factor applies.
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        session.start(&camera);
        cursor_to(&mut input, &camera, Vector3::new(-1.0, 0.0, -1.0));
        click(&mut session, &mut input, &camera, &mut scene);
        cursor_to(&mut input, &camera, Vector3::new(1.0, 0.0, 1.0));
        click(&mut session, &mut input, &camera, &mut scene);

        assert_eq!(session.state(), SketchState::WaitingHeight);
        assert!((session.height_scale - FALLBACK_HEIGHT_SCALE).abs() < 1e-6);
    }

    #[test]
    fn degenerate_box_is_clamped() {
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        session.start(&camera);
        cursor_to(&mut input, &camera, Vector3::new(0.0, 0.0, 0.0));
        // Three clicks without moving: zero footprint, zero height.
        click(&mut session, &mut input, &camera, &mut scene);
        click(&mut session, &mut input, &camera, &mut scene);
        click(&mut session, &mut input, &camera, &mut scene);

        assert_eq!(scene.len(), 1);
        let scale = scene.iter().next().unwrap().transform.scale;
        assert!(scale.x >= MIN_EXTENT - 1e-6);
        assert!(scale.y >= MIN_EXTENT - 1e-6);
        assert!(scale.z >= MIN_EXTENT - 1e-6);
    }

    #[test]
    fn preview_is_rebuilt_each_frame() {
        let camera = top_camera();
        let mut scene = Scene::new();
        let mut input = InputState::new(WINDOW.x, WINDOW.y);
        let mut session = SketchSession::new();

        session.start(&camera);
        cursor_to(&mut input, &camera, Vector3::new(0.0, 0.0, 0.0));
        click(&mut session, &mut input, &camera, &mut scene);

        cursor_to(&mut input, &camera, Vector3::new(1.0, 0.0, 1.0));
        session.update(&input, &camera, &mut scene);
        assert_eq!(session.preview().len(), 1);
        let narrow = session.preview()[0].transform.scale;
        assert!((narrow.y - PREVIEW_THICKNESS).abs() < 1e-6);

        cursor_to(&mut input, &camera, Vector3::new(4.0, 0.0, 1.0));
        session.update(&input, &camera, &mut scene);
        assert_eq!(session.preview().len(), 1);
        let wide = session.preview()[0].transform.scale;
        assert!(wide.x > narrow.x + 2.0);
    }

    #[test]
    fn sketch_plane_follows_the_view() {
        let mut camera = top_camera();
        let mut session = SketchSession::new();

        session.start(&camera);
        assert!((session.plane().normal - Vector3::unit_y()).magnitude() < 1e-6);

        camera.reset_to_preset(ViewType::Front);
        session.start(&camera);
        assert!((session.plane().normal + Vector3::unit_z()).magnitude() < 1e-6);
    }
}
