//! # Ray Intersection Tests
//!
//! The intersection kernel behind object picking:
//!
//! 1. **Ray vs AABB** — slab method, with and without an entry distance
//! 2. **Ray vs Triangle** — Möller–Trumbore, used for exact mesh picking
//!
//! All functions are pure; degenerate inputs (parallel rays, near-zero
//! determinants) report "no intersection" rather than producing NaNs.

use cgmath::{InnerSpace, Vector3};

/// Direction components below this magnitude are treated as parallel to
/// the corresponding slab.
const EPSILON: f32 = 1e-8;

/// A 3D ray for intersection testing.
///
/// Ephemeral: built fresh for each query, never stored across frames.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Unit length, guaranteed by [`Ray::new`].
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray. The direction is normalized here so callers can
    /// pass raw differences.
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The point at distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box, min/max corners in a common space.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing a set of points. An empty slice collapses to
    /// a zero box at the origin.
    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        };

        let mut min = *first;
        let mut max = *first;
        for p in points.iter().skip(1) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Self::new(min, max)
    }

    /// The eight corner points of the box.
    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }
}

/// A single triangle, vertices in world space.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Vector3<f32>,
    pub v1: Vector3<f32>,
    pub v2: Vector3<f32>,
}

/// Ray-AABB hit test using the slab method.
///
/// Near-zero direction components are clamped to ±EPSILON so the
/// per-axis division stays finite. Hit iff the near intersection does not
/// exceed the far one and the far one is in front of (or at) the origin.
pub fn ray_intersects_aabb(ray: &Ray, aabb: &Aabb) -> bool {
    let mut dir = ray.direction;
    for d in [&mut dir.x, &mut dir.y, &mut dir.z] {
        if d.abs() < EPSILON {
            *d = if *d >= 0.0 { EPSILON } else { -EPSILON };
        }
    }

    let inv = Vector3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

    let t1 = Vector3::new(
        (aabb.min.x - ray.origin.x) * inv.x,
        (aabb.min.y - ray.origin.y) * inv.y,
        (aabb.min.z - ray.origin.z) * inv.z,
    );
    let t2 = Vector3::new(
        (aabb.max.x - ray.origin.x) * inv.x,
        (aabb.max.y - ray.origin.y) * inv.y,
        (aabb.max.z - ray.origin.z) * inv.z,
    );

    let t_near = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
    let t_far = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

    t_near <= t_far && t_far >= 0.0
}

/// Ray-AABB test that also reports the entry distance.
///
/// Intersections behind the ray origin are ignored: the running `t_min`
/// starts at 0, so a ray starting inside the box reports distance 0.
/// Agrees with [`ray_intersects_aabb`] on hit/no-hit.
pub fn ray_aabb_distance(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let mut t_min: f32 = 0.0;
    let mut t_max = f32::MAX;

    for i in 0..3 {
        if ray.direction[i].abs() < EPSILON {
            // Parallel to this slab: inside it or nothing.
            if ray.origin[i] < aabb.min[i] || ray.origin[i] > aabb.max[i] {
                return None;
            }
        } else {
            let mut t1 = (aabb.min[i] - ray.origin[i]) / ray.direction[i];
            let mut t2 = (aabb.max[i] - ray.origin[i]) / ray.direction[i];
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);

            if t_min > t_max {
                return None;
            }
        }
    }

    if t_min <= t_max && t_max >= 0.0 {
        Some(t_min)
    } else {
        None
    }
}

/// Möller–Trumbore ray-triangle intersection.
///
/// Returns the hit distance, or `None` when the ray is parallel to the
/// triangle plane (determinant within EPSILON of zero), the barycentric
/// coordinates fall outside the triangle, or the hit is at/behind the
/// origin (`t <= EPSILON`, rejecting self-intersection).
pub fn ray_triangle_distance(ray: &Ray, tri: &Triangle) -> Option<f32> {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri.v0;

    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn ray_hits_box_head_on() {
        // Origin (0,0,-5) looking down +Z at a 2x2x2 box: entry at z=-1.
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray_intersects_aabb(&ray, &unit_box()));

        let distance = ray_aabb_distance(&ray, &unit_box()).unwrap();
        assert!((distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box() {
        let ray = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!ray_intersects_aabb(&ray, &unit_box()));
        assert!(ray_aabb_distance(&ray, &unit_box()).is_none());
    }

    #[test]
    fn box_behind_ray_is_rejected() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!ray_intersects_aabb(&ray, &unit_box()));
        assert!(ray_aabb_distance(&ray, &unit_box()).is_none());
    }

    #[test]
    fn origin_inside_box_reports_zero_distance() {
        let ray = Ray::new(Vector3::new(0.2, -0.3, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray_intersects_aabb(&ray, &unit_box()));
        assert_eq!(ray_aabb_distance(&ray, &unit_box()), Some(0.0));
    }

    #[test]
    fn bool_and_distance_tests_agree() {
        // A grid of rays against a couple of boxes, including
        // axis-parallel directions that exercise the epsilon clamping.
        let boxes = [
            unit_box(),
            Aabb::new(Vector3::new(0.5, 2.0, -3.0), Vector3::new(1.5, 4.0, -1.0)),
        ];
        let origins = [
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(2.0, 3.0, 0.0),
            Vector3::new(0.9, 2.5, -2.0),
            Vector3::new(-4.0, -4.0, -4.0),
        ];
        let directions = [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-0.3, 0.2, 0.9),
            Vector3::new(0.0, -1.0, 0.0),
        ];

        for aabb in &boxes {
            for origin in &origins {
                for direction in &directions {
                    let ray = Ray::new(*origin, *direction);
                    assert_eq!(
                        ray_intersects_aabb(&ray, aabb),
                        ray_aabb_distance(&ray, aabb).is_some(),
                        "disagreement for origin {:?} direction {:?}",
                        origin,
                        direction,
                    );
                }
            }
        }
    }

    #[test]
    fn ray_through_triangle_interior() {
        let tri = Triangle {
            v0: Vector3::new(-1.0, -1.0, 2.0),
            v1: Vector3::new(1.0, -1.0, 2.0),
            v2: Vector3::new(0.0, 1.0, 2.0),
        };
        // Through the centroid from several offsets in front of the plane.
        let centroid = (tri.v0 + tri.v1 + tri.v2) / 3.0;
        for origin in [
            Vector3::new(0.0, 0.0, -3.0),
            Vector3::new(2.0, 1.0, -1.0),
            Vector3::new(-0.5, 0.4, 0.0),
        ] {
            let ray = Ray::new(origin, centroid - origin);
            let t = ray_triangle_distance(&ray, &tri)
                .expect("ray through the centroid must hit");
            assert!((ray.point_at(t) - centroid).magnitude() < 1e-4);
        }
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let tri = Triangle {
            v0: Vector3::new(-1.0, -1.0, 2.0),
            v1: Vector3::new(1.0, -1.0, 2.0),
            v2: Vector3::new(0.0, 1.0, 2.0),
        };
        let ray = Ray::new(Vector3::new(3.0, 3.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray_triangle_distance(&ray, &tri).is_none());
    }

    #[test]
    fn ray_parallel_to_triangle_plane_misses() {
        let tri = Triangle {
            v0: Vector3::new(-1.0, -1.0, 2.0),
            v1: Vector3::new(1.0, -1.0, 2.0),
            v2: Vector3::new(0.0, 1.0, 2.0),
        };
        let ray = Ray::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray_triangle_distance(&ray, &tri).is_none());
    }

    #[test]
    fn aabb_from_points_spans_extremes() {
        let aabb = Aabb::from_points(&[
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, -1.0, -1.0),
        ]);
        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }
}
