//! Shared utility functions for the editor

use bevy::prelude::*;

/// Round to the nearest integer, with halves going towards positive infinity.
///
/// Scene coordinates are rounded this way everywhere so that `-2.5` and
/// `2.5` both move "right" on the grid, which keeps snapping symmetric
/// when an offset is negative.
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed difference `a - b` in degrees, in `[-180, 180)`.
pub fn angle_difference(a: f32, b: f32) -> f32 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Intersect a ray with a plane. Returns the ray parameter of the hit, or
/// `None` if the ray is parallel to the plane or the plane is behind it.
pub fn ray_plane_intersection(origin: Vec3, direction: Vec3, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = plane_normal.dot(direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (plane_point - origin).dot(plane_normal) / denom;
    (t >= 0.0).then_some(t)
}

/// Calculate minimum distance between a ray and a line segment
pub fn ray_to_line_segment_distance(ray_origin: Vec3, ray_dir: Vec3, seg_start: Vec3, seg_end: Vec3) -> f32 {
    let seg_dir = seg_end - seg_start;
    let seg_len = seg_dir.length();

    if seg_len < 0.0001 {
        return point_to_ray_distance(seg_start, ray_origin, ray_dir);
    }

    let seg_dir_norm = seg_dir / seg_len;

    let w0 = ray_origin - seg_start;
    let a = ray_dir.dot(ray_dir);
    let b = ray_dir.dot(seg_dir_norm);
    let c = seg_dir_norm.dot(seg_dir_norm);
    let d = ray_dir.dot(w0);
    let e = seg_dir_norm.dot(w0);

    let denom = a * c - b * b;

    let (sc, tc) = if denom.abs() < 0.0001 {
        // Nearly parallel
        (0.0, if b > c { d / b } else { e / c })
    } else {
        let sc = (b * e - c * d) / denom;
        let tc = (a * e - b * d) / denom;
        (sc.max(0.0), tc)
    };

    let tc_clamped = tc.clamp(0.0, seg_len);

    let closest_on_ray = ray_origin + ray_dir * sc;
    let closest_on_seg = seg_start + seg_dir_norm * tc_clamped;

    (closest_on_ray - closest_on_seg).length()
}

/// Calculate distance from a point to a ray
pub fn point_to_ray_distance(point: Vec3, ray_origin: Vec3, ray_dir: Vec3) -> f32 {
    let w = point - ray_origin;
    let c1 = w.dot(ray_dir);
    if c1 <= 0.0 {
        return w.length();
    }
    let c2 = ray_dir.dot(ray_dir);
    let b = c1 / c2;
    let closest = ray_origin + ray_dir * b;
    (point - closest).length()
}

/// Parameter along `axis` (through `axis_origin`) of the point closest to the
/// ray. `None` when the ray runs parallel to the axis.
pub fn closest_axis_parameter(ray_origin: Vec3, ray_dir: Vec3, axis_origin: Vec3, axis: Vec3) -> Option<f32> {
    let w0 = axis_origin - ray_origin;
    let a = axis.dot(axis);
    let b = axis.dot(ray_dir);
    let c = ray_dir.dot(ray_dir);
    let d = axis.dot(w0);
    let e = ray_dir.dot(w0);
    let denom = a * c - b * b;
    if denom.abs() < 1e-6 {
        return None;
    }
    Some((b * e - c * d) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_matches_grid_expectations() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!(wrap_degrees(-1e-7) < 360.0);
    }

    #[test]
    fn angle_difference_is_signed_and_bounded() {
        assert_eq!(angle_difference(10.0, 350.0), 20.0);
        assert_eq!(angle_difference(350.0, 10.0), -20.0);
        assert_eq!(angle_difference(90.0, 0.0), 90.0);
    }

    #[test]
    fn ray_parallel_to_plane_has_no_hit() {
        let hit = ray_plane_intersection(Vec3::new(0.0, 0.0, 10.0), Vec3::X, Vec3::ZERO, Vec3::Z);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_hits_plane_in_front_only() {
        let down = ray_plane_intersection(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, Vec3::Z);
        assert_eq!(down, Some(10.0));
        let up = ray_plane_intersection(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, Vec3::ZERO, Vec3::Z);
        assert!(up.is_none());
    }

    #[test]
    fn closest_axis_parameter_finds_crossing() {
        // Ray straight down at x = 5 crosses the X axis at parameter 5
        let s = closest_axis_parameter(Vec3::new(5.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, Vec3::X);
        let s = s.expect("ray is not parallel to the axis");
        assert!((s - 5.0).abs() < 1e-4);
    }

    #[test]
    fn segment_distance_is_zero_on_crossing() {
        let d = ray_to_line_segment_distance(Vec3::new(0.5, 0.0, 5.0), -Vec3::Z, Vec3::ZERO, Vec3::X);
        assert!(d < 1e-4);
    }
}
