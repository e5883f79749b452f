//! Quad corner math.
//!
//! Pure functions; no renderer state. Corners are ordered counter-clockwise
//! starting at the bottom-left, matching the batch index pattern.

use glam::{Vec2, Vec3};

/// Computes axis-aligned quad corners from a center and size.
///
/// Order: bottom-left, bottom-right, top-right, top-left. The z component of
/// `center` passes through to every corner.
pub fn compute_quad_corners(center: Vec3, size: Vec2) -> [Vec3; 4] {
    let half = size / 2.0;

    [
        Vec3::new(center.x - half.x, center.y - half.y, center.z),
        Vec3::new(center.x + half.x, center.y - half.y, center.z),
        Vec3::new(center.x + half.x, center.y + half.y, center.z),
        Vec3::new(center.x - half.x, center.y + half.y, center.z),
    ]
}

/// Rotates quad corners about `pivot` in the XY plane.
///
/// `angle_deg` is counter-clockwise positive; z is preserved.
pub fn rotate_quad(corners: &[Vec3; 4], pivot: Vec3, angle_deg: f32) -> [Vec3; 4] {
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    corners.map(|corner| {
        let x = corner.x - pivot.x;
        let y = corner.y - pivot.y;

        Vec3::new(
            pivot.x + x * cos - y * sin,
            pivot.y + x * sin + y * cos,
            corner.z,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn corners_of_centered_quad() {
        let corners = compute_quad_corners(Vec3::ZERO, Vec2::new(2.0, 4.0));

        assert_eq!(corners[0], Vec3::new(-1.0, -2.0, 0.0)); // bottom-left
        assert_eq!(corners[1], Vec3::new(1.0, -2.0, 0.0)); // bottom-right
        assert_eq!(corners[2], Vec3::new(1.0, 2.0, 0.0)); // top-right
        assert_eq!(corners[3], Vec3::new(-1.0, 2.0, 0.0)); // top-left
    }

    #[test]
    fn corners_preserve_z() {
        let corners = compute_quad_corners(Vec3::new(3.0, 5.0, 0.7), Vec2::splat(1.0));
        for corner in corners {
            assert_eq!(corner.z, 0.7);
        }
    }

    #[test]
    fn rotation_by_90_degrees_about_origin() {
        // Fixes the cos/sin convention: CCW positive, (x, y) -> (-y, x).
        let corners = compute_quad_corners(Vec3::ZERO, Vec2::new(2.0, 4.0));
        let rotated = rotate_quad(&corners, Vec3::ZERO, 90.0);

        approx(rotated[0], Vec3::new(2.0, -1.0, 0.0));
        approx(rotated[1], Vec3::new(2.0, 1.0, 0.0));
        approx(rotated[2], Vec3::new(-2.0, 1.0, 0.0));
        approx(rotated[3], Vec3::new(-2.0, -1.0, 0.0));
    }

    #[test]
    fn rotation_about_offset_pivot() {
        let corners = [Vec3::new(2.0, 1.0, 0.5); 4];
        let rotated = rotate_quad(&corners, Vec3::new(1.0, 1.0, 0.0), 180.0);

        approx(rotated[0], Vec3::new(0.0, 1.0, 0.5));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let corners = compute_quad_corners(Vec3::new(4.0, -2.0, 0.0), Vec2::new(3.0, 3.0));
        let rotated = rotate_quad(&corners, Vec3::new(4.0, -2.0, 0.0), 0.0);

        for (a, b) in corners.iter().zip(rotated.iter()) {
            approx(*a, *b);
        }
    }
}
