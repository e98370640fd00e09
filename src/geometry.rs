// geometry.rs — 圆柱全景的坐标模型
//
// 全景图横向像素被当作圆柱周长展开，radius = width / 2π，
// 因此 angle 0 与 2π 处纹理无缝衔接。热点以 (angle, height, radius 比例)
// 定位:先在本地偏移 (0, height, -r·fraction),再绕竖直轴旋转 angle。

use glam::{Quat, Vec3};

/// Distance from the cylinder axis to the camera eye, world units.
pub const CAMERA_OFFSET: f32 = 10.0;

/// Oriented placement of a hotspot quad on the cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotTransform {
    pub position: Vec3,
    /// Facing direction, points back toward the cylinder axis.
    pub normal: Vec3,
    /// In-plane horizontal axis of the quad.
    pub right: Vec3,
    /// In-plane vertical axis of the quad.
    pub up: Vec3,
}

/// Places a hotspot: local offset `(0, height, -radius·fraction)` rotated
/// about +Y by `angle`. The pivot scheme decouples "how far out" from "which
/// direction" and keeps the quad facing the axis for every angle.
pub fn hotspot_transform(
    angle: f32,
    height: f32,
    radius_fraction: f32,
    scene_radius: f32,
) -> HotspotTransform {
    let pivot = Quat::from_rotation_y(angle);
    HotspotTransform {
        position: pivot * Vec3::new(0.0, height, -scene_radius * radius_fraction),
        normal: pivot * Vec3::Z,
        right: pivot * Vec3::X,
        up: Vec3::Y,
    }
}

/// Cylinder radius from the panorama width: the pixel span is the
/// circumference, which makes the wraparound at angle 0/2π seamless.
pub fn scene_radius(image_width_px: f32) -> f32 {
    image_width_px / (2.0 * std::f32::consts::PI)
}

/// Vertical field of view that fits the full cylinder height from a camera
/// sitting `camera_offset` away from the axis.
pub fn vertical_fov_deg(image_height_px: f32, radius: f32, camera_offset: f32) -> f32 {
    let distance = radius + camera_offset;
    2.0 * ((image_height_px / 2.0) / distance).atan().to_degrees()
}

/// Near/far planes so the whole cylinder stays inside the frustum.
pub fn clip_planes(radius: f32) -> (f32, f32) {
    (1.0, radius + radius * 0.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn radius_unrolls_image_width() {
        assert!(close(scene_radius(3600.0), 572.9578));
    }

    #[test]
    fn local_offset_before_pivot_rotation() {
        // angle 0: no pivot, offset straight down -Z.
        let t = hotspot_transform(0.0, 0.0, 1.0, 500.0);
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, -500.0), 1e-3));
        assert!(t.normal.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn pivot_rotates_offset_about_vertical_axis() {
        let t = hotspot_transform(std::f32::consts::FRAC_PI_2, 0.0, 1.0, 500.0);
        // rot_y(π/2) maps -Z to -X.
        assert!(t.position.abs_diff_eq(Vec3::new(-500.0, 0.0, 0.0), 1e-2));
        // the quad keeps facing the axis
        assert!(t.normal.abs_diff_eq(Vec3::X, 1e-5));
        assert!(t.up.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn height_survives_pivot() {
        let t = hotspot_transform(std::f32::consts::PI, 120.0, 0.5, 400.0);
        assert!(close(t.position.y, 120.0));
        assert!(close(t.position.x.hypot(t.position.z), 200.0));
    }

    #[test]
    fn fov_matches_cylinder_height() {
        // atan((1800/2)/(573+10))·2 ≈ 114.4°
        let fov = vertical_fov_deg(1800.0, 573.0, CAMERA_OFFSET);
        assert!(close(fov, 2.0 * (900.0f32 / 583.0).atan().to_degrees()));
    }

    #[test]
    fn clip_planes_cover_cylinder() {
        let (near, far) = clip_planes(500.0);
        assert_eq!(near, 1.0);
        assert!(close(far, 600.0));
    }
}
