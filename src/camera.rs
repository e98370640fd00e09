// camera.rs — 相机控制:缩放与旋转(四元数),极角随缩放收紧
//
// 相机位于圆柱轴线附近 (0, 0, offset),朝向原点。水平方向绕竖直轴
// 自由旋转(圆柱无缝,可整圈平移);垂直方向的极角被夹在
// [min_polar, max_polar] 内,边界随当前缩放收紧:放大后有效视角变窄,
// 允许的俯仰随之减小,圆柱上下边缘不会进入画面。
// 旋转用四元数同时作用于 position 与 up,避免欧拉角组合时的万向锁。

use glam::{Mat4, Quat, Vec3, Vec4Swizzles};

use crate::geometry::CAMERA_OFFSET;

#[derive(Debug)]
pub struct CameraController {
    position: Vec3,
    up: Vec3,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
    zoom_speed: f32,
    base_fov_deg: f32,
    min_polar: f32,
    max_polar: f32,
    near: f32,
    far: f32,
    enabled: bool,
    initial_position: Vec3,
    initial_up: Vec3,
    initial_zoom: f32,
}

impl CameraController {
    pub fn new(zoom_min: f32, zoom_max: f32, zoom_speed: f32) -> Self {
        let position = Vec3::new(0.0, 0.0, CAMERA_OFFSET);
        let up = Vec3::Y;
        let zoom = zoom_min;
        let mut camera = Self {
            position,
            up,
            zoom,
            zoom_min,
            zoom_max,
            zoom_speed,
            base_fov_deg: 50.0,
            min_polar: std::f32::consts::FRAC_PI_2,
            max_polar: std::f32::consts::FRAC_PI_2,
            near: 1.0,
            far: 1000.0,
            enabled: true,
            initial_position: position,
            initial_up: up,
            initial_zoom: zoom,
        };
        camera.recompute_polar_bounds();
        camera
    }

    /// Adopts the vertical fov / clip planes derived from a freshly loaded
    /// panorama (see geometry.rs) and re-aims the camera at the origin.
    pub fn configure(&mut self, base_fov_deg: f32, near: f32, far: f32) {
        self.base_fov_deg = base_fov_deg;
        self.near = near;
        self.far = far;
        self.reset();
    }

    /// Restores position, up and zoom captured at construction. Called
    /// whenever a scene is cleared.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.up = self.initial_up;
        self.zoom = self.initial_zoom;
        self.recompute_polar_bounds();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies a zoom delta, clamped to the configured range. Returns `true`
    /// only when the zoom value actually changed.
    pub fn zoom(&mut self, delta: f32) -> bool {
        if !self.enabled {
            return false;
        }

        let new_zoom = (self.zoom + delta * self.zoom_speed).clamp(self.zoom_min, self.zoom_max);
        if new_zoom == self.zoom {
            return false;
        }

        self.zoom = new_zoom;
        self.recompute_polar_bounds();
        true
    }

    /// Rotation around the vertical axis. Unrestricted: the cylinder is
    /// seamless, so panning wraps naturally.
    pub fn rotate_pan(&mut self, angle: f32) -> bool {
        if !self.enabled || angle == 0.0 {
            return false;
        }

        let q = Quat::from_rotation_y(angle);
        self.position = q * self.position;
        self.up = q * self.up;
        true
    }

    /// Tilt around the camera's horizontal axis. The new polar angle is
    /// clamped before anything is applied; a zero clamped delta means "at the
    /// limit" and reports `false`.
    pub fn rotate_tilt(&mut self, angle: f32) -> bool {
        if !self.enabled {
            return false;
        }

        let current = self.polar_angle();
        let target = (current + angle).clamp(self.min_polar, self.max_polar);
        let diff = target - current;
        if diff == 0.0 {
            return false;
        }

        let q = Quat::from_axis_angle(self.right_axis(), diff);
        self.position = q * self.position;
        self.up = q * self.up;
        true
    }

    /// Angle between the camera offset and the vertical axis; π/2 is level.
    pub fn polar_angle(&self) -> f32 {
        self.position.normalize().y.clamp(-1.0, 1.0).acos()
    }

    pub fn polar_bounds(&self) -> (f32, f32) {
        (self.min_polar, self.max_polar)
    }

    pub fn zoom_value(&self) -> f32 {
        self.zoom
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// View direction; the camera always looks at the cylinder axis origin.
    pub fn forward(&self) -> Vec3 {
        (-self.position).normalize()
    }

    fn right_axis(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Field of view after zoom is applied, degrees.
    pub fn effective_fov_deg(&self) -> f32 {
        2.0 * ((self.base_fov_deg.to_radians() / 2.0).tan() / self.zoom)
            .atan()
            .to_degrees()
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.effective_fov_deg().to_radians(),
            aspect,
            self.near,
            self.far,
        );
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, self.up);
        proj * view
    }

    /// Projects a world point to window coordinates. `None` when the point is
    /// behind the camera.
    pub fn world_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<(f32, f32)> {
        let clip = self.view_proj(width / height) * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some((
            (ndc.x + 1.0) / 2.0 * width,
            (1.0 - ndc.y) / 2.0 * height,
        ))
    }

    // 收紧极角边界:有效视角越窄,允许的俯仰越小。zoom = 1 时上下锁死。
    fn recompute_polar_bounds(&mut self) {
        let angle_diff = (self.base_fov_deg - self.effective_fov_deg()).to_radians();
        self.max_polar = std::f32::consts::FRAC_PI_2 + angle_diff / 2.0;
        self.min_polar = std::f32::consts::FRAC_PI_2 - angle_diff / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2;

    fn camera() -> CameraController {
        let mut c = CameraController::new(1.0, 3.0, 0.02);
        c.configure(100.0, 1.0, 600.0);
        c
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut c = camera();
        assert!(c.zoom(150.0)); // 1.0 + 150·0.02 = 4.0 → clamps to 3.0
        assert_eq!(c.zoom_value(), 3.0);
        assert!(!c.zoom(10.0)); // already at max, nothing applied
        assert!(c.zoom(-1000.0));
        assert_eq!(c.zoom_value(), 1.0);
    }

    #[test]
    fn zoom_stays_in_range_for_any_sequence() {
        let mut c = camera();
        for delta in [5.0, -3.0, 100.0, -250.0, 7.5, 42.0, -1.0] {
            c.zoom(delta);
            assert!(c.zoom_value() >= 1.0 && c.zoom_value() <= 3.0);
        }
    }

    #[test]
    fn polar_bounds_locked_at_base_zoom() {
        let c = camera();
        let (min, max) = c.polar_bounds();
        assert!((min - FRAC_PI_2).abs() < 1e-6);
        assert!((max - FRAC_PI_2).abs() < 1e-6);
        // no tilt possible while locked
        let mut c = c;
        assert!(!c.rotate_tilt(0.5));
    }

    #[test]
    fn zooming_in_widens_polar_bounds() {
        let mut c = camera();
        c.zoom(50.0); // zoom = 2.0
        let (min, max) = c.polar_bounds();
        assert!(max > FRAC_PI_2 && min < FRAC_PI_2);
        assert!((max - FRAC_PI_2) - (FRAC_PI_2 - min) < 1e-6); // symmetric
    }

    #[test]
    fn tilt_is_clamped_before_being_applied() {
        let mut c = camera();
        c.zoom(50.0);
        let (min, max) = c.polar_bounds();

        assert!(c.rotate_tilt(10.0)); // way past the limit, lands on it
        assert!((c.polar_angle() - max).abs() < 1e-5);
        assert!(!c.rotate_tilt(0.1)); // already at the limit

        for angle in [-0.3, 0.2, -5.0, 4.0, 0.01] {
            c.rotate_tilt(angle);
            let polar = c.polar_angle();
            assert!(polar >= min - 1e-5 && polar <= max + 1e-5);
        }
    }

    #[test]
    fn pan_wraps_without_restriction() {
        let mut c = camera();
        for _ in 0..100 {
            assert!(c.rotate_pan(0.5));
        }
        // panning never moves the polar angle
        assert!((c.polar_angle() - FRAC_PI_2).abs() < 1e-4);
        assert!((c.position().length() - CAMERA_OFFSET).abs() < 1e-3);
    }

    #[test]
    fn disabled_camera_ignores_everything() {
        let mut c = camera();
        c.set_enabled(false);
        assert!(!c.zoom(10.0));
        assert!(!c.rotate_pan(0.5));
        assert!(!c.rotate_tilt(0.1));
        assert_eq!(c.zoom_value(), 1.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut c = camera();
        c.zoom(25.0);
        c.rotate_pan(1.0);
        c.rotate_tilt(0.2);
        c.reset();
        assert_eq!(c.zoom_value(), 1.0);
        assert!(c.position().abs_diff_eq(Vec3::new(0.0, 0.0, CAMERA_OFFSET), 1e-5));
        assert!(c.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn effective_fov_narrows_with_zoom() {
        let mut c = camera();
        let base = c.effective_fov_deg();
        c.zoom(50.0);
        assert!(c.effective_fov_deg() < base);
    }

    #[test]
    fn world_to_screen_centers_the_look_target() {
        let c = camera();
        let (x, y) = c.world_to_screen(Vec3::new(0.0, 0.0, -100.0), 800.0, 600.0).unwrap();
        assert!((x - 400.0).abs() < 1e-2);
        assert!((y - 300.0).abs() < 1e-2);
        // a point behind the camera does not project
        assert!(c.world_to_screen(Vec3::new(0.0, 0.0, 100.0), 800.0, 600.0).is_none());
    }
}
