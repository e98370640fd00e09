// input.rs — 把原始输入事件翻译成导航意图
//
// 指针/触摸/键盘事件在这里归类为 NavigationIntent,由 main.rs 的单一
// 分发点消费。拖拽与点击靠位移阈值区分;双指捏合用两点间距的变化量
// 判定缩放,微小抖动(低于阈值)直接忽略,不算输入。

use winit::event::{
    ElementState, MouseButton, MouseScrollDelta, TouchPhase, VirtualKeyCode, WindowEvent,
};

/// One zoom step for wheel, pinch and keyboard; multiplied by the configured
/// zoom speed inside the camera controller.
pub const ZOOM_STEP: f32 = 5.0;
/// One keyboard pan step, radians.
pub const KEY_PAN_STEP: f32 = 0.05;
/// Drag rotation, radians per pixel.
pub const DRAG_ROTATE_SPEED: f32 = 0.0025;
/// Pointer travel below this is still a click, pixels.
const CLICK_SLOP_PX: f32 = 5.0;
/// Pinch distance changes below this are jitter, pixels.
const PINCH_THRESHOLD_PX: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    /// Around the vertical axis; unrestricted.
    Pan,
    /// Camera tilt; clamped by the polar-angle bounds.
    Tilt,
}

/// The typed channel between raw input and the tour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationIntent {
    Hover { x: f32, y: f32 },
    Activate { x: f32, y: f32 },
    Zoom(f32),
    Rotate { axis: RotationAxis, angle: f32 },
    CloseOverlay,
    ToggleFullscreen,
    ExitRequested,
}

#[derive(Debug, Clone, Copy)]
struct TouchPoint {
    id: u64,
    x: f32,
    y: f32,
}

pub struct InputDisambiguator {
    keyboard_enabled: bool,
    cursor: (f32, f32),
    mouse_down: bool,
    drag_distance: f32,
    touches: Vec<TouchPoint>,
    /// Distance between the two fingers at the last *applied* pinch step.
    pinch_distance: Option<f32>,
}

impl InputDisambiguator {
    pub fn new(keyboard_enabled: bool) -> Self {
        Self {
            keyboard_enabled,
            cursor: (0.0, 0.0),
            mouse_down: false,
            drag_distance: 0.0,
            touches: Vec::new(),
            pinch_distance: None,
        }
    }

    /// winit 事件入口;测试直接调用下面的具体方法。
    pub fn window_event(&mut self, event: &WindowEvent) -> Vec<NavigationIntent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => match state {
                ElementState::Pressed => {
                    self.pointer_pressed();
                    Vec::new()
                }
                ElementState::Released => self.pointer_released().into_iter().collect(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.wheel(lines).into_iter().collect()
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => {
                        self.touch_started(touch.id, x, y);
                        Vec::new()
                    }
                    TouchPhase::Moved => self.touch_moved(touch.id, x, y).into_iter().collect(),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touch_ended(touch.id, x, y).into_iter().collect()
                    }
                }
            }
            WindowEvent::KeyboardInput { input, .. } => {
                if input.state != ElementState::Pressed {
                    return Vec::new();
                }
                input
                    .virtual_keycode
                    .and_then(|key| self.key_pressed(key))
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Pointer move: hover while idle, grab-style rotation while dragging.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Vec<NavigationIntent> {
        let (last_x, last_y) = self.cursor;
        self.cursor = (x, y);

        if !self.mouse_down {
            return vec![NavigationIntent::Hover { x, y }];
        }

        let dx = x - last_x;
        let dy = y - last_y;
        self.drag_distance += dx.hypot(dy);

        let mut intents = Vec::new();
        if dx != 0.0 {
            intents.push(NavigationIntent::Rotate {
                axis: RotationAxis::Pan,
                angle: dx * DRAG_ROTATE_SPEED,
            });
        }
        if dy != 0.0 {
            intents.push(NavigationIntent::Rotate {
                axis: RotationAxis::Tilt,
                angle: dy * DRAG_ROTATE_SPEED,
            });
        }
        intents
    }

    pub fn pointer_pressed(&mut self) {
        self.mouse_down = true;
        self.drag_distance = 0.0;
    }

    /// Release ends either a drag (no intent) or a click.
    pub fn pointer_released(&mut self) -> Option<NavigationIntent> {
        if !self.mouse_down {
            return None;
        }
        self.mouse_down = false;

        if self.drag_distance <= CLICK_SLOP_PX {
            let (x, y) = self.cursor;
            Some(NavigationIntent::Activate { x, y })
        } else {
            None
        }
    }

    /// Wheel-up zooms in, one fixed step per notch.
    pub fn wheel(&mut self, lines: f32) -> Option<NavigationIntent> {
        if lines == 0.0 {
            return None;
        }
        Some(NavigationIntent::Zoom(ZOOM_STEP * lines.signum()))
    }

    pub fn touch_started(&mut self, id: u64, x: f32, y: f32) {
        self.touches.retain(|t| t.id != id);
        self.touches.push(TouchPoint { id, x, y });

        if self.touches.len() == 2 {
            self.pinch_distance = Some(self.finger_distance());
        }
    }

    /// Two-finger move drives pinch zoom; sub-threshold wobble is noise.
    pub fn touch_moved(&mut self, id: u64, x: f32, y: f32) -> Option<NavigationIntent> {
        if let Some(touch) = self.touches.iter_mut().find(|t| t.id == id) {
            touch.x = x;
            touch.y = y;
        }

        if self.touches.len() != 2 {
            return None;
        }

        let last = self.pinch_distance?;
        let current = self.finger_distance();
        let delta = current - last;
        if delta.abs() < PINCH_THRESHOLD_PX {
            return None;
        }

        // the tracked distance only advances when a step is applied
        self.pinch_distance = Some(current);
        Some(NavigationIntent::Zoom(ZOOM_STEP * delta.signum()))
    }

    /// While two fingers are down taps are suppressed; the last remaining
    /// touch is the tap when it lifts.
    pub fn touch_ended(&mut self, id: u64, x: f32, y: f32) -> Option<NavigationIntent> {
        let was_only_touch = self.touches.len() == 1 && self.touches[0].id == id;
        self.touches.retain(|t| t.id != id);

        if self.touches.len() < 2 {
            self.pinch_distance = None;
        }

        if was_only_touch {
            Some(NavigationIntent::Activate { x, y })
        } else {
            None
        }
    }

    fn finger_distance(&self) -> f32 {
        let a = self.touches[0];
        let b = self.touches[1];
        (a.x - b.x).hypot(a.y - b.y)
    }

    pub fn key_pressed(&mut self, key: VirtualKeyCode) -> Option<NavigationIntent> {
        if !self.keyboard_enabled {
            return None;
        }

        match key {
            VirtualKeyCode::Escape => Some(NavigationIntent::CloseOverlay),
            VirtualKeyCode::Left => Some(NavigationIntent::Rotate {
                axis: RotationAxis::Pan,
                angle: KEY_PAN_STEP,
            }),
            VirtualKeyCode::Right => Some(NavigationIntent::Rotate {
                axis: RotationAxis::Pan,
                angle: -KEY_PAN_STEP,
            }),
            // Equals 同时覆盖按住 Shift 的 "+"
            VirtualKeyCode::Plus | VirtualKeyCode::Equals | VirtualKeyCode::NumpadAdd => {
                Some(NavigationIntent::Zoom(ZOOM_STEP))
            }
            VirtualKeyCode::Minus | VirtualKeyCode::NumpadSubtract => {
                Some(NavigationIntent::Zoom(-ZOOM_STEP))
            }
            VirtualKeyCode::F11 => Some(NavigationIntent::ToggleFullscreen),
            // Up/Down 俯仰暂不接入:极角边界随缩放变化,键盘步进的夹取
            // 逻辑还没同步,先留空
            VirtualKeyCode::Up | VirtualKeyCode::Down => None,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_pointer_move_hovers() {
        let mut input = InputDisambiguator::new(true);
        assert_eq!(
            input.pointer_moved(10.0, 20.0),
            vec![NavigationIntent::Hover { x: 10.0, y: 20.0 }]
        );
    }

    #[test]
    fn short_press_is_a_click() {
        let mut input = InputDisambiguator::new(true);
        input.pointer_moved(100.0, 100.0);
        input.pointer_pressed();
        input.pointer_moved(102.0, 101.0); // within the slop
        assert_eq!(
            input.pointer_released(),
            Some(NavigationIntent::Activate { x: 102.0, y: 101.0 })
        );
    }

    #[test]
    fn long_drag_rotates_and_suppresses_the_click() {
        let mut input = InputDisambiguator::new(true);
        input.pointer_moved(100.0, 100.0);
        input.pointer_pressed();

        let intents = input.pointer_moved(140.0, 80.0);
        assert_eq!(
            intents,
            vec![
                NavigationIntent::Rotate { axis: RotationAxis::Pan, angle: 40.0 * DRAG_ROTATE_SPEED },
                NavigationIntent::Rotate { axis: RotationAxis::Tilt, angle: -20.0 * DRAG_ROTATE_SPEED },
            ]
        );
        assert_eq!(input.pointer_released(), None);
    }

    #[test]
    fn wheel_sign_convention() {
        let mut input = InputDisambiguator::new(true);
        assert_eq!(input.wheel(1.0), Some(NavigationIntent::Zoom(ZOOM_STEP)));
        assert_eq!(input.wheel(-3.0), Some(NavigationIntent::Zoom(-ZOOM_STEP)));
        assert_eq!(input.wheel(0.0), None);
    }

    #[test]
    fn pinch_ignores_jitter_but_tracks_from_last_applied() {
        let mut input = InputDisambiguator::new(true);
        input.touch_started(1, 0.0, 0.0);
        input.touch_started(2, 100.0, 0.0); // distance 100

        // 100 → 101: below the 2 px threshold, noise
        assert_eq!(input.touch_moved(2, 101.0, 0.0), None);
        // 101 → 105: delta counts from the last applied distance (100)
        assert_eq!(
            input.touch_moved(2, 105.0, 0.0),
            Some(NavigationIntent::Zoom(ZOOM_STEP))
        );
        // and shrinking zooms out
        assert_eq!(
            input.touch_moved(2, 50.0, 0.0),
            Some(NavigationIntent::Zoom(-ZOOM_STEP))
        );
    }

    #[test]
    fn two_fingers_suppress_taps_until_the_last_one_lifts() {
        let mut input = InputDisambiguator::new(true);
        input.touch_started(1, 10.0, 10.0);
        input.touch_started(2, 90.0, 10.0);

        // first finger lifts while the second is still down: no tap
        assert_eq!(input.touch_ended(1, 10.0, 10.0), None);
        // the single remaining touch taps at its own coordinates
        assert_eq!(
            input.touch_ended(2, 90.0, 10.0),
            Some(NavigationIntent::Activate { x: 90.0, y: 10.0 })
        );
    }

    #[test]
    fn single_touch_tap() {
        let mut input = InputDisambiguator::new(true);
        input.touch_started(7, 33.0, 44.0);
        assert_eq!(
            input.touch_ended(7, 33.0, 44.0),
            Some(NavigationIntent::Activate { x: 33.0, y: 44.0 })
        );
    }

    #[test]
    fn keyboard_mapping() {
        let mut input = InputDisambiguator::new(true);
        assert_eq!(input.key_pressed(VirtualKeyCode::Escape), Some(NavigationIntent::CloseOverlay));
        assert_eq!(
            input.key_pressed(VirtualKeyCode::Left),
            Some(NavigationIntent::Rotate { axis: RotationAxis::Pan, angle: KEY_PAN_STEP })
        );
        assert_eq!(
            input.key_pressed(VirtualKeyCode::Right),
            Some(NavigationIntent::Rotate { axis: RotationAxis::Pan, angle: -KEY_PAN_STEP })
        );
        assert_eq!(input.key_pressed(VirtualKeyCode::Equals), Some(NavigationIntent::Zoom(ZOOM_STEP)));
        assert_eq!(input.key_pressed(VirtualKeyCode::Minus), Some(NavigationIntent::Zoom(-ZOOM_STEP)));
        // tilt keys are deliberately not mapped yet
        assert_eq!(input.key_pressed(VirtualKeyCode::Up), None);
        assert_eq!(input.key_pressed(VirtualKeyCode::Down), None);
    }

    #[test]
    fn disabled_keyboard_is_silent() {
        let mut input = InputDisambiguator::new(false);
        assert_eq!(input.key_pressed(VirtualKeyCode::Escape), None);
        assert_eq!(input.key_pressed(VirtualKeyCode::Left), None);
    }
}
