use glam::{Mat4, Vec3};

use crate::input::PointerEvent;

const ROTATE_SPEED: f32 = 0.008; // radians per logical pixel
const ZOOM_STEP: f32 = 0.9; // distance multiplier per scroll line
const PITCH_LIMIT: f32 = 1.55; // just short of the poles
const DISTANCE_MIN: f32 = 0.5;
const DISTANCE_MAX: f32 = 20.0;

/// Orbit camera around a fixed target.
///
/// Drag rotates (yaw/pitch), scroll zooms. The model is fit into the unit
/// cube at the origin, so the default distance frames it comfortably.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    dragging: bool,
    last_pos: Option<(f32, f32)>,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.35,
            distance: 3.0,
            dragging: false,
            last_pos: None,
        }
    }

    /// Applies one pointer event to the orbit state.
    pub fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => {
                self.dragging = true;
                self.last_pos = Some((x, y));
            }

            PointerEvent::Moved { x, y } => {
                if self.dragging {
                    if let Some((lx, ly)) = self.last_pos {
                        self.yaw += (x - lx) * ROTATE_SPEED;
                        self.pitch = (self.pitch + (y - ly) * ROTATE_SPEED)
                            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
                    }
                }
                self.last_pos = Some((x, y));
            }

            PointerEvent::Up { .. } | PointerEvent::Left => {
                self.dragging = false;
                self.last_pos = None;
            }

            PointerEvent::Scroll { delta } => {
                self.distance =
                    (self.distance * ZOOM_STEP.powf(delta)).clamp(DISTANCE_MIN, DISTANCE_MAX);
            }
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        );
        self.target + dir * self.distance
    }

    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            std::f32::consts::FRAC_PI_4,
            aspect.max(1e-3),
            0.01,
            100.0,
        );
        proj * view
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_rotates() {
        let mut camera = OrbitCamera::new();
        let yaw_before = camera.yaw;

        camera.handle_event(PointerEvent::Down { x: 10.0, y: 10.0 });
        camera.handle_event(PointerEvent::Moved { x: 60.0, y: 10.0 });

        assert!(camera.yaw > yaw_before);
    }

    #[test]
    fn move_without_drag_does_not_rotate() {
        let mut camera = OrbitCamera::new();
        let yaw_before = camera.yaw;

        camera.handle_event(PointerEvent::Moved { x: 500.0, y: 500.0 });

        assert_eq!(camera.yaw, yaw_before);
    }

    #[test]
    fn pitch_is_clamped_at_the_poles() {
        let mut camera = OrbitCamera::new();

        camera.handle_event(PointerEvent::Down { x: 0.0, y: 0.0 });
        camera.handle_event(PointerEvent::Moved { x: 0.0, y: 100_000.0 });

        assert!(camera.pitch() <= PITCH_LIMIT);

        camera.handle_event(PointerEvent::Moved { x: 0.0, y: -200_000.0 });
        assert!(camera.pitch() >= -PITCH_LIMIT);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::new();

        camera.handle_event(PointerEvent::Scroll { delta: 1_000.0 });
        assert!(camera.distance() >= DISTANCE_MIN);

        camera.handle_event(PointerEvent::Scroll { delta: -1_000.0 });
        assert!(camera.distance() <= DISTANCE_MAX);
    }

    #[test]
    fn up_ends_the_drag() {
        let mut camera = OrbitCamera::new();

        camera.handle_event(PointerEvent::Down { x: 0.0, y: 0.0 });
        camera.handle_event(PointerEvent::Up { x: 0.0, y: 0.0 });
        let yaw_before = camera.yaw;
        camera.handle_event(PointerEvent::Moved { x: 300.0, y: 0.0 });

        assert_eq!(camera.yaw, yaw_before);
    }

    #[test]
    fn view_projection_is_finite() {
        let camera = OrbitCamera::new();
        let vp = camera.view_projection(16.0 / 9.0);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
