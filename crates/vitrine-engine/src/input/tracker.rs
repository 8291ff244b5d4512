use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::window::Window;

use super::types::PointerEvent;

/// Translates winit window events into [`PointerEvent`]s.
///
/// winit reports mouse button changes without coordinates, so the tracker
/// carries the last cursor position and stamps it onto button transitions.
/// Touch events already carry a location and update the same position.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pos: Option<(f32, f32)>,
}

impl PointerTracker {
    /// Returns the translated pointer event, or `None` for events that are
    /// not pointer-shaped.
    pub fn translate(&mut self, window: &Window, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical(window, *position);
                self.pos = Some((x, y));
                Some(PointerEvent::Moved { x, y })
            }

            WindowEvent::CursorLeft { .. } => {
                self.pos = None;
                Some(PointerEvent::Left)
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.pos.unwrap_or((0.0, 0.0));
                Some(match state {
                    ElementState::Pressed => PointerEvent::Down { x, y },
                    ElementState::Released => PointerEvent::Up { x, y },
                })
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // Roughly one line per 16 physical pixels of scroll.
                    MouseScrollDelta::PixelDelta(p) => (p.y / 16.0) as f32,
                };
                Some(PointerEvent::Scroll { delta: lines })
            }

            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                let (x, y) = to_logical(window, *location);
                self.pos = Some((x, y));
                Some(match phase {
                    TouchPhase::Started => PointerEvent::Down { x, y },
                    TouchPhase::Moved => PointerEvent::Moved { x, y },
                    TouchPhase::Ended | TouchPhase::Cancelled => PointerEvent::Up { x, y },
                })
            }

            _ => None,
        }
    }
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}
