/// Platform-agnostic pointer events forwarded to the viewer.
///
/// Mouse and touch input are translated into the same stream so the viewer's
/// orbit controls behave identically for both. Coordinates are logical
/// pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    /// Primary button or touch contact went down.
    Down { x: f32, y: f32 },

    /// Pointer moved (with or without contact).
    Moved { x: f32, y: f32 },

    /// Primary button or touch contact lifted.
    Up { x: f32, y: f32 },

    /// Scroll delta in lines; positive pulls the camera closer.
    Scroll { delta: f32 },

    /// Pointer left the surface.
    Left,
}
