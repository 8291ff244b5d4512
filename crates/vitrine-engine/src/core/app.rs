use winit::event::WindowEvent;

use crate::frame::FrameTick;
use crate::viewer::{ModelViewer, RenderStatus};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the binary crate.
pub trait App {
    /// Called once, after the window surface exists and the viewer bound to
    /// it has been constructed. Asset loading belongs here; an error aborts
    /// startup.
    fn on_viewer_ready(&mut self, viewer: &mut ModelViewer<'_>) -> anyhow::Result<()>;

    /// Called for window events the runtime does not consume itself.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame tick while the window is visible.
    ///
    /// The default implementation renders the viewer and exits on a fatal
    /// surface error.
    fn on_frame(&mut self, viewer: &mut ModelViewer<'_>, tick: FrameTick) -> AppControl {
        match viewer.render(tick) {
            RenderStatus::Fatal => AppControl::Exit,
            RenderStatus::Presented | RenderStatus::Skipped => AppControl::Continue,
        }
    }
}
