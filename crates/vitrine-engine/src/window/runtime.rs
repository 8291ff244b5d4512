use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl};
use crate::frame::{FrameDriver, FrameSource};
use crate::input::PointerTracker;
use crate::viewer::{ModelViewer, ViewerOptions};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            initial_size: LogicalSize::new(width, height),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new("vitrine", 960.0, 640.0)
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes or the app requests
    /// exit. Startup failures (window, surface, assets) are returned.
    pub fn run<A>(config: RuntimeConfig, options: ViewerOptions, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, options, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl FrameSource for Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// The window and everything tied to its lifetime.
///
/// The viewer's GPU surface borrows the window, so both live in one
/// self-referencing cell. The cell existing implies the viewer exists:
/// a frame tick can never observe a half-constructed state.
#[self_referencing]
struct ViewerCell {
    driver: FrameDriver,
    pointer: PointerTracker,

    window: Window,

    #[borrows(window)]
    #[covariant]
    viewer: ModelViewer<'this>,
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    options: ViewerOptions,
    app: A,

    cell: Option<ViewerCell>,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, options: ViewerOptions, app: A) -> Self {
        Self {
            config,
            options,
            app,
            cell: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("runtime startup failed: {err:#}");
        self.failure = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn build_cell(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let resolved = self.options.resolve();
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_transparent(resolved.translucent);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let options = self.options.clone();
        let cell = ViewerCellTryBuilder {
            driver: FrameDriver::new(),
            pointer: PointerTracker::default(),
            window,
            viewer_builder: |window| ModelViewer::new(window, options),
        }
        .try_build()?;

        self.cell = Some(cell);
        Ok(())
    }
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(cell) = self.cell.as_mut() {
            // Returning from suspension: just re-register for frames.
            cell.with_mut(|fields| fields.driver.activate(fields.window));
            return;
        }

        if let Err(err) = self.build_cell(event_loop) {
            self.fail(event_loop, err);
            return;
        }

        // Assets load once, before the first frame request.
        let (app, cell) = (&mut self.app, &mut self.cell);
        let loaded = cell
            .as_mut()
            .map(|cell| cell.with_viewer_mut(|viewer| app.on_viewer_ready(viewer)))
            .unwrap_or(Ok(()));

        if let Err(err) = loaded {
            self.fail(event_loop, err.context("app startup failed"));
            return;
        }

        if let Some(cell) = self.cell.as_mut() {
            cell.with_mut(|fields| fields.driver.activate(fields.window));
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(cell) = self.cell.as_mut() {
            cell.with_driver_mut(|driver| driver.deactivate());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // The frame driver re-arms redraws itself; the loop otherwise waits.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows so app callbacks can run inside cell closures.
        let (app, cell) = (&mut self.app, &mut self.cell);

        let Some(cell) = cell.as_mut() else {
            return;
        };
        if cell.borrow_window().id() != window_id {
            return;
        }

        // Pointer-shaped events go to the viewer's input handler and are
        // always consumed there.
        cell.with_mut(|fields| {
            if let Some(pointer_event) = fields.pointer.translate(fields.window, &event) {
                fields.viewer.on_pointer_event(pointer_event);
            }
        });

        if app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                cell.with_driver_mut(|driver| driver.deactivate());
                self.cell = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Destroyed => {
                cell.with_driver_mut(|driver| driver.deactivate());
            }

            WindowEvent::Occluded(hidden) => {
                cell.with_mut(|fields| {
                    if *hidden {
                        fields.driver.deactivate();
                    } else {
                        fields.driver.activate(fields.window);
                    }
                });
            }

            WindowEvent::Resized(new_size) => {
                cell.with_viewer_mut(|viewer| viewer.resize(*new_size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                cell.with_mut(|fields| {
                    let new_size = fields.window.inner_size();
                    fields.viewer.resize(new_size);
                });
            }

            WindowEvent::RedrawRequested => {
                let mut control = AppControl::Continue;
                cell.with_mut(|fields| {
                    if let Some(tick) = fields.driver.tick(fields.window) {
                        control = app.on_frame(fields.viewer, tick);
                    }
                });

                if control == AppControl::Exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
