//! Render loop and application event loop.
//!
//! A lesson is a [`SceneFlow`]: it owns a [`Scene`], builds it once in its
//! constructor and animates it every frame. [`run`] opens the window (or
//! binds the web canvas), creates the GPU [`Context`] and drives the flow.
//!
//! # Lifecycle Flow
//!
//! Each redraw, unless the [`StopSignal`] was raised:
//! 1. Advance the [`Clock`]
//! 2. Call the flow's `on_update` with the frame time
//! 3. Update the orbit controls and write the camera uniform
//! 4. Draw the scene exactly once
//! 5. Request the next redraw

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::{
    context::{Context, WindowOptions},
    data_structures::scene_graph::Scene,
    render::Renderer,
    resources::loader::Spawner,
};

/// Selector of the canvas lessons draw into on the web.
pub const CANVAS_SELECTOR: &str = "canvas.webgl";

/// Time of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Since the clock was started.
    pub elapsed: Duration,
    /// Since the previous frame.
    pub delta: Duration,
    /// Index of the frame, starting at 0.
    pub frame: u64,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// Monotonic clock started at construction.
#[derive(Clone, Debug)]
pub struct Clock {
    start: Instant,
    last: Instant,
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Earlier instants than the last tick count as no time.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let now = now.max(self.last);
        let time = FrameTime {
            elapsed: now.duration_since(self.start),
            delta: now.duration_since(self.last),
            frame: self.frame,
        };
        self.last = now;
        self.frame += 1;
        time
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared flag that ends the render loop before its next frame.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameStatus {
    Drawn(FrameTime),
    Stopped,
}

/// Sequences one frame: stop check, clock, update, draw.
#[derive(Debug)]
pub struct FrameDriver {
    clock: Clock,
    stop: StopSignal,
}

impl FrameDriver {
    pub fn new(stop: StopSignal) -> Self {
        Self::with_clock(Clock::new(), stop)
    }

    pub fn with_clock(clock: Clock, stop: StopSignal) -> Self {
        Self { clock, stop }
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Run one frame on `cx`. The update always completes before the draw;
    /// a draw error is returned as is.
    pub fn frame<C, E>(
        &mut self,
        cx: &mut C,
        update: impl FnOnce(&mut C, FrameTime),
        draw: impl FnOnce(&mut C) -> Result<(), E>,
    ) -> Result<FrameStatus, E> {
        if self.stop.is_raised() {
            return Ok(FrameStatus::Stopped);
        }
        let time = self.clock.tick();
        update(cx, time);
        draw(cx)?;
        Ok(FrameStatus::Drawn(time))
    }
}

/// A lesson: a scene plus its per-frame animation.
pub trait SceneFlow {
    fn scene_mut(&mut self) -> &mut Scene;

    /// Animate the scene. Called once per frame before the draw.
    fn on_update(&mut self, _ctx: &Context, _time: FrameTime) {}

    /// Raw window events, after the orbit controls have seen them.
    fn on_window_events(&mut self, _ctx: &Context, _event: &WindowEvent) {}
}

/// Builds the flow once the GPU context exists. This is the only place the
/// flow may reconfigure the context (camera, controls, renderer options).
pub type FlowConstructor = Box<dyn FnOnce(&mut Context) -> anyhow::Result<Box<dyn SceneFlow>>>;

/// Context, renderer and flow of the running lesson.
pub struct AppState {
    pub(crate) ctx: Context,
    renderer: Renderer,
    flow: Box<dyn SceneFlow>,
}

impl AppState {
    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        if self.ctx.resize(size, scale_factor) {
            self.renderer.resize(&self.ctx);
        }
    }

    fn update(&mut self, time: FrameTime) {
        self.flow.on_update(&self.ctx, time);
        if let Some(controls) = &mut self.ctx.controls {
            controls.update(&mut self.ctx.camera.camera);
        }
        self.ctx.write_camera();
    }

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer.render(&self.ctx, self.flow.scene_mut())
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Context),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    window_options: WindowOptions,
    // taken once the context is ready
    constructor: Option<FlowConstructor>,
    state: Option<AppState>,
    driver: Option<FrameDriver>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        window_options: WindowOptions,
        constructor: FlowConstructor,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            window_options,
            constructor: Some(constructor),
            state: None,
            driver: None,
        })
    }

    fn spawner(&self) -> Spawner {
        #[cfg(not(target_arch = "wasm32"))]
        return Spawner::new(self.async_runtime.handle().clone());
        #[cfg(target_arch = "wasm32")]
        return Spawner::new();
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.window_options.title.clone());
        if let Some((width, height)) = self.window_options.fixed_size {
            window_attributes = window_attributes
                .with_inner_size(LogicalSize::new(width, height))
                .with_resizable(false);
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.query_selector(CANVAS_SELECTOR).ok().flatten())
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            window_attributes = match canvas {
                Some(canvas) => window_attributes.with_canvas(Some(canvas)),
                None => {
                    log::error!("No element matches {CANVAS_SELECTOR}, appending a new canvas");
                    window_attributes.with_append(true)
                }
            };
        }
        window_attributes
    }

    fn finish_init(&mut self, event_loop: &ActiveEventLoop, mut ctx: Context) {
        let size = ctx.window.inner_size();
        let scale_factor = ctx.window.scale_factor();
        let Some(constructor) = self.constructor.take() else {
            return;
        };
        let flow = match constructor(&mut ctx) {
            Ok(flow) => flow,
            Err(e) => {
                log::error!("Could not build the scene: {e:#}");
                event_loop.exit();
                return;
            }
        };
        // options may have changed in the constructor
        ctx.viewport.max_pixel_ratio = ctx.options.max_pixel_ratio;
        ctx.resize(size, scale_factor);
        ctx.projection.set_viewport(&ctx.viewport);
        let renderer = Renderer::new(&ctx);
        self.driver = Some(FrameDriver::new(ctx.stop.clone()));
        ctx.window.request_redraw();
        self.state = Some(AppState {
            ctx,
            renderer,
            flow,
        });
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.constructor.is_none() {
            return;
        }
        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };
        let init_future = Context::new(window, self.spawner());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = match self.async_runtime.block_on(init_future) {
                Ok(ctx) => ctx,
                Err(e) => panic!(
                    "App initialization failed. Cannot create the main context: {:#}",
                    e
                ),
            };
            self.finish_init(event_loop, ctx);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = match init_future.await {
                    Ok(ctx) => ctx,
                    Err(e) => panic!(
                        "App initialization failed. Cannot create the main context: {:#}",
                        e
                    ),
                };
                assert!(proxy.send_event(FlowEvent::Initialized(ctx)).is_ok());
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(ctx) => self.finish_init(event_loop, ctx),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if let Some(controls) = &mut state.ctx.controls {
            controls.handle_window_events(&state.ctx.camera.camera, &event);
        }
        state.flow.on_window_events(&state.ctx, &event);

        match event {
            WindowEvent::CloseRequested => {
                state.ctx.stop.raise();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("Stopping the render loop");
                state.ctx.stop.raise();
                state.ctx.window.request_redraw();
            }
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size, scale_factor);
            }
            WindowEvent::RedrawRequested => {
                let Some(driver) = &mut self.driver else {
                    return;
                };
                match driver.frame(state, AppState::update, AppState::draw) {
                    Ok(FrameStatus::Drawn(_)) => state.ctx.window.request_redraw(),
                    Ok(FrameStatus::Stopped) => event_loop.exit(),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.ctx.reconfigure();
                        state.ctx.window.request_redraw();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                        state.ctx.window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open a window (or bind the web canvas) and drive the flow built by
/// `constructor` until the window closes or the stop signal is raised.
pub fn run(window_options: WindowOptions, constructor: FlowConstructor) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::warn!("Logger was already initialized");
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, window_options, constructor)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
