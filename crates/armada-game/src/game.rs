//! The per-frame game driver.
//!
//! GPU-dependent state (renderer, textures, fonts) is created lazily on the
//! first frame, once the device and surface format exist. Init failures are
//! fatal: they are logged and the app exits.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};

use armada_engine::core::{App, AppControl, FrameCtx};
use armada_engine::graphics::{
    FontAtlas, FontLibrary, OrthoCam, RenderCtx, RenderData, RenderTarget, Renderer, Texture,
};
use armada_engine::input::Key;
use armada_engine::paint::Color;
use armada_engine::time::FpsCounter;

use crate::objects::Flagship;

const FLAGSHIP_TEXTURE_PATH: &str = "assets/flagship.png";
const FONT_PATH: &str = "assets/fonts/main.ttf";

const BUILD_TAG: &str = concat!("armada ", env!("CARGO_PKG_VERSION"));

const CLEAR_COLOR: Color = Color::rgba(85.0 / 255.0, 204.0 / 255.0, 212.0 / 255.0, 1.0);
const OVERLAY_GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);

const GRID_CELL_SIZE: f32 = 40.0;
const CAMERA_SPEED: f32 = 500.0;

/// GPU-backed game state, built on the first frame.
struct GameState {
    renderer: Renderer,
    flagship: Flagship,

    main_cam: OrthoCam,
    grid_cam: OrthoCam,
    text_cam: OrthoCam,

    _fonts: FontLibrary,
    font_small: Arc<FontAtlas>,
    font_large: Arc<FontAtlas>,
}

impl GameState {
    fn new(ctx: &FrameCtx<'_, '_>) -> Result<Self> {
        let device = ctx.gpu.device();
        let queue = ctx.gpu.queue();
        let window_size = ctx.window.logical_size();

        let renderer = Renderer::new(
            device,
            queue,
            ctx.gpu.surface_format(),
            window_size,
            ctx.gpu.max_texture_units(),
        )
        .context("failed to initialize the batch renderer")?;

        let ship_texture = Arc::new(
            Texture::from_path(device, queue, FLAGSHIP_TEXTURE_PATH)
                .context("failed to load the flagship sprite")?,
        );

        let flagship = Flagship::new(
            Vec3::ZERO,
            Vec2::splat(0.5),
            Color::WHITE,
            ship_texture,
        );

        let mut fonts = FontLibrary::from_path("main", FONT_PATH)
            .context("failed to load the overlay font")?;
        let font_small = fonts.get(device, queue, 25)?;
        let font_large = fonts.get(device, queue, 32)?;

        // The main camera follows the ship; grid and text cameras stay
        // pinned to the window.
        let mut main_cam = OrthoCam::from_window_size(window_size, CAMERA_SPEED);
        main_cam.set_lock(false);
        main_cam.set_speed(0.0);

        let grid_cam = OrthoCam::from_window_size(window_size, CAMERA_SPEED);
        let text_cam = OrthoCam::from_window_size(window_size, CAMERA_SPEED);

        Ok(Self {
            renderer,
            flagship,
            main_cam,
            grid_cam,
            text_cam,
            _fonts: fonts,
            font_small,
            font_large,
        })
    }
}

/// The game app driven by the engine runtime.
pub struct Game {
    state: Option<GameState>,
    fps: FpsCounter,
    started: Instant,
    debug_grid: bool,
}

impl Game {
    pub fn new() -> Self {
        Self {
            state: None,
            fps: FpsCounter::new(),
            started: Instant::now(),
            debug_grid: true,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl App for Game {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_down(Key::Escape) {
            return AppControl::Exit;
        }

        if ctx.input_frame.keys_pressed.contains(&Key::G) {
            self.debug_grid = !self.debug_grid;
        }

        if self.state.is_none() {
            match GameState::new(ctx) {
                Ok(state) => {
                    log::info!("engine initialization success, all systems go");
                    self.state = Some(state);
                }
                Err(e) => {
                    log::error!("fatal: game initialization failed: {e:#}");
                    return AppControl::Exit;
                }
            }
        }

        let Some(state) = &mut self.state else {
            return AppControl::Exit;
        };

        // ── update ─────────────────────────────────────────────────────────

        let dt = ctx.time.dt;
        self.fps.update(&ctx.time);

        state.flagship.update(dt, ctx.input);
        state.main_cam.set_position(state.flagship.position());
        state.main_cam.update(dt, ctx.input);

        let window_size = ctx.window.logical_size();
        state.renderer.set_window_size(window_size);

        // Overlay strings, precomputed so the render closure stays simple.
        let frame_time = self.fps.frame_time_str();
        let fps = format!("{}", self.fps.fps() as u32);
        let overlay_top = Vec3::new(0.0, window_size.y / 2.0 - 28.0, 0.0);
        let stats_pos = Vec3::new(window_size.x / 2.0 - 90.0, -window_size.y / 2.0 + 24.0, 0.0);
        let fps_pos = Vec3::new(window_size.x / 2.0 - 30.0, -window_size.y / 2.0 + 24.0, 0.0);

        let debug_grid = self.debug_grid;
        let elapsed = self.started.elapsed();

        // ── render ─────────────────────────────────────────────────────────

        ctx.render(CLEAR_COLOR, |rctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>| {
            // World scene: the flagship sprite.
            match state
                .renderer
                .start_scene(rctx, target, &state.main_cam, Renderer::DEFAULT_SHADER)
            {
                Ok(mut scene) => {
                    scene.draw(&state.flagship.drawable());
                    scene.end();
                }
                Err(e) => log::error!("world scene failed: {e:#}"),
            }

            // Debug grid overlay, toggled with G.
            if debug_grid {
                match state
                    .renderer
                    .start_scene(rctx, target, &state.grid_cam, "grid")
                {
                    Ok(mut scene) => {
                        let cam_pos = state.main_cam.position();
                        let zoom = state.main_cam.zoom();
                        scene.draw_grid(cam_pos, GRID_CELL_SIZE, zoom);
                        scene.end();
                    }
                    Err(e) => log::error!("grid scene failed: {e:#}"),
                }
            }

            // Startup indicator: pulsing dots for the first moments after
            // launch, while the driver settles into a steady frame rate.
            if elapsed.as_secs_f32() < 1.5 {
                match state
                    .renderer
                    .start_scene(rctx, target, &state.text_cam, "dots")
                {
                    Ok(mut scene) => {
                        scene.loading_dots(
                            3,
                            28.0,
                            6.0,
                            &RenderData {
                                position: Vec3::new(0.0, -40.0, 0.0),
                                scale: window_size,
                                ..RenderData::default()
                            },
                            elapsed,
                        );
                        scene.end();
                    }
                    Err(e) => log::error!("dots scene failed: {e:#}"),
                }
            }

            // Text overlay: build tag and frame stats.
            match state
                .renderer
                .start_scene(rctx, target, &state.text_cam, "text")
            {
                Ok(mut scene) => {
                    scene.draw_text(
                        BUILD_TAG,
                        &RenderData {
                            position: overlay_top,
                            ..RenderData::default()
                        },
                        &state.font_small,
                    );
                    scene.draw_text(
                        &frame_time,
                        &RenderData {
                            position: stats_pos,
                            color: OVERLAY_GREEN,
                            ..RenderData::default()
                        },
                        &state.font_large,
                    );
                    scene.draw_text(
                        &fps,
                        &RenderData {
                            position: fps_pos,
                            color: OVERLAY_GREEN,
                            ..RenderData::default()
                        },
                        &state.font_large,
                    );
                    scene.end();
                }
                Err(e) => log::error!("text scene failed: {e:#}"),
            }
        })
    }
}
