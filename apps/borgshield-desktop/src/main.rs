use anyhow::Result;
use borgshield_input::{Action, fire, scene_targets};
use borgshield_kernel::{SceneConfig, ShieldScene};
use borgshield_render_wgpu::{GpuContext, OrbitCamera, WgpuRenderer};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "borgshield-desktop", about = "Borg tactical simulation: fire at a shielded cube")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fire through the cursor instead of the screen centre
    #[arg(long)]
    aim_cursor: bool,
}

/// Pixels a scroll delta in pixels counts as one line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Application state.
struct AppState {
    scene: ShieldScene,
    camera: OrbitCamera,
    started: Instant,
    aim_cursor: bool,
    show_overlay: bool,
    /// Backend and adapter name, once the GPU is up.
    adapter: Option<String>,
    // Input state
    cursor: Vec2,
    viewport: Vec2,
    orbiting: bool,
}

impl AppState {
    fn new(config: SceneConfig, aim_cursor: bool) -> Self {
        let camera = OrbitCamera::with_distance_limits(config.min_distance, config.max_distance);
        Self {
            scene: ShieldScene::new(config),
            camera,
            started: Instant::now(),
            aim_cursor,
            show_overlay: false,
            adapter: None,
            cursor: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
            orbiting: false,
        }
    }

    fn fire_action(&self) -> Action {
        if self.aim_cursor {
            Action::fire_at_cursor(self.cursor, self.viewport)
        } else {
            Action::FIRE_CENTRE
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Fire { ndc } => {
                let ray = self.camera.ray_from_ndc(ndc);
                let config = self.scene.config();
                let targets = scene_targets(
                    config.cube_edge,
                    &self.scene.cube_transform(),
                    config.shield_edge,
                    &self.scene.shield_transform(),
                );
                let point = fire(&ray, &targets);
                if self.scene.on_fire(point).is_some() {
                    tracing::info!("pew");
                }
            }
            Action::Orbit(delta) => self.camera.rotate(delta.x, delta.y),
            Action::Zoom(lines) => self.camera.zoom(lines),
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Action::Noop => {}
        }
    }

    fn map_key(key: KeyCode) -> Action {
        match key {
            KeyCode::F1 => Action::ToggleOverlay,
            KeyCode::Equal | KeyCode::NumpadAdd => Action::Zoom(1.0),
            KeyCode::Minus | KeyCode::NumpadSubtract => Action::Zoom(-1.0),
            _ => Action::Noop,
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        let green = egui::Color32::from_rgb(0, 255, 0);
        egui::Area::new(egui::Id::new("title"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 20.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("BORG TACTICAL SIMULATION")
                            .monospace()
                            .size(19.0)
                            .color(green),
                    );
                    let hint = if self.aim_cursor { "CLICK TO FIRE AT CURSOR" } else { "CLICK TO FIRE" };
                    ui.label(
                        egui::RichText::new(hint)
                            .monospace()
                            .size(13.0)
                            .color(egui::Color32::WHITE),
                    );
                });
            });

        if !self.show_overlay {
            return;
        }

        let now = self.scene.elapsed();
        egui::SidePanel::left("diagnostics")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Shield");
                ui.separator();
                ui.label(format!("Frame: {}  t={:.2}s", self.scene.frame(), now));
                ui.label(format!("Camera distance: {:.1}", self.camera.distance));
                if let Some(adapter) = &self.adapter {
                    ui.label(format!("Adapter: {adapter}"));
                }
                ui.label(format!(
                    "Active ripples: {}",
                    self.scene.impacts().active_count(now)
                ));
                ui.separator();
                ui.heading("Impact slots");
                for (slot, impact) in self.scene.impacts().slots().iter().enumerate() {
                    let text = if impact.is_sentinel() {
                        format!("[{slot}] empty")
                    } else {
                        let p = impact.position;
                        format!(
                            "[{slot}] ({:.2}, {:.2}, {:.2}) age {:.2}s",
                            p.x,
                            p.y,
                            p.z,
                            impact.age_at(now)
                        )
                    };
                    if impact.is_active_at(now) {
                        ui.colored_label(green, text);
                    } else {
                        ui.label(text);
                    }
                }
                ui.separator();
                ui.small("F1: Toggle panel | LMB: Fire | RMB: Orbit | Wheel: Zoom");
            });
    }
}

struct Egui {
    winit: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui: Option<Egui>,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            gpu: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui: None,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Borg Tactical Simulation")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height)?;
        let format = gpu.config.format;

        self.state.adapter = Some(format!(
            "{} ({})",
            gpu.adapter_info.name,
            gpu.adapter_info.backend.to_str()
        ));
        self.state.camera.aspect = gpu.aspect();
        self.state.viewport = Vec2::new(size.width as f32, size.height as f32);

        let renderer = WgpuRenderer::new(
            &gpu.device,
            format,
            size.width,
            size.height,
            self.state.scene.config().star_count,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, format, None, 1, false);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.egui = Some(Egui {
            winit: egui_winit,
            renderer: egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let elapsed = self.state.started.elapsed().as_secs_f32();
        let params = {
            let _span = tracing::info_span!("frame_update").entered();
            self.state.scene.on_frame(elapsed)
        };

        let (Some(window), Some(gpu), Some(egui_state)) = (&self.window, &self.gpu, &mut self.egui)
        else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(renderer) = &self.renderer {
            renderer.render(
                &gpu.device,
                &gpu.queue,
                &view,
                &self.state.camera,
                &self.state.scene,
                &params,
            );
        }

        let raw_input = egui_state.winit.take_egui_input(window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        egui_state
            .winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let egui_renderer = &mut egui_state.renderer;
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
            }
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("egui_encoder"),
                });
            egui_renderer.update_buffers(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            gpu.queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_state), Some(window)) = (&mut self.egui, &self.window) {
            let response = egui_state.winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state.camera.aspect = gpu.aspect();
                    self.state.viewport =
                        Vec2::new(gpu.config.width as f32, gpu.config.height as f32);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(&gpu.device, gpu.config.width, gpu.config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                let action = if key == KeyCode::Space {
                    self.state.fire_action()
                } else {
                    AppState::map_key(key)
                };
                self.state.apply(action);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                let action = self.state.fire_action();
                self.state.apply(action);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.orbiting = btn_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.state.apply(Action::Zoom(lines));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.orbiting {
                self.state
                    .apply(Action::Orbit(Vec2::new(delta.0 as f32, delta.1 as f32)));
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("borgshield-desktop starting");

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config, cli.aim_cursor));
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_unknown_before_gpu_init() {
        let state = AppState::new(SceneConfig::default(), false);
        assert!(state.adapter.is_none());
        assert!(!state.show_overlay);
    }

    #[test]
    fn centre_fire_hits_the_shield() {
        let mut state = AppState::new(SceneConfig::default(), false);
        state.scene.on_frame(1.0);
        state.apply(state.fire_action());
        let latest = state.scene.impacts().latest().unwrap();
        assert_eq!(latest.time, 1.0);
        assert!((latest.position.z - 1.6).abs() < 1e-4);
    }

    #[test]
    fn cursor_fire_off_the_shield_misses() {
        let mut state = AppState::new(SceneConfig::default(), true);
        state.cursor = Vec2::ZERO;
        state.apply(state.fire_action());
        assert!(state.scene.impacts().latest().is_none());
    }

    #[test]
    fn overlay_toggles() {
        let mut state = AppState::new(SceneConfig::default(), false);
        state.apply(AppState::map_key(KeyCode::F1));
        assert!(state.show_overlay);
    }
}
