//! Main application

use eframe::egui;
use rb_core::{Config, EventBus, Result};
use rb_integration::{BackendState, FrontendBridge, LoopbackBackend};
use std::sync::Arc;

use crate::keys::key_events;
use crate::surface::SharedDisplay;

/// Main application state
pub struct RetroBridgeApp {
    /// Configuration
    config: Config,
    /// Boundary shared by the front end and the backend
    bus: EventBus,
    /// Front-end side of the boundary
    bridge: FrontendBridge,
    /// Stand-in emulation backend
    backend: Arc<LoopbackBackend>,
    /// Frames staged by the surface
    display: SharedDisplay,
    /// Texture the frames are uploaded into
    texture: Option<egui::TextureHandle>,
    /// Last error to show in the status bar
    error_message: Option<String>,
}

impl RetroBridgeApp {
    /// Create a new application
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Result<Self> {
        let bus = EventBus::new();
        let display = SharedDisplay::new();
        let max_texture_side = cc.egui_ctx.input(|i| i.max_texture_side);

        let bridge = FrontendBridge::new(
            &config,
            Arc::new(bus.clone()),
            display.factory(max_texture_side),
        )?;
        let backend = LoopbackBackend::attach(
            bus.clone(),
            config.display.width,
            config.display.height,
            config.input.strategy,
            config.general.start_paused,
        );

        tracing::info!("retrobridge UI initialized");

        Ok(Self {
            config,
            bus,
            bridge,
            backend,
            display,
            texture: None,
            error_message: None,
        })
    }

    fn forward_keys(&self, ctx: &egui::Context) {
        // Collected first so the bridge never runs inside egui's input lock
        let events = ctx.input(key_events);
        for (key, pressed) in events {
            if pressed {
                self.bridge.key_down(&key);
            } else {
                self.bridge.key_up(&key);
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let Some(image) = self.display.take_pending() else {
            return;
        };
        let options = self.display.texture_options();
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, options),
            None => self.texture = Some(ctx.load_texture("frame", image, options)),
        }
    }

    fn request_frame(&mut self) {
        match self.bridge.request_frame() {
            Ok(id) => {
                tracing::debug!(%id, "manual frame request");
                self.error_message = None;
            }
            Err(err) => self.error_message = Some(err.to_string()),
        }
    }

    fn status_line(&self) -> String {
        let stats = self.bridge.stats();
        let round_trip = stats
            .last_round_trip
            .map(|d| format!("{:.2}ms", d.as_secs_f64() * 1000.0))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{:?} | {} | Pushed: {} | Pulled: {} | Rejected: {} | Round trip: {}",
            stats.strategy,
            stats.joypad,
            stats.frames.pushed,
            stats.frames.pulled,
            stats.frames.rejected,
            round_trip,
        )
    }
}

impl eframe::App for RetroBridgeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.forward_keys(ctx);
        self.backend.tick();
        self.bus.run_until_idle();
        self.upload_frame(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let running = self.backend.state() == BackendState::Running;
                if ui.button(if running { "Pause" } else { "Resume" }).clicked() {
                    self.backend.set_state(if running {
                        BackendState::Paused
                    } else {
                        BackendState::Running
                    });
                }
                if ui.button("Request frame").clicked() {
                    self.request_frame();
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_line());
                if !self.bridge.stats().presentation_enabled {
                    ui.colored_label(egui::Color32::YELLOW, "Display unavailable");
                }
                if let Some(ref msg) = self.error_message {
                    ui.colored_label(egui::Color32::RED, msg);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let scale = self.config.display.scale as f32;
            let size = egui::vec2(
                self.config.display.width as f32 * scale,
                self.config.display.height as f32 * scale,
            );
            ui.centered_and_justified(|ui| match &self.texture {
                Some(texture) => {
                    ui.add(egui::Image::new(egui::load::SizedTexture::new(texture.id(), size)));
                }
                None => {
                    ui.label("Waiting for first frame");
                }
            });
        });

        ctx.request_repaint();
    }
}

/// Run the application
pub fn run(config: Config) -> eframe::Result<()> {
    let scale = config.display.scale as f32;
    let width = config.display.width as f32 * scale;
    let height = config.display.height as f32 * scale;
    let title = config.general.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width + 32.0, height + 96.0])
            .with_min_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| match RetroBridgeApp::new(cc, config) {
            Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
            Err(err) => Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>),
        }),
    )
}
