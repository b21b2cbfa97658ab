//! Native GUI viewer using egui
//!
//! Parameter controls on the left, the curve painted segment by segment
//! in the central panel. In 3D mode drag rotates and scroll zooms.

use eframe::egui;
use std::time::Instant;
use tracing::{info, warn};

use crate::animation::Tick;
use crate::config::{Config, Settings};
use crate::curve::{CurveError, CurveParams};
use crate::render::{Rgb, Surface};
use crate::state::{Explorer, ParamEdit};
use crate::walk::Point2;

/// Deeper strings are available from the CLI but too slow to paint live
const GUI_MAX_ITERATIONS: u32 = 18;

/// Run the native GUI viewer
pub fn run_viewer(config: Config, settings: Settings, preset: Option<&str>) -> anyhow::Result<()> {
    let (params, view_3d) = config.resolve(preset)?;
    let params = CurveParams {
        iterations: params.iterations.min(GUI_MAX_ITERATIONS),
        ..params
    };
    let explorer = Explorer::new(params, &config.render, view_3d, settings.cache_capacity)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Dragon Walker"),
        ..Default::default()
    };

    eframe::run_native(
        "Dragon Walker",
        options,
        Box::new(|_cc| Ok(Box::new(DragonApp::new(explorer)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

fn to_color32(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.r(), c.g(), c.b())
}

/// Painter-backed surface for a single frame
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
}

impl Surface for PainterSurface<'_> {
    fn size(&self) -> (f64, f64) {
        (self.rect.width() as f64, self.rect.height() as f64)
    }

    fn clear(&mut self, color: Rgb) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(color));
    }

    fn stroke(&mut self, from: Point2, to: Point2, color: Rgb, width: f64) {
        let a = self.rect.min + egui::vec2(from[0] as f32, from[1] as f32);
        let b = self.rect.min + egui::vec2(to[0] as f32, to[1] as f32);
        self.painter
            .line_segment([a, b], egui::Stroke::new(width as f32, to_color32(color)));
    }
}

/// What the text inputs currently show, valid or not
struct Inputs {
    angle: String,
    twist: String,
    extrusion: String,
    speed: String,
}

impl Inputs {
    fn from_params(p: &CurveParams) -> Self {
        Self {
            angle: format!("{}", p.angle),
            twist: format!("{}", p.twist),
            extrusion: format!("{}", p.extrusion),
            speed: format!("{}", p.speed),
        }
    }
}

struct DragonApp {
    explorer: Explorer,
    inputs: Inputs,
    iterations: u32,
    last_error: Option<String>,
}

impl DragonApp {
    fn new(explorer: Explorer) -> Self {
        let inputs = Inputs::from_params(explorer.params());
        let iterations = explorer.params().iterations;
        Self {
            explorer,
            inputs,
            iterations,
            last_error: None,
        }
    }

    fn report(&mut self, result: Result<bool, CurveError>) {
        match result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                warn!("Rejected input: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// A text field that feeds the explorer on every edit and snaps back
    /// to the last valid value when it loses focus
    fn param_field(
        ui: &mut egui::Ui,
        label: &str,
        text: &mut String,
        edit: fn(String) -> ParamEdit,
        explorer: &mut Explorer,
        current: fn(&CurveParams) -> String,
    ) -> Option<Result<bool, CurveError>> {
        let mut result = None;
        ui.horizontal(|ui| {
            ui.label(label);
            let response = ui.add(egui::TextEdit::singleline(text).desired_width(80.0));
            if response.changed() {
                result = Some(explorer.apply(edit(text.clone())));
            }
            if response.lost_focus() {
                *text = current(explorer.params());
            }
        });
        result
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let enabled = self.explorer.controls_enabled();

        ui.heading("Dragon Curve");
        ui.separator();

        ui.add_enabled_ui(enabled, |ui| {
            let before = self.iterations;
            ui.add(egui::Slider::new(&mut self.iterations, 0..=GUI_MAX_ITERATIONS).text("Iterations"));
            if self.iterations != before {
                let result = self.explorer.apply(ParamEdit::Iterations(self.iterations.to_string()));
                self.report(result);
            }

            let fields: [(&str, fn(String) -> ParamEdit, fn(&CurveParams) -> String); 4] = [
                ("Angle (°)", ParamEdit::Angle, |p| format!("{}", p.angle)),
                ("Twist (°)", ParamEdit::Twist, |p| format!("{}", p.twist)),
                ("Extrusion", ParamEdit::Extrusion, |p| format!("{}", p.extrusion)),
                ("Speed (seg/s)", ParamEdit::Speed, |p| format!("{}", p.speed)),
            ];
            for (i, (label, edit, current)) in fields.into_iter().enumerate() {
                let text = match i {
                    0 => &mut self.inputs.angle,
                    1 => &mut self.inputs.twist,
                    2 => &mut self.inputs.extrusion,
                    _ => &mut self.inputs.speed,
                };
                if let Some(result) = Self::param_field(ui, label, text, edit, &mut self.explorer, current) {
                    self.report(result);
                }
            }

            ui.separator();

            let mut view_3d = self.explorer.is_3d();
            if ui.checkbox(&mut view_3d, "3D").changed() {
                self.explorer.set_view_3d(view_3d);
            }
            let mut dark = self.explorer.dark_mode();
            if ui.checkbox(&mut dark, "Dark mode").changed() {
                self.explorer.set_dark_mode(dark);
            }

            let (start, end, mut gradient, mut rainbow) = self.explorer.colors();
            let (mut start, mut end) = (start.0, end.0);
            ui.horizontal(|ui| {
                ui.label("Start:");
                let a = ui.color_edit_button_srgb(&mut start).changed();
                ui.label("End:");
                let b = ui.color_edit_button_srgb(&mut end).changed();
                if a || b {
                    self.explorer.set_colors(Rgb(start), Rgb(end));
                }
            });
            if ui.checkbox(&mut gradient, "Gradient").changed() {
                self.explorer.set_gradient(gradient);
            }
            if ui.checkbox(&mut rainbow, "Rainbow").changed() {
                self.explorer.set_rainbow(rainbow);
            }
        });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.add_enabled(enabled, egui::Button::new("Animate")).clicked() {
                let result = self.explorer.start_animation(Instant::now());
                self.report(result);
            }
            if ui.add_enabled(!enabled, egui::Button::new("Cancel")).clicked() {
                self.explorer.cancel_animation();
            }
            if ui
                .add_enabled(self.explorer.is_3d(), egui::Button::new("Reset view"))
                .clicked()
            {
                self.explorer.reset_view();
            }
        });

        ui.separator();

        let params = *self.explorer.params();
        ui.label(format!("Segments: {}", self.explorer.segment_count()));
        ui.label(format!("Symbols: {}", self.explorer.symbols().len()));
        ui.label(format!(
            "Angle {:.2}° | Twist {:.2}° | Extrusion {:.3}",
            params.angle, params.twist, params.extrusion
        ));
        match self.explorer.animation().progress() {
            Some(n) => ui.label(format!("Revealed: {}/{}", n, self.explorer.segment_count())),
            None => ui.label("Revealed: all"),
        };
        if self.explorer.is_3d() {
            let view = self.explorer.view();
            ui.label(format!(
                "Yaw {:.2} | Pitch {:.2} | Zoom {:.2}",
                view.yaw, view.pitch, view.zoom
            ));
        }
        if let Some(err) = &self.last_error {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }
    }
}

impl Drop for DragonApp {
    fn drop(&mut self) {
        self.explorer.teardown();
    }
}

impl eframe::App for DragonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.explorer.dark_mode() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let now = Instant::now();
        match self.explorer.poll_animation(now) {
            Ok(Some(Tick::Finished)) => {
                info!("Animation complete");
                self.inputs = Inputs::from_params(self.explorer.params());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Animation tick failed: {}", e);
                self.explorer.cancel_animation();
            }
        }
        if let Some(wait) = self.explorer.animation().until_next(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        egui::SidePanel::left("controls_panel")
            .min_width(260.0)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;
                self.explorer.resize(rect.width() as f64, rect.height() as f64);

                if response.dragged() {
                    let delta = response.drag_delta();
                    self.explorer.drag(delta.x as f64, delta.y as f64);
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        self.explorer.wheel(scroll as f64);
                    }
                }

                let mut surface = PainterSurface { painter: &painter, rect };
                self.explorer.draw(&mut surface);
            });
    }
}
