//! Explorer State - Single Source of Truth (SSOT)
//!
//! Owns the curve parameters, the symbol cache, both point sets, the
//! camera and the animation. Every input event goes through here and the
//! pipeline (symbols → walk → bounds → draw) is re-run synchronously.

use std::sync::Arc;
use std::time::Instant;

use crate::animation::{Animation, Tick};
use crate::camera::ViewState;
use crate::config::RenderSettings;
use crate::curve::{
    check_iterations, in_range, segment_count, CurveError, CurveParams, Symbol, SymbolCache,
    ANGLE_RANGE, EXTRUSION_RANGE, SPEED_RANGE, TWIST_RANGE,
};
use crate::render::{self, ColorPolicy, Rgb, Style, Surface};
use crate::walk::{walk_2d, walk_3d, Point2, Point3};

/// Raw text from a parameter control
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEdit {
    Iterations(String),
    Angle(String),
    Twist(String),
    Extrusion(String),
    Speed(String),
}

/// Angles keep 0.01° resolution
fn round_hundredths(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn parse_in_range(raw: &str, range: (f64, f64)) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|&v| in_range(v, range))
}

pub struct Explorer {
    params: CurveParams,
    cache: SymbolCache,
    symbols: Arc<[Symbol]>,
    points_2d: Vec<Point2>,
    points_3d: Vec<Point3>,
    view: ViewState,
    view_3d: bool,
    start_color: Rgb,
    end_color: Rgb,
    gradient: bool,
    rainbow: bool,
    dark_mode: bool,
    stroke_scale: f64,
    animation: Animation,
}

impl Explorer {
    pub fn new(
        params: CurveParams,
        render: &RenderSettings,
        view_3d: bool,
        cache_capacity: usize,
    ) -> Result<Self, CurveError> {
        params.validate()?;
        let mut cache = SymbolCache::new(cache_capacity);
        let symbols = cache.get(params.iterations)?;

        let mut explorer = Self {
            params,
            cache,
            symbols,
            points_2d: Vec::new(),
            points_3d: Vec::new(),
            view: ViewState::new(render.width as f64, render.height as f64),
            view_3d,
            start_color: render.start_color,
            end_color: render.end_color,
            gradient: render.gradient,
            rainbow: render.rainbow,
            dark_mode: render.dark_mode,
            stroke_scale: render.stroke_scale,
            animation: Animation::Idle,
        };
        explorer.rebuild_points();
        explorer.view.recompute_bounds(&explorer.points_3d, true);
        Ok(explorer)
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn points_2d(&self) -> &[Point2] {
        &self.points_2d
    }

    pub fn points_3d(&self) -> &[Point3] {
        &self.points_3d
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_3d(&self) -> bool {
        self.view_3d
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn segment_count(&self) -> usize {
        segment_count(&self.symbols)
    }

    pub fn controls_enabled(&self) -> bool {
        self.animation.controls_enabled()
    }

    pub fn colors(&self) -> (Rgb, Rgb, bool, bool) {
        (self.start_color, self.end_color, self.gradient, self.rainbow)
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn color_policy(&self) -> ColorPolicy {
        ColorPolicy::from_flags(self.start_color, self.end_color, self.gradient, self.rainbow)
    }

    pub fn style(&self) -> Style {
        Style::new(self.dark_mode, self.stroke_scale)
    }

    fn locked(&self, what: &str) -> bool {
        if self.animation.is_running() {
            tracing::debug!("Ignoring {} change while animating", what);
            return true;
        }
        false
    }

    /// Apply a text edit from a control
    ///
    /// Unparseable or out-of-range text keeps the last valid value and
    /// returns `Ok(false)`. A numeric but impossible iteration count is a
    /// contract violation and fails with `InvalidIterations`.
    pub fn apply(&mut self, edit: ParamEdit) -> Result<bool, CurveError> {
        if self.locked("parameter") {
            return Ok(false);
        }

        let mut next = self.params;
        match &edit {
            ParamEdit::Iterations(raw) => match raw.trim().parse::<i64>() {
                Ok(n) => next.iterations = check_iterations(n)?,
                Err(_) => {
                    tracing::debug!("Non-numeric iterations '{}', keeping {}", raw, next.iterations);
                    return Ok(false);
                }
            },
            ParamEdit::Angle(raw) => match parse_in_range(raw, ANGLE_RANGE) {
                Some(v) => next.angle = round_hundredths(v),
                None => return Ok(self.keep(&edit)),
            },
            ParamEdit::Twist(raw) => match parse_in_range(raw, TWIST_RANGE) {
                Some(v) => next.twist = round_hundredths(v),
                None => return Ok(self.keep(&edit)),
            },
            ParamEdit::Extrusion(raw) => match parse_in_range(raw, EXTRUSION_RANGE) {
                Some(v) => next.extrusion = v,
                None => return Ok(self.keep(&edit)),
            },
            ParamEdit::Speed(raw) => match raw.trim().parse::<u32>() {
                Ok(v) if (SPEED_RANGE.0..=SPEED_RANGE.1).contains(&v) => next.speed = v,
                _ => return Ok(self.keep(&edit)),
            },
        }

        if next == self.params {
            return Ok(false);
        }
        self.set_params(next)?;
        Ok(true)
    }

    fn keep(&self, edit: &ParamEdit) -> bool {
        tracing::debug!("Invalid input {:?}, keeping last valid value", edit);
        false
    }

    /// Replace all parameters at once and rerun the pipeline
    pub fn set_params(&mut self, params: CurveParams) -> Result<(), CurveError> {
        if self.locked("parameter") {
            return Ok(());
        }
        params.validate()?;

        let geometry_changed = params.iterations != self.params.iterations
            || params.angle != self.params.angle
            || params.twist != self.params.twist
            || params.extrusion != self.params.extrusion;
        self.params = params;

        if geometry_changed {
            self.regenerate()?;
        }
        Ok(())
    }

    /// Symbols → both walks → camera bounds, keeping rotation and zoom
    pub fn regenerate(&mut self) -> Result<(), CurveError> {
        self.symbols = self.cache.get(self.params.iterations)?;
        self.rebuild_points();
        self.view.recompute_bounds(&self.points_3d, false);
        tracing::debug!(
            "Regenerated n={} angle={} twist={} extrusion={}: {} segments",
            self.params.iterations,
            self.params.angle,
            self.params.twist,
            self.params.extrusion,
            self.segment_count()
        );
        Ok(())
    }

    fn rebuild_points(&mut self) {
        self.points_2d = walk_2d(&self.symbols, self.params.angle);
        self.points_3d = walk_3d(
            &self.symbols,
            self.params.angle,
            self.params.twist,
            self.params.extrusion,
        );
    }

    /// Switching into 3D starts from a fresh view
    pub fn set_view_3d(&mut self, enabled: bool) {
        if self.locked("3D mode") || enabled == self.view_3d {
            return;
        }
        self.view_3d = enabled;
        if enabled {
            self.view.recompute_bounds(&self.points_3d, true);
        }
    }

    pub fn set_colors(&mut self, start: Rgb, end: Rgb) {
        if !self.locked("color") {
            self.start_color = start;
            self.end_color = end;
        }
    }

    pub fn set_gradient(&mut self, enabled: bool) {
        if !self.locked("gradient") {
            self.gradient = enabled;
        }
    }

    pub fn set_rainbow(&mut self, enabled: bool) {
        if !self.locked("rainbow") {
            self.rainbow = enabled;
        }
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        if !self.locked("dark mode") {
            self.dark_mode = enabled;
        }
    }

    pub fn reset_view(&mut self) {
        self.view.reset_rotation();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if (width, height) != (self.view.width, self.view.height) {
            tracing::debug!("Canvas resized to {}x{}", width, height);
            self.view.resize(width, height);
        }
    }

    pub fn drag(&mut self, dx: f64, dy: f64) {
        if self.view_3d {
            self.view.drag(dx, dy);
        }
    }

    pub fn wheel(&mut self, delta: f64) {
        if self.view_3d {
            self.view.wheel(delta);
        }
    }

    /// Snapshot the parameters and begin revealing; no-op while running
    pub fn start_animation(&mut self, now: Instant) -> Result<bool, CurveError> {
        if self.animation.is_running() {
            return Ok(self.animation.start(self.params, self.segment_count(), now));
        }
        self.regenerate()?;
        Ok(self.animation.start(self.params, self.segment_count(), now))
    }

    pub fn cancel_animation(&mut self) -> bool {
        self.animation.cancel()
    }

    /// Advance the animation if a tick is due
    ///
    /// On `Finished` the static view is rebuilt from the parameters the
    /// run started with.
    pub fn poll_animation(&mut self, now: Instant) -> Result<Option<Tick>, CurveError> {
        let snapshot = match &self.animation {
            Animation::Running(run) => run.snapshot,
            Animation::Idle => return Ok(None),
        };
        let tick = self.animation.poll(now);
        if tick == Some(Tick::Finished) {
            self.params = snapshot;
            self.regenerate()?;
        }
        Ok(tick)
    }

    /// Stop any run and drop the cached symbol strings
    pub fn teardown(&mut self) {
        self.cancel_animation();
        if !self.cache.is_empty() {
            tracing::debug!("Releasing {} cached symbol strings", self.cache.len());
            self.cache.clear();
        }
    }

    /// Draw the current state: the revealed prefix while animating,
    /// everything otherwise
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        let limit = self.animation.progress();
        let policy = self.color_policy();
        let style = self.style();

        if self.view_3d {
            let (w, h) = surface.size();
            if (w, h) == (self.view.width, self.view.height) {
                render::draw_3d(surface, &self.points_3d, &self.view, &policy, &style, limit)
            } else {
                let mut view = self.view.clone();
                view.resize(w, h);
                render::draw_3d(surface, &self.points_3d, &view, &policy, &style, limit)
            }
        } else {
            render::draw_2d(surface, &self.points_2d, &policy, &style, limit)
        }
    }
}
