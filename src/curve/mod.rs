//! Dragon Curve Model - symbols, parameters and errors
//!
//! The curve is described by a rewriting grammar over four symbols:
//! - `A`, `B`: forward draw (one unit step)
//! - `+`, `-`: turn left / turn right by the curve angle

pub mod lsystem;

pub use lsystem::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Invalid iteration count: {0} (expected 0..={max})", max = MAX_ITERATIONS)]
    InvalidIterations(i64),
    #[error("Invalid animation speed: {0} (expected {min}..={max} segments/second)", min = SPEED_RANGE.0, max = SPEED_RANGE.1)]
    InvalidSpeed(u32),
    #[error("Invalid {name}: {value} (expected {min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Accepted turn angle, in degrees
pub const ANGLE_RANGE: (f64, f64) = (-360.0, 360.0);
/// Accepted twist per turn, in degrees
pub const TWIST_RANGE: (f64, f64) = (-180.0, 180.0);
pub const EXTRUSION_RANGE: (f64, f64) = (-10.0, 10.0);
/// Segments per second
pub const SPEED_RANGE: (u32, u32) = (1, 10_000);

/// Finite and inside the closed range
pub fn in_range(value: f64, range: (f64, f64)) -> bool {
    value.is_finite() && value >= range.0 && value <= range.1
}

fn check_range(name: &'static str, value: f64, range: (f64, f64)) -> Result<(), CurveError> {
    if in_range(value, range) {
        Ok(())
    } else {
        Err(CurveError::OutOfRange { name, value, min: range.0, max: range.1 })
    }
}

/// One instruction of the symbol string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    A,
    B,
    Left,
    Right,
}

impl Symbol {
    /// Forward-draw symbols produce one segment each
    pub fn is_forward(self) -> bool {
        matches!(self, Symbol::A | Symbol::B)
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::Left => '+',
            Symbol::Right => '-',
        }
    }

    #[cfg(test)]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Symbol::A),
            'B' => Some(Symbol::B),
            '+' => Some(Symbol::Left),
            '-' => Some(Symbol::Right),
            _ => None,
        }
    }
}

/// Render a symbol string in its textual `A+B-...` form
pub fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.as_char()).collect()
}

/// Number of segments a symbol string draws
pub fn segment_count(symbols: &[Symbol]) -> usize {
    symbols.iter().filter(|s| s.is_forward()).count()
}

/// Everything that determines the generated geometry (plus animation pacing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    pub iterations: u32,
    /// Turn angle in degrees
    pub angle: f64,
    /// Twist about the local forward axis, in degrees, applied on every turn
    #[serde(default)]
    pub twist: f64,
    /// Constant offset along global Z per forward step
    #[serde(default)]
    pub extrusion: f64,
    /// Animation speed in segments per second
    #[serde(default = "default_speed")]
    pub speed: u32,
}

fn default_speed() -> u32 {
    60
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            iterations: 10,
            angle: 90.0,
            twist: 0.0,
            extrusion: 0.0,
            speed: default_speed(),
        }
    }
}

impl CurveParams {
    /// Reject parameter sets the walk cannot turn into usable geometry
    ///
    /// Every entry point (controls, CLI overrides, config presets) goes
    /// through here, so all of them accept the same values.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.iterations > MAX_ITERATIONS {
            return Err(CurveError::InvalidIterations(self.iterations as i64));
        }
        if !(SPEED_RANGE.0..=SPEED_RANGE.1).contains(&self.speed) {
            return Err(CurveError::InvalidSpeed(self.speed));
        }
        check_range("angle", self.angle, ANGLE_RANGE)?;
        check_range("twist", self.twist, TWIST_RANGE)?;
        check_range("extrusion", self.extrusion, EXTRUSION_RANGE)?;
        Ok(())
    }

    /// Delay between two animation ticks (1000 / speed ms)
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.speed.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_char_roundtrip() {
        for s in [Symbol::A, Symbol::B, Symbol::Left, Symbol::Right] {
            assert_eq!(Symbol::from_char(s.as_char()), Some(s));
        }
        assert_eq!(Symbol::from_char('F'), None);
    }

    #[test]
    fn test_params_validation() {
        assert!(CurveParams::default().validate().is_ok());

        let too_deep = CurveParams { iterations: MAX_ITERATIONS + 1, ..Default::default() };
        assert_eq!(
            too_deep.validate(),
            Err(CurveError::InvalidIterations(MAX_ITERATIONS as i64 + 1))
        );

        let frozen = CurveParams { speed: 0, ..Default::default() };
        assert_eq!(frozen.validate(), Err(CurveError::InvalidSpeed(0)));

        let frantic = CurveParams { speed: SPEED_RANGE.1 + 1, ..Default::default() };
        assert!(frantic.validate().is_err());
    }

    #[test]
    fn test_params_reject_non_finite_and_out_of_range() {
        for bad in [
            CurveParams { angle: f64::NAN, ..Default::default() },
            CurveParams { angle: -5000.0, ..Default::default() },
            CurveParams { twist: f64::INFINITY, ..Default::default() },
            CurveParams { twist: 181.0, ..Default::default() },
            CurveParams { extrusion: 1e308, ..Default::default() },
        ] {
            assert!(
                matches!(bad.validate(), Err(CurveError::OutOfRange { .. })),
                "accepted {:?}",
                bad
            );
        }

        let edge = CurveParams { angle: -360.0, twist: 180.0, extrusion: 10.0, ..Default::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_tick_interval() {
        let params = CurveParams { speed: 4, ..Default::default() };
        assert_eq!(params.tick_interval().as_millis(), 250);
    }

    #[test]
    fn test_params_yaml_defaults() {
        let params: CurveParams = serde_yaml::from_str("iterations: 3\nangle: 45.5\n").unwrap();
        assert_eq!(params.iterations, 3);
        assert_eq!(params.angle, 45.5);
        assert_eq!(params.twist, 0.0);
        assert_eq!(params.speed, 60);
    }
}
