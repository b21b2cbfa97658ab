//! Stroke colors: hex parsing, gradient and rainbow policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::curve::CurveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn r(self) -> u8 {
        self.0[0]
    }
    pub fn g(self) -> u8 {
        self.0[1]
    }
    pub fn b(self) -> u8 {
        self.0[2]
    }
}

impl FromStr for Rgb {
    type Err = CurveError;

    /// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `r,g,b`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bad = || CurveError::InvalidColor(s.to_string());

        if trimmed.contains(',') {
            let parts: Vec<u8> = trimmed
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| bad())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Rgb([*r, *g, *b])),
                _ => Err(bad()),
            };
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        match hex.len() {
            6 => Ok(Rgb([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    out[i] = channel(&c.to_string())? * 17;
                }
                Ok(Rgb(out))
            }
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = CurveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// How segment `i` of `total` gets its color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPolicy {
    Solid(Rgb),
    Gradient { start: Rgb, end: Rgb },
    /// Hue sweep; `start` only colors an empty walk
    Rainbow { start: Rgb },
}

impl ColorPolicy {
    /// Rainbow wins over gradient, gradient over solid
    pub fn from_flags(start: Rgb, end: Rgb, gradient: bool, rainbow: bool) -> Self {
        if rainbow {
            ColorPolicy::Rainbow { start }
        } else if gradient {
            ColorPolicy::Gradient { start, end }
        } else {
            ColorPolicy::Solid(start)
        }
    }

    /// Color used when there is nothing to interpolate over
    pub fn start(&self) -> Rgb {
        match *self {
            ColorPolicy::Solid(c) => c,
            ColorPolicy::Gradient { start, .. } => start,
            ColorPolicy::Rainbow { start } => start,
        }
    }

    pub fn color_at(&self, index: usize, total: usize) -> Rgb {
        if total == 0 {
            return self.start();
        }
        let t = index as f64 / total as f64;
        match *self {
            ColorPolicy::Solid(c) => c,
            ColorPolicy::Gradient { start, end } => Rgb([
                lerp_channel(start.r(), end.r(), t),
                lerp_channel(start.g(), end.g(), t),
                lerp_channel(start.b(), end.b(), t),
            ]),
            ColorPolicy::Rainbow { .. } => hsl_to_rgb(360.0 * t, 1.0, 0.5),
        }
    }
}

// Delta truncates toward zero, so t < 1 never lands on `end`
fn lerp_channel(start: u8, end: u8, t: f64) -> u8 {
    let delta = ((end as f64 - start as f64) * t).trunc();
    (start as f64 + delta).clamp(0.0, 255.0) as u8
}

/// Hue in degrees, saturation and lightness in 0..=1
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb([255, 128, 0]));
        assert_eq!("00FF10".parse::<Rgb>().unwrap(), Rgb([0, 255, 16]));
        assert_eq!("#f80".parse::<Rgb>().unwrap(), Rgb([255, 136, 0]));
        assert_eq!("12, 34,56".parse::<Rgb>().unwrap(), Rgb([12, 34, 56]));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("300,0,0".parse::<Rgb>().is_err());
        assert!("blue".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Rgb([1, 171, 255]).to_string(), "#01abff");
    }

    #[test]
    fn test_policy_priority() {
        let (a, b) = (Rgb::BLACK, Rgb::WHITE);
        assert_eq!(ColorPolicy::from_flags(a, b, true, true), ColorPolicy::Rainbow { start: a });
        assert_eq!(
            ColorPolicy::from_flags(a, b, true, false),
            ColorPolicy::Gradient { start: a, end: b }
        );
        assert_eq!(ColorPolicy::from_flags(a, b, false, false), ColorPolicy::Solid(a));
    }

    #[test]
    fn test_gradient_endpoints() {
        let start = Rgb([10, 200, 0]);
        let end = Rgb([250, 0, 255]);
        let policy = ColorPolicy::Gradient { start, end };

        for n in [2usize, 3, 10, 1000, 100_000] {
            assert_eq!(policy.color_at(0, n), start);
            let last = policy.color_at(n - 1, n);
            assert_ne!(last, end);
            for ch in 0..3 {
                let (lo, hi) = (start.0[ch].min(end.0[ch]), start.0[ch].max(end.0[ch]));
                assert!(last.0[ch] >= lo && last.0[ch] <= hi);
            }
        }
    }

    #[test]
    fn test_empty_total_uses_start() {
        let policy = ColorPolicy::Gradient { start: Rgb([1, 2, 3]), end: Rgb::WHITE };
        assert_eq!(policy.color_at(0, 0), Rgb([1, 2, 3]));
        let rainbow = ColorPolicy::from_flags(Rgb([9, 8, 7]), Rgb::WHITE, false, true);
        assert_eq!(rainbow.start(), Rgb([9, 8, 7]));
        assert_eq!(rainbow.color_at(0, 0), Rgb([9, 8, 7]));
        assert_eq!(rainbow.color_at(0, 4), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_rainbow_hues() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb([255, 0, 0]));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb([0, 255, 0]));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Rgb([0, 0, 255]));
        let rainbow = ColorPolicy::Rainbow { start: Rgb::BLACK };
        assert_eq!(rainbow.color_at(1, 3), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let c: Rgb = serde_yaml::from_str("\"#102030\"").unwrap();
        assert_eq!(c, Rgb([16, 32, 48]));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#102030\"");
    }
}
