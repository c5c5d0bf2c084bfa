//! Interpolation curves for the final coordinate commit.

use crate::error::{Error, Result};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingCurve {
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
}

impl EasingCurve {
    pub const ALL: [EasingCurve; 7] = [
        EasingCurve::Linear,
        EasingCurve::QuadraticIn,
        EasingCurve::QuadraticOut,
        EasingCurve::QuadraticInOut,
        EasingCurve::CubicIn,
        EasingCurve::CubicOut,
        EasingCurve::CubicInOut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EasingCurve::Linear => "linear",
            EasingCurve::QuadraticIn => "quadraticIn",
            EasingCurve::QuadraticOut => "quadraticOut",
            EasingCurve::QuadraticInOut => "quadraticInOut",
            EasingCurve::CubicIn => "cubicIn",
            EasingCurve::CubicOut => "cubicOut",
            EasingCurve::CubicInOut => "cubicInOut",
        }
    }

    /// Maps linear progress `k` in `[0, 1]` onto the curve.
    pub fn apply(self, k: f64) -> f64 {
        match self {
            EasingCurve::Linear => k,
            EasingCurve::QuadraticIn => k * k,
            EasingCurve::QuadraticOut => k * (2.0 - k),
            EasingCurve::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            EasingCurve::CubicIn => k * k * k,
            EasingCurve::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            EasingCurve::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
        }
    }
}

impl FromStr for EasingCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        EasingCurve::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownEasing {
                name: wanted.to_string(),
            })
    }
}

/// Either a named curve or a caller-supplied function of progress.
#[derive(Clone)]
pub enum Easing {
    Curve(EasingCurve),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Easing {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(Arc::new(f))
    }

    /// Eased progress; input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Curve(c) => c.apply(t),
            Easing::Custom(f) => f(t),
        }
    }
}

impl std::fmt::Debug for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Easing::Curve(c) => f.debug_tuple("Curve").field(c).finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<EasingCurve> for Easing {
    fn from(value: EasingCurve) -> Self {
        Easing::Curve(value)
    }
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<EasingCurve>().map(Easing::Curve)
    }
}

impl<'de> serde::Deserialize<'de> for Easing {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse::<Easing>().map_err(serde::de::Error::custom)
    }
}
