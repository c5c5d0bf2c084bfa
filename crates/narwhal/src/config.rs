//! Layout options and their resolution over per-variant defaults.

use crate::easing::Easing;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Which distance/weight builders drive the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    /// All-pairs shortest-path targets, uniform weights.
    #[default]
    Classic,
    /// Edge-length targets with an annealed force between non-adjacent pairs.
    Maxent,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Maxent => "maxent",
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "stress" => Ok(Variant::Classic),
            "maxent" | "maxent-stress" => Ok(Variant::Maxent),
            other => Err(Error::InvalidOption {
                option: "variant",
                reason: format!("unknown variant `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopPolicy {
    /// Run exactly `iterations` sweeps.
    IterationCapOnly,
    /// Stop early once the relative stress decrease drops below `epsilon`.
    EpsilonOrCap,
}

impl FromStr for StopPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cap" | "iterationcaponly" | "iteration-cap-only" => Ok(StopPolicy::IterationCapOnly),
            "epsilon" | "epsilonorcap" | "epsilon-or-cap" => Ok(StopPolicy::EpsilonOrCap),
            other => Err(Error::InvalidOption {
                option: "stopPolicy",
                reason: format!("unknown stop policy `{other}`"),
            }),
        }
    }
}

/// How node updates within one sweep see each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SweepOrder {
    /// Node `i` sees the positions already updated earlier in the same sweep.
    #[default]
    InPlace,
    /// Every update reads the previous sweep's full snapshot.
    Snapshot,
}

impl FromStr for SweepOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-place" | "inplace" => Ok(SweepOrder::InPlace),
            "snapshot" => Ok(SweepOrder::Snapshot),
            other => Err(Error::InvalidOption {
                option: "sweep",
                reason: format!("unknown sweep order `{other}`"),
            }),
        }
    }
}

/// User-facing options; unset fields fall back to the variant defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutOptions {
    pub epsilon: Option<f64>,
    pub iterations: Option<usize>,
    #[serde(alias = "alpha_step")]
    pub alpha_step: Option<usize>,
    pub q: Option<f64>,
    pub easing: Option<Easing>,
    /// Animation duration in milliseconds.
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub duration: Option<Duration>,
    #[serde(alias = "stop_policy")]
    pub stop_policy: Option<StopPolicy>,
    pub sweep: Option<SweepOrder>,
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let ms: Option<f64> = Option::deserialize(deserializer)?;
    match ms {
        None => Ok(None),
        Some(ms) if ms.is_finite() && ms >= 0.0 => Ok(Some(Duration::from_secs_f64(ms / 1000.0))),
        Some(ms) => Err(serde::de::Error::custom(format!(
            "duration must be a non-negative number of milliseconds, got {ms}"
        ))),
    }
}

/// Fully resolved and validated run configuration.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub variant: Variant,
    pub epsilon: f64,
    pub iterations: usize,
    pub alpha_step: usize,
    pub q: f64,
    pub easing: Option<Easing>,
    pub duration: Option<Duration>,
    pub stop_policy: StopPolicy,
    pub sweep: SweepOrder,
}

impl LayoutConfig {
    pub const DEFAULT_EPSILON: f64 = 0.0001;
    pub const DEFAULT_ALPHA_STEP: usize = 50;
    pub const DEFAULT_Q: f64 = 0.0;

    pub fn default_iterations(variant: Variant) -> usize {
        match variant {
            Variant::Classic => 1000,
            Variant::Maxent => 250,
        }
    }

    /// The classic loop honors the epsilon test; the maxent loop only stops at the cap.
    pub fn default_stop_policy(variant: Variant) -> StopPolicy {
        match variant {
            Variant::Classic => StopPolicy::EpsilonOrCap,
            Variant::Maxent => StopPolicy::IterationCapOnly,
        }
    }

    pub fn defaults(variant: Variant) -> Self {
        Self {
            variant,
            epsilon: Self::DEFAULT_EPSILON,
            iterations: Self::default_iterations(variant),
            alpha_step: Self::DEFAULT_ALPHA_STEP,
            q: Self::DEFAULT_Q,
            easing: None,
            duration: None,
            stop_policy: Self::default_stop_policy(variant),
            sweep: SweepOrder::default(),
        }
    }

    /// Merges `opts` over the defaults of `variant` (never over a previous configuration).
    pub fn resolve(variant: Variant, opts: &LayoutOptions) -> Result<Self> {
        let d = Self::defaults(variant);
        let cfg = Self {
            variant,
            epsilon: opts.epsilon.unwrap_or(d.epsilon),
            iterations: opts.iterations.unwrap_or(d.iterations),
            alpha_step: opts.alpha_step.unwrap_or(d.alpha_step),
            q: opts.q.unwrap_or(d.q),
            easing: opts.easing.clone(),
            duration: opts.duration,
            stop_policy: opts.stop_policy.unwrap_or(d.stop_policy),
            sweep: opts.sweep.unwrap_or(d.sweep),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(Error::InvalidOption {
                option: "epsilon",
                reason: format!("expected a finite non-negative number, got {}", self.epsilon),
            });
        }
        if self.iterations == 0 {
            return Err(Error::InvalidOption {
                option: "iterations",
                reason: "at least one iteration is required".to_string(),
            });
        }
        if self.alpha_step == 0 {
            return Err(Error::InvalidOption {
                option: "alphaStep",
                reason: "annealing stages need at least one iteration".to_string(),
            });
        }
        if !self.q.is_finite() {
            return Err(Error::InvalidOption {
                option: "q",
                reason: format!("expected a finite exponent, got {}", self.q),
            });
        }
        Ok(())
    }
}
