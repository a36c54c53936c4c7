use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Monotonic mapping from normalized progress to an eased value.
///
/// Curves are plain values: they are copied into parameter bundles and
/// sampled with [`EasingCurve::value_for_progress`]. Input progress is
/// clamped to `[0, 1]` before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr", into = "CurveRepr")]
pub enum EasingCurve {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    #[default]
    InOutSine,
    InCirc,
    OutCirc,
    InOutCirc,
    InBounce,
    OutBounce,
    InOutBounce,
    /// CSS-style cubic Bézier through `(0, 0)` and `(1, 1)`.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

const NAMED_CURVES: &[(&str, EasingCurve)] = &[
    ("linear", EasingCurve::Linear),
    ("in-quad", EasingCurve::InQuad),
    ("out-quad", EasingCurve::OutQuad),
    ("in-out-quad", EasingCurve::InOutQuad),
    ("in-cubic", EasingCurve::InCubic),
    ("out-cubic", EasingCurve::OutCubic),
    ("in-out-cubic", EasingCurve::InOutCubic),
    ("in-quart", EasingCurve::InQuart),
    ("out-quart", EasingCurve::OutQuart),
    ("in-out-quart", EasingCurve::InOutQuart),
    ("in-quint", EasingCurve::InQuint),
    ("out-quint", EasingCurve::OutQuint),
    ("in-out-quint", EasingCurve::InOutQuint),
    ("in-sine", EasingCurve::InSine),
    ("out-sine", EasingCurve::OutSine),
    ("in-out-sine", EasingCurve::InOutSine),
    ("in-circ", EasingCurve::InCirc),
    ("out-circ", EasingCurve::OutCirc),
    ("in-out-circ", EasingCurve::InOutCirc),
    ("in-bounce", EasingCurve::InBounce),
    ("out-bounce", EasingCurve::OutBounce),
    ("in-out-bounce", EasingCurve::InOutBounce),
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("unknown easing curve '{0}'")]
    UnknownName(String),
    #[error("cubic-bezier x control points must lie in [0, 1], got {0} and {1}")]
    BezierOutOfRange(f64, f64),
}

impl EasingCurve {
    /// Builds a cubic Bézier curve, rejecting control points whose x
    /// coordinates would make the curve non-monotonic in time.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, CurveError> {
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(CurveError::BezierOutOfRange(x1, x2));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Kebab-case name of a named curve; `None` for Bézier curves.
    pub fn name(&self) -> Option<&'static str> {
        NAMED_CURVES
            .iter()
            .find(|(_, curve)| curve == self)
            .map(|(name, _)| *name)
    }

    pub fn value_for_progress(&self, progress: f64) -> f64 {
        let t = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        match *self {
            EasingCurve::Linear => t,
            EasingCurve::InQuad => ease_in_pow(t, 2),
            EasingCurve::OutQuad => ease_out_pow(t, 2),
            EasingCurve::InOutQuad => ease_in_out_pow(t, 2),
            EasingCurve::InCubic => ease_in_pow(t, 3),
            EasingCurve::OutCubic => ease_out_pow(t, 3),
            EasingCurve::InOutCubic => ease_in_out_pow(t, 3),
            EasingCurve::InQuart => ease_in_pow(t, 4),
            EasingCurve::OutQuart => ease_out_pow(t, 4),
            EasingCurve::InOutQuart => ease_in_out_pow(t, 4),
            EasingCurve::InQuint => ease_in_pow(t, 5),
            EasingCurve::OutQuint => ease_out_pow(t, 5),
            EasingCurve::InOutQuint => ease_in_out_pow(t, 5),
            EasingCurve::InSine => 1.0 - (t * PI / 2.0).cos(),
            EasingCurve::OutSine => (t * PI / 2.0).sin(),
            EasingCurve::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingCurve::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            EasingCurve::OutCirc => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            EasingCurve::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            EasingCurve::InBounce => 1.0 - bounce_out(1.0 - t),
            EasingCurve::OutBounce => bounce_out(t),
            EasingCurve::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            EasingCurve::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(t, x1, y1, x2, y2),
        }
    }
}

fn ease_in_pow(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn ease_out_pow(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn ease_in_out_pow(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

fn bezier_sample(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_derivative(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Solves `x(s) = t` with Newton-Raphson, falling back to bisection when the
/// slope flattens out, then returns `y(s)`.
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut s = t;
    for _ in 0..8 {
        let x = bezier_sample(s, x1, x2) - t;
        if x.abs() < EPSILON {
            return bezier_sample(s, y1, y2);
        }
        let dx = bezier_derivative(s, x1, x2);
        if dx.abs() < EPSILON {
            break;
        }
        s -= x / dx;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..64 {
        let x = bezier_sample(s, x1, x2);
        if (x - t).abs() < EPSILON {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }

    bezier_sample(s, y1, y2)
}

impl FromStr for EasingCurve {
    type Err = CurveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        NAMED_CURVES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, curve)| *curve)
            .ok_or_else(|| CurveError::UnknownName(value.trim().to_string()))
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingCurve::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            named => f.write_str(named.name().unwrap_or("linear")),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum CurveRepr {
    Name(String),
    Bezier {
        #[serde(rename = "cubic-bezier")]
        cubic_bezier: [f64; 4],
    },
}

impl TryFrom<CurveRepr> for EasingCurve {
    type Error = CurveError;

    fn try_from(repr: CurveRepr) -> Result<Self, Self::Error> {
        match repr {
            CurveRepr::Name(name) => name.parse(),
            CurveRepr::Bezier {
                cubic_bezier: [x1, y1, x2, y2],
            } => EasingCurve::cubic_bezier(x1, y1, x2, y2),
        }
    }
}

impl From<EasingCurve> for CurveRepr {
    fn from(curve: EasingCurve) -> Self {
        match curve {
            EasingCurve::CubicBezier { x1, y1, x2, y2 } => CurveRepr::Bezier {
                cubic_bezier: [x1, y1, x2, y2],
            },
            named => CurveRepr::Name(named.to_string()),
        }
    }
}
