use std::time::Duration;

use crate::curve::EasingCurve;
use crate::direction::Direction;
use crate::geometry::Rect;

/// Tunables for one animation run, copied into every model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationParameters {
    pub squash_duration: Duration,
    pub stretch_duration: Duration,
    /// How long it takes to lift the window off the panel.
    pub bump_duration: Duration,
    /// Shape of the folded window; only used by the quad transform.
    pub shape_curve: EasingCurve,
    /// Baseline blend between the stretch and squash stages, in `[0, 1]`.
    pub shape_factor: f64,
    /// Upper bound for the extra lift, in pixels.
    pub max_bump_distance: i32,
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self::from_base_duration(Duration::from_millis(250))
    }
}

impl AnimationParameters {
    /// Derives stage durations from one base duration: squash runs for the
    /// full base, stretch for 40% of it and the bump for 90%.
    pub fn from_base_duration(base: Duration) -> Self {
        Self {
            squash_duration: base,
            stretch_duration: duration_fraction(base, 0.4),
            bump_duration: duration_fraction(base, 0.9),
            shape_curve: EasingCurve::InOutSine,
            shape_factor: 0.7,
            max_bump_distance: 20,
        }
    }
}

/// `duration × fraction` rounded to whole milliseconds, never below 1 ms.
pub fn duration_fraction(duration: Duration, fraction: f64) -> Duration {
    let millis = (duration.as_millis() as f64 * fraction).round();
    Duration::from_millis(millis.max(1.0) as u64)
}

/// How far the leading edge of the window overlaps the icon, plus up to
/// `max_bump` of extra lift.
///
/// The overlap is added to itself with the addend capped by `max_bump`, so a
/// deep overlap still lifts the window fully clear of the panel.
pub fn compute_bump_distance(
    window: &Rect,
    icon: &Rect,
    direction: Direction,
    max_bump: i32,
) -> i32 {
    let overlap = match direction {
        Direction::Top => icon.bottom() - window.top(),
        Direction::Right => window.right() - icon.left(),
        Direction::Bottom => window.bottom() - icon.top(),
        Direction::Left => icon.right() - window.left(),
    };
    let raw = overlap.max(0);
    raw + raw.min(max_bump.max(0))
}

/// Travel distance from the window to the icon along the motion axis,
/// including the bump. Clamped to at least one pixel.
pub fn travel_distance(
    window: &Rect,
    icon: &Rect,
    direction: Direction,
    bump_distance: f64,
) -> f64 {
    let distance = match direction {
        Direction::Top => (window.bottom() - icon.bottom()) as f64,
        Direction::Right => (icon.left() - window.left()) as f64,
        Direction::Bottom => (icon.top() - window.top()) as f64,
        Direction::Left => (window.right() - icon.right()) as f64,
    } + bump_distance;
    distance.max(1.0)
}

/// Fraction of the travel that the window itself covers, floored at the
/// configured baseline and capped at 1.
pub fn compute_shape_factor(
    window: &Rect,
    icon: &Rect,
    direction: Direction,
    bump_distance: i32,
    baseline: f64,
) -> f64 {
    let moving_extent = if direction.is_horizontal() {
        window.width
    } else {
        window.height
    };
    let distance = travel_distance(window, icon, direction, bump_distance as f64);
    let minimum = moving_extent as f64 / distance;
    baseline.max(minimum).min(1.0)
}
