use std::time::Duration;

use crate::curve::EasingCurve;

/// Playback direction of a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineDirection {
    Forward,
    Backward,
}

impl TimelineDirection {
    pub fn toggled(self) -> Self {
        match self {
            TimelineDirection::Forward => TimelineDirection::Backward,
            TimelineDirection::Backward => TimelineDirection::Forward,
        }
    }
}

const MIN_DURATION: Duration = Duration::from_millis(1);

/// Duration-bounded progress tracker driven by explicit frame deltas.
///
/// Elapsed time only moves through [`Timeline::update`]; the timeline never
/// reads the clock itself, so a model is a pure function of the deltas it
/// has been fed.
#[derive(Debug, Clone)]
pub struct Timeline {
    duration: Duration,
    direction: TimelineDirection,
    curve: EasingCurve,
    elapsed: Duration,
    done: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), TimelineDirection::Forward)
    }
}

impl Timeline {
    pub fn new(duration: Duration, direction: TimelineDirection) -> Self {
        Self {
            duration: duration.max(MIN_DURATION),
            direction,
            curve: EasingCurve::Linear,
            elapsed: Duration::ZERO,
            done: false,
        }
    }

    /// Raw linear progress in `[0, 1]`, independent of direction.
    pub fn progress(&self) -> f64 {
        self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    /// Eased value; backward playback runs the curve from 1 down to 0.
    pub fn value(&self) -> f64 {
        let t = self.progress();
        let t = match self.direction {
            TimelineDirection::Forward => t,
            TimelineDirection::Backward => 1.0 - t,
        };
        self.curve.value_for_progress(t)
    }

    pub fn update(&mut self, delta: Duration) {
        if self.done {
            return;
        }
        self.elapsed += delta;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.done = true;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the duration while keeping the current progress.
    pub fn set_duration(&mut self, duration: Duration) {
        let duration = duration.max(MIN_DURATION);
        if duration == self.duration {
            return;
        }
        let old = self.duration.as_nanos();
        let scaled = (self.elapsed.as_nanos() * duration.as_nanos() + old / 2) / old;
        self.elapsed = Duration::from_nanos(scaled.min(duration.as_nanos()) as u64);
        self.duration = duration;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.done = true;
        }
    }

    pub fn direction(&self) -> TimelineDirection {
        self.direction
    }

    /// Switches playback direction. Time already spent is mirrored so the
    /// visible value does not jump.
    pub fn set_direction(&mut self, direction: TimelineDirection) {
        if self.direction == direction {
            return;
        }
        if self.elapsed > Duration::ZERO {
            self.elapsed = self.duration - self.elapsed;
        }
        self.direction = direction;
    }

    pub fn toggle_direction(&mut self) {
        self.set_direction(self.direction.toggled());
    }

    pub fn curve(&self) -> EasingCurve {
        self.curve
    }

    pub fn set_curve(&mut self, curve: EasingCurve) {
        self.curve = curve;
    }

    pub fn running(&self) -> bool {
        self.elapsed != Duration::ZERO && self.elapsed != self.duration
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.done = false;
    }
}
