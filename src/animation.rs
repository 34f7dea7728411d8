//! Animated score counters.
//!
//! Every displayed score owns an [`AnimatedValue`]. When its target changes a
//! new [`AnimationRun`] starts from whatever is on screen at that instant and
//! eases toward the new target over a fixed duration. Values are fractional
//! internally and floored for display; a finished run always lands exactly
//! on its target.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::feed::Match;

/// Interpolation curve mapping normalised time to normalised progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutQuad,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// One time-bounded transition from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

/// Start a run at `started` that moves from `from` to `to` over `duration`.
pub fn animate(
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
    started: Instant,
) -> AnimationRun {
    AnimationRun {
        from,
        to,
        started,
        duration,
        easing,
    }
}

impl AnimationRun {
    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        if self.is_finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    /// Lazy sequence of values sampled every `step`, ending exactly at the
    /// target.
    #[cfg(test)]
    pub fn frames(&self, step: Duration) -> Frames {
        Frames {
            run: *self,
            step,
            offset: Duration::ZERO,
            done: false,
        }
    }
}

#[cfg(test)]
pub struct Frames {
    run: AnimationRun,
    step: Duration,
    offset: Duration,
    done: bool,
}

#[cfg(test)]
impl Iterator for Frames {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.done {
            return None;
        }
        self.offset = self.offset.saturating_add(self.step);
        if self.step.is_zero() || self.offset >= self.run.duration {
            self.done = true;
            return Some(self.run.to);
        }
        Some(self.run.value_at(self.run.started + self.offset))
    }
}

/// A single on-screen number that eases toward its latest target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedValue {
    displayed: f64,
    target: u32,
    run: Option<AnimationRun>,
    duration: Duration,
    easing: Easing,
}

impl AnimatedValue {
    pub fn new(initial: u32, duration: Duration, easing: Easing) -> Self {
        AnimatedValue {
            displayed: f64::from(initial),
            target: initial,
            run: None,
            duration,
            easing,
        }
    }

    /// Retarget. The new run starts from the value on screen at `now`.
    pub fn set_target(&mut self, to: u32, now: Instant) {
        if to == self.target {
            return;
        }
        let current = self.value_at(now);
        self.displayed = current;
        self.target = to;
        self.run = Some(animate(current, f64::from(to), self.duration, self.easing, now));
    }

    /// Advance to `now`. Returns true if the floored display value changed
    /// or the run just completed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        let before = self.display();
        self.displayed = run.value_at(now);
        let finished = run.is_finished(now);
        if finished {
            self.displayed = run.target();
            self.run = None;
        }
        finished || before != self.display()
    }

    pub fn display(&self) -> u32 {
        self.displayed.floor().max(0.0) as u32
    }

    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    fn value_at(&self, now: Instant) -> f64 {
        match &self.run {
            Some(run) => run.value_at(now),
            None => self.displayed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

/// Animated scores for every visible row, keyed by match title and side.
#[derive(Debug)]
pub struct ScoreAnimations {
    values: HashMap<(String, Side), AnimatedValue>,
    duration: Duration,
    easing: Easing,
}

impl ScoreAnimations {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        ScoreAnimations {
            values: HashMap::new(),
            duration,
            easing,
        }
    }

    /// Reconcile with the currently visible rows. New rows count up from
    /// zero, existing rows retarget, rows no longer visible are dropped
    /// together with any run in progress.
    pub fn sync(&mut self, visible: &[&Match], now: Instant) {
        let (duration, easing) = (self.duration, self.easing);
        let mut keep = HashSet::with_capacity(visible.len() * 2);
        for m in visible {
            for (side, score) in [(Side::Home, m.home_score), (Side::Away, m.away_score)] {
                let key = (m.title.clone(), side);
                self.values
                    .entry(key.clone())
                    .or_insert_with(|| AnimatedValue::new(0, duration, easing))
                    .set_target(score, now);
                keep.insert(key);
            }
        }
        let before = self.len();
        self.values.retain(|key, _| keep.contains(key));
        if self.len() < before {
            debug!("Released {} hidden score animations", before - self.len());
        }
    }

    /// Advance every running animation. Returns true if anything on screen
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for value in self.values.values_mut() {
            changed |= value.tick(now);
        }
        changed
    }

    pub fn is_animating(&self) -> bool {
        self.values.values().any(AnimatedValue::is_animating)
    }

    pub fn displayed(&self, title: &str, side: Side) -> Option<u32> {
        self.values
            .get(&(title.to_string(), side))
            .map(AnimatedValue::display)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
