//! Transition timing and interpolation.
//!
//! A [`Tween`] tracks how far a fixed-length transition has run; hosts feed
//! it frame deltas. [`interpolate`] blends two arc extents field by field.
//! Progress is eased with cubic in-out before blending, so arcs accelerate
//! out of their old position and settle into the new one.

use std::time::Duration;

use crate::render::partition::ArcLayout;

#[inline(always)]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline(always)]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic in-out easing on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let u = t - 2.0;
        (u * u * u + 2.0) / 2.0
    }
}

/// Blend `from` toward `to`; `t == 0` gives `from`, `t == 1` gives `to`.
pub fn interpolate(from: &ArcLayout, to: &ArcLayout, t: f64) -> ArcLayout {
    ArcLayout {
        x0: lerp(from.x0, to.x0, t),
        x1: lerp(from.x1, to.x1, t),
        y0: lerp(from.y0, to.y0, t),
        y1: lerp(from.y1, to.y1, t),
    }
}

/// Elapsed-time bookkeeping for one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Move the clock forward by `dt`, saturating at the end.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// Linear progress in `[0, 1]`. A zero-length tween is always complete.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        }
    }

    pub fn eased(&self) -> f64 {
        ease_cubic_in_out(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
