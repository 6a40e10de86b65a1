use crate::foundation::core::round_channel_value;
use std::time::Duration;

/// One precomputed write of a linear fade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeStep {
    pub offset: Duration,
    pub value: u8,
}

/// Plan a stepwise ramp from `current` to `target`.
///
/// The nominal step count is `duration / rate`. When that would move less than one channel unit
/// per step, the count drops to `|target - current|` so no step is zero-magnitude. Intermediate
/// steps are evenly spaced over `duration`; the last entry is always the exact `target` at
/// `duration`.
pub fn plan_linear_fade(current: u8, target: u8, duration: Duration, rate: Duration) -> Vec<FadeStep> {
    let diff = f64::from(current.abs_diff(target));
    let mut steps = if rate.is_zero() {
        f64::INFINITY
    } else {
        duration.as_nanos() as f64 / rate.as_nanos() as f64
    };
    if diff / steps <= 1.0 {
        steps = diff;
    }

    let mut out = Vec::with_capacity(steps.ceil().min(4096.0) as usize + 1);
    if diff > 0.0 && steps > 0.0 {
        let per_step = diff / steps;
        let signed = if target > current { per_step } else { -per_step };
        let total_nanos = duration.as_nanos() as f64;
        let mut i = 1u32;
        while f64::from(i) < steps {
            out.push(FadeStep {
                offset: Duration::from_nanos((total_nanos * f64::from(i) / steps).round() as u64),
                value: round_channel_value(f64::from(current) + f64::from(i) * signed),
            });
            i += 1;
        }
    }
    out.push(FadeStep {
        offset: duration,
        value: target,
    });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transition/linear.rs"]
mod tests;
