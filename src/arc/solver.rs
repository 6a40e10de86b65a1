use crate::arc::config::{ArcFixtureConfig, FractionInterval, PanTilt};
use crate::foundation::core::{round_channel_value, validate_channel_value};
use crate::foundation::error::{MotionError, MotionResult};
use crate::geometry::rotation::AxisRotation;
use crate::geometry::sphere::{
    EPSILON, SPHERE_RADIUS, SphericalPoint, channel_value_to_rad, rad_to_channel_value, to_cartesian,
    to_spherical,
};
use crate::geometry::vector::{Point3, distance, normalize_vector, translate, vector_scalar};
use std::f64::consts::{PI, TAU};
use std::time::Duration;

/// Largest number of update intervals one arc may span.
///
/// Every sample becomes a scheduled tick, so longer arcs must use a coarser update interval.
pub const MAX_ARC_STEPS: u64 = 1_000_000;

/// Inputs for [`solve_arc`]. Orientations are in raw channel-value units.
#[derive(Clone, Copy, Debug)]
pub struct ArcRequest {
    pub current: PanTilt,
    pub target: PanTilt,
    /// Any orientation on the circle's axis; it does not need to be exact.
    pub center: PanTilt,
    pub fixture: ArcFixtureConfig,
    pub duration: Duration,
    pub update_interval: Duration,
    pub interval: FractionInterval,
}

/// One sampled orientation along an arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSample {
    /// Tick index in the full (untrimmed) step grid.
    pub index: u64,
    /// Circle parameter for this sample.
    pub t: f64,
    /// Delay from the start of the emitted sequence.
    pub offset: Duration,
    pub pan: u8,
    pub tilt: u8,
    /// `true` for the final write that snaps onto the requested target.
    pub terminal: bool,
}

/// Point on the axis through `center_on_sphere` that lies in the plane of the circle through `p`.
///
/// The result is `center_on_sphere` scaled so that `p - result` is orthogonal to it.
pub fn calc_center_point(center_on_sphere: Point3, p: Point3) -> Point3 {
    let module_sqr = vector_scalar(center_on_sphere, center_on_sphere);
    let coef = 1.0 - (module_sqr - vector_scalar(center_on_sphere, p)) / module_sqr;
    center_on_sphere * coef
}

/// Signed angular delta from `from` to `to` with `|delta| <= π`.
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let actual = to - from;
    if actual > PI {
        actual - TAU
    } else if actual < -PI {
        actual + TAU
    } else {
        actual
    }
}

/// A solved arc, ready to be sampled.
///
/// Consumed by [`IntoIterator`]; regenerating the samples requires solving again.
#[derive(Clone, Debug)]
pub struct ArcPath {
    fixture: ArcFixtureConfig,
    radius: f64,
    current_t: f64,
    target_t: f64,
    angle_step: f64,
    steps: f64,
    start_step: u64,
    end_step: u64,
    back: AxisRotation,
    plane_center: Point3,
    update_interval: Duration,
    terminal_offset: Duration,
    terminal: Option<(u8, u8)>,
}

impl ArcPath {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn current_t(&self) -> f64 {
        self.current_t
    }

    pub fn angle_delta(&self) -> f64 {
        shortest_angle_delta(self.current_t, self.target_t)
    }

    pub fn angle_step(&self) -> f64 {
        self.angle_step
    }

    /// Fractional number of update intervals in the full duration.
    pub fn steps(&self) -> f64 {
        self.steps
    }

    pub fn start_step(&self) -> u64 {
        self.start_step
    }

    pub fn end_step(&self) -> u64 {
        self.end_step
    }

    /// Number of samples the iterator yields, terminal write included.
    pub fn sample_count(&self) -> usize {
        (self.end_step - self.start_step + 1) as usize + usize::from(self.terminal.is_some())
    }

    /// Pan/tilt values of the last sample the iterator yields.
    pub fn final_values(&self) -> (u8, u8) {
        self.terminal.unwrap_or_else(|| {
            self.point_at(self.current_t + self.end_step as f64 * self.angle_step)
        })
    }

    /// Pan/tilt values at circle parameter `t`.
    pub fn point_at(&self, t: f64) -> (u8, u8) {
        let on_circle = Point3::new(self.radius * t.cos(), self.radius * t.sin(), 0.0);
        let p = translate(self.back.apply(on_circle), self.plane_center, 1.0);
        let s = to_spherical(p);
        let pan = validate_channel_value(rad_to_channel_value(s.phi, self.fixture.pan_angle));
        let tilt = validate_channel_value(rad_to_channel_value(s.theta, self.fixture.tilt_angle));
        tracing::trace!(t, r = s.r, theta = s.theta, phi = s.phi, pan, tilt, "arc sample");
        (round_channel_value(pan), round_channel_value(tilt))
    }
}

impl IntoIterator for ArcPath {
    type Item = ArcSample;
    type IntoIter = ArcSamples;

    fn into_iter(self) -> ArcSamples {
        ArcSamples {
            next: self.start_step,
            counter: 0,
            terminal_pending: self.terminal.is_some(),
            path: self,
        }
    }
}

/// Lazy, finite sample sequence over an [`ArcPath`].
#[derive(Debug)]
pub struct ArcSamples {
    path: ArcPath,
    next: u64,
    counter: u64,
    terminal_pending: bool,
}

impl Iterator for ArcSamples {
    type Item = ArcSample;

    fn next(&mut self) -> Option<ArcSample> {
        let path = &self.path;
        if self.next <= path.end_step {
            let index = self.next;
            let t = path.current_t + index as f64 * path.angle_step;
            let (pan, tilt) = path.point_at(t);
            let offset = step_offset(path.update_interval, self.counter);
            self.next += 1;
            self.counter += 1;
            return Some(ArcSample {
                index,
                t,
                offset,
                pan,
                tilt,
                terminal: false,
            });
        }
        if self.terminal_pending {
            self.terminal_pending = false;
            let (pan, tilt) = path.terminal?;
            return Some(ArcSample {
                index: path.end_step,
                t: path.current_t + path.angle_delta(),
                offset: path.terminal_offset,
                pan,
                tilt,
                terminal: true,
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let steps = (self.path.end_step + 1).saturating_sub(self.next) as usize;
        let n = steps + usize::from(self.terminal_pending);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ArcSamples {}

fn step_offset(interval: Duration, steps: u64) -> Duration {
    let nanos = interval.as_nanos().saturating_mul(u128::from(steps));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

// Circle parameter in [0, 2π) of a point on the local z = 0 circle.
fn circle_param(p: Point3) -> f64 {
    p.y.atan2(p.x).rem_euclid(TAU)
}

/// Solve the circle through `current` and `target` around `center` and prepare its samples.
///
/// Fails with [`MotionError::InconsistentCenter`] when `center` is not equidistant from both
/// orientations.
#[tracing::instrument(level = "debug", skip_all)]
pub fn solve_arc(req: &ArcRequest) -> MotionResult<ArcPath> {
    req.fixture.validate()?;
    if req.update_interval.is_zero() {
        return Err(MotionError::validation("arc update interval must be > 0"));
    }
    for (name, v) in [
        ("start", req.current),
        ("end", req.target),
        ("center", req.center),
    ] {
        if !(v.pan.is_finite() && v.tilt.is_finite()) {
            return Err(MotionError::invalid_arc_payload(format!(
                "{name} orientation must be finite"
            )));
        }
    }

    let cfg = &req.fixture;
    let to_point = |v: PanTilt| {
        let theta = channel_value_to_rad(v.tilt, cfg.tilt_angle);
        let phi = channel_value_to_rad(v.pan, cfg.pan_angle);
        (theta, phi, to_cartesian(SphericalPoint::new(SPHERE_RADIUS, theta, phi)))
    };
    let (_, _, current) = to_point(req.current);
    let (target_theta, target_phi, target) = to_point(req.target);
    let (_, _, center_on_sphere) = to_point(req.center);

    let normal = normalize_vector(center_on_sphere);
    let plane_center = calc_center_point(center_on_sphere, current);
    tracing::trace!(?current, ?target, ?plane_center, ?normal, "arc input points");

    let forward = AxisRotation::aligning(normal);
    let back = forward.inverse();
    let current_local = forward.apply(translate(current, plane_center, -1.0));
    let target_local = forward.apply(translate(target, plane_center, -1.0));
    let center_local = forward.apply(translate(plane_center, plane_center, -1.0));

    let radius = distance(current_local, center_local);
    let target_radius = distance(target_local, center_local);
    if (target_radius - radius).abs() > EPSILON {
        tracing::warn!(radius, target_radius, "rejecting arc: invalid center point");
        return Err(MotionError::InconsistentCenter {
            current_radius: radius,
            target_radius,
        });
    }

    let current_t = circle_param(current_local);
    let target_t = circle_param(target_local);
    let delta = shortest_angle_delta(current_t, target_t);

    let steps = req.duration.as_nanos() as f64 / req.update_interval.as_nanos() as f64;
    if steps > MAX_ARC_STEPS as f64 {
        return Err(MotionError::validation(format!(
            "arc spans {steps:.0} update intervals, limit is {MAX_ARC_STEPS}"
        )));
    }
    let angle_step = if steps > 0.0 { delta / steps } else { 0.0 };
    let start_step = (steps * req.interval.start()).trunc() as u64;
    let end_step = (steps * req.interval.end()).trunc() as u64;
    tracing::debug!(
        radius,
        current_t,
        target_t,
        delta,
        steps,
        start_step,
        end_step,
        "arc parameters"
    );

    let terminal = (end_step == steps.trunc() as u64).then(|| {
        let pan = validate_channel_value(rad_to_channel_value(target_phi, cfg.pan_angle));
        let tilt = validate_channel_value(rad_to_channel_value(target_theta, cfg.tilt_angle));
        (round_channel_value(pan), round_channel_value(tilt))
    });
    let last_step_offset = step_offset(req.update_interval, end_step - start_step);
    let span_nanos = (req.duration.as_nanos() as f64 * req.interval.span()).round() as u64;
    let terminal_offset = Duration::from_nanos(span_nanos).max(last_step_offset);

    Ok(ArcPath {
        fixture: *cfg,
        radius,
        current_t,
        target_t,
        angle_step,
        steps,
        start_step,
        end_step,
        back,
        plane_center,
        update_interval: req.update_interval,
        terminal_offset,
        terminal,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/arc/solver.rs"]
mod tests;
