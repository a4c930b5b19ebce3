//! Marching driver and step policies
//!
//! The driver owns the per-ray state machine and the accelerator protocol;
//! a step policy only decides how far to move after an evaluation. The
//! accelerator's end hook runs exactly once, when the ray is finished.

use glam::Vec3;

use super::{estimate_normal, Algorithm, MarchState, RaymarchConfig, RaymarchResult};
use crate::accel::{RayMarchContext, RayMarchState, RayStart, StepAction};
use crate::scene::Scene;
use crate::types::Ray;

/// March one ray through the scene
///
/// `ray.direction` must be unit length. Never fails: termination is bounded
/// by the iteration cap, the skip cap and `max_distance`.
pub fn march(
    scene: &Scene,
    ray: Ray,
    algorithm: Algorithm,
    config: &RaymarchConfig,
) -> RaymarchResult {
    let mut walk = RayWalk::new(scene, ray, config);
    let ctx = walk.context(0.0);

    let (t, state) = match scene.acceleration().on_ray_march_start(&ctx) {
        RayStart::Terminate => (config.max_distance, MarchState::Miss),
        start => {
            if let RayStart::Active(state) = start {
                walk.accel = Some(state);
            }
            let cap = algorithm.max_iterations(config);
            match algorithm {
                Algorithm::SphereTracer => walk.drive(&mut SphereTrace, cap),
                Algorithm::FixedStep { step } => walk.drive(&mut FixedStep { step }, cap),
                Algorithm::AdaptiveStep { relaxation } => {
                    walk.drive(&mut OverRelaxed::new(relaxation), cap)
                }
                Algorithm::AdaptiveStepV2 { overshoot } => {
                    walk.drive(&mut Overshoot::new(overshoot, false), cap)
                }
                Algorithm::AdaptiveStepV3 { overshoot } => {
                    walk.drive(&mut Overshoot::new(overshoot, true), cap)
                }
            }
        }
    };

    walk.finish(t, state)
}

/// What a policy decided after one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
enum Advance {
    Hit,
    Continue,
}

trait StepPolicy {
    /// Consume the distance `d` evaluated at `*t` and move `*t`
    fn advance(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance;

    /// Forget step history; called after an accelerator skip
    fn reset(&mut self) {}

    /// Whether running out of iterations short of `max_distance` is a hit
    fn cap_is_hit(&self) -> bool {
        true
    }
}

/// Per-ray bookkeeping shared by every policy
struct RayWalk<'a> {
    scene: &'a Scene,
    ray: Ray,
    config: &'a RaymarchConfig,
    accel: Option<RayMarchState>,
    evaluations: usize,
    iterations: u32,
    skips: u32,
}

impl<'a> RayWalk<'a> {
    fn new(scene: &'a Scene, ray: Ray, config: &'a RaymarchConfig) -> Self {
        RayWalk {
            scene,
            ray,
            config,
            accel: None,
            evaluations: 0,
            iterations: 0,
            skips: 0,
        }
    }

    fn context(&self, t: f32) -> RayMarchContext {
        RayMarchContext {
            origin: self.ray.origin,
            direction: self.ray.direction,
            current_distance: t,
            max_distance: self.config.max_distance,
        }
    }

    /// Ask the accelerator what to do at `t`
    fn consult(&mut self, t: f32) -> StepAction {
        if self.skips >= self.config.max_skips {
            return StepAction::Evaluate;
        }
        let ctx = self.context(t);
        let Some(state) = self.accel.as_mut() else {
            return StepAction::Evaluate;
        };
        let action = self.scene.acceleration().on_ray_march_step(&ctx, state);
        if let StepAction::Skip(_) = action {
            self.skips += 1;
        }
        action
    }

    /// Scene distance at `t`; counts one iteration
    fn sample(&mut self, t: f32) -> f32 {
        let sample = self.scene.distance(self.ray.at(t));
        self.evaluations += sample.evaluations;
        self.iterations += 1;
        sample.distance
    }

    fn drive<P: StepPolicy>(&mut self, policy: &mut P, cap: u32) -> (f32, MarchState) {
        let max = self.config.max_distance;
        let mut t = 0.0f32;
        let mut state = MarchState::Marching;

        loop {
            state = match state {
                MarchState::Marching => {
                    if self.iterations >= cap {
                        let end = if t < max && policy.cap_is_hit() {
                            MarchState::Hit
                        } else {
                            MarchState::Miss
                        };
                        return (t, end);
                    }
                    match self.consult(t) {
                        StepAction::Skip(d) => {
                            t += d;
                            MarchState::AccelSkip
                        }
                        StepAction::Exhausted => MarchState::Miss,
                        StepAction::Evaluate => {
                            let d = self.sample(t);
                            match policy.advance(self, &mut t, d) {
                                Advance::Hit => MarchState::Hit,
                                Advance::Continue if t > max => MarchState::Miss,
                                Advance::Continue => MarchState::Marching,
                            }
                        }
                    }
                }
                MarchState::AccelSkip => {
                    policy.reset();
                    if t > max {
                        MarchState::Miss
                    } else {
                        MarchState::Marching
                    }
                }
                MarchState::Hit | MarchState::Miss => return (t, state),
            };
        }
    }

    /// Release the accelerator state and build the result
    fn finish(mut self, t: f32, state: MarchState) -> RaymarchResult {
        if let Some(accel) = self.accel.take() {
            self.scene.acceleration().on_ray_march_end(accel);
        }

        let max = self.config.max_distance;
        let hit = state == MarchState::Hit && t < max;
        let (distance, normal) = if hit {
            let (n, evaluations) =
                estimate_normal(self.scene, self.ray.at(t), self.config.normal_epsilon);
            self.evaluations += evaluations;
            (t, n)
        } else {
            (max, Vec3::ZERO)
        };

        tracing::trace!(
            hit,
            distance,
            iterations = self.iterations,
            skips = self.skips,
            "ray finished"
        );

        RaymarchResult {
            hit,
            distance,
            point: self.ray.at(distance),
            normal,
            sdf_evaluations: self.evaluations,
            iterations: self.iterations,
            skips: self.skips,
            state: if hit { MarchState::Hit } else { MarchState::Miss },
        }
    }
}

struct SphereTrace;

impl StepPolicy for SphereTrace {
    #[inline]
    fn advance(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance {
        if d < walk.config.epsilon {
            return Advance::Hit;
        }
        *t += d;
        Advance::Continue
    }
}

struct FixedStep {
    step: f32,
}

impl StepPolicy for FixedStep {
    #[inline]
    fn advance(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance {
        // thin features can be stepped over
        if d < walk.config.epsilon {
            return Advance::Hit;
        }
        *t += self.step;
        Advance::Continue
    }

    // only a sample inside the surface is a hit
    fn cap_is_hit(&self) -> bool {
        false
    }
}

/// Over-relaxed sphere tracing
///
/// Every step is inflated by `omega`. When the sphere at the new position
/// does not reach back to the previous one (`prev_step > prev_dist + d`) the
/// ray returns to the last safe distance and relaxation is switched off for
/// the rest of the ray.
struct OverRelaxed {
    omega: f32,
    prev_dist: f32,
    prev_step: f32,
}

impl OverRelaxed {
    fn new(omega: f32) -> Self {
        OverRelaxed {
            omega,
            prev_dist: 0.0,
            prev_step: 0.0,
        }
    }
}

impl StepPolicy for OverRelaxed {
    fn advance(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance {
        if self.omega > 1.0 && self.prev_step > self.prev_dist + d {
            *t += self.prev_dist - self.prev_step;
            self.prev_step = self.prev_dist;
            self.omega = 1.0;
            return Advance::Continue;
        }
        if d < walk.config.epsilon {
            return Advance::Hit;
        }

        let step = d * self.omega;
        self.prev_dist = d;
        self.prev_step = step;
        *t += step;
        Advance::Continue
    }

    fn reset(&mut self) {
        self.prev_dist = 0.0;
        self.prev_step = 0.0;
    }
}

/// Inflated stepping validated by the sphere-overlap test
///
/// After an inflated step the spheres at the previous and current position
/// must overlap (`prev_step <= prev_dist + d`). When they do not, the ray
/// returns to the last safe distance. With `bridge` set, one extra
/// evaluation at that safe position may prove the gap empty and let the ray
/// keep its progress.
struct Overshoot {
    factor: f32,
    bridge: bool,
    prev_dist: f32,
    prev_step: f32,
    inflated: bool,
    inflate_next: bool,
}

impl Overshoot {
    fn new(factor: f32, bridge: bool) -> Self {
        Overshoot {
            factor,
            bridge,
            prev_dist: 0.0,
            prev_step: 0.0,
            inflated: false,
            inflate_next: false,
        }
    }

    #[inline]
    fn plain_step(&mut self, t: &mut f32, d: f32) {
        self.prev_dist = d;
        self.prev_step = d;
        self.inflated = false;
        self.inflate_next = true;
        *t += d;
    }

    fn bridge_gap(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance {
        let origin = *t - self.prev_step;
        *t = origin + self.prev_dist;
        let d3 = walk.sample(*t);

        if d > 0.0 && self.prev_dist + d + d3 >= self.prev_step {
            // three spheres cover the failed step; continue from its far end
            *t = origin + self.prev_step;
            self.plain_step(t, d);
            return Advance::Continue;
        }
        if d3 < walk.config.epsilon {
            return Advance::Hit;
        }
        self.plain_step(t, d3);
        Advance::Continue
    }
}

impl StepPolicy for Overshoot {
    fn advance(&mut self, walk: &mut RayWalk<'_>, t: &mut f32, d: f32) -> Advance {
        if self.inflated && self.prev_step > self.prev_dist + d {
            if self.bridge {
                return self.bridge_gap(walk, t, d);
            }
            // back to the last safe distance, which stands in for the plain step
            *t += self.prev_dist - self.prev_step;
            self.prev_step = self.prev_dist;
            self.inflated = false;
            self.inflate_next = true;
            return Advance::Continue;
        }
        if d < walk.config.epsilon {
            return Advance::Hit;
        }

        if self.inflate_next {
            let step = d * self.factor;
            self.prev_dist = d;
            self.prev_step = step;
            self.inflated = true;
            *t += step;
        } else {
            self.plain_step(t, d);
        }
        Advance::Continue
    }

    fn reset(&mut self) {
        self.inflated = false;
        self.inflate_next = false;
    }
}
