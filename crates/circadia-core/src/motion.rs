//! Activity-driven motion integrator.
//!
//! Each subject owns a [`MotionState`]: a position confined to a bounded
//! rectangle and a free velocity. One step per resolved minute turns the
//! subject's activity sample into a random velocity kick, damps it, drops
//! sub-threshold drift, integrates, and clamps the result back into the
//! rectangle. Subjects never interact; every state advances independently.
//!
//! Randomness enters only through [`RandomSource`], so tests can replay
//! fixed draws and the engine can seed runs for reproducibility.

use std::collections::BTreeMap;

use circadia_types::{EntityId, Position};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::CoreConfig;

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// [`RandomSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<SmallRng> {
    /// Deterministic source for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Source seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self(SmallRng::from_rng(&mut rand::rng()))
    }

    /// Seeded source when a seed is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Velocity update parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Velocity multiplier per step.
    pub dampening: f64,
    /// Components below this magnitude are zeroed after damping.
    pub velocity_floor: f64,
    /// Activity-to-velocity-delta multiplier.
    pub movement_scale: f64,
    /// Activity value that maps to the full movement scale.
    pub activity_max: f64,
}

impl MotionParams {
    /// Magnitude of the random velocity kick for an activity value.
    ///
    /// Non-finite or negative activity produces no kick.
    pub fn factor(&self, activity: f64) -> f64 {
        let activity = if activity.is_finite() { activity.max(0.0) } else { 0.0 };
        activity / self.activity_max * self.movement_scale
    }
}

/// The rectangle subjects are confined to, already shrunk by the edge
/// margin on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    /// Smallest allowed x.
    pub min_x: f64,
    /// Largest allowed x.
    pub max_x: f64,
    /// Smallest allowed y.
    pub min_y: f64,
    /// Largest allowed y.
    pub max_y: f64,
}

impl PlotBounds {
    /// Bounds for a `width` by `height` area keeping `edge_margin` clear.
    ///
    /// Degenerate inputs collapse to a single point instead of producing
    /// an inverted range.
    pub fn new(width: f64, height: f64, edge_margin: f64) -> Self {
        let max_x = (width - edge_margin).max(edge_margin);
        let max_y = (height - edge_margin).max(edge_margin);
        Self {
            min_x: edge_margin,
            max_x,
            min_y: edge_margin,
            max_y,
        }
    }

    /// Whether a position lies inside the bounds (inclusive).
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_y..=self.max_y).contains(&position.y)
    }

    fn clamp(&self, position: Position) -> Position {
        Position {
            x: clamp_or_min(position.x, self.min_x, self.max_x),
            y: clamp_or_min(position.y, self.min_y, self.max_y),
        }
    }

    fn random_position(&self, rng: &mut impl RandomSource) -> Position {
        let x = (self.max_x - self.min_x).mul_add(rng.next_unit(), self.min_x);
        let y = (self.max_y - self.min_y).mul_add(rng.next_unit(), self.min_y);
        self.clamp(Position { x, y })
    }
}

fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Mutable motion state of one subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Current position, always inside the plot bounds.
    pub position: Position,
    /// Horizontal velocity.
    pub vx: f64,
    /// Vertical velocity.
    pub vy: f64,
}

impl MotionState {
    /// A state at rest at the given position.
    pub const fn at_rest(position: Position) -> Self {
        Self {
            position,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Euclidean length of the velocity vector.
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Per-subject motion states advanced by activity samples.
#[derive(Debug)]
pub struct MotionIntegrator<S> {
    params: MotionParams,
    bounds: PlotBounds,
    states: BTreeMap<EntityId, MotionState>,
    rng: S,
}

impl<S: RandomSource> MotionIntegrator<S> {
    /// Place every subject at a random position with zero velocity.
    pub fn new(
        ids: impl IntoIterator<Item = EntityId>,
        params: MotionParams,
        bounds: PlotBounds,
        mut rng: S,
    ) -> Self {
        let states = ids
            .into_iter()
            .map(|id| {
                let position = bounds.random_position(&mut rng);
                (id, MotionState::at_rest(position))
            })
            .collect();
        Self {
            params,
            bounds,
            states,
            rng,
        }
    }

    /// Build an integrator from the core configuration.
    pub fn from_config(
        ids: impl IntoIterator<Item = EntityId>,
        config: &CoreConfig,
        rng: S,
    ) -> Self {
        let params = MotionParams {
            dampening: config.dampening,
            velocity_floor: config.velocity_floor,
            movement_scale: config.movement_scale,
            activity_max: config.activity_max,
        };
        let bounds = PlotBounds::new(config.width, config.height, config.edge_margin);
        Self::new(ids, params, bounds, rng)
    }

    /// Advance one subject by one step. Returns `false` for unknown ids.
    pub fn step(&mut self, id: &EntityId, activity: f64) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        let factor = self.params.factor(activity);

        state.vx += (self.rng.next_unit() - 0.5) * factor;
        state.vy += (self.rng.next_unit() - 0.5) * factor;

        state.vx *= self.params.dampening;
        state.vy *= self.params.dampening;

        if state.vx.abs() < self.params.velocity_floor {
            state.vx = 0.0;
        }
        if state.vy.abs() < self.params.velocity_floor {
            state.vy = 0.0;
        }

        state.position = self.bounds.clamp(Position {
            x: state.position.x + state.vx,
            y: state.position.y + state.vy,
        });
        true
    }

    /// Current position of a subject.
    pub fn position_of(&self, id: &EntityId) -> Option<Position> {
        self.states.get(id).map(|s| s.position)
    }

    /// Full motion state of a subject.
    pub fn state_of(&self, id: &EntityId) -> Option<&MotionState> {
        self.states.get(id)
    }

    /// Re-place one subject at a fresh random position with zero
    /// velocity. Returns `false` for unknown ids.
    pub fn reset(&mut self, id: &EntityId) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        *state = MotionState::at_rest(self.bounds.random_position(&mut self.rng));
        true
    }

    /// Re-place every subject.
    pub fn reset_all(&mut self) {
        for state in self.states.values_mut() {
            *state = MotionState::at_rest(self.bounds.random_position(&mut self.rng));
        }
    }

    /// The rectangle subjects are confined to.
    pub const fn bounds(&self) -> &PlotBounds {
        &self.bounds
    }

    /// Number of tracked subjects.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no subjects are tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed list of draws, cycling when exhausted.
    struct Scripted(VecDeque<f64>);

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            let v = self.0.pop_front().unwrap_or(0.5);
            self.0.push_back(v);
            v
        }
    }

    fn params() -> MotionParams {
        MotionParams {
            dampening: 0.8,
            velocity_floor: 0.3,
            movement_scale: 50.0,
            activity_max: 100.0,
        }
    }

    fn bounds() -> PlotBounds {
        PlotBounds::new(690.0, 300.0, 7.0)
    }

    fn ids(raw: &[&str]) -> Vec<EntityId> {
        raw.iter().map(|s| EntityId::from(*s)).collect()
    }

    #[test]
    fn starts_at_rest_inside_bounds() {
        let integrator =
            MotionIntegrator::new(ids(&["a", "b", "c"]), params(), bounds(), RngSource::seeded(1));
        assert_eq!(integrator.len(), 3);
        for id in ids(&["a", "b", "c"]) {
            let state = integrator.state_of(&id).unwrap();
            assert_eq!(state.vx, 0.0);
            assert_eq!(state.vy, 0.0);
            assert!(integrator.bounds().contains(state.position));
        }
    }

    #[test]
    fn scripted_step_follows_update_order() {
        // Draws: 0.5 and 0.5 place the subject at the center, then 1.0
        // and 0.0 are the vx and vy kicks of the first step.
        let rng = Scripted(VecDeque::from(vec![0.5, 0.5, 1.0, 0.0]));
        let mut integrator = MotionIntegrator::new(ids(&["a"]), params(), bounds(), rng);
        let id = EntityId::from("a");
        let start = integrator.position_of(&id).unwrap();
        assert_eq!(start.x, 345.0);
        assert_eq!(start.y, 150.0);

        assert!(integrator.step(&id, 100.0));
        let state = *integrator.state_of(&id).unwrap();
        // factor 50: +25 then damped to 20; -25 damped to -20.
        assert!((state.vx - 20.0).abs() < 1e-9);
        assert!((state.vy + 20.0).abs() < 1e-9);
        assert!((state.position.x - 365.0).abs() < 1e-9);
        assert!((state.position.y - 130.0).abs() < 1e-9);
    }

    #[test]
    fn zero_activity_never_moves() {
        let mut integrator =
            MotionIntegrator::new(ids(&["still"]), params(), bounds(), RngSource::seeded(9));
        let id = EntityId::from("still");
        let start = integrator.position_of(&id).unwrap();
        for _ in 0..500 {
            integrator.step(&id, 0.0);
        }
        let state = integrator.state_of(&id).unwrap();
        assert_eq!(state.speed(), 0.0);
        assert_eq!(state.position, start);
    }

    #[test]
    fn small_velocity_is_dropped() {
        // Kick of (0.6 - 0.5) * 1.0 = 0.1, damped to 0.08: below the floor.
        let rng = Scripted(VecDeque::from(vec![0.5, 0.5, 0.6, 0.6]));
        let mut integrator = MotionIntegrator::new(ids(&["a"]), params(), bounds(), rng);
        let id = EntityId::from("a");
        integrator.step(&id, 2.0);
        let state = integrator.state_of(&id).unwrap();
        assert_eq!(state.vx, 0.0);
        assert_eq!(state.vy, 0.0);
    }

    #[test]
    fn positions_never_leave_bounds() {
        let mut integrator = MotionIntegrator::new(
            ids(&["a", "b"]),
            params(),
            bounds(),
            RngSource::seeded(1234),
        );
        for step in 0..5_000_u32 {
            for id in ids(&["a", "b"]) {
                // Absurd activity makes every step slam into a wall.
                integrator.step(&id, f64::from(step % 7) * 1_000.0);
                assert!(integrator.bounds().contains(integrator.position_of(&id).unwrap()));
            }
        }
    }

    #[test]
    fn non_finite_activity_is_ignored() {
        let mut integrator =
            MotionIntegrator::new(ids(&["a"]), params(), bounds(), RngSource::seeded(3));
        let id = EntityId::from("a");
        integrator.step(&id, f64::NAN);
        integrator.step(&id, f64::INFINITY);
        let state = integrator.state_of(&id).unwrap();
        assert_eq!(state.speed(), 0.0);
        assert!(integrator.bounds().contains(state.position));
    }

    #[test]
    fn unknown_subject_is_skipped() {
        let mut integrator =
            MotionIntegrator::new(ids(&["a"]), params(), bounds(), RngSource::seeded(3));
        assert!(!integrator.step(&EntityId::from("ghost"), 50.0));
        assert!(!integrator.reset(&EntityId::from("ghost")));
        assert!(integrator.position_of(&EntityId::from("ghost")).is_none());
    }

    #[test]
    fn reset_zeroes_velocity() {
        let mut integrator =
            MotionIntegrator::new(ids(&["a"]), params(), bounds(), RngSource::seeded(77));
        let id = EntityId::from("a");
        for _ in 0..20 {
            integrator.step(&id, 100.0);
        }
        assert!(integrator.reset(&id));
        let state = integrator.state_of(&id).unwrap();
        assert_eq!(state.vx, 0.0);
        assert_eq!(state.vy, 0.0);
        assert!(integrator.bounds().contains(state.position));
    }

    #[test]
    fn degenerate_bounds_collapse() {
        let b = PlotBounds::new(4.0, 4.0, 5.0);
        assert_eq!(b.min_x, b.max_x);
        assert!(b.contains(Position { x: 5.0, y: 5.0 }));
    }
}
