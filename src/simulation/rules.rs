//! The four-phase Nagel–Schreckenberg update
//!
//! Every phase reads only the time-t state. Gaps are taken from the old
//! positions before any vehicle moves, and the new generation is assembled
//! once all final velocities are known.
//!
//! Random draws: one Bernoulli(p) draw per vehicle per step, in ascending
//! position order, whether or not the vehicle is moving. A stopped vehicle's
//! draw is discarded. The stream therefore advances by exactly `n` draws per
//! step, which keeps runs reproducible for a given seed.

use rand::Rng;

use super::road::SimulationState;

/// Phase 1: speed up by one cell per step, up to `vmax`
pub fn accelerate(velocity: usize, vmax: usize) -> usize {
    (velocity + 1).min(vmax)
}

/// Phase 2: never move further than the free cells ahead
pub fn brake_for_gap(velocity: usize, gap: usize) -> usize {
    velocity.min(gap)
}

/// Phase 3: slow down by one with the drawn outcome, never below zero
pub fn random_brake(velocity: usize, brakes: bool) -> usize {
    if brakes {
        velocity.saturating_sub(1)
    } else {
        velocity
    }
}

/// Produce the state at `t + 1` from the state at `t`
pub fn advance<R: Rng + ?Sized>(state: &SimulationState, rng: &mut R) -> SimulationState {
    let params = state.params();
    let gaps = state.gaps();

    let vehicles = state
        .vehicles()
        .iter()
        .zip(gaps)
        .map(|(vehicle, gap)| {
            let velocity = accelerate(vehicle.velocity, params.vmax);
            let velocity = brake_for_gap(velocity, gap);
            let brakes = rng.random_bool(params.brake_probability);
            let velocity = random_brake(velocity, brakes);
            vehicle.moved(velocity, params.length)
        })
        .collect();

    state.next_generation(vehicles)
}
