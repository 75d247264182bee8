//! Drone delivery fleet: allocation and flight-scheduling core.
//!
//! Drones and deliveries are entities; the pending pool, clock, journal, and
//! fleet configuration are resources; everything advances in `FixedUpdate`.

use bevy::prelude::*;

pub mod clock;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod drone;
pub mod events;
pub mod feedback;
pub mod fleet;
pub mod geometry;
pub mod optimizer;
pub mod simulation_sets;
pub mod snapshot;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod zzz_diag;
#[cfg(any(test, feature = "harness"))]
pub mod test_harness;

use simulation_sets::SimulationSet;

/// Global tick counter incremented each `FixedUpdate`.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.init_resource::<TickCounter>();
        app.add_systems(FixedUpdate, tick_counter.in_set(SimulationSet::PreSim));

        app.add_plugins((
            clock::ClockPlugin,
            fleet::FleetPlugin,
            delivery::DeliveriesPlugin,
            drone::DronesPlugin,
            dispatch::DispatchPlugin,
            events::EventsPlugin,
            feedback::FeedbackPlugin,
        ));
    }
}
