//! Fleet configuration: how many drones exist and what they are rated for.
//!
//! The [`FleetConfig`] resource is the single knob; `apply_fleet_config`
//! reconciles the live fleet against it whenever it changes. Existing drones
//! keep their operational state when they survive a resize.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;
use crate::config::BASE;
use crate::delivery::{Delivery, DeliveryStatus, DeliveryStatusComp};
use crate::drone::{
    Battery, Cargo, Destination, Drone, DroneState, DroneStateComp, DronePos, FlightStats,
    PhaseTimer, DEFAULT_CAPACITY_KG, DEFAULT_RANGE_KM,
};
use crate::events::FleetEvent;
use crate::simulation_sets::SimulationSet;
use crate::clock;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub count: u32,
    pub capacity_kg: f32,
    pub max_range_km: f32,
    /// Applied only to drones that are idle when the config changes.
    pub battery: f32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            count: 3,
            capacity_kg: DEFAULT_CAPACITY_KG,
            max_range_km: DEFAULT_RANGE_KM,
            battery: 100.0,
        }
    }
}

/// Parking spot for a drone: on the pad, or on a small circle around it once
/// the fleet has more than one drone.
pub fn parking_position(index: u32, count: u32) -> Vec2 {
    if count <= 1 {
        return BASE;
    }
    let angle = index as f32 * std::f32::consts::TAU / count as f32;
    BASE + Vec2::new(angle.cos(), angle.sin()) * 2.0
}

fn spawn_drone(commands: &mut Commands, id: u32, config: &FleetConfig, position: Vec2) {
    commands.spawn((
        Drone::new(id, config.capacity_kg, config.max_range_km),
        Battery::new(config.battery),
        DronePos(position),
        DroneStateComp(DroneState::Idle),
        Cargo::default(),
        Destination::default(),
        PhaseTimer::default(),
        FlightStats::default(),
    ));
}

/// Reconcile the live fleet against [`FleetConfig`]:
/// * capacity and range retune every surviving drone immediately;
/// * battery applies only to drones currently idle;
/// * growth spawns drones with the next ids, parked around the base;
/// * shrink despawns drones above the new count, releasing any cargo back to
///   the pending pool as rescheduled.
#[allow(clippy::type_complexity)]
pub fn apply_fleet_config(
    config: Res<FleetConfig>,
    clock: Res<SimClock>,
    mut commands: Commands,
    mut events: EventWriter<FleetEvent>,
    mut drones: Query<(
        Entity,
        &mut Drone,
        &mut Battery,
        &DroneStateComp,
        &Cargo,
    )>,
    mut deliveries: Query<(&mut Delivery, &mut DeliveryStatusComp)>,
) {
    if !config.is_changed() {
        return;
    }
    let now = clock.elapsed;

    let mut surviving = 0u32;
    for (entity, mut drone, mut battery, state, cargo) in &mut drones {
        if drone.id > config.count {
            for &item in &cargo.items {
                if let Ok((mut delivery, mut status)) = deliveries.get_mut(item) {
                    status.0 = DeliveryStatus::Rescheduled;
                    delivery.assigned_drone = None;
                    events.send(FleetEvent::rescheduled(now, delivery.id));
                }
            }
            commands.entity(entity).despawn();
            continue;
        }
        surviving += 1;
        drone.capacity_kg = config.capacity_kg;
        drone.max_range_km = config.max_range_km;
        if state.0 == DroneState::Idle {
            battery.level = config.battery.clamp(0.0, 100.0);
        }
    }

    for id in (surviving + 1)..=config.count {
        spawn_drone(&mut commands, id, &config, parking_position(id - 1, config.count));
    }

    info!("fleet configured: {} drone(s)", config.count);
}

/// Replace the fleet configuration; the change is applied on the next tick.
pub fn configure(world: &mut World, config: FleetConfig) {
    *world.resource_mut::<FleetConfig>() = config;
}

pub struct FleetPlugin;

impl Plugin for FleetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FleetConfig>();
        app.add_systems(
            FixedUpdate,
            apply_fleet_config
                .in_set(SimulationSet::PreSim)
                .after(clock::tick_sim_clock),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_drone_parks_on_pad() {
        assert_eq!(parking_position(0, 1), BASE);
    }

    #[test]
    fn test_parking_circle_radius() {
        for index in 0..4 {
            let pos = parking_position(index, 4);
            let radius = pos.distance(BASE);
            assert!((radius - 2.0).abs() < 1e-4);
        }
    }
}
