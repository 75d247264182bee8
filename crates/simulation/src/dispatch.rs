//! The live allocation pass.
//!
//! Simpler than the full optimizer: pending deliveries are ranked by
//! priority, idle drones by id, and each drone takes exactly one delivery
//! per cycle. The pass runs at most once per simulated second, plus
//! immediately on the tick a new delivery arrives. Failures to accept are
//! silent; the delivery just stays pending for a later pass.

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::delivery::{Delivery, DeliveryStatus, DeliveryStatusComp, Priority};
use crate::drone::{
    self, Battery, Cargo, Destination, Drone, DroneState, DroneStateComp, PhaseTimer,
    RECHARGE_THRESHOLD,
};
use crate::events::FleetEvent;
use crate::simulation_sets::SimulationSet;

/// Tracks the last simulated second an allocation pass ran.
#[derive(Resource, Default)]
pub struct DispatchTimer {
    pub last_pass_second: Option<u64>,
}

/// Pair pending deliveries with idle drones, one delivery per drone.
///
/// Holds the only mutable access to the pending pool and the idle set for
/// this tick, so assignment cannot race the per-drone updates.
#[allow(clippy::type_complexity)]
pub fn dispatch_pending(
    clock: Res<SimClock>,
    mut timer: ResMut<DispatchTimer>,
    mut events: EventWriter<FleetEvent>,
    mut drones: Query<(
        Entity,
        &Drone,
        &mut DroneStateComp,
        &Battery,
        &mut Cargo,
        &mut Destination,
        &mut PhaseTimer,
    )>,
    mut deliveries: Query<(Entity, &mut Delivery, &mut DeliveryStatusComp)>,
) {
    if clock.paused {
        return;
    }

    // Pending pool, highest priority first; ties keep submission order.
    // Deliveries spawned since the last pass force a pass this tick even
    // inside the current second.
    let mut arrived = false;
    let mut pending: Vec<(Entity, u64, Vec2, f32, Priority)> = Vec::new();
    for (entity, delivery, status) in deliveries.iter_mut() {
        if status.is_added() {
            arrived = true;
        }
        if status.0.is_pending() {
            pending.push((
                entity,
                delivery.id,
                delivery.location,
                delivery.weight_kg,
                delivery.priority,
            ));
        }
    }

    let second = clock.second();
    if timer.last_pass_second == Some(second) && !arrived {
        return;
    }
    if pending.is_empty() {
        return;
    }
    pending.sort_by(|a, b| b.4.cmp(&a.4).then(a.1.cmp(&b.1)));

    // Idle drones with enough charge to be worth considering, by id so ECS
    // iteration order cannot leak into assignments.
    let mut idle: Vec<(Entity, u32)> = drones
        .iter()
        .filter(|(_, _, state, battery, ..)| {
            state.0 == DroneState::Idle && battery.level > RECHARGE_THRESHOLD
        })
        .map(|(entity, drone, ..)| (entity, drone.id))
        .collect();
    if idle.is_empty() {
        return;
    }
    idle.sort_by_key(|&(_, id)| id);

    timer.last_pass_second = Some(second);
    let now = clock.elapsed;
    let mut dispatched = 0;

    let pairs = idle.len().min(pending.len());
    for i in 0..pairs {
        let (drone_entity, _) = idle[i];
        let (delivery_entity, delivery_id, location, weight, priority) = pending[i];

        let Ok((_, drone, mut state, battery, mut cargo, mut destination, mut phase)) =
            drones.get_mut(drone_entity)
        else {
            continue;
        };
        if !drone::can_accept(drone, state.0, &cargo, battery, location, weight) {
            continue;
        }
        if !drone::load_packages(
            &mut state,
            &mut cargo,
            &mut destination,
            &mut phase,
            drone,
            vec![(delivery_entity, location, weight)],
        ) {
            continue;
        }
        let Ok((_, mut delivery, mut status)) = deliveries.get_mut(delivery_entity) else {
            continue;
        };
        status.0 = DeliveryStatus::EnRoute;
        delivery.assigned_drone = Some(drone.id);
        events.send(FleetEvent::assigned(
            now, drone.id, delivery_id, priority, location,
        ));
        dispatched += 1;
    }

    if dispatched > 0 {
        debug!("dispatched {dispatched} drone(s) for collection");
    }
}

pub struct DispatchPlugin;

impl Plugin for DispatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DispatchTimer>();
        app.add_systems(
            FixedUpdate,
            dispatch_pending
                .in_set(SimulationSet::Simulation)
                .after(drone::drone_state_machine),
        );
    }
}
