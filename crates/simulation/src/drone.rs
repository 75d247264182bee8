//! The drone actor: components and the per-tick lifecycle state machine.
//!
//! Each drone owns its physical, battery, and cargo state and advances
//! through `Idle → Loading → Flying → Collecting → Returning → Delivering`
//! (with `Recharging` at base) one `FixedUpdate` tick at a time. Phase
//! durations are simulated-time accumulators driven by the tick, never the
//! host clock.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;
use crate::config::BASE;
use crate::delivery::{Delivery, DeliveryStatus, DeliveryStatusComp};
use crate::events::FleetEvent;
use crate::geometry;
use crate::simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_CAPACITY_KG: f32 = 10.0;
pub const DEFAULT_RANGE_KM: f32 = 20.0;
pub const DEFAULT_SPEED_KMH: f32 = 50.0;
/// Percent of charge consumed per kilometer flown.
pub const DEFAULT_CONSUMPTION_PER_KM: f32 = 2.0;
/// Percent of charge restored per simulated second on the pad.
pub const DEFAULT_RECHARGE_PER_SEC: f32 = 20.0;

/// Below this charge a flight aborts and the drone heads straight home.
pub const CRITICAL_BATTERY: f32 = 15.0;
/// At base, a drone below this charge recharges before taking new work.
pub const RECHARGE_THRESHOLD: f32 = 30.0;
/// Reserve a drone must keep on top of the round-trip cost to accept work.
pub const ACCEPT_BATTERY_MARGIN: f32 = 15.0;

pub const LOADING_SECS: f32 = 0.5;
pub const COLLECTING_SECS: f32 = 1.0;
pub const DELIVERING_SECS: f32 = 1.0;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Identity and fixed physical parameters. Capacity and range are retuned by
/// fleet configuration; the id never changes.
#[derive(Component, Debug, Clone)]
pub struct Drone {
    pub id: u32,
    pub capacity_kg: f32,
    pub max_range_km: f32,
    pub speed_kmh: f32,
    pub consumption_per_km: f32,
    pub recharge_per_sec: f32,
}

impl Drone {
    pub fn new(id: u32, capacity_kg: f32, max_range_km: f32) -> Self {
        Self {
            id,
            capacity_kg,
            max_range_km,
            speed_kmh: DEFAULT_SPEED_KMH,
            consumption_per_km: DEFAULT_CONSUMPTION_PER_KM,
            recharge_per_sec: DEFAULT_RECHARGE_PER_SEC,
        }
    }

    /// Kilometers covered in one simulated second.
    pub fn km_per_sec(&self) -> f32 {
        self.speed_kmh / 3600.0
    }
}

/// Charge level, held in [0, 100].
#[derive(Component, Debug, Clone)]
pub struct Battery {
    pub level: f32,
}

impl Battery {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 100.0),
        }
    }

    pub fn drain(&mut self, amount: f32) {
        self.level = (self.level - amount).max(0.0);
    }

    pub fn charge(&mut self, amount: f32) {
        self.level = (self.level + amount).min(100.0);
    }

    pub fn is_full(&self) -> bool {
        self.level >= 100.0
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct DronePos(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroneState {
    Idle,
    Loading,
    Flying,
    Collecting,
    Returning,
    Delivering,
    Recharging,
}

impl DroneState {
    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Flying | Self::Returning)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroneStateComp(pub DroneState);

/// Deliveries aboard, in stop order. The first entry is the next stop.
#[derive(Component, Debug, Clone, Default)]
pub struct Cargo {
    pub items: Vec<Entity>,
    pub weight_kg: f32,
}

impl Cargo {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Destination(pub Option<Vec2>);

/// Simulated-time accumulator for the fixed-length phases (loading,
/// collecting, delivering).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PhaseTimer(pub f32);

#[derive(Component, Debug, Clone)]
pub struct FlightStats {
    pub distance_traveled: f32,
    pub trips: u32,
    pub deliveries_completed: u32,
    /// Deliveries per trip as a percentage; stays at its initial value until
    /// the first delivery completes.
    pub efficiency: f32,
}

impl Default for FlightStats {
    fn default() -> Self {
        Self {
            distance_traveled: 0.0,
            trips: 0,
            deliveries_completed: 0,
            efficiency: 100.0,
        }
    }
}

impl FlightStats {
    pub fn update_efficiency(&mut self) {
        if self.deliveries_completed > 0 {
            self.efficiency =
                self.deliveries_completed as f32 / self.trips.max(1) as f32 * 100.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Eligibility and loading
// ---------------------------------------------------------------------------

/// Whether an idle drone can take on one more parcel: the weight must fit,
/// the round trip must be inside the rated range, and the battery must cover
/// the round-trip cost with [`ACCEPT_BATTERY_MARGIN`] to spare.
pub fn can_accept(
    drone: &Drone,
    state: DroneState,
    cargo: &Cargo,
    battery: &Battery,
    location: Vec2,
    weight_kg: f32,
) -> bool {
    if state != DroneState::Idle {
        return false;
    }
    if cargo.weight_kg + weight_kg > drone.capacity_kg {
        return false;
    }
    let trip = geometry::round_trip(BASE, location);
    if trip > drone.max_range_km {
        return false;
    }
    battery.level >= trip * drone.consumption_per_km + ACCEPT_BATTERY_MARGIN
}

/// Install a planned route on an idle drone and start its loading phase.
/// Returns false (and changes nothing) if the drone is busy, the load is
/// empty, or the total weight exceeds capacity.
pub fn load_packages(
    state: &mut DroneStateComp,
    cargo: &mut Cargo,
    destination: &mut Destination,
    phase: &mut PhaseTimer,
    drone: &Drone,
    items: Vec<(Entity, Vec2, f32)>,
) -> bool {
    if state.0 != DroneState::Idle || items.is_empty() {
        return false;
    }
    let total: f32 = items.iter().map(|&(_, _, weight)| weight).sum();
    if total > drone.capacity_kg {
        return false;
    }
    cargo.items = items.iter().map(|&(entity, _, _)| entity).collect();
    cargo.weight_kg = total;
    destination.0 = Some(items[0].1);
    phase.0 = 0.0;
    state.0 = DroneState::Loading;
    true
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Move toward `target` for one tick, draining battery and accumulating the
/// odometer. Returns true once the drone is within the arrival threshold.
fn fly_towards(
    drone: &Drone,
    pos: &mut DronePos,
    battery: &mut Battery,
    stats: &mut FlightStats,
    target: Vec2,
    dt: f32,
) -> bool {
    let dist = geometry::distance(pos.0, target);
    if dist < geometry::ARRIVAL_THRESHOLD {
        pos.0 = target;
        return true;
    }
    let step = drone.km_per_sec() * dt;
    let moved = step.min(dist);
    pos.0 += (target - pos.0) / dist * moved;
    battery.drain(moved * drone.consumption_per_km);
    stats.distance_traveled += moved;
    false
}

/// Abort the current flight: every parcel aboard goes back to the pending
/// pool as `Rescheduled`, the hold is emptied, and the drone heads home.
fn abort_flight(
    drone: &Drone,
    state: &mut DroneStateComp,
    cargo: &mut Cargo,
    destination: &mut Destination,
    battery_level: f32,
    now: f32,
    deliveries: &mut Query<(&mut Delivery, &mut DeliveryStatusComp)>,
    events: &mut EventWriter<FleetEvent>,
) {
    events.send(FleetEvent::emergency_return(now, drone.id, battery_level));
    for &item in &cargo.items {
        if let Ok((mut delivery, mut status)) = deliveries.get_mut(item) {
            status.0 = DeliveryStatus::Rescheduled;
            delivery.assigned_drone = None;
            events.send(FleetEvent::rescheduled(now, delivery.id));
        }
    }
    cargo.items.clear();
    cargo.weight_kg = 0.0;
    destination.0 = Some(BASE);
    state.0 = DroneState::Returning;
}

/// One simulation tick for every drone. Updates are independent across
/// drones; only the carried deliveries are touched.
#[allow(clippy::type_complexity)]
pub fn drone_state_machine(
    clock: Res<SimClock>,
    mut events: EventWriter<FleetEvent>,
    mut drones: Query<(
        &Drone,
        &mut DroneStateComp,
        &mut DronePos,
        &mut Battery,
        &mut Cargo,
        &mut Destination,
        &mut PhaseTimer,
        &mut FlightStats,
    )>,
    mut deliveries: Query<(&mut Delivery, &mut DeliveryStatusComp)>,
) {
    if clock.paused {
        return;
    }
    let dt = SimClock::TICK_SECS;
    let now = clock.elapsed;

    for (
        drone,
        mut state,
        mut pos,
        mut battery,
        mut cargo,
        mut destination,
        mut phase,
        mut stats,
    ) in &mut drones
    {
        match state.0 {
            DroneState::Idle => {}

            DroneState::Loading => {
                phase.0 += dt;
                if phase.0 >= LOADING_SECS {
                    state.0 = DroneState::Flying;
                    phase.0 = 0.0;
                    stats.trips += 1;
                    stats.update_efficiency();
                    events.send(FleetEvent::departed(now, drone.id, cargo.items.len()));
                }
            }

            DroneState::Flying => {
                let target = destination.0.unwrap_or(BASE);
                let arrived =
                    fly_towards(drone, &mut pos, &mut battery, &mut stats, target, dt);
                if battery.level < CRITICAL_BATTERY {
                    abort_flight(
                        drone,
                        &mut state,
                        &mut cargo,
                        &mut destination,
                        battery.level,
                        now,
                        &mut deliveries,
                        &mut events,
                    );
                } else if arrived {
                    if cargo.is_empty() {
                        destination.0 = Some(BASE);
                        state.0 = DroneState::Returning;
                    } else {
                        phase.0 = 0.0;
                        state.0 = DroneState::Collecting;
                    }
                }
            }

            DroneState::Collecting => {
                phase.0 += dt;
                if phase.0 >= COLLECTING_SECS {
                    if let Some(&head) = cargo.items.first() {
                        if let Ok((delivery, mut status)) = deliveries.get_mut(head) {
                            status.0 = DeliveryStatus::Collected;
                            events.send(FleetEvent::collected(now, drone.id, delivery.id));
                        }
                    }
                    destination.0 = Some(BASE);
                    phase.0 = 0.0;
                    state.0 = DroneState::Returning;
                }
            }

            DroneState::Returning => {
                let arrived =
                    fly_towards(drone, &mut pos, &mut battery, &mut stats, BASE, dt);
                if battery.level < CRITICAL_BATTERY && !cargo.is_empty() {
                    abort_flight(
                        drone,
                        &mut state,
                        &mut cargo,
                        &mut destination,
                        battery.level,
                        now,
                        &mut deliveries,
                        &mut events,
                    );
                } else if arrived {
                    let head_collected = cargo.items.first().is_some_and(|&head| {
                        deliveries
                            .get(head)
                            .is_ok_and(|(_, status)| status.0 == DeliveryStatus::Collected)
                    });
                    if head_collected {
                        phase.0 = 0.0;
                        state.0 = DroneState::Delivering;
                    } else if battery.level < RECHARGE_THRESHOLD {
                        state.0 = DroneState::Recharging;
                        events.send(FleetEvent::recharge_started(
                            now,
                            drone.id,
                            battery.level,
                        ));
                    } else {
                        state.0 = DroneState::Idle;
                    }
                    destination.0 = None;
                }
            }

            DroneState::Delivering => {
                phase.0 += dt;
                if phase.0 >= DELIVERING_SECS {
                    // Hand off every consecutively collected parcel at the
                    // head of the hold.
                    while let Some(&head) = cargo.items.first() {
                        let Ok((mut delivery, mut status)) = deliveries.get_mut(head)
                        else {
                            cargo.items.remove(0);
                            continue;
                        };
                        if status.0 != DeliveryStatus::Collected {
                            break;
                        }
                        cargo.items.remove(0);
                        status.0 = DeliveryStatus::Delivered;
                        delivery.assigned_drone = Some(drone.id);
                        delivery.delivered_at = Some(now);
                        stats.deliveries_completed += 1;
                        events.send(FleetEvent::delivered(
                            now,
                            drone.id,
                            delivery.id,
                            delivery.priority,
                        ));
                    }
                    cargo.weight_kg = cargo
                        .items
                        .iter()
                        .filter_map(|&item| deliveries.get(item).ok())
                        .map(|(delivery, _)| delivery.weight_kg)
                        .sum();
                    stats.update_efficiency();

                    if let Some(&next) = cargo.items.first() {
                        if let Ok((delivery, _)) = deliveries.get(next) {
                            destination.0 = Some(delivery.location);
                        }
                        phase.0 = 0.0;
                        state.0 = DroneState::Flying;
                    } else if battery.level < RECHARGE_THRESHOLD {
                        state.0 = DroneState::Recharging;
                        events.send(FleetEvent::recharge_started(
                            now,
                            drone.id,
                            battery.level,
                        ));
                    } else {
                        state.0 = DroneState::Idle;
                    }
                }
            }

            DroneState::Recharging => {
                battery.charge(drone.recharge_per_sec * dt);
                if battery.is_full() {
                    state.0 = DroneState::Idle;
                    events.send(FleetEvent::recharged(now, drone.id));
                }
            }
        }
    }
}

pub struct DronesPlugin;

impl Plugin for DronesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            drone_state_machine.in_set(SimulationSet::Simulation),
        );
    }
}
