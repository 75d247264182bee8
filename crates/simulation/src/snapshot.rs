//! Read accessors for presentation layers.
//!
//! Collectors walk the world and return serializable value types, sorted by
//! id so output is stable across runs.

use bevy::prelude::*;
use serde::Serialize;

use crate::clock::SimClock;
use crate::delivery::{Delivery, DeliveryStatus, DeliveryStatusComp, Priority};
use crate::drone::{Battery, Cargo, Drone, DronePos, DroneState, DroneStateComp, FlightStats};

#[derive(Debug, Clone, Serialize)]
pub struct DroneSnapshot {
    pub id: u32,
    pub state: DroneState,
    pub battery: f32,
    pub position: [f32; 2],
    pub cargo_weight_kg: f32,
    pub cargo_count: usize,
    pub capacity_kg: f32,
    pub deliveries_completed: u32,
    pub efficiency: f32,
    pub distance_traveled: f32,
    pub trips: u32,
}

pub fn drone_snapshots(world: &mut World) -> Vec<DroneSnapshot> {
    let mut query =
        world.query::<(&Drone, &DroneStateComp, &DronePos, &Battery, &Cargo, &FlightStats)>();
    let mut out: Vec<DroneSnapshot> = query
        .iter(world)
        .map(|(drone, state, pos, battery, cargo, stats)| DroneSnapshot {
            id: drone.id,
            state: state.0,
            battery: battery.level,
            position: pos.0.to_array(),
            cargo_weight_kg: cargo.weight_kg,
            cargo_count: cargo.items.len(),
            capacity_kg: drone.capacity_kg,
            deliveries_completed: stats.deliveries_completed,
            efficiency: stats.efficiency,
            distance_traveled: stats.distance_traveled,
            trips: stats.trips,
        })
        .collect();
    out.sort_by_key(|snapshot| snapshot.id);
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverySnapshot {
    pub id: u64,
    pub location: [f32; 2],
    pub weight_kg: f32,
    pub priority: Priority,
    pub status: DeliveryStatus,
    pub assigned_drone: Option<u32>,
    /// Seconds from submission to now, or to hand-off once delivered.
    pub wait_secs: f32,
}

pub fn delivery_snapshots(world: &mut World) -> Vec<DeliverySnapshot> {
    let now = world.resource::<SimClock>().elapsed;
    let mut query = world.query::<(&Delivery, &DeliveryStatusComp)>();
    let mut out: Vec<DeliverySnapshot> = query
        .iter(world)
        .map(|(delivery, status)| DeliverySnapshot {
            id: delivery.id,
            location: delivery.location.to_array(),
            weight_kg: delivery.weight_kg,
            priority: delivery.priority,
            status: status.0,
            assigned_drone: delivery.assigned_drone,
            wait_secs: delivery.delivered_at.unwrap_or(now) - delivery.created_at,
        })
        .collect();
    out.sort_by_key(|snapshot| snapshot.id);
    out
}

/// Fleet-wide dashboard numbers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetStats {
    pub deliveries_completed: usize,
    /// Submitted but not yet collected: pending, rescheduled, or en route.
    pub deliveries_pending: usize,
    pub total_distance: f32,
    pub total_trips: u32,
    pub avg_delivery_secs: f32,
    pub mean_efficiency: f32,
    pub best_drone: Option<u32>,
}

pub fn fleet_stats(world: &mut World) -> FleetStats {
    let mut stats = FleetStats::default();

    let mut deliveries = world.query::<(&Delivery, &DeliveryStatusComp)>();
    let mut delivered_total_secs = 0.0;
    for (delivery, status) in deliveries.iter(world) {
        match status.0 {
            DeliveryStatus::Delivered => {
                stats.deliveries_completed += 1;
                if let Some(done) = delivery.delivered_at {
                    delivered_total_secs += done - delivery.created_at;
                }
            }
            DeliveryStatus::Pending | DeliveryStatus::Rescheduled | DeliveryStatus::EnRoute => {
                stats.deliveries_pending += 1;
            }
            DeliveryStatus::Collected => {}
        }
    }
    if stats.deliveries_completed > 0 {
        stats.avg_delivery_secs = delivered_total_secs / stats.deliveries_completed as f32;
    }

    let mut drones = world.query::<(&Drone, &FlightStats)>();
    let mut drone_count = 0usize;
    let mut efficiency_sum = 0.0;
    let mut best: Option<(u32, u32)> = None;
    for (drone, flight) in drones.iter(world) {
        drone_count += 1;
        stats.total_distance += flight.distance_traveled;
        stats.total_trips += flight.trips;
        efficiency_sum += flight.efficiency;
        let candidate = (drone.id, flight.deliveries_completed);
        let better = match best {
            None => true,
            Some((best_id, best_done)) => {
                candidate.1 > best_done || (candidate.1 == best_done && candidate.0 < best_id)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    if drone_count > 0 {
        stats.mean_efficiency = efficiency_sum / drone_count as f32;
    }
    stats.best_drone = best.map(|(id, _)| id);
    stats
}
