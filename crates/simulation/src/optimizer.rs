//! Delivery allocation strategies.
//!
//! The full allocator (`allocate`) runs the complete cycle — priority sort,
//! proximity grouping, drone scoring, nearest-neighbor routing — and returns
//! [`Allocation`]s that `apply_allocation` commits atomically. It operates on
//! plain candidate views so it can be exercised outside the ECS.
//!
//! Bin packing and the genetic route search are alternative strategies that
//! are available on demand; the live simulation loop does not invoke them,
//! and their output is not assumed to match the primary cycle.

use bevy::math::Vec2;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::clock::SimClock;
use crate::delivery::{Delivery, DeliveryStatus, DeliveryStatusComp, Priority};
use crate::drone::{self, Battery, Cargo, Destination, Drone, DroneStateComp, FlightStats, PhaseTimer};
use crate::drone::DroneState;
use crate::events::FleetEvent;
use crate::geometry;

/// Deliveries within this distance of a group's seed may join the group.
pub const GROUP_JOIN_RADIUS: f32 = 5.0;
/// Hard cap on stops per trip, keeping routes short.
pub const MAX_GROUP_SIZE: usize = 3;
/// Battery a candidate must hold beyond the route cost.
pub const DISPATCH_BATTERY_MARGIN: f32 = 10.0;
/// Candidates below this charge are not considered at all.
pub const MIN_CANDIDATE_BATTERY: f32 = 30.0;

// ---------------------------------------------------------------------------
// Candidate views
// ---------------------------------------------------------------------------

/// Read-only view of a drone considered by the allocator.
#[derive(Debug, Clone)]
pub struct DroneCandidate {
    pub entity: Entity,
    pub id: u32,
    pub capacity_kg: f32,
    pub battery: f32,
    pub efficiency: f32,
    pub consumption_per_km: f32,
    pub speed_kmh: f32,
    pub idle: bool,
}

/// Read-only view of a pending delivery.
#[derive(Debug, Clone)]
pub struct ParcelView {
    pub entity: Entity,
    pub id: u64,
    pub location: Vec2,
    pub weight_kg: f32,
    pub priority: Priority,
    pub created_at: f32,
}

/// A matched drone/group pairing with its computed route, applied atomically
/// or discarded.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub drone: Entity,
    pub drone_id: u32,
    /// Deliveries in stop order.
    pub deliveries: Vec<ParcelView>,
    pub estimated_time_min: f32,
    pub total_distance: f32,
    pub efficiency: f32,
}

// ---------------------------------------------------------------------------
// Primary cycle
// ---------------------------------------------------------------------------

/// Stable sort: priority weight descending, ties broken by submission time
/// (FIFO).
pub fn sort_by_priority(parcels: &mut [ParcelView]) {
    parcels.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.total_cmp(&b.created_at))
    });
}

/// Greedily partition sorted parcels into groups: seed with the next
/// ungrouped parcel, then pull in ungrouped parcels within
/// [`GROUP_JOIN_RADIUS`] of the seed while the group stays under
/// `capacity_kg` and [`MAX_GROUP_SIZE`].
pub fn group_by_proximity(sorted: &[ParcelView], capacity_kg: f32) -> Vec<Vec<ParcelView>> {
    let mut groups = Vec::new();
    let mut used = vec![false; sorted.len()];
    for i in 0..sorted.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut group = vec![sorted[i].clone()];
        let mut total = sorted[i].weight_kg;
        for j in (i + 1)..sorted.len() {
            if group.len() >= MAX_GROUP_SIZE {
                break;
            }
            if used[j] {
                continue;
            }
            let near =
                geometry::distance(sorted[i].location, sorted[j].location) < GROUP_JOIN_RADIUS;
            if near && total + sorted[j].weight_kg <= capacity_kg {
                used[j] = true;
                total += sorted[j].weight_kg;
                group.push(sorted[j].clone());
            }
        }
        groups.push(group);
    }
    groups
}

/// Visit order that always hops to the nearest unvisited stop.
pub fn nearest_neighbor_route(start: Vec2, parcels: &[ParcelView]) -> Vec<ParcelView> {
    let mut remaining = parcels.to_vec();
    let mut route = Vec::with_capacity(remaining.len());
    let mut pos = start;
    while !remaining.is_empty() {
        let Some((index, _)) = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                geometry::distance(pos, a.location).total_cmp(&geometry::distance(pos, b.location))
            })
        else {
            break;
        };
        let next = remaining.remove(index);
        pos = next.location;
        route.push(next);
    }
    route
}

/// Round-trip distance of the group with the nearest-neighbor visit order.
pub fn route_distance(start: Vec2, parcels: &[ParcelView]) -> f32 {
    if parcels.is_empty() {
        return 0.0;
    }
    let ordered = nearest_neighbor_route(start, parcels);
    let stops: Vec<Vec2> = ordered.iter().map(|p| p.location).collect();
    geometry::route_length(start, &stops)
}

/// Drone/group pairing score. Battery, track record, group size, priority,
/// and capacity utilization raise it; route distance lowers it.
pub fn score(candidate: &DroneCandidate, group: &[ParcelView], total_distance: f32) -> f32 {
    let group_weight: f32 = group.iter().map(|p| p.weight_kg).sum();
    let priority_sum: f32 = group.iter().map(|p| p.priority.weight()).sum();
    let capacity_utilization = group_weight / candidate.capacity_kg * 100.0;
    0.5 * candidate.battery + 0.3 * candidate.efficiency - 2.0 * total_distance
        + 10.0 * group.len() as f32
        + 5.0 * priority_sum
        + 0.2 * capacity_utilization
}

/// Estimated minutes for the trip: flight time at cruise speed plus one
/// minute per stop and two minutes of loading.
pub fn estimate_time(candidate: &DroneCandidate, group: &[ParcelView], base: Vec2) -> f32 {
    let dist = route_distance(base, group);
    dist / candidate.speed_kmh * 60.0 + group.len() as f32 + 2.0
}

/// Mean of capacity utilization and a distance-penalty score.
pub fn allocation_efficiency(
    candidate: &DroneCandidate,
    group: &[ParcelView],
    base: Vec2,
) -> f32 {
    let weight: f32 = group.iter().map(|p| p.weight_kg).sum();
    let utilization = weight / candidate.capacity_kg * 100.0;
    let dist = route_distance(base, group);
    (utilization + (100.0 - dist * 2.0).max(0.0)) / 2.0
}

/// The full allocation cycle. Groups nobody can serve are skipped whole; a
/// drone wins at most one group per invocation, so the returned list can be
/// applied as an atomic batch. Deterministic for a fixed input.
pub fn allocate(
    candidates: &[DroneCandidate],
    pending: &[ParcelView],
    base: Vec2,
) -> Vec<Allocation> {
    if pending.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let mut sorted = pending.to_vec();
    sort_by_priority(&mut sorted);
    let representative_capacity = candidates[0].capacity_kg;
    let groups = group_by_proximity(&sorted, representative_capacity);

    let mut taken = vec![false; candidates.len()];
    let mut allocations = Vec::new();
    for group in groups {
        let total_distance = route_distance(base, &group);
        let group_weight: f32 = group.iter().map(|p| p.weight_kg).sum();
        let mut best: Option<(usize, f32)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if taken[i] || !candidate.idle || candidate.battery < MIN_CANDIDATE_BATTERY {
                continue;
            }
            if group_weight > candidate.capacity_kg {
                continue;
            }
            let required = total_distance * candidate.consumption_per_km;
            if required > candidate.battery - DISPATCH_BATTERY_MARGIN {
                continue;
            }
            let s = score(candidate, &group, total_distance);
            if best.is_none_or(|(_, best_score)| s > best_score) {
                best = Some((i, s));
            }
        }
        let Some((winner, _)) = best else {
            continue;
        };
        taken[winner] = true;
        let candidate = &candidates[winner];
        allocations.push(Allocation {
            drone: candidate.entity,
            drone_id: candidate.id,
            estimated_time_min: estimate_time(candidate, &group, base),
            total_distance,
            efficiency: allocation_efficiency(candidate, &group, base),
            deliveries: nearest_neighbor_route(base, &group),
        });
    }
    allocations
}

// ---------------------------------------------------------------------------
// World glue
// ---------------------------------------------------------------------------

/// Snapshot the current fleet and pending pool into allocator views, sorted
/// by id for deterministic output.
pub fn candidates_from_world(world: &mut World) -> (Vec<DroneCandidate>, Vec<ParcelView>) {
    let mut drones =
        world.query::<(Entity, &Drone, &DroneStateComp, &Battery, &FlightStats)>();
    let mut candidates: Vec<DroneCandidate> = drones
        .iter(world)
        .map(|(entity, drone, state, battery, stats)| DroneCandidate {
            entity,
            id: drone.id,
            capacity_kg: drone.capacity_kg,
            battery: battery.level,
            efficiency: stats.efficiency,
            consumption_per_km: drone.consumption_per_km,
            speed_kmh: drone.speed_kmh,
            idle: state.0 == DroneState::Idle,
        })
        .collect();
    candidates.sort_by_key(|c| c.id);

    let mut deliveries = world.query::<(Entity, &Delivery, &DeliveryStatusComp)>();
    let mut parcels: Vec<ParcelView> = deliveries
        .iter(world)
        .filter(|(_, _, status)| status.0.is_pending())
        .map(|(entity, delivery, _)| ParcelView {
            entity,
            id: delivery.id,
            location: delivery.location,
            weight_kg: delivery.weight_kg,
            priority: delivery.priority,
            created_at: delivery.created_at,
        })
        .collect();
    parcels.sort_by_key(|p| p.id);
    (candidates, parcels)
}

/// Apply one allocation atomically: the drone loads the route and starts its
/// loading phase, and the whole group flips to `EnRoute`. Returns false (and
/// changes nothing) if the drone has gone busy since the allocation was
/// computed.
pub fn apply_allocation(world: &mut World, allocation: &Allocation) -> bool {
    let now = world.resource::<SimClock>().elapsed;
    let items: Vec<(Entity, Vec2, f32)> = allocation
        .deliveries
        .iter()
        .map(|p| (p.entity, p.location, p.weight_kg))
        .collect();

    let drone_id = {
        let mut drones = world.query::<(
            &Drone,
            &mut DroneStateComp,
            &mut Cargo,
            &mut Destination,
            &mut PhaseTimer,
        )>();
        let Ok((drone, mut state, mut cargo, mut destination, mut phase)) =
            drones.get_mut(world, allocation.drone)
        else {
            return false;
        };
        if !drone::load_packages(
            &mut state,
            &mut cargo,
            &mut destination,
            &mut phase,
            drone,
            items,
        ) {
            return false;
        }
        drone.id
    };

    let mut pending_events = Vec::new();
    {
        let mut deliveries = world.query::<(&mut Delivery, &mut DeliveryStatusComp)>();
        for parcel in &allocation.deliveries {
            if let Ok((mut delivery, mut status)) = deliveries.get_mut(world, parcel.entity) {
                status.0 = DeliveryStatus::EnRoute;
                delivery.assigned_drone = Some(drone_id);
                pending_events.push(FleetEvent::assigned(
                    now,
                    drone_id,
                    parcel.id,
                    parcel.priority,
                    parcel.location,
                ));
            }
        }
    }
    for event in pending_events {
        world.send_event(event);
    }
    true
}

// ---------------------------------------------------------------------------
// Aggregate stats
// ---------------------------------------------------------------------------

/// Roll-up over a batch of allocations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizationStats {
    pub total_trips: usize,
    pub total_distance: f32,
    pub avg_distance: f32,
    pub total_time_min: f32,
    pub avg_time_min: f32,
    pub avg_efficiency: f32,
    pub deliveries_per_trip: f32,
}

pub fn optimization_stats(allocations: &[Allocation]) -> OptimizationStats {
    let mut stats = OptimizationStats {
        total_trips: allocations.len(),
        ..Default::default()
    };
    let mut total_efficiency = 0.0;
    let mut total_deliveries = 0usize;
    for allocation in allocations {
        stats.total_distance += allocation.total_distance;
        stats.total_time_min += allocation.estimated_time_min;
        total_efficiency += allocation.efficiency;
        total_deliveries += allocation.deliveries.len();
    }
    if !allocations.is_empty() {
        let n = allocations.len() as f32;
        stats.avg_distance = stats.total_distance / n;
        stats.avg_time_min = stats.total_time_min / n;
        stats.avg_efficiency = total_efficiency / n;
        stats.deliveries_per_trip = total_deliveries as f32 / n;
    }
    stats
}

// ---------------------------------------------------------------------------
// Secondary strategies
// ---------------------------------------------------------------------------

/// First-fit decreasing bin packing of parcels into capacity-bounded bins.
pub fn bin_packing(parcels: &[ParcelView], capacity_kg: f32) -> Vec<Vec<ParcelView>> {
    let mut sorted = parcels.to_vec();
    sorted.sort_by(|a, b| b.weight_kg.total_cmp(&a.weight_kg));
    let mut bins: Vec<(f32, Vec<ParcelView>)> = Vec::new();
    for parcel in sorted {
        match bins
            .iter_mut()
            .find(|(weight, _)| weight + parcel.weight_kg <= capacity_kg)
        {
            Some((weight, bin)) => {
                *weight += parcel.weight_kg;
                bin.push(parcel);
            }
            None => bins.push((parcel.weight_kg, vec![parcel])),
        }
    }
    bins.into_iter().map(|(_, bin)| bin).collect()
}

pub const GA_POPULATION: usize = 50;
pub const GA_GENERATIONS: usize = 100;
const GA_CROSSOVER_RATE: f64 = 0.7;

/// Route fitness: `1000 − route distance + position-weighted priority
/// bonus`. Earlier high-priority stops score higher.
pub fn route_fitness(route: &[ParcelView], base: Vec2) -> f32 {
    let stops: Vec<Vec2> = route.iter().map(|p| p.location).collect();
    let distance = geometry::route_length(base, &stops);
    let bonus: f32 = route
        .iter()
        .enumerate()
        .map(|(i, p)| p.priority.weight() * (route.len() - i) as f32)
        .sum();
    1000.0 - distance + bonus
}

/// Stop-order search by genetic algorithm: a population of shuffled
/// orderings evolved with elitist selection, ordered crossover, and pairwise
/// swap mutation. Best-effort; no optimality guarantee.
pub fn genetic_route<R: Rng>(parcels: &[ParcelView], base: Vec2, rng: &mut R) -> Vec<ParcelView> {
    if parcels.len() < 2 {
        return parcels.to_vec();
    }

    let mut population: Vec<Vec<ParcelView>> = (0..GA_POPULATION)
        .map(|_| {
            let mut individual = parcels.to_vec();
            individual.shuffle(rng);
            individual
        })
        .collect();

    for _ in 0..GA_GENERATIONS {
        let mut evaluated: Vec<(f32, Vec<ParcelView>)> = population
            .drain(..)
            .map(|individual| (route_fitness(&individual, base), individual))
            .collect();
        evaluated.sort_by(|a, b| b.0.total_cmp(&a.0));
        evaluated.truncate(GA_POPULATION / 2);
        let elite: Vec<Vec<ParcelView>> =
            evaluated.into_iter().map(|(_, route)| route).collect();

        population = elite.clone();
        while population.len() < GA_POPULATION {
            if rng.gen_bool(GA_CROSSOVER_RATE) {
                let a = &elite[rng.gen_range(0..elite.len())];
                let b = &elite[rng.gen_range(0..elite.len())];
                population.push(crossover(a, b));
            } else {
                let mut child = elite[rng.gen_range(0..elite.len())].clone();
                mutate(&mut child, rng);
                population.push(child);
            }
        }
    }

    population
        .into_iter()
        .map(|individual| (route_fitness(&individual, base), individual))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, route)| route)
        .unwrap_or_default()
}

/// First half of parent A, then parent B's parcels not yet seen, in order.
fn crossover(a: &[ParcelView], b: &[ParcelView]) -> Vec<ParcelView> {
    let half = a.len() / 2;
    let mut child: Vec<ParcelView> = a[..half].to_vec();
    for parcel in b {
        if !child.iter().any(|c| c.id == parcel.id) {
            child.push(parcel.clone());
        }
    }
    child
}

/// Swap two random positions.
fn mutate<R: Rng>(route: &mut [ParcelView], rng: &mut R) {
    if route.len() < 2 {
        return;
    }
    let i = rng.gen_range(0..route.len());
    let j = rng.gen_range(0..route.len());
    route.swap(i, j);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parcel(id: u64, x: f32, y: f32, weight: f32, priority: Priority) -> ParcelView {
        ParcelView {
            entity: Entity::PLACEHOLDER,
            id,
            location: Vec2::new(x, y),
            weight_kg: weight,
            priority,
            created_at: id as f32,
        }
    }

    fn candidate(id: u32, capacity: f32, battery: f32) -> DroneCandidate {
        DroneCandidate {
            entity: Entity::PLACEHOLDER,
            id,
            capacity_kg: capacity,
            battery,
            efficiency: 100.0,
            consumption_per_km: 2.0,
            speed_kmh: 50.0,
            idle: true,
        }
    }

    const BASE: Vec2 = Vec2::new(25.0, 25.0);

    #[test]
    fn test_sort_by_priority_high_first_then_fifo() {
        let mut parcels = vec![
            parcel(1, 10.0, 10.0, 2.0, Priority::Low),
            parcel(2, 11.0, 11.0, 2.0, Priority::High),
            parcel(3, 12.0, 12.0, 2.0, Priority::Medium),
            parcel(4, 13.0, 13.0, 2.0, Priority::High),
        ];
        sort_by_priority(&mut parcels);
        let ids: Vec<u64> = parcels.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_grouping_joins_nearby_parcels() {
        let parcels = vec![
            parcel(1, 10.0, 10.0, 2.0, Priority::Medium),
            parcel(2, 11.0, 11.0, 2.0, Priority::Medium),
            parcel(3, 40.0, 40.0, 2.0, Priority::Medium),
        ];
        let groups = group_by_proximity(&parcels, 10.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_grouping_caps_at_three() {
        let parcels = vec![
            parcel(1, 10.0, 10.0, 1.0, Priority::Medium),
            parcel(2, 11.0, 10.0, 1.0, Priority::Medium),
            parcel(3, 10.0, 11.0, 1.0, Priority::Medium),
            parcel(4, 11.0, 11.0, 1.0, Priority::Medium),
        ];
        let groups = group_by_proximity(&parcels, 100.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), MAX_GROUP_SIZE);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_grouping_respects_capacity() {
        let parcels = vec![
            parcel(1, 10.0, 10.0, 6.0, Priority::Medium),
            parcel(2, 10.5, 10.0, 6.0, Priority::Medium),
        ];
        let groups = group_by_proximity(&parcels, 10.0);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_nearest_neighbor_route_order() {
        let parcels = vec![
            parcel(1, 30.0, 25.0, 2.0, Priority::Medium),
            parcel(2, 26.0, 25.0, 2.0, Priority::Medium),
        ];
        let route = nearest_neighbor_route(BASE, &parcels);
        let ids: Vec<u64> = route.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_route_distance_is_reasonable() {
        let parcels = vec![
            parcel(1, 28.0, 25.0, 2.0, Priority::Medium),
            parcel(2, 25.0, 29.0, 2.0, Priority::Medium),
        ];
        let dist = route_distance(BASE, &parcels);
        assert!(dist > 0.0);
        assert!(dist < 20.0);
    }

    #[test]
    fn test_score_prefers_charged_drones() {
        let group = vec![parcel(1, 30.0, 30.0, 5.0, Priority::High)];
        let full = candidate(1, 10.0, 100.0);
        let low = candidate(2, 10.0, 40.0);
        assert!(score(&full, &group, 10.0) > score(&low, &group, 10.0));
    }

    #[test]
    fn test_allocate_is_deterministic() {
        let candidates = vec![candidate(1, 10.0, 100.0), candidate(2, 10.0, 80.0)];
        let pending = vec![
            parcel(1, 30.0, 30.0, 5.0, Priority::High),
            parcel(2, 20.0, 20.0, 3.0, Priority::Medium),
        ];
        let first = allocate(&candidates, &pending, BASE);
        let second = allocate(&candidates, &pending, BASE);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.drone_id, b.drone_id);
            let a_ids: Vec<u64> = a.deliveries.iter().map(|p| p.id).collect();
            let b_ids: Vec<u64> = b.deliveries.iter().map(|p| p.id).collect();
            assert_eq!(a_ids, b_ids);
        }
    }

    #[test]
    fn test_allocate_assigns_each_drone_once() {
        let candidates = vec![candidate(1, 10.0, 100.0)];
        let pending = vec![
            parcel(1, 30.0, 30.0, 5.0, Priority::High),
            parcel(2, 15.0, 15.0, 5.0, Priority::High),
        ];
        // Two distant groups but a single drone: only one allocation.
        let allocations = allocate(&candidates, &pending, BASE);
        assert_eq!(allocations.len(), 1);
    }

    #[test]
    fn test_allocate_skips_unservable_group() {
        let candidates = vec![candidate(1, 4.0, 100.0)];
        let pending = vec![parcel(1, 30.0, 30.0, 5.0, Priority::High)];
        assert!(allocate(&candidates, &pending, BASE).is_empty());
    }

    #[test]
    fn test_allocate_respects_battery_margin() {
        // Route ~14.1 km needs ~28.3% charge; 35% - 10 margin is not enough.
        let candidates = vec![candidate(1, 10.0, 35.0)];
        let pending = vec![parcel(1, 30.0, 30.0, 5.0, Priority::High)];
        assert!(allocate(&candidates, &pending, BASE).is_empty());
    }

    #[test]
    fn test_estimate_time_for_single_stop() {
        let c = candidate(1, 10.0, 100.0);
        let group = vec![parcel(1, 30.0, 30.0, 2.0, Priority::Medium)];
        let minutes = estimate_time(&c, &group, BASE);
        assert!(minutes > 0.0);
        assert!(minutes < 60.0);
    }

    #[test]
    fn test_allocation_efficiency_in_range() {
        let c = candidate(1, 10.0, 100.0);
        let group = vec![parcel(1, 28.0, 28.0, 8.0, Priority::Medium)];
        let efficiency = allocation_efficiency(&c, &group, BASE);
        assert!(efficiency > 0.0 && efficiency <= 100.0);
    }

    #[test]
    fn test_optimization_stats_averages() {
        let candidates = vec![candidate(1, 10.0, 100.0), candidate(2, 10.0, 100.0)];
        let pending = vec![
            parcel(1, 28.0, 25.0, 5.0, Priority::High),
            parcel(2, 15.0, 15.0, 3.0, Priority::Low),
        ];
        let allocations = allocate(&candidates, &pending, BASE);
        let stats = optimization_stats(&allocations);
        assert_eq!(stats.total_trips, allocations.len());
        assert!(stats.avg_distance > 0.0);
        assert!(stats.deliveries_per_trip >= 1.0);
    }

    #[test]
    fn test_bin_packing_first_fit_decreasing() {
        let parcels = vec![
            parcel(1, 10.0, 10.0, 5.0, Priority::Medium),
            parcel(2, 10.0, 10.0, 4.0, Priority::Medium),
            parcel(3, 10.0, 10.0, 3.0, Priority::Medium),
            parcel(4, 10.0, 10.0, 2.0, Priority::Medium),
            parcel(5, 10.0, 10.0, 1.0, Priority::Medium),
        ];
        let bins = bin_packing(&parcels, 10.0);
        assert_eq!(bins.len(), 2);
        for bin in &bins {
            let weight: f32 = bin.iter().map(|p| p.weight_kg).sum();
            assert!(weight <= 10.0);
        }
    }

    #[test]
    fn test_genetic_route_preserves_parcels() {
        let parcels = vec![
            parcel(1, 30.0, 25.0, 2.0, Priority::Low),
            parcel(2, 26.0, 25.0, 2.0, Priority::High),
            parcel(3, 25.0, 30.0, 2.0, Priority::Medium),
            parcel(4, 20.0, 25.0, 2.0, Priority::Low),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let route = genetic_route(&parcels, BASE, &mut rng);
        assert_eq!(route.len(), parcels.len());
        let mut ids: Vec<u64> = route.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_genetic_route_seeded_runs_agree() {
        let parcels = vec![
            parcel(1, 30.0, 25.0, 2.0, Priority::Low),
            parcel(2, 26.0, 25.0, 2.0, Priority::High),
            parcel(3, 25.0, 30.0, 2.0, Priority::Medium),
        ];
        let a: Vec<u64> = genetic_route(&parcels, BASE, &mut ChaCha8Rng::seed_from_u64(9))
            .iter()
            .map(|p| p.id)
            .collect();
        let b: Vec<u64> = genetic_route(&parcels, BASE, &mut ChaCha8Rng::seed_from_u64(9))
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_route_fitness_rewards_early_high_priority() {
        let high_first = vec![
            parcel(1, 26.0, 25.0, 2.0, Priority::High),
            parcel(2, 26.0, 26.0, 2.0, Priority::Low),
        ];
        let low_first = vec![high_first[1].clone(), high_first[0].clone()];
        assert!(route_fitness(&high_first, BASE) > route_fitness(&low_first, BASE));
    }
}
