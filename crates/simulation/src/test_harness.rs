//! # TestFleet — headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `SimulationPlugin`
//! for running scenario tests without a window or renderer. The app crate
//! enables the `harness` feature to reuse the same driver for demos.

use bevy::app::App;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clock::SimClock;
use crate::config::BASE;
use crate::delivery::{
    self, Delivery, DeliveryStatus, DeliveryStatusComp, Priority, SubmitError,
};
use crate::drone::{Battery, Cargo, Drone, DronePos, DroneState, DroneStateComp};
use crate::events::{FleetEventKind, FleetJournal};
use crate::fleet::FleetConfig;
use crate::snapshot::{self, DeliverySnapshot, DroneSnapshot, FleetStats};
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
///
/// Use builder methods to set up the fleet and pending pool, then call
/// `tick()` to advance the simulation and query/assert on the resulting ECS
/// state.
pub struct TestFleet {
    app: App,
    rng: ChaCha8Rng,
}

impl TestFleet {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create an empty pad: no drones, no deliveries. Tests opt into a fleet
    /// explicitly with `with_fleet`.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);

        // Override the default fleet BEFORE the first fixed tick so that no
        // drones spawn until a builder asks for them.
        app.insert_resource(FleetConfig {
            count: 0,
            ..Default::default()
        });

        // Run one update so Startup systems execute.
        app.update();

        Self {
            app,
            rng: ChaCha8Rng::seed_from_u64(0xd20e),
        }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern — consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Configure the fleet and run one tick so the config is applied.
    pub fn with_fleet(
        mut self,
        count: u32,
        capacity_kg: f32,
        max_range_km: f32,
        battery: f32,
    ) -> Self {
        self.app.world_mut().insert_resource(FleetConfig {
            count,
            capacity_kg,
            max_range_km,
            battery,
        });
        self.tick(1);
        self
    }

    /// Set a drone's charge level.
    pub fn with_battery(mut self, id: u32, level: f32) -> Self {
        self.set_battery(id, level);
        self
    }

    /// Submit one delivery; panics on a validation error.
    pub fn with_delivery(mut self, x: f32, y: f32, weight_kg: f32, priority: Priority) -> Self {
        self.submit(x, y, weight_kg, priority)
            .expect("test delivery should be valid");
        self
    }

    /// Submit `n` seeded random deliveries into the pending pool.
    pub fn with_pending(mut self, n: usize) -> Self {
        for _ in 0..n {
            let (location, weight, priority) = delivery::random_request(&mut self.rng);
            delivery::submit(self.app.world_mut(), location, weight, priority)
                .expect("generated request is always valid");
        }
        self
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks.
    ///
    /// The simulation runs at 10 Hz (100 ms per tick). Each call advances
    /// virtual time by 100 ms and calls `app.update()`, which triggers the
    /// `FixedUpdate` schedule.
    pub fn tick(&mut self, n: u32) {
        let dt = std::time::Duration::from_millis(100);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Virtual>>()
                .advance_by(dt);
            self.app.update();
        }
    }

    /// Advance simulated time by the given delta, in whole 100 ms steps.
    /// This is the only entry point that mutates simulated time.
    pub fn advance(&mut self, delta_ms: u64) {
        self.tick(delta_ms.div_ceil(100) as u32);
    }

    /// Advance by the given number of simulated seconds.
    pub fn advance_secs(&mut self, secs: f32) {
        self.tick((secs * 10.0).round() as u32);
    }

    /// Tick one step at a time until `done` returns true, up to `max_ticks`.
    /// Returns the number of ticks consumed.
    ///
    /// Panics once `max_ticks` is exhausted, printing the journal to make
    /// the stalled scenario debuggable.
    pub fn tick_until(&mut self, max_ticks: u32, mut done: impl FnMut(&mut Self) -> bool) -> u32 {
        for n in 0..max_ticks {
            if done(self) {
                return n;
            }
            self.tick(1);
        }
        for entry in &self.journal().entries {
            eprintln!("[{:>8.1}s] {}", entry.sim_time, entry.description);
        }
        panic!("condition not reached within {max_ticks} ticks");
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Set a drone's charge level in place.
    pub fn set_battery(&mut self, id: u32, level: f32) {
        let world = self.app.world_mut();
        let mut query = world.query::<(&Drone, &mut Battery)>();
        for (drone, mut battery) in query.iter_mut(world) {
            if drone.id == id {
                battery.level = level.clamp(0.0, 100.0);
                return;
            }
        }
        panic!("no drone with id {id}");
    }

    /// Submit a delivery request, returning its id or the validation error.
    pub fn submit(
        &mut self,
        x: f32,
        y: f32,
        weight_kg: f32,
        priority: Priority,
    ) -> Result<u64, SubmitError> {
        delivery::submit(self.app.world_mut(), Vec2::new(x, y), weight_kg, priority)
    }

    // -----------------------------------------------------------------------
    // Queries (note: Bevy's World::query() requires &mut World)
    // -----------------------------------------------------------------------

    /// Access the ECS world mutably (needed for queries in Bevy).
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Get a reference to any resource.
    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn clock(&self) -> &SimClock {
        self.app.world().resource::<SimClock>()
    }

    pub fn journal(&self) -> &FleetJournal {
        self.app.world().resource::<FleetJournal>()
    }

    pub fn drone_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query_filtered::<Entity, With<Drone>>()
            .iter(world)
            .count()
    }

    pub fn drone_state(&mut self, id: u32) -> DroneState {
        self.drone_field(id, |_, state, _, _, _| state.0)
    }

    pub fn drone_battery(&mut self, id: u32) -> f32 {
        self.drone_field(id, |_, _, battery, _, _| battery.level)
    }

    pub fn drone_position(&mut self, id: u32) -> Vec2 {
        self.drone_field(id, |_, _, _, pos, _| pos.0)
    }

    pub fn cargo_count(&mut self, id: u32) -> usize {
        self.drone_field(id, |_, _, _, _, cargo| cargo.items.len())
    }

    fn drone_field<T>(
        &mut self,
        id: u32,
        extract: impl Fn(&Drone, &DroneStateComp, &Battery, &DronePos, &Cargo) -> T,
    ) -> T {
        let world = self.app.world_mut();
        let mut query = world.query::<(&Drone, &DroneStateComp, &Battery, &DronePos, &Cargo)>();
        query
            .iter(world)
            .find(|(drone, ..)| drone.id == id)
            .map(|(drone, state, battery, pos, cargo)| extract(drone, state, battery, pos, cargo))
            .unwrap_or_else(|| panic!("no drone with id {id}"))
    }

    pub fn delivery_status(&mut self, id: u64) -> DeliveryStatus {
        let world = self.app.world_mut();
        let mut query = world.query::<(&Delivery, &DeliveryStatusComp)>();
        query
            .iter(world)
            .find(|(delivery, _)| delivery.id == id)
            .map(|(_, status)| status.0)
            .unwrap_or_else(|| panic!("no delivery with id {id}"))
    }

    pub fn delivery(&mut self, id: u64) -> Delivery {
        let world = self.app.world_mut();
        let mut query = world.query::<&Delivery>();
        query
            .iter(world)
            .find(|delivery| delivery.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("no delivery with id {id}"))
    }

    /// Deliveries waiting for a drone: pending or rescheduled.
    pub fn pending_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query::<&DeliveryStatusComp>()
            .iter(world)
            .filter(|status| status.0.is_pending())
            .count()
    }

    pub fn delivered_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query::<&DeliveryStatusComp>()
            .iter(world)
            .filter(|status| status.0 == DeliveryStatus::Delivered)
            .count()
    }

    pub fn drone_snapshots(&mut self) -> Vec<DroneSnapshot> {
        snapshot::drone_snapshots(self.app.world_mut())
    }

    pub fn delivery_snapshots(&mut self) -> Vec<DeliverySnapshot> {
        snapshot::delivery_snapshots(self.app.world_mut())
    }

    pub fn stats(&mut self) -> FleetStats {
        snapshot::fleet_stats(self.app.world_mut())
    }

    /// The fixed depot position, for tests that reason about distances.
    pub fn base(&self) -> Vec2 {
        BASE
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_drone_state(&mut self, id: u32, expected: DroneState) {
        let state = self.drone_state(id);
        assert_eq!(
            state, expected,
            "Expected drone {id} in state {expected:?}, found {state:?}"
        );
    }

    pub fn assert_delivery_status(&mut self, id: u64, expected: DeliveryStatus) {
        let status = self.delivery_status(id);
        assert_eq!(
            status, expected,
            "Expected delivery #{id} in status {expected:?}, found {status:?}"
        );
    }

    /// Assert every drone's battery sits inside [0, 100].
    pub fn assert_batteries_in_bounds(&mut self) {
        let world = self.app.world_mut();
        let mut query = world.query::<(&Drone, &Battery)>();
        for (drone, battery) in query.iter(world) {
            assert!(
                (0.0..=100.0).contains(&battery.level),
                "Drone {} battery {} outside [0, 100]",
                drone.id,
                battery.level
            );
        }
    }

    /// Assert no drone carries more weight than its rated capacity.
    pub fn assert_cargo_within_capacity(&mut self) {
        let world = self.app.world_mut();
        let mut query = world.query::<(&Drone, &Cargo)>();
        for (drone, cargo) in query.iter(world) {
            assert!(
                cargo.weight_kg <= drone.capacity_kg + 1e-3,
                "Drone {} cargo {} kg exceeds capacity {} kg",
                drone.id,
                cargo.weight_kg,
                drone.capacity_kg
            );
        }
    }

    /// Assert the journal holds at least one event matching the predicate.
    pub fn assert_journal_contains(
        &self,
        what: &str,
        predicate: impl Fn(&FleetEventKind) -> bool,
    ) {
        assert!(
            self.journal().entries.iter().any(|e| predicate(&e.kind)),
            "Expected a {what} event in the journal"
        );
    }
}

impl Default for TestFleet {
    fn default() -> Self {
        Self::new()
    }
}
