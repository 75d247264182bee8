//! Headless demo runner.
//!
//! Seeds a fleet and a batch of random delivery requests, lets the
//! simulation run at high speed, mirrors journal events to the log, and
//! prints the final fleet snapshot as JSON before exiting. Everything here
//! is a presentation-side collaborator: it only submits requests, reads
//! snapshots, and renders events.

use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use simulation::clock::SimClock;
use simulation::delivery::{self, DeliveryStatus, DeliveryStatusComp};
use simulation::events::FleetEvent;
use simulation::fleet::FleetConfig;
use simulation::snapshot;
use simulation::SimulationPlugin;

const DELIVERY_COUNT: usize = 12;
/// Give up and report after this much simulated time, in case some request
/// is out of every drone's range.
const SIM_TIME_CAP_SECS: f32 = 4.0 * 3600.0;
/// Simulated seconds per wall-clock second.
const PLAYBACK_SPEED: f32 = 600.0;

fn main() {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(1))),
    );
    app.add_plugins(LogPlugin::default());

    app.insert_resource(FleetConfig {
        count: 4,
        ..Default::default()
    });
    app.add_plugins(SimulationPlugin);

    app.add_systems(Startup, seed_deliveries);
    app.add_systems(Update, (mirror_journal, finish_when_done));

    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .set_relative_speed(PLAYBACK_SPEED);

    app.run();
}

fn seed_deliveries(world: &mut World) {
    let mut rng = ChaCha8Rng::seed_from_u64(0xf1ee7);
    for _ in 0..DELIVERY_COUNT {
        let (location, weight, priority) = delivery::random_request(&mut rng);
        match delivery::submit(world, location, weight, priority) {
            Ok(id) => info!(
                "delivery #{id}: {weight:.1} kg to ({:.1}, {:.1}), {priority:?}",
                location.x, location.y
            ),
            Err(err) => warn!("request rejected: {err}"),
        }
    }
}

fn mirror_journal(mut events: EventReader<FleetEvent>) {
    for event in events.read() {
        info!("[{:>8.1}s] {}", event.sim_time, event.description);
    }
}

fn finish_when_done(world: &mut World) {
    let elapsed = world.resource::<SimClock>().elapsed;
    let mut statuses = world.query::<&DeliveryStatusComp>();
    let total = statuses.iter(world).count();
    let delivered = statuses
        .iter(world)
        .filter(|status| status.0 == DeliveryStatus::Delivered)
        .count();
    if total == 0 || (delivered < total && elapsed < SIM_TIME_CAP_SECS) {
        return;
    }

    let report = serde_json::json!({
        "sim_time_secs": elapsed,
        "drones": snapshot::drone_snapshots(world),
        "deliveries": snapshot::delivery_snapshots(world),
        "stats": snapshot::fleet_stats(world),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{text}"),
        Err(err) => error!("could not serialize the final report: {err}"),
    }
    world.send_event(AppExit::Success);
}
