use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::simulation_sets::SimulationSet;

/// The simulated wall clock.
///
/// Every `FixedUpdate` tick advances it by a constant amount of simulated
/// time; the `speed` multiplier instead scales how many ticks fit into a unit
/// of host time (`sync_fixed_timestep`), so a tick always means the same
/// thing regardless of playback speed.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// Simulated seconds since the simulation started.
    pub elapsed: f32,
    pub speed: f32,
    pub paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            speed: 1.0,
            paused: false,
        }
    }
}

impl SimClock {
    /// Simulated seconds per `FixedUpdate` tick, at any playback speed.
    pub const TICK_SECS: f32 = 0.1;

    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.elapsed += Self::TICK_SECS;
    }

    /// Whole simulated seconds elapsed.
    pub fn second(&self) -> u64 {
        self.elapsed as u64
    }

    pub fn formatted(&self) -> String {
        let total = self.elapsed as u64;
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}

pub fn tick_sim_clock(mut clock: ResMut<SimClock>) {
    clock.tick();
}

/// Scales the `FixedUpdate` timestep by the clock speed. Base rate is 10 Hz
/// (100 ms); at 2x speed the same host interval yields twice the ticks and
/// therefore twice the simulated time.
pub fn sync_fixed_timestep(clock: Res<SimClock>, mut time: ResMut<Time<Fixed>>) {
    let base = std::time::Duration::from_millis(100);
    let effective = if clock.paused || clock.speed <= 0.0 {
        base
    } else {
        base.div_f32(clock.speed.clamp(0.25, 16.0))
    };
    time.set_timestep(effective);
}

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>();
        app.add_systems(
            FixedUpdate,
            tick_sim_clock.in_set(SimulationSet::PreSim),
        );
        app.add_systems(Update, sync_fixed_timestep);
    }
}
