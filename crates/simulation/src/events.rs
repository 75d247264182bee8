use bevy::math::Vec2;
use bevy::prelude::*;
use serde::Serialize;

use crate::delivery::Priority;
use crate::simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FleetEventKind {
    Assigned { drone: u32, delivery: u64 },
    Departed { drone: u32, parcels: usize },
    Collected { drone: u32, delivery: u64 },
    Delivered { drone: u32, delivery: u64, priority: Priority },
    EmergencyReturn { drone: u32, battery: f32 },
    RechargeStarted { drone: u32, battery: f32 },
    Recharged { drone: u32 },
    Rescheduled { delivery: u64 },
}

/// A discrete, human-readable notification emitted by the core.
///
/// The presentation layer consumes these through its own `EventReader` or by
/// reading the bounded [`FleetJournal`]; the core never talks to a concrete
/// UI.
#[derive(Event, Debug, Clone, Serialize)]
pub struct FleetEvent {
    pub sim_time: f32,
    pub kind: FleetEventKind,
    pub description: String,
}

impl FleetEvent {
    pub fn assigned(
        sim_time: f32,
        drone: u32,
        delivery: u64,
        priority: Priority,
        location: Vec2,
    ) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Assigned { drone, delivery },
            description: format!(
                "Drone {drone} -> delivery #{delivery} ({priority:?}) at ({:.0}, {:.0})",
                location.x, location.y
            ),
        }
    }

    pub fn departed(sim_time: f32, drone: u32, parcels: usize) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Departed { drone, parcels },
            description: format!("Drone {drone} took off with {parcels} parcel(s)"),
        }
    }

    pub fn collected(sim_time: f32, drone: u32, delivery: u64) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Collected { drone, delivery },
            description: format!("Drone {drone} collected delivery #{delivery}"),
        }
    }

    pub fn delivered(sim_time: f32, drone: u32, delivery: u64, priority: Priority) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Delivered {
                drone,
                delivery,
                priority,
            },
            description: format!("Drone {drone} delivered delivery #{delivery}"),
        }
    }

    pub fn emergency_return(sim_time: f32, drone: u32, battery: f32) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::EmergencyReturn { drone, battery },
            description: format!(
                "Drone {drone} returning to base, battery low ({battery:.0}%)"
            ),
        }
    }

    pub fn recharge_started(sim_time: f32, drone: u32, battery: f32) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::RechargeStarted { drone, battery },
            description: format!("Drone {drone} recharging ({battery:.0}%)"),
        }
    }

    pub fn recharged(sim_time: f32, drone: u32) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Recharged { drone },
            description: format!("Drone {drone} fully charged"),
        }
    }

    pub fn rescheduled(sim_time: f32, delivery: u64) -> Self {
        Self {
            sim_time,
            kind: FleetEventKind::Rescheduled { delivery },
            description: format!("Delivery #{delivery} rescheduled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Bounded record of recent fleet events, oldest first.
#[derive(Resource)]
pub struct FleetJournal {
    pub entries: Vec<FleetEvent>,
    pub max_entries: usize,
}

impl Default for FleetJournal {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 200,
        }
    }
}

impl FleetJournal {
    /// Push a new entry, trimming the oldest once over capacity.
    pub fn push(&mut self, event: FleetEvent) {
        self.entries.push(event);
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(0..excess);
        }
    }

    pub fn count_kind(&self, predicate: impl Fn(&FleetEventKind) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.kind)).count()
    }
}

pub fn drain_events_to_journal(
    mut reader: EventReader<FleetEvent>,
    mut journal: ResMut<FleetJournal>,
) {
    for event in reader.read() {
        journal.push(event.clone());
    }
}

pub struct EventsPlugin;

impl Plugin for EventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FleetEvent>();
        app.init_resource::<FleetJournal>();
        app.add_systems(
            FixedUpdate,
            drain_events_to_journal.in_set(SimulationSet::PostSim),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_trims_oldest() {
        let mut journal = FleetJournal {
            max_entries: 3,
            ..Default::default()
        };
        for i in 0..5 {
            journal.push(FleetEvent::recharged(i as f32, i));
        }
        assert_eq!(journal.entries.len(), 3);
        assert_eq!(journal.entries[0].kind, FleetEventKind::Recharged { drone: 2 });
    }

    #[test]
    fn test_descriptions_are_readable() {
        let event = FleetEvent::emergency_return(12.0, 3, 14.2);
        assert!(event.description.contains("Drone 3"));
        assert!(event.description.contains("14%"));
    }
}
