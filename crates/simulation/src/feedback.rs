//! Customer feedback generated on each completed delivery.
//!
//! Display is a presentation concern; the core only keeps the bounded log.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::delivery::Priority;
use crate::events::{FleetEvent, FleetEventKind};
use crate::simulation_sets::SimulationSet;

const MESSAGES: &[&str] = &[
    "Super fast delivery, excellent service!",
    "The drone arrived right on schedule.",
    "Package in perfect condition, thank you!",
    "Innovative and efficient service!",
    "Loved receiving my order by drone!",
    "Precise and safe drop-off, recommended!",
    "Watched the drone live the whole way. Fantastic!",
    "Quick and contact-free. Perfect!",
];

/// Only the most recent entries are kept.
const MAX_FEEDBACK: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerFeedback {
    pub delivery_id: u64,
    /// 1-5 stars; high-priority deliveries always rate 5.
    pub rating: u8,
    pub message: &'static str,
    pub sim_time: f32,
}

#[derive(Resource, Default)]
pub struct FeedbackLog {
    pub entries: Vec<CustomerFeedback>,
}

impl FeedbackLog {
    pub fn push(&mut self, feedback: CustomerFeedback) {
        self.entries.push(feedback);
        if self.entries.len() > MAX_FEEDBACK {
            let excess = self.entries.len() - MAX_FEEDBACK;
            self.entries.drain(0..excess);
        }
    }
}

/// Seeded message/rating source so replays agree.
#[derive(Resource)]
pub struct FeedbackRng(pub ChaCha8Rng);

impl Default for FeedbackRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(0x5eed))
    }
}

pub fn generate_feedback(
    mut reader: EventReader<FleetEvent>,
    mut log: ResMut<FeedbackLog>,
    mut rng: ResMut<FeedbackRng>,
) {
    for event in reader.read() {
        let FleetEventKind::Delivered {
            delivery, priority, ..
        } = event.kind
        else {
            continue;
        };
        let rating = if priority == Priority::High {
            5
        } else {
            rng.0.gen_range(4..=5)
        };
        let message = MESSAGES[rng.0.gen_range(0..MESSAGES.len())];
        log.push(CustomerFeedback {
            delivery_id: delivery,
            rating,
            message,
            sim_time: event.sim_time,
        });
    }
}

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeedbackLog>();
        app.init_resource::<FeedbackRng>();
        app.add_systems(
            FixedUpdate,
            generate_feedback.in_set(SimulationSet::PostSim),
        );
    }
}
