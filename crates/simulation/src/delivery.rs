use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;
use crate::config::{WORLD_MAX, WORLD_MIN};

/// Largest parcel weight a single delivery may carry, in kg.
pub const MAX_PARCEL_WEIGHT: f32 = 10.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ordered so that `High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Scoring weight: high 3, medium 2, low 1.
    pub fn weight(self) -> f32 {
        match self {
            Self::High => 3.0,
            Self::Medium => 2.0,
            Self::Low => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    EnRoute,
    Collected,
    Delivered,
    Rescheduled,
}

impl DeliveryStatus {
    /// Rescheduled parcels re-enter the pending pool on the next pass.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending | Self::Rescheduled)
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct Delivery {
    pub id: u64,
    pub location: Vec2,
    pub weight_kg: f32,
    pub priority: Priority,
    /// Simulated seconds at submission.
    pub created_at: f32,
    pub assigned_drone: Option<u32>,
    /// Simulated seconds at hand-off, once delivered.
    pub delivered_at: Option<f32>,
}

/// Status lives in its own component so the dispatch pass can filter on it
/// without touching the rest of the record.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStatusComp(pub DeliveryStatus);

/// Monotonic id source for submitted deliveries.
#[derive(Resource, Default)]
pub struct DeliveryLedger {
    next_id: u64,
}

impl DeliveryLedger {
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Rejections reported to the submitter. Nothing is mutated on failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitError {
    InvalidWeight { weight_kg: f32 },
    OutOfBounds { x: f32, y: f32 },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWeight { weight_kg } => write!(
                f,
                "parcel weight must be in (0, {MAX_PARCEL_WEIGHT}] kg, got {weight_kg}"
            ),
            Self::OutOfBounds { x, y } => write!(
                f,
                "delivery location ({x}, {y}) is outside the \
                 [{WORLD_MIN}, {WORLD_MAX}] service area"
            ),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Validate a submission without touching any state.
pub fn validate_request(location: Vec2, weight_kg: f32) -> Result<(), SubmitError> {
    if !(weight_kg > 0.0 && weight_kg <= MAX_PARCEL_WEIGHT) {
        return Err(SubmitError::InvalidWeight { weight_kg });
    }
    let in_bounds = (WORLD_MIN..=WORLD_MAX).contains(&location.x)
        && (WORLD_MIN..=WORLD_MAX).contains(&location.y);
    if !in_bounds {
        return Err(SubmitError::OutOfBounds {
            x: location.x,
            y: location.y,
        });
    }
    Ok(())
}

/// Submit a delivery request. On success the delivery enters the pending pool
/// and its id is returned; on rejection no state changes.
pub fn submit(
    world: &mut World,
    location: Vec2,
    weight_kg: f32,
    priority: Priority,
) -> Result<u64, SubmitError> {
    validate_request(location, weight_kg)?;
    let created_at = world.resource::<SimClock>().elapsed;
    let id = world.resource_mut::<DeliveryLedger>().next_id();
    world.spawn((
        Delivery {
            id,
            location,
            weight_kg,
            priority,
            created_at,
            assigned_drone: None,
            delivered_at: None,
        },
        DeliveryStatusComp(DeliveryStatus::Pending),
    ));
    debug!("delivery #{id} submitted ({priority:?}, {weight_kg:.1} kg)");
    Ok(id)
}

/// Submit many requests; each is validated independently.
pub fn submit_batch(
    world: &mut World,
    requests: &[(Vec2, f32, Priority)],
) -> Vec<Result<u64, SubmitError>> {
    requests
        .iter()
        .map(|&(location, weight, priority)| submit(world, location, weight, priority))
        .collect()
}

/// A uniformly random, always-valid request: location well inside the
/// bounds, weight 1–10 kg, any priority.
pub fn random_request<R: Rng>(rng: &mut R) -> (Vec2, f32, Priority) {
    let location = Vec2::new(rng.gen_range(2.5..47.5), rng.gen_range(2.5..47.5));
    let weight = rng.gen_range(1.0..=MAX_PARCEL_WEIGHT);
    let priority = match rng.gen_range(0..3) {
        0 => Priority::Low,
        1 => Priority::Medium,
        _ => Priority::High,
    };
    (location, weight, priority)
}

pub struct DeliveriesPlugin;

impl Plugin for DeliveriesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeliveryLedger>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::High.weight(), 3.0);
        assert_eq!(Priority::Medium.weight(), 2.0);
        assert_eq!(Priority::Low.weight(), 1.0);
    }

    #[test]
    fn test_validate_accepts_edges() {
        assert!(validate_request(Vec2::new(0.0, 0.0), 0.1).is_ok());
        assert!(validate_request(Vec2::new(50.0, 50.0), 10.0).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weight() {
        assert_eq!(
            validate_request(Vec2::new(25.0, 25.0), 0.0),
            Err(SubmitError::InvalidWeight { weight_kg: 0.0 })
        );
        assert_eq!(
            validate_request(Vec2::new(25.0, 25.0), 10.5),
            Err(SubmitError::InvalidWeight { weight_kg: 10.5 })
        );
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        assert_eq!(
            validate_request(Vec2::new(51.0, 25.0), 5.0),
            Err(SubmitError::OutOfBounds { x: 51.0, y: 25.0 })
        );
        assert_eq!(
            validate_request(Vec2::new(25.0, -1.0), 5.0),
            Err(SubmitError::OutOfBounds { x: 25.0, y: -1.0 })
        );
    }

    #[test]
    fn test_ledger_ids_are_monotonic_from_one() {
        let mut ledger = DeliveryLedger::default();
        assert_eq!(ledger.next_id(), 1);
        assert_eq!(ledger.next_id(), 2);
        assert_eq!(ledger.next_id(), 3);
    }

    #[test]
    fn test_random_request_is_valid() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let (location, weight, _) = random_request(&mut rng);
            assert!(validate_request(location, weight).is_ok());
        }
    }
}
