//! Deterministic simulation ordering via `SystemSet` phases.
//!
//! Every system running in `FixedUpdate` belongs to one of these sets, which
//! are configured as a chain so that ordering between plugins is an explicit
//! contract rather than an accident of registration order.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – per-tick setup: the simulation clock and fleet
//!   reconfiguration.
//! * **Simulation** – the drone state machine and the dispatch pass. Drone
//!   updates are order-independent among themselves; dispatch runs after them
//!   with exclusive access to the pending pool and the idle set.
//! * **PostSim** – read-mostly aggregation: feedback generation and the
//!   event-journal drain. Downstream consumers see a settled tick.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Individual plugins use `.in_set(SimulationSet::X)` when registering their
/// systems, adding fine-grained `.after()` constraints within a phase where
/// needed.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Per-tick setup: clock advance, fleet reconfiguration.
    PreSim,
    /// Core simulation: drone lifecycle ticks, then the dispatch pass.
    Simulation,
    /// Aggregation: customer feedback, journal drain.
    PostSim,
}
