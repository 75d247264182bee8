//! Scenario tests driven by the `TestFleet` harness.
//!
//! These tests spin up a headless Bevy App with `SimulationPlugin` and verify
//! emergent behavior across the drone lifecycle, the dispatch pass, and the
//! full optimizer working together.

mod dispatch_tests;
mod feedback_tests;
