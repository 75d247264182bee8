//! 2D flight geometry shared by the drone state machine and the allocator.
//!
//! Flight is straight-line; there is no road graph or obstacle field.

use bevy::math::Vec2;

/// How close a drone must get to a waypoint to count as arrived, in world
/// units.
pub const ARRIVAL_THRESHOLD: f32 = 0.5;

/// Straight-line distance between two points.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Out-and-back distance from `base` to `point`.
pub fn round_trip(base: Vec2, point: Vec2) -> f32 {
    2.0 * distance(base, point)
}

/// Length of the route `start → stops[0] → … → stops[n-1] → start`.
pub fn route_length(start: Vec2, stops: &[Vec2]) -> f32 {
    let mut total = 0.0;
    let mut pos = start;
    for stop in stops {
        total += distance(pos, *stop);
        pos = *stop;
    }
    total + distance(pos, start)
}

pub fn reached(a: Vec2, b: Vec2) -> bool {
    distance(a, b) < ARRIVAL_THRESHOLD
}
