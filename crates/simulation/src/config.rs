use bevy::math::Vec2;

/// Service-area bounds. Delivery coordinates must fall inside this square.
pub const WORLD_MIN: f32 = 0.0;
pub const WORLD_MAX: f32 = 50.0;

/// The depot all drones depart from and return to, at the center of the
/// service area.
pub const BASE: Vec2 = Vec2::new(25.0, 25.0);
