//! Shared, read-only waypoint routes.

use collie_defence_core::ConfigError;
use glam::Vec2;

/// Ordered, immutable sequence of points an enemy visits in order.
///
/// Paths are shared between every enemy spawned on them; enemies only keep a
/// cursor into the sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointPath {
    points: Vec<Vec2>,
}

impl WaypointPath {
    /// Creates a path, rejecting routes with fewer than two points.
    ///
    /// `index` identifies the path in error reports.
    pub fn new(index: usize, points: Vec<Vec2>) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::PathTooShort {
                path: index,
                points: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Waypoint at `index`, if any.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.points[0]
    }

    /// Step index at which an enemy has completed the route.
    #[must_use]
    pub fn final_step(&self) -> usize {
        self.points.len() - 1
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; paths hold at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Waypoints in visiting order.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}
