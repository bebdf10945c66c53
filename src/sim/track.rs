//! Closed-loop track geometry
//!
//! A track is an ordered ring of waypoints: index `i` connects to `i + 1`
//! and the last waypoint connects back to the first. The drivable corridor
//! extends `width / 2` on either side of that centerline. Checkpoints are an
//! evenly spaced subset of the waypoints, listed in driving order, with
//! checkpoint 0 doubling as the start/finish line.

use glam::Vec2;
use serde::Serialize;
use thiserror::Error;

use super::car::Car;
use super::geometry::{closest_point_on_segment, distance_to_segment, normalize_angle};
use crate::config::TrackConfig;
use crate::consts::{BOUNDARY_NUDGE, BOUNDARY_SPEED_DAMPING};

/// Fewest gates that let the nearest checkpoint change, and so let laps close
pub const MIN_CHECKPOINTS: usize = 2;

/// Reasons a waypoint ring cannot be turned into a track
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("track needs at least 3 waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("segment {index} has zero length")]
    DegenerateSegment { index: usize },
    #[error("track needs at least 2 checkpoints, got {0}")]
    TooFewCheckpoints(usize),
    #[error("{requested} checkpoints requested but the path only has {waypoints} waypoints")]
    TooManyCheckpoints { requested: usize, waypoints: usize },
    #[error("track width must be positive, got {0}")]
    InvalidWidth(f32),
}

/// A lap gate placed on a path waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Checkpoint {
    pub pos: Vec2,
    /// Direction of travel through the gate (radians, [0, 2π))
    pub angle: f32,
    /// Index of the waypoint this gate sits on
    pub path_index: usize,
}

/// Result of projecting a point onto the centerline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProjection {
    pub point: Vec2,
    /// Segment `i` runs from waypoint `i` to waypoint `i + 1` (wrapping)
    pub segment: usize,
}

/// The race circuit
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    path: Vec<Vec2>,
    checkpoints: Vec<Checkpoint>,
    /// Drivable corridor span (centerline ± width/2)
    width: f32,
    /// Wall thickness, only used for drawing
    boundary_width: f32,
    start_pos: Vec2,
    start_heading: f32,
}

impl Track {
    /// Build a track from a closed waypoint ring
    ///
    /// `checkpoint_count` gates are placed on every `len / count`-th waypoint,
    /// starting at waypoint 0.
    pub fn new(
        path: Vec<Vec2>,
        checkpoint_count: usize,
        width: f32,
        boundary_width: f32,
    ) -> Result<Self, TrackError> {
        let n = path.len();
        if n < 3 {
            return Err(TrackError::TooFewWaypoints(n));
        }
        if let Some(index) = (0..n).find(|&i| path[i] == path[(i + 1) % n]) {
            return Err(TrackError::DegenerateSegment { index });
        }
        if checkpoint_count < MIN_CHECKPOINTS {
            return Err(TrackError::TooFewCheckpoints(checkpoint_count));
        }
        if checkpoint_count > n {
            return Err(TrackError::TooManyCheckpoints {
                requested: checkpoint_count,
                waypoints: n,
            });
        }
        if width.is_nan() || width <= 0.0 {
            return Err(TrackError::InvalidWidth(width));
        }

        let heading_at = |i: usize| {
            let dir = path[(i + 1) % n] - path[i];
            normalize_angle(dir.y.atan2(dir.x))
        };

        let stride = n / checkpoint_count;
        let checkpoints = (0..checkpoint_count)
            .map(|c| {
                let path_index = c * stride;
                Checkpoint {
                    pos: path[path_index],
                    angle: heading_at(path_index),
                    path_index,
                }
            })
            .collect();

        let start_pos = path[0];
        let start_heading = heading_at(0);

        Ok(Self {
            path,
            checkpoints,
            width,
            boundary_width,
            start_pos,
            start_heading,
        })
    }

    /// Elliptical circuit centered on the origin
    pub fn oval(config: &TrackConfig) -> Result<Self, TrackError> {
        let segments = config.segments;
        let path = (0..segments)
            .map(|i| {
                let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
                Vec2::new(angle.cos() * config.radius_x, angle.sin() * config.radius_y)
            })
            .collect();
        Self::new(
            path,
            config.checkpoints,
            config.width,
            config.boundary_width,
        )
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn boundary_width(&self) -> f32 {
        self.boundary_width
    }

    pub fn start_pos(&self) -> Vec2 {
        self.start_pos
    }

    pub fn start_heading(&self) -> f32 {
        self.start_heading
    }

    /// Iterate `(index, start, end)` for every segment of the closed loop
    pub fn segments(&self) -> impl Iterator<Item = (usize, Vec2, Vec2)> + '_ {
        let n = self.path.len();
        (0..n).map(move |i| (i, self.path[i], self.path[(i + 1) % n]))
    }

    /// True iff `point` lies strictly inside the drivable corridor
    pub fn is_on_track(&self, point: Vec2) -> bool {
        let min_dist = self
            .segments()
            .map(|(_, a, b)| distance_to_segment(point, a, b))
            .fold(f32::INFINITY, f32::min);
        min_dist < self.width / 2.0
    }

    /// Closest centerline point to `point`; first segment wins ties
    pub fn nearest_point_on_path(&self, point: Vec2) -> Option<PathProjection> {
        let mut best: Option<(f32, PathProjection)> = None;
        for (segment, a, b) in self.segments() {
            let projected = closest_point_on_segment(point, a, b);
            let dist = point.distance(projected);
            if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                best = Some((
                    dist,
                    PathProjection {
                        point: projected,
                        segment,
                    },
                ));
            }
        }
        best.map(|(_, projection)| projection)
    }

    /// True if any of the car's oriented corners is off the corridor
    pub fn check_boundary_collision(&self, car: &Car) -> bool {
        car.corners().iter().any(|&corner| !self.is_on_track(corner))
    }

    /// Soft wall: bleed speed and nudge the car toward the centerline
    ///
    /// Returns whether a correction was applied. A car far off the corridor
    /// needs several ticks to come back.
    pub fn handle_boundary_collision(&self, car: &mut Car) -> bool {
        if !self.check_boundary_collision(car) {
            return false;
        }

        car.speed *= BOUNDARY_SPEED_DAMPING;

        if let Some(nearest) = self.nearest_point_on_path(car.pos) {
            let to_path = nearest.point - car.pos;
            let dist = to_path.length();
            if dist > 0.0 {
                car.pos += to_path / dist * BOUNDARY_NUDGE;
            }
        }

        true
    }

    /// Index of the checkpoint whose center is nearest to the car
    ///
    /// Ignores driving order. Returns 0 when the track has no checkpoints.
    pub fn current_checkpoint_index(&self, car: &Car) -> usize {
        self.checkpoints
            .iter()
            .enumerate()
            .fold((0, f32::INFINITY), |(best, best_dist), (i, cp)| {
                let dist = car.pos.distance(cp.pos);
                if dist < best_dist { (i, dist) } else { (best, best_dist) }
            })
            .0
    }

    /// Forward-only checkpoint progression
    ///
    /// A new nearest checkpoint is credited only when the car sits at or past
    /// its gate in the driving direction (toward the following checkpoint).
    /// Otherwise `last_checkpoint` is returned unchanged.
    pub fn advance_checkpoint(&self, car: &Car, last_checkpoint: usize) -> usize {
        let current = self.current_checkpoint_index(car);
        if current == last_checkpoint || self.checkpoints.is_empty() {
            return last_checkpoint;
        }

        let next = (current + 1) % self.checkpoints.len();
        let cp = self.checkpoints[current].pos;
        let forward = self.checkpoints[next].pos - cp;

        if forward.dot(car.pos - cp) >= 0.0 {
            current
        } else {
            last_checkpoint
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarSpec;
    use crate::sim::car::CarRole;
    use crate::sim::test_support::square_track as square;

    fn car_at(x: f32, y: f32) -> Car {
        Car::new(0, CarRole::Player, Vec2::new(x, y), 0.0, &CarSpec::player())
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let two = vec![Vec2::ZERO, Vec2::X];
        assert_eq!(
            Track::new(two, 1, 100.0, 10.0).unwrap_err(),
            TrackError::TooFewWaypoints(2)
        );

        let repeated = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::ZERO];
        assert_eq!(
            Track::new(repeated, 1, 100.0, 10.0).unwrap_err(),
            TrackError::DegenerateSegment { index: 3 }
        );

        let tri = vec![Vec2::ZERO, Vec2::X, Vec2::ONE];
        assert_eq!(
            Track::new(tri.clone(), 0, 100.0, 10.0).unwrap_err(),
            TrackError::TooFewCheckpoints(0)
        );
        // A lone gate is always the nearest one, so no lap could ever close
        assert_eq!(
            Track::new(tri.clone(), 1, 100.0, 10.0).unwrap_err(),
            TrackError::TooFewCheckpoints(1)
        );
        assert!(Track::new(tri.clone(), 2, 100.0, 10.0).is_ok());
        assert!(matches!(
            Track::new(tri.clone(), 4, 100.0, 10.0),
            Err(TrackError::TooManyCheckpoints { .. })
        ));
        assert!(matches!(
            Track::new(tri, 2, 0.0, 10.0),
            Err(TrackError::InvalidWidth(_))
        ));
    }

    #[test]
    fn test_checkpoints_and_start() {
        let track = square();
        let idx: Vec<_> = track.checkpoints().iter().map(|c| c.path_index).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(track.start_pos(), Vec2::ZERO);
        assert!(track.start_heading().abs() < 1e-6);
        assert!((track.checkpoints()[1].angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_oval_matches_config() {
        let config = TrackConfig::default();
        let track = Track::oval(&config).unwrap();
        assert_eq!(track.path().len(), config.segments);
        assert_eq!(track.checkpoints().len(), 4);
        let idx: Vec<_> = track.checkpoints().iter().map(|c| c.path_index).collect();
        assert_eq!(idx, vec![0, 15, 30, 45]);
        // Counter-clockwise start, heading roughly +Y
        let h = track.start_heading();
        assert!(h > 1.0 && h < 2.0, "start heading {h}");
    }

    #[test]
    fn test_is_on_track() {
        let track = square();
        assert!(track.is_on_track(Vec2::new(500.0, 0.0)));
        assert!(track.is_on_track(Vec2::new(500.0, 99.0)));
        assert!(!track.is_on_track(Vec2::new(500.0, 100.0)));
        assert!(!track.is_on_track(Vec2::new(500.0, 500.0)));
    }

    #[test]
    fn test_nearest_point_on_path() {
        let track = square();
        let hit = track.nearest_point_on_path(Vec2::new(400.0, 30.0)).unwrap();
        assert_eq!(hit.segment, 0);
        assert!((hit.point - Vec2::new(400.0, 0.0)).length() < 1e-4);

        // Corner is equidistant to segments 0 and 1: first one wins
        let corner = track.nearest_point_on_path(Vec2::new(1100.0, -100.0)).unwrap();
        assert_eq!(corner.segment, 0);
    }

    #[test]
    fn test_boundary_correction_nudges_toward_path() {
        let track = square();
        let mut car = car_at(500.0, 95.0);
        car.speed = 100.0;
        assert!(track.check_boundary_collision(&car));

        assert!(track.handle_boundary_collision(&mut car));
        assert!((car.speed - 30.0).abs() < 1e-4);
        assert!((car.pos - Vec2::new(500.0, 90.0)).length() < 1e-4);

        let mut centered = car_at(500.0, 0.0);
        centered.speed = 100.0;
        assert!(!track.handle_boundary_collision(&mut centered));
        assert_eq!(centered.speed, 100.0);
    }

    #[test]
    fn test_boundary_correction_converges() {
        let track = square();
        let mut car = car_at(500.0, 160.0);
        let mut ticks = 0;
        while track.handle_boundary_collision(&mut car) {
            ticks += 1;
            assert!(ticks < 100, "car never returned to the corridor");
        }
        assert!(ticks > 1);
        assert!(!track.check_boundary_collision(&car));
    }

    #[test]
    fn test_current_checkpoint_is_nearest() {
        let track = square();
        assert_eq!(track.current_checkpoint_index(&car_at(100.0, 0.0)), 0);
        assert_eq!(track.current_checkpoint_index(&car_at(900.0, 50.0)), 1);
        assert_eq!(track.current_checkpoint_index(&car_at(50.0, 800.0)), 3);
    }

    #[test]
    fn test_advance_checkpoint_forward_only() {
        let track = square();
        // Past the gate of checkpoint 1 toward checkpoint 2
        assert_eq!(track.advance_checkpoint(&car_at(1000.0, 50.0), 0), 1);
        // Behind the gate of checkpoint 1
        assert_eq!(track.advance_checkpoint(&car_at(1050.0, -50.0), 0), 0);
    }

    #[test]
    fn test_advance_checkpoint_stationary_is_stable() {
        let track = square();
        let car = car_at(1000.0, 50.0);
        let first = track.advance_checkpoint(&car, 0);
        for _ in 0..5 {
            assert_eq!(track.advance_checkpoint(&car, first), first);
        }
    }
}
