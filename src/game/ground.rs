//! Ground snapping: vertical position correction via raycast.
//!
//! After locomotion has produced a candidate position, each actor clamps its
//! altitude to the terrain surface by casting a short vertical segment
//! against wall-category geometry. A miss rejects the whole tick's movement,
//! which is what keeps actors from walking off the edge of the level. This
//! runs every tick for every actor, attacking or not.

use crate::game::collision::BITMASK_WALL;
use crate::game::physics::StaticWorld;
use crate::math::vec::Vec3;

/// Upward probe offset from the actor's position.
const PROBE_UP: f32 = 0.08;
/// Downward probe offset from the actor's position.
const PROBE_DOWN: f32 = 0.1;

/// Clamps `position` to the ground surface beneath it.
///
/// Casts from `position + 0.08` down to `position - 0.1` against
/// wall-category geometry, taking the closest hit. On a hit, the altitude is
/// snapped to the surface and the horizontal position computed by locomotion
/// stands. On a miss, the actor is restored to `initial` - the position it
/// held before this tick's locomotion ran - rejecting the movement entirely.
///
/// Returns `true` when ground was found.
pub fn snap_to_ground(position: &mut Vec3, initial: Vec3, world: &StaticWorld) -> bool {
    let from = *position + Vec3::new(0.0, PROBE_UP, 0.0);
    let to = *position - Vec3::new(0.0, PROBE_DOWN, 0.0);

    match world.raycast(from, to, BITMASK_WALL) {
        Some(hit) => {
            position.set_y(hit.altitude);
            true
        }
        None => {
            *position = initial;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::GroundPatch;
    use approx::assert_relative_eq;

    fn terraced_world() -> StaticWorld {
        StaticWorld::new(
            vec![
                GroundPatch {
                    min_x: -5.0,
                    max_x: 0.0,
                    min_z: -5.0,
                    max_z: 5.0,
                    altitude: 0.0,
                },
                GroundPatch {
                    min_x: 0.0,
                    max_x: 5.0,
                    min_z: -5.0,
                    max_z: 5.0,
                    altitude: 0.05,
                },
            ],
            Vec::new(),
        )
    }

    #[test]
    fn snaps_altitude_to_surface_under_foot() {
        let world = terraced_world();
        let initial = Vec3::new(-1.0, 0.0, 0.0);
        let mut position = Vec3::new(1.0, 0.0, 0.0);

        assert!(snap_to_ground(&mut position, initial, &world));
        assert_relative_eq!(position.y(), 0.05);
        assert_relative_eq!(position.x(), 1.0);
    }

    #[test]
    fn miss_rejects_the_whole_movement() {
        let world = terraced_world();
        let initial = Vec3::new(4.0, 0.05, 0.0);
        let mut position = Vec3::new(7.0, 0.05, 0.0);

        assert!(!snap_to_ground(&mut position, initial, &world));
        assert_eq!(position, initial);
    }

    #[test]
    fn surface_beyond_probe_range_counts_as_a_miss() {
        let world = StaticWorld::new(
            vec![GroundPatch {
                min_x: -5.0,
                max_x: 5.0,
                min_z: -5.0,
                max_z: 5.0,
                altitude: 0.0,
            }],
            Vec::new(),
        );
        let initial = Vec3::new(0.0, 1.0, 0.0);
        let mut position = Vec3::new(0.5, 1.0, 0.0);

        // Floating a full unit above the floor, the short probe finds nothing.
        assert!(!snap_to_ground(&mut position, initial, &world));
        assert_eq!(position, initial);
    }
}
