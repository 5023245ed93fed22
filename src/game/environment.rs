//! Procedural placement of static environment props.
//!
//! Grass tufts, rocks, and fence segments are scattered over the stage at
//! setup. Each placement carries a wall-category collision volume, so the
//! penetration-correction pass keeps actors out of them. Placement is a pure
//! function of the seed, which makes layouts reproducible in tests and demo
//! runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::physics::{Aabb, GroundPatch};
use crate::math::vec::Vec3;

/// Radius around the stage origin kept free of props; actors spawn there.
const SPAWN_CLEARANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentType {
    Grass,
    Rock,
    Fence,
}

impl EnvironmentType {
    const ALL: [EnvironmentType; 3] = [
        EnvironmentType::Grass,
        EnvironmentType::Rock,
        EnvironmentType::Fence,
    ];

    /// Full extents of the prop's collision volume in world units.
    fn extents(self) -> Vec3 {
        match self {
            EnvironmentType::Grass => Vec3::new(0.15, 0.1, 0.15),
            EnvironmentType::Rock => Vec3::new(0.4, 0.35, 0.4),
            EnvironmentType::Fence => Vec3::new(0.8, 0.3, 0.12),
        }
    }
}

/// One placed prop. Immutable once the stage is set up.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    pub kind: EnvironmentType,
    pub position: Vec3,
}

impl Environment {
    /// The prop's wall-category collision volume, sitting on the ground.
    pub fn collider_volume(&self) -> Aabb {
        let extents = self.kind.extents();
        Aabb::centered(
            self.position + Vec3::new(0.0, extents.y() * 0.5, 0.0),
            extents,
        )
    }
}

/// Scatters `count` props over `bounds`, deterministically from `seed`.
///
/// Placements avoid the spawn clearance around the origin; positions sit on
/// the patch's altitude.
pub fn place_environment(seed: u64, bounds: &GroundPatch, count: usize) -> Vec<Environment> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut placements = Vec::with_capacity(count);

    while placements.len() < count {
        let x = rng.gen_range(bounds.min_x..bounds.max_x);
        let z = rng.gen_range(bounds.min_z..bounds.max_z);
        if (x * x + z * z).sqrt() < SPAWN_CLEARANCE {
            continue;
        }

        let kind = EnvironmentType::ALL[rng.gen_range(0..EnvironmentType::ALL.len())];
        placements.push(Environment {
            kind,
            position: Vec3::new(x, bounds.altitude, z),
        });
    }

    placements
}
