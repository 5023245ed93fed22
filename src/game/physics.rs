//! Static world geometry and the contact/raycast provider.
//!
//! # Overview
//!
//! The simulation core treats the physics backend as a collaborator: it asks
//! for downward raycasts while ground snapping and consumes a feed of contact
//! events each tick. This module is the minimal concrete provider backing
//! both queries for headless runs and tests:
//!
//! * [`Aabb`] - axis-aligned box, the collision volume for placed obstacles
//! * [`GroundPatch`] - a flat, walkable terrain rectangle at a fixed altitude
//! * [`StaticWorld`] - wall-category geometry answering segment raycasts and
//!   producing wall contacts against dynamic bodies
//! * [`BodyShape`] - a dynamic collider flattened to a vertical capsule in
//!   world space, the shape all overlap tests run against
//!
//! Overlap testing is deliberately simple: every dynamic collider is treated
//! as a vertical capsule (the weapon box uses its horizontal half-extent as a
//! radius), which matches the coarse, kinematic contact volumes this game
//! actually uses.

use crate::game::collision::{BITMASK_WALL, ColliderOwner, ContactEvent, ContactSide};
use crate::math::vec::Vec3;

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box centered on `center` with the given full extents.
    pub fn centered(center: Vec3, extents: Vec3) -> Self {
        let half = extents * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether `(x, z)` falls inside the box's horizontal footprint.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x() && x <= self.max.x() && z >= self.min.z() && z <= self.max.z()
    }

    /// Closest point to `(x, z)` on the box's horizontal footprint.
    pub fn closest_point_xz(&self, x: f32, z: f32) -> (f32, f32) {
        (
            x.clamp(self.min.x(), self.max.x()),
            z.clamp(self.min.z(), self.max.z()),
        )
    }

    /// Whether the vertical spans `[lo, hi]` and `[min.y, max.y]` overlap.
    pub fn overlaps_vertical(&self, lo: f32, hi: f32) -> bool {
        hi >= self.min.y() && lo <= self.max.y()
    }
}

/// A flat walkable rectangle of terrain at a fixed altitude.
#[derive(Debug, Clone, Copy)]
pub struct GroundPatch {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub altitude: f32,
}

impl GroundPatch {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Result of a ground/wall raycast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Altitude of the hit surface.
    pub altitude: f32,
    /// What was hit: terrain or a placed obstacle.
    pub owner: ColliderOwner,
}

/// A dynamic collider flattened to a vertical capsule in world space.
///
/// Built from an actor's [`Collider`](crate::game::collision::Collider) each
/// tick; positions already include the owner's facing rotation for offset
/// colliders like the weapon volume.
#[derive(Debug, Clone, Copy)]
pub struct BodyShape {
    pub owner: ColliderOwner,
    pub name: &'static str,
    pub category: u32,
    pub contact_mask: u32,
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

impl BodyShape {
    fn bottom(&self) -> f32 {
        self.center.y() - self.half_height
    }

    fn top(&self) -> f32 {
        self.center.y() + self.half_height
    }
}

/// Tests two dynamic bodies for overlap, honoring their contact masks.
///
/// Returns a contact with the normal pointing from `b` toward `a`. No event
/// is produced when neither side asked to be tested against the other's
/// category.
pub fn body_overlap(a: &BodyShape, b: &BodyShape) -> Option<ContactEvent> {
    if a.contact_mask & b.category == 0 && b.contact_mask & a.category == 0 {
        return None;
    }
    if a.bottom() > b.top() || b.bottom() > a.top() {
        return None;
    }

    let distance = a.center.planar_distance_to(&b.center);
    let combined = a.radius + b.radius;
    if distance >= combined {
        return None;
    }

    let normal = if distance > 0.0 {
        (a.center - b.center).with_y(0.0).normalize()
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    };

    Some(ContactEvent {
        side_a: ContactSide {
            owner: a.owner,
            name: a.name,
            category: a.category,
        },
        side_b: ContactSide {
            owner: b.owner,
            name: b.name,
            category: b.category,
        },
        penetration: combined - distance,
        normal,
    })
}

/// Static wall-category geometry: terrain patches plus obstacle volumes.
///
/// Everything here carries the wall category; obstacles additionally remember
/// which placed environment object they belong to.
#[derive(Debug, Default)]
pub struct StaticWorld {
    patches: Vec<GroundPatch>,
    walls: Vec<Aabb>,
}

impl StaticWorld {
    pub fn new(patches: Vec<GroundPatch>, walls: Vec<Aabb>) -> Self {
        Self { patches, walls }
    }

    /// Casts a vertical segment from `from` down to `to` against wall-category
    /// geometry and returns the closest hit (the highest surface inside the
    /// segment).
    ///
    /// The core only ever casts the short vertical probe used by ground
    /// snapping, so the provider does not implement general segment
    /// intersection. A `None` means "no ground here" and is a normal,
    /// frequent outcome near the edges of the level.
    pub fn raycast(&self, from: Vec3, to: Vec3, category_mask: u32) -> Option<RayHit> {
        if category_mask & BITMASK_WALL == 0 {
            return None;
        }

        let (x, z) = (from.x(), from.z());
        let (lo, hi) = (to.y().min(from.y()), to.y().max(from.y()));

        let mut best: Option<RayHit> = None;
        let mut consider = |altitude: f32, owner: ColliderOwner| {
            if altitude < lo || altitude > hi {
                return;
            }
            if best.map_or(true, |hit| altitude > hit.altitude) {
                best = Some(RayHit { altitude, owner });
            }
        };

        for patch in &self.patches {
            if patch.contains(x, z) {
                consider(patch.altitude, ColliderOwner::Terrain);
            }
        }
        for (index, wall) in self.walls.iter().enumerate() {
            if wall.contains_xz(x, z) {
                consider(wall.max.y(), ColliderOwner::Obstacle(index));
            }
        }

        best
    }

    /// Produces wall contacts for every dynamic body overlapping an obstacle
    /// volume.
    ///
    /// The normal points from the wall toward the body, so applying
    /// `normal * penetration` to the body's owner pushes it out of the wall.
    pub fn wall_contacts(&self, bodies: &[BodyShape]) -> Vec<ContactEvent> {
        let mut contacts = Vec::new();

        for body in bodies {
            if body.contact_mask & BITMASK_WALL == 0 {
                continue;
            }
            for (index, wall) in self.walls.iter().enumerate() {
                if !wall.overlaps_vertical(body.bottom(), body.top()) {
                    continue;
                }

                let (cx, cz) = wall.closest_point_xz(body.center.x(), body.center.z());
                let dx = body.center.x() - cx;
                let dz = body.center.z() - cz;
                let distance = (dx * dx + dz * dz).sqrt();
                if distance >= body.radius {
                    continue;
                }

                let normal = if distance > 0.0 {
                    Vec3::new(dx / distance, 0.0, dz / distance)
                } else {
                    // Center inside the volume: push out through the nearest face.
                    let center = wall.center();
                    Vec3::new(body.center.x() - center.x(), 0.0, body.center.z() - center.z())
                        .normalize()
                };

                contacts.push(ContactEvent {
                    side_a: ContactSide {
                        owner: body.owner,
                        name: body.name,
                        category: body.category,
                    },
                    side_b: ContactSide {
                        owner: ColliderOwner::Obstacle(index),
                        name: "wall",
                        category: BITMASK_WALL,
                    },
                    penetration: body.radius - distance,
                    normal,
                });
            }
        }

        contacts
    }
}
