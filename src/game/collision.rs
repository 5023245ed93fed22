//! Collision categories, colliders, and contact routing primitives.
//!
//! # Overview
//!
//! This module defines the physics-facing surface of every simulated entity:
//!
//! * [`Collider`] - a named, category-tagged shape attached to an actor
//! * [`ContactEvent`] - one overlapping collider pair reported by the physics step
//! * [`PenetrationTable`] - the per-tick staging area for wall corrections
//!
//! # Category Matching
//!
//! Every collider carries a category bitmask and a contact-test mask. Contact
//! dispatch tests *both* sides of a contact against a target category, and a
//! single contact may match more than one category when bitmasks overlap
//! (the golem category shares bits with the player and weapon categories), so
//! handlers never assume exclusivity.
//!
//! # Wall Corrections
//!
//! Wall contacts do not move an actor directly. They are staged into the
//! [`PenetrationTable`], which keeps only the deepest penetration seen for
//! each actor this tick, and the staged positions are applied in a single
//! pass once the physics step has reported every contact.

use crate::math::vec::Vec3;
use std::collections::HashMap;

/// Model-to-world scale the character scenes were exported at.
pub const MODEL_SCALE: f32 = 0.0026;

/// Category bitmask for the player's body collider.
pub const BITMASK_PLAYER: u32 = 1;
/// Category bitmask for the player's weapon volume.
pub const BITMASK_PLAYER_WEAPON: u32 = 2;
/// Category bitmask for golem body colliders.
///
/// Note that `3 == BITMASK_PLAYER | BITMASK_PLAYER_WEAPON`; matching is
/// therefore genuinely non-exclusive and handlers must tolerate a contact
/// matching several categories.
pub const BITMASK_GOLEM: u32 = 3;
/// Category bitmask for static wall and terrain geometry.
pub const BITMASK_WALL: u32 = 64;

/// Collider name carried by the player's body capsule.
pub const PLAYER_COLLIDER: &str = "collider";
/// Collider name carried by the player's weapon box.
pub const WEAPON_COLLIDER: &str = "weaponCollider";
/// Collider name carried by golem body capsules.
pub const GOLEM_COLLIDER: &str = "golemCollider";

/// Identifies the actor a collider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorRef {
    Player,
    Golem(usize),
}

/// The owner of one side of a contact: a simulated actor or a static obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColliderOwner {
    Actor(ActorRef),
    Obstacle(usize),
    Terrain,
}

/// Physics shape of a collider, in model units before scaling.
#[derive(Debug, Clone, Copy)]
pub enum ColliderShape {
    Capsule { cap_radius: f32, height: f32 },
    Box { width: f32, height: f32, length: f32 },
}

/// A physics-only sub-node attached to an actor.
///
/// Colliders never render; they exist so the contact feed can classify
/// overlaps. The shape and offset are authored in model units and scaled to
/// world units with the owning model's scale, matching how the models were
/// exported.
#[derive(Debug, Clone)]
pub struct Collider {
    /// Name tag used by the wall-correction filter.
    pub name: &'static str,
    /// Category bitmask classifying this collider.
    pub category: u32,
    /// Categories this collider reports contacts against.
    pub contact_mask: u32,
    /// Shape in model units.
    pub shape: ColliderShape,
    /// Offset from the owning actor's origin, in model units.
    pub offset: Vec3,
    /// Model-to-world scale applied to shape and offset.
    pub scale: f32,
}

impl Collider {
    /// The collider's horizontal radius in world units.
    ///
    /// Boxes use half of their largest horizontal extent; the contact
    /// provider treats every collider as a vertical capsule for overlap
    /// purposes, which is accurate enough for this game's shapes.
    pub fn world_radius(&self) -> f32 {
        match self.shape {
            ColliderShape::Capsule { cap_radius, .. } => cap_radius * self.scale,
            ColliderShape::Box { width, length, .. } => width.max(length) * 0.5 * self.scale,
        }
    }

    /// The collider's vertical extent in world units.
    pub fn world_height(&self) -> f32 {
        match self.shape {
            ColliderShape::Capsule { height, .. } => height * self.scale,
            ColliderShape::Box { height, .. } => height * self.scale,
        }
    }

    /// World-space center of the collider for an owner standing at `origin`.
    pub fn world_center(&self, origin: Vec3) -> Vec3 {
        origin + self.offset * self.scale
    }
}

/// One side of a reported contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSide {
    pub owner: ColliderOwner,
    pub name: &'static str,
    pub category: u32,
}

/// A single overlapping collider pair reported by the physics step.
///
/// Contact events are transient: they are produced and consumed within one
/// simulation tick and never persisted.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub side_a: ContactSide,
    pub side_b: ContactSide,
    /// Overlap depth between the two shapes.
    pub penetration: f32,
    /// Contact normal pointing from B toward A.
    pub normal: Vec3,
}

impl ContactEvent {
    /// Invokes `block(matching, other)` for each side whose category equals
    /// `category`.
    ///
    /// Both sides are tested independently, so a contact whose colliders both
    /// carry the category dispatches twice. This mirrors the non-exclusive
    /// matching contract of the contact feed.
    pub fn match_category<F>(&self, category: u32, mut block: F)
    where
        F: FnMut(&ContactSide, &ContactSide),
    {
        if self.side_a.category == category {
            block(&self.side_a, &self.side_b);
        }
        if self.side_b.category == category {
            block(&self.side_b, &self.side_a);
        }
    }

    /// Order-independent identity of the colliding pair, used to diff the
    /// begin/update/end lifecycle across ticks.
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(
            (self.side_a.owner, self.side_a.name),
            (self.side_b.owner, self.side_b.name),
        )
    }
}

/// Canonical identity for a collider pair, independent of reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    first: (ColliderOwner, &'static str),
    second: (ColliderOwner, &'static str),
}

impl PairKey {
    fn new(a: (ColliderOwner, &'static str), b: (ColliderOwner, &'static str)) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Per-tick staging table for wall-penetration corrections.
///
/// The physics step may report several wall contacts for the same actor in
/// one tick. Only the contact with the largest penetration distance wins
/// (strict greater-than, so the first contact seen wins exact ties), and the
/// staged position is applied exactly once per actor in the
/// post-physics-settle pass.
#[derive(Debug, Default)]
pub struct PenetrationTable {
    staged: HashMap<ActorRef, (f32, Vec3)>,
}

impl PenetrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all staged corrections. Called unconditionally at tick start.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Stages a wall correction for `actor` standing at `actor_position`.
    ///
    /// Only recognized body-collider names are corrected; weapon volumes are
    /// never positionally corrected. The correction moves the actor along the
    /// contact normal by the penetration distance, with the vertical
    /// component zeroed - altitude belongs to ground snapping.
    pub fn stage(
        &mut self,
        actor: ActorRef,
        collider_name: &str,
        actor_position: Vec3,
        contact: &ContactEvent,
    ) {
        if collider_name != PLAYER_COLLIDER && collider_name != GOLEM_COLLIDER {
            return;
        }

        if let Some(&(deepest, _)) = self.staged.get(&actor) {
            if deepest >= contact.penetration {
                return;
            }
        }

        let mut offset = contact.normal * contact.penetration;
        offset.set_y(0.0);

        self.staged
            .insert(actor, (contact.penetration, actor_position + offset));
    }

    /// Drains the staged corrections for the post-physics application pass.
    pub fn drain(&mut self) -> impl Iterator<Item = (ActorRef, Vec3)> + '_ {
        self.staged.drain().map(|(actor, (_, pos))| (actor, pos))
    }

    pub fn staged_position(&self, actor: ActorRef) -> Option<Vec3> {
        self.staged.get(&actor).map(|&(_, pos)| pos)
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}
