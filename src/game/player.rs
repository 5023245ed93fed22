//! The player character: locomotion, the sword attack, and hit points.
//!
//! # Overview
//!
//! The player owns two colliders: the body capsule, which reports against
//! wall geometry for penetration correction, and the weapon box in front of
//! the model, which reports against golem bodies. Golems currently inside
//! the weapon volume are tracked in a contact set; when an attack reaches
//! its damage frame, every golem in the set takes the hit.
//!
//! Locomotion and attacking are mutually exclusive. Starting an attack
//! forces walking off, and `walk` is a no-op while the attack plays out.
//! Ground snapping is the exception: it runs every tick regardless.

use std::collections::HashSet;

use crate::game::animation::{
    AnimationClip, AnimationPlayer, AnimationState, AssetError, load_animation, load_model,
};
use crate::game::collision::{
    ActorRef, BITMASK_GOLEM, BITMASK_PLAYER, BITMASK_PLAYER_WEAPON, BITMASK_WALL, Collider,
    ColliderOwner, ColliderShape, MODEL_SCALE, PLAYER_COLLIDER, WEAPON_COLLIDER,
};
use crate::game::combat::{AttackCycle, HpEvent, HpEvents};
use crate::game::ground::snap_to_ground;
use crate::game::physics::{BodyShape, StaticWorld};
use crate::math::vec::Vec3;

/// Player walk speed in world units per second.
pub const PLAYER_SPEED: f32 = 1.3;
/// Per-tick delta-time clamp shared by every actor's locomotion.
pub const MAX_DELTA_TIME: f32 = 1.0 / 60.0;
/// Player hit points at spawn.
pub const PLAYER_MAX_HP: f32 = 100.0;
/// Damage dealt to each golem in the weapon volume on the damage frame.
pub const PLAYER_ATTACK_DAMAGE: f32 = 30.0;

/// Attack tick on which the sword connects.
const PLAYER_DAMAGE_FRAME: u32 = 12;
/// Slack past the attack clip's length before the stuck-attack guard trips.
const ATTACK_TIMEOUT_GRACE: f32 = 0.5;

pub struct Player {
    pub position: Vec3,
    direction_angle: f32,
    is_walking: bool,
    is_attacking: bool,
    is_dead: bool,
    hp_points: f32,
    max_hp_points: f32,
    /// Golems currently overlapping the weapon volume, by golem index.
    active_weapon_contacts: HashSet<usize>,
    attack_cycle: AttackCycle,
    animation: AnimationPlayer,
    walk_clip: AnimationClip,
    attack_clip: AnimationClip,
    dead_clip: AnimationClip,
}

impl Player {
    /// Loads the player model and its three clips.
    ///
    /// Any missing resource is fatal; the game cannot run without its
    /// protagonist.
    pub fn new(position: Vec3) -> Result<Self, AssetError> {
        load_model("scenes/hero/idle")?;

        let walk_clip = load_animation(AnimationState::Walk, "scenes/hero/walk", "WalkID")?;
        let attack_clip = load_animation(AnimationState::Attack, "scenes/hero/attack", "attackID")?;
        let dead_clip = load_animation(AnimationState::Dead, "scenes/hero/die", "DeathID")?;

        Ok(Self {
            position,
            direction_angle: 0.0,
            is_walking: false,
            is_attacking: false,
            is_dead: false,
            hp_points: PLAYER_MAX_HP,
            max_hp_points: PLAYER_MAX_HP,
            active_weapon_contacts: HashSet::new(),
            attack_cycle: AttackCycle::new(PLAYER_DAMAGE_FRAME),
            animation: AnimationPlayer::new(),
            walk_clip,
            attack_clip,
            dead_clip,
        })
    }

    pub fn body_collider(&self) -> Collider {
        Collider {
            name: PLAYER_COLLIDER,
            category: BITMASK_PLAYER,
            contact_mask: BITMASK_WALL,
            shape: ColliderShape::Capsule {
                cap_radius: 47.0,
                height: 165.0,
            },
            offset: Vec3::new(0.0, 140.0, 0.0),
            scale: MODEL_SCALE,
        }
    }

    pub fn weapon_collider(&self) -> Collider {
        Collider {
            name: WEAPON_COLLIDER,
            category: BITMASK_PLAYER_WEAPON,
            contact_mask: BITMASK_GOLEM,
            shape: ColliderShape::Box {
                width: 160.0,
                height: 140.0,
                length: 160.0,
            },
            offset: Vec3::new(-10.0, 108.4, 88.0),
            scale: MODEL_SCALE,
        }
    }

    /// The body capsule flattened into world space for the contact feed.
    pub fn body_shape(&self) -> BodyShape {
        let collider = self.body_collider();
        BodyShape {
            owner: ColliderOwner::Actor(ActorRef::Player),
            name: collider.name,
            category: collider.category,
            contact_mask: collider.contact_mask,
            center: collider.world_center(self.position),
            radius: collider.world_radius(),
            half_height: collider.world_height() * 0.5,
        }
    }

    /// The weapon volume in world space, swung around to the player's facing.
    pub fn weapon_shape(&self) -> BodyShape {
        let collider = self.weapon_collider();
        let offset = (collider.offset * collider.scale).rotated_y(self.direction_angle);
        BodyShape {
            owner: ColliderOwner::Actor(ActorRef::Player),
            name: collider.name,
            category: collider.category,
            contact_mask: collider.contact_mask,
            center: self.position + offset,
            radius: collider.world_radius(),
            half_height: collider.world_height() * 0.5,
        }
    }

    /// Moves the player by the smoothed input `direction` and snaps to the
    /// ground.
    ///
    /// Locomotion is skipped while dead or attacking; ground snapping never
    /// is. A ground-probe miss restores the pre-tick position, rejecting the
    /// movement outright.
    pub fn walk(&mut self, direction: [f32; 2], delta_time: f32, world: &StaticWorld) {
        let initial = self.position;

        if !self.is_dead && !self.is_attacking {
            let delta_time = delta_time.min(MAX_DELTA_TIME);
            let (dx, dz) = (direction[0], direction[1]);

            if dx != 0.0 || dz != 0.0 {
                let speed = delta_time * PLAYER_SPEED;
                self.position = self.position + Vec3::new(dx * speed, 0.0, dz * speed);
                self.set_direction_angle(dx.atan2(dz));
                self.set_walking(true);
            } else {
                self.set_walking(false);
            }
        }

        snap_to_ground(&mut self.position, initial, world);
    }

    /// Starts the sword attack. Ignored while already attacking or dead.
    pub fn attack(&mut self) {
        if self.is_attacking || self.is_dead {
            return;
        }

        self.is_attacking = true;
        self.set_walking(false);
        self.attack_cycle
            .start(self.attack_clip.duration + ATTACK_TIMEOUT_GRACE);

        self.animation.remove_all();
        self.animation.add(&self.attack_clip);
    }

    /// Advances the attack counter; `true` on the tick the sword connects.
    pub fn advance_attack(&mut self, delta_time: f32) -> bool {
        self.attack_cycle.advance(delta_time)
    }

    /// Advances animation playback and returns the finished-clip tags.
    pub fn advance_animations(&mut self, delta_time: f32) -> Vec<&'static str> {
        self.animation.advance(delta_time)
    }

    /// Reacts to an animation-finished signal; `"attack"` unlocks the state
    /// machine.
    pub fn handle_animation_finished(&mut self, tag: &str) {
        if tag == "attack" {
            self.finish_attack();
        }
    }

    /// Whether the stuck-attack guard should force the attack closed.
    pub fn attack_timed_out(&self) -> bool {
        self.attack_cycle.timed_out()
    }

    /// Closes the attack and returns the state machine to idle.
    pub fn finish_attack(&mut self) {
        self.attack_cycle.finish();
        self.is_attacking = false;
    }

    /// Applies incoming damage and queues the HP-changed event.
    ///
    /// Death fires exactly once; damage arriving after death is discarded
    /// without an event.
    pub fn got_hit(&mut self, damage: f32, events: &mut HpEvents) {
        if self.is_dead {
            return;
        }

        self.hp_points -= damage;
        events.push_back(HpEvent {
            max_hp: self.max_hp_points,
            current_hp: self.hp_points,
        });

        if self.hp_points <= 0.0 {
            self.die();
        }
    }

    fn die(&mut self) {
        self.is_dead = true;
        self.is_walking = false;
        self.finish_attack();

        self.animation.remove_all();
        self.animation.add(&self.dead_clip);
    }

    /// Registers a golem entering the weapon volume.
    pub fn weapon_collide(&mut self, golem: usize) {
        self.active_weapon_contacts.insert(golem);
    }

    /// Removes a golem that left the weapon volume.
    pub fn weapon_uncollide(&mut self, golem: usize) {
        self.active_weapon_contacts.remove(&golem);
    }

    pub fn active_weapon_contacts(&self) -> &HashSet<usize> {
        &self.active_weapon_contacts
    }

    pub fn direction_angle(&self) -> f32 {
        self.direction_angle
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn hp_points(&self) -> f32 {
        self.hp_points
    }

    fn set_direction_angle(&mut self, angle: f32) {
        // The render layer animates the turn; only record real changes.
        if angle != self.direction_angle {
            self.direction_angle = angle;
        }
    }

    fn set_walking(&mut self, walking: bool) {
        if walking == self.is_walking {
            return;
        }
        self.is_walking = walking;

        if walking {
            self.animation.add(&self.walk_clip);
        } else {
            self.animation.remove("walk");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::GroundPatch;
    use approx::assert_relative_eq;

    fn flat_world() -> StaticWorld {
        StaticWorld::new(
            vec![GroundPatch {
                min_x: -10.0,
                max_x: 10.0,
                min_z: -10.0,
                max_z: 10.0,
                altitude: 0.0,
            }],
            Vec::new(),
        )
    }

    fn player() -> Player {
        Player::new(Vec3::ZERO).expect("player resources are packaged")
    }

    #[test]
    fn walking_moves_at_speed_and_faces_the_direction() {
        let world = flat_world();
        let mut player = player();

        player.walk([0.0, 1.0], 1.0 / 60.0, &world);

        assert_relative_eq!(player.position.z(), PLAYER_SPEED / 60.0, epsilon = 1e-6);
        assert_relative_eq!(player.direction_angle(), 0.0);
        assert!(player.is_walking());

        player.walk([0.0, 0.0], 1.0 / 60.0, &world);
        assert!(!player.is_walking());
    }

    #[test]
    fn oversized_deltas_are_clamped_to_one_sixtieth() {
        let world = flat_world();
        let mut player = player();

        player.walk([0.0, 1.0], 0.5, &world);
        assert_relative_eq!(player.position.z(), PLAYER_SPEED / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn attacking_suppresses_locomotion_but_not_ground_snapping() {
        let world = flat_world();
        let mut player = player();
        player.position.set_y(0.05);
        player.attack();

        player.walk([0.0, 1.0], 1.0 / 60.0, &world);

        assert_relative_eq!(player.position.z(), 0.0);
        // The snap still corrected the altitude to the floor.
        assert_relative_eq!(player.position.y(), 0.0);
        assert!(player.is_attacking());
    }

    #[test]
    fn attack_ends_only_on_the_finished_signal() {
        let mut player = player();
        player.attack();

        player.advance_attack(0.3);
        assert!(player.is_attacking());

        player.handle_animation_finished("attack");
        assert!(!player.is_attacking());
    }

    #[test]
    fn repeated_hits_reach_death_exactly_once() {
        let mut player = player();
        let mut events = HpEvents::new();

        player.got_hit(40.0, &mut events);
        player.got_hit(65.0, &mut events);

        assert!(player.is_dead());
        assert_eq!(events.len(), 2);
        assert_relative_eq!(events[0].current_hp, 60.0);
        assert_relative_eq!(events[1].current_hp, -5.0);

        // Over-kill after death is discarded silently.
        player.got_hit(10.0, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn dead_players_neither_walk_nor_attack() {
        let world = flat_world();
        let mut player = player();
        let mut events = HpEvents::new();
        player.got_hit(200.0, &mut events);

        player.walk([1.0, 0.0], 1.0 / 60.0, &world);
        assert_relative_eq!(player.position.x(), 0.0);

        player.attack();
        assert!(!player.is_attacking());
    }

    #[test]
    fn weapon_contact_set_tracks_begin_and_end() {
        let mut player = player();

        player.weapon_collide(0);
        player.weapon_collide(2);
        player.weapon_uncollide(0);

        assert!(!player.active_weapon_contacts().contains(&0));
        assert!(player.active_weapon_contacts().contains(&2));
    }

    #[test]
    fn weapon_volume_follows_the_facing() {
        let mut player = player();
        let forward = player.weapon_shape().center;
        assert!(forward.z() > 0.0);

        player.set_direction_angle(std::f32::consts::FRAC_PI_2);
        let turned = player.weapon_shape().center;
        assert!(turned.x() > 0.1 * MODEL_SCALE);
    }
}
