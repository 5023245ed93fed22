//! Golem enemies: pursuit AI, melee attacks, and hit points.
//!
//! # Overview
//!
//! Golems notice the player inside a fixed radius and walk straight at them.
//! Touching the player's body collider stops the pursuit and switches to
//! attacking: the first swing lands immediately, later swings only after a
//! cooldown. Damage connects on the swing's damage frame, and only while the
//! golem is still touching the player.
//!
//! Unlike the player, a golem survives missing animation clips: the slot is
//! simply left empty and the stuck-attack guard falls back to a fixed
//! timeout, since no finished signal can ever arrive from a clip that does
//! not play.

use crate::game::animation::{
    AnimationClip, AnimationPlayer, AnimationState, AssetError, load_animation, load_model,
};
use crate::game::collision::{
    ActorRef, BITMASK_GOLEM, BITMASK_PLAYER, BITMASK_PLAYER_WEAPON, BITMASK_WALL, Collider,
    ColliderOwner, ColliderShape, GOLEM_COLLIDER, MODEL_SCALE,
};
use crate::game::combat::AttackCycle;
use crate::game::ground::snap_to_ground;
use crate::game::physics::{BodyShape, StaticWorld};
use crate::game::player::MAX_DELTA_TIME;
use crate::math::fixed_rotation_angle;
use crate::math::vec::Vec3;

/// Radius inside which a golem notices and pursues the player.
pub const NOTICE_DISTANCE: f32 = 1.4;
/// Golem walk speed in world units per second.
pub const GOLEM_SPEED: f32 = 0.5;
/// Minimum cooldown between swings after the first.
pub const ATTACK_COOLDOWN: f32 = 2.5;
/// Damage dealt to the player when a swing connects.
pub const GOLEM_ATTACK_DAMAGE: f32 = 15.0;
/// Golem hit points at spawn.
pub const GOLEM_MAX_HP: f32 = 90.0;

/// Attack tick on which the swing connects.
const GOLEM_DAMAGE_FRAME: u32 = 10;
/// Closer than this the golem stops steering; it is already on top of the
/// target.
const MIN_CHASE_DISTANCE: f32 = 0.01;
/// Stuck-attack guard slack past the clip length, and the whole timeout when
/// the attack clip is absent.
const ATTACK_TIMEOUT_GRACE: f32 = 0.5;
const MISSING_CLIP_ATTACK_TIMEOUT: f32 = 1.5;

pub struct Golem {
    pub position: Vec3,
    direction_angle: f32,
    is_walking: bool,
    is_attacking: bool,
    is_dead: bool,
    is_collide_with_enemy: bool,
    hp_points: f32,
    /// Simulation-clock instant of the last swing; `None` until the first.
    last_attack_time: Option<f32>,
    attack_cycle: AttackCycle,
    animation: AnimationPlayer,
    walk_clip: Option<AnimationClip>,
    attack_clip: Option<AnimationClip>,
    dead_clip: Option<AnimationClip>,
}

impl Golem {
    /// Spawns a golem at `position`.
    ///
    /// The model scene must exist; individual clips may be missing and are
    /// skipped.
    pub fn new(position: Vec3) -> Result<Self, AssetError> {
        load_model("scenes/enemies/golem@idle")?;

        let walk_clip = load_animation(
            AnimationState::Walk,
            "scenes/enemies/golem@flight",
            "unnamed_animation__1",
        )
        .ok();
        let attack_clip = load_animation(
            AnimationState::Attack,
            "scenes/enemies/golem@attack",
            "Golem@Attack(1)-1",
        )
        .ok();
        let dead_clip = load_animation(
            AnimationState::Dead,
            "scenes/enemies/golem@dead",
            "Golem@Dead-1",
        )
        .ok();

        Ok(Self {
            position,
            direction_angle: 0.0,
            is_walking: false,
            is_attacking: false,
            is_dead: false,
            is_collide_with_enemy: false,
            hp_points: GOLEM_MAX_HP,
            last_attack_time: None,
            attack_cycle: AttackCycle::new(GOLEM_DAMAGE_FRAME),
            animation: AnimationPlayer::new(),
            walk_clip,
            attack_clip,
            dead_clip,
        })
    }

    pub fn collider(&self) -> Collider {
        Collider {
            name: GOLEM_COLLIDER,
            category: BITMASK_GOLEM,
            contact_mask: BITMASK_WALL | BITMASK_PLAYER | BITMASK_PLAYER_WEAPON,
            shape: ColliderShape::Capsule {
                cap_radius: 13.0,
                height: 52.0,
            },
            offset: Vec3::new(0.0, 46.0, 0.0),
            scale: MODEL_SCALE,
        }
    }

    /// The body capsule flattened into world space for the contact feed.
    pub fn body_shape(&self, index: usize) -> BodyShape {
        let collider = self.collider();
        BodyShape {
            owner: ColliderOwner::Actor(ActorRef::Golem(index)),
            name: collider.name,
            category: collider.category,
            contact_mask: collider.contact_mask,
            center: collider.world_center(self.position),
            radius: collider.world_radius(),
            half_height: collider.world_height() * 0.5,
        }
    }

    /// Runs one AI step: steer, pursue or attack, then snap to the ground.
    ///
    /// `time` is the simulation clock, used for the attack cadence. The whole
    /// step is skipped while the golem or its target is dead; otherwise
    /// ground snapping always runs, even mid-attack.
    pub fn update(
        &mut self,
        time: f32,
        delta_time: f32,
        enemy_position: Vec3,
        enemy_dead: bool,
        world: &StaticWorld,
    ) {
        if self.is_dead || enemy_dead {
            return;
        }

        let delta_time = delta_time.min(MAX_DELTA_TIME);
        let initial = self.position;
        let distance = self.position.planar_distance_to(&enemy_position);

        if distance < NOTICE_DISTANCE && distance > MIN_CHASE_DISTANCE {
            let (step_x, step_z, heading) = self.position.direction_to(&enemy_position);
            self.direction_angle = fixed_rotation_angle(heading);

            if !self.is_collide_with_enemy && !self.is_attacking {
                let speed = delta_time * GOLEM_SPEED;
                if step_x != 0.0 || step_z != 0.0 {
                    self.position =
                        self.position + Vec3::new(step_x * speed, 0.0, step_z * speed);
                    self.set_walking(true);
                } else {
                    self.set_walking(false);
                }
            } else {
                match self.last_attack_time {
                    None => {
                        self.last_attack_time = Some(time);
                        self.attack();
                    }
                    Some(last) if time - last >= ATTACK_COOLDOWN => {
                        self.last_attack_time = Some(time);
                        self.attack();
                    }
                    Some(_) => {}
                }
            }
        } else {
            self.set_walking(false);
        }

        snap_to_ground(&mut self.position, initial, world);
    }

    fn attack(&mut self) {
        if self.is_attacking {
            return;
        }
        self.is_attacking = true;

        match &self.attack_clip {
            Some(clip) => {
                self.attack_cycle.start(clip.duration + ATTACK_TIMEOUT_GRACE);
                self.animation.add(clip);
            }
            // No clip means no finished signal; lean on the guard instead.
            None => self.attack_cycle.start(MISSING_CLIP_ATTACK_TIMEOUT),
        }
    }

    /// Advances the attack counter; `true` on the tick the swing connects
    /// while still touching the player.
    pub fn advance_attack(&mut self, delta_time: f32) -> bool {
        self.attack_cycle.advance(delta_time) && self.is_collide_with_enemy
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

    /// Applies sword damage. Death fires exactly once; later hits are
    /// discarded.
    pub fn got_hit(&mut self, damage: f32) {
        if self.is_dead {
            return;
        }

        self.hp_points -= damage;
        if self.hp_points <= 0.0 {
            self.die();
        }
    }

    fn die(&mut self) {
        self.is_dead = true;
        self.is_walking = false;
        self.is_collide_with_enemy = false;
        self.finish_attack();

        self.animation.remove_all();
        if let Some(clip) = &self.dead_clip {
            self.animation.add(clip);
        }
    }

    /// Updates the touching-the-player flag from the contact lifecycle.
    ///
    /// Entering contact forces the golem out of walking; pursuit is over
    /// until the contact ends.
    pub fn set_collide_with_enemy(&mut self, colliding: bool) {
        if colliding == self.is_collide_with_enemy {
            return;
        }
        self.is_collide_with_enemy = colliding;

        if colliding {
            self.set_walking(false);
        }
    }

    pub fn is_collide_with_enemy(&self) -> bool {
        self.is_collide_with_enemy
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

    fn set_walking(&mut self, walking: bool) {
        if walking == self.is_walking {
            return;
        }
        self.is_walking = walking;

        match (&self.walk_clip, walking) {
            (Some(clip), true) => self.animation.add(clip),
            (Some(_), false) => self.animation.remove("walk"),
            (None, _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::GroundPatch;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

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

    fn golem_at(x: f32, z: f32) -> Golem {
        Golem::new(Vec3::new(x, 0.0, z)).expect("golem model is packaged")
    }

    #[test]
    fn pursues_a_noticed_target_at_walk_speed() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(1.0, 0.0, 0.0);

        golem.update(0.0, 1.0 / 60.0, target, false, &world);

        assert_relative_eq!(golem.position.x(), GOLEM_SPEED / 60.0, epsilon = 1e-6);
        assert!(golem.is_walking());
        // Facing a +X target: heading 0, fixed rotation offset leaves pi/2.
        assert_relative_eq!(golem.direction_angle(), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn ignores_targets_outside_the_notice_radius() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(5.0, 0.0, 0.0);

        golem.update(0.0, 1.0 / 60.0, target, false, &world);

        assert_relative_eq!(golem.position.x(), 0.0);
        assert!(!golem.is_walking());
    }

    #[test]
    fn a_target_on_top_of_the_golem_is_not_chased() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(0.005, 0.7, 0.0);

        golem.update(0.0, 1.0 / 60.0, target, false, &world);
        assert!(!golem.is_walking());
    }

    #[test]
    fn contact_stops_pursuit_and_attacks_immediately() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(0.5, 0.0, 0.0);

        golem.update(0.0, 1.0 / 60.0, target, false, &world);
        assert!(golem.is_walking());

        golem.set_collide_with_enemy(true);
        assert!(!golem.is_walking());

        golem.update(1.0, 1.0 / 60.0, target, false, &world);
        assert!(golem.is_attacking());
    }

    #[test]
    fn swings_again_only_after_the_cooldown() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(0.5, 0.0, 0.0);
        golem.set_collide_with_enemy(true);

        golem.update(10.0, 1.0 / 60.0, target, false, &world);
        assert!(golem.is_attacking());
        golem.finish_attack();

        // Cooldown not yet elapsed: no new swing.
        golem.update(11.0, 1.0 / 60.0, target, false, &world);
        assert!(!golem.is_attacking());

        golem.update(12.5, 1.0 / 60.0, target, false, &world);
        assert!(golem.is_attacking());
    }

    #[test]
    fn damage_frame_only_connects_while_touching() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(0.5, 0.0, 0.0);
        golem.set_collide_with_enemy(true);
        golem.update(0.0, 1.0 / 60.0, target, false, &world);

        golem.set_collide_with_enemy(false);
        // Past frame 10 (0.5 s) but no longer touching.
        assert!(!golem.advance_attack(0.6));
    }

    #[test]
    fn update_is_a_no_op_once_the_target_is_dead() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        let target = Vec3::new(0.5, 0.0, 0.0);

        golem.update(0.0, 1.0 / 60.0, target, true, &world);
        assert!(!golem.is_walking());
        assert_relative_eq!(golem.position.x(), 0.0);
    }

    #[test]
    fn death_is_idempotent() {
        let mut golem = golem_at(0.0, 0.0);

        golem.got_hit(60.0);
        assert!(!golem.is_dead());
        golem.got_hit(60.0);
        assert!(golem.is_dead());

        golem.got_hit(60.0);
        assert!(golem.is_dead());
        assert_relative_eq!(golem.hp_points(), -30.0);
    }

    #[test]
    fn fixed_rotation_offset_matches_the_model_export() {
        let world = flat_world();
        let mut golem = golem_at(0.0, 0.0);
        // Target along +Z: heading pi/2, rotation offset cancels it to 0.
        golem.update(0.0, 1.0 / 60.0, Vec3::new(0.0, 0.0, 1.0), false, &world);
        assert_relative_eq!(golem.direction_angle(), 0.0, epsilon = 1e-6);

        // Target along -X: heading pi, rotation pi/2 - pi = -pi/2.
        let mut golem = golem_at(0.0, 0.0);
        golem.update(0.0, 1.0 / 60.0, Vec3::new(-1.0, 0.0, 0.0), false, &world);
        assert_relative_eq!(golem.direction_angle(), FRAC_PI_2 - PI, epsilon = 1e-6);
    }
}
