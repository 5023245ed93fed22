//! Core game logic: actors, combat, collision routing, and the tick driver.
//!
//! This module owns the whole simulation. [`GameState`] holds the player, the
//! golems, the static stage, and the per-tick scratch state, and its
//! [`GameState::update`] runs one simulation tick end to end:
//!
//! 1. trigger the player attack and run locomotion (with ground snapping),
//! 2. run every golem's AI step,
//! 3. generate this tick's contacts and diff them against the previous tick
//!    to synthesize the begin/update/end lifecycle,
//! 4. route contacts by collision category (wall hits stage penetration
//!    corrections, golem-body and weapon-volume hits toggle combat state),
//! 5. apply the staged wall corrections in one pass,
//! 6. advance animations, deliver finished-clip signals, and run the attack
//!    counters, applying damage on their damage frames.
//!
//! Everything observable by the outside - HP-changed events, actor state -
//! flows out through accessors; nothing inside reaches for globals.

pub mod animation;
pub mod collision;
pub mod combat;
pub mod environment;
pub mod golem;
pub mod ground;
pub mod physics;
pub mod player;

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::game::animation::AssetError;
use crate::game::collision::{
    ActorRef, BITMASK_GOLEM, BITMASK_WALL, ColliderOwner, ContactEvent, PairKey, PenetrationTable,
    PLAYER_COLLIDER, WEAPON_COLLIDER,
};
use crate::game::combat::{HpEvent, HpEvents};
use crate::game::environment::{Environment, place_environment};
use crate::game::golem::{GOLEM_ATTACK_DAMAGE, Golem};
use crate::game::physics::{BodyShape, GroundPatch, StaticWorld, body_overlap};
use crate::game::player::{PLAYER_ATTACK_DAMAGE, Player};
use crate::math::vec::Vec3;

/// Half-extent of the square stage in world units.
const STAGE_HALF_EXTENT: f32 = 5.0;
/// Props scattered over the stage at setup.
const PROP_COUNT: usize = 24;

/// Coarse lifecycle phase of the game.
///
/// While loading, every update and contact handler is a no-op; the simulation
/// only runs in `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Loading,
    Playing,
}

/// One tick's worth of player input: the smoothed movement direction, each
/// component in `[-1, 1]`, and the discrete attack trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub direction: [f32; 2],
    pub attack: bool,
}

/// Root simulation state and tick driver.
pub struct GameState {
    phase: GamePhase,
    clock: f32,
    player: Player,
    golems: Vec<Golem>,
    world: StaticWorld,
    environment: Vec<Environment>,
    hp_events: HpEvents,
    penetration: PenetrationTable,
    /// Contacts alive at the end of the previous tick, for lifecycle diffing.
    active_contacts: HashMap<PairKey, ContactEvent>,
}

impl GameState {
    /// Builds the stage from `seed` and places the player at the origin.
    ///
    /// Starts in [`GamePhase::Loading`]; call [`GameState::start`] once the
    /// golems are spawned.
    pub fn new(seed: u64) -> Result<Self, AssetError> {
        let stage = GroundPatch {
            min_x: -STAGE_HALF_EXTENT,
            max_x: STAGE_HALF_EXTENT,
            min_z: -STAGE_HALF_EXTENT,
            max_z: STAGE_HALF_EXTENT,
            altitude: 0.0,
        };
        let environment = place_environment(seed, &stage, PROP_COUNT);
        let walls = environment.iter().map(|e| e.collider_volume()).collect();
        let world = StaticWorld::new(vec![stage], walls);

        Self::with_world(world, environment)
    }

    /// Builds a game over an explicit stage; `new` is the seeded front door.
    pub fn with_world(
        world: StaticWorld,
        environment: Vec<Environment>,
    ) -> Result<Self, AssetError> {
        Ok(Self {
            phase: GamePhase::Loading,
            clock: 0.0,
            player: Player::new(Vec3::ZERO)?,
            golems: Vec::new(),
            world,
            environment,
            hp_events: HpEvents::new(),
            penetration: PenetrationTable::new(),
            active_contacts: HashMap::new(),
        })
    }

    /// Spawns a golem and returns its index.
    pub fn spawn_golem(&mut self, position: Vec3) -> Result<usize, AssetError> {
        self.golems.push(Golem::new(position)?);
        Ok(self.golems.len() - 1)
    }

    /// Leaves loading and lets the simulation run.
    pub fn start(&mut self) {
        self.phase = GamePhase::Playing;
        info!("simulation started with {} golems", self.golems.len());
    }

    /// Runs one simulation tick. A no-op outside [`GamePhase::Playing`].
    pub fn update(&mut self, input: &InputState, delta_time: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.clock += delta_time;
        self.penetration.clear();

        if input.attack {
            self.player.attack();
        }
        self.player.walk(input.direction, delta_time, &self.world);

        let (player_position, player_dead) = (self.player.position, self.player.is_dead());
        for golem in &mut self.golems {
            golem.update(self.clock, delta_time, player_position, player_dead, &self.world);
        }

        let contacts = self.generate_contacts();
        self.route_contacts(&contacts);
        self.apply_corrections();

        self.advance_animations(delta_time);
        self.advance_attacks(delta_time);
    }

    /// Pops the oldest queued HP-changed event.
    pub fn poll_hp_event(&mut self) -> Option<HpEvent> {
        self.hp_events.pop_front()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn golems(&self) -> &[Golem] {
        &self.golems
    }

    pub fn environment(&self) -> &[Environment] {
        &self.environment
    }

    /// Collects this tick's contacts: dynamic bodies against walls, then
    /// every dynamic pair whose contact masks ask for each other.
    fn generate_contacts(&self) -> Vec<ContactEvent> {
        let mut bodies: Vec<BodyShape> = vec![self.player.body_shape(), self.player.weapon_shape()];
        for (index, golem) in self.golems.iter().enumerate() {
            // Dead golems fall out of the contact world; their lingering
            // pairs end on the next diff.
            if !golem.is_dead() {
                bodies.push(golem.body_shape(index));
            }
        }

        let mut contacts = self.world.wall_contacts(&bodies);
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if a.owner == b.owner {
                    continue;
                }
                if let Some(contact) = body_overlap(a, b) {
                    contacts.push(contact);
                }
            }
        }

        contacts
    }

    /// Routes this tick's contacts and synthesizes begin/update/end.
    ///
    /// Begin and update take the same path: wall matches stage penetration
    /// corrections, golem matches set combat state. Pairs present last tick
    /// but absent now are routed as ended and clear what they set.
    fn route_contacts(&mut self, contacts: &[ContactEvent]) {
        for contact in contacts {
            contact.match_category(BITMASK_WALL, |_, other| {
                if let ColliderOwner::Actor(actor) = other.owner {
                    let position = match actor {
                        ActorRef::Player => self.player.position,
                        ActorRef::Golem(index) => self.golems[index].position,
                    };
                    self.penetration.stage(actor, other.name, position, contact);
                }
            });

            contact.match_category(BITMASK_GOLEM, |matching, other| {
                if let ColliderOwner::Actor(ActorRef::Golem(index)) = matching.owner {
                    match other.name {
                        PLAYER_COLLIDER => self.golems[index].set_collide_with_enemy(true),
                        WEAPON_COLLIDER => self.player.weapon_collide(index),
                        _ => {}
                    }
                }
            });
        }

        let current: HashMap<PairKey, ContactEvent> =
            contacts.iter().map(|c| (c.pair_key(), *c)).collect();

        let previous = std::mem::take(&mut self.active_contacts);
        for (key, contact) in previous {
            if current.contains_key(&key) {
                continue;
            }
            contact.match_category(BITMASK_GOLEM, |matching, other| {
                if let ColliderOwner::Actor(ActorRef::Golem(index)) = matching.owner {
                    match other.name {
                        PLAYER_COLLIDER => self.golems[index].set_collide_with_enemy(false),
                        WEAPON_COLLIDER => self.player.weapon_uncollide(index),
                        _ => {}
                    }
                }
            });
        }

        self.active_contacts = current;
    }

    /// Applies the staged wall corrections, one per actor.
    fn apply_corrections(&mut self) {
        for (actor, position) in self.penetration.drain() {
            match actor {
                ActorRef::Player => self.player.position = position,
                ActorRef::Golem(index) => self.golems[index].position = position,
            }
        }
    }

    /// Advances clip playback, delivers finished signals, and runs the
    /// stuck-attack guards.
    fn advance_animations(&mut self, delta_time: f32) {
        for tag in self.player.advance_animations(delta_time) {
            self.player.handle_animation_finished(tag);
        }
        if self.player.attack_timed_out() {
            warn!("player attack never finished; forcing it closed");
            self.player.finish_attack();
        }

        for (index, golem) in self.golems.iter_mut().enumerate() {
            for tag in golem.advance_animations(delta_time) {
                golem.handle_animation_finished(tag);
            }
            if golem.attack_timed_out() {
                warn!("golem {index} attack never finished; forcing it closed");
                golem.finish_attack();
            }
        }
    }

    /// Runs the attack counters and applies damage on their damage frames.
    fn advance_attacks(&mut self, delta_time: f32) {
        if self.player.advance_attack(delta_time) {
            let targets: Vec<usize> = self.player.active_weapon_contacts().iter().copied().collect();
            for index in targets {
                let golem = &mut self.golems[index];
                let was_dead = golem.is_dead();
                golem.got_hit(PLAYER_ATTACK_DAMAGE);
                debug!("sword hit golem {index}, hp now {}", golem.hp_points());
                if !was_dead && golem.is_dead() {
                    info!("golem {index} destroyed");
                }
            }
        }

        let mut player_hits = 0;
        for golem in &mut self.golems {
            if golem.advance_attack(delta_time) {
                player_hits += 1;
            }
        }
        for _ in 0..player_hits {
            let was_dead = self.player.is_dead();
            self.player.got_hit(GOLEM_ATTACK_DAMAGE, &mut self.hp_events);
            if !was_dead && self.player.is_dead() {
                info!("player died");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::golem::GOLEM_SPEED;
    use crate::game::player::PLAYER_MAX_HP;
    use approx::assert_relative_eq;

    const TICK: f32 = 1.0 / 60.0;

    fn open_stage() -> GameState {
        let stage = GroundPatch {
            min_x: -STAGE_HALF_EXTENT,
            max_x: STAGE_HALF_EXTENT,
            min_z: -STAGE_HALF_EXTENT,
            max_z: STAGE_HALF_EXTENT,
            altitude: 0.0,
        };
        GameState::with_world(StaticWorld::new(vec![stage], Vec::new()), Vec::new())
            .expect("player resources are packaged")
    }

    #[test]
    fn updates_are_no_ops_while_loading() {
        let mut game = open_stage();
        game.spawn_golem(Vec3::new(1.0, 0.0, 0.0)).unwrap();

        let input = InputState {
            direction: [0.0, 1.0],
            attack: false,
        };
        game.update(&input, TICK);

        assert_eq!(game.phase(), GamePhase::Loading);
        assert_relative_eq!(game.clock(), 0.0);
        assert_relative_eq!(game.player().position.z(), 0.0);
        assert_relative_eq!(game.golems()[0].position.x(), 1.0);
    }

    #[test]
    fn golems_pursue_the_player_once_playing() {
        let mut game = open_stage();
        game.spawn_golem(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        game.start();

        game.update(&InputState::default(), TICK);

        let golem = &game.golems()[0];
        assert!(golem.is_walking());
        assert_relative_eq!(golem.position.x(), 1.0 - GOLEM_SPEED * TICK, epsilon = 1e-5);
    }

    #[test]
    fn sword_damage_reaches_golems_in_the_weapon_volume() {
        let mut game = open_stage();
        game.spawn_golem(Vec3::new(0.0, 0.0, 0.3)).unwrap();
        game.start();

        // One idle tick registers the weapon contact, then swing.
        game.update(&InputState::default(), TICK);
        assert!(game.player().active_weapon_contacts().contains(&0));

        game.update(
            &InputState {
                direction: [0.0, 0.0],
                attack: true,
            },
            TICK,
        );
        assert!(game.player().is_attacking());

        // Damage frame 12 sits 0.6 s into the swing.
        for _ in 0..45 {
            game.update(&InputState::default(), TICK);
        }
        assert_relative_eq!(game.golems()[0].hp_points(), 60.0);
    }

    #[test]
    fn touching_golems_stop_walking_and_strike_back() {
        let mut game = open_stage();
        game.spawn_golem(Vec3::new(0.0, 0.0, 0.1)).unwrap();
        game.start();

        game.update(&InputState::default(), TICK);
        let golem = &game.golems()[0];
        assert!(golem.is_collide_with_enemy());
        assert!(!golem.is_walking());

        // First swing starts on the next tick; its damage frame is 0.5 s in.
        for _ in 0..40 {
            game.update(&InputState::default(), TICK);
        }

        assert_relative_eq!(game.player().hp_points(), PLAYER_MAX_HP - GOLEM_ATTACK_DAMAGE);
        let event = game.poll_hp_event().expect("damage queues an event");
        assert_relative_eq!(event.max_hp, PLAYER_MAX_HP);
        assert_relative_eq!(event.current_hp, PLAYER_MAX_HP - GOLEM_ATTACK_DAMAGE);
        assert!(game.poll_hp_event().is_none());
    }

    #[test]
    fn contact_end_clears_combat_state() {
        let mut game = open_stage();
        game.spawn_golem(Vec3::new(0.0, 0.0, 0.1)).unwrap();
        game.start();

        game.update(&InputState::default(), TICK);
        assert!(game.golems()[0].is_collide_with_enemy());

        game.golems[0].position = Vec3::new(4.0, 0.0, 4.0);
        game.update(&InputState::default(), TICK);

        assert!(!game.golems()[0].is_collide_with_enemy());
        assert!(!game.player().active_weapon_contacts().contains(&0));
    }

    #[test]
    fn the_stage_edge_rejects_movement() {
        let mut game = open_stage();
        game.start();

        let input = InputState {
            direction: [0.0, 1.0],
            attack: false,
        };
        // Far longer than the walk to the edge takes.
        for _ in 0..20_000 {
            game.update(&input, TICK);
        }

        assert!(game.player().position.z() <= STAGE_HALF_EXTENT);
    }

    #[test]
    fn wall_props_push_the_player_out() {
        let prop = Environment {
            kind: environment::EnvironmentType::Rock,
            position: Vec3::new(0.4, 0.0, 0.0),
        };
        let stage = GroundPatch {
            min_x: -STAGE_HALF_EXTENT,
            max_x: STAGE_HALF_EXTENT,
            min_z: -STAGE_HALF_EXTENT,
            max_z: STAGE_HALF_EXTENT,
            altitude: 0.0,
        };
        let world = StaticWorld::new(vec![stage], vec![prop.collider_volume()]);
        let mut game = GameState::with_world(world, vec![prop]).unwrap();
        game.start();

        let input = InputState {
            direction: [1.0, 0.0],
            attack: false,
        };
        for _ in 0..600 {
            game.update(&input, TICK);
        }

        // The rock's near face is at 0.2; the capsule radius keeps the
        // player's center short of it.
        assert!(game.player().position.x() < 0.2);
    }

    #[test]
    fn seeded_games_build_identical_stages() {
        let a = GameState::new(11).unwrap();
        let b = GameState::new(11).unwrap();

        assert_eq!(a.environment().len(), b.environment().len());
        for (x, y) in a.environment().iter().zip(b.environment()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.kind, y.kind);
        }
    }
}
