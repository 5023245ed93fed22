//! Golemfall - a third-person golem-combat simulation core
//!
//! This is the entry point for the headless demo run. Golemfall is the
//! simulation half of a small third-person action game: a sword-carrying
//! hero on a scattered-prop stage, stalked by stone golems that pursue and
//! strike back.
//!
//! # Features
//! - **Locomotion**: delta-clamped character movement with raycast ground
//!   snapping
//! - **Combat**: frame-counted attack state machines for the player's sword
//!   and the golems' swings
//! - **Collision routing**: category-bitmask contact dispatch for wall
//!   corrections, body hits, and weapon hits
//! - **Enemy AI**: distance-gated pursuit with a cooldown-driven attack
//!   cadence
//! - **Procedural stage**: seeded placement of grass, rock, and fence props
//!
//! # Architecture
//! The simulation follows a modular layout:
//! - `game/`: actors, combat, collision routing, and the tick driver
//! - `math/`: vector and angle utilities shared by locomotion and AI
//!
//! # Usage
//! Run with `cargo run`. The demo scripts a short fight at a fixed 60 Hz
//! tick and logs the outcome; set `RUST_LOG=debug` for per-hit detail.

pub mod game;
pub mod math;

use anyhow::Context;
use log::info;

use crate::game::{GameState, InputState};
use crate::math::vec::Vec3;

/// Fixed tick length of the demo loop.
const TICK: f32 = 1.0 / 60.0;
/// Demo length in ticks (30 seconds).
const DEMO_TICKS: usize = 30 * 60;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut game = GameState::new(7).context("failed to set up the stage")?;
    game.spawn_golem(Vec3::new(2.0, 0.0, 2.0))
        .context("failed to spawn golem")?;
    game.spawn_golem(Vec3::new(-2.5, 0.0, 1.0))
        .context("failed to spawn golem")?;
    game.start();

    for tick in 0..DEMO_TICKS {
        let input = scripted_input(&game);
        game.update(&input, TICK);

        while let Some(event) = game.poll_hp_event() {
            info!(
                "player hp {:.0}/{:.0}",
                event.current_hp.max(0.0),
                event.max_hp
            );
        }

        if game.player().is_dead() {
            info!("the golems win after {:.1} s", tick as f32 * TICK);
            return Ok(());
        }
        if game.golems().iter().all(|g| g.is_dead()) {
            info!("stage cleared in {:.1} s", tick as f32 * TICK);
            return Ok(());
        }
    }

    info!(
        "time up: player hp {:.0}, {} golem(s) still standing",
        game.player().hp_points(),
        game.golems().iter().filter(|g| !g.is_dead()).count()
    );
    Ok(())
}

/// Walks toward the nearest living golem and swings once it enters the
/// weapon volume.
fn scripted_input(game: &GameState) -> InputState {
    let player = game.player();

    let nearest = game
        .golems()
        .iter()
        .filter(|g| !g.is_dead())
        .min_by(|a, b| {
            let da = player.position.planar_distance_to(&a.position);
            let db = player.position.planar_distance_to(&b.position);
            da.total_cmp(&db)
        });

    let Some(target) = nearest else {
        return InputState::default();
    };

    if !player.active_weapon_contacts().is_empty() {
        return InputState {
            direction: [0.0, 0.0],
            attack: true,
        };
    }

    let (dx, dz, _) = player.position.direction_to(&target.position);
    InputState {
        direction: [dx, dz],
        attack: false,
    }
}
