//! Animation clip lookup and playback bookkeeping.
//!
//! The real model/animation assets live outside the simulation core; this
//! module stands in for that subsystem with an opaque clip catalog keyed the
//! same way the exported scenes are. What the core needs from it is small:
//! load a clip by scene name and identifier, start/stop clips on an actor,
//! and hear an animation-finished signal carrying the clip's tag once a
//! non-looping clip completes. Completion is measured on the simulation
//! clock, so it cannot drift against the attack frame counters the combat
//! code runs.

use thiserror::Error;

/// Animation slots an actor can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Walk,
    Attack,
    Dead,
}

/// Failure to locate a packaged animation or model resource.
///
/// For the player this is fatal at startup; golems recover by leaving the
/// slot empty.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing animation `{id}` in scene `{scene}`")]
    MissingClip { scene: String, id: String },
    #[error("missing model scene `{0}`")]
    MissingModel(String),
}

/// A loaded animation clip.
///
/// Carries everything playback needs: the slot key it plays under, the
/// completion tag (only attack clips carry one), its duration, and whether
/// it loops or is retained at its final pose once finished.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub key: &'static str,
    pub tag: Option<&'static str>,
    pub duration: f32,
    pub looping: bool,
    pub retained: bool,
}

/// Catalog of packaged clips: (scene, identifier, duration).
///
/// Stand-in for the exported scene archives; durations are the authored clip
/// lengths.
const CLIP_CATALOG: &[(&str, &str, f32)] = &[
    ("scenes/hero/walk", "WalkID", 0.83),
    ("scenes/hero/attack", "attackID", 1.0),
    ("scenes/hero/die", "DeathID", 1.2),
    ("scenes/enemies/golem@flight", "unnamed_animation__1", 1.1),
    ("scenes/enemies/golem@attack", "Golem@Attack(1)-1", 0.9),
    ("scenes/enemies/golem@dead", "Golem@Dead-1", 1.4),
];

/// Model scenes that ship with the game.
const MODEL_CATALOG: &[&str] = &["scenes/hero/idle", "scenes/enemies/golem@idle"];

/// Verifies a model scene exists. The core keeps no handle to the mesh; the
/// render layer owns that.
pub fn load_model(scene: &str) -> Result<(), AssetError> {
    if MODEL_CATALOG.contains(&scene) {
        Ok(())
    } else {
        Err(AssetError::MissingModel(scene.to_string()))
    }
}

/// Loads a clip for the given slot, configuring looping and retention the
/// way each slot needs: walk clips loop, death clips are retained at their
/// final pose, attack clips carry the `"attack"` completion tag.
pub fn load_animation(
    state: AnimationState,
    scene: &str,
    id: &str,
) -> Result<AnimationClip, AssetError> {
    let duration = CLIP_CATALOG
        .iter()
        .find(|(s, i, _)| *s == scene && *i == id)
        .map(|(_, _, d)| *d)
        .ok_or_else(|| AssetError::MissingClip {
            scene: scene.to_string(),
            id: id.to_string(),
        })?;

    let clip = match state {
        AnimationState::Walk => AnimationClip {
            key: "walk",
            tag: None,
            duration,
            looping: true,
            retained: false,
        },
        AnimationState::Attack => AnimationClip {
            key: "attack",
            tag: Some("attack"),
            duration,
            looping: false,
            retained: false,
        },
        AnimationState::Dead => AnimationClip {
            key: "dead",
            tag: None,
            duration,
            looping: false,
            retained: true,
        },
    };

    Ok(clip)
}

#[derive(Debug, Clone)]
struct ActiveClip {
    clip: AnimationClip,
    elapsed: f32,
    finished: bool,
}

/// Per-actor playback state.
///
/// Advancing the player on the simulation clock emits the finished tags of
/// clips that completed this tick; those are the animation-finished signals
/// the combat state machines key off.
#[derive(Debug, Default)]
pub struct AnimationPlayer {
    active: Vec<ActiveClip>,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a clip under its key, replacing any clip already playing there.
    pub fn add(&mut self, clip: &AnimationClip) {
        self.active.retain(|a| a.clip.key != clip.key);
        self.active.push(ActiveClip {
            clip: clip.clone(),
            elapsed: 0.0,
            finished: false,
        });
    }

    /// Stops the clip playing under `key`, if any. The render layer applies
    /// the short blend-out; the simulation just drops the clip.
    pub fn remove(&mut self, key: &str) {
        self.active.retain(|a| a.clip.key != key);
    }

    /// Stops everything, including retained clips.
    pub fn remove_all(&mut self) {
        self.active.clear();
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.active.iter().any(|a| a.clip.key == key)
    }

    /// Advances playback and returns the tags of clips that finished.
    ///
    /// Looping clips wrap and never finish. Non-looping clips finish once;
    /// retained clips stay applied at their final pose, the rest are
    /// removed.
    pub fn advance(&mut self, delta_time: f32) -> Vec<&'static str> {
        let mut finished_tags = Vec::new();

        for active in &mut self.active {
            if active.finished {
                continue;
            }
            active.elapsed += delta_time;

            if active.clip.looping {
                if active.elapsed >= active.clip.duration {
                    active.elapsed %= active.clip.duration;
                }
                continue;
            }

            if active.elapsed >= active.clip.duration {
                active.finished = true;
                if let Some(tag) = active.clip.tag {
                    finished_tags.push(tag);
                }
            }
        }

        self.active.retain(|a| !a.finished || a.clip.retained);
        finished_tags
    }
}
