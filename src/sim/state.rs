//! Game state and core simulation types
//!
//! Everything a single run mutates lives in [`GameState`]. Profile data that
//! outlives the run (unlocks, high scores) is owned by the persistence layer.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ability::Singularity;
use super::collision::Aabb;
use super::obstacle::Obstacle;
use super::roster::{Character, Level};
use super::spawner::{Spawner, available_kinds};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Frame loop advancing
    Running,
    /// Frame loop suspended; resumes exactly where it stopped
    Paused,
    /// Run ended (terminal)
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    FellOff,
    Crashed,
}

impl GameOverReason {
    pub fn message(&self) -> &'static str {
        match self {
            GameOverReason::FellOff => "You fell into deep space!",
            GameOverReason::Crashed => "You crashed into an obstacle!",
        }
    }
}

/// Transient UI notification ("toast")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NewHighScore,
    LevelUnlocked(Level),
    CharacterUnlocked(Character),
    /// Stage number as shown to the player (internal level - 2)
    StageReached(u8),
}

impl Notice {
    /// How long the toast stays up
    pub fn duration_ms(&self) -> u32 {
        match self {
            Notice::NewHighScore => 2500,
            Notice::LevelUnlocked(_) | Notice::CharacterUnlocked(_) => 3000,
            Notice::StageReached(_) => 2000,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::NewHighScore => "🌟 New High Score! 🌟".to_string(),
            Notice::LevelUnlocked(level) => format!("Level {} Unlocked!", level.number()),
            Notice::CharacterUnlocked(c) => format!("New Vehicle Unlocked: {}", c.name()),
            Notice::StageReached(stage) => format!("Stage {}", stage),
        }
    }
}

/// Discrete things that happened during a tick, drained by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ObstacleSpawned { id: u32 },
    ObstacleEvicted { id: u32 },
    /// Jump key pressed during a running run
    JumpPressed,
    /// Player actually left the ground
    Jumped,
    Notice(Notice),
    SingularityActivated { captured: usize },
    SingularityReleased,
    GameOver { reason: GameOverReason, score: u64 },
}

/// The player's runner
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub character: Character,
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    /// Collider dimensions (width, height, depth)
    pub size: Vec3,
}

impl PlayerState {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            on_ground: false,
            size: character.collider_size(),
        }
    }

    pub fn collider(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    /// Advance one step: move along x/z, fall, then settle on the first ground
    /// segment the player overlaps.
    ///
    /// `scale` is the fraction of a 60 Hz tick being simulated.
    pub fn integrate(&mut self, grounds: &[Aabb], gravity: f32, scale: f32) {
        self.position.x += self.velocity.x * scale;
        self.position.z += self.velocity.z * scale;

        self.velocity.y += gravity * scale;
        self.position.y += self.velocity.y * scale;

        self.on_ground = false;
        let collider = self.collider();
        if let Some(ground) = grounds.iter().find(|g| collider.intersects(g)) {
            self.on_ground = true;
            self.velocity.y = 0.0;
            self.position.y = ground.top() + self.size.y / 2.0;
        }
    }
}

/// Build the initial conveyor of ground segments
pub fn initial_grounds() -> Vec<Aabb> {
    (0..GROUND_COUNT)
        .map(|i| {
            Aabb::new(
                Vec3::new(0.0, GROUND_Y, -(i as f32) * GROUND_DEPTH),
                Vec3::new(GROUND_WIDTH, GROUND_HEIGHT, GROUND_DEPTH),
            )
        })
        .collect()
}

/// Everything needed to start a run
#[derive(Debug, Clone)]
pub struct RunSetup {
    pub seed: u64,
    pub level: Level,
    pub character: Character,
    /// Stored high score for `level` when the run starts
    pub prior_high_score: u64,
    pub tuning: Tuning,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub level: Level,
    pub tuning: Tuning,
    /// Distance traveled: floor(-player.z)
    pub score: u64,
    /// Fine-grained stage, only advanced on the hardest level
    pub internal_level: u8,
    /// Current forward velocity along z
    pub player_speed: f32,
    pub newly_unlocked_character: Option<Character>,
    pub newly_unlocked_level: Option<Level>,
    pub high_score_notified: bool,
    pub prior_high_score: u64,
    pub player: PlayerState,
    pub grounds: Vec<Aabb>,
    /// Live obstacles, ordered by id
    pub obstacles: Vec<Obstacle>,
    pub spawner: Spawner,
    pub singularity: Singularity,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Elapsed run time in seconds (drives obstacle motion)
    pub elapsed: f32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh run: ground laid, first obstacles placed
    pub fn new(setup: RunSetup) -> Self {
        let level_tuning = setup.tuning.level(setup.level);
        let mut state = Self {
            seed: setup.seed,
            rng: Pcg32::seed_from_u64(setup.seed),
            phase: GamePhase::Running,
            level: setup.level,
            score: 0,
            internal_level: setup.level.number(),
            player_speed: level_tuning.player_speed,
            newly_unlocked_character: None,
            newly_unlocked_level: None,
            high_score_notified: false,
            prior_high_score: setup.prior_high_score,
            player: PlayerState::new(setup.character),
            grounds: initial_grounds(),
            obstacles: Vec::new(),
            spawner: Spawner::new(level_tuning.spawn_interval),
            singularity: Singularity::default(),
            time_ticks: 0,
            elapsed: 0.0,
            events: Vec::new(),
            next_id: 1,
            tuning: setup.tuning,
        };

        for _ in 0..INITIAL_OBSTACLES {
            state.spawn_obstacle();
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place one obstacle beyond the spawn frontier
    pub fn spawn_obstacle(&mut self) {
        let kinds = available_kinds(self.level, self.internal_level);
        let (kind, anchor) = self.spawner.next(
            kinds,
            self.tuning.spawn_jitter_span,
            self.tuning.lateral_spread,
            &mut self.rng,
        );
        let id = self.next_entity_id();
        log::debug!("Spawned {:?} #{} at z={:.1}", kind, id, anchor.z);
        self.obstacles
            .push(Obstacle::spawn(id, kind, anchor, &mut self.rng));
        self.events.push(GameEvent::ObstacleSpawned { id });
    }

    pub fn character(&self) -> Character {
        self.player.character
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Suspend the run. Refused once the run is over.
    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Paused;
            return true;
        }
        false
    }

    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Running;
            return true;
        }
        false
    }

    /// End the run. Only the first call has any effect.
    pub fn trigger_game_over(&mut self, reason: GameOverReason) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.phase = GamePhase::GameOver;
        log::info!("Game over ({:?}) at score {}", reason, self.score);
        self.events.push(GameEvent::GameOver {
            reason,
            score: self.score,
        });
        true
    }

    pub fn notify(&mut self, notice: Notice) {
        self.events.push(GameEvent::Notice(notice));
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(level: Level) -> RunSetup {
        RunSetup {
            seed: 42,
            level,
            character: Character::Rocket,
            prior_high_score: 0,
            tuning: Tuning::default(),
        }
    }

    #[test]
    fn test_new_run_lays_out_course() {
        let state = GameState::new(setup(Level::Two));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.internal_level, 2);
        assert_eq!(state.player_speed, -0.12);
        assert_eq!(state.grounds.len(), GROUND_COUNT);
        assert_eq!(state.obstacles.len(), INITIAL_OBSTACLES);
        assert!(state.spawner.last_spawn_z < INITIAL_SPAWN_Z);
        let ids: Vec<u32> = state.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, (1..=INITIAL_OBSTACLES as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_gravity_accumulates_per_tick() {
        let mut player = PlayerState::new(Character::Rocket);
        for _ in 0..10 {
            player.integrate(&[], GRAVITY, 1.0);
        }
        assert!(!player.on_ground);
        assert!((player.velocity.y - 10.0 * GRAVITY).abs() < 1e-6);
        // y = g * n(n+1)/2
        assert!((player.position.y - GRAVITY * 55.0).abs() < 1e-5);
    }

    #[test]
    fn test_player_settles_on_ground() {
        let grounds = initial_grounds();
        let mut player = PlayerState::new(Character::Asteroid);
        for _ in 0..60 {
            player.integrate(&grounds, GRAVITY, 1.0);
        }
        assert!(player.on_ground);
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.position.y, -1.75 + 0.6);
    }

    #[test]
    fn test_pause_is_refused_after_game_over() {
        let mut state = GameState::new(setup(Level::One));
        assert!(state.pause());
        assert!(!state.pause());
        assert!(state.resume());
        assert!(state.trigger_game_over(GameOverReason::Crashed));
        assert!(!state.trigger_game_over(GameOverReason::FellOff));
        assert!(!state.pause());
        assert!(!state.resume());

        let over: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(over.len(), 1);
    }
}
