use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::collision;
use crate::config::{DEFAULT_FOOD_COUNT, GridConfig, START_DIRECTION};
use crate::error::ConfigError;
use crate::food::{FoodItem, FoodSpawner, RewardTier};
use crate::input::{Direction, GameInput};
use crate::snake::{DeathReason, Position, Segment, Snake};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Complete mutable simulation state for one session.
///
/// `tick` is the single entry point for time: it turns an external
/// timestamp into elapsed time, advances the snake, resolves consumption and
/// recycles eaten food.
#[derive(Debug, Clone)]
pub struct World {
    pub snake: Snake,
    pub food: Vec<FoodItem>,
    config: GridConfig,
    spawner: FoodSpawner,
    last_timestamp_ms: u64,
    tick_count: u64,
    rng: StdRng,
}

impl World {
    /// Creates a world seeded from system entropy.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy(), DEFAULT_FOOD_COUNT)
    }

    /// Creates a deterministic world for tests and reproducible sessions.
    pub fn new_with_seed(config: GridConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed), DEFAULT_FOOD_COUNT)
    }

    /// Creates a world with an explicit rng and food count. All food starts
    /// inactive and is spawned before this returns.
    ///
    /// The config is validated here, so hand-built values are rejected with
    /// [`ConfigError::InvalidConfiguration`] instead of failing mid-game.
    pub fn with_rng(
        config: GridConfig,
        rng: StdRng,
        food_count: usize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = Self {
            snake: Snake::new(config.start_position(), START_DIRECTION),
            food: vec![FoodItem::new(); food_count],
            config,
            spawner: FoodSpawner::default(),
            last_timestamp_ms: 0,
            tick_count: 0,
            rng,
        };

        world.respawn_eaten_food();
        Ok(world)
    }

    /// Runs one scheduling tick at `timestamp_ms` and returns whether the
    /// snake is still alive. Consumption and respawn run before the game-over
    /// check, so the fatal step still eats food under the head. Once dead,
    /// nothing changes any more.
    pub fn tick(&mut self, timestamp_ms: u64) -> bool {
        if !self.snake.is_alive() {
            return false;
        }

        let elapsed = timestamp_ms.saturating_sub(self.last_timestamp_ms);
        self.last_timestamp_ms = timestamp_ms;

        if self.snake.advance(elapsed, &self.config) {
            self.tick_count += 1;
            debug!(tick = self.tick_count, head = ?self.snake.head(), "step");
        }

        collision::resolve_consumption(&mut self.snake, &mut self.food);
        self.respawn_eaten_food();

        if !self.snake.is_alive() {
            info!(
                tick = self.tick_count,
                score = self.score(),
                reason = ?self.snake.death_reason(),
                "game over"
            );
        }

        self.snake.is_alive()
    }

    /// Applies one external input event.
    pub fn apply_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => self.request_direction(direction),
            GameInput::Quit => {}
        }
    }

    /// Stores the latest direction request for the next discrete step.
    pub fn request_direction(&mut self, direction: Direction) {
        self.snake.request_direction(direction);
    }

    /// Respawns every eaten item. Returns how many were recycled.
    pub fn respawn_eaten_food(&mut self) -> usize {
        let mut respawned = 0;

        for index in 0..self.food.len() {
            if !self.food[index].is_eaten() {
                continue;
            }

            let occupied: Vec<Position> = self.snake.occupied_cells().collect();
            let other_food: Vec<Position> = self
                .food
                .iter()
                .enumerate()
                .filter(|(other, item)| *other != index && item.active)
                .map(|(_, item)| item.position)
                .collect();

            self.spawner.spawn(
                &mut self.rng,
                &mut self.food[index],
                &occupied,
                &other_food,
                &self.config,
            );
            respawned += 1;
        }

        respawned
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        if self.snake.is_alive() {
            GameStatus::Playing
        } else {
            GameStatus::GameOver
        }
    }

    /// Number of discrete steps taken so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Final score is the body length.
    #[must_use]
    pub fn score(&self) -> usize {
        self.snake.len()
    }

    /// Builds a read-only view for renderers.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            head: *self.snake.head_segment(),
            body: self.snake.body().to_vec(),
            food: self
                .food
                .iter()
                .map(|item| FoodView {
                    position: item.position,
                    tier: item.tier,
                    active: item.active,
                })
                .collect(),
            direction: self.snake.direction(),
            reversal_credits: self.snake.reversal_credits(),
            alive: self.snake.is_alive(),
            death_reason: self.snake.death_reason(),
            score: self.score(),
            tick_count: self.tick_count,
        }
    }
}

/// Renderer-facing view of one food item.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct FoodView {
    pub position: Position,
    pub tier: RewardTier,
    pub active: bool,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub head: Segment,
    pub body: Vec<Segment>,
    pub food: Vec<FoodView>,
    pub direction: Direction,
    pub reversal_credits: u32,
    pub alive: bool,
    pub death_reason: Option<DeathReason>,
    pub score: usize,
    pub tick_count: u64,
}
