use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{GridConfig, MAX_SPAWN_ATTEMPTS};
use crate::snake::Position;

/// Reward category of a food item.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize)]
pub enum RewardTier {
    #[default]
    Common,
    Uncommon,
    Rare,
}

/// Probability mass of each tier, in eighths. Weights sum to [`TIER_WEIGHT_TOTAL`].
pub const TIER_WEIGHTS: [(RewardTier, u32); 3] = [
    (RewardTier::Rare, 1),
    (RewardTier::Uncommon, 3),
    (RewardTier::Common, 4),
];

/// Sum of [`TIER_WEIGHTS`].
pub const TIER_WEIGHT_TOTAL: u32 = 8;

impl RewardTier {
    /// Body segments granted when eaten.
    #[must_use]
    pub fn growth(self) -> u32 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
        }
    }

    /// Reversal credits granted when eaten.
    #[must_use]
    pub fn reversal_credits(self) -> u32 {
        match self {
            Self::Common => 0,
            Self::Uncommon => 1,
            Self::Rare => 2,
        }
    }

    /// Maps a roll in `1..=TIER_WEIGHT_TOTAL` onto the weight table. Rolls
    /// past the end fall into the last tier.
    #[must_use]
    pub fn from_roll(roll: u32) -> Self {
        let mut upper = 0;
        for (tier, weight) in TIER_WEIGHTS {
            upper += weight;
            if roll <= upper {
                return tier;
            }
        }
        TIER_WEIGHTS[TIER_WEIGHTS.len() - 1].0
    }

    /// Draws a tier from the weight table.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen_range(1..=TIER_WEIGHT_TOTAL))
    }
}

/// A recyclable pickup. Items are never destroyed; eaten items are marked
/// inactive and respawned.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct FoodItem {
    pub position: Position,
    pub tier: RewardTier,
    pub active: bool,
}

impl Default for FoodItem {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodItem {
    /// Creates an inactive item awaiting its first spawn.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Position { x: 0, y: 0 },
            tier: RewardTier::Common,
            active: false,
        }
    }

    #[must_use]
    pub fn is_eaten(&self) -> bool {
        !self.active
    }
}

/// How a spawn ended up on its cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Placement {
    /// The cell was free of the snake and other food.
    Free { attempts: u32 },
    /// Every attempt collided and the last candidate was kept anyway.
    Fallback,
}

/// Places food on random cells with bounded retries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FoodSpawner {
    max_attempts: u32,
}

impl Default for FoodSpawner {
    fn default() -> Self {
        Self::new(MAX_SPAWN_ATTEMPTS)
    }
}

impl FoodSpawner {
    /// Creates a spawner that draws at most `max_attempts` candidates (at
    /// least one).
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Activates `item` with a freshly drawn tier on a random cell that is not
    /// in `occupied` nor `other_food`. When every attempt collides the final
    /// candidate is accepted, so placement never blocks.
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        item: &mut FoodItem,
        occupied: &[Position],
        other_food: &[Position],
        config: &GridConfig,
    ) -> Placement {
        item.tier = RewardTier::draw(rng);

        let mut candidate = random_cell(rng, config);
        let mut placement = Placement::Fallback;
        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                candidate = random_cell(rng, config);
            }
            if !occupied.contains(&candidate) && !other_food.contains(&candidate) {
                placement = Placement::Free { attempts: attempt };
                break;
            }
        }

        if placement == Placement::Fallback {
            warn!(
                position = ?candidate,
                attempts = self.max_attempts,
                "no free cell found, placing food on an occupied cell"
            );
        } else {
            debug!(position = ?candidate, tier = ?item.tier, "food spawned");
        }

        item.position = candidate;
        item.active = true;
        placement
    }
}

/// Draws a uniformly random grid-aligned cell inside the field.
pub fn random_cell<R: Rng + ?Sized>(rng: &mut R, config: &GridConfig) -> Position {
    let column = rng.gen_range(0..config.field_width_cells);
    let row = rng.gen_range(0..config.field_height_cells);
    config.cell_position(column, row)
}
