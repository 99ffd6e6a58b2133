//! Pure position tests plus the per-tick food consumption pass.

use tracing::info;

use crate::config::GridConfig;
use crate::food::{FoodItem, RewardTier};
use crate::snake::{DeathReason, Position, Segment, Snake};

/// Returns true when `head` lies outside the field.
#[must_use]
pub fn head_out_of_bounds(head: Position, config: &GridConfig) -> bool {
    !config.contains(head)
}

/// Returns true when `head` shares a cell with any body segment.
#[must_use]
pub fn head_hits_body(head: Position, body: &[Segment]) -> bool {
    body.iter().any(|segment| segment.position == head)
}

/// Returns true when `head` sits on an active food item.
#[must_use]
pub fn head_on_food(head: Position, food: &FoodItem) -> bool {
    food.active && food.position == head
}

/// Classifies a post-step head position. Both conditions are terminal, so
/// bounds are simply checked first.
#[must_use]
pub fn death_reason(head: Position, body: &[Segment], config: &GridConfig) -> Option<DeathReason> {
    if head_out_of_bounds(head, config) {
        Some(DeathReason::OutOfBounds)
    } else if head_hits_body(head, body) {
        Some(DeathReason::SelfCollision)
    } else {
        None
    }
}

/// Marks every active food item under the snake head as eaten and applies
/// its reward. Matches are applied independently, so rewards stack.
///
/// Returns the tiers that were consumed, in food order.
pub fn resolve_consumption(snake: &mut Snake, food: &mut [FoodItem]) -> Vec<RewardTier> {
    let head = snake.head();
    let mut eaten = Vec::new();

    for item in food.iter_mut().filter(|item| head_on_food(head, item)) {
        item.active = false;
        snake.grow(item.tier.growth(), item.tier.reversal_credits());
        info!(tier = ?item.tier, position = ?item.position, length = snake.len(), "food eaten");
        eaten.push(item.tier);
    }

    eaten
}
