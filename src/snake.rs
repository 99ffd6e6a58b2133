use serde::Serialize;
use tracing::{debug, info};

use crate::collision;
use crate::config::GridConfig;
use crate::input::Direction;

/// Grid-aligned position in field units.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns this position moved `distance` units in `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }
}

/// Rendering hint carried by each occupied cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum SegmentTag {
    Head,
    Body,
}

/// One occupied cell of the snake.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Segment {
    pub position: Position,
    pub tag: SegmentTag,
}

impl Segment {
    #[must_use]
    pub fn head(position: Position) -> Self {
        Self {
            position,
            tag: SegmentTag::Head,
        }
    }

    #[must_use]
    pub fn body(position: Position) -> Self {
        Self {
            position,
            tag: SegmentTag::Body,
        }
    }
}

/// Why the snake stopped moving.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum DeathReason {
    OutOfBounds,
    SelfCollision,
}

/// The player-controlled actor.
///
/// The head is stored apart from the body; `body[0]` is the segment nearest
/// the head and the last element is the tail. Direction requests are a
/// last-write-wins cell that is read once per discrete step.
#[derive(Debug, Clone)]
pub struct Snake {
    head: Segment,
    body: Vec<Segment>,
    current_direction: Direction,
    requested_direction: Direction,
    reversal_credits: u32,
    death_reason: Option<DeathReason>,
    accumulated_ms: u64,
}

impl Snake {
    /// Creates a body-less snake at `start` travelling in `direction`.
    #[must_use]
    pub fn new(start: Position, direction: Direction) -> Self {
        Self::from_parts(start, Vec::new(), direction, 0)
    }

    /// Creates a snake from an explicit head and body (body front is nearest
    /// the head).
    #[must_use]
    pub fn from_parts(
        head: Position,
        body: Vec<Position>,
        direction: Direction,
        reversal_credits: u32,
    ) -> Self {
        Self {
            head: Segment::head(head),
            body: body.into_iter().map(Segment::body).collect(),
            current_direction: direction,
            requested_direction: direction,
            reversal_credits,
            death_reason: None,
            accumulated_ms: 0,
        }
    }

    /// Stores `direction` as the latest request. It is evaluated on the next
    /// discrete step.
    pub fn request_direction(&mut self, direction: Direction) {
        self.requested_direction = direction;
    }

    /// Feeds elapsed wall-clock time into the step accumulator and performs
    /// one discrete step once a full tick interval has built up.
    ///
    /// Returns true when a step was taken. A dead snake never moves.
    pub fn advance(&mut self, elapsed_ms: u64, config: &GridConfig) -> bool {
        if !self.is_alive() {
            return false;
        }

        self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed_ms);
        if self.accumulated_ms < config.tick_interval_ms {
            return false;
        }
        self.accumulated_ms = 0;

        self.step(config);
        true
    }

    fn step(&mut self, config: &GridConfig) {
        if self.requested_direction.is_opposite(self.current_direction) {
            // Without credits the request stays queued until overridden.
            if self.reversal_credits > 0 {
                self.reversal_credits -= 1;
                self.current_direction = self.requested_direction;
                self.reverse_body();
                debug!(
                    direction = ?self.current_direction,
                    credits_left = self.reversal_credits,
                    "snake reversed"
                );
            }
        } else {
            self.current_direction = self.requested_direction;
        }

        self.follow_head();

        let distance = config.cell_size as i32;
        self.head.position = self.head.position.stepped(self.current_direction, distance);

        if let Some(reason) = collision::death_reason(self.head.position, &self.body, config) {
            info!(?reason, head = ?self.head.position, length = self.body.len(), "snake died");
            self.death_reason = Some(reason);
        }
    }

    /// Swaps head and tail and inverts the remaining body so the chain stays
    /// contiguous from the new head.
    fn reverse_body(&mut self) {
        let Some(mut tail) = self.body.pop() else {
            return;
        };

        self.body.reverse();
        std::mem::swap(&mut self.head.position, &mut tail.position);
        self.body.push(tail);
    }

    /// Moves every body segment onto its head-ward neighbour's cell, using the
    /// head position from before this step's translation.
    fn follow_head(&mut self) {
        for index in (1..self.body.len()).rev() {
            self.body[index].position = self.body[index - 1].position;
        }

        if let Some(first) = self.body.first_mut() {
            first.position = self.head.position;
        }
    }

    /// Appends `growth` segments at the head's cell and grants
    /// `reversal_credits` extra reversals.
    pub fn grow(&mut self, growth: u32, reversal_credits: u32) {
        let position = self.head.position;
        self.body.extend((0..growth).map(|_| Segment::body(position)));
        self.reversal_credits = self.reversal_credits.saturating_add(reversal_credits);
    }

    /// Returns true if the head or any body segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.head.position == position || self.body.iter().any(|s| s.position == position)
    }

    /// Iterates over every occupied cell, head first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.head.position).chain(self.body.iter().map(|s| s.position))
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.head.position
    }

    #[must_use]
    pub fn head_segment(&self) -> &Segment {
        &self.head
    }

    /// Body segments from the one nearest the head to the tail.
    #[must_use]
    pub fn body(&self) -> &[Segment] {
        &self.body
    }

    /// Number of body segments, excluding the head.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.current_direction
    }

    #[must_use]
    pub fn requested_direction(&self) -> Direction {
        self.requested_direction
    }

    #[must_use]
    pub fn reversal_credits(&self) -> u32 {
        self.reversal_credits
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.death_reason.is_none()
    }

    #[must_use]
    pub fn death_reason(&self) -> Option<DeathReason> {
        self.death_reason
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridConfig;
    use crate::input::Direction;

    use super::{DeathReason, Position, Snake};

    fn pos(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    fn positions(snake: &Snake) -> Vec<Position> {
        snake.body().iter().map(|s| s.position).collect()
    }

    #[test]
    fn snake_moves_one_cell_per_tick() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(100, 100), Direction::Down);

        assert!(snake.advance(config.tick_interval_ms, &config));

        assert_eq!(snake.head(), pos(100, 120));
        assert!(snake.is_empty());
        assert!(snake.is_alive());
    }

    #[test]
    fn sub_tick_time_is_carried_forward() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(100, 100), Direction::Right);

        assert!(!snake.advance(40, &config));
        assert!(!snake.advance(40, &config));
        assert_eq!(snake.head(), pos(100, 100));

        assert!(snake.advance(40, &config));
        assert_eq!(snake.head(), pos(120, 100));

        // The accumulator restarts from zero after a step.
        assert!(!snake.advance(60, &config));
    }

    #[test]
    fn body_follows_pre_step_positions() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(
            pos(100, 100),
            vec![pos(80, 100), pos(60, 100), pos(40, 100)],
            Direction::Right,
            0,
        );
        let before_head = snake.head();
        let before_body = positions(&snake);

        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.head(), pos(120, 100));
        assert_eq!(
            positions(&snake),
            vec![before_head, before_body[0], before_body[1]]
        );
    }

    #[test]
    fn perpendicular_and_same_direction_requests_apply_immediately() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(100, 100), Direction::Down);

        snake.request_direction(Direction::Left);
        snake.advance(config.tick_interval_ms, &config);
        assert_eq!(snake.direction(), Direction::Left);
        assert_eq!(snake.head(), pos(80, 100));

        snake.request_direction(Direction::Left);
        snake.advance(config.tick_interval_ms, &config);
        assert_eq!(snake.head(), pos(60, 100));
    }

    #[test]
    fn last_request_between_ticks_wins() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(100, 100), Direction::Down);

        snake.request_direction(Direction::Left);
        snake.request_direction(Direction::Right);
        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.head(), pos(120, 100));
    }

    #[test]
    fn reversal_spends_credit_and_swaps_head_with_tail() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(
            pos(100, 100),
            vec![pos(80, 100), pos(60, 100), pos(40, 100)],
            Direction::Right,
            1,
        );

        snake.request_direction(Direction::Left);
        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.reversal_credits(), 0);
        assert_eq!(snake.direction(), Direction::Left);
        assert_eq!(snake.len(), 3);
        // Old tail cell becomes the head's pre-move cell, then the head steps left.
        assert_eq!(snake.head(), pos(20, 100));
        assert_eq!(positions(&snake), vec![pos(40, 100), pos(60, 100), pos(80, 100)]);
        assert!(snake.is_alive());
    }

    #[test]
    fn reversal_without_credits_is_ignored_and_stays_queued() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(
            pos(100, 100),
            vec![pos(80, 100), pos(60, 100)],
            Direction::Right,
            0,
        );

        snake.request_direction(Direction::Left);
        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.reversal_credits(), 0);
        assert_eq!(snake.head(), pos(120, 100));
        assert_eq!(positions(&snake), vec![pos(100, 100), pos(80, 100)]);
        assert_eq!(snake.requested_direction(), Direction::Left);

        // A credit earned later makes the queued request take effect.
        snake.grow(0, 1);
        snake.advance(config.tick_interval_ms, &config);
        assert_eq!(snake.direction(), Direction::Left);
        assert_eq!(snake.reversal_credits(), 0);
    }

    #[test]
    fn reversal_with_empty_body_only_turns() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(pos(100, 100), Vec::new(), Direction::Up, 2);

        snake.request_direction(Direction::Down);
        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.reversal_credits(), 1);
        assert_eq!(snake.head(), pos(100, 120));
    }

    #[test]
    fn growth_appends_at_head_and_grants_credits() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(
            pos(100, 100),
            vec![pos(100, 80), pos(100, 60)],
            Direction::Down,
            0,
        );

        snake.grow(3, 2);
        assert_eq!(snake.len(), 5);
        assert_eq!(snake.reversal_credits(), 2);
        assert!(snake.body()[2..].iter().all(|s| s.position == pos(100, 100)));

        // New segments trail behind without killing the snake.
        snake.advance(config.tick_interval_ms, &config);
        assert!(snake.is_alive());
        assert_eq!(snake.len(), 5);
    }

    #[test]
    fn leaving_the_field_kills_the_snake() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(0, 100), Direction::Left);

        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.head(), pos(-20, 100));
        assert!(!snake.is_alive());
        assert_eq!(snake.death_reason(), Some(DeathReason::OutOfBounds));
    }

    #[test]
    fn running_into_own_body_kills_the_snake() {
        let config = GridConfig::default();
        let mut snake = Snake::from_parts(
            pos(100, 100),
            vec![
                pos(80, 100),
                pos(80, 120),
                pos(100, 120),
                pos(120, 120),
                pos(120, 100),
            ],
            Direction::Left,
            0,
        );
        snake.request_direction(Direction::Down);

        snake.advance(config.tick_interval_ms, &config);

        assert_eq!(snake.death_reason(), Some(DeathReason::SelfCollision));
    }

    #[test]
    fn dead_snake_is_frozen() {
        let config = GridConfig::default();
        let mut snake = Snake::new(pos(0, 0), Direction::Up);
        snake.advance(config.tick_interval_ms, &config);
        let frozen = snake.head();

        snake.request_direction(Direction::Down);
        assert!(!snake.advance(config.tick_interval_ms * 5, &config));
        assert_eq!(snake.head(), frozen);
    }

    #[test]
    fn occupied_cells_lists_head_first() {
        let snake = Snake::from_parts(pos(40, 40), vec![pos(20, 40)], Direction::Right, 0);

        let cells: Vec<_> = snake.occupied_cells().collect();
        assert_eq!(cells, vec![pos(40, 40), pos(20, 40)]);
        assert!(snake.occupies(pos(20, 40)));
        assert!(!snake.occupies(pos(0, 40)));
    }
}
