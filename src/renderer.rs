use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::GridConfig;
use crate::food::RewardTier;
use crate::game::Snapshot;
use crate::snake::{DeathReason, Position, Segment, SegmentTag};

/// Terminal columns used per grid cell; two keeps cells roughly square.
const CELL_COLUMNS: u16 = 2;

const GLYPH_SEGMENT: &str = "██";
const GLYPH_FOOD: &str = "()";

const COLOR_HEAD: Color = Color::Yellow;
const COLOR_BODY: Color = Color::LightGreen;
const COLOR_BORDER: Color = Color::DarkGray;
const COLOR_HUD: Color = Color::White;

/// Renders one frame from an immutable snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot, config: &GridConfig) {
    let [play_area, hud_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

    let block = Block::bordered().border_style(Style::new().fg(COLOR_BORDER));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, snapshot, config);
    render_snake(frame, inner, snapshot, config);
    render_hud(frame, hud_area, snapshot);

    if !snapshot.alive {
        render_game_over(frame, play_area, snapshot);
    }
}

/// Display color for a food tier.
#[must_use]
pub fn food_color(tier: RewardTier) -> Color {
    match tier {
        RewardTier::Common => Color::Red,
        RewardTier::Uncommon => Color::Blue,
        RewardTier::Rare => Color::Rgb(255, 215, 0),
    }
}

fn segment_style(segment: &Segment) -> Style {
    match segment.tag {
        SegmentTag::Head => Style::new().fg(COLOR_HEAD).add_modifier(Modifier::BOLD),
        SegmentTag::Body => Style::new().fg(COLOR_BODY),
    }
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, config: &GridConfig) {
    let buffer = frame.buffer_mut();
    for item in snapshot.food.iter().filter(|item| item.active) {
        let Some((x, y)) = grid_to_terminal(inner, config, item.position) else {
            continue;
        };
        buffer.set_string(x, y, GLYPH_FOOD, Style::new().fg(food_color(item.tier)));
    }
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, config: &GridConfig) {
    let buffer = frame.buffer_mut();

    // Tail first so the head is drawn on top of stacked fresh segments.
    for segment in snapshot.body.iter().rev().chain(std::iter::once(&snapshot.head)) {
        let Some((x, y)) = grid_to_terminal(inner, config, segment.position) else {
            continue;
        };
        buffer.set_string(x, y, GLYPH_SEGMENT, segment_style(segment));
    }
}

fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &Snapshot) {
    let line = Line::from(vec![
        Span::styled(format!(" Length {}", snapshot.score), Style::new().fg(COLOR_HUD)),
        Span::raw("   "),
        Span::styled(
            format!("Reversals {}", snapshot.reversal_credits),
            Style::new().fg(food_color(RewardTier::Rare)),
        ),
        Span::raw("   "),
        Span::styled("arrows/wasd move · q quit", Style::new().fg(COLOR_BORDER)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_game_over(frame: &mut Frame<'_>, play_area: Rect, snapshot: &Snapshot) {
    let reason = match snapshot.death_reason {
        Some(DeathReason::OutOfBounds) => "left the field",
        Some(DeathReason::SelfCollision) => "bit its own tail",
        None => "stopped",
    };
    let lines = vec![
        Line::from(Span::styled(
            "GAME OVER",
            Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("The snake {reason}.")),
        Line::from(format!("Final length: {}", snapshot.score)),
        Line::from("Press q to quit"),
    ];

    let area = centered(play_area, 30, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered()),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Maps a field position to the terminal cell of its left glyph column.
fn grid_to_terminal(inner: Rect, config: &GridConfig, position: Position) -> Option<(u16, u16)> {
    let (column, row) = config.cell_index(position)?;

    let x = inner.x.saturating_add(column.saturating_mul(CELL_COLUMNS));
    let y = inner.y.saturating_add(row);
    if x.saturating_add(CELL_COLUMNS) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use crate::config::GridConfig;
    use crate::game::World;
    use crate::input::Direction;
    use crate::snake::{Position, Snake};

    use super::{grid_to_terminal, render};

    #[test]
    fn positions_map_to_double_width_cells() {
        let config = GridConfig::default();
        let inner = Rect::new(1, 1, 80, 30);

        assert_eq!(grid_to_terminal(inner, &config, Position { x: 0, y: 0 }), Some((1, 1)));
        assert_eq!(
            grid_to_terminal(inner, &config, Position { x: 100, y: 40 }),
            Some((11, 3))
        );
        assert_eq!(grid_to_terminal(inner, &config, Position { x: -20, y: 0 }), None);
    }

    #[test]
    fn cells_that_do_not_fit_are_skipped() {
        let config = GridConfig::default();
        let inner = Rect::new(0, 0, 10, 5);

        assert_eq!(grid_to_terminal(inner, &config, Position { x: 100, y: 0 }), None);
        assert_eq!(grid_to_terminal(inner, &config, Position { x: 0, y: 100 }), None);
    }

    #[test]
    fn render_draws_head_and_game_over_banner() {
        let config = GridConfig::default();
        let mut world = World::new_with_seed(config, 9).expect("valid config");
        world.snake = Snake::new(Position { x: 0, y: 0 }, Direction::Up);
        world.tick(config.tick_interval_ms);

        let mut terminal = Terminal::new(TestBackend::new(84, 33)).expect("test terminal");
        let snapshot = world.snapshot();
        terminal
            .draw(|frame| render(frame, &snapshot, &config))
            .expect("draw should succeed");

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Length 0"));
    }
}
