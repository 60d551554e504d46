use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

/// Draws the start screen as a centered popup.
pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect, high_score: u32) {
    let popup = centered_popup(area, 80, 60);
    frame.render_widget(Clear, popup);

    let [title_row, body_row] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(popup);

    frame.render_widget(
        Paragraph::new(Line::from("CORAL"))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        title_row,
    );

    let body = vec![
        Line::from(format!("High score: {high_score}")),
        Line::from(""),
        Line::from("[Enter] Start"),
        Line::from("[C] Cell size  [E] Wrap  [H] Hard"),
        Line::from("[Q]/[Esc] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" start ")),
        body_row,
    );
}

/// Draws the pause screen as a centered popup.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect, text: Color) {
    let popup = centered_popup(area, 60, 30);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("PAUSED"),
        Line::from(""),
        Line::from("[P] Resume"),
        Line::from("[Q]/[Esc] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().fg(text))
            .block(Block::bordered().title(" pause ")),
        popup,
    );
}

/// Draws the instructions overlay.
pub fn render_instructions(frame: &mut Frame<'_>, area: Rect, text: Color) {
    let popup = centered_popup(area, 90, 70);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("Arrows / WASD  steer the snake"),
        Line::from("Red apples     grow and restore energy"),
        Line::from("Oranges        speed you up"),
        Line::from("Purple apples  shrink you, deadly with no tail"),
        Line::from("Brown blocks   are obstacles"),
        Line::from("Energy drains every move; empty means death"),
        Line::from(""),
        Line::from("[Space] Sprint on/off"),
        Line::from("[P] Pause  [M] Mute  [I] Close"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .style(Style::default().fg(text))
            .block(Block::bordered().title(" instructions ")),
        popup,
    );
}

/// Draws the short banner shown after a death while the game keeps running.
pub fn render_death_banner(
    frame: &mut Frame<'_>,
    area: Rect,
    score: u32,
    high_score: u32,
    new_record: bool,
    text: Color,
) {
    let popup = centered_popup(area, 60, 30);
    frame.render_widget(Clear, popup);

    let record_line = if new_record {
        format!("NEW Highscore: {high_score}")
    } else {
        format!("Highscore: {high_score}")
    };
    let lines = vec![
        Line::from("GAME OVER"),
        Line::from(""),
        Line::from(format!("Score: {score}")),
        Line::from(record_line),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().fg(text))
            .block(Block::bordered().title(" game over ")),
        popup,
    );
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}
