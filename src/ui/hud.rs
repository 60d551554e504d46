use std::time::{Duration, Instant};

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use crate::config::CellSize;
use crate::energy::EnergyResource;

const PICKUP_FLASH_DURATION: Duration = Duration::from_millis(400);

/// Values displayed by the HUD rows.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub score: u32,
    pub high_score: u32,
    pub energy: EnergyResource,
    pub speed_multiplier: f32,
    pub sprinting: bool,
    pub deaths: u32,
    pub cell_size: CellSize,
    pub border_wrap: bool,
    pub hard_mode: bool,
    pub muted: bool,
    /// Wall-clock instant of this frame render.
    pub now: Instant,
    /// When the last pickup sound was requested.
    pub pickup_at: Option<Instant>,
}

/// Renders the energy gauge and status lines, returning the remaining board area.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: &HudInfo) -> Rect {
    let [energy_area, score_area, board_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let energy = info.energy;
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(energy_color(energy)).bg(Color::Red))
            .ratio(energy.fraction().clamp(0.0, 1.0))
            .label(format!("Energy: {} / {}", energy.value(), energy.max())),
        energy_area,
    );

    frame.render_widget(
        Paragraph::new(score_line(info)).alignment(Alignment::Center),
        score_area,
    );

    frame.render_widget(
        Paragraph::new(status_line(info))
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        status_area,
    );

    board_area
}

fn score_line(info: &HudInfo) -> Line<'static> {
    let flashing = info
        .pickup_at
        .is_some_and(|at| info.now.saturating_duration_since(at) < PICKUP_FLASH_DURATION);
    let score_color = if flashing { Color::Yellow } else { Color::White };

    Line::from(vec![
        Span::raw("Score: "),
        Span::styled(info.score.to_string(), Style::default().fg(score_color)),
        Span::raw("   Hi: "),
        Span::styled(info.high_score.to_string(), Style::default().fg(Color::Gray)),
        Span::raw(format!("   Speed: {:.2}x", info.speed_multiplier)),
        Span::styled(
            if info.sprinting { "  SPRINT" } else { "" },
            Style::default().fg(Color::Cyan),
        ),
    ])
}

fn status_line(info: &HudInfo) -> String {
    let size = match info.cell_size {
        CellSize::Large => "large",
        CellSize::Medium => "medium",
        CellSize::Small => "small",
    };
    let flag = |on: bool| if on { "on" } else { "off" };

    format!(
        "cells: {size} | wrap: {} | hard: {} | sound: {} | deaths: {} | [I] help",
        flag(info.border_wrap),
        flag(info.hard_mode),
        flag(!info.muted),
        info.deaths,
    )
}

fn energy_color(energy: EnergyResource) -> Color {
    if energy.fraction() < 0.25 {
        Color::Yellow
    } else {
        Color::Rgb(0, 153, 0)
    }
}
