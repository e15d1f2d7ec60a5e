//! Town View - Gas Town status, agents, rigs and convoys
//!
//! Rendered as one scrollable page. Counts come from `stats` on every render.

use chrono::{DateTime, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{agent_status_color, work_status_color};
use crate::models::{Agent, Convoy, Rig, Town, TownStatus};
use crate::stats::{NO_RIGS_MESSAGE, agent_freshness, rig_agent_counts};

/// Scroll state for the Town view
#[derive(Debug, Default)]
pub struct TownView {
    scroll: u16,
}

impl TownView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    /// Render the view
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        town: Option<&Town>,
        status: Option<&TownStatus>,
        now: DateTime<Utc>,
    ) {
        let Some(town) = town else {
            let lines = vec![
                Line::from(""),
                Line::styled(
                    "Gas Town Not Found",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::styled(
                    "gvid could not locate a town root",
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            let missing = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Gas Town "));
            frame.render_widget(missing, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        frame.render_widget(status_bar(status), chunks[0]);

        let mut lines = Vec::new();
        lines.push(heading("Town"));
        for agent in town.town_agents() {
            lines.push(agent_line(agent, now));
        }

        lines.push(Line::from(""));
        lines.push(heading("Rigs"));
        if town.rigs.is_empty() {
            lines.push(Line::styled(
                format!("  {}", NO_RIGS_MESSAGE),
                Style::default().fg(Color::DarkGray),
            ));
        }
        for rig in &town.rigs {
            lines.extend(rig_lines(rig, now));
        }

        if !town.convoys.is_empty() {
            lines.push(Line::from(""));
            lines.push(heading("Convoys"));
            lines.extend(town.convoys.iter().map(convoy_line));
        }

        let title = format!(" {} ", town.name.as_deref().unwrap_or(&town.root));
        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(body, chunks[1]);
    }
}

fn heading(text: &str) -> Line<'static> {
    Line::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn status_bar(status: Option<&TownStatus>) -> Paragraph<'static> {
    let line = match status {
        Some(s) => {
            let (mark, color) = if s.healthy {
                ("● healthy", Color::Green)
            } else {
                ("○ unhealthy", Color::Red)
            };
            let mut spans = vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(format!(
                    "   agents {}/{} active   rigs {}   open convoys {}",
                    s.active_agents, s.total_agents, s.active_rigs, s.open_convoys
                )),
            ];
            if let Some(ref err) = s.error {
                spans.push(Span::styled(
                    format!("   {}", err),
                    Style::default().fg(Color::Red),
                ));
            }
            Line::from(spans)
        }
        None => Line::styled("status unavailable", Style::default().fg(Color::DarkGray)),
    };
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Status "))
}

fn agent_line(agent: &Agent, now: DateTime<Utc>) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("  {:<24} ", agent.address())),
        Span::styled(
            format!("{:<8}", agent.status.as_str()),
            Style::default().fg(agent_status_color(agent.status)),
        ),
    ];
    let age = agent_freshness(agent, now);
    if !age.is_empty() {
        spans.push(Span::styled(
            format!(" {}", age),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if agent.hook_attached {
        spans.push(Span::styled(" ⚓", Style::default().fg(Color::Magenta)));
    }
    Line::from(spans)
}

fn rig_lines(rig: &Rig, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("  {} ", rig.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            rig_agent_counts(rig).label(),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    for agent in rig.agents() {
        let mut line = agent_line(agent, now);
        line.spans.insert(0, Span::raw("  "));
        lines.push(line);
    }
    lines
}

fn convoy_line(convoy: &Convoy) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {} ", convoy.id), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} ", convoy.title)),
        Span::styled(
            format!("[{}] ", convoy.status),
            Style::default().fg(work_status_color(convoy.status)),
        ),
        Span::raw(format!("{}/{}", convoy.progress, convoy.total)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_now, sample_town};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_rig_header_shows_active_over_total() {
        let town = sample_town();
        let lines = rig_lines(&town.rigs[0], fixed_now());
        assert_eq!(text(&lines[0]).trim(), "gastown 2/4 active");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_agent_line_freshness_and_hook() {
        let town = sample_town();
        let mayor = town.mayor.as_ref().unwrap();
        let line = text(&agent_line(mayor, fixed_now()));
        assert!(line.contains("mayor/"));
        assert!(line.contains("active"));
        assert!(line.contains("2m ago"));

        let toast = &town.rigs[0].polecats[0];
        assert!(text(&agent_line(toast, fixed_now())).ends_with("⚓"));
    }

    #[test]
    fn test_convoy_line_progress() {
        let town = sample_town();
        let line = text(&convoy_line(&town.convoys[0]));
        assert!(line.contains("Dashboard MVP"));
        assert!(line.ends_with("2/5"));
    }

    fn screen(town: Option<&Town>) -> String {
        use ratatui::{Terminal, backend::TestBackend};

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let view = TownView::new();
        terminal
            .draw(|f| view.render(f, f.area(), town, None, fixed_now()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_empty_rigs_still_shows_town_agents() {
        let mut town = sample_town();
        town.rigs.clear();
        let text = screen(Some(&town));
        assert!(text.contains(NO_RIGS_MESSAGE));
        assert!(text.contains("mayor/"));
        assert!(text.contains("deacon/"));
        assert!(!text.contains("gastown"));
    }

    #[test]
    fn test_missing_town() {
        let text = screen(None);
        assert!(text.contains("Gas Town Not Found"));
    }

    #[test]
    fn test_scroll_is_bounded_at_top() {
        let mut view = TownView::new();
        view.scroll_up();
        assert_eq!(view.scroll(), 0);
        view.scroll_down();
        view.scroll_down();
        assert_eq!(view.scroll(), 2);
        view.scroll_top();
        assert_eq!(view.scroll(), 0);
    }
}
