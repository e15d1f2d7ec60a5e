//! Issue Detail overlay - full issue drawn over the active tab
//!
//! Shows metadata, description, the done-when checklist and related issues.

use chrono::{DateTime, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{priority_color, status_color};
use crate::freshness::time_ago;
use crate::models::{Issue, IssueSummary};

/// Scroll state for the overlay; reset whenever a new issue opens.
#[derive(Debug, Default)]
pub struct IssueDetailView {
    scroll: u16,
    issue_id: Option<String>,
}

impl IssueDetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    /// Render the overlay centred in `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, issue: &Issue, now: DateTime<Utc>) {
        if self.issue_id.as_deref() != Some(issue.id.as_str()) {
            self.issue_id = Some(issue.id.clone());
            self.scroll = 0;
        }

        let popup = centered(area, 80, 80);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", issue.id))
            .title_bottom(Line::styled(
                " Esc:Close  j/k:Scroll ",
                Style::default().fg(Color::DarkGray),
            ));

        let body = Paragraph::new(issue_lines(issue, now))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(block);
        frame.render_widget(body, popup);
    }
}

fn bold(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn timestamp(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} ({})", at.format("%Y-%m-%d %H:%M"), time_ago(Some(at), now))
}

fn related(lines: &mut Vec<Line<'static>>, heading: &'static str, issues: &[IssueSummary]) {
    if issues.is_empty() {
        return;
    }
    lines.push(Line::from(""));
    lines.push(Line::from(bold(heading)));
    for summary in issues {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<12}", summary.status.as_str()),
                Style::default().fg(status_color(summary.status)),
            ),
            Span::styled(format!("{} ", summary.id), Style::default().fg(Color::DarkGray)),
            Span::raw(summary.title.clone()),
        ]));
    }
}

fn issue_lines(issue: &Issue, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![bold("Title: "), Span::raw(issue.title.clone())]),
        Line::from(vec![
            bold("Status: "),
            Span::styled(
                issue.status.to_string(),
                Style::default().fg(status_color(issue.status)),
            ),
            Span::raw("   "),
            bold("Priority: "),
            Span::styled(
                issue.priority.to_string(),
                Style::default().fg(priority_color(issue.priority)),
            ),
        ]),
    ];

    if let Some(ref parent) = issue.parent {
        lines.push(Line::from(vec![
            bold("Parent: "),
            Span::raw(format!("{} {}", parent.id, parent.title)),
        ]));
    }

    lines.push(Line::from(vec![
        bold("Created: "),
        Span::raw(timestamp(issue.created_at, now)),
        Span::raw("   "),
        bold("Updated: "),
        Span::raw(timestamp(issue.updated_at, now)),
    ]));

    if !issue.description.is_empty() {
        lines.push(Line::from(""));
        lines.extend(issue.description.lines().map(|l| Line::from(l.to_string())));
    }

    if !issue.done_when.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(bold("Done when")));
        for criterion in &issue.done_when {
            lines.push(Line::from(format!("  ☐ {}", criterion)));
        }
    }

    related(&mut lines, "Children", &issue.children);
    related(&mut lines, "Blocks", &issue.blocks);
    related(&mut lines, "Blocked by", &issue.blocked_by);
    lines
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
