//! Board View - issue columns side by side
//!
//! One column per status, cards listed under each. `h`/`l` move between
//! columns, `j`/`k` within a column.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{priority_color, status_color};
use crate::models::{BoardResponse, IssueSummary};

/// Selection state for the Board view. The board itself lives in the snapshot.
#[derive(Debug, Default)]
pub struct BoardView {
    column: usize,
    row: usize,
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected (column, row), clamped to the current board.
    pub fn selection(&self, board: &BoardResponse) -> Option<(usize, usize)> {
        if board.columns.is_empty() {
            return None;
        }
        let column = self.column.min(board.columns.len() - 1);
        let issues = &board.columns[column].issues;
        if issues.is_empty() {
            return Some((column, 0));
        }
        Some((column, self.row.min(issues.len() - 1)))
    }

    /// The issue under the cursor, if the selected column has any.
    pub fn selected_issue<'a>(&self, board: &'a BoardResponse) -> Option<&'a IssueSummary> {
        let (column, row) = self.selection(board)?;
        board.columns[column].issues.get(row)
    }

    /// Move selection down
    pub fn select_next(&mut self, board: &BoardResponse) {
        if let Some((column, row)) = self.selection(board) {
            let len = board.columns[column].issues.len();
            self.column = column;
            self.row = (row + 1).min(len.saturating_sub(1));
        }
    }

    /// Move selection up
    pub fn select_previous(&mut self, board: &BoardResponse) {
        if let Some((column, row)) = self.selection(board) {
            self.column = column;
            self.row = row.saturating_sub(1);
        }
    }

    /// Jump to top
    pub fn select_first(&mut self) {
        self.row = 0;
    }

    /// Jump to bottom
    pub fn select_last(&mut self, board: &BoardResponse) {
        if let Some((column, _)) = self.selection(board) {
            self.column = column;
            self.row = board.columns[column].issues.len().saturating_sub(1);
        }
    }

    /// Move to the column on the right, keeping the row where possible.
    pub fn select_right(&mut self, board: &BoardResponse) {
        if let Some((column, _)) = self.selection(board) {
            self.column = (column + 1).min(board.columns.len() - 1);
        }
    }

    /// Move to the column on the left.
    pub fn select_left(&mut self, board: &BoardResponse) {
        if let Some((column, _)) = self.selection(board) {
            self.column = column.saturating_sub(1);
        }
    }

    /// Render the view
    pub fn render(&self, frame: &mut Frame, area: Rect, board: Option<&BoardResponse>) {
        let board = match board {
            Some(b) if !b.columns.is_empty() => b,
            _ => {
                let empty = Paragraph::new("No issues on the board")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(" Board "));
                frame.render_widget(empty, area);
                return;
            }
        };

        let selection = self.selection(board);
        let constraints: Vec<Constraint> = board
            .columns
            .iter()
            .map(|_| Constraint::Ratio(1, board.columns.len() as u32))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (index, (column, chunk)) in board.columns.iter().zip(chunks.iter()).enumerate() {
            let focused = selection.is_some_and(|(c, _)| c == index);
            let border_style = if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(
                    format!(" {} ({}) ", column.display_label(), column.count),
                    Style::default()
                        .fg(status_color(column.status))
                        .add_modifier(Modifier::BOLD),
                ));

            let items: Vec<ListItem> = column
                .issues
                .iter()
                .map(|issue| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                format!("{} ", issue.priority.as_str()),
                                Style::default().fg(priority_color(issue.priority)),
                            ),
                            Span::styled(&issue.id, Style::default().fg(Color::DarkGray)),
                        ]),
                        Line::from(Span::raw(&issue.title)),
                    ])
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

            let mut state = ListState::default();
            if focused {
                state.select(selection.map(|(_, row)| row));
            }
            frame.render_stateful_widget(list, *chunk, &mut state);
        }
    }
}
