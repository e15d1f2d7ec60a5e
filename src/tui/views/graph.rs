//! Graph View - dependency graph as a node list with the selected node's edges
//!
//! The graph is not polled. It is fetched when the tab is entered and on `r`,
//! and held here rather than in the snapshot.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::{priority_color, status_color};
use crate::models::{GraphNode, GraphResponse};

/// State for the Graph view
#[derive(Debug)]
pub struct GraphView {
    graph: Option<GraphResponse>,
    error: Option<String>,
    list_state: ListState,
}

impl GraphView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            graph: None,
            error: None,
            list_state,
        }
    }

    /// Whether a fetch has ever completed, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.graph.is_some() || self.error.is_some()
    }

    /// Replace the graph, keeping the selection in range.
    pub fn set_graph(&mut self, graph: GraphResponse) {
        let len = graph.nodes.len();
        self.graph = Some(graph);
        self.error = None;
        if len == 0 {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(selected));
        }
    }

    /// Record a failed fetch. A previously loaded graph stays visible.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn graph(&self) -> Option<&GraphResponse> {
        self.graph.as_ref()
    }

    pub fn selected_node(&self) -> Option<&GraphNode> {
        let graph = self.graph.as_ref()?;
        graph.nodes.get(self.list_state.selected()?)
    }

    fn len(&self) -> usize {
        self.graph.as_ref().map_or(0, |g| g.nodes.len())
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Move selection up
    pub fn select_previous(&mut self) {
        if self.len() == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Jump to top
    pub fn select_first(&mut self) {
        if self.len() > 0 {
            self.list_state.select(Some(0));
        }
    }

    /// Jump to bottom
    pub fn select_last(&mut self) {
        let len = self.len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Render the view
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(graph) = self.graph.as_ref() else {
            let (text, color) = match &self.error {
                Some(err) => (format!("Graph unavailable: {}", err), Color::Red),
                None => ("Loading graph...".to_string(), Color::DarkGray),
            };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Graph "));
            frame.render_widget(placeholder, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let mut title = format!(
            " Nodes ({}) · {} edges · depth {} ",
            graph.stats.node_count, graph.stats.edge_count, graph.stats.max_depth
        );
        if self.error.is_some() {
            title.push_str("(stale) ");
        }

        let items: Vec<ListItem> = graph
            .nodes
            .iter()
            .map(|node| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<12}", node.status.as_str()),
                        Style::default().fg(status_color(node.status)),
                    ),
                    Span::styled(
                        format!("{:<9}", node.priority.as_str()),
                        Style::default().fg(priority_color(node.priority)),
                    ),
                    Span::styled(format!("{} ", node.id), Style::default().fg(Color::DarkGray)),
                    Span::raw(&node.title),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let edges: Vec<Line> = match self.list_state.selected().and_then(|i| graph.nodes.get(i)) {
            Some(node) => {
                let lines: Vec<Line> = graph
                    .outgoing(&node.id)
                    .map(|edge| {
                        let target = graph
                            .node(&edge.to)
                            .map(|n| n.title.as_str())
                            .unwrap_or("(not in graph)");
                        Line::from(vec![
                            Span::styled(
                                format!("{} → ", edge.edge_type.as_str()),
                                Style::default().fg(Color::Cyan),
                            ),
                            Span::styled(
                                format!("{} ", edge.to),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(target.to_string()),
                        ])
                    })
                    .collect();
                if lines.is_empty() {
                    vec![Line::styled(
                        "No outgoing edges",
                        Style::default().fg(Color::DarkGray),
                    )]
                } else {
                    lines
                }
            }
            None => vec![Line::styled(
                "Graph is empty",
                Style::default().fg(Color::DarkGray),
            )],
        };

        let detail = Paragraph::new(edges)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Edges "));
        frame.render_widget(detail, chunks[1]);
    }
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_graph;

    #[test]
    fn test_not_loaded_until_fetched() {
        let mut view = GraphView::new();
        assert!(!view.is_loaded());
        assert!(view.selected_node().is_none());

        view.set_error("HTTP 503".to_string());
        assert!(view.is_loaded());
        assert!(view.graph().is_none());
    }

    #[test]
    fn test_selection_over_nodes() {
        let mut view = GraphView::new();
        view.set_graph(sample_graph());
        assert_eq!(view.selected_node().map(|n| n.id.as_str()), Some("gv-1"));

        view.select_next();
        view.select_next();
        assert_eq!(view.selected_node().map(|n| n.id.as_str()), Some("gv-4"));

        view.select_first();
        assert_eq!(view.selected_node().map(|n| n.id.as_str()), Some("gv-1"));
        view.select_last();
        assert_eq!(view.selected_node().map(|n| n.id.as_str()), Some("gv-4"));
    }

    #[test]
    fn test_error_keeps_previous_graph() {
        let mut view = GraphView::new();
        view.set_graph(sample_graph());
        view.set_error("HTTP 500".to_string());
        assert!(view.graph().is_some());

        view.set_graph(sample_graph());
        assert!(view.error.is_none());
    }

    #[test]
    fn test_empty_graph_clears_selection() {
        let mut view = GraphView::new();
        view.set_graph(GraphResponse::default());
        assert!(view.selected_node().is_none());
        view.select_next();
        assert!(view.selected_node().is_none());
    }
}
