use crate::driver::Renderer;
use crate::theme;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;
use tad_core::{Snapshot, Team};

const MESSAGE_ROWS: usize = 12;

/// Renderer drawing to the real terminal through ratatui.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalRenderer {
    pub fn new(terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Self {
        Self { terminal }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.terminal.draw(|frame| render(frame, snapshot))?;
        Ok(())
    }
}

/// Pure layout pass: snapshot in, widgets out. Never mutates the snapshot.
pub fn render(frame: &mut Frame, snapshot: &Snapshot) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, outer[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[1]);
    let upper = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main[0]);

    render_progress(frame, upper[0], snapshot);
    render_messages(frame, upper[1], snapshot);
    render_report(frame, main[1], snapshot);
    render_footer(frame, outer[2], snapshot);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        "Trading Agents — live analysis",
        theme::HEADER_STYLE,
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_progress(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let mut rows = Vec::new();
    for team in Team::ALL {
        let members: Vec<_> = team
            .members()
            .iter()
            .filter(|agent| snapshot.agents.contains_key(agent))
            .collect();
        for (index, agent) in members.iter().enumerate() {
            let team_label = if index == 0 { team.label() } else { "" };
            let status = snapshot
                .status(**agent)
                .unwrap_or_default();
            rows.push(Row::new(vec![
                Cell::from(Span::styled(team_label, theme::TEAM_STYLE)),
                Cell::from(agent.label()),
                Cell::from(Span::styled(
                    format!("{} {}", theme::status_icon(status), status),
                    theme::status_style(status),
                )),
            ]));
        }
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(22),
            Constraint::Min(14),
        ],
    )
    .header(Row::new(vec!["Team", "Agent", "Status"]).style(theme::HEADER_STYLE))
    .block(Block::default().borders(Borders::ALL).title("Progress"));
    frame.render_widget(table, area);
}

fn render_messages(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let mut entries: Vec<(String, String, String)> = Vec::new();
    for call in &snapshot.tool_calls {
        let args = serde_json::Value::Object(call.args.clone()).to_string();
        entries.push((
            call.timestamp.clone(),
            "Tool".to_string(),
            format!("{}: {}", call.tool_name, args),
        ));
    }
    for message in &snapshot.messages {
        entries.push((
            message.timestamp.clone(),
            message.category.clone(),
            message.content.clone(),
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let skip = entries.len().saturating_sub(MESSAGE_ROWS);

    let rows: Vec<Row> = entries
        .into_iter()
        .skip(skip)
        .map(|(timestamp, category, content)| {
            Row::new(vec![
                Cell::from(Span::styled(timestamp, theme::DIM_STYLE)),
                Cell::from(category),
                Cell::from(content.replace('\n', " ")),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .header(Row::new(vec!["Time", "Type", "Content"]).style(theme::HEADER_STYLE))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Messages & Tools"),
    );
    frame.render_widget(table, area);
}

fn render_report(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let body = match &snapshot.current_report {
        Some(report) => Paragraph::new(report.as_str()),
        None => Paragraph::new(Span::styled("Waiting for report...", theme::DIM_STYLE)),
    };
    let panel = body
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Current Report"));
    frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let current = snapshot
        .current_agent
        .map(|agent| agent.label())
        .unwrap_or("-");
    let footer = Line::from(vec![
        Span::styled("current: ", theme::DIM_STYLE),
        Span::raw(current),
        Span::styled("   q to quit", theme::DIM_STYLE),
    ]);
    frame.render_widget(Paragraph::new(footer).style(Style::default()), area);
}
