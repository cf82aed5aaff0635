use ratatui::style::{Color, Modifier, Style};
use tad_core::AgentStatus;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const TEAM_STYLE: Style = Style::new().fg(Color::Cyan);
pub const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);

pub fn status_style(status: AgentStatus) -> Style {
    let color = match status {
        AgentStatus::Pending => Color::Yellow,
        AgentStatus::InProgress => Color::Blue,
        AgentStatus::Completed => Color::Green,
        AgentStatus::Error => Color::Red,
    };
    match status {
        AgentStatus::InProgress => Style::new().fg(color).add_modifier(Modifier::BOLD),
        _ => Style::new().fg(color),
    }
}

pub fn status_icon(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Pending => icons::PENDING,
        AgentStatus::InProgress => icons::IN_PROGRESS,
        AgentStatus::Completed => icons::COMPLETED,
        AgentStatus::Error => icons::ERROR,
    }
}

pub mod icons {
    pub const PENDING: &str = ".";
    pub const IN_PROGRESS: &str = ">";
    pub const COMPLETED: &str = "x";
    pub const ERROR: &str = "!";
}
