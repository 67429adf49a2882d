use pai_core::{Phase, Status};
use ratatui::style::{Color, Modifier, Style};

pub const TITLE: Color = Color::Rgb(122, 162, 247);
pub const RUNNING: Color = Color::Rgb(224, 175, 104);
pub const IDLE: Color = Color::Rgb(158, 206, 106);
pub const PAUSED: Color = Color::Rgb(125, 207, 255);
pub const ERROR: Color = Color::Rgb(247, 118, 142);
pub const STOPPED: Color = Color::Rgb(86, 95, 137);
pub const BORDER: Color = Color::Rgb(59, 66, 97);
pub const FG: Color = Color::Rgb(192, 202, 245);
pub const DIM: Color = Color::Rgb(86, 95, 137);
pub const SELECTED_BG: Color = Color::Rgb(40, 52, 87);
pub const ACCENT: Color = Color::Rgb(187, 154, 247);
pub const BAR_FILL: Color = Color::Rgb(158, 206, 106);
pub const BAR_EMPTY: Color = Color::Rgb(26, 27, 38);

/// Throughput below this is tinted as slow.
pub const SLOW_TPS: f64 = 50.0;

pub const HEADER_STYLE: Style = Style::new().fg(FG).add_modifier(Modifier::BOLD);
pub const TITLE_STYLE: Style = Style::new().fg(TITLE).add_modifier(Modifier::BOLD);
pub const LABEL_STYLE: Style = Style::new().fg(FG).add_modifier(Modifier::BOLD);
pub const DIM_STYLE: Style = Style::new().fg(DIM);
pub const BORDER_STYLE: Style = Style::new().fg(BORDER);
pub const SELECTED_STYLE: Style = Style::new().bg(SELECTED_BG);

/// Presentation of one enum variant. Every glyph occupies a single cell so
/// column math can count chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Look {
    pub label: &'static str,
    pub color: Color,
    pub icon: &'static str,
}

pub fn status_look(status: Status) -> Look {
    match status {
        Status::Running => Look {
            label: "Running",
            color: RUNNING,
            icon: "●",
        },
        Status::Idle => Look {
            label: "Idle",
            color: IDLE,
            icon: "✓",
        },
        Status::Paused => Look {
            label: "Paused",
            color: PAUSED,
            icon: "‖",
        },
        Status::Error => Look {
            label: "Error",
            color: ERROR,
            icon: "✗",
        },
        Status::Stopped => Look {
            label: "Stopped",
            color: STOPPED,
            icon: "■",
        },
    }
}

pub fn phase_look(phase: Phase) -> Look {
    let icon = match phase {
        Phase::Observe => "○",
        Phase::Think => "◇",
        Phase::Plan => "≡",
        Phase::Build => "▣",
        Phase::Execute => "»",
        Phase::Verify => "✔",
        Phase::Learn => "✎",
        Phase::Done => "■",
    };
    let color = if phase.is_done() { IDLE } else { ACCENT };
    Look {
        label: phase.as_str(),
        color,
        icon,
    }
}

pub fn status_style(status: Status) -> Style {
    Style::new().fg(status_look(status).color)
}

pub mod icons {
    pub const BRAND: &str = "◆";
    pub const ARROW: &str = "→";
    pub const CURRENT: &str = "▶";
    pub const PASS: &str = "✓";
    pub const FAIL: &str = "✗";
    pub const SIGMA: &str = "Σ";
    pub const REFRESH: &str = "⟳";
    pub const ELLIPSIS: &str = "…";
    pub const BAR_FILLED: &str = "█";
    pub const BAR_EMPTY: &str = "░";
    pub const SEPARATOR: &str = "│";
}

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_single_cell_icon() {
        for status in Status::ALL {
            assert_eq!(status_look(status).icon.chars().count(), 1);
            assert_eq!(status_look(status).label, status.as_str());
        }
        for phase in Phase::WORK.into_iter().chain([Phase::Done]) {
            assert_eq!(phase_look(phase).icon.chars().count(), 1);
        }
    }

    #[test]
    fn spinner_wraps() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER.len()));
    }
}
