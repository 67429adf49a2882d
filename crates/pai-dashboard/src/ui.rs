use crate::keymap;
use crate::theme::{self, icons};
use chrono::Duration;
use pai_core::{clock_label, Agent, DashboardView, Phase, Status};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

/// Width assumed before the terminal reports its size.
pub const DEFAULT_WIDTH: usize = 140;
const MIN_PROCESS_WIDTH: usize = 15;
/// Gutter budget subtracted alongside the fixed columns.
const COLUMN_GAPS: usize = 10;
const PROGRESS_SUFFIX_WIDTH: usize = 5;
const MIN_PROGRESS_WIDTH: usize = 8;
const MIN_BAR_WIDTH: usize = 4;
const DETAIL_PROGRESS_WIDTH: usize = 20;
const RECENT_EVENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub id: usize,
    pub name: usize,
    pub status: usize,
    pub phase: usize,
    pub progress: usize,
    pub tps: usize,
    pub uptime: usize,
    pub process: usize,
}

impl Columns {
    const ID: usize = 11;
    const NAME: usize = 16;
    const STATUS: usize = 9;
    const PHASE: usize = 9;
    const PROGRESS: usize = 16;
    const TPS: usize = 8;
    const UPTIME: usize = 8;

    /// Fixed columns keep their width; the process column takes what is left,
    /// never dropping below its floor.
    pub fn for_width(width: usize) -> Self {
        let fixed = Self::ID
            + Self::NAME
            + Self::STATUS
            + Self::PHASE
            + Self::PROGRESS
            + Self::TPS
            + Self::UPTIME;
        let process = width
            .saturating_sub(fixed + COLUMN_GAPS)
            .max(MIN_PROCESS_WIDTH);
        Self {
            id: Self::ID,
            name: Self::NAME,
            status: Self::STATUS,
            phase: Self::PHASE,
            progress: Self::PROGRESS,
            tps: Self::TPS,
            uptime: Self::UPTIME,
            process,
        }
    }
}

pub fn draw(frame: &mut Frame, view: &DashboardView<'_>) {
    let area = frame.size();
    let paragraph = Paragraph::new(Text::from(frame_lines(view)));
    frame.render_widget(paragraph, area);
}

/// Lays out one full frame. Pure: reads the view and nothing else.
pub fn frame_lines(view: &DashboardView<'_>) -> Vec<Line<'static>> {
    let width = effective_width(view.view.width);

    if view.view.loading {
        let message = format!(
            "{}  Connecting to PAI orchestration layer...",
            theme::spinner_frame(view.view.spinner_frame)
        );
        return centered_message(message, Style::new().fg(theme::TITLE), width, view.view.height);
    }
    if view.agents.is_empty() {
        return centered_message(
            "No agents active.".to_string(),
            theme::DIM_STYLE,
            width,
            view.view.height,
        );
    }

    let mut lines = title_lines(view, width);
    lines.extend(table_lines(view, width));
    if view.view.detail_open {
        if let Some(agent) = view.selected_agent() {
            lines.extend(detail_lines(agent, view, width));
        }
    }
    lines.extend(status_bar_lines(view, width));
    lines.push(help_line(width));
    lines
}

/// Flattens styled lines to text, trailing blanks removed.
pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
            text.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn effective_width(width: u16) -> usize {
    if width == 0 {
        DEFAULT_WIDTH
    } else {
        width as usize
    }
}

fn centered_message(message: String, style: Style, width: usize, height: u16) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = (0..(height as usize).saturating_sub(1) / 2)
        .map(|_| Line::from(""))
        .collect();
    lines.push(Line::from(Span::styled(center(&message, width), style)));
    lines
}

fn title_lines(view: &DashboardView<'_>, width: usize) -> Vec<Line<'static>> {
    let inner = width.saturating_sub(2);
    let title = format!(
        "{} PAI Agent Dashboard v{}  {sep}  {} agents  {sep}  {}",
        icons::BRAND,
        env!("CARGO_PKG_VERSION"),
        view.agents.len(),
        clock_label(view.now),
        sep = icons::SEPARATOR,
    );
    vec![
        Line::from(Span::styled(
            format!("╭{}╮", "─".repeat(inner)),
            theme::BORDER_STYLE,
        )),
        Line::from(vec![
            Span::styled("│", theme::BORDER_STYLE),
            Span::styled(center(&title, inner), theme::TITLE_STYLE),
            Span::styled("│", theme::BORDER_STYLE),
        ]),
        Line::from(Span::styled(
            format!("╰{}╯", "─".repeat(inner)),
            theme::BORDER_STYLE,
        )),
    ]
}

fn table_lines(view: &DashboardView<'_>, width: usize) -> Vec<Line<'static>> {
    let cols = Columns::for_width(width);
    let header = format!(
        " {:<id$} {:<name$} {:<status$} {:<phase$} {:<progress$} {:<tps$} {:<uptime$} {:<process$}",
        "AGENT ID",
        "NAME",
        "STATUS",
        "PHASE",
        "PROGRESS",
        "TOK/S",
        "UPTIME",
        "CURRENT PROCESS",
        id = cols.id,
        name = cols.name,
        status = cols.status,
        phase = cols.phase,
        progress = cols.progress,
        tps = cols.tps,
        uptime = cols.uptime,
        process = cols.process,
    );
    let mut lines = vec![Line::from(Span::styled(
        header,
        theme::HEADER_STYLE.add_modifier(Modifier::UNDERLINED),
    ))];

    for (index, agent) in view.agents.iter().enumerate() {
        let mut spans = row_spans(agent, view, &cols);
        if index == view.view.selected {
            let used = spans_width(&spans);
            if used < width {
                spans.push(Span::raw(" ".repeat(width - used)));
            }
            for span in &mut spans {
                span.style = span.style.patch(theme::SELECTED_STYLE);
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn row_spans(agent: &Agent, view: &DashboardView<'_>, cols: &Columns) -> Vec<Span<'static>> {
    let look = theme::status_look(agent.status);
    let running = agent.status == Status::Running;

    let phase = if running && agent.phase < Phase::Done {
        let phase_look = theme::phase_look(agent.phase);
        Span::styled(
            pad(&format!("{} {}", phase_look.icon, agent.phase.short()), cols.phase),
            Style::new().fg(phase_look.color).add_modifier(Modifier::BOLD),
        )
    } else if agent.phase.is_done() {
        let done = theme::phase_look(Phase::Done);
        Span::styled(
            pad(&format!("{} {}", done.icon, done.label), cols.phase),
            Style::new().fg(done.color),
        )
    } else {
        Span::styled(pad("--", cols.phase), theme::DIM_STYLE)
    };

    let progress = if agent.status == Status::Stopped {
        vec![Span::styled(pad("   --", cols.progress), theme::DIM_STYLE)]
    } else {
        progress_bar(agent.progress, cols.progress)
    };

    let tps = if running && agent.tokens_per_sec > 0.0 {
        let color = if agent.tokens_per_sec < theme::SLOW_TPS {
            theme::RUNNING
        } else {
            theme::IDLE
        };
        Span::styled(
            pad(&format!("{:.0}", agent.tokens_per_sec), cols.tps),
            Style::new().fg(color),
        )
    } else {
        Span::styled(pad("--", cols.tps), theme::DIM_STYLE)
    };

    let uptime = agent
        .uptime(view.now)
        .map(format_duration)
        .unwrap_or_else(|| "--".to_string());

    let (process, process_style) = match agent.status {
        Status::Running => (
            format!(
                "{} {} {}",
                agent.current_tool,
                icons::ARROW,
                agent.last_activity
            ),
            Style::new().fg(theme::FG),
        ),
        Status::Paused => (
            format!("{} Awaiting input", look.icon),
            Style::new().fg(look.color),
        ),
        Status::Error => (
            format!("{} Error - see detail", look.icon),
            Style::new().fg(look.color),
        ),
        Status::Idle | Status::Stopped => ("--".to_string(), theme::DIM_STYLE),
    };
    let process = Span::styled(ellipsize(&process, cols.process), process_style);

    let mut spans = vec![
        Span::raw(format!(" {} ", pad(agent.id.as_str(), cols.id))),
        Span::raw(format!("{} ", pad(&agent.name, cols.name))),
        Span::styled(pad(look.label, cols.status), theme::status_style(agent.status)),
        Span::raw(" "),
        phase,
        Span::raw(" "),
    ];
    spans.extend(progress);
    spans.push(Span::raw(" "));
    spans.push(tps);
    spans.push(Span::raw(format!(" {} ", pad(&uptime, cols.uptime))));
    spans.push(process);
    spans
}

fn detail_lines(agent: &Agent, view: &DashboardView<'_>, width: usize) -> Vec<Line<'static>> {
    let half = width.saturating_sub(8) / 2;
    let look = theme::status_look(agent.status);
    let phase_look = theme::phase_look(agent.phase);
    let uptime = agent
        .uptime(view.now)
        .map(format_duration)
        .unwrap_or_else(|| "--".to_string());

    let mut body = vec![Line::from(Span::styled(
        format!("Agent Detail: {}", agent.id),
        theme::TITLE_STYLE,
    ))];

    let left: [Vec<Span<'static>>; 4] = [
        labelled("Type:", vec![Span::raw(agent.name.clone())]),
        labelled("Model:", vec![Span::raw(agent.model.name)]),
        labelled(
            "Status:",
            vec![Span::styled(look.label, theme::status_style(agent.status))],
        ),
        labelled(
            "Phase:",
            vec![Span::raw(format!("{} {}", phase_look.icon, phase_look.label))],
        ),
    ];
    let right: [Vec<Span<'static>>; 4] = [
        labelled("Uptime:", vec![Span::raw(uptime)]),
        labelled("Task:", vec![Span::raw(agent.task.clone())]),
        labelled("Tools used:", vec![Span::raw(agent.tools_used.to_string())]),
        labelled("Progress:", progress_bar(agent.progress, DETAIL_PROGRESS_WIDTH)),
    ];
    for (l, r) in left.into_iter().zip(right) {
        let mut spans = fit_spans(l, half);
        spans.extend(fit_spans(r, half));
        body.push(Line::from(spans));
    }

    body.push(Line::from(Span::styled("Token Metrics", theme::TITLE_STYLE)));
    body.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Throughput:", theme::LABEL_STYLE),
        Span::raw(format!(" {:.1} tok/s   ", agent.tokens_per_sec)),
        Span::styled("Input:", theme::LABEL_STYLE),
        Span::raw(format!(" {} in   ", format_tokens(agent.tokens_in))),
        Span::styled("Output:", theme::LABEL_STYLE),
        Span::raw(format!(" {} out   ", format_tokens(agent.tokens_out))),
        Span::styled("Total:", theme::LABEL_STYLE),
        Span::raw(format!(" {} total", format_tokens(agent.tokens_total()))),
    ]));

    body.push(Line::from(Span::styled("Phase Timeline", theme::TITLE_STYLE)));
    body.push(Line::from(phase_timeline(agent.phase)));

    body.push(Line::from(Span::styled("ISC Criteria", theme::TITLE_STYLE)));
    for criterion in &agent.criteria {
        let (marker, color) = if criterion.passed {
            (icons::PASS, theme::IDLE)
        } else {
            (icons::FAIL, theme::ERROR)
        };
        body.push(Line::from(vec![
            Span::styled(format!("  {marker} "), Style::new().fg(color)),
            Span::raw(criterion.text.clone()),
        ]));
    }
    body.push(Line::from(Span::styled(
        format!(
            "  [{}/{} passed]",
            agent.criteria_passed(),
            agent.criteria.len()
        ),
        theme::DIM_STYLE,
    )));

    body.push(Line::from(Span::styled("Recent Events", theme::TITLE_STYLE)));
    for entry in agent.events.recent(RECENT_EVENTS) {
        body.push(Line::from(vec![
            Span::styled("  ", theme::DIM_STYLE),
            Span::raw(entry.to_string()),
        ]));
    }

    boxed(body, width.saturating_sub(2))
}

fn phase_timeline(current: Phase) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw("  ")];
    for (index, phase) in Phase::WORK.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(format!(" {} ", icons::ARROW), theme::DIM_STYLE));
        }
        let look = theme::phase_look(phase);
        let label = format!("{} {}", look.icon, phase.short());
        let span = if phase < current {
            Span::styled(label, Style::new().fg(theme::IDLE))
        } else if phase == current {
            Span::styled(
                format!("{}{label}", icons::CURRENT),
                Style::new().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, theme::DIM_STYLE)
        };
        spans.push(span);
    }
    spans
}

fn status_bar_lines(view: &DashboardView<'_>, width: usize) -> Vec<Line<'static>> {
    let mut counts = [0usize; 5];
    let mut total_tps = 0.0;
    for agent in view.agents {
        if let Some(slot) = Status::ALL.iter().position(|s| *s == agent.status) {
            counts[slot] += 1;
        }
        total_tps += agent.tokens_per_sec;
    }

    let separator = || Span::styled(format!("  {}  ", icons::SEPARATOR), theme::DIM_STYLE);
    let mut left = vec![Span::raw(format!("Agents: {}", view.agents.len()))];
    for (status, count) in Status::ALL.into_iter().zip(counts) {
        let look = theme::status_look(status);
        let noun = match status {
            Status::Error => "err",
            _ => look.label,
        };
        left.push(separator());
        left.push(Span::styled(
            format!("{} {count} {}", look.icon, noun.to_lowercase()),
            Style::new().fg(look.color),
        ));
    }
    left.push(separator());
    left.push(Span::raw(format!("{} {:.0} tok/s", icons::SIGMA, total_tps)));

    let right = format!("{} {}", icons::REFRESH, clock_label(view.view.last_refresh));
    let gap = status_gap(width, spans_width(&left), right.chars().count());

    let mut content = vec![Span::raw(" ")];
    content.extend(left);
    content.push(Span::raw(" ".repeat(gap)));
    content.push(Span::styled(right, theme::DIM_STYLE));

    vec![
        Line::from(Span::styled(
            "─".repeat(width.saturating_sub(2)),
            theme::BORDER_STYLE,
        )),
        Line::from(content),
    ]
}

/// Padding between the aggregate counts and the refresh stamp.
pub fn status_gap(width: usize, left: usize, right: usize) -> usize {
    width.saturating_sub(left + right + 4).max(1)
}

fn help_line(width: usize) -> Line<'static> {
    let text = keymap::HELP
        .iter()
        .map(|(keys, command)| format!("{keys} {}", command.label()))
        .collect::<Vec<_>>()
        .join(" • ");
    Line::from(Span::styled(center(&text, width), theme::DIM_STYLE))
}

/// Filled/empty bar plus a fixed ` NNN%` suffix.
pub fn progress_bar(pct: u8, width: usize) -> Vec<Span<'static>> {
    let pct = pct.min(100) as usize;
    let width = width.max(MIN_PROGRESS_WIDTH);
    let bar = width
        .saturating_sub(PROGRESS_SUFFIX_WIDTH)
        .max(MIN_BAR_WIDTH);
    let filled = bar * pct / 100;
    vec![
        Span::styled(icons::BAR_FILLED.repeat(filled), Style::new().fg(theme::BAR_FILL)),
        Span::styled(
            icons::BAR_EMPTY.repeat(bar - filled),
            Style::new().fg(theme::BAR_EMPTY),
        ),
        Span::styled(format!(" {pct:>3}%"), Style::new().fg(theme::FG)),
    ]
}

pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::zero() {
        return "--".to_string();
    }
    let minutes = duration.num_minutes();
    let seconds = duration.num_seconds() % 60;
    if minutes > 0 {
        format!("{minutes}m{seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Cuts text that would not leave a spare cell in a column of `width`.
pub fn ellipsize(input: &str, width: usize) -> String {
    if input.chars().count() <= width.saturating_sub(1) {
        return input.to_string();
    }
    let prefix: String = input.chars().take(width.saturating_sub(2)).collect();
    format!("{prefix}{}", icons::ELLIPSIS)
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(width - len - left))
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

fn labelled(label: &'static str, value: Vec<Span<'static>>) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(label, theme::LABEL_STYLE), Span::raw(" ")];
    spans.extend(value);
    spans
}

/// Truncates with an ellipsis or pads so the spans occupy exactly `width` cells.
fn fit_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let total = spans_width(&spans);
    if total <= width {
        let mut spans = spans;
        spans.push(Span::raw(" ".repeat(width - total)));
        return spans;
    }
    let mut budget = width.saturating_sub(1);
    let mut fitted = Vec::new();
    for span in spans {
        if budget == 0 {
            break;
        }
        let len = span.content.chars().count();
        if len <= budget {
            budget -= len;
            fitted.push(span);
        } else {
            let cut: String = span.content.chars().take(budget).collect();
            fitted.push(Span::styled(cut, span.style));
            budget = 0;
        }
    }
    if width > 0 {
        fitted.push(Span::raw(icons::ELLIPSIS));
    }
    fitted
}

/// Wraps lines in a rounded border `width` cells wide with one cell of padding.
fn boxed(body: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    let inner = width.saturating_sub(4);
    let mut lines = vec![Line::from(Span::styled(
        format!("╭{}╮", "─".repeat(width.saturating_sub(2))),
        theme::BORDER_STYLE,
    ))];
    for line in body {
        let mut spans = vec![Span::styled("│ ", theme::BORDER_STYLE)];
        spans.extend(fit_spans(line.spans, inner));
        spans.push(Span::styled(" │", theme::BORDER_STYLE));
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(Span::styled(
        format!("╰{}╯", "─".repeat(width.saturating_sub(2))),
        theme::BORDER_STYLE,
    )));
    lines
}
