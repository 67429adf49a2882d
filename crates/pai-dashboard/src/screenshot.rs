use crate::ui;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use pai_core::{catalog, Agent, Dashboard, Phase, Registry, SettingsError, SimSettings, Status};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{self, Write};

pub const DEFAULT_SEED: u64 = 42;
pub const WIDTH: u16 = 160;
pub const HEIGHT: u16 = 50;
/// Slots overwritten with fixed states; staging needs more agents than this.
const STAGED_MIN_AGENTS: usize = 8;

/// Clock every screenshot is rendered at.
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 9, 14, 27, 5)
        .single()
        .unwrap_or_default()
}

/// Builds the capture dashboard and renders its single frame as plain text.
pub fn render(settings: SimSettings, seed: u64) -> Result<String, SettingsError> {
    let now = fixed_clock();
    let mut dash = Dashboard::new(settings, SmallRng::seed_from_u64(seed), now)?;
    dash.finish_loading();
    dash.resize(WIDTH, HEIGHT);
    stage(dash.stage());
    dash.set_detail_open(true);
    Ok(ui::plain_text(&ui::frame_lines(&dash.snapshot(now))))
}

pub fn print(settings: SimSettings, seed: u64) -> Result<()> {
    let frame = render(settings, seed).context("invalid simulation settings")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{frame}").context("failed to write screenshot")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

struct Work {
    name: &'static str,
    phase: Phase,
    progress: u8,
    tps: f64,
    tool: &'static str,
    activity: &'static str,
    model: &'static str,
}

fn run_with(agent: &mut Agent, work: Work) {
    agent.name = work.name.to_string();
    agent.status = Status::Running;
    agent.phase = work.phase;
    agent.progress = work.progress;
    agent.tokens_per_sec = work.tps;
    agent.current_tool = work.tool.to_string();
    agent.last_activity = work.activity.to_string();
    if let Some(model) = catalog::model_named(work.model) {
        agent.model = model;
    }
}

fn hold(agent: &mut Agent, name: &str, status: Status, phase: Option<Phase>, progress: u8) {
    agent.name = name.to_string();
    agent.leave_running(status);
    if let Some(phase) = phase {
        agent.phase = phase;
    }
    agent.progress = progress;
}

/// Pins the first slots to a representative mix of states. Skipped when the
/// fleet is too small.
pub fn stage(registry: &mut Registry) {
    if registry.len() < STAGED_MIN_AGENTS {
        return;
    }
    let mut slots = registry.iter_mut();

    if let Some(agent) = slots.next() {
        run_with(
            agent,
            Work {
                name: "Engineer",
                phase: Phase::Build,
                progress: 58,
                tps: 42.0,
                tool: "Edit",
                activity: "Edit config/database.yaml",
                model: "claude-opus-4-6",
            },
        );
        agent.task = "Implement auth middleware for API".to_string();
    }
    if let Some(agent) = slots.next() {
        run_with(
            agent,
            Work {
                name: "ClaudeResearcher",
                phase: Phase::Execute,
                progress: 72,
                tps: 135.0,
                tool: "WebSearch",
                activity: "WebSearch: Go TUI frameworks",
                model: "claude-sonnet-4-5",
            },
        );
    }
    if let Some(agent) = slots.next() {
        agent.name = "Architect".to_string();
        agent.complete();
    }
    if let Some(agent) = slots.next() {
        run_with(
            agent,
            Work {
                name: "GeminiResearcher",
                phase: Phase::Observe,
                progress: 12,
                tps: 245.0,
                tool: "Read",
                activity: "Read src/auth/middleware.ts",
                model: "claude-haiku-4-5",
            },
        );
    }
    if let Some(agent) = slots.next() {
        hold(agent, "QATester", Status::Error, None, 45);
    }
    if let Some(agent) = slots.next() {
        run_with(
            agent,
            Work {
                name: "Pentester",
                phase: Phase::Verify,
                progress: 88,
                tps: 98.0,
                tool: "Bash",
                activity: "Bash: npm run test",
                model: "gemini-2.5-pro",
            },
        );
    }
    if let Some(agent) = slots.next() {
        hold(agent, "Designer", Status::Paused, Some(Phase::Plan), 35);
    }
    if let Some(agent) = slots.next() {
        run_with(
            agent,
            Work {
                name: "Algorithm",
                phase: Phase::Think,
                progress: 28,
                tps: 112.0,
                tool: "Task",
                activity: "Task: spawned Intern agent",
                model: "claude-sonnet-4-5",
            },
        );
    }
}
