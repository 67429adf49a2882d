//! One simulation step over the whole registry.

use crate::agent::{clock_label, Agent, PROGRESS_PER_PHASE};
use crate::catalog;
use crate::model::{Phase, Status};
use crate::population::{self, PopulationChange};
use crate::registry::Registry;
use crate::settings::{SimSettings, TransitionRates};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

/// Agent time that elapses per tick, regardless of the wall-clock cadence.
pub const SIMULATED_SECONDS_PER_TICK: f64 = 2.0;

/// Highest progress a still-working agent can report.
pub const MAX_WORKING_PROGRESS: u8 = 99;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub status_changes: usize,
    pub working: usize,
    pub completed: usize,
    pub population: PopulationChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Working,
    Completed,
}

pub fn step<R: Rng>(
    registry: &mut Registry,
    rng: &mut R,
    settings: &SimSettings,
    now: DateTime<Utc>,
) -> TickReport {
    let mut report = TickReport {
        status_changes: status_pass(registry, rng, &settings.rates),
        ..TickReport::default()
    };

    for agent in registry.iter_mut() {
        if !agent.status.is_running() {
            continue;
        }
        match advance_running(agent, rng, &settings.rates, now) {
            Advance::Working => report.working += 1,
            Advance::Completed => report.completed += 1,
        }
    }

    report.population = population::adjust(registry, rng, settings, now);
    report
}

/// Rolls a status transition for one or two randomly drawn agents. Returns how
/// many draws actually changed a status.
pub fn status_pass<R: Rng>(
    registry: &mut Registry,
    rng: &mut R,
    rates: &TransitionRates,
) -> usize {
    if registry.is_empty() {
        return 0;
    }
    let draws = rng.random_range(1..=2);
    let mut changed = 0;
    for _ in 0..draws {
        let index = rng.random_range(0..registry.len());
        let Some(agent) = registry.get_mut(index) else {
            continue;
        };
        let before = agent.status;
        transition_status(agent, rng, rates);
        if agent.status != before {
            changed += 1;
            debug!(
                agent = %agent.id,
                from = %before,
                to = %agent.status,
                "status transition"
            );
        }
    }
    changed
}

fn transition_status<R: Rng>(agent: &mut Agent, rng: &mut R, rates: &TransitionRates) {
    match agent.status {
        Status::Running => {
            if rng.random_bool(rates.running_drift) {
                let next = catalog::pick(rng, &Status::DRIFT_FROM_RUNNING);
                agent.leave_running(next);
            }
        }
        Status::Idle => {
            if rng.random_bool(rates.idle_resume) {
                agent.restart();
                agent.task = catalog::pick(rng, &catalog::TASKS).to_string();
            }
        }
        Status::Paused => {
            if rng.random_bool(rates.paused_resume) {
                agent.status = Status::Running;
            }
        }
        Status::Error => {
            if rng.random_bool(rates.error_recover) {
                agent.restart();
            }
        }
        Status::Stopped => {}
    }
}

/// Progress an agent in `phase` is allowed to reach this tick.
pub fn progress_target(phase: Phase, jitter: u8) -> u8 {
    let raw = (phase.index() + 1) * PROGRESS_PER_PHASE as usize + jitter as usize;
    raw.min(MAX_WORKING_PROGRESS as usize) as u8
}

/// Applies one tick of work to a running agent.
pub fn advance_running<R: Rng>(
    agent: &mut Agent,
    rng: &mut R,
    rates: &TransitionRates,
    now: DateTime<Utc>,
) -> Advance {
    if !agent.phase.is_done() && rng.random_bool(rates.phase_advance) {
        agent.phase = agent.phase.next();
    }
    if agent.phase.is_done() {
        agent.complete();
        debug!(agent = %agent.id, "work cycle completed");
        return Advance::Completed;
    }

    let target = progress_target(agent.phase, rng.random_range(0..5));
    if agent.progress < target {
        let bump: u8 = rng.random_range(1..=4);
        agent.progress = agent.progress.saturating_add(bump).min(target);
    }

    let jitter = (rng.random::<f64>() - 0.5) * agent.model.spread() * 0.6;
    let mut tps = agent.model.baseline_tps() + jitter;
    if tps < 0.0 {
        tps = agent.model.min_tps;
    }
    agent.tokens_per_sec = tps;

    let produced = (tps * SIMULATED_SECONDS_PER_TICK).floor() as u64;
    agent.tokens_out += produced;
    agent.tokens_in += produced * rng.random_range(2..5u64);

    agent.current_tool = catalog::pick(rng, &catalog::TOOLS).to_string();
    agent.last_activity = catalog::pick(rng, &catalog::ACTIVITIES).to_string();
    agent.last_activity_at = now - Duration::seconds(rng.random_range(0..3));
    agent.tools_used += 1;
    agent.events.push(format!(
        "[{}] {} → {}",
        clock_label(now),
        agent.current_tool,
        agent.last_activity
    ));

    if rng.random_bool(rates.isc_flip) && !agent.criteria.is_empty() {
        let index = rng.random_range(0..agent.criteria.len());
        let criterion = &mut agent.criteria[index];
        criterion.passed = !criterion.passed;
    }

    Advance::Working
}
