use crate::catalog::{self, ModelProfile};
use crate::model::{Phase, Status};
use chrono::{DateTime, Duration, Local, Utc};
use rand::seq::index;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

pub const EVENT_LOG_CAPACITY: usize = 20;

/// Progress points allotted to each working phase.
pub const PROGRESS_PER_PHASE: u8 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(format!("pai-{:04x}", rng.random_range(0..=0xffffu32)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IscCriterion {
    pub text: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        if self.entries.len() >= EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The newest `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &str> {
        let skip = self.entries.len().saturating_sub(count);
        self.iter().skip(skip)
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub model: ModelProfile,
    pub status: Status,
    pub phase: Phase,
    pub progress: u8,
    pub tokens_per_sec: f64,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub task: String,
    pub current_tool: String,
    pub last_activity: String,
    pub last_activity_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub tools_used: u32,
    pub events: EventLog,
    pub criteria: Vec<IscCriterion>,
}

impl Agent {
    /// Builds a randomized agent as it would appear when it first joins the fleet.
    pub fn spawn<R: Rng>(id: AgentId, rng: &mut R, now: DateTime<Utc>) -> Self {
        let name = catalog::pick(rng, &catalog::AGENT_NAMES);
        let model = catalog::pick(rng, &catalog::MODELS);
        let status = catalog::pick(rng, &Status::AT_BIRTH);
        let mut phase = catalog::pick(rng, &Phase::WORK);

        let criteria = random_criteria(rng);

        let seed_entries = rng.random_range(4..=8);
        let mut offsets: Vec<i64> = (0..seed_entries)
            .map(|_| rng.random_range(0..300))
            .collect();
        offsets.sort_unstable_by(|a, b| b.cmp(a));
        let mut events = EventLog::new();
        for offset in offsets {
            let at = now - Duration::seconds(offset);
            let tool = catalog::pick(rng, &catalog::TOOLS);
            let activity = catalog::pick(rng, &catalog::ACTIVITIES);
            events.push(format!("[{}] {tool}: {activity}", clock_label(at)));
        }

        let sampled_tps = rng.random_range(model.min_tps..model.max_tps);
        let base_progress = phase.index() as u8 * PROGRESS_PER_PHASE;
        let mut progress = (base_progress + rng.random_range(0..PROGRESS_PER_PHASE)).min(100);
        let mut tokens_per_sec = if status.is_running() {
            sampled_tps
        } else {
            0.0
        };
        if status == Status::Idle {
            phase = Phase::Done;
            progress = 100;
            tokens_per_sec = 0.0;
        }

        Self {
            id,
            name: name.to_string(),
            model,
            status,
            phase,
            progress,
            tokens_per_sec,
            tokens_in: 5_000 + rng.random_range(0..50_000),
            tokens_out: 1_000 + rng.random_range(0..20_000),
            task: catalog::pick(rng, &catalog::TASKS).to_string(),
            current_tool: catalog::pick(rng, &catalog::TOOLS).to_string(),
            last_activity: catalog::pick(rng, &catalog::ACTIVITIES).to_string(),
            last_activity_at: now - Duration::seconds(rng.random_range(0..20)),
            started_at: now - Duration::seconds(rng.random_range(0..600)),
            tools_used: rng.random_range(0..40),
            events,
            criteria,
        }
    }

    pub fn tokens_total(&self) -> u64 {
        self.tokens_in + self.tokens_out
    }

    pub fn criteria_passed(&self) -> usize {
        self.criteria.iter().filter(|c| c.passed).count()
    }

    /// Finishes the work cycle: the agent idles with everything done.
    pub fn complete(&mut self) {
        self.status = Status::Idle;
        self.phase = Phase::Done;
        self.progress = 100;
        self.tokens_per_sec = 0.0;
    }

    /// Moves a running agent into `status`, keeping the status invariants.
    pub fn leave_running(&mut self, status: Status) {
        match status {
            Status::Idle => self.complete(),
            Status::Stopped => self.stop(),
            Status::Running => {}
            Status::Paused | Status::Error => {
                self.status = status;
                self.tokens_per_sec = 0.0;
            }
        }
    }

    /// Back to running from the top of the algorithm.
    pub fn restart(&mut self) {
        self.status = Status::Running;
        self.phase = Phase::Observe;
        self.progress = 0;
    }

    /// Explicit operator start; only meaningful for stopped agents.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.restart();
        self.started_at = now;
    }

    pub fn stop(&mut self) {
        self.status = Status::Stopped;
        self.tokens_per_sec = 0.0;
        self.progress = 0;
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.status == Status::Stopped {
            return None;
        }
        Some(now - self.started_at)
    }
}

/// `HH:MM:SS` in the viewer's local time.
pub fn clock_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn random_criteria<R: Rng>(rng: &mut R) -> Vec<IscCriterion> {
    let count = rng.random_range(3..=6);
    index::sample(rng, catalog::ISC_CRITERIA.len(), count)
        .into_iter()
        .map(|idx| IscCriterion {
            text: catalog::ISC_CRITERIA[idx].to_string(),
            passed: rng.random_bool(0.6),
        })
        .collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
    }

    #[test]
    fn event_log_evicts_oldest_on_overflow() {
        let mut log = EventLog::new();
        for i in 0..EVENT_LOG_CAPACITY {
            log.push(format!("entry-{i}"));
        }
        assert_eq!(log.len(), 20);

        log.push("entry-20");
        assert_eq!(log.len(), 20);
        assert_eq!(log.iter().next(), Some("entry-1"));
        assert_eq!(log.iter().last(), Some("entry-20"));
        assert!(log.iter().all(|entry| entry != "entry-0"));
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let mut log = EventLog::new();
        for i in 0..10 {
            log.push(format!("e{i}"));
        }
        let tail: Vec<&str> = log.recent(3).collect();
        assert_eq!(tail, vec!["e7", "e8", "e9"]);
        assert_eq!(log.recent(50).count(), 10);
    }

    #[test]
    fn spawned_agents_respect_birth_rules() {
        let mut rng = SmallRng::seed_from_u64(7);
        for n in 0..200 {
            let agent = Agent::spawn(AgentId::new(format!("pai-{n:04x}")), &mut rng, now());
            assert!(Status::AT_BIRTH.contains(&agent.status));
            assert!(agent.progress <= 100);
            assert!((3..=6).contains(&agent.criteria.len()));
            assert!((4..=8).contains(&agent.events.len()));
            let mut texts: Vec<&str> = agent.criteria.iter().map(|c| c.text.as_str()).collect();
            texts.sort_unstable();
            texts.dedup();
            assert_eq!(texts.len(), agent.criteria.len(), "criteria repeat");
            match agent.status {
                Status::Idle => {
                    assert_eq!(agent.phase, Phase::Done);
                    assert_eq!(agent.progress, 100);
                    assert_eq!(agent.tokens_per_sec, 0.0);
                }
                Status::Running => {
                    assert!(agent.tokens_per_sec >= agent.model.min_tps);
                    assert!(agent.tokens_per_sec < agent.model.max_tps);
                    assert!(agent.phase < Phase::Done);
                }
                _ => assert_eq!(agent.tokens_per_sec, 0.0),
            }
        }
    }

    #[test]
    fn start_resets_a_stopped_agent() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut agent = Agent::spawn(AgentId::new("pai-0001"), &mut rng, now());
        agent.phase = Phase::Verify;
        agent.progress = 80;
        agent.stop();
        assert_eq!(agent.progress, 0);
        assert_eq!(agent.tokens_per_sec, 0.0);

        let later = now() + Duration::seconds(90);
        agent.start(later);
        assert_eq!(agent.status, Status::Running);
        assert_eq!(agent.phase, Phase::Observe);
        assert_eq!(agent.progress, 0);
        assert_eq!(agent.started_at, later);
    }

    #[test]
    fn leaving_running_zeroes_throughput() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut agent = Agent::spawn(AgentId::new("pai-0002"), &mut rng, now());
        agent.status = Status::Running;
        agent.tokens_per_sec = 88.0;
        agent.leave_running(Status::Error);
        assert_eq!(agent.status, Status::Error);
        assert_eq!(agent.tokens_per_sec, 0.0);
    }

    #[test]
    fn random_ids_use_four_hex_digits() {
        let mut rng = SmallRng::seed_from_u64(99);
        let id = AgentId::random(&mut rng);
        let suffix = id.as_str().strip_prefix("pai-").expect("prefix");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
