use crate::engine;
use crate::model::Status;
use crate::registry::Registry;
use crate::settings::SimSettings;
use crate::view::ViewState;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

/// Discrete operator commands, independent of the terminal toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    ToggleDetail,
    Refresh,
    StartStop,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::Up => "up",
            Command::Down => "down",
            Command::ToggleDetail => "detail",
            Command::Refresh => "refresh",
            Command::StartStop => "start/stop",
            Command::Quit => "quit",
        }
    }
}

/// Applies `command` synchronously. Boundary cases are silent no-ops.
pub fn apply<R: Rng>(
    command: Command,
    registry: &mut Registry,
    view: &mut ViewState,
    rng: &mut R,
    settings: &SimSettings,
    now: DateTime<Utc>,
) -> Flow {
    match command {
        Command::Quit => return Flow::Quit,
        Command::Up => view.move_up(),
        Command::Down => view.move_down(registry.len()),
        Command::ToggleDetail => view.toggle_detail(registry.len()),
        Command::Refresh => {
            engine::step(registry, rng, settings, now);
            view.last_refresh = now;
            view.clamp_selection(registry.len());
        }
        Command::StartStop => toggle_selected(registry, view.selected, now),
    }
    Flow::Continue
}

fn toggle_selected(registry: &mut Registry, selected: usize, now: DateTime<Utc>) {
    let Some(agent) = registry.get_mut(selected) else {
        return;
    };
    if agent.status == Status::Stopped {
        agent.start(now);
        info!(agent = %agent.id, "agent started by operator");
    } else {
        agent.stop();
        info!(agent = %agent.id, "agent stopped by operator");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Phase;
    use crate::settings::TransitionRates;
    use chrono::{Duration, TimeZone};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixture {
        registry: Registry,
        view: ViewState,
        rng: SmallRng,
        settings: SimSettings,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new(agents: usize) -> Self {
            let now = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
            let mut rng = SmallRng::seed_from_u64(31);
            let registry = Registry::populate(agents, &mut rng, now);
            Self {
                registry,
                view: ViewState::new(now),
                rng,
                settings: SimSettings::default(),
                now,
            }
        }

        fn send(&mut self, command: Command) -> Flow {
            apply(
                command,
                &mut self.registry,
                &mut self.view,
                &mut self.rng,
                &self.settings,
                self.now,
            )
        }
    }

    #[test]
    fn down_on_last_row_keeps_cursor() {
        let mut fx = Fixture::new(5);
        fx.view.selected = 4;
        assert_eq!(fx.send(Command::Down), Flow::Continue);
        assert_eq!(fx.view.selected, 4);
    }

    #[test]
    fn up_on_first_row_keeps_cursor() {
        let mut fx = Fixture::new(5);
        fx.send(Command::Up);
        assert_eq!(fx.view.selected, 0);
        fx.send(Command::Down);
        fx.send(Command::Down);
        fx.send(Command::Up);
        assert_eq!(fx.view.selected, 1);
    }

    #[test]
    fn start_restarts_a_stopped_agent_immediately() {
        let mut fx = Fixture::new(3);
        fx.view.selected = 1;
        if let Some(agent) = fx.registry.get_mut(1) {
            agent.phase = Phase::Verify;
            agent.stop();
        }
        fx.now += Duration::seconds(42);

        fx.send(Command::StartStop);

        let agent = fx.registry.get(1).expect("agent");
        assert_eq!(agent.status, Status::Running);
        assert_eq!(agent.phase, Phase::Observe);
        assert_eq!(agent.progress, 0);
        assert_eq!(agent.started_at, fx.now);
    }

    #[test]
    fn stop_zeroes_throughput_and_progress() {
        let mut fx = Fixture::new(2);
        if let Some(agent) = fx.registry.get_mut(0) {
            agent.status = Status::Running;
            agent.tokens_per_sec = 77.0;
            agent.progress = 40;
        }
        fx.send(Command::StartStop);
        let agent = fx.registry.get(0).expect("agent");
        assert_eq!(agent.status, Status::Stopped);
        assert_eq!(agent.tokens_per_sec, 0.0);
        assert_eq!(agent.progress, 0);
    }

    #[test]
    fn detail_toggle_ignored_on_empty_registry() {
        let mut fx = Fixture::new(0);
        fx.send(Command::ToggleDetail);
        assert!(!fx.view.detail_open);
        fx.send(Command::StartStop);
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn refresh_stamps_last_refresh_without_counting_a_tick() {
        let mut fx = Fixture::new(6);
        fx.now += Duration::seconds(5);
        fx.send(Command::Refresh);
        assert_eq!(fx.view.last_refresh, fx.now);
        assert_eq!(fx.view.ticks, 0);
    }

    #[test]
    fn refresh_runs_an_engine_pass() {
        let mut fx = Fixture::new(6);
        fx.settings.rates = TransitionRates {
            running_drift: 0.0,
            idle_resume: 0.0,
            paused_resume: 0.0,
            error_recover: 0.0,
            phase_advance: 1.0,
            isc_flip: 0.0,
            spawn: 1.0,
            collect: 0.0,
        };
        if let Some(agent) = fx.registry.get_mut(0) {
            agent.status = Status::Running;
            agent.phase = Phase::Build;
        }

        fx.send(Command::Refresh);

        assert_eq!(fx.registry.len(), 7);
        let agent = fx.registry.get(0).expect("agent");
        assert_eq!(agent.status, Status::Running);
        assert_eq!(agent.phase, Phase::Execute);
    }

    #[test]
    fn quit_reports_flow() {
        let mut fx = Fixture::new(1);
        assert_eq!(fx.send(Command::Quit), Flow::Quit);
    }
}
