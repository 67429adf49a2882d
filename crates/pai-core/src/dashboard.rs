use crate::agent::Agent;
use crate::engine::{self, TickReport};
use crate::input::{self, Command, Flow};
use crate::registry::Registry;
use crate::settings::{SettingsError, SimSettings};
use crate::view::ViewState;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Owns the registry, the view state and the random source. Every mutation of
/// the fleet goes through here; renderers only ever see a [`DashboardView`].
pub struct Dashboard<R> {
    registry: Registry,
    view: ViewState,
    rng: R,
    settings: SimSettings,
}

/// Read-only snapshot handed to the renderer for one pass.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub agents: &'a [Agent],
    pub view: &'a ViewState,
    pub now: DateTime<Utc>,
}

impl<'a> DashboardView<'a> {
    pub fn selected_agent(&self) -> Option<&'a Agent> {
        self.agents.get(self.view.selected)
    }
}

impl<R: Rng> Dashboard<R> {
    /// Rejects settings that fail [`SimSettings::validate`].
    pub fn new(
        settings: SimSettings,
        mut rng: R,
        now: DateTime<Utc>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let registry = Registry::populate(settings.initial_population, &mut rng, now);
        Ok(Self {
            registry,
            view: ViewState::new(now),
            rng,
            settings,
        })
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Scheduled clock tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let report = engine::step(&mut self.registry, &mut self.rng, &self.settings, now);
        self.view.clamp_selection(self.registry.len());
        self.view.last_refresh = now;
        self.view.ticks += 1;
        report
    }

    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> Flow {
        input::apply(
            command,
            &mut self.registry,
            &mut self.view,
            &mut self.rng,
            &self.settings,
            now,
        )
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.view.resize(width, height);
    }

    pub fn advance_spinner(&mut self) {
        self.view.spinner_frame = self.view.spinner_frame.wrapping_add(1);
    }

    pub fn finish_loading(&mut self) {
        self.view.loading = false;
    }

    pub fn set_detail_open(&mut self, open: bool) {
        self.view.detail_open = open && !self.registry.is_empty();
    }

    /// Direct access for staging fixed fixtures (screenshots, tests).
    pub fn stage(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardView<'_> {
        DashboardView {
            agents: self.registry.agents(),
            view: &self.view,
            now,
        }
    }
}
