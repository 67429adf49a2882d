//! Simulation core for the PAI agent dashboard: the agent model, the registry
//! that owns it, the per-tick transition engine, the population controller and
//! the operator command handling.

pub mod agent;
pub mod catalog;
pub mod dashboard;
pub mod engine;
pub mod input;
pub mod model;
pub mod population;
pub mod registry;
pub mod settings;
pub mod view;

pub use agent::{clock_label, Agent, AgentId, EventLog, IscCriterion, EVENT_LOG_CAPACITY};
pub use catalog::ModelProfile;
pub use dashboard::{Dashboard, DashboardView};
pub use engine::TickReport;
pub use input::{Command, Flow};
pub use model::{Phase, Status};
pub use population::PopulationChange;
pub use registry::Registry;
pub use settings::{SettingsError, SimSettings, TransitionRates};
pub use view::ViewState;
