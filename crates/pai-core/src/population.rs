use crate::agent::AgentId;
use crate::model::Status;
use crate::registry::Registry;
use crate::settings::SimSettings;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PopulationChange {
    #[default]
    Unchanged,
    Spawned(AgentId),
    Collected {
        index: usize,
        id: AgentId,
    },
}

/// Spawns or garbage-collects at most one agent.
///
/// The spawn roll comes first; when it succeeds the collection roll is
/// skipped so the registry changes by at most one entry per call.
pub fn adjust<R: Rng>(
    registry: &mut Registry,
    rng: &mut R,
    settings: &SimSettings,
    now: DateTime<Utc>,
) -> PopulationChange {
    if rng.random_bool(settings.rates.spawn) && registry.len() < settings.max_population {
        let id = registry.spawn(rng, now).id.clone();
        info!(agent = %id, population = registry.len(), "agent spawned");
        return PopulationChange::Spawned(id);
    }

    if rng.random_bool(settings.rates.collect) && registry.len() > settings.min_population {
        let index = rng.random_range(0..registry.len());
        let eligible = registry
            .get(index)
            .is_some_and(|agent| agent.status == Status::Stopped);
        if eligible {
            if let Some(agent) = registry.remove(index) {
                info!(agent = %agent.id, population = registry.len(), "agent collected");
                return PopulationChange::Collected {
                    index,
                    id: agent.id,
                };
            }
        }
    }

    PopulationChange::Unchanged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TransitionRates;
    use chrono::TimeZone;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap()
    }

    fn settings(spawn: f64, collect: f64) -> SimSettings {
        SimSettings {
            rates: TransitionRates {
                spawn,
                collect,
                ..TransitionRates::default()
            },
            ..SimSettings::default()
        }
    }

    #[test]
    fn spawn_respects_upper_bound() {
        let mut rng = SmallRng::seed_from_u64(20);
        let mut registry = Registry::populate(10, &mut rng, now());
        let settings = settings(1.0, 0.0);
        for _ in 0..10 {
            adjust(&mut registry, &mut rng, &settings, now());
        }
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn collect_only_removes_stopped_agents() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut registry = Registry::populate(10, &mut rng, now());
        let stopped = registry.get(3).expect("agent").id.clone();
        if let Some(agent) = registry.get_mut(3) {
            agent.stop();
        }
        for agent in registry.iter_mut() {
            if agent.id != stopped && agent.status == Status::Stopped {
                agent.status = Status::Paused;
            }
        }

        let settings = settings(0.0, 1.0);
        let mut removed = None;
        for _ in 0..200 {
            match adjust(&mut registry, &mut rng, &settings, now()) {
                PopulationChange::Collected { index, id } => {
                    removed = Some((index, id));
                    break;
                }
                PopulationChange::Unchanged => {}
                PopulationChange::Spawned(_) => panic!("spawn disabled"),
            }
        }
        assert_eq!(removed, Some((3, stopped)));
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn collect_respects_lower_bound() {
        let mut rng = SmallRng::seed_from_u64(22);
        let mut registry = Registry::populate(6, &mut rng, now());
        for agent in registry.iter_mut() {
            agent.stop();
        }
        let settings = settings(0.0, 1.0);
        for _ in 0..50 {
            assert_eq!(
                adjust(&mut registry, &mut rng, &settings, now()),
                PopulationChange::Unchanged
            );
        }
        assert_eq!(registry.len(), 6);
    }
}
