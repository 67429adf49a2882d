use crate::agent::{Agent, AgentId};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Sole owner of the fleet's agent records.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    agents: Vec<Agent>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate<R: Rng>(count: usize, rng: &mut R, now: DateTime<Utc>) -> Self {
        let mut registry = Self {
            agents: Vec::with_capacity(count),
        };
        for _ in 0..count {
            registry.spawn(rng, now);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.agents.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent> {
        self.agents.iter_mut()
    }

    pub fn remove(&mut self, index: usize) -> Option<Agent> {
        if index < self.agents.len() {
            Some(self.agents.remove(index))
        } else {
            None
        }
    }

    pub fn contains_id(&self, id: &AgentId) -> bool {
        self.agents.iter().any(|agent| &agent.id == id)
    }

    /// Draws identifiers until one is unused.
    pub fn fresh_id<R: Rng>(&self, rng: &mut R) -> AgentId {
        loop {
            let id = AgentId::random(rng);
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R, now: DateTime<Utc>) -> &Agent {
        let id = self.fresh_id(rng);
        let index = self.agents.len();
        self.agents.push(Agent::spawn(id, rng, now));
        &self.agents[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn populate_assigns_unique_ids() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let registry = Registry::populate(14, &mut rng, now);
        assert_eq!(registry.len(), 14);
        let ids: HashSet<&str> = registry.agents().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut registry = Registry::new();
        assert!(registry.remove(0).is_none());
        assert!(registry.is_empty());
    }
}
