//! Fixed pools the synthetic fleet draws names, tasks and activity from.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelProfile {
    pub name: &'static str,
    /// Lower bound of the observed tok/s range.
    pub min_tps: f64,
    /// Upper bound of the observed tok/s range.
    pub max_tps: f64,
}

impl ModelProfile {
    pub fn baseline_tps(&self) -> f64 {
        (self.min_tps + self.max_tps) / 2.0
    }

    pub fn spread(&self) -> f64 {
        self.max_tps - self.min_tps
    }
}

pub const MODELS: [ModelProfile; 5] = [
    ModelProfile {
        name: "claude-opus-4-6",
        min_tps: 25.0,
        max_tps: 65.0,
    },
    ModelProfile {
        name: "claude-sonnet-4-5",
        min_tps: 80.0,
        max_tps: 160.0,
    },
    ModelProfile {
        name: "claude-haiku-4-5",
        min_tps: 150.0,
        max_tps: 300.0,
    },
    ModelProfile {
        name: "gemini-2.5-pro",
        min_tps: 60.0,
        max_tps: 130.0,
    },
    ModelProfile {
        name: "grok-3",
        min_tps: 70.0,
        max_tps: 140.0,
    },
];

pub const AGENT_NAMES: [&str; 11] = [
    "Engineer",
    "Architect",
    "ClaudeResearcher",
    "GeminiResearcher",
    "GrokResearcher",
    "QATester",
    "Designer",
    "Pentester",
    "Explore",
    "Algorithm",
    "Intern",
];

pub const TASKS: [&str; 10] = [
    "Implement auth middleware for API",
    "Design database schema for users",
    "Research best practices for caching",
    "Security audit of payment flow",
    "Explore codebase for dead imports",
    "Evaluate ISC criteria satisfaction",
    "Build React component library",
    "Test checkout E2E flow in browser",
    "Analyze API response time patterns",
    "Refactor state management layer",
];

pub const TOOLS: [&str; 11] = [
    "Read",
    "Write",
    "Edit",
    "Bash",
    "Grep",
    "Glob",
    "WebSearch",
    "Task",
    "WebFetch",
    "Skill",
    "AskUserQuestion",
];

pub const ACTIVITIES: [&str; 12] = [
    "Read src/auth/middleware.ts",
    "Bash: npm run test",
    "Write api/routes.go",
    "Edit config/database.yaml",
    "Grep: 'async function'",
    "Glob: **/*.test.ts",
    "WebSearch: Go TUI frameworks",
    "Task: spawned Intern agent",
    "WebFetch: API docs",
    "ISC verified: tests pass",
    "Browser: screenshot captured",
    "Bash: go build ./...",
];

pub const ISC_CRITERIA: [&str; 10] = [
    "Tests pass for auth module",
    "No security vulnerabilities detected",
    "API response time under 200ms",
    "All lint checks green",
    "Code coverage above 80 percent",
    "E2E login flow verified in browser",
    "No regressions in CI pipeline",
    "Database migrations reversible",
    "No credentials exposed in code",
    "Component renders without errors",
];

pub fn model_named(name: &str) -> Option<ModelProfile> {
    MODELS.iter().copied().find(|model| model.name == name)
}

/// Uniform pick from a non-empty pool.
pub fn pick<T: Copy, R: Rng>(rng: &mut R, pool: &[T]) -> T {
    pool[rng.random_range(0..pool.len())]
}
