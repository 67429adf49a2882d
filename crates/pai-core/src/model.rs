use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Running,
    Idle,
    Paused,
    Error,
    Stopped,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Running,
        Status::Idle,
        Status::Paused,
        Status::Error,
        Status::Stopped,
    ];

    /// Statuses a freshly spawned agent may start in.
    pub const AT_BIRTH: [Status; 3] = [Status::Running, Status::Idle, Status::Paused];

    /// Where a running agent may drift to during the status pass.
    pub const DRIFT_FROM_RUNNING: [Status; 3] = [Status::Idle, Status::Paused, Status::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Running => "Running",
            Status::Idle => "Idle",
            Status::Paused => "Paused",
            Status::Error => "Error",
            Status::Stopped => "Stopped",
        }
    }

    pub fn is_running(self) -> bool {
        self == Status::Running
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages of the work algorithm. Declaration order is the execution order, so
/// the derived `Ord` is the phase ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Observe,
    Think,
    Plan,
    Build,
    Execute,
    Verify,
    Learn,
    Done,
}

impl Phase {
    /// The seven working phases, without the terminal `Done` marker.
    pub const WORK: [Phase; 7] = [
        Phase::Observe,
        Phase::Think,
        Phase::Plan,
        Phase::Build,
        Phase::Execute,
        Phase::Verify,
        Phase::Learn,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Phase> {
        match index {
            0 => Some(Phase::Observe),
            1 => Some(Phase::Think),
            2 => Some(Phase::Plan),
            3 => Some(Phase::Build),
            4 => Some(Phase::Execute),
            5 => Some(Phase::Verify),
            6 => Some(Phase::Learn),
            7 => Some(Phase::Done),
            _ => None,
        }
    }

    /// Following phase; `Done` is absorbing.
    pub fn next(self) -> Phase {
        Phase::from_index(self.index() + 1).unwrap_or(Phase::Done)
    }

    pub fn is_done(self) -> bool {
        self == Phase::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Observe => "OBSERVE",
            Phase::Think => "THINK",
            Phase::Plan => "PLAN",
            Phase::Build => "BUILD",
            Phase::Execute => "EXECUTE",
            Phase::Verify => "VERIFY",
            Phase::Learn => "LEARN",
            Phase::Done => "DONE",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Phase::Observe => "OBS",
            Phase::Think => "THI",
            Phase::Plan => "PLA",
            Phase::Build => "BUI",
            Phase::Execute => "EXE",
            Phase::Verify => "VER",
            Phase::Learn => "LEA",
            Phase::Done => "DON",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
