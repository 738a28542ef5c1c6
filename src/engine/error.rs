use crate::model::Date;

/// The requested range would push some day over capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityConflict {
    /// First day in the requested range with no free slot.
    pub date: Date,
    pub capacity: u32,
}

impl std::fmt::Display for CapacityConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "kennel full on {}: all {} places occupied",
            self.date, self.capacity
        )
    }
}

impl std::error::Error for CapacityConflict {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    NotFound,
    Conflict(CapacityConflict),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::NotFound => write!(f, "booking to edit not found"),
            EditError::Conflict(c) => write!(f, "{c}"),
        }
    }
}

impl std::error::Error for EditError {}

#[derive(Debug)]
pub enum EngineError {
    NotFound,
    CapacityExceeded(CapacityConflict),
    InvalidRequest(&'static str),
    LimitExceeded(&'static str),
    JournalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound => write!(f, "booking not found"),
            EngineError::CapacityExceeded(c) => write!(f, "{c}"),
            EngineError::InvalidRequest(msg) => write!(f, "invalid booking request: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::JournalError(e) => write!(f, "journal error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<EditError> for EngineError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::NotFound => EngineError::NotFound,
            EditError::Conflict(c) => EngineError::CapacityExceeded(c),
        }
    }
}

impl From<CapacityConflict> for EngineError {
    fn from(c: CapacityConflict) -> Self {
        EngineError::CapacityExceeded(c)
    }
}
