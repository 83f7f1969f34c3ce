//! Per-request identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one request cycle.
///
/// Attached to the cycle's tracing span and to exception reports so log
/// lines of one request can be correlated.
///
/// ```
/// use tessera_types::CycleId;
///
/// let a = CycleId::new();
/// let b = CycleId::new();
/// assert_ne!(a, b);
/// assert!(a.to_string().starts_with("cycle:"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

#[allow(clippy::new_without_default)] // a cycle id is always minted explicitly
impl CycleId {
    /// Creates a new [`CycleId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle:{}", self.0)
    }
}
