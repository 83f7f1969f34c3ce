//! Request-cycle phases.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────┐      ┌──────────┐      ┌────────┐      ┌────────┐
//! │ Dispatch │ ───► │ Activate │ ───► │ Rewind │ ───► │ Render │
//! └──────────┘      └────┬─────┘      └────────┘      └────────┘
//!                        │                                 ▲
//!                        └─────────────────────────────────┘
//!
//!   any phase ───► Cleanup
//! ```
//!
//! | From | To |
//! |------|----|
//! | Dispatch | Activate |
//! | Activate | Rewind, Render |
//! | Rewind | Render |
//! | any | Cleanup |

use serde::{Deserialize, Serialize};

/// Where a request cycle is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    /// Decoding the request into a service and its context.
    Dispatch,
    /// A page has been obtained and installed.
    Activate,
    /// Replaying a form submission against the page.
    Rewind,
    /// Writing the response markup.
    Render,
    /// Returning pages and releasing request resources.
    Cleanup,
}

impl CyclePhase {
    /// Whether `self → next` is a legal transition.
    ///
    /// ```
    /// use tessera_runtime::CyclePhase;
    ///
    /// assert!(CyclePhase::Activate.can_transition(CyclePhase::Rewind));
    /// assert!(CyclePhase::Render.can_transition(CyclePhase::Cleanup));
    /// assert!(!CyclePhase::Dispatch.can_transition(CyclePhase::Render));
    /// ```
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Dispatch, Self::Activate)
                | (Self::Activate, Self::Rewind)
                | (Self::Activate, Self::Render)
                | (Self::Rewind, Self::Render)
                | (_, Self::Cleanup)
        )
    }
}
