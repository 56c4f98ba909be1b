//! The smallest position-bearing unit of progress.

use qb_core::Position;

/// One ordered step of an [`Objective`][crate::Objective].
///
/// A step whose position is not (yet) resolvable — an item that never
/// spawned, a zone without geometry — carries `None`; an objective whose
/// first step has no position is structurally invalid and never selected.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    position: Option<Position>,
    wait_time_after_completing: f64,
}

impl Step {
    pub fn new(position: Position) -> Self {
        Self { position: Some(position), wait_time_after_completing: 0.0 }
    }

    /// A step with no resolvable position.
    pub fn unresolved() -> Self {
        Self { position: None, wait_time_after_completing: 0.0 }
    }

    /// Seconds the agent lingers after completing this step.
    pub fn with_wait(mut self, secs: f64) -> Self {
        self.wait_time_after_completing = secs.max(0.0);
        self
    }

    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[inline]
    pub fn wait_time_after_completing(&self) -> f64 {
        self.wait_time_after_completing
    }
}
