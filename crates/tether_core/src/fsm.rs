//! Minimal state-machine trait shared by overlay lifecycles

use std::hash::Hash;

/// A state that reacts to numeric events
///
/// Returning `None` means the event does not apply in the current state and
/// must be ignored.
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;
}
