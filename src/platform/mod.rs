//! Platform abstraction layer
//!
//! Browser listeners are scoped: whoever binds them hands the scope to the
//! engine, and [`crate::sim::Engine::cleanup`] releases each one exactly once.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// A group of host event listeners that can be released
pub trait EventBinding {
    /// Remove the listeners. Calling this again must be a no-op.
    fn unbind(&mut self);
}
