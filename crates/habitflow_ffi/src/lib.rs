//! Flutter-facing bindings for the HabitFlow core.

pub mod api;
