//! Accepting connections and handing each one to its own task.

pub mod listener;
