//! Business logic services

pub mod directions;
pub mod geo;
pub mod sequencer;
pub mod stop_set;
