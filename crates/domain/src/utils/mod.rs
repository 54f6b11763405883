//! Domain utility functions

pub mod workday;
