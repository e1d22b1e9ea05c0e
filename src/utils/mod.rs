//! Utility components shared across the crate.

pub mod synchronization;
