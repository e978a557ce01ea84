//! Actor implementations

pub mod agent;
