//! skyline-api: Shared API types and schemas
//!
//! Contains the wire types exchanged between the host agent and the remote
//! inventory service.

pub mod responses;
pub mod update;

pub use update::UpdateRecord;
