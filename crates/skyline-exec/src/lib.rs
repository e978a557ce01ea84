//! skyline-exec: Local process execution
//!
//! Provides the executor trait the package manager layer runs its commands
//! through, and a `tokio::process` implementation of it.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandOutput;
pub use traits::CommandExecutor;
