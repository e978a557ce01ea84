//! skyline-pkg: Package manager abstraction
//!
//! Parses the package manager's simulated upgrade output into
//! [`UpdateRecord`](skyline_api::UpdateRecord)s and provides the apt
//! implementation of the [`PackageManager`] trait.

pub mod apt;
pub mod error;
pub mod parser;
pub mod traits;
pub mod types;

pub use apt::AptManager;
pub use error::PackageError;
pub use parser::{filter_install_lines, is_install_line, parse_install_line, parse_simulation};
pub use traits::PackageManager;
pub use types::PackageManagerType;
