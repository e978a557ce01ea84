//! skyline-client: HTTP client for the inventory service
//!
//! # Example
//!
//! ```no_run
//! use skyline_api::UpdateRecord;
//! use skyline_client::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://inventory.example.com/api/", "host-token")?;
//!
//! let update = UpdateRecord::new("openssl", "1.1.1f-1", "1.1.1f-2", "focal-security");
//! client.create_update(&update).await?;
//!
//! for existing in client.list_updates().await? {
//!     println!("{} -> {}", existing.package_name, existing.new_version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::HttpClient;
