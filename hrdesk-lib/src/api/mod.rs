//! REST backend access
//!
//! [`ApiClient`] holds the connection settings shared by every admin screen;
//! [`ResourceClient`] talks to one collection endpoint and implements
//! [`RecordStore`](crate::store::RecordStore) so it can back a
//! [`ManagementTable`](crate::ManagementTable) directly.
//!
//! # Example
//!
//! ```ignore
//! let client = ApiClient::builder()
//!     .url("https://hr.example.com/api/")
//!     .token("secret")
//!     .timeout(Duration::from_secs(15))
//!     .build()?;
//!
//! let roles = client.resource("roles");
//! let items = roles.list().await?;
//! ```

mod client;
mod resource;

pub use client::*;
pub use resource::*;
