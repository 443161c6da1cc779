//! Reference locations (warehouses, offices and other fixed points).
//!
//! Fetched once from the position server, independently of the live stream.
//! A failed fetch is reported to subscribers and never touches the
//! connection.
//!
//! ```text
//! SyncContext::load_reference()
//!     │
//!     ├── ReferenceClient trait → HttpReferenceClient (reqwest)
//!     │
//!     └── SyncEvent::ReferenceLocations / SyncEvent::Error(reference-data)
//! ```

mod client;
mod error;
mod model;

pub use client::{
    HttpReferenceClient, ReferenceClient, DEFAULT_REFERENCE_TIMEOUT, DEFAULT_REFERENCE_URL,
};
pub use error::ReferenceDataError;
pub use model::{LocationKind, ReferenceCollection, ReferenceLocation};
