//! # MedRef Client
//!
//! The page-side half of MedRef, as a plain library:
//!
//! - [`api`]: fetch layer over the REST endpoints
//! - [`render`]: HTML fragments for preferences, medications, suggestions and HPI results
//! - [`session`]: the UI state coordinator keeping the search suggestions, hover preview panel
//!   and pinned box consistent, plus a driver that runs its fetches
//! - [`drag`]: pointer-driven repositioning of floating boxes
//! - [`particles`]: the decorative background animation
//! - [`hpi_form`] and [`draft`]: the HPI assistant form and its locally stored draft
//!
//! Event handlers are synchronous and side-effect free; anything that needs the network is
//! returned as a [`session::Command`] and executed by [`session::Session`].

pub mod api;
pub mod draft;
pub mod drag;
pub mod error;
pub mod hpi_form;
pub mod particles;
pub mod render;
pub mod session;

pub use api::ApiClient;
pub use error::{FetchError, StorageError};
pub use session::{Command, Coordinator, Event, Session};

#[cfg(test)]
mod test_server;
