//! Filter/pagination state and typed request bindings for the IFRC GO API.
//!
//! - [`filter`] holds the state of a filtered, paginated, sortable list view
//!   and turns it into query parameters.
//! - [`request`] describes calls as plain data and executes them, applying the
//!   URL, header, body and response rules shared by every endpoint.
//! - [`transform`] normalizes every failure into a [`transform::TransformedError`].
//! - [`binding`] ties a descriptor to a live request with retry, polling and
//!   stale-response protection.
//! - [`api`] names the known endpoints and their response types.

pub mod api;
pub mod binding;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod duration;
pub mod error;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod request;
pub mod transform;
