//! Data models for the employee registration wizard.
//!
//! Field names serialize in camelCase so stored documents stay compatible with the browser client.

mod datastore;
mod employee;
mod owner;

pub use datastore::*;
pub use employee::*;
pub use owner::*;
