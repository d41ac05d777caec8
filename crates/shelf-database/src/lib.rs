//! # shelf-database
//!
//! The [`CredentialStore`] contract and its SQL backends (SQLite, PostgreSQL,
//! MySQL). Each backend owns an embedded, versioned migration set and runs
//! every query under a deadline.

pub mod connection;
pub mod deadline;
pub mod migration;
pub mod store;

pub use connection::open_store;
pub use store::{CredentialStore, GetAccountsOptions};
