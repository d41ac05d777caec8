//! # shelf-entity
//!
//! Domain entity models for Shelf. [`Account`] maps the `account` table row;
//! [`Session`] is the ephemeral proof of a successful login held in memory.

pub mod account;
pub mod session;

pub use account::{Account, NewAccount};
pub use session::Session;
