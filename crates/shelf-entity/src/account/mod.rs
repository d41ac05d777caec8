//! Account domain entities.

pub mod model;

pub use model::{Account, BOOTSTRAP_USERNAME, NewAccount};
