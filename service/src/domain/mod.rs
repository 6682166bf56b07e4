//! Domain definitions.

pub mod property;
pub mod saved;
pub mod user;

pub use self::{property::Property, saved::SavedProperty, user::User};
