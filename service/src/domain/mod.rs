//! Domain definitions.

pub mod collection;
pub mod movie;
pub mod user;

pub use self::{collection::Collection, movie::Movie, user::User};
