pub mod models;
pub mod validation;

pub use models::{Contact, ContactChanges, NewContact, Telephone};
