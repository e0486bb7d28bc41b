pub mod contact;
pub mod telephone;

pub use contact::{Contact, ContactChanges, NewContact};
pub use telephone::Telephone;
