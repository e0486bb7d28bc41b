//! Typed ID definitions for all domain entities.
//!
//! One alias per entity, so the compiler catches mixed-up ownership lookups
//! (e.g. binding a `UserId` where a `ContactId` belongs).

pub use super::id::Id;

/// Marker type for User entities (accounts).
pub struct User;

/// Marker type for Contact entities.
pub struct Contact;

/// Marker type for Telephone entities.
pub struct Telephone;

pub type UserId = Id<User>;
pub type ContactId = Id<Contact>;
pub type TelephoneId = Id<Telephone>;
