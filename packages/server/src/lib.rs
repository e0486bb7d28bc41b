// Contacts Directory API
//
// Multi-tenant contacts service: email/password accounts, JWT sessions,
// and a per-user contact book with telephone uniqueness rules.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
