// HTTP routes
pub mod auth;
pub mod contacts;
pub mod health;

pub use auth::*;
pub use contacts::*;
pub use health::*;
