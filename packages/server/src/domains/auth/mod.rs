pub mod jwt;
pub mod models;
pub mod password;

pub use jwt::{Claims, JwtService, TokenPair};
pub use models::User;
