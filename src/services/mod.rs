pub mod identity;
pub mod matching;
pub mod providers;
pub mod resolver;

pub use identity::{IdentityVerifier, JwtVerifier};
pub use resolver::TitleResolver;
