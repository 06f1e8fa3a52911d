//! Authentication: token issuance, rotation and revocation, plus the HTTP
//! handlers and request extractor built on top of it.

pub mod extractor;
pub mod handlers;
pub mod hashing;
pub mod service;
pub mod tokens;

pub use extractor::AuthenticatedUser;
pub use hashing::SecretHasher;
pub use service::{AccessIdentity, SessionAuthority};
pub use tokens::{Claims, TokenKind, TokenPair, TokenSigner};
