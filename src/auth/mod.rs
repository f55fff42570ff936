//! Authentication: credential hashing, bearer tokens, and the extractor
//! that resolves `Authorization: Bearer` headers to the current user.

pub mod extract;
pub mod passwords;
pub mod service;
pub mod tokens;

pub use extract::CurrentUser;
pub use service::AuthService;
pub use tokens::{Claims, TokenSigner};
