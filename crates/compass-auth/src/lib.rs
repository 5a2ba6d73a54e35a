//! compass-auth
//!
//! Password hashing and session tokens. Sessions are HS256 JWTs signed with
//! a server secret; passwords are stored as salted PBKDF2-SHA256 hashes.

pub mod error;
pub mod jwt;
pub mod password;
