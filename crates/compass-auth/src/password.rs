use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const MIN_PASSWORD_LEN: usize = 8;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;
const SCHEME: &str = "pbkdf2-sha256";
const ABSENT_SALT: &[u8; SALT_LENGTH] = b"compass-no-user!";

/// Hash a password for storage as `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    Ok(encode(password, &salt, PBKDF2_ITERATIONS))
}

/// Check a password against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let (iterations, salt, expected) = decode(stored).inspect_err(|_| {
        tracing::warn!("stored password hash is malformed");
    })?;
    let mut actual = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut actual);
    Ok(actual.ct_eq(&expected).into())
}

/// Pay for one full verification when there is no account to check against,
/// so an unknown email is rejected in the same time as a wrong password.
pub fn verify_absent(password: &str) -> bool {
    let mut sink = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), ABSENT_SALT, PBKDF2_ITERATIONS, &mut sink);
    false
}

fn decode(stored: &str) -> Result<(u32, Vec<u8>, Vec<u8>), AuthError> {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };

    let iterations: u32 = iterations.parse().map_err(|_| AuthError::MalformedHash)?;
    if iterations == 0 {
        return Err(AuthError::MalformedHash);
    }
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| AuthError::MalformedHash)?;
    let expected = STANDARD_NO_PAD
        .decode(expected)
        .map_err(|_| AuthError::MalformedHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(AuthError::MalformedHash);
    }
    Ok((iterations, salt, expected))
}

fn encode(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}
