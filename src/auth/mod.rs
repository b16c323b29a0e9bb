mod login;
mod logout;
mod signup;

use axum::{routing::{get, post}, Router};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login::auth_page))
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .route("/logout", get(logout::logout))
}

/// Salted SHA-256, stored as `hex(salt)$hex(digest)`.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::rng().random();
    let digest = Sha256::digest([&salt[..], password.as_bytes()].concat());
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let digest = Sha256::digest([salt.as_slice(), password.as_bytes()].concat());
    hex::encode(digest) == digest_hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_rejects_wrong_password() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
        assert!(!verify_password("hunter22", "garbage"));
    }

    #[test]
    fn salting_makes_hashes_differ() {
        assert_ne!(hash_password("hunter22"), hash_password("hunter22"));
    }
}
