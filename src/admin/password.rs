//! Admin password verification.
//!
//! Precedence: scrypt digest, then salted SHA-256, then a plain password.

use std::fmt::Write as _;

use scrypt::{scrypt, Params};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AdminConfig;

/// How the configured admin password is stored.
#[derive(Clone)]
pub enum PasswordCheck {
    /// Hex scrypt key of `password` with `salt` (N=16384, r=8, p=1, 64 bytes).
    Scrypt { digest: String, salt: String },
    /// Hex SHA-256 of `password + salt`.
    SaltedSha256 { digest: String, salt: String },
    Plain(String),
    /// Nothing configured; every attempt fails.
    Unconfigured,
}

impl std::fmt::Debug for PasswordCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            PasswordCheck::Scrypt { .. } => "scrypt",
            PasswordCheck::SaltedSha256 { .. } => "salted_sha256",
            PasswordCheck::Plain(_) => "plain",
            PasswordCheck::Unconfigured => "unconfigured",
        };
        f.debug_tuple("PasswordCheck").field(&mode).finish()
    }
}

impl PasswordCheck {
    pub fn from_config(config: &AdminConfig) -> Self {
        if let (Some(digest), Some(salt)) = (&config.password_scrypt, &config.password_salt) {
            return PasswordCheck::Scrypt {
                digest: digest.trim().to_ascii_lowercase(),
                salt: salt.clone(),
            };
        }
        match (&config.password_sha256, &config.password_salt, &config.password) {
            (Some(digest), Some(salt), _) => PasswordCheck::SaltedSha256 {
                digest: digest.trim().to_ascii_lowercase(),
                salt: salt.clone(),
            },
            (_, _, Some(plain)) => PasswordCheck::Plain(plain.clone()),
            _ => PasswordCheck::Unconfigured,
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            PasswordCheck::Scrypt { digest, salt } => match scrypt_hex(candidate, salt) {
                Some(hashed) => constant_time_eq(&hashed, digest),
                None => false,
            },
            PasswordCheck::SaltedSha256 { digest, salt } => {
                constant_time_eq(&salted_sha256_hex(candidate, salt), digest)
            }
            PasswordCheck::Plain(expected) => constant_time_eq(candidate, expected),
            PasswordCheck::Unconfigured => {
                tracing::error!("Admin password is not configured; rejecting login");
                false
            }
        }
    }
}

pub fn salted_sha256_hex(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.update(salt);
    format!("{:x}", hasher.finalize())
}

/// Hex scrypt key with the usual interactive parameters (log2 N = 14, r = 8, p = 1).
pub fn scrypt_hex(password: &str, salt: &str) -> Option<String> {
    let params = Params::new(14, 8, 1, SCRYPT_KEY_LEN).ok()?;
    scrypt_hex_with(password, salt, &params)
}

const SCRYPT_KEY_LEN: usize = 64;

fn scrypt_hex_with(password: &str, salt: &str, params: &Params) -> Option<String> {
    let mut key = [0u8; SCRYPT_KEY_LEN];
    if let Err(e) = scrypt(password.as_bytes(), salt.as_bytes(), params, &mut key) {
        tracing::error!(error = %e, "scrypt key derivation failed");
        return None;
    }
    let mut hex = String::with_capacity(SCRYPT_KEY_LEN * 2);
    for byte in key {
        let _ = write!(hex, "{:02x}", byte);
    }
    Some(hex)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    a.len() == b.len() && a.ct_eq(b).into()
}
