//! Password hashing
//!
//! Passwords are stored as SHA-256 over a random 16-byte salt (hex) followed
//! by the password. Accounts created without a password store empty strings
//! in both columns and accept any login for their e-mail.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salted password digest as stored in `users.password_hash` / `password_salt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

impl PasswordHash {
    /// Hash with a freshly generated salt
    pub fn generate(password: &str) -> Self {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = to_hex(&salt_bytes);
        let hash = digest(&salt, password);
        Self { hash, salt }
    }

    /// Placeholder for accounts without a password
    pub fn none() -> Self {
        Self {
            hash: String::new(),
            salt: String::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        !self.hash.is_empty()
    }

    /// Check a login attempt against this hash
    ///
    /// An unset hash accepts anything.
    pub fn verify(&self, password: Option<&str>) -> bool {
        if !self.is_set() {
            return true;
        }
        match password {
            Some(password) => digest(&self.salt, password) == self.hash,
            None => false,
        }
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
