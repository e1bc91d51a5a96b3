use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::error::ApiError;

/// Similarity ratio at or above which a password counts as a copy of a user
/// attribute.
pub const MAX_SIMILARITY: f64 = 0.7;

/// Attribute values longer than this are never compared. No stored username
/// or email can be that long.
pub const MAX_ATTRIBUTE_LENGTH: usize = 254;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "passw0rd", "123456", "1234567", "12345678",
    "123456789", "1234567890", "12345", "qwerty", "qwerty123", "qwertyuiop", "abc123",
    "abcdef", "abcd1234", "111111", "000000", "123123", "654321", "iloveyou", "admin",
    "admin123", "administrator", "welcome", "welcome1", "letmein", "monkey", "dragon",
    "football", "baseball", "sunshine", "princess", "master", "shadow", "superman",
    "trustno1", "whatever", "starwars", "changeme", "secret", "login", "zaq12wsx",
    "1q2w3e4r", "1qaz2wsx", "q1w2e3r4", "asdfghjkl", "asdfgh", "michael", "jennifer",
];

/// PasswordPolicy
///
/// Strength checks applied before any password is hashed.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Every rule the password breaks, as user-facing messages. Empty means
    /// the password is acceptable.
    pub fn check(&self, password: &str, username: &str, email: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(attribute) = similar_attribute(password, username, email) {
            problems.push(format!("The password is too similar to the {attribute}."));
        }
        if password.chars().count() < self.min_length {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }
        let lowered = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            problems.push("This password is too common.".to_string());
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }

        problems
    }
}

/// Hashes a password into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against a stored hash. A missing or unparsable hash
/// never verifies.
pub fn verify_password(password: &str, stored: Option<&str>) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// Names the first user attribute the password is too close to.
fn similar_attribute(password: &str, username: &str, email: &str) -> Option<&'static str> {
    let password = password.to_lowercase();
    let password_len = password.chars().count();
    let attributes = [("username", username), ("email address", email)];

    for (label, value) in attributes {
        if value.is_empty() {
            continue;
        }
        let value = value.to_lowercase();
        let mut parts: Vec<&str> = value
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|part| !part.is_empty())
            .collect();
        parts.push(&value);

        if parts.iter().any(|part| {
            let part_len = part.chars().count();
            part_len <= MAX_ATTRIBUTE_LENGTH
                && !exceeds_length_ratio(password_len, part_len)
                && similarity(&password, part) >= MAX_SIMILARITY
        }) {
            return Some(label);
        }
    }
    None
}

/// True when the password is so much longer than the attribute value that the
/// two cannot reach `MAX_SIMILARITY`. Such pairs are never compared.
pub fn exceeds_length_ratio(password_len: usize, value_len: usize) -> bool {
    password_len >= 10 * value_len
        && (value_len as f64) < (MAX_SIMILARITY / 2.0) * password_len as f64
}

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * matched_chars(&a, &b)) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_chars(&a[..start_a], &b[..start_b])
        + matched_chars(&a[start_a + len..], &b[start_b + len..])
}

fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut current = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                current[j + 1] = previous[j] + 1;
                if current[j + 1] > best.2 {
                    best = (i + 1 - current[j + 1], j + 1 - current[j + 1], current[j + 1]);
                }
            }
        }
        previous = current;
    }
    best
}
