use crate::error::AppError;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated student passwords.
pub const GENERATED_LENGTH: usize = 8;

pub fn hash(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A malformed stored hash never matches.
pub fn verify(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Random alphanumeric password handed out once on creation or reset.
pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_alphanumeric() {
        let pw = generate();
        assert_eq!(pw.len(), GENERATED_LENGTH);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hashes_verify_only_their_password() {
        let hashed = hash("correct horse", 4).unwrap();
        assert!(verify("correct horse", &hashed));
        assert!(!verify("battery staple", &hashed));
        assert!(!verify("correct horse", "not-a-hash"));
    }
}
