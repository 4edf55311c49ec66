use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Compares a plain-text candidate against a stored bcrypt hash.
pub fn verify_password(provided: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(provided, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_against_stored_hash() {
        // low cost keeps the test fast
        let hashed = hash("Passw0rd!", 4).unwrap();
        assert!(verify_password("Passw0rd!", &hashed).unwrap());
        assert!(!verify_password("passw0rd!", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Passw0rd!").unwrap();
        let b = hash_password("Passw0rd!").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("Passw0rd!", &a).unwrap());
    }
}
