use resourcekit_meta::HookError;

const HASH_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
// Lowest cost bcrypt accepts; keeps unit tests fast.
#[cfg(test)]
const COST: u32 = 4;

/// `true` if `value` already is a bcrypt hash and must not be hashed again.
#[must_use]
pub fn is_hashed(value: &str) -> bool {
    HASH_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// Hash `plain` with bcrypt.
///
/// This is CPU-bound (hundreds of milliseconds at the default cost) and runs synchronously
/// on the calling thread. The user hooks call it from inside the DAO's create/update
/// transaction, so the async worker and the open transaction are held for that long. Only
/// requests that carry a new plaintext password pay this; updates that omit the password
/// keep the stored hash without rehashing.
///
/// # Errors
/// Returns [`HookError::Internal`] if hashing fails.
pub fn hash(plain: &str) -> Result<String, HookError> {
    bcrypt::hash(plain, COST).map_err(|e| HookError::internal(format!("password hashing: {e}")))
}

/// Malformed hashes never verify.
#[must_use]
pub fn verify(candidate: &str, hash: &str) -> bool {
    bcrypt::verify(candidate, hash).unwrap_or(false)
}
