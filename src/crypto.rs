use rand::RngCore;
use rand::rngs::OsRng;

use crate::SessionError;

/// Number of random bytes behind every session id.
pub const SESSION_ID_BYTES: usize = 16;

/// Length of an encoded session id in characters.
pub const SESSION_ID_LENGTH: usize = SESSION_ID_BYTES * 2;

/// Generates a session id from the operating system's random source.
///
/// The id is 16 random bytes encoded as 32 lowercase hex characters.
///
/// # Errors
///
/// Returns `SessionError::EntropyUnavailable` if the OS cannot supply
/// random bytes. No id is produced in that case.
///
/// # Example
///
/// ```rust
/// use visitor_session::crypto::generate_session_id;
///
/// let id = generate_session_id().unwrap();
/// assert_eq!(id.len(), 32);
/// ```
pub fn generate_session_id() -> Result<String, SessionError> {
    generate_session_id_from(&mut OsRng)
}

/// Generates a session id from the given random source.
pub fn generate_session_id_from<R>(rng: &mut R) -> Result<String, SessionError>
where
    R: RngCore + ?Sized,
{
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| SessionError::EntropyUnavailable(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy pool closed"))
        }
    }

    #[test]
    fn test_generate_session_id_length() {
        let id = generate_session_id().unwrap();
        assert_eq!(id.len(), SESSION_ID_LENGTH);
        assert!(id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_generate_session_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_session_id().unwrap()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generate_session_id_entropy_failure() {
        let result = generate_session_id_from(&mut BrokenRng);
        assert!(matches!(result, Err(SessionError::EntropyUnavailable(_))));
    }
}
