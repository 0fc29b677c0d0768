//! Confirmation codes for passwordless signup.
//!
//! A code is `{issued_at_hex}.{mac}` where the MAC commits to the user's
//! current state plus a per-user random seed. Nothing is stored: redeeming
//! rotates the seed, which invalidates every code issued before it, and any
//! state change (email, role) does the same. Expiry comes from the embedded
//! timestamp.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};

use reviewdeck_database::User;

pub struct CodeIssuer {
    key: [u8; 32],
    ttl_seconds: u64,
}

impl CodeIssuer {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            key: sha256(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub fn issue(&self, user: &User) -> String {
        let issued_at = Utc::now().timestamp();
        let mac = self.mac(user, issued_at);
        format!("{issued_at:x}.{}", URL_SAFE_NO_PAD.encode(mac))
    }

    /// Check a code against the user's current state. Expired, malformed,
    /// and stale-seed codes all fail the same way; the caller does not
    /// learn which.
    pub fn verify(&self, user: &User, code: &str) -> bool {
        let Some((timestamp_part, mac_part)) = code.split_once('.') else {
            return false;
        };
        let Ok(issued_at) = i64::from_str_radix(timestamp_part, 16) else {
            return false;
        };

        let now = Utc::now().timestamp();
        if issued_at > now {
            return false;
        }
        if (now - issued_at) as u64 > self.ttl_seconds {
            return false;
        }

        let Ok(presented) = URL_SAFE_NO_PAD.decode(mac_part) else {
            return false;
        };

        constant_time_eq(&self.mac(user, issued_at), &presented)
    }

    fn mac(&self, user: &User, issued_at: i64) -> [u8; 32] {
        let payload = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}",
            user.id,
            user.username,
            user.email,
            user.role.as_str(),
            user.is_staff,
            user.confirmation_seed,
            issued_at,
        );
        hmac_sha256(&self.key, payload.as_bytes())
    }
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// HMAC: H((K XOR opad) || H((K XOR ipad) || message))
fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut o_key_pad = [0x5cu8; 64];
    let mut i_key_pad = [0x36u8; 64];

    for i in 0..32 {
        o_key_pad[i] ^= key[i];
        i_key_pad[i] ^= key[i];
    }

    let mut inner_hash = Sha256::new();
    inner_hash.update(i_key_pad);
    inner_hash.update(data);
    let inner_result = inner_hash.finalize();

    let mut outer_hash = Sha256::new();
    outer_hash.update(o_key_pad);
    outer_hash.update(inner_result);
    outer_hash.finalize().into()
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
