//! Gateway webhook signature verification. The gateway signs
//! `"{order_id}|{payment_id}"` with a shared secret; we recompute the
//! HMAC-SHA256 digest and compare in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies (and, for tests and the demo flow, produces) gateway signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return None;
        };
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Some(mac)
    }

    /// Hex-encoded signature the gateway would send for this payment.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        match self.mac(order_id, payment_id) {
            Some(mac) => hex::encode(mac.finalize().into_bytes()),
            None => String::new(),
        }
    }

    /// Constant-time check of a hex-encoded signature.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let Some(mac) = self.mac(order_id, payment_id) else {
            return false;
        };
        mac.verify_slice(&signature).is_ok()
    }
}
