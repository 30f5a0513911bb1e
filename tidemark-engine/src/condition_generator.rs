//! Condition generator - fresh crypto-condition pairs for escrows
//!
//! Produces PREIMAGE-SHA-256 crypto-condition pairs: a condition safe to
//! embed in the on-ledger escrow-create transaction, and the fulfillment
//! that must stay secret until the escrow is finished. Pairs are never
//! reused; every escrow gets a fresh 32-byte preimage from the OS random
//! source, and a failure to read it propagates instead of falling back to a
//! weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::EscrowError;
use crate::EscrowResult;

/// Preimage length in bytes; the condition cost equals this value
const PREIMAGE_LEN: usize = 32;

// DER framing for the PREIMAGE-SHA-256 type. The fulfillment wraps the raw
// preimage; the condition wraps the SHA-256 fingerprint plus the cost.
const FULFILLMENT_HEADER: [u8; 4] = [0xA0, 0x22, 0x80, 0x20];
const CONDITION_HEADER: [u8; 4] = [0xA0, 0x25, 0x80, 0x20];
const CONDITION_COST_SUFFIX: [u8; 3] = [0x81, 0x01, 0x20];

/// A condition and its paired fulfillment, upper-hex encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionPair {
    /// Hash commitment, disclosed in the escrow-create transaction
    pub condition: String,
    /// Serialized proof of the preimage, disclosed only at finish time
    pub fulfillment: String,
}

/// Stateless generator for one-shot condition pairs
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionGenerator;

impl ConditionGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh pair from 32 bytes of OS entropy
    pub fn generate(&self) -> EscrowResult<ConditionPair> {
        let mut preimage = [0u8; PREIMAGE_LEN];
        OsRng
            .try_fill_bytes(&mut preimage)
            .map_err(|e| EscrowError::entropy(e.to_string()))?;

        Ok(ConditionPair {
            condition: hex::encode_upper(condition_binary(&preimage)),
            fulfillment: hex::encode_upper(fulfillment_binary(&preimage)),
        })
    }
}

fn fulfillment_binary(preimage: &[u8; PREIMAGE_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FULFILLMENT_HEADER.len() + PREIMAGE_LEN);
    out.extend_from_slice(&FULFILLMENT_HEADER);
    out.extend_from_slice(preimage);
    out
}

fn condition_binary(preimage: &[u8; PREIMAGE_LEN]) -> Vec<u8> {
    let fingerprint = Sha256::digest(preimage);
    let mut out =
        Vec::with_capacity(CONDITION_HEADER.len() + fingerprint.len() + CONDITION_COST_SUFFIX.len());
    out.extend_from_slice(&CONDITION_HEADER);
    out.extend_from_slice(&fingerprint);
    out.extend_from_slice(&CONDITION_COST_SUFFIX);
    out
}

/// Check that a serialized fulfillment proves the given condition.
///
/// Decodes the fulfillment, extracts the preimage, re-derives the condition
/// and compares. Malformed hex or framing simply fails the check; the ledger
/// performs the authoritative verification at submission time.
pub fn verify(condition_hex: &str, fulfillment_hex: &str) -> bool {
    let Ok(fulfillment) = hex::decode(fulfillment_hex) else {
        return false;
    };
    let Ok(condition) = hex::decode(condition_hex) else {
        return false;
    };

    if fulfillment.len() != FULFILLMENT_HEADER.len() + PREIMAGE_LEN
        || fulfillment[..FULFILLMENT_HEADER.len()] != FULFILLMENT_HEADER
    {
        return false;
    }

    let mut preimage = [0u8; PREIMAGE_LEN];
    preimage.copy_from_slice(&fulfillment[FULFILLMENT_HEADER.len()..]);

    condition_binary(&preimage) == condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_pair_verifies() {
        let pair = ConditionGenerator::new().generate().unwrap();
        assert!(verify(&pair.condition, &pair.fulfillment));
    }

    #[test]
    fn pair_is_upper_hex_with_expected_framing() {
        let pair = ConditionGenerator::new().generate().unwrap();
        assert!(pair.condition.starts_with("A0258020"));
        assert!(pair.condition.ends_with("810120"));
        assert_eq!(pair.condition.len(), 78);
        assert!(pair.fulfillment.starts_with("A0228020"));
        assert_eq!(pair.fulfillment.len(), 72);
        assert!(pair.condition.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn mismatched_pair_fails_verification() {
        let generator = ConditionGenerator::new();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert!(!verify(&a.condition, &b.fulfillment));
        assert!(!verify(&b.condition, &a.fulfillment));
    }

    #[test]
    fn malformed_inputs_fail_verification() {
        let pair = ConditionGenerator::new().generate().unwrap();
        assert!(!verify("not hex", &pair.fulfillment));
        assert!(!verify(&pair.condition, "not hex"));
        // Truncated fulfillment
        assert!(!verify(&pair.condition, &pair.fulfillment[..40]));
        // Wrong framing byte
        let mut tampered = pair.fulfillment.clone();
        tampered.replace_range(0..2, "A1");
        assert!(!verify(&pair.condition, &tampered));
    }

    #[test]
    fn conditions_do_not_collide_across_draws() {
        let generator = ConditionGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let pair = generator.generate().unwrap();
            assert!(seen.insert(pair.condition), "condition reused across draws");
        }
    }
}
