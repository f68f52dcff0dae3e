//! Ledger account address derivation for a caller identity.
//!
//! `address = hex(crc32_be(h) ++ h)` where
//! `h = sha224(0x0A ++ "account-id" ++ identity ++ subaccount)`.

use crate::models::identity::CallerId;
use sha2::{Digest, Sha224};

const DOMAIN_SEPARATOR: &[u8] = b"\x0Aaccount-id";

/// Subaccount used when the caller names none.
pub const DEFAULT_SUBACCOUNT: [u8; 32] = [0; 32];

/// Derive the hex account address of `caller` under `subaccount`.
pub fn account_address(caller: &CallerId, subaccount: &[u8; 32]) -> String {
    let mut hasher = Sha224::new();
    hasher.update(DOMAIN_SEPARATOR);
    hasher.update(caller.as_str().as_bytes());
    hasher.update(subaccount);
    let hash = hasher.finalize();

    let checksum = crc32fast::hash(&hash);
    let mut bytes = Vec::with_capacity(4 + hash.len());
    bytes.extend_from_slice(&checksum.to_be_bytes());
    bytes.extend_from_slice(&hash);
    hex::encode(bytes)
}

/// Address of `caller` with the default subaccount.
pub fn address_for_caller(caller: &CallerId) -> String {
    account_address(caller, &DEFAULT_SUBACCOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_64_lowercase_hex_chars() {
        let address = address_for_caller(&CallerId::from("amy"));
        assert_eq!(address.len(), 64);
        assert!(
            address
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn checksum_prefix_covers_hash() {
        let address = address_for_caller(&CallerId::from("amy"));
        let bytes = hex::decode(&address).unwrap();
        let (checksum, hash) = bytes.split_at(4);
        assert_eq!(checksum, crc32fast::hash(hash).to_be_bytes());
    }

    #[test]
    fn derivation_is_deterministic_and_identity_bound() {
        let amy = CallerId::from("amy");
        assert_eq!(address_for_caller(&amy), address_for_caller(&amy));
        assert_ne!(
            address_for_caller(&amy),
            address_for_caller(&CallerId::from("bob"))
        );
        assert_ne!(
            address_for_caller(&amy),
            account_address(&amy, &[1; 32])
        );
    }
}
