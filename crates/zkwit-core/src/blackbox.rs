//! Black-box hash functions over variable-length byte witnesses.

use sha2::{Digest as _, Sha256};
use zkwit_field::Fe;

use crate::circuit::Witness;

const BLOCK: usize = 64;

/// SHA-256 of `data`.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// HMAC-SHA256 (RFC 2104).
#[must_use]
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut k = [0u8; BLOCK];
    if key.len() > BLOCK {
        k[..32].copy_from_slice(&sha256(key));
    } else {
        k[..key.len()].copy_from_slice(key);
    }
    let mut inner = Sha256::new();
    inner.update(k.map(|b| b ^ 0x36));
    inner.update(message);
    let inner = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(k.map(|b| b ^ 0x5c));
    outer.update(inner);
    outer.finalize().into()
}

/// Read the first `len` byte witnesses of `words`.
///
/// Fails if a value is unassigned, `len` exceeds `words.len()`, or a byte in
/// the live prefix is not below 256. Bytes past `len` are ignored.
pub(crate) fn read_bytes(
    words: &[Witness],
    len: Witness,
    get: &impl Fn(Witness) -> Option<Fe>,
) -> Result<Vec<u8>, String> {
    let n = get(len).ok_or_else(|| format!("length {len} is unassigned"))?.as_u64();
    let n = usize::try_from(n)
        .ok()
        .filter(|&n| n <= words.len())
        .ok_or_else(|| format!("length {n} exceeds capacity {}", words.len()))?;
    words[..n]
        .iter()
        .map(|&w| {
            let v = get(w).ok_or_else(|| format!("byte {w} is unassigned"))?;
            u8::try_from(v.as_u64()).map_err(|_| format!("{w} = {v} is not a byte"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn long_keys_are_hashed_first() {
        let key = [0xaau8; 131];
        let mac = hmac_sha256(&key, b"Test Using Larger Than Block-Size Key - Hash Key First");
        assert_eq!(
            hex::encode(mac),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn read_bytes_respects_len() {
        let words = [Witness(0), Witness(1), Witness(2)];
        let vals = [Fe::from_u64(7), Fe::from_u64(300), Fe::from_u64(1), Fe::from_u64(1)];
        let get = |w: Witness| vals.get(w.index()).copied();
        assert_eq!(read_bytes(&words, Witness(3), &get).unwrap(), vec![7]);
        let get_long = |w: Witness| if w.0 == 3 { Some(Fe::from_u64(2)) } else { get(w) };
        assert!(read_bytes(&words, Witness(3), &get_long).is_err());
        let get_over = |w: Witness| if w.0 == 3 { Some(Fe::from_u64(4)) } else { get(w) };
        assert!(read_bytes(&words, Witness(3), &get_over).is_err());
    }
}
