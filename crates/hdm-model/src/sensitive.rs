//! Wiping of request-scoped healthcare content.
//!
//! Uploaded dictionaries, extracted text, prompts and raw model output are
//! overwritten when their owning value is dropped.

use std::hint::black_box;

/// Overwrite a byte buffer with zeros and release its contents.
pub fn wipe_bytes(bytes: &mut Vec<u8>) {
    bytes.fill(0);
    black_box(&bytes);
    bytes.clear();
}

/// Overwrite a string's buffer with zeros and leave it empty.
pub fn wipe_string(value: &mut String) {
    let mut bytes = std::mem::take(value).into_bytes();
    wipe_bytes(&mut bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiping_leaves_empty_values() {
        let mut bytes = b"claim_id,string".to_vec();
        wipe_bytes(&mut bytes);
        assert!(bytes.is_empty());

        let mut text = "claims_detail.claim_id".to_string();
        wipe_string(&mut text);
        assert!(text.is_empty());
    }
}
