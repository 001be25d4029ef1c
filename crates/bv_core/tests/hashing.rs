use bv_core::hashing::{blake3_hex_prefixed, validate_blake3_prefixed};

#[test]
fn content_hash_is_prefixed_lowercase_hex() {
    let hash = blake3_hex_prefixed(b"x,y\n1,2");
    assert!(hash.starts_with("blake3:"));
    validate_blake3_prefixed(&hash).expect("generated hash validates");
}

#[test]
fn malformed_hashes_are_rejected() {
    assert_eq!(
        validate_blake3_prefixed("sha256:abc").expect_err("wrong prefix").code,
        "BV_HASH_INVALID_FORMAT"
    );
    assert_eq!(
        validate_blake3_prefixed("blake3:not-hex").expect_err("bad digest").code,
        "BV_HASH_DECODE_FAILED"
    );
}
