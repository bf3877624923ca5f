use sha2::Digest;

/// Hex-encoded sha256 digest, used to fingerprint the schema document so a
/// report records exactly which schema it certified against.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}
