//! Synthetic payload generators.

/// The eight-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bytes that look like a PNG to anything checking the signature, padded to
/// exactly `len` bytes.
///
/// Nothing in the workspace decodes images, so the body after the signature
/// is zeroes. Lengths shorter than the signature are truncated signatures.
///
/// ```
/// use test_utils::fake_png;
///
/// let png = fake_png(5500);
/// assert_eq!(png.len(), 5500);
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn fake_png(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    let head = len.min(PNG_SIGNATURE.len());
    data[..head].copy_from_slice(&PNG_SIGNATURE[..head]);
    data
}

/// An unused local URL: connecting to it is refused.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
