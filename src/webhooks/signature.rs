//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads using HMAC-SHA256 with a shared secret.
//! The signature is provided in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//!
//! Verification runs over the exact bytes received, before any parsing, and
//! fails closed: a missing secret or header never authenticates a request.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a GitHub signature header (e.g., "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex, etc.).
/// Never panics.
///
/// # Examples
///
/// ```
/// use pr_thread_relay::webhooks::parse_signature_header;
///
/// assert!(parse_signature_header("sha256=abcd1234").is_some());
/// assert!(parse_signature_header("abcd1234").is_none());
/// assert!(parse_signature_header("sha1=abcd1234").is_none());
/// assert!(parse_signature_header("sha256=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
///
/// Used by tests and tooling to produce valid deliveries.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value.
///
/// Returns a string in the format "sha256=<hex>".
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a GitHub webhook signature against the payload and secret.
///
/// Returns `true` only if a non-empty secret is configured, the header is
/// present and well-formed, and the digest matches. Uses constant-time
/// comparison to prevent timing attacks.
///
/// # Arguments
///
/// * `payload` - The raw webhook payload bytes
/// * `signature_header` - The value of the `X-Hub-Signature-256` header, if sent
/// * `secret` - The configured webhook secret, if any
///
/// # Examples
///
/// ```
/// use pr_thread_relay::webhooks::{verify_signature, compute_signature, format_signature_header};
///
/// let payload = b"Hello, World!";
/// let secret = b"my-secret-key";
///
/// let header = format_signature_header(&compute_signature(payload, secret));
///
/// assert!(verify_signature(payload, Some(&header), Some(secret)));
/// assert!(!verify_signature(payload, Some(&header), Some(b"wrong-secret")));
/// assert!(!verify_signature(payload, None, Some(secret)));
/// assert!(!verify_signature(payload, Some(&header), None));
/// ```
pub fn verify_signature(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: Option<&[u8]>,
) -> bool {
    let (Some(signature_header), Some(secret)) = (signature_header, secret) else {
        return false;
    };
    if secret.is_empty() {
        return false;
    }

    let Some(expected_signature) = parse_signature_header(signature_header) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison via the HMAC library
    mac.verify_slice(&expected_signature).is_ok()
}
