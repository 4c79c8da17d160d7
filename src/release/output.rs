//! The single line the action prints for its caller.
//!
//! The payload is base64 encoded so multi-line release notes survive being
//! passed through a workflow output. It is always the last line on stdout.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Payload when there is nothing to publish.
pub const NO_RELEASE_NOTES: &str = "No release notes needed!";

/// Payload when release notes were requested but the release PR is missing.
pub const UNABLE_TO_CREATE: &str = "Unable to create release notes!";

/// Encode a payload for the output line.
pub fn encode_output(payload: &str) -> String {
    STANDARD.encode(payload)
}

/// The output line for runs that publish nothing, including failed runs.
pub fn default_output() -> String {
    encode_output(NO_RELEASE_NOTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(), "Tm8gcmVsZWFzZSBub3RlcyBuZWVkZWQh");
    }

    #[test]
    fn test_multiline_payload_is_one_line() {
        let encoded = encode_output("Release notes\n\n**New features**\nA (#1)\n");
        assert!(!encoded.contains('\n'));
        assert_eq!(STANDARD.decode(&encoded).unwrap(), b"Release notes\n\n**New features**\nA (#1)\n");
    }
}
