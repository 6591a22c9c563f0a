//! Settings payload codec: base64-wrapped JSON.
//!
//! The wire payload is the camelCase JSON document described in
//! [`cap_common::Settings`], wrapped in standard base64 so it survives
//! text-only carriers (clipboard items, line-oriented files).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use cap_common::settings::Settings;

use crate::error::ChannelError;

/// Decode a base64-wrapped JSON payload into a settings candidate.
///
/// Every failure mode is a typed error, never a panic: the poller logs and
/// retains the previous settings.
pub fn decode_payload(raw: &str) -> Result<Settings, ChannelError> {
    let bytes = BASE64.decode(raw.trim())?;
    let json = std::str::from_utf8(&bytes).map_err(|_| ChannelError::NotUtf8)?;
    Ok(serde_json::from_str(json)?)
}

/// Encode settings into the wire payload form. The inverse of
/// [`decode_payload`]; used by publishers and tests.
pub fn encode_payload(settings: &Settings) -> String {
    // Settings serialization cannot fail: all field types are plain data.
    let json = serde_json::to_string(settings).unwrap_or_default();
    BASE64.encode(json.as_bytes())
}
