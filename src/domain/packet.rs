//! Command packet encoding
//!
//! A packet is the ASCII text `MM RRR GGG BBB` without separators: a two
//! character mode prefix followed by each channel right-justified to three
//! digits with `'0'`. Nothing frames it; the peripheral reads it positionally.
//!
//! ```text
//! "02" + "255" + "000" + "000"  ->  "02255000000"
//! ```

use crate::domain::errors::ControllerError;
use crate::domain::models::{ChannelPolicy, Color, ModePrefixPolicy};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Length of a packet whose channels are all in `0..=255`.
pub const PACKET_LEN: usize = 11;

/// Prefix used for every mode the policy does not recognize.
pub const FALLBACK_PREFIX: &str = "04";

const FIELD_WIDTH: usize = 3;

/// Encoded command text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PacketString(String);

impl PacketString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Base64 form handed to the transport write primitive.
    pub fn transport_encode(&self) -> TransportPayload {
        TransportPayload(STANDARD.encode(self.0.as_bytes()))
    }
}

impl fmt::Display for PacketString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base64 text of a packet, the value format of the write primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPayload(String);

impl TransportPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes for transports whose native write takes bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.0)
    }
}

impl fmt::Display for TransportPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Packet encoder with the two policy knobs from the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketEncoder {
    pub mode_policy: ModePrefixPolicy,
    pub channel_policy: ChannelPolicy,
}

impl PacketEncoder {
    pub fn new(mode_policy: ModePrefixPolicy, channel_policy: ChannelPolicy) -> Self {
        Self {
            mode_policy,
            channel_policy,
        }
    }

    pub fn encode(&self, mode: &str, color: Color) -> Result<PacketString, ControllerError> {
        if self.channel_policy == ChannelPolicy::Reject {
            for (channel, value) in color.channels() {
                if !(0..=255).contains(&value) {
                    return Err(ControllerError::InvalidChannel { channel, value });
                }
            }
        }
        Ok(build(mode_prefix(mode, self.mode_policy), color))
    }
}

/// Encode with the default policies. Never fails.
pub fn encode(mode: &str, color: Color) -> PacketString {
    build(mode_prefix(mode, ModePrefixPolicy::Observed), color)
}

pub fn mode_prefix(mode: &str, policy: ModePrefixPolicy) -> &'static str {
    match (policy, mode) {
        (_, "02") => "02",
        (ModePrefixPolicy::Distinct, "01") => "01",
        _ => FALLBACK_PREFIX,
    }
}

fn build(prefix: &str, color: Color) -> PacketString {
    let mut packet = String::with_capacity(PACKET_LEN);
    packet.push_str(prefix);
    for (_, value) in color.channels() {
        packet.push_str(&pad_field(value));
    }
    PacketString(packet)
}

// Pads the decimal text, not the number: -5 becomes "0-5".
fn pad_field(value: i32) -> String {
    format!("{:0>width$}", value.to_string(), width = FIELD_WIDTH)
}
