//! Jake light GATT addresses
//!
//! The light exposes one vendor service with a single writable command
//! characteristic. Both identifiers are baked into the firmware; there is no
//! discovery by capability.

use uuid::Uuid;

/// Vendor service holding the command characteristic
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x71c46861_691a_4b1e_9ddb_d722fa9ad632);

/// Command characteristic, written without response
pub const COMMAND_CHAR_UUID: Uuid = Uuid::from_u128(0x71c46862_691a_4b1e_9ddb_d722fa9ad632);

/// Advertised name fragment of the light
pub const DEFAULT_DEVICE_NAME: &str = "Jake";

/// Scan window before giving up on finding the light
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 10_000;

pub fn parse_uuid(uuid_str: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(uuid_str.trim())
        .map_err(|e| anyhow::anyhow!("Invalid UUID format '{}': {}", uuid_str, e))
}
