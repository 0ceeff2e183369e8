// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AVDECC Global Configuration - Single Source of Truth
//!
//! This module centralizes ALL IEEE 1722.1 wire constants and protocol timing.
//! **NEVER hardcode elsewhere!**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (EtherType, subtypes, MACs,
//!   timeouts from IEEE 1722.1-2013)
//! - **Level 2 (Dynamic)**: [`ProtocolTolerance`] boot-time knobs for
//!   misbehaving-device workarounds

use crate::model::MacAddr;
use std::time::Duration;

// =======================================================================
// Ethernet / AVTP framing (IEEE 1722.1-2013 Clause 5 + IEEE 1722)
// =======================================================================

/// AVTP EtherType (IEEE 1722).
pub const AVTP_ETHERTYPE: u16 = 0x22F0;

/// Maximum Ethernet II frame size accepted by the codec.
pub const ETHERNET_MAX_FRAME_SIZE: usize = 1522;

/// Ethernet II header length (dst + src + ethertype).
pub const ETHERNET_HEADER_LEN: usize = 14;

/// AVTP control header length (subtype .. control_data_length), excluding the
/// 64-bit stream_id slot that follows it.
pub const AVTP_CONTROL_HEADER_LEN: usize = 4;

/// AVTP version carried in every control PDU.
pub const AVTP_VERSION: u8 = 0x00;

/// AVTP subtype: AVDECC Discovery Protocol.
pub const AVTP_SUBTYPE_ADP: u8 = 0x7A;
/// AVTP subtype: AVDECC Enumeration and Control Protocol.
pub const AVTP_SUBTYPE_AECP: u8 = 0x7B;
/// AVTP subtype: AVDECC Connection Management Protocol.
pub const AVTP_SUBTYPE_ACMP: u8 = 0x7C;
/// AVTP subtype: MAAP (not handled by this engine, recognized for logging).
pub const AVTP_SUBTYPE_MAAP: u8 = 0x7E;

/// AVDECC multicast MAC for ADP and ACMP (IEEE 1722.1-2013 Clause 6.2.2 / 8.2.3).
pub const AVDECC_MULTICAST_MAC: MacAddr = MacAddr::new([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x00]);

/// Multicast MAC for AEM IDENTIFY notifications (IEEE 1722.1-2013 Clause 7.5.1).
pub const IDENTIFY_MULTICAST_MAC: MacAddr = MacAddr::new([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x01]);

// =======================================================================
// PDU body lengths
// =======================================================================

/// ADPDU control_data_length: the 56-byte body following the entity_id slot
/// (IEEE 1722.1-2013 Clause 6.2.1).
pub const ADPDU_LEN: usize = 56;

/// ACMPDU control_data_length: the 44-byte body following the stream_id slot
/// (IEEE 1722.1-2013 Clause 8.2.1).
pub const ACMPDU_LEN: usize = 44;

/// AECPDU common header after the target_entity_id slot: controller_entity_id
/// + sequence_id (IEEE 1722.1-2013 Clause 9.2.1).
pub const AECPDU_HEADER_LEN: usize = 10;

/// AEM family header: unsolicited bit + command_type (Clause 9.2.1.2).
pub const AEM_HEADER_LEN: usize = 2;

/// AA family header: tlv_count (Clause 9.2.1.3).
pub const AA_HEADER_LEN: usize = 2;

/// AA TLV header: mode/length word + 64-bit address (Clause 9.2.1.3.3).
pub const AA_TLV_HEADER_LEN: usize = 10;

/// Vendor-unique protocol identifier length (Clause 9.2.1.5).
pub const VU_PROTOCOL_ID_LEN: usize = 6;

/// MVU family header after the protocol identifier: reserved bit + command_type.
pub const MVU_HEADER_LEN: usize = 2;

/// Maximum AECPDU length counted from the controller_entity_id field
/// (IEEE 1722.1-2013 Clause 9.2.1.1.7).
pub const AECPDU_MAX_LEN: usize = 524;

/// Maximum AEM command-specific payload that fits the 524-byte AECPDU cap.
pub const AEM_MAX_PAYLOAD_LEN: usize = AECPDU_MAX_LEN - AECPDU_HEADER_LEN - AEM_HEADER_LEN;

/// Milan vendor-unique protocol identifier: Avnu OUI-36 (00-1B-C5-0A-C) +
/// MVU ProtocolUniqueIdentifier (0x100).
pub const MVU_PROTOCOL_ID: [u8; VU_PROTOCOL_ID_LEN] = [0x00, 0x1B, 0xC5, 0x0A, 0xC1, 0x00];

// =======================================================================
// Protocol timing (IEEE 1722.1-2013 Clause 8.2.2 / 9.2.1)
// =======================================================================

/// AEM command timeout (Clause 9.2.1).
pub const AECP_AEM_TIMEOUT: Duration = Duration::from_millis(250);
/// Address Access command timeout (Clause 9.2.1).
pub const AECP_AA_TIMEOUT: Duration = Duration::from_millis(250);
/// Vendor Unique command timeout. Not normative, vendors may differ; Milan
/// devices answer well within the AEM budget.
pub const AECP_VU_TIMEOUT: Duration = Duration::from_millis(250);

/// Retries after the first send for AEM and MVU commands (3 sends total).
/// Address Access and ACMP commands are never retried at this layer.
pub const AECP_RETRIES: u8 = 2;

/// ACMP per-message-type command timeouts (Clause 8.2.2).
pub const ACMP_CONNECT_TX_TIMEOUT: Duration = Duration::from_millis(2000);
pub const ACMP_DISCONNECT_TX_TIMEOUT: Duration = Duration::from_millis(200);
pub const ACMP_GET_TX_STATE_TIMEOUT: Duration = Duration::from_millis(200);
pub const ACMP_CONNECT_RX_TIMEOUT: Duration = Duration::from_millis(4500);
pub const ACMP_DISCONNECT_RX_TIMEOUT: Duration = Duration::from_millis(500);
pub const ACMP_GET_RX_STATE_TIMEOUT: Duration = Duration::from_millis(200);
pub const ACMP_GET_TX_CONNECTION_TIMEOUT: Duration = Duration::from_millis(200);

/// Delay between two global ENTITY_DISCOVER broadcasts.
pub const DISCOVER_SEND_PERIOD: Duration = Duration::from_secs(10);

/// Worker thread tick. Bounds shutdown latency and timeout-detection jitter.
pub const STATE_MACHINE_TICK: Duration = Duration::from_millis(10);

// =======================================================================
// Tolerance knobs
// =======================================================================

/// Boot-time workarounds for non-conformant devices.
///
/// The defaults match what shipping AVB hardware requires in the field; strict
/// mode (`ProtocolTolerance::strict()`) is useful for conformance testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolTolerance {
    /// Ignore mismatches between the advertised control_data_length and the
    /// actual buffer size, clamping to the bytes present. Some vendor devices
    /// advertise more bytes than they send.
    pub accept_invalid_control_data_length: bool,
    /// A non-SUCCESS response may omit payload fields; deliver the status with
    /// default-initialized values instead of a protocol error.
    pub accept_invalid_non_success_response: bool,
    /// Accept GET_AUDIO_MAP responses that reference mapping descriptors the
    /// device never exposed.
    pub accept_missing_mapping_descriptors: bool,
    /// Accept inbound AECPDUs larger than the 524-byte cap.
    pub accept_oversize_aecp_in: bool,
    /// Allow building outbound AECPDUs larger than the 524-byte cap.
    pub accept_oversize_aecp_out: bool,
}

impl Default for ProtocolTolerance {
    fn default() -> Self {
        Self {
            accept_invalid_control_data_length: true,
            accept_invalid_non_success_response: true,
            accept_missing_mapping_descriptors: true,
            accept_oversize_aecp_in: true,
            accept_oversize_aecp_out: false,
        }
    }
}

impl ProtocolTolerance {
    /// All knobs off: reject everything the standard rejects.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            accept_invalid_control_data_length: false,
            accept_invalid_non_success_response: false,
            accept_missing_mapping_descriptors: false,
            accept_oversize_aecp_in: false,
            accept_oversize_aecp_out: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance_matches_field_requirements() {
        let tol = ProtocolTolerance::default();
        assert!(tol.accept_invalid_control_data_length);
        assert!(tol.accept_invalid_non_success_response);
        assert!(tol.accept_oversize_aecp_in);
        assert!(!tol.accept_oversize_aecp_out);
    }

    #[test]
    fn aem_payload_budget_respects_aecp_cap() {
        assert_eq!(AEM_MAX_PAYLOAD_LEN, 512);
        assert_eq!(AECPDU_HEADER_LEN + AEM_HEADER_LEN + AEM_MAX_PAYLOAD_LEN, AECPDU_MAX_LEN);
    }
}
