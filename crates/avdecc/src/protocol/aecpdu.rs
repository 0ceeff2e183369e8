// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AECPDU codec (IEEE 1722.1-2013 Clause 9.2).
//!
//! Three sub-families share the common AECP header (target, controller,
//! sequence id):
//!
//! - **AEM** (Clause 9.2.1.2): unsolicited bit + 15-bit command type + payload
//! - **AA** (Clause 9.2.1.3): address-access TLV list
//! - **MVU** (Milan): vendor-unique with the Milan protocol identifier
//!
//! An AECPDU must not exceed 524 octets counted from the controller_entity_id
//! field (Clause 9.2.1.1.7); the tolerance knobs relax this per direction.

use super::cursor::{Reader, Writer};
use super::{write_frame_header, ControlHeader, PduError};
use crate::config::{self, ProtocolTolerance};
use crate::model::{MacAddr, UniqueIdentifier};
use std::fmt;

/// AECP message_type (Clause 9.2.1.1.5). Odd values are responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AecpMessageType {
    AemCommand = 0,
    AemResponse = 1,
    AddressAccessCommand = 2,
    AddressAccessResponse = 3,
    AvcCommand = 4,
    AvcResponse = 5,
    VendorUniqueCommand = 6,
    VendorUniqueResponse = 7,
}

impl AecpMessageType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        use AecpMessageType::*;
        Some(match value {
            0 => AemCommand,
            1 => AemResponse,
            2 => AddressAccessCommand,
            3 => AddressAccessResponse,
            4 => AvcCommand,
            5 => AvcResponse,
            6 => VendorUniqueCommand,
            7 => VendorUniqueResponse,
            _ => return None,
        })
    }

    #[must_use]
    pub fn is_response(self) -> bool {
        (self as u8) % 2 == 1
    }
}

/// AECP status codes shared by all families (Clause 9.2.1.1.6).
pub mod aecp_status {
    pub const SUCCESS: u8 = 0;
    pub const NOT_IMPLEMENTED: u8 = 1;
}

/// AEM-specific status codes (Clause 7.4, Table 7.126).
pub mod aem_status {
    pub const NO_SUCH_DESCRIPTOR: u8 = 2;
    pub const ENTITY_LOCKED: u8 = 3;
    pub const ENTITY_ACQUIRED: u8 = 4;
    pub const NOT_AUTHENTICATED: u8 = 5;
    pub const AUTHENTICATION_DISABLED: u8 = 6;
    pub const BAD_ARGUMENTS: u8 = 7;
    pub const NO_RESOURCES: u8 = 8;
    pub const IN_PROGRESS: u8 = 9;
    pub const ENTITY_MISBEHAVING: u8 = 10;
    pub const NOT_SUPPORTED: u8 = 11;
    pub const STREAM_IS_RUNNING: u8 = 12;
}

/// Address-access status codes (Clause 9.2.1.3.4).
pub mod aa_status {
    pub const ADDRESS_TOO_LOW: u8 = 2;
    pub const ADDRESS_TOO_HIGH: u8 = 3;
    pub const ADDRESS_INVALID: u8 = 4;
    pub const TLV_INVALID: u8 = 5;
    pub const DATA_INVALID: u8 = 6;
    pub const UNSUPPORTED: u8 = 7;
}

/// AEM command type (Clause 7.4, Table 7.125).
///
/// Kept as a value type rather than an exhaustive enum: devices are free to
/// send command types we do not implement, and those must survive decoding so
/// the router can log-and-drop or answer NOT_IMPLEMENTED. The exhaustive
/// compile-time dispatch the engine relies on lives in the typed handler enum,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AemCommandType(pub u16);

impl AemCommandType {
    pub const ACQUIRE_ENTITY: AemCommandType = AemCommandType(0x0000);
    pub const LOCK_ENTITY: AemCommandType = AemCommandType(0x0001);
    pub const ENTITY_AVAILABLE: AemCommandType = AemCommandType(0x0002);
    pub const CONTROLLER_AVAILABLE: AemCommandType = AemCommandType(0x0003);
    pub const READ_DESCRIPTOR: AemCommandType = AemCommandType(0x0004);
    pub const WRITE_DESCRIPTOR: AemCommandType = AemCommandType(0x0005);
    pub const SET_CONFIGURATION: AemCommandType = AemCommandType(0x0006);
    pub const GET_CONFIGURATION: AemCommandType = AemCommandType(0x0007);
    pub const SET_STREAM_FORMAT: AemCommandType = AemCommandType(0x0008);
    pub const GET_STREAM_FORMAT: AemCommandType = AemCommandType(0x0009);
    pub const SET_STREAM_INFO: AemCommandType = AemCommandType(0x000E);
    pub const GET_STREAM_INFO: AemCommandType = AemCommandType(0x000F);
    pub const SET_NAME: AemCommandType = AemCommandType(0x0010);
    pub const GET_NAME: AemCommandType = AemCommandType(0x0011);
    pub const SET_ASSOCIATION_ID: AemCommandType = AemCommandType(0x0012);
    pub const GET_ASSOCIATION_ID: AemCommandType = AemCommandType(0x0013);
    pub const SET_SAMPLING_RATE: AemCommandType = AemCommandType(0x0014);
    pub const GET_SAMPLING_RATE: AemCommandType = AemCommandType(0x0015);
    pub const SET_CLOCK_SOURCE: AemCommandType = AemCommandType(0x0016);
    pub const GET_CLOCK_SOURCE: AemCommandType = AemCommandType(0x0017);
    pub const START_STREAMING: AemCommandType = AemCommandType(0x0022);
    pub const STOP_STREAMING: AemCommandType = AemCommandType(0x0023);
    pub const REGISTER_UNSOLICITED_NOTIFICATION: AemCommandType = AemCommandType(0x0024);
    pub const DEREGISTER_UNSOLICITED_NOTIFICATION: AemCommandType = AemCommandType(0x0025);
    pub const IDENTIFY_NOTIFICATION: AemCommandType = AemCommandType(0x0026);
    pub const GET_AVB_INFO: AemCommandType = AemCommandType(0x0027);
    pub const GET_AS_PATH: AemCommandType = AemCommandType(0x0028);
    pub const GET_COUNTERS: AemCommandType = AemCommandType(0x0029);
    pub const REBOOT: AemCommandType = AemCommandType(0x002A);
    pub const GET_AUDIO_MAP: AemCommandType = AemCommandType(0x002B);
    pub const ADD_AUDIO_MAPPINGS: AemCommandType = AemCommandType(0x002C);
    pub const REMOVE_AUDIO_MAPPINGS: AemCommandType = AemCommandType(0x002D);
    pub const START_OPERATION: AemCommandType = AemCommandType(0x0034);
    pub const ABORT_OPERATION: AemCommandType = AemCommandType(0x0035);
    pub const OPERATION_STATUS: AemCommandType = AemCommandType(0x0036);
    pub const SET_MEMORY_OBJECT_LENGTH: AemCommandType = AemCommandType(0x0047);
    pub const GET_MEMORY_OBJECT_LENGTH: AemCommandType = AemCommandType(0x0048);

    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for AemCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Milan vendor-unique command type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MvuCommandType(pub u16);

impl MvuCommandType {
    pub const GET_MILAN_INFO: MvuCommandType = MvuCommandType(0x0000);

    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

/// Fields shared by every AECPDU (Clause 9.2.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AecpCommon {
    pub dest_address: MacAddr,
    pub src_address: MacAddr,
    pub message_type: AecpMessageType,
    /// Wire status (5 bits). Zero for commands.
    pub status: u8,
    pub target_entity_id: UniqueIdentifier,
    pub controller_entity_id: UniqueIdentifier,
    pub sequence_id: u16,
}

impl Default for AecpCommon {
    fn default() -> Self {
        Self {
            dest_address: MacAddr::ZERO,
            src_address: MacAddr::ZERO,
            message_type: AecpMessageType::AemCommand,
            status: aecp_status::SUCCESS,
            target_entity_id: UniqueIdentifier::NULL,
            controller_entity_id: UniqueIdentifier::NULL,
            sequence_id: 0,
        }
    }
}

/// AEM command or response (Clause 9.2.1.2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AemAecpdu {
    pub common: AecpCommon,
    pub unsolicited: bool,
    pub command_type: AemCommandType,
    pub payload: Vec<u8>,
}

/// Address-access mode (Clause 9.2.1.3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AaMode {
    Read = 0,
    Write = 1,
    Execute = 2,
}

impl AaMode {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            2 => Some(Self::Execute),
            _ => None,
        }
    }
}

/// One address-access TLV: mode(4) | length(12), 64-bit address, data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaTlv {
    pub mode: AaMode,
    pub address: u64,
    pub data: Vec<u8>,
}

/// Address-access command or response (Clause 9.2.1.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AaAecpdu {
    pub common: AecpCommon,
    pub tlvs: Vec<AaTlv>,
}

/// Milan vendor-unique command or response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MvuAecpdu {
    pub common: AecpCommon,
    pub command_type: MvuCommandType,
    pub payload: Vec<u8>,
}

/// Any AECPDU this engine speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aecpdu {
    Aem(AemAecpdu),
    Aa(AaAecpdu),
    Mvu(MvuAecpdu),
}

impl Aecpdu {
    #[must_use]
    pub fn common(&self) -> &AecpCommon {
        match self {
            Aecpdu::Aem(pdu) => &pdu.common,
            Aecpdu::Aa(pdu) => &pdu.common,
            Aecpdu::Mvu(pdu) => &pdu.common,
        }
    }

    #[must_use]
    pub fn common_mut(&mut self) -> &mut AecpCommon {
        match self {
            Aecpdu::Aem(pdu) => &mut pdu.common,
            Aecpdu::Aa(pdu) => &mut pdu.common,
            Aecpdu::Mvu(pdu) => &mut pdu.common,
        }
    }

    /// Encode to a complete Ethernet II frame.
    ///
    /// # Errors
    ///
    /// `PayloadTooBig` when the AECPDU exceeds the 524-byte cap and
    /// `accept_oversize_aecp_out` is off, or when a single length field
    /// cannot represent the content.
    pub fn encode(&self, tolerance: &ProtocolTolerance) -> Result<Vec<u8>, PduError> {
        let (specific_len, message_type) = match self {
            Aecpdu::Aem(pdu) => {
                (config::AEM_HEADER_LEN + pdu.payload.len(), pdu.common.message_type)
            }
            Aecpdu::Aa(pdu) => {
                let tlv_bytes: usize =
                    pdu.tlvs.iter().map(|tlv| config::AA_TLV_HEADER_LEN + tlv.data.len()).sum();
                (config::AA_HEADER_LEN + tlv_bytes, pdu.common.message_type)
            }
            Aecpdu::Mvu(pdu) => (
                config::VU_PROTOCOL_ID_LEN + config::MVU_HEADER_LEN + pdu.payload.len(),
                pdu.common.message_type,
            ),
        };

        let control_data_length = config::AECPDU_HEADER_LEN + specific_len;
        if control_data_length > config::AECPDU_MAX_LEN && !tolerance.accept_oversize_aecp_out {
            return Err(PduError::PayloadTooBig);
        }
        if control_data_length > 0x07FF {
            return Err(PduError::PayloadTooBig);
        }

        let common = self.common();
        let mut w = Writer::with_capacity(26 + control_data_length);
        write_frame_header(
            &mut w,
            common.dest_address,
            common.src_address,
            ControlHeader {
                subtype: config::AVTP_SUBTYPE_AECP,
                message_type: common.message_type as u8,
                status: common.status & 0x1F,
                control_data_length: control_data_length as u16,
                stream_id: common.target_entity_id.value(),
            },
        );
        w.write_u64(common.controller_entity_id.value());
        w.write_u16(common.sequence_id);

        match self {
            Aecpdu::Aem(pdu) => {
                debug_assert!(matches!(
                    message_type,
                    AecpMessageType::AemCommand | AecpMessageType::AemResponse
                ));
                w.write_u16(
                    (u16::from(pdu.unsolicited) << 15) | (pdu.command_type.value() & 0x7FFF),
                );
                w.write_bytes(&pdu.payload);
            }
            Aecpdu::Aa(pdu) => {
                let count =
                    u16::try_from(pdu.tlvs.len()).map_err(|_| PduError::PayloadTooBig)?;
                w.write_u16(count);
                for tlv in &pdu.tlvs {
                    if tlv.data.len() > 0x0FFF {
                        return Err(PduError::PayloadTooBig);
                    }
                    w.write_u16((u16::from(tlv.mode as u8) << 12) | (tlv.data.len() as u16));
                    w.write_u64(tlv.address);
                    w.write_bytes(&tlv.data);
                }
            }
            Aecpdu::Mvu(pdu) => {
                w.write_bytes(&config::MVU_PROTOCOL_ID);
                w.write_u16(pdu.command_type.value() & 0x7FFF);
                w.write_bytes(&pdu.payload);
            }
        }

        Ok(w.into_vec())
    }

    pub(crate) fn parse(
        dest: MacAddr,
        src: MacAddr,
        header: ControlHeader,
        r: &mut Reader<'_>,
        tolerance: &ProtocolTolerance,
    ) -> Result<Self, PduError> {
        let message_type = AecpMessageType::from_u8(header.message_type)
            .ok_or(PduError::MalformedField("aecp message_type"))?;

        let control_data_length = usize::from(header.control_data_length);
        if control_data_length > config::AECPDU_MAX_LEN && !tolerance.accept_oversize_aecp_in {
            return Err(PduError::PayloadTooBig);
        }
        if control_data_length < config::AECPDU_HEADER_LEN {
            return Err(PduError::MalformedField("aecp control_data_length"));
        }

        let controller_entity_id = UniqueIdentifier::from(r.read_u64()?);
        let sequence_id = r.read_u16()?;

        let common = AecpCommon {
            dest_address: dest,
            src_address: src,
            message_type,
            status: header.status,
            target_entity_id: UniqueIdentifier::from(header.stream_id),
            controller_entity_id,
            sequence_id,
        };

        // Bytes the sender claims follow the common header.
        let specific_len = control_data_length - config::AECPDU_HEADER_LEN;

        match message_type {
            AecpMessageType::AemCommand | AecpMessageType::AemResponse => {
                let u_ct = r.read_u16()?;
                let payload_len = specific_len
                    .checked_sub(config::AEM_HEADER_LEN)
                    .ok_or(PduError::MalformedField("aem control_data_length"))?;
                let payload_len = clamp_payload(payload_len, r.remaining(), tolerance, "aem")?;
                let payload = r.read_bytes(payload_len)?.to_vec();
                Ok(Aecpdu::Aem(AemAecpdu {
                    common,
                    unsolicited: u_ct & 0x8000 != 0,
                    command_type: AemCommandType(u_ct & 0x7FFF),
                    payload,
                }))
            }
            AecpMessageType::AddressAccessCommand | AecpMessageType::AddressAccessResponse => {
                let tlv_count = r.read_u16()?;
                let mut tlvs = Vec::with_capacity(usize::from(tlv_count).min(16));
                for _ in 0..tlv_count {
                    let mode_len = r.read_u16()?;
                    let mode = AaMode::from_u8((mode_len >> 12) as u8)
                        .ok_or(PduError::MalformedField("aa tlv mode"))?;
                    let length = usize::from(mode_len & 0x0FFF);
                    let address = r.read_u64()?;
                    let data = r.read_bytes(length)?.to_vec();
                    tlvs.push(AaTlv { mode, address, data });
                }
                Ok(Aecpdu::Aa(AaAecpdu { common, tlvs }))
            }
            AecpMessageType::VendorUniqueCommand | AecpMessageType::VendorUniqueResponse => {
                let protocol_id = r.read_array::<6>()?;
                if protocol_id != config::MVU_PROTOCOL_ID {
                    return Err(PduError::MalformedField("vendor unique protocol_id"));
                }
                let u_ct = r.read_u16()?;
                let payload_len = specific_len
                    .checked_sub(config::VU_PROTOCOL_ID_LEN + config::MVU_HEADER_LEN)
                    .ok_or(PduError::MalformedField("mvu control_data_length"))?;
                let payload_len = clamp_payload(payload_len, r.remaining(), tolerance, "mvu")?;
                let payload = r.read_bytes(payload_len)?.to_vec();
                Ok(Aecpdu::Mvu(MvuAecpdu {
                    common,
                    command_type: MvuCommandType(u_ct & 0x7FFF),
                    payload,
                }))
            }
            AecpMessageType::AvcCommand | AecpMessageType::AvcResponse => {
                Err(PduError::MalformedField("avc not supported"))
            }
        }
    }
}

/// Apply the control_data_length tolerance: advertised payload beyond the
/// bytes actually present is clamped when the knob is on, rejected otherwise.
fn clamp_payload(
    advertised: usize,
    remaining: usize,
    tolerance: &ProtocolTolerance,
    family: &'static str,
) -> Result<usize, PduError> {
    if advertised <= remaining {
        return Ok(advertised);
    }
    if tolerance.accept_invalid_control_data_length {
        log::debug!(
            "[aecp] {family} control_data_length advertises {advertised} payload bytes, \
             only {remaining} present; clamping"
        );
        Ok(remaining)
    } else {
        Err(PduError::IncorrectPayloadSize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_frame, Pdu};

    fn common(message_type: AecpMessageType) -> AecpCommon {
        AecpCommon {
            dest_address: MacAddr::new([2, 0, 0, 0, 0, 0x10]),
            src_address: MacAddr::new([2, 0, 0, 0, 0, 0x20]),
            message_type,
            status: aecp_status::SUCCESS,
            target_entity_id: UniqueIdentifier::from(0x1111_2222_3333_4444),
            controller_entity_id: UniqueIdentifier::from(0x0102_0304_0506_0708),
            sequence_id: 4242,
        }
    }

    #[test]
    fn aem_round_trip() {
        let pdu = Aecpdu::Aem(AemAecpdu {
            common: common(AecpMessageType::AemCommand),
            unsolicited: false,
            command_type: AemCommandType::ACQUIRE_ENTITY,
            payload: vec![0xAA; 16],
        });
        let frame = pdu.encode(&ProtocolTolerance::default()).expect("encodes");
        // cdl = 10 + 2 + 16
        assert_eq!(u16::from_be_bytes([frame[16], frame[17]]) & 0x07FF, 28);
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("parses") {
            Pdu::Aecp(parsed) => assert_eq!(parsed, pdu),
            other => panic!("expected AECP, got {other:?}"),
        }
    }

    #[test]
    fn unsolicited_bit_round_trips() {
        let pdu = Aecpdu::Aem(AemAecpdu {
            common: common(AecpMessageType::AemResponse),
            unsolicited: true,
            command_type: AemCommandType::SET_NAME,
            payload: vec![0; 72],
        });
        let frame = pdu.encode(&ProtocolTolerance::default()).expect("encodes");
        // unsolicited bit is the MSB of the word right after the common header
        assert_eq!(frame[26 + 10] & 0x80, 0x80);
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("parses") {
            Pdu::Aecp(Aecpdu::Aem(parsed)) => {
                assert!(parsed.unsolicited);
                assert_eq!(parsed.command_type, AemCommandType::SET_NAME);
            }
            other => panic!("expected AEM, got {other:?}"),
        }
    }

    #[test]
    fn aa_tlv_round_trip() {
        let pdu = Aecpdu::Aa(AaAecpdu {
            common: common(AecpMessageType::AddressAccessCommand),
            tlvs: vec![
                AaTlv { mode: AaMode::Read, address: 0x0000_0000_DEAD_0000, data: vec![] },
                AaTlv { mode: AaMode::Write, address: 0x10, data: vec![1, 2, 3, 4] },
            ],
        });
        let frame = pdu.encode(&ProtocolTolerance::default()).expect("encodes");
        // tlv_count
        assert_eq!(u16::from_be_bytes([frame[36], frame[37]]), 2);
        // first TLV word: mode Read (0) << 12 | length 0
        assert_eq!(u16::from_be_bytes([frame[38], frame[39]]), 0x0000);
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("parses") {
            Pdu::Aecp(parsed) => assert_eq!(parsed, pdu),
            other => panic!("expected AECP, got {other:?}"),
        }
    }

    #[test]
    fn mvu_round_trip_and_protocol_id() {
        let pdu = Aecpdu::Mvu(MvuAecpdu {
            common: common(AecpMessageType::VendorUniqueCommand),
            command_type: MvuCommandType::GET_MILAN_INFO,
            payload: vec![0, 0],
        });
        let frame = pdu.encode(&ProtocolTolerance::default()).expect("encodes");
        assert_eq!(&frame[36..42], &config::MVU_PROTOCOL_ID);
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("parses") {
            Pdu::Aecp(parsed) => assert_eq!(parsed, pdu),
            other => panic!("expected AECP, got {other:?}"),
        }

        let mut foreign = frame.clone();
        foreign[36] = 0xFF;
        assert!(matches!(
            parse_frame(&foreign, &ProtocolTolerance::default()),
            Err(PduError::MalformedField("vendor unique protocol_id"))
        ));
    }

    #[test]
    fn aecp_cap_is_524_bytes() {
        // 512-byte AEM payload lands exactly on the 524-byte AECPDU cap
        let at_cap = Aecpdu::Aem(AemAecpdu {
            common: common(AecpMessageType::AemCommand),
            unsolicited: false,
            command_type: AemCommandType::ADD_AUDIO_MAPPINGS,
            payload: vec![0; config::AEM_MAX_PAYLOAD_LEN],
        });
        let frame = at_cap.encode(&ProtocolTolerance::default()).expect("at cap encodes");
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("at cap parses") {
            Pdu::Aecp(Aecpdu::Aem(parsed)) => assert_eq!(parsed.payload.len(), 512),
            other => panic!("expected AEM, got {other:?}"),
        }

        let oversize = Aecpdu::Aem(AemAecpdu {
            common: common(AecpMessageType::AemCommand),
            unsolicited: false,
            command_type: AemCommandType::ADD_AUDIO_MAPPINGS,
            payload: vec![0; config::AEM_MAX_PAYLOAD_LEN + 1],
        });
        assert!(matches!(
            oversize.encode(&ProtocolTolerance::default()),
            Err(PduError::PayloadTooBig)
        ));

        // Outbound oversize allowed when the knob is on...
        let tol = ProtocolTolerance {
            accept_oversize_aecp_out: true,
            ..ProtocolTolerance::default()
        };
        let frame = oversize.encode(&tol).expect("oversize encodes with knob on");
        // ...and inbound oversize is rejected only in strict mode.
        assert!(parse_frame(&frame, &ProtocolTolerance::default()).is_ok());
        assert!(matches!(
            parse_frame(&frame, &ProtocolTolerance::strict()),
            Err(PduError::PayloadTooBig)
        ));
    }

    #[test]
    fn clamps_overstated_control_data_length() {
        let pdu = Aecpdu::Aem(AemAecpdu {
            common: common(AecpMessageType::AemResponse),
            unsolicited: false,
            command_type: AemCommandType::GET_NAME,
            payload: vec![7; 8],
        });
        let mut frame = pdu.encode(&ProtocolTolerance::default()).expect("encodes");
        // Claim 16 more payload bytes than are present
        let cdl = u16::from_be_bytes([frame[16], frame[17]]) + 16;
        frame[16..18].copy_from_slice(&cdl.to_be_bytes());

        match parse_frame(&frame, &ProtocolTolerance::default()).expect("tolerant parse") {
            Pdu::Aecp(Aecpdu::Aem(parsed)) => assert_eq!(parsed.payload.len(), 8),
            other => panic!("expected AEM, got {other:?}"),
        }
        assert!(matches!(
            parse_frame(&frame, &ProtocolTolerance::strict()),
            Err(PduError::IncorrectPayloadSize)
        ));
    }
}
