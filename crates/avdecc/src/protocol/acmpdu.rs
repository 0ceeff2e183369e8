// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ACMPDU codec (IEEE 1722.1-2013 Clause 8.2).
//!
//! Connection management runs entirely on the AVDECC multicast channel; every
//! controller sees every command/response, which is what makes sniffing
//! (Clause 8.2.2.1) possible.

use super::cursor::{Reader, Writer};
use super::{write_frame_header, ControlHeader, PduError};
use crate::config::{self, ProtocolTolerance};
use crate::model::{ConnectionFlags, MacAddr, StreamIndex, UniqueIdentifier};
use std::time::Duration;

/// ACMP message_type (Clause 8.2.1.5). Even values are commands, responses
/// are command + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AcmpMessageType {
    ConnectTxCommand = 0,
    ConnectTxResponse = 1,
    DisconnectTxCommand = 2,
    DisconnectTxResponse = 3,
    GetTxStateCommand = 4,
    GetTxStateResponse = 5,
    ConnectRxCommand = 6,
    ConnectRxResponse = 7,
    DisconnectRxCommand = 8,
    DisconnectRxResponse = 9,
    GetRxStateCommand = 10,
    GetRxStateResponse = 11,
    GetTxConnectionCommand = 12,
    GetTxConnectionResponse = 13,
}

impl AcmpMessageType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        use AcmpMessageType::*;
        Some(match value {
            0 => ConnectTxCommand,
            1 => ConnectTxResponse,
            2 => DisconnectTxCommand,
            3 => DisconnectTxResponse,
            4 => GetTxStateCommand,
            5 => GetTxStateResponse,
            6 => ConnectRxCommand,
            7 => ConnectRxResponse,
            8 => DisconnectRxCommand,
            9 => DisconnectRxResponse,
            10 => GetRxStateCommand,
            11 => GetRxStateResponse,
            12 => GetTxConnectionCommand,
            13 => GetTxConnectionResponse,
            _ => return None,
        })
    }

    /// Odd values are responses (Clause 8.2.1.5).
    #[must_use]
    pub fn is_response(self) -> bool {
        (self as u8) % 2 == 1
    }

    /// The response type paired with this command type.
    #[must_use]
    pub fn expected_response(self) -> Option<Self> {
        if self.is_response() {
            None
        } else {
            Self::from_u8(self as u8 + 1)
        }
    }

    /// Per-message-type command timeout (Clause 8.2.2).
    #[must_use]
    pub fn command_timeout(self) -> Duration {
        use AcmpMessageType::*;
        match self {
            ConnectTxCommand | ConnectTxResponse => config::ACMP_CONNECT_TX_TIMEOUT,
            DisconnectTxCommand | DisconnectTxResponse => config::ACMP_DISCONNECT_TX_TIMEOUT,
            GetTxStateCommand | GetTxStateResponse => config::ACMP_GET_TX_STATE_TIMEOUT,
            ConnectRxCommand | ConnectRxResponse => config::ACMP_CONNECT_RX_TIMEOUT,
            DisconnectRxCommand | DisconnectRxResponse => config::ACMP_DISCONNECT_RX_TIMEOUT,
            GetRxStateCommand | GetRxStateResponse => config::ACMP_GET_RX_STATE_TIMEOUT,
            GetTxConnectionCommand | GetTxConnectionResponse => {
                config::ACMP_GET_TX_CONNECTION_TIMEOUT
            }
        }
    }
}

/// ACMP status codes (Clause 8.2.1.6), wire values.
pub mod acmp_status {
    pub const SUCCESS: u8 = 0;
    pub const LISTENER_UNKNOWN_ID: u8 = 1;
    pub const TALKER_UNKNOWN_ID: u8 = 2;
    pub const TALKER_DEST_MAC_FAIL: u8 = 3;
    pub const TALKER_NO_STREAM_INDEX: u8 = 4;
    pub const TALKER_NO_BANDWIDTH: u8 = 5;
    pub const TALKER_EXCLUSIVE: u8 = 6;
    pub const LISTENER_TALKER_TIMEOUT: u8 = 7;
    pub const LISTENER_EXCLUSIVE: u8 = 8;
    pub const STATE_UNAVAILABLE: u8 = 9;
    pub const NOT_CONNECTED: u8 = 10;
    pub const NO_SUCH_CONNECTION: u8 = 11;
    pub const COULD_NOT_SEND_MESSAGE: u8 = 12;
    pub const TALKER_MISBEHAVING: u8 = 13;
    pub const LISTENER_MISBEHAVING: u8 = 14;
    pub const CONTROLLER_NOT_AUTHORIZED: u8 = 16;
    pub const INCOMPATIBLE_REQUEST: u8 = 17;
    pub const NOT_SUPPORTED: u8 = 31;
}

/// A connection-management command or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acmpdu {
    pub dest_address: MacAddr,
    pub src_address: MacAddr,
    pub message_type: AcmpMessageType,
    /// Wire status (5 bits). Zero for commands.
    pub status: u8,
    pub stream_id: UniqueIdentifier,
    pub controller_entity_id: UniqueIdentifier,
    pub talker_entity_id: UniqueIdentifier,
    pub listener_entity_id: UniqueIdentifier,
    pub talker_unique_id: StreamIndex,
    pub listener_unique_id: StreamIndex,
    pub stream_dest_address: MacAddr,
    pub connection_count: u16,
    pub sequence_id: u16,
    pub flags: ConnectionFlags,
    pub stream_vlan_id: u16,
}

impl Default for Acmpdu {
    fn default() -> Self {
        Self {
            dest_address: config::AVDECC_MULTICAST_MAC,
            src_address: MacAddr::ZERO,
            message_type: AcmpMessageType::ConnectRxCommand,
            status: acmp_status::SUCCESS,
            stream_id: UniqueIdentifier::NULL,
            controller_entity_id: UniqueIdentifier::NULL,
            talker_entity_id: UniqueIdentifier::NULL,
            listener_entity_id: UniqueIdentifier::NULL,
            talker_unique_id: 0,
            listener_unique_id: 0,
            stream_dest_address: MacAddr::ZERO,
            connection_count: 0,
            sequence_id: 0,
            flags: ConnectionFlags::NONE,
            stream_vlan_id: 0,
        }
    }
}

impl Acmpdu {
    /// Encode to a complete Ethernet II frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(26 + config::ACMPDU_LEN);

        write_frame_header(
            &mut w,
            self.dest_address,
            self.src_address,
            ControlHeader {
                subtype: config::AVTP_SUBTYPE_ACMP,
                message_type: self.message_type as u8,
                status: self.status & 0x1F,
                control_data_length: config::ACMPDU_LEN as u16,
                stream_id: self.stream_id.value(),
            },
        );

        w.write_u64(self.controller_entity_id.value());
        w.write_u64(self.talker_entity_id.value());
        w.write_u64(self.listener_entity_id.value());
        w.write_u16(self.talker_unique_id);
        w.write_u16(self.listener_unique_id);
        w.write_bytes(&self.stream_dest_address.octets());
        w.write_u16(self.connection_count);
        w.write_u16(self.sequence_id);
        w.write_u16(self.flags.value());
        w.write_u16(self.stream_vlan_id);
        w.write_u16(0); // reserved

        w.into_vec()
    }

    pub(crate) fn parse(
        dest: MacAddr,
        src: MacAddr,
        header: ControlHeader,
        r: &mut Reader<'_>,
        tolerance: &ProtocolTolerance,
    ) -> Result<Self, PduError> {
        let message_type = AcmpMessageType::from_u8(header.message_type)
            .ok_or(PduError::MalformedField("acmp message_type"))?;

        if usize::from(header.control_data_length) != config::ACMPDU_LEN
            && !tolerance.accept_invalid_control_data_length
        {
            return Err(PduError::MalformedField("acmp control_data_length"));
        }
        if r.remaining() < config::ACMPDU_LEN {
            return Err(PduError::IncorrectPayloadSize);
        }

        let controller_entity_id = UniqueIdentifier::from(r.read_u64()?);
        let talker_entity_id = UniqueIdentifier::from(r.read_u64()?);
        let listener_entity_id = UniqueIdentifier::from(r.read_u64()?);
        let talker_unique_id = r.read_u16()?;
        let listener_unique_id = r.read_u16()?;
        let stream_dest_address = MacAddr::new(r.read_array::<6>()?);
        let connection_count = r.read_u16()?;
        let sequence_id = r.read_u16()?;
        let flags = ConnectionFlags::from(r.read_u16()?);
        let stream_vlan_id = r.read_u16()?;
        r.skip(2)?; // reserved

        Ok(Self {
            dest_address: dest,
            src_address: src,
            message_type,
            status: header.status,
            stream_id: UniqueIdentifier::from(header.stream_id),
            controller_entity_id,
            talker_entity_id,
            listener_entity_id,
            talker_unique_id,
            listener_unique_id,
            stream_dest_address,
            connection_count,
            sequence_id,
            flags,
            stream_vlan_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_frame, Pdu};

    fn sample_connect_rx_response() -> Acmpdu {
        Acmpdu {
            src_address: MacAddr::new([2, 0, 0, 0, 0, 0xB0]),
            message_type: AcmpMessageType::ConnectRxResponse,
            status: acmp_status::SUCCESS,
            stream_id: UniqueIdentifier::from(0x9100_0000_0000_0001),
            controller_entity_id: UniqueIdentifier::from(0x0102_0304_0506_0708),
            talker_entity_id: UniqueIdentifier::from(0xAAAA_0000_0000_0001),
            listener_entity_id: UniqueIdentifier::from(0xBBBB_0000_0000_0002),
            talker_unique_id: 0,
            listener_unique_id: 0,
            stream_dest_address: MacAddr::new([0x91, 0xE0, 0xF0, 0x00, 0x11, 0x22]),
            connection_count: 1,
            sequence_id: 77,
            flags: ConnectionFlags::STREAMING_WAIT,
            stream_vlan_id: 2,
            ..Default::default()
        }
    }

    #[test]
    fn message_type_parity() {
        assert!(!AcmpMessageType::ConnectRxCommand.is_response());
        assert!(AcmpMessageType::ConnectRxResponse.is_response());
        assert_eq!(
            AcmpMessageType::ConnectRxCommand.expected_response(),
            Some(AcmpMessageType::ConnectRxResponse)
        );
        assert_eq!(AcmpMessageType::GetTxStateResponse.expected_response(), None);
    }

    #[test]
    fn per_type_timeouts() {
        assert_eq!(
            AcmpMessageType::ConnectRxCommand.command_timeout(),
            Duration::from_millis(4500)
        );
        assert_eq!(
            AcmpMessageType::DisconnectTxCommand.command_timeout(),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn encode_structure() {
        let frame = sample_connect_rx_response().encode();
        assert_eq!(frame.len(), 26 + 44);
        assert_eq!(frame[14], 0xFC, "cd|subtype");
        assert_eq!(frame[15], 0x07, "ConnectRxResponse");
        assert_eq!(u16::from_be_bytes([frame[16], frame[17]]), 44, "status 0 | cdl 44");
        // sequence_id lives at body offset 36 (3 EIDs + 2 unique ids + MAC + count)
        assert_eq!(u16::from_be_bytes([frame[26 + 36], frame[26 + 37]]), 77);
    }

    #[test]
    fn round_trip() {
        let acmpdu = sample_connect_rx_response();
        let frame = acmpdu.encode();
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("frame parses") {
            Pdu::Acmp(parsed) => assert_eq!(parsed, acmpdu),
            other => panic!("expected ACMP, got {other:?}"),
        }
    }

    #[test]
    fn nonzero_status_survives() {
        let mut acmpdu = sample_connect_rx_response();
        acmpdu.status = acmp_status::LISTENER_EXCLUSIVE;
        let frame = acmpdu.encode();
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("frame parses") {
            Pdu::Acmp(parsed) => assert_eq!(parsed.status, acmp_status::LISTENER_EXCLUSIVE),
            other => panic!("expected ACMP, got {other:?}"),
        }
    }
}
