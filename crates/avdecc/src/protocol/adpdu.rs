// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ADPDU codec (IEEE 1722.1-2013 Clause 6.2).
//!
//! The entity_id rides the AVTP stream_id slot and the 5-bit status slot
//! carries valid_time, so the ADP-specific body is the 56 bytes that follow.

use super::cursor::{Reader, Writer};
use super::{write_frame_header, ControlHeader, PduError};
use crate::config::{self, ProtocolTolerance};
use crate::model::{
    ControllerCapabilities, EntityCapabilities, ListenerCapabilities, MacAddr, TalkerCapabilities,
    UniqueIdentifier,
};

/// ADP message_type (Clause 6.2.1.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdpMessageType {
    EntityAvailable = 0,
    EntityDeparting = 1,
    EntityDiscover = 2,
}

impl AdpMessageType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::EntityAvailable),
            1 => Some(Self::EntityDeparting),
            2 => Some(Self::EntityDiscover),
            _ => None,
        }
    }
}

/// A discovery advertisement / departure / probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adpdu {
    pub dest_address: MacAddr,
    pub src_address: MacAddr,
    pub message_type: AdpMessageType,
    /// Advertised validity in 2-second units, 5 bits (Clause 6.2.1.6).
    pub valid_time: u8,
    pub entity_id: UniqueIdentifier,
    pub entity_model_id: UniqueIdentifier,
    pub entity_capabilities: EntityCapabilities,
    pub talker_stream_sources: u16,
    pub talker_capabilities: TalkerCapabilities,
    pub listener_stream_sinks: u16,
    pub listener_capabilities: ListenerCapabilities,
    pub controller_capabilities: ControllerCapabilities,
    pub available_index: u32,
    pub gptp_grandmaster_id: UniqueIdentifier,
    pub gptp_domain_number: u8,
    pub identify_control_index: u16,
    pub interface_index: u16,
    pub association_id: UniqueIdentifier,
}

impl Default for Adpdu {
    fn default() -> Self {
        Self {
            dest_address: config::AVDECC_MULTICAST_MAC,
            src_address: MacAddr::ZERO,
            message_type: AdpMessageType::EntityDiscover,
            valid_time: 0,
            entity_id: UniqueIdentifier::NULL,
            entity_model_id: UniqueIdentifier::NULL,
            entity_capabilities: EntityCapabilities::NONE,
            talker_stream_sources: 0,
            talker_capabilities: TalkerCapabilities::NONE,
            listener_stream_sinks: 0,
            listener_capabilities: ListenerCapabilities::NONE,
            controller_capabilities: ControllerCapabilities::NONE,
            available_index: 0,
            gptp_grandmaster_id: UniqueIdentifier::NULL,
            gptp_domain_number: 0,
            identify_control_index: 0,
            interface_index: 0,
            association_id: UniqueIdentifier::NULL,
        }
    }
}

impl Adpdu {
    /// Encode to a complete Ethernet II frame.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(26 + config::ADPDU_LEN);

        write_frame_header(
            &mut w,
            self.dest_address,
            self.src_address,
            ControlHeader {
                subtype: config::AVTP_SUBTYPE_ADP,
                message_type: self.message_type as u8,
                status: self.valid_time & 0x1F,
                control_data_length: config::ADPDU_LEN as u16,
                stream_id: self.entity_id.value(),
            },
        );

        w.write_u64(self.entity_model_id.value());
        w.write_u32(self.entity_capabilities.value());
        w.write_u16(self.talker_stream_sources);
        w.write_u16(self.talker_capabilities.value());
        w.write_u16(self.listener_stream_sinks);
        w.write_u16(self.listener_capabilities.value());
        w.write_u32(self.controller_capabilities.value());
        w.write_u32(self.available_index);
        w.write_u64(self.gptp_grandmaster_id.value());
        // gptp_domain_number shares a word with 24 reserved bits
        w.write_u32(u32::from(self.gptp_domain_number) << 24);
        w.write_u16(self.identify_control_index);
        w.write_u16(self.interface_index);
        w.write_u64(self.association_id.value());
        w.write_u32(0); // reserved1

        w.into_vec()
    }

    pub(crate) fn parse(
        dest: MacAddr,
        src: MacAddr,
        header: ControlHeader,
        r: &mut Reader<'_>,
        tolerance: &ProtocolTolerance,
    ) -> Result<Self, PduError> {
        let message_type = AdpMessageType::from_u8(header.message_type)
            .ok_or(PduError::MalformedField("adp message_type"))?;

        if usize::from(header.control_data_length) != config::ADPDU_LEN
            && !tolerance.accept_invalid_control_data_length
        {
            return Err(PduError::MalformedField("adp control_data_length"));
        }
        if r.remaining() < config::ADPDU_LEN {
            return Err(PduError::IncorrectPayloadSize);
        }

        let entity_model_id = UniqueIdentifier::from(r.read_u64()?);
        let entity_capabilities = EntityCapabilities::from(r.read_u32()?);
        let talker_stream_sources = r.read_u16()?;
        let talker_capabilities = TalkerCapabilities::from(r.read_u16()?);
        let listener_stream_sinks = r.read_u16()?;
        let listener_capabilities = ListenerCapabilities::from(r.read_u16()?);
        let controller_capabilities = ControllerCapabilities::from(r.read_u32()?);
        let available_index = r.read_u32()?;
        let gptp_grandmaster_id = UniqueIdentifier::from(r.read_u64()?);
        let gdn_reserved = r.read_u32()?;
        let identify_control_index = r.read_u16()?;
        let interface_index = r.read_u16()?;
        let association_id = UniqueIdentifier::from(r.read_u64()?);
        r.skip(4)?; // reserved1

        Ok(Self {
            dest_address: dest,
            src_address: src,
            message_type,
            valid_time: header.status,
            entity_id: UniqueIdentifier::from(header.stream_id),
            entity_model_id,
            entity_capabilities,
            talker_stream_sources,
            talker_capabilities,
            listener_stream_sinks,
            listener_capabilities,
            controller_capabilities,
            available_index,
            gptp_grandmaster_id,
            gptp_domain_number: (gdn_reserved >> 24) as u8,
            identify_control_index,
            interface_index,
            association_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{parse_frame, Pdu};

    fn sample_available() -> Adpdu {
        Adpdu {
            src_address: MacAddr::new([0x00, 0x1B, 0xC5, 0x00, 0x00, 0x42]),
            message_type: AdpMessageType::EntityAvailable,
            valid_time: 10,
            entity_id: UniqueIdentifier::from(0x0102_0304_0506_0708),
            entity_model_id: UniqueIdentifier::from(0x0011_2233_4455_6677),
            entity_capabilities: EntityCapabilities::AEM_SUPPORTED
                .union(EntityCapabilities::GPTP_SUPPORTED),
            talker_stream_sources: 2,
            talker_capabilities: TalkerCapabilities::IMPLEMENTED
                .union(TalkerCapabilities::AUDIO_SOURCE),
            listener_stream_sinks: 4,
            listener_capabilities: ListenerCapabilities::IMPLEMENTED
                .union(ListenerCapabilities::AUDIO_SINK),
            controller_capabilities: ControllerCapabilities::NONE,
            available_index: 31,
            gptp_grandmaster_id: UniqueIdentifier::from(0xAABB_CCDD_EEFF_0011),
            gptp_domain_number: 3,
            identify_control_index: 0,
            interface_index: 1,
            association_id: UniqueIdentifier::NULL,
            ..Default::default()
        }
    }

    #[test]
    fn encode_structure() {
        let frame = sample_available().encode();
        assert_eq!(frame.len(), 26 + 56);
        assert_eq!(frame[14], 0xFA, "cd|subtype");
        assert_eq!(frame[15], 0x00, "message_type EntityAvailable");
        // status(5)=valid_time 10, cdl(11)=56
        assert_eq!(u16::from_be_bytes([frame[16], frame[17]]), (10 << 11) | 56);
        assert_eq!(&frame[18..26], &0x0102_0304_0506_0708u64.to_be_bytes(), "entity_id slot");
        // gptp_domain_number rides the top byte of the reserved word at offset 26+32
        assert_eq!(frame[26 + 32], 3);
    }

    #[test]
    fn round_trip() {
        let adpdu = sample_available();
        let frame = adpdu.encode();
        match parse_frame(&frame, &ProtocolTolerance::default()).expect("frame parses") {
            Pdu::Adp(parsed) => assert_eq!(parsed, adpdu),
            other => panic!("expected ADP, got {other:?}"),
        }
    }

    #[test]
    fn truncated_body_is_an_error() {
        let frame = sample_available().encode();
        let truncated = &frame[..frame.len() - 8];
        assert!(matches!(
            parse_frame(truncated, &ProtocolTolerance::default()),
            Err(PduError::IncorrectPayloadSize)
        ));
    }

    #[test]
    fn bad_control_data_length_needs_tolerance() {
        let mut frame = sample_available().encode();
        // Advertise 57 bytes instead of 56
        let cdl = (10u16 << 11) | 57;
        frame[16..18].copy_from_slice(&cdl.to_be_bytes());

        assert!(parse_frame(&frame, &ProtocolTolerance::default()).is_ok());
        assert!(matches!(
            parse_frame(&frame, &ProtocolTolerance::strict()),
            Err(PduError::MalformedField("adp control_data_length"))
        ));
    }

    #[test]
    fn unknown_message_type_rejected() {
        let mut frame = sample_available().encode();
        frame[15] = 0x07;
        assert!(matches!(
            parse_frame(&frame, &ProtocolTolerance::default()),
            Err(PduError::MalformedField("adp message_type"))
        ));
    }
}
