// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec for IEEE 1722.1 PDUs.
//!
//! Three sub-protocols share one Ethernet II frame skeleton (EtherType
//! 0x22F0, big-endian fields throughout):
//!
//! ```text
//! [0..6)   dst MAC
//! [6..12)  src MAC
//! [12..14) EtherType = 0x22F0
//! [14]     cd(1) | subtype(7)            ADP=0x7A AECP=0x7B ACMP=0x7C
//! [15]     sv(1) | version(3) | message_type(4)
//! [16..18) status(5) | control_data_length(11)
//! [18..26) stream_id slot: entity_id (ADP), target_entity_id (AECP),
//!          stream_id (ACMP)
//! [26..)   family-specific body
//! ```
//!
//! Decoders never panic on malformed input; everything is a [`PduError`].

pub mod acmpdu;
pub mod adpdu;
pub mod aecpdu;
pub mod aem_payloads;
pub mod cursor;
pub mod descriptors;
pub mod mvu_payloads;

pub use acmpdu::{AcmpMessageType, Acmpdu};
pub use adpdu::{AdpMessageType, Adpdu};
pub use aecpdu::{AaMode, AaTlv, AecpCommon, Aecpdu, AemAecpdu, AemCommandType, MvuAecpdu};

use crate::config::{
    self, ProtocolTolerance, AVTP_SUBTYPE_ACMP, AVTP_SUBTYPE_ADP, AVTP_SUBTYPE_AECP,
};
use crate::model::MacAddr;
use cursor::{Reader, Writer};
use std::fmt;

/// Codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduError {
    /// Buffer shorter than the fields it must carry.
    IncorrectPayloadSize,
    /// A field value outside its legal range.
    MalformedField(&'static str),
    /// READ_DESCRIPTOR response carries a descriptor type that does not match
    /// the request, or one this engine does not model.
    InvalidDescriptorType,
    /// Outbound payload exceeds the protocol cap and the tolerance flag is off.
    PayloadTooBig,
    /// Internal encode-buffer overflow.
    BufferTooSmall,
}

impl fmt::Display for PduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PduError::IncorrectPayloadSize => write!(f, "incorrect payload size"),
            PduError::MalformedField(field) => write!(f, "malformed field: {field}"),
            PduError::InvalidDescriptorType => write!(f, "invalid descriptor type"),
            PduError::PayloadTooBig => write!(f, "payload exceeds protocol maximum"),
            PduError::BufferTooSmall => write!(f, "encode buffer too small"),
        }
    }
}

impl std::error::Error for PduError {}

/// Decoded AVTP control header (frame bytes 14..26).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlHeader {
    pub subtype: u8,
    /// 4-bit control_data field: the family message type.
    pub message_type: u8,
    /// 5-bit status field (valid_time for ADP).
    pub status: u8,
    /// 11-bit length of everything after this field's word, starting at the
    /// stream_id slot.
    pub control_data_length: u16,
    /// entity_id / target_entity_id / stream_id depending on family.
    pub stream_id: u64,
}

pub(crate) fn write_frame_header(
    w: &mut Writer,
    dest: MacAddr,
    src: MacAddr,
    header: ControlHeader,
) {
    w.write_bytes(&dest.octets());
    w.write_bytes(&src.octets());
    w.write_u16(config::AVTP_ETHERTYPE);
    // cd=1 for control AVTPDUs
    w.write_u8(0x80 | (header.subtype & 0x7F));
    // sv=0, version=0, control_data = message_type
    w.write_u8(header.message_type & 0x0F);
    w.write_u16((u16::from(header.status & 0x1F) << 11) | (header.control_data_length & 0x07FF));
    w.write_u64(header.stream_id);
}

pub(crate) fn read_frame_header(
    r: &mut Reader<'_>,
) -> Result<(MacAddr, MacAddr, ControlHeader), PduError> {
    let dest = MacAddr::new(r.read_array::<6>()?);
    let src = MacAddr::new(r.read_array::<6>()?);
    let ethertype = r.read_u16()?;
    if ethertype != config::AVTP_ETHERTYPE {
        return Err(PduError::MalformedField("ethertype"));
    }
    let cd_subtype = r.read_u8()?;
    if cd_subtype & 0x80 == 0 {
        return Err(PduError::MalformedField("cd bit"));
    }
    let sv_version_md = r.read_u8()?;
    if sv_version_md & 0x70 != 0 {
        return Err(PduError::MalformedField("avtp version"));
    }
    let status_cdl = r.read_u16()?;
    let stream_id = r.read_u64()?;
    Ok((
        dest,
        src,
        ControlHeader {
            subtype: cd_subtype & 0x7F,
            message_type: sv_version_md & 0x0F,
            status: (status_cdl >> 11) as u8,
            control_data_length: status_cdl & 0x07FF,
            stream_id,
        },
    ))
}

/// A parsed AVDECC datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    Adp(Adpdu),
    Aecp(Aecpdu),
    Acmp(Acmpdu),
}

/// Parse a raw Ethernet II frame into an AVDECC PDU.
///
/// Frames with a non-AVDECC subtype (MAAP, streaming AVTPDUs) yield
/// `MalformedField("subtype")`; callers treat that as "not for us".
pub fn parse_frame(frame: &[u8], tolerance: &ProtocolTolerance) -> Result<Pdu, PduError> {
    let mut r = Reader::new(frame);
    let (dest, src, header) = read_frame_header(&mut r)?;

    match header.subtype {
        AVTP_SUBTYPE_ADP => Ok(Pdu::Adp(Adpdu::parse(dest, src, header, &mut r, tolerance)?)),
        AVTP_SUBTYPE_AECP => Ok(Pdu::Aecp(Aecpdu::parse(dest, src, header, &mut r, tolerance)?)),
        AVTP_SUBTYPE_ACMP => Ok(Pdu::Acmp(Acmpdu::parse(dest, src, header, &mut r, tolerance)?)),
        _ => Err(PduError::MalformedField("subtype")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_header_round_trip() {
        let dest = MacAddr::new([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x00]);
        let src = MacAddr::new([2, 0, 0, 0, 0, 1]);
        let header = ControlHeader {
            subtype: AVTP_SUBTYPE_ADP,
            message_type: 2,
            status: 31,
            control_data_length: 56,
            stream_id: 0x0102_0304_0506_0708,
        };

        let mut w = Writer::with_capacity(26);
        write_frame_header(&mut w, dest, src, header);
        let buf = w.into_vec();
        assert_eq!(buf.len(), 26);

        // Structural offsets per the frame skeleton
        assert_eq!(&buf[12..14], &[0x22, 0xF0], "EtherType");
        assert_eq!(buf[14], 0xFA, "cd|subtype for ADP");
        assert_eq!(buf[15], 0x02, "sv|version|message_type");
        assert_eq!(u16::from_be_bytes([buf[16], buf[17]]), (31 << 11) | 56, "status|cdl");

        let mut r = Reader::new(&buf);
        let (d, s, h) = read_frame_header(&mut r).expect("header parses");
        assert_eq!(d, dest);
        assert_eq!(s, src);
        assert_eq!(h, header);
    }

    #[test]
    fn rejects_foreign_ethertype_and_version() {
        let mut w = Writer::with_capacity(26);
        write_frame_header(
            &mut w,
            MacAddr::ZERO,
            MacAddr::ZERO,
            ControlHeader {
                subtype: AVTP_SUBTYPE_ADP,
                message_type: 0,
                status: 0,
                control_data_length: 0,
                stream_id: 0,
            },
        );
        let mut buf = w.into_vec();
        buf[12] = 0x08; // IPv4
        let mut r = Reader::new(&buf);
        assert!(matches!(read_frame_header(&mut r), Err(PduError::MalformedField("ethertype"))));

        buf[12] = 0x22;
        buf[15] |= 0x10; // version 1
        let mut r = Reader::new(&buf);
        assert!(matches!(read_frame_header(&mut r), Err(PduError::MalformedField("avtp version"))));
    }

    #[test]
    fn parse_frame_rejects_unknown_subtype() {
        let mut w = Writer::with_capacity(26);
        write_frame_header(
            &mut w,
            MacAddr::ZERO,
            MacAddr::ZERO,
            ControlHeader {
                subtype: config::AVTP_SUBTYPE_MAAP,
                message_type: 0,
                status: 0,
                control_data_length: 0,
                stream_id: 0,
            },
        );
        let buf = w.into_vec();
        assert!(matches!(
            parse_frame(&buf, &ProtocolTolerance::default()),
            Err(PduError::MalformedField("subtype"))
        ));
    }
}
