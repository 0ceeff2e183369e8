// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Milan vendor-unique payload codecs (Milan v1.2 Clause 7.4).

use super::cursor::{Reader, Writer};
use super::PduError;
use crate::model::{ConfigurationIndex, MilanFeaturesFlags, MilanInfo};

/// GET_MILAN_INFO command payload (2 bytes).
#[must_use]
pub fn serialize_get_milan_info(configuration_index: ConfigurationIndex) -> Vec<u8> {
    let mut w = Writer::with_capacity(2);
    w.write_u16(configuration_index);
    w.into_vec()
}

/// GET_MILAN_INFO response payload (14 bytes).
#[must_use]
pub fn serialize_milan_info_response(
    configuration_index: ConfigurationIndex,
    info: &MilanInfo,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(14);
    w.write_u16(configuration_index);
    w.write_u32(info.protocol_version);
    w.write_u32(info.features.value());
    w.write_u32(info.certification_version);
    w.into_vec()
}

pub fn deserialize_milan_info_response(
    payload: &[u8],
) -> Result<(ConfigurationIndex, MilanInfo), PduError> {
    let mut r = Reader::new(payload);
    let configuration_index = r.read_u16()?;
    let protocol_version = r.read_u32()?;
    let features = MilanFeaturesFlags::from(r.read_u32()?);
    let certification_version = r.read_u32()?;
    Ok((configuration_index, MilanInfo { protocol_version, features, certification_version }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milan_info_round_trip() {
        let info = MilanInfo {
            protocol_version: 1,
            features: MilanFeaturesFlags::REDUNDANCY,
            certification_version: 0x0100_0000,
        };
        let payload = serialize_milan_info_response(0, &info);
        assert_eq!(payload.len(), 14);
        let (cfg, parsed) = deserialize_milan_info_response(&payload).expect("deserializes");
        assert_eq!(cfg, 0);
        assert_eq!(parsed, info);
    }

    #[test]
    fn short_response_rejected() {
        assert!(matches!(
            deserialize_milan_info_response(&[0, 0, 0]),
            Err(PduError::IncorrectPayloadSize)
        ));
    }
}
