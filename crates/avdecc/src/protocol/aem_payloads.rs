// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AEM command/response payload codecs (IEEE 1722.1-2013 Clause 7.4).
//!
//! One serialize/deserialize pair per command type. Deserializers accept
//! payloads longer than the clause minimum (devices may append data from a
//! newer revision) and reject shorter ones with
//! [`PduError::IncorrectPayloadSize`].

use super::cursor::{Reader, Writer};
use super::PduError;
use crate::model::{
    AsPath, AudioMapping, AvbInfo, AvbInfoFlags, AvdeccFixedString, ConfigurationIndex,
    DescriptorIndex, DescriptorType, EntityCounters, MsrpMapping, OperationId, SamplingRate,
    StreamFormat, StreamInfo, StreamInfoFlags, UniqueIdentifier,
};

/// ACQUIRE_ENTITY flags (Clause 7.4.1.1).
pub mod acquire_flags {
    pub const PERSISTENT: u32 = 0x0000_0001;
    pub const RELEASE: u32 = 0x8000_0000;
}

/// LOCK_ENTITY flags (Clause 7.4.2.1).
pub mod lock_flags {
    pub const UNLOCK: u32 = 0x0000_0001;
}

fn write_desc_ref(w: &mut Writer, descriptor_type: DescriptorType, descriptor_index: u16) {
    w.write_u16(descriptor_type as u16);
    w.write_u16(descriptor_index);
}

fn read_desc_ref(r: &mut Reader<'_>) -> Result<(DescriptorType, DescriptorIndex), PduError> {
    let descriptor_type =
        DescriptorType::from_u16(r.read_u16()?).ok_or(PduError::InvalidDescriptorType)?;
    Ok((descriptor_type, r.read_u16()?))
}

// ===========================================================================
// ACQUIRE_ENTITY / LOCK_ENTITY - Clause 7.4.1 / 7.4.2 (16 bytes each way)
// ===========================================================================

#[must_use]
pub fn serialize_acquire_entity(
    flags: u32,
    owner_id: UniqueIdentifier,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(16);
    w.write_u32(flags);
    w.write_u64(owner_id.value());
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.into_vec()
}

pub fn deserialize_acquire_entity(
    payload: &[u8],
) -> Result<(u32, UniqueIdentifier, DescriptorType, DescriptorIndex), PduError> {
    let mut r = Reader::new(payload);
    let flags = r.read_u32()?;
    let owner_id = UniqueIdentifier::from(r.read_u64()?);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    Ok((flags, owner_id, descriptor_type, descriptor_index))
}

#[must_use]
pub fn serialize_lock_entity(
    flags: u32,
    locked_id: UniqueIdentifier,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Vec<u8> {
    serialize_acquire_entity(flags, locked_id, descriptor_type, descriptor_index)
}

pub fn deserialize_lock_entity(
    payload: &[u8],
) -> Result<(u32, UniqueIdentifier, DescriptorType, DescriptorIndex), PduError> {
    deserialize_acquire_entity(payload)
}

// ===========================================================================
// READ_DESCRIPTOR command - Clause 7.4.5.1 (8 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_read_descriptor(
    configuration_index: ConfigurationIndex,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    w.write_u16(configuration_index);
    w.write_u16(0); // reserved
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.into_vec()
}

pub fn deserialize_read_descriptor(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorType, DescriptorIndex), PduError> {
    let mut r = Reader::new(payload);
    let configuration_index = r.read_u16()?;
    r.skip(2)?;
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    Ok((configuration_index, descriptor_type, descriptor_index))
}

// ===========================================================================
// SET_CONFIGURATION / GET_CONFIGURATION - Clause 7.4.7 / 7.4.8 (4 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_set_configuration(configuration_index: ConfigurationIndex) -> Vec<u8> {
    let mut w = Writer::with_capacity(4);
    w.write_u16(0); // reserved
    w.write_u16(configuration_index);
    w.into_vec()
}

pub fn deserialize_configuration_response(payload: &[u8]) -> Result<ConfigurationIndex, PduError> {
    let mut r = Reader::new(payload);
    r.skip(2)?;
    r.read_u16()
}

// ===========================================================================
// SET_STREAM_FORMAT / GET_STREAM_FORMAT - Clause 7.4.9 / 7.4.10
// ===========================================================================

#[must_use]
pub fn serialize_set_stream_format(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    stream_format: StreamFormat,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(12);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u64(stream_format.value());
    w.into_vec()
}

pub fn deserialize_stream_format_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, StreamFormat), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    Ok((descriptor_type, descriptor_index, StreamFormat::from(r.read_u64()?)))
}

/// Command payload shared by every "query this descriptor" GET (4 bytes).
#[must_use]
pub fn serialize_desc_ref(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(4);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.into_vec()
}

pub fn deserialize_desc_ref(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex), PduError> {
    let mut r = Reader::new(payload);
    read_desc_ref(&mut r)
}

// ===========================================================================
// SET_STREAM_INFO / GET_STREAM_INFO - Clause 7.4.15 / 7.4.16 (48 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_stream_info(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    info: &StreamInfo,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(48);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u32(info.flags.value());
    w.write_u64(info.stream_format.value());
    w.write_u64(info.stream_id.value());
    w.write_u32(info.msrp_accumulated_latency);
    w.write_bytes(&info.stream_dest_mac.octets());
    w.write_u8(info.msrp_failure_code);
    w.write_u8(0); // reserved
    w.write_u64(info.msrp_failure_bridge_id);
    w.write_u16(info.stream_vlan_id);
    w.write_u16(0); // reserved
    w.into_vec()
}

pub fn deserialize_stream_info_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, StreamInfo), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let flags = StreamInfoFlags::from(r.read_u32()?);
    let stream_format = StreamFormat::from(r.read_u64()?);
    let stream_id = UniqueIdentifier::from(r.read_u64()?);
    let msrp_accumulated_latency = r.read_u32()?;
    let stream_dest_mac = crate::model::MacAddr::new(r.read_array::<6>()?);
    let msrp_failure_code = r.read_u8()?;
    r.skip(1)?;
    let msrp_failure_bridge_id = r.read_u64()?;
    let stream_vlan_id = r.read_u16()?;
    r.skip(2)?;
    Ok((
        descriptor_type,
        descriptor_index,
        StreamInfo {
            flags,
            stream_format,
            stream_id,
            msrp_accumulated_latency,
            stream_dest_mac,
            msrp_failure_code,
            msrp_failure_bridge_id,
            stream_vlan_id,
        },
    ))
}

// ===========================================================================
// SET_NAME / GET_NAME - Clause 7.4.17 / 7.4.18
// ===========================================================================

#[must_use]
pub fn serialize_set_name(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    name_index: u16,
    configuration_index: ConfigurationIndex,
    name: &AvdeccFixedString,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(72);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(name_index);
    w.write_u16(configuration_index);
    w.write_bytes(name.as_bytes());
    w.into_vec()
}

#[must_use]
pub fn serialize_get_name(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    name_index: u16,
    configuration_index: ConfigurationIndex,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(name_index);
    w.write_u16(configuration_index);
    w.into_vec()
}

pub fn deserialize_name_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, u16, ConfigurationIndex, AvdeccFixedString), PduError>
{
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let name_index = r.read_u16()?;
    let configuration_index = r.read_u16()?;
    let name = AvdeccFixedString::from_bytes(r.read_array::<64>()?);
    Ok((descriptor_type, descriptor_index, name_index, configuration_index, name))
}

// ===========================================================================
// SET_SAMPLING_RATE / GET_SAMPLING_RATE - Clause 7.4.21 / 7.4.22 (8 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_set_sampling_rate(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    rate: SamplingRate,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u32(rate.value());
    w.into_vec()
}

pub fn deserialize_sampling_rate_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, SamplingRate), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    Ok((descriptor_type, descriptor_index, SamplingRate::from(r.read_u32()?)))
}

// ===========================================================================
// SET_CLOCK_SOURCE / GET_CLOCK_SOURCE - Clause 7.4.23 / 7.4.24 (8 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_set_clock_source(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    clock_source_index: u16,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(clock_source_index);
    w.write_u16(0); // reserved
    w.into_vec()
}

pub fn deserialize_clock_source_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, u16), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let clock_source_index = r.read_u16()?;
    Ok((descriptor_type, descriptor_index, clock_source_index))
}

// ===========================================================================
// GET_AVB_INFO - Clause 7.4.40 (response >= 20 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_avb_info_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    info: &AvbInfo,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(20 + info.mappings.len() * 4);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u64(info.gptp_grandmaster_id.value());
    w.write_u32(info.propagation_delay);
    w.write_u8(info.gptp_domain_number);
    w.write_u8(info.flags.value());
    w.write_u16(info.mappings.len() as u16);
    for mapping in &info.mappings {
        w.write_u8(mapping.traffic_class);
        w.write_u8(mapping.priority);
        w.write_u16(mapping.vlan_id);
    }
    w.into_vec()
}

pub fn deserialize_avb_info_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, AvbInfo), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let gptp_grandmaster_id = UniqueIdentifier::from(r.read_u64()?);
    let propagation_delay = r.read_u32()?;
    let gptp_domain_number = r.read_u8()?;
    let flags = AvbInfoFlags::from(r.read_u8()?);
    let count = r.read_u16()?;
    let mut mappings = Vec::with_capacity(usize::from(count).min(8));
    for _ in 0..count {
        mappings.push(MsrpMapping {
            traffic_class: r.read_u8()?,
            priority: r.read_u8()?,
            vlan_id: r.read_u16()?,
        });
    }
    Ok((
        descriptor_type,
        descriptor_index,
        AvbInfo { gptp_grandmaster_id, propagation_delay, gptp_domain_number, flags, mappings },
    ))
}

// ===========================================================================
// GET_AS_PATH - Clause 7.4.41
// ===========================================================================

#[must_use]
pub fn serialize_get_as_path(descriptor_index: DescriptorIndex) -> Vec<u8> {
    let mut w = Writer::with_capacity(4);
    w.write_u16(descriptor_index);
    w.write_u16(0); // reserved
    w.into_vec()
}

#[must_use]
pub fn serialize_as_path_response(descriptor_index: DescriptorIndex, path: &AsPath) -> Vec<u8> {
    let mut w = Writer::with_capacity(4 + path.sequence.len() * 8);
    w.write_u16(descriptor_index);
    w.write_u16(path.sequence.len() as u16);
    for hop in &path.sequence {
        w.write_u64(hop.value());
    }
    w.into_vec()
}

pub fn deserialize_as_path_response(payload: &[u8]) -> Result<(DescriptorIndex, AsPath), PduError> {
    let mut r = Reader::new(payload);
    let descriptor_index = r.read_u16()?;
    let count = r.read_u16()?;
    let mut sequence = Vec::with_capacity(usize::from(count).min(16));
    for _ in 0..count {
        sequence.push(UniqueIdentifier::from(r.read_u64()?));
    }
    Ok((descriptor_index, AsPath { sequence }))
}

// ===========================================================================
// GET_COUNTERS - Clause 7.4.42 (response 136 bytes)
// ===========================================================================

#[must_use]
pub fn serialize_counters_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    counters: &EntityCounters,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(136);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u32(counters.valid);
    for counter in counters.counters {
        w.write_u32(counter);
    }
    w.into_vec()
}

pub fn deserialize_counters_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, EntityCounters), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let valid = r.read_u32()?;
    let mut counters = [0u32; 32];
    for counter in &mut counters {
        *counter = r.read_u32()?;
    }
    Ok((descriptor_type, descriptor_index, EntityCounters { valid, counters }))
}

// ===========================================================================
// GET_AUDIO_MAP / ADD_AUDIO_MAPPINGS / REMOVE_AUDIO_MAPPINGS
// Clause 7.4.44 / 7.4.45 / 7.4.46
// ===========================================================================

#[must_use]
pub fn serialize_get_audio_map(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    map_index: u16,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(map_index);
    w.write_u16(0); // reserved
    w.into_vec()
}

#[must_use]
pub fn serialize_audio_map_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    map_index: u16,
    number_of_maps: u16,
    mappings: &[AudioMapping],
) -> Vec<u8> {
    let mut w = Writer::with_capacity(12 + mappings.len() * 8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(map_index);
    w.write_u16(number_of_maps);
    w.write_u16(mappings.len() as u16);
    w.write_u16(0); // reserved
    write_mappings(&mut w, mappings);
    w.into_vec()
}

pub fn deserialize_audio_map_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, u16, u16, Vec<AudioMapping>), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let map_index = r.read_u16()?;
    let number_of_maps = r.read_u16()?;
    let count = r.read_u16()?;
    r.skip(2)?;
    let mappings = read_mappings(&mut r, count)?;
    Ok((descriptor_type, descriptor_index, map_index, number_of_maps, mappings))
}

#[must_use]
pub fn serialize_audio_mappings(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    mappings: &[AudioMapping],
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8 + mappings.len() * 8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(mappings.len() as u16);
    w.write_u16(0); // reserved
    write_mappings(&mut w, mappings);
    w.into_vec()
}

pub fn deserialize_audio_mappings(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, Vec<AudioMapping>), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let count = r.read_u16()?;
    r.skip(2)?;
    let mappings = read_mappings(&mut r, count)?;
    Ok((descriptor_type, descriptor_index, mappings))
}

fn write_mappings(w: &mut Writer, mappings: &[AudioMapping]) {
    for mapping in mappings {
        w.write_u16(mapping.stream_index);
        w.write_u16(mapping.stream_channel);
        w.write_u16(mapping.cluster_offset);
        w.write_u16(mapping.cluster_channel);
    }
}

fn read_mappings(r: &mut Reader<'_>, count: u16) -> Result<Vec<AudioMapping>, PduError> {
    let mut mappings = Vec::with_capacity(usize::from(count).min(64));
    for _ in 0..count {
        mappings.push(AudioMapping {
            stream_index: r.read_u16()?,
            stream_channel: r.read_u16()?,
            cluster_offset: r.read_u16()?,
            cluster_channel: r.read_u16()?,
        });
    }
    Ok(mappings)
}

// ===========================================================================
// START_OPERATION / ABORT_OPERATION / OPERATION_STATUS - Clause 7.4.53-55
// ===========================================================================

#[must_use]
pub fn serialize_start_operation(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    operation_id: OperationId,
    operation_type: u16,
    buffer: &[u8],
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8 + buffer.len());
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(operation_id);
    w.write_u16(operation_type);
    w.write_bytes(buffer);
    w.into_vec()
}

pub fn deserialize_start_operation_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, OperationId, u16), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let operation_id = r.read_u16()?;
    let operation_type = r.read_u16()?;
    Ok((descriptor_type, descriptor_index, operation_id, operation_type))
}

#[must_use]
pub fn serialize_abort_operation(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    operation_id: OperationId,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(8);
    write_desc_ref(&mut w, descriptor_type, descriptor_index);
    w.write_u16(operation_id);
    w.write_u16(0); // reserved
    w.into_vec()
}

pub fn deserialize_abort_operation_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, OperationId), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let operation_id = r.read_u16()?;
    Ok((descriptor_type, descriptor_index, operation_id))
}

/// OPERATION_STATUS is push-only: the device reports percent complete in
/// 1/1000 units (Clause 7.4.55).
pub fn deserialize_operation_status(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, OperationId, u16), PduError> {
    let mut r = Reader::new(payload);
    let (descriptor_type, descriptor_index) = read_desc_ref(&mut r)?;
    let operation_id = r.read_u16()?;
    let percent_complete = r.read_u16()?;
    Ok((descriptor_type, descriptor_index, operation_id, percent_complete))
}

// ===========================================================================
// SET_MEMORY_OBJECT_LENGTH / GET_MEMORY_OBJECT_LENGTH - Clause 7.4.72 / 7.4.73
// ===========================================================================

#[must_use]
pub fn serialize_set_memory_object_length(
    configuration_index: ConfigurationIndex,
    memory_object_index: DescriptorIndex,
    length: u64,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(12);
    w.write_u16(configuration_index);
    w.write_u16(memory_object_index);
    w.write_u64(length);
    w.into_vec()
}

#[must_use]
pub fn serialize_get_memory_object_length(
    configuration_index: ConfigurationIndex,
    memory_object_index: DescriptorIndex,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(4);
    w.write_u16(configuration_index);
    w.write_u16(memory_object_index);
    w.into_vec()
}

pub fn deserialize_memory_object_length_response(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorIndex, u64), PduError> {
    let mut r = Reader::new(payload);
    let configuration_index = r.read_u16()?;
    let memory_object_index = r.read_u16()?;
    let length = r.read_u64()?;
    Ok((configuration_index, memory_object_index, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_entity_round_trip() {
        let payload = serialize_acquire_entity(
            acquire_flags::PERSISTENT,
            UniqueIdentifier::NULL,
            DescriptorType::Entity,
            0,
        );
        assert_eq!(payload.len(), 16);
        let (flags, owner, dt, di) = deserialize_acquire_entity(&payload).expect("deserializes");
        assert_eq!(flags, acquire_flags::PERSISTENT);
        assert!(owner.is_null());
        assert_eq!(dt, DescriptorType::Entity);
        assert_eq!(di, 0);
    }

    #[test]
    fn short_payload_is_incorrect_size() {
        let payload = serialize_acquire_entity(
            0,
            UniqueIdentifier::NULL,
            DescriptorType::Entity,
            0,
        );
        assert!(matches!(
            deserialize_acquire_entity(&payload[..12]),
            Err(PduError::IncorrectPayloadSize)
        ));
    }

    #[test]
    fn unknown_descriptor_type_is_rejected() {
        let mut payload =
            serialize_set_stream_format(DescriptorType::StreamInput, 3, StreamFormat(0x0205));
        payload[0..2].copy_from_slice(&0x0003u16.to_be_bytes()); // VIDEO_UNIT, not modeled
        assert!(matches!(
            deserialize_stream_format_response(&payload),
            Err(PduError::InvalidDescriptorType)
        ));
    }

    #[test]
    fn stream_info_round_trip() {
        let info = StreamInfo {
            flags: StreamInfoFlags::CONNECTED.union(StreamInfoFlags::STREAM_ID_VALID),
            stream_format: StreamFormat(0x00A0_0203_0406_0000),
            stream_id: UniqueIdentifier::from(0x9999_0000_0000_0042),
            msrp_accumulated_latency: 1250,
            stream_dest_mac: crate::model::MacAddr::new([0x91, 0xE0, 0xF0, 0, 0x11, 0x22]),
            msrp_failure_code: 0,
            msrp_failure_bridge_id: 0,
            stream_vlan_id: 2,
        };
        let payload = serialize_stream_info(DescriptorType::StreamInput, 1, &info);
        assert_eq!(payload.len(), 48);
        let (dt, di, parsed) = deserialize_stream_info_response(&payload).expect("deserializes");
        assert_eq!((dt, di), (DescriptorType::StreamInput, 1));
        assert_eq!(parsed, info);
    }

    #[test]
    fn name_payload_round_trip() {
        let name = AvdeccFixedString::from("Studio-A");
        let payload = serialize_set_name(DescriptorType::Configuration, 0, 0, 0, &name);
        assert_eq!(payload.len(), 72);
        let (dt, di, name_index, cfg, parsed) =
            deserialize_name_response(&payload).expect("deserializes");
        assert_eq!((dt, di, name_index, cfg), (DescriptorType::Configuration, 0, 0, 0));
        assert_eq!(parsed.as_str(), "Studio-A");
    }

    #[test]
    fn avb_info_with_mappings_round_trip() {
        let info = AvbInfo {
            gptp_grandmaster_id: UniqueIdentifier::from(0xAABB_0000_0000_0001),
            propagation_delay: 350,
            gptp_domain_number: 0,
            flags: AvbInfoFlags::AS_CAPABLE.union(AvbInfoFlags::SRP_ENABLED),
            mappings: vec![
                MsrpMapping { traffic_class: 0, priority: 3, vlan_id: 2 },
                MsrpMapping { traffic_class: 1, priority: 2, vlan_id: 2 },
            ],
        };
        let payload = serialize_avb_info_response(DescriptorType::AvbInterface, 0, &info);
        assert_eq!(payload.len(), 20 + 8);
        let (dt, _, parsed) = deserialize_avb_info_response(&payload).expect("deserializes");
        assert_eq!(dt, DescriptorType::AvbInterface);
        assert_eq!(parsed, info);
    }

    #[test]
    fn counters_round_trip() {
        let mut counters = EntityCounters { valid: 0b101, ..Default::default() };
        counters.counters[0] = 17;
        counters.counters[2] = 9000;
        let payload = serialize_counters_response(DescriptorType::AvbInterface, 0, &counters);
        assert_eq!(payload.len(), 136);
        let (_, _, parsed) = deserialize_counters_response(&payload).expect("deserializes");
        assert_eq!(parsed, counters);
    }

    #[test]
    fn audio_map_pagination_fields() {
        let mappings = vec![
            AudioMapping { stream_index: 0, stream_channel: 0, cluster_offset: 0, cluster_channel: 0 },
            AudioMapping { stream_index: 0, stream_channel: 1, cluster_offset: 1, cluster_channel: 0 },
        ];
        let payload =
            serialize_audio_map_response(DescriptorType::StreamPortInput, 0, 1, 3, &mappings);
        let (dt, di, map_index, number_of_maps, parsed) =
            deserialize_audio_map_response(&payload).expect("deserializes");
        assert_eq!((dt, di, map_index, number_of_maps), (DescriptorType::StreamPortInput, 0, 1, 3));
        assert_eq!(parsed, mappings);
    }

    #[test]
    fn as_path_and_memory_object_round_trip() {
        let path = AsPath {
            sequence: vec![
                UniqueIdentifier::from(0x0001_0000_0000_0001),
                UniqueIdentifier::from(0x0001_0000_0000_0002),
            ],
        };
        let payload = serialize_as_path_response(0, &path);
        let (_, parsed) = deserialize_as_path_response(&payload).expect("deserializes");
        assert_eq!(parsed, path);

        let payload = serialize_set_memory_object_length(0, 1, 0x0001_0000);
        let (cfg, idx, len) =
            deserialize_memory_object_length_response(&payload).expect("deserializes");
        assert_eq!((cfg, idx, len), (0, 1, 0x0001_0000));
    }

    #[test]
    fn operation_payloads() {
        let payload = serialize_start_operation(DescriptorType::MemoryObject, 0, 7, 2, &[]);
        let (dt, di, id, op) =
            deserialize_start_operation_response(&payload).expect("deserializes");
        assert_eq!((dt, di, id, op), (DescriptorType::MemoryObject, 0, 7, 2));

        let status = deserialize_operation_status(&serialize_start_operation(
            DescriptorType::MemoryObject,
            0,
            7,
            500,
            &[],
        ))
        .expect("deserializes");
        assert_eq!(status, (DescriptorType::MemoryObject, 0, 7, 500));
    }
}
