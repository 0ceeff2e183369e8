// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! READ_DESCRIPTOR response codec (IEEE 1722.1-2013 Clause 7.4.5.2 + 7.2).
//!
//! The response payload is:
//!
//! ```text
//! [0..2)  configuration_index
//! [2..4)  reserved
//! [4..6)  descriptor_type        --+
//! [6..8)  descriptor_index         | the raw descriptor, offsets in its
//! [8..)   type-specific fields   --+ table fields count from byte 4
//! ```
//!
//! Table offsets inside a descriptor (formats_offset, sampling_rates_offset,
//! ...) are honored on decode so payloads from newer revisions with extra
//! fixed fields still parse.

use super::cursor::{Reader, Writer};
use super::PduError;
use crate::model::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioMapping, AudioUnitDescriptor,
    AvbInterfaceDescriptor, AvdeccFixedString, ClockDomainDescriptor, ClockSourceDescriptor,
    ConfigurationDescriptor, ConfigurationIndex, Descriptor, DescriptorCount, DescriptorIndex,
    DescriptorType, EntityDescriptor, ExternalPortDescriptor, InternalPortDescriptor,
    JackDescriptor, LocaleDescriptor, MacAddr, MemoryObjectDescriptor, SamplingRate,
    StreamDescriptor, StreamPortDescriptor, StringsDescriptor, StreamFormat, UniqueIdentifier,
    ControllerCapabilities, EntityCapabilities, ListenerCapabilities, TalkerCapabilities,
};

/// Encode a READ_DESCRIPTOR response payload.
#[must_use]
pub fn serialize_read_descriptor_response(
    configuration_index: ConfigurationIndex,
    descriptor_index: DescriptorIndex,
    descriptor: &Descriptor,
) -> Vec<u8> {
    let mut w = Writer::with_capacity(384);
    w.write_u16(configuration_index);
    w.write_u16(0); // reserved
    w.write_u16(descriptor.descriptor_type() as u16);
    w.write_u16(descriptor_index);

    match descriptor {
        Descriptor::Entity(d) => write_entity(&mut w, d),
        Descriptor::Configuration(d) => write_configuration(&mut w, d),
        Descriptor::AudioUnit(d) => write_audio_unit(&mut w, d),
        Descriptor::StreamInput(d) | Descriptor::StreamOutput(d) => write_stream(&mut w, d),
        Descriptor::JackInput(d) | Descriptor::JackOutput(d) => write_jack(&mut w, d),
        Descriptor::AvbInterface(d) => write_avb_interface(&mut w, d),
        Descriptor::ClockSource(d) => write_clock_source(&mut w, d),
        Descriptor::MemoryObject(d) => write_memory_object(&mut w, d),
        Descriptor::Locale(d) => write_locale(&mut w, d),
        Descriptor::Strings(d) => write_strings(&mut w, d),
        Descriptor::StreamPortInput(d) | Descriptor::StreamPortOutput(d) => {
            write_stream_port(&mut w, d)
        }
        Descriptor::ExternalPortInput(d) | Descriptor::ExternalPortOutput(d) => {
            write_external_port(&mut w, d)
        }
        Descriptor::InternalPortInput(d) | Descriptor::InternalPortOutput(d) => {
            write_internal_port(&mut w, d)
        }
        Descriptor::AudioCluster(d) => write_audio_cluster(&mut w, d),
        Descriptor::AudioMap(d) => write_audio_map(&mut w, d),
        Descriptor::ClockDomain(d) => write_clock_domain(&mut w, d),
    }

    w.into_vec()
}

/// Decode a READ_DESCRIPTOR response payload.
///
/// # Errors
///
/// `InvalidDescriptorType` for descriptor types this engine does not model,
/// `IncorrectPayloadSize` for truncated bodies.
pub fn deserialize_read_descriptor_response(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorIndex, Descriptor), PduError> {
    let mut r = Reader::new(payload);
    let configuration_index = r.read_u16()?;
    r.skip(2)?;
    let raw_type = r.read_u16()?;
    let descriptor_index = r.read_u16()?;
    let descriptor_type =
        DescriptorType::from_u16(raw_type).ok_or(PduError::InvalidDescriptorType)?;

    // Everything past configuration_index + reserved is "the descriptor";
    // table offsets count from its first byte (the descriptor_type field).
    let body = &payload[4..];

    let descriptor = match descriptor_type {
        DescriptorType::Entity => Descriptor::Entity(read_entity(&mut r)?),
        DescriptorType::Configuration => Descriptor::Configuration(read_configuration(&mut r, body)?),
        DescriptorType::AudioUnit => Descriptor::AudioUnit(read_audio_unit(&mut r, body)?),
        DescriptorType::StreamInput => Descriptor::StreamInput(read_stream(&mut r, body)?),
        DescriptorType::StreamOutput => Descriptor::StreamOutput(read_stream(&mut r, body)?),
        DescriptorType::JackInput => Descriptor::JackInput(read_jack(&mut r)?),
        DescriptorType::JackOutput => Descriptor::JackOutput(read_jack(&mut r)?),
        DescriptorType::AvbInterface => Descriptor::AvbInterface(read_avb_interface(&mut r)?),
        DescriptorType::ClockSource => Descriptor::ClockSource(read_clock_source(&mut r)?),
        DescriptorType::MemoryObject => Descriptor::MemoryObject(read_memory_object(&mut r)?),
        DescriptorType::Locale => Descriptor::Locale(read_locale(&mut r)?),
        DescriptorType::Strings => Descriptor::Strings(read_strings(&mut r)?),
        DescriptorType::StreamPortInput => Descriptor::StreamPortInput(read_stream_port(&mut r)?),
        DescriptorType::StreamPortOutput => Descriptor::StreamPortOutput(read_stream_port(&mut r)?),
        DescriptorType::ExternalPortInput => {
            Descriptor::ExternalPortInput(read_external_port(&mut r)?)
        }
        DescriptorType::ExternalPortOutput => {
            Descriptor::ExternalPortOutput(read_external_port(&mut r)?)
        }
        DescriptorType::InternalPortInput => {
            Descriptor::InternalPortInput(read_internal_port(&mut r)?)
        }
        DescriptorType::InternalPortOutput => {
            Descriptor::InternalPortOutput(read_internal_port(&mut r)?)
        }
        DescriptorType::AudioCluster => Descriptor::AudioCluster(read_audio_cluster(&mut r)?),
        DescriptorType::AudioMap => Descriptor::AudioMap(read_audio_map(&mut r, body)?),
        DescriptorType::ClockDomain => Descriptor::ClockDomain(read_clock_domain(&mut r, body)?),
        DescriptorType::Invalid => return Err(PduError::InvalidDescriptorType),
    };

    Ok((configuration_index, descriptor_index, descriptor))
}

fn read_fixed_string(r: &mut Reader<'_>) -> Result<AvdeccFixedString, PduError> {
    Ok(AvdeccFixedString::from_bytes(r.read_array::<64>()?))
}

/// Position a table described by (offset-from-descriptor-start, count).
fn table_reader<'a>(body: &'a [u8], offset: u16) -> Result<Reader<'a>, PduError> {
    let offset = usize::from(offset);
    if offset > body.len() {
        return Err(PduError::IncorrectPayloadSize);
    }
    Ok(Reader::new(&body[offset..]))
}

// ===========================================================================
// ENTITY - Clause 7.2.1 (308 bytes)
// ===========================================================================

fn write_entity(w: &mut Writer, d: &EntityDescriptor) {
    w.write_u64(d.entity_id.value());
    w.write_u64(d.entity_model_id.value());
    w.write_u32(d.entity_capabilities.value());
    w.write_u16(d.talker_stream_sources);
    w.write_u16(d.talker_capabilities.value());
    w.write_u16(d.listener_stream_sinks);
    w.write_u16(d.listener_capabilities.value());
    w.write_u32(d.controller_capabilities.value());
    w.write_u32(d.available_index);
    w.write_u64(d.association_id.value());
    w.write_bytes(d.entity_name.as_bytes());
    w.write_u16(d.vendor_name_string);
    w.write_u16(d.model_name_string);
    w.write_bytes(d.firmware_version.as_bytes());
    w.write_bytes(d.group_name.as_bytes());
    w.write_bytes(d.serial_number.as_bytes());
    w.write_u16(d.configurations_count);
    w.write_u16(d.current_configuration);
}

fn read_entity(r: &mut Reader<'_>) -> Result<EntityDescriptor, PduError> {
    Ok(EntityDescriptor {
        entity_id: UniqueIdentifier::from(r.read_u64()?),
        entity_model_id: UniqueIdentifier::from(r.read_u64()?),
        entity_capabilities: EntityCapabilities::from(r.read_u32()?),
        talker_stream_sources: r.read_u16()?,
        talker_capabilities: TalkerCapabilities::from(r.read_u16()?),
        listener_stream_sinks: r.read_u16()?,
        listener_capabilities: ListenerCapabilities::from(r.read_u16()?),
        controller_capabilities: ControllerCapabilities::from(r.read_u32()?),
        available_index: r.read_u32()?,
        association_id: UniqueIdentifier::from(r.read_u64()?),
        entity_name: read_fixed_string(r)?,
        vendor_name_string: r.read_u16()?,
        model_name_string: r.read_u16()?,
        firmware_version: read_fixed_string(r)?,
        group_name: read_fixed_string(r)?,
        serial_number: read_fixed_string(r)?,
        configurations_count: r.read_u16()?,
        current_configuration: r.read_u16()?,
    })
}

// ===========================================================================
// CONFIGURATION - Clause 7.2.2 (70 bytes + counts table at offset 74)
// ===========================================================================

fn write_configuration(w: &mut Writer, d: &ConfigurationDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.descriptor_counts.len() as u16);
    w.write_u16(74); // descriptor_counts_offset from descriptor start
    for count in &d.descriptor_counts {
        w.write_u16(count.descriptor_type);
        w.write_u16(count.count);
    }
}

fn read_configuration(
    r: &mut Reader<'_>,
    body: &[u8],
) -> Result<ConfigurationDescriptor, PduError> {
    let object_name = read_fixed_string(r)?;
    let localized_description = r.read_u16()?;
    let count = r.read_u16()?;
    let offset = r.read_u16()?;
    let mut table = table_reader(body, offset)?;
    let mut descriptor_counts = Vec::with_capacity(usize::from(count).min(32));
    for _ in 0..count {
        descriptor_counts.push(DescriptorCount {
            descriptor_type: table.read_u16()?,
            count: table.read_u16()?,
        });
    }
    Ok(ConfigurationDescriptor { object_name, localized_description, descriptor_counts })
}

// ===========================================================================
// AUDIO_UNIT - Clause 7.2.3 (140 bytes + sampling rates at offset 144)
// ===========================================================================

fn write_audio_unit(w: &mut Writer, d: &AudioUnitDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.clock_domain_index);
    for pair in [
        (d.number_of_stream_input_ports, d.base_stream_input_port),
        (d.number_of_stream_output_ports, d.base_stream_output_port),
        (d.number_of_external_input_ports, d.base_external_input_port),
        (d.number_of_external_output_ports, d.base_external_output_port),
        (d.number_of_internal_input_ports, d.base_internal_input_port),
        (d.number_of_internal_output_ports, d.base_internal_output_port),
        (d.number_of_controls, d.base_control),
        (d.number_of_signal_selectors, d.base_signal_selector),
        (d.number_of_mixers, d.base_mixer),
        (d.number_of_matrices, d.base_matrix),
        (d.number_of_splitters, d.base_splitter),
        (d.number_of_combiners, d.base_combiner),
        (d.number_of_demultiplexers, d.base_demultiplexer),
        (d.number_of_multiplexers, d.base_multiplexer),
        (d.number_of_transcoders, d.base_transcoder),
        (d.number_of_control_blocks, d.base_control_block),
    ] {
        w.write_u16(pair.0);
        w.write_u16(pair.1);
    }
    w.write_u32(d.current_sampling_rate.value());
    w.write_u16(144); // sampling_rates_offset from descriptor start
    w.write_u16(d.sampling_rates.len() as u16);
    for rate in &d.sampling_rates {
        w.write_u32(rate.value());
    }
}

fn read_audio_unit(r: &mut Reader<'_>, body: &[u8]) -> Result<AudioUnitDescriptor, PduError> {
    let object_name = read_fixed_string(r)?;
    let localized_description = r.read_u16()?;
    let clock_domain_index = r.read_u16()?;
    let mut pairs = [(0u16, 0u16); 16];
    for pair in &mut pairs {
        pair.0 = r.read_u16()?;
        pair.1 = r.read_u16()?;
    }
    let current_sampling_rate = SamplingRate::from(r.read_u32()?);
    let offset = r.read_u16()?;
    let count = r.read_u16()?;
    let mut table = table_reader(body, offset)?;
    let mut sampling_rates = Vec::with_capacity(usize::from(count).min(16));
    for _ in 0..count {
        sampling_rates.push(SamplingRate::from(table.read_u32()?));
    }
    Ok(AudioUnitDescriptor {
        object_name,
        localized_description,
        clock_domain_index,
        number_of_stream_input_ports: pairs[0].0,
        base_stream_input_port: pairs[0].1,
        number_of_stream_output_ports: pairs[1].0,
        base_stream_output_port: pairs[1].1,
        number_of_external_input_ports: pairs[2].0,
        base_external_input_port: pairs[2].1,
        number_of_external_output_ports: pairs[3].0,
        base_external_output_port: pairs[3].1,
        number_of_internal_input_ports: pairs[4].0,
        base_internal_input_port: pairs[4].1,
        number_of_internal_output_ports: pairs[5].0,
        base_internal_output_port: pairs[5].1,
        number_of_controls: pairs[6].0,
        base_control: pairs[6].1,
        number_of_signal_selectors: pairs[7].0,
        base_signal_selector: pairs[7].1,
        number_of_mixers: pairs[8].0,
        base_mixer: pairs[8].1,
        number_of_matrices: pairs[9].0,
        base_matrix: pairs[9].1,
        number_of_splitters: pairs[10].0,
        base_splitter: pairs[10].1,
        number_of_combiners: pairs[11].0,
        base_combiner: pairs[11].1,
        number_of_demultiplexers: pairs[12].0,
        base_demultiplexer: pairs[12].1,
        number_of_multiplexers: pairs[13].0,
        base_multiplexer: pairs[13].1,
        number_of_transcoders: pairs[14].0,
        base_transcoder: pairs[14].1,
        number_of_control_blocks: pairs[15].0,
        base_control_block: pairs[15].1,
        current_sampling_rate,
        sampling_rates,
    })
}

// ===========================================================================
// STREAM_INPUT / STREAM_OUTPUT - Clause 7.2.6 (128 bytes + formats at 132)
// ===========================================================================

fn write_stream(w: &mut Writer, d: &StreamDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.clock_domain_index);
    w.write_u16(d.stream_flags);
    w.write_u64(d.current_format.value());
    w.write_u16(132); // formats_offset from descriptor start
    w.write_u16(d.formats.len() as u16);
    w.write_u64(d.backup_talker_entity_id_0.value());
    w.write_u16(d.backup_talker_unique_id_0);
    w.write_u64(d.backup_talker_entity_id_1.value());
    w.write_u16(d.backup_talker_unique_id_1);
    w.write_u64(d.backup_talker_entity_id_2.value());
    w.write_u16(d.backup_talker_unique_id_2);
    w.write_u64(d.backedup_talker_entity_id.value());
    w.write_u16(d.backedup_talker_unique_id);
    w.write_u16(d.avb_interface_index);
    w.write_u32(d.buffer_length);
    for format in &d.formats {
        w.write_u64(format.value());
    }
}

fn read_stream(r: &mut Reader<'_>, body: &[u8]) -> Result<StreamDescriptor, PduError> {
    let object_name = read_fixed_string(r)?;
    let localized_description = r.read_u16()?;
    let clock_domain_index = r.read_u16()?;
    let stream_flags = r.read_u16()?;
    let current_format = StreamFormat::from(r.read_u64()?);
    let offset = r.read_u16()?;
    let count = r.read_u16()?;
    let backup_talker_entity_id_0 = UniqueIdentifier::from(r.read_u64()?);
    let backup_talker_unique_id_0 = r.read_u16()?;
    let backup_talker_entity_id_1 = UniqueIdentifier::from(r.read_u64()?);
    let backup_talker_unique_id_1 = r.read_u16()?;
    let backup_talker_entity_id_2 = UniqueIdentifier::from(r.read_u64()?);
    let backup_talker_unique_id_2 = r.read_u16()?;
    let backedup_talker_entity_id = UniqueIdentifier::from(r.read_u64()?);
    let backedup_talker_unique_id = r.read_u16()?;
    let avb_interface_index = r.read_u16()?;
    let buffer_length = r.read_u32()?;
    let mut table = table_reader(body, offset)?;
    let mut formats = Vec::with_capacity(usize::from(count).min(32));
    for _ in 0..count {
        formats.push(StreamFormat::from(table.read_u64()?));
    }
    Ok(StreamDescriptor {
        object_name,
        localized_description,
        clock_domain_index,
        stream_flags,
        current_format,
        backup_talker_entity_id_0,
        backup_talker_unique_id_0,
        backup_talker_entity_id_1,
        backup_talker_unique_id_1,
        backup_talker_entity_id_2,
        backup_talker_unique_id_2,
        backedup_talker_entity_id,
        backedup_talker_unique_id,
        avb_interface_index,
        buffer_length,
        formats,
    })
}

// ===========================================================================
// JACK_INPUT / JACK_OUTPUT - Clause 7.2.7 (74 bytes)
// ===========================================================================

fn write_jack(w: &mut Writer, d: &JackDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.jack_flags);
    w.write_u16(d.jack_type);
    w.write_u16(d.number_of_controls);
    w.write_u16(d.base_control);
}

fn read_jack(r: &mut Reader<'_>) -> Result<JackDescriptor, PduError> {
    Ok(JackDescriptor {
        object_name: read_fixed_string(r)?,
        localized_description: r.read_u16()?,
        jack_flags: r.read_u16()?,
        jack_type: r.read_u16()?,
        number_of_controls: r.read_u16()?,
        base_control: r.read_u16()?,
    })
}

// ===========================================================================
// AVB_INTERFACE - Clause 7.2.8 (94 bytes)
// ===========================================================================

fn write_avb_interface(w: &mut Writer, d: &AvbInterfaceDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_bytes(&d.mac_address.octets());
    w.write_u16(d.interface_flags);
    w.write_u64(d.clock_identity.value());
    w.write_u8(d.priority1);
    w.write_u8(d.clock_class);
    w.write_u16(d.offset_scaled_log_variance);
    w.write_u8(d.clock_accuracy);
    w.write_u8(d.priority2);
    w.write_u8(d.domain_number);
    w.write_u8(d.log_sync_interval as u8);
    w.write_u8(d.log_announce_interval as u8);
    w.write_u8(d.log_pdelay_interval as u8);
    w.write_u16(d.port_number);
}

fn read_avb_interface(r: &mut Reader<'_>) -> Result<AvbInterfaceDescriptor, PduError> {
    Ok(AvbInterfaceDescriptor {
        object_name: read_fixed_string(r)?,
        localized_description: r.read_u16()?,
        mac_address: MacAddr::new(r.read_array::<6>()?),
        interface_flags: r.read_u16()?,
        clock_identity: UniqueIdentifier::from(r.read_u64()?),
        priority1: r.read_u8()?,
        clock_class: r.read_u8()?,
        offset_scaled_log_variance: r.read_u16()?,
        clock_accuracy: r.read_u8()?,
        priority2: r.read_u8()?,
        domain_number: r.read_u8()?,
        log_sync_interval: r.read_u8()? as i8,
        log_announce_interval: r.read_u8()? as i8,
        log_pdelay_interval: r.read_u8()? as i8,
        port_number: r.read_u16()?,
    })
}

// ===========================================================================
// CLOCK_SOURCE - Clause 7.2.9 (82 bytes)
// ===========================================================================

fn write_clock_source(w: &mut Writer, d: &ClockSourceDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.clock_source_flags);
    w.write_u16(d.clock_source_type);
    w.write_u64(d.clock_source_identifier.value());
    w.write_u16(d.clock_source_location_type);
    w.write_u16(d.clock_source_location_index);
}

fn read_clock_source(r: &mut Reader<'_>) -> Result<ClockSourceDescriptor, PduError> {
    Ok(ClockSourceDescriptor {
        object_name: read_fixed_string(r)?,
        localized_description: r.read_u16()?,
        clock_source_flags: r.read_u16()?,
        clock_source_type: r.read_u16()?,
        clock_source_identifier: UniqueIdentifier::from(r.read_u64()?),
        clock_source_location_type: r.read_u16()?,
        clock_source_location_index: r.read_u16()?,
    })
}

// ===========================================================================
// MEMORY_OBJECT - Clause 7.2.10 (96 bytes)
// ===========================================================================

fn write_memory_object(w: &mut Writer, d: &MemoryObjectDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.memory_object_type);
    w.write_u16(d.target_descriptor_type);
    w.write_u16(d.target_descriptor_index);
    w.write_u64(d.start_address);
    w.write_u64(d.maximum_length);
    w.write_u64(d.length);
}

fn read_memory_object(r: &mut Reader<'_>) -> Result<MemoryObjectDescriptor, PduError> {
    Ok(MemoryObjectDescriptor {
        object_name: read_fixed_string(r)?,
        localized_description: r.read_u16()?,
        memory_object_type: r.read_u16()?,
        target_descriptor_type: r.read_u16()?,
        target_descriptor_index: r.read_u16()?,
        start_address: r.read_u64()?,
        maximum_length: r.read_u64()?,
        length: r.read_u64()?,
    })
}

// ===========================================================================
// LOCALE / STRINGS - Clause 7.2.11 / 7.2.12
// ===========================================================================

fn write_locale(w: &mut Writer, d: &LocaleDescriptor) {
    w.write_bytes(d.locale_id.as_bytes());
    w.write_u16(d.number_of_strings);
    w.write_u16(d.base_strings);
}

fn read_locale(r: &mut Reader<'_>) -> Result<LocaleDescriptor, PduError> {
    Ok(LocaleDescriptor {
        locale_id: read_fixed_string(r)?,
        number_of_strings: r.read_u16()?,
        base_strings: r.read_u16()?,
    })
}

fn write_strings(w: &mut Writer, d: &StringsDescriptor) {
    for s in &d.strings {
        w.write_bytes(s.as_bytes());
    }
}

fn read_strings(r: &mut Reader<'_>) -> Result<StringsDescriptor, PduError> {
    let mut strings = [AvdeccFixedString::new(); 7];
    for s in &mut strings {
        *s = read_fixed_string(r)?;
    }
    Ok(StringsDescriptor { strings })
}

// ===========================================================================
// STREAM_PORT / EXTERNAL_PORT / INTERNAL_PORT - Clause 7.2.13-15
// ===========================================================================

fn write_stream_port(w: &mut Writer, d: &StreamPortDescriptor) {
    w.write_u16(d.clock_domain_index);
    w.write_u16(d.port_flags);
    w.write_u16(d.number_of_controls);
    w.write_u16(d.base_control);
    w.write_u16(d.number_of_clusters);
    w.write_u16(d.base_cluster);
    w.write_u16(d.number_of_maps);
    w.write_u16(d.base_map);
}

fn read_stream_port(r: &mut Reader<'_>) -> Result<StreamPortDescriptor, PduError> {
    Ok(StreamPortDescriptor {
        clock_domain_index: r.read_u16()?,
        port_flags: r.read_u16()?,
        number_of_controls: r.read_u16()?,
        base_control: r.read_u16()?,
        number_of_clusters: r.read_u16()?,
        base_cluster: r.read_u16()?,
        number_of_maps: r.read_u16()?,
        base_map: r.read_u16()?,
    })
}

fn write_external_port(w: &mut Writer, d: &ExternalPortDescriptor) {
    w.write_u16(d.clock_domain_index);
    w.write_u16(d.port_flags);
    w.write_u16(d.number_of_controls);
    w.write_u16(d.base_control);
    w.write_u16(d.signal_type);
    w.write_u16(d.signal_index);
    w.write_u16(d.signal_output);
    w.write_u32(d.block_latency);
    w.write_u16(d.jack_index);
}

fn read_external_port(r: &mut Reader<'_>) -> Result<ExternalPortDescriptor, PduError> {
    Ok(ExternalPortDescriptor {
        clock_domain_index: r.read_u16()?,
        port_flags: r.read_u16()?,
        number_of_controls: r.read_u16()?,
        base_control: r.read_u16()?,
        signal_type: r.read_u16()?,
        signal_index: r.read_u16()?,
        signal_output: r.read_u16()?,
        block_latency: r.read_u32()?,
        jack_index: r.read_u16()?,
    })
}

fn write_internal_port(w: &mut Writer, d: &InternalPortDescriptor) {
    w.write_u16(d.clock_domain_index);
    w.write_u16(d.port_flags);
    w.write_u16(d.number_of_controls);
    w.write_u16(d.base_control);
    w.write_u16(d.signal_type);
    w.write_u16(d.signal_index);
    w.write_u16(d.signal_output);
    w.write_u32(d.block_latency);
    w.write_u16(d.internal_index);
}

fn read_internal_port(r: &mut Reader<'_>) -> Result<InternalPortDescriptor, PduError> {
    Ok(InternalPortDescriptor {
        clock_domain_index: r.read_u16()?,
        port_flags: r.read_u16()?,
        number_of_controls: r.read_u16()?,
        base_control: r.read_u16()?,
        signal_type: r.read_u16()?,
        signal_index: r.read_u16()?,
        signal_output: r.read_u16()?,
        block_latency: r.read_u32()?,
        internal_index: r.read_u16()?,
    })
}

// ===========================================================================
// AUDIO_CLUSTER / AUDIO_MAP / CLOCK_DOMAIN - Clause 7.2.16 / 7.2.19 / 7.2.32
// ===========================================================================

fn write_audio_cluster(w: &mut Writer, d: &AudioClusterDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.signal_type);
    w.write_u16(d.signal_index);
    w.write_u16(d.signal_output);
    w.write_u32(d.path_latency);
    w.write_u32(d.block_latency);
    w.write_u16(d.channel_count);
    w.write_u8(d.format);
}

fn read_audio_cluster(r: &mut Reader<'_>) -> Result<AudioClusterDescriptor, PduError> {
    Ok(AudioClusterDescriptor {
        object_name: read_fixed_string(r)?,
        localized_description: r.read_u16()?,
        signal_type: r.read_u16()?,
        signal_index: r.read_u16()?,
        signal_output: r.read_u16()?,
        path_latency: r.read_u32()?,
        block_latency: r.read_u32()?,
        channel_count: r.read_u16()?,
        format: r.read_u8()?,
    })
}

fn write_audio_map(w: &mut Writer, d: &AudioMapDescriptor) {
    w.write_u16(8); // mappings_offset from descriptor start
    w.write_u16(d.mappings.len() as u16);
    for m in &d.mappings {
        w.write_u16(m.stream_index);
        w.write_u16(m.stream_channel);
        w.write_u16(m.cluster_offset);
        w.write_u16(m.cluster_channel);
    }
}

fn read_audio_map(r: &mut Reader<'_>, body: &[u8]) -> Result<AudioMapDescriptor, PduError> {
    let offset = r.read_u16()?;
    let count = r.read_u16()?;
    let mut table = table_reader(body, offset)?;
    let mut mappings = Vec::with_capacity(usize::from(count).min(64));
    for _ in 0..count {
        mappings.push(AudioMapping {
            stream_index: table.read_u16()?,
            stream_channel: table.read_u16()?,
            cluster_offset: table.read_u16()?,
            cluster_channel: table.read_u16()?,
        });
    }
    Ok(AudioMapDescriptor { mappings })
}

fn write_clock_domain(w: &mut Writer, d: &ClockDomainDescriptor) {
    w.write_bytes(d.object_name.as_bytes());
    w.write_u16(d.localized_description);
    w.write_u16(d.clock_source_index);
    w.write_u16(76); // clock_sources_offset from descriptor start
    w.write_u16(d.clock_sources.len() as u16);
    for source in &d.clock_sources {
        w.write_u16(*source);
    }
}

fn read_clock_domain(r: &mut Reader<'_>, body: &[u8]) -> Result<ClockDomainDescriptor, PduError> {
    let object_name = read_fixed_string(r)?;
    let localized_description = r.read_u16()?;
    let clock_source_index = r.read_u16()?;
    let offset = r.read_u16()?;
    let count = r.read_u16()?;
    let mut table = table_reader(body, offset)?;
    let mut clock_sources = Vec::with_capacity(usize::from(count).min(16));
    for _ in 0..count {
        clock_sources.push(table.read_u16()?);
    }
    Ok(ClockDomainDescriptor {
        object_name,
        localized_description,
        clock_source_index,
        clock_sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(descriptor: Descriptor) {
        let payload = serialize_read_descriptor_response(0, 3, &descriptor);
        let (cfg, index, parsed) =
            deserialize_read_descriptor_response(&payload).expect("deserializes");
        assert_eq!(cfg, 0);
        assert_eq!(index, 3);
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn entity_round_trip_is_308_bytes() {
        let descriptor = EntityDescriptor {
            entity_id: UniqueIdentifier::from(0x0102_0304_0506_0708),
            entity_model_id: UniqueIdentifier::from(0x1122_3344_5566_7788),
            entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
            talker_stream_sources: 8,
            talker_capabilities: TalkerCapabilities::IMPLEMENTED,
            listener_stream_sinks: 8,
            listener_capabilities: ListenerCapabilities::IMPLEMENTED,
            controller_capabilities: ControllerCapabilities::NONE,
            available_index: 12,
            association_id: UniqueIdentifier::NULL,
            entity_name: "Stage box".into(),
            vendor_name_string: 0,
            model_name_string: 1,
            firmware_version: "1.4.2".into(),
            group_name: "FOH".into(),
            serial_number: "SN-0042".into(),
            configurations_count: 1,
            current_configuration: 0,
        };
        let payload = serialize_read_descriptor_response(0, 0, &Descriptor::Entity(descriptor.clone()));
        assert_eq!(payload.len(), 8 + 308);
        round_trip(Descriptor::Entity(descriptor));
    }

    #[test]
    fn configuration_counts_round_trip() {
        round_trip(Descriptor::Configuration(ConfigurationDescriptor {
            object_name: "Default".into(),
            localized_description: 0xFFFF,
            descriptor_counts: vec![
                DescriptorCount { descriptor_type: DescriptorType::AudioUnit as u16, count: 1 },
                DescriptorCount { descriptor_type: DescriptorType::StreamInput as u16, count: 8 },
                // A descriptor type this crate does not model must survive
                DescriptorCount { descriptor_type: 0x0003, count: 2 },
            ],
        }));
    }

    #[test]
    fn stream_descriptor_round_trip_min_size() {
        let descriptor = StreamDescriptor {
            object_name: "Input 1".into(),
            localized_description: 7,
            clock_domain_index: 0,
            stream_flags: 0x0002,
            current_format: StreamFormat(0x00A0_0203_0406_0000),
            avb_interface_index: 0,
            buffer_length: 192,
            formats: vec![StreamFormat(0x00A0_0203_0406_0000), StreamFormat(0x00A0_0203_0806_0000)],
            ..Default::default()
        };
        let payload =
            serialize_read_descriptor_response(0, 3, &Descriptor::StreamInput(descriptor.clone()));
        // 8-byte prefix + 128-byte fixed part + 2 formats
        assert_eq!(payload.len(), 8 + 128 + 16);
        round_trip(Descriptor::StreamInput(descriptor));
    }

    #[test]
    fn every_fixed_size_descriptor_round_trips() {
        round_trip(Descriptor::AudioUnit(AudioUnitDescriptor {
            object_name: "DSP".into(),
            number_of_stream_input_ports: 2,
            base_stream_input_port: 0,
            current_sampling_rate: SamplingRate(48_000),
            sampling_rates: vec![SamplingRate(44_100), SamplingRate(48_000), SamplingRate(96_000)],
            ..Default::default()
        }));
        round_trip(Descriptor::JackInput(JackDescriptor {
            object_name: "XLR 1".into(),
            jack_type: 0x0007,
            ..Default::default()
        }));
        round_trip(Descriptor::AvbInterface(AvbInterfaceDescriptor {
            object_name: "eth0".into(),
            mac_address: MacAddr::new([0, 0x1B, 0xC5, 0, 0, 9]),
            log_sync_interval: -3,
            port_number: 1,
            ..Default::default()
        }));
        round_trip(Descriptor::ClockSource(ClockSourceDescriptor {
            object_name: "Internal".into(),
            clock_source_type: 0,
            ..Default::default()
        }));
        round_trip(Descriptor::MemoryObject(MemoryObjectDescriptor {
            object_name: "Firmware".into(),
            maximum_length: 0x0010_0000,
            ..Default::default()
        }));
        round_trip(Descriptor::Locale(LocaleDescriptor {
            locale_id: "en-US".into(),
            number_of_strings: 7,
            base_strings: 0,
        }));
        round_trip(Descriptor::Strings(StringsDescriptor {
            strings: [
                "a".into(),
                "b".into(),
                "c".into(),
                "d".into(),
                "e".into(),
                "f".into(),
                "g".into(),
            ],
        }));
        round_trip(Descriptor::StreamPortInput(StreamPortDescriptor {
            number_of_clusters: 2,
            number_of_maps: 1,
            ..Default::default()
        }));
        round_trip(Descriptor::ExternalPortOutput(ExternalPortDescriptor {
            jack_index: 3,
            block_latency: 100,
            ..Default::default()
        }));
        round_trip(Descriptor::InternalPortInput(InternalPortDescriptor {
            internal_index: 4,
            ..Default::default()
        }));
        round_trip(Descriptor::AudioCluster(AudioClusterDescriptor {
            object_name: "Ch 1-2".into(),
            channel_count: 2,
            format: 0x40,
            ..Default::default()
        }));
        round_trip(Descriptor::AudioMap(AudioMapDescriptor {
            mappings: vec![AudioMapping {
                stream_index: 0,
                stream_channel: 1,
                cluster_offset: 0,
                cluster_channel: 1,
            }],
        }));
        round_trip(Descriptor::ClockDomain(ClockDomainDescriptor {
            object_name: "Domain 0".into(),
            clock_source_index: 0,
            clock_sources: vec![0, 1],
            ..Default::default()
        }));
    }

    #[test]
    fn unknown_descriptor_type_rejected() {
        let mut payload = serialize_read_descriptor_response(
            0,
            0,
            &Descriptor::Locale(LocaleDescriptor::default()),
        );
        payload[4..6].copy_from_slice(&0x0016u16.to_be_bytes()); // SENSOR_CLUSTER
        assert!(matches!(
            deserialize_read_descriptor_response(&payload),
            Err(PduError::InvalidDescriptorType)
        ));
    }

    #[test]
    fn truncated_entity_is_incorrect_size() {
        let payload = serialize_read_descriptor_response(
            0,
            0,
            &Descriptor::Entity(EntityDescriptor::default()),
        );
        assert!(matches!(
            deserialize_read_descriptor_response(&payload[..payload.len() - 4]),
            Err(PduError::IncorrectPayloadSize)
        ));
    }
}
