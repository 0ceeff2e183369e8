// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor bodies returned by READ_DESCRIPTOR (IEEE 1722.1-2013 Clause 7.2).
//!
//! STREAM_INPUT/STREAM_OUTPUT, JACK_*, STREAM_PORT_* and the port descriptors
//! share a body layout, so input/output pairs share a struct here.

use super::{
    AudioMapping, AvbInterfaceIndex, AvdeccFixedString, ClockSourceIndex, ConfigurationIndex,
    ControllerCapabilities, DescriptorIndex, EntityCapabilities, ListenerCapabilities, MacAddr,
    SamplingRate, StreamFormat, TalkerCapabilities, UniqueIdentifier,
};

/// ENTITY descriptor (Clause 7.2.1). Fixed 308-byte body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityDescriptor {
    pub entity_id: UniqueIdentifier,
    pub entity_model_id: UniqueIdentifier,
    pub entity_capabilities: EntityCapabilities,
    pub talker_stream_sources: u16,
    pub talker_capabilities: TalkerCapabilities,
    pub listener_stream_sinks: u16,
    pub listener_capabilities: ListenerCapabilities,
    pub controller_capabilities: ControllerCapabilities,
    pub available_index: u32,
    pub association_id: UniqueIdentifier,
    pub entity_name: AvdeccFixedString,
    pub vendor_name_string: u16,
    pub model_name_string: u16,
    pub firmware_version: AvdeccFixedString,
    pub group_name: AvdeccFixedString,
    pub serial_number: AvdeccFixedString,
    pub configurations_count: u16,
    pub current_configuration: ConfigurationIndex,
}

/// One entry of a CONFIGURATION descriptor's counts table. The type is kept
/// raw so counts for descriptor types this crate does not model survive a
/// round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorCount {
    pub descriptor_type: u16,
    pub count: u16,
}

/// CONFIGURATION descriptor (Clause 7.2.2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub descriptor_counts: Vec<DescriptorCount>,
}

/// AUDIO_UNIT descriptor (Clause 7.2.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioUnitDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub clock_domain_index: DescriptorIndex,
    pub number_of_stream_input_ports: u16,
    pub base_stream_input_port: u16,
    pub number_of_stream_output_ports: u16,
    pub base_stream_output_port: u16,
    pub number_of_external_input_ports: u16,
    pub base_external_input_port: u16,
    pub number_of_external_output_ports: u16,
    pub base_external_output_port: u16,
    pub number_of_internal_input_ports: u16,
    pub base_internal_input_port: u16,
    pub number_of_internal_output_ports: u16,
    pub base_internal_output_port: u16,
    pub number_of_controls: u16,
    pub base_control: u16,
    pub number_of_signal_selectors: u16,
    pub base_signal_selector: u16,
    pub number_of_mixers: u16,
    pub base_mixer: u16,
    pub number_of_matrices: u16,
    pub base_matrix: u16,
    pub number_of_splitters: u16,
    pub base_splitter: u16,
    pub number_of_combiners: u16,
    pub base_combiner: u16,
    pub number_of_demultiplexers: u16,
    pub base_demultiplexer: u16,
    pub number_of_multiplexers: u16,
    pub base_multiplexer: u16,
    pub number_of_transcoders: u16,
    pub base_transcoder: u16,
    pub number_of_control_blocks: u16,
    pub base_control_block: u16,
    pub current_sampling_rate: SamplingRate,
    pub sampling_rates: Vec<SamplingRate>,
}

/// STREAM_INPUT / STREAM_OUTPUT descriptor (Clause 7.2.6). Fixed part is
/// 128 bytes, followed by the supported-formats table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub clock_domain_index: DescriptorIndex,
    pub stream_flags: u16,
    pub current_format: StreamFormat,
    pub backup_talker_entity_id_0: UniqueIdentifier,
    pub backup_talker_unique_id_0: u16,
    pub backup_talker_entity_id_1: UniqueIdentifier,
    pub backup_talker_unique_id_1: u16,
    pub backup_talker_entity_id_2: UniqueIdentifier,
    pub backup_talker_unique_id_2: u16,
    pub backedup_talker_entity_id: UniqueIdentifier,
    pub backedup_talker_unique_id: u16,
    pub avb_interface_index: AvbInterfaceIndex,
    pub buffer_length: u32,
    pub formats: Vec<StreamFormat>,
}

/// JACK_INPUT / JACK_OUTPUT descriptor (Clause 7.2.7).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JackDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub jack_flags: u16,
    pub jack_type: u16,
    pub number_of_controls: u16,
    pub base_control: u16,
}

/// AVB_INTERFACE descriptor (Clause 7.2.8).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvbInterfaceDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub mac_address: MacAddr,
    pub interface_flags: u16,
    pub clock_identity: UniqueIdentifier,
    pub priority1: u8,
    pub clock_class: u8,
    pub offset_scaled_log_variance: u16,
    pub clock_accuracy: u8,
    pub priority2: u8,
    pub domain_number: u8,
    pub log_sync_interval: i8,
    pub log_announce_interval: i8,
    pub log_pdelay_interval: i8,
    pub port_number: u16,
}

/// CLOCK_SOURCE descriptor (Clause 7.2.9).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockSourceDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub clock_source_flags: u16,
    pub clock_source_type: u16,
    pub clock_source_identifier: UniqueIdentifier,
    pub clock_source_location_type: u16,
    pub clock_source_location_index: DescriptorIndex,
}

/// MEMORY_OBJECT descriptor (Clause 7.2.10).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryObjectDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub memory_object_type: u16,
    pub target_descriptor_type: u16,
    pub target_descriptor_index: DescriptorIndex,
    pub start_address: u64,
    pub maximum_length: u64,
    pub length: u64,
}

/// LOCALE descriptor (Clause 7.2.11). Fixed 68-byte body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocaleDescriptor {
    pub locale_id: AvdeccFixedString,
    pub number_of_strings: u16,
    pub base_strings: DescriptorIndex,
}

/// STRINGS descriptor (Clause 7.2.12). Seven localized strings, 448 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringsDescriptor {
    pub strings: [AvdeccFixedString; 7],
}

/// STREAM_PORT_INPUT / STREAM_PORT_OUTPUT descriptor (Clause 7.2.13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamPortDescriptor {
    pub clock_domain_index: DescriptorIndex,
    pub port_flags: u16,
    pub number_of_controls: u16,
    pub base_control: u16,
    pub number_of_clusters: u16,
    pub base_cluster: u16,
    pub number_of_maps: u16,
    pub base_map: u16,
}

/// EXTERNAL_PORT_INPUT / EXTERNAL_PORT_OUTPUT descriptor (Clause 7.2.14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExternalPortDescriptor {
    pub clock_domain_index: DescriptorIndex,
    pub port_flags: u16,
    pub number_of_controls: u16,
    pub base_control: u16,
    pub signal_type: u16,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub block_latency: u32,
    pub jack_index: DescriptorIndex,
}

/// INTERNAL_PORT_INPUT / INTERNAL_PORT_OUTPUT descriptor (Clause 7.2.15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InternalPortDescriptor {
    pub clock_domain_index: DescriptorIndex,
    pub port_flags: u16,
    pub number_of_controls: u16,
    pub base_control: u16,
    pub signal_type: u16,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub block_latency: u32,
    pub internal_index: DescriptorIndex,
}

/// AUDIO_CLUSTER descriptor (Clause 7.2.16).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioClusterDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub signal_type: u16,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub path_latency: u32,
    pub block_latency: u32,
    pub channel_count: u16,
    pub format: u8,
}

/// AUDIO_MAP descriptor (Clause 7.2.19).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioMapDescriptor {
    pub mappings: Vec<AudioMapping>,
}

/// CLOCK_DOMAIN descriptor (Clause 7.2.32).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockDomainDescriptor {
    pub object_name: AvdeccFixedString,
    pub localized_description: u16,
    pub clock_source_index: ClockSourceIndex,
    pub clock_sources: Vec<ClockSourceIndex>,
}

/// A decoded READ_DESCRIPTOR body, tagged by descriptor type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Entity(EntityDescriptor),
    Configuration(ConfigurationDescriptor),
    AudioUnit(AudioUnitDescriptor),
    StreamInput(StreamDescriptor),
    StreamOutput(StreamDescriptor),
    JackInput(JackDescriptor),
    JackOutput(JackDescriptor),
    AvbInterface(AvbInterfaceDescriptor),
    ClockSource(ClockSourceDescriptor),
    MemoryObject(MemoryObjectDescriptor),
    Locale(LocaleDescriptor),
    Strings(StringsDescriptor),
    StreamPortInput(StreamPortDescriptor),
    StreamPortOutput(StreamPortDescriptor),
    ExternalPortInput(ExternalPortDescriptor),
    ExternalPortOutput(ExternalPortDescriptor),
    InternalPortInput(InternalPortDescriptor),
    InternalPortOutput(InternalPortDescriptor),
    AudioCluster(AudioClusterDescriptor),
    AudioMap(AudioMapDescriptor),
    ClockDomain(ClockDomainDescriptor),
}

impl Descriptor {
    /// The wire descriptor type this body belongs to.
    #[must_use]
    pub fn descriptor_type(&self) -> super::DescriptorType {
        use super::DescriptorType as DT;
        match self {
            Descriptor::Entity(_) => DT::Entity,
            Descriptor::Configuration(_) => DT::Configuration,
            Descriptor::AudioUnit(_) => DT::AudioUnit,
            Descriptor::StreamInput(_) => DT::StreamInput,
            Descriptor::StreamOutput(_) => DT::StreamOutput,
            Descriptor::JackInput(_) => DT::JackInput,
            Descriptor::JackOutput(_) => DT::JackOutput,
            Descriptor::AvbInterface(_) => DT::AvbInterface,
            Descriptor::ClockSource(_) => DT::ClockSource,
            Descriptor::MemoryObject(_) => DT::MemoryObject,
            Descriptor::Locale(_) => DT::Locale,
            Descriptor::Strings(_) => DT::Strings,
            Descriptor::StreamPortInput(_) => DT::StreamPortInput,
            Descriptor::StreamPortOutput(_) => DT::StreamPortOutput,
            Descriptor::ExternalPortInput(_) => DT::ExternalPortInput,
            Descriptor::ExternalPortOutput(_) => DT::ExternalPortOutput,
            Descriptor::InternalPortInput(_) => DT::InternalPortInput,
            Descriptor::InternalPortOutput(_) => DT::InternalPortOutput,
            Descriptor::AudioCluster(_) => DT::AudioCluster,
            Descriptor::AudioMap(_) => DT::AudioMap,
            Descriptor::ClockDomain(_) => DT::ClockDomain,
        }
    }
}
