// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Controller facade.
//!
//! [`ControllerEntity`] is the public surface: one typed method per AVDECC
//! operation. Every method serializes its arguments, records the command in
//! the in-flight table and returns immediately; the result handler fires
//! later on the transport receive thread (or the scanner thread, for
//! timeouts) - exactly once per accepted command.
//!
//! ```rust,no_run
//! # use avdecc::controller::{ControllerConfig, ControllerEntity};
//! # use avdecc::model::{DescriptorType, UniqueIdentifier};
//! # use avdecc::transport::VirtualBus;
//! let bus = VirtualBus::new();
//! let interface = bus.attach([0x02, 0, 0, 0, 0, 0x01].into());
//! let controller = ControllerEntity::new(
//!     interface,
//!     UniqueIdentifier::from(0x0102_0304_0506_0708),
//!     ControllerConfig::default(),
//! );
//! controller.read_stream_input_descriptor(
//!     UniqueIdentifier::from(0x1122_3344_5566_7788),
//!     0,
//!     3,
//!     Box::new(|entity, status, descriptor| {
//!         println!("{entity}: {status:?} {:?}", descriptor.object_name);
//!     }),
//! );
//! ```

pub mod delegate;
pub mod handlers;
pub mod status;

#[cfg(test)]
mod tests;

pub use delegate::ControllerDelegate;
pub use status::{AaCommandStatus, AemCommandStatus, ControlStatus, MvuCommandStatus};

use crate::config::ProtocolTolerance;
use crate::model::{
    AudioMapping, AvbInterfaceIndex, AvdeccFixedString, ClockSourceIndex, ConfigurationIndex,
    DescriptorIndex, DescriptorType, Entity, OperationId, SamplingRate, StreamFormat,
    StreamIdentification, StreamInfo, UniqueIdentifier,
};
use crate::protocol::aecpdu::{AaTlv, AemCommandType, MvuCommandType};
use crate::protocol::{aem_payloads, mvu_payloads, AcmpMessageType};
use crate::protocol::aem_payloads::{acquire_flags, lock_flags};
use crate::state::engine::{Engine, TimeoutScanner};
use crate::state::DiscoveryLoop;
use crate::transport::ProtocolInterface;
use handlers::*;
use std::sync::Arc;

/// Boot-time controller configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    pub tolerance: ProtocolTolerance,
    /// Skip spawning the periodic DISCOVER broadcaster (the targeted
    /// `discover_remote_entity` still works). Useful for passive tooling.
    pub disable_discovery_loop: bool,
}

/// The controller capability: discovers, enumerates and controls remote
/// entities.
///
/// Dropping it stops the discovery and scanner threads and shuts the
/// transport interface down.
pub struct ControllerEntity {
    engine: Arc<Engine>,
    _scanner: TimeoutScanner,
    _discovery: Option<DiscoveryLoop>,
}

impl ControllerEntity {
    /// Bind a controller EID to a transport interface and start the engine
    /// threads.
    pub fn new(
        interface: Arc<dyn ProtocolInterface>,
        controller_id: UniqueIdentifier,
        config: ControllerConfig,
    ) -> Arc<Self> {
        let engine = Engine::new(Arc::clone(&interface), controller_id, config.tolerance);
        interface.set_observer(engine.clone());

        let scanner = TimeoutScanner::spawn(&engine);
        let discovery =
            (!config.disable_discovery_loop).then(|| DiscoveryLoop::spawn(interface));

        Arc::new(Self { engine, _scanner: scanner, _discovery: discovery })
    }

    pub fn controller_id(&self) -> UniqueIdentifier {
        self.engine.controller_id()
    }

    /// Install (or clear) the push-notification delegate.
    pub fn set_delegate(&self, delegate: Option<Arc<dyn ControllerDelegate>>) {
        self.engine.set_delegate(delegate);
    }

    /// Engine counters for diagnostics.
    pub fn metrics(&self) -> &crate::state::EngineMetrics {
        &self.engine.metrics
    }

    /// Last-known advertisement for a discovered entity.
    pub fn discovered_entity(&self, entity_id: UniqueIdentifier) -> Option<Entity> {
        self.engine.registry.get(entity_id)
    }

    /* ********************************************************************** */
    /* Discovery Protocol (ADP)                                               */
    /* ********************************************************************** */

    /// Broadcast a global ENTITY_DISCOVER now (the background loop already
    /// does this every 10 s).
    pub fn discover_remote_entities(&self) -> crate::Result<()> {
        self.engine.discover_remote_entity(UniqueIdentifier::NULL)
    }

    /// Ask one entity to re-advertise.
    pub fn discover_remote_entity(&self, entity_id: UniqueIdentifier) -> crate::Result<()> {
        self.engine.discover_remote_entity(entity_id)
    }

    /* ********************************************************************** */
    /* Enumeration and Control Protocol (AECP) AEM                            */
    /* ********************************************************************** */

    /// ACQUIRE_ENTITY. `persistent` survives controller restarts on entities
    /// that support it.
    pub fn acquire_entity(
        &self,
        target: UniqueIdentifier,
        persistent: bool,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: AcquireEntityHandler,
    ) {
        let flags = if persistent { acquire_flags::PERSISTENT } else { 0 };
        self.engine.send_aem_command(
            target,
            AemCommandType::ACQUIRE_ENTITY,
            aem_payloads::serialize_acquire_entity(
                flags,
                UniqueIdentifier::NULL,
                descriptor_type,
                descriptor_index,
            ),
            AemHandler::AcquireEntity(handler),
        );
    }

    /// ACQUIRE_ENTITY with the RELEASE flag.
    pub fn release_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: AcquireEntityHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::ACQUIRE_ENTITY,
            aem_payloads::serialize_acquire_entity(
                acquire_flags::RELEASE,
                UniqueIdentifier::NULL,
                descriptor_type,
                descriptor_index,
            ),
            AemHandler::ReleaseEntity(handler),
        );
    }

    pub fn lock_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: AcquireEntityHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::LOCK_ENTITY,
            aem_payloads::serialize_lock_entity(
                0,
                UniqueIdentifier::NULL,
                descriptor_type,
                descriptor_index,
            ),
            AemHandler::LockEntity(handler),
        );
    }

    pub fn unlock_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: AcquireEntityHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::LOCK_ENTITY,
            aem_payloads::serialize_lock_entity(
                lock_flags::UNLOCK,
                UniqueIdentifier::NULL,
                descriptor_type,
                descriptor_index,
            ),
            AemHandler::UnlockEntity(handler),
        );
    }

    pub fn query_entity_available(&self, target: UniqueIdentifier, handler: StatusOnlyHandler) {
        self.engine.send_aem_command(
            target,
            AemCommandType::ENTITY_AVAILABLE,
            Vec::new(),
            AemHandler::QueryEntityAvailable(handler),
        );
    }

    pub fn query_controller_available(&self, target: UniqueIdentifier, handler: StatusOnlyHandler) {
        self.engine.send_aem_command(
            target,
            AemCommandType::CONTROLLER_AVAILABLE,
            Vec::new(),
            AemHandler::QueryControllerAvailable(handler),
        );
    }

    /// Subscribe to the target's unsolicited notifications (delivered through
    /// the delegate).
    pub fn register_unsolicited_notifications(
        &self,
        target: UniqueIdentifier,
        handler: StatusOnlyHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION,
            Vec::new(),
            AemHandler::RegisterUnsolicitedNotifications(handler),
        );
    }

    pub fn unregister_unsolicited_notifications(
        &self,
        target: UniqueIdentifier,
        handler: StatusOnlyHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::DEREGISTER_UNSOLICITED_NOTIFICATION,
            Vec::new(),
            AemHandler::DeregisterUnsolicitedNotifications(handler),
        );
    }

    fn read_descriptor(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: DescriptorHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::READ_DESCRIPTOR,
            aem_payloads::serialize_read_descriptor(
                configuration_index,
                descriptor_type,
                descriptor_index,
            ),
            AemHandler::ReadDescriptor(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP AEM - configuration and naming                                    */
    /* ********************************************************************** */

    pub fn set_configuration(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        handler: ConfigurationHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_CONFIGURATION,
            aem_payloads::serialize_set_configuration(configuration_index),
            AemHandler::SetConfiguration(handler),
        );
    }

    pub fn get_configuration(&self, target: UniqueIdentifier, handler: ConfigurationHandler) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_CONFIGURATION,
            Vec::new(),
            AemHandler::GetConfiguration(handler),
        );
    }

    pub fn set_entity_name(
        &self,
        target: UniqueIdentifier,
        name: AvdeccFixedString,
        handler: StatusOnlyHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_NAME,
            aem_payloads::serialize_set_name(DescriptorType::Entity, 0, 0, 0, &name),
            AemHandler::SetEntityName(handler),
        );
    }

    pub fn get_entity_name(&self, target: UniqueIdentifier, handler: NameHandler) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_NAME,
            aem_payloads::serialize_get_name(DescriptorType::Entity, 0, 0, 0),
            AemHandler::GetEntityName(handler),
        );
    }

    pub fn set_entity_group_name(
        &self,
        target: UniqueIdentifier,
        name: AvdeccFixedString,
        handler: StatusOnlyHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_NAME,
            aem_payloads::serialize_set_name(DescriptorType::Entity, 0, 1, 0, &name),
            AemHandler::SetEntityGroupName(handler),
        );
    }

    pub fn get_entity_group_name(&self, target: UniqueIdentifier, handler: NameHandler) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_NAME,
            aem_payloads::serialize_get_name(DescriptorType::Entity, 0, 1, 0),
            AemHandler::GetEntityGroupName(handler),
        );
    }

    pub fn set_configuration_name(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        name: AvdeccFixedString,
        handler: ConfigurationHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_NAME,
            aem_payloads::serialize_set_name(
                DescriptorType::Configuration,
                configuration_index,
                0,
                0,
                &name,
            ),
            AemHandler::SetConfigurationName(handler),
        );
    }

    pub fn get_configuration_name(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        handler: ConfigurationNameHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_NAME,
            aem_payloads::serialize_get_name(DescriptorType::Configuration, configuration_index, 0, 0),
            AemHandler::GetConfigurationName(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP AEM - streams                                                     */
    /* ********************************************************************** */

    pub fn set_stream_input_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        format: StreamFormat,
        handler: StreamFormatHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_STREAM_FORMAT,
            aem_payloads::serialize_set_stream_format(
                DescriptorType::StreamInput,
                stream_index,
                format,
            ),
            AemHandler::SetStreamInputFormat(handler),
        );
    }

    pub fn set_stream_output_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        format: StreamFormat,
        handler: StreamFormatHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_STREAM_FORMAT,
            aem_payloads::serialize_set_stream_format(
                DescriptorType::StreamOutput,
                stream_index,
                format,
            ),
            AemHandler::SetStreamOutputFormat(handler),
        );
    }

    pub fn get_stream_input_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamFormatHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_STREAM_FORMAT,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamInput, stream_index),
            AemHandler::GetStreamInputFormat(handler),
        );
    }

    pub fn get_stream_output_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamFormatHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_STREAM_FORMAT,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamOutput, stream_index),
            AemHandler::GetStreamOutputFormat(handler),
        );
    }

    pub fn set_stream_input_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        info: &StreamInfo,
        handler: StreamInfoHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_STREAM_INFO,
            aem_payloads::serialize_stream_info(DescriptorType::StreamInput, stream_index, info),
            AemHandler::SetStreamInputInfo(handler),
        );
    }

    pub fn set_stream_output_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        info: &StreamInfo,
        handler: StreamInfoHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_STREAM_INFO,
            aem_payloads::serialize_stream_info(DescriptorType::StreamOutput, stream_index, info),
            AemHandler::SetStreamOutputInfo(handler),
        );
    }

    pub fn get_stream_input_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamInfoHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_STREAM_INFO,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamInput, stream_index),
            AemHandler::GetStreamInputInfo(handler),
        );
    }

    pub fn get_stream_output_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamInfoHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_STREAM_INFO,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamOutput, stream_index),
            AemHandler::GetStreamOutputInfo(handler),
        );
    }

    pub fn start_stream_input(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamStateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::START_STREAMING,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamInput, stream_index),
            AemHandler::StartStreamInput(handler),
        );
    }

    pub fn start_stream_output(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamStateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::START_STREAMING,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamOutput, stream_index),
            AemHandler::StartStreamOutput(handler),
        );
    }

    pub fn stop_stream_input(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamStateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::STOP_STREAMING,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamInput, stream_index),
            AemHandler::StopStreamInput(handler),
        );
    }

    pub fn stop_stream_output(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: StreamStateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::STOP_STREAMING,
            aem_payloads::serialize_desc_ref(DescriptorType::StreamOutput, stream_index),
            AemHandler::StopStreamOutput(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP AEM - sampling, clocking, AVB state                               */
    /* ********************************************************************** */

    pub fn set_sampling_rate(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        rate: SamplingRate,
        handler: SamplingRateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_SAMPLING_RATE,
            aem_payloads::serialize_set_sampling_rate(descriptor_type, descriptor_index, rate),
            AemHandler::SetSamplingRate(handler),
        );
    }

    pub fn get_sampling_rate(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: SamplingRateHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_SAMPLING_RATE,
            aem_payloads::serialize_desc_ref(descriptor_type, descriptor_index),
            AemHandler::GetSamplingRate(handler),
        );
    }

    pub fn set_clock_source(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        clock_source_index: ClockSourceIndex,
        handler: ClockSourceHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_CLOCK_SOURCE,
            aem_payloads::serialize_set_clock_source(
                descriptor_type,
                descriptor_index,
                clock_source_index,
            ),
            AemHandler::SetClockSource(handler),
        );
    }

    pub fn get_clock_source(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: ClockSourceHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_CLOCK_SOURCE,
            aem_payloads::serialize_desc_ref(descriptor_type, descriptor_index),
            AemHandler::GetClockSource(handler),
        );
    }

    pub fn get_avb_info(
        &self,
        target: UniqueIdentifier,
        avb_interface_index: AvbInterfaceIndex,
        handler: AvbInfoHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_AVB_INFO,
            aem_payloads::serialize_desc_ref(DescriptorType::AvbInterface, avb_interface_index),
            AemHandler::GetAvbInfo(handler),
        );
    }

    pub fn get_as_path(
        &self,
        target: UniqueIdentifier,
        avb_interface_index: AvbInterfaceIndex,
        handler: AsPathHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_AS_PATH,
            aem_payloads::serialize_get_as_path(avb_interface_index),
            AemHandler::GetAsPath(handler),
        );
    }

    pub fn get_counters(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: CountersHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_COUNTERS,
            aem_payloads::serialize_desc_ref(descriptor_type, descriptor_index),
            AemHandler::GetCounters(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP AEM - audio maps                                                  */
    /* ********************************************************************** */

    pub fn get_stream_input_audio_map(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        map_index: u16,
        handler: AudioMapHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_AUDIO_MAP,
            aem_payloads::serialize_get_audio_map(
                DescriptorType::StreamPortInput,
                stream_port_index,
                map_index,
            ),
            AemHandler::GetStreamInputAudioMap(handler),
        );
    }

    pub fn get_stream_output_audio_map(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        map_index: u16,
        handler: AudioMapHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_AUDIO_MAP,
            aem_payloads::serialize_get_audio_map(
                DescriptorType::StreamPortOutput,
                stream_port_index,
                map_index,
            ),
            AemHandler::GetStreamOutputAudioMap(handler),
        );
    }

    pub fn add_stream_input_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: AudioMappingsHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::ADD_AUDIO_MAPPINGS,
            aem_payloads::serialize_audio_mappings(
                DescriptorType::StreamPortInput,
                stream_port_index,
                mappings,
            ),
            AemHandler::AddStreamInputAudioMappings(handler),
        );
    }

    pub fn add_stream_output_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: AudioMappingsHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::ADD_AUDIO_MAPPINGS,
            aem_payloads::serialize_audio_mappings(
                DescriptorType::StreamPortOutput,
                stream_port_index,
                mappings,
            ),
            AemHandler::AddStreamOutputAudioMappings(handler),
        );
    }

    pub fn remove_stream_input_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: AudioMappingsHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::REMOVE_AUDIO_MAPPINGS,
            aem_payloads::serialize_audio_mappings(
                DescriptorType::StreamPortInput,
                stream_port_index,
                mappings,
            ),
            AemHandler::RemoveStreamInputAudioMappings(handler),
        );
    }

    pub fn remove_stream_output_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: AudioMappingsHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::REMOVE_AUDIO_MAPPINGS,
            aem_payloads::serialize_audio_mappings(
                DescriptorType::StreamPortOutput,
                stream_port_index,
                mappings,
            ),
            AemHandler::RemoveStreamOutputAudioMappings(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP AEM - operations and memory objects                               */
    /* ********************************************************************** */

    pub fn start_operation(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        operation_id: OperationId,
        operation_type: u16,
        buffer: &[u8],
        handler: StartOperationHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::START_OPERATION,
            aem_payloads::serialize_start_operation(
                descriptor_type,
                descriptor_index,
                operation_id,
                operation_type,
                buffer,
            ),
            AemHandler::StartOperation(handler),
        );
    }

    pub fn abort_operation(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        operation_id: OperationId,
        handler: AbortOperationHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::ABORT_OPERATION,
            aem_payloads::serialize_abort_operation(descriptor_type, descriptor_index, operation_id),
            AemHandler::AbortOperation(handler),
        );
    }

    pub fn set_memory_object_length(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        memory_object_index: DescriptorIndex,
        length: u64,
        handler: MemoryObjectLengthHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::SET_MEMORY_OBJECT_LENGTH,
            aem_payloads::serialize_set_memory_object_length(
                configuration_index,
                memory_object_index,
                length,
            ),
            AemHandler::SetMemoryObjectLength(handler),
        );
    }

    pub fn get_memory_object_length(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        memory_object_index: DescriptorIndex,
        handler: MemoryObjectLengthHandler,
    ) {
        self.engine.send_aem_command(
            target,
            AemCommandType::GET_MEMORY_OBJECT_LENGTH,
            aem_payloads::serialize_get_memory_object_length(
                configuration_index,
                memory_object_index,
            ),
            AemHandler::GetMemoryObjectLength(handler),
        );
    }

    /* ********************************************************************** */
    /* AECP Address Access / Milan Vendor Unique                              */
    /* ********************************************************************** */

    /// Raw address-space access (firmware upload, vendor memory maps).
    pub fn address_access(
        &self,
        target: UniqueIdentifier,
        tlvs: Vec<AaTlv>,
        handler: AddressAccessHandler,
    ) {
        self.engine.send_aa_command(target, tlvs, handler);
    }

    /// Milan GET_MILAN_INFO.
    pub fn get_milan_info(&self, target: UniqueIdentifier, handler: MilanInfoHandler) {
        self.engine.send_mvu_command(
            target,
            MvuCommandType::GET_MILAN_INFO,
            mvu_payloads::serialize_get_milan_info(0),
            handler,
        );
    }

    /* ********************************************************************** */
    /* Connection Management Protocol (ACMP)                                  */
    /* ********************************************************************** */

    /// CONNECT_RX: ask the listener to connect to the talker's stream.
    pub fn connect_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::ConnectRxCommand,
            talker.entity_id,
            talker.stream_index,
            listener.entity_id,
            listener.stream_index,
            0,
            handler,
        );
    }

    /// DISCONNECT_RX: ask the listener to drop the connection.
    pub fn disconnect_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::DisconnectRxCommand,
            talker.entity_id,
            talker.stream_index,
            listener.entity_id,
            listener.stream_index,
            0,
            handler,
        );
    }

    /// DISCONNECT_TX: tear the talker side down directly (recovery path when
    /// the listener is gone).
    pub fn disconnect_talker_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::DisconnectTxCommand,
            talker.entity_id,
            talker.stream_index,
            listener.entity_id,
            listener.stream_index,
            0,
            handler,
        );
    }

    /// GET_TX_STATE: query the talker's stream state.
    pub fn get_talker_stream_state(
        &self,
        talker: StreamIdentification,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::GetTxStateCommand,
            talker.entity_id,
            talker.stream_index,
            UniqueIdentifier::NULL,
            0,
            0,
            handler,
        );
    }

    /// GET_RX_STATE: query the listener's sink state.
    pub fn get_listener_stream_state(
        &self,
        listener: StreamIdentification,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::GetRxStateCommand,
            UniqueIdentifier::NULL,
            0,
            listener.entity_id,
            listener.stream_index,
            0,
            handler,
        );
    }

    /// GET_TX_CONNECTION: enumerate one of the talker's connections by index.
    pub fn get_talker_stream_connection(
        &self,
        talker: StreamIdentification,
        connection_index: u16,
        handler: AcmpResponseHandler,
    ) {
        self.engine.send_acmp_command(
            AcmpMessageType::GetTxConnectionCommand,
            talker.entity_id,
            talker.stream_index,
            UniqueIdentifier::NULL,
            0,
            connection_index,
            handler,
        );
    }
}

/// Generate the remaining `read_*_descriptor` facade methods; they differ
/// only in descriptor type and handler variant.
macro_rules! impl_read_descriptor {
    ($( $(#[$doc:meta])* $fn_name:ident => ($descriptor_type:ident, $variant:ident, $body:ty) ),+ $(,)?) => {
        impl ControllerEntity {
            $(
                $(#[$doc])*
                pub fn $fn_name(
                    &self,
                    target: UniqueIdentifier,
                    configuration_index: ConfigurationIndex,
                    descriptor_index: DescriptorIndex,
                    handler: Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, $body) + Send + Sync>,
                ) {
                    self.read_descriptor(
                        target,
                        configuration_index,
                        DescriptorType::$descriptor_type,
                        descriptor_index,
                        DescriptorHandler::$variant(handler),
                    );
                }
            )+
        }
    };
}

impl_read_descriptor! {
    /// READ_DESCRIPTOR for the ENTITY descriptor (index is always 0).
    read_entity_descriptor => (Entity, Entity, crate::model::EntityDescriptor),
    read_configuration_descriptor => (Configuration, Configuration, crate::model::ConfigurationDescriptor),
    read_audio_unit_descriptor => (AudioUnit, AudioUnit, crate::model::AudioUnitDescriptor),
    read_stream_input_descriptor => (StreamInput, StreamInput, crate::model::StreamDescriptor),
    read_stream_output_descriptor => (StreamOutput, StreamOutput, crate::model::StreamDescriptor),
    read_jack_input_descriptor => (JackInput, JackInput, crate::model::JackDescriptor),
    read_jack_output_descriptor => (JackOutput, JackOutput, crate::model::JackDescriptor),
    read_avb_interface_descriptor => (AvbInterface, AvbInterface, crate::model::AvbInterfaceDescriptor),
    read_clock_source_descriptor => (ClockSource, ClockSource, crate::model::ClockSourceDescriptor),
    read_memory_object_descriptor => (MemoryObject, MemoryObject, crate::model::MemoryObjectDescriptor),
    read_locale_descriptor => (Locale, Locale, crate::model::LocaleDescriptor),
    read_strings_descriptor => (Strings, Strings, crate::model::StringsDescriptor),
    read_stream_port_input_descriptor => (StreamPortInput, StreamPortInput, crate::model::StreamPortDescriptor),
    read_stream_port_output_descriptor => (StreamPortOutput, StreamPortOutput, crate::model::StreamPortDescriptor),
    read_external_port_input_descriptor => (ExternalPortInput, ExternalPortInput, crate::model::ExternalPortDescriptor),
    read_external_port_output_descriptor => (ExternalPortOutput, ExternalPortOutput, crate::model::ExternalPortDescriptor),
    read_internal_port_input_descriptor => (InternalPortInput, InternalPortInput, crate::model::InternalPortDescriptor),
    read_internal_port_output_descriptor => (InternalPortOutput, InternalPortOutput, crate::model::InternalPortDescriptor),
    read_audio_cluster_descriptor => (AudioCluster, AudioCluster, crate::model::AudioClusterDescriptor),
    read_audio_map_descriptor => (AudioMap, AudioMap, crate::model::AudioMapDescriptor),
    read_clock_domain_descriptor => (ClockDomain, ClockDomain, crate::model::ClockDomainDescriptor),
}

impl Drop for ControllerEntity {
    fn drop(&mut self) {
        self.engine.interface().shutdown();
    }
}
