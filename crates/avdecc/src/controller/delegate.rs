// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Push-notification observer for controller applications.
//!
//! All methods have empty default bodies so applications implement only what
//! they care about. Calls arrive on the transport receive thread while the
//! engine holds a read lock on the delegate slot; do not block, and never
//! call back into `set_delegate` from inside a notification.

use super::status::ControlStatus;
use crate::model::{
    AudioMapping, AvdeccFixedString, ClockSourceIndex, ConfigurationIndex, ConnectionFlags,
    DescriptorIndex, DescriptorType, Entity, EntityCounters, MapIndex, OperationId, SamplingRate,
    StreamFormat, StreamIndex, StreamInfo, UniqueIdentifier,
};
use crate::protocol::{Acmpdu, Aecpdu};

/// Observer for discovery events, unsolicited notifications and sniffed ACMP
/// traffic.
#[allow(unused_variables)]
pub trait ControllerDelegate: Send + Sync {
    /* **** Global notifications **** */

    /// The transport failed irrecoverably.
    fn on_transport_error(&self) {}

    /* **** Discovery notifications **** */

    fn on_entity_online(&self, entity_id: UniqueIdentifier, entity: &Entity) {}
    fn on_entity_offline(&self, entity_id: UniqueIdentifier) {}
    /// Mutable ADP fields (gPTP grandmaster, capabilities, association id, a
    /// new interface) changed for a known entity.
    fn on_entity_updated(&self, entity_id: UniqueIdentifier, entity: &Entity) {}

    /* **** Unsolicited AEM notifications **** */

    fn on_entity_acquired(
        &self,
        entity_id: UniqueIdentifier,
        owner: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
    }
    fn on_entity_released(
        &self,
        entity_id: UniqueIdentifier,
        owner: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
    }
    fn on_entity_locked(
        &self,
        entity_id: UniqueIdentifier,
        locker: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
    }
    fn on_entity_unlocked(
        &self,
        entity_id: UniqueIdentifier,
        locker: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
    }
    fn on_configuration_changed(
        &self,
        entity_id: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
    ) {
    }
    fn on_entity_name_changed(&self, entity_id: UniqueIdentifier, name: AvdeccFixedString) {}
    fn on_entity_group_name_changed(&self, entity_id: UniqueIdentifier, name: AvdeccFixedString) {}
    fn on_configuration_name_changed(
        &self,
        entity_id: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        name: AvdeccFixedString,
    ) {
    }
    fn on_stream_input_format_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_index: StreamIndex,
        format: StreamFormat,
    ) {
    }
    fn on_stream_output_format_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_index: StreamIndex,
        format: StreamFormat,
    ) {
    }
    fn on_stream_input_info_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_index: StreamIndex,
        info: &StreamInfo,
    ) {
    }
    fn on_stream_output_info_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_index: StreamIndex,
        info: &StreamInfo,
    ) {
    }
    fn on_stream_input_audio_mappings_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        number_of_maps: MapIndex,
        map_index: MapIndex,
        mappings: &[AudioMapping],
    ) {
    }
    fn on_stream_output_audio_mappings_changed(
        &self,
        entity_id: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        number_of_maps: MapIndex,
        map_index: MapIndex,
        mappings: &[AudioMapping],
    ) {
    }
    fn on_stream_input_started(&self, entity_id: UniqueIdentifier, stream_index: StreamIndex) {}
    fn on_stream_input_stopped(&self, entity_id: UniqueIdentifier, stream_index: StreamIndex) {}
    fn on_stream_output_started(&self, entity_id: UniqueIdentifier, stream_index: StreamIndex) {}
    fn on_stream_output_stopped(&self, entity_id: UniqueIdentifier, stream_index: StreamIndex) {}
    fn on_sampling_rate_changed(
        &self,
        entity_id: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        rate: SamplingRate,
    ) {
    }
    fn on_clock_source_changed(
        &self,
        entity_id: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        clock_source_index: ClockSourceIndex,
    ) {
    }
    fn on_counters_updated(
        &self,
        entity_id: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        counters: &EntityCounters,
    ) {
    }
    /// Progress report for a long-running device operation, in 1/1000 units.
    fn on_operation_status(
        &self,
        entity_id: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        operation_id: OperationId,
        percent_complete: u16,
    ) {
    }
    fn on_memory_object_length_changed(
        &self,
        entity_id: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        memory_object_index: DescriptorIndex,
        length: u64,
    ) {
    }

    /* **** Inbound AECP commands **** */

    /// An AECP command addressed to this controller that the engine does not
    /// answer itself. Return true to claim it (the engine then sends no
    /// NOT_IMPLEMENTED response).
    fn on_unhandled_aecp_command(&self, command: &Aecpdu) -> bool {
        false
    }

    /* **** Sniffed ACMP traffic **** */

    /// A connection-management command observed on the multicast channel that
    /// was not issued by this controller.
    fn on_acmp_sniffed_command(&self, command: &Acmpdu) {}
    fn on_connect_stream_sniffed(
        &self,
        talker: UniqueIdentifier,
        talker_stream_index: StreamIndex,
        listener: UniqueIdentifier,
        listener_stream_index: StreamIndex,
        connection_count: u16,
        flags: ConnectionFlags,
        status: ControlStatus,
    ) {
    }
    /// A fast-connect (Clause 8.2.2.1.1) CONNECT_RX exchange.
    fn on_fast_connect_stream_sniffed(
        &self,
        talker: UniqueIdentifier,
        talker_stream_index: StreamIndex,
        listener: UniqueIdentifier,
        listener_stream_index: StreamIndex,
        connection_count: u16,
        flags: ConnectionFlags,
        status: ControlStatus,
    ) {
    }
    fn on_disconnect_stream_sniffed(
        &self,
        talker: UniqueIdentifier,
        talker_stream_index: StreamIndex,
        listener: UniqueIdentifier,
        listener_stream_index: StreamIndex,
        connection_count: u16,
        flags: ConnectionFlags,
        status: ControlStatus,
    ) {
    }
    fn on_get_listener_stream_state_sniffed(
        &self,
        talker: UniqueIdentifier,
        talker_stream_index: StreamIndex,
        listener: UniqueIdentifier,
        listener_stream_index: StreamIndex,
        connection_count: u16,
        flags: ConnectionFlags,
        status: ControlStatus,
    ) {
    }
}
