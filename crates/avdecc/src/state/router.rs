// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Response router.
//!
//! Solicited path: the pending entry's typed handler is the dispatch table.
//! Matching on the handler variant (not on the wire command type) makes the
//! routing total at compile time - every command the facade can issue has an
//! arm here, or this module does not build.
//!
//! Unsolicited path: AEM responses with the unsolicited bit fan out to the
//! delegate by command type; unknown types are logged and dropped.
//!
//! Decode-failure rule (single rule, no per-error carve-outs): when the
//! response status is non-SUCCESS and `accept_invalid_non_success_response`
//! is set, the device status is delivered with default payload fields; in
//! every other case a decode failure delivers `ProtocolError`.

use crate::config::ProtocolTolerance;
use crate::controller::delegate::ControllerDelegate;
use crate::controller::handlers::{AcmpResponseHandler, AecpHandler, AemHandler, DescriptorHandler};
use crate::controller::status::{AemCommandStatus, AaCommandStatus, ControlStatus, MvuCommandStatus};
use crate::model::{Descriptor, DescriptorType, UniqueIdentifier};
use crate::protocol::aecpdu::{AemAecpdu, AemCommandType, MvuCommandType};
use crate::protocol::aem_payloads::{self, acquire_flags, lock_flags};
use crate::protocol::descriptors::deserialize_read_descriptor_response;
use crate::protocol::mvu_payloads;
use crate::protocol::{Acmpdu, AcmpMessageType, Aecpdu, PduError};
use crate::model::ConnectionFlags;

/// Route a solicited AECP response to its stored handler. Exactly one handler
/// invocation happens on every path through this function.
pub(crate) fn deliver_aecp_response(
    handler: AecpHandler,
    response: &Aecpdu,
    tolerance: &ProtocolTolerance,
) {
    let target = response.common().target_entity_id;
    match (handler, response) {
        (AecpHandler::Aem(handler), Aecpdu::Aem(aem)) => {
            let status = AemCommandStatus::from_wire(aem.common.status);
            if aem.command_type != handler.expected_command_type() {
                log::debug!(
                    "[router] {target} answered with command type {} where {} was expected",
                    aem.command_type,
                    handler.expected_command_type()
                );
                handler.deliver_error(target, AemCommandStatus::ProtocolError);
                return;
            }
            deliver_aem(handler, aem, status, tolerance);
        }
        (AecpHandler::Aa(cb), Aecpdu::Aa(aa)) => {
            let status = AaCommandStatus::from_wire(aa.common.status);
            cb(target, status, aa.tlvs.clone());
        }
        (AecpHandler::Mvu(cb), Aecpdu::Mvu(mvu)) => {
            let status = MvuCommandStatus::from_wire(mvu.common.status);
            if mvu.command_type != MvuCommandType::GET_MILAN_INFO {
                cb(target, MvuCommandStatus::ProtocolError, Default::default());
                return;
            }
            match mvu_payloads::deserialize_milan_info_response(&mvu.payload) {
                Ok((_, info)) => cb(target, status, info),
                Err(_) if tolerated(status.is_success(), tolerance) => {
                    cb(target, status, Default::default());
                }
                Err(err) => {
                    log::debug!("[router] GET_MILAN_INFO response from {target} undecodable: {err}");
                    cb(target, MvuCommandStatus::ProtocolError, Default::default());
                }
            }
        }
        (handler, _) => {
            // Correlated by (target, seq) but the family flipped: the device
            // is misbehaving.
            log::debug!("[router] {target} answered with a different AECP family");
            handler.deliver_error(target, crate::controller::handlers::LocalFailure::ProtocolError);
        }
    }
}

/// Non-SUCCESS responses may legally omit payload fields when the tolerance
/// knob is on.
fn tolerated(is_success: bool, tolerance: &ProtocolTolerance) -> bool {
    !is_success && tolerance.accept_invalid_non_success_response
}

/// Invoke `cb(args...)` with the deserialized payload, or resolve the decode
/// failure per the routing rule. `$rewrap` rebuilds the handler variant so
/// the failure path can reuse its default-payload delivery.
macro_rules! route {
    ($aem:expr, $status:expr, $tolerance:expr, $payload:expr, $rewrap:expr, |$args:pat_param| $invoke:expr) => {
        match $payload {
            Ok($args) => $invoke,
            Err(err) => decode_failed($rewrap, $aem, $status, err, $tolerance),
        }
    };
}

fn decode_failed(
    handler: AemHandler,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    err: PduError,
    tolerance: &ProtocolTolerance,
) {
    let target = aem.common.target_entity_id;
    if tolerated(status.is_success(), tolerance) {
        handler.deliver_error(target, status);
    } else {
        log::debug!(
            "[router] {} response from {target} undecodable: {err}",
            aem.command_type
        );
        handler.deliver_error(target, AemCommandStatus::ProtocolError);
    }
}

fn deliver_aem(
    handler: AemHandler,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
) {
    use AemHandler::*;
    let target = aem.common.target_entity_id;
    let payload = &aem.payload;

    match handler {
        AcquireEntity(cb) | ReleaseEntity(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_acquire_entity(payload),
            AcquireEntity(cb),
            |(_, owner, dt, di)| cb(target, status, owner, dt, di)
        ),
        LockEntity(cb) | UnlockEntity(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_lock_entity(payload),
            LockEntity(cb),
            |(_, locker, dt, di)| cb(target, status, locker, dt, di)
        ),
        QueryEntityAvailable(cb)
        | QueryControllerAvailable(cb)
        | RegisterUnsolicitedNotifications(cb)
        | DeregisterUnsolicitedNotifications(cb) => cb(target, status),
        ReadDescriptor(handler) => deliver_descriptor(handler, aem, status, tolerance),
        SetConfiguration(cb) | GetConfiguration(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_configuration_response(payload),
            SetConfiguration(cb),
            |cfg| cb(target, status, cfg)
        ),
        SetStreamInputFormat(cb) => deliver_stream_format(
            cb, DescriptorType::StreamInput, aem, status, tolerance, SetStreamInputFormat,
        ),
        SetStreamOutputFormat(cb) => deliver_stream_format(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, SetStreamOutputFormat,
        ),
        GetStreamInputFormat(cb) => deliver_stream_format(
            cb, DescriptorType::StreamInput, aem, status, tolerance, GetStreamInputFormat,
        ),
        GetStreamOutputFormat(cb) => deliver_stream_format(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, GetStreamOutputFormat,
        ),
        SetStreamInputInfo(cb) => deliver_stream_info(
            cb, DescriptorType::StreamInput, aem, status, tolerance, SetStreamInputInfo,
        ),
        SetStreamOutputInfo(cb) => deliver_stream_info(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, SetStreamOutputInfo,
        ),
        GetStreamInputInfo(cb) => deliver_stream_info(
            cb, DescriptorType::StreamInput, aem, status, tolerance, GetStreamInputInfo,
        ),
        GetStreamOutputInfo(cb) => deliver_stream_info(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, GetStreamOutputInfo,
        ),
        SetEntityName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Entity, 0),
            SetEntityName(cb),
            |_| cb(target, status)
        ),
        GetEntityName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Entity, 0),
            GetEntityName(cb),
            |(_, name)| cb(target, status, name)
        ),
        SetEntityGroupName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Entity, 1),
            SetEntityGroupName(cb),
            |_| cb(target, status)
        ),
        GetEntityGroupName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Entity, 1),
            GetEntityGroupName(cb),
            |(_, name)| cb(target, status, name)
        ),
        SetConfigurationName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Configuration, 0),
            SetConfigurationName(cb),
            |(di, _)| cb(target, status, di)
        ),
        GetConfigurationName(cb) => route!(
            aem, status, tolerance,
            expect_name(payload, DescriptorType::Configuration, 0),
            GetConfigurationName(cb),
            |(di, name)| cb(target, status, di, name)
        ),
        SetSamplingRate(cb) | GetSamplingRate(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_sampling_rate_response(payload),
            SetSamplingRate(cb),
            |(dt, di, rate)| cb(target, status, dt, di, rate)
        ),
        SetClockSource(cb) | GetClockSource(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_clock_source_response(payload),
            SetClockSource(cb),
            |(dt, di, csi)| cb(target, status, dt, di, csi)
        ),
        StartStreamInput(cb) => deliver_stream_state(
            cb, DescriptorType::StreamInput, aem, status, tolerance, StartStreamInput,
        ),
        StartStreamOutput(cb) => deliver_stream_state(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, StartStreamOutput,
        ),
        StopStreamInput(cb) => deliver_stream_state(
            cb, DescriptorType::StreamInput, aem, status, tolerance, StopStreamInput,
        ),
        StopStreamOutput(cb) => deliver_stream_state(
            cb, DescriptorType::StreamOutput, aem, status, tolerance, StopStreamOutput,
        ),
        GetAvbInfo(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_avb_info_response(payload).and_then(|(dt, di, info)| {
                if dt == DescriptorType::AvbInterface {
                    Ok((di, info))
                } else {
                    Err(PduError::InvalidDescriptorType)
                }
            }),
            GetAvbInfo(cb),
            |(di, info)| cb(target, status, di, info)
        ),
        GetAsPath(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_as_path_response(payload),
            GetAsPath(cb),
            |(di, path)| cb(target, status, di, path)
        ),
        GetCounters(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_counters_response(payload),
            GetCounters(cb),
            |(dt, di, counters)| cb(target, status, dt, di, counters)
        ),
        GetStreamInputAudioMap(cb) => deliver_audio_map(
            cb, DescriptorType::StreamPortInput, aem, status, tolerance, GetStreamInputAudioMap,
        ),
        GetStreamOutputAudioMap(cb) => deliver_audio_map(
            cb, DescriptorType::StreamPortOutput, aem, status, tolerance, GetStreamOutputAudioMap,
        ),
        AddStreamInputAudioMappings(cb) => deliver_audio_mappings(
            cb, DescriptorType::StreamPortInput, aem, status, tolerance, AddStreamInputAudioMappings,
        ),
        AddStreamOutputAudioMappings(cb) => deliver_audio_mappings(
            cb,
            DescriptorType::StreamPortOutput,
            aem,
            status,
            tolerance,
            AddStreamOutputAudioMappings,
        ),
        RemoveStreamInputAudioMappings(cb) => deliver_audio_mappings(
            cb,
            DescriptorType::StreamPortInput,
            aem,
            status,
            tolerance,
            RemoveStreamInputAudioMappings,
        ),
        RemoveStreamOutputAudioMappings(cb) => deliver_audio_mappings(
            cb,
            DescriptorType::StreamPortOutput,
            aem,
            status,
            tolerance,
            RemoveStreamOutputAudioMappings,
        ),
        StartOperation(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_start_operation_response(payload),
            StartOperation(cb),
            |(dt, di, id, op)| cb(target, status, dt, di, id, op)
        ),
        AbortOperation(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_abort_operation_response(payload),
            AbortOperation(cb),
            |(dt, di, id)| cb(target, status, dt, di, id)
        ),
        SetMemoryObjectLength(cb) | GetMemoryObjectLength(cb) => route!(
            aem, status, tolerance,
            aem_payloads::deserialize_memory_object_length_response(payload),
            SetMemoryObjectLength(cb),
            |(cfg, idx, len)| cb(target, status, cfg, idx, len)
        ),
    }
}

/// Decode a SET/GET_NAME payload and require the (descriptor type, name
/// index) pair the handler was registered for. Returns (descriptor_index,
/// name).
fn expect_name(
    payload: &[u8],
    descriptor_type: DescriptorType,
    name_index: u16,
) -> Result<(u16, crate::model::AvdeccFixedString), PduError> {
    let (dt, di, ni, _cfg, name) = aem_payloads::deserialize_name_response(payload)?;
    if dt != descriptor_type {
        return Err(PduError::InvalidDescriptorType);
    }
    if ni != name_index {
        return Err(PduError::MalformedField("name_index"));
    }
    Ok((di, name))
}

fn deliver_stream_format(
    cb: crate::controller::handlers::StreamFormatHandler,
    expected: DescriptorType,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
    rewrap: fn(crate::controller::handlers::StreamFormatHandler) -> AemHandler,
) {
    let target = aem.common.target_entity_id;
    route!(
        aem, status, tolerance,
        aem_payloads::deserialize_stream_format_response(&aem.payload).and_then(
            |(dt, di, format)| {
                if dt == expected {
                    Ok((di, format))
                } else {
                    Err(PduError::InvalidDescriptorType)
                }
            }
        ),
        rewrap(cb),
        |(di, format)| cb(target, status, di, format)
    );
}

fn deliver_stream_info(
    cb: crate::controller::handlers::StreamInfoHandler,
    expected: DescriptorType,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
    rewrap: fn(crate::controller::handlers::StreamInfoHandler) -> AemHandler,
) {
    let target = aem.common.target_entity_id;
    route!(
        aem, status, tolerance,
        aem_payloads::deserialize_stream_info_response(&aem.payload).and_then(|(dt, di, info)| {
            if dt == expected {
                Ok((di, info))
            } else {
                Err(PduError::InvalidDescriptorType)
            }
        }),
        rewrap(cb),
        |(di, info)| cb(target, status, di, info)
    );
}

fn deliver_stream_state(
    cb: crate::controller::handlers::StreamStateHandler,
    expected: DescriptorType,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
    rewrap: fn(crate::controller::handlers::StreamStateHandler) -> AemHandler,
) {
    let target = aem.common.target_entity_id;
    route!(
        aem, status, tolerance,
        aem_payloads::deserialize_desc_ref(&aem.payload).and_then(|(dt, di)| {
            if dt == expected {
                Ok(di)
            } else {
                Err(PduError::InvalidDescriptorType)
            }
        }),
        rewrap(cb),
        |di| cb(target, status, di)
    );
}

fn deliver_audio_map(
    cb: crate::controller::handlers::AudioMapHandler,
    expected: DescriptorType,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
    rewrap: fn(crate::controller::handlers::AudioMapHandler) -> AemHandler,
) {
    let target = aem.common.target_entity_id;
    route!(
        aem, status, tolerance,
        aem_payloads::deserialize_audio_map_response(&aem.payload).and_then(
            |(dt, di, map_index, number_of_maps, mappings)| {
                if dt == expected {
                    Ok((di, map_index, number_of_maps, mappings))
                } else {
                    Err(PduError::InvalidDescriptorType)
                }
            }
        ),
        rewrap(cb),
        |(di, map_index, number_of_maps, mappings)| {
            cb(target, status, di, number_of_maps, map_index, mappings)
        }
    );
}

fn deliver_audio_mappings(
    cb: crate::controller::handlers::AudioMappingsHandler,
    expected: DescriptorType,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
    rewrap: fn(crate::controller::handlers::AudioMappingsHandler) -> AemHandler,
) {
    let target = aem.common.target_entity_id;
    route!(
        aem, status, tolerance,
        aem_payloads::deserialize_audio_mappings(&aem.payload).and_then(|(dt, di, mappings)| {
            if dt == expected {
                Ok((di, mappings))
            } else {
                Err(PduError::InvalidDescriptorType)
            }
        }),
        rewrap(cb),
        |(di, mappings)| cb(target, status, di, mappings)
    );
}

/// Generate the 21-way (typed handler, decoded descriptor) pairing.
macro_rules! match_descriptor {
    ($handler:expr, $descriptor:expr, $target:expr, $status:expr,
     $( $variant:ident ),+ $(,)?) => {
        match ($handler, $descriptor) {
            $( (DescriptorHandler::$variant(cb), Descriptor::$variant(d)) => {
                cb($target, $status, d);
                return;
            } )+
            (handler, descriptor) => {
                log::debug!(
                    "[router] READ_DESCRIPTOR answered with {:?} where {:?} was expected",
                    descriptor.descriptor_type(),
                    handler.expected_descriptor_type()
                );
                handler.deliver_error($target, AemCommandStatus::ProtocolError);
            }
        }
    };
}

fn deliver_descriptor(
    handler: DescriptorHandler,
    aem: &AemAecpdu,
    status: AemCommandStatus,
    tolerance: &ProtocolTolerance,
) {
    let target = aem.common.target_entity_id;
    let descriptor = match deserialize_read_descriptor_response(&aem.payload) {
        Ok((_cfg, _index, descriptor)) => descriptor,
        Err(err) => {
            if tolerated(status.is_success(), tolerance) {
                handler.deliver_error(target, status);
            } else {
                log::debug!("[router] READ_DESCRIPTOR response from {target} undecodable: {err}");
                handler.deliver_error(target, AemCommandStatus::ProtocolError);
            }
            return;
        }
    };

    match_descriptor!(
        handler, descriptor, target, status,
        Entity, Configuration, AudioUnit, StreamInput, StreamOutput, JackInput, JackOutput,
        AvbInterface, ClockSource, MemoryObject, Locale, Strings, StreamPortInput,
        StreamPortOutput, ExternalPortInput, ExternalPortOutput, InternalPortInput,
        InternalPortOutput, AudioCluster, AudioMap, ClockDomain,
    );
}

/// Fan an unsolicited AEM response (SUCCESS status, unsolicited bit set) out
/// to the delegate. Never touches per-call handlers.
pub(crate) fn fan_out_unsolicited(aem: &AemAecpdu, delegate: &dyn ControllerDelegate) {
    let target = aem.common.target_entity_id;
    let payload = &aem.payload;

    // Unknown command types and undecodable payloads are logged and dropped;
    // there is no caller waiting on this message.
    macro_rules! decoded {
        ($expr:expr) => {
            match $expr {
                Ok(value) => value,
                Err(err) => {
                    log::debug!(
                        "[router] unsolicited {} from {target} undecodable: {err}",
                        aem.command_type
                    );
                    return;
                }
            }
        };
    }

    match aem.command_type {
        AemCommandType::ACQUIRE_ENTITY => {
            let (flags, owner, dt, di) = decoded!(aem_payloads::deserialize_acquire_entity(payload));
            if flags & acquire_flags::RELEASE != 0 {
                delegate.on_entity_released(target, owner, dt, di);
            } else {
                delegate.on_entity_acquired(target, owner, dt, di);
            }
        }
        AemCommandType::LOCK_ENTITY => {
            let (flags, locker, dt, di) = decoded!(aem_payloads::deserialize_lock_entity(payload));
            if flags & lock_flags::UNLOCK != 0 {
                delegate.on_entity_unlocked(target, locker, dt, di);
            } else {
                delegate.on_entity_locked(target, locker, dt, di);
            }
        }
        AemCommandType::SET_CONFIGURATION => {
            let cfg = decoded!(aem_payloads::deserialize_configuration_response(payload));
            delegate.on_configuration_changed(target, cfg);
        }
        AemCommandType::SET_STREAM_FORMAT => {
            let (dt, di, format) =
                decoded!(aem_payloads::deserialize_stream_format_response(payload));
            match dt {
                DescriptorType::StreamInput => {
                    delegate.on_stream_input_format_changed(target, di, format);
                }
                DescriptorType::StreamOutput => {
                    delegate.on_stream_output_format_changed(target, di, format);
                }
                other => log_unroutable(target, aem.command_type, other),
            }
        }
        AemCommandType::SET_STREAM_INFO | AemCommandType::GET_STREAM_INFO => {
            let (dt, di, info) = decoded!(aem_payloads::deserialize_stream_info_response(payload));
            match dt {
                DescriptorType::StreamInput => {
                    delegate.on_stream_input_info_changed(target, di, &info);
                }
                DescriptorType::StreamOutput => {
                    delegate.on_stream_output_info_changed(target, di, &info);
                }
                other => log_unroutable(target, aem.command_type, other),
            }
        }
        AemCommandType::SET_NAME | AemCommandType::GET_NAME => {
            let (dt, di, name_index, _cfg, name) =
                decoded!(aem_payloads::deserialize_name_response(payload));
            match (dt, name_index) {
                (DescriptorType::Entity, 0) => delegate.on_entity_name_changed(target, name),
                (DescriptorType::Entity, 1) => delegate.on_entity_group_name_changed(target, name),
                (DescriptorType::Configuration, 0) => {
                    delegate.on_configuration_name_changed(target, di, name);
                }
                (dt, ni) => {
                    log::debug!(
                        "[router] unsolicited name change from {target} for unmapped \
                         ({dt:?}, name_index {ni}); dropping"
                    );
                }
            }
        }
        AemCommandType::SET_SAMPLING_RATE => {
            let (dt, di, rate) = decoded!(aem_payloads::deserialize_sampling_rate_response(payload));
            delegate.on_sampling_rate_changed(target, dt, di, rate);
        }
        AemCommandType::SET_CLOCK_SOURCE => {
            let (dt, di, csi) = decoded!(aem_payloads::deserialize_clock_source_response(payload));
            delegate.on_clock_source_changed(target, dt, di, csi);
        }
        AemCommandType::START_STREAMING => {
            let (dt, di) = decoded!(aem_payloads::deserialize_desc_ref(payload));
            match dt {
                DescriptorType::StreamInput => delegate.on_stream_input_started(target, di),
                DescriptorType::StreamOutput => delegate.on_stream_output_started(target, di),
                other => log_unroutable(target, aem.command_type, other),
            }
        }
        AemCommandType::STOP_STREAMING => {
            let (dt, di) = decoded!(aem_payloads::deserialize_desc_ref(payload));
            match dt {
                DescriptorType::StreamInput => delegate.on_stream_input_stopped(target, di),
                DescriptorType::StreamOutput => delegate.on_stream_output_stopped(target, di),
                other => log_unroutable(target, aem.command_type, other),
            }
        }
        AemCommandType::GET_COUNTERS => {
            let (dt, di, counters) = decoded!(aem_payloads::deserialize_counters_response(payload));
            delegate.on_counters_updated(target, dt, di, &counters);
        }
        AemCommandType::GET_AUDIO_MAP => {
            let (dt, di, map_index, number_of_maps, mappings) =
                decoded!(aem_payloads::deserialize_audio_map_response(payload));
            fan_out_mappings(delegate, target, dt, di, number_of_maps, map_index, &mappings);
        }
        AemCommandType::ADD_AUDIO_MAPPINGS | AemCommandType::REMOVE_AUDIO_MAPPINGS => {
            let (dt, di, mappings) = decoded!(aem_payloads::deserialize_audio_mappings(payload));
            fan_out_mappings(delegate, target, dt, di, 0, 0, &mappings);
        }
        AemCommandType::OPERATION_STATUS => {
            let (dt, di, operation_id, percent) =
                decoded!(aem_payloads::deserialize_operation_status(payload));
            delegate.on_operation_status(target, dt, di, operation_id, percent);
        }
        AemCommandType::SET_MEMORY_OBJECT_LENGTH | AemCommandType::GET_MEMORY_OBJECT_LENGTH => {
            let (cfg, idx, length) =
                decoded!(aem_payloads::deserialize_memory_object_length_response(payload));
            delegate.on_memory_object_length_changed(target, cfg, idx, length);
        }
        other => {
            log::debug!("[router] unsolicited response from {target} with unknown command type {other}; dropping");
        }
    }
}

fn fan_out_mappings(
    delegate: &dyn ControllerDelegate,
    target: UniqueIdentifier,
    dt: DescriptorType,
    di: u16,
    number_of_maps: u16,
    map_index: u16,
    mappings: &[crate::model::AudioMapping],
) {
    match dt {
        DescriptorType::StreamPortInput => delegate.on_stream_input_audio_mappings_changed(
            target,
            di,
            number_of_maps,
            map_index,
            mappings,
        ),
        DescriptorType::StreamPortOutput => delegate.on_stream_output_audio_mappings_changed(
            target,
            di,
            number_of_maps,
            map_index,
            mappings,
        ),
        other => log_unroutable(target, AemCommandType::GET_AUDIO_MAP, other),
    }
}

fn log_unroutable(target: UniqueIdentifier, command_type: AemCommandType, dt: DescriptorType) {
    log::debug!(
        "[router] unsolicited {command_type} from {target} names descriptor type {dt:?} \
         that has no notification; dropping"
    );
}

/// Route a solicited ACMP response to its stored handler.
pub(crate) fn deliver_acmp_response(handler: AcmpResponseHandler, acmpdu: &Acmpdu) {
    handler(
        acmpdu.talker_entity_id,
        acmpdu.talker_unique_id,
        acmpdu.listener_entity_id,
        acmpdu.listener_unique_id,
        acmpdu.connection_count,
        acmpdu.flags,
        ControlStatus::from_wire(acmpdu.status),
    );
}

/// Fan a sniffed ACMP response (not correlated to any of our commands) out to
/// the delegate hooks.
pub(crate) fn fan_out_sniffed_response(acmpdu: &Acmpdu, delegate: &dyn ControllerDelegate) {
    let status = ControlStatus::from_wire(acmpdu.status);
    match acmpdu.message_type {
        AcmpMessageType::ConnectRxResponse => {
            if acmpdu.flags.contains(ConnectionFlags::FAST_CONNECT) {
                delegate.on_fast_connect_stream_sniffed(
                    acmpdu.talker_entity_id,
                    acmpdu.talker_unique_id,
                    acmpdu.listener_entity_id,
                    acmpdu.listener_unique_id,
                    acmpdu.connection_count,
                    acmpdu.flags,
                    status,
                );
            } else {
                delegate.on_connect_stream_sniffed(
                    acmpdu.talker_entity_id,
                    acmpdu.talker_unique_id,
                    acmpdu.listener_entity_id,
                    acmpdu.listener_unique_id,
                    acmpdu.connection_count,
                    acmpdu.flags,
                    status,
                );
            }
        }
        AcmpMessageType::DisconnectRxResponse => delegate.on_disconnect_stream_sniffed(
            acmpdu.talker_entity_id,
            acmpdu.talker_unique_id,
            acmpdu.listener_entity_id,
            acmpdu.listener_unique_id,
            acmpdu.connection_count,
            acmpdu.flags,
            status,
        ),
        AcmpMessageType::GetRxStateResponse => delegate.on_get_listener_stream_state_sniffed(
            acmpdu.talker_entity_id,
            acmpdu.talker_unique_id,
            acmpdu.listener_entity_id,
            acmpdu.listener_unique_id,
            acmpdu.connection_count,
            acmpdu.flags,
            status,
        ),
        // TX-side and talker-connection chatter has no dedicated hook
        _ => {}
    }
}
