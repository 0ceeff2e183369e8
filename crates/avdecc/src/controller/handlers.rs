// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed per-call result handlers.
//!
//! Every in-flight command carries one [`AecpHandler`] / ACMP handler. The
//! tagged enum is the dispatch table: the router matches on the variant, so
//! the compiler guarantees every command the facade can issue has a route,
//! and the error paths (timeout, unknown entity, codec failure) construct
//! default payload values at the call site instead of sharing static
//! sentinels.

use super::status::{AaCommandStatus, AemCommandStatus, ControlStatus, MvuCommandStatus};
use crate::model::{
    AsPath, AudioMapping, AvbInfo, AvbInterfaceIndex, AvdeccFixedString, ClockSourceIndex,
    ConfigurationIndex, ConnectionFlags, DescriptorIndex, DescriptorType, EntityCounters,
    MapIndex, MilanInfo, OperationId, SamplingRate, StreamFormat, StreamIndex, StreamInfo,
    UniqueIdentifier,
};
use crate::model::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioUnitDescriptor, AvbInterfaceDescriptor,
    ClockDomainDescriptor, ClockSourceDescriptor, ConfigurationDescriptor, EntityDescriptor,
    ExternalPortDescriptor, InternalPortDescriptor, JackDescriptor, LocaleDescriptor,
    MemoryObjectDescriptor, StreamDescriptor, StreamPortDescriptor, StringsDescriptor,
};
use crate::protocol::aecpdu::AemCommandType;
use crate::protocol::AaTlv;

pub type AcquireEntityHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, UniqueIdentifier, DescriptorType, DescriptorIndex)
        + Send
        + Sync,
>;
pub type StatusOnlyHandler = Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus) + Send + Sync>;
pub type ConfigurationHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, ConfigurationIndex) + Send + Sync>;
pub type StreamFormatHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, StreamIndex, StreamFormat) + Send + Sync>;
pub type StreamInfoHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, StreamIndex, StreamInfo) + Send + Sync>;
pub type NameHandler = Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, AvdeccFixedString) + Send + Sync>;
pub type ConfigurationNameHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, ConfigurationIndex, AvdeccFixedString) + Send + Sync,
>;
pub type SamplingRateHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorType, DescriptorIndex, SamplingRate)
        + Send
        + Sync,
>;
pub type ClockSourceHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorType, DescriptorIndex, ClockSourceIndex)
        + Send
        + Sync,
>;
pub type StreamStateHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, StreamIndex) + Send + Sync>;
pub type AvbInfoHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, AvbInterfaceIndex, AvbInfo) + Send + Sync>;
pub type AsPathHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, AvbInterfaceIndex, AsPath) + Send + Sync>;
pub type CountersHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorType, DescriptorIndex, EntityCounters)
        + Send
        + Sync,
>;
pub type AudioMapHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorIndex, MapIndex, MapIndex, Vec<AudioMapping>)
        + Send
        + Sync,
>;
pub type AudioMappingsHandler =
    Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorIndex, Vec<AudioMapping>) + Send + Sync>;
pub type StartOperationHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorType, DescriptorIndex, OperationId, u16)
        + Send
        + Sync,
>;
pub type AbortOperationHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, DescriptorType, DescriptorIndex, OperationId)
        + Send
        + Sync,
>;
pub type MemoryObjectLengthHandler = Box<
    dyn FnOnce(UniqueIdentifier, AemCommandStatus, ConfigurationIndex, DescriptorIndex, u64) + Send + Sync,
>;

pub type AddressAccessHandler =
    Box<dyn FnOnce(UniqueIdentifier, AaCommandStatus, Vec<AaTlv>) + Send + Sync>;
pub type MilanInfoHandler = Box<dyn FnOnce(UniqueIdentifier, MvuCommandStatus, MilanInfo) + Send + Sync>;

/// ACMP result receiver: (talker EID, talker index, listener EID, listener
/// index, connection count, flags, status).
pub type AcmpResponseHandler = Box<
    dyn FnOnce(UniqueIdentifier, StreamIndex, UniqueIdentifier, StreamIndex, u16, ConnectionFlags, ControlStatus)
        + Send
        + Sync,
>;

/// Generate a typed-descriptor-handler enum plus its helpers.
macro_rules! descriptor_handlers {
    ($( $variant:ident => ($descriptor_type:ident, $body:ty) ),+ $(,)?) => {
        /// Typed READ_DESCRIPTOR result receivers, one per descriptor type.
        pub enum DescriptorHandler {
            $( $variant(Box<dyn FnOnce(UniqueIdentifier, AemCommandStatus, $body) + Send + Sync>), )+
        }

        impl DescriptorHandler {
            /// The descriptor type this handler expects in the response.
            #[must_use]
            pub fn expected_descriptor_type(&self) -> DescriptorType {
                match self {
                    $( DescriptorHandler::$variant(_) => DescriptorType::$descriptor_type, )+
                }
            }

            /// Invoke with default-initialized descriptor fields (error path).
            pub fn deliver_error(self, target: UniqueIdentifier, status: AemCommandStatus) {
                match self {
                    $( DescriptorHandler::$variant(cb) => cb(target, status, <$body>::default()), )+
                }
            }
        }
    };
}

descriptor_handlers! {
    Entity => (Entity, EntityDescriptor),
    Configuration => (Configuration, ConfigurationDescriptor),
    AudioUnit => (AudioUnit, AudioUnitDescriptor),
    StreamInput => (StreamInput, StreamDescriptor),
    StreamOutput => (StreamOutput, StreamDescriptor),
    JackInput => (JackInput, JackDescriptor),
    JackOutput => (JackOutput, JackDescriptor),
    AvbInterface => (AvbInterface, AvbInterfaceDescriptor),
    ClockSource => (ClockSource, ClockSourceDescriptor),
    MemoryObject => (MemoryObject, MemoryObjectDescriptor),
    Locale => (Locale, LocaleDescriptor),
    Strings => (Strings, StringsDescriptor),
    StreamPortInput => (StreamPortInput, StreamPortDescriptor),
    StreamPortOutput => (StreamPortOutput, StreamPortDescriptor),
    ExternalPortInput => (ExternalPortInput, ExternalPortDescriptor),
    ExternalPortOutput => (ExternalPortOutput, ExternalPortDescriptor),
    InternalPortInput => (InternalPortInput, InternalPortDescriptor),
    InternalPortOutput => (InternalPortOutput, InternalPortDescriptor),
    AudioCluster => (AudioCluster, AudioClusterDescriptor),
    AudioMap => (AudioMap, AudioMapDescriptor),
    ClockDomain => (ClockDomain, ClockDomainDescriptor),
}

/// One variant per AEM operation the facade can issue.
pub enum AemHandler {
    AcquireEntity(AcquireEntityHandler),
    ReleaseEntity(AcquireEntityHandler),
    LockEntity(AcquireEntityHandler),
    UnlockEntity(AcquireEntityHandler),
    QueryEntityAvailable(StatusOnlyHandler),
    QueryControllerAvailable(StatusOnlyHandler),
    RegisterUnsolicitedNotifications(StatusOnlyHandler),
    DeregisterUnsolicitedNotifications(StatusOnlyHandler),
    ReadDescriptor(DescriptorHandler),
    SetConfiguration(ConfigurationHandler),
    GetConfiguration(ConfigurationHandler),
    SetStreamInputFormat(StreamFormatHandler),
    SetStreamOutputFormat(StreamFormatHandler),
    GetStreamInputFormat(StreamFormatHandler),
    GetStreamOutputFormat(StreamFormatHandler),
    SetStreamInputInfo(StreamInfoHandler),
    SetStreamOutputInfo(StreamInfoHandler),
    GetStreamInputInfo(StreamInfoHandler),
    GetStreamOutputInfo(StreamInfoHandler),
    SetEntityName(StatusOnlyHandler),
    GetEntityName(NameHandler),
    SetEntityGroupName(StatusOnlyHandler),
    GetEntityGroupName(NameHandler),
    SetConfigurationName(ConfigurationHandler),
    GetConfigurationName(ConfigurationNameHandler),
    SetSamplingRate(SamplingRateHandler),
    GetSamplingRate(SamplingRateHandler),
    SetClockSource(ClockSourceHandler),
    GetClockSource(ClockSourceHandler),
    StartStreamInput(StreamStateHandler),
    StartStreamOutput(StreamStateHandler),
    StopStreamInput(StreamStateHandler),
    StopStreamOutput(StreamStateHandler),
    GetAvbInfo(AvbInfoHandler),
    GetAsPath(AsPathHandler),
    GetCounters(CountersHandler),
    GetStreamInputAudioMap(AudioMapHandler),
    GetStreamOutputAudioMap(AudioMapHandler),
    AddStreamInputAudioMappings(AudioMappingsHandler),
    AddStreamOutputAudioMappings(AudioMappingsHandler),
    RemoveStreamInputAudioMappings(AudioMappingsHandler),
    RemoveStreamOutputAudioMappings(AudioMappingsHandler),
    StartOperation(StartOperationHandler),
    AbortOperation(AbortOperationHandler),
    SetMemoryObjectLength(MemoryObjectLengthHandler),
    GetMemoryObjectLength(MemoryObjectLengthHandler),
}

impl AemHandler {
    /// The AEM command type whose response this handler consumes.
    #[must_use]
    pub fn expected_command_type(&self) -> AemCommandType {
        use AemHandler::*;
        match self {
            AcquireEntity(_) | ReleaseEntity(_) => AemCommandType::ACQUIRE_ENTITY,
            LockEntity(_) | UnlockEntity(_) => AemCommandType::LOCK_ENTITY,
            QueryEntityAvailable(_) => AemCommandType::ENTITY_AVAILABLE,
            QueryControllerAvailable(_) => AemCommandType::CONTROLLER_AVAILABLE,
            RegisterUnsolicitedNotifications(_) => {
                AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION
            }
            DeregisterUnsolicitedNotifications(_) => {
                AemCommandType::DEREGISTER_UNSOLICITED_NOTIFICATION
            }
            ReadDescriptor(_) => AemCommandType::READ_DESCRIPTOR,
            SetConfiguration(_) => AemCommandType::SET_CONFIGURATION,
            GetConfiguration(_) => AemCommandType::GET_CONFIGURATION,
            SetStreamInputFormat(_) | SetStreamOutputFormat(_) => AemCommandType::SET_STREAM_FORMAT,
            GetStreamInputFormat(_) | GetStreamOutputFormat(_) => AemCommandType::GET_STREAM_FORMAT,
            SetStreamInputInfo(_) | SetStreamOutputInfo(_) => AemCommandType::SET_STREAM_INFO,
            GetStreamInputInfo(_) | GetStreamOutputInfo(_) => AemCommandType::GET_STREAM_INFO,
            SetEntityName(_) | SetEntityGroupName(_) | SetConfigurationName(_) => {
                AemCommandType::SET_NAME
            }
            GetEntityName(_) | GetEntityGroupName(_) | GetConfigurationName(_) => {
                AemCommandType::GET_NAME
            }
            SetSamplingRate(_) => AemCommandType::SET_SAMPLING_RATE,
            GetSamplingRate(_) => AemCommandType::GET_SAMPLING_RATE,
            SetClockSource(_) => AemCommandType::SET_CLOCK_SOURCE,
            GetClockSource(_) => AemCommandType::GET_CLOCK_SOURCE,
            StartStreamInput(_) | StartStreamOutput(_) => AemCommandType::START_STREAMING,
            StopStreamInput(_) | StopStreamOutput(_) => AemCommandType::STOP_STREAMING,
            GetAvbInfo(_) => AemCommandType::GET_AVB_INFO,
            GetAsPath(_) => AemCommandType::GET_AS_PATH,
            GetCounters(_) => AemCommandType::GET_COUNTERS,
            GetStreamInputAudioMap(_) | GetStreamOutputAudioMap(_) => AemCommandType::GET_AUDIO_MAP,
            AddStreamInputAudioMappings(_) | AddStreamOutputAudioMappings(_) => {
                AemCommandType::ADD_AUDIO_MAPPINGS
            }
            RemoveStreamInputAudioMappings(_) | RemoveStreamOutputAudioMappings(_) => {
                AemCommandType::REMOVE_AUDIO_MAPPINGS
            }
            StartOperation(_) => AemCommandType::START_OPERATION,
            AbortOperation(_) => AemCommandType::ABORT_OPERATION,
            SetMemoryObjectLength(_) => AemCommandType::SET_MEMORY_OBJECT_LENGTH,
            GetMemoryObjectLength(_) => AemCommandType::GET_MEMORY_OBJECT_LENGTH,
        }
    }

    /// Invoke with default-initialized payload fields (error path).
    pub fn deliver_error(self, target: UniqueIdentifier, status: AemCommandStatus) {
        use AemHandler::*;
        match self {
            AcquireEntity(cb) | ReleaseEntity(cb) | LockEntity(cb) | UnlockEntity(cb) => {
                cb(target, status, UniqueIdentifier::NULL, DescriptorType::Invalid, 0);
            }
            QueryEntityAvailable(cb)
            | QueryControllerAvailable(cb)
            | RegisterUnsolicitedNotifications(cb)
            | DeregisterUnsolicitedNotifications(cb)
            | SetEntityName(cb)
            | SetEntityGroupName(cb) => cb(target, status),
            ReadDescriptor(handler) => handler.deliver_error(target, status),
            SetConfiguration(cb) | GetConfiguration(cb) | SetConfigurationName(cb) => {
                cb(target, status, 0);
            }
            SetStreamInputFormat(cb)
            | SetStreamOutputFormat(cb)
            | GetStreamInputFormat(cb)
            | GetStreamOutputFormat(cb) => cb(target, status, 0, StreamFormat::default()),
            SetStreamInputInfo(cb)
            | SetStreamOutputInfo(cb)
            | GetStreamInputInfo(cb)
            | GetStreamOutputInfo(cb) => cb(target, status, 0, StreamInfo::default()),
            GetEntityName(cb) | GetEntityGroupName(cb) => {
                cb(target, status, AvdeccFixedString::default());
            }
            GetConfigurationName(cb) => cb(target, status, 0, AvdeccFixedString::default()),
            SetSamplingRate(cb) | GetSamplingRate(cb) => {
                cb(target, status, DescriptorType::Invalid, 0, SamplingRate::default());
            }
            SetClockSource(cb) | GetClockSource(cb) => {
                cb(target, status, DescriptorType::Invalid, 0, 0);
            }
            StartStreamInput(cb) | StartStreamOutput(cb) | StopStreamInput(cb)
            | StopStreamOutput(cb) => cb(target, status, 0),
            GetAvbInfo(cb) => cb(target, status, 0, AvbInfo::default()),
            GetAsPath(cb) => cb(target, status, 0, AsPath::default()),
            GetCounters(cb) => {
                cb(target, status, DescriptorType::Invalid, 0, EntityCounters::default());
            }
            GetStreamInputAudioMap(cb) | GetStreamOutputAudioMap(cb) => {
                cb(target, status, 0, 0, 0, Vec::new());
            }
            AddStreamInputAudioMappings(cb)
            | AddStreamOutputAudioMappings(cb)
            | RemoveStreamInputAudioMappings(cb)
            | RemoveStreamOutputAudioMappings(cb) => cb(target, status, 0, Vec::new()),
            StartOperation(cb) => cb(target, status, DescriptorType::Invalid, 0, 0, 0),
            AbortOperation(cb) => cb(target, status, DescriptorType::Invalid, 0, 0),
            SetMemoryObjectLength(cb) | GetMemoryObjectLength(cb) => cb(target, status, 0, 0, 0),
        }
    }
}

/// One handler per in-flight AECP command, tagged by family.
pub enum AecpHandler {
    Aem(AemHandler),
    Aa(AddressAccessHandler),
    Mvu(MilanInfoHandler),
}

impl AecpHandler {
    /// Invoke with default payload and the family's rendering of `status`
    /// (error path). `status` names the library-side outcome.
    pub fn deliver_error(self, target: UniqueIdentifier, status: LocalFailure) {
        match self {
            AecpHandler::Aem(handler) => handler.deliver_error(target, status.as_aem()),
            AecpHandler::Aa(cb) => cb(target, status.as_aa(), Vec::new()),
            AecpHandler::Mvu(cb) => cb(target, status.as_mvu(), MilanInfo::default()),
        }
    }
}

/// Library-side failure, mapped into each family's status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFailure {
    NetworkError,
    ProtocolError,
    TimedOut,
    UnknownEntity,
    InternalError,
}

impl LocalFailure {
    #[must_use]
    pub fn as_aem(self) -> AemCommandStatus {
        match self {
            LocalFailure::NetworkError => AemCommandStatus::NetworkError,
            LocalFailure::ProtocolError => AemCommandStatus::ProtocolError,
            LocalFailure::TimedOut => AemCommandStatus::TimedOut,
            LocalFailure::UnknownEntity => AemCommandStatus::UnknownEntity,
            LocalFailure::InternalError => AemCommandStatus::InternalError,
        }
    }

    #[must_use]
    pub fn as_aa(self) -> AaCommandStatus {
        match self {
            LocalFailure::NetworkError => AaCommandStatus::NetworkError,
            LocalFailure::ProtocolError => AaCommandStatus::ProtocolError,
            LocalFailure::TimedOut => AaCommandStatus::TimedOut,
            LocalFailure::UnknownEntity => AaCommandStatus::UnknownEntity,
            LocalFailure::InternalError => AaCommandStatus::InternalError,
        }
    }

    #[must_use]
    pub fn as_mvu(self) -> MvuCommandStatus {
        match self {
            LocalFailure::NetworkError => MvuCommandStatus::NetworkError,
            LocalFailure::ProtocolError => MvuCommandStatus::ProtocolError,
            LocalFailure::TimedOut => MvuCommandStatus::TimedOut,
            LocalFailure::UnknownEntity => MvuCommandStatus::UnknownEntity,
            LocalFailure::InternalError => MvuCommandStatus::InternalError,
        }
    }

    #[must_use]
    pub fn as_control(self) -> ControlStatus {
        match self {
            LocalFailure::NetworkError => ControlStatus::NetworkError,
            LocalFailure::ProtocolError => ControlStatus::ProtocolError,
            LocalFailure::TimedOut => ControlStatus::TimedOut,
            LocalFailure::UnknownEntity => ControlStatus::UnknownEntity,
            LocalFailure::InternalError => ControlStatus::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn expected_command_type_mapping() {
        let handler = AemHandler::AcquireEntity(Box::new(|_, _, _, _, _| {}));
        assert_eq!(handler.expected_command_type(), AemCommandType::ACQUIRE_ENTITY);
        let handler = AemHandler::GetStreamOutputFormat(Box::new(|_, _, _, _| {}));
        assert_eq!(handler.expected_command_type(), AemCommandType::GET_STREAM_FORMAT);
        let handler =
            AemHandler::ReadDescriptor(DescriptorHandler::StreamInput(Box::new(|_, _, _| {})));
        assert_eq!(handler.expected_command_type(), AemCommandType::READ_DESCRIPTOR);
    }

    #[test]
    fn error_delivery_fires_exactly_once_with_defaults() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = Arc::clone(&fired);
        let handler = AemHandler::GetStreamInputFormat(Box::new(
            move |target, status, stream_index, format| {
                assert_eq!(target, UniqueIdentifier::from(0xDEAD));
                assert_eq!(status, AemCommandStatus::TimedOut);
                assert_eq!(stream_index, 0);
                assert_eq!(format, StreamFormat::default());
                fired_clone.fetch_add(1, Ordering::Relaxed);
            },
        ));
        handler.deliver_error(UniqueIdentifier::from(0xDEAD), AemCommandStatus::TimedOut);
        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn descriptor_handler_expectations() {
        let handler = DescriptorHandler::ClockDomain(Box::new(|_, _, _| {}));
        assert_eq!(handler.expected_descriptor_type(), DescriptorType::ClockDomain);
        let handler = DescriptorHandler::Entity(Box::new(|_, status, descriptor| {
            assert_eq!(status, AemCommandStatus::UnknownEntity);
            assert_eq!(descriptor, EntityDescriptor::default());
        }));
        handler.deliver_error(UniqueIdentifier::NULL, AemCommandStatus::UnknownEntity);
    }
}
