// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity-model data types (IEEE 1722.1-2013 Clause 6 and 7).
//!
//! Pure data: identifiers, capability bitsets, descriptor addressing and the
//! structs carried by ADP advertisements and AEM payloads. The wire encoding
//! of these types lives in [`crate::protocol`].

mod descriptors;

pub use descriptors::*;

use std::collections::HashMap;
use std::fmt;

/// 64-bit entity identifier (EID). Clause 6.2.1.8.
///
/// The all-zero value is the protocol's null sentinel, used as a wildcard in
/// ENTITY_DISCOVER and as "no owner" in ACQUIRE_ENTITY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UniqueIdentifier(u64);

impl UniqueIdentifier {
    /// The null (wildcard / no-entity) identifier.
    pub const NULL: UniqueIdentifier = UniqueIdentifier(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        !self.is_null()
    }
}

impl From<u64> for UniqueIdentifier {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Ethernet MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    #[must_use]
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    /// A usable unicast/multicast address: anything but all-zero.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 != [0; 6]
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// 64-byte NUL-padded UTF-8 string (Clause 7.2.1.1).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AvdeccFixedString([u8; 64]);

impl AvdeccFixedString {
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 64])
    }

    /// Builds from a str, truncating to 64 bytes on a char boundary.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        let mut buf = [0u8; 64];
        let mut end = s.len().min(64);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        buf[..end].copy_from_slice(&s.as_bytes()[..end]);
        Self(buf)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Lossy view up to the first NUL.
    #[must_use]
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(64);
        String::from_utf8_lossy(&self.0[..end])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl Default for AvdeccFixedString {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for AvdeccFixedString {
    fn from(s: &str) -> Self {
        Self::from_str_lossy(s)
    }
}

impl fmt::Debug for AvdeccFixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for AvdeccFixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a capability bitset newtype with named flags.
///
/// Flag values follow IEEE 1722.1-2013; the raw value is kept so unknown bits
/// survive a decode/encode round trip.
macro_rules! impl_bitset {
    ($(#[$doc:meta])* $name:ident, $repr:ty, { $($(#[$fdoc:meta])* $flag:ident = $value:expr;)* }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $repr);

        impl $name {
            pub const NONE: $name = $name(0);
            $( $(#[$fdoc])* pub const $flag: $name = $name($value); )*

            #[must_use]
            pub const fn value(self) -> $repr {
                self.0
            }

            #[must_use]
            pub const fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            #[must_use]
            pub const fn union(self, other: $name) -> $name {
                $name(self.0 | other.0)
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }
    };
}

impl_bitset!(
    /// ADP entity_capabilities (Clause 6.2.1.10).
    EntityCapabilities, u32, {
        EFU_MODE = 0x0000_0001;
        ADDRESS_ACCESS_SUPPORTED = 0x0000_0002;
        GATEWAY_ENTITY = 0x0000_0004;
        AEM_SUPPORTED = 0x0000_0008;
        LEGACY_AVC = 0x0000_0010;
        ASSOCIATION_ID_SUPPORTED = 0x0000_0020;
        ASSOCIATION_ID_VALID = 0x0000_0040;
        VENDOR_UNIQUE_SUPPORTED = 0x0000_0080;
        CLASS_A_SUPPORTED = 0x0000_0100;
        CLASS_B_SUPPORTED = 0x0000_0200;
        GPTP_SUPPORTED = 0x0000_0400;
        AEM_AUTHENTICATION_SUPPORTED = 0x0000_0800;
        AEM_AUTHENTICATION_REQUIRED = 0x0000_1000;
        AEM_PERSISTENT_ACQUIRE_SUPPORTED = 0x0000_2000;
        AEM_IDENTIFY_CONTROL_INDEX_VALID = 0x0000_4000;
        AEM_INTERFACE_INDEX_VALID = 0x0000_8000;
        GENERAL_CONTROLLER_IGNORE = 0x0001_0000;
        ENTITY_NOT_READY = 0x0002_0000;
    }
);

impl_bitset!(
    /// ADP talker_capabilities (Clause 6.2.1.12).
    TalkerCapabilities, u16, {
        IMPLEMENTED = 0x0001;
        OTHER_SOURCE = 0x0200;
        CONTROL_SOURCE = 0x0400;
        MEDIA_CLOCK_SOURCE = 0x0800;
        SMPTE_SOURCE = 0x1000;
        MIDI_SOURCE = 0x2000;
        AUDIO_SOURCE = 0x4000;
        VIDEO_SOURCE = 0x8000;
    }
);

impl_bitset!(
    /// ADP listener_capabilities (Clause 6.2.1.14).
    ListenerCapabilities, u16, {
        IMPLEMENTED = 0x0001;
        OTHER_SINK = 0x0200;
        CONTROL_SINK = 0x0400;
        MEDIA_CLOCK_SINK = 0x0800;
        SMPTE_SINK = 0x1000;
        MIDI_SINK = 0x2000;
        AUDIO_SINK = 0x4000;
        VIDEO_SINK = 0x8000;
    }
);

impl_bitset!(
    /// ADP controller_capabilities (Clause 6.2.1.15).
    ControllerCapabilities, u32, {
        IMPLEMENTED = 0x0000_0001;
    }
);

impl_bitset!(
    /// ACMP flags (Clause 8.2.1.17).
    ConnectionFlags, u16, {
        CLASS_B = 0x0001;
        FAST_CONNECT = 0x0002;
        SAVED_STATE = 0x0004;
        STREAMING_WAIT = 0x0008;
        SUPPORTS_ENCRYPTED = 0x0010;
        ENCRYPTED_PDU = 0x0020;
        TALKER_FAILED = 0x0040;
    }
);

impl_bitset!(
    /// STREAM_INFO flags (Clause 7.4.15.1).
    StreamInfoFlags, u32, {
        CLASS_B = 0x0000_0001;
        FAST_CONNECT = 0x0000_0002;
        SAVED_STATE = 0x0000_0004;
        STREAMING_WAIT = 0x0000_0008;
        SUPPORTS_ENCRYPTED = 0x0000_0010;
        ENCRYPTED_PDU = 0x0000_0020;
        TALKER_FAILED = 0x0000_0040;
        STREAM_VLAN_ID_VALID = 0x0200_0000;
        CONNECTED = 0x0400_0000;
        MSRP_FAILURE_VALID = 0x0800_0000;
        STREAM_DEST_MAC_VALID = 0x1000_0000;
        MSRP_ACC_LAT_VALID = 0x2000_0000;
        STREAM_ID_VALID = 0x4000_0000;
        STREAM_FORMAT_VALID = 0x8000_0000;
    }
);

impl_bitset!(
    /// GET_AVB_INFO flags (Clause 7.4.40.2).
    AvbInfoFlags, u8, {
        AS_CAPABLE = 0x01;
        GPTP_ENABLED = 0x02;
        SRP_ENABLED = 0x04;
    }
);

impl_bitset!(
    /// Milan GET_MILAN_INFO features flags (Milan v1.2 Clause 7.4.1).
    MilanFeaturesFlags, u32, {
        REDUNDANCY = 0x0000_0001;
    }
);

/// Descriptor type (Clause 7.2, Table 7.1). Only the types a pure audio
/// controller addresses are modeled; the wire value space is preserved by
/// `from_u16` returning `None` for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DescriptorType {
    Entity = 0x0000,
    Configuration = 0x0001,
    AudioUnit = 0x0002,
    StreamInput = 0x0005,
    StreamOutput = 0x0006,
    JackInput = 0x0007,
    JackOutput = 0x0008,
    AvbInterface = 0x0009,
    ClockSource = 0x000A,
    MemoryObject = 0x000B,
    Locale = 0x000C,
    Strings = 0x000D,
    StreamPortInput = 0x000E,
    StreamPortOutput = 0x000F,
    ExternalPortInput = 0x0010,
    ExternalPortOutput = 0x0011,
    InternalPortInput = 0x0012,
    InternalPortOutput = 0x0013,
    AudioCluster = 0x0014,
    AudioMap = 0x0017,
    ClockDomain = 0x0024,
    Invalid = 0xFFFF,
}

impl DescriptorType {
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        use DescriptorType::*;
        Some(match value {
            0x0000 => Entity,
            0x0001 => Configuration,
            0x0002 => AudioUnit,
            0x0005 => StreamInput,
            0x0006 => StreamOutput,
            0x0007 => JackInput,
            0x0008 => JackOutput,
            0x0009 => AvbInterface,
            0x000A => ClockSource,
            0x000B => MemoryObject,
            0x000C => Locale,
            0x000D => Strings,
            0x000E => StreamPortInput,
            0x000F => StreamPortOutput,
            0x0010 => ExternalPortInput,
            0x0011 => ExternalPortOutput,
            0x0012 => InternalPortInput,
            0x0013 => InternalPortOutput,
            0x0014 => AudioCluster,
            0x0017 => AudioMap,
            0x0024 => ClockDomain,
            0xFFFF => Invalid,
            _ => return None,
        })
    }
}

/// Index of a descriptor within its type (Clause 7.2).
pub type DescriptorIndex = u16;
/// Index of a CONFIGURATION descriptor.
pub type ConfigurationIndex = u16;
/// Index of a STREAM_INPUT / STREAM_OUTPUT descriptor.
pub type StreamIndex = u16;
/// Index of an AVB_INTERFACE descriptor.
pub type AvbInterfaceIndex = u16;
/// Index of a CLOCK_SOURCE descriptor.
pub type ClockSourceIndex = u16;
/// Audio-map pagination index (Clause 7.4.44).
pub type MapIndex = u16;
/// In-progress operation identifier (Clause 7.4.53).
pub type OperationId = u16;

/// 64-bit stream format word (IEEE 1722.1-2013 Annex I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamFormat(pub u64);

impl StreamFormat {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for StreamFormat {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Packed sampling rate: pull(3) | base_frequency(29) (Clause 7.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplingRate(pub u32);

impl SamplingRate {
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for SamplingRate {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// One channel-mapping entry (Clause 7.2.19.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioMapping {
    pub stream_index: StreamIndex,
    pub stream_channel: u16,
    pub cluster_offset: u16,
    pub cluster_channel: u16,
}

/// GET_STREAM_INFO dynamic state (Clause 7.4.16.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamInfo {
    pub flags: StreamInfoFlags,
    pub stream_format: StreamFormat,
    pub stream_id: UniqueIdentifier,
    pub msrp_accumulated_latency: u32,
    pub stream_dest_mac: MacAddr,
    pub msrp_failure_code: u8,
    pub msrp_failure_bridge_id: u64,
    pub stream_vlan_id: u16,
}

/// One SRP domain/class mapping in GET_AVB_INFO (Clause 7.4.40.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsrpMapping {
    pub traffic_class: u8,
    pub priority: u8,
    pub vlan_id: u16,
}

/// GET_AVB_INFO dynamic state (Clause 7.4.40.2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvbInfo {
    pub gptp_grandmaster_id: UniqueIdentifier,
    pub propagation_delay: u32,
    pub gptp_domain_number: u8,
    pub flags: AvbInfoFlags,
    pub mappings: Vec<MsrpMapping>,
}

/// GET_AS_PATH response body (Clause 7.4.41.2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsPath {
    pub sequence: Vec<UniqueIdentifier>,
}

/// GET_COUNTERS response block (Clause 7.4.42.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCounters {
    /// Bit N set means `counters[N]` is meaningful for this descriptor.
    pub valid: u32,
    pub counters: [u32; 32],
}

impl Default for EntityCounters {
    fn default() -> Self {
        Self { valid: 0, counters: [0; 32] }
    }
}

/// GET_MILAN_INFO response body (Milan v1.2 Clause 7.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MilanInfo {
    pub protocol_version: u32,
    pub features: MilanFeaturesFlags,
    pub certification_version: u32,
}

/// A stream endpoint: talker source or listener sink (Clause 8.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamIdentification {
    pub entity_id: UniqueIdentifier,
    pub stream_index: StreamIndex,
}

impl StreamIdentification {
    #[must_use]
    pub const fn new(entity_id: UniqueIdentifier, stream_index: StreamIndex) -> Self {
        Self { entity_id, stream_index }
    }
}

/// Sentinel interface index for entities that do not advertise
/// AEM_INTERFACE_INDEX_VALID: all their ADPDUs count as one logical interface.
pub const GLOBAL_AVB_INTERFACE_INDEX: AvbInterfaceIndex = 0xFFFF;

/// Fields common to every ADPDU of an entity, regardless of the interface the
/// advertisement arrived on (Clause 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityCommonInformation {
    pub entity_id: UniqueIdentifier,
    pub entity_model_id: UniqueIdentifier,
    pub entity_capabilities: EntityCapabilities,
    pub talker_stream_sources: u16,
    pub talker_capabilities: TalkerCapabilities,
    pub listener_stream_sinks: u16,
    pub listener_capabilities: ListenerCapabilities,
    pub controller_capabilities: ControllerCapabilities,
    pub identify_control_index: Option<DescriptorIndex>,
    pub association_id: Option<UniqueIdentifier>,
}

/// Per-AVB-interface advertisement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityInterfaceInformation {
    pub mac_address: MacAddr,
    /// Advertised validity, in 2-second units (Clause 6.2.1.6).
    pub valid_time: u8,
    pub available_index: u32,
    pub gptp_grandmaster_id: Option<UniqueIdentifier>,
    pub gptp_domain_number: Option<u8>,
}

/// A discovered entity: common ADP fields plus one record per AVB interface
/// it advertises on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub common: EntityCommonInformation,
    pub interfaces: HashMap<AvbInterfaceIndex, EntityInterfaceInformation>,
}

impl Entity {
    #[must_use]
    pub fn new(
        common: EntityCommonInformation,
        interface_index: AvbInterfaceIndex,
        interface: EntityInterfaceInformation,
    ) -> Self {
        let mut interfaces = HashMap::new();
        interfaces.insert(interface_index, interface);
        Self { common, interfaces }
    }

    #[must_use]
    pub fn entity_id(&self) -> UniqueIdentifier {
        self.common.entity_id
    }

    /// Any MAC address the entity is reachable at. Invalid when the entity has
    /// no interface left.
    #[must_use]
    pub fn any_mac_address(&self) -> MacAddr {
        self.interfaces
            .values()
            .map(|itf| itf.mac_address)
            .find(|mac| mac.is_valid())
            .unwrap_or(MacAddr::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eid_null_sentinel() {
        assert!(UniqueIdentifier::NULL.is_null());
        assert!(!UniqueIdentifier::NULL.is_valid());
        assert!(UniqueIdentifier::from(0x0102_0304_0506_0708).is_valid());
        assert_eq!(
            UniqueIdentifier::from(0x0102_0304_0506_0708).to_string(),
            "0x0102030405060708"
        );
    }

    #[test]
    fn mac_validity_and_display() {
        assert!(!MacAddr::ZERO.is_valid());
        let mac = MacAddr::new([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x00]);
        assert!(mac.is_valid());
        assert_eq!(mac.to_string(), "91:e0:f0:01:00:00");
    }

    #[test]
    fn fixed_string_truncates_on_char_boundary() {
        let long = "é".repeat(40); // 80 bytes of 2-byte chars
        let s = AvdeccFixedString::from_str_lossy(&long);
        assert_eq!(s.as_str().chars().count(), 32);

        let short = AvdeccFixedString::from("Studio-A");
        assert_eq!(short.as_str(), "Studio-A");
        assert!(!short.is_empty());
        assert!(AvdeccFixedString::new().is_empty());
    }

    #[test]
    fn capability_flags_compose() {
        let caps = EntityCapabilities::AEM_SUPPORTED.union(EntityCapabilities::GPTP_SUPPORTED);
        assert!(caps.contains(EntityCapabilities::AEM_SUPPORTED));
        assert!(caps.contains(EntityCapabilities::GPTP_SUPPORTED));
        assert!(!caps.contains(EntityCapabilities::ENTITY_NOT_READY));
        assert_eq!(caps.value(), 0x0000_0408);
    }

    #[test]
    fn descriptor_type_wire_mapping() {
        assert_eq!(DescriptorType::from_u16(0x0005), Some(DescriptorType::StreamInput));
        assert_eq!(DescriptorType::from_u16(0x0024), Some(DescriptorType::ClockDomain));
        assert_eq!(DescriptorType::from_u16(0x0003), None); // VIDEO_UNIT not modeled
        assert_eq!(DescriptorType::StreamOutput as u16, 0x0006);
    }

    #[test]
    fn entity_any_mac_skips_invalid() {
        let mut entity = Entity::new(
            EntityCommonInformation::default(),
            0,
            EntityInterfaceInformation { mac_address: MacAddr::ZERO, ..Default::default() },
        );
        assert!(!entity.any_mac_address().is_valid());

        entity.interfaces.insert(
            1,
            EntityInterfaceInformation {
                mac_address: MacAddr::new([2, 0, 0, 0, 0, 7]),
                ..Default::default()
            },
        );
        assert_eq!(entity.any_mac_address(), MacAddr::new([2, 0, 0, 0, 0, 7]));
    }
}
