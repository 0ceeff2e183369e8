// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-family command outcome enums.
//!
//! Each extends the wire status space (5-bit codes the device sent) with
//! library-side outcomes: the target was never in the registry, the command
//! timed out, the response failed to decode, or the engine itself is at
//! fault. A handler is invoked with exactly one of these.

use crate::protocol::acmpdu::acmp_status;
use crate::protocol::aecpdu::{aa_status, aecp_status, aem_status};

/// Generate `from_wire` plus the shared library-side variants.
macro_rules! impl_library_status {
    ($name:ident) => {
        impl $name {
            /// True for the protocol SUCCESS code only.
            #[must_use]
            pub fn is_success(self) -> bool {
                matches!(self, $name::Success)
            }

            /// True when the failure came from this library rather than the
            /// device (timeout, codec failure, unknown target, ...).
            #[must_use]
            pub fn failed_locally(self) -> bool {
                matches!(
                    self,
                    $name::NetworkError
                        | $name::ProtocolError
                        | $name::TimedOut
                        | $name::UnknownEntity
                        | $name::InternalError
                )
            }
        }
    };
}

/// Outcome of an AEM command (wire codes per Clause 7.4 Table 7.126).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AemCommandStatus {
    Success,
    NotImplemented,
    NoSuchDescriptor,
    EntityLocked,
    EntityAcquired,
    NotAuthenticated,
    AuthenticationDisabled,
    BadArguments,
    NoResources,
    InProgress,
    EntityMisbehaving,
    NotSupported,
    StreamIsRunning,
    /// A wire code this library does not name.
    Reserved(u8),
    // -- library-side outcomes --
    /// The transport refused the frame.
    NetworkError,
    /// The response failed to decode.
    ProtocolError,
    /// No response before the deadline, after retries.
    TimedOut,
    /// Target entity not in the registry; nothing was sent.
    UnknownEntity,
    /// Implementation bug, please report the issue.
    InternalError,
}

impl AemCommandStatus {
    #[must_use]
    pub fn from_wire(status: u8) -> Self {
        match status {
            aecp_status::SUCCESS => Self::Success,
            aecp_status::NOT_IMPLEMENTED => Self::NotImplemented,
            aem_status::NO_SUCH_DESCRIPTOR => Self::NoSuchDescriptor,
            aem_status::ENTITY_LOCKED => Self::EntityLocked,
            aem_status::ENTITY_ACQUIRED => Self::EntityAcquired,
            aem_status::NOT_AUTHENTICATED => Self::NotAuthenticated,
            aem_status::AUTHENTICATION_DISABLED => Self::AuthenticationDisabled,
            aem_status::BAD_ARGUMENTS => Self::BadArguments,
            aem_status::NO_RESOURCES => Self::NoResources,
            aem_status::IN_PROGRESS => Self::InProgress,
            aem_status::ENTITY_MISBEHAVING => Self::EntityMisbehaving,
            aem_status::NOT_SUPPORTED => Self::NotSupported,
            aem_status::STREAM_IS_RUNNING => Self::StreamIsRunning,
            other => Self::Reserved(other),
        }
    }
}

impl_library_status!(AemCommandStatus);

/// Outcome of an Address Access command (wire codes per Clause 9.2.1.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AaCommandStatus {
    Success,
    NotImplemented,
    AddressTooLow,
    AddressTooHigh,
    AddressInvalid,
    TlvInvalid,
    DataInvalid,
    Unsupported,
    Reserved(u8),
    // -- library-side outcomes --
    NetworkError,
    ProtocolError,
    TimedOut,
    UnknownEntity,
    InternalError,
}

impl AaCommandStatus {
    #[must_use]
    pub fn from_wire(status: u8) -> Self {
        match status {
            aecp_status::SUCCESS => Self::Success,
            aecp_status::NOT_IMPLEMENTED => Self::NotImplemented,
            aa_status::ADDRESS_TOO_LOW => Self::AddressTooLow,
            aa_status::ADDRESS_TOO_HIGH => Self::AddressTooHigh,
            aa_status::ADDRESS_INVALID => Self::AddressInvalid,
            aa_status::TLV_INVALID => Self::TlvInvalid,
            aa_status::DATA_INVALID => Self::DataInvalid,
            aa_status::UNSUPPORTED => Self::Unsupported,
            other => Self::Reserved(other),
        }
    }
}

impl_library_status!(AaCommandStatus);

/// Outcome of a Milan vendor-unique command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MvuCommandStatus {
    Success,
    NotImplemented,
    Reserved(u8),
    // -- library-side outcomes --
    NetworkError,
    ProtocolError,
    TimedOut,
    UnknownEntity,
    InternalError,
}

impl MvuCommandStatus {
    #[must_use]
    pub fn from_wire(status: u8) -> Self {
        match status {
            aecp_status::SUCCESS => Self::Success,
            aecp_status::NOT_IMPLEMENTED => Self::NotImplemented,
            other => Self::Reserved(other),
        }
    }
}

impl_library_status!(MvuCommandStatus);

/// Outcome of an ACMP command (wire codes per Clause 8.2.1.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    Success,
    ListenerUnknownId,
    TalkerUnknownId,
    TalkerDestMacFail,
    TalkerNoStreamIndex,
    TalkerNoBandwidth,
    TalkerExclusive,
    ListenerTalkerTimeout,
    ListenerExclusive,
    StateUnavailable,
    NotConnected,
    NoSuchConnection,
    CouldNotSendMessage,
    TalkerMisbehaving,
    ListenerMisbehaving,
    ControllerNotAuthorized,
    IncompatibleRequest,
    NotSupported,
    Reserved(u8),
    // -- library-side outcomes --
    NetworkError,
    ProtocolError,
    TimedOut,
    UnknownEntity,
    InternalError,
}

impl ControlStatus {
    #[must_use]
    pub fn from_wire(status: u8) -> Self {
        match status {
            acmp_status::SUCCESS => Self::Success,
            acmp_status::LISTENER_UNKNOWN_ID => Self::ListenerUnknownId,
            acmp_status::TALKER_UNKNOWN_ID => Self::TalkerUnknownId,
            acmp_status::TALKER_DEST_MAC_FAIL => Self::TalkerDestMacFail,
            acmp_status::TALKER_NO_STREAM_INDEX => Self::TalkerNoStreamIndex,
            acmp_status::TALKER_NO_BANDWIDTH => Self::TalkerNoBandwidth,
            acmp_status::TALKER_EXCLUSIVE => Self::TalkerExclusive,
            acmp_status::LISTENER_TALKER_TIMEOUT => Self::ListenerTalkerTimeout,
            acmp_status::LISTENER_EXCLUSIVE => Self::ListenerExclusive,
            acmp_status::STATE_UNAVAILABLE => Self::StateUnavailable,
            acmp_status::NOT_CONNECTED => Self::NotConnected,
            acmp_status::NO_SUCH_CONNECTION => Self::NoSuchConnection,
            acmp_status::COULD_NOT_SEND_MESSAGE => Self::CouldNotSendMessage,
            acmp_status::TALKER_MISBEHAVING => Self::TalkerMisbehaving,
            acmp_status::LISTENER_MISBEHAVING => Self::ListenerMisbehaving,
            acmp_status::CONTROLLER_NOT_AUTHORIZED => Self::ControllerNotAuthorized,
            acmp_status::INCOMPATIBLE_REQUEST => Self::IncompatibleRequest,
            acmp_status::NOT_SUPPORTED => Self::NotSupported,
            other => Self::Reserved(other),
        }
    }
}

impl_library_status!(ControlStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_conversion_covers_named_codes() {
        assert_eq!(AemCommandStatus::from_wire(0), AemCommandStatus::Success);
        assert_eq!(AemCommandStatus::from_wire(4), AemCommandStatus::EntityAcquired);
        assert_eq!(AemCommandStatus::from_wire(9), AemCommandStatus::InProgress);
        assert_eq!(AemCommandStatus::from_wire(27), AemCommandStatus::Reserved(27));
        assert_eq!(ControlStatus::from_wire(8), ControlStatus::ListenerExclusive);
        assert_eq!(ControlStatus::from_wire(31), ControlStatus::NotSupported);
        assert_eq!(AaCommandStatus::from_wire(5), AaCommandStatus::TlvInvalid);
    }

    #[test]
    fn local_failures_are_not_success() {
        assert!(AemCommandStatus::Success.is_success());
        assert!(!AemCommandStatus::TimedOut.is_success());
        assert!(AemCommandStatus::TimedOut.failed_locally());
        assert!(!AemCommandStatus::EntityAcquired.failed_locally());
        assert!(MvuCommandStatus::UnknownEntity.failed_locally());
    }
}
