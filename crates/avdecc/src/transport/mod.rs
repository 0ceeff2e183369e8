// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport abstraction.
//!
//! The engine never touches sockets: it talks to a [`ProtocolInterface`],
//! which owns the NIC (or, for the in-process [`VirtualBus`], a crossbeam
//! channel), parses inbound frames via [`crate::protocol::parse_frame`] and
//! delivers [`Pdu`]s to the registered [`PduObserver`] on its receive thread.
//!
//! Observer callbacks run on the transport's receive thread. Implementations
//! of [`PduObserver`] must not block there.

mod virt;

pub use virt::{VirtualBus, VirtualInterface};

use crate::model::MacAddr;
use crate::protocol::{Acmpdu, Adpdu, Aecpdu, Pdu};
use crate::Result;
use std::sync::Arc;

/// Seam to the raw L2 transport (native socket, pcap, or the in-process bus).
pub trait ProtocolInterface: Send + Sync {
    /// MAC address frames are sent from.
    fn mac_address(&self) -> MacAddr;

    /// Encode and transmit an ADPDU.
    fn send_adpdu(&self, pdu: &Adpdu) -> Result<()>;

    /// Encode and transmit an AECPDU.
    fn send_aecpdu(&self, pdu: &Aecpdu) -> Result<()>;

    /// Encode and transmit an ACMPDU.
    fn send_acmpdu(&self, pdu: &Acmpdu) -> Result<()>;

    /// Register the single observer inbound PDUs are delivered to. Replaces
    /// any previous observer.
    fn set_observer(&self, observer: Arc<dyn PduObserver>);

    /// Stop receive machinery. Sends fail with [`crate::Error::Shutdown`]
    /// afterwards. Idempotent.
    fn shutdown(&self);
}

/// Receiver for parsed inbound PDUs.
pub trait PduObserver: Send + Sync {
    /// A PDU addressed to this station (unicast to our MAC or AVDECC
    /// multicast) arrived.
    fn on_pdu(&self, pdu: Pdu);

    /// The transport failed irrecoverably.
    fn on_transport_error(&self) {}
}
