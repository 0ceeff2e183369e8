// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The controller capability engine.
//!
//! One `Engine` binds a controller EID to a transport interface: it issues
//! commands (recording them in the in-flight table), consumes every inbound
//! PDU from the transport observer seam, and drives the registry, the typed
//! router and the delegate.
//!
//! Threading: facade calls arrive on caller threads, `on_pdu` on the
//! transport receive thread, and `scan` on the timeout-scanner thread. The
//! registry RwLock, the DashMap-backed in-flight table and the delegate
//! RwLock are the only shared state.

use super::inflight::{AecpTimeout, InflightAcmp, InflightAecp, InflightTable};
use super::registry::{EntityRegistry, ExpiryEvent, RegistryAction};
use super::router;
use crate::config::{self, ProtocolTolerance};
use crate::controller::delegate::ControllerDelegate;
use crate::controller::handlers::{
    AcmpResponseHandler, AecpHandler, AemHandler, LocalFailure, MilanInfoHandler,
};
use crate::controller::status::ControlStatus;
use crate::model::{ConnectionFlags, EntityCapabilities, StreamIndex, UniqueIdentifier};
use crate::protocol::aecpdu::{
    aecp_status, aem_status, AaTlv, AecpCommon, AecpMessageType, AemAecpdu, AemCommandType,
    MvuAecpdu, MvuCommandType,
};
use crate::protocol::{AcmpMessageType, Acmpdu, Adpdu, AdpMessageType, Aecpdu, Pdu};
use crate::transport::{PduObserver, ProtocolInterface};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Engine counters for diagnostics.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub commands_sent: AtomicU64,
    pub responses_matched: AtomicU64,
    /// Responses whose pending entry was already gone (timed out or sniffed).
    pub responses_late: AtomicU64,
    pub timeouts: AtomicU64,
    pub retries: AtomicU64,
    pub unsolicited_rx: AtomicU64,
    /// Inbound messages dropped because their controller EID is not ours.
    pub foreign_dropped: AtomicU64,
}

impl EngineMetrics {
    /// Snapshot as (sent, matched, late, timeouts, retries, unsolicited).
    pub fn snapshot(&self) -> (u64, u64, u64, u64, u64, u64) {
        (
            self.commands_sent.load(Ordering::Relaxed),
            self.responses_matched.load(Ordering::Relaxed),
            self.responses_late.load(Ordering::Relaxed),
            self.timeouts.load(Ordering::Relaxed),
            self.retries.load(Ordering::Relaxed),
            self.unsolicited_rx.load(Ordering::Relaxed),
        )
    }
}

/// Controller-side protocol state machine. See the module docs for the
/// threading picture.
pub struct Engine {
    interface: Arc<dyn ProtocolInterface>,
    controller_id: UniqueIdentifier,
    tolerance: ProtocolTolerance,
    pub(crate) registry: EntityRegistry,
    inflight: InflightTable,
    delegate: RwLock<Option<Arc<dyn ControllerDelegate>>>,
    pub metrics: EngineMetrics,
}

impl Engine {
    pub fn new(
        interface: Arc<dyn ProtocolInterface>,
        controller_id: UniqueIdentifier,
        tolerance: ProtocolTolerance,
    ) -> Arc<Self> {
        Arc::new(Self {
            interface,
            controller_id,
            tolerance,
            registry: EntityRegistry::new(),
            inflight: InflightTable::new(),
            delegate: RwLock::new(None),
            metrics: EngineMetrics::default(),
        })
    }

    pub fn controller_id(&self) -> UniqueIdentifier {
        self.controller_id
    }

    pub fn interface(&self) -> &Arc<dyn ProtocolInterface> {
        &self.interface
    }

    pub fn tolerance(&self) -> &ProtocolTolerance {
        &self.tolerance
    }

    /// Swap the delegate. Takes the write side of the same lock every
    /// notification holds for reading, so the swap never races a running
    /// callback.
    pub fn set_delegate(&self, delegate: Option<Arc<dyn ControllerDelegate>>) {
        *self.delegate.write() = delegate;
    }

    /// Run `f` with the delegate under the read lock (if one is installed).
    fn with_delegate<R>(&self, f: impl FnOnce(&dyn ControllerDelegate) -> R) -> Option<R> {
        let guard = self.delegate.read();
        guard.as_deref().map(f)
    }

    // ======================================================================
    // Send paths (C5)
    // ======================================================================

    /// Issue an AEM command. The handler fires exactly once: with the
    /// response, with a library failure, or with `TimedOut` after the retry
    /// budget is spent.
    pub fn send_aem_command(
        &self,
        target: UniqueIdentifier,
        command_type: AemCommandType,
        payload: Vec<u8>,
        handler: AemHandler,
    ) {
        self.send_aecp(
            target,
            AecpHandler::Aem(handler),
            config::AECP_AEM_TIMEOUT,
            config::AECP_RETRIES,
            |common| {
                Aecpdu::Aem(AemAecpdu {
                    common,
                    unsolicited: false,
                    command_type,
                    payload,
                })
            },
        );
    }

    /// Issue an Address Access command (single attempt, no retry).
    pub fn send_aa_command(
        &self,
        target: UniqueIdentifier,
        tlvs: Vec<AaTlv>,
        handler: crate::controller::handlers::AddressAccessHandler,
    ) {
        self.send_aecp(
            target,
            AecpHandler::Aa(handler),
            config::AECP_AA_TIMEOUT,
            0,
            |mut common| {
                common.message_type = AecpMessageType::AddressAccessCommand;
                Aecpdu::Aa(crate::protocol::aecpdu::AaAecpdu { common, tlvs })
            },
        );
    }

    /// Issue a Milan vendor-unique command.
    pub fn send_mvu_command(
        &self,
        target: UniqueIdentifier,
        command_type: MvuCommandType,
        payload: Vec<u8>,
        handler: MilanInfoHandler,
    ) {
        self.send_aecp(
            target,
            AecpHandler::Mvu(handler),
            config::AECP_VU_TIMEOUT,
            config::AECP_RETRIES,
            |mut common| {
                common.message_type = AecpMessageType::VendorUniqueCommand;
                Aecpdu::Mvu(MvuAecpdu { common, command_type, payload })
            },
        );
    }

    fn send_aecp(
        &self,
        target: UniqueIdentifier,
        handler: AecpHandler,
        timeout: Duration,
        retries: u8,
        build: impl FnOnce(AecpCommon) -> Aecpdu,
    ) {
        // Resolve target before touching the wire
        let Some(mac) = self.registry.mac_for(target) else {
            log::debug!("[aecp] {target} is not in the registry; failing locally");
            handler.deliver_error(target, LocalFailure::UnknownEntity);
            return;
        };

        let sequence_id = self.inflight.next_aecp_sequence_id();
        let common = AecpCommon {
            dest_address: mac,
            src_address: self.interface.mac_address(),
            message_type: AecpMessageType::AemCommand,
            status: aecp_status::SUCCESS,
            target_entity_id: target,
            controller_entity_id: self.controller_id,
            sequence_id,
        };
        let pdu = build(common);

        // Record before sending so a fast response always finds its entry
        self.inflight.insert_aecp(
            target,
            sequence_id,
            InflightAecp {
                pdu: pdu.clone(),
                deadline: Instant::now() + timeout,
                retries_left: retries,
                timeout,
                handler,
            },
        );

        if let Err(err) = self.interface.send_aecpdu(&pdu) {
            log::debug!("[aecp] send to {target} failed: {err}");
            if let Some(entry) = self.inflight.take_aecp(target, sequence_id) {
                entry.handler.deliver_error(target, LocalFailure::NetworkError);
            }
            return;
        }
        self.metrics.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Issue an ACMP command on the multicast channel (single attempt; the
    /// per-message-type timeouts of Clause 8.2.2 apply).
    #[allow(clippy::too_many_arguments)]
    pub fn send_acmp_command(
        &self,
        message_type: AcmpMessageType,
        talker: UniqueIdentifier,
        talker_stream_index: StreamIndex,
        listener: UniqueIdentifier,
        listener_stream_index: StreamIndex,
        connection_count: u16,
        handler: AcmpResponseHandler,
    ) {
        let sequence_id = self.inflight.next_acmp_sequence_id();
        let pdu = Acmpdu {
            dest_address: config::AVDECC_MULTICAST_MAC,
            src_address: self.interface.mac_address(),
            message_type,
            controller_entity_id: self.controller_id,
            talker_entity_id: talker,
            talker_unique_id: talker_stream_index,
            listener_entity_id: listener,
            listener_unique_id: listener_stream_index,
            connection_count,
            sequence_id,
            ..Default::default()
        };

        self.inflight.insert_acmp(
            sequence_id,
            InflightAcmp {
                pdu: pdu.clone(),
                deadline: Instant::now() + message_type.command_timeout(),
                handler,
            },
        );

        if let Err(err) = self.interface.send_acmpdu(&pdu) {
            log::debug!("[acmp] send of {message_type:?} failed: {err}");
            if let Some(entry) = self.inflight.take_acmp_expired(sequence_id) {
                deliver_acmp_failure(entry, ControlStatus::NetworkError);
            }
            return;
        }
        self.metrics.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Targeted rediscovery of one entity (or all, with the null EID).
    pub fn discover_remote_entity(&self, target: UniqueIdentifier) -> crate::Result<()> {
        let probe = super::discovery::make_discover(&*self.interface, target);
        self.interface.send_adpdu(&probe)
    }

    // ======================================================================
    // Timeout scanning
    // ======================================================================

    /// One scanner pass: retry or expire in-flight commands, expire registry
    /// leases. Runs on the scanner thread every tick.
    pub fn scan(&self, now: Instant) {
        let (aecp_actions, acmp_expired) = self.inflight.collect_timeouts(now);
        for action in aecp_actions {
            match action {
                AecpTimeout::Retry { target, sequence_id, pdu } => {
                    self.metrics.retries.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "[inflight] command {sequence_id} to {target} timed out, trying again"
                    );
                    if let Err(err) = self.interface.send_aecpdu(&pdu) {
                        log::debug!("[inflight] retry send to {target} failed: {err}");
                        if let Some(entry) = self.inflight.take_aecp(target, sequence_id) {
                            entry.handler.deliver_error(target, LocalFailure::NetworkError);
                        }
                    }
                }
                AecpTimeout::Expired { target, sequence_id } => {
                    if let Some(entry) = self.inflight.take_aecp(target, sequence_id) {
                        self.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                        log::debug!(
                            "[inflight] command {sequence_id} to {target} timed out after retries"
                        );
                        entry.handler.deliver_error(target, LocalFailure::TimedOut);
                    }
                }
            }
        }

        for sequence_id in acmp_expired {
            if let Some(entry) = self.inflight.take_acmp_expired(sequence_id) {
                self.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                deliver_acmp_failure(entry, ControlStatus::TimedOut);
            }
        }

        for event in self.registry.expire(now) {
            match event {
                ExpiryEvent::Offline(entity_id) => {
                    log::debug!("[registry] {entity_id} lease lapsed, offline");
                    self.with_delegate(|d| d.on_entity_offline(entity_id));
                }
                ExpiryEvent::Updated(entity_id, entity) => {
                    self.with_delegate(|d| d.on_entity_updated(entity_id, &entity));
                }
            }
        }
    }

    // ======================================================================
    // Receive paths (C6 entry)
    // ======================================================================

    fn handle_adpdu(&self, adpdu: &Adpdu) {
        match adpdu.message_type {
            AdpMessageType::EntityAvailable => {
                // Local entities never enter the remote registry
                if adpdu.entity_id == self.controller_id {
                    return;
                }
                if adpdu.entity_capabilities.contains(EntityCapabilities::ENTITY_NOT_READY) {
                    return;
                }
                let (action, entity) = self.registry.upsert_advertisement(adpdu);
                match action {
                    RegistryAction::Online => {
                        log::debug!("[adp] {} online", adpdu.entity_id);
                        self.with_delegate(|d| d.on_entity_online(adpdu.entity_id, &entity));
                    }
                    RegistryAction::Unchanged => {}
                    RegistryAction::Updated => {
                        self.with_delegate(|d| d.on_entity_updated(adpdu.entity_id, &entity));
                    }
                    RegistryAction::OfflineOnline => {
                        log::debug!(
                            "[adp] {} re-advertised with incompatible fields, simulating \
                             offline/online",
                            adpdu.entity_id
                        );
                        self.with_delegate(|d| {
                            d.on_entity_offline(adpdu.entity_id);
                            d.on_entity_online(adpdu.entity_id, &entity);
                        });
                    }
                }
            }
            AdpMessageType::EntityDeparting => {
                if self.registry.remove(adpdu.entity_id) {
                    log::debug!("[adp] {} departing", adpdu.entity_id);
                    self.with_delegate(|d| d.on_entity_offline(adpdu.entity_id));
                }
            }
            // A controller-only endpoint never advertises, so it never
            // answers discovery probes either.
            AdpMessageType::EntityDiscover => {}
        }
    }

    fn handle_aecpdu(&self, aecpdu: &Aecpdu) {
        let common = aecpdu.common();
        if common.message_type.is_response() {
            self.handle_aecp_response(aecpdu);
        } else {
            self.handle_aecp_command(aecpdu);
        }
    }

    fn handle_aecp_response(&self, aecpdu: &Aecpdu) {
        let common = aecpdu.common();

        // Responses correlate by our controller EID; everything else on the
        // wire is somebody else's conversation.
        if common.controller_entity_id != self.controller_id {
            self.metrics.foreign_dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        if let Aecpdu::Aem(aem) = aecpdu {
            if aem.unsolicited {
                self.metrics.unsolicited_rx.fetch_add(1, Ordering::Relaxed);
                if aem.common.status == aecp_status::SUCCESS {
                    self.with_delegate(|d| router::fan_out_unsolicited(aem, d));
                } else {
                    log::debug!(
                        "[aecp] unsolicited {} from {} with status {}; dropping",
                        aem.command_type,
                        aem.common.target_entity_id,
                        aem.common.status
                    );
                }
                return;
            }

            // IN_PROGRESS re-arms the timer instead of completing the command
            if aem.common.status == aem_status::IN_PROGRESS {
                if !self.inflight.rearm_aecp(common.target_entity_id, common.sequence_id) {
                    self.metrics.responses_late.fetch_add(1, Ordering::Relaxed);
                }
                return;
            }
        }

        match self.inflight.take_aecp(common.target_entity_id, common.sequence_id) {
            Some(entry) => {
                self.metrics.responses_matched.fetch_add(1, Ordering::Relaxed);
                router::deliver_aecp_response(entry.handler, aecpdu, &self.tolerance);
            }
            None => {
                self.metrics.responses_late.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "[aecp] response {} from {} unexpected (timed out already?)",
                    common.sequence_id,
                    common.target_entity_id
                );
            }
        }
    }

    fn handle_aecp_command(&self, aecpdu: &Aecpdu) {
        let common = aecpdu.common();
        if common.target_entity_id != self.controller_id {
            return;
        }

        // We are being asked if we are available, and we are! Reply that.
        if let Aecpdu::Aem(aem) = aecpdu {
            if aem.command_type == AemCommandType::CONTROLLER_AVAILABLE {
                self.send_aecp_response(aecpdu, aecp_status::SUCCESS);
                return;
            }
        }

        let claimed = self
            .with_delegate(|d| d.on_unhandled_aecp_command(aecpdu))
            .unwrap_or(false);
        if !claimed {
            self.send_aecp_response(aecpdu, aecp_status::NOT_IMPLEMENTED);
        }
    }

    /// Answer an inbound AECP command: flip to the response message type,
    /// set the status, echo the family header, drop the payload.
    fn send_aecp_response(&self, command: &Aecpdu, status: u8) {
        let mut response = command.clone();
        {
            let common = response.common_mut();
            common.dest_address = command.common().src_address;
            common.src_address = self.interface.mac_address();
            common.status = status;
            common.message_type = match common.message_type {
                AecpMessageType::AemCommand => AecpMessageType::AemResponse,
                AecpMessageType::AddressAccessCommand => AecpMessageType::AddressAccessResponse,
                AecpMessageType::VendorUniqueCommand => AecpMessageType::VendorUniqueResponse,
                other => other,
            };
        }
        match &mut response {
            Aecpdu::Aem(aem) => aem.payload.clear(),
            Aecpdu::Aa(aa) => aa.tlvs.clear(),
            Aecpdu::Mvu(mvu) => mvu.payload.clear(),
        }
        if let Err(err) = self.interface.send_aecpdu(&response) {
            log::debug!("[aecp] failed to answer inbound command: {err}");
        }
    }

    fn handle_acmpdu(&self, acmpdu: &Acmpdu) {
        if acmpdu.message_type.is_response() {
            let ours = acmpdu.controller_entity_id == self.controller_id;
            if ours {
                if let Some(entry) =
                    self.inflight.take_acmp_matching(acmpdu.sequence_id, acmpdu.message_type)
                {
                    self.metrics.responses_matched.fetch_add(1, Ordering::Relaxed);
                    router::deliver_acmp_response(entry.handler, acmpdu);
                    return;
                }
            }
            // Not correlated: traffic between other stations (or our own
            // late/listener-side chatter) observed on the multicast channel.
            self.with_delegate(|d| router::fan_out_sniffed_response(acmpdu, d));
        } else {
            self.with_delegate(|d| d.on_acmp_sniffed_command(acmpdu));
        }
    }
}

fn deliver_acmp_failure(entry: InflightAcmp, status: ControlStatus) {
    let pdu = entry.pdu;
    (entry.handler)(
        pdu.talker_entity_id,
        pdu.talker_unique_id,
        pdu.listener_entity_id,
        pdu.listener_unique_id,
        0,
        ConnectionFlags::NONE,
        status,
    );
}

impl PduObserver for Engine {
    fn on_pdu(&self, pdu: Pdu) {
        match &pdu {
            Pdu::Adp(adpdu) => self.handle_adpdu(adpdu),
            Pdu::Aecp(aecpdu) => self.handle_aecpdu(aecpdu),
            Pdu::Acmp(acmpdu) => self.handle_acmpdu(acmpdu),
        }
    }

    fn on_transport_error(&self) {
        log::warn!("[engine] transport error reported by the interface");
        self.with_delegate(|d| d.on_transport_error());
    }
}

/// Background thread driving [`Engine::scan`] every tick.
pub struct TimeoutScanner {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl TimeoutScanner {
    /// Spawn the scanner. Holds only a weak reference so the engine can be
    /// dropped while the scanner is alive.
    #[must_use]
    pub fn spawn(engine: &Arc<Engine>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let weak: Weak<Engine> = Arc::downgrade(engine);

        let handle = thread::Builder::new()
            .name("avdecc-inflight-scan".to_string())
            .spawn(move || {
                while !shutdown_flag.load(Ordering::Relaxed) {
                    match weak.upgrade() {
                        Some(engine) => engine.scan(Instant::now()),
                        None => break,
                    }
                    thread::sleep(config::STATE_MACHINE_TICK);
                }
            })
            .expect("spawning the scanner thread cannot fail");

        Self { handle: Some(handle), shutdown }
    }
}

impl Drop for TimeoutScanner {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
