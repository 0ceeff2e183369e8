// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process virtual transport.
//!
//! A [`VirtualBus`] behaves like a shared Ethernet segment: every frame sent
//! by one attached interface is delivered to all the others (never looped
//! back to the sender). Each interface runs a dedicated receive thread that
//! applies normal L2 filtering (own unicast MAC or any multicast) before
//! parsing and handing the PDU to the observer.
//!
//! This is the transport used by the integration tests and demos; production
//! deployments plug a pcap/AF_PACKET implementation into the same
//! [`ProtocolInterface`] seam.

use super::{PduObserver, ProtocolInterface};
use crate::config::ProtocolTolerance;
use crate::error::Error;
use crate::model::MacAddr;
use crate::protocol::{parse_frame, Acmpdu, Adpdu, Aecpdu};
use crate::Result;
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Receive metrics for diagnostics.
#[derive(Debug, Default)]
pub struct InterfaceMetrics {
    /// Frames handed to the parser.
    pub frames_rx: AtomicU64,
    /// Frames transmitted.
    pub frames_tx: AtomicU64,
    /// Frames dropped by L2 filtering (not addressed to us).
    pub frames_filtered: AtomicU64,
    /// Frames the codec rejected.
    pub parse_errors: AtomicU64,
}

impl InterfaceMetrics {
    /// Snapshot as (rx, tx, filtered, parse_errors).
    pub fn snapshot(&self) -> (u64, u64, u64, u64) {
        (
            self.frames_rx.load(Ordering::Relaxed),
            self.frames_tx.load(Ordering::Relaxed),
            self.frames_filtered.load(Ordering::Relaxed),
            self.parse_errors.load(Ordering::Relaxed),
        )
    }
}

/// A shared in-process Ethernet segment.
pub struct VirtualBus {
    peers: Mutex<HashMap<u64, Sender<Vec<u8>>>>,
    next_id: AtomicU64,
}

impl VirtualBus {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self { peers: Mutex::new(HashMap::new()), next_id: AtomicU64::new(1) })
    }

    /// Attach a new interface with default tolerance.
    pub fn attach(self: &Arc<Self>, mac: MacAddr) -> Arc<VirtualInterface> {
        self.attach_with_tolerance(mac, ProtocolTolerance::default())
    }

    /// Attach a new interface, spawning its receive thread.
    pub fn attach_with_tolerance(
        self: &Arc<Self>,
        mac: MacAddr,
        tolerance: ProtocolTolerance,
    ) -> Arc<VirtualInterface> {
        let (tx, rx) = unbounded();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut peers = lock_peers(&self.peers);
            peers.insert(id, tx);
        }
        VirtualInterface::start(Arc::clone(self), id, mac, tolerance, rx)
    }

    /// Deliver a frame to every peer except the sender.
    fn broadcast(&self, sender_id: u64, frame: &[u8]) {
        let peers = lock_peers(&self.peers);
        for (id, tx) in peers.iter() {
            if *id != sender_id {
                // A full/disconnected peer is equivalent to a dead NIC; the
                // wire does not report that back to the sender.
                let _ = tx.send(frame.to_vec());
            }
        }
    }

    fn detach(&self, id: u64) {
        let mut peers = lock_peers(&self.peers);
        peers.remove(&id);
    }
}

fn lock_peers(
    peers: &Mutex<HashMap<u64, Sender<Vec<u8>>>>,
) -> std::sync::MutexGuard<'_, HashMap<u64, Sender<Vec<u8>>>> {
    match peers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::debug!("[virtual] WARNING: peer table poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// One station attached to a [`VirtualBus`].
pub struct VirtualInterface {
    bus: Arc<VirtualBus>,
    id: u64,
    mac: MacAddr,
    tolerance: ProtocolTolerance,
    observer: RwLock<Option<Arc<dyn PduObserver>>>,
    running: Arc<AtomicBool>,
    rx_thread: Mutex<Option<JoinHandle<()>>>,
    /// Receive metrics.
    pub metrics: Arc<InterfaceMetrics>,
}

impl VirtualInterface {
    fn start(
        bus: Arc<VirtualBus>,
        id: u64,
        mac: MacAddr,
        tolerance: ProtocolTolerance,
        rx: Receiver<Vec<u8>>,
    ) -> Arc<Self> {
        let interface = Arc::new(Self {
            bus,
            id,
            mac,
            tolerance,
            observer: RwLock::new(None),
            running: Arc::new(AtomicBool::new(true)),
            rx_thread: Mutex::new(None),
            metrics: Arc::new(InterfaceMetrics::default()),
        });

        let weak = Arc::downgrade(&interface);
        let running = Arc::clone(&interface.running);
        let handle = std::thread::Builder::new()
            .name(format!("avdecc-virt-rx-{id}"))
            .spawn(move || {
                while running.load(Ordering::Relaxed) {
                    match rx.recv_timeout(Duration::from_millis(10)) {
                        Ok(frame) => {
                            let Some(interface) = weak.upgrade() else { break };
                            interface.deliver(&frame);
                        }
                        Err(crossbeam::channel::RecvTimeoutError::Timeout) => {}
                        Err(crossbeam::channel::RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .expect("spawning the virtual rx thread cannot fail");

        *interface.rx_thread.lock().expect("rx thread slot never poisoned") = Some(handle);
        interface
    }

    /// L2 filter, parse, hand to observer. Runs on the rx thread.
    fn deliver(&self, frame: &[u8]) {
        // Accept our unicast and any multicast (group bit of the first octet)
        let dest = frame.get(..6).map(|d| {
            let mut octets = [0u8; 6];
            octets.copy_from_slice(d);
            MacAddr::new(octets)
        });
        let Some(dest) = dest else {
            self.metrics.parse_errors.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if dest != self.mac && dest.octets()[0] & 0x01 == 0 {
            self.metrics.frames_filtered.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.metrics.frames_rx.fetch_add(1, Ordering::Relaxed);
        match parse_frame(frame, &self.tolerance) {
            Ok(pdu) => {
                let observer = self.observer.read().clone();
                if let Some(observer) = observer {
                    observer.on_pdu(pdu);
                }
            }
            Err(err) => {
                self.metrics.parse_errors.fetch_add(1, Ordering::Relaxed);
                log::debug!("[virtual] dropping unparseable frame from the bus: {err}");
            }
        }
    }

    fn send_frame(&self, frame: &[u8]) -> Result<()> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(Error::Shutdown);
        }
        self.metrics.frames_tx.fetch_add(1, Ordering::Relaxed);
        self.bus.broadcast(self.id, frame);
        Ok(())
    }
}

impl ProtocolInterface for VirtualInterface {
    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn send_adpdu(&self, pdu: &Adpdu) -> Result<()> {
        self.send_frame(&pdu.encode())
    }

    fn send_aecpdu(&self, pdu: &Aecpdu) -> Result<()> {
        self.send_frame(&pdu.encode(&self.tolerance)?)
    }

    fn send_acmpdu(&self, pdu: &Acmpdu) -> Result<()> {
        self.send_frame(&pdu.encode())
    }

    fn set_observer(&self, observer: Arc<dyn PduObserver>) {
        *self.observer.write() = Some(observer);
    }

    fn shutdown(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        self.bus.detach(self.id);
        let handle = self.rx_thread.lock().expect("rx thread slot never poisoned").take();
        if let Some(handle) = handle {
            // The rx thread itself may hold the last Arc; joining ourselves
            // would never return.
            if handle.thread().id() != std::thread::current().id() {
                let _ = handle.join();
            }
        }
        *self.observer.write() = None;
    }
}

impl Drop for VirtualInterface {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{AdpMessageType, Pdu};
    use std::sync::Mutex as StdMutex;

    struct Collector {
        pdus: StdMutex<Vec<Pdu>>,
    }

    impl PduObserver for Collector {
        fn on_pdu(&self, pdu: Pdu) {
            self.pdus.lock().expect("collector lock").push(pdu);
        }
    }

    #[test]
    fn multicast_reaches_all_but_sender() {
        let bus = VirtualBus::new();
        let a = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 1]));
        let b = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 2]));

        let seen_a = Arc::new(Collector { pdus: StdMutex::new(Vec::new()) });
        let seen_b = Arc::new(Collector { pdus: StdMutex::new(Vec::new()) });
        a.set_observer(seen_a.clone());
        b.set_observer(seen_b.clone());

        let discover = Adpdu { src_address: a.mac_address(), ..Default::default() };
        a.send_adpdu(&discover).expect("send succeeds");

        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(seen_a.pdus.lock().expect("lock").len(), 0, "no self-delivery");
        let received = seen_b.pdus.lock().expect("lock");
        assert_eq!(received.len(), 1);
        match &received[0] {
            Pdu::Adp(adpdu) => {
                assert_eq!(adpdu.message_type, AdpMessageType::EntityDiscover);
            }
            other => panic!("expected ADP, got {other:?}"),
        }
    }

    #[test]
    fn unicast_is_filtered_by_mac() {
        let bus = VirtualBus::new();
        let a = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 1]));
        let b = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 2]));
        let c = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 3]));

        let seen_b = Arc::new(Collector { pdus: StdMutex::new(Vec::new()) });
        let seen_c = Arc::new(Collector { pdus: StdMutex::new(Vec::new()) });
        b.set_observer(seen_b.clone());
        c.set_observer(seen_c.clone());

        let adpdu = Adpdu {
            src_address: a.mac_address(),
            dest_address: b.mac_address(),
            ..Default::default()
        };
        a.send_adpdu(&adpdu).expect("send succeeds");

        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(seen_b.pdus.lock().expect("lock").len(), 1);
        assert_eq!(seen_c.pdus.lock().expect("lock").len(), 0);
        let (_, _, filtered, _) = c.metrics.snapshot();
        assert_eq!(filtered, 1);
    }

    #[test]
    fn send_after_shutdown_fails() {
        let bus = VirtualBus::new();
        let a = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 1]));
        a.shutdown();
        assert!(matches!(a.send_adpdu(&Adpdu::default()), Err(Error::Shutdown)));
    }
}
