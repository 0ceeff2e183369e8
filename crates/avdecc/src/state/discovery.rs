// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ADP discovery broadcaster thread.
//!
//! Sends a global ENTITY_DISCOVER every 10 seconds until shutdown. The loop
//! sleeps in 10 ms ticks so shutdown latency stays bounded. Responses are not
//! handled here; the transport routes ENTITY_AVAILABLE advertisements into
//! the registry through the engine.

use crate::config;
use crate::model::UniqueIdentifier;
use crate::protocol::{AdpMessageType, Adpdu};
use crate::transport::ProtocolInterface;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Build an ENTITY_DISCOVER probe. A null `target` asks every entity on the
/// network to re-advertise; a valid one targets a single entity
/// (Clause 6.2.6.1).
#[must_use]
pub fn make_discover(
    interface: &dyn ProtocolInterface,
    target: UniqueIdentifier,
) -> Adpdu {
    Adpdu {
        dest_address: config::AVDECC_MULTICAST_MAC,
        src_address: interface.mac_address(),
        message_type: AdpMessageType::EntityDiscover,
        valid_time: 0,
        entity_id: target,
        ..Default::default()
    }
}

/// Periodic ENTITY_DISCOVER broadcaster.
///
/// Spawns a background thread; dropping the handle (or calling `shutdown`)
/// stops it within one tick.
pub struct DiscoveryLoop {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    /// Number of DISCOVER broadcasts sent (diagnostics).
    pub sent_count: Arc<AtomicU64>,
}

impl DiscoveryLoop {
    /// Spawn the broadcaster thread.
    #[must_use]
    pub fn spawn(interface: Arc<dyn ProtocolInterface>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let sent_count = Arc::new(AtomicU64::new(0));
        let sent = Arc::clone(&sent_count);

        let handle = thread::Builder::new()
            .name("avdecc-discovery".to_string())
            .spawn(move || {
                discovery_loop(&*interface, &shutdown_flag, &sent);
            })
            .expect("spawning the discovery thread cannot fail");

        Self { handle: Some(handle), shutdown, sent_count }
    }

    /// Signal the thread to stop and wait for completion. Automatically
    /// called on Drop.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DiscoveryLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn discovery_loop(
    interface: &dyn ProtocolInterface,
    shutdown: &AtomicBool,
    sent_count: &AtomicU64,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let discover = make_discover(interface, UniqueIdentifier::NULL);
        match interface.send_adpdu(&discover) {
            Ok(()) => {
                sent_count.fetch_add(1, Ordering::Relaxed);
                log::debug!("[discovery] sent global ENTITY_DISCOVER");
            }
            Err(err) => {
                log::debug!("[discovery] failed to send ENTITY_DISCOVER: {err}");
            }
        }

        // Sleep the discovery period in small ticks for responsive shutdown.
        let sleep_end = Instant::now() + config::DISCOVER_SEND_PERIOD;
        while Instant::now() < sleep_end {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            thread::sleep(config::STATE_MACHINE_TICK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacAddr;
    use crate::transport::VirtualBus;
    use std::time::Duration;

    #[test]
    fn broadcasts_immediately_and_shuts_down_fast() {
        let bus = VirtualBus::new();
        let interface = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 1]));

        let discovery = DiscoveryLoop::spawn(interface.clone());
        thread::sleep(Duration::from_millis(100));
        assert!(discovery.sent_count.load(Ordering::Relaxed) >= 1);

        let started = Instant::now();
        discovery.shutdown();
        assert!(started.elapsed() < Duration::from_millis(200), "shutdown within a few ticks");
    }

    #[test]
    fn discover_message_shape() {
        let bus = VirtualBus::new();
        let interface = bus.attach(MacAddr::new([2, 0, 0, 0, 0, 9]));
        let probe = make_discover(&*interface, UniqueIdentifier::NULL);

        assert_eq!(probe.message_type, AdpMessageType::EntityDiscover);
        assert_eq!(probe.dest_address, config::AVDECC_MULTICAST_MAC);
        assert_eq!(probe.src_address, MacAddr::new([2, 0, 0, 0, 0, 9]));
        assert!(probe.entity_id.is_null());
        assert_eq!(probe.valid_time, 0);
        assert!(probe.entity_model_id.is_null());
    }
}
