// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-flight command table.
//!
//! Every accepted command is recorded here between send and completion.
//! Correlation keys: AECP by (target EID, sequence id) - all three AECP
//! families share one sequence space per controller; ACMP by sequence id
//! alone (responses arrive on the multicast channel).
//!
//! Invariants enforced here:
//! - a handler leaves the table exactly once (`take_*`), so it can never be
//!   invoked twice;
//! - retries update the entry in place and reuse the sequence id, so the
//!   sequence ids of distinct in-flight commands to one target stay unique.

use crate::controller::handlers::{AcmpResponseHandler, AecpHandler};
use crate::model::UniqueIdentifier;
use crate::protocol::{AcmpMessageType, Acmpdu, Aecpdu};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

/// One pending AECP command.
pub struct InflightAecp {
    /// The encoded command, kept for resends.
    pub pdu: Aecpdu,
    pub deadline: Instant,
    /// Re-arm budget; AEM/MVU start at the configured retry count, AA at 0.
    pub retries_left: u8,
    /// Per-send timeout, re-applied on retry and IN_PROGRESS re-arm.
    pub timeout: Duration,
    pub handler: AecpHandler,
}

/// One pending ACMP command. ACMP is not retried at this layer.
pub struct InflightAcmp {
    /// The command as sent; timeout delivery echoes its stream endpoints.
    pub pdu: Acmpdu,
    pub deadline: Instant,
    pub handler: AcmpResponseHandler,
}

/// Expiry verdicts from one scan pass.
pub enum AecpTimeout {
    /// Resend the recorded PDU; the entry stays in the table with a fresh
    /// deadline and one less retry.
    Retry { target: UniqueIdentifier, sequence_id: u16, pdu: Aecpdu },
    /// Retries exhausted; the caller takes the entry and delivers `TimedOut`.
    Expired { target: UniqueIdentifier, sequence_id: u16 },
}

/// The pending-command state shared by senders, the receive path and the
/// timeout scanner.
#[derive(Default)]
pub struct InflightTable {
    aecp: DashMap<(UniqueIdentifier, u16), InflightAecp>,
    acmp: DashMap<u16, InflightAcmp>,
    next_aecp_sequence: AtomicU16,
    next_acmp_sequence: AtomicU16,
}

impl InflightTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_aecp_sequence_id(&self) -> u16 {
        self.next_aecp_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_acmp_sequence_id(&self) -> u16 {
        self.next_acmp_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert_aecp(&self, target: UniqueIdentifier, sequence_id: u16, entry: InflightAecp) {
        self.aecp.insert((target, sequence_id), entry);
    }

    /// Remove and return the pending entry; the caller owns the single
    /// handler invocation from here on.
    pub fn take_aecp(&self, target: UniqueIdentifier, sequence_id: u16) -> Option<InflightAecp> {
        self.aecp.remove(&(target, sequence_id)).map(|(_, entry)| entry)
    }

    /// Push the deadline out again (IN_PROGRESS re-arm, Clause 9.2.1.2.5).
    /// Returns false when the entry is no longer pending.
    pub fn rearm_aecp(&self, target: UniqueIdentifier, sequence_id: u16) -> bool {
        match self.aecp.get_mut(&(target, sequence_id)) {
            Some(mut entry) => {
                let timeout = entry.timeout;
                entry.deadline = Instant::now() + timeout;
                true
            }
            None => false,
        }
    }

    pub fn insert_acmp(&self, sequence_id: u16, entry: InflightAcmp) {
        self.acmp.insert(sequence_id, entry);
    }

    /// Remove the pending ACMP entry, but only when the response type pairs
    /// with the recorded command (talker/listener chatter triggered by our
    /// command reuses our controller EID and may reuse our sequence id).
    pub fn take_acmp_matching(
        &self,
        sequence_id: u16,
        response_type: AcmpMessageType,
    ) -> Option<InflightAcmp> {
        let matches = self.acmp.get(&sequence_id).is_some_and(|entry| {
            entry.pdu.message_type.expected_response() == Some(response_type)
        });
        if matches {
            self.acmp.remove(&sequence_id).map(|(_, entry)| entry)
        } else {
            None
        }
    }

    pub fn aecp_pending(&self) -> usize {
        self.aecp.len()
    }

    pub fn acmp_pending(&self) -> usize {
        self.acmp.len()
    }

    /// One scanner pass: decide retries and expiries. Retry entries are
    /// re-armed in place while this holds the shard lock; expired entries are
    /// only *reported* - the caller must `take_*` them before invoking
    /// anything, which keeps the at-most-once guarantee even when a response
    /// races the scanner.
    pub fn collect_timeouts(&self, now: Instant) -> (Vec<AecpTimeout>, Vec<u16>) {
        let mut aecp_actions = Vec::new();
        for mut item in self.aecp.iter_mut() {
            let (target, sequence_id) = *item.key();
            let entry = item.value_mut();
            if now <= entry.deadline {
                continue;
            }
            if entry.retries_left > 0 {
                entry.retries_left -= 1;
                entry.deadline = now + entry.timeout;
                aecp_actions.push(AecpTimeout::Retry {
                    target,
                    sequence_id,
                    pdu: entry.pdu.clone(),
                });
            } else {
                aecp_actions.push(AecpTimeout::Expired { target, sequence_id });
            }
        }

        let acmp_expired = self
            .acmp
            .iter()
            .filter(|item| now > item.value().deadline)
            .map(|item| *item.key())
            .collect();

        (aecp_actions, acmp_expired)
    }

    /// Remove an expired ACMP entry (scanner path).
    pub fn take_acmp_expired(&self, sequence_id: u16) -> Option<InflightAcmp> {
        self.acmp.remove(&sequence_id).map(|(_, entry)| entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::controller::handlers::AemHandler;
    use crate::protocol::aecpdu::{AecpCommon, AemAecpdu, AemCommandType};

    fn dummy_aecp(target: u64, sequence_id: u16) -> Aecpdu {
        Aecpdu::Aem(AemAecpdu {
            common: AecpCommon {
                target_entity_id: UniqueIdentifier::from(target),
                sequence_id,
                ..Default::default()
            },
            unsolicited: false,
            command_type: AemCommandType::ENTITY_AVAILABLE,
            payload: Vec::new(),
        })
    }

    fn dummy_entry(target: u64, sequence_id: u16, retries: u8) -> InflightAecp {
        InflightAecp {
            pdu: dummy_aecp(target, sequence_id),
            deadline: Instant::now() + config::AECP_AEM_TIMEOUT,
            retries_left: retries,
            timeout: config::AECP_AEM_TIMEOUT,
            handler: AecpHandler::Aem(AemHandler::QueryEntityAvailable(Box::new(|_, _| {}))),
        }
    }

    #[test]
    fn sequence_ids_are_unique_across_pending_set() {
        let table = InflightTable::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(table.next_aecp_sequence_id()));
        }
    }

    #[test]
    fn take_is_at_most_once() {
        let table = InflightTable::new();
        let target = UniqueIdentifier::from(0xA1);
        table.insert_aecp(target, 7, dummy_entry(0xA1, 7, 0));

        assert!(table.take_aecp(target, 7).is_some());
        assert!(table.take_aecp(target, 7).is_none(), "second take finds nothing");
    }

    #[test]
    fn scanner_retries_then_expires() {
        let table = InflightTable::new();
        let target = UniqueIdentifier::from(0xA1);
        table.insert_aecp(target, 1, dummy_entry(0xA1, 1, 1));

        let later = Instant::now() + 2 * config::AECP_AEM_TIMEOUT;
        let (actions, _) = table.collect_timeouts(later);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], AecpTimeout::Retry { sequence_id: 1, .. }));

        // Still pending, deadline re-armed, budget now zero
        let even_later = later + 2 * config::AECP_AEM_TIMEOUT;
        let (actions, _) = table.collect_timeouts(even_later);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], AecpTimeout::Expired { sequence_id: 1, .. }));
        assert!(table.take_aecp(target, 1).is_some(), "expired entry reported, not removed");
    }

    #[test]
    fn acmp_response_must_pair_with_command() {
        let table = InflightTable::new();
        table.insert_acmp(
            9,
            InflightAcmp {
                pdu: Acmpdu {
                    message_type: AcmpMessageType::ConnectRxCommand,
                    sequence_id: 9,
                    ..Default::default()
                },
                deadline: Instant::now() + Duration::from_secs(1),
                handler: Box::new(|_, _, _, _, _, _, _| {}),
            },
        );

        // A CONNECT_TX_RESPONSE with our sequence id is talker/listener
        // chatter, not our answer.
        assert!(table.take_acmp_matching(9, AcmpMessageType::ConnectTxResponse).is_none());
        assert!(table.take_acmp_matching(9, AcmpMessageType::ConnectRxResponse).is_some());
        assert_eq!(table.acmp_pending(), 0);
    }

    #[test]
    fn rearm_extends_deadline() {
        let table = InflightTable::new();
        let target = UniqueIdentifier::from(0xA1);
        table.insert_aecp(target, 3, dummy_entry(0xA1, 3, 0));
        assert!(table.rearm_aecp(target, 3));

        // Right after re-arm nothing is expired
        let (actions, _) = table.collect_timeouts(Instant::now());
        assert!(actions.is_empty());
        assert!(!table.rearm_aecp(target, 99), "unknown entry cannot re-arm");
    }
}
