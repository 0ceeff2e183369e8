// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of discovered entities.
//!
//! Populated by ADP ENTITY_AVAILABLE, drained by ENTITY_DEPARTING and lease
//! expiry (2 x valid_time per advertising interface). Lookups and mutations
//! interleave with dispatcher sends from multiple threads behind one RwLock.

use crate::model::{
    AvbInterfaceIndex, Entity, EntityCapabilities, EntityCommonInformation,
    EntityInterfaceInformation, MacAddr, UniqueIdentifier, GLOBAL_AVB_INTERFACE_INDEX,
};
use crate::protocol::Adpdu;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Macro to generate poisoned lock recovery functions (eliminates duplication)
///
/// Generates `recover_read` and `recover_write` with identical error handling.
macro_rules! impl_recover_lock {
    ($fn_name:ident, $lock_method:ident, $guard_type:ty) => {
        fn $fn_name<'a, T>(lock: &'a RwLock<T>, context: &str) -> $guard_type {
            match lock.$lock_method() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    log::debug!("[registry] WARNING: {} poisoned, recovering", context);
                    poisoned.into_inner()
                }
            }
        }
    };
}

impl_recover_lock!(recover_read, read, RwLockReadGuard<'a, T>);
impl_recover_lock!(recover_write, write, RwLockWriteGuard<'a, T>);

/// What an ENTITY_AVAILABLE did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryAction {
    /// First sighting.
    Online,
    /// Known entity, nothing observable changed.
    Unchanged,
    /// Mutable fields changed or a new interface appeared.
    Updated,
    /// A field that must never change between ADPDUs changed (or
    /// available_index went backwards): the entry was replaced and observers
    /// should see a simulated offline followed by online.
    OfflineOnline,
}

/// One expiry outcome from [`EntityRegistry::expire`].
#[derive(Debug, Clone)]
pub enum ExpiryEvent {
    /// Last advertising interface lapsed; the entity is gone.
    Offline(UniqueIdentifier),
    /// An interface lapsed but others remain.
    Updated(UniqueIdentifier, Entity),
}

struct EntityEntry {
    entity: Entity,
    /// Per-interface lease deadline (now + 2 x valid_time).
    deadlines: HashMap<AvbInterfaceIndex, Instant>,
}

/// Mapping EID -> last-known advertisement.
#[derive(Default)]
pub struct EntityRegistry {
    entities: RwLock<HashMap<UniqueIdentifier, EntityEntry>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest an ENTITY_AVAILABLE, returning what changed and the resulting
    /// record to hand to observers.
    pub fn upsert_advertisement(&self, adpdu: &Adpdu) -> (RegistryAction, Entity) {
        let (interface_index, incoming) = entity_from_adpdu(adpdu);
        let deadline = Instant::now() + lease_duration(adpdu.valid_time);

        let mut entities = recover_write(&self.entities, "EntityRegistry::upsert");
        match entities.entry(adpdu.entity_id) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                let entry = slot.insert(EntityEntry {
                    entity: incoming,
                    deadlines: HashMap::from([(interface_index, deadline)]),
                });
                (RegistryAction::Online, entry.entity.clone())
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                let action = merge_advertisement(&mut entry.entity, interface_index, incoming);
                if matches!(action, RegistryAction::OfflineOnline) {
                    entry.deadlines.clear();
                }
                entry.deadlines.insert(interface_index, deadline);
                (action, entry.entity.clone())
            }
        }
    }

    /// ENTITY_DEPARTING. Unknown entities are a no-op (returns false).
    pub fn remove(&self, entity_id: UniqueIdentifier) -> bool {
        let mut entities = recover_write(&self.entities, "EntityRegistry::remove");
        entities.remove(&entity_id).is_some()
    }

    /// Any MAC address the entity is reachable at.
    pub fn mac_for(&self, entity_id: UniqueIdentifier) -> Option<MacAddr> {
        let entities = recover_read(&self.entities, "EntityRegistry::mac_for");
        entities
            .get(&entity_id)
            .map(|entry| entry.entity.any_mac_address())
            .filter(|mac| mac.is_valid())
    }

    pub fn get(&self, entity_id: UniqueIdentifier) -> Option<Entity> {
        let entities = recover_read(&self.entities, "EntityRegistry::get");
        entities.get(&entity_id).map(|entry| entry.entity.clone())
    }

    pub fn contains(&self, entity_id: UniqueIdentifier) -> bool {
        let entities = recover_read(&self.entities, "EntityRegistry::contains");
        entities.contains_key(&entity_id)
    }

    pub fn len(&self) -> usize {
        let entities = recover_read(&self.entities, "EntityRegistry::len");
        entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop interfaces whose lease lapsed; entities with no interface left go
    /// offline. Returns the events to fan out, in no particular order.
    pub fn expire(&self, now: Instant) -> Vec<ExpiryEvent> {
        let mut events = Vec::new();
        let mut entities = recover_write(&self.entities, "EntityRegistry::expire");

        entities.retain(|&entity_id, entry| {
            let mut lapsed = false;
            entry.deadlines.retain(|&interface_index, &mut deadline| {
                if now > deadline {
                    entry.entity.interfaces.remove(&interface_index);
                    lapsed = true;
                    false
                } else {
                    true
                }
            });

            if !lapsed {
                return true;
            }
            if entry.entity.interfaces.is_empty() {
                events.push(ExpiryEvent::Offline(entity_id));
                false
            } else {
                events.push(ExpiryEvent::Updated(entity_id, entry.entity.clone()));
                true
            }
        });

        events
    }
}

fn lease_duration(valid_time: u8) -> Duration {
    Duration::from_secs(2 * u64::from(valid_time))
}

/// Build the registry view of one ADPDU (Clause 6.2.5.1: conditional fields
/// gated by entity_capabilities).
fn entity_from_adpdu(adpdu: &Adpdu) -> (AvbInterfaceIndex, Entity) {
    let caps = adpdu.entity_capabilities;

    let identify_control_index = caps
        .contains(EntityCapabilities::AEM_IDENTIFY_CONTROL_INDEX_VALID)
        .then_some(adpdu.identify_control_index);
    let association_id =
        caps.contains(EntityCapabilities::ASSOCIATION_ID_VALID).then_some(adpdu.association_id);
    let interface_index = if caps.contains(EntityCapabilities::AEM_INTERFACE_INDEX_VALID) {
        adpdu.interface_index
    } else {
        GLOBAL_AVB_INTERFACE_INDEX
    };
    let (gptp_grandmaster_id, gptp_domain_number) =
        if caps.contains(EntityCapabilities::GPTP_SUPPORTED) {
            (Some(adpdu.gptp_grandmaster_id), Some(adpdu.gptp_domain_number))
        } else {
            (None, None)
        };

    let common = EntityCommonInformation {
        entity_id: adpdu.entity_id,
        entity_model_id: adpdu.entity_model_id,
        entity_capabilities: caps,
        talker_stream_sources: adpdu.talker_stream_sources,
        talker_capabilities: adpdu.talker_capabilities,
        listener_stream_sinks: adpdu.listener_stream_sinks,
        listener_capabilities: adpdu.listener_capabilities,
        controller_capabilities: adpdu.controller_capabilities,
        identify_control_index,
        association_id,
    };
    let interface = EntityInterfaceInformation {
        mac_address: adpdu.src_address,
        valid_time: adpdu.valid_time,
        available_index: adpdu.available_index,
        gptp_grandmaster_id,
        gptp_domain_number,
    };

    (interface_index, Entity::new(common, interface_index, interface))
}

/// Merge a fresh advertisement into the stored record, deciding what to tell
/// observers. Some fields must never change between consecutive ADPDUs; a
/// device that changes them anyway (or rewinds available_index) is treated as
/// a new incarnation of the entity.
fn merge_advertisement(
    current: &mut Entity,
    interface_index: AvbInterfaceIndex,
    incoming: Entity,
) -> RegistryAction {
    let common = &incoming.common;

    if current.common.entity_model_id != common.entity_model_id
        || current.common.talker_capabilities != common.talker_capabilities
        || current.common.talker_stream_sources != common.talker_stream_sources
        || current.common.listener_capabilities != common.listener_capabilities
        || current.common.listener_stream_sinks != common.listener_stream_sinks
        || current.common.controller_capabilities != common.controller_capabilities
        || current.common.identify_control_index != common.identify_control_index
    {
        *current = incoming;
        return RegistryAction::OfflineOnline;
    }

    let incoming_interface = incoming.interfaces[&interface_index];
    let mut action = RegistryAction::Unchanged;

    match current.interfaces.get_mut(&interface_index) {
        Some(interface) => {
            // MAC must not change and available_index must always increment
            if interface.mac_address != incoming_interface.mac_address
                || interface.available_index >= incoming_interface.available_index
            {
                *current = incoming;
                return RegistryAction::OfflineOnline;
            }
            if interface.gptp_grandmaster_id != incoming_interface.gptp_grandmaster_id
                || interface.gptp_domain_number != incoming_interface.gptp_domain_number
            {
                interface.gptp_grandmaster_id = incoming_interface.gptp_grandmaster_id;
                interface.gptp_domain_number = incoming_interface.gptp_domain_number;
                action = RegistryAction::Updated;
            }
            interface.available_index = incoming_interface.available_index;
            interface.valid_time = incoming_interface.valid_time;
        }
        None => {
            current.interfaces.insert(interface_index, incoming_interface);
            action = RegistryAction::Updated;
        }
    }

    if current.common.entity_capabilities != common.entity_capabilities
        || current.common.association_id != common.association_id
    {
        current.common.entity_capabilities = common.entity_capabilities;
        current.common.association_id = common.association_id;
        action = RegistryAction::Updated;
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AdpMessageType;

    fn advertisement(entity_id: u64, available_index: u32) -> Adpdu {
        Adpdu {
            src_address: MacAddr::new([0, 0x1B, 0xC5, 0, 0, 0x42]),
            message_type: AdpMessageType::EntityAvailable,
            valid_time: 10,
            entity_id: UniqueIdentifier::from(entity_id),
            entity_model_id: UniqueIdentifier::from(0x1111),
            entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
            available_index,
            ..Default::default()
        }
    }

    #[test]
    fn first_available_goes_online() {
        let registry = EntityRegistry::new();
        let (action, entity) = registry.upsert_advertisement(&advertisement(0xA1, 0));
        assert_eq!(action, RegistryAction::Online);
        assert_eq!(entity.entity_id(), UniqueIdentifier::from(0xA1));
        assert!(registry.contains(UniqueIdentifier::from(0xA1)));
        assert_eq!(registry.mac_for(UniqueIdentifier::from(0xA1)), Some(MacAddr::new([0, 0x1B, 0xC5, 0, 0, 0x42])));
    }

    #[test]
    fn incrementing_available_index_is_unchanged() {
        let registry = EntityRegistry::new();
        registry.upsert_advertisement(&advertisement(0xA1, 0));
        let (action, _) = registry.upsert_advertisement(&advertisement(0xA1, 1));
        assert_eq!(action, RegistryAction::Unchanged);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rewound_available_index_simulates_offline_online() {
        let registry = EntityRegistry::new();
        registry.upsert_advertisement(&advertisement(0xA1, 5));
        let (action, _) = registry.upsert_advertisement(&advertisement(0xA1, 5));
        assert_eq!(action, RegistryAction::OfflineOnline);
    }

    #[test]
    fn model_id_change_simulates_offline_online() {
        let registry = EntityRegistry::new();
        registry.upsert_advertisement(&advertisement(0xA1, 0));
        let mut changed = advertisement(0xA1, 1);
        changed.entity_model_id = UniqueIdentifier::from(0x2222);
        let (action, entity) = registry.upsert_advertisement(&changed);
        assert_eq!(action, RegistryAction::OfflineOnline);
        assert_eq!(entity.common.entity_model_id, UniqueIdentifier::from(0x2222));
    }

    #[test]
    fn gptp_change_surfaces_update() {
        let registry = EntityRegistry::new();
        let mut first = advertisement(0xA1, 0);
        first.entity_capabilities =
            first.entity_capabilities.union(EntityCapabilities::GPTP_SUPPORTED);
        first.gptp_grandmaster_id = UniqueIdentifier::from(0xCAFE);
        registry.upsert_advertisement(&first);

        let mut second = advertisement(0xA1, 1);
        second.entity_capabilities =
            second.entity_capabilities.union(EntityCapabilities::GPTP_SUPPORTED);
        second.gptp_grandmaster_id = UniqueIdentifier::from(0xBEEF);
        let (action, entity) = registry.upsert_advertisement(&second);
        assert_eq!(action, RegistryAction::Updated);
        assert_eq!(
            entity.interfaces[&GLOBAL_AVB_INTERFACE_INDEX].gptp_grandmaster_id,
            Some(UniqueIdentifier::from(0xBEEF))
        );
    }

    #[test]
    fn departing_unknown_is_noop() {
        let registry = EntityRegistry::new();
        assert!(!registry.remove(UniqueIdentifier::from(0xA1)));
        registry.upsert_advertisement(&advertisement(0xA1, 0));
        assert!(registry.remove(UniqueIdentifier::from(0xA1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn lease_expiry_takes_entity_offline() {
        let registry = EntityRegistry::new();
        registry.upsert_advertisement(&advertisement(0xA1, 0));

        // Not expired yet
        assert!(registry.expire(Instant::now()).is_empty());

        // 2 x valid_time = 20s; jump past it
        let events = registry.expire(Instant::now() + Duration::from_secs(21));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ExpiryEvent::Offline(id) if id == UniqueIdentifier::from(0xA1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn expiry_of_one_interface_keeps_entity() {
        let registry = EntityRegistry::new();
        let mut on_if0 = advertisement(0xA1, 0);
        on_if0.entity_capabilities =
            on_if0.entity_capabilities.union(EntityCapabilities::AEM_INTERFACE_INDEX_VALID);
        on_if0.interface_index = 0;
        on_if0.valid_time = 1; // 2s lease
        registry.upsert_advertisement(&on_if0);

        let mut on_if1 = advertisement(0xA1, 1);
        on_if1.entity_capabilities =
            on_if1.entity_capabilities.union(EntityCapabilities::AEM_INTERFACE_INDEX_VALID);
        on_if1.interface_index = 1;
        on_if1.valid_time = 30; // 60s lease
        registry.upsert_advertisement(&on_if1);

        let events = registry.expire(Instant::now() + Duration::from_secs(5));
        assert_eq!(events.len(), 1);
        match &events[0] {
            ExpiryEvent::Updated(id, entity) => {
                assert_eq!(*id, UniqueIdentifier::from(0xA1));
                assert!(entity.interfaces.contains_key(&1));
                assert!(!entity.interfaces.contains_key(&0));
            }
            other => panic!("expected Updated, got {other:?}"),
        }
        assert!(registry.contains(UniqueIdentifier::from(0xA1)));
    }
}
