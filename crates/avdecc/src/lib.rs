// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # AVDECC - IEEE 1722.1 Controller Protocol Engine
//!
//! A pure Rust implementation of the controller side of IEEE Std 1722.1-2013
//! (AVDECC, with Milan extensions): discovery, enumeration and control of
//! audio/video entities over Layer-2 Ethernet.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use avdecc::controller::{ControllerConfig, ControllerEntity};
//! use avdecc::model::{DescriptorType, UniqueIdentifier};
//! use avdecc::transport::VirtualBus;
//! use std::sync::Arc;
//!
//! let bus = VirtualBus::new();
//! let interface = bus.attach([0x02, 0, 0, 0, 0, 0x01].into());
//! let controller = ControllerEntity::new(
//!     interface,
//!     UniqueIdentifier::from(0x0102_0304_0506_0708),
//!     ControllerConfig::default(),
//! );
//!
//! // Acquire the first entity that comes online
//! controller.acquire_entity(
//!     UniqueIdentifier::from(0x1122_3344_5566_7788),
//!     true,
//!     DescriptorType::Entity,
//!     0,
//!     Box::new(|entity_id, status, owner, _dt, _di| {
//!         println!("acquire {entity_id}: {status:?} (owner {owner})");
//!     }),
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Controller Facade                           |
//! |   ControllerEntity (typed ops) | ControllerDelegate (push events)  |
//! +--------------------------------------------------------------------+
//! |                         Protocol Engine                            |
//! |   Entity Registry | Discovery Loop | Inflight Table | Router       |
//! +--------------------------------------------------------------------+
//! |                          Wire Codec                                |
//! |   ADPDU | ACMPDU | AECPDU (AEM / AA / MVU) | AEM payloads          |
//! +--------------------------------------------------------------------+
//! |                      Transport Interface                           |
//! |   ProtocolInterface trait | VirtualBus (in-process loopback)       |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`controller::ControllerEntity`] | Entry point, issues commands and correlates responses |
//! | [`controller::ControllerDelegate`] | Observer for discovery and unsolicited notifications |
//! | [`transport::ProtocolInterface`] | Seam to the raw L2 transport |
//! | [`model::UniqueIdentifier`] | 64-bit entity identifier (EID) |
//! | [`protocol::Pdu`] | A parsed ADP / AECP / ACMP datagram |
//!
//! ## See Also
//!
//! - IEEE Std 1722.1-2013 (AVDECC)
//! - Avnu Milan specification v1.2

/// Global configuration: wire constants, timeouts, tolerance flags.
pub mod config;
/// Library error type.
pub mod error;
/// Entity-model data types (identifiers, capabilities, descriptors).
pub mod model;
/// Wire codec for ADP, AECP (AEM/AA/MVU) and ACMP PDUs.
pub mod protocol;
/// Protocol engine state: registry, discovery, inflight commands, router.
pub mod state;
/// Transport abstraction and the in-process virtual interface.
pub mod transport;

/// Controller facade: typed command API and delegate observer.
pub mod controller;

pub use error::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
