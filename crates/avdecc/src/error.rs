// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Library error type.
//!
//! Per-command protocol outcomes (timeouts, device status codes) are NOT
//! errors: they are delivered to the per-call result handler as a status
//! enum. `Error` covers the cases where an operation could not be carried at
//! all.

use crate::protocol::PduError;
use std::fmt;

/// Errors surfaced by the engine API.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The transport interface failed irrecoverably and is no longer usable.
    Transport(String),
    /// A frame could not be handed to the transport.
    SendFailed(String),
    /// The interface has been shut down.
    Shutdown,

    // ========================================================================
    // Entity Errors
    // ========================================================================
    /// Target entity is not in the registry.
    UnknownRemoteEntity,
    /// The entity identifier is the null sentinel or otherwise unusable.
    InvalidEntityId,

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// PDU encode/decode failure.
    Pdu(PduError),

    /// Implementation bug, please report the issue.
    Internal(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(reason) => write!(f, "transport error: {reason}"),
            Error::SendFailed(reason) => write!(f, "send failed: {reason}"),
            Error::Shutdown => write!(f, "interface is shut down"),
            Error::UnknownRemoteEntity => write!(f, "unknown remote entity"),
            Error::InvalidEntityId => write!(f, "invalid entity identifier"),
            Error::Pdu(err) => write!(f, "pdu codec error: {err}"),
            Error::Internal(what) => write!(f, "internal error: {what}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<PduError> for Error {
    fn from(err: PduError) -> Self {
        Error::Pdu(err)
    }
}
