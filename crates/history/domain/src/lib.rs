//! Domain types for the safe transaction history service.
//!
//! This crate provides the core domain models for tracking multisig
//! transactions and the confirmation/execution evidence attached to them.
//! It includes the canonical address and hash types, type-safe builders for
//! the tracked records, and the on-chain transaction hashing scheme.

pub mod address;
pub mod confirmation;
pub mod tx;
pub mod tx_hash;

#[cfg(feature = "serde")]
pub mod with_serde;

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row creation and modification times.
///
/// Records carry this as their auxiliary data (`AUX`) once they have been
/// persisted; freshly parsed records use `()` until the store assigns
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamps {
    /// The timestamp when the entity was created.
    created_at: DateTime<Utc>,
    /// The timestamp when the entity was last updated.
    updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
