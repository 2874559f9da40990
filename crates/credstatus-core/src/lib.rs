#![deny(missing_docs)]

//! # credstatus-core — Foundational Types for the Status List Engine
//!
//! Leaf crate of the workspace. Defines the domain primitives every other
//! crate shares:
//!
//! - **Identifiers** ([`StatusListId`], [`StatusEntryId`], [`IssuerId`],
//!   [`CredentialId`]). Distinct newtypes, so a list id can never be passed
//!   where a credential id is expected.
//! - **Status semantics** ([`StatusPurpose`], [`StatusSize`]). Closed enums;
//!   parsing an unknown purpose or an unsupported width is a
//!   [`ValidationError`], never a silent default.
//! - **Time** ([`Timestamp`]). UTC with seconds precision, so values survive
//!   a round trip through any datastore unchanged.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credstatus-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod status;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{CredentialId, IssuerId, StatusEntryId, StatusListId};
pub use status::{StatusPurpose, StatusSize, MIN_TOTAL_ENTRIES};
pub use temporal::Timestamp;
