//! # credstatus-store — Status List Persistence
//!
//! [`StatusListRepository`] is the storage contract the status services
//! are written against. Two backends implement it:
//!
//! - [`InMemoryStatusListRepository`]: process-local, for tests and
//!   single-node development.
//! - [`PgStatusListRepository`]: PostgreSQL via SQLx, with embedded
//!   migrations run by [`postgres::init_pool`].
//!
//! ## Atomicity
//!
//! Both backends provide the two primitives the engine depends on:
//!
//! - **Allocation**: [`StatusListRepository::create_status_entry`] inserts
//!   the entry and bumps `usedEntries` in one unit, under a lock on the
//!   list. The entry gets the next free slot even when another allocator
//!   took the index it asked for, so contention never fails an allocation.
//! - **Status change**: [`StatusListRepository::update_credential_status`]
//!   rewrites the entry's `currentStatus` and the owning list's
//!   `encodedList` together, computed from the latest stored bitstring.
//!
//! [`StatusListRepository::update`] never writes `encodedList` or
//! `usedEntries`, so a stale copy of a list cannot roll either back.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::StoreError;
pub use memory::InMemoryStatusListRepository;
pub use postgres::PgStatusListRepository;
pub use repository::StatusListRepository;
