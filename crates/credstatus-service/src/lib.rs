//! # credstatus-service — Status List Orchestration
//!
//! Two layers sit on top of a [`StatusListRepository`]:
//!
//! - [`StatusListService`] decides which list a new slot lives in, creates
//!   lists lazily when a group has no capacity left, and passes status
//!   changes through to the repository's atomic update.
//! - [`CredentialStatusService`] is the facade the issuance and
//!   verification flows call: it assigns a credential its slot, renders the
//!   `credentialStatus` claim to embed before signing, and renders the
//!   status list credential verifiers download.
//!
//! Neither holds mutable state of its own; every shared write goes through
//! the repository's allocation and update primitives.
//!
//! ## Wiring
//!
//! ```ignore
//! let config = StatusConfig::from_env()?;
//! let repo: Arc<dyn StatusListRepository> = match init_pool().await? {
//!     Some(pool) => Arc::new(PgStatusListRepository::new(pool)),
//!     None => Arc::new(InMemoryStatusListRepository::new()),
//! };
//! let status = CredentialStatusService::new(repo, config);
//! ```
//!
//! [`StatusListRepository`]: credstatus_store::StatusListRepository

pub mod config;
pub mod credential_status;
pub mod error;
pub mod status_list;

pub use config::{ConfigError, StatusConfig, DEFAULT_BASE_URL};
pub use credential_status::{CredentialStatusService, MAX_ALLOCATION_ATTEMPTS};
pub use error::ServiceError;
pub use status_list::StatusListService;
