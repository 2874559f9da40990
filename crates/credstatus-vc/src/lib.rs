//! # credstatus-vc — Status List Credential Shapes
//!
//! Serde models for the documents the status list engine produces and
//! consumes:
//!
//! - **Envelope** ([`VerifiableCredential`]): the W3C VC Data Model 2.0
//!   envelope, generic over its `credentialSubject`.
//! - **Status list subject** ([`BitstringStatusList`]): the
//!   `credentialSubject` of a `BitstringStatusListCredential`, also used on
//!   its own as the embeddable status list descriptor.
//! - **Entry claim** ([`BitstringStatusListEntry`]): the `credentialStatus`
//!   value embedded into every issued credential.
//!
//! Signing is not performed here. Documents are handed to the issuer's
//! signer after rendering; a signed document parses back with its `proof`
//! preserved.

pub mod credential;
pub mod status;

pub use credential::{
    ContextValue, CredentialTypeValue, Issuer, IssuerProfile, VcError, VerifiableCredential,
    VC_V2_CONTEXT, VERIFIABLE_CREDENTIAL_TYPE,
};
pub use status::{
    BitstringStatusList, BitstringStatusListEntry, StatusListCredential, StatusMessage,
    BITSTRING_STATUS_LIST_CREDENTIAL_TYPE, BITSTRING_STATUS_LIST_ENTRY_TYPE,
    BITSTRING_STATUS_LIST_TYPE,
};
