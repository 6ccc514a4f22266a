//! AAI@EduHr federation.
//!
//! This module provides:
//!
//! - Typed assertions built from released SAML attributes
//! - The identity-provider client interface
//! - The identity reconciliation flow (find-or-create local accounts)

pub mod assertion;
pub mod idp;
pub mod reconcile;

pub use assertion::{Assertion, AttributeMap, attributes};
pub use idp::{AuthRequirement, IdentityProviderClient, IdpError, IdpRequest, IdpResult};
pub use reconcile::{ReconcileAction, ReconcileOutcome, Reconciler, federated_metadata};
