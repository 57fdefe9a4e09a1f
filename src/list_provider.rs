//! The boundary to the external mailing-list provider.
//! Each call is reduced to an explicit outcome so the subscription flow never has to look at
//! provider status codes or error bodies itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::web::types::ValidEmail;

/// Result of making sure the provider has a contact record for an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Created,
    AlreadyExists,
}

/// Result of adding a contact to the mailing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    Added,
    AlreadyMember,
}

#[async_trait]
pub trait ListProvider: Send + Sync {
    /// Creates the contact, or confirms it already exists.
    async fn ensure_contact(&self, email: &ValidEmail) -> Result<ContactOutcome>;

    /// Adds the (existing) contact to the mailing list without duplicating it.
    async fn ensure_list_membership(&self, email: &ValidEmail) -> Result<MembershipOutcome>;
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, ProviderError>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: Value },

    #[error("failed to build provider url: {0}")]
    UrlParsing(String),
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Whether the provider answered at all. Transport faults never reached it, or never
    /// produced a readable response.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { .. })
    }
}
