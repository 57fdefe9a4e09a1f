//! The subscription flow: make sure the contact exists, then make sure it is on the list.
//! The two provider calls are strictly sequential, the list call needs an existing contact.

use tracing::{error, info};

use crate::{
    list_provider::{ContactOutcome, ListProvider, MembershipOutcome, ProviderError},
    web::types::ValidEmail,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("failed to ensure the contact exists: {0}")]
    Contact(#[source] ProviderError),
    #[error("failed to add the contact to the list: {0}")]
    ListMembership(#[source] ProviderError),
}

impl SubscriptionError {
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            SubscriptionError::Contact(er) | SubscriptionError::ListMembership(er) => er,
        }
    }
}

#[tracing::instrument(
    name = "Subscribing email to the mailing list",
    skip(provider, email),
    fields(subscriber_email = %email.as_ref())
)]
pub async fn subscribe_email(
    provider: &dyn ListProvider,
    email: &ValidEmail,
) -> Result<SubscriptionOutcome, SubscriptionError> {
    let contact = provider.ensure_contact(email).await.map_err(|er| {
        error!(error = %er, "contact step failed");
        SubscriptionError::Contact(er)
    })?;
    if contact == ContactOutcome::AlreadyExists {
        info!("contact already known to the provider");
    }

    let membership = provider.ensure_list_membership(email).await.map_err(|er| {
        error!(error = %er, "list membership step failed");
        SubscriptionError::ListMembership(er)
    })?;

    let outcome = match membership {
        MembershipOutcome::Added => SubscriptionOutcome::Subscribed,
        MembershipOutcome::AlreadyMember => SubscriptionOutcome::AlreadySubscribed,
    };
    info!(?outcome, "SUCCESS");

    Ok(outcome)
}
