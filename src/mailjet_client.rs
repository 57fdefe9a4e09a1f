use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use strum_macros::AsRefStr;
use tracing::{debug, instrument};

use crate::{
    config::MailjetCredentials,
    list_provider::{ContactOutcome, ListProvider, MembershipOutcome, ProviderError, Result},
    web::types::ValidEmail,
};

/// Mailjet answers `400` both for "contact already exists" and "already in the list".
const CONFLICT_STATUS: StatusCode = StatusCode::BAD_REQUEST;
/// Lowercase fragments that mark a `managecontact` error as "already a member".
const ALREADY_MEMBER_HINTS: [&str; 2] = ["already", "exist"];
/// Error body fields that can carry the "already a member" hint.
const ERROR_TEXT_FIELDS: [&str; 2] = ["ErrorMessage", "ErrorInfo"];

#[derive(Debug, Clone, Copy, AsRefStr)]
pub enum ListAction {
    /// Adds the contact, but keeps an unsubscribed contact unsubscribed.
    #[strum(serialize = "addnoforce")]
    AddNoForce,
}

/// Client for the Mailjet v3 REST API, scoped to a single contact list.
#[derive(Debug)]
pub struct MailjetClient {
    pub http_client: Client,
    pub base_url: Url,
    pub contact_list_id: String,
    api_key: SecretString,
    secret_key: SecretString,
}

impl MailjetClient {
    pub fn new<S: AsRef<str>>(
        base_url: S,
        credentials: MailjetCredentials,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())
            .map_err(|e| ProviderError::UrlParsing(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::UrlParsing(format!(
                "'{base_url}' cannot be a base url"
            )));
        }
        // Canonical trailing slash, `endpoint` pops the empty segment again.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(MailjetClient {
            http_client,
            base_url,
            contact_list_id: credentials.contact_list_id,
            api_key: credentials.api_key,
            secret_key: credentials.secret_key,
        })
    }

    /// `POST contact` - creates the contact, included in campaigns.
    #[instrument(name = "mailjet create_contact", skip_all)]
    pub async fn create_contact(&self, email: &ValidEmail) -> Result<Response> {
        let url = self.endpoint(&["contact"])?;
        let body = CreateContact {
            email: email.as_ref(),
            is_excluded_from_campaigns: false,
        };

        let resp = self
            .http_client
            .post(url)
            .basic_auth(self.api_key.expose_secret(), Some(self.secret_key.expose_secret()))
            .json(&body)
            .send()
            .await?;

        Ok(resp)
    }

    /// `GET contact/{email}` - looks up an existing contact.
    #[instrument(name = "mailjet get_contact", skip_all)]
    pub async fn get_contact(&self, email: &ValidEmail) -> Result<Response> {
        let url = self.endpoint(&["contact", email.as_ref()])?;

        let resp = self
            .http_client
            .get(url)
            .basic_auth(self.api_key.expose_secret(), Some(self.secret_key.expose_secret()))
            .send()
            .await?;

        Ok(resp)
    }

    /// `POST contactslist/{id}/managecontact` - applies `action` to the contact.
    #[instrument(name = "mailjet manage_list_contact", skip_all, fields(list_id = %self.contact_list_id))]
    pub async fn manage_list_contact(
        &self,
        email: &ValidEmail,
        action: ListAction,
    ) -> Result<Response> {
        let url = self.endpoint(&["contactslist", &self.contact_list_id, "managecontact"])?;
        let body = ManageContact {
            email: email.as_ref(),
            action: action.as_ref(),
        };

        let resp = self
            .http_client
            .post(url)
            .basic_auth(self.api_key.expose_secret(), Some(self.secret_key.expose_secret()))
            .json(&body)
            .send()
            .await?;

        Ok(resp)
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::UrlParsing(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ListProvider for MailjetClient {
    async fn ensure_contact(&self, email: &ValidEmail) -> Result<ContactOutcome> {
        let resp = self.create_contact(email).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(ContactOutcome::Created);
        }

        let body = read_error_body(resp).await?;
        if status != CONFLICT_STATUS {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%body, "contact creation conflicted, confirming the contact exists");
        let resp = self.get_contact(email).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(ContactOutcome::AlreadyExists);
        }

        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body: read_error_body(resp).await?,
        })
    }

    async fn ensure_list_membership(&self, email: &ValidEmail) -> Result<MembershipOutcome> {
        let resp = self
            .manage_list_contact(email, ListAction::AddNoForce)
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(MembershipOutcome::Added);
        }

        let body = read_error_body(resp).await?;
        if status == CONFLICT_STATUS && is_already_member(&body) {
            return Ok(MembershipOutcome::AlreadyMember);
        }

        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

// ###################################
// ->   HELPERS
// ###################################
/// Reads an error response body, keeping non-JSON bodies as a plain string.
async fn read_error_body(resp: Response) -> Result<Value> {
    let text = resp.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Ok(body)
}

/// Mailjet is not consistent about where it puts the error text, so both the top-level
/// fields and the ones inside an `Errors` array are checked.
fn is_already_member(body: &Value) -> bool {
    let nested = body
        .get("Errors")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    std::iter::once(body)
        .chain(nested)
        .flat_map(|entry| ERROR_TEXT_FIELDS.iter().filter_map(move |f| entry.get(*f)))
        .filter_map(Value::as_str)
        .map(str::to_lowercase)
        .any(|text| ALREADY_MEMBER_HINTS.iter().any(|hint| text.contains(hint)))
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContact<'a> {
    pub email: &'a str,
    pub is_excluded_from_campaigns: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManageContact<'a> {
    pub email: &'a str,
    pub action: &'a str,
}
