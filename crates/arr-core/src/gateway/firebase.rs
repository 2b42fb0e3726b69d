//! Firebase gateway over the Google REST APIs.
//!
//! - Users: Identity Toolkit `projects/{project}/accounts:batchGet`
//! - Documents: Firestore `projects/{project}/databases/(default)/documents/{collection}`
//!
//! Calls are blocking; the TUI runs them on background task threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arr_common::{CredentialResolver, Document, Error, Result, UserRecord};
use serde::de::DeserializeOwned;

use super::token::TokenSource;
use super::wire::{self, BatchGetResponse, ListDocumentsResponse};
use super::{DocumentStore, Gateway, Page, Paged, RecordStream, Services, UserDirectory};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per Firestore page.
const FIRESTORE_PAGE_SIZE: u32 = 300;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URLs of the two REST services.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub identity_toolkit: String,
    pub firestore: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            identity_toolkit: IDENTITY_TOOLKIT_URL.to_string(),
            firestore: FIRESTORE_URL.to_string(),
        }
    }
}

/// Gateway that authenticates with a service account key.
pub struct FirebaseGateway {
    resolver: CredentialResolver,
    endpoints: Endpoints,
    agent: ureq::Agent,
    connection: Mutex<Option<Arc<Connection>>>,
    closed: Arc<AtomicBool>,
}

impl FirebaseGateway {
    pub fn new(resolver: CredentialResolver) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("arrogance-admin/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            resolver,
            endpoints: Endpoints::default(),
            agent,
            connection: Mutex::new(None),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Point the gateway at other service roots (emulators, proxies).
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

impl Gateway for FirebaseGateway {
    fn initialize(&self) -> Result<Services> {
        let loaded = self.resolver.load()?;
        tracing::info!(
            target: "gateway.init",
            project_id = %loaded.account.project_id,
            client_email = %loaded.account.client_email,
            source = %loaded.source.resolution,
            path = %loaded.source.path.display(),
            "service account loaded"
        );

        self.closed.store(false, Ordering::SeqCst);
        let connection = Arc::new(Connection {
            project_id: loaded.account.project_id.clone(),
            tokens: TokenSource::new(loaded.account, self.agent.clone()),
            agent: self.agent.clone(),
            endpoints: self.endpoints.clone(),
            closed: Arc::clone(&self.closed),
        });

        // Fail at startup, not on the first tab switch, when the key is
        // revoked or the token endpoint is unreachable.
        connection.tokens.authorization()?;

        if let Ok(mut slot) = self.connection.lock() {
            *slot = Some(Arc::clone(&connection));
        }

        Ok(Services {
            users: connection.clone(),
            store: connection,
        })
    }

    fn close(&self) -> Result<()> {
        let was_closed = self.closed.swap(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.connection.lock() {
            if let Some(connection) = slot.take() {
                connection.tokens.clear();
            }
        }
        if !was_closed {
            tracing::info!(target: "gateway.close", "firebase gateway closed");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}

/// An authenticated connection shared by both service handles.
struct Connection {
    project_id: String,
    tokens: TokenSource,
    agent: ureq::Agent,
    endpoints: Endpoints,
    closed: Arc<AtomicBool>,
}

impl Connection {
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        wrap: fn(String) -> Error,
        what: &str,
    ) -> Result<T> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::GatewayClosed);
        }

        let authorization = self.tokens.authorization()?;
        let mut request = self.agent.get(url).set("Authorization", &authorization);
        for (key, value) in query {
            request = request.query(key, value);
        }

        tracing::debug!(target: "gateway.request", url = %url, "GET");
        let response = request.call().map_err(|e| wire::http_error(e, wrap))?;
        response
            .into_json()
            .map_err(|e| Error::decode(what, e.to_string()))
    }
}

impl UserDirectory for Connection {
    fn list_users(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<RecordStream<'_, UserRecord>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::GatewayClosed);
        }
        let url = format!(
            "{}/projects/{}/accounts:batchGet",
            self.endpoints.identity_toolkit, self.project_id
        );

        Ok(Box::new(Paged::new(page_token, move |token| {
            let mut query = vec![("maxResults", page_size.to_string())];
            if let Some(token) = token {
                query.push(("nextPageToken", token.to_string()));
            }
            let response: BatchGetResponse =
                self.get_json(&url, &query, Error::Auth, "accounts:batchGet response")?;

            tracing::debug!(
                target: "gateway.users",
                count = response.users.len(),
                more = response.next_page_token.is_some(),
                "user page received"
            );
            Ok(Page {
                items: response.users.into_iter().map(|u| u.into_record()).collect(),
                next_page_token: response.next_page_token,
            })
        })))
    }
}

impl DocumentStore for Connection {
    fn list_documents(&self, collection: &str) -> Result<RecordStream<'_, Document>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::GatewayClosed);
        }
        let url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.endpoints.firestore, self.project_id, collection
        );

        Ok(Box::new(Paged::new(None, move |token| {
            let mut query = vec![("pageSize", FIRESTORE_PAGE_SIZE.to_string())];
            if let Some(token) = token {
                query.push(("pageToken", token.to_string()));
            }
            let response: ListDocumentsResponse =
                self.get_json(&url, &query, Error::Store, "documents.list response")?;

            tracing::debug!(
                target: "gateway.documents",
                count = response.documents.len(),
                more = response.next_page_token.is_some(),
                "document page received"
            );
            Ok(Page {
                items: response
                    .documents
                    .into_iter()
                    .map(|d| d.into_document())
                    .collect(),
                next_page_token: response.next_page_token,
            })
        })))
    }
}
