//! Remote data gateway.
//!
//! The dashboard never talks to Firebase directly. It holds one
//! `Arc<dyn Gateway>`, calls [`Gateway::initialize`] once at startup, and
//! reads users and documents through the [`Services`] handles that come back.
//!
//! Two implementations ship:
//! - [`FirebaseGateway`]: Google REST APIs authenticated with a service account
//! - [`MemoryGateway`]: fixtures for tests and `--demo`
//!
//! Listings are lazy: each returns an iterator that fetches the next page
//! only when the previous one is drained, and yields one `Result` per
//! record so a failure mid-way surfaces at the exact item where it happened.

pub mod firebase;
pub mod memory;
pub mod token;
mod wire;

pub use firebase::FirebaseGateway;
pub use memory::MemoryGateway;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use arr_common::{Document, Result, UserRecord};

/// A lazily paged sequence of records.
pub type RecordStream<'a, T> = Box<dyn Iterator<Item = Result<T>> + Send + 'a>;

/// Lists Firebase Authentication users.
pub trait UserDirectory: Send + Sync {
    /// Iterate over every user, starting at `page_token` (or the first page).
    fn list_users(&self, page_size: u32, page_token: Option<&str>)
        -> Result<RecordStream<'_, UserRecord>>;
}

/// Lists documents of a Firestore collection.
pub trait DocumentStore: Send + Sync {
    fn list_documents(&self, collection: &str) -> Result<RecordStream<'_, Document>>;
}

/// Connection lifecycle.
pub trait Gateway: Send + Sync {
    /// Validate credentials and connect. Returns the service handles.
    fn initialize(&self) -> Result<Services>;

    /// Release the connection. Safe to call more than once.
    fn close(&self) -> Result<()>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Handles produced by a successful [`Gateway::initialize`].
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserDirectory>,
    pub store: Arc<dyn DocumentStore>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("users", &"<dyn UserDirectory>")
            .field("store", &"<dyn DocumentStore>")
            .finish()
    }
}

/// One page returned by a paged listing call.
pub struct Page<T> {
    pub items: Vec<Result<T>>,
    pub next_page_token: Option<String>,
}

type FetchPage<'a, T> = Box<dyn FnMut(Option<&str>) -> Result<Page<T>> + Send + 'a>;

/// Iterator that pulls pages on demand.
///
/// After a page fetch fails the error is yielded once and iteration ends.
pub struct Paged<'a, T> {
    buffer: VecDeque<Result<T>>,
    next_token: Option<String>,
    started: bool,
    exhausted: bool,
    fetch: FetchPage<'a, T>,
}

impl<'a, T> Paged<'a, T> {
    pub fn new(
        first_token: Option<&str>,
        fetch: impl FnMut(Option<&str>) -> Result<Page<T>> + Send + 'a,
    ) -> Self {
        Self {
            buffer: VecDeque::new(),
            next_token: first_token.map(str::to_string),
            started: false,
            exhausted: false,
            fetch: Box::new(fetch),
        }
    }

    fn fill(&mut self) {
        if self.started && self.next_token.is_none() {
            self.exhausted = true;
            return;
        }
        self.started = true;

        match (self.fetch)(self.next_token.as_deref()) {
            Ok(page) => {
                self.next_token = page.next_page_token.filter(|t| !t.is_empty());
                self.buffer.extend(page.items);
                if self.next_token.is_none() && self.buffer.is_empty() {
                    self.exhausted = true;
                }
            }
            Err(err) => {
                self.exhausted = true;
                self.buffer.push_back(Err(err));
            }
        }
    }
}

impl<T> Iterator for Paged<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(item);
            }
            if self.exhausted {
                return None;
            }
            self.fill();
        }
    }
}
