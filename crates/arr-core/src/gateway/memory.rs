//! In-memory gateway.
//!
//! Serves fixture users and documents through the same paged interface as
//! the remote gateway. Failures can be scripted: at initialization, or after
//! a given number of users have been yielded.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arr_common::{Document, Error, FieldValue, Result, UserRecord};
use chrono::{Duration, Utc};

use super::{DocumentStore, Gateway, Page, Paged, RecordStream, Services, UserDirectory};

/// Page size used when serving documents.
const DOCUMENT_PAGE_SIZE: usize = 300;

#[derive(Debug, Default, Clone)]
struct Fixtures {
    users: Vec<UserRecord>,
    documents: HashMap<String, Vec<Document>>,
    fail_users_after: Option<(usize, String)>,
}

/// Gateway backed by in-process fixtures.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    fixtures: Arc<Fixtures>,
    init_error: Option<String>,
    closed: Arc<AtomicBool>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: Vec<UserRecord>) -> Self {
        self.fixtures_mut().users = users;
        self
    }

    pub fn with_documents(mut self, collection: &str, documents: Vec<Document>) -> Self {
        self.fixtures_mut()
            .documents
            .insert(collection.to_string(), documents);
        self
    }

    /// Make `initialize` fail with a credentials error carrying `message`.
    pub fn failing_init(mut self, message: impl Into<String>) -> Self {
        self.init_error = Some(message.into());
        self
    }

    /// Yield `count` users, then a transport error instead of the rest.
    pub fn fail_users_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.fixtures_mut().fail_users_after = Some((count, message.into()));
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of fixture users.
    pub fn user_count(&self) -> usize {
        self.fixtures.users.len()
    }

    fn fixtures_mut(&mut self) -> &mut Fixtures {
        Arc::make_mut(&mut self.fixtures)
    }

    /// Sample project used by `--demo`.
    pub fn demo() -> Self {
        let now = Utc::now();
        let ms = |days: i64| (now - Duration::days(days)).timestamp_millis();

        let users = vec![
            UserRecord::new("u-9f2c41", ms(120))
                .with_email("ada@arrogance.app")
                .with_display_name("Ada Lovelace")
                .with_last_login(ms(1))
                .with_last_refresh(ms(0)),
            UserRecord::new("u-1b77e0", ms(400))
                .with_email("grace@arrogance.app")
                .with_display_name("Grace Hopper")
                .with_last_login(ms(30)),
            UserRecord::new("u-5d03aa", ms(12)).with_email("linus@arrogance.app"),
            UserRecord::new("u-c4e812", ms(60))
                .with_email("barbara@arrogance.app")
                .with_display_name("Barbara Liskov")
                .with_last_login(ms(2))
                .with_last_refresh(ms(2)),
        ];

        let routine = |id: &str, name: &str, owner: &str, created: i64, updated: i64| {
            let mut fields = BTreeMap::new();
            fields.insert("name".to_string(), FieldValue::String(name.to_string()));
            fields.insert("uid".to_string(), FieldValue::String(owner.to_string()));
            fields.insert(
                "createdAt".to_string(),
                FieldValue::Timestamp(now - Duration::days(created)),
            );
            fields.insert(
                "updatedAt".to_string(),
                FieldValue::Timestamp(now - Duration::days(updated)),
            );
            Document::new(id, fields)
        };

        let routines = vec![
            routine("r-push", "Push day", "u-9f2c41", 90, 3),
            routine("r-pull", "Pull day", "u-9f2c41", 89, 10),
            routine("r-legs", "Legs", "u-1b77e0", 200, 200),
            routine("r-mobility", "Morning mobility", "u-c4e812", 40, 1),
        ];

        MemoryGateway::new()
            .with_users(users)
            .with_documents("routines", routines)
    }
}

impl Gateway for MemoryGateway {
    fn initialize(&self) -> Result<Services> {
        if let Some(ref message) = self.init_error {
            return Err(Error::CredentialsNotFound {
                searched: message.clone(),
            });
        }
        self.closed.store(false, Ordering::SeqCst);

        let handle = Arc::new(MemoryHandle {
            fixtures: Arc::clone(&self.fixtures),
            closed: Arc::clone(&self.closed),
        });
        Ok(Services {
            users: handle.clone(),
            store: handle,
        })
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Service handle shared by the user directory and document store.
struct MemoryHandle {
    fixtures: Arc<Fixtures>,
    closed: Arc<AtomicBool>,
}

impl MemoryHandle {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::GatewayClosed);
        }
        Ok(())
    }
}

/// Encode a page offset as an opaque token.
fn offset_token(offset: usize, len: usize) -> Option<String> {
    (offset < len).then(|| format!("offset:{offset}"))
}

fn parse_token(token: Option<&str>) -> Result<usize> {
    match token {
        None => Ok(0),
        Some(token) => token
            .strip_prefix("offset:")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| Error::Auth(format!("invalid page token: {token}"))),
    }
}

impl UserDirectory for MemoryHandle {
    fn list_users(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<RecordStream<'_, UserRecord>> {
        self.ensure_open()?;
        parse_token(page_token)?;
        let page_size = page_size.max(1) as usize;
        let users = &self.fixtures.users;
        let fail_after = self.fixtures.fail_users_after.clone();

        Ok(Box::new(Paged::new(page_token, move |token| {
            self.ensure_open()?;
            let start = parse_token(token)?.min(users.len());
            let end = (start + page_size).min(users.len());

            let mut items = Vec::with_capacity(end - start);
            for (index, user) in users[start..end].iter().enumerate() {
                if let Some((limit, message)) = &fail_after {
                    if start + index >= *limit {
                        items.push(Err(Error::Transport(message.clone())));
                        return Ok(Page {
                            items,
                            next_page_token: None,
                        });
                    }
                }
                items.push(Ok(user.clone()));
            }

            Ok(Page {
                items,
                next_page_token: offset_token(end, users.len()),
            })
        })))
    }
}

impl DocumentStore for MemoryHandle {
    fn list_documents(&self, collection: &str) -> Result<RecordStream<'_, Document>> {
        self.ensure_open()?;
        let documents: &[Document] = self
            .fixtures
            .documents
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        Ok(Box::new(Paged::new(None, move |token| {
            self.ensure_open()?;
            let start = parse_token(token)?.min(documents.len());
            let end = (start + DOCUMENT_PAGE_SIZE).min(documents.len());
            Ok(Page {
                items: documents[start..end].iter().cloned().map(Ok).collect(),
                next_page_token: offset_token(end, documents.len()),
            })
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(n: usize) -> Vec<UserRecord> {
        (0..n)
            .map(|i| UserRecord::new(format!("u{i}"), i as i64 * 10))
            .collect()
    }

    #[test]
    fn test_list_users_pages_through_everything() {
        let gateway = MemoryGateway::new().with_users(users(7));
        let services = gateway.initialize().unwrap();

        let listed: Vec<UserRecord> = services
            .users
            .list_users(3, None)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(listed.len(), 7);
        assert_eq!(listed[6].uid, "u6");
    }

    #[test]
    fn test_fail_users_after_yields_error_mid_stream() {
        let gateway = MemoryGateway::new()
            .with_users(users(5))
            .fail_users_after(2, "socket closed");
        let services = gateway.initialize().unwrap();

        let items: Vec<Result<UserRecord>> =
            services.users.list_users(10, None).unwrap().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(items[2].is_err());
    }

    #[test]
    fn test_failing_init() {
        let gateway = MemoryGateway::new().failing_init("no key");
        let err = gateway.initialize().unwrap_err();
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_reads() {
        let gateway = MemoryGateway::new().with_users(users(1));
        let services = gateway.initialize().unwrap();

        gateway.close().unwrap();
        gateway.close().unwrap();
        assert!(gateway.is_closed());
        assert!(matches!(
            services.users.list_users(10, None).map(|_| ()),
            Err(Error::GatewayClosed)
        ));
    }

    #[test]
    fn test_unknown_collection_is_empty() {
        let gateway = MemoryGateway::new();
        let services = gateway.initialize().unwrap();
        assert_eq!(services.store.list_documents("nope").unwrap().count(), 0);
    }

    #[test]
    fn test_demo_has_users_and_routines() {
        let gateway = MemoryGateway::demo();
        let services = gateway.initialize().unwrap();
        assert!(gateway.user_count() >= 3);
        assert!(services.store.list_documents("routines").unwrap().count() >= 3);
    }
}
