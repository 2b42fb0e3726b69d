//! Background work issued by the dashboard.
//!
//! Each operation runs on an ftui task thread and completes with exactly one
//! `Msg`. Errors cross the thread boundary as their display string.

use std::sync::Arc;

use arr_common::{CollectionSpec, Error, Result, RoutineRecord, UserRecord, ROUTINES};
use ftui::Cmd as FtuiCmd;

use super::msg::Msg;
use crate::gateway::{DocumentStore, Gateway, Services, UserDirectory};

/// Users requested per page from the auth directory.
pub const USER_PAGE_SIZE: u32 = 1000;

/// Connect the gateway.
pub fn initialize(gateway: &dyn Gateway) -> std::result::Result<Services, String> {
    gateway.initialize().map_err(|e| {
        tracing::error!(
            target: "tui.async_complete",
            gateway = gateway.name(),
            code = e.code(),
            error = %e,
            "Gateway initialization failed"
        );
        e.to_string()
    })
}

/// Drain every user from the directory.
///
/// The first failed item aborts the whole listing.
pub fn fetch_users(users: Option<&dyn UserDirectory>) -> Result<Vec<UserRecord>> {
    let users = users.ok_or(Error::NotInitialized { service: "auth" })?;
    users.list_users(USER_PAGE_SIZE, None)?.collect()
}

/// Drain and decode a whole collection.
pub fn fetch_collection<T>(
    store: Option<&dyn DocumentStore>,
    spec: &CollectionSpec<T>,
) -> Result<Vec<T>> {
    let store = store.ok_or(Error::NotInitialized {
        service: "firestore",
    })?;
    store
        .list_documents(spec.name)?
        .map(|doc| doc.and_then(spec.decode))
        .collect()
}

pub fn init_cmd(gateway: Arc<dyn Gateway>) -> FtuiCmd<Msg> {
    FtuiCmd::sequence(vec![
        FtuiCmd::log(format!("init: connecting ({})", gateway.name())),
        FtuiCmd::task_named("init-gateway", move || {
            Msg::GatewayReady(initialize(gateway.as_ref()))
        }),
    ])
}

pub fn users_cmd(users: Arc<dyn UserDirectory>) -> FtuiCmd<Msg> {
    FtuiCmd::sequence(vec![
        FtuiCmd::log("users: fetching"),
        FtuiCmd::task_named("fetch-users", move || {
            Msg::UsersLoaded(fetch_users(Some(users.as_ref())).map_err(|e| e.to_string()))
        }),
    ])
}

pub fn routines_cmd(store: Arc<dyn DocumentStore>) -> FtuiCmd<Msg> {
    FtuiCmd::sequence(vec![
        FtuiCmd::log("routines: fetching"),
        FtuiCmd::task_named("fetch-routines", move || {
            Msg::RoutinesLoaded(
                fetch_collection::<RoutineRecord>(Some(store.as_ref()), &ROUTINES)
                    .map_err(|e| e.to_string()),
            )
        }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use arr_common::{Document, FieldValue};
    use std::collections::BTreeMap;

    fn routine_doc(id: &str, name: FieldValue) -> Document {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), name);
        Document::new(id, fields)
    }

    #[test]
    fn test_fetch_users_without_directory() {
        let err = fetch_users(None).unwrap_err();
        assert!(matches!(err, Error::NotInitialized { service: "auth" }));
    }

    #[test]
    fn test_fetch_collection_without_store() {
        let err = fetch_collection(None, &ROUTINES).unwrap_err();
        assert!(matches!(
            err,
            Error::NotInitialized {
                service: "firestore"
            }
        ));
    }

    #[test]
    fn test_fetch_users_drains_all_pages() {
        let users: Vec<UserRecord> = (0..2500)
            .map(|i| UserRecord::new(format!("u{i}"), i))
            .collect();
        let gateway = MemoryGateway::new().with_users(users);
        let services = gateway.initialize().unwrap();
        let fetched = fetch_users(Some(services.users.as_ref())).unwrap();
        assert_eq!(fetched.len(), 2500);
        assert_eq!(fetched[2499].uid, "u2499");
    }

    #[test]
    fn test_fetch_users_mid_drain_failure_is_single_error() {
        let users: Vec<UserRecord> = (0..10).map(|i| UserRecord::new(format!("u{i}"), i)).collect();
        let gateway = MemoryGateway::new()
            .with_users(users)
            .fail_users_after(5, "connection reset");
        let services = gateway.initialize().unwrap();
        let err = fetch_users(Some(services.users.as_ref())).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_fetch_collection_decodes_in_order() {
        let gateway = MemoryGateway::new().with_documents(
            "routines",
            vec![
                routine_doc("b", FieldValue::String("Push".into())),
                routine_doc("a", FieldValue::String("Pull".into())),
            ],
        );
        let services = gateway.initialize().unwrap();
        let routines = fetch_collection(Some(services.store.as_ref()), &ROUTINES).unwrap();
        let ids: Vec<&str> = routines.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(routines[0].name.as_deref(), Some("Push"));
    }

    #[test]
    fn test_fetch_collection_decode_failure_fails_whole() {
        let gateway = MemoryGateway::new().with_documents(
            "routines",
            vec![
                routine_doc("ok", FieldValue::String("Legs".into())),
                routine_doc("bad", FieldValue::Integer(7)),
            ],
        );
        let services = gateway.initialize().unwrap();
        let err = fetch_collection(Some(services.store.as_ref()), &ROUTINES).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_initialize_maps_error_to_string() {
        let gateway = MemoryGateway::new().failing_init("/nowhere");
        let err = initialize(&gateway).unwrap_err();
        assert!(err.contains("/nowhere"));
    }
}
