mod common;

use std::sync::Arc;

use common::{ScriptedClient, job, page, server_error};
use jobboard_stores::{
    Account, AdminConfig, ChannelNotifier, HR_ROLE, JobAdminStore, Level, Notification,
    Permission, PermissionAdminStore,
};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

fn permission(id: &str, module: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": format!("permission {id}"),
        "apiPath": "/api/v1/jobs",
        "module": module,
        "method": "GET"
    })
}

/// Listings answer with two jobs or one permission, single records with
/// `j1`, and anything touching a `locked` id fails.
fn backend() -> Arc<ScriptedClient> {
    ScriptedClient::new(|call| {
        if call.path.contains("locked") {
            return Err(server_error("Record is locked"));
        }
        match call.method {
            "GET" if call.path.starts_with("jobs?") => Ok(page(
                vec![job("j1", 2000.0), job("j2", 3000.0)],
                1,
                6,
                2,
            )),
            "GET" if call.path.starts_with("jobs/") => Ok(job("j1", 2000.0)),
            "GET" if call.path.starts_with("permissions?") => {
                Ok(page(vec![permission("p1", "JOBS")], 1, 6, 1))
            }
            _ => Ok(json!({ "_id": "created" })),
        }
    })
}

fn job_store(
    client: Arc<ScriptedClient>,
    account: Account,
) -> (JobAdminStore, UnboundedReceiver<Notification>) {
    let (notifier, notes) = ChannelNotifier::new();
    let store = JobAdminStore::with_parts(
        client,
        Arc::new(notifier),
        account,
        AdminConfig::default(),
    );
    (store, notes)
}

fn hr() -> Account {
    Account::new(HR_ROLE, Some("c1".to_string()))
}

fn admin() -> Account {
    Account::new("SUPER_ADMIN", None)
}

#[tokio::test]
async fn hr_listing_is_scoped_to_company() {
    let client = backend();
    let (store, _notes) = job_store(client.clone(), hr());
    assert!(store.load().await);

    assert_eq!(
        client.gets(),
        vec!["jobs?current=1&pageSize=6&isActive=true&sort=-createdAt&companyId=c1".to_string()]
    );
    let state = store.snapshot();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.meta.total, 2);
    assert!(!state.loading);
}

#[tokio::test]
async fn admin_listing_is_unscoped() {
    let client = backend();
    let (store, _notes) = job_store(client.clone(), admin());
    store.load().await;
    assert!(!client.gets()[0].contains("companyId"));
}

#[tokio::test]
async fn search_resets_to_first_page() {
    let client = backend();
    let (store, _notes) = job_store(client.clone(), admin());
    store.set_page(4).await;
    assert!(client.gets()[0].contains("current=4"));

    store.search("dev").await;
    let last = client.gets().pop().expect("a request");
    assert!(last.contains("current=1"), "{last}");
    assert!(last.contains("name=%2Fdev%2F"), "{last}");
    assert_eq!(store.snapshot().search_value, "dev");
}

#[tokio::test]
async fn active_filter_toggles_listing() {
    let client = backend();
    let (store, _notes) = job_store(client.clone(), admin());
    store.set_active_only(false).await;

    let last = client.gets().pop().expect("a request");
    assert!(last.contains("isActive=false"), "{last}");
    assert!(!store.snapshot().active_only);
}

#[tokio::test]
async fn permission_search_filters_on_module() {
    let client = backend();
    let (notifier, _notes) = ChannelNotifier::new();
    let store = PermissionAdminStore::with_parts(
        client.clone(),
        Arc::new(notifier),
        hr(),
        AdminConfig::default(),
    );
    assert!(store.search("JOBS").await);

    assert_eq!(
        client.gets(),
        vec!["permissions?current=1&pageSize=6&sort=-createdAt&module=%2FJOBS%2F".to_string()]
    );
    let items: Vec<Permission> = store.snapshot().items;
    assert_eq!(items[0].module, "JOBS");
    assert_eq!(items[0].api_path, "/api/v1/jobs");
}

#[tokio::test]
async fn create_posts_form_and_reloads() {
    let client = backend();
    let (store, mut notes) = job_store(client.clone(), hr());
    store.open_create();
    let mut form = store.snapshot().form;
    assert_eq!(form.company.id, "c1");
    form.name = "Rust Engineer".to_string();
    form.salary = 4000.0;
    store.set_form(form);

    assert!(store.save().await);

    let calls = client.calls();
    let post = calls
        .iter()
        .find(|c| c.method == "POST")
        .expect("create request");
    assert_eq!(post.path, "jobs");
    let body = post.body.as_ref().expect("body");
    assert_eq!(body["name"], "Rust Engineer");
    assert_eq!(body["companyId"], "c1");
    assert!(body.get("_id").is_none());

    // Reloaded after the create.
    assert_eq!(calls.last().map(|c| c.method), Some("GET"));

    let state = store.snapshot();
    assert!(!state.modal_open);
    assert!(state.form.name.is_empty());
    assert!(!state.loading);

    let note = notes.try_recv().expect("success reported");
    assert_eq!(note.level, Level::Success);
    assert_eq!(note.message, "Created successfully");
}

#[tokio::test]
async fn edit_then_save_patches_record() {
    let client = backend();
    let (store, mut notes) = job_store(client.clone(), admin());
    assert!(store.open_edit("j1").await);

    let state = store.snapshot();
    assert!(state.modal_open);
    assert_eq!(state.form.id, "j1");
    assert_eq!(state.form.company.id, "c1");

    assert!(store.save().await);
    let patch = client
        .calls()
        .into_iter()
        .find(|c| c.method == "PATCH")
        .expect("update request");
    assert_eq!(patch.path, "jobs/j1");
    assert_eq!(patch.body.expect("body")["companyId"], "c1");
    assert_eq!(notes.try_recv().expect("notified").message, "Updated successfully");
}

#[tokio::test]
async fn delete_reports_success_and_reloads() {
    let client = backend();
    let (store, mut notes) = job_store(client.clone(), admin());
    assert!(store.delete("j2").await);

    let calls = client.calls();
    assert_eq!(calls[0].method, "DELETE");
    assert_eq!(calls[0].path, "jobs/j2");
    assert_eq!(calls[1].method, "GET");
    assert_eq!(notes.try_recv().expect("notified").message, "Deleted successfully");
}

#[tokio::test]
async fn failed_delete_notifies_server_message_and_clears_loading() {
    let client = backend();
    let (store, mut notes) = job_store(client.clone(), admin());
    assert!(!store.delete("locked").await);

    let note = notes.try_recv().expect("failure reported");
    assert_eq!(note.level, Level::Error);
    assert_eq!(note.message, "Record is locked");
    assert!(!store.snapshot().loading);
    // No reload after a failure.
    assert_eq!(client.gets().len(), 0);
}

#[tokio::test]
async fn failed_edit_keeps_modal_closed() {
    let client = backend();
    let (store, mut notes) = job_store(client, admin());
    assert!(!store.open_edit("locked").await);
    assert!(!store.snapshot().modal_open);
    assert_eq!(notes.try_recv().expect("failure reported").level, Level::Error);
}

#[tokio::test]
async fn loading_stays_set_while_an_overlapping_action_runs() {
    let client = backend();
    let (store, _notes) = job_store(client.clone(), admin());
    let gate = client.hold("jobs?current=1");

    let slow_load = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    gate.entered.await.expect("load issued");

    assert!(store.delete("j2").await);
    assert!(store.snapshot().loading, "first load still in flight");

    gate.release.send(()).expect("release load");
    assert!(slow_load.await.expect("join"));
    assert!(!store.snapshot().loading);
}
