use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;
use sha2::{Digest, Sha256};

use admingate_api::app::{self, AppState, DynIdentityStore};
use admingate_authz::TokenConfig;
use admingate_core::{GroupId, MenuId, UserId};
use admingate_identity::{
    GroupMenuRecord, GroupRecord, GroupUserRecord, InMemoryIdentityStore, RoleLevel, UserRecord,
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(state: AppState) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let router = app::build_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn password_hash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn user(id: i64, username: &str, role_level: RoleLevel) -> UserRecord {
    UserRecord {
        id: UserId::new(id),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        phone: String::new(),
        email_confirmed: true,
        password_hash: password_hash("hunter2"),
        role_level,
        is_active: true,
        is_deleted: false,
    }
}

/// Store with: member (menus 1,2 via group 10), subadmin, superadmin,
/// and an inactive group 20 holding menus 3,4.
fn seeded_store() -> Arc<InMemoryIdentityStore> {
    let store = Arc::new(InMemoryIdentityStore::new());

    store.upsert_user(user(1, "member", RoleLevel::Member));
    store.upsert_user(user(2, "subadmin", RoleLevel::SubAdmin));
    store.upsert_user(user(3, "root", RoleLevel::SuperAdmin));

    store.upsert_group(GroupRecord {
        id: GroupId::new(10),
        name: "active-group".to_string(),
        is_active: true,
        is_deleted: false,
    });
    store.upsert_group(GroupRecord {
        id: GroupId::new(20),
        name: "inactive-group".to_string(),
        is_active: false,
        is_deleted: false,
    });

    for group in [10, 20] {
        store.add_membership(GroupUserRecord {
            user_id: UserId::new(1),
            group_id: GroupId::new(group),
            is_active: true,
            is_deleted: false,
        });
    }
    for menu in [1, 2] {
        store.add_menu_grant(GroupMenuRecord {
            group_id: GroupId::new(10),
            menu_id: MenuId::new(menu),
            is_active: true,
            is_deleted: false,
        });
    }
    for menu in [3, 4] {
        store.add_menu_grant(GroupMenuRecord {
            group_id: GroupId::new(20),
            menu_id: MenuId::new(menu),
            is_active: true,
            is_deleted: false,
        });
    }

    store
}

async fn spawn_seeded() -> (TestServer, Arc<InMemoryIdentityStore>) {
    let store = seeded_store();
    let dyn_store: DynIdentityStore = store.clone();
    let state = app::build_state(TokenConfig::default(), dyn_store);
    (TestServer::spawn(state).await, store)
}

async fn login(client: &reqwest::Client, base_url: &str, username: &str) -> String {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "username": username, "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_rejects_bad_password_uniformly() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "username": "member", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let unknown = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "username": "nobody", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    // Same external message for both failures.
    let a: serde_json::Value = res.json().await.unwrap();
    let b: serde_json::Value = unknown.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn missing_token_is_401_not_403() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/admin/overview", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_gated_route_distinguishes_403_from_401() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let member_token = login(&client, &server.base_url, "member").await;
    let res = client
        .get(format!("{}/admin/overview", server.base_url))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let subadmin_token = login(&client, &server.base_url, "subadmin").await;
    let res = client
        .get(format!("{}/admin/overview", server.base_url))
        .bearer_auth(&subadmin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn super_admin_bypasses_everything() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let token = login(&client, &server.base_url, "root").await;

    for path in ["/admin/overview", "/admin/settings", "/menus/999"] {
        let res = client
            .get(format!("{}{path}", server.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "path {path}");
    }
}

#[tokio::test]
async fn menu_gate_follows_live_grants() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let token = login(&client, &server.base_url, "member").await;

    // Granted through the active group.
    let res = client
        .get(format!("{}/menus/1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Menu 3 comes only from the inactive group: no grant.
    let res = client
        .get(format!("{}/menus/3", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn me_reports_live_menu_grants() {
    let (server, _store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let token = login(&client, &server.base_url, "member").await;
    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "member");
    assert_eq!(body["role"], "Member");
    assert_eq!(body["menu_grants"], json!([1, 2]));
}

#[tokio::test]
async fn deactivated_user_token_stops_working() {
    let (server, store) = spawn_seeded().await;
    let client = reqwest::Client::new();

    let token = login(&client, &server.base_url, "member").await;
    store.set_user_active(UserId::new(1), false);

    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
