use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The only one-time code `/api/auth/2fa/verify` and 2FA logins accept.
pub const STUB_OTP_CODE: &str = "123456";

pub const TEST_USER: &str = "testuser";
pub const TEST_PASSWORD: &str = "testpassword";
pub const TEST_PASSWORD_HASH: &str = "hashedpassword";

const MODIFIED: &str = "2024-05-01T10:00:00Z";

#[derive(Clone, Debug)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub password_hash: String,
    pub base_path: String,
    pub role: i64,
    pub permission: u32,
    pub disabled: bool,
    pub otp_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: i64,
    pub is_dir: bool,
    pub modified: String,
    pub created: String,
    pub sign: String,
    pub thumb: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub raw_url: String,
}

#[derive(Clone, Debug)]
struct Node {
    is_dir: bool,
    size: i64,
}

/// In-memory server state: accounts, issued tokens, pending 2FA secrets and
/// a flat path-keyed file tree.
#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, User>,
    tokens: HashMap<String, String>,
    pending_2fa: HashMap<String, String>,
    files: BTreeMap<String, Node>,
}

impl Store {
    /// `testuser` plus a small tree: `/docs`, `/docs/readme.md`, `/hello.txt`.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.users.insert(
            TEST_USER.to_string(),
            User {
                id: 1,
                username: TEST_USER.to_string(),
                password: TEST_PASSWORD.to_string(),
                password_hash: TEST_PASSWORD_HASH.to_string(),
                base_path: "/".to_string(),
                role: 2,
                permission: 0x3ff,
                disabled: false,
                otp_enabled: false,
            },
        );
        store.files.insert("/".to_string(), Node { is_dir: true, size: 0 });
        store.files.insert("/docs".to_string(), Node { is_dir: true, size: 0 });
        store.files.insert("/docs/readme.md".to_string(), Node { is_dir: false, size: 42 });
        store.files.insert("/hello.txt".to_string(), Node { is_dir: false, size: 11 });
        store
    }

    fn user_for(&self, token: &str) -> Option<&User> {
        self.tokens.get(token).and_then(|name| self.users.get(name))
    }

    fn children(&self, dir: &str) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| path.as_str() != "/" && parent(path) == dir)
            .cloned()
            .collect()
    }

    fn file_info(&self, path: &str) -> Option<FileInfo> {
        let node = self.files.get(path)?;
        Some(FileInfo {
            name: base_name(path).to_string(),
            size: node.size,
            is_dir: node.is_dir,
            modified: MODIFIED.to_string(),
            created: MODIFIED.to_string(),
            sign: String::new(),
            thumb: String::new(),
            kind: if node.is_dir { 1 } else { 0 },
            raw_url: if node.is_dir {
                String::new()
            } else {
                format!("/d{path}")
            },
        })
    }

    /// Move `from` and everything beneath it to `to`.
    fn move_subtree(&mut self, from: &str, to: &str) {
        let prefix = format!("{from}/");
        let moved: Vec<String> = self
            .files
            .keys()
            .filter(|path| path.as_str() == from || path.starts_with(&prefix))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = self.files.remove(&old) {
                let new = format!("{to}{}", &old[from.len()..]);
                self.files.insert(new, node);
            }
        }
    }

    fn remove_subtree(&mut self, path: &str) {
        let prefix = format!("{path}/");
        self.files
            .retain(|key, _| key.as_str() != path && !key.starts_with(&prefix));
    }
}

pub type Db = Arc<RwLock<Store>>;

type Reply = Result<Json<Value>, Json<Value>>;

fn ok(data: Value) -> Reply {
    Ok(Json(json!({"code": 200, "message": "success", "data": data})))
}

fn fail(code: i64, message: &str) -> Json<Value> {
    Json(json!({"code": code, "message": message, "data": null}))
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/login/hash", post(login_hash))
        .route("/api/auth/2fa/generate", post(generate_2fa))
        .route("/api/auth/2fa/verify", post(verify_2fa))
        .route("/api/me", get(me))
        .route("/api/fs/list", post(fs_list))
        .route("/api/fs/get", post(fs_get))
        .route("/api/fs/mkdir", post(fs_mkdir))
        .route("/api/fs/rename", post(fs_rename))
        .route("/api/fs/remove", post(fs_remove))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn join(dir: &str, name: &str) -> String {
    normalize(&format!("{dir}/{name}"))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Resolve the bearer token to a username, or reply with the 401 envelope.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, Json<Value>> {
    let token = bearer(headers).ok_or_else(|| fail(401, "token is missing"))?;
    store
        .user_for(token)
        .map(|user| user.username.clone())
        .ok_or_else(|| fail(401, "that token is invalid"))
}

// --- auth ---

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub opt_code: Option<String>,
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Reply {
    issue_token(&db, input, |user, password| user.password == password).await
}

async fn login_hash(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Reply {
    issue_token(&db, input, |user, password| user.password_hash == password).await
}

async fn issue_token(db: &Db, input: LoginRequest, check: impl Fn(&User, &str) -> bool) -> Reply {
    let mut store = db.write().await;
    let user = store
        .users
        .get(&input.username)
        .filter(|user| check(*user, &input.password))
        .ok_or_else(|| fail(400, "wrong password"))?;
    if user.disabled {
        return Err(fail(403, "the user is disabled"));
    }
    if user.otp_enabled && input.opt_code.as_deref() != Some(STUB_OTP_CODE) {
        return Err(fail(402, "Invalid 2FA code"));
    }
    let username = user.username.clone();
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), username.clone());
    tracing::info!(%username, "issued token");
    ok(json!({"token": token}))
}

async fn generate_2fa(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut store = db.write().await;
    let username = authorize(&store, &headers)?;
    let token = bearer(&headers).unwrap_or_default().to_string();
    let secret = Uuid::new_v4().simple().to_string().to_uppercase();
    store.pending_2fa.insert(token, secret.clone());
    ok(json!({
        "qr": format!("otpauth://totp/alist:{username}?secret={secret}"),
        "secret": secret,
    }))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub code: String,
    pub secret: String,
}

async fn verify_2fa(State(db): State<Db>, headers: HeaderMap, Json(input): Json<VerifyRequest>) -> Reply {
    let mut store = db.write().await;
    let username = authorize(&store, &headers)?;
    let token = bearer(&headers).unwrap_or_default().to_string();
    if store.pending_2fa.get(&token) != Some(&input.secret) {
        return Err(fail(400, "2FA secret mismatch"));
    }
    if input.code != STUB_OTP_CODE {
        return Err(fail(400, "Invalid 2FA code"));
    }
    store.pending_2fa.remove(&token);
    if let Some(user) = store.users.get_mut(&username) {
        user.otp_enabled = true;
    }
    ok(Value::Null)
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let username = authorize(&store, &headers)?;
    let user = store
        .users
        .get(&username)
        .ok_or_else(|| fail(500, "user not found"))?;
    ok(json!({
        "id": user.id,
        "username": user.username,
        "password": "",
        "base_path": user.base_path,
        "role": user.role,
        "disabled": user.disabled,
        "permission": user.permission,
        "sso_id": "",
        "opt": user.otp_enabled,
    }))
}

// --- fs ---

#[derive(Deserialize)]
pub struct ListRequest {
    pub path: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub per_page: usize,
    #[serde(default)]
    pub refresh: bool,
}

async fn fs_list(State(db): State<Db>, headers: HeaderMap, Json(input): Json<ListRequest>) -> Reply {
    let store = db.read().await;
    authorize(&store, &headers)?;
    let path = normalize(&input.path);
    match store.files.get(&path) {
        Some(node) if node.is_dir => {}
        Some(_) => return Err(fail(500, "not a folder")),
        None => return Err(fail(500, "object not found")),
    }

    let children = store.children(&path);
    let total = children.len();
    let page: Vec<FileInfo> = children
        .iter()
        .skip(input.page.saturating_sub(1).saturating_mul(input.per_page))
        .take(if input.per_page == 0 { usize::MAX } else { input.per_page })
        .filter_map(|child| store.file_info(child))
        .collect();
    // An empty directory is sent as `null`, like the real server does.
    let content = if page.is_empty() { Value::Null } else { json!(page) };
    ok(json!({
        "content": content,
        "total": total,
        "readme": "",
        "header": "",
        "write": true,
        "provider": "Local",
    }))
}

#[derive(Deserialize)]
pub struct GetRequest {
    pub path: String,
    pub password: Option<String>,
}

async fn fs_get(State(db): State<Db>, headers: HeaderMap, Json(input): Json<GetRequest>) -> Reply {
    let store = db.read().await;
    authorize(&store, &headers)?;
    let info = store
        .file_info(&normalize(&input.path))
        .ok_or_else(|| fail(500, "object not found"))?;
    ok(json!(info))
}

#[derive(Deserialize)]
pub struct MkdirRequest {
    pub path: String,
}

async fn fs_mkdir(State(db): State<Db>, headers: HeaderMap, Json(input): Json<MkdirRequest>) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    let path = normalize(&input.path);

    // Create missing ancestors as well, refusing to go through a file.
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current = join(&current, segment);
        match store.files.get(&current) {
            Some(node) if !node.is_dir => return Err(fail(500, "file exists")),
            Some(_) => {}
            None => {
                store.files.insert(current.clone(), Node { is_dir: true, size: 0 });
            }
        }
    }
    ok(Value::Null)
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub path: String,
    pub name: String,
}

async fn fs_rename(State(db): State<Db>, headers: HeaderMap, Json(input): Json<RenameRequest>) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    if input.name.is_empty() || input.name.contains('/') {
        return Err(fail(400, "invalid name"));
    }
    let path = normalize(&input.path);
    if path == "/" || !store.files.contains_key(&path) {
        return Err(fail(500, "object not found"));
    }
    let target = join(parent(&path), &input.name);
    if store.files.contains_key(&target) {
        return Err(fail(403, "object already exists"));
    }
    store.move_subtree(&path, &target);
    ok(Value::Null)
}

#[derive(Deserialize)]
pub struct RemoveRequest {
    pub dir: String,
    pub names: Vec<String>,
}

async fn fs_remove(State(db): State<Db>, headers: HeaderMap, Json(input): Json<RemoveRequest>) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    let dir = normalize(&input.dir);
    let targets: Vec<String> = input.names.iter().map(|name| join(&dir, name)).collect();
    if let Some(missing) = targets.iter().find(|t| !store.files.contains_key(t.as_str())) {
        return Err(fail(500, &format!("object not found: {missing}")));
    }
    for target in &targets {
        store.remove_subtree(target);
    }
    ok(Value::Null)
}
