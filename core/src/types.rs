//! Request and response payloads for the AList API.
//!
//! # Design
//! These mirror the server's JSON field names exactly. They are defined
//! independently from the mock-server crate so integration tests catch
//! schema drift between the two.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `/api/auth/login` and `/api/auth/login/hash`.
///
/// For the hash variant `password` already holds the caller-hashed value;
/// the client never transforms it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opt_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

/// A freshly generated 2FA secret. `qr` is the base64 image the server
/// renders for authenticator apps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoFactorSecret {
    pub qr: String,
    pub secret: String,
}

/// Body of `/api/auth/2fa/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyTwoFactor {
    pub code: String,
    pub secret: String,
}

/// The authenticated user as returned by `/api/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub base_path: String,
    pub role: i64,
    /// Permission bitmask.
    pub permission: u32,
    pub disabled: bool,
    #[serde(default)]
    pub sso_id: String,
    #[serde(rename = "opt", default)]
    pub otp_enabled: bool,
}

/// A file or directory on the remote side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: i64,
    pub is_dir: bool,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(rename = "type", default)]
    pub kind: i32,
    #[serde(default)]
    pub raw_url: String,
}

/// One page of a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    /// The server sends `null` for an empty directory.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<FileEntry>,
    pub total: u64,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub provider: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FileEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FileEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `/api/fs/list`. Zero `page`/`per_page` and a false `refresh`
/// are left out so the server applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    pub path: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub refresh: bool,
}

impl ListQuery {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Ask the server to bypass its listing cache.
    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Body of `/api/fs/get`. `password` unlocks protected folders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetQuery {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MkdirRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameRequest {
    pub path: String,
    pub name: String,
}

/// Body of `/api/fs/remove`: `names` are entries inside `dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveRequest {
    pub dir: String,
    pub names: Vec<String>,
}
