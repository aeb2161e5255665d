//! File-system endpoints under `/api/fs`. All of them require a token.

use crate::client::{AlistClient, Endpoint};
use crate::error::ApiError;
use crate::types::{FileEntry, GetQuery, ListQuery, Listing, MkdirRequest, RemoveRequest, RenameRequest};

pub const LIST: Endpoint = Endpoint::post("/api/fs/list");
pub const GET: Endpoint = Endpoint::post("/api/fs/get");
pub const MKDIR: Endpoint = Endpoint::post("/api/fs/mkdir");
pub const RENAME: Endpoint = Endpoint::post("/api/fs/rename");
pub const REMOVE: Endpoint = Endpoint::post("/api/fs/remove");

impl AlistClient {
    pub fn list(&self, token: &str, query: &ListQuery) -> Result<Listing, ApiError> {
        self.call(LIST, Some(token), Some(query))
    }

    /// Fetch one entry. `password` is only needed for protected folders.
    pub fn get(&self, token: &str, path: &str, password: Option<&str>) -> Result<FileEntry, ApiError> {
        let body = GetQuery {
            path: path.to_string(),
            password: password.map(str::to_string),
        };
        self.call(GET, Some(token), Some(&body))
    }

    pub fn mkdir(&self, token: &str, path: &str) -> Result<(), ApiError> {
        let body = MkdirRequest {
            path: path.to_string(),
        };
        self.call_unit(MKDIR, Some(token), Some(&body))
    }

    /// Rename the entry at `path`; `name` is the new base name, not a path.
    pub fn rename(&self, token: &str, path: &str, name: &str) -> Result<(), ApiError> {
        let body = RenameRequest {
            path: path.to_string(),
            name: name.to_string(),
        };
        self.call_unit(RENAME, Some(token), Some(&body))
    }

    pub fn remove<S: AsRef<str>>(&self, token: &str, dir: &str, names: &[S]) -> Result<(), ApiError> {
        let body = RemoveRequest {
            dir: dir.to_string(),
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        };
        self.call_unit(REMOVE, Some(token), Some(&body))
    }
}
