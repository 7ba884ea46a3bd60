//! # Core Traits (Ports)
//!
//! Any backend must implement these traits to be used by the binary.
//! Handlers only ever see trait objects, so storage can be swapped
//! (in-memory for tests, sqlite for production) without touching them.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Attachment, Board, NewAttachment, NewBoard, Post, Session, SessionClaims, Todo};

/// Persistence contract for the in-memory post collection.
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Post>>;
    async fn create(&self, title: String, content: String) -> Result<Post>;
    /// Replaces the whole row. `NotFound` when the id is absent.
    async fn replace(&self, id: i64, title: String, content: String) -> Result<Post>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Persistence contract for the in-memory todo collection.
#[async_trait]
pub trait TodoRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn create(&self, text: String) -> Result<Todo>;
    async fn update(&self, id: i64, text: String) -> Result<Todo>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Persistence contract for board rows and their attachments.
#[async_trait]
pub trait BoardRepo: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<Board>>;
    /// One row with its attachment, joined on `bnum`.
    async fn get_board(&self, bnum: i64) -> Result<Option<(Board, Option<Attachment>)>>;
    /// Inserts the row and, when present, its attachment in one
    /// transaction so a failure cannot leave an orphaned board row.
    async fn create_board(&self, board: NewBoard, attachment: Option<NewAttachment>) -> Result<Board>;
    async fn update_board(&self, bnum: i64, title: String, content: String) -> Result<()>;
    async fn delete_board(&self, bnum: i64) -> Result<()>;
}

/// File storage contract for uploaded attachments.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes under a generated unique filename and returns it.
    async fn save(&self, data: Vec<u8>, original_name: &str) -> Result<String>;
    /// Reads back a previously saved file.
    async fn load(&self, savefile: &str) -> Result<Vec<u8>>;
    /// Removes a saved file. Removing a name that no longer exists is
    /// not an error, so cleanup paths can call this unconditionally.
    async fn remove(&self, savefile: &str) -> Result<()>;
}

/// Identity contract: credential login and session-token verification.
pub trait AuthProvider: Send + Sync {
    /// Exact-match credential check. `InvalidCredentials` on mismatch.
    fn login(&self, username: &str, password: &str) -> Result<Session>;
    /// Signature + expiry check of a presented token.
    fn verify(&self, token: &str) -> Result<SessionClaims>;
}
