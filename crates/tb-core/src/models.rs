//! # Domain Models
//!
//! These structs represent the core entities of Tinyboard: the two
//! in-memory collections (posts, todos), the persisted message board
//! with its optional file attachment, and the identity types used by
//! the session layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in the in-memory post collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// An entry in the in-memory todo collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
}

/// A persisted message-board row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Primary key, issued by the database sequence.
    pub bnum: i64,
    /// Author identifier as submitted with the form.
    pub id: String,
    pub title: String,
    pub content: String,
    pub writedate: DateTime<Utc>,
}

/// A file attached to one board row, keyed by `bnum`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub fnum: i64,
    pub bnum: i64,
    /// Generated unique filename under the upload directory.
    pub savefile: String,
    /// MIME type guessed from the uploaded filename.
    pub filetype: String,
    pub writedate: DateTime<Utc>,
}

/// Board row as submitted by the client, before a `bnum` exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBoard {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Attachment as stored on disk, before a `fnum` exists.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub savefile: String,
    pub filetype: String,
}

/// A registered credential pair with its display name.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password: String,
    pub nickname: String,
}

impl User {
    pub fn new(username: &str, password: &str, nickname: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            nickname: nickname.to_string(),
        }
    }
}

/// Identity claims carried by a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,
    pub nickname: String,
}

/// An issued session: the encoded token plus the claims it carries.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: SessionClaims,
}
