//! tinyboard/crates/tb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Tinyboard.

pub mod error;
pub mod models;
pub mod origin;
pub mod rate;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use origin::*;
pub use rate::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_board_serializes_with_attachment_fields() {
        let board = Board {
            bnum: 1,
            id: "user1".to_string(),
            title: "Hello Rust!".to_string(),
            content: "First board entry".to_string(),
            writedate: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["bnum"], 1);
        assert_eq!(json["title"], "Hello Rust!");
    }
}
