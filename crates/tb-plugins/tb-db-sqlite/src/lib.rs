//! # tb-db-sqlite
//!
//! SQLite implementation of `BoardRepo`. Maps the relational board and
//! attachment tables onto the `tb-core` domain models.
//!
//! Primary keys are `INTEGER PRIMARY KEY AUTOINCREMENT`, so ids are
//! issued atomically by the database; concurrent creates can never
//! observe the same next id.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tb_core::error::{AppError, Result};
use tb_core::models::{Attachment, Board, NewAttachment, NewBoard};
use tb_core::traits::BoardRepo;

pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

fn internal(err: sqlx::Error) -> AppError {
    AppError::Internal(err.to_string())
}

impl SqliteBoardRepo {
    /// Connects and creates the schema when it does not exist yet.
    ///
    /// The pool is capped at one connection: with `sqlite::memory:`
    /// every connection gets its own database, so a larger pool would
    /// see tables vanish between queries.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS board (
                bnum      INTEGER PRIMARY KEY AUTOINCREMENT,
                id        TEXT NOT NULL,
                title     TEXT NOT NULL,
                content   TEXT NOT NULL,
                writedate TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS attachment (
                fnum      INTEGER PRIMARY KEY AUTOINCREMENT,
                bnum      INTEGER NOT NULL,
                savefile  TEXT NOT NULL,
                filetype  TEXT NOT NULL,
                writedate TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        log::info!("sqlite board schema ready at {url}");
        Ok(Self { pool })
    }

    fn board_from_row(row: &sqlx::sqlite::SqliteRow) -> Board {
        Board {
            bnum: row.get("bnum"),
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            writedate: row.get("writedate"),
        }
    }
}

#[async_trait]
impl BoardRepo for SqliteBoardRepo {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        let rows = sqlx::query("SELECT * FROM board ORDER BY bnum ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        Ok(rows.iter().map(Self::board_from_row).collect())
    }

    async fn get_board(&self, bnum: i64) -> Result<Option<(Board, Option<Attachment>)>> {
        let row = sqlx::query("SELECT * FROM board WHERE bnum = ?")
            .bind(bnum)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;

        let board = match row {
            Some(row) => Self::board_from_row(&row),
            None => return Ok(None),
        };

        let attachment = sqlx::query(
            "SELECT * FROM attachment WHERE bnum = ? ORDER BY fnum DESC LIMIT 1",
        )
        .bind(bnum)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .map(|row| Attachment {
            fnum: row.get("fnum"),
            bnum: row.get("bnum"),
            savefile: row.get("savefile"),
            filetype: row.get("filetype"),
            writedate: row.get("writedate"),
        });

        Ok(Some((board, attachment)))
    }

    /// Atomic operation to create a board row and its attachment.
    ///
    /// The transaction ensures we don't end up with a board row whose
    /// attachment insert failed halfway.
    async fn create_board(
        &self,
        board: NewBoard,
        attachment: Option<NewAttachment>,
    ) -> Result<Board> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let row = sqlx::query(
            "INSERT INTO board (id, title, content, writedate) VALUES (?, ?, ?, ?) RETURNING bnum",
        )
        .bind(&board.id)
        .bind(&board.title)
        .bind(&board.content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;
        let bnum: i64 = row.get("bnum");

        if let Some(attachment) = &attachment {
            sqlx::query(
                "INSERT INTO attachment (bnum, savefile, filetype, writedate) VALUES (?, ?, ?, ?)",
            )
            .bind(bnum)
            .bind(&attachment.savefile)
            .bind(&attachment.filetype)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;

        Ok(Board {
            bnum,
            id: board.id,
            title: board.title,
            content: board.content,
            writedate: now,
        })
    }

    async fn update_board(&self, bnum: i64, title: String, content: String) -> Result<()> {
        let result = sqlx::query("UPDATE board SET title = ?, content = ? WHERE bnum = ?")
            .bind(title)
            .bind(content)
            .bind(bnum)
            .execute(&self.pool)
            .await
            .map_err(internal)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Board".to_string()));
        }
        Ok(())
    }

    /// Removes a board row and its attachment rows together. One
    /// transaction covers both deletes, mirroring `create_board`, so a
    /// failure in between cannot strand attachment rows.
    async fn delete_board(&self, bnum: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let result = sqlx::query("DELETE FROM board WHERE bnum = ?")
            .bind(bnum)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::NotFound("Board".to_string()));
        }

        sqlx::query("DELETE FROM attachment WHERE bnum = ?")
            .bind(bnum)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

        tx.commit().await.map_err(internal)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_board(title: &str) -> NewBoard {
        NewBoard {
            id: "user1".to_string(),
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_board_with_attachment() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();

        let attachment = NewAttachment {
            savefile: "abc123.png".to_string(),
            filetype: "image/png".to_string(),
        };
        let created = repo
            .create_board(new_board("With file"), Some(attachment))
            .await
            .expect("create failed");

        let (board, attachment) = repo.get_board(created.bnum).await.unwrap().unwrap();
        assert_eq!(board.title, "With file");
        let attachment = attachment.expect("attachment missing from join");
        assert_eq!(attachment.bnum, created.bnum);
        assert_eq!(attachment.savefile, "abc123.png");
        assert_eq!(attachment.filetype, "image/png");
    }

    #[tokio::test]
    async fn sequential_creates_get_distinct_consecutive_ids() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();

        let first = repo.create_board(new_board("one"), None).await.unwrap();
        let second = repo.create_board(new_board("two"), None).await.unwrap();
        let third = repo.create_board(new_board("three"), None).await.unwrap();

        assert_eq!(second.bnum, first.bnum + 1);
        assert_eq!(third.bnum, second.bnum + 1);

        let boards = repo.list_boards().await.unwrap();
        assert_eq!(boards.len(), 3);
    }

    #[tokio::test]
    async fn update_and_delete_report_not_found_for_missing_rows() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();
        let created = repo.create_board(new_board("row"), None).await.unwrap();

        repo.update_board(created.bnum, "edited".to_string(), "new body".to_string())
            .await
            .unwrap();
        let (board, _) = repo.get_board(created.bnum).await.unwrap().unwrap();
        assert_eq!(board.title, "edited");

        assert!(matches!(
            repo.update_board(999, "x".to_string(), "y".to_string())
                .await
                .unwrap_err(),
            AppError::NotFound(_)
        ));

        repo.delete_board(created.bnum).await.unwrap();
        assert!(repo.get_board(created.bnum).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_board(created.bnum).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn failed_attachment_insert_rolls_back_the_board_row() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();
        // Force the second insert of the transaction to fail.
        sqlx::query("DROP TABLE attachment")
            .execute(&repo.pool)
            .await
            .unwrap();

        let attachment = NewAttachment {
            savefile: "lost.png".to_string(),
            filetype: "image/png".to_string(),
        };
        let result = repo
            .create_board(new_board("doomed"), Some(attachment))
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Internal(_)));

        // The board insert succeeded inside the transaction but must
        // not survive the rollback.
        assert!(repo.list_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_takes_attachment_rows_with_the_board() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();
        let attachment = NewAttachment {
            savefile: "gone.png".to_string(),
            filetype: "image/png".to_string(),
        };
        let created = repo
            .create_board(new_board("short-lived"), Some(attachment))
            .await
            .unwrap();

        repo.delete_board(created.bnum).await.unwrap();

        let row = sqlx::query("SELECT COUNT(*) AS n FROM attachment")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 0);
    }

    #[tokio::test]
    async fn row_without_attachment_reads_back_as_none() {
        let repo = SqliteBoardRepo::new("sqlite::memory:").await.unwrap();
        let created = repo.create_board(new_board("bare"), None).await.unwrap();

        let (_, attachment) = repo.get_board(created.bnum).await.unwrap().unwrap();
        assert!(attachment.is_none());
        assert!(repo.get_board(created.bnum + 1).await.unwrap().is_none());
    }
}
