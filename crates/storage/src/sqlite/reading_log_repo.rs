use chrono::NaiveDate;
use library_core::model::{BookId, DateReadingEntry, ReadingLog, ReadingLogId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{book_id_from_str, db_err, log_id_from_str, map_entry_row, ser, u32_from_i64};
use crate::repository::{ReadingLogRepository, StorageError};

async fn insert_entries(
    tx: &mut Transaction<'_, Sqlite>,
    log: &ReadingLog,
) -> Result<(), StorageError> {
    let log_id = log.id().to_string();
    for entry in log.entries() {
        sqlx::query(
            r"
            INSERT INTO reading_entries (log_id, date, last_read_page, bookmark)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&log_id)
        .bind(entry.date())
        .bind(i64::from(entry.last_read_page()))
        .bind(entry.bookmark())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

impl SqliteRepository {
    /// Rebuilds a log from its header row (joined with the book's page count).
    async fn hydrate(&self, header: &SqliteRow) -> Result<ReadingLog, StorageError> {
        let id_raw: String = header.try_get("id").map_err(ser)?;
        let book_raw: String = header.try_get("book_id").map_err(ser)?;
        let deadline: Option<NaiveDate> = header.try_get("deadline").map_err(ser)?;
        let pages = u32_from_i64("pages", header.try_get::<i64, _>("pages").map_err(ser)?)?;

        let rows = sqlx::query(
            r"
            SELECT date, last_read_page, bookmark
            FROM reading_entries
            WHERE log_id = ?1
            ORDER BY date ASC
            ",
        )
        .bind(&id_raw)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let entries = rows.iter().map(map_entry_row).collect::<Result<Vec<_>, _>>()?;

        ReadingLog::from_persisted(
            log_id_from_str(&id_raw)?,
            book_id_from_str(&book_raw)?,
            pages,
            deadline,
            entries,
        )
        .map_err(ser)
    }
}

#[async_trait::async_trait]
impl ReadingLogRepository for SqliteRepository {
    async fn insert_log(&self, log: &ReadingLog) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r"
            INSERT INTO reading_logs (id, book_id, deadline)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(log.id().to_string())
        .bind(log.book_id().to_string())
        .bind(log.deadline())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        insert_entries(&mut tx, log).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_log(&self, id: ReadingLogId) -> Result<Option<ReadingLog>, StorageError> {
        let header = sqlx::query(
            r"
            SELECT l.id, l.book_id, l.deadline, b.pages
            FROM reading_logs l
            JOIN books b ON b.id = l.book_id
            WHERE l.id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match header {
            Some(row) => self.hydrate(&row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_logs_for_book(&self, book_id: BookId) -> Result<Vec<ReadingLog>, StorageError> {
        let headers = sqlx::query(
            r"
            SELECT l.id, l.book_id, l.deadline, b.pages
            FROM reading_logs l
            JOIN books b ON b.id = l.book_id
            WHERE l.book_id = ?1
            ORDER BY l.id
            ",
        )
        .bind(book_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut out = Vec::with_capacity(headers.len());
        for row in &headers {
            out.push(self.hydrate(row).await?);
        }
        Ok(out)
    }

    async fn set_deadline(
        &self,
        id: ReadingLogId,
        deadline: Option<NaiveDate>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE reading_logs SET deadline = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(deadline)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn append_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO reading_entries (log_id, date, last_read_page, bookmark)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id.to_string())
        .bind(entry.date())
        .bind(i64::from(entry.last_read_page()))
        .bind(entry.bookmark())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE reading_entries
            SET last_read_page = ?3, bookmark = ?4
            WHERE log_id = ?1 AND date = ?2
            ",
        )
        .bind(id.to_string())
        .bind(entry.date())
        .bind(i64::from(entry.last_read_page()))
        .bind(entry.bookmark())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_entry(&self, id: ReadingLogId, date: NaiveDate) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM reading_entries WHERE log_id = ?1 AND date = ?2")
            .bind(id.to_string())
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_log(&self, id: ReadingLogId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM reading_logs WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
