use library_core::model::{Book, BookId};

use super::SqliteRepository;
use super::mapping::{authors_to_json, db_err, like_pattern, map_book_row};
use crate::repository::{BookRepository, StorageError};

#[async_trait::async_trait]
impl BookRepository for SqliteRepository {
    async fn insert_book(&self, book: &Book) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO books (id, title, authors, isbn10, isbn13, image, pages)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(book.id().to_string())
        .bind(book.title())
        .bind(authors_to_json(book.authors())?)
        .bind(book.isbn10())
        .bind(book.isbn13())
        .bind(book.image())
        .bind(i64::from(book.pages()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE books
            SET title = ?2, authors = ?3, isbn10 = ?4, isbn13 = ?5, image = ?6, pages = ?7
            WHERE id = ?1
            ",
        )
        .bind(book.id().to_string())
        .bind(book.title())
        .bind(authors_to_json(book.authors())?)
        .bind(book.isbn10())
        .bind(book.isbn13())
        .bind(book.image())
        .bind(i64::from(book.pages()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, authors, isbn10, isbn13, image, pages
            FROM books
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_book_row).transpose()
    }

    async fn list_books(&self, search: Option<&str>) -> Result<Vec<Book>, StorageError> {
        let rows = match search.filter(|s| !s.trim().is_empty()) {
            Some(search) => {
                sqlx::query(
                    r"
                    SELECT id, title, authors, isbn10, isbn13, image, pages
                    FROM books
                    WHERE lower(title) LIKE ?1 ESCAPE '\'
                       OR lower(authors) LIKE ?1 ESCAPE '\'
                       OR lower(coalesce(isbn10, '')) LIKE ?1 ESCAPE '\'
                       OR lower(coalesce(isbn13, '')) LIKE ?1 ESCAPE '\'
                    ORDER BY title COLLATE NOCASE, id
                    ",
                )
                .bind(like_pattern(search))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, title, authors, isbn10, isbn13, image, pages
                    FROM books
                    ORDER BY title COLLATE NOCASE, id
                    ",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(map_book_row).collect()
    }

    async fn delete_book(&self, id: BookId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM books WHERE id = ?1")
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
