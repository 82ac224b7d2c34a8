use chrono::NaiveDate;
use library_core::model::{Book, BookDraft, BookId, DateReadingEntry, ReadingLog, ReadingLogId};
use storage::repository::{BookRepository, ReadingLogRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_book(title: &str, isbn13: Option<&str>, pages: u32) -> Book {
    BookDraft {
        title: title.into(),
        authors: vec!["Italo Calvino".into()],
        isbn13: isbn13.map(Into::into),
        pages,
        ..BookDraft::default()
    }
    .validate(BookId::generate())
    .unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_books() {
    let repo = connect("memdb_books").await;
    let book = build_book("Invisible Cities", Some("9780156453806"), 165);
    repo.insert_book(&book).await.unwrap();

    let fetched = repo.get_book(book.id()).await.unwrap().expect("book");
    assert_eq!(fetched, book);

    assert!(matches!(
        repo.insert_book(&book).await,
        Err(StorageError::Conflict)
    ));

    let mut draft = book.to_draft();
    draft.title = "Le città invisibili".into();
    repo.update_book(&draft.validate(book.id()).unwrap())
        .await
        .unwrap();
    let renamed = repo.get_book(book.id()).await.unwrap().unwrap();
    assert_eq!(renamed.title(), "Le città invisibili");

    let missing = build_book("Ghost", None, 1);
    assert!(matches!(
        repo.update_book(&missing).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_search_matches_title_author_and_isbn() {
    let repo = connect("memdb_search").await;
    repo.insert_book(&build_book("If on a winter's night", None, 260))
        .await
        .unwrap();
    repo.insert_book(&build_book("Baron in the Trees", Some("9780156106801"), 217))
        .await
        .unwrap();

    assert_eq!(repo.list_books(None).await.unwrap().len(), 2);
    assert_eq!(repo.list_books(Some("WINTER")).await.unwrap().len(), 1);
    assert_eq!(repo.list_books(Some("calvino")).await.unwrap().len(), 2);
    assert_eq!(repo.list_books(Some("0156106")).await.unwrap().len(), 1);
    assert!(repo.list_books(Some("100%")).await.unwrap().is_empty());

    let titles: Vec<String> = repo
        .list_books(Some(""))
        .await
        .unwrap()
        .iter()
        .map(|b| b.title().to_owned())
        .collect();
    assert_eq!(titles, vec!["Baron in the Trees", "If on a winter's night"]);
}

#[tokio::test]
async fn sqlite_roundtrip_persists_log_entries_in_date_order() {
    let repo = connect("memdb_logs").await;
    let book = build_book("Cosmicomics", None, 153);
    repo.insert_book(&book).await.unwrap();

    let mut log = ReadingLog::new(ReadingLogId::generate(), book.id(), 153, Some(day(30))).unwrap();
    log.record_entry(DateReadingEntry::new(day(9), 60, Some("The Distance of the Moon".into())))
        .unwrap();
    log.record_entry(DateReadingEntry::new(day(2), 12, None))
        .unwrap();
    repo.insert_log(&log).await.unwrap();

    let fetched = repo.get_log(log.id()).await.unwrap().expect("log");
    assert_eq!(fetched, log);

    repo.append_entry(log.id(), &DateReadingEntry::new(day(5), 30, None))
        .await
        .unwrap();
    assert!(matches!(
        repo.append_entry(log.id(), &DateReadingEntry::new(day(5), 31, None))
            .await,
        Err(StorageError::Conflict)
    ));
    repo.set_deadline(log.id(), None).await.unwrap();

    let listed = repo.list_logs_for_book(book.id()).await.unwrap();
    assert_eq!(listed.len(), 1);
    let dates: Vec<_> = listed[0].entries().iter().map(DateReadingEntry::date).collect();
    assert_eq!(dates, vec![day(2), day(5), day(9)]);
    assert_eq!(listed[0].deadline(), None);
}

#[tokio::test]
async fn sqlite_log_reflects_current_book_pages() {
    let repo = connect("memdb_pages").await;
    let book = build_book("Mr. Palomar", None, 126);
    repo.insert_book(&book).await.unwrap();
    let log = ReadingLog::new(ReadingLogId::generate(), book.id(), 126, None).unwrap();
    repo.insert_log(&log).await.unwrap();

    let mut draft = book.to_draft();
    draft.pages = 130;
    repo.update_book(&draft.validate(book.id()).unwrap())
        .await
        .unwrap();

    let fetched = repo.get_log(log.id()).await.unwrap().unwrap();
    assert_eq!(fetched.total_pages(), 130);
}

#[tokio::test]
async fn sqlite_rejects_orphan_logs_and_cascades_deletes() {
    let repo = connect("memdb_cascade").await;

    let orphan = ReadingLog::new(ReadingLogId::generate(), BookId::generate(), 10, None).unwrap();
    assert!(matches!(
        repo.insert_log(&orphan).await,
        Err(StorageError::NotFound)
    ));

    let book = build_book("The Castle of Crossed Destinies", None, 129);
    repo.insert_book(&book).await.unwrap();
    let mut log = ReadingLog::new(ReadingLogId::generate(), book.id(), 129, None).unwrap();
    log.record_entry(DateReadingEntry::new(day(1), 5, None))
        .unwrap();
    repo.insert_log(&log).await.unwrap();

    repo.delete_book(book.id()).await.unwrap();
    assert!(repo.get_log(log.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_log(log.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_single_entry_edits_leave_other_rows_alone() {
    let repo = connect("memdb_entry_edits").await;
    let book = build_book("Marcovaldo", None, 121);
    repo.insert_book(&book).await.unwrap();
    let log = ReadingLog::new(ReadingLogId::generate(), book.id(), 121, None).unwrap();
    repo.insert_log(&log).await.unwrap();

    for (d, page) in [(1, 8), (2, 20), (3, 33)] {
        repo.append_entry(log.id(), &DateReadingEntry::new(day(d), page, None))
            .await
            .unwrap();
    }
    repo.update_entry(log.id(), &DateReadingEntry::new(day(2), 22, Some("Spring".into())))
        .await
        .unwrap();
    repo.delete_entry(log.id(), day(1)).await.unwrap();

    assert!(matches!(
        repo.update_entry(log.id(), &DateReadingEntry::new(day(1), 9, None))
            .await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.delete_entry(log.id(), day(9)).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.append_entry(ReadingLogId::generate(), &DateReadingEntry::new(day(4), 1, None))
            .await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.set_deadline(ReadingLogId::generate(), Some(day(30))).await,
        Err(StorageError::NotFound)
    ));

    let stored = repo.get_log(log.id()).await.unwrap().unwrap();
    let pages: Vec<_> = stored
        .entries()
        .iter()
        .map(|e| (e.date(), e.last_read_page(), e.bookmark().map(str::to_owned)))
        .collect();
    assert_eq!(
        pages,
        vec![
            (day(2), 22, Some("Spring".to_string())),
            (day(3), 33, None),
        ]
    );
}

#[tokio::test]
async fn sqlite_enforces_one_log_per_book_and_unique_isbns() {
    let repo = connect("memdb_unique").await;
    let book = build_book("Italian Folktales", Some("9780156454896"), 763);
    repo.insert_book(&book).await.unwrap();

    let first = ReadingLog::new(ReadingLogId::generate(), book.id(), 763, None).unwrap();
    repo.insert_log(&first).await.unwrap();
    let second = ReadingLog::new(ReadingLogId::generate(), book.id(), 763, None).unwrap();
    assert!(matches!(
        repo.insert_log(&second).await,
        Err(StorageError::Conflict)
    ));

    let twin = build_book("Fiabe italiane", Some("9780156454896"), 1000);
    assert!(matches!(
        repo.insert_book(&twin).await,
        Err(StorageError::Conflict)
    ));

    let other = build_book("Numbers in the Dark", None, 288);
    repo.insert_book(&other).await.unwrap();
    let mut draft = other.to_draft();
    draft.isbn13 = Some("9780156454896".into());
    assert!(matches!(
        repo.update_book(&draft.validate(other.id()).unwrap()).await,
        Err(StorageError::Conflict)
    ));
}
