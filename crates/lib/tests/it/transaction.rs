//! Concurrent writers on the same group.

use listenink::{
    Library, SqlxBackend,
    library::{CategoryPatch, NewBookmark, NewCategory},
};

use crate::helpers::*;

/// A library over a file database shared by several pooled connections,
/// with the default transaction limits.
async fn shared_library(dir: &tempfile::TempDir) -> Library {
    let backend = SqlxBackend::open_sqlite(dir.path().join("listenink.db"))
        .await
        .expect("Failed to open SQLite");
    Library::new(backend)
}

/// Upload 16 documents for `user` at once and check none is lost.
async fn upload_concurrently(library: &Library, user: &listenink::library::User) {
    let mut handles = Vec::new();
    for i in 0..16 {
        let library = library.clone();
        let user_id = user.id.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("D{i}");
            library
                .create_document(&user_id, new_document(Some(&name), None))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let documents = library.list_documents(&user.id).await.unwrap();
    assert_eq!(documents.len(), 16);
    assert_dense(documents.iter().map(|d| d.order));
    for document in &documents {
        assert_eq!(document.bookmarks.len(), 1);
    }
    // The first uploads raced to create the default category; one won.
    assert_eq!(library.list_categories(&user.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_stay_dense() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;
    let user = library
        .create_user("Alice", "alice@example.com")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let library = library.clone();
        let user_id = user.id.clone();
        handles.push(tokio::spawn(async move {
            library
                .create_category(
                    &user_id,
                    NewCategory {
                        name: format!("C{i}"),
                        color: "#000000".to_string(),
                        order: None,
                    },
                )
                .await
        }));
    }

    let mut positions = Vec::new();
    for handle in handles {
        positions.push(handle.await.unwrap().unwrap().order);
    }

    // Every append saw a different `max`.
    assert_dense(positions);
    let categories = library.list_categories(&user.id).await.unwrap();
    assert_eq!(categories.len(), 16);
    assert_dense(categories.into_iter().map(|c| c.order));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_and_inserts_stay_dense() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;
    let user = library
        .create_user("Alice", "alice@example.com")
        .await
        .unwrap();
    let names: Vec<String> = (0..8).map(|i| format!("C{i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let categories = add_categories(&library, &user, &names).await;

    let mut handles = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        let library = library.clone();
        let user_id = user.id.clone();
        let id = category.id.clone();
        handles.push(tokio::spawn(async move {
            // Targets stay valid however the other writers interleave.
            let patch = CategoryPatch {
                order: Some((i as i64 * 5) % 8),
                ..Default::default()
            };
            library.update_category(&user_id, &id, patch).await?;
            library
                .create_category(
                    &user_id,
                    NewCategory {
                        name: format!("N{i}"),
                        color: "#000000".to_string(),
                        order: Some(0),
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let categories = library.list_categories(&user.id).await.unwrap();
    assert_eq!(categories.len(), 16);
    assert_dense(categories.into_iter().map(|c| c.order));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_on_different_groups() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;

    let mut users = Vec::new();
    for name in ["Alice", "Bob", "Carol"] {
        users.push(
            library
                .create_user(name, &format!("{name}@example.com"))
                .await
                .unwrap(),
        );
    }

    let mut handles = Vec::new();
    for user in &users {
        for i in 0..5 {
            let library = library.clone();
            let user_id = user.id.clone();
            handles.push(tokio::spawn(async move {
                library
                    .create_category(
                        &user_id,
                        NewCategory {
                            name: format!("C{i}"),
                            color: "#000000".to_string(),
                            order: None,
                        },
                    )
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for user in &users {
        let categories = library.list_categories(&user.id).await.unwrap();
        assert_eq!(categories.len(), 5);
        assert_dense(categories.into_iter().map(|c| c.order));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;
    let user = library
        .create_user("Alice", "alice@example.com")
        .await
        .unwrap();

    upload_concurrently(&library, &user).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_default_backend() {
    let (library, user) = test_library_with_user("Alice").await;

    upload_concurrently(&library, &user).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bookmarks_racing_document_delete() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;
    let user = library
        .create_user("Alice", "alice@example.com")
        .await
        .unwrap();
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["doomed", "kept"]).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let library = library.clone();
        let user_id = user.id.clone();
        let document_id = ids[0].clone();
        handles.push(tokio::spawn(async move {
            library
                .create_bookmark(
                    &user_id,
                    &document_id,
                    NewBookmark {
                        page: 0,
                        audiotime: 0,
                        order: None,
                    },
                )
                .await
                .map(|_| ())
        }));
    }
    library.delete_document(&user.id, &ids[0]).await.unwrap();

    // Each bookmark landed before the delete or found the document gone.
    for handle in handles {
        if let Err(err) = handle.await.unwrap() {
            assert!(err.is_not_found(), "unexpected error: {err}");
        }
    }

    let documents = library.list_documents(&user.id).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, ids[1]);
    assert_eq!(documents[0].order, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bookmarks_racing_category_delete() {
    let dir = tempfile::tempdir().unwrap();
    let library = shared_library(&dir).await;
    let user = library
        .create_user("Alice", "alice@example.com")
        .await
        .unwrap();
    let categories = add_categories(&library, &user, &["A", "B"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two"]).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let library = library.clone();
        let user_id = user.id.clone();
        let document_id = ids[i % 2].clone();
        handles.push(tokio::spawn(async move {
            library
                .create_bookmark(
                    &user_id,
                    &document_id,
                    NewBookmark {
                        page: 0,
                        audiotime: 0,
                        order: None,
                    },
                )
                .await
                .map(|_| ())
        }));
    }
    library
        .delete_category(&user.id, &categories[0].id)
        .await
        .unwrap();

    for handle in handles {
        if let Err(err) = handle.await.unwrap() {
            assert!(err.is_not_found(), "unexpected error: {err}");
        }
    }

    assert!(library.list_documents(&user.id).await.unwrap().is_empty());
    let remaining = library.list_categories(&user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].order, 0);
}
