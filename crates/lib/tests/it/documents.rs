use listenink::{
    ID,
    library::{DocumentPatch, NewDocument},
};

use crate::helpers::*;

fn move_to(order: i64) -> DocumentPatch {
    DocumentPatch {
        order: Some(order),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_first_upload_creates_default_category() {
    let (library, user) = test_library_with_user("Alice").await;

    let document = library
        .create_document(&user.id, new_document(None, None))
        .await
        .unwrap();

    let categories = library.list_categories(&user.id).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Recent Uploads");
    assert_eq!(categories[0].color, "#FFFFFF");
    assert_eq!(document.category_id, categories[0].id);
    assert_eq!(document.name, "New Document");
    assert_eq!(document.order, 0);
    assert!(!document.completed);
}

#[tokio::test]
async fn test_upload_starts_with_one_bookmark() {
    let (library, user) = test_library_with_user("Alice").await;

    let document = library
        .create_document(&user.id, new_document(Some("Notes"), None))
        .await
        .unwrap();
    assert_eq!(document.bookmarks.len(), 1);
    let bookmark = &document.bookmarks[0];
    assert_eq!((bookmark.page, bookmark.audiotime, bookmark.order), (0, 0, 0));

    let fetched = library.get_document(&user.id, &document.id).await.unwrap();
    assert_eq!(fetched, document);
}

#[tokio::test]
async fn test_upload_falls_back_to_first_category() {
    let (library, user) = test_library_with_user("Alice").await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();
    let categories = add_categories(&library, &user, &["A", "B"]).await;
    let bobs = add_categories(&library, &bob, &["X"]).await;

    // Requested category owned by someone else.
    let document = library
        .create_document(&user.id, new_document(None, Some(&bobs[0].id)))
        .await
        .unwrap();
    assert_eq!(document.category_id, categories[0].id);

    let document = library
        .create_document(&user.id, new_document(None, Some(&categories[1].id)))
        .await
        .unwrap();
    assert_eq!(document.category_id, categories[1].id);
}

#[tokio::test]
async fn test_uploads_append_in_order() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two", "three"]).await;

    let documents = library.list_documents(&user.id).await.unwrap();
    let orders: Vec<(ID, i64)> = documents.into_iter().map(|d| (d.id, d.order)).collect();
    assert_eq!(
        orders,
        vec![(ids[0].clone(), 0), (ids[1].clone(), 1), (ids[2].clone(), 2)]
    );
}

#[tokio::test]
async fn test_duplicate_upload_reuses_pages() {
    let (library, user) = test_library_with_user("Alice").await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();

    let original = library
        .create_document(
            &user.id,
            NewDocument {
                name: Some("Paper".to_string()),
                category_id: None,
                content_key: "sha256-abc".to_string(),
                numpages: 0,
            },
        )
        .await
        .unwrap();
    library.record_page_processed(&original.id, 11).await.unwrap();
    library.mark_completed(&original.id).await.unwrap();

    let copy = library
        .create_document(
            &bob.id,
            NewDocument {
                name: None,
                category_id: None,
                content_key: "sha256-abc".to_string(),
                numpages: 0,
            },
        )
        .await
        .unwrap();
    assert_eq!(copy.numpages, 12);
    assert!(copy.completed);
    assert_ne!(copy.id, original.id);
}

#[tokio::test]
async fn test_move_within_category() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two", "three", "four"]).await;

    let moved = library
        .update_document(&user.id, &ids[3], move_to(1))
        .await
        .unwrap();
    assert_eq!(moved.order, 1);
    assert_eq!(moved.bookmarks.len(), 1);
    assert_eq!(
        document_names(&library, &user, &categories[0].id).await,
        ["one", "four", "two", "three"]
    );
}

#[tokio::test]
async fn test_move_between_categories() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A", "B"]).await;
    let a = add_documents(&library, &user, &categories[0].id, &["a0", "a1", "a2"]).await;
    add_documents(&library, &user, &categories[1].id, &["b0", "b1"]).await;

    let moved = library
        .update_document(
            &user.id,
            &a[1],
            DocumentPatch {
                category_id: Some(categories[1].id.clone()),
                order: Some(1),
                name: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category_id, categories[1].id);
    assert_eq!(moved.order, 1);

    assert_eq!(document_names(&library, &user, &categories[0].id).await, ["a0", "a2"]);
    assert_eq!(
        document_names(&library, &user, &categories[1].id).await,
        ["b0", "a1", "b1"]
    );
    let documents = library.list_documents(&user.id).await.unwrap();
    assert_dense(documents.iter().filter(|d| d.category_id == categories[0].id).map(|d| d.order));
    assert_dense(documents.iter().filter(|d| d.category_id == categories[1].id).map(|d| d.order));
}

#[tokio::test]
async fn test_move_between_categories_without_order_appends() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A", "B"]).await;
    let a = add_documents(&library, &user, &categories[0].id, &["a0", "a1"]).await;
    add_documents(&library, &user, &categories[1].id, &["b0"]).await;

    let moved = library
        .update_document(
            &user.id,
            &a[0],
            DocumentPatch {
                category_id: Some(categories[1].id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.order, 1);
    assert_eq!(document_names(&library, &user, &categories[0].id).await, ["a1"]);
    assert_eq!(document_names(&library, &user, &categories[1].id).await, ["b0", "a0"]);
}

#[tokio::test]
async fn test_move_into_foreign_category_is_rejected() {
    let (library, user) = test_library_with_user("Alice").await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();
    let categories = add_categories(&library, &user, &["A"]).await;
    let bobs = add_categories(&library, &bob, &["X"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two"]).await;

    let err = library
        .update_document(
            &user.id,
            &ids[0],
            DocumentPatch {
                category_id: Some(bobs[0].id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(document_names(&library, &user, &categories[0].id).await, ["one", "two"]);
}

#[tokio::test]
async fn test_out_of_bounds_move_changes_nothing() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two"]).await;

    let err = library
        .update_document(
            &user.id,
            &ids[0],
            DocumentPatch {
                name: Some("renamed".to_string()),
                order: Some(2),
                category_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(document_names(&library, &user, &categories[0].id).await, ["one", "two"]);
}

#[tokio::test]
async fn test_delete_document() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two", "three"]).await;

    library.delete_document(&user.id, &ids[0]).await.unwrap();

    let documents = library.list_documents(&user.id).await.unwrap();
    assert_eq!(document_names(&library, &user, &categories[0].id).await, ["two", "three"]);
    assert_dense(documents.iter().map(|d| d.order));
    assert!(library.get_document(&user.id, &ids[0]).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_processing_hooks() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A"]).await;
    let ids = add_documents(&library, &user, &categories[0].id, &["one", "two"]).await;

    library.record_page_processed(&ids[1], 0).await.unwrap();
    library.record_page_processed(&ids[1], 1).await.unwrap();
    let document = library.get_document(&user.id, &ids[1]).await.unwrap();
    assert_eq!(document.numpages, 2);
    assert!(!document.completed);

    library.mark_completed(&ids[1]).await.unwrap();
    assert!(library.get_document(&user.id, &ids[1]).await.unwrap().completed);

    library.discard_document(&ids[0]).await.unwrap();
    let documents = library.list_documents(&user.id).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].order, 0);

    let missing = ID::from("missing");
    assert!(library.mark_completed(&missing).await.unwrap_err().is_not_found());
    assert!(library.record_page_processed(&missing, 0).await.unwrap_err().is_not_found());
}
