use listenink::library::{BookmarkPatch, NewBookmark};

use crate::helpers::*;

async fn document_with_pages(pages: i64) -> (listenink::Library, listenink::library::User, listenink::ID) {
    let (library, user) = test_library_with_user("Alice").await;
    let document = library
        .create_document(&user.id, new_document(Some("Book"), None))
        .await
        .unwrap();
    if pages > 0 {
        library
            .record_page_processed(&document.id, pages - 1)
            .await
            .unwrap();
    }
    (library, user, document.id)
}

fn bookmark(page: i64, order: Option<i64>) -> NewBookmark {
    NewBookmark {
        page,
        audiotime: page * 1000,
        order,
    }
}

async fn pages_in_order(
    library: &listenink::Library,
    user: &listenink::library::User,
    document: &listenink::ID,
) -> Vec<i64> {
    let document = library.get_document(&user.id, document).await.unwrap();
    assert_dense(document.bookmarks.iter().map(|b| b.order));
    document.bookmarks.into_iter().map(|b| b.page).collect()
}

#[tokio::test]
async fn test_create_bookmarks() {
    let (library, user, document) = document_with_pages(10).await;

    let appended = library
        .create_bookmark(&user.id, &document, bookmark(5, None))
        .await
        .unwrap();
    assert_eq!(appended.order, 1);

    let inserted = library
        .create_bookmark(&user.id, &document, bookmark(3, Some(0)))
        .await
        .unwrap();
    assert_eq!(inserted.order, 0);

    assert_eq!(pages_in_order(&library, &user, &document).await, [3, 0, 5]);
}

#[tokio::test]
async fn test_bookmark_page_must_exist() {
    let (library, user, document) = document_with_pages(4).await;

    // The page being processed next may be bookmarked.
    library
        .create_bookmark(&user.id, &document, bookmark(4, None))
        .await
        .unwrap();

    let err = library
        .create_bookmark(&user.id, &document, bookmark(5, None))
        .await
        .unwrap_err();
    assert!(err.is_user_error());

    let err = library
        .create_bookmark(
            &user.id,
            &document,
            NewBookmark {
                page: 1,
                audiotime: -1,
                order: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(pages_in_order(&library, &user, &document).await, [0, 4]);
}

#[tokio::test]
async fn test_update_bookmark() {
    let (library, user, document) = document_with_pages(10).await;
    library
        .create_bookmark(&user.id, &document, bookmark(2, None))
        .await
        .unwrap();
    let last = library
        .create_bookmark(&user.id, &document, bookmark(7, None))
        .await
        .unwrap();

    let updated = library
        .update_bookmark(
            &user.id,
            &document,
            &last.id,
            BookmarkPatch {
                page: Some(8),
                audiotime: Some(1500),
                order: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!((updated.page, updated.audiotime, updated.order), (8, 1500, 0));
    assert_eq!(pages_in_order(&library, &user, &document).await, [8, 0, 2]);
}

#[tokio::test]
async fn test_delete_bookmark() {
    let (library, user, document) = document_with_pages(10).await;
    let middle = library
        .create_bookmark(&user.id, &document, bookmark(2, None))
        .await
        .unwrap();
    library
        .create_bookmark(&user.id, &document, bookmark(7, None))
        .await
        .unwrap();

    library
        .delete_bookmark(&user.id, &document, &middle.id)
        .await
        .unwrap();
    assert_eq!(pages_in_order(&library, &user, &document).await, [0, 7]);

    let err = library
        .delete_bookmark(&user.id, &document, &middle.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bookmarks_of_other_users_are_hidden() {
    let (library, user, document) = document_with_pages(3).await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();

    let err = library
        .create_bookmark(&bob.id, &document, bookmark(1, None))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(pages_in_order(&library, &user, &document).await, [0]);
}
