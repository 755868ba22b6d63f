use listenink::{
    ID,
    library::{CategoryPatch, NewCategory},
};

use crate::helpers::*;

#[tokio::test]
async fn test_create_and_get_category() {
    let (library, user) = test_library_with_user("Alice").await;

    let created = library
        .create_category(
            &user.id,
            NewCategory {
                name: "Papers".to_string(),
                color: "#AA00FF".to_string(),
                order: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.order, 0);
    assert_eq!(created.user_id, user.id);

    let fetched = library.get_category(&user.id, &created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_invalid_fields_are_rejected() {
    let (library, user) = test_library_with_user("Alice").await;

    let err = library
        .create_category(
            &user.id,
            NewCategory {
                name: "Papers".to_string(),
                color: "0xFFFFFF".to_string(),
                order: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(err.to_string(), "Invalid color: must be a valid hex color code");

    let err = library
        .create_category(
            &user.id,
            NewCategory {
                name: "  ".to_string(),
                color: "#FFFFFF".to_string(),
                order: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert!(library.list_categories(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let library = test_library().await;

    let err = library
        .create_category(
            &ID::from("ghost"),
            NewCategory {
                name: "Papers".to_string(),
                color: "#FFFFFF".to_string(),
                order: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_name_and_color_keeps_order() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A", "B", "C"]).await;

    let updated = library
        .update_category(
            &user.id,
            &categories[1].id,
            CategoryPatch {
                name: Some("Bee".to_string()),
                color: Some("#FFCC00".to_string()),
                order: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order, 1);
    assert_eq!(updated.color, "#FFCC00");
    assert_eq!(category_names(&library, &user).await, ["A", "Bee", "C"]);
}

#[tokio::test]
async fn test_other_users_categories_are_hidden() {
    let (library, alice) = test_library_with_user("Alice").await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();
    let categories = add_categories(&library, &alice, &["A"]).await;

    let err = library
        .get_category(&bob.id, &categories[0].id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = library
        .delete_category(&bob.id, &categories[0].id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(category_names(&library, &alice).await, ["A"]);
}

#[tokio::test]
async fn test_delete_category_removes_documents() {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A", "B"]).await;
    add_documents(&library, &user, &categories[0].id, &["one", "two"]).await;
    let kept = add_documents(&library, &user, &categories[1].id, &["three"]).await;

    library
        .delete_category(&user.id, &categories[0].id)
        .await
        .unwrap();

    let documents = library.list_documents(&user.id).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, kept[0]);
    assert_eq!(documents[0].bookmarks.len(), 1);

    let remaining = library.list_categories(&user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].order, 0);
}
