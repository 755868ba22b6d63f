//! The ordering engine against the SQL store, through the categories of one
//! user (A, B, C, D at orders 0..=3).

use listenink::{
    Error, OrderAction, OrderGroup,
    library::{CategoryPatch, NewCategory},
    order::{Bound, GroupRepository, OrderError, OrderRange},
};

use crate::helpers::*;

fn new_category(name: &str, order: Option<i64>) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        color: "#112233".to_string(),
        order,
    }
}

fn move_to(order: i64) -> CategoryPatch {
    CategoryPatch {
        order: Some(order),
        ..Default::default()
    }
}

async fn abcd() -> (listenink::Library, listenink::library::User, Vec<listenink::library::Category>) {
    let (library, user) = test_library_with_user("Alice").await;
    let categories = add_categories(&library, &user, &["A", "B", "C", "D"]).await;
    (library, user, categories)
}

async fn orders(library: &listenink::Library, user: &listenink::library::User) -> Vec<i64> {
    library
        .list_categories(&user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.order)
        .collect()
}

#[tokio::test]
async fn test_append_without_position() {
    let (library, user, before) = abcd().await;

    let created = library
        .create_category(&user.id, new_category("E", None))
        .await
        .unwrap();
    assert_eq!(created.order, 4);

    let after = library.list_categories(&user.id).await.unwrap();
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.order, new.order);
    }
    assert_eq!(category_names(&library, &user).await, ["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn test_insert_in_the_middle() {
    let (library, user, _) = abcd().await;

    let created = library
        .create_category(&user.id, new_category("E", Some(1)))
        .await
        .unwrap();
    assert_eq!(created.order, 1);
    assert_eq!(category_names(&library, &user).await, ["A", "E", "B", "C", "D"]);
    assert_dense(orders(&library, &user).await);
}

#[tokio::test]
async fn test_move_last_to_front() {
    let (library, user, categories) = abcd().await;

    let moved = library
        .update_category(&user.id, &categories[3].id, move_to(0))
        .await
        .unwrap();
    assert_eq!(moved.order, 0);
    assert_eq!(category_names(&library, &user).await, ["D", "A", "B", "C"]);
    assert_dense(orders(&library, &user).await);
}

#[tokio::test]
async fn test_move_front_to_last() {
    let (library, user, categories) = abcd().await;

    library
        .update_category(&user.id, &categories[0].id, move_to(3))
        .await
        .unwrap();
    assert_eq!(category_names(&library, &user).await, ["B", "C", "D", "A"]);
    assert_dense(orders(&library, &user).await);
}

#[tokio::test]
async fn test_delete_closes_gap() {
    let (library, user, categories) = abcd().await;

    library
        .delete_category(&user.id, &categories[1].id)
        .await
        .unwrap();
    assert_eq!(category_names(&library, &user).await, ["A", "C", "D"]);
    assert_eq!(orders(&library, &user).await, [0, 1, 2]);
}

#[tokio::test]
async fn test_insert_past_append_position_is_rejected() {
    let (library, user, before) = abcd().await;

    let err = library
        .create_category(&user.id, new_category("E", Some(5)))
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert!(matches!(
        err,
        Error::Order(OrderError::OutOfBounds {
            bound: Bound::Position,
            position: 5,
            max_allowed: 4,
        })
    ));

    assert_eq!(library.list_categories(&user.id).await.unwrap(), before);
}

#[tokio::test]
async fn test_move_reports_violated_bound() {
    let (library, user, categories) = abcd().await;

    let err = library
        .update_category(&user.id, &categories[0].id, move_to(4))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "destination position 4 is out of bounds (allowed 0..=3)");

    let err = library
        .update_category(&user.id, &categories[0].id, move_to(-1))
        .await
        .unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(category_names(&library, &user).await, ["A", "B", "C", "D"]);
}

#[tokio::test]
async fn test_move_to_same_position_writes_nothing() {
    let (library, user, categories) = abcd().await;
    let group = OrderGroup::categories_of(&user.id);

    let mut tx = library.backend().begin().await.unwrap();
    let position = tx.reorder(&group, OrderAction::move_to(2, 2)).await.unwrap();
    assert_eq!(position, 2);
    tx.commit().await.unwrap();

    assert_eq!(library.list_categories(&user.id).await.unwrap(), categories);
}

#[tokio::test]
async fn test_delete_then_insert_restores_order() {
    let (library, user, categories) = abcd().await;

    library
        .delete_category(&user.id, &categories[2].id)
        .await
        .unwrap();
    library
        .create_category(&user.id, new_category("C2", Some(2)))
        .await
        .unwrap();

    assert_eq!(category_names(&library, &user).await, ["A", "B", "C2", "D"]);
    assert_eq!(orders(&library, &user).await, [0, 1, 2, 3]);
}

#[tokio::test]
async fn test_move_in_empty_group_is_logic_error() {
    let (library, user) = test_library_with_user("Bob").await;
    let group = OrderGroup::categories_of(&user.id);

    let mut tx = library.backend().begin().await.unwrap();
    let err = tx
        .reorder(&group, OrderAction::move_to(0, 0))
        .await
        .unwrap_err();
    assert!(err.is_logic_error());
    assert!(!err.is_user_error());
    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn test_shift_range_touches_only_the_range() {
    let (library, user, _) = abcd().await;
    let group = OrderGroup::categories_of(&user.id);

    let mut tx = library.backend().begin().await.unwrap();
    assert_eq!(tx.max_order(&group).await.unwrap(), Some(3));
    let shifted = tx
        .shift_range(&group, OrderRange::between(1, 3), 10)
        .await
        .unwrap();
    assert_eq!(shifted, 2);
    assert_eq!(tx.max_order(&group).await.unwrap(), Some(12));
    tx.rollback().await.unwrap();

    assert_eq!(orders(&library, &user).await, [0, 1, 2, 3]);
}

#[tokio::test]
async fn test_groups_are_independent() {
    let (library, alice, alice_categories) = abcd().await;
    let bob = library.create_user("Bob", "bob@example.com").await.unwrap();
    add_categories(&library, &bob, &["X", "Y"]).await;

    library
        .update_category(&alice.id, &alice_categories[3].id, move_to(0))
        .await
        .unwrap();
    library
        .create_category(&bob.id, new_category("Z", Some(0)))
        .await
        .unwrap();

    assert_eq!(category_names(&library, &alice).await, ["D", "A", "B", "C"]);
    assert_eq!(category_names(&library, &bob).await, ["Z", "X", "Y"]);
}

/// A fixed mixed sequence of actions, checked against a plain vector.
#[tokio::test]
async fn test_mixed_sequence_stays_dense() {
    let (library, user, _) = abcd().await;
    let mut model: Vec<String> = ["A", "B", "C", "D"].map(String::from).to_vec();

    let steps: &[(&str, i64, i64)] = &[
        ("insert", 0, 0),
        ("move", 4, 1),
        ("delete", 2, 0),
        ("insert", 4, 0),
        ("move", 0, 4),
        ("delete", 4, 0),
        ("insert", 2, 0),
        ("move", 3, 0),
        ("delete", 0, 0),
    ];

    for (step, &(action, a, b)) in steps.iter().enumerate() {
        let current = library.list_categories(&user.id).await.unwrap();
        match action {
            "insert" => {
                let name = format!("N{step}");
                library
                    .create_category(&user.id, new_category(&name, Some(a)))
                    .await
                    .unwrap();
                model.insert(a as usize, name);
            }
            "move" => {
                library
                    .update_category(&user.id, &current[a as usize].id, move_to(b))
                    .await
                    .unwrap();
                let item = model.remove(a as usize);
                model.insert(b as usize, item);
            }
            _ => {
                library
                    .delete_category(&user.id, &current[a as usize].id)
                    .await
                    .unwrap();
                model.remove(a as usize);
            }
        }

        assert_eq!(category_names(&library, &user).await, model, "after step {step}");
        assert_dense(orders(&library, &user).await);
    }
}
