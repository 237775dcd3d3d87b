mod helpers;

use std::time::Duration;

use jaguar::{new_sql_repository, with_local_cache, CachedRepository, OrderBy, Page, Query, Repository};

use helpers::database::{seed_people, setup_test_db, teardown_test_db, Person};

fn all_by_id() -> Query {
    Query::new()
        .with_page(Page::new(1, 10))
        .with_order_by(OrderBy::asc("id"))
}

#[tokio::test]
async fn test_cached_find_ignores_new_rows_until_expiry() {
    let pool = setup_test_db().await;
    seed_people(&pool).await;
    let repo = with_local_cache(new_sql_repository::<Person, i64>(pool.clone()), Duration::from_secs(60));

    let before = repo.find(&all_by_id()).await.expect("failed to find people");
    assert_eq!(before.len(), 3);

    repo.create(Person::new("Late", "Comer"))
        .await
        .expect("failed to create person");

    // Writes do not invalidate cached pages
    let after = repo.find(&all_by_id()).await.unwrap();
    assert_eq!(after, before);

    // Other reads are not cached
    let fresh = repo.find_by_ids(&[1, 2, 3, 4]).await.unwrap();
    assert_eq!(fresh.len(), 4);

    // A different query misses and sees the new row
    let other = all_by_id().with_order_by(OrderBy::desc("id"));
    let newest = repo.find(&other).await.unwrap();
    assert_eq!(newest[0].first_name.as_deref(), Some("Late"));

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_zero_keep_alive_always_reads_through() {
    let pool = setup_test_db().await;
    seed_people(&pool).await;
    let repo: CachedRepository<Person, i64, _> =
        CachedRepository::new(new_sql_repository::<Person, i64>(pool.clone()), Duration::ZERO);

    assert_eq!(repo.find(&all_by_id()).await.unwrap().len(), 3);
    repo.remove(1).await.expect("failed to remove person");
    assert_eq!(repo.find(&all_by_id()).await.unwrap().len(), 2);

    assert_eq!(repo.purge_expired().await, 1);
    assert!(repo.is_empty().await);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_inner_errors_surface_through_the_cache() {
    let pool = setup_test_db().await;
    let repo = with_local_cache(new_sql_repository::<Person, i64>(pool.clone()), Duration::from_secs(60));

    let err = repo.get(7).await.unwrap_err();
    assert!(err.is_not_found());

    let bad = Query::new().with_order_by(OrderBy::asc("missing"));
    assert!(repo.find(&bad).await.is_err());

    teardown_test_db(pool).await;
}
