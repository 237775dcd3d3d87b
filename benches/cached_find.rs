#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::{hint::black_box, sync::Arc, time::Duration};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jaguar::adapters::sqlite::create_test_pool;
use jaguar::{new_sql_repository, CachedRepository, OrderBy, Page, Query, Repository, SqlEntity, Value};
use tokio::runtime::Runtime;

#[derive(Debug, Clone, sqlx::FromRow)]
struct Person {
    id: Option<i64>,
    name: Option<String>,
}

impl SqlEntity for Person {
    const TABLE: &'static str = "people";

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("name", self.name.clone().into())]
    }
}

async fn setup_repo(rows: usize) -> Arc<dyn Repository<Person, i64>> {
    let pool = create_test_pool().await.unwrap();
    sqlx::query("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    let repo = new_sql_repository::<Person, i64>(pool);
    let people = (0..rows)
        .map(|i| Person {
            id: None,
            name: Some(format!("person-{i}")),
        })
        .collect();
    repo.create_bulk(people).await.unwrap();
    repo
}

fn page_query(size: usize) -> Query {
    Query::new()
        .with_page(Page::new(1, i64::try_from(size).unwrap()))
        .with_order_by(OrderBy::asc("name"))
}

fn bench_find_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_uncached");
    let runtime = Runtime::new().unwrap();

    for size in [10usize, 100, 1_000] {
        let repo = runtime.block_on(setup_repo(size));
        let query = page_query(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.to_async(&runtime)
                .iter(|| async { black_box(repo.find(black_box(&query)).await.unwrap()) });
        });
    }

    group.finish();
}

fn bench_find_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_cache_hit");
    let runtime = Runtime::new().unwrap();

    for size in [10usize, 100, 1_000] {
        let cached = runtime.block_on(async {
            let cached: CachedRepository<Person, i64, _> =
                CachedRepository::new(setup_repo(size).await, Duration::from_secs(3600));
            // Prime the entry so every iteration is a hit
            cached.find(&page_query(size)).await.unwrap();
            cached
        });
        let query = page_query(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.to_async(&runtime)
                .iter(|| async { black_box(cached.find(black_box(&query)).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_uncached, bench_find_cache_hit);
criterion_main!(benches);
