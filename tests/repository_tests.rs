//! Generic Repository Tests
//!
//! Run against PostgreSQL when `DATABASE_URL` is set; skipped otherwise.
//! Every test works in a fresh random tenant so runs do not interfere.

mod common;

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use sqlx::PgPool;
use uuid::Uuid;

use institute_server::args;
use institute_server::domain::Talent;
use institute_server::infrastructure::database::UnitOfWork;
use institute_server::infrastructure::repositories::{
    filter, order_by, paginate, Changeset, PgRepository, Repository, RepositoryError, TotalCount,
};

use common::{test_pool, unique_email};

const REPO: PgRepository = PgRepository;

async fn seed(pool: &PgPool, tenant_id: Uuid, first_names: &[&str]) -> Vec<Talent> {
    let mut uow = UnitOfWork::begin(pool).await.unwrap();
    let mut talents = Vec::new();
    for first_name in first_names {
        let talent = Talent::new(tenant_id, *first_name, "Test", unique_email(), Uuid::new_v4());
        talents.push(REPO.add(&mut uow, &talent).await.unwrap());
    }
    uow.commit().await.unwrap();
    talents
}

async fn count(pool: &PgPool, tenant_id: Uuid) -> i64 {
    let mut uow = UnitOfWork::read_only(pool);
    Repository::<Talent>::get_count_for_tenant(&REPO, &mut uow, tenant_id, vec![])
        .await
        .unwrap()
}

// ============================================================================
// Tenant isolation
// ============================================================================

#[tokio::test]
async fn test_tenant_scope_wins_over_caller_filters() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let other = Uuid::new_v4();
    seed(&pool, tenant, &["Ada"]).await;
    let foreign = seed(&pool, other, &["Mallory"]).await;

    // A filter that matches only the other tenant's row
    let mut uow = UnitOfWork::read_only(&pool);
    let rows: Vec<Talent> = REPO
        .get_all_for_tenant(
            &mut uow,
            tenant,
            vec![filter("talents.tenant_id = ? OR talents.id = ?", args![other, foreign[0].id])],
        )
        .await
        .unwrap();

    assert!(rows.iter().all(|t| t.tenant_id == tenant));
    assert!(rows.iter().all(|t| t.id != foreign[0].id));
}

#[tokio::test]
async fn test_get_for_wrong_tenant_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let talent = seed(&pool, Uuid::new_v4(), &["Ada"]).await.remove(0);

    let mut uow = UnitOfWork::read_only(&pool);
    let result: Result<Talent, _> = REPO
        .get_for_tenant(&mut uow, Uuid::new_v4(), talent.id, vec![])
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_existence_check_with_nil_tenant_is_an_error() {
    let Some(pool) = test_pool().await else {
        return;
    };
    seed(&pool, Uuid::new_v4(), &["Ada"]).await;

    let mut uow = UnitOfWork::read_only(&pool);
    let result = Repository::<Talent>::does_record_exist_for_tenant(&REPO, &mut uow, Uuid::nil(), vec![]).await;

    assert!(matches!(result, Err(e) if e.is_validation()));
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_pages_union_to_the_filtered_set() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let seeded = seed(&pool, tenant, &["A", "B", "C", "D", "E", "F", "G"]).await;

    let mut seen = Vec::new();
    for page in 0..4 {
        let total = TotalCount::new();
        let mut uow = UnitOfWork::read_only(&pool);
        let rows: Vec<Talent> = REPO
            .get_all_for_tenant(
                &mut uow,
                tenant,
                vec![paginate(3, page, Some(&total)), order_by("talents.first_name", false)],
            )
            .await
            .unwrap();
        assert_eq!(total.get(), 7);
        seen.extend(rows.into_iter().map(|t| t.id));
    }

    let unique: HashSet<Uuid> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 7);
    assert_eq!(unique, seeded.iter().map(|t| t.id).collect::<HashSet<_>>());
}

#[tokio::test]
async fn test_unbounded_limit_returns_everything() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    seed(&pool, tenant, &["A", "B", "C"]).await;

    let total = TotalCount::new();
    let mut uow = UnitOfWork::read_only(&pool);
    let rows: Vec<Talent> = REPO
        .get_all_for_tenant(&mut uow, tenant, vec![paginate(-1, 0, Some(&total))])
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(total.get(), 3);
}

#[tokio::test]
async fn test_count_only_sees_filters_before_paginate() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    seed(&pool, tenant, &["Zed", "Amy", "Bob", "Cy"]).await;
    let only_zed = || filter("talents.first_name = ?", args!["Zed"]);

    let before = TotalCount::new();
    let mut uow = UnitOfWork::read_only(&pool);
    let _: Vec<Talent> = REPO
        .get_all_for_tenant(&mut uow, tenant, vec![only_zed(), paginate(10, 0, Some(&before))])
        .await
        .unwrap();

    let after = TotalCount::new();
    let rows: Vec<Talent> = REPO
        .get_all_for_tenant(&mut uow, tenant, vec![paginate(10, 0, Some(&after)), only_zed()])
        .await
        .unwrap();

    assert_eq!(before.get(), 1);
    assert_eq!(after.get(), 4);
    // The row filter itself applies either way
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_filters_commute() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    seed(&pool, tenant, &["Ann", "Ann", "Ben"]).await;
    let by_name = || filter("talents.first_name = ?", args!["Ann"]);
    let active = || filter("talents.is_active = ?", args![true]);

    let mut uow = UnitOfWork::read_only(&pool);
    let one: Vec<Talent> = REPO
        .get_all_in_order_for_tenant(&mut uow, tenant, "talents.id", vec![by_name(), active()])
        .await
        .unwrap();
    let two: Vec<Talent> = REPO
        .get_all_in_order_for_tenant(&mut uow, tenant, "talents.id", vec![active(), by_name()])
        .await
        .unwrap();

    assert_eq!(one.len(), 2);
    assert_eq!(one, two);
}

// ============================================================================
// Unit of work
// ============================================================================

#[tokio::test]
async fn test_rollback_discards_every_prior_write() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let first = Talent::new(tenant, "Ada", "Lovelace", unique_email(), Uuid::new_v4());
    let mut clash = Talent::new(tenant, "Eve", "Copy", unique_email(), Uuid::new_v4());
    clash.email = first.email.clone();

    let mut uow = UnitOfWork::begin(&pool).await.unwrap();
    REPO.add(&mut uow, &first).await.unwrap();
    let failed = REPO.add(&mut uow, &clash).await;
    assert!(matches!(&failed, Err(RepositoryError::Database(_))));
    assert!(failed.is_err_and(|e| e.is_unique_violation()));
    uow.rollback().await.unwrap();

    assert_eq!(count(&pool, tenant).await, 0);
}

#[tokio::test]
async fn test_snapshot_does_not_see_later_commits() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    seed(&pool, tenant, &["Ada"]).await;

    let mut reader = UnitOfWork::snapshot(&pool).await.unwrap();
    let before = Repository::<Talent>::get_count_for_tenant(&REPO, &mut reader, tenant, vec![])
        .await
        .unwrap();

    seed(&pool, tenant, &["Alan"]).await;

    let during = Repository::<Talent>::get_count_for_tenant(&REPO, &mut reader, tenant, vec![])
        .await
        .unwrap();
    reader.commit().await.unwrap();

    assert_eq!(before, 1);
    assert_eq!(during, 1);
    assert_eq!(count(&pool, tenant).await, 2);
}

#[tokio::test]
async fn test_email_uniqueness_ignores_case() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let first = Talent::new(tenant, "Ada", "Lovelace", unique_email(), Uuid::new_v4());
    let shouted = Talent::new(tenant, "Ada", "Again", first.email.to_uppercase(), Uuid::new_v4());

    let mut uow = UnitOfWork::begin(&pool).await.unwrap();
    REPO.add(&mut uow, &first).await.unwrap();
    let result = REPO.add(&mut uow, &shouted).await;
    uow.rollback().await.unwrap();

    assert!(result.is_err_and(|e| e.is_unique_violation()));
}

// ============================================================================
// Soft delete
// ============================================================================

#[tokio::test]
async fn test_soft_deleted_rows_leave_scoped_reads_only() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let talent = seed(&pool, tenant, &["A"]).await.remove(0);

    let mut uow = UnitOfWork::read_only(&pool);
    let fetched: Talent = REPO.get(&mut uow, talent.id, vec![]).await.unwrap();
    assert_eq!(fetched.first_name, "A");

    let mut uow = UnitOfWork::begin(&pool).await.unwrap();
    let affected = Repository::<Talent>::update_with_map_for_tenant(
        &REPO,
        &mut uow,
        tenant,
        Changeset::soft_delete(Uuid::new_v4()),
        vec![filter("talents.id = ?", args![talent.id])],
    )
    .await
    .unwrap();
    uow.commit().await.unwrap();
    assert_eq!(affected, 1);

    let mut uow = UnitOfWork::read_only(&pool);
    let live: Vec<Talent> = REPO.get_all_for_tenant(&mut uow, tenant, vec![]).await.unwrap();
    let all = Repository::<Talent>::get_count_unscoped_for_tenant(&REPO, &mut uow, tenant, vec![])
        .await
        .unwrap();

    assert!(live.is_empty());
    assert_eq!(all, 1);
}

#[tokio::test]
async fn test_soft_delete_of_missing_row_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let mut uow = UnitOfWork::begin(&pool).await.unwrap();
    let result = Repository::<Talent>::soft_delete_for_tenant(&REPO, &mut uow, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()).await;
    uow.rollback().await.unwrap();

    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
