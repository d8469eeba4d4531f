//! Generic storage-engine operations shared by the repositories.
//!
//! These helpers work for any `SeaORM` entity keyed by `Uuid` and run on any
//! connection, including a snapshot transaction.

use std::collections::HashMap;

use roster_shared::types::PageRequest;
use sea_orm::{
    AccessMode, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, Iterable, PaginatorTrait,
    PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait,
};
use uuid::Uuid;

/// Opens a read-only transaction that all reads of one hydration call share.
///
/// Postgres and MySQL run it at `REPEATABLE READ`; SQLite transactions are
/// already serializable.
///
/// # Errors
///
/// Returns an error if the transaction cannot be started.
pub async fn begin_snapshot(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    match db.get_database_backend() {
        DatabaseBackend::Sqlite => db.begin().await,
        _ => {
            db.begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
        }
    }
}

/// Point lookup by primary key. A missing row is `Ok(None)`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_by_id<E, C>(db: &C, id: Uuid) -> Result<Option<E::Model>, DbErr>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait,
{
    E::find_by_id(id).one(db).await
}

/// Loads rows by primary key, returned in the order of `ids`.
///
/// Ids without a row are skipped; repeated ids repeat the row.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_by_ids<E, C>(
    db: &C,
    id_column: E::Column,
    ids: &[Uuid],
    key: fn(&E::Model) -> Uuid,
) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Clone,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: HashMap<Uuid, E::Model> = E::find()
        .filter(id_column.is_in(ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (key(&row), row))
        .collect();

    Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
}

/// Orders by `order`, then by primary key so rows that tie on `order` keep
/// the same position across queries.
fn ordered<E: EntityTrait>(query: Select<E>, order: E::Column) -> Select<E> {
    E::PrimaryKey::iter().fold(query.order_by_asc(order), |query, key| {
        query.order_by_asc(key.into_column())
    })
}

fn page_query<E: EntityTrait>(order: E::Column, request: PageRequest) -> Select<E> {
    ordered(E::find(), order)
        .offset(request.offset())
        .limit(request.limit())
}

/// Loads one page of rows ordered by `order`, together with the total row
/// count across all pages. Ties on `order` break by primary key, so page
/// boundaries are stable.
///
/// # Errors
///
/// Returns an error if either query fails.
pub async fn get_page<E, C>(
    db: &C,
    order: E::Column,
    request: PageRequest,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = E::find().count(db).await?;
    let rows = page_query::<E>(order, request).all(db).await?;

    Ok((rows, total))
}

/// Loads every child whose `foreign_key` is in `parent_ids`, paired with its
/// parent id. Only the child table is read.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn query_children_by_parent_ids<E, C>(
    db: &C,
    foreign_key: E::Column,
    parent_ids: &[Uuid],
    order: E::Column,
    parent_of: fn(&E::Model) -> Option<Uuid>,
) -> Result<Vec<(Uuid, E::Model)>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if parent_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = E::find().filter(foreign_key.is_in(parent_ids.iter().copied()));
    let children = ordered(query, order).all(db).await?;

    Ok(children
        .into_iter()
        .filter_map(|child| parent_of(&child).map(|parent| (parent, child)))
        .collect())
}
