//! Generic repository over every syncable kind.

use std::marker::PhantomData;

use sea_orm::sea_query::{Alias, Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Select,
};

use crate::kinds::{FlaggedKind, SyncKind};

/// Repository for the rows of one [`SyncKind`].
pub struct SyncableRepository<K>(PhantomData<K>);

/// Sort key for mixed timestamp formats. Server `createdAt` values and local
/// RFC 3339 stamps compare as instants once converted by SQLite's `julianday()`,
/// which keeps sub-second precision.
fn chronological<K: SyncKind>() -> SimpleExpr {
    julianday(K::timestamp_column())
}

pub(crate) fn julianday<T: IntoColumnRef>(column: T) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::cust(Alias::new("julianday")).arg(Expr::col(column)))
}

impl<K: SyncKind> SyncableRepository<K> {
    fn ordered(order: Order) -> Select<K::Entity> {
        K::Entity::find()
            .order_by(chronological::<K>(), order.clone())
            .order_by(K::id_column(), order)
    }

    /// Insert a row and return it with its generated id.
    pub async fn insert<C>(conn: &C, row: K::ActiveModel) -> Result<K::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        row.insert(conn).await
    }

    pub async fn get_by_id<C>(conn: &C, local_id: i32) -> Result<Option<K::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        K::Entity::find().filter(K::id_column().eq(local_id)).one(conn).await
    }

    pub async fn get_by_server_id<C>(conn: &C, server_id: &str) -> Result<Option<K::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        K::Entity::find()
            .filter(K::server_id_column().eq(server_id))
            .one(conn)
            .await
    }

    /// Rows whose date column equals `date`, oldest first.
    pub async fn list_by_date<C>(conn: &C, date: &str) -> Result<Vec<K::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::ordered(Order::Asc)
            .filter(K::date_column().eq(date))
            .all(conn)
            .await
    }

    /// Newest rows first, at most `limit` of them.
    pub async fn list_latest<C>(conn: &C, limit: u64) -> Result<Vec<K::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::ordered(Order::Desc).limit(limit).all(conn).await
    }

    /// Rows not yet acknowledged by the backend, oldest first.
    pub async fn list_unsynced<C>(conn: &C) -> Result<Vec<K::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::ordered(Order::Asc)
            .filter(K::synced_column().eq(false))
            .all(conn)
            .await
    }

    /// Apply the set columns of `changes` to one row. Returns the rows affected.
    pub async fn update_fields<C>(conn: &C, local_id: i32, changes: K::ActiveModel) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        if !changes.is_changed() {
            return Ok(0);
        }
        let result = K::Entity::update_many()
            .set(changes)
            .filter(K::id_column().eq(local_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Update a row in place from a server record keyed by `server_id`.
    pub async fn update_by_server_id<C>(conn: &C, server_id: &str, row: K::ActiveModel) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = K::Entity::update_many()
            .set(row)
            .filter(K::server_id_column().eq(server_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Record the backend id of a pushed row.
    pub async fn mark_synced<C>(conn: &C, local_id: i32, server_id: &str, timestamp: Option<&str>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut update = K::Entity::update_many()
            .col_expr(K::server_id_column(), Expr::value(server_id))
            .col_expr(K::synced_column(), Expr::value(true));
        if let Some(ts) = timestamp {
            update = update.col_expr(K::timestamp_column(), Expr::value(ts));
        }
        let result = update.filter(K::id_column().eq(local_id)).exec(conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_id<C>(conn: &C, local_id: i32) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = K::Entity::delete_many()
            .filter(K::id_column().eq(local_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_server_id<C>(conn: &C, server_id: &str) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = K::Entity::delete_many()
            .filter(K::server_id_column().eq(server_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}

impl<K: FlaggedKind> SyncableRepository<K> {
    /// Set the kind's status flag on one row, restamping it when `stamp` is
    /// given. Returns the rows affected.
    pub async fn set_flag<C>(conn: &C, local_id: i32, value: bool, stamp: Option<&str>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut update = K::Entity::update_many().col_expr(K::flag_column(), Expr::value(value));
        if let Some(stamp) = stamp {
            update = update.col_expr(K::timestamp_column(), Expr::value(stamp));
        }
        let result = update
            .filter(K::id_column().eq(local_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
