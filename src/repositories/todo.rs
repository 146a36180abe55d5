//! Todo repository: category views and the carried-over holding table.

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter, QueryOrder};

use super::syncable::julianday;
use crate::entities::{carried_over_todo, todo};

/// Repository for todo-specific queries.
pub struct TodoRepository;

impl TodoRepository {
    /// Todos in a category, newest first.
    pub async fn list_by_category<C>(conn: &C, category: &str) -> Result<Vec<todo::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        todo::Entity::find()
            .filter(todo::Column::Category.eq(category))
            .order_by(julianday(todo::Column::CreatedAt), Order::Desc)
            .order_by_desc(todo::Column::Id)
            .all(conn)
            .await
    }

    /// Todos that are not completed yet, oldest first.
    pub async fn list_pending<C>(conn: &C) -> Result<Vec<todo::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        todo::Entity::find()
            .filter(todo::Column::Completed.eq(false))
            .order_by_asc(todo::Column::Id)
            .all(conn)
            .await
    }

    /// Carried-over todos in a category, most recently carried first.
    pub async fn list_carried_over_by_category<C>(
        conn: &C,
        category: &str,
    ) -> Result<Vec<carried_over_todo::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        carried_over_todo::Entity::find()
            .filter(carried_over_todo::Column::Category.eq(category))
            .order_by_desc(carried_over_todo::Column::CarriedOverAt)
            .order_by_desc(carried_over_todo::Column::Id)
            .all(conn)
            .await
    }

    /// Copy a todo into the carried-over table and delete the source row.
    ///
    /// Returns `None` if no todo has that id. Both statements run on `conn`;
    /// callers pass a transaction so the move is all-or-nothing.
    pub async fn carry_over<C>(conn: &C, task_id: i32, now: &str) -> Result<Option<carried_over_todo::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(task) = todo::Entity::find_by_id(task_id).one(conn).await? else {
            return Ok(None);
        };

        let moved = carried_over_todo::ActiveModel {
            id: NotSet,
            original_task_id: Set(Some(task.id)),
            title: Set(task.title),
            description: Set(task.description),
            category: Set(task.category),
            priority: Set(task.priority),
            completed: Set(task.completed),
            due_date: Set(task.due_date),
            original_created_at: Set(task.created_at),
            carried_over_at: Set(now.to_owned()),
            updated_at: Set(now.to_owned()),
        }
        .insert(conn)
        .await?;

        todo::Entity::delete_by_id(task_id).exec(conn).await?;

        Ok(Some(moved))
    }
}
