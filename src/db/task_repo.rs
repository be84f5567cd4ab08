use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

use super::entities::prelude::{Done, Task};
use super::entities::task::TaskStatus;
use super::entities::{done, task};
use super::error::{StoreError, StoreResult};

pub async fn create_task(
    db: &DatabaseConnection,
    title: Option<String>,
    due_date: Option<NaiveDateTime>,
) -> StoreResult<task::Model> {
    let model = task::ActiveModel {
        title: Set(title),
        due_date: Set(due_date),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

pub async fn list_tasks(
    db: &DatabaseConnection,
) -> StoreResult<Vec<(task::Model, Option<done::Model>)>> {
    Ok(Task::find()
        .find_also_related(Done)
        .order_by_asc(task::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_task(
    db: &DatabaseConnection,
    task_id: i32,
) -> StoreResult<(task::Model, TaskStatus)> {
    let Some((task, marker)) = Task::find_by_id(task_id)
        .find_also_related(Done)
        .one(db)
        .await?
    else {
        return Err(StoreError::TaskNotFound(task_id));
    };
    Ok((task, TaskStatus::from_marker(marker.as_ref())))
}

/// Overwrites title and due_date. The done marker is untouched; its state at
/// the time of the update is returned alongside the task.
pub async fn update_task(
    db: &DatabaseConnection,
    task_id: i32,
    title: Option<String>,
    due_date: Option<NaiveDateTime>,
) -> StoreResult<(task::Model, TaskStatus)> {
    let txn = db.begin().await?;
    let Some((task, marker)) = Task::find_by_id(task_id)
        .find_also_related(Done)
        .one(&txn)
        .await?
    else {
        return Err(StoreError::TaskNotFound(task_id));
    };
    let status = TaskStatus::from_marker(marker.as_ref());

    let mut active: task::ActiveModel = task.into();
    active.title = Set(title);
    active.due_date = Set(due_date);
    let task = active.update(&txn).await?;
    txn.commit().await?;
    Ok((task, status))
}

pub async fn delete_task(db: &DatabaseConnection, task_id: i32) -> StoreResult<()> {
    let txn = db.begin().await?;
    let Some(task) = Task::find_by_id(task_id).one(&txn).await? else {
        return Err(StoreError::TaskNotFound(task_id));
    };
    // marker first, so no orphan survives the task
    Done::delete_by_id(task_id).exec(&txn).await?;
    task.delete(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Tasks whose due_date falls within the current local calendar day,
/// midnight-inclusive to next-midnight-exclusive.
pub async fn list_due_today(
    db: &DatabaseConnection,
) -> StoreResult<Vec<(task::Model, Option<done::Model>)>> {
    let today = Local::now().date_naive().and_time(NaiveTime::MIN);
    let tomorrow = today + Duration::days(1);
    Ok(Task::find()
        .filter(task::Column::DueDate.gte(today))
        .filter(task::Column::DueDate.lt(tomorrow))
        .find_also_related(Done)
        .order_by_asc(task::Column::Id)
        .all(db)
        .await?)
}

/// Pending -> Complete. Not idempotent: marking an already-complete task is
/// an `AlreadyDone` error.
pub async fn mark_done(db: &DatabaseConnection, task_id: i32) -> StoreResult<done::Model> {
    let txn = db.begin().await?;
    if Task::find_by_id(task_id).one(&txn).await?.is_none() {
        return Err(StoreError::TaskNotFound(task_id));
    }
    if Done::find_by_id(task_id).one(&txn).await?.is_some() {
        return Err(StoreError::AlreadyDone(task_id));
    }

    let marker = done::ActiveModel { id: Set(task_id) };
    let marker = match marker.insert(&txn).await {
        Ok(model) => model,
        // two concurrent marks can both pass the existence check; the
        // primary key settles the race
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(StoreError::AlreadyDone(task_id));
        }
        Err(err) => return Err(StoreError::Db(err)),
    };
    txn.commit().await?;
    Ok(marker)
}

/// Complete -> Pending. `DoneNotFound` covers both an already-pending task
/// and an absent one.
pub async fn unmark_done(db: &DatabaseConnection, task_id: i32) -> StoreResult<()> {
    let result = Done::delete_by_id(task_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(StoreError::DoneNotFound(task_id));
    }
    Ok(())
}
