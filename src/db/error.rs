use sea_orm::DbErr;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("task not found (id={0})")]
    TaskNotFound(i32),
    #[error("done marker not found (id={0})")]
    DoneNotFound(i32),
    #[error("task already marked done (id={0})")]
    AlreadyDone(i32),
}
