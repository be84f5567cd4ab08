use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: Option<String>,
    pub due_date: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::done::Entity")]
    Done,
}

impl Related<super::done::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Done.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Completion state of a task, derived from the presence of its done marker.
/// The marker row is the source of truth; this enum never gets stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Complete,
}

impl TaskStatus {
    pub fn from_marker(marker: Option<&super::done::Model>) -> Self {
        match marker {
            Some(_) => Self::Complete,
            None => Self::Pending,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}
