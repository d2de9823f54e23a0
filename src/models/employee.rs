use serde::Serialize;
use sqlx::FromRow;

/// Active workshop employee, offered as responsible on the board.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub name: String,
}
