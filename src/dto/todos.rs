use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{TodoItem, TodoKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    pub kind: TodoKind,
    pub content: String,
    pub position: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoList {
    pub pre_arrival: Vec<TodoItem>,
    pub post_arrival: Vec<TodoItem>,
}
