use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::todos::{CreateTodoRequest, TodoList},
    entity::todos::{ActiveModel as TodoActive, Column as TodoCol, Entity as Todos, Model as TodoModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{TodoItem, TodoKind},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_todos(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<TodoList>> {
    ensure_staff(user)?;
    let items = Todos::find()
        .order_by_asc(TodoCol::Position)
        .order_by_asc(TodoCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(todo_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::total(items.len());
    let (pre_arrival, post_arrival): (Vec<TodoItem>, Vec<TodoItem>) = items
        .into_iter()
        .partition(|item| item.kind == TodoKind::PreArrival);
    Ok(ApiResponse::success(
        "Todos",
        TodoList {
            pre_arrival,
            post_arrival,
        },
        Some(meta),
    ))
}

/// Appends to the end of its list unless a position is given.
pub async fn create_todo(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTodoRequest,
) -> AppResult<ApiResponse<TodoItem>> {
    ensure_staff(user)?;
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".into()));
    }

    let position = match payload.position {
        Some(position) => position,
        None => Todos::find()
            .filter(TodoCol::Kind.eq(payload.kind.as_str()))
            .count(&state.orm)
            .await? as i32,
    };

    let todo = TodoActive {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.kind.as_str().to_string()),
        content: Set(content.to_string()),
        position: Set(position),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user),
        "todo_create",
        "todos",
        serde_json::json!({ "todo_id": todo.id, "kind": todo.kind }),
    )
    .await;

    Ok(ApiResponse::success(
        "Todo created",
        todo_from_entity(todo)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_todo(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Todos::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        Some(user),
        "todo_delete",
        "todos",
        serde_json::json!({ "todo_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Todo deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn todo_from_entity(model: TodoModel) -> AppResult<TodoItem> {
    Ok(TodoItem {
        id: model.id,
        kind: TodoKind::parse(&model.kind)?,
        content: model.content,
        position: model.position,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
