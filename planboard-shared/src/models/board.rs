/// Board aggregation read
///
/// Produces the single nested view behind `GET /api/projects/:id`: project
/// metadata, the member list, the ordered status columns, and each
/// column's tasks with their assignees. This is pure composition over
/// four sequential queries plus an in-memory group-by on `status_id`;
/// there is no derived computation beyond the grouping.
///
/// The reads are not transactional. A torn snapshot under concurrent
/// writes is accepted; partial failure is all-or-nothing (any failed
/// query aborts the whole read).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

use super::project::Project;
use super::status::StatusColumn;
use super::user::UserSummary;

/// The aggregated project board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub team: Vec<UserSummary>,
    pub columns: Vec<BoardColumn>,
}

/// One status column with its grouped tasks
///
/// A column with no tasks carries an empty list, never an absent one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub id: i64,
    pub title: String,
    pub position: i32,
    pub tasks: Vec<BoardTask>,
}

/// Task card on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTask {
    pub id: i64,
    pub status_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub assignees: Vec<UserSummary>,
}

#[derive(Debug, sqlx::FromRow)]
struct BoardTaskRow {
    id: i64,
    status_id: i64,
    title: String,
    description: Option<String>,
    position: i32,
    due_date: Option<NaiveDate>,
    priority: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskAssigneeRow {
    task_id: i64,
    id: i64,
    name: String,
    email: String,
    avatar: Option<String>,
}

impl Board {
    /// Loads the board for a project
    ///
    /// Returns `Ok(None)` when the project does not exist; any other
    /// failed step aborts the whole read.
    pub async fn load(pool: &PgPool, project_id: i64) -> Result<Option<Self>, sqlx::Error> {
        let Some(project) = Project::find_by_id(pool, project_id).await? else {
            return Ok(None);
        };

        let team = Project::members(pool, project_id).await?;
        let columns = StatusColumn::list_for_project(pool, project_id).await?;

        let task_rows = sqlx::query_as::<_, BoardTaskRow>(
            r#"
            SELECT id, status_id, title, description, position, due_date, priority
            FROM tasks
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let assignee_rows = sqlx::query_as::<_, TaskAssigneeRow>(
            r#"
            SELECT t.id AS task_id, u.id, u.name, u.email, u.avatar
            FROM tasks t
            JOIN task_assignees ta ON ta.task_id = t.id
            JOIN users u ON u.id = ta.user_id
            WHERE t.project_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut assignees_by_task: HashMap<i64, Vec<UserSummary>> = HashMap::new();
        for row in assignee_rows {
            assignees_by_task.entry(row.task_id).or_default().push(UserSummary {
                id: row.id,
                name: row.name,
                email: row.email,
                avatar: row.avatar,
            });
        }

        let tasks = task_rows
            .into_iter()
            .map(|row| BoardTask {
                assignees: assignees_by_task.remove(&row.id).unwrap_or_default(),
                id: row.id,
                status_id: row.status_id,
                title: row.title,
                description: row.description,
                position: row.position,
                due_date: row.due_date,
                priority: row.priority,
            })
            .collect();

        Ok(Some(Board {
            id: project.id,
            name: project.name,
            description: project.description,
            due_date: project.due_date,
            created_at: project.created_at,
            team,
            columns: group_by_column(columns, tasks),
        }))
    }
}

/// Groups tasks under their status columns
///
/// Column order is preserved from the input; tasks keep their query
/// insertion order within a column. Every column appears in the output,
/// empty ones included. Tasks referencing a column not in the input (a
/// torn snapshot) are dropped rather than invented a column for.
pub fn group_by_column(columns: Vec<StatusColumn>, tasks: Vec<BoardTask>) -> Vec<BoardColumn> {
    let mut tasks_by_status: HashMap<i64, Vec<BoardTask>> = HashMap::new();
    for task in tasks {
        tasks_by_status.entry(task.status_id).or_default().push(task);
    }

    columns
        .into_iter()
        .map(|col| BoardColumn {
            tasks: tasks_by_status.remove(&col.id).unwrap_or_default(),
            id: col.id,
            title: col.title,
            position: col.position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(id: i64, title: &str, position: i32) -> StatusColumn {
        StatusColumn {
            id,
            project_id: 1,
            title: title.to_string(),
            position,
        }
    }

    fn task(id: i64, status_id: i64) -> BoardTask {
        BoardTask {
            id,
            status_id,
            title: format!("task-{}", id),
            description: None,
            position: 0,
            due_date: None,
            priority: None,
            assignees: vec![],
        }
    }

    #[test]
    fn test_every_column_appears_empty_ones_included() {
        let columns = vec![column(1, "To Do", 1), column(2, "In Progress", 2), column(3, "Done", 3)];
        let tasks = vec![task(10, 1), task(11, 1)];

        let board = group_by_column(columns, tasks);

        assert_eq!(board.len(), 3);
        assert_eq!(board[0].tasks.len(), 2);
        assert!(board[1].tasks.is_empty());
        assert!(board[2].tasks.is_empty());
    }

    #[test]
    fn test_each_task_lands_in_its_own_column_exactly_once() {
        let columns = vec![column(1, "To Do", 1), column(2, "Done", 2)];
        let tasks = vec![task(10, 1), task(11, 2), task(12, 2), task(13, 1)];

        let board = group_by_column(columns, tasks);

        let total: usize = board.iter().map(|c| c.tasks.len()).sum();
        assert_eq!(total, 4);
        for col in &board {
            for t in &col.tasks {
                assert_eq!(t.status_id, col.id);
            }
        }
    }

    #[test]
    fn test_within_column_order_is_insertion_order() {
        let columns = vec![column(1, "To Do", 1)];
        let tasks = vec![task(30, 1), task(10, 1), task(20, 1)];

        let board = group_by_column(columns, tasks);

        let ids: Vec<i64> = board[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_column_order_is_preserved() {
        let columns = vec![column(5, "Done", 3), column(2, "To Do", 1)];
        let board = group_by_column(columns, vec![]);

        let ids: Vec<i64> = board.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn test_task_with_unknown_column_is_dropped() {
        let columns = vec![column(1, "To Do", 1)];
        let tasks = vec![task(10, 1), task(11, 99)];

        let board = group_by_column(columns, tasks);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].tasks.len(), 1);
    }

    #[test]
    fn test_board_serializes_camel_case() {
        let board = Board {
            id: 1,
            name: "Launch".to_string(),
            description: String::new(),
            due_date: None,
            created_at: Utc::now(),
            team: vec![],
            columns: group_by_column(vec![column(1, "To Do", 1)], vec![task(10, 1)]),
        };

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["columns"][0]["tasks"][0]["statusId"], 1);
        assert!(json.get("createdAt").is_some());
    }
}
