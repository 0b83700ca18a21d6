//! Task CRUD against `/api/{user}/tasks`.
//!
//! No caching and no optimistic merging: callers re-fetch the list after
//! every mutation.

use reqwest::Method;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Task, TaskDraft, TaskPatch};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct TaskClient {
    api: ApiClient,
}

impl TaskClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn collection(session: &Session) -> String {
        format!("/api/{}/tasks", session.user_id())
    }

    fn item(session: &Session, id: i64) -> String {
        format!("/api/{}/tasks/{}", session.user_id(), id)
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Task>> {
        let request = self.api.authorized(Method::GET, &Self::collection(session), session);
        self.api.send_json(request, "Failed to fetch tasks").await
    }

    pub async fn get(&self, session: &Session, id: i64) -> Result<Task> {
        let request = self.api.authorized(Method::GET, &Self::item(session, id), session);
        self.api.send_json(request, "Failed to fetch task").await
    }

    pub async fn create(&self, session: &Session, draft: &TaskDraft) -> Result<Task> {
        let request = self
            .api
            .authorized(Method::POST, &Self::collection(session), session)
            .json(draft);
        let task: Task = self.api.send_json(request, "Failed to create task").await?;
        tracing::info!(task_id = task.id, "task created");
        Ok(task)
    }

    pub async fn update(&self, session: &Session, id: i64, patch: &TaskPatch) -> Result<Task> {
        let request = self
            .api
            .authorized(Method::PUT, &Self::item(session, id), session)
            .json(patch);
        let task: Task = self.api.send_json(request, "Failed to update task").await?;
        tracing::info!(task_id = task.id, "task updated");
        Ok(task)
    }

    pub async fn delete(&self, session: &Session, id: i64) -> Result<()> {
        let request = self.api.authorized(Method::DELETE, &Self::item(session, id), session);
        self.api.send_empty(request, "Failed to delete task").await?;
        tracing::info!(task_id = id, "task deleted");
        Ok(())
    }

    /// Flips `completed` server-side and returns the task as the server now has it.
    pub async fn toggle_completion(&self, session: &Session, id: i64) -> Result<Task> {
        let path = format!("{}/complete", Self::item(session, id));
        let request = self.api.authorized(Method::PATCH, &path, session);
        let task: Task = self
            .api
            .send_json(request, "Failed to toggle task completion")
            .await?;
        tracing::info!(task_id = task.id, completed = task.completed, "task completion toggled");
        Ok(task)
    }
}
