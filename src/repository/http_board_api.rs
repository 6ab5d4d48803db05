use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::board_api::{BoardApi, MoveTaskRequest};
use crate::config::BoardConfig;
use crate::domain::board::BoardSnapshot;
use crate::domain::ids::{BoardId, ColumnId, SwimlaneId};
use crate::domain::task::Task;
use crate::domain::wire;
use crate::services::error_handling::{BoardError, ErrorContext};

/// REST client for the board backend.
#[derive(Clone)]
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.auth_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BoardError::Backend {
                operation: operation.to_string(),
                source: e.into(),
            })?;

        let status = response.status();
        debug!(operation = %operation, status = %status, "Backend responded");
        if !status.is_success() {
            return Err(BoardError::UnexpectedStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(response)
    }

    async fn put_json(&self, operation: &str, path: &str, body: &Value) -> Result<()> {
        let request = self.client.put(self.url(path)).json(body);
        self.send(operation, request).await?;
        Ok(())
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn move_task(&self, request: &MoveTaskRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;
        let path = format!("tasks/{}/move", request.task_id);
        ErrorContext::new("move_task")
            .with_detail("task_id", &request.task_id)
            .with_detail("column_id", &request.column_id)
            .wrap(self.put_json("move_task", &path, &body).await)
    }

    async fn reorder_columns(&self, board_id: &BoardId, column_ids: &[ColumnId]) -> Result<()> {
        let path = format!("boards/{}/columns/reorder", board_id);
        ErrorContext::new("reorder_columns")
            .with_detail("board_id", board_id)
            .wrap(
                self.put_json("reorder_columns", &path, &json!({ "columnIds": column_ids }))
                    .await,
            )
    }

    async fn reorder_swimlanes(&self, board_id: &BoardId, swimlane_ids: &[SwimlaneId]) -> Result<()> {
        let path = format!("boards/{}/swimlanes/reorder", board_id);
        ErrorContext::new("reorder_swimlanes")
            .with_detail("board_id", board_id)
            .wrap(
                self.put_json("reorder_swimlanes", &path, &json!({ "swimlaneIds": swimlane_ids }))
                    .await,
            )
    }

    async fn fetch_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>> {
        let request = self.client.get(self.url(&format!("boards/{}/tasks", board_id)));
        let response = self.send("fetch_tasks", request).await?;
        let documents: Vec<Value> = response.json().await?;
        Ok(wire::tasks_from_json(&documents))
    }

    async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        let request = self.client.get(self.url(&format!("boards/{}", board_id)));
        let response = self.send("fetch_board", request).await?;
        Ok(response.json().await?)
    }
}
