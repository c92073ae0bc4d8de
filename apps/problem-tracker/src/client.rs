//! HTTP client for the tracker API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use review_core::{
    ApiMessage, CreateProblemRequest, CreatedProblem, Problem, ProblemId, ProblemStats,
    ReviewStep, UpdateNotesRequest,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the UI needs from the server. `None` means the server
/// answered successfully without usable data.
#[async_trait]
pub trait ProblemApi: Send + Sync {
    async fn list(&self) -> ApiResult<Vec<Problem>>;
    async fn list_today(&self) -> ApiResult<Vec<Problem>>;
    async fn list_reviews(&self) -> ApiResult<Vec<Problem>>;
    async fn get(&self, id: ProblemId) -> ApiResult<Option<Problem>>;
    async fn stats(&self) -> ApiResult<Option<ProblemStats>>;
    async fn search(&self, query: &str) -> ApiResult<Vec<Problem>>;
    async fn create(&self, request: &CreateProblemRequest) -> ApiResult<Option<CreatedProblem>>;
    async fn advance(&self, id: ProblemId, step: ReviewStep) -> ApiResult<Option<ApiMessage>>;
    async fn reset_timer(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>>;
    async fn update_notes(&self, id: ProblemId, notes: &str) -> ApiResult<Option<ApiMessage>>;
    async fn delete(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>>;
}

pub struct HttpProblemApi {
    client: Client,
    base_url: String,
}

impl HttpProblemApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        self.execute(self.client.get(self.url(path))).await
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> ApiResult<Option<T>> {
        self.execute(self.client.put(self.url(path)).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).trim().to_string();
            warn!(%status, %url, %body, "request rejected");
            return Err(ApiError::Status { status, body });
        }

        debug!(%status, %url, bytes = body.len(), "request ok");
        Ok(decode_body(status, &body))
    }
}

/// Interpret a successful response body. No content, an empty body, JSON
/// `null` and anything that fails to parse all mean "no data".
pub fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Option<T> {
    if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Option<T>>(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "discarding unparseable response body");
            None
        }
    }
}

#[async_trait]
impl ProblemApi for HttpProblemApi {
    async fn list(&self) -> ApiResult<Vec<Problem>> {
        Ok(self.get_json("/problems").await?.unwrap_or_default())
    }

    async fn list_today(&self) -> ApiResult<Vec<Problem>> {
        Ok(self.get_json("/problems/today").await?.unwrap_or_default())
    }

    async fn list_reviews(&self) -> ApiResult<Vec<Problem>> {
        Ok(self.get_json("/problems/reviews").await?.unwrap_or_default())
    }

    async fn get(&self, id: ProblemId) -> ApiResult<Option<Problem>> {
        match self.get_json(&format!("/problems/{id}")).await {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            other => other,
        }
    }

    async fn stats(&self) -> ApiResult<Option<ProblemStats>> {
        self.get_json("/problems/stats").await
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<Problem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .client
            .get(self.url("/problems/search"))
            .query(&[("q", query)]);
        Ok(self.execute(request).await?.unwrap_or_default())
    }

    async fn create(&self, request: &CreateProblemRequest) -> ApiResult<Option<CreatedProblem>> {
        self.execute(self.client.post(self.url("/problems")).json(request))
            .await
    }

    async fn advance(&self, id: ProblemId, step: ReviewStep) -> ApiResult<Option<ApiMessage>> {
        self.put_json(&format!("/problems/{id}/{}", step.path_segment()), &json!({}))
            .await
    }

    async fn reset_timer(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>> {
        self.put_json(&format!("/problems/{id}/reset-timer"), &json!({}))
            .await
    }

    async fn update_notes(&self, id: ProblemId, notes: &str) -> ApiResult<Option<ApiMessage>> {
        let body = UpdateNotesRequest {
            notes: notes.to_string(),
        };
        self.execute(
            self.client
                .put(self.url(&format!("/problems/{id}/notes")))
                .json(&body),
        )
        .await
    }

    async fn delete(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>> {
        self.execute(self.client.delete(self.url(&format!("/problems/{id}"))))
            .await
    }
}

/// In-memory stand-in for the server used by the app tests.
#[cfg(test)]
pub mod fake {
    use super::*;
    use chrono::Local;
    use review_core::apply_advance;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        problems: Vec<Problem>,
        failing: HashSet<&'static str>,
        calls: Vec<String>,
        next_id: ProblemId,
    }

    #[derive(Default)]
    pub struct FakeApi {
        state: Mutex<State>,
    }

    impl FakeApi {
        pub fn with_problems(problems: Vec<Problem>) -> Self {
            let next_id = problems.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            Self {
                state: Mutex::new(State {
                    problems,
                    next_id,
                    ..Default::default()
                }),
            }
        }

        /// Make every later call to `op` fail with a 500.
        pub fn fail(&self, op: &'static str) {
            self.state.lock().unwrap().failing.insert(op);
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn problems(&self) -> Vec<Problem> {
            self.state.lock().unwrap().problems.clone()
        }

        fn enter(&self, op: &'static str, call: String) -> ApiResult<std::sync::MutexGuard<'_, State>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            if state.failing.contains(op) {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: format!("{op} failed"),
                });
            }
            Ok(state)
        }

        fn message(text: &str) -> ApiResult<Option<ApiMessage>> {
            Ok(Some(ApiMessage {
                message: text.to_string(),
            }))
        }
    }

    #[async_trait]
    impl ProblemApi for FakeApi {
        async fn list(&self) -> ApiResult<Vec<Problem>> {
            Ok(self.enter("list", "list".into())?.problems.clone())
        }

        async fn list_today(&self) -> ApiResult<Vec<Problem>> {
            let today = Local::now().date_naive();
            let state = self.enter("list_today", "list_today".into())?;
            Ok(state
                .problems
                .iter()
                .filter(|p| p.date_attempted == today)
                .cloned()
                .collect())
        }

        async fn list_reviews(&self) -> ApiResult<Vec<Problem>> {
            let today = Local::now().date_naive();
            let state = self.enter("list_reviews", "list_reviews".into())?;
            Ok(state
                .problems
                .iter()
                .filter(|p| review_core::is_review_due(p, today))
                .cloned()
                .collect())
        }

        async fn get(&self, id: ProblemId) -> ApiResult<Option<Problem>> {
            let state = self.enter("get", format!("get {id}"))?;
            Ok(state.problems.iter().find(|p| p.id == id).cloned())
        }

        async fn stats(&self) -> ApiResult<Option<ProblemStats>> {
            let state = self.enter("stats", "stats".into())?;
            Ok(Some(ProblemStats::from_problems(
                &state.problems,
                Local::now().date_naive(),
            )))
        }

        async fn search(&self, query: &str) -> ApiResult<Vec<Problem>> {
            let needle = query.to_lowercase();
            let state = self.enter("search", format!("search {query}"))?;
            Ok(state
                .problems
                .iter()
                .filter(|p| p.title.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        async fn create(&self, request: &CreateProblemRequest) -> ApiResult<Option<CreatedProblem>> {
            let mut state = self.enter("create", format!("create {}", request.problem_number))?;
            let id = state.next_id;
            state.next_id += 1;
            let problem = Problem::new(
                id,
                request.problem_number,
                request.title.clone(),
                request.difficulty,
                request.pattern.clone(),
                Local::now().date_naive(),
            )
            .with_notes(request.notes.clone().unwrap_or_default());
            state.problems.push(problem);
            Ok(Some(CreatedProblem { id }))
        }

        async fn advance(&self, id: ProblemId, step: ReviewStep) -> ApiResult<Option<ApiMessage>> {
            let mut state = self.enter("advance", format!("advance {id} {}", step.path_segment()))?;
            let today = Local::now().date_naive();
            if let Some(problem) = state.problems.iter_mut().find(|p| p.id == id) {
                if let Ok(updated) = apply_advance(problem, today) {
                    *problem = updated;
                }
            }
            Self::message("Problem updated")
        }

        async fn reset_timer(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>> {
            let mut state = self.enter("reset_timer", format!("reset {id}"))?;
            if let Some(problem) = state.problems.iter_mut().find(|p| p.id == id) {
                problem.status = problem.status.reset();
            }
            Self::message("Review timer reset")
        }

        async fn update_notes(&self, id: ProblemId, notes: &str) -> ApiResult<Option<ApiMessage>> {
            let mut state = self.enter("update_notes", format!("notes {id}"))?;
            if let Some(problem) = state.problems.iter_mut().find(|p| p.id == id) {
                problem.notes = notes.to_string();
            }
            Self::message("Notes updated")
        }

        async fn delete(&self, id: ProblemId) -> ApiResult<Option<ApiMessage>> {
            let mut state = self.enter("delete", format!("delete {id}"))?;
            state.problems.retain(|p| p.id != id);
            Ok(None)
        }
    }
}
