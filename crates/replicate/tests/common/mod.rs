//! Scripted in-memory prediction provider shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use plates_replicate::prediction::CreatePrediction;
use plates_replicate::provider::{PredictionProvider, ProviderError};
use serde_json::json;
use tokio::time::Instant;

/// Replays a fixed script of responses and records every call.
///
/// Once the status script is exhausted every further query reports
/// `processing`.
pub struct ScriptedProvider {
    create_response: Mutex<Option<Result<serde_json::Value, ProviderError>>>,
    statuses: Mutex<VecDeque<Result<serde_json::Value, ProviderError>>>,
    pub creates: Mutex<Vec<CreatePrediction>>,
    pub queries: Mutex<Vec<(String, Instant)>>,
    pub cancels: Mutex<Vec<String>>,
    query_delay: Option<Duration>,
    hang_on_cancel: bool,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            create_response: Mutex::new(Some(Ok(json!({"id": "pred-1", "status": "starting"})))),
            statuses: Mutex::new(VecDeque::new()),
            creates: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
            query_delay: None,
            hang_on_cancel: false,
        }
    }

    pub fn with_create(self, response: Result<serde_json::Value, ProviderError>) -> Self {
        *self.create_response.lock().unwrap() = Some(response);
        self
    }

    pub fn with_statuses(self, script: Vec<Result<serde_json::Value, ProviderError>>) -> Self {
        *self.statuses.lock().unwrap() = script.into();
        self
    }

    /// Every status query takes `delay` to answer.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    /// Remote cancels are recorded but never answered.
    pub fn hanging_on_cancel(mut self) -> Self {
        self.hang_on_cancel = true;
        self
    }

    pub fn create_count(&self) -> usize {
        self.creates.lock().unwrap().len()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.queries.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionProvider for ScriptedProvider {
    async fn create_prediction(
        &self,
        body: &CreatePrediction,
    ) -> Result<serde_json::Value, ProviderError> {
        self.creates.lock().unwrap().push(body.clone());
        self.create_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(json!({"id": "pred-n", "status": "starting"})))
    }

    async fn get_prediction(&self, id: &str) -> Result<serde_json::Value, ProviderError> {
        self.queries
            .lock()
            .unwrap()
            .push((id.to_string(), Instant::now()));
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "processing"})))
    }

    async fn cancel_prediction(&self, id: &str) -> Result<(), ProviderError> {
        self.cancels.lock().unwrap().push(id.to_string());
        if self.hang_on_cancel {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

pub fn status(s: &str) -> Result<serde_json::Value, ProviderError> {
    Ok(json!({"status": s}))
}

pub fn succeeded(urls: &[&str]) -> Result<serde_json::Value, ProviderError> {
    Ok(json!({"status": "succeeded", "output": urls}))
}

pub fn transport_failure() -> Result<serde_json::Value, ProviderError> {
    Err(ProviderError::ApiError {
        status: 502,
        body: "bad gateway".into(),
    })
}
