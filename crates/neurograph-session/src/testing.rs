//! Scripted [`ModelService`] double for tests.
//!
//! Responses are queued ahead of time and handed out in order. An optional
//! gate holds every call until [`ScriptedService::release`] is called, which
//! lets tests observe the session while a request is outstanding.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use neurograph_core::{ChatResponse, Graph};
use neurograph_llm::{AnalysisRequest, ChatRequest, ModelService, ServiceError, ServiceResult};
use tokio::sync::Semaphore;

/// Model service that replays queued responses.
#[derive(Default)]
pub struct ScriptedService {
    analyses: Mutex<VecDeque<ServiceResult<Graph>>>,
    chats: Mutex<VecDeque<ServiceResult<ChatResponse>>>,
    analysis_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    last_analysis: Mutex<Option<AnalysisRequest>>,
    last_chat: Mutex<Option<ChatRequest>>,
    gate: Option<Arc<Semaphore>>,
    delay: Option<Duration>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call until [`release`](Self::release) is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the result of the next analysis call.
    pub fn push_analysis(&self, result: ServiceResult<Graph>) -> &Self {
        lock(&self.analyses).push_back(result);
        self
    }

    /// Queue the result of the next chat call.
    pub fn push_chat(&self, result: ServiceResult<ChatResponse>) -> &Self {
        lock(&self.chats).push_back(result);
        self
    }

    /// Let one gated call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn analysis_calls(&self) -> usize {
        self.analysis_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn last_analysis(&self) -> Option<AnalysisRequest> {
        lock(&self.last_analysis).clone()
    }

    pub fn last_chat(&self) -> Option<ChatRequest> {
        lock(&self.last_chat).clone()
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unscripted() -> ServiceError {
    ServiceError::Transport("no scripted response".into())
}

#[async_trait]
impl ModelService for ScriptedService {
    async fn analyze(&self, request: &AnalysisRequest) -> ServiceResult<Graph> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_analysis) = Some(request.clone());
        self.wait().await;
        lock(&self.analyses).pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn chat(&self, request: &ChatRequest) -> ServiceResult<ChatResponse> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_chat) = Some(request.clone());
        self.wait().await;
        lock(&self.chats).pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}
