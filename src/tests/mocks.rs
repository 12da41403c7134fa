//! Mock backends for testing

use crate::client::{ChatBackend, SensorBackend};
use crate::error::{FridgeError, Result};
use fridge_protocol::{ChatRequest, ChatResponse, CurrentTemperature, ResponseMessage, TemperatureData, TemperatureResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

fn reply(content: &str) -> ChatResponse {
    ChatResponse {
        message: ResponseMessage {
            content: content.to_string(),
        },
        error: None,
    }
}

/// Chat backend answering from a queue, then with a default reply
#[derive(Debug, Default)]
pub struct MockChatBackend {
    default_reply: Option<String>,
    queued: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatBackend {
    /// Answer every request with `content`
    pub fn replying(content: &str) -> Self {
        Self {
            default_reply: Some(content.to_string()),
            ..Self::default()
        }
    }

    /// Fail the first request with `error`
    pub fn failing(error: FridgeError) -> Self {
        let backend = Self::default();
        backend.fail_next(error);
        backend
    }

    pub fn fail_next(&self, error: FridgeError) {
        self.queued.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatBackend for MockChatBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            return next;
        }

        match &self.default_reply {
            Some(content) => Ok(reply(content)),
            None => Err(FridgeError::internal("MockChatBackend has no reply left")),
        }
    }
}

/// Sensor backend with canned readings
#[derive(Debug, Default)]
pub struct MockSensorBackend {
    current: Option<i64>,
    current_error: Mutex<Option<FridgeError>>,
    history: Vec<TemperatureData>,
}

impl MockSensorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current(mut self, temperature: i64) -> Self {
        self.current = Some(temperature);
        self
    }

    pub fn with_current_error(self, error: FridgeError) -> Self {
        *self.current_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_history(mut self, history: Vec<TemperatureData>) -> Self {
        self.history = history;
        self
    }
}

impl SensorBackend for MockSensorBackend {
    async fn current_temperature(&self) -> Result<TemperatureResponse> {
        if let Some(error) = self.current_error.lock().unwrap().take() {
            return Err(error);
        }

        match self.current {
            Some(temperature) => Ok(TemperatureResponse {
                status: "success".to_string(),
                data: CurrentTemperature { temperature },
            }),
            None => Err(FridgeError::invalid_response(200, "no reading configured")),
        }
    }

    async fn temperature_history(&self) -> Result<Vec<TemperatureData>> {
        Ok(self.history.clone())
    }
}
