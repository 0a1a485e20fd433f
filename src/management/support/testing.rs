//! Recording transport used by the resource tests

use std::collections::VecDeque;
use std::sync::Mutex;

use reqwest::StatusCode;
use serde_json::Value;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::Result;
use crate::types::Broker;

pub fn fake_broker() -> Broker {
    Broker::new("fake-broker", "guest", "guest")
}

/// Replays queued responses in order and remembers every request sent
///
/// Once the queue is drained every request is answered with `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests:  Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        let response = ApiResponse::new(StatusCode::from_u16(status).unwrap(), body.to_string());
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn respond_with_reason(self, status: u16, reason: &str) -> Self {
        let mut response = ApiResponse::new(StatusCode::from_u16(status).unwrap(), "");
        response.reason = Some(reason.to_string());
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| ApiResponse::new(StatusCode::OK, "{}")))
    }
}
