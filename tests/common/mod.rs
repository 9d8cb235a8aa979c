//! Shared fixtures: a scripted transport and signed-in app states
#![allow(dead_code)]

use async_trait::async_trait;
use mentorhub::core::auth::{unsigned_token, Session};
use mentorhub::core::http::{ApiRequest, Method, Transport};
use mentorhub::core::{ApiError, AppState};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const BASE: &str = "http://api.test/api/v1";

/// One scripted answer
#[derive(Debug, Clone)]
pub struct Reply {
    result: Result<Value, ApiError>,
    delay: Option<Duration>,
}

impl Reply {
    /// Successful envelope around `data`
    pub fn ok(data: Value) -> Self {
        Self::raw(json!({"code": "SUCCESS", "message": "ok", "data": data}))
    }

    /// 2xx body exactly as given
    pub fn raw(body: Value) -> Self {
        Self {
            result: Ok(body),
            delay: None,
        }
    }

    /// 2xx envelope carrying a business error
    pub fn business(code: &str, message: &str) -> Self {
        Self::raw(json!({"code": code, "message": message, "data": null}))
    }

    /// Non-2xx response
    pub fn status(status: u16, code: Option<&str>, message: &str) -> Self {
        Self {
            result: Err(ApiError::Http {
                status,
                code: code.map(str::to_string),
                message: message.to_string(),
            }),
            delay: None,
        }
    }

    /// Connection failure
    pub fn offline() -> Self {
        Self {
            result: Err(ApiError::Network("connection refused".to_string())),
            delay: None,
        }
    }

    /// Answer only after `ms` milliseconds
    pub fn after_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }
}

/// Transport answering from per-route queues; the last reply of a queue repeats
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

fn route_key(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for `method path`
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .entry(route_key(method, path))
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request sent so far
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Requests sent to `method path`
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let key = route_key(request.method, &request.path);
        self.calls.lock().push(request);
        let Some(reply) = self.next_reply(&key) else {
            return Err(ApiError::Http {
                status: 404,
                code: None,
                message: format!("no route for {key}"),
            });
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.result
    }
}

/// Unsigned token for `student_number` with `role`, valid for an hour
pub fn token_for(name: &str, student_number: &str, role: &str) -> String {
    unsigned_token(&json!({
        "sub": format!("{student_number}@example.org"),
        "name": name,
        "studentNumber": student_number,
        "role": role,
        "exp": chrono::Utc::now().timestamp() + 3600,
    }))
}

/// Guest app over a fresh fake transport
pub fn guest_app() -> AppState<FakeTransport> {
    AppState::new(FakeTransport::new(), BASE)
}

/// App signed in as `student_number` with `role`
pub fn app_as(student_number: &str, role: &str) -> AppState<FakeTransport> {
    guest_app().with_session(Session::from_token(&token_for("Tester", student_number, role)))
}

pub fn mentor_app() -> AppState<FakeTransport> {
    app_as("2019001", "MENTOR")
}

pub fn mentee_app() -> AppState<FakeTransport> {
    app_as("20231234", "MENTEE")
}

pub fn plan_json(id: i64, title: &str) -> Value {
    json!({
        "planId": id,
        "title": title,
        "content": "<p>read</p>",
        "hasAssignment": true,
        "startDate": "2024-03-04",
        "endDate": "2024-03-10"
    })
}

pub fn mentee_json(student_number: &str, name: &str) -> Value {
    json!({"userId": 1, "name": name, "email": "", "studentNumber": student_number})
}

pub fn submission_json(id: i64, plan_id: i64, student_number: &str) -> Value {
    json!({
        "submissionId": id,
        "planId": plan_id,
        "name": "Lee",
        "studentNumber": student_number,
        "content": "https://github.com/lee/hw",
        "password": "pw"
    })
}

pub fn activity_json(id: i64, week: u8, marks: &[(&str, &str)]) -> Value {
    let attendances: Vec<Value> = marks
        .iter()
        .map(|(sn, t)| json!({"studentNumber": sn, "name": sn, "attendanceType": t}))
        .collect();
    json!({"activityId": id, "title": format!("week {week}"), "content": "met up", "week": week, "attendances": attendances})
}
