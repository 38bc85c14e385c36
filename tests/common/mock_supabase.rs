// SPDX-License-Identifier: MIT

//! Minimal in-memory stand-in for the Supabase REST API.
//!
//! Implements just enough of PostgREST for the `SupabaseDb` client:
//! filtered selects, inserts, merge patches, and upserts on the
//! `connections` and `workouts` tables.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
pub struct MockStore {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    connections: HashMap<String, Value>,
    workouts: HashMap<(String, i64), Value>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_connection(&self, connection: Value) {
        let user_id = connection["user_id"].as_str().expect("user_id").to_string();
        self.inner.lock().unwrap().connections.insert(user_id, connection);
    }

    pub fn connection(&self, user_id: &str) -> Option<Value> {
        self.inner.lock().unwrap().connections.get(user_id).cloned()
    }

    pub fn workout(&self, user_id: &str, provider_id: i64) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .workouts
            .get(&(user_id.to_string(), provider_id))
            .cloned()
    }

    pub fn workout_count(&self) -> usize {
        self.inner.lock().unwrap().workouts.len()
    }

    /// Build the mock REST router backed by this store.
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/rest/v1/connections",
                get(get_connections).post(post_connection).patch(patch_connection),
            )
            .route(
                "/rest/v1/workouts",
                get(get_workouts).post(post_workout).patch(patch_workout),
            )
            .with_state(self.clone())
    }
}

fn filter_value<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.strip_prefix("eq."))
}

async fn get_connections(
    State(store): State<MockStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let user_id = filter_value(&params, "user_id").unwrap_or_default();
    let rows = store
        .inner
        .lock()
        .unwrap()
        .connections
        .get(user_id)
        .cloned()
        .into_iter()
        .collect();
    Json(rows)
}

async fn post_connection(State(store): State<MockStore>, Json(body): Json<Value>) -> StatusCode {
    let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
    store.inner.lock().unwrap().connections.insert(user_id, body);
    StatusCode::CREATED
}

async fn patch_connection(
    State(store): State<MockStore>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> StatusCode {
    let user_id = filter_value(&params, "user_id").unwrap_or_default();
    let mut tables = store.inner.lock().unwrap();
    if let Some(row) = tables.connections.get_mut(user_id) {
        if let (Some(row_map), Some(patch)) = (row.as_object_mut(), body.as_object()) {
            for (key, value) in patch {
                row_map.insert(key.clone(), value.clone());
            }
        }
    }
    StatusCode::NO_CONTENT
}

async fn get_workouts(
    State(store): State<MockStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let user_id = filter_value(&params, "user_id").unwrap_or_default();
    let provider_id: Option<i64> =
        filter_value(&params, "provider_id").and_then(|v| v.parse().ok());

    let tables = store.inner.lock().unwrap();
    let rows = tables
        .workouts
        .iter()
        .filter(|((uid, pid), _)| uid == user_id && provider_id.map_or(true, |p| p == *pid))
        .map(|(_, row)| row.clone())
        .collect();
    Json(rows)
}

async fn post_workout(State(store): State<MockStore>, Json(body): Json<Value>) -> StatusCode {
    let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
    let provider_id = body["provider_id"].as_i64().unwrap_or_default();
    store
        .inner
        .lock()
        .unwrap()
        .workouts
        .insert((user_id, provider_id), body);
    StatusCode::CREATED
}

async fn patch_workout(
    State(store): State<MockStore>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> StatusCode {
    let user_id = filter_value(&params, "user_id").unwrap_or_default().to_string();
    let provider_id: i64 = filter_value(&params, "provider_id")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    store
        .inner
        .lock()
        .unwrap()
        .workouts
        .insert((user_id, provider_id), body);
    StatusCode::NO_CONTENT
}
