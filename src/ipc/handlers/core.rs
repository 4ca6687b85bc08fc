use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};

async fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    let hub = &state.hub;
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "counts": {
                "students": hub.students.count().await,
                "classes": hub.classes.count().await,
                "assignments": hub.assignments.count().await,
                "grades": hub.grades.count().await,
                "attendance": hub.attendance.count().await,
            }
        }),
    )
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req).await),
        _ => None,
    }
}
