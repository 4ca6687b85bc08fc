use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::crud;
use crate::calc;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse, today};
use crate::ipc::types::{AppState, Request};

#[derive(Debug, Deserialize)]
struct OpenParams {
    today: Option<NaiveDate>,
}

async fn dashboard_open(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: OpenParams = parse(params)?;
    let day = p.today.unwrap_or_else(today);
    let data = state.hub.load_dashboard().await.map_err(|e| {
        warn!(error = %e, "dashboard load failed");
        HandlerErr::load_failed(e)
    })?;

    let stats = calc::dashboard_stats(&data.students, &data.classes, &data.grades, &data.attendance);
    let activity = calc::recent_activity(&data.students, &data.grades, &data.attendance, day);
    Ok(json!({
        "today": day.to_string(),
        "stats": crud::to_json(&stats)?,
        "activity": crud::to_json(&activity)?,
    }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.open" => Some(respond(&req.id, dashboard_open(state, &req.params).await)),
        _ => None,
    }
}
