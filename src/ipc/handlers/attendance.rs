use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::crud;
use crate::calc;
use crate::hub::DEFAULT_CLASS_ID;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse, today};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceStatus, RecordId};

fn default_class_id() -> RecordId {
    DEFAULT_CLASS_ID
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkParams {
    student_id: RecordId,
    date: NaiveDate,
    status: AttendanceStatus,
    #[serde(default = "default_class_id")]
    class_id: RecordId,
}

#[derive(Debug, Deserialize)]
struct DayParams {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateParams {
    student_id: RecordId,
}

async fn attendance_mark(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: MarkParams = parse(params)?;
    let record = state
        .hub
        .mark_attendance(p.student_id, p.date, p.status, p.class_id)
        .await?;
    Ok(json!({ "record": crud::to_json(&record)? }))
}

async fn attendance_day(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: DayParams = parse(params)?;
    let date = p.date.unwrap_or_else(today);
    let data = state
        .hub
        .load_attendance()
        .await
        .map_err(HandlerErr::load_failed)?;
    let rows = calc::attendance_day(&data.students, &data.attendance, date);
    Ok(json!({
        "date": date.to_string(),
        "rows": crud::to_json(&rows)?,
    }))
}

async fn attendance_rate(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: RateParams = parse(params)?;
    let records = state
        .hub
        .attendance
        .get_all()
        .await
        .map_err(HandlerErr::load_failed)?;
    Ok(json!({
        "studentId": p.student_id,
        "rate": calc::attendance_rate(&records, p.student_id),
    }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let store = &state.hub.attendance;
    let outcome = match req.method.as_str() {
        "attendance.list" => crud::list(store).await,
        "attendance.get" => crud::get(store, &req.params).await,
        "attendance.create" => crud::create(store, &req.params).await,
        "attendance.update" => crud::update(store, &req.params).await,
        "attendance.delete" => crud::delete(store, &req.params).await,
        "attendance.mark" => attendance_mark(state, &req.params).await,
        "attendance.day" => attendance_day(state, &req.params).await,
        "attendance.rate" => attendance_rate(state, &req.params).await,
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
