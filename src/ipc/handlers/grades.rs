use serde::Deserialize;
use serde_json::json;

use super::crud;
use crate::calc;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse, today};
use crate::ipc::types::{AppState, Request};
use crate::model::RecordId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordParams {
    student_id: RecordId,
    assignment_id: RecordId,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct LetterParams {
    #[serde(default)]
    score: serde_json::Value,
}

async fn grades_record(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: RecordParams = parse(params)?;
    if !p.score.is_finite() || !(0.0..=100.0).contains(&p.score) {
        return Err(HandlerErr::bad_params("score must be between 0 and 100"));
    }
    let grade = state
        .hub
        .record_grade(p.student_id, p.assignment_id, p.score, today())
        .await?;
    Ok(json!({ "grade": crud::to_json(&grade)? }))
}

async fn grades_gradebook(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let data = state
        .hub
        .load_gradebook()
        .await
        .map_err(HandlerErr::load_failed)?;
    let book = calc::gradebook(&data.students, &data.assignments, &data.grades);
    crud::to_json(&book)
}

fn grades_letter(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let p: LetterParams = parse(params)?;
    let letter = calc::letter_grade_value(&p.score);
    Ok(json!({
        "letter": letter.as_str(),
        "tone": crud::to_json(&letter.tone())?,
    }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let store = &state.hub.grades;
    let outcome = match req.method.as_str() {
        "grades.list" => crud::list(store).await,
        "grades.get" => crud::get(store, &req.params).await,
        "grades.create" => crud::create(store, &req.params).await,
        "grades.update" => crud::update(store, &req.params).await,
        "grades.delete" => crud::delete(store, &req.params).await,
        "grades.record" => grades_record(state, &req.params).await,
        "grades.gradebook" => grades_gradebook(state).await,
        "grades.letter" => grades_letter(&req.params),
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
