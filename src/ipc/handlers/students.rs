use serde::{Deserialize, Serialize};
use serde_json::json;

use super::crud;
use crate::calc::{self, SortDirection, SortField, Tone};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::parse;
use crate::ipc::types::{AppState, Request};
use crate::model::{Record, Student};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    #[serde(default)]
    term: String,
    #[serde(default)]
    sort_field: SortField,
    #[serde(default)]
    sort_direction: SortDirection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentRow {
    #[serde(flatten)]
    record: Record<Student>,
    status_tone: Tone,
}

async fn students_search(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: SearchParams = parse(params)?;
    let all = state
        .hub
        .students
        .get_all()
        .await
        .map_err(HandlerErr::load_failed)?;

    let mut hits = calc::search_students(&all, &p.term);
    calc::sort_students(&mut hits, p.sort_field, p.sort_direction);
    let total = hits.len();
    let rows: Vec<StudentRow> = hits
        .into_iter()
        .map(|record| StudentRow {
            status_tone: calc::student_status_tone(record.data.status),
            record,
        })
        .collect();

    Ok(json!({
        "students": crud::to_json(&rows)?,
        "total": total,
        "term": p.term,
    }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let store = &state.hub.students;
    let outcome = match req.method.as_str() {
        "students.list" => crud::list(store).await,
        "students.get" => crud::get(store, &req.params).await,
        "students.create" => crud::create(store, &req.params).await,
        "students.update" => crud::update(store, &req.params).await,
        "students.delete" => crud::delete(store, &req.params).await,
        "students.search" => students_search(state, &req.params).await,
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
