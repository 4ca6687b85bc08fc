use serde::Serialize;
use serde_json::json;

use super::crud;
use crate::calc;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse, IdParams};
use crate::ipc::types::{AppState, Request};
use crate::model::{Class, Record};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassRow {
    #[serde(flatten)]
    record: Record<Class>,
    /// Enrolled ids that resolve to a student; dangling ids are not counted.
    enrolled_count: usize,
}

async fn classes_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let data = state
        .hub
        .load_classes()
        .await
        .map_err(HandlerErr::load_failed)?;
    let rows: Vec<ClassRow> = data
        .classes
        .into_iter()
        .map(|record| ClassRow {
            enrolled_count: calc::enrolled_students(&record.data, &data.students).len(),
            record,
        })
        .collect();
    Ok(json!({ "classes": crud::to_json(&rows)? }))
}

async fn classes_roster(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let p: IdParams = parse(params)?;
    let hub = &state.hub;
    let (class, students) = tokio::try_join!(hub.classes.get_by_id(p.id), hub.students.get_all())?;
    let enrolled = calc::enrolled_students(&class.data, &students);
    Ok(json!({
        "class": crud::to_json(&class)?,
        "students": crud::to_json(&enrolled)?,
    }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let store = &state.hub.classes;
    let outcome = match req.method.as_str() {
        "classes.list" => classes_list(state).await,
        "classes.get" => crud::get(store, &req.params).await,
        "classes.create" => crud::create(store, &req.params).await,
        "classes.update" => crud::update(store, &req.params).await,
        "classes.delete" => crud::delete(store, &req.params).await,
        "classes.roster" => classes_roster(state, &req.params).await,
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
