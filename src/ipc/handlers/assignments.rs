use super::crud;
use crate::ipc::error::respond;
use crate::ipc::types::{AppState, Request};

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let store = &state.hub.assignments;
    let outcome = match req.method.as_str() {
        "assignments.list" => crud::list(store).await,
        "assignments.get" => crud::get(store, &req.params).await,
        "assignments.create" => crud::create(store, &req.params).await,
        "assignments.update" => crud::update(store, &req.params).await,
        "assignments.delete" => crud::delete(store, &req.params).await,
        _ => return None,
    };
    Some(respond(&req.id, outcome))
}
