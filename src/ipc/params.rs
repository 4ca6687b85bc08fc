use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ipc::error::HandlerErr;
use crate::model::RecordId;

/// Decodes `params` into a typed request body.
pub fn parse<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    // A request without params arrives as null; treat it as an empty object.
    let value = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(value).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub id: RecordId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParams<P> {
    pub id: RecordId,
    pub patch: P,
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
