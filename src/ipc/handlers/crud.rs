use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::ipc::error::HandlerErr;
use crate::ipc::params::{parse, IdParams, UpdateParams};
use crate::model::Entity;
use crate::store::DataStore;

pub fn to_json<T: Serialize>(v: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(v).map_err(|e| HandlerErr {
        code: "serialize_failed",
        message: e.to_string(),
        details: None,
    })
}

/// `{ key: value }`, for keys that come from `Entity` constants.
pub fn keyed<T: Serialize>(key: &str, v: &T) -> Result<serde_json::Value, HandlerErr> {
    let mut obj = serde_json::Map::new();
    obj.insert(key.to_string(), to_json(v)?);
    Ok(serde_json::Value::Object(obj))
}

pub async fn list<T>(store: &DataStore<T>) -> Result<serde_json::Value, HandlerErr>
where
    T: Entity + Serialize,
{
    let records = store.get_all().await?;
    keyed(T::COLLECTION, &records)
}

pub async fn get<T>(
    store: &DataStore<T>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr>
where
    T: Entity + Serialize,
{
    let p: IdParams = parse(params)?;
    let rec = store.get_by_id(p.id).await?;
    keyed(T::KEY, &rec)
}

/// The params object is the new record's fields; an `Id` in it is ignored.
pub async fn create<T>(
    store: &DataStore<T>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let data: T = parse(params)?;
    let rec = store.create(data).await?;
    keyed(T::KEY, &rec)
}

pub async fn update<T>(
    store: &DataStore<T>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr>
where
    T: Entity + Serialize,
    T::Patch: DeserializeOwned,
{
    let p: UpdateParams<T::Patch> = parse(params)?;
    let rec = store.update(p.id, p.patch).await?;
    keyed(T::KEY, &rec)
}

pub async fn delete<T>(
    store: &DataStore<T>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr>
where
    T: Entity,
{
    let p: IdParams = parse(params)?;
    store.delete(p.id).await?;
    Ok(json!({ "deleted": true, "id": p.id }))
}
