// Shared fixtures for unit tests.

use crate::core::ports::Record;
use chrono::NaiveDate;
use serde_json::json;
use std::ops::RangeInclusive;

pub fn record(id: i64) -> Record {
    let value = json!({
        "id": id,
        "slug": format!("item-{id}"),
        "name": format!("Item {id}"),
        "updated": "2024-03-08T21:14:03",
    });
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("json! object literal"),
    }
}

pub fn records(ids: RangeInclusive<i64>) -> Vec<Record> {
    ids.map(record).collect()
}

pub fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
