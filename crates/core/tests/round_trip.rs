use assert_json_diff::assert_json_eq;
use rstest::rstest;
use serde_json::Value;
use stac_entity::{Entity, ToJson};
use std::{fs::File, io::BufReader, path::PathBuf};

fn read(path: &PathBuf) -> Value {
    let file = File::open(path).unwrap();
    serde_json::from_reader(BufReader::new(file)).unwrap()
}

#[rstest]
fn round_trip(#[files("data/*.json")] path: PathBuf) {
    let value = read(&path);
    let entity = Entity::from_value(value.clone()).unwrap();
    assert_json_eq!(entity.to_json_value().unwrap(), value);
}

#[rstest]
fn round_trip_through_serde(#[files("data/*.json")] path: PathBuf) {
    let value = read(&path);
    let entity: Entity = serde_json::from_value(value.clone()).unwrap();
    let value_again: Value = entity.try_into().unwrap();
    assert_json_eq!(value_again, value);
}
