use assert_cmd::Command;
use clap::Parser;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use stac_entity_cli::StacEntity;
use tracing::metadata::Level;

#[fixture]
fn command() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("stac-entity")
}

fn stdout_json(command: &mut Command) -> Value {
    let output = command.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[rstest]
fn translate_json(mut command: Command) {
    command
        .arg("translate")
        .arg("../core/data/item.json")
        .assert()
        .success();
}

#[rstest]
fn translate_keeps_unknown_fields(mut command: Command) {
    let value = stdout_json(command.arg("translate").arg("../core/data/api.json"));
    assert_eq!(value["conformsTo"][0], "https://api.stacspec.org/v1.0.0/core");
    assert_eq!(value["links"].as_array().unwrap().len(), 13);
}

#[rstest]
fn translate_to_file(mut command: Command) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("item.json");
    command
        .arg("translate")
        .arg("../core/data/item.json")
        .arg(&path)
        .assert()
        .success();
    let bytes = std::fs::read(path).unwrap();
    assert!(!bytes.contains(&b'\n'));
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["id"], "20201211_223832_CS2");
}

#[rstest]
fn translate_stdin(mut command: Command) {
    let value = stdout_json(
        command
            .arg("translate")
            .write_stdin(r#"{"type": "Feature", "id": "from-stdin", "properties": {}}"#),
    );
    assert_eq!(value, json!({"type": "Feature", "id": "from-stdin", "properties": {}}));
}

#[rstest]
fn not_an_object(mut command: Command) {
    command
        .arg("translate")
        .arg("-")
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure();
}

#[rstest]
fn missing_file(mut command: Command) {
    command
        .arg("summary")
        .arg("../core/data/does-not-exist.json")
        .assert()
        .failure();
}

#[rstest]
fn summary(mut command: Command) {
    let value = stdout_json(command.arg("summary").arg("../core/data/item-s2.json"));
    assert_eq!(value["type"], "Item");
    assert_eq!(value["id"], "S2B_OPER_MSI_L2A_TL_2BPS_20221206T000000");
    assert_eq!(value["bbox"], json!([171.0, -17.2, 172.0, -16.2]));
    assert_eq!(
        value["temporal_extent"],
        json!(["2022-12-06T00:00:00Z", "2022-12-06T00:00:10Z"])
    );
    assert_eq!(
        value["thumbnails"][0],
        "https://stac.test/collections/sentinel-2-l2a/items/thumbnail.png"
    );
    assert_eq!(value["default_geotiff"], "visual");
}

#[rstest]
fn summary_with_url(mut command: Command) {
    let value = stdout_json(
        command
            .arg("summary")
            .arg("../core/data/item-s2.json")
            .arg("--url")
            .arg("https://example.com/items/s2.json"),
    );
    assert_eq!(value["absolute_url"], "https://example.com/items/s2.json");
    assert_eq!(value["thumbnails"][0], "https://example.com/items/thumbnail.png");
}

#[rstest]
fn summary_catalog(mut command: Command) {
    let value = stdout_json(command.arg("summary").arg("../core/data/catalog.json"));
    assert_eq!(value["type"], "Catalog");
    assert_eq!(value["bbox"], Value::Null);
    assert_eq!(value["temporal_extent"], Value::Null);
    assert_eq!(value["default_geotiff"], Value::Null);
}

#[rstest]
fn geojson(mut command: Command) {
    let value = stdout_json(command.arg("geojson").arg("../core/data/collection.json"));
    assert_eq!(value["type"], "Feature");
    assert_eq!(value["id"], "simple-collection");
}

#[rstest]
fn geojson_catalog(mut command: Command) {
    let value = stdout_json(command.arg("geojson").arg("../core/data/catalog.json"));
    assert_eq!(value, Value::Null);
}

#[rstest]
fn rank(mut command: Command) {
    let value = stdout_json(command.arg("rank").arg("../core/data/item-s2.json"));
    let keys: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|score| score["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["visual", "overview", "B02", "B03", "B04"]);
    assert_eq!(value[0]["score"], 5.);
}

#[rstest]
fn rank_options(mut command: Command) {
    let value = stdout_json(
        command
            .arg("rank")
            .arg("../core/data/item-s2.json")
            .arg("--cog-only")
            .arg("--allow-non-http"),
    );
    let keys: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|score| score["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["visual", "B02", "B03", "B04", "SCL"]);
}

#[test]
fn log_level() {
    let args = StacEntity::parse_from(["stac-entity", "summary"]);
    assert_eq!(args.log_level(), Some(Level::ERROR));

    let args = StacEntity::parse_from(["stac-entity", "-vv", "summary"]);
    assert_eq!(args.log_level(), Some(Level::INFO));

    let args = StacEntity::parse_from(["stac-entity", "summary", "-vvvvvv"]);
    assert_eq!(args.log_level(), Some(Level::TRACE));

    let args = StacEntity::parse_from(["stac-entity", "-q", "summary"]);
    assert_eq!(args.log_level(), None);
}

#[test]
fn verbose_conflicts_with_quiet() {
    assert!(StacEntity::try_parse_from(["stac-entity", "-v", "-q", "summary"]).is_err());
}
