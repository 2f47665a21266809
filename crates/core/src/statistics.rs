//! Value ranges and no-data values of assets and bands.

use crate::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The minimum and maximum values of an asset or band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// The minimum value, if known.
    pub minimum: Option<f64>,

    /// The maximum value, if known.
    pub maximum: Option<f64>,
}

/// A no-data value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoData {
    /// A number, including `NaN` and the infinities.
    Number(f64),

    /// Anything else, passed through as given.
    Value(Value),
}

impl From<Value> for NoData {
    fn from(value: Value) -> NoData {
        match value.as_str() {
            Some("nan") => NoData::Number(f64::NAN),
            Some("+inf") => NoData::Number(f64::INFINITY),
            Some("-inf") => NoData::Number(f64::NEG_INFINITY),
            _ => match value.as_f64() {
                Some(n) => NoData::Number(n),
                None => NoData::Value(value),
            },
        }
    }
}

impl Statistics {
    fn new(minimum: f64, maximum: f64) -> Statistics {
        Statistics {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    fn fold(values: impl IntoIterator<Item = f64>) -> Option<Statistics> {
        values.into_iter().fold(None, |statistics, n| match statistics {
            None => Some(Statistics::new(n, n)),
            Some(Statistics {
                minimum: Some(minimum),
                maximum: Some(maximum),
            }) => Some(Statistics::new(minimum.min(n), maximum.max(n))),
            Some(statistics) => Some(statistics),
        })
    }

    fn for_data_type(data_type: &str) -> Statistics {
        let (minimum, maximum) = match data_type {
            "int8" => (Some(-128.0), Some(127.0)),
            "uint8" => (Some(0.0), Some(255.0)),
            "int16" => (Some(-32768.0), Some(32767.0)),
            "uint16" => (Some(0.0), Some(65535.0)),
            "int32" => (Some(-2147483648.0), Some(2147483647.0)),
            "uint32" => (Some(0.0), Some(4294967295.0)),
            other if other.starts_with('u') => (Some(0.0), None),
            _ => (None, None),
        };
        Statistics { minimum, maximum }
    }
}

/// Resolves the minimum and maximum values from a metadata source.
///
/// Looks at `statistics`, `histogram`, `classification:classes`,
/// `file:values` and finally the data type, stopping at the first one that
/// provides both bounds.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::{Band, statistics::min_max_values};
///
/// let band = Band::from_value(json!({"data_type": "uint8"}), 0).unwrap();
/// let statistics = min_max_values(&band);
/// assert_eq!(statistics.minimum, Some(0.));
/// assert_eq!(statistics.maximum, Some(255.));
/// ```
pub fn min_max_values(source: &(impl Metadata + ?Sized)) -> Statistics {
    let bounds = |field: &str, min: &str, max: &str| {
        let value = source.metadata(field)?;
        let minimum = value.get(min)?.as_f64()?;
        let maximum = value.get(max)?.as_f64()?;
        Some(Statistics::new(minimum, maximum))
    };
    if let Some(statistics) = bounds("statistics", "minimum", "maximum") {
        return statistics;
    }
    if let Some(statistics) = bounds("histogram", "min", "max") {
        return statistics;
    }
    if let Some(classes) = source.metadata("classification:classes") {
        let values = classes
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|class| class.get("value")?.as_f64());
        if let Some(statistics) = Statistics::fold(values) {
            return statistics;
        }
    }
    if let Some(file_values) = source.metadata("file:values") {
        let values = file_values
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|mapping| mapping.get("values")?.as_array())
            .flatten()
            .filter_map(Value::as_f64);
        if let Some(statistics) = Statistics::fold(values) {
            return statistics;
        }
    }
    let data_type = source
        .metadata("data_type")
        .and_then(|value| value.as_str().map(str::to_string))
        .or_else(|| {
            source
                .metadata("file:data_type")
                .and_then(|value| value.as_str().map(str::to_string))
        });
    data_type
        .map(|data_type| Statistics::for_data_type(&data_type))
        .unwrap_or_default()
}

/// Resolves the no-data values from a metadata source.
///
/// Prefers `nodata`, then `file:nodata`, then the values of classes flagged
/// as no-data in `classification:classes`. The strings `"nan"`, `"+inf"`
/// and `"-inf"` become their floating point counterparts.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::{Band, statistics::{NoData, no_data_values}};
///
/// let band = Band::from_value(json!({"nodata": "nan"}), 0).unwrap();
/// let values = no_data_values(&band);
/// assert!(matches!(values[..], [NoData::Number(n)] if n.is_nan()));
/// ```
pub fn no_data_values(source: &(impl Metadata + ?Sized)) -> Vec<NoData> {
    let values: Vec<Value> = if let Some(nodata) = source.metadata("nodata") {
        vec![nodata.into_owned()]
    } else if let Some(nodata) = source.metadata("file:nodata") {
        match nodata.into_owned() {
            Value::Array(values) => values,
            value => vec![value],
        }
    } else if let Some(classes) = source.metadata("classification:classes") {
        classes
            .as_array()
            .into_iter()
            .flatten()
            .filter(|class| class.get("nodata").and_then(Value::as_bool) == Some(true))
            .filter_map(|class| class.get("value").cloned())
            .collect()
    } else {
        Vec::new()
    };
    values.into_iter().map(NoData::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use std::borrow::Cow;

    struct Fields(Map<String, Value>);

    impl Metadata for Fields {
        fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
            self.0.get(field).map(Cow::Borrowed)
        }
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => Fields(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn statistics_first() {
        let source = fields(json!({
            "statistics": {"minimum": -5, "maximum": 5, "mean": 0},
            "data_type": "uint8"
        }));
        assert_eq!(min_max_values(&source), Statistics::new(-5.0, 5.0));
    }

    #[test]
    fn incomplete_statistics_fall_through() {
        let source = fields(json!({
            "statistics": {"minimum": -5},
            "histogram": {"min": 1, "max": 3}
        }));
        assert_eq!(min_max_values(&source), Statistics::new(1.0, 3.0));
    }

    #[test]
    fn classes() {
        let source = fields(json!({
            "classification:classes": [{"value": -1}, {"value": 0}, {"value": 1}, {"value": 2}]
        }));
        assert_eq!(min_max_values(&source), Statistics::new(-1.0, 2.0));
    }

    #[test]
    fn file_values() {
        let source = fields(json!({
            "file:values": [{"values": [1, 2]}, {"values": [0]}, {"values": [-1]}]
        }));
        assert_eq!(min_max_values(&source), Statistics::new(-1.0, 2.0));
    }

    #[test]
    fn data_types() {
        let source = fields(json!({"file:data_type": "int16"}));
        assert_eq!(min_max_values(&source), Statistics::new(-32768.0, 32767.0));
        let source = fields(json!({"data_type": "uint64"}));
        assert_eq!(
            min_max_values(&source),
            Statistics {
                minimum: Some(0.0),
                maximum: None
            }
        );
        let source = fields(json!({"data_type": "float32"}));
        assert_eq!(min_max_values(&source), Statistics::default());
    }

    #[test]
    fn empty() {
        assert_eq!(min_max_values(&fields(json!({}))), Statistics::default());
    }

    #[test]
    fn no_data() {
        assert!(no_data_values(&fields(json!({}))).is_empty());
        assert_eq!(
            no_data_values(&fields(json!({"nodata": 0}))),
            vec![NoData::Number(0.0)]
        );
        assert_eq!(
            no_data_values(&fields(json!({"nodata": "-inf"}))),
            vec![NoData::Number(f64::NEG_INFINITY)]
        );
        assert_eq!(
            no_data_values(&fields(json!({"file:nodata": [-1, -3]}))),
            vec![NoData::Number(-1.0), NoData::Number(-3.0)]
        );
        assert_eq!(
            no_data_values(&fields(json!({
                "classification:classes": [{"value": 0}, {"value": 1, "nodata": true}]
            }))),
            vec![NoData::Number(1.0)]
        );
        assert_eq!(
            no_data_values(&fields(json!({"nodata": "none"}))),
            vec![NoData::Value(json!("none"))]
        );
    }
}
