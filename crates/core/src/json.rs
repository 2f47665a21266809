use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::io::Write;

/// Create a STAC entity from JSON.
pub trait FromJson: DeserializeOwned {
    /// Creates an entity from an already-parsed JSON value.
    ///
    /// Anything that is not a JSON object is rejected before any conversion
    /// happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{FromJson, Item};
    ///
    /// let item = Item::from_json_value(json!({"type": "Feature", "id": "an-id"})).unwrap();
    /// assert_eq!(item.id.as_deref(), Some("an-id"));
    /// assert!(Item::from_json_value(json!([])).is_err());
    /// ```
    fn from_json_value(value: Value) -> Result<Self> {
        if value.is_object() {
            serde_json::from_value(value).map_err(Error::from)
        } else {
            Err(Error::NotAnObject(value))
        }
    }

    /// Creates an entity from JSON bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{FromJson, Item};
    ///
    /// let item = Item::from_json_slice(br#"{"type": "Feature", "id": "an-id"}"#).unwrap();
    /// ```
    fn from_json_slice(slice: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(slice)?;
        Self::from_json_value(value)
    }
}

/// Exports a STAC entity back to plain JSON.
pub trait ToJson: Serialize {
    /// Exports this value as a plain JSON value.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{FromJson, Item, ToJson};
    ///
    /// let value = json!({"type": "Feature", "id": "an-id", "properties": {}});
    /// let item = Item::from_json_value(value.clone()).unwrap();
    /// assert_eq!(item.to_json_value().unwrap(), value);
    /// ```
    fn to_json_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Writes a value as JSON.
    fn to_json_writer(&self, writer: impl Write, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self).map_err(Error::from)
        } else {
            serde_json::to_writer(writer, self).map_err(Error::from)
        }
    }

    /// Writes a value as JSON bytes.
    fn to_json_vec(&self, pretty: bool) -> Result<Vec<u8>> {
        if pretty {
            serde_json::to_vec_pretty(self).map_err(Error::from)
        } else {
            serde_json::to_vec(self).map_err(Error::from)
        }
    }
}

impl<T: DeserializeOwned> FromJson for T {}
impl<T: Serialize> ToJson for T {}

/// Takes a typed field out of a JSON object.
///
/// Nulls, and values that can't be read as `T`, stay in the object so they
/// are written back out unchanged.
pub(crate) fn take<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Option<T> {
    take_with(object, key, |value| T::deserialize(value).ok())
}

/// Takes a field out of a JSON object if `convert` accepts it.
pub(crate) fn take_with<T>(
    object: &mut Map<String, Value>,
    key: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = object.get(key).filter(|value| !value.is_null())?;
    match convert(value) {
        Some(converted) => {
            let _ = object.shift_remove(key);
            Some(converted)
        }
        None => {
            log::debug!("keeping {key} as given: {value}");
            None
        }
    }
}
