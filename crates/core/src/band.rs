use crate::{
    Asset, Bound, Context, Error, Metadata, Result, Type,
    json::take,
    statistics::{self, NoData, Statistics},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Metadata describing one spectral or data band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Band {
    /// The name of the band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Additional fields on the band.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    index: usize,
}

/// The red, green and blue parts of something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb<T> {
    /// Red.
    pub red: T,

    /// Green.
    pub green: T,

    /// Blue.
    pub blue: T,
}

/// A borrowed band together with whatever contains it.
#[derive(Debug, Clone, Copy)]
pub struct BandRef<'a> {
    band: &'a Band,
    owner: Option<Owner<'a>>,
}

#[derive(Debug, Clone, Copy)]
enum Owner<'a> {
    Asset(Bound<'a, Asset>),
    Entity(Context<'a>),
}

impl Band {
    /// Creates a band from a JSON object and its position in the band list.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::Band;
    ///
    /// let band = Band::from_value(json!({"name": "b1"}), 2).unwrap();
    /// assert_eq!(band.name.as_deref(), Some("b1"));
    /// assert_eq!(band.index(), 2);
    /// assert!(Band::from_value(json!("b1"), 0).is_err());
    /// ```
    pub fn from_value(value: Value, index: usize) -> Result<Band> {
        match value {
            Value::Object(object) => {
                let mut band = Band::from(object);
                band.index = index;
                Ok(band)
            }
            value => Err(Error::NotAnObject(value)),
        }
    }

    /// Returns the position of this band in its band list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns [Type::Band].
    pub fn entity_type(&self) -> Type {
        Type::Band
    }

    /// Returns the common name of this band.
    ///
    /// Looks at `eo:common_name` first, then `common_name`.
    pub fn common_name(&self) -> Option<&str> {
        self.additional_fields
            .get("eo:common_name")
            .or_else(|| self.additional_fields.get("common_name"))
            .and_then(Value::as_str)
    }

    /// Returns the minimum and maximum values, only looking at this band's
    /// own fields.
    ///
    /// Use [BandRef::min_max_values] to include inherited metadata.
    pub fn min_max_values(&self) -> Statistics {
        statistics::min_max_values(self)
    }

    /// Returns the no-data values, only looking at this band's own fields.
    pub fn no_data_values(&self) -> Vec<NoData> {
        statistics::no_data_values(self)
    }

    pub(crate) fn property(&self, property: &str) -> Option<&str> {
        match property {
            "name" => self.name.as_deref(),
            "common_name" => self.common_name(),
            other => self.additional_fields.get(other).and_then(Value::as_str),
        }
    }
}

impl From<Map<String, Value>> for Band {
    fn from(mut object: Map<String, Value>) -> Band {
        Band {
            name: take(&mut object, "name"),
            additional_fields: object,
            index: 0,
        }
    }
}

impl Metadata for Band {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        match field {
            "name" => self
                .name
                .as_ref()
                .map(|name| Cow::Owned(Value::String(name.clone())))
                .or_else(|| self.additional_fields.get(field).map(Cow::Borrowed)),
            _ => self.additional_fields.get(field).map(Cow::Borrowed),
        }
    }
}

impl<'a> BandRef<'a> {
    /// Creates a band view without anything containing it.
    pub fn standalone(band: &'a Band) -> BandRef<'a> {
        BandRef { band, owner: None }
    }

    pub(crate) fn for_asset(band: &'a Band, asset: Bound<'a, Asset>) -> BandRef<'a> {
        BandRef {
            band,
            owner: Some(Owner::Asset(asset)),
        }
    }

    pub(crate) fn for_entity(band: &'a Band, context: Context<'a>) -> BandRef<'a> {
        BandRef {
            band,
            owner: Some(Owner::Entity(context)),
        }
    }

    /// Returns the band.
    pub fn band(&self) -> &'a Band {
        self.band
    }

    /// Returns the asset containing this band, if it belongs to an asset.
    pub fn asset(&self) -> Option<Bound<'a, Asset>> {
        match self.owner {
            Some(Owner::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    /// Returns the minimum and maximum values, including inherited metadata.
    pub fn min_max_values(&self) -> Statistics {
        statistics::min_max_values(self)
    }

    /// Returns the no-data values, including inherited metadata.
    pub fn no_data_values(&self) -> Vec<NoData> {
        statistics::no_data_values(self)
    }
}

impl std::ops::Deref for BandRef<'_> {
    type Target = Band;

    fn deref(&self) -> &Band {
        self.band
    }
}

impl Metadata for BandRef<'_> {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        self.band.metadata(field).or_else(|| match &self.owner {
            Some(Owner::Asset(asset)) => asset.metadata(field),
            Some(Owner::Entity(context)) => context.metadata(field),
            None => None,
        })
    }
}

impl<T> Rgb<T> {
    /// Applies a function to all three parts.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Rgb<U> {
        Rgb {
            red: f(self.red),
            green: f(self.green),
            blue: f(self.blue),
        }
    }
}

/// Finds the red, green and blue bands by their common names.
///
/// All three must be present. If a common name appears more than once, the
/// last band wins.
pub(crate) fn find_visual_bands<'a>(
    bands: impl IntoIterator<Item = &'a Band>,
) -> Option<Rgb<&'a Band>> {
    let (mut red, mut green, mut blue) = (None, None, None);
    for band in bands {
        match band.common_name() {
            Some("red") => red = Some(band),
            Some("green") => green = Some(band),
            Some("blue") => blue = Some(band),
            _ => {}
        }
    }
    Some(Rgb {
        red: red?,
        green: green?,
        blue: blue?,
    })
}

/// Converts a JSON band list, assigning each band its index.
///
/// Nothing is converted unless the value is an array of objects.
pub(crate) fn from_values(value: &Value) -> Option<Vec<Band>> {
    value
        .as_array()?
        .iter()
        .enumerate()
        .map(|(index, value)| Band::from_value(value.clone(), index).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Band, BandRef, Rgb, find_visual_bands, from_values};
    use crate::{Metadata, statistics::NoData};
    use serde_json::json;

    fn bands(names: &[&str]) -> Vec<Band> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Band::from_value(json!({"eo:common_name": name}), i).unwrap())
            .collect()
    }

    #[test]
    fn common_name() {
        let band = Band::from_value(json!({"common_name": "red"}), 0).unwrap();
        assert_eq!(band.common_name(), Some("red"));
        let band = Band::from_value(json!({"eo:common_name": "nir", "common_name": "red"}), 0)
            .unwrap();
        assert_eq!(band.common_name(), Some("nir"));
    }

    #[test]
    fn visual_bands() {
        let rgb = bands(&["red", "green", "nir", "blue"]);
        let found = find_visual_bands(&rgb).unwrap();
        assert_eq!(found.map(Band::index), Rgb { red: 0, green: 1, blue: 3 });
        assert!(find_visual_bands(&bands(&["red", "green"])).is_none());
        let dup = bands(&["red", "green", "blue", "red"]);
        let found = find_visual_bands(&dup).unwrap();
        assert_eq!(found.red.index(), 3);
    }

    #[test]
    fn metadata_without_owner() {
        let band = Band::from_value(json!({"name": "b1", "nodata": 0}), 0).unwrap();
        let band = BandRef::standalone(&band);
        assert_eq!(*band.metadata("name").unwrap(), json!("b1"));
        assert!(band.metadata("unit").is_none());
        assert_eq!(band.no_data_values(), vec![NoData::Number(0.0)]);
    }

    #[test]
    fn band_lists() {
        let bands = from_values(&json!([{"name": "b1"}, {"name": 2}])).unwrap();
        assert_eq!(bands[1].index(), 1);
        assert!(bands[1].name.is_none());
        assert_eq!(*bands[1].metadata("name").unwrap(), json!(2));
        assert!(from_values(&json!([{"name": "b1"}, "b2"])).is_none());
        assert!(from_values(&json!({"name": "b1"})).is_none());
    }

    #[test]
    fn round_trip() {
        let value = json!({"name": "b1", "statistics": {"minimum": 0, "maximum": 1}});
        let band = Band::from_value(value.clone(), 0).unwrap();
        assert_eq!(serde_json::to_value(band).unwrap(), value);
    }
}
