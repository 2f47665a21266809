use crate::{
    Band, BandRef, Bound, Error, Metadata, Reference, Result, Rgb, Type,
    band::{self, find_visual_bands},
    json::{take, take_with},
    statistics::{self, NoData, Statistics},
    utils::is_text,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Fields that an asset never inherits from the entity that contains it.
pub const NO_INHERIT_FIELDS: [&str; 6] = [
    "created",
    "updated",
    "published",
    "expires",
    "unpublished",
    "bands",
];

/// An asset is an object that contains a URI to data associated with an
/// item, collection or catalog.
///
/// Assets without an href are item asset definitions: they describe what the
/// assets of a collection's items look like.
///
/// Fields that are null or don't have the expected type are kept as-is in
/// [Asset::additional_fields].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Asset {
    /// URI to the asset object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Media type of the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// The semantic roles of the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// The bands of the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Band>>,

    /// Additional fields on the asset.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    key: String,
}

impl Asset {
    /// Creates an asset from a JSON object and its key.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::Asset;
    ///
    /// let asset = Asset::from_value(json!({"href": "./data.tif"}), "data").unwrap();
    /// assert_eq!(asset.key(), "data");
    /// assert!(!asset.is_definition());
    /// assert!(Asset::from_value(json!([]), "data").is_err());
    /// ```
    pub fn from_value(value: Value, key: impl ToString) -> Result<Asset> {
        match value {
            Value::Object(object) => {
                let mut asset = Asset::from(object);
                asset.key = key.to_string();
                Ok(asset)
            }
            value => Err(Error::NotAnObject(value)),
        }
    }

    /// Returns the key of this asset in its asset map.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns [Type::Asset].
    pub fn entity_type(&self) -> Type {
        Type::Asset
    }

    /// Returns the title, if there is one.
    pub fn title(&self) -> Option<&str> {
        self.additional_fields.get("title").and_then(Value::as_str)
    }

    /// Returns `true` if this asset has no href, i.e. it is an item asset
    /// definition.
    pub fn is_definition(&self) -> bool {
        !is_text(self.href.as_deref())
    }

    /// Returns `true` if this asset is a thumbnail or overview, by key or
    /// by role.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::Asset;
    ///
    /// let asset = Asset::from_value(json!({"href": "a.png"}), "thumbnail").unwrap();
    /// assert!(asset.is_preview());
    /// let asset = Asset::from_value(json!({"href": "a.png", "roles": ["overview"]}), "a").unwrap();
    /// assert!(asset.is_preview());
    /// ```
    pub fn is_preview(&self) -> bool {
        self.has_role(&["thumbnail", "overview"], true)
    }

    /// Returns `true` if this asset has one of the given roles.
    ///
    /// If `include_key` is set, the asset key counts as a role too.
    pub fn has_role(&self, roles: &[&str], include_key: bool) -> bool {
        (include_key && roles.contains(&self.key.as_str()))
            || self
                .roles
                .iter()
                .flatten()
                .any(|role| roles.contains(&role.as_str()))
    }

    /// Returns the bands of this asset.
    pub fn bands(&self) -> &[Band] {
        self.bands.as_deref().unwrap_or_default()
    }

    /// Returns the band at the given index.
    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands().get(index)
    }

    /// Returns the first band where `property` is one of the given values.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::Asset;
    ///
    /// let asset = Asset::from_value(json!({
    ///     "href": "a.tif",
    ///     "bands": [{"name": "b1"}, {"name": "b2", "eo:common_name": "red"}]
    /// }), "a").unwrap();
    /// assert_eq!(asset.find_band(&["b2", "b3"], "name").unwrap().index(), 1);
    /// assert_eq!(asset.find_band(&["red"], "common_name").unwrap().index(), 1);
    /// assert!(asset.find_band(&["b3"], "name").is_none());
    /// ```
    pub fn find_band(&self, values: &[&str], property: &str) -> Option<&Band> {
        self.bands().iter().find(|band| {
            band.property(property)
                .is_some_and(|value| values.contains(&value))
        })
    }

    /// Finds the red, green and blue bands by their common names.
    ///
    /// Returns `None` unless all three are present.
    pub fn find_visual_bands(&self) -> Option<Rgb<&Band>> {
        find_visual_bands(self.bands())
    }

    /// Returns the minimum and maximum values from this asset's own fields.
    pub fn min_max_values(&self) -> Statistics {
        statistics::min_max_values(self)
    }

    /// Returns the no-data values from this asset's own fields.
    pub fn no_data_values(&self) -> Vec<NoData> {
        statistics::no_data_values(self)
    }
}

impl From<Map<String, Value>> for Asset {
    fn from(mut object: Map<String, Value>) -> Asset {
        Asset {
            href: take(&mut object, "href"),
            r#type: take(&mut object, "type"),
            roles: take(&mut object, "roles"),
            bands: take_with(&mut object, "bands", band::from_values),
            additional_fields: object,
            key: String::new(),
        }
    }
}

impl Reference for Asset {
    fn href(&self) -> Option<&str> {
        self.href.as_deref().filter(|href| !href.is_empty())
    }

    fn media_type(&self) -> Option<&str> {
        self.r#type.as_deref()
    }
}

impl Metadata for Asset {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let string = |s: &Option<String>| {
            s.as_ref()
                .map(|s| Cow::Owned(Value::String(s.clone())))
        };
        let typed = match field {
            "href" => string(&self.href),
            "type" => string(&self.r#type),
            "roles" => self
                .roles
                .as_ref()
                .map(|roles| Cow::Owned(roles.iter().cloned().map(Value::String).collect())),
            "bands" => self
                .bands
                .as_ref()
                .and_then(|bands| serde_json::to_value(bands).ok())
                .map(Cow::Owned),
            _ => None,
        };
        typed.or_else(|| self.additional_fields.get(field).map(Cow::Borrowed))
    }
}

impl<'a> Bound<'a, Asset> {
    /// Returns the bands of this asset, each knowing its asset.
    pub fn bands(&self) -> Vec<BandRef<'a>> {
        self.value()
            .bands()
            .iter()
            .map(|band| BandRef::for_asset(band, *self))
            .collect()
    }

    /// Returns the band at the given index.
    pub fn band(&self, index: usize) -> Option<BandRef<'a>> {
        self.value()
            .band(index)
            .map(|band| BandRef::for_asset(band, *self))
    }

    /// Returns the first band where `property` is one of the given values.
    pub fn find_band(&self, values: &[&str], property: &str) -> Option<BandRef<'a>> {
        self.value()
            .find_band(values, property)
            .map(|band| BandRef::for_asset(band, *self))
    }

    /// Finds the red, green and blue bands by their common names.
    pub fn find_visual_bands(&self) -> Option<Rgb<BandRef<'a>>> {
        self.value()
            .find_visual_bands()
            .map(|rgb| rgb.map(|band| BandRef::for_asset(band, *self)))
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

impl Metadata for Bound<'_, Asset> {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        self.value().metadata(field).or_else(|| {
            if NO_INHERIT_FIELDS.contains(&field) {
                None
            } else {
                let context = self.context()?;
                context
                    .metadata(field)
                    .map(|value| Cow::Owned(value.into_owned()))
            }
        })
    }
}

/// Converts a JSON asset map, giving each asset its key.
///
/// Nothing is converted unless the value is an object of objects.
pub(crate) fn from_map(value: &Value) -> Option<IndexMap<String, Asset>> {
    value
        .as_object()?
        .iter()
        .map(|(key, value)| {
            Asset::from_value(value.clone(), key)
                .ok()
                .map(|asset| (key.clone(), asset))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Asset, from_map};
    use crate::{Bound, Metadata, Reference, statistics::NoData};
    use serde_json::json;

    #[test]
    fn definition() {
        let asset = Asset::from_value(json!({"title": "Definition"}), "data").unwrap();
        assert!(asset.is_definition());
        let asset = Bound::standalone(&asset);
        assert!(asset.absolute_url().is_none());
        assert!(asset.is_http().is_none());
    }

    #[test]
    fn standalone_absolute_url() {
        let asset = Asset::from_value(json!({"href": "https://stac.test/a.tif"}), "a").unwrap();
        let asset = Bound::standalone(&asset);
        assert_eq!(
            asset.absolute_url().unwrap().to_string(),
            "https://stac.test/a.tif"
        );
        assert_eq!(asset.is_http(), Some(true));
        let asset = Asset::from_value(json!({"href": "./a.tif"}), "a").unwrap();
        assert!(Bound::standalone(&asset).absolute_url().is_none());
    }

    #[test]
    fn media_types() {
        let cog = Asset::from_value(
            json!({"href": "a.tif", "type": "image/tiff; application=geotiff; profile=cloud-optimized"}),
            "a",
        )
        .unwrap();
        assert!(cog.is_geotiff());
        assert!(cog.is_cog());
        let geotiff =
            Asset::from_value(json!({"href": "a.tif", "type": "image/tiff; application=geotiff"}), "a")
                .unwrap();
        assert!(geotiff.is_geotiff());
        assert!(!geotiff.is_cog());
        let untyped = Asset::from_value(json!({"href": "a.tif"}), "a").unwrap();
        assert!(!untyped.is_geotiff());
    }

    #[test]
    fn roles() {
        let asset = Asset::from_value(json!({"href": "a.tif", "roles": ["data"]}), "visual").unwrap();
        assert!(asset.has_role(&["data"], false));
        assert!(!asset.has_role(&["visual"], false));
        assert!(asset.has_role(&["visual"], true));
        assert!(!asset.is_preview());
    }

    #[test]
    fn bands() {
        let asset = Asset::from_value(
            json!({"href": "a.tif", "bands": [{"name": "b1"}, {"name": "b2"}]}),
            "a",
        )
        .unwrap();
        assert_eq!(asset.bands().len(), 2);
        assert_eq!(asset.band(1).unwrap().name.as_deref(), Some("b2"));
        assert!(asset.band(2).is_none());
        let empty = Asset::from_value(json!({"href": "a.tif"}), "a").unwrap();
        assert!(empty.bands().is_empty());
    }

    #[test]
    fn band_statistics() {
        let asset = Asset::from_value(
            json!({"bands": [{"statistics": {"minimum": -5, "maximum": 5, "mean": 0}, "data_type": "uint8"}, {}]}),
            "test",
        )
        .unwrap();
        let asset = Bound::standalone(&asset);
        let statistics = asset.band(0).unwrap().min_max_values();
        assert_eq!(statistics.minimum, Some(-5.0));
        assert_eq!(statistics.maximum, Some(5.0));
        let statistics = asset.band(1).unwrap().min_max_values();
        assert!(statistics.minimum.is_none());
        assert!(statistics.maximum.is_none());
    }

    #[test]
    fn band_no_data() {
        let asset = Asset::from_value(
            json!({"bands": [{"nodata": "nan"}, {"nodata": 0}, {"name": "b3"}]}),
            "test",
        )
        .unwrap();
        assert!(asset.no_data_values().is_empty());
        let asset = Bound::standalone(&asset);
        assert!(asset.no_data_values().is_empty());
        assert!(matches!(
            asset.band(0).unwrap().no_data_values()[..],
            [NoData::Number(n)] if n.is_nan()
        ));
        assert_eq!(
            asset.band(1).unwrap().no_data_values(),
            vec![NoData::Number(0.0)]
        );
        assert!(asset.band(2).unwrap().no_data_values().is_empty());
    }

    #[test]
    fn band_inherits_from_asset() {
        let asset = Asset::from_value(
            json!({"href": "a.tif", "data_type": "uint16", "bands": [{"name": "b1"}]}),
            "a",
        )
        .unwrap();
        let asset = Bound::standalone(&asset);
        let band = asset.band(0).unwrap();
        assert_eq!(*band.metadata("data_type").unwrap(), json!("uint16"));
        assert_eq!(band.min_max_values().maximum, Some(65535.0));
    }

    #[test]
    fn own_metadata() {
        let asset = Asset::from_value(
            json!({"href": "a.tif", "type": "image/png", "roles": ["data"], "gsd": 10}),
            "a",
        )
        .unwrap();
        assert_eq!(*asset.metadata("href").unwrap(), json!("a.tif"));
        assert_eq!(*asset.metadata("roles").unwrap(), json!(["data"]));
        assert_eq!(*asset.metadata("gsd").unwrap(), json!(10));
        assert!(asset.metadata("bands").is_none());
    }

    #[test]
    fn wrongly_typed_fields() {
        let value = json!({
            "href": ["./a.tif"],
            "type": 42,
            "roles": "data",
            "bands": {"name": "b1"},
            "gsd": 10
        });
        let asset = Asset::from_value(value.clone(), "a").unwrap();
        assert!(asset.href.is_none());
        assert!(asset.is_definition());
        assert!(asset.r#type.is_none());
        assert!(!asset.has_role(&["data"], false));
        assert!(asset.bands().is_empty());
        assert_eq!(*asset.metadata("roles").unwrap(), json!("data"));
        assert_eq!(serde_json::to_value(asset).unwrap(), value);
    }

    #[test]
    fn nulls() {
        let value = json!({"href": "x.tif", "type": null, "roles": null, "title": null});
        let asset = Asset::from_value(value.clone(), "a").unwrap();
        assert_eq!(asset.href.as_deref(), Some("x.tif"));
        assert!(asset.r#type.is_none());
        assert!(asset.title().is_none());
        assert_eq!(serde_json::to_value(asset).unwrap(), value);
    }

    #[test]
    fn asset_maps() {
        let assets = from_map(&json!({"a": {"href": "a.tif"}, "b": {"roles": 1}})).unwrap();
        assert_eq!(assets["b"].key(), "b");
        assert!(from_map(&json!({"a": {"href": "a.tif"}, "b": "b.tif"})).is_none());
        assert!(from_map(&json!([{"href": "a.tif"}])).is_none());
    }

    #[test]
    fn round_trip() {
        let value = json!({
            "href": "./a.tif",
            "type": "image/tiff; application=geotiff",
            "title": "A",
            "roles": ["data"],
            "bands": [{"name": "b1", "eo:common_name": "red"}],
            "proj:code": "EPSG:4326"
        });
        let asset = Asset::from_value(value.clone(), "a").unwrap();
        assert_eq!(serde_json::to_value(asset).unwrap(), value);
    }
}
