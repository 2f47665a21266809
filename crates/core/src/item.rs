use crate::{
    Asset, Assets, Band, BandRef, Bbox, Bound, Context, Link, LinkEntry, Links, Metadata,
    Result, SelfHref, ToJson, asset, band,
    context::to_metadata,
    datetime::{Interval, center_date_time, iso_to_date},
    geo::ensure_bounding_box,
    json::{take, take_with},
    link,
    utils::is_text,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The type field for [Items](Item).
pub const ITEM_TYPE: &str = "Feature";

/// An `Item` is a GeoJSON Feature augmented with foreign members relevant to
/// a STAC entity.
///
/// These include fields that identify the time range and assets of the
/// `Item`. An `Item` is the core object in a STAC catalog, containing the
/// core metadata that enables any client to search or crawl online catalogs
/// of spatial 'assets' (e.g., satellite imagery, derived data, DEMs).
///
/// The geometry and bbox are kept as given in the additional fields, as
/// are fields that are null or don't have the expected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Item {
    /// Type of the GeoJSON Object. MUST be set to `Feature`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Provider identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The `id` of the STAC Collection this `Item` references to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// A dictionary of additional metadata for the `Item`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    /// List of link objects to resources and related URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkEntry>>,

    /// Dictionary of asset objects that can be downloaded, each with a
    /// unique key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<IndexMap<String, Asset>>,

    /// Asset definitions, rarely found on items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_assets: Option<IndexMap<String, Asset>>,

    /// Additional fields not part of the Item specification, including
    /// `bbox` and `geometry`.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

/// Additional metadata fields can be added to the GeoJSON Object Properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Properties {
    /// The bands of the item's data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Band>>,

    /// All other properties.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Item {
    /// Creates a new `Item` with the given `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Item;
    ///
    /// let item = Item::new("an-id");
    /// assert_eq!(item.id.as_deref(), Some("an-id"));
    /// assert!(item.datetime().is_none());
    /// ```
    pub fn new(id: impl ToString) -> Item {
        Item {
            r#type: Some(ITEM_TYPE.to_string()),
            id: Some(id.to_string()),
            properties: Some(Properties::default()),
            links: Some(Vec::new()),
            assets: Some(IndexMap::new()),
            ..Default::default()
        }
    }

    /// Returns the bounding box of this item, in two dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Bbox, FromJson, Item};
    ///
    /// let item = Item::from_json_value(json!({
    ///     "type": "Feature",
    ///     "bbox": [172.91, 1.34, 172.95, 1.36],
    ///     "properties": {}
    /// })).unwrap();
    /// assert_eq!(item.bounding_box(), Some(Bbox::new(172.91, 1.34, 172.95, 1.36)));
    /// ```
    pub fn bounding_box(&self) -> Option<Bbox> {
        self.additional_fields
            .get("bbox")
            .and_then(|bbox| ensure_bounding_box(bbox, false))
    }

    /// Returns the bounding box as a list, empty if there's no valid one.
    pub fn bounding_boxes(&self) -> Vec<Bbox> {
        self.bounding_box().into_iter().collect()
    }

    /// Returns the datetime of this item.
    ///
    /// Falls back to the center of `start_datetime` and `end_datetime`, or
    /// whichever of them can be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use serde_json::json;
    /// use stac_entity::{FromJson, Item};
    ///
    /// let item = Item::from_json_value(json!({
    ///     "type": "Feature",
    ///     "properties": {
    ///         "datetime": null,
    ///         "start_datetime": "2020-01-01T00:00:00Z",
    ///         "end_datetime": "2020-01-03T00:00:00Z"
    ///     }
    /// })).unwrap();
    /// assert_eq!(item.datetime(), Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()));
    /// ```
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        if let Some(datetime) = self.property_str("datetime").and_then(iso_to_date) {
            return Some(datetime);
        }
        let start = self.property_str("start_datetime").and_then(iso_to_date);
        let end = self.property_str("end_datetime").and_then(iso_to_date);
        match (start, end) {
            (Some(start), Some(end)) => Some(center_date_time(start, end)),
            (start, end) => start.or(end),
        }
    }

    /// Returns the temporal extents of this item.
    ///
    /// That's `[start_datetime, end_datetime]` if either of them is set,
    /// else `[datetime, datetime]`, else nothing.
    pub fn temporal_extents(&self) -> Vec<Interval> {
        let start = self.property_str("start_datetime");
        let end = self.property_str("end_datetime");
        if is_text(start) || is_text(end) {
            vec![[start.and_then(iso_to_date), end.and_then(iso_to_date)]]
        } else if let Some(datetime) = self.property_str("datetime").filter(|s| !s.is_empty()) {
            let datetime = iso_to_date(datetime);
            vec![[datetime, datetime]]
        } else {
            Vec::new()
        }
    }

    /// Returns the first temporal extent of this item.
    pub fn temporal_extent(&self) -> Option<Interval> {
        self.temporal_extents().into_iter().next()
    }

    /// Exports this item as GeoJSON, which it already is.
    pub fn to_geojson(&self) -> Result<Value> {
        self.to_json_value()
    }

    /// Returns the `collection` link.
    pub fn collection_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("collection", true)
    }

    /// Returns the bands defined in the properties of this item.
    pub fn bands(&self) -> Vec<BandRef<'_>> {
        let context = self.as_context();
        self.raw_bands()
            .iter()
            .map(|band| BandRef::for_entity(band, context))
            .collect()
    }

    /// Returns the band at the given index.
    pub fn band(&self, index: usize) -> Option<BandRef<'_>> {
        self.raw_bands()
            .get(index)
            .map(|band| BandRef::for_entity(band, self.as_context()))
    }

    fn raw_bands(&self) -> &[Band] {
        self.properties
            .as_ref()
            .and_then(|properties| properties.bands.as_deref())
            .unwrap_or_default()
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()?
            .additional_fields
            .get(key)?
            .as_str()
    }
}

impl From<Map<String, Value>> for Item {
    fn from(mut object: Map<String, Value>) -> Item {
        Item {
            r#type: take(&mut object, "type"),
            id: take(&mut object, "id"),
            collection: take(&mut object, "collection"),
            properties: take(&mut object, "properties"),
            links: take_with(&mut object, "links", link::from_values),
            assets: take_with(&mut object, "assets", asset::from_map),
            item_assets: take_with(&mut object, "item_assets", asset::from_map),
            additional_fields: object,
            self_href: None,
        }
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(mut object: Map<String, Value>) -> Properties {
        Properties {
            bands: take_with(&mut object, "bands", band::from_values),
            additional_fields: object,
        }
    }
}

impl SelfHref for Item {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl Links for Item {
    fn link_entries(&self) -> &[LinkEntry] {
        self.links.as_deref().unwrap_or_default()
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        &mut self.links
    }

    fn as_context(&self) -> Context<'_> {
        Context::Item(self)
    }
}

impl Assets for Item {
    fn asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.assets.as_ref()
    }

    fn item_asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.item_assets.as_ref()
    }
}

impl Metadata for Item {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let properties = self.properties.as_ref()?;
        match field {
            "bands" => properties
                .bands
                .as_ref()
                .and_then(to_metadata)
                .or_else(|| properties.additional_fields.get(field).map(Cow::Borrowed)),
            _ => properties.additional_fields.get(field).map(Cow::Borrowed),
        }
    }
}
