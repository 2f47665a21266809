use crate::{
    Asset, Assets, Band, BandRef, Bbox, CatalogLike, Context, LinkEntry, Links, Metadata,
    SelfHref, asset, band,
    context::to_metadata,
    datetime::{Interval, iso_to_date},
    geo::{self, ensure_bounding_box},
    json::{take, take_with},
    link,
    utils::has_text,
};
use geojson::{Feature, feature::Id};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The type field for [Collections](Collection).
pub const COLLECTION_TYPE: &str = "Collection";

/// The STAC `Collection` Specification defines a set of common fields to
/// describe a group of Items that share properties and metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Collection {
    /// Must be set to `Collection` to be a valid `Collection`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Identifier for the `Collection` that is unique across the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A list of references to other documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkEntry>>,

    /// Dictionary of asset objects that can be downloaded, each with a
    /// unique key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<IndexMap<String, Asset>>,

    /// A dictionary of assets that can be found in member Items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_assets: Option<IndexMap<String, Asset>>,

    /// The bands of the data in this collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Band>>,

    /// A map of property summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<Summaries>,

    /// Additional fields not part of the `Collection` specification, and
    /// fields like `extent` that are only read on demand.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

/// The summaries of a [Collection].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Summaries {
    /// The summarized bands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Band>>,

    /// All other summaries.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Collection {
    /// Creates a new `Collection` with the given `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Collection;
    ///
    /// let collection = Collection::new("an-id");
    /// assert_eq!(collection.r#type.as_deref(), Some("Collection"));
    /// assert!(collection.bounding_box().is_none());
    /// ```
    pub fn new(id: impl ToString) -> Collection {
        Collection {
            r#type: Some(COLLECTION_TYPE.to_string()),
            id: Some(id.to_string()),
            links: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Returns the raw entries of `extent.spatial.bbox`, unvalidated.
    pub fn raw_bounding_boxes(&self) -> &[Value] {
        self.additional_fields
            .get("extent")
            .and_then(|extent| extent.get("spatial"))
            .and_then(|spatial| spatial.get("bbox"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the overall bounding box, i.e. the first entry of the spatial
    /// extent, in two dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Bbox, Collection, FromJson};
    ///
    /// let collection = Collection::from_json_value(json!({
    ///     "type": "Collection",
    ///     "extent": {"spatial": {"bbox": [[-180, -90, 180, 90], [0, 0, 1, 1]]}}
    /// })).unwrap();
    /// assert_eq!(collection.bounding_box(), Some(Bbox::new(-180., -90., 180., 90.)));
    /// assert_eq!(collection.bounding_boxes(), vec![Bbox::new(0., 0., 1., 1.)]);
    /// ```
    pub fn bounding_box(&self) -> Option<Bbox> {
        self.raw_bounding_boxes()
            .first()
            .and_then(|bbox| ensure_bounding_box(bbox, false))
    }

    /// Returns the bounding boxes of the individual footprints.
    ///
    /// If there is more than one entry, the first one is the union of all
    /// others and is left out. Invalid entries are dropped.
    pub fn bounding_boxes(&self) -> Vec<Bbox> {
        let raw = self.raw_bounding_boxes();
        let footprints = if raw.len() > 1 { &raw[1..] } else { raw };
        footprints
            .iter()
            .filter_map(|bbox| ensure_bounding_box(bbox, false))
            .collect()
    }

    /// Returns all temporal intervals that have at least one bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use serde_json::json;
    /// use stac_entity::{Collection, FromJson};
    ///
    /// let collection = Collection::from_json_value(json!({
    ///     "type": "Collection",
    ///     "extent": {"temporal": {"interval": [["2020-01-01T00:00:00Z", null], [null, null]]}}
    /// })).unwrap();
    /// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(collection.temporal_extents(), vec![[Some(start), None]]);
    /// ```
    pub fn temporal_extents(&self) -> Vec<Interval> {
        self.additional_fields
            .get("extent")
            .and_then(|extent| extent.get("temporal"))
            .and_then(|temporal| temporal.get("interval"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_array)
            .filter(|interval| interval.iter().take(2).any(has_text))
            .map(|interval| {
                let bound = |i: usize| {
                    interval
                        .get(i)
                        .and_then(Value::as_str)
                        .and_then(iso_to_date)
                };
                [bound(0), bound(1)]
            })
            .collect()
    }

    /// Returns the first temporal interval.
    pub fn temporal_extent(&self) -> Option<Interval> {
        self.temporal_extents().into_iter().next()
    }

    /// Converts the footprints of this collection into a GeoJSON feature.
    ///
    /// Returns `None` if there are no valid footprints.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Collection, FromJson};
    ///
    /// let collection = Collection::from_json_value(json!({
    ///     "type": "Collection",
    ///     "id": "a-collection",
    ///     "extent": {"spatial": {"bbox": [[-10, -10, 10, 10]]}}
    /// })).unwrap();
    /// let feature = collection.to_geojson().unwrap();
    /// assert_eq!(feature.id, Some(geojson::feature::Id::String("a-collection".to_string())));
    /// assert!(Collection::new("empty").to_geojson().is_none());
    /// ```
    pub fn to_geojson(&self) -> Option<Feature> {
        let mut feature = geo::to_geojson(&self.bounding_boxes())?;
        feature.id = self.id.clone().map(Id::String);
        Some(feature)
    }

    /// Returns the bands of this collection.
    ///
    /// Top-level `bands` take precedence over `summaries.bands`.
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
        self.bands
            .as_deref()
            .or_else(|| self.summaries.as_ref()?.bands.as_deref())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Collection {
    fn from(mut object: Map<String, Value>) -> Collection {
        Collection {
            r#type: take(&mut object, "type"),
            id: take(&mut object, "id"),
            links: take_with(&mut object, "links", link::from_values),
            assets: take_with(&mut object, "assets", asset::from_map),
            item_assets: take_with(&mut object, "item_assets", asset::from_map),
            bands: take_with(&mut object, "bands", band::from_values),
            summaries: take(&mut object, "summaries"),
            additional_fields: object,
            self_href: None,
        }
    }
}

impl From<Map<String, Value>> for Summaries {
    fn from(mut object: Map<String, Value>) -> Summaries {
        Summaries {
            bands: take_with(&mut object, "bands", band::from_values),
            additional_fields: object,
        }
    }
}

impl SelfHref for Collection {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl Links for Collection {
    fn link_entries(&self) -> &[LinkEntry] {
        self.links.as_deref().unwrap_or_default()
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        &mut self.links
    }

    fn as_context(&self) -> Context<'_> {
        Context::Collection(self)
    }
}

impl Assets for Collection {
    fn asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.assets.as_ref()
    }

    fn item_asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.item_assets.as_ref()
    }
}

impl CatalogLike for Collection {}

impl Metadata for Collection {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let typed = match field {
            "type" => self.r#type.as_ref().and_then(to_metadata),
            "id" => self.id.as_ref().and_then(to_metadata),
            "links" => self.links.as_ref().and_then(to_metadata),
            "assets" => self.assets.as_ref().and_then(to_metadata),
            "item_assets" => self.item_assets.as_ref().and_then(to_metadata),
            "bands" => self.bands.as_ref().and_then(to_metadata),
            "summaries" => self.summaries.as_ref().and_then(to_metadata),
            _ => None,
        };
        typed.or_else(|| self.additional_fields.get(field).map(Cow::Borrowed))
    }
}
