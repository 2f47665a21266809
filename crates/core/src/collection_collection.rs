use crate::{
    Bbox, Collection, Context, LinkEntry, Links, Metadata, SelfHref,
    context::to_metadata,
    datetime::{Interval, union_date_time},
    geo::union_bounding_box,
    json::{take, take_with},
    link,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A list of collections, as returned by the `/collections` endpoint of a
/// STAC API.
///
/// It has no `type` field; it is recognized by its `collections` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CollectionCollection {
    /// The list of [Collections](Collection).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<Collection>>,

    /// List of link objects to resources and related URLs, e.g. for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkEntry>>,

    /// Additional fields.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

impl CollectionCollection {
    /// Creates a new collection of collections.
    pub fn new(collections: Vec<Collection>) -> CollectionCollection {
        CollectionCollection {
            collections: Some(collections),
            links: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Returns all collections.
    pub fn all(&self) -> &[Collection] {
        self.collections.as_deref().unwrap_or_default()
    }

    /// Returns all collections.
    pub fn collections(&self) -> &[Collection] {
        self.all()
    }

    /// Returns the overall bounding boxes of all collections that have a
    /// valid one.
    pub fn bounding_boxes(&self) -> Vec<Bbox> {
        self.all()
            .iter()
            .filter_map(Collection::bounding_box)
            .collect()
    }

    /// Returns the union of the bounding boxes of all collections.
    pub fn bounding_box(&self) -> Option<Bbox> {
        union_bounding_box(&self.bounding_boxes())
    }

    /// Returns the first temporal extent of all collections that have one.
    pub fn temporal_extents(&self) -> Vec<Interval> {
        self.all()
            .iter()
            .filter_map(Collection::temporal_extent)
            .collect()
    }

    /// Returns the union of the temporal extents of all collections.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use serde_json::json;
    /// use stac_entity::{CollectionCollection, FromJson};
    ///
    /// let collections = CollectionCollection::from_json_value(json!({
    ///     "collections": [
    ///         {"type": "Collection", "extent": {"temporal": {"interval": [["2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z"]]}}},
    ///         {"type": "Collection", "extent": {"temporal": {"interval": [["2019-01-01T00:00:00Z", null]]}}},
    ///         {"type": "Collection"}
    ///     ]
    /// })).unwrap();
    /// let start = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(collections.temporal_extent(), Some([Some(start), None]));
    /// ```
    pub fn temporal_extent(&self) -> Option<Interval> {
        union_date_time(&self.temporal_extents())
    }

    /// Converts all collections into a GeoJSON feature collection.
    ///
    /// Collections without a valid footprint are left out.
    pub fn to_geojson(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self
                .all()
                .iter()
                .filter_map(Collection::to_geojson)
                .collect(),
            foreign_members: None,
        }
    }
}

impl From<Vec<Collection>> for CollectionCollection {
    fn from(collections: Vec<Collection>) -> CollectionCollection {
        CollectionCollection::new(collections)
    }
}

impl From<Map<String, Value>> for CollectionCollection {
    fn from(mut object: Map<String, Value>) -> CollectionCollection {
        CollectionCollection {
            collections: take(&mut object, "collections"),
            links: take_with(&mut object, "links", link::from_values),
            additional_fields: object,
            self_href: None,
        }
    }
}

impl SelfHref for CollectionCollection {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl Links for CollectionCollection {
    fn link_entries(&self) -> &[LinkEntry] {
        self.links.as_deref().unwrap_or_default()
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        &mut self.links
    }

    fn as_context(&self) -> Context<'_> {
        Context::CollectionCollection(self)
    }
}

impl Metadata for CollectionCollection {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let typed = match field {
            "collections" => self.collections.as_ref().and_then(to_metadata),
            "links" => self.links.as_ref().and_then(to_metadata),
            _ => None,
        };
        typed.or_else(|| self.additional_fields.get(field).map(Cow::Borrowed))
    }
}
