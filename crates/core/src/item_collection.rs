use crate::{
    Bbox, Context, Item, LinkEntry, Links, Metadata, Result, SelfHref, ToJson,
    context::to_metadata,
    datetime::{Interval, union_date_time},
    geo::union_bounding_box,
    json::{take, take_with},
    link,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The type field for [ItemCollections](ItemCollection).
pub const ITEM_COLLECTION_TYPE: &str = "FeatureCollection";

/// A [GeoJSON FeatureCollection](https://datatracker.ietf.org/doc/html/rfc7946#page-12) of items.
///
/// This is the response of a STAC API item search or of an `items`
/// endpoint, and isn't part of the core STAC specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ItemCollection {
    /// Must be set to `FeatureCollection`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// The list of [Items](Item).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Item>>,

    /// List of link objects to resources and related URLs, e.g. for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkEntry>>,

    /// Additional fields.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

impl ItemCollection {
    /// Creates a new item collection from items.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Item, ItemCollection};
    ///
    /// let item_collection = ItemCollection::new(vec![Item::new("a"), Item::new("b")]);
    /// assert_eq!(item_collection.items().len(), 2);
    /// ```
    pub fn new(items: Vec<Item>) -> ItemCollection {
        ItemCollection {
            r#type: Some(ITEM_COLLECTION_TYPE.to_string()),
            features: Some(items),
            ..Default::default()
        }
    }

    /// Returns all items.
    pub fn all(&self) -> &[Item] {
        self.features.as_deref().unwrap_or_default()
    }

    /// Returns all items.
    pub fn items(&self) -> &[Item] {
        self.all()
    }

    /// Returns the bounding boxes of all items that have a valid one.
    pub fn bounding_boxes(&self) -> Vec<Bbox> {
        self.all()
            .iter()
            .filter_map(Item::bounding_box)
            .collect()
    }

    /// Returns the union of the bounding boxes of all items.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Bbox, FromJson, ItemCollection};
    ///
    /// let item_collection = ItemCollection::from_json_value(json!({
    ///     "type": "FeatureCollection",
    ///     "features": [
    ///         {"type": "Feature", "bbox": [0, 0, 1, 1], "properties": {}},
    ///         {"type": "Feature", "bbox": [-1, -1, 0, 0], "properties": {}},
    ///         {"type": "Feature", "properties": {}}
    ///     ]
    /// })).unwrap();
    /// assert_eq!(item_collection.bounding_box(), Some(Bbox::new(-1., -1., 1., 1.)));
    /// ```
    pub fn bounding_box(&self) -> Option<Bbox> {
        union_bounding_box(&self.bounding_boxes())
    }

    /// Returns the temporal extents of all items that have one.
    pub fn temporal_extents(&self) -> Vec<Interval> {
        self.all()
            .iter()
            .filter_map(Item::temporal_extent)
            .collect()
    }

    /// Returns the union of the temporal extents of all items.
    pub fn temporal_extent(&self) -> Option<Interval> {
        union_date_time(&self.temporal_extents())
    }

    /// Exports this item collection as GeoJSON, which it already is.
    pub fn to_geojson(&self) -> Result<Value> {
        self.to_json_value()
    }
}

impl From<Vec<Item>> for ItemCollection {
    fn from(items: Vec<Item>) -> ItemCollection {
        ItemCollection::new(items)
    }
}

impl From<Map<String, Value>> for ItemCollection {
    fn from(mut object: Map<String, Value>) -> ItemCollection {
        ItemCollection {
            r#type: take(&mut object, "type"),
            features: take(&mut object, "features"),
            links: take_with(&mut object, "links", link::from_values),
            additional_fields: object,
            self_href: None,
        }
    }
}

impl SelfHref for ItemCollection {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl Links for ItemCollection {
    fn link_entries(&self) -> &[LinkEntry] {
        self.links.as_deref().unwrap_or_default()
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        &mut self.links
    }

    fn as_context(&self) -> Context<'_> {
        Context::ItemCollection(self)
    }
}

impl Metadata for ItemCollection {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let typed = match field {
            "type" => self.r#type.as_ref().and_then(to_metadata),
            "features" => self.features.as_ref().and_then(to_metadata),
            "links" => self.links.as_ref().and_then(to_metadata),
            _ => None,
        };
        typed.or_else(|| self.additional_fields.get(field).map(Cow::Borrowed))
    }
}

#[cfg(test)]
mod tests {
    use super::ItemCollection;
    use crate::{FromJson, Links, Metadata, ToJson, Type};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn item_collection() -> ItemCollection {
        ItemCollection::from_json_value(json!({
            "type": "FeatureCollection",
            "numberMatched": 3,
            "features": [
                {"type": "Feature", "id": "a", "bbox": [0, 0, 1, 1], "properties": {"datetime": "2020-01-02T00:00:00Z"}},
                {"type": "Feature", "id": "b", "bbox": [0, -91, 1, 1], "properties": {"start_datetime": "2020-01-01T00:00:00Z", "end_datetime": "2020-01-03T00:00:00Z"}},
                {"type": "Feature", "id": "c", "properties": {}}
            ],
            "links": [{"href": "https://stac.test/search?page=2", "rel": "next", "type": "application/geo+json"}]
        }))
        .unwrap()
    }

    #[test]
    fn members() {
        let item_collection = item_collection();
        assert_eq!(item_collection.entity_type(), Type::ItemCollection);
        assert_eq!(item_collection.all().len(), 3);
        assert_eq!(item_collection.items()[1].id.as_deref(), Some("b"));
        assert!(item_collection.link_with_rel("next").is_some());
        assert_eq!(*item_collection.metadata("numberMatched").unwrap(), json!(3));
    }

    #[test]
    fn unions() {
        let item_collection = item_collection();
        assert_eq!(item_collection.bounding_boxes().len(), 1);
        assert_eq!(
            Vec::<f64>::from(item_collection.bounding_box().unwrap()),
            vec![0., 0., 1., 1.]
        );
        let day = |d| Some(Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap());
        assert_eq!(item_collection.temporal_extent(), Some([day(1), day(3)]));
    }

    #[test]
    fn empty() {
        let item_collection = ItemCollection::default();
        assert!(item_collection.bounding_box().is_none());
        assert!(item_collection.temporal_extent().is_none());
    }

    #[test]
    fn malformed_features() {
        let value = json!({"type": "FeatureCollection", "features": [{"type": "Feature"}, 42]});
        let item_collection = ItemCollection::from_json_value(value.clone()).unwrap();
        assert!(item_collection.all().is_empty());
        assert!(item_collection.bounding_box().is_none());
        assert_eq!(item_collection.to_json_value().unwrap(), value);

        let value = json!({"type": "FeatureCollection"});
        let item_collection = ItemCollection::from_json_value(value.clone()).unwrap();
        assert_eq!(item_collection.to_json_value().unwrap(), value);
    }

    #[test]
    fn round_trip() {
        let item_collection = item_collection();
        let value = item_collection.to_json_value().unwrap();
        assert_eq!(item_collection.to_geojson().unwrap(), value);
        assert_eq!(
            ItemCollection::from_json_value(value.clone())
                .unwrap()
                .to_json_value()
                .unwrap(),
            value
        );
    }
}
