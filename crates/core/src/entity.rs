use crate::{
    Asset, AssetScore, Assets, Bbox, Bound, Catalog, Collection, CollectionCollection, Context,
    Error, FromJson, Item, ItemCollection, LinkEntry, Links, RankOptions, Result, SelfHref,
    Thumbnail, ToJson, collection::COLLECTION_TYPE, datetime::Interval,
    item::ITEM_TYPE, item_collection::ITEM_COLLECTION_TYPE,
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};

/// The kinds of objects this crate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// A [Catalog].
    Catalog,

    /// A [Collection].
    Collection,

    /// An [Item].
    Item,

    /// An [ItemCollection].
    ItemCollection,

    /// A [CollectionCollection].
    CollectionCollection,

    /// An [Asset](crate::Asset).
    Asset,

    /// A [Link](crate::Link).
    Link,

    /// A [Band](crate::Band).
    Band,
}

/// Migrates raw STAC JSON to the version this crate understands, before any
/// entity is built from it.
///
/// Closures can be used as migrations.
///
/// # Examples
///
/// ```
/// use serde_json::{Value, json};
/// use stac_entity::{Entity, Links, Result, Type};
///
/// let migrate = |mut value: Value| -> Result<Value> {
///     value["type"] = "Collection".into();
///     Ok(value)
/// };
/// let entity = Entity::from_value_with_migration(json!({"id": "an-id"}), &migrate).unwrap();
/// assert_eq!(entity.entity_type(), Type::Collection);
/// ```
pub trait Migrate {
    /// Migrates a value.
    fn migrate(&self, value: Value) -> Result<Value>;
}

impl<F> Migrate for F
where
    F: Fn(Value) -> Result<Value>,
{
    fn migrate(&self, value: Value) -> Result<Value> {
        self(value)
    }
}

/// Any STAC entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    /// A catalog.
    Catalog(Box<Catalog>),

    /// A collection.
    Collection(Box<Collection>),

    /// An item.
    Item(Box<Item>),

    /// An API item collection.
    ItemCollection(Box<ItemCollection>),

    /// An API collection of collections.
    CollectionCollection(Box<CollectionCollection>),
}

impl Entity {
    /// Builds the matching entity from raw STAC JSON.
    ///
    /// `Feature` is an item and `FeatureCollection` an item collection.
    /// `Collection`, or anything with both `extent` and `license`, is a
    /// collection. Something without a type but with a `collections` array
    /// is a collection of collections. Everything else is a catalog.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Entity, Links, Type};
    ///
    /// let entity = Entity::from_value(json!({"type": "Feature", "properties": {}})).unwrap();
    /// assert_eq!(entity.entity_type(), Type::Item);
    /// let entity = Entity::from_value(json!({"id": "x", "extent": {}, "license": "MIT"})).unwrap();
    /// assert_eq!(entity.entity_type(), Type::Collection);
    /// let entity = Entity::from_value(json!({"collections": []})).unwrap();
    /// assert_eq!(entity.entity_type(), Type::CollectionCollection);
    /// let entity = Entity::from_value(json!({"id": "x"})).unwrap();
    /// assert_eq!(entity.entity_type(), Type::Catalog);
    /// assert!(Entity::from_value(json!("x")).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Entity> {
        if !value.is_object() {
            return Err(Error::NotAnObject(value));
        }
        let type_field = value.get("type").and_then(Value::as_str);
        let entity_type = match type_field {
            Some(ITEM_TYPE) => Type::Item,
            Some(ITEM_COLLECTION_TYPE) => Type::ItemCollection,
            Some(COLLECTION_TYPE) => Type::Collection,
            _ if value.get("extent").is_some() && value.get("license").is_some() => {
                Type::Collection
            }
            None if value.get("collections").is_some_and(Value::is_array) => {
                Type::CollectionCollection
            }
            _ => Type::Catalog,
        };
        log::debug!("building {entity_type} from a value with type {type_field:?}");
        let entity = match entity_type {
            Type::Item => Entity::Item(Box::new(Item::from_json_value(value)?)),
            Type::ItemCollection => {
                Entity::ItemCollection(Box::new(ItemCollection::from_json_value(value)?))
            }
            Type::Collection => Entity::Collection(Box::new(Collection::from_json_value(value)?)),
            Type::CollectionCollection => Entity::CollectionCollection(Box::new(
                CollectionCollection::from_json_value(value)?,
            )),
            _ => Entity::Catalog(Box::new(Catalog::from_json_value(value)?)),
        };
        Ok(entity)
    }

    /// Migrates the value, then builds the matching entity.
    pub fn from_value_with_migration(value: Value, migrate: &impl Migrate) -> Result<Entity> {
        let value = migrate.migrate(value)?;
        Entity::from_value(value)
    }

    /// Returns the id of this entity, if it has one.
    pub fn id(&self) -> Option<&str> {
        self.as_context().id()
    }

    /// Returns the overall bounding box.
    ///
    /// Catalogs don't have one. Item collections and collections of
    /// collections return the union of their members' boxes.
    pub fn bounding_box(&self) -> Option<Bbox> {
        match self {
            Entity::Catalog(_) => None,
            Entity::Collection(collection) => collection.bounding_box(),
            Entity::Item(item) => item.bounding_box(),
            Entity::ItemCollection(item_collection) => item_collection.bounding_box(),
            Entity::CollectionCollection(collections) => collections.bounding_box(),
        }
    }

    /// Returns all bounding boxes.
    pub fn bounding_boxes(&self) -> Vec<Bbox> {
        match self {
            Entity::Catalog(_) => Vec::new(),
            Entity::Collection(collection) => collection.bounding_boxes(),
            Entity::Item(item) => item.bounding_boxes(),
            Entity::ItemCollection(item_collection) => item_collection.bounding_boxes(),
            Entity::CollectionCollection(collections) => collections.bounding_boxes(),
        }
    }

    /// Returns the overall temporal extent.
    pub fn temporal_extent(&self) -> Option<Interval> {
        match self {
            Entity::Catalog(_) => None,
            Entity::Collection(collection) => collection.temporal_extent(),
            Entity::Item(item) => item.temporal_extent(),
            Entity::ItemCollection(item_collection) => item_collection.temporal_extent(),
            Entity::CollectionCollection(collections) => collections.temporal_extent(),
        }
    }

    /// Returns all temporal extents.
    pub fn temporal_extents(&self) -> Vec<Interval> {
        match self {
            Entity::Catalog(_) => Vec::new(),
            Entity::Collection(collection) => collection.temporal_extents(),
            Entity::Item(item) => item.temporal_extents(),
            Entity::ItemCollection(item_collection) => item_collection.temporal_extents(),
            Entity::CollectionCollection(collections) => collections.temporal_extents(),
        }
    }

    /// Returns this entity as GeoJSON, or `None` if it has no GeoJSON
    /// representation.
    pub fn to_geojson(&self) -> Result<Option<Value>> {
        match self {
            Entity::Catalog(_) => Ok(None),
            Entity::Collection(collection) => collection
                .to_geojson()
                .map(|feature| serde_json::to_value(feature).map_err(Error::from))
                .transpose(),
            Entity::Item(item) => item.to_geojson().map(Some),
            Entity::ItemCollection(item_collection) => item_collection.to_geojson().map(Some),
            Entity::CollectionCollection(collections) => {
                serde_json::to_value(collections.to_geojson())
                    .map(Some)
                    .map_err(Error::from)
            }
        }
    }

    /// Returns the thumbnails of this entity.
    ///
    /// API collections don't have any.
    pub fn thumbnails(&self, browser_only: bool, prefer: Option<&str>) -> Vec<Thumbnail<'_>> {
        match self {
            Entity::Catalog(catalog) => catalog.thumbnails(browser_only, prefer),
            Entity::Collection(collection) => collection.thumbnails(browser_only, prefer),
            Entity::Item(item) => item.thumbnails(browser_only, prefer),
            Entity::ItemCollection(_) | Entity::CollectionCollection(_) => Vec::new(),
        }
    }

    /// Ranks the GeoTIFF assets of this entity.
    ///
    /// API collections don't have any.
    pub fn rank_geotiffs(&self, options: &RankOptions) -> Vec<AssetScore<'_>> {
        match self {
            Entity::Catalog(catalog) => catalog.rank_geotiffs(options),
            Entity::Collection(collection) => collection.rank_geotiffs(options),
            Entity::Item(item) => item.rank_geotiffs(options),
            Entity::ItemCollection(_) | Entity::CollectionCollection(_) => Vec::new(),
        }
    }

    /// Returns the best GeoTIFF asset of this entity.
    pub fn default_geotiff(&self, http_only: bool, cog_only: bool) -> Option<Bound<'_, Asset>> {
        match self {
            Entity::Catalog(catalog) => catalog.default_geotiff(http_only, cog_only),
            Entity::Collection(collection) => collection.default_geotiff(http_only, cog_only),
            Entity::Item(item) => item.default_geotiff(http_only, cog_only),
            Entity::ItemCollection(_) | Entity::CollectionCollection(_) => None,
        }
    }
}

impl SelfHref for Entity {
    fn self_href(&self) -> Option<&str> {
        match self {
            Entity::Catalog(catalog) => catalog.self_href(),
            Entity::Collection(collection) => collection.self_href(),
            Entity::Item(item) => item.self_href(),
            Entity::ItemCollection(item_collection) => item_collection.self_href(),
            Entity::CollectionCollection(collections) => collections.self_href(),
        }
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        match self {
            Entity::Catalog(catalog) => catalog.self_href_mut(),
            Entity::Collection(collection) => collection.self_href_mut(),
            Entity::Item(item) => item.self_href_mut(),
            Entity::ItemCollection(item_collection) => item_collection.self_href_mut(),
            Entity::CollectionCollection(collections) => collections.self_href_mut(),
        }
    }
}

impl Links for Entity {
    fn link_entries(&self) -> &[LinkEntry] {
        match self {
            Entity::Catalog(catalog) => catalog.link_entries(),
            Entity::Collection(collection) => collection.link_entries(),
            Entity::Item(item) => item.link_entries(),
            Entity::ItemCollection(item_collection) => item_collection.link_entries(),
            Entity::CollectionCollection(collections) => collections.link_entries(),
        }
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        match self {
            Entity::Catalog(catalog) => catalog.links_mut(),
            Entity::Collection(collection) => collection.links_mut(),
            Entity::Item(item) => item.links_mut(),
            Entity::ItemCollection(item_collection) => item_collection.links_mut(),
            Entity::CollectionCollection(collections) => collections.links_mut(),
        }
    }

    fn as_context(&self) -> Context<'_> {
        match self {
            Entity::Catalog(catalog) => catalog.as_context(),
            Entity::Collection(collection) => collection.as_context(),
            Entity::Item(item) => item.as_context(),
            Entity::ItemCollection(item_collection) => item_collection.as_context(),
            Entity::CollectionCollection(collections) => collections.as_context(),
        }
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Entity::from_value(value).map_err(D::Error::custom)
    }
}

impl TryFrom<Value> for Entity {
    type Error = Error;

    fn try_from(value: Value) -> Result<Entity> {
        Entity::from_value(value)
    }
}

impl TryFrom<Entity> for Value {
    type Error = Error;

    fn try_from(entity: Entity) -> Result<Value> {
        entity.to_json_value()
    }
}

impl From<Catalog> for Entity {
    fn from(catalog: Catalog) -> Entity {
        Entity::Catalog(Box::new(catalog))
    }
}

impl From<Collection> for Entity {
    fn from(collection: Collection) -> Entity {
        Entity::Collection(Box::new(collection))
    }
}

impl From<Item> for Entity {
    fn from(item: Item) -> Entity {
        Entity::Item(Box::new(item))
    }
}

impl From<ItemCollection> for Entity {
    fn from(item_collection: ItemCollection) -> Entity {
        Entity::ItemCollection(Box::new(item_collection))
    }
}

impl From<CollectionCollection> for Entity {
    fn from(collections: CollectionCollection) -> Entity {
        Entity::CollectionCollection(Box::new(collections))
    }
}

impl Type {
    /// Returns this type's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Catalog => "Catalog",
            Type::Collection => "Collection",
            Type::Item => "Item",
            Type::ItemCollection => "ItemCollection",
            Type::CollectionCollection => "CollectionCollection",
            Type::Asset => "Asset",
            Type::Link => "Link",
            Type::Band => "Band",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Type> {
        match s {
            "Catalog" => Ok(Type::Catalog),
            "Collection" => Ok(Type::Collection),
            "Item" => Ok(Type::Item),
            "ItemCollection" => Ok(Type::ItemCollection),
            "CollectionCollection" => Ok(Type::CollectionCollection),
            "Asset" => Ok(Type::Asset),
            "Link" => Ok(Type::Link),
            "Band" => Ok(Type::Band),
            _ => Err(Error::UnknownType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, Type};
    use crate::{Error, Links, SelfHref, ToJson};
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"type": "Feature"}), Type::Item)]
    #[case(json!({"type": "FeatureCollection", "features": []}), Type::ItemCollection)]
    #[case(json!({"type": "Collection"}), Type::Collection)]
    #[case(json!({"extent": {}, "license": "MIT"}), Type::Collection)]
    #[case(json!({"type": "Catalog", "extent": {}, "license": "MIT"}), Type::Collection)]
    #[case(json!({"extent": {}}), Type::Catalog)]
    #[case(json!({"collections": []}), Type::CollectionCollection)]
    #[case(json!({"type": "Catalog", "collections": []}), Type::Catalog)]
    #[case(json!({"collections": {}}), Type::Catalog)]
    #[case(json!({}), Type::Catalog)]
    fn dispatch(#[case] value: Value, #[case] expected: Type) {
        let entity = Entity::from_value(value.clone()).unwrap();
        assert_eq!(entity.entity_type(), expected);
        assert_eq!(entity.to_json_value().unwrap(), value);
    }

    #[rstest]
    #[case(json!({"type": "Feature", "properties": {}, "assets": {"a": {"href": "x.tif", "roles": "data"}}}))]
    #[case(json!({"type": "Feature", "id": ["a"], "properties": [], "links": {}, "assets": []}))]
    #[case(json!({"type": "Catalog", "id": 123, "links": [{"href": "a", "rel": "self", "title": null}]}))]
    #[case(json!({"type": "Collection", "id": null, "assets": {"a": {"href": "x.tif", "type": null}}}))]
    #[case(json!({"type": "FeatureCollection", "features": [{"type": "Feature"}, "b"], "links": null}))]
    #[case(json!({"collections": [{"type": "Collection"}, 1], "links": [null, 2]}))]
    fn wrong_types_and_nulls_round_trip(#[case] value: Value) {
        let entity = Entity::from_value(value.clone()).unwrap();
        assert_eq!(entity.to_json_value().unwrap(), value);
    }

    #[test]
    fn wrongly_typed_id() {
        let entity = Entity::from_value(json!({"type": "Catalog", "id": 123})).unwrap();
        assert_eq!(entity.entity_type(), Type::Catalog);
        assert!(entity.id().is_none());
        assert!(entity.links().is_empty());
    }

    #[test]
    fn not_an_object() {
        assert!(matches!(
            Entity::from_value(json!([])).unwrap_err(),
            Error::NotAnObject(_)
        ));
    }

    #[test]
    fn migration_errors_propagate() {
        let migrate =
            |_: Value| -> crate::Result<Value> { Err(Error::Migrate("unsupported version".to_string())) };
        assert!(matches!(
            Entity::from_value_with_migration(json!({}), &migrate).unwrap_err(),
            Error::Migrate(_)
        ));
    }

    #[test]
    fn deserialize() {
        let entity: Entity = serde_json::from_value(json!({"type": "Feature", "id": "an-id"})).unwrap();
        assert_eq!(entity.id(), Some("an-id"));
    }

    #[test]
    fn self_href() {
        let mut entity = Entity::from_value(json!({"type": "Catalog", "id": "a"})).unwrap();
        entity.set_self_href("https://stac.test/catalog.json");
        assert_eq!(entity.absolute_url(), Some("https://stac.test/catalog.json"));
    }

    #[test]
    fn geojson() {
        let catalog = Entity::from_value(json!({"type": "Catalog"})).unwrap();
        assert!(catalog.to_geojson().unwrap().is_none());
        let item = Entity::from_value(json!({"type": "Feature", "properties": {}})).unwrap();
        assert_eq!(item.to_geojson().unwrap().unwrap()["type"], "Feature");
        let collections = Entity::from_value(json!({"collections": []})).unwrap();
        assert_eq!(
            collections.to_geojson().unwrap().unwrap(),
            json!({"type": "FeatureCollection", "features": []})
        );
    }

    #[test]
    fn types() {
        for t in [
            Type::Catalog,
            Type::Collection,
            Type::Item,
            Type::ItemCollection,
            Type::CollectionCollection,
            Type::Asset,
            Type::Link,
            Type::Band,
        ] {
            assert_eq!(t.to_string().parse::<Type>().unwrap(), t);
        }
        assert!("Feature".parse::<Type>().is_err());
    }
}
