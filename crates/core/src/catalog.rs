use crate::{
    Asset, Assets, Bound, Context, Link, LinkEntry, Links, Metadata, SelfHref, asset,
    context::to_metadata,
    json::{take, take_with},
    link,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The type field for [Catalogs](Catalog).
pub const CATALOG_TYPE: &str = "Catalog";

/// A STAC Catalog object represents a logical group of other `Catalog`,
/// `Collection`, and `Item` objects.
///
/// These `Item`s can be linked to directly from a `Catalog`, or the `Catalog`
/// can link to other Catalogs (often called sub-catalogs) that contain links
/// to Collections and Items. The division of sub-catalogs is up to the
/// implementor, but is generally done to aid the ease of online browsing by
/// people.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Catalog {
    /// Set to `Catalog` if this Catalog only implements the Catalog spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Identifier for the `Catalog`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A list of references to other documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkEntry>>,

    /// Dictionary of asset objects, each with a unique key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<IndexMap<String, Asset>>,

    /// Asset definitions for the items below this catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_assets: Option<IndexMap<String, Asset>>,

    /// Additional fields not part of the Catalog specification.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

/// Behavior shared by catalogs and collections.
pub trait CatalogLike: Assets {
    /// Returns the `search` link of a STAC API.
    ///
    /// If a method is given, only links with that method are considered,
    /// where links without a method are `GET`. Methods are compared
    /// case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Catalog, CatalogLike, Link, Links};
    ///
    /// let mut catalog = Catalog::new("api");
    /// catalog.push_link(Link::new("https://stac.test/search", "search").with_type("application/geo+json"));
    /// catalog.push_link(
    ///     Link::new("https://stac.test/search", "search")
    ///         .with_type("application/geo+json")
    ///         .with_method("POST"),
    /// );
    /// assert!(catalog.search_link(None).unwrap().method.is_none());
    /// assert_eq!(catalog.search_link(Some("post")).unwrap().method.as_deref(), Some("POST"));
    /// assert!(catalog.search_link(Some("GET")).unwrap().method.is_none());
    /// assert!(catalog.search_link(Some("PUT")).is_none());
    /// ```
    fn search_link(&self, method: Option<&str>) -> Option<Bound<'_, Link>> {
        let mut links = self.stac_links_with_rel("search", true).into_iter();
        match method {
            Some(method) => links.find(|link| {
                link.method
                    .as_deref()
                    .unwrap_or("GET")
                    .eq_ignore_ascii_case(method)
            }),
            None => links.next(),
        }
    }

    /// Returns the `data` link of a STAC API, which points to its
    /// collections.
    fn api_collections_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("data", true)
    }

    /// Returns the `items` link of a STAC API collection.
    fn api_items_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("items", true)
    }

    /// Returns all `child` links.
    fn child_links(&self) -> Vec<Bound<'_, Link>> {
        self.links_with_rels(&["child"])
    }

    /// Returns all `item` links.
    fn item_links(&self) -> Vec<Bound<'_, Link>> {
        self.links_with_rels(&["item"])
    }
}

impl Catalog {
    /// Creates a new `Catalog` with the given `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Catalog;
    ///
    /// let catalog = Catalog::new("an-id");
    /// assert_eq!(catalog.id.as_deref(), Some("an-id"));
    /// assert_eq!(catalog.r#type.as_deref(), Some("Catalog"));
    /// ```
    pub fn new(id: impl ToString) -> Catalog {
        Catalog {
            r#type: Some(CATALOG_TYPE.to_string()),
            id: Some(id.to_string()),
            links: Some(Vec::new()),
            ..Default::default()
        }
    }
}

impl From<Map<String, Value>> for Catalog {
    fn from(mut object: Map<String, Value>) -> Catalog {
        Catalog {
            r#type: take(&mut object, "type"),
            id: take(&mut object, "id"),
            links: take_with(&mut object, "links", link::from_values),
            assets: take_with(&mut object, "assets", asset::from_map),
            item_assets: take_with(&mut object, "item_assets", asset::from_map),
            additional_fields: object,
            self_href: None,
        }
    }
}

impl SelfHref for Catalog {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl Links for Catalog {
    fn link_entries(&self) -> &[LinkEntry] {
        self.links.as_deref().unwrap_or_default()
    }

    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>> {
        &mut self.links
    }

    fn as_context(&self) -> Context<'_> {
        Context::Catalog(self)
    }
}

impl Assets for Catalog {
    fn asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.assets.as_ref()
    }

    fn item_asset_map(&self) -> Option<&IndexMap<String, Asset>> {
        self.item_assets.as_ref()
    }
}

impl CatalogLike for Catalog {}

impl Metadata for Catalog {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        let typed = match field {
            "type" => self.r#type.as_ref().and_then(to_metadata),
            "id" => self.id.as_ref().and_then(to_metadata),
            "links" => self.links.as_ref().and_then(to_metadata),
            "assets" => self.assets.as_ref().and_then(to_metadata),
            "item_assets" => self.item_assets.as_ref().and_then(to_metadata),
            _ => None,
        };
        typed.or_else(|| self.additional_fields.get(field).map(Cow::Borrowed))
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CatalogLike};
    use crate::{Assets, FromJson, Link, Links, Metadata, SelfHref, ToJson, Type};
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_json_value(json!({
            "type": "Catalog",
            "stac_version": "1.0.0",
            "id": "example",
            "description": "An example catalog",
            "links": [
                {"href": "https://stac.test/catalog.json", "rel": "self", "type": "application/json"},
                {"href": "./catalog.json", "rel": "root", "type": "application/json"},
                {"href": "./a/catalog.json", "rel": "child", "type": "application/json"},
                {"href": "./b/collection.json", "rel": "child"},
                {"href": "./item.json", "rel": "item", "type": "application/geo+json"},
                {"href": "./license.html", "rel": "license", "type": "text/html"},
                {"href": "./icon.png", "rel": "icon", "type": "image/png"},
                {"href": "./icon.tif", "rel": "icon", "type": "image/tiff"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn new() {
        let catalog = Catalog::new("an-id");
        assert_eq!(catalog.entity_type(), Type::Catalog);
        assert!(catalog.links().is_empty());
        assert!(catalog.assets().is_empty());
        assert!(catalog.absolute_url().is_none());
    }

    #[test]
    fn absolute_url_from_self_link() {
        let mut catalog = catalog();
        assert_eq!(catalog.absolute_url(), Some("https://stac.test/catalog.json"));
        catalog.set_self_href("https://stac.test/elsewhere/catalog.json");
        let child = catalog.child_links()[0];
        assert_eq!(
            child.absolute_url().unwrap().to_string(),
            "https://stac.test/elsewhere/a/catalog.json"
        );
    }

    #[test]
    fn link_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.child_links().len(), 2);
        assert_eq!(catalog.item_links().len(), 1);
        assert!(catalog.search_link(None).is_none());
        assert!(catalog.api_collections_link().is_none());
        assert!(catalog.api_items_link().is_none());
        assert_eq!(catalog.root_link().unwrap().href, "./catalog.json");
        assert!(catalog.parent_link().is_none());
        assert!(catalog.stac_link_with_rel("license", false).is_none());
        assert_eq!(catalog.links_with_other_rels(&["child", "icon"]).len(), 4);
        assert_eq!(catalog.stac_links_with_rel("child", false).len(), 1);
        assert_eq!(catalog.stac_links_with_rel("child", true).len(), 2);
    }

    #[test]
    fn icons() {
        let catalog = catalog();
        let icons = catalog.icons(true);
        assert_eq!(icons.len(), 1);
        assert_eq!(
            icons[0].absolute_url().unwrap().to_string(),
            "https://stac.test/icon.png"
        );
    }

    #[test]
    fn metadata() {
        let catalog = catalog();
        assert_eq!(*catalog.metadata("id").unwrap(), json!("example"));
        assert_eq!(*catalog.metadata("description").unwrap(), json!("An example catalog"));
        assert!(catalog.metadata("license").is_none());
    }

    #[test]
    fn push_link() {
        let mut catalog = Catalog::default();
        catalog.push_link(Link::new("./child.json", "child"));
        assert_eq!(catalog.child_links().len(), 1);
    }

    #[test]
    fn wrongly_typed_fields() {
        let value = json!({
            "type": "Catalog",
            "id": 123,
            "links": {"href": "./child.json", "rel": "child"},
            "assets": {"thumbnail": "./thumbnail.png"}
        });
        let catalog = Catalog::from_json_value(value.clone()).unwrap();
        assert!(catalog.id.is_none());
        assert_eq!(*catalog.metadata("id").unwrap(), json!(123));
        assert!(catalog.links().is_empty());
        assert!(catalog.assets().is_empty());
        assert_eq!(catalog.to_json_value().unwrap(), value);
    }

    #[test]
    fn round_trip() {
        let value = json!({
            "type": "Catalog",
            "id": "example",
            "links": [{"href": "./child.json", "rel": "child"}, 42],
            "assets": {"thumbnail": {"href": "./thumbnail.png", "type": "image/png"}},
            "conformsTo": ["https://api.stacspec.org/v1.0.0/core"]
        });
        let catalog = Catalog::from_json_value(value.clone()).unwrap();
        assert_eq!(catalog.asset("thumbnail").unwrap().key(), "thumbnail");
        assert_eq!(catalog.to_json_value().unwrap(), value);
    }
}
