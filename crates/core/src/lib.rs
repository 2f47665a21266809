//! Typed views over [SpatioTemporal Asset Catalog (STAC)](https://stacspec.org/)
//! JSON, with the derived queries that STAC clients need.
//!
//! Raw STAC JSON is turned into [Catalog], [Collection], [Item],
//! [ItemCollection] and [CollectionCollection] values, each owning its
//! [Links](Link), [Assets](Asset) and [Bands](Band). Nothing is validated or
//! rewritten on the way in: every field the crate doesn't need to understand
//! is carried along in `additional_fields`, so exporting an entity gives back
//! the JSON it was built from.
//!
//! # Building entities
//!
//! If you know what you have, deserialize it directly:
//!
//! ```
//! use serde_json::json;
//! use stac_entity::{FromJson, Item};
//!
//! let item = Item::from_json_value(json!({
//!     "type": "Feature",
//!     "id": "an-id",
//!     "bbox": [172.91, 1.34, 172.95, 1.36],
//!     "properties": {"datetime": "2020-12-14T18:02:31Z"}
//! })).unwrap();
//! assert!(item.bounding_box().is_some());
//! ```
//!
//! If you don't, let [Entity] figure it out:
//!
//! ```
//! use serde_json::json;
//! use stac_entity::{Entity, Links, Type};
//!
//! let entity = Entity::from_value(json!({"type": "Collection", "id": "an-id"})).unwrap();
//! assert_eq!(entity.entity_type(), Type::Collection);
//! ```
//!
//! # Links, assets and their context
//!
//! Links and assets don't point back to the entity that contains them.
//! Instead, the lookups on [Links] and [Assets] hand out [Bound] views that
//! know their containing entity, which is what relative hrefs are resolved
//! against and where assets inherit metadata from:
//!
//! ```
//! use serde_json::json;
//! use stac_entity::{Assets, FromJson, Item, Metadata, SelfHref};
//!
//! let mut item = Item::from_json_value(json!({
//!     "type": "Feature",
//!     "properties": {"proj:code": "EPSG:4326"},
//!     "assets": {"data": {"href": "./data.tif"}}
//! })).unwrap();
//! item.set_self_href("https://stac.test/items/an-id.json");
//!
//! let asset = item.asset("data").unwrap();
//! assert_eq!(asset.absolute_url().unwrap().to_string(), "https://stac.test/items/data.tif");
//! assert_eq!(*asset.metadata("proj:code").unwrap(), json!("EPSG:4326"));
//! ```

#![warn(
    elided_lifetimes_in_paths,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unused_crate_dependencies,
    unused_extern_crates,
    unused_import_braces
)]

mod asset;
mod band;
mod catalog;
mod collection;
mod collection_collection;
mod context;
pub mod datetime;
mod entity;
mod error;
pub mod geo;
pub mod href;
mod item;
mod item_collection;
mod json;
mod link;
pub mod media_type;
mod reference;
mod stac;
pub mod statistics;
pub mod utils;

pub use {
    asset::{Asset, NO_INHERIT_FIELDS},
    band::{Band, BandRef, Rgb},
    catalog::{CATALOG_TYPE, Catalog, CatalogLike},
    collection::{COLLECTION_TYPE, Collection, Summaries},
    collection_collection::CollectionCollection,
    context::{Bound, Context, Metadata},
    entity::{Entity, Migrate, Type},
    error::Error,
    geo::Bbox,
    href::{Href, SelfHref},
    item::{ITEM_TYPE, Item, Properties},
    item_collection::{ITEM_COLLECTION_TYPE, ItemCollection},
    json::{FromJson, ToJson},
    link::{Link, LinkEntry},
    reference::Reference,
    stac::{AssetScore, Assets, Links, RankOptions, Thumbnail},
    statistics::{NoData, Statistics},
};

#[cfg(test)]
use assert_json_diff as _;

/// Custom [Result](std::result::Result) type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
