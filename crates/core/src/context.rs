//! The relationship between STAC entities and the things they contain.
//!
//! Links, assets and bands don't point back to the entity that owns them.
//! Instead, an owning entity hands out borrowed views ([Bound], or
//! [BandRef](crate::BandRef) for bands) that carry a [Context], and
//! everything that needs the owner (url resolution, metadata inheritance)
//! lives on those views.

use crate::{Catalog, Collection, CollectionCollection, Item, ItemCollection, Links, Type};
use serde::Serialize;
use serde_json::Value;
use std::{borrow::Cow, ops::Deref};

/// Looks up metadata fields.
///
/// Each implementor decides where it looks: items look in their properties,
/// catalogs and collections at their top-level fields, and assets and bands
/// fall back to whatever contains them.
pub trait Metadata {
    /// Returns the value of a metadata field, if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{FromJson, Item, Metadata};
    ///
    /// let item = Item::from_json_value(json!({
    ///     "type": "Feature",
    ///     "properties": {"datetime": "2020-12-14T18:02:31Z"}
    /// })).unwrap();
    /// assert_eq!(*item.metadata("datetime").unwrap(), json!("2020-12-14T18:02:31Z"));
    /// assert!(item.metadata("type").is_none());
    /// ```
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>>;
}

/// Converts a typed field into an owned metadata value.
pub(crate) fn to_metadata<T: Serialize + ?Sized>(value: &T) -> Option<Cow<'static, Value>> {
    serde_json::to_value(value).ok().map(Cow::Owned)
}

/// A borrowed STAC entity that contains links, assets or bands.
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    /// A catalog.
    Catalog(&'a Catalog),

    /// A collection.
    Collection(&'a Collection),

    /// An item.
    Item(&'a Item),

    /// An API item collection.
    ItemCollection(&'a ItemCollection),

    /// An API collection of collections.
    CollectionCollection(&'a CollectionCollection),
}

impl<'a> Context<'a> {
    /// Returns the absolute url of the context entity, if known.
    pub fn absolute_url(&self) -> Option<&'a str> {
        match *self {
            Context::Catalog(catalog) => catalog.absolute_url(),
            Context::Collection(collection) => collection.absolute_url(),
            Context::Item(item) => item.absolute_url(),
            Context::ItemCollection(item_collection) => item_collection.absolute_url(),
            Context::CollectionCollection(collections) => collections.absolute_url(),
        }
    }

    /// Returns the id of the context entity, if it has one.
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Context::Catalog(catalog) => catalog.id.as_deref(),
            Context::Collection(collection) => collection.id.as_deref(),
            Context::Item(item) => item.id.as_deref(),
            Context::ItemCollection(_) | Context::CollectionCollection(_) => None,
        }
    }

    /// Returns `true` if both contexts are the same entity, or if they have
    /// the same type and the same non-empty id.
    pub fn equals(&self, other: &Context<'_>) -> bool {
        if self.entity_type() != other.entity_type() {
            return false;
        }
        std::ptr::eq(self.as_ptr(), other.as_ptr())
            || self
                .id()
                .is_some_and(|id| !id.is_empty() && other.id() == Some(id))
    }

    fn as_ptr(&self) -> *const () {
        match *self {
            Context::Catalog(catalog) => std::ptr::from_ref(catalog).cast(),
            Context::Collection(collection) => std::ptr::from_ref(collection).cast(),
            Context::Item(item) => std::ptr::from_ref(item).cast(),
            Context::ItemCollection(item_collection) => std::ptr::from_ref(item_collection).cast(),
            Context::CollectionCollection(collections) => std::ptr::from_ref(collections).cast(),
        }
    }

    /// Returns the type of the context entity.
    pub fn entity_type(&self) -> Type {
        match self {
            Context::Catalog(_) => Type::Catalog,
            Context::Collection(_) => Type::Collection,
            Context::Item(_) => Type::Item,
            Context::ItemCollection(_) => Type::ItemCollection,
            Context::CollectionCollection(_) => Type::CollectionCollection,
        }
    }
}

impl Metadata for Context<'_> {
    fn metadata(&self, field: &str) -> Option<Cow<'_, Value>> {
        match self {
            Context::Catalog(catalog) => catalog.metadata(field),
            Context::Collection(collection) => collection.metadata(field),
            Context::Item(item) => item.metadata(field),
            Context::ItemCollection(item_collection) => item_collection.metadata(field),
            Context::CollectionCollection(collections) => collections.metadata(field),
        }
    }
}

/// A borrowed link or asset together with the entity that contains it.
///
/// Derefs to the wrapped value, so all of its fields and context-free
/// methods are available directly.
#[derive(Debug)]
pub struct Bound<'a, T> {
    value: &'a T,
    context: Option<Context<'a>>,
}

impl<'a, T> Bound<'a, T> {
    /// Binds a value to its containing entity.
    pub fn new(value: &'a T, context: Context<'a>) -> Bound<'a, T> {
        Bound {
            value,
            context: Some(context),
        }
    }

    /// Creates a view without a containing entity.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Bound, Link};
    ///
    /// let link = Link::new("./item.json", "item");
    /// let link = Bound::standalone(&link);
    /// assert!(link.absolute_url().is_none());
    /// ```
    pub fn standalone(value: &'a T) -> Bound<'a, T> {
        Bound {
            value,
            context: None,
        }
    }

    /// Returns the wrapped value with the full borrow lifetime.
    pub fn value(&self) -> &'a T {
        self.value
    }

    /// Returns the containing entity, if any.
    pub fn context(&self) -> Option<Context<'a>> {
        self.context
    }
}

impl<T> Clone for Bound<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Bound<'_, T> {}

impl<T> Deref for Bound<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

impl<T> PartialEq for Bound<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.value, other.value)
    }
}
