//! Behavior shared by links and assets.

use crate::{
    Bound,
    href::{self, Href},
    media_type::{
        self, BROWSER_IMAGE_TYPES, BROWSER_PROTOCOLS, COG_MEDIA_TYPES, GEOTIFF_MEDIA_TYPES,
    },
};

/// Something that points somewhere with an href and an optional media type.
///
/// Implemented by [Link](crate::Link) and [Asset](crate::Asset).
pub trait Reference {
    /// Returns the href, if there is one.
    fn href(&self) -> Option<&str>;

    /// Returns the media type, if there is one.
    fn media_type(&self) -> Option<&str>;

    /// Returns `true` if the media type is set and is one of the given types.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Link, Reference};
    ///
    /// let link = Link::new("./item.json", "item").with_type("application/geo+json");
    /// assert!(link.is_type(&["APPLICATION/GEO+JSON"]));
    /// assert!(!link.is_type(&["application/json"]));
    /// ```
    fn is_type(&self, types: &[&str]) -> bool {
        media_type::is_media_type(self.media_type(), types, false)
    }

    /// Returns `true` if this is a GeoTIFF, including COGs.
    fn is_geotiff(&self) -> bool {
        self.is_type(GEOTIFF_MEDIA_TYPES)
    }

    /// Returns `true` if this is a cloud-optimized GeoTIFF.
    fn is_cog(&self) -> bool {
        self.is_type(COG_MEDIA_TYPES)
    }

    /// Returns `true` if a web browser could show this as an image.
    ///
    /// The href must not use a scheme other than http(s). Then either the
    /// media type is a browser image type, or (only if `allow_undefined` is
    /// set and there's no media type) the file extension is.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Link, Reference};
    ///
    /// let link = Link::new("https://stac.test/preview.png", "preview");
    /// assert!(!link.can_browser_display_image(false));
    /// assert!(link.can_browser_display_image(true));
    /// let link = link.with_type("image/png");
    /// assert!(link.can_browser_display_image(false));
    /// ```
    fn can_browser_display_image(&self, allow_undefined: bool) -> bool {
        let Some(href) = self.href() else {
            return false;
        };
        let media_type = self.media_type();
        if media_type.is_none() && !allow_undefined {
            return false;
        }
        if let Some(scheme) = href::to_absolute(href, None).scheme() {
            if !BROWSER_PROTOCOLS.contains(&scheme) {
                return false;
            }
        }
        match media_type {
            Some(_) => media_type::is_media_type(media_type, BROWSER_IMAGE_TYPES, false),
            None => href::extension(href)
                .is_some_and(|extension| media_type::is_browser_image_extension(&extension)),
        }
    }
}

impl<'a, T: Reference> Bound<'a, T> {
    /// Resolves the href against the absolute url of the containing entity.
    ///
    /// Without a containing entity, only hrefs that are already absolute are
    /// returned. Missing hrefs (e.g. item asset definitions) never resolve.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{FromJson, Item, Links};
    ///
    /// let item = Item::from_json_value(json!({
    ///     "type": "Feature",
    ///     "links": [
    ///         {"href": "https://stac.test/items/a.json", "rel": "self"},
    ///         {"href": "./b.json", "rel": "sibling"}
    ///     ]
    /// })).unwrap();
    /// let link = item.link_with_rel("sibling").unwrap();
    /// assert_eq!(link.absolute_url().unwrap().to_string(), "https://stac.test/items/b.json");
    /// ```
    pub fn absolute_url(&self) -> Option<Href> {
        let href = self.value().href()?;
        match self.context() {
            Some(context) => Some(href::to_absolute(href, context.absolute_url())),
            None if href.contains("://") => Some(href::to_absolute(href, None)),
            None => None,
        }
    }

    /// Returns whether the resolved href uses http or https.
    ///
    /// Returns `None` if the href can't be resolved at all.
    pub fn is_http(&self) -> Option<bool> {
        let url = self.absolute_url()?;
        Some(
            url.scheme()
                .is_some_and(|scheme| BROWSER_PROTOCOLS.contains(&scheme)),
        )
    }
}
