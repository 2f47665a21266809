//! Media types that STAC clients care about.

/// The GeoJSON media type.
pub const GEOJSON_MEDIA_TYPE: &str = "application/geo+json";

/// All STAC media types (JSON + GeoJSON).
pub const STAC_MEDIA_TYPES: &[&str] = &["application/json", GEOJSON_MEDIA_TYPE, "text/json"];

/// Image media types that web browsers can show natively.
pub const BROWSER_IMAGE_TYPES: &[&str] = &[
    "image/gif",
    "image/jpeg",
    "image/apng",
    "image/png",
    "image/webp",
];

/// Cloud-optimized GeoTIFF media types.
pub const COG_MEDIA_TYPES: &[&str] = &[
    "image/tiff; application=geotiff; profile=cloud-optimized",
    "image/vnd.stac.geotiff; cloud-optimized=true",
];

/// GeoTIFF media types, including the COG media types.
pub const GEOTIFF_MEDIA_TYPES: &[&str] = &[
    "application/geotiff",
    "image/tiff; application=geotiff",
    "image/vnd.stac.geotiff",
    "image/tiff; application=geotiff; profile=cloud-optimized",
    "image/vnd.stac.geotiff; cloud-optimized=true",
];

/// Browser image types and GeoTIFF media types combined.
pub const IMAGE_MEDIA_TYPES: &[&str] = &[
    "image/gif",
    "image/jpeg",
    "image/apng",
    "image/png",
    "image/webp",
    "application/geotiff",
    "image/tiff; application=geotiff",
    "image/vnd.stac.geotiff",
    "image/tiff; application=geotiff; profile=cloud-optimized",
    "image/vnd.stac.geotiff; cloud-optimized=true",
];

/// URL schemes that browsers can load images from.
pub const BROWSER_PROTOCOLS: &[&str] = &["http", "https"];

/// Returns `true` if the media type is one of the allowed types.
///
/// The comparison is case-insensitive. A missing media type only matches if
/// `allow_undefined` is set.
///
/// # Examples
///
/// ```
/// use stac_entity::media_type::{GEOTIFF_MEDIA_TYPES, is_media_type};
///
/// assert!(is_media_type(Some("image/tiff; application=geotiff"), GEOTIFF_MEDIA_TYPES, false));
/// assert!(!is_media_type(Some("image/tiff"), GEOTIFF_MEDIA_TYPES, false));
/// assert!(is_media_type(None, GEOTIFF_MEDIA_TYPES, true));
/// ```
pub fn is_media_type(r#type: Option<&str>, allowed: &[&str], allow_undefined: bool) -> bool {
    match r#type {
        None => allow_undefined,
        Some(t) => allowed.iter().any(|a| a.eq_ignore_ascii_case(t)),
    }
}

/// Returns `true` if the media type is JSON or GeoJSON.
pub fn is_stac_media_type(r#type: Option<&str>, allow_undefined: bool) -> bool {
    is_media_type(r#type, STAC_MEDIA_TYPES, allow_undefined)
}

/// Returns `true` if browsers can show images with this file extension.
pub(crate) fn is_browser_image_extension(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    extension == "jpg"
        || BROWSER_IMAGE_TYPES
            .iter()
            .any(|t| t.strip_prefix("image/") == Some(extension.as_str()))
}
