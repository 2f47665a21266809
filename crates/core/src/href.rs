//! Utilities and structures for working with hrefs.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

const VSICURL_PREFIX: &str = "/vsicurl/";

/// Implemented by all STAC entities, the [SelfHref] trait allows getting
/// and setting an entity's explicit absolute url.
///
/// The explicit href isn't part of the data structure, but it is useful to
/// know where a given STAC entity was read from. If it isn't set, entities
/// fall back to the href of their `self` link.
///
/// # Examples
///
/// ```
/// use stac_entity::{Item, SelfHref};
///
/// let mut item = Item::default();
/// assert!(item.self_href().is_none());
/// item.set_self_href("https://stac.test/item.json");
/// assert_eq!(item.self_href(), Some("https://stac.test/item.json"));
/// ```
pub trait SelfHref {
    /// Gets this entity's explicit href.
    fn self_href(&self) -> Option<&str>;

    /// Returns a mutable reference to this entity's explicit href.
    fn self_href_mut(&mut self) -> &mut Option<String>;

    /// Sets this entity's explicit href.
    fn set_self_href(&mut self, href: impl ToString) {
        *self.self_href_mut() = Some(href.to_string())
    }

    /// Clears this entity's explicit href.
    fn clear_self_href(&mut self) {
        *self.self_href_mut() = None
    }
}

/// An href that has been made absolute, either to a url or to a plain string
/// (e.g. a file path or a GDAL virtual file system path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Href {
    /// A parsed url.
    Url(Url),

    /// Anything that couldn't be parsed as a url.
    String(String),
}

impl Href {
    /// Returns the url scheme, lowercased, if this is a url.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::href::to_absolute;
    ///
    /// assert_eq!(to_absolute("HTTPS://stac.test/a.tif", None).scheme(), Some("https"));
    /// assert_eq!(to_absolute("./a.tif", None).scheme(), None);
    /// ```
    pub fn scheme(&self) -> Option<&str> {
        match self {
            Href::Url(url) => Some(url.scheme()),
            Href::String(_) => None,
        }
    }

    /// Returns this href as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Href::Url(url) => url.as_str(),
            Href::String(s) => s.as_str(),
        }
    }
}

impl Display for Href {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Href> for String {
    fn from(href: Href) -> String {
        match href {
            Href::Url(url) => url.into(),
            Href::String(s) => s,
        }
    }
}

/// Returns `true` if the href is a GDAL virtual file system path.
///
/// These start with `/vsi`, except for `/vsicurl/` which just wraps a url.
///
/// # Examples
///
/// ```
/// use stac_entity::href::is_gdal_vfs_uri;
///
/// assert!(is_gdal_vfs_uri("/vsis3/bucket/key.tif"));
/// assert!(!is_gdal_vfs_uri("/vsicurl/https://stac.test/a.tif"));
/// assert!(!is_gdal_vfs_uri("https://stac.test/vsis3/a.tif"));
/// ```
pub fn is_gdal_vfs_uri(href: &str) -> bool {
    href.starts_with("/vsi") && !href.starts_with(VSICURL_PREFIX)
}

/// Makes an href absolute relative to a base.
///
/// `/vsicurl/` prefixes are removed first. GDAL virtual file system paths are
/// never resolved. A base whose path neither ends with `/` nor `.json` is
/// treated as a directory, so that API endpoints like
/// `https://stac.test/api/v1.0` keep their last path segment.
///
/// # Examples
///
/// ```
/// use stac_entity::href::to_absolute;
///
/// let base = Some("https://stac.test/catalog.json");
/// assert_eq!(to_absolute("./a.gif", base).to_string(), "https://stac.test/a.gif");
/// assert_eq!(to_absolute("./a.gif", Some("https://stac.test/api")).to_string(), "https://stac.test/api/a.gif");
/// assert_eq!(to_absolute("/vsicurl/http://y.test/a", base).to_string(), "http://y.test/a");
/// assert_eq!(to_absolute("./item.json", Some("/a/b/catalog.json")).to_string(), "/a/b/item.json");
/// ```
pub fn to_absolute(href: &str, base: Option<&str>) -> Href {
    let href = href.strip_prefix(VSICURL_PREFIX).unwrap_or(href);
    if let Ok(url) = Url::parse(href) {
        return Href::Url(url);
    }
    match base {
        Some(base) if !is_gdal_vfs_uri(href) => {
            if let Ok(mut base) = Url::parse(base) {
                let path = base.path().to_string();
                if !path.ends_with('/') && !path.ends_with(".json") {
                    base.set_path(&format!("{path}/"));
                }
                base.join(href)
                    .map(Href::Url)
                    .unwrap_or_else(|_| Href::String(href.to_string()))
            } else {
                Href::String(join_path(href, base))
            }
        }
        _ => Href::String(href.to_string()),
    }
}

/// Returns the lowercased file extension of an href, ignoring any query or
/// fragment.
pub(crate) fn extension(href: &str) -> Option<String> {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let file_name = path.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_ascii_lowercase())
    }
}

fn join_path(href: &str, base: &str) -> String {
    if href.starts_with('/') {
        return normalize_path(href);
    }
    let directory = if base.ends_with('/') || !base.ends_with(".json") {
        base.trim_end_matches('/')
    } else {
        base.rsplit_once('/').map(|(dir, _)| dir).unwrap_or_default()
    };
    if directory.is_empty() {
        normalize_path(href)
    } else {
        normalize_path(&format!("{directory}/{href}"))
    }
}

fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    let _ = parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let mut normalized = parts.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if (path.ends_with('/') || path.ends_with("/.")) && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls() {
        let base = Some("https://x.com/catalog.json");
        assert_eq!(
            to_absolute("./example.gif", base).to_string(),
            "https://x.com/example.gif"
        );
        assert_eq!(to_absolute("./", base).to_string(), "https://x.com/");
        assert_eq!(
            to_absolute("/api/example.gif", Some("https://x.com/api")).to_string(),
            "https://x.com/api/example.gif"
        );
        assert_eq!(
            to_absolute("./example.gif", Some("https://x.com/api/")).to_string(),
            "https://x.com/api/example.gif"
        );
        assert_eq!(
            to_absolute("./example.gif", Some("https://x.com/catalog.json/")).to_string(),
            "https://x.com/catalog.json/example.gif"
        );
        assert_eq!(
            to_absolute("http://y.de/test", base).to_string(),
            "http://y.de/test"
        );
        assert_eq!(
            to_absolute("/vsicurl/http://y.de/test", base).to_string(),
            "http://y.de/test"
        );
    }

    #[test]
    fn gdal_vfs_is_not_resolved() {
        let href = to_absolute("/vsis3/bucket/a.tif", Some("https://x.com/catalog.json"));
        assert_eq!(href, Href::String("/vsis3/bucket/a.tif".to_string()));
        assert!(!is_gdal_vfs_uri(""));
        assert!(!is_gdal_vfs_uri("/vsicurl/example"));
    }

    #[test]
    fn no_base() {
        assert_eq!(
            to_absolute("./a.tif", None),
            Href::String("./a.tif".to_string())
        );
    }

    #[test]
    fn path_bases() {
        assert_eq!(
            to_absolute("./item.json", Some("/a/b/catalog.json")).to_string(),
            "/a/b/item.json"
        );
        assert_eq!(
            to_absolute("../item.json", Some("/a/b/catalog.json")).to_string(),
            "/a/item.json"
        );
        assert_eq!(
            to_absolute("./item.json", Some("data/catalog.json")).to_string(),
            "data/item.json"
        );
        assert_eq!(
            to_absolute("item.json", Some("/a/b")).to_string(),
            "/a/b/item.json"
        );
    }

    #[test]
    fn extensions() {
        assert_eq!(extension("https://x.com/image.JPG?x=1"), Some("jpg".to_string()));
        assert_eq!(extension("./image.jpg"), Some("jpg".to_string()));
        assert_eq!(extension("example"), None);
        assert_eq!(extension("https://x.com/"), None);
    }
}
