use crate::{
    Reference, Type,
    json::{take, take_with},
    utils::is_text,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// This object describes a relationship with another entity.
///
/// Fields that are null or don't have the expected type are kept as-is in
/// [Link::additional_fields].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Link {
    /// The actual link in the format of an URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub href: String,

    /// Relationship between the current document and the linked document.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rel: String,

    /// Media type of the referenced entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// A human readable title to be used in rendered displays of the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The HTTP method of the request, usually `GET` or `POST`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// The HTTP headers to be sent for the request to the target resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    /// The HTTP body to be sent to the target resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// If true, the headers/body fields in the `next` link must be merged
    /// into the original request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,

    /// Additional fields on the link.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// An entry in a links array.
///
/// Entries that aren't links are kept as-is so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEntry {
    /// A link.
    Link(Link),

    /// Anything else.
    Other(Value),
}

impl Link {
    /// Creates a new link with the provided href and rel type.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Link;
    ///
    /// let link = Link::new("an-href", "a-rel");
    /// assert_eq!(link.href, "an-href");
    /// assert_eq!(link.rel, "a-rel");
    /// ```
    pub fn new(href: impl ToString, rel: impl ToString) -> Link {
        Link {
            href: href.to_string(),
            rel: rel.to_string(),
            ..Default::default()
        }
    }

    /// Sets the media type of this link.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Link;
    ///
    /// let link = Link::new("an-href", "a-rel").with_type("application/json");
    /// assert_eq!(link.r#type.as_deref(), Some("application/json"));
    /// ```
    pub fn with_type(mut self, r#type: impl ToString) -> Link {
        self.r#type = Some(r#type.to_string());
        self
    }

    /// Sets the method of this link.
    pub fn with_method(mut self, method: impl ToString) -> Link {
        self.method = Some(method.to_string());
        self
    }

    /// Returns [Type::Link].
    pub fn entity_type(&self) -> Type {
        Type::Link
    }

    /// Returns `true` if this is a `preview` link.
    pub fn is_preview(&self) -> bool {
        self.rel == "preview"
    }
}

impl From<Map<String, Value>> for Link {
    fn from(mut object: Map<String, Value>) -> Link {
        Link {
            href: take_with(&mut object, "href", text).unwrap_or_default(),
            rel: take_with(&mut object, "rel", text).unwrap_or_default(),
            r#type: take(&mut object, "type"),
            title: take(&mut object, "title"),
            method: take(&mut object, "method"),
            headers: take(&mut object, "headers"),
            body: take(&mut object, "body"),
            merge: take(&mut object, "merge"),
            additional_fields: object,
        }
    }
}

// Empty strings aren't written back out, so they stay with the extra fields.
fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl Reference for Link {
    fn href(&self) -> Option<&str> {
        if self.href.is_empty() {
            None
        } else {
            Some(&self.href)
        }
    }

    fn media_type(&self) -> Option<&str> {
        self.r#type.as_deref()
    }
}

impl LinkEntry {
    /// Returns the link if this entry is a link with an href.
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            LinkEntry::Link(link) if is_text(Some(&link.href)) => Some(link),
            _ => None,
        }
    }
}

impl From<Link> for LinkEntry {
    fn from(link: Link) -> LinkEntry {
        LinkEntry::Link(link)
    }
}

/// Converts a JSON links array.
///
/// Entries that aren't objects are kept as [LinkEntry::Other]. Anything that
/// isn't an array isn't converted.
pub(crate) fn from_values(value: &Value) -> Option<Vec<LinkEntry>> {
    value
        .as_array()
        .map(|values| values.iter().cloned().map(entry).collect())
}

fn entry(value: Value) -> LinkEntry {
    match value {
        Value::Object(object) => LinkEntry::Link(Link::from(object)),
        value => {
            log::debug!("keeping non-object link entry as-is: {value}");
            LinkEntry::Other(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Link, LinkEntry, from_values};
    use serde_json::json;

    fn links(value: serde_json::Value) -> Option<Vec<LinkEntry>> {
        from_values(&value)
    }

    #[test]
    fn preview() {
        assert!(Link::new("a.png", "preview").is_preview());
        assert!(!Link::new("a.png", "thumbnail").is_preview());
    }

    #[test]
    fn entries() {
        let entries = links(json!([
            {"href": "./item.json", "rel": "item"},
            "not-a-link",
            {"href": 42, "rel": "item"},
            {"rel": "item"}
        ]))
        .unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries[0].as_link().is_some());
        assert_eq!(entries[1], LinkEntry::Other(json!("not-a-link")));
        assert!(matches!(entries[2], LinkEntry::Link(_)));
        assert!(entries[2].as_link().is_none());
        assert!(matches!(entries[3], LinkEntry::Link(_)));
        assert!(entries[3].as_link().is_none());
    }

    #[test]
    fn wrongly_typed_fields() {
        let value = json!({"href": 42, "rel": ["item"], "type": false, "method": 1, "merge": "yes"});
        let link: Link = serde_json::from_value(value.clone()).unwrap();
        assert!(link.href.is_empty());
        assert!(link.rel.is_empty());
        assert!(link.r#type.is_none());
        assert!(link.method.is_none());
        assert!(link.merge.is_none());
        assert_eq!(serde_json::to_value(link).unwrap(), value);
    }

    #[test]
    fn nulls_and_empty_strings() {
        let value = json!({"href": "a", "rel": "", "title": null, "type": null, "body": null});
        let link: Link = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(link.href, "a");
        assert!(link.title.is_none());
        assert!(link.body.is_none());
        assert_eq!(serde_json::to_value(link).unwrap(), value);
    }

    #[test]
    fn not_an_array() {
        assert!(links(json!({"href": "a"})).is_none());
    }

    #[test]
    fn round_trip() {
        let value = json!([
            {"href": "./search", "rel": "search", "type": "application/geo+json", "method": "POST", "body": {"limit": 1}, "merge": false},
            "not-a-link"
        ]);
        let entries = links(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(entries).unwrap(), value);
    }
}
