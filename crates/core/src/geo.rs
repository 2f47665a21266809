//! Bounding boxes and GeoJSON helpers.

use crate::{Error, Result, utils::clamp};
use geojson::{Feature, Geometry, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

const EPSILON: f64 = 1e-6;

/// A two- or three-dimensional bounding box.
///
/// Three-dimensional boxes are laid out as `[west, south, min_z, east, north,
/// max_z]`. The west bound may be larger than the east bound, which means the
/// box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bbox {
    /// A two-dimensional bounding box.
    TwoD([f64; 4]),

    /// A three-dimensional bounding box.
    ThreeD([f64; 6]),
}

impl Bbox {
    /// Creates a new two-dimensional bounding box.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Bbox;
    ///
    /// let bbox = Bbox::new(-180., -90., 180., 90.);
    /// assert!(bbox.is_valid());
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Bbox {
        Bbox::TwoD([west, south, east, north])
    }

    /// Returns the western bound.
    pub fn west(&self) -> f64 {
        match self {
            Bbox::TwoD(bbox) => bbox[0],
            Bbox::ThreeD(bbox) => bbox[0],
        }
    }

    /// Returns the southern bound.
    pub fn south(&self) -> f64 {
        match self {
            Bbox::TwoD(bbox) => bbox[1],
            Bbox::ThreeD(bbox) => bbox[1],
        }
    }

    /// Returns the eastern bound.
    pub fn east(&self) -> f64 {
        match self {
            Bbox::TwoD(bbox) => bbox[2],
            Bbox::ThreeD(bbox) => bbox[3],
        }
    }

    /// Returns the northern bound.
    pub fn north(&self) -> f64 {
        match self {
            Bbox::TwoD(bbox) => bbox[3],
            Bbox::ThreeD(bbox) => bbox[4],
        }
    }

    /// Returns `true` if this bounding box crosses the antimeridian.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Bbox;
    ///
    /// assert!(Bbox::new(179., -1., -179., 1.).is_antimeridian());
    /// assert!(!Bbox::new(-179., -1., 179., 1.).is_antimeridian());
    /// ```
    pub fn is_antimeridian(&self) -> bool {
        self.west() > self.east()
    }

    /// Returns `true` if all bounds are WGS84 coordinates and north is not
    /// below south.
    pub fn is_valid(&self) -> bool {
        let values: &[f64] = match self {
            Bbox::TwoD(bbox) => bbox,
            Bbox::ThreeD(bbox) => bbox,
        };
        values.iter().all(|n| n.is_finite())
            && (-180.0..=180.0).contains(&self.west())
            && (-180.0..=180.0).contains(&self.east())
            && (-90.0..=90.0).contains(&self.south())
            && (-90.0..=90.0).contains(&self.north())
            && self.north() >= self.south()
    }

    /// Drops the third dimension, if any.
    pub fn to_two_d(self) -> Bbox {
        match self {
            Bbox::TwoD(_) => self,
            Bbox::ThreeD([west, south, _, east, north, _]) => Bbox::TwoD([west, south, east, north]),
        }
    }

    /// Splits a bounding box that crosses the antimeridian into its eastern
    /// and western parts.
    ///
    /// Boxes that don't cross the antimeridian are returned as-is (in two
    /// dimensions).
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::Bbox;
    ///
    /// let parts = Bbox::new(179., -1., -179., 1.).split_antimeridian();
    /// assert_eq!(parts, vec![Bbox::new(-180., -1., -179., 1.), Bbox::new(179., -1., 180., 1.)]);
    /// ```
    pub fn split_antimeridian(self) -> Vec<Bbox> {
        let bbox = self.to_two_d();
        if bbox.is_antimeridian() {
            vec![
                Bbox::new(-180.0, bbox.south(), bbox.east(), bbox.north()),
                Bbox::new(bbox.west(), bbox.south(), 180.0, bbox.north()),
            ]
        } else {
            vec![bbox]
        }
    }

    /// Returns the center point of this bounding box.
    ///
    /// See [center_of_bounding_box].
    pub fn center(&self) -> Vec<f64> {
        let mut east = self.east();
        if self.is_antimeridian() {
            east += 360.0;
        }
        let mut x = (self.west() + east) / 2.0;
        if x > 180.0 {
            x -= 360.0;
        }
        let y = (self.south() + self.north()) / 2.0;
        match self {
            Bbox::TwoD(_) => vec![x, y],
            Bbox::ThreeD(bbox) => vec![x, y, (bbox[2] + bbox[5]) / 2.0],
        }
    }

    fn ring(&self) -> Vec<Vec<f64>> {
        let (west, south, east, north) = (self.west(), self.south(), self.east(), self.north());
        vec![
            vec![west, north],
            vec![west, south],
            vec![east, south],
            vec![east, north],
            vec![west, north],
        ]
    }
}

impl TryFrom<Vec<f64>> for Bbox {
    type Error = Error;

    fn try_from(value: Vec<f64>) -> Result<Bbox> {
        let bbox = match value.as_slice() {
            [a, b, c, d] => Bbox::TwoD([*a, *b, *c, *d]),
            [a, b, c, d, e, f] => Bbox::ThreeD([*a, *b, *c, *d, *e, *f]),
            _ => return Err(Error::InvalidBbox(value)),
        };
        if bbox.is_valid() {
            Ok(bbox)
        } else {
            Err(Error::InvalidBbox(value))
        }
    }
}

impl From<Bbox> for Vec<f64> {
    fn from(bbox: Bbox) -> Vec<f64> {
        match bbox {
            Bbox::TwoD(bbox) => bbox.to_vec(),
            Bbox::ThreeD(bbox) => bbox.to_vec(),
        }
    }
}

/// Normalizes a JSON value into a valid bounding box.
///
/// Coordinates that are out of range by floating point noise are clamped to
/// the boundary. Three-dimensional boxes are reduced to two dimensions unless
/// `three_d` is set. Anything that can't be turned into a valid box is `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::{Bbox, geo::ensure_bounding_box};
///
/// assert_eq!(
///     ensure_bounding_box(&json!([-180.0000000000001, -90, 180, 90]), false),
///     Some(Bbox::new(-180., -90., 180., 90.))
/// );
/// assert_eq!(
///     ensure_bounding_box(&json!([172.91, 1.34, 0, 172.95, 1.36, 10]), false),
///     Some(Bbox::new(172.91, 1.34, 172.95, 1.36))
/// );
/// assert!(ensure_bounding_box(&json!([-180, -91, 180, 90]), false).is_none());
/// ```
pub fn ensure_bounding_box(value: &Value, three_d: bool) -> Option<Bbox> {
    let bbox = parse_bounding_box(value, EPSILON)?;
    if three_d { Some(bbox) } else { Some(bbox.to_two_d()) }
}

/// Returns `true` if the value is a valid bounding box, without any clamping.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::geo::is_bounding_box;
///
/// assert!(is_bounding_box(&json!([-180, -90, 180, 90])));
/// assert!(is_bounding_box(&json!([179, -1, -179, 1])));
/// assert!(!is_bounding_box(&json!([360, -90, 0, 90])));
/// ```
pub fn is_bounding_box(value: &Value) -> bool {
    parse_bounding_box(value, 0.0).is_some()
}

/// Returns `true` if the value is a valid bounding box crossing the
/// antimeridian.
pub fn is_antimeridian_bounding_box(value: &Value) -> bool {
    ensure_bounding_box(value, false).is_some_and(|bbox| bbox.is_antimeridian())
}

/// Computes the union of bounding boxes.
///
/// Invalid boxes and the third dimension are ignored. Returns `None` if no
/// valid box was given.
///
/// # Examples
///
/// ```
/// use stac_entity::{Bbox, geo::union_bounding_box};
///
/// let a = Bbox::ThreeD([172.91, 1.34, 0., 172.95, 1.36, 10.]);
/// let b = Bbox::new(-180., -85., 180., 85.);
/// assert_eq!(union_bounding_box(&[a, b]), Some(b));
/// assert_eq!(union_bounding_box(&[]), None);
/// ```
pub fn union_bounding_box<'a>(bboxes: impl IntoIterator<Item = &'a Bbox>) -> Option<Bbox> {
    let mut union: [f64; 4] = [180.0, 90.0, -180.0, -90.0];
    for bbox in bboxes {
        if !bbox.is_valid() {
            log::debug!("skipping invalid bbox in union: {bbox:?}");
            continue;
        }
        union[0] = union[0].min(bbox.west());
        union[1] = union[1].min(bbox.south());
        union[2] = union[2].max(bbox.east());
        union[3] = union[3].max(bbox.north());
    }
    let union = Bbox::TwoD(union);
    if union.is_valid() { Some(union) } else { None }
}

/// Computes the center point of a bounding box.
///
/// For boxes crossing the antimeridian the longitude is averaged across the
/// wrap-around. Three-dimensional boxes yield a three-dimensional point.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::geo::center_of_bounding_box;
///
/// assert_eq!(center_of_bounding_box(&json!([170, 20, -160, 30])), Some(vec![-175., 25.]));
/// assert_eq!(center_of_bounding_box(&json!([0, 0, -10, 0, 0, 30])), Some(vec![0., 0., 10.]));
/// assert_eq!(center_of_bounding_box(&json!([])), None);
/// ```
pub fn center_of_bounding_box(value: &Value) -> Option<Vec<f64>> {
    ensure_bounding_box(value, true).map(|bbox| bbox.center())
}

/// Converts bounding boxes into a single GeoJSON feature.
///
/// Boxes crossing the antimeridian are split in two. One polygon yields a
/// Polygon geometry, more yield a MultiPolygon. Returns `None` if there are
/// no valid boxes.
///
/// # Examples
///
/// ```
/// use stac_entity::{Bbox, geo::to_geojson};
///
/// let feature = to_geojson(&[Bbox::new(179., -1., -179., 1.)]).unwrap();
/// let geometry = feature.geometry.unwrap();
/// assert!(matches!(geometry.value, geojson::Value::MultiPolygon(_)));
/// ```
pub fn to_geojson(bboxes: &[Bbox]) -> Option<Feature> {
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = bboxes
        .iter()
        .filter(|bbox| bbox.is_valid())
        .flat_map(|bbox| bbox.split_antimeridian())
        .map(|bbox| vec![bbox.ring()])
        .collect();
    let value = match polygons.len() {
        0 => return None,
        1 => geojson::Value::Polygon(polygons.remove(0)),
        _ => geojson::Value::MultiPolygon(polygons),
    };
    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    })
}

/// Clamps all coordinates of a GeoJSON object into the valid longitude and
/// latitude ranges, in place.
///
/// Features, feature collections, geometry collections and `bbox` members
/// are all handled. Anything that isn't a GeoJSON object is left alone.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::geo::fix_geojson;
///
/// let mut value = json!({
///     "type": "Feature",
///     "bbox": [-180.5, -90, 180, 90.1],
///     "geometry": {"type": "Point", "coordinates": [181, 45]},
/// });
/// fix_geojson(&mut value);
/// assert_eq!(value["geometry"]["coordinates"], json!([180.0, 45]));
/// assert_eq!(value["bbox"], json!([-180.0, -90, 180, 90.0]));
/// ```
pub fn fix_geojson(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    let r#type = object
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);
    match r#type.as_deref() {
        Some("FeatureCollection") => {
            if let Some(features) = object.get_mut("features").and_then(Value::as_array_mut) {
                features.iter_mut().for_each(fix_geojson);
            }
        }
        Some("Feature") => {
            if let Some(geometry) = object.get_mut("geometry") {
                fix_geojson(geometry);
            }
        }
        Some("GeometryCollection") => {
            if let Some(geometries) = object.get_mut("geometries").and_then(Value::as_array_mut)
            {
                geometries.iter_mut().for_each(fix_geojson);
            }
        }
        Some(_) => {
            if let Some(coordinates) = object.get_mut("coordinates") {
                fix_coordinates(coordinates);
            }
        }
        None => {}
    }
    if let Some(bbox) = object.get_mut("bbox").and_then(Value::as_array_mut) {
        let (longitudes, latitudes): (&[usize], &[usize]) = match bbox.len() {
            4 => (&[0, 2], &[1, 3]),
            6 => (&[0, 3], &[1, 4]),
            _ => (&[], &[]),
        };
        for &i in longitudes {
            clamp_in_place(&mut bbox[i], 180.0);
        }
        for &i in latitudes {
            clamp_in_place(&mut bbox[i], 90.0);
        }
    }
}

fn fix_coordinates(value: &mut Value) {
    let Some(array) = value.as_array_mut() else {
        return;
    };
    if array.first().is_some_and(Value::is_number) {
        if let Some(x) = array.get_mut(0) {
            clamp_in_place(x, 180.0);
        }
        if let Some(y) = array.get_mut(1) {
            clamp_in_place(y, 90.0);
        }
    } else {
        array.iter_mut().for_each(fix_coordinates);
    }
}

fn clamp_in_place(value: &mut Value, limit: f64) {
    if let Some(n) = value.as_f64() {
        if n < -limit || n > limit {
            if let Some(number) = Number::from_f64(n.clamp(-limit, limit)) {
                *value = Value::Number(number);
            }
        }
    }
}

fn parse_bounding_box(value: &Value, epsilon: f64) -> Option<Bbox> {
    let array = value.as_array()?;
    let numbers: Vec<f64> = array.iter().map(Value::as_f64).collect::<Option<_>>()?;
    let longitude = |n: f64| clamp(n, -180.0, 180.0, epsilon);
    let latitude = |n: f64| clamp(n, -90.0, 90.0, epsilon);
    let height = |n: f64| if n.is_finite() { Some(n) } else { None };
    let bbox = match numbers.as_slice() {
        [west, south, east, north] => Bbox::TwoD([
            longitude(*west)?,
            latitude(*south)?,
            longitude(*east)?,
            latitude(*north)?,
        ]),
        [west, south, min_z, east, north, max_z] => Bbox::ThreeD([
            longitude(*west)?,
            latitude(*south)?,
            height(*min_z)?,
            longitude(*east)?,
            latitude(*north)?,
            height(*max_z)?,
        ]),
        _ => return None,
    };
    if bbox.is_valid() { Some(bbox) } else { None }
}
