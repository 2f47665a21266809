use crate::{
    Asset, Bound, Context, Link, LinkEntry, Reference, Rgb, SelfHref, Type, href::Href,
    media_type::is_stac_media_type,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const THUMBNAIL_ROLES: [&str; 2] = ["thumbnail", "overview"];

/// Implemented by all STAC entities that have links.
pub trait Links: SelfHref {
    /// Returns all entries of the links array, including the ones that
    /// aren't well-formed links.
    fn link_entries(&self) -> &[LinkEntry];

    /// Returns a mutable reference to the links array.
    fn links_mut(&mut self) -> &mut Option<Vec<LinkEntry>>;

    /// Returns this entity as the context of its links and assets.
    fn as_context(&self) -> Context<'_>;

    /// Returns the type of this entity.
    fn entity_type(&self) -> Type {
        self.as_context().entity_type()
    }

    /// Returns `true` if both are the same entity, or if both are of the
    /// same type and have the same non-empty id.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Catalog, Item, Links};
    ///
    /// let a = Catalog::new("an-id");
    /// assert!(a.equals(&Catalog::new("an-id")));
    /// assert!(!a.equals(&Catalog::new("another-id")));
    /// assert!(!a.equals(&Item::new("an-id")));
    /// assert!(!Catalog::new("").equals(&Catalog::new("")));
    /// ```
    fn equals(&self, other: &impl Links) -> bool {
        self.as_context().equals(&other.as_context())
    }

    /// Adds a link to the end of the links array.
    fn push_link(&mut self, link: Link) {
        self.links_mut().get_or_insert_with(Vec::new).push(link.into())
    }

    /// Returns the absolute url of this entity.
    ///
    /// That is the explicitly set href, else the href of the `self` link.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_entity::{Catalog, Link, Links, SelfHref};
    ///
    /// let mut catalog = Catalog::new("an-id");
    /// assert!(catalog.absolute_url().is_none());
    /// catalog.push_link(Link::new("https://stac.test/catalog.json", "self"));
    /// assert_eq!(catalog.absolute_url(), Some("https://stac.test/catalog.json"));
    /// catalog.set_self_href("https://stac.test/other.json");
    /// assert_eq!(catalog.absolute_url(), Some("https://stac.test/other.json"));
    /// ```
    fn absolute_url(&self) -> Option<&str> {
        self.self_href()
            .or_else(|| self.self_link().map(|link| link.value().href.as_str()))
    }

    /// Returns all links that have an href, in document order.
    fn links(&self) -> Vec<Bound<'_, Link>> {
        let context = self.as_context();
        self.link_entries()
            .iter()
            .filter_map(LinkEntry::as_link)
            .map(|link| Bound::new(link, context))
            .collect()
    }

    /// Returns the first link with the given rel type.
    fn link_with_rel(&self, rel: &str) -> Option<Bound<'_, Link>> {
        self.links().into_iter().find(|link| link.rel == rel)
    }

    /// Returns all links with one of the given rel types.
    fn links_with_rels(&self, rels: &[&str]) -> Vec<Bound<'_, Link>> {
        self.links()
            .into_iter()
            .filter(|link| rels.contains(&link.rel.as_str()))
            .collect()
    }

    /// Returns all links whose rel type is not one of the given ones.
    fn links_with_other_rels(&self, rels: &[&str]) -> Vec<Bound<'_, Link>> {
        self.links()
            .into_iter()
            .filter(|link| !rels.contains(&link.rel.as_str()))
            .collect()
    }

    /// Returns all links with the given rel type that point to STAC JSON.
    ///
    /// Links without a media type are included if `allow_undefined` is set.
    fn stac_links_with_rel(&self, rel: &str, allow_undefined: bool) -> Vec<Bound<'_, Link>> {
        self.links_with_rels(&[rel])
            .into_iter()
            .filter(|link| is_stac_media_type(link.r#type.as_deref(), allow_undefined))
            .collect()
    }

    /// Returns the first link with the given rel type that points to STAC
    /// JSON.
    fn stac_link_with_rel(&self, rel: &str, allow_undefined: bool) -> Option<Bound<'_, Link>> {
        self.stac_links_with_rel(rel, allow_undefined)
            .into_iter()
            .next()
    }

    /// Returns the `self` link.
    fn self_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("self", true)
    }

    /// Returns the `root` link.
    fn root_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("root", true)
    }

    /// Returns the `parent` link.
    fn parent_link(&self) -> Option<Bound<'_, Link>> {
        self.stac_link_with_rel("parent", true)
    }

    /// Returns all `icon` links that a browser can show.
    fn icons(&self, allow_undefined: bool) -> Vec<Bound<'_, Link>> {
        self.links_with_rels(&["icon"])
            .into_iter()
            .filter(|link| link.can_browser_display_image(allow_undefined))
            .collect()
    }
}

/// Options for ranking GeoTIFF assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    /// Only consider assets that resolve to http(s) urls.
    pub http_only: bool,

    /// Only consider cloud-optimized GeoTIFFs.
    pub cog_only: bool,

    /// The score of each role. An asset gets the highest score of its roles,
    /// where its key counts as a role too.
    pub role_scores: IndexMap<String, f64>,
}

/// An asset and its ranking score.
#[derive(Debug, Clone, Copy)]
pub struct AssetScore<'a> {
    /// The asset.
    pub asset: Bound<'a, Asset>,

    /// The score, higher is better.
    pub score: f64,
}

/// A thumbnail, either from an asset or from a `preview` link.
#[derive(Debug, Clone, Copy)]
pub enum Thumbnail<'a> {
    /// A thumbnail or overview asset.
    Asset(Bound<'a, Asset>),

    /// A preview link.
    Link(Bound<'a, Link>),
}

impl Default for RankOptions {
    fn default() -> RankOptions {
        RankOptions {
            http_only: true,
            cog_only: false,
            role_scores: [("data", 1.), ("visual", 2.), ("thumbnail", 2.), ("overview", 3.)]
                .into_iter()
                .map(|(role, score)| (role.to_string(), score))
                .collect(),
        }
    }
}

impl Thumbnail<'_> {
    /// Returns the href or asset as a [Reference].
    pub fn reference(&self) -> &dyn Reference {
        match self {
            Thumbnail::Asset(asset) => asset.value(),
            Thumbnail::Link(link) => link.value(),
        }
    }

    /// Returns the absolute url of the thumbnail.
    pub fn absolute_url(&self) -> Option<Href> {
        match self {
            Thumbnail::Asset(asset) => asset.absolute_url(),
            Thumbnail::Link(link) => link.absolute_url(),
        }
    }
}

/// Implemented by STAC entities that have assets.
pub trait Assets: Links {
    /// Returns the raw asset map, if any.
    fn asset_map(&self) -> Option<&IndexMap<String, Asset>>;

    /// Returns the raw item asset definition map, if any.
    fn item_asset_map(&self) -> Option<&IndexMap<String, Asset>>;

    /// Returns all assets in document order.
    fn assets(&self) -> Vec<Bound<'_, Asset>> {
        let context = self.as_context();
        self.asset_map()
            .into_iter()
            .flat_map(|assets| assets.values())
            .map(|asset| Bound::new(asset, context))
            .collect()
    }

    /// Returns the asset with the given key.
    fn asset(&self, key: &str) -> Option<Bound<'_, Asset>> {
        self.asset_map()?
            .get(key)
            .map(|asset| Bound::new(asset, self.as_context()))
    }

    /// Returns all item asset definitions in document order.
    fn item_assets(&self) -> Vec<Bound<'_, Asset>> {
        let context = self.as_context();
        self.item_asset_map()
            .into_iter()
            .flat_map(|assets| assets.values())
            .map(|asset| Bound::new(asset, context))
            .collect()
    }

    /// Returns the item asset definition with the given key.
    fn item_asset(&self, key: &str) -> Option<Bound<'_, Asset>> {
        self.item_asset_map()?
            .get(key)
            .map(|asset| Bound::new(asset, self.as_context()))
    }

    /// Returns all assets that have one of the given roles.
    fn assets_with_roles(&self, roles: &[&str], include_key: bool) -> Vec<Bound<'_, Asset>> {
        self.assets()
            .into_iter()
            .filter(|asset| asset.has_role(roles, include_key))
            .collect()
    }

    /// Returns the first asset that has one of the given roles.
    fn asset_with_role(&self, roles: &[&str], include_key: bool) -> Option<Bound<'_, Asset>> {
        self.assets()
            .into_iter()
            .find(|asset| asset.has_role(roles, include_key))
    }

    /// Returns all assets with one of the given media types.
    fn assets_by_types(&self, types: &[&str]) -> Vec<Bound<'_, Asset>> {
        self.assets()
            .into_iter()
            .filter(|asset| asset.is_type(types))
            .collect()
    }

    /// Returns the thumbnails of this entity.
    ///
    /// Thumbnail and overview assets (by role or key) with an href come
    /// first. If `prefer` is set, assets with that role or key are moved to
    /// the front. Only if there are no such assets, `preview` links are used.
    /// If `browser_only` is set, only images a browser can show are returned.
    fn thumbnails(&self, browser_only: bool, prefer: Option<&str>) -> Vec<Thumbnail<'_>> {
        let mut assets = self.assets_with_roles(&THUMBNAIL_ROLES, true);
        assets.retain(|asset| !asset.is_definition());
        if let Some(prefer) = prefer {
            assets.sort_by_key(|asset| !asset.has_role(&[prefer], true));
        }
        let mut thumbnails: Vec<Thumbnail<'_>> = assets.into_iter().map(Thumbnail::Asset).collect();
        if thumbnails.is_empty() {
            thumbnails = self
                .links_with_rels(&["preview"])
                .into_iter()
                .map(Thumbnail::Link)
                .collect();
        }
        if browser_only {
            thumbnails.retain(|thumbnail| thumbnail.reference().can_browser_display_image(false));
        }
        thumbnails
    }

    /// Ranks the GeoTIFF assets of this entity, best first.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_entity::{Assets, FromJson, Item, RankOptions};
    ///
    /// let item = Item::from_json_value(json!({
    ///     "type": "Feature",
    ///     "assets": {
    ///         "data": {"href": "https://stac.test/data.tif", "type": "image/tiff; application=geotiff", "roles": ["data"]},
    ///         "visual": {"href": "https://stac.test/visual.tif", "type": "image/tiff; application=geotiff", "roles": ["visual"]},
    ///         "thumbnail": {"href": "https://stac.test/thumbnail.png", "type": "image/png"}
    ///     }
    /// })).unwrap();
    /// let ranked = item.rank_geotiffs(&RankOptions::default());
    /// assert_eq!(ranked.len(), 2);
    /// assert_eq!(ranked[0].asset.key(), "visual");
    /// ```
    fn rank_geotiffs(&self, options: &RankOptions) -> Vec<AssetScore<'_>> {
        self.rank_geotiffs_by(options, |_| 0.)
    }

    /// Ranks the GeoTIFF assets of this entity, adding the result of
    /// `adjust` to each asset's score.
    fn rank_geotiffs_by(
        &self,
        options: &RankOptions,
        adjust: impl Fn(&Bound<'_, Asset>) -> f64,
    ) -> Vec<AssetScore<'_>> {
        let mut scores: Vec<AssetScore<'_>> = self
            .assets()
            .into_iter()
            .filter(|asset| asset.is_geotiff())
            .filter(|asset| !options.http_only || asset.is_http() == Some(true))
            .filter(|asset| !options.cog_only || asset.is_cog())
            .map(|asset| {
                let mut score = role_score(&asset, options);
                if !options.cog_only && asset.is_cog() {
                    score += 2.;
                }
                if asset.find_visual_bands().is_some() {
                    score += 1.;
                }
                score += adjust(&asset);
                AssetScore { asset, score }
            })
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }

    /// Returns the best GeoTIFF asset.
    ///
    /// See [Assets::rank_geotiffs].
    fn default_geotiff(&self, http_only: bool, cog_only: bool) -> Option<Bound<'_, Asset>> {
        let options = RankOptions {
            http_only,
            cog_only,
            ..Default::default()
        };
        self.rank_geotiffs(&options)
            .into_iter()
            .next()
            .map(|score| score.asset)
    }

    /// Finds three single-band assets whose bands are red, green and blue.
    ///
    /// Returns `None` unless all three are present.
    fn find_visual_assets(&self) -> Option<Rgb<Bound<'_, Asset>>> {
        let (mut red, mut green, mut blue) = (None, None, None);
        for asset in self.assets() {
            if asset.bands().len() != 1 {
                continue;
            }
            if let Some(band) = asset.find_band(&["red", "green", "blue"], "common_name") {
                match band.common_name() {
                    Some("red") => red = Some(asset),
                    Some("green") => green = Some(asset),
                    Some("blue") => blue = Some(asset),
                    _ => {}
                }
            }
        }
        Some(Rgb {
            red: red?,
            green: green?,
            blue: blue?,
        })
    }
}

fn role_score(asset: &Bound<'_, Asset>, options: &RankOptions) -> f64 {
    asset
        .roles
        .iter()
        .flatten()
        .map(String::as_str)
        .chain(std::iter::once(asset.key()))
        .filter_map(|role| options.role_scores.get(role).copied())
        .fold(0., f64::max)
}

#[cfg(test)]
mod tests {
    use super::{Assets, RankOptions};
    use crate::{Collection, FromJson, Reference};
    use serde_json::json;

    #[test]
    fn default_rank_options() {
        let options = RankOptions::default();
        assert!(options.http_only);
        assert!(!options.cog_only);
        assert_eq!(options.role_scores["overview"], 3.);
        assert_eq!(options.role_scores["data"], 1.);
    }

    #[test]
    fn thumbnails_need_an_href() {
        let collection = Collection::from_json_value(json!({
            "type": "Collection",
            "id": "a-collection",
            "links": [{"href": "https://stac.test/preview.png", "rel": "preview", "type": "image/png"}],
            "assets": {
                "thumbnail": {"type": "image/png", "roles": ["thumbnail"]},
                "overview": {"href": "https://stac.test/overview.tif", "type": "image/tiff"}
            }
        }))
        .unwrap();
        let thumbnails = collection.thumbnails(false, None);
        assert_eq!(thumbnails.len(), 1);
        assert_eq!(
            thumbnails[0].reference().href(),
            Some("https://stac.test/overview.tif")
        );
        assert!(thumbnails[0].absolute_url().is_some());

        let collection = Collection::from_json_value(json!({
            "type": "Collection",
            "links": [{"href": "https://stac.test/preview.png", "rel": "preview", "type": "image/png"}],
            "assets": {"thumbnail": {"type": "image/png"}}
        }))
        .unwrap();
        let thumbnails = collection.thumbnails(true, None);
        assert_eq!(thumbnails.len(), 1);
        assert_eq!(
            thumbnails[0].reference().href(),
            Some("https://stac.test/preview.png")
        );
    }
}
