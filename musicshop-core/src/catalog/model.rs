use std::sync::Arc;

use serde::Deserialize;

use crate::{
    config::Pricing,
    product::{Product, ProductDetails},
};

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Image {
    pub url: Arc<str>,
}

/// One page of a listing.  Only `items` is required, the counters are
/// informational.
#[derive(Deserialize)]
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Deserialize)]
pub(crate) struct ArtistSearchResponse {
    pub artists: Page<ArtistItem>,
}

#[derive(Deserialize)]
pub(crate) struct ArtistItem {
    pub id: Arc<str>,
    pub name: Arc<str>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Deserialize)]
pub(crate) struct ReleaseItem {
    pub name: Arc<str>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<CreditedArtist>,
    pub release_date: Arc<str>,
    #[serde(rename = "type")]
    pub kind: Arc<str>,
}

#[derive(Deserialize)]
pub(crate) struct CreditedArtist {
    pub name: Arc<str>,
}

/// Artist resolved by a search.  The image is not part of the release
/// listing, so it travels with the artist into `fetch_products`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artist {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub image: Arc<str>,
}

impl From<ArtistItem> for Artist {
    fn from(item: ArtistItem) -> Self {
        Self {
            image: first_url(&item.images),
            id: item.id,
            name: item.name,
        }
    }
}

impl ReleaseItem {
    pub fn into_product(self, artist: &Artist, pricing: &Pricing) -> Product {
        let details = ProductDetails {
            image: first_url(&self.images),
            artist_name: self
                .artists
                .first()
                .map_or_else(|| Arc::from(""), |credit| credit.name.clone()),
            artist_image: artist.image.clone(),
            name: self.name,
            release_date: self.release_date,
            kind: self.kind,
        };
        Product::new(details, pricing.price, pricing.stock)
    }
}

fn first_url(images: &[Image]) -> Arc<str> {
    images
        .first()
        .map_or_else(|| Arc::from(""), |image| image.url.clone())
}
