use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Currency amount in minor units (cents).  Integer arithmetic keeps running
/// totals exact no matter how many additions and removals happened.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl SubAssign for Price {
    fn sub_assign(&mut self, rhs: Price) {
        self.0 -= rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

/// Catalog section used to filter an artist's releases.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseGroup {
    #[default]
    Album,
    Single,
    AppearsOn,
    Compilation,
}

impl ReleaseGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseGroup::Album => "album",
            ReleaseGroup::Single => "single",
            ReleaseGroup::AppearsOn => "appears_on",
            ReleaseGroup::Compilation => "compilation",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Album,
            Self::Single,
            Self::AppearsOn,
            Self::Compilation,
        ]
    }
}

impl fmt::Display for ReleaseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|group| group.as_str() == s)
            .copied()
            .ok_or_else(|| Error::ConfigError(format!("unknown release group {:?}", s)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: Arc<str>,
    pub image: Arc<str>,
    pub artist_name: Arc<str>,
    pub artist_image: Arc<str>,
    pub release_date: Arc<str>,
    pub kind: Arc<str>,
    pub price: Price,
    pub stock: u32,
}

impl Product {
    /// Builds a product with a fresh rendering id.  Two products built from
    /// the same data are still distinct list entries.
    pub fn new(details: ProductDetails, price: Price, stock: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: details.name,
            image: details.image,
            artist_name: details.artist_name,
            artist_image: details.artist_image,
            release_date: details.release_date,
            kind: details.kind,
            price,
            stock,
        }
    }
}

/// Display fields of a product, as sourced from the catalog.
#[derive(Clone, Debug)]
pub struct ProductDetails {
    pub name: Arc<str>,
    pub image: Arc<str>,
    pub artist_name: Arc<str>,
    pub artist_image: Arc<str>,
    pub release_date: Arc<str>,
    pub kind: Arc<str>,
}
