mod client;
mod model;
mod search;

pub use client::{AccessToken, Catalog, CatalogClient, SearchResults};
pub use model::Artist;
pub use search::{SearchReport, SearchRequest, SearchService, SearchState, SearchTag};
