use std::{fmt, fmt::Display, io, sync::Arc, time::Duration};

use base64::prelude::*;
use serde::de::DeserializeOwned;
use ureq::{http::Response, Agent, Body};
use url::Url;

use crate::{
    config::{Config, Pricing},
    error::Error,
    product::{Product, ReleaseGroup},
    util::default_ureq_agent_builder,
};

use super::model::{Artist, ArtistSearchResponse, Page, ReleaseItem, TokenResponse};

/// Bearer token from the client-credentials exchange.  Never cached, every
/// composite search asks for a new one.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    pub expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_in: None,
        }
    }

    pub fn secret(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct SearchResults {
    pub query: Arc<str>,
    pub group: ReleaseGroup,
    pub artist: Artist,
    pub products: Vec<Arc<Product>>,
}

/// Anything that can run the composite search flow for one user action.
pub trait Catalog: Send + Sync + 'static {
    fn search(&self, query: &str, group: ReleaseGroup) -> Result<SearchResults, Error>;
}

pub struct CatalogClient {
    agent: Agent,
    token_url: Url,
    api_base: Url,
    client_id: String,
    client_secret: String,
    release_limit: usize,
    pricing: Pricing,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let token_url = Url::parse(&config.token_url)?;
        let api_base = Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "API base {} cannot hold a path",
                api_base
            )));
        }
        if config.release_limit == 0 {
            return Err(Error::ConfigError("release limit must be positive".into()));
        }
        let agent = default_ureq_agent_builder(config.timeout(), config.proxy_url.as_deref());
        Ok(Self {
            agent: agent.build().into(),
            token_url,
            api_base,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            release_limit: config.release_limit,
            pricing: config.pricing,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::ConfigError(format!("{} cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, request: &RequestBuilder) -> Result<Response<Body>, Error> {
        let url = request.build();
        let response = match request.get_method() {
            Method::Get => {
                let mut req = self.agent.get(url.as_str());
                for (key, value) in request.get_headers() {
                    req = req.header(key.as_str(), value.as_str());
                }
                req.call()?
            }
            Method::Post => {
                let mut req = self.agent.post(url.as_str());
                for (key, value) in request.get_headers() {
                    req = req.header(key.as_str(), value.as_str());
                }
                req.send_form(
                    request
                        .get_form()
                        .iter()
                        .map(|(key, value)| (key.as_str(), value.as_str())),
                )?
            }
        };
        Ok(response)
    }

    /// Send a request and return the deserialized JSON body.  Any non-2xx
    /// status fails the call, there is no partial success.
    fn load<T: DeserializeOwned>(&self, request: &RequestBuilder) -> Result<T, Error> {
        let mut response = self.request(request)?;
        let body = response.body_mut().read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Authentication.
impl CatalogClient {
    pub fn authenticate(&self) -> Result<AccessToken, Error> {
        self.authenticate_with(&self.client_id, &self.client_secret)
    }

    pub fn authenticate_with(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, Error> {
        log::info!("requesting access token");
        self.request_token(client_id, client_secret)
            .map_err(|err| {
                log::error!("authentication failed: {}", err);
                Error::AuthError(Box::new(err))
            })
    }

    fn request_token(&self, client_id: &str, client_secret: &str) -> Result<AccessToken, Error> {
        let credentials = BASE64_STANDARD.encode(format!("{}:{}", client_id, client_secret));
        let request = RequestBuilder::new(self.token_url.clone(), Method::Post)
            .header("Authorization", format!("Basic {}", credentials))
            .form("grant_type", "client_credentials");

        let response: TokenResponse = self.load(&request)?;
        if response.access_token.is_empty() {
            return Err(Error::DecodeError(Box::new(io::Error::new(
                io::ErrorKind::InvalidData,
                "empty access_token",
            ))));
        }
        Ok(AccessToken {
            token: response.access_token,
            expires_in: response.expires_in.map(Duration::from_secs),
        })
    }
}

/// Catalog endpoints.
impl CatalogClient {
    // https://developer.spotify.com/documentation/web-api/reference/search
    pub fn find_artist(&self, name: &str, token: &AccessToken) -> Result<Artist, Error> {
        if name.trim().is_empty() {
            return Err(Error::NotFoundError {
                query: name.to_string(),
            });
        }
        let request = RequestBuilder::new(self.endpoint(&["v1", "search"])?, Method::Get)
            .bearer(token)
            .query("q", name)
            .query("type", "artist")
            .query("limit", 1);

        let result: ArtistSearchResponse = self.load(&request)?;
        let artist = result
            .artists
            .items
            .into_iter()
            .next()
            .map(Artist::from)
            .ok_or_else(|| Error::NotFoundError {
                query: name.to_string(),
            })?;
        log::info!("found artist {} ({})", artist.name, artist.id);
        Ok(artist)
    }

    // https://developer.spotify.com/documentation/web-api/reference/get-an-artists-albums
    pub fn fetch_products(
        &self,
        artist: &Artist,
        token: &AccessToken,
        group: ReleaseGroup,
    ) -> Result<Vec<Arc<Product>>, Error> {
        let request = RequestBuilder::new(
            self.endpoint(&["v1", "artists", &*artist.id, "albums"])?,
            Method::Get,
        )
        .bearer(token)
        .query("include_groups", group)
        .query("limit", self.release_limit);

        let page: Page<ReleaseItem> = self.load(&request)?;
        if let Some(total) = page.total {
            if total > page.items.len() {
                log::debug!(
                    "{} of {} {} releases of {} fit the first page",
                    page.items.len(),
                    total,
                    group,
                    artist.name
                );
            }
        }
        Ok(page
            .items
            .into_iter()
            .map(|item| Arc::new(item.into_product(artist, &self.pricing)))
            .collect())
    }

    /// Authenticate, resolve the artist, then list its releases of `group`.
    /// Stops at the first failing step.
    pub fn search(&self, query: &str, group: ReleaseGroup) -> Result<SearchResults, Error> {
        log::info!("searching {} releases of {:?}", group, query);
        let token = self.authenticate()?;
        let artist = self.find_artist(query, &token)?;
        let products = self.fetch_products(&artist, &token, group)?;
        Ok(SearchResults {
            query: query.into(),
            group,
            artist,
            products,
        })
    }
}

impl Catalog for CatalogClient {
    fn search(&self, query: &str, group: ReleaseGroup) -> Result<SearchResults, Error> {
        CatalogClient::search(self, query, group)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
struct RequestBuilder {
    url: Url,
    queries: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    form: Vec<(String, String)>,
    method: Method,
}

impl RequestBuilder {
    fn new(url: Url, method: Method) -> Self {
        Self {
            url,
            queries: Vec::new(),
            headers: Vec::new(),
            form: Vec::new(),
            method,
        }
    }

    fn query(mut self, key: impl Display, value: impl Display) -> Self {
        self.queries.push((key.to_string(), value.to_string()));
        self
    }

    fn header(mut self, key: impl Display, value: impl Display) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    fn bearer(self, token: &AccessToken) -> Self {
        self.header("Authorization", format!("Bearer {}", token.secret()))
    }

    fn form(mut self, key: impl Display, value: impl Display) -> Self {
        self.form.push((key.to_string(), value.to_string()));
        self
    }

    fn get_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn get_form(&self) -> &[(String, String)] {
        &self.form
    }

    fn get_method(&self) -> &Method {
        &self.method
    }

    fn build(&self) -> Url {
        let mut url = self.url.clone();
        if !self.queries.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.queries);
        }
        url
    }
}
