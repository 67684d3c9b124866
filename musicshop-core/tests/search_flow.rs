mod support;

use std::{sync::Arc, time::Duration};

use musicshop_core::{
    cart::Cart,
    catalog::{CatalogClient, SearchService, SearchState},
    error::ErrorKind,
    product::{Price, ReleaseGroup},
};

use support::{Reply, StubServer};

fn artist_body(id: &str, name: &str) -> String {
    format!(
        r#"{{"artists": {{"items": [{{"id": "{}", "name": "{}", "images": [{{"url": "https://img/{}"}}]}}]}}}}"#,
        id, name, id
    )
}

fn releases_body(title: &str) -> String {
    format!(
        r#"{{"items": [{{"name": "{}", "images": [], "artists": [{{"name": "x"}}], "release_date": "2001", "type": "single"}}], "total": 120}}"#,
        title
    )
}

/// Searches for "Slow Band" answer after a delay, everything else at once.
fn server() -> StubServer {
    StubServer::start(|request| match request.path.as_str() {
        "/api/token" => Reply::json(r#"{"access_token": "t"}"#),
        "/v1/search" => match request.query("q") {
            Some("Slow Band") => {
                Reply::json(&artist_body("slow", "Slow Band")).after(Duration::from_millis(400))
            }
            Some("Fast Band") => Reply::json(&artist_body("fast", "Fast Band")),
            _ => Reply::json(r#"{"artists": {"items": []}}"#),
        },
        "/v1/artists/slow/albums" => Reply::json(&releases_body("Slow Single")),
        "/v1/artists/fast/albums" => Reply::json(&releases_body("Fast Single")),
        _ => Reply::status(404, "{}"),
    })
}

#[test]
fn superseded_search_never_overwrites_newer_results() {
    let server = server();
    let client = Arc::new(CatalogClient::new(&server.config()).unwrap());
    let service = SearchService::new(client);
    let mut state = SearchState::default();

    state.begin(&service, "Slow Band", ReleaseGroup::Single);
    // Give the slow search time to be in flight before superseding it.
    std::thread::sleep(Duration::from_millis(100));
    let fast = state.begin(&service, "Fast Band", ReleaseGroup::Single);

    let report = service.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(report.tag, fast);
    assert!(state.apply(report));

    // Wait out the slow search; its late report must be dropped.
    assert!(service.recv_timeout(Duration::from_millis(800)).is_none());

    let results = state.results.resolved().unwrap();
    assert_eq!(&*results.artist.name, "Fast Band");
    assert_eq!(&*results.products[0].name, "Fast Single");
    assert_eq!(&*results.products[0].artist_image, "https://img/fast");
}

#[test]
fn failed_search_is_reported_for_the_notice() {
    let server = server();
    let client = Arc::new(CatalogClient::new(&server.config()).unwrap());
    let service = SearchService::new(client);
    let mut state = SearchState::default();

    state.begin(&service, "Nobody", ReleaseGroup::Album);
    let report = service.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(state.apply(report));

    let err = state.results.rejected().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!err.user_message().is_empty());
    assert!(server
        .requests()
        .iter()
        .all(|request| !request.path.ends_with("/albums")));
}

#[test]
fn search_results_fill_the_cart() {
    let server = server();
    let client = CatalogClient::new(&server.config()).unwrap();
    let results = client.search("Fast Band", ReleaseGroup::Single).unwrap();

    let cart = Cart::shared();
    let events = cart.lock().subscribe();
    for product in &results.products {
        cart.lock().add(product.clone());
        cart.lock().add(product.clone());
    }
    cart.lock().remove_at(0).unwrap();

    let cart = cart.lock();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Price::from_cents(3500));
    assert_eq!(events.try_iter().count(), 3);
}
