use musicshop_core::{
    cart::{Cart, CartEvent, SharedCart},
    catalog::{CatalogClient, SearchService, SearchState},
    config::Config,
    error::Error,
    product::ReleaseGroup,
};
use std::{env, io, io::BufRead, process, sync::Arc, thread};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (group, artist): (ReleaseGroup, String) = match args.split_first() {
        Some((first, rest)) if !rest.is_empty() && first.parse::<ReleaseGroup>().is_ok() => {
            (first.parse().unwrap_or_default(), rest.join(" "))
        }
        _ => (ReleaseGroup::Album, args.join(" ")),
    };

    if let Err(err) = start(&artist, group) {
        log::error!("{}", err);
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn start(artist: &str, group: ReleaseGroup) -> Result<(), Error> {
    let config = Config::load()?;
    if !config.has_credentials() {
        return Err(Error::ConfigError(
            "set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET".to_string(),
        ));
    }
    let client = Arc::new(CatalogClient::new(&config)?);
    let service = SearchService::new(client);
    let mut search = SearchState::default();
    let cart = Cart::shared();

    let _event_thread = thread::spawn({
        let events = cart.lock().subscribe();
        move || {
            for event in events {
                match event {
                    CartEvent::Added { index, product, total } => {
                        log::info!("cart[{}] + {} (total {})", index, product.name, total)
                    }
                    CartEvent::Removed { index, product, total } => {
                        log::info!("cart[{}] - {} (total {})", index, product.name, total)
                    }
                }
            }
        }
    });

    if !artist.trim().is_empty() {
        run_search(&service, &mut search, artist, group);
    }
    print_help();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let (command, rest) = line
            .trim()
            .split_once(' ')
            .map_or((line.trim(), ""), |(cmd, rest)| (cmd, rest.trim()));
        match command {
            "album" | "single" | "appears_on" | "compilation" => {
                let group: ReleaseGroup = command.parse().unwrap_or_default();
                run_search(&service, &mut search, rest, group);
            }
            "add" => add_to_cart(&search, &cart, rest),
            "rm" => remove_from_cart(&cart, rest),
            "cart" => print_cart(&cart),
            "q" | "quit" => break,
            "" => {}
            _ => log::warn!("unknown command"),
        }
    }

    Ok(())
}

fn run_search(
    service: &SearchService<CatalogClient>,
    search: &mut SearchState,
    artist: &str,
    group: ReleaseGroup,
) {
    search.begin(service, artist, group);
    if let Some(report) = service.recv() {
        search.apply(report);
    }
    if let Some(results) = search.results.resolved() {
        println!("{} ({})", results.artist.name, results.group);
        for (index, product) in results.products.iter().enumerate() {
            println!(
                "  {:>2}. {} [{}] {} ({} in stock)",
                index, product.name, product.release_date, product.price, product.stock
            );
        }
    } else if let Some(err) = search.results.rejected() {
        println!("{}", err.user_message());
    }
}

fn parse_index(arg: &str) -> Option<usize> {
    let index = arg.parse().ok();
    if index.is_none() {
        log::warn!("expected a position, got {:?}", arg);
    }
    index
}

fn add_to_cart(search: &SearchState, cart: &SharedCart, arg: &str) {
    let Some(index) = parse_index(arg) else {
        return;
    };
    match search
        .results
        .resolved()
        .and_then(|results| results.products.get(index))
    {
        Some(product) => cart.lock().add(product.clone()),
        None => println!("No product at {}", index),
    }
}

fn remove_from_cart(cart: &SharedCart, arg: &str) {
    let Some(index) = parse_index(arg) else {
        return;
    };
    if let Err(err) = cart.lock().remove_at(index) {
        println!("{}", err.user_message());
    }
}

fn print_cart(cart: &SharedCart) {
    let cart = cart.lock();
    for (index, product) in cart.items().iter().enumerate() {
        println!("  {:>2}. {} {}", index, product.name, product.price);
    }
    println!("Total: {}", cart.total());
}

fn print_help() {
    println!("commands: album|single|appears_on|compilation <artist>, add <n>, rm <n>, cart, quit");
}
