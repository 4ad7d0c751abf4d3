use anyhow::Context;
use clap::Parser;
use filmap::films::canonical_year;
use filmap::location::{
    BuiltinCountries, CachedGeocoder, Coordinate, GeocodeCache, NoReverseGeocoder,
    NominatimClient, ReverseGeocoder,
};
use filmap::render::{load_geojson, LeafletRenderer};
use filmap::{loader, Config, GeoContext, Pipeline, RunReport};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// filmap: films shot near you in a given year, on a map
///
/// Finds the filming locations of a year's films in your country (and its
/// neighbours), ranks them by distance and writes a Leaflet map of the ten
/// closest.
///
/// Examples:
///   filmap --year 2015 --coords "49.83826, 24.02324"
///   filmap --year 2015 --coords "38.93, -95.09" --offline
///   filmap                                  (asks for year and location)
#[derive(Parser)]
#[command(name = "filmap", version, about, long_about = None)]
struct Cli {
    /// Year to build the map for. Asked for interactively when omitted.
    #[arg(long, short = 'y')]
    year: Option<String>,

    /// Your location as "lat, lon". Asked for interactively when omitted.
    #[arg(long, short = 'c', allow_hyphen_values = true)]
    coords: Option<String>,

    /// Film record stream (film,year,...,location).
    #[arg(long, env = "FILMAP_FILMS", default_value = filmap::config::DEFAULT_FILMS_PATH)]
    films: PathBuf,

    /// Tab-separated country centroid table.
    #[arg(long, env = "FILMAP_COUNTRIES", default_value = filmap::config::DEFAULT_COUNTRIES_PATH)]
    countries: PathBuf,

    /// Tab-separated city table.
    #[arg(long, env = "FILMAP_CITIES", default_value = filmap::config::DEFAULT_CITIES_PATH)]
    cities: PathBuf,

    /// GeoJSON country borders to draw as a map layer.
    #[arg(long, env = "FILMAP_BORDERS")]
    borders: Option<PathBuf>,

    /// World capitals table to draw as a map layer.
    #[arg(long, env = "FILMAP_CAPITALS")]
    capitals: Option<PathBuf>,

    /// Directory for the filtered table and the map.
    #[arg(long, env = "FILMAP_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Offline mode: only use the geocode cache and built-in data.
    #[arg(long, env = "FILMAP_OFFLINE")]
    offline: bool,

    /// Country assumed when your own country cannot be determined.
    #[arg(long, env = "FILMAP_FALLBACK_COUNTRY", default_value = "Ukraine")]
    fallback_country: String,

    /// Geocode cache file. Defaults to ~/.filmap/geocode_cache.json.
    #[arg(long, env = "FILMAP_CACHE")]
    cache: Option<PathBuf>,

    /// Number of closest locations listed in the summary.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Print the full run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log progress (info level) to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            countries_path: self.countries.clone(),
            cities_path: self.cities.clone(),
            films_path: self.films.clone(),
            borders_path: self.borders.clone(),
            capitals_path: self.capitals.clone(),
            out_dir: self.out_dir.clone(),
            cache_path: self.cache.clone().unwrap_or(defaults.cache_path),
            offline: self.offline,
            fallback_country: self.fallback_country.clone(),
            near_city_limit: defaults.near_city_limit,
            top: self.top,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "filmap=info"
    } else {
        "filmap=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // ── Read year and location ──────────────────────────────────

    let year_input = match &cli.year {
        Some(y) => y.clone(),
        None => prompt("Please enter a year you would like to have a map for: ")?,
    };
    let Some(year) = parse_year(&year_input) else {
        println!("Year should be entered as int value! Try again");
        return Ok(());
    };

    let coords_input = match &cli.coords {
        Some(c) => c.clone(),
        None => prompt("Please enter your location (format: lat, long): ")?,
    };
    let user: Coordinate = match coords_input.parse() {
        Ok(c) => c,
        Err(e) => {
            println!("Check for correctness of format you entered! ({})", e);
            return Ok(());
        }
    };

    // ── Run ─────────────────────────────────────────────────────

    let started = Instant::now();
    let config = cli.config();
    eprintln!("Map is generating...");
    eprintln!("Please wait...");

    let context = GeoContext::load(&config).context("loading country and city tables")?;

    let mut renderer = LeafletRenderer::new(&config.out_dir);
    if let Some(path) = &config.borders_path {
        renderer = renderer.with_borders(load_geojson(path)?);
    }
    if let Some(path) = &config.capitals_path {
        renderer = renderer.with_capitals(loader::load_capitals(path)?);
    }

    let cache = GeocodeCache::load_from(config.cache_path.clone());
    let (mut forward, mut reverse): (CachedGeocoder<NominatimClient>, Box<dyn ReverseGeocoder>) =
        if config.offline {
            (CachedGeocoder::offline(cache), Box::new(NoReverseGeocoder))
        } else {
            (
                CachedGeocoder::new(cache, NominatimClient::new()),
                Box::new(NominatimClient::new()),
            )
        };

    let lookup = BuiltinCountries::new();
    let result = Pipeline::new(
        &context,
        &config,
        &lookup,
        reverse.as_mut(),
        &mut forward,
        &renderer,
    )
    .run(&year, user);

    if let Err(e) = forward.save() {
        tracing::warn!("could not save geocode cache: {}", e);
    }
    let report = result?;

    // ── Output ──────────────────────────────────────────────────

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, config.top);
    }
    eprintln!(
        "Finished. Please have look at the map {}",
        report.map_path.display()
    );
    eprintln!("Succeeded in {} sec", started.elapsed().as_secs());
    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Years are whole numbers; anything else is rejected.
fn parse_year(input: &str) -> Option<String> {
    input.trim().parse::<i64>().ok().map(|y| canonical_year(&y.to_string()))
}

fn print_summary(report: &RunReport, top: usize) {
    if report.ranked.is_empty() {
        println!("No filming locations found near {} for {}.", report.user, report.year);
        return;
    }
    println!("Closest filming locations for {} near {}:", report.year, report.user);
    for (i, entry) in report.ranked.iter().take(top).enumerate() {
        println!(
            "  {:>2}. {:>8.1} km  {}  {}",
            i + 1,
            entry.distance_km,
            entry.coordinate,
            entry.films.replace('/', ", ")
        );
    }
    if report.ranked.len() > top {
        println!("  ... and {} more", report.ranked.len() - top);
    }
}
