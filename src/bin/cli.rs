//! Small command-line demo around [`country_lookup`]. Not part of the
//! public library API; useful for manual spot-checks and as example code.

use clap::Parser;

/// Look up the country code of a latitude/longitude pair.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Latitude in degrees, north positive.
    #[arg(long)]
    lat: f64,
    /// Longitude in degrees, east positive.
    #[arg(long)]
    lon: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let table = country_lookup::get_table(None);
    match country_lookup::lookup(table, args.lat, args.lon) {
        Some(code) => println!("{code}"),
        None => println!("OCEAN"),
    }
}
