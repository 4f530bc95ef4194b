use anyhow::{Context, Result};
use std::time::Instant;
use traffic_grid::{render_ascii, CityMap, MapDictionary, SimConfig, Simulation};

const USAGE: &str = "usage: traffic-grid <map.txt> [dictionary.json] [config.toml]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let map_path = args.next().context(USAGE)?;
    let dictionary = match args.next() {
        Some(path) => MapDictionary::load(&path).with_context(|| format!("loading {path}"))?,
        None => MapDictionary::default(),
    };
    let config = match args.next() {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SimConfig::default(),
    };

    let map = CityMap::load(&map_path, &dictionary).with_context(|| format!("loading {map_path}"))?;
    let mut sim = Simulation::from_map(&map, &config);
    for id in sim.unreachable_destinations() {
        log::warn!("destination {:?} can't be reached from any corner", id);
    }

    println!("Simulating {} steps...", config.steps);
    let start = Instant::now();
    for _ in 0..config.steps {
        sim.step();
        log::info!(
            "frame {}: {} cars travelling, {} trips completed",
            sim.frame(),
            sim.active_cars(),
            sim.completed_trips()
        );
    }
    let elapsed = start.elapsed();

    println!(
        "Avg. frame: {:?} ({} cars travelling)",
        elapsed / config.steps.max(1) as u32,
        sim.active_cars()
    );
    println!("{:#?}", sim.stats());
    print!("{}", render_ascii(&sim));
    Ok(())
}
