use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::grid::Cell;
use crate::heading::Heading;
use crate::simulation::Simulation;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// The road characters understood when no dictionary is supplied.
static DEFAULT_DICTIONARY: Lazy<MapDictionary> = Lazy::new(|| {
    let roads = [
        ('>', Heading::Right),
        ('<', Heading::Left),
        ('^', Heading::Up),
        ('v', Heading::Down),
        ('.', Heading::Any),
    ];
    MapDictionary {
        roads: roads.into_iter().collect(),
    }
});

/// Maps the characters of a map file to road headings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDictionary {
    roads: HashMap<char, Heading>,
}

impl Default for MapDictionary {
    fn default() -> Self {
        DEFAULT_DICTIONARY.clone()
    }
}

impl MapDictionary {
    /// Creates a dictionary with no road characters.
    pub fn empty() -> Self {
        Self {
            roads: HashMap::new(),
        }
    }

    /// Reads a dictionary from a JSON object of single characters to heading names,
    /// such as `{">": "Right", "D": "Destination"}`. Entries which aren't headings are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut dictionary = Self::empty();
        for (key, value) in entries {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(Error::DictionaryKey(key));
            };
            if let Ok(heading) = serde_json::from_value::<Heading>(value) {
                dictionary.insert(ch, heading);
            }
        }
        Ok(dictionary)
    }

    /// Loads a JSON dictionary file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Adds or replaces a road character.
    pub fn insert(&mut self, ch: char, heading: Heading) {
        self.roads.insert(ch, heading);
    }

    /// Gets the heading of a road character.
    pub fn get(&self, ch: char) -> Option<Heading> {
        self.roads.get(&ch).copied()
    }
}

/// Something placed on the map at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Road(Heading),
    /// A traffic light over a road. Lights starting red sit on a vertical road,
    /// and those starting green on a horizontal one.
    Light { green: bool },
    Obstacle,
    Destination,
}

/// A city layout read from a text map.
#[derive(Clone, Debug, PartialEq)]
pub struct CityMap {
    width: i32,
    height: i32,
    tiles: Vec<(Cell, Tile)>,
}

impl CityMap {
    /// Parses a text map.
    ///
    /// Each line is a row, with the first line at the top (the highest `y`). The map is
    /// as wide as its first line. Besides the road characters of `dictionary`, `S` and `s`
    /// are red and green traffic lights, `#` is an obstacle and `D` a destination.
    pub fn parse(text: &str, dictionary: &MapDictionary) -> Result<Self> {
        let mut rows = text.lines().collect::<Vec<_>>();
        while rows.last().map_or(false, |row| row.is_empty()) {
            rows.pop();
        }
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(Error::EmptyMap);
        }
        let height = rows.len();

        let mut tiles = vec![];
        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len > width {
                return Err(Error::RaggedRow { row, len, width });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = match ch {
                    'S' => Tile::Light { green: false },
                    's' => Tile::Light { green: true },
                    '#' => Tile::Obstacle,
                    'D' => Tile::Destination,
                    ch => match dictionary.get(ch) {
                        Some(heading) => Tile::Road(heading),
                        None => return Err(Error::UnknownTile { tile: ch, row, col }),
                    },
                };
                let cell = Cell::new(col as i32, (height - row - 1) as i32);
                tiles.push((cell, tile));
            }
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            tiles,
        })
    }

    /// Loads and parses a text map file.
    pub fn load(path: impl AsRef<Path>, dictionary: &MapDictionary) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, dictionary)
    }

    /// The number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// The number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Everything placed on the map, row by row from the top.
    pub fn tiles(&self) -> &[(Cell, Tile)] {
        &self.tiles
    }

    /// The four corner cells, where cars enter the city.
    pub fn corners(&self) -> Vec<Cell> {
        let (w, h) = (self.width - 1, self.height - 1);
        vec![Cell::new(0, 0), Cell::new(w, 0), Cell::new(0, h), Cell::new(w, h)]
    }
}

impl Simulation {
    /// Creates a simulation from a map, spawning cars at its corners.
    pub fn from_map(map: &CityMap, config: &SimConfig) -> Self {
        let mut sim = Simulation::new(map.width(), map.height(), config);
        for (cell, tile) in map.tiles() {
            match *tile {
                Tile::Road(heading) => {
                    sim.add_road(*cell, heading);
                }
                Tile::Light { green } => {
                    let road = if green {
                        Heading::Horizontal
                    } else {
                        Heading::Vertical
                    };
                    sim.add_light(*cell, green);
                    sim.add_road(*cell, road);
                }
                Tile::Obstacle => {
                    sim.add_obstacle(*cell);
                }
                Tile::Destination => {
                    sim.add_destination(*cell);
                }
            }
        }
        sim.set_spawn_points(map.corners());
        sim
    }
}
