use crate::grid::Cell;
use crate::simulation::Simulation;

/// Draws the simulation as text, top row first.
///
/// Cars are drawn as `o`, destinations as `D`, obstacles as `#` and roads as arrows
/// showing their heading. Empty cells are `.`.
pub fn render_ascii(sim: &Simulation) -> String {
    let grid = sim.grid();
    let mut out = String::new();
    for y in (0..grid.height()).rev() {
        let row = (0..grid.width()).map(|x| {
            let cell = Cell::new(x, y);
            if grid.has_car(cell) {
                'o'
            } else if grid.destination(cell).is_some() {
                'D'
            } else if grid.has_obstacle(cell) {
                '#'
            } else {
                grid.road(cell).map_or('.', |road| road.arrow())
            }
        });
        out.extend(itertools::Itertools::intersperse(row, ' '));
        out.push('\n');
    }
    out
}
