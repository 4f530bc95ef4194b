use crate::grid::Cell;
use serde::{Deserialize, Serialize};

/// The direction traffic may leave a road cell in.
///
/// `Vertical`, `Horizontal` and `Any` are the "soft" headings found at intersections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
    Vertical,
    Horizontal,
    Any,
}

impl Heading {
    /// Checks whether a move from `from` to `to` agrees with this heading.
    /// `Up` is towards increasing `y`.
    pub fn allows(&self, from: Cell, to: Cell) -> bool {
        use Heading::*;
        match self {
            Left => to.x < from.x,
            Right => to.x > from.x,
            Up => to.y > from.y,
            Down => to.y < from.y,
            Vertical => to.x == from.x,
            Horizontal => to.y == from.y,
            Any => true,
        }
    }

    /// The character used to draw the heading.
    pub fn arrow(&self) -> char {
        use Heading::*;
        match self {
            Left => '←',
            Right => '→',
            Up => '↑',
            Down => '↓',
            Vertical => '|',
            Horizontal => '-',
            Any => '+',
        }
    }
}

/// Decides whether a car may travel from `from` to `to`.
///
/// The move must agree with the heading of the road it leaves and, if there is one,
/// the road it enters. Staying put is never a legal transition. Moves off a road are
/// unconstrained.
pub fn validate_transition(
    current_road: Option<Heading>,
    next_road: Option<Heading>,
    from: Cell,
    to: Cell,
) -> bool {
    if from == to {
        return false;
    }
    let Some(current_road) = current_road else {
        return true;
    };
    current_road.allows(from, to) && next_road.map_or(true, |road| road.allows(from, to))
}
