// SPDX-License-Identifier: MIT
//
// Grid traversal — the consumer side of the direction stream.
//
// A rectangular layout of cells, some of which may be holes. One decoded
// direction moves the marker one present cell that way: holes are
// skipped over, and running off the edge leaves the marker where it was.
// Think of a wall of lights where a few sockets are empty.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rawkey_decode::Direction;

/// A cell coordinate, 0-indexed from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub col: usize,
    pub row: usize,
}

impl Pos {
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

impl FromStr for Pos {
    type Err = String;

    /// Parse `col,row`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, row) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `col,row`, got `{s}`"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| format!("bad coordinate `{v}`: {e}"))
        };
        Ok(Self::new(parse(col)?, parse(row)?))
    }
}

/// What a key does in `walk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkCommand {
    /// One present cell in a direction.
    Step(Direction),
    /// As far as possible in a direction.
    Jump(Direction),
    Quit,
}

/// Rectangular cell layout with holes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    holes: HashSet<Pos>,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            holes: HashSet::new(),
        }
    }

    /// Mark cells as holes. Out-of-bounds positions are ignored.
    #[must_use]
    pub fn with_holes(mut self, holes: impl IntoIterator<Item = Pos>) -> Self {
        let (w, h) = (self.width, self.height);
        self.holes
            .extend(holes.into_iter().filter(|p| p.col < w && p.row < h));
        self
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether `pos` is inside the grid and not a hole.
    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.col < self.width && pos.row < self.height && !self.holes.contains(&pos)
    }

    /// The first present cell in reading order.
    #[must_use]
    pub fn first_cell(&self) -> Option<Pos> {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Pos::new(col, row)))
            .find(|&p| self.contains(p))
    }

    /// The next present cell from `from` in `dir`, skipping holes.
    ///
    /// `None` when the edge comes before any present cell.
    #[must_use]
    pub fn step(&self, from: Pos, dir: Direction) -> Option<Pos> {
        let (dc, dr) = dir.delta();
        let mut cur = from;
        loop {
            let col = cur.col.checked_add_signed(dc)?;
            let row = cur.row.checked_add_signed(dr)?;
            if col >= self.width || row >= self.height {
                return None;
            }
            cur = Pos::new(col, row);
            if !self.holes.contains(&cur) {
                return Some(cur);
            }
        }
    }

    /// Step in `dir` until the edge; returns `from` if no step is possible.
    #[must_use]
    pub fn jump(&self, from: Pos, dir: Direction) -> Pos {
        let mut cur = from;
        while let Some(next) = self.step(cur, dir) {
            cur = next;
        }
        cur
    }

    /// Apply a movement command. `None` means the marker did not move.
    #[must_use]
    pub fn apply(&self, from: Pos, command: WalkCommand) -> Option<Pos> {
        let to = match command {
            WalkCommand::Step(dir) => self.step(from, dir)?,
            WalkCommand::Jump(dir) => self.jump(from, dir),
            WalkCommand::Quit => return None,
        };
        (to != from).then_some(to)
    }

    /// Draw the grid, one line per row: `@` marker, `o` cell, blank hole.
    #[must_use]
    pub fn render(&self, marker: Pos) -> Vec<String> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| {
                        let p = Pos::new(col, row);
                        if p == marker {
                            '@'
                        } else if self.holes.contains(&p) {
                            ' '
                        } else {
                            'o'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid() -> Grid {
        // o o o o
        // o     o
        // o o o o
        Grid::new(4, 3).with_holes([Pos::new(1, 1), Pos::new(2, 1)])
    }

    #[test]
    fn step_moves_one_cell() {
        let g = grid();
        assert_eq!(g.step(Pos::new(0, 0), Direction::Right), Some(Pos::new(1, 0)));
        assert_eq!(g.step(Pos::new(0, 0), Direction::Down), Some(Pos::new(0, 1)));
    }

    #[test]
    fn step_skips_holes() {
        let g = grid();
        assert_eq!(g.step(Pos::new(0, 1), Direction::Right), Some(Pos::new(3, 1)));
        assert_eq!(g.step(Pos::new(1, 0), Direction::Down), Some(Pos::new(1, 2)));
    }

    #[test]
    fn step_stops_at_edges() {
        let g = grid();
        assert_eq!(g.step(Pos::new(0, 0), Direction::Up), None);
        assert_eq!(g.step(Pos::new(0, 0), Direction::Left), None);
        assert_eq!(g.step(Pos::new(3, 2), Direction::Right), None);
        assert_eq!(g.step(Pos::new(3, 2), Direction::Down), None);
    }

    #[test]
    fn step_into_trailing_holes_is_none() {
        let g = Grid::new(3, 1).with_holes([Pos::new(1, 0), Pos::new(2, 0)]);
        assert_eq!(g.step(Pos::new(0, 0), Direction::Right), None);
    }

    #[test]
    fn jump_goes_to_edge() {
        let g = grid();
        assert_eq!(g.jump(Pos::new(0, 1), Direction::Right), Pos::new(3, 1));
        assert_eq!(g.jump(Pos::new(2, 2), Direction::Up), Pos::new(2, 0));
        assert_eq!(g.jump(Pos::new(0, 0), Direction::Left), Pos::new(0, 0));
    }

    #[test]
    fn apply_reports_no_move() {
        let g = grid();
        let origin = Pos::new(0, 0);
        assert_eq!(g.apply(origin, WalkCommand::Step(Direction::Up)), None);
        assert_eq!(g.apply(origin, WalkCommand::Jump(Direction::Left)), None);
        assert_eq!(g.apply(origin, WalkCommand::Quit), None);
        assert_eq!(
            g.apply(origin, WalkCommand::Jump(Direction::Right)),
            Some(Pos::new(3, 0))
        );
    }

    #[test]
    fn first_cell_skips_holes() {
        let g = Grid::new(2, 2).with_holes([Pos::new(0, 0)]);
        assert_eq!(g.first_cell(), Some(Pos::new(1, 0)));
        assert_eq!(Grid::new(0, 0).first_cell(), None);
    }

    #[test]
    fn out_of_bounds_holes_are_ignored() {
        let g = Grid::new(2, 2).with_holes([Pos::new(5, 5)]);
        assert_eq!(g, Grid::new(2, 2));
    }

    #[test]
    fn render_marks_marker_and_holes() {
        assert_eq!(grid().render(Pos::new(3, 1)), vec!["oooo", "o  @", "oooo"]);
    }

    #[test]
    fn parse_pos() {
        assert_eq!("2,3".parse::<Pos>(), Ok(Pos::new(2, 3)));
        assert_eq!(" 1 , 0 ".parse::<Pos>(), Ok(Pos::new(1, 0)));
        assert!("2".parse::<Pos>().is_err());
        assert!("a,b".parse::<Pos>().is_err());
        assert_eq!(Pos::new(4, 1).to_string(), "4,1");
    }
}
