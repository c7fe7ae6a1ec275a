use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        let (row, col) = self;
        [usize::from(row), usize::from(col)]
    }
}

/// Cell count of a `rows x cols` grid.
pub const fn mult(rows: Coord, cols: Coord) -> CellCount {
    (rows as CellCount).saturating_mul(cols as CellCount)
}

/// Row-major iteration over every coordinate of a `size` grid.
pub fn iter_coords(size: Coord2) -> impl Iterator<Item = Coord2> {
    let (rows, cols) = size;
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

/// Neighbor lookup for any grid stored as an `Array2`.
pub trait GridNeighbors {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter;
}

impl<T> GridNeighbors for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter {
        let (rows, cols) = self.dim();
        let bounds = (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(cols).unwrap_or(Coord::MAX),
        );
        NeighborIter::new(center, bounds)
    }
}

/// Relative `(row, col)` offsets in enumeration order. The deduction solver picks the first
/// matching neighbor, so this order is part of its observable behavior.
pub const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// `coords + delta` when the result stays inside `bounds`.
fn offset_within(
    coords: Coord2,
    (d_row, d_col): (isize, isize),
    bounds: Coord2,
) -> Option<Coord2> {
    let row = coords.0.checked_add_signed(d_row.try_into().ok()?)?;
    let col = coords.1.checked_add_signed(d_col.try_into().ok()?)?;
    (row < bounds.0 && col < bounds.1).then_some((row, col))
}

/// In-bounds neighbors of a cell, in [`DISPLACEMENTS`] order.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    offsets: core::slice::Iter<'static, (isize, isize)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        let offsets: &'static [(isize, isize); 8] = &DISPLACEMENTS;
        Self {
            center,
            bounds,
            offsets: offsets.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (center, bounds) = (self.center, self.bounds);
        self.offsets
            .find_map(|&delta| offset_within(center, delta, bounds))
    }
}
