use super::Position;

/// A 2D area represented by a min + max coordinate pair.
///
/// The two coordinates form an _inclusive_ 2D range, i.e. unlike in a
/// half-open range, it's possible for a point with `row == row_max`
/// to be contained in the area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub row_min: i32,
    pub column_min: i32,
    pub row_max: i32,
    pub column_max: i32,
}

impl BoundingBox {
    pub fn contains(&self, position: Position) -> bool {
        position.row >= self.row_min
            && position.column >= self.column_min
            && position.row <= self.row_max
            && position.column <= self.column_max
    }

    pub fn singleton(position: Position) -> Self {
        Self {
            row_min: position.row,
            column_min: position.column,
            row_max: position.row,
            column_max: position.column,
        }
    }

    /// The square of cells within Chebyshev distance `radius` of `center`.
    pub fn around(center: Position, radius: i32) -> Self {
        Self::singleton(center).expand(radius)
    }

    pub fn from_positions(mut iter: impl Iterator<Item = Position>) -> Option<Self> {
        let mut bbox = Self::singleton(iter.next()?);
        for position in iter {
            bbox.update(position);
        }
        Some(bbox)
    }

    /// Expands the bounding box to cover `position`.
    pub fn update(&mut self, position: Position) {
        self.row_min = self.row_min.min(position.row);
        self.row_max = self.row_max.max(position.row);
        self.column_min = self.column_min.min(position.column);
        self.column_max = self.column_max.max(position.column);
    }

    /// Grows the box by `margin` cells on every side, stopping at the
    /// limits of `i32`.
    #[must_use]
    pub fn expand(self, margin: i32) -> Self {
        Self {
            row_min: self.row_min.saturating_sub(margin),
            column_min: self.column_min.saturating_sub(margin),
            row_max: self.row_max.saturating_add(margin),
            column_max: self.column_max.saturating_add(margin),
        }
    }

    /// The overlap of both boxes, if there is any.
    pub fn intersect(self, other: BoundingBox) -> Option<Self> {
        let bbox = Self {
            row_min: self.row_min.max(other.row_min),
            column_min: self.column_min.max(other.column_min),
            row_max: self.row_max.min(other.row_max),
            column_max: self.column_max.min(other.column_max),
        };
        (bbox.row_min <= bbox.row_max && bbox.column_min <= bbox.column_max).then_some(bbox)
    }

    /// All cells of the area in row-major order.
    pub fn positions(self) -> impl DoubleEndedIterator<Item = Position> {
        (self.row_min..=self.row_max).flat_map(move |row| {
            (self.column_min..=self.column_max).map(move |column| Position::new(row, column))
        })
    }
}
