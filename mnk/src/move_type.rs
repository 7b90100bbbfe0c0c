use std::iter::FusedIterator;

use crate::bitset::bitset_traits;
use crate::Move;

/// A tactical category of a move.
///
/// The categories form a fixed lattice:
///
/// ```text
/// Possible ⊇ Tactical ⊇ Offensive ⊇ {Fork, Winning}
///                     ⊇ Defensive ⊇ {BlockFork, BlockWinning}
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MoveType {
    Possible,
    Tactical,
    Offensive,
    Defensive,
    Fork,
    Winning,
    BlockFork,
    BlockWinning,
}

impl MoveType {
    pub const ALL: [MoveType; 8] = [
        MoveType::Possible,
        MoveType::Tactical,
        MoveType::Offensive,
        MoveType::Defensive,
        MoveType::Fork,
        MoveType::Winning,
        MoveType::BlockFork,
        MoveType::BlockWinning,
    ];

    /// The next weaker category, `None` for [`MoveType::Possible`].
    pub fn parent(self) -> Option<MoveType> {
        match self {
            MoveType::Possible => None,
            MoveType::Tactical => Some(MoveType::Possible),
            MoveType::Offensive | MoveType::Defensive => Some(MoveType::Tactical),
            MoveType::Fork | MoveType::Winning => Some(MoveType::Offensive),
            MoveType::BlockFork | MoveType::BlockWinning => Some(MoveType::Defensive),
        }
    }

    /// This category together with every weaker category it implies.
    pub fn implied(self) -> MoveTypes {
        let mut set = MoveTypes::new().insert(self);
        let mut current = self;
        while let Some(parent) = current.parent() {
            set = set.insert(parent);
            current = parent;
        }
        set
    }

    fn from_index(idx: u8) -> Self {
        Self::ALL[idx as usize]
    }
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoveType::Possible => "possible",
            MoveType::Tactical => "tactical",
            MoveType::Offensive => "offensive",
            MoveType::Defensive => "defensive",
            MoveType::Fork => "fork",
            MoveType::Winning => "winning",
            MoveType::BlockFork => "block-fork",
            MoveType::BlockWinning => "block-winning",
        };
        write!(f, "{}", name)
    }
}

/// A set of [`MoveType`]s.
///
/// Tags are compared by value, so inserting a category twice has no
/// effect, no matter who produced it.
///
/// ```
/// use mnk::{MoveType, MoveTypes};
/// let tags = MoveTypes::new()
///     .insert(MoveType::Fork)
///     .insert(MoveType::Fork);
/// assert_eq!(tags.len(), 1);
/// assert_eq!(
///     Vec::from_iter(tags.closure()),
///     vec![MoveType::Possible, MoveType::Tactical, MoveType::Offensive, MoveType::Fork]
/// );
/// ```
///
/// The set is immutable: [`MoveTypes::insert`] returns a new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveTypes {
    // One bit per variant of MoveType, indexed by discriminant.
    bits: u8,
}

bitset_traits!(MoveTypes);

impl MoveTypes {
    /// Creates a new, empty set.
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn len(self) -> u32 {
        self.bits.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn contains(self, tag: MoveType) -> bool {
        self.bits & (1u8 << tag as u8) != 0
    }

    #[must_use] // Because users might expect this to be a mutating method
    pub fn insert(self, tag: MoveType) -> Self {
        Self {
            bits: self.bits | (1u8 << tag as u8),
        }
    }

    /// Adds every category implied by the ones already in the set.
    #[must_use]
    pub fn closure(self) -> Self {
        self.into_iter()
            .fold(Self::new(), |set, tag| set | tag.implied())
    }

    /// Does the set respect the lattice, i.e. hold every implied category?
    pub fn is_closed(self) -> bool {
        self.closure() == self
    }
}

impl std::fmt::Display for MoveTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, tag) in self.into_iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tag)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<MoveType> for MoveTypes {
    fn from_iter<T: IntoIterator<Item = MoveType>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), |set, tag| set.insert(tag))
    }
}

impl IntoIterator for MoveTypes {
    type Item = MoveType;

    type IntoIter = MoveTypesIter;

    fn into_iter(self) -> Self::IntoIter {
        MoveTypesIter { bits: self.bits }
    }
}

/// Iterator for a [`MoveTypes`] that returns categories in lattice order,
/// weakest first.
#[derive(Clone, Copy, Debug)]
pub struct MoveTypesIter {
    bits: u8,
}

impl Iterator for MoveTypesIter {
    type Item = MoveType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let idx = self.bits.trailing_zeros() as u8;
            self.bits ^= 1u8 << idx;
            Some(MoveType::from_index(idx))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.bits.count_ones() as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for MoveTypesIter {
    fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

impl FusedIterator for MoveTypesIter {}

/// A move together with the categories it was found to belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorizedMove {
    pub mv: Move,
    pub categories: MoveTypes,
}

impl CategorizedMove {
    pub fn new(mv: Move, categories: MoveTypes) -> Self {
        debug_assert!(categories.is_closed(), "{} is not closed", categories);
        Self { mv, categories }
    }

    pub fn is(&self, tag: MoveType) -> bool {
        self.categories.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_walks_up_the_lattice() {
        assert_eq!(MoveType::Possible.implied().len(), 1);
        assert_eq!(
            Vec::from_iter(MoveType::BlockWinning.implied()),
            vec![
                MoveType::Possible,
                MoveType::Tactical,
                MoveType::Defensive,
                MoveType::BlockWinning
            ]
        );
        for tag in MoveType::ALL {
            assert!(tag.implied().contains(tag));
            assert!(tag.implied().is_closed());
        }
    }

    #[test]
    fn set_operations() {
        let a = MoveTypes::from_iter([MoveType::Possible, MoveType::Tactical]);
        let b = MoveTypes::from_iter([MoveType::Tactical, MoveType::Offensive]);
        assert_eq!(Vec::from_iter(a & b), vec![MoveType::Tactical]);
        assert_eq!((a | b).len(), 3);
        assert_eq!(a | a, a);
        assert!((a & MoveType::Fork.implied()).contains(MoveType::Possible));
        assert!(!(a & MoveType::Fork.implied()).contains(MoveType::Fork));
    }

    #[test]
    fn closedness() {
        assert!(MoveTypes::new().is_closed());
        assert!(!MoveTypes::new().insert(MoveType::Fork).is_closed());
        assert!(MoveType::Fork.implied().is_closed());
    }

    #[test]
    fn display() {
        assert_eq!(MoveTypes::new().to_string(), "{}");
        assert_eq!(
            MoveType::Winning.implied().to_string(),
            "{possible, tactical, offensive, winning}"
        );
    }
}
