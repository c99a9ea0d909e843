use std::{fmt, str::FromStr};

use crate::foundation::error::{FractalError, FractalResult};

/// One of the 8 dihedral symmetries of a square block.
///
/// Ordinals are stable and are what transform files store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Symmetry {
    /// Copy as-is.
    Identity = 0,
    /// Quarter turn clockwise.
    Rot90 = 1,
    /// Half turn.
    Rot180 = 2,
    /// Quarter turn counter-clockwise.
    Rot270 = 3,
    /// Mirror left to right.
    FlipHorizontal = 4,
    /// Mirror top to bottom.
    FlipVertical = 5,
    /// Transpose across the main diagonal.
    FlipReverseDiagonal = 6,
    /// Transpose across the anti-diagonal. Decoded, never searched.
    FlipDiagonal = 7,
}

impl Symmetry {
    /// All symmetries in ordinal order.
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rot90,
        Symmetry::Rot180,
        Symmetry::Rot270,
        Symmetry::FlipHorizontal,
        Symmetry::FlipVertical,
        Symmetry::FlipReverseDiagonal,
        Symmetry::FlipDiagonal,
    ];

    /// Stable on-disk ordinal.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Symmetry::ordinal`]; ordinals past 7 are rejected.
    pub fn from_ordinal(ordinal: u8) -> FractalResult<Self> {
        Self::ALL
            .get(usize::from(ordinal))
            .copied()
            .ok_or_else(|| FractalError::validation(format!("unknown symmetry ordinal {ordinal}")))
    }

    /// The symmetry that undoes `self`.
    pub fn inverse(self) -> Self {
        match self {
            Symmetry::Rot90 => Symmetry::Rot270,
            Symmetry::Rot270 => Symmetry::Rot90,
            other => other,
        }
    }

    /// Kebab-case name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Symmetry::Identity => "identity",
            Symmetry::Rot90 => "rot90",
            Symmetry::Rot180 => "rot180",
            Symmetry::Rot270 => "rot270",
            Symmetry::FlipHorizontal => "flip-horizontal",
            Symmetry::FlipVertical => "flip-vertical",
            Symmetry::FlipReverseDiagonal => "flip-reverse-diagonal",
            Symmetry::FlipDiagonal => "flip-diagonal",
        }
    }

    pub(crate) fn traversal(self) -> Traversal {
        use Symmetry::*;
        Traversal {
            transposed: matches!(self, Rot90 | Rot270 | FlipReverseDiagonal | FlipDiagonal),
            positive_x: matches!(self, Identity | Rot90 | FlipVertical | FlipReverseDiagonal),
            positive_y: matches!(self, Identity | Rot270 | FlipHorizontal | FlipReverseDiagonal),
        }
    }
}

impl From<Symmetry> for u8 {
    fn from(s: Symmetry) -> Self {
        s.ordinal()
    }
}

impl TryFrom<u8> for Symmetry {
    type Error = FractalError;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal)
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symmetry {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sym| sym.name() == s)
            .ok_or_else(|| FractalError::validation(format!("unknown symmetry '{s}'")))
    }
}

/// Stepping rule shared by all 8 symmetries.
///
/// Destination pixels are visited row-major; the source pixel for `(dx, dy)`
/// swaps axes when `transposed` and mirrors an axis when its direction is negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Traversal {
    pub(crate) transposed: bool,
    pub(crate) positive_x: bool,
    pub(crate) positive_y: bool,
}

impl Traversal {
    #[inline]
    pub(crate) fn source_of(self, dx: u32, dy: u32, size: u32) -> (u32, u32) {
        let (u, v) = if self.transposed { (dy, dx) } else { (dx, dy) };
        let sx = if self.positive_x { u } else { size - 1 - u };
        let sy = if self.positive_y { v } else { size - 1 - v };
        (sx, sy)
    }
}

/// The symmetries the encoder tries for each domain candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "Vec<Symmetry>", from = "Vec<Symmetry>")]
pub struct SymmetrySet(u8);

impl SymmetrySet {
    /// No symmetries.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Just [`Symmetry::Identity`]; the encoder default.
    pub const fn identity_only() -> Self {
        Self(1)
    }

    /// Every symmetry the encoder may emit: all but [`Symmetry::FlipDiagonal`].
    pub const fn searchable() -> Self {
        Self(0b0111_1111)
    }

    /// Add `s` to the set.
    pub fn insert(&mut self, s: Symmetry) {
        self.0 |= 1 << s.ordinal();
    }

    /// Builder form of [`SymmetrySet::insert`].
    pub fn with(mut self, s: Symmetry) -> Self {
        self.insert(s);
        self
    }

    /// Whether `s` is a member.
    pub fn contains(self, s: Symmetry) -> bool {
        self.0 & (1 << s.ordinal()) != 0
    }

    /// Whether no symmetry is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Member count.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in ordinal order.
    pub fn iter(self) -> impl Iterator<Item = Symmetry> {
        Symmetry::ALL.into_iter().filter(move |&s| self.contains(s))
    }
}

impl Default for SymmetrySet {
    fn default() -> Self {
        Self::identity_only()
    }
}

impl FromIterator<Symmetry> for SymmetrySet {
    fn from_iter<I: IntoIterator<Item = Symmetry>>(iter: I) -> Self {
        let mut set = Self::empty();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl From<Vec<Symmetry>> for SymmetrySet {
    fn from(v: Vec<Symmetry>) -> Self {
        v.into_iter().collect()
    }
}

impl From<SymmetrySet> for Vec<Symmetry> {
    fn from(set: SymmetrySet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/symmetry.rs"]
mod tests;
