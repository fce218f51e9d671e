// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simplex key types for arena-based storage.
//!
//! Each simplex gets a unique, type-safe key for O(1) lookup in the world.
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! simplices are removed (generational indices). A destroyed simplex leaves
//! its key stale, so a handle kept across a mutation can always be checked
//! with [`World::contains`](crate::World::contains).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a point (0-simplex).
    pub struct PointKey;

    /// Key for a line (1-simplex spanning two points).
    pub struct LineKey;

    /// Key for a face (2-simplex spanning three lines).
    pub struct FaceKey;

    /// Key for a tetrahedron (3-simplex spanning four faces).
    pub struct TetrahedronKey;
}

/// A key that can reference any simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimplexKey {
    Point(PointKey),
    Line(LineKey),
    Face(FaceKey),
    Tetrahedron(TetrahedronKey),
}

impl SimplexKey {
    /// Returns the simplex type of this key.
    pub fn simplex_type(&self) -> SimplexType {
        match self {
            SimplexKey::Point(_) => SimplexType::Point,
            SimplexKey::Line(_) => SimplexType::Line,
            SimplexKey::Face(_) => SimplexType::Face,
            SimplexKey::Tetrahedron(_) => SimplexType::Tetrahedron,
        }
    }
}

/// Discriminant for simplex types. The discriminant is the topological
/// dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimplexType {
    Point = 0,
    Line = 1,
    Face = 2,
    Tetrahedron = 3,
}

impl SimplexType {
    /// Topological dimension of the simplex.
    pub fn dimension(&self) -> usize {
        *self as usize
    }

    /// Number of points spanning the simplex.
    pub fn vertex_count(&self) -> usize {
        self.dimension() + 1
    }

    /// Returns the simplex type of the given dimension, if it exists in 3D.
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        match dimension {
            0 => Some(SimplexType::Point),
            1 => Some(SimplexType::Line),
            2 => Some(SimplexType::Face),
            3 => Some(SimplexType::Tetrahedron),
            _ => None,
        }
    }

    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimplexType::Point => "Point",
            SimplexType::Line => "Line",
            SimplexType::Face => "Face",
            SimplexType::Tetrahedron => "Tetrahedron",
        }
    }
}

impl std::fmt::Display for SimplexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PointKey> for SimplexKey {
    fn from(k: PointKey) -> Self {
        SimplexKey::Point(k)
    }
}

impl From<LineKey> for SimplexKey {
    fn from(k: LineKey) -> Self {
        SimplexKey::Line(k)
    }
}

impl From<FaceKey> for SimplexKey {
    fn from(k: FaceKey) -> Self {
        SimplexKey::Face(k)
    }
}

impl From<TetrahedronKey> for SimplexKey {
    fn from(k: TetrahedronKey) -> Self {
        SimplexKey::Tetrahedron(k)
    }
}
