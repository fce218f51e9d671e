// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal methods for navigating the simplex hierarchy.
//!
//! Supports both downward traversal (tetrahedron → faces → lines → points)
//! and upward traversal (point → lines → faces → tetrahedra) via the
//! adjacency index. Upward queries return keys sorted by key so callers see
//! a stable order regardless of hash-set layout.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::keys::*;
use crate::world::World;

fn sorted<K: Ord + Copy>(set: Option<&FxHashSet<K>>) -> Vec<K> {
    let mut keys: Vec<K> = set.map(|s| s.iter().copied().collect()).unwrap_or_default();
    keys.sort_unstable();
    keys
}

// =============================================================================
// Downward traversal: extract sub-simplices
// =============================================================================

impl World {
    /// Returns the two endpoints of a line.
    pub fn line_points(&self, key: LineKey) -> Option<[PointKey; 2]> {
        self.lines.get(key).map(|l| l.points)
    }

    /// Returns the three lines of a face.
    pub fn face_lines(&self, key: FaceKey) -> Option<[LineKey; 3]> {
        self.faces.get(key).map(|f| f.lines)
    }

    /// Returns the three points of a face.
    pub fn face_points(&self, key: FaceKey) -> Option<[PointKey; 3]> {
        self.faces.get(key).map(|f| f.points)
    }

    /// Returns the four faces of a tetrahedron.
    pub fn tetrahedron_faces(&self, key: TetrahedronKey) -> Option<[FaceKey; 4]> {
        self.tetrahedra.get(key).map(|t| t.faces)
    }

    /// Returns the six lines of a tetrahedron.
    pub fn tetrahedron_lines(&self, key: TetrahedronKey) -> Option<[LineKey; 6]> {
        self.tetrahedra.get(key).map(|t| t.lines)
    }

    /// Returns the four points of a tetrahedron.
    pub fn tetrahedron_points(&self, key: TetrahedronKey) -> Option<[PointKey; 4]> {
        self.tetrahedra.get(key).map(|t| t.points)
    }

    /// Returns the points spanning any simplex.
    pub fn simplex_points(&self, key: SimplexKey) -> Option<SmallVec<[PointKey; 4]>> {
        match key {
            SimplexKey::Point(k) => self.points.contains_key(k).then(|| SmallVec::from_slice(&[k])),
            SimplexKey::Line(k) => self.line_points(k).map(|p| SmallVec::from_slice(&p)),
            SimplexKey::Face(k) => self.face_points(k).map(|p| SmallVec::from_slice(&p)),
            SimplexKey::Tetrahedron(k) => {
                self.tetrahedron_points(k).map(|p| SmallVec::from_slice(&p))
            }
        }
    }

    /// The face of a tetrahedron that does not contain `point`.
    pub fn opposite_face(&self, tetrahedron: TetrahedronKey, point: PointKey) -> Option<FaceKey> {
        let tet = self.tetrahedra.get(tetrahedron)?;
        tet.faces.iter().copied().find(|&f| {
            self.faces
                .get(f)
                .is_some_and(|face| !face.points.contains(&point))
        })
    }

    /// The line of a face that does not contain `point`.
    pub fn opposite_line(&self, face: FaceKey, point: PointKey) -> Option<LineKey> {
        let face = self.faces.get(face)?;
        face.lines.iter().copied().find(|&l| {
            self.lines
                .get(l)
                .is_some_and(|line| !line.points.contains(&point))
        })
    }

    /// The point of a face that does not lie on `line`.
    pub fn apex(&self, face: FaceKey, line: LineKey) -> Option<PointKey> {
        let on_line = self.lines.get(line)?.points;
        self.faces
            .get(face)?
            .points
            .iter()
            .copied()
            .find(|p| !on_line.contains(p))
    }

    // =========================================================================
    // Upward traversal: find parents via adjacency index
    // =========================================================================

    /// Returns lines that use a given point.
    pub fn point_lines(&self, key: PointKey) -> Vec<LineKey> {
        sorted(self.point_to_lines.get(&key))
    }

    /// Returns faces that use a given line.
    pub fn line_faces(&self, key: LineKey) -> Vec<FaceKey> {
        sorted(self.line_to_faces.get(&key))
    }

    /// Returns tetrahedra that use a given face.
    pub fn face_tetrahedra(&self, key: FaceKey) -> Vec<TetrahedronKey> {
        sorted(self.face_to_tetrahedra.get(&key))
    }

    /// Returns faces that have a given point as a vertex.
    pub fn point_faces(&self, key: PointKey) -> Vec<FaceKey> {
        let mut faces: Vec<FaceKey> = self
            .point_to_lines
            .get(&key)
            .into_iter()
            .flatten()
            .flat_map(|l| self.line_to_faces.get(l).into_iter().flatten().copied())
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    /// Returns tetrahedra that use a given line.
    pub fn line_tetrahedra(&self, key: LineKey) -> Vec<TetrahedronKey> {
        let mut tets: Vec<TetrahedronKey> = self
            .line_to_faces
            .get(&key)
            .into_iter()
            .flatten()
            .flat_map(|f| self.face_to_tetrahedra.get(f).into_iter().flatten().copied())
            .collect();
        tets.sort_unstable();
        tets.dedup();
        tets
    }

    /// Returns tetrahedra that have a given point as a vertex.
    pub fn point_tetrahedra(&self, key: PointKey) -> Vec<TetrahedronKey> {
        let mut tets: Vec<TetrahedronKey> = self
            .point_faces(key)
            .iter()
            .flat_map(|f| self.face_to_tetrahedra.get(f).into_iter().flatten().copied())
            .collect();
        tets.sort_unstable();
        tets.dedup();
        tets
    }

    // =========================================================================
    // Lookup by vertex set
    // =========================================================================

    /// The line joining two points, if one exists.
    pub fn line_between(&self, a: PointKey, b: PointKey) -> Option<LineKey> {
        self.point_to_lines
            .get(&a)?
            .iter()
            .copied()
            .filter(|&l| self.lines.get(l).is_some_and(|line| line.points.contains(&b)))
            .min()
    }

    /// The face spanned by three points, if one exists.
    pub fn face_between(&self, a: PointKey, b: PointKey, c: PointKey) -> Option<FaceKey> {
        let ab = self.line_between(a, b)?;
        self.line_to_faces
            .get(&ab)?
            .iter()
            .copied()
            .filter(|&f| self.faces.get(f).is_some_and(|face| face.points.contains(&c)))
            .min()
    }

    /// The tetrahedron spanned by four points, if one exists.
    pub fn tetrahedron_between(&self, points: [PointKey; 4]) -> Option<TetrahedronKey> {
        let [a, b, c, d] = points;
        let abc = self.face_between(a, b, c)?;
        self.face_to_tetrahedra
            .get(&abc)?
            .iter()
            .copied()
            .filter(|&t| {
                self.tetrahedra
                    .get(t)
                    .is_some_and(|tet| tet.points.contains(&d))
            })
            .min()
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Whether a point lies inside (or on) the meshed region.
    pub fn is_visible(&self, key: PointKey) -> bool {
        self.points.get(key).is_some_and(|p| p.visible)
    }

    /// A line is visible when both endpoints are.
    pub fn line_is_visible(&self, key: LineKey) -> bool {
        self.lines
            .get(key)
            .is_some_and(|l| l.points.iter().all(|&p| self.is_visible(p)))
    }

    /// A face is visible when all three points are.
    pub fn face_is_visible(&self, key: FaceKey) -> bool {
        self.faces
            .get(key)
            .is_some_and(|f| f.points.iter().all(|&p| self.is_visible(p)))
    }
}
