// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integrating new simplices into the mesh.
//!
//! A requested line or face is first treated as a candidate. It is checked
//! against the mesh for crossings of complementary dimension (a candidate
//! line against faces, a candidate face against lines). The first crossing
//! found is resolved: both simplices are split at a shared point and the
//! candidate is rebuilt from its pieces, each of which goes through the same
//! check. Only a candidate with no crossing left is committed, and only if
//! all of its points lie in the meshed region.
//!
//! When exactly one point of the candidate is inside the mesh, any crossing
//! must leave that point's star first, so the search is limited to the
//! simplices opposite it.

use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::intersection::Intersection;
use crate::keys::*;
use crate::style::{intersect_all, StyleSet, StyleSets};
use crate::subdivision::Subdivision;
use crate::world::World;

/// Outcome of integrating a candidate simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration<K> {
    /// The simplex is in the mesh under this key.
    Committed(K),
    /// The candidate crossed the mesh and was rebuilt in pieces around this
    /// point. The pieces are in the mesh, the candidate itself is not.
    Redirected { point: PointKey },
    /// The candidate lies (partly) outside the meshed region and was dropped.
    Discarded,
}

impl<K: Copy> Integration<K> {
    /// The committed key, if any.
    pub fn committed(&self) -> Option<K> {
        match self {
            Integration::Committed(k) => Some(*k),
            _ => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Integration::Committed(_))
    }
}

impl World {
    /// Inserts a point at `position` using the world's tolerance.
    ///
    /// See [`World::create_point_with_tolerance`].
    pub fn create_point(&mut self, position: Point3<f64>, style: StyleSets) -> Result<PointKey> {
        self.create_point_with_tolerance(position, style, self.tolerance())
    }

    /// Inserts a point at `position`.
    ///
    /// If the position lies in a tetrahedron (boundary included, within
    /// `tol`), the lowest dimensional simplex containing it is split there
    /// and the point is visible. A position on an existing vertex returns
    /// that vertex with `style` attached. A position outside the mesh gives
    /// a free, invisible point.
    pub fn create_point_with_tolerance(
        &mut self,
        position: Point3<f64>,
        style: StyleSets,
        tol: f64,
    ) -> Result<PointKey> {
        let located = self.tetrahedra().find_map(|(key, tet)| {
            tet.basis
                .inside(&position, tol)
                .map(|coords| (key, tet.points, coords))
        });

        let Some((tetrahedron, points, coords)) = located else {
            debug!(?position, "point outside the mesh");
            return Ok(self.insert_point(position, style, false));
        };
        trace!(?tetrahedron, ?coords, "point located");
        Subdivision::new(
            points[0],
            points[1..].iter().copied(),
            coords.iter().copied(),
            style,
            tol,
        )?
        .reduce(self)
    }

    // --- Lines ---

    /// Integrates the line from `a` to `b`.
    ///
    /// Returns the existing line if there is one. Otherwise the segment is
    /// split wherever it crosses a face, and only pieces inside the mesh are
    /// kept.
    pub fn add_line(&mut self, a: PointKey, b: PointKey) -> Result<Integration<LineKey>> {
        for p in [a, b] {
            if !self.points.contains_key(p) {
                return Err(Error::PointNotFound(p));
            }
        }
        if a == b {
            return Err(Error::CoincidentEndpoints(a));
        }

        loop {
            if let Some(existing) = self.line_between(a, b) {
                return Ok(Integration::Committed(existing));
            }

            let Some(intersection) = self.find_line_crossing(a, b)? else {
                if self.is_visible(a) && self.is_visible(b) {
                    return Ok(Integration::Committed(self.insert_line(a, b)?));
                }
                trace!(?a, ?b, "line outside the mesh discarded");
                return Ok(Integration::Discarded);
            };

            let point = intersection.intersect(self)?;
            if intersection.first().ndim() == 0 {
                // an endpoint sat on a face; that face now has it as a vertex
                continue;
            }

            debug!(?a, ?b, ?point, "line redirected");
            self.add_line(a, point)?;
            self.add_line(point, b)?;
            return Ok(Integration::Redirected { point });
        }
    }

    fn find_line_crossing(&self, a: PointKey, b: PointKey) -> Result<Option<Intersection>> {
        let style = self.candidate_line_style(a, b);
        let faces = match (self.is_visible(a), self.is_visible(b)) {
            (true, false) => self.faces_opposite(a),
            (false, true) => self.faces_opposite(b),
            _ => self.face_order.clone(),
        };

        for face in faces {
            let Some(points) = self.face_points(face) else {
                continue;
            };
            if points.contains(&a) || points.contains(&b) {
                continue;
            }
            let found = self.intersect_points(&[a, b], &points, &style, self.tolerance())?;
            if let Some(found) = found {
                trace!(?face, "line crosses face");
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Faces opposite `point` in the tetrahedra around it.
    fn faces_opposite(&self, point: PointKey) -> Vec<FaceKey> {
        let mut faces: Vec<FaceKey> = self
            .point_tetrahedra(point)
            .into_iter()
            .filter_map(|t| self.opposite_face(t, point))
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    fn candidate_line_style(&self, a: PointKey, b: PointKey) -> StyleSets {
        let ends: SmallVec<[&StyleSets; 2]> = [a, b]
            .iter()
            .filter_map(|&p| self.points.get(p).map(|d| &d.style))
            .collect();
        StyleSets {
            point: StyleSet::new(),
            line: intersect_all(ends.iter().map(|s| &s.line)),
            face: intersect_all(ends.iter().map(|s| &s.face)),
        }
    }

    // --- Faces ---

    /// Integrates the face bounded by three lines.
    ///
    /// The lines must close up (see [`World::add_tetrahedron`] for the
    /// analogous rule on faces). Returns the existing face if there is one.
    /// Otherwise the triangle is split wherever a line pierces it, and only
    /// pieces inside the mesh are kept.
    pub fn add_face(&mut self, lines: [LineKey; 3]) -> Result<Integration<FaceKey>> {
        let points = self.face_closure(lines)?;
        self.scan_face(points)
    }

    /// Integrates the triangle on three points, integrating its edges first.
    ///
    /// An edge that gets redirected splits the triangle through the
    /// redirection point and each half is integrated on its own. Edges that
    /// are discarded do not end the search: a triangle with its corners
    /// outside the mesh may still be pierced by mesh lines.
    pub fn add_triangle(
        &mut self,
        a: PointKey,
        b: PointKey,
        c: PointKey,
    ) -> Result<Integration<FaceKey>> {
        if a == b || b == c || a == c {
            return Err(Error::StructuralInconsistency(format!(
                "triangle on repeated points {a:?}, {b:?}, {c:?}"
            )));
        }

        for (u, v, apex) in [(a, b, c), (b, c, a), (a, c, b)] {
            if let Integration::Redirected { point } = self.add_line(u, v)? {
                self.add_triangle(u, point, apex)?;
                self.add_triangle(point, v, apex)?;
                return Ok(Integration::Redirected { point });
            }
        }
        self.scan_face([a, b, c])
    }

    /// Checks a candidate triangle against every line it might cross.
    ///
    /// Its edges need not be in the mesh. It is committed only when no line
    /// crosses it, all three edges are in the mesh and all points are
    /// visible.
    fn scan_face(&mut self, points: [PointKey; 3]) -> Result<Integration<FaceKey>> {
        let [a, b, c] = points;
        loop {
            if let Some(existing) = self.face_between(a, b, c) {
                return Ok(Integration::Committed(existing));
            }

            let Some(intersection) = self.find_face_crossing(points)? else {
                let lines = [(a, b), (b, c), (a, c)].map(|(u, v)| self.line_between(u, v));
                let visible = points.iter().all(|&p| self.is_visible(p));
                return match lines {
                    [Some(ab), Some(bc), Some(ac)] if visible => {
                        Ok(Integration::Committed(self.insert_face([ab, bc, ac])?))
                    }
                    _ => {
                        trace!(?points, "face outside the mesh discarded");
                        Ok(Integration::Discarded)
                    }
                };
            };

            let point = intersection.intersect(self)?;
            let candidate = intersection.first();
            match candidate.ndim() {
                0 => continue,
                1 => {
                    // the crossing was on an edge, which is now split at `point`
                    let [u, v] = [candidate.base_point(), candidate.end_points()[0]];
                    let apex = points
                        .into_iter()
                        .find(|p| *p != u && *p != v)
                        .ok_or_else(|| Error::StructuralInconsistency("flat candidate".into()))?;
                    debug!(?points, ?point, "face split on an edge");
                    self.add_triangle(u, point, apex)?;
                    self.add_triangle(point, v, apex)?;
                }
                _ => {
                    debug!(?points, ?point, "face redirected");
                    for (u, v) in [(a, b), (b, c), (a, c)] {
                        self.add_triangle(u, v, point)?;
                    }
                }
            }
            return Ok(Integration::Redirected { point });
        }
    }

    fn find_face_crossing(&self, points: [PointKey; 3]) -> Result<Option<Intersection>> {
        let style = self.candidate_face_style(points);
        let visible: SmallVec<[PointKey; 3]> = points
            .iter()
            .copied()
            .filter(|&p| self.is_visible(p))
            .collect();
        let candidates = match visible.as_slice() {
            &[p] => self.lines_opposite(p),
            _ => self.line_order.clone(),
        };

        for line in candidates {
            let Some(ends) = self.line_points(line) else {
                continue;
            };
            if ends.iter().any(|p| points.contains(p)) {
                continue;
            }
            let found = self.intersect_points(&points, &ends, &style, self.tolerance())?;
            if let Some(found) = found {
                trace!(?line, "face pierced by line");
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Lines opposite `point` in the faces around it.
    fn lines_opposite(&self, point: PointKey) -> Vec<LineKey> {
        let mut lines: Vec<LineKey> = self
            .point_faces(point)
            .into_iter()
            .filter_map(|f| self.opposite_line(f, point))
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    /// Face tokens shared by the candidate's edges, or by its corners for
    /// edges not in the mesh.
    fn candidate_face_style(&self, points: [PointKey; 3]) -> StyleSets {
        let [a, b, c] = points;
        let lines = [(a, b), (b, c), (a, c)].map(|(u, v)| self.line_between(u, v));
        let face = match lines {
            [Some(ab), Some(bc), Some(ac)] => intersect_all(
                [ab, bc, ac]
                    .iter()
                    .filter_map(|&l| self.lines.get(l).map(|d| &d.style.face)),
            ),
            _ => intersect_all(
                points
                    .iter()
                    .filter_map(|&p| self.points.get(p).map(|d| &d.style.face)),
            ),
        };
        StyleSets {
            face,
            ..StyleSets::default()
        }
    }
}
