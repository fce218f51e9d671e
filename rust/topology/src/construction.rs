// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction and destruction of simplices.
//!
//! Every simplex is created through the world, which ensures referential
//! integrity (all referenced sub-simplices must exist and close up) and
//! maintains the bidirectional adjacency index. The methods here do no
//! geometric checks; the crossing-aware entry points live in
//! [`crate::integration`].
//!
//! Creation is idempotent per vertex set: asking for a line, face or
//! tetrahedron that already exists hands back the existing key.
//!
//! Destruction cascades upward. Removing a point removes every line using
//! it, removing a line removes every face using it, and so on.

use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{Error, Result};
use crate::geometry::AffineBasis;
use crate::keys::*;
use crate::style::StyleSets;
use crate::world::*;

impl World {
    /// Adds a point. No containment test is made; see
    /// [`World::create_point`] for the mesh-aware version.
    pub(crate) fn insert_point(
        &mut self,
        position: Point3<f64>,
        style: StyleSets,
        visible: bool,
    ) -> PointKey {
        let key = self.points.insert(PointData {
            position,
            style,
            visible,
        });
        self.point_order.push(key);
        trace!(?key, ?position, visible, "point inserted");
        key
    }

    /// Returns the line joining `a` and `b`, creating it if needed.
    pub(crate) fn insert_line(&mut self, a: PointKey, b: PointKey) -> Result<LineKey> {
        for p in [a, b] {
            if !self.points.contains_key(p) {
                return Err(Error::PointNotFound(p));
            }
        }
        if a == b {
            return Err(Error::CoincidentEndpoints(a));
        }
        if let Some(existing) = self.line_between(a, b) {
            return Ok(existing);
        }

        let key = self.lines.insert(LineData {
            points: [a, b],
            style: StyleSets::default(),
            own_style: StyleSets::default(),
        });
        self.line_order.push(key);
        self.link_point_line(a, key);
        self.link_point_line(b, key);
        self.refresh_line_style(key);
        trace!(?key, ?a, ?b, "line inserted");
        Ok(key)
    }

    /// Checks that three lines bound a triangle and returns its points.
    ///
    /// The lines must be distinct, share exactly one point pairwise, and
    /// together touch exactly three points.
    pub(crate) fn face_closure(&self, lines: [LineKey; 3]) -> Result<[PointKey; 3]> {
        let mut ends = [[PointKey::default(); 2]; 3];
        for (slot, &l) in ends.iter_mut().zip(&lines) {
            *slot = self.line_points(l).ok_or(Error::LineNotFound(l))?;
        }

        for i in 0..3 {
            for j in (i + 1)..3 {
                let shared = ends[i].iter().filter(|p| ends[j].contains(p)).count();
                if lines[i] == lines[j] || shared != 1 {
                    return Err(Error::StructuralInconsistency(format!(
                        "lines {:?} and {:?} do not meet in one point",
                        lines[i], lines[j]
                    )));
                }
            }
        }

        let [a, b] = ends[0];
        let c = ends[1]
            .iter()
            .copied()
            .find(|p| !ends[0].contains(p))
            .ok_or_else(|| Error::StructuralInconsistency("face lines collapse".into()))?;
        if !ends[2].iter().all(|p| [a, b, c].contains(p)) {
            return Err(Error::StructuralInconsistency(
                "face lines span more than three points".into(),
            ));
        }
        Ok([a, b, c])
    }

    /// Returns the face bounded by `lines`, creating it if needed.
    pub(crate) fn insert_face(&mut self, lines: [LineKey; 3]) -> Result<FaceKey> {
        let points = self.face_closure(lines)?;
        let [a, b, c] = points;
        if let Some(existing) = self.face_between(a, b, c) {
            return Ok(existing);
        }

        let key = self.faces.insert(FaceData {
            lines,
            points,
            style: StyleSets::default(),
            own_style: StyleSets::default(),
        });
        self.face_order.push(key);
        for l in lines {
            self.link_line_face(l, key);
        }
        self.refresh_face_style(key);
        trace!(?key, ?points, "face inserted");
        Ok(key)
    }

    /// Returns the face spanned by three points, creating missing lines.
    pub(crate) fn link_face(&mut self, a: PointKey, b: PointKey, c: PointKey) -> Result<FaceKey> {
        let lines = [
            self.insert_line(a, b)?,
            self.insert_line(b, c)?,
            self.insert_line(a, c)?,
        ];
        self.insert_face(lines)
    }

    /// Returns the tetrahedron spanned by four points, creating missing
    /// lines and faces. `a` becomes the base of the barycentric frame.
    pub(crate) fn link_tetrahedron(
        &mut self,
        a: PointKey,
        b: PointKey,
        c: PointKey,
        d: PointKey,
    ) -> Result<TetrahedronKey> {
        let faces = [
            self.link_face(a, b, c)?,
            self.link_face(a, b, d)?,
            self.link_face(a, c, d)?,
            self.link_face(b, c, d)?,
        ];
        self.add_tetrahedron(faces)
    }

    /// Creates a tetrahedron from four faces.
    ///
    /// The faces must be distinct, share exactly one line pairwise, and
    /// together span six lines and four points. If a tetrahedron on these
    /// points already exists, its key is returned instead.
    pub fn add_tetrahedron(&mut self, faces: [FaceKey; 4]) -> Result<TetrahedronKey> {
        let mut face_lines = [[LineKey::default(); 3]; 4];
        for (slot, &f) in face_lines.iter_mut().zip(&faces) {
            *slot = self.face_lines(f).ok_or(Error::FaceNotFound(f))?;
        }

        for i in 0..4 {
            for j in (i + 1)..4 {
                let shared = face_lines[i]
                    .iter()
                    .filter(|l| face_lines[j].contains(l))
                    .count();
                if faces[i] == faces[j] || shared != 1 {
                    return Err(Error::StructuralInconsistency(format!(
                        "faces {:?} and {:?} do not meet in one line",
                        faces[i], faces[j]
                    )));
                }
            }
        }

        let mut lines: SmallVec<[LineKey; 6]> = SmallVec::new();
        for &l in face_lines.iter().flatten() {
            if !lines.contains(&l) {
                lines.push(l);
            }
        }
        let mut points: SmallVec<[PointKey; 4]> = SmallVec::new();
        for f in faces {
            for p in self.faces[f].points {
                if !points.contains(&p) {
                    points.push(p);
                }
            }
        }
        let (Ok(lines), Ok(points)) = (
            <[LineKey; 6]>::try_from(lines.as_slice()),
            <[PointKey; 4]>::try_from(points.as_slice()),
        ) else {
            return Err(Error::StructuralInconsistency(format!(
                "faces span {} lines and {} points, expected 6 and 4",
                lines.len(),
                points.len()
            )));
        };

        if let Some(existing) = self.tetrahedron_between(points) {
            return Ok(existing);
        }

        let positions = points.map(|p| self.points[p].position);
        let basis = AffineBasis::new(positions[0], [positions[1], positions[2], positions[3]]);
        let key = self.tetrahedra.insert(TetrahedronData {
            faces,
            lines,
            points,
            basis,
        });
        self.tetrahedron_order.push(key);
        for f in faces {
            self.link_face_tetrahedron(f, key);
        }
        trace!(?key, ?points, "tetrahedron inserted");
        Ok(key)
    }

    // --- Destruction ---

    /// Removes a tetrahedron. Its faces stay.
    pub fn destroy_tetrahedron(&mut self, key: TetrahedronKey) -> Result<()> {
        let data = self
            .tetrahedra
            .remove(key)
            .ok_or(Error::TetrahedronNotFound(key))?;
        for f in data.faces {
            self.unlink_face_tetrahedron(f, key);
        }
        self.tetrahedron_order.retain(|&k| k != key);
        trace!(?key, "tetrahedron destroyed");
        Ok(())
    }

    /// Removes a face and every tetrahedron using it.
    pub fn destroy_face(&mut self, key: FaceKey) -> Result<()> {
        if !self.faces.contains_key(key) {
            return Err(Error::FaceNotFound(key));
        }
        for t in self.face_tetrahedra(key) {
            self.destroy_tetrahedron(t)?;
        }
        let data = self.faces.remove(key).ok_or(Error::FaceNotFound(key))?;
        for l in data.lines {
            self.unlink_line_face(l, key);
        }
        self.face_to_tetrahedra.remove(&key);
        self.face_order.retain(|&k| k != key);
        trace!(?key, "face destroyed");
        Ok(())
    }

    /// Removes a line and every face (and tetrahedron) using it.
    pub fn destroy_line(&mut self, key: LineKey) -> Result<()> {
        if !self.lines.contains_key(key) {
            return Err(Error::LineNotFound(key));
        }
        for f in self.line_faces(key) {
            self.destroy_face(f)?;
        }
        let data = self.lines.remove(key).ok_or(Error::LineNotFound(key))?;
        for p in data.points {
            self.unlink_point_line(p, key);
        }
        self.line_to_faces.remove(&key);
        self.line_order.retain(|&k| k != key);
        trace!(?key, "line destroyed");
        Ok(())
    }

    /// Removes a point and everything built on it.
    pub fn destroy_point(&mut self, key: PointKey) -> Result<()> {
        if !self.points.contains_key(key) {
            return Err(Error::PointNotFound(key));
        }
        for l in self.point_lines(key) {
            self.destroy_line(l)?;
        }
        self.points.remove(key);
        self.point_to_lines.remove(&key);
        self.point_order.retain(|&k| k != key);
        trace!(?key, "point destroyed");
        Ok(())
    }
}
