// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stellar re-triangulation around a new point.
//!
//! Splitting a simplex at a point `Y` replaces it, and every simplex built on
//! it, by the cone from `Y` over what remains. The replacement simplices are
//! created by vertex set before the old ones are destroyed, so the complex is
//! never left with a hole.
//!
//! The split point may already be joined to the split simplex: it then lies
//! on it only up to tolerance, and the sliver face or tetrahedron spanned by
//! both has no cone over the point. Slivers are collapsed with the simplex
//! instead of being re-triangulated.

use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::*;
use crate::style::StyleSets;
use crate::world::World;

impl World {
    /// Splits a line at `point`, together with its incident faces and
    /// tetrahedra. Faces and tetrahedra already having `point` as a vertex
    /// are collapsed.
    pub fn subdivide_line(&mut self, line: LineKey, point: PointKey) -> Result<()> {
        let data = self.lines.get(line).ok_or(Error::LineNotFound(line))?;
        let [p1, p2] = data.points;
        let own = data.own_style.clone();
        self.check_split_point(point, &[p1, p2])?;

        let faces: Vec<(PointKey, StyleSets)> = self
            .line_faces(line)
            .into_iter()
            .filter_map(|f| Some((self.apex(f, line)?, self.faces.get(f)?.own_style.clone())))
            .filter(|(apex, _)| *apex != point)
            .collect();
        let opposite: Vec<[PointKey; 2]> = self
            .line_tetrahedra(line)
            .into_iter()
            .filter_map(|t| self.others(&self.tetrahedra.get(t)?.points, &[p1, p2]))
            .filter(|pair| !pair.contains(&point))
            .collect();

        self.mark_visible(point);
        for (a, b) in [(p1, point), (point, p2)] {
            let piece = self.insert_line(a, b)?;
            self.inherit_line_style(piece, &own);
        }
        for (apex, face_style) in &faces {
            for (a, b) in [(p1, point), (point, p2)] {
                let piece = self.link_face(a, b, *apex)?;
                self.inherit_face_style(piece, face_style);
            }
        }
        for &[oa, ob] in &opposite {
            self.link_tetrahedron(p1, point, oa, ob)?;
            self.link_tetrahedron(point, p2, oa, ob)?;
        }

        self.destroy_line(line)?;
        debug!(
            ?line,
            ?point,
            faces = faces.len(),
            tetrahedra = opposite.len(),
            "line split"
        );
        Ok(())
    }

    /// Splits a face at an interior `point`, together with its incident
    /// tetrahedra. A tetrahedron already having `point` as a vertex is
    /// collapsed.
    pub fn subdivide_face(&mut self, face: FaceKey, point: PointKey) -> Result<()> {
        let data = self.faces.get(face).ok_or(Error::FaceNotFound(face))?;
        let [a, b, c] = data.points;
        let own = data.own_style.clone();
        self.check_split_point(point, &[a, b, c])?;

        let apexes: Vec<PointKey> = self
            .face_tetrahedra(face)
            .into_iter()
            .filter_map(|t| {
                let tet = self.tetrahedra.get(t)?;
                tet.points.iter().copied().find(|p| ![a, b, c].contains(p))
            })
            .filter(|&apex| apex != point)
            .collect();

        self.mark_visible(point);
        for (u, v) in [(a, b), (b, c), (a, c)] {
            let piece = self.link_face(u, v, point)?;
            self.inherit_face_style(piece, &own);
            for &apex in &apexes {
                self.link_tetrahedron(u, v, point, apex)?;
            }
        }

        self.destroy_face(face)?;
        debug!(?face, ?point, tetrahedra = apexes.len(), "face split");
        Ok(())
    }

    /// Splits a tetrahedron at an interior `point` into four.
    pub fn subdivide_tetrahedron(
        &mut self,
        tetrahedron: TetrahedronKey,
        point: PointKey,
    ) -> Result<()> {
        let [a, b, c, d] = self
            .tetrahedron_points(tetrahedron)
            .ok_or(Error::TetrahedronNotFound(tetrahedron))?;
        self.check_split_point(point, &[a, b, c, d])?;

        self.mark_visible(point);
        for [u, v, w] in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
            self.link_tetrahedron(u, v, w, point)?;
        }

        self.destroy_tetrahedron(tetrahedron)?;
        debug!(?tetrahedron, ?point, "tetrahedron split");
        Ok(())
    }

    fn check_split_point(&self, point: PointKey, vertices: &[PointKey]) -> Result<()> {
        if !self.points.contains_key(point) {
            return Err(Error::PointNotFound(point));
        }
        if vertices.contains(&point) {
            return Err(Error::StructuralInconsistency(format!(
                "cannot split a simplex at its own vertex {point:?}"
            )));
        }
        Ok(())
    }

    /// The two points of `all` that are not in `excluded`.
    fn others(&self, all: &[PointKey; 4], excluded: &[PointKey; 2]) -> Option<[PointKey; 2]> {
        let mut rest = all.iter().copied().filter(|p| !excluded.contains(p));
        Some([rest.next()?, rest.next()?])
    }

    pub(crate) fn mark_visible(&mut self, point: PointKey) {
        if let Some(data) = self.points.get_mut(point) {
            data.visible = true;
        }
    }

    fn inherit_line_style(&mut self, line: LineKey, own: &StyleSets) {
        if own.is_empty() {
            return;
        }
        if let Some(data) = self.lines.get_mut(line) {
            data.own_style.union_with(own);
        }
        self.refresh_line_style(line);
    }

    fn inherit_face_style(&mut self, face: FaceKey, own: &StyleSets) {
        if own.is_empty() {
            return;
        }
        if let Some(data) = self.faces.get_mut(face) {
            data.own_style.union_with(own);
        }
        self.refresh_face_style(face);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleToken;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn unit_tetrahedron(world: &mut World) -> (TetrahedronKey, [PointKey; 4]) {
        let p = [
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
        .map(|p| world.insert_point(p, StyleSets::default(), true));
        let tet = world.link_tetrahedron(p[0], p[1], p[2], p[3]).unwrap();
        (tet, p)
    }

    fn counts(world: &World) -> [usize; 4] {
        [
            world.point_count(),
            world.line_count(),
            world.face_count(),
            world.tetrahedron_count(),
        ]
    }

    #[test]
    fn tetrahedron_split_into_four() {
        let mut world = World::empty();
        let (tet, _) = unit_tetrahedron(&mut world);
        let y = world.insert_point(Point3::new(0.2, 0.2, 0.2), StyleSets::default(), false);

        world.subdivide_tetrahedron(tet, y).unwrap();
        assert_eq!(counts(&world), [5, 10, 10, 4]);
        assert!(world.is_visible(y));
        assert!(!world.contains(SimplexKey::Tetrahedron(tet)));
        assert_relative_eq!(world.total_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn face_split_carries_incident_tetrahedron() {
        let mut world = World::empty();
        let (_, [a, b, c, _]) = unit_tetrahedron(&mut world);
        let abc = world.face_between(a, b, c).unwrap();
        let y = world.insert_point(Point3::new(0.25, 0.25, 0.0), StyleSets::default(), false);

        world.subdivide_face(abc, y).unwrap();
        // y joins all 4 points, 6 new faces in place of 1, 3 tetrahedra in place of 1
        assert_eq!(counts(&world), [5, 10, 9, 3]);
        assert!(world.face_between(a, b, c).is_none());
        assert_relative_eq!(world.total_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn line_split_carries_faces_and_tetrahedra() {
        let mut world = World::empty();
        let (_, [a, b, ..]) = unit_tetrahedron(&mut world);
        let ab = world.line_between(a, b).unwrap();
        let y = world.insert_point(Point3::new(0.5, 0.0, 0.0), StyleSets::default(), false);

        world.subdivide_line(ab, y).unwrap();
        assert_eq!(counts(&world), [5, 9, 7, 2]);
        assert!(world.line_between(a, b).is_none());
        assert_eq!(world.point_lines(y).len(), 4);
        assert_relative_eq!(world.total_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn line_split_collapses_sliver_face_and_tetrahedron() {
        let mut world = World::empty();
        let (_, [a, b, _, d]) = unit_tetrahedron(&mut world);
        let ab = world.line_between(a, b).unwrap();
        let y = world.insert_point(Point3::new(0.5, 0.0, 0.0), StyleSets::default(), true);
        world.link_face(a, b, y).unwrap();
        world.link_tetrahedron(a, b, y, d).unwrap();

        world.subdivide_line(ab, y).unwrap();
        assert_eq!(counts(&world), [5, 9, 7, 2]);
        assert!(world.face_between(a, b, y).is_none());
        assert!(world.line_between(y, d).is_some());
        world.validate().unwrap();
        assert_relative_eq!(world.total_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn face_split_collapses_sliver_tetrahedron() {
        let mut world = World::empty();
        let (_, [a, b, c, _]) = unit_tetrahedron(&mut world);
        let abc = world.face_between(a, b, c).unwrap();
        let y = world.insert_point(Point3::new(0.25, 0.25, 0.0), StyleSets::default(), true);
        world.link_tetrahedron(a, b, c, y).unwrap();
        assert_eq!(world.tetrahedron_count(), 2);

        world.subdivide_face(abc, y).unwrap();
        assert_eq!(world.tetrahedron_count(), 3);
        assert!(world.tetrahedron_between([a, b, c, y]).is_none());
        world.validate().unwrap();
        assert_relative_eq!(world.total_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn split_at_own_vertex_fails() {
        let mut world = World::empty();
        let (tet, [a, ..]) = unit_tetrahedron(&mut world);
        assert!(matches!(
            world.subdivide_tetrahedron(tet, a),
            Err(Error::StructuralInconsistency(_))
        ));
        assert_eq!(world.tetrahedron_count(), 1);
    }

    #[test]
    fn pieces_inherit_own_style() {
        let mut world = World::empty();
        let (_, [a, b, c, d]) = unit_tetrahedron(&mut world);
        let ab = world.line_between(a, b).unwrap();
        let abc = world.face_between(a, b, c).unwrap();
        let mut style = StyleSets::default();
        style.line.insert(StyleToken(1));
        style.face.insert(StyleToken(2));
        world.attach_line_style(ab, &style).unwrap();
        world.attach_face_style(abc, &style).unwrap();

        let y = world.insert_point(Point3::new(0.5, 0.0, 0.0), StyleSets::default(), false);
        world.subdivide_line(ab, y).unwrap();

        for half in [world.line_between(a, y), world.line_between(y, b)] {
            let line = world.line(half.unwrap()).unwrap();
            assert!(line.style.line.contains(&StyleToken(1)));
        }
        for piece in [world.face_between(a, y, c), world.face_between(y, b, c)] {
            let face = world.face(piece.unwrap()).unwrap();
            assert!(face.style.face.contains(&StyleToken(2)));
        }
        let side = world.face_between(a, y, d).unwrap();
        assert!(world.face(side).unwrap().style.face.is_empty());
    }
}
