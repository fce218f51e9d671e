// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Style tokens attached to simplices.
//!
//! A [`StyleToken`] is an opaque handle standing for whatever paints a
//! simplex (see [`crate::paint`]). Points carry three token sets, one per
//! simplex kind they may contribute to. Lines and faces derive theirs from
//! their vertices by intersection: a token applies to a line only when both
//! endpoints carry it, and to a face only when all three lines do. Tokens
//! attached to a line or face directly are kept separately and unioned into
//! the derived sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::*;
use crate::world::World;

/// Opaque style handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleToken(pub u32);

/// Set of style tokens.
pub type StyleSet = BTreeSet<StyleToken>;

/// Token sets for the point, line and face style categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSets {
    #[serde(default)]
    pub point: StyleSet,
    #[serde(default)]
    pub line: StyleSet,
    #[serde(default)]
    pub face: StyleSet,
}

impl StyleSets {
    /// Creates token sets from the three categories.
    pub fn new(
        point: impl IntoIterator<Item = StyleToken>,
        line: impl IntoIterator<Item = StyleToken>,
        face: impl IntoIterator<Item = StyleToken>,
    ) -> Self {
        Self {
            point: point.into_iter().collect(),
            line: line.into_iter().collect(),
            face: face.into_iter().collect(),
        }
    }

    /// Returns `true` if no category holds a token.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty() && self.line.is_empty() && self.face.is_empty()
    }

    /// Unions `other` into `self`, category by category.
    pub fn union_with(&mut self, other: &StyleSets) {
        self.point.extend(other.point.iter().copied());
        self.line.extend(other.line.iter().copied());
        self.face.extend(other.face.iter().copied());
    }
}

/// Tokens common to every set; empty when there are no sets.
pub(crate) fn intersect_all<'a>(mut sets: impl Iterator<Item = &'a StyleSet>) -> StyleSet {
    let Some(first) = sets.next() else {
        return StyleSet::new();
    };
    sets.fold(first.clone(), |acc, s| acc.intersection(s).copied().collect())
}

impl World {
    /// Adds tokens to a point and refreshes the derived style of every
    /// incident line (and through them, every incident face).
    pub fn attach_point_style(&mut self, point: PointKey, style: &StyleSets) -> Result<()> {
        let data = self
            .points
            .get_mut(point)
            .ok_or(Error::PointNotFound(point))?;
        data.style.union_with(style);

        for line in self.point_lines(point) {
            self.refresh_line_style(line);
        }
        Ok(())
    }

    /// Adds tokens to a line. Point tokens go to both endpoints; line and
    /// face tokens stay on the line itself and flow into its faces.
    pub fn attach_line_style(&mut self, line: LineKey, style: &StyleSets) -> Result<()> {
        let data = self.lines.get_mut(line).ok_or(Error::LineNotFound(line))?;
        data.own_style.line.extend(style.line.iter().copied());
        data.own_style.face.extend(style.face.iter().copied());
        let points = data.points;

        if !style.point.is_empty() {
            let point_only = StyleSets {
                point: style.point.clone(),
                ..StyleSets::default()
            };
            for p in points {
                self.attach_point_style(p, &point_only)?;
            }
        }
        self.refresh_line_style(line);
        Ok(())
    }

    /// Adds tokens to a face. Point tokens go to its three points, line
    /// tokens to its three lines, face tokens stay on the face.
    pub fn attach_face_style(&mut self, face: FaceKey, style: &StyleSets) -> Result<()> {
        let data = self.faces.get_mut(face).ok_or(Error::FaceNotFound(face))?;
        data.own_style.face.extend(style.face.iter().copied());
        let (points, lines) = (data.points, data.lines);

        if !style.point.is_empty() {
            let point_only = StyleSets {
                point: style.point.clone(),
                ..StyleSets::default()
            };
            for p in points {
                self.attach_point_style(p, &point_only)?;
            }
        }
        if !style.line.is_empty() {
            let line_only = StyleSets {
                line: style.line.clone(),
                ..StyleSets::default()
            };
            for l in lines {
                self.attach_line_style(l, &line_only)?;
            }
        }
        self.refresh_face_style(face);
        Ok(())
    }

    /// Recomputes a line's style from its endpoints, then refreshes its faces.
    pub(crate) fn refresh_line_style(&mut self, line: LineKey) {
        let Some(data) = self.lines.get(line) else {
            return;
        };
        let endpoints: Vec<&StyleSets> = data
            .points
            .iter()
            .filter_map(|&p| self.points.get(p).map(|d| &d.style))
            .collect();

        let mut style = StyleSets {
            point: StyleSet::new(),
            line: intersect_all(endpoints.iter().map(|s| &s.line)),
            face: intersect_all(endpoints.iter().map(|s| &s.face)),
        };
        style.union_with(&data.own_style);

        if let Some(data) = self.lines.get_mut(line) {
            data.style = style;
        }
        for face in self.line_faces(line) {
            self.refresh_face_style(face);
        }
    }

    /// Recomputes a face's style from its lines.
    pub(crate) fn refresh_face_style(&mut self, face: FaceKey) {
        let Some(data) = self.faces.get(face) else {
            return;
        };
        let mut face_set = intersect_all(
            data.lines
                .iter()
                .filter_map(|&l| self.lines.get(l).map(|d| &d.style.face)),
        );
        face_set.extend(data.own_style.face.iter().copied());

        if let Some(data) = self.faces.get_mut(face) {
            data.style.face = face_set;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn tokens(ids: &[u32]) -> StyleSet {
        ids.iter().map(|&i| StyleToken(i)).collect()
    }

    fn styled(point: &[u32], line: &[u32], face: &[u32]) -> StyleSets {
        StyleSets {
            point: tokens(point),
            line: tokens(line),
            face: tokens(face),
        }
    }

    #[test]
    fn intersect_all_of_nothing_is_empty() {
        assert!(intersect_all(std::iter::empty()).is_empty());
    }

    #[test]
    fn line_style_is_intersection_of_endpoints() {
        let mut world = World::empty();
        let a = world.insert_point(Point3::origin(), styled(&[], &[1, 2], &[5, 6]), true);
        let b = world.insert_point(
            Point3::new(1.0, 0.0, 0.0),
            styled(&[], &[2, 3], &[6]),
            true,
        );
        let line = world.insert_line(a, b).unwrap();

        let style = &world.line(line).unwrap().style;
        assert_eq!(style.line, tokens(&[2]));
        assert_eq!(style.face, tokens(&[6]));
        assert!(style.point.is_empty());
    }

    #[test]
    fn point_attachment_propagates_to_lines_and_faces() {
        let mut world = World::empty();
        let a = world.insert_point(Point3::origin(), StyleSets::default(), true);
        let b = world.insert_point(Point3::new(1.0, 0.0, 0.0), StyleSets::default(), true);
        let c = world.insert_point(Point3::new(0.0, 1.0, 0.0), StyleSets::default(), true);
        let face = world.link_face(a, b, c).unwrap();
        let ab = world.line_between(a, b).unwrap();

        let style = styled(&[9], &[7], &[8]);
        world.attach_point_style(a, &style).unwrap();
        world.attach_point_style(b, &style).unwrap();
        assert_eq!(world.line(ab).unwrap().style.line, tokens(&[7]));
        // c still lacks the face token
        assert!(world.face(face).unwrap().style.face.is_empty());

        world.attach_point_style(c, &style).unwrap();
        assert_eq!(world.face(face).unwrap().style.face, tokens(&[8]));
        assert_eq!(world.point(c).unwrap().style.point, tokens(&[9]));
    }

    #[test]
    fn own_line_tokens_survive_refresh() {
        let mut world = World::empty();
        let a = world.insert_point(Point3::origin(), StyleSets::default(), true);
        let b = world.insert_point(Point3::new(1.0, 0.0, 0.0), StyleSets::default(), true);
        let line = world.insert_line(a, b).unwrap();

        world
            .attach_line_style(line, &styled(&[4], &[3], &[]))
            .unwrap();
        world.refresh_line_style(line);

        assert_eq!(world.line(line).unwrap().style.line, tokens(&[3]));
        assert_eq!(world.point(a).unwrap().style.point, tokens(&[4]));
        assert_eq!(world.point(b).unwrap().style.point, tokens(&[4]));
    }

    #[test]
    fn face_attachment_forwards_line_tokens() {
        let mut world = World::empty();
        let a = world.insert_point(Point3::origin(), StyleSets::default(), true);
        let b = world.insert_point(Point3::new(1.0, 0.0, 0.0), StyleSets::default(), true);
        let c = world.insert_point(Point3::new(0.0, 1.0, 0.0), StyleSets::default(), true);
        let face = world.link_face(a, b, c).unwrap();

        world
            .attach_face_style(face, &styled(&[], &[11], &[12]))
            .unwrap();

        for line in world.face_lines(face).unwrap() {
            assert_eq!(world.line(line).unwrap().style.line, tokens(&[11]));
        }
        assert_eq!(world.face(face).unwrap().style.face, tokens(&[12]));
    }

    #[test]
    fn attach_to_stale_point_fails() {
        let mut world = World::empty();
        let a = world.insert_point(Point3::origin(), StyleSets::default(), true);
        world.destroy_point(a).unwrap();
        assert!(world.attach_point_style(a, &StyleSets::default()).is_err());
    }
}
