// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-complex queries: boundary extraction and structural validation.

use tracing::warn;

use crate::error::{Error, Result};
use crate::keys::*;
use crate::world::World;

fn inconsistent(message: String) -> Error {
    warn!(%message, "structural check failed");
    Error::StructuralInconsistency(message)
}

impl World {
    /// Faces bordering exactly one tetrahedron, in insertion order.
    pub fn boundary_faces(&self) -> Vec<FaceKey> {
        self.faces()
            .filter(|(f, _)| {
                self.face_to_tetrahedra
                    .get(f)
                    .is_some_and(|tets| tets.len() == 1)
            })
            .map(|(f, _)| f)
            .collect()
    }

    /// Faces shared by two tetrahedra, in insertion order.
    pub fn internal_faces(&self) -> Vec<FaceKey> {
        self.faces()
            .filter(|(f, _)| {
                self.face_to_tetrahedra
                    .get(f)
                    .is_some_and(|tets| tets.len() == 2)
            })
            .map(|(f, _)| f)
            .collect()
    }

    /// Checks closure and bidirectionality of the whole complex.
    ///
    /// Every referenced sub-simplex must be live, every downward reference
    /// must be mirrored in the upward index and the other way round, faces
    /// and tetrahedra must close up, no vertex set may be spanned twice, and
    /// the insertion registries must match the arenas.
    pub fn validate(&self) -> Result<()> {
        self.validate_lines()?;
        self.validate_faces()?;
        self.validate_tetrahedra()?;
        self.validate_upward_index()?;
        self.validate_registries()
    }

    fn validate_lines(&self) -> Result<()> {
        for (key, line) in self.lines.iter() {
            let [a, b] = line.points;
            if a == b {
                return Err(inconsistent(format!("{key:?} is a loop")));
            }
            for p in line.points {
                if !self.points.contains_key(p) {
                    return Err(inconsistent(format!("{key:?} uses dead {p:?}")));
                }
                if !self.point_to_lines.get(&p).is_some_and(|s| s.contains(&key)) {
                    return Err(inconsistent(format!("{p:?} does not list {key:?}")));
                }
            }
            if self.line_between(a, b) != Some(key) {
                return Err(inconsistent(format!("{a:?} and {b:?} joined twice")));
            }
        }
        Ok(())
    }

    fn validate_faces(&self) -> Result<()> {
        for (key, face) in self.faces.iter() {
            let mut closed = self.face_closure(face.lines)?;
            let mut stored = face.points;
            closed.sort_unstable();
            stored.sort_unstable();
            if closed != stored {
                return Err(inconsistent(format!("{key:?} points disagree with its lines")));
            }
            for l in face.lines {
                if !self.line_to_faces.get(&l).is_some_and(|s| s.contains(&key)) {
                    return Err(inconsistent(format!("{l:?} does not list {key:?}")));
                }
            }
            let [a, b, c] = face.points;
            if self.face_between(a, b, c) != Some(key) {
                return Err(inconsistent(format!("{:?} spanned twice", face.points)));
            }
        }
        Ok(())
    }

    fn validate_tetrahedra(&self) -> Result<()> {
        for (key, tet) in self.tetrahedra.iter() {
            let mut from_faces = Vec::with_capacity(12);
            for f in tet.faces {
                let face = self
                    .faces
                    .get(f)
                    .ok_or_else(|| inconsistent(format!("{key:?} uses dead {f:?}")))?;
                if !self.face_to_tetrahedra.get(&f).is_some_and(|s| s.contains(&key)) {
                    return Err(inconsistent(format!("{f:?} does not list {key:?}")));
                }
                from_faces.extend(face.points);
            }
            from_faces.sort_unstable();
            from_faces.dedup();
            let mut stored = tet.points.to_vec();
            stored.sort_unstable();
            if from_faces != stored {
                return Err(inconsistent(format!("{key:?} faces do not span its points")));
            }
            for l in tet.lines {
                if !self.lines.contains_key(l) {
                    return Err(inconsistent(format!("{key:?} uses dead {l:?}")));
                }
            }
            if self.tetrahedron_between(tet.points) != Some(key) {
                return Err(inconsistent(format!("{:?} spanned twice", tet.points)));
            }
        }
        Ok(())
    }

    fn validate_upward_index(&self) -> Result<()> {
        for (p, lines) in &self.point_to_lines {
            for l in lines {
                if !self.lines.get(*l).is_some_and(|d| d.points.contains(p)) {
                    return Err(inconsistent(format!("{p:?} lists stale {l:?}")));
                }
            }
        }
        for (l, faces) in &self.line_to_faces {
            for f in faces {
                if !self.faces.get(*f).is_some_and(|d| d.lines.contains(l)) {
                    return Err(inconsistent(format!("{l:?} lists stale {f:?}")));
                }
            }
        }
        for (f, tets) in &self.face_to_tetrahedra {
            for t in tets {
                if !self.tetrahedra.get(*t).is_some_and(|d| d.faces.contains(f)) {
                    return Err(inconsistent(format!("{f:?} lists stale {t:?}")));
                }
            }
        }
        Ok(())
    }

    fn validate_registries(&self) -> Result<()> {
        let sizes = [
            ("points", self.point_order.len(), self.points().count(), self.points.len()),
            ("lines", self.line_order.len(), self.lines().count(), self.lines.len()),
            ("faces", self.face_order.len(), self.faces().count(), self.faces.len()),
            (
                "tetrahedra",
                self.tetrahedron_order.len(),
                self.tetrahedra().count(),
                self.tetrahedra.len(),
            ),
        ];
        for (kind, registered, live, stored) in sizes {
            if registered != stored || live != stored {
                return Err(inconsistent(format!(
                    "{kind} registry holds {registered} keys ({live} live), arena holds {stored}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::style::StyleSets;
    use nalgebra::Point3;

    fn unit_world() -> World {
        World::with_config(WorldConfig::default()).unwrap()
    }

    #[test]
    fn seeded_world_is_valid() {
        assert!(unit_world().validate().is_ok());
    }

    #[test]
    fn boundary_and_internal_faces() {
        let world = unit_world();
        assert_eq!(world.boundary_faces().len(), 12);
        assert_eq!(world.internal_faces().len(), 4);
    }

    #[test]
    fn subdivided_world_is_valid() {
        let mut world = unit_world();
        for position in [
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0.25, 0.5, 0.5),
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(1.0, 1.0, 0.5),
        ] {
            world.create_point(position, StyleSets::default()).unwrap();
            world.validate().unwrap();
        }
        assert_eq!(world.boundary_faces().len() % 2, 0);
    }

    #[test]
    fn broken_upward_index_is_detected() {
        let mut world = unit_world();
        let (line, data) = world.lines().next().map(|(k, d)| (k, d.points)).unwrap();
        world.unlink_point_line(data[0], line);
        assert!(matches!(
            world.validate(),
            Err(Error::StructuralInconsistency(_))
        ));
    }

    #[test]
    fn stale_registry_entry_is_detected() {
        let mut world = unit_world();
        let ghost = world.point_order[0];
        world.point_order.push(ghost);
        assert!(world.validate().is_err());
    }
}
