// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seeding a world with its bounding cuboid.
//!
//! The cuboid is cut into five tetrahedra: the central `A E F G`, whose
//! edges are face diagonals of the cuboid, and the four corner pieces it
//! leaves at `B`, `C`, `D` and `H`. Corner names follow the unit cube:
//!
//! ```text
//! A (0,0,0)  B (1,0,0)  C (0,1,0)  D (0,0,1)
//! E (0,1,1)  F (1,0,1)  G (1,1,0)  H (1,1,1)
//! ```

use tracing::debug;

use crate::config::WorldConfig;
use crate::error::{Error, Result};
use crate::integration::Integration;
use crate::keys::*;
use crate::style::StyleSets;
use crate::world::World;

const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const E: usize = 4;
const F: usize = 5;
const G: usize = 6;
const H: usize = 7;

#[rustfmt::skip]
const SEED_LINES: [[usize; 2]; 18] = [
    [A, B], [A, C], [A, D], [A, E], [A, F], [A, G],
    [B, F], [B, G], [C, E], [C, G], [D, E], [D, F],
    [E, F], [E, G], [E, H], [F, G], [F, H], [G, H],
];

#[rustfmt::skip]
const SEED_FACES: [[usize; 3]; 16] = [
    [A, B, F], [A, B, G], [A, C, E], [A, C, G],
    [A, D, E], [A, D, F], [A, E, F], [A, E, G],
    [A, F, G], [B, F, G], [C, E, G], [D, E, F],
    [E, F, G], [E, F, H], [E, G, H], [F, G, H],
];

const SEED_TETRAHEDRA: [[usize; 4]; 5] = [
    [A, B, G, F],
    [A, C, E, G],
    [A, D, E, F],
    [A, E, F, G],
    [E, F, G, H],
];

fn committed<K: Copy + std::fmt::Debug>(outcome: Integration<K>, what: &str) -> Result<K> {
    outcome.committed().ok_or_else(|| {
        Error::StructuralInconsistency(format!("seed {what} was not committed: {outcome:?}"))
    })
}

impl World {
    /// Creates a world seeded with the cuboid spanned by `bounds`, one
    /// `[min, max]` pair per axis. The corners carry `style`.
    pub fn new(bounds: [[f64; 2]; 3], style: StyleSets) -> Result<Self> {
        Self::with_config(WorldConfig {
            bounds,
            seed_style: style,
            ..WorldConfig::default()
        })
    }

    /// Creates a world from a configuration.
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut world = World::empty();
        world.config = config;
        world.seed()?;
        Ok(world)
    }

    fn seed(&mut self) -> Result<()> {
        let [[x0, x1], [y0, y1], [z0, z1]] = self.config.bounds;
        let corners = [
            [x0, y0, z0],
            [x1, y0, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x0, y1, z1],
            [x1, y0, z1],
            [x1, y1, z0],
            [x1, y1, z1],
        ];
        let style = self.config.seed_style.clone();
        let points: Vec<PointKey> = corners
            .iter()
            .map(|&[x, y, z]| self.insert_point([x, y, z].into(), style.clone(), true))
            .collect();

        for [a, b] in SEED_LINES {
            committed(self.add_line(points[a], points[b])?, "line")?;
        }
        for [a, b, c] in SEED_FACES {
            let lines =
                [(a, b), (b, c), (a, c)].map(|(u, v)| self.line_between(points[u], points[v]));
            let [Some(ab), Some(bc), Some(ac)] = lines else {
                return Err(Error::MissingSimplex(format!(
                    "seed face edges {a} {b} {c}"
                )));
            };
            committed(self.add_face([ab, bc, ac])?, "face")?;
        }
        for [a, b, c, d] in SEED_TETRAHEDRA {
            let faces = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
                .map(|[u, v, w]| self.face_between(points[u], points[v], points[w]));
            let [Some(f0), Some(f1), Some(f2), Some(f3)] = faces else {
                return Err(Error::MissingSimplex(format!(
                    "seed tetrahedron faces {a} {b} {c} {d}"
                )));
            };
            self.add_tetrahedron([f0, f1, f2, f3])?;
        }

        debug!(
            points = self.point_count(),
            lines = self.line_count(),
            faces = self.face_count(),
            tetrahedra = self.tetrahedron_count(),
            "world seeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleToken;
    use approx::assert_relative_eq;

    #[test]
    fn seed_counts() {
        let world = World::with_config(WorldConfig::default()).unwrap();
        assert_eq!(world.point_count(), 8);
        assert_eq!(world.line_count(), 18);
        assert_eq!(world.face_count(), 16);
        assert_eq!(world.tetrahedron_count(), 5);
    }

    #[test]
    fn seed_volume_matches_bounds() {
        let world =
            World::new([[0.0, 2.0], [0.0, 3.0], [-1.0, 3.0]], StyleSets::default()).unwrap();
        assert_relative_eq!(world.total_volume(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn seed_points_are_visible_and_styled() {
        let mut style = StyleSets::default();
        style.line.insert(StyleToken(2));
        let world = World::new([[0.0, 1.0]; 3], style).unwrap();

        assert!(world.points().all(|(_, p)| p.visible));
        assert!(world
            .lines()
            .all(|(_, l)| l.style.line.contains(&StyleToken(2))));
    }

    #[test]
    fn every_seed_face_borders_one_or_two_tetrahedra() {
        let world = World::with_config(WorldConfig::default()).unwrap();
        let mut boundary = 0;
        for (face, _) in world.faces() {
            match world.face_tetrahedra(face).len() {
                1 => boundary += 1,
                2 => {}
                n => panic!("face borders {n} tetrahedra"),
            }
        }
        // two triangles per side of the cuboid
        assert_eq!(boundary, 12);
    }

    #[test]
    fn invalid_bounds_fail() {
        let result = World::new([[1.0, 0.0], [0.0, 1.0], [0.0, 1.0]], StyleSets::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
