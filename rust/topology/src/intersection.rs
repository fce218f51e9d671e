// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crossings between simplices of complementary dimension.
//!
//! A line crossing a face, or a point sitting in a tetrahedron, is described
//! by two [`Subdivision`]s naming the same location in each simplex's own
//! frame. Resolving the [`Intersection`] splits both at a single shared
//! point.

use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{Error, Result};
use crate::geometry::{solve_crossing, within_simplex};
use crate::keys::*;
use crate::style::StyleSets;
use crate::subdivision::Subdivision;
use crate::world::World;

/// Two reduced subdivisions meeting at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    first: Subdivision,
    second: Subdivision,
}

impl Intersection {
    /// Reduces both subdivisions.
    ///
    /// Fails with [`Error::DegenerateIntersection`] if both reduce to
    /// existing points, since there is then nothing to split.
    pub fn new(first: Subdivision, second: Subdivision) -> Result<Self> {
        let first = first.reduced();
        let second = second.reduced();
        if first.ndim() == 0 && second.ndim() == 0 {
            return Err(Error::DegenerateIntersection);
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Subdivision {
        &self.first
    }

    pub fn second(&self) -> &Subdivision {
        &self.second
    }

    /// Splits both simplices at the common point and returns it.
    ///
    /// A side that reduced to an existing point goes first so that point is
    /// reused. Otherwise a one-dimensional second side leads. The point made
    /// by the leading side is handed to the other.
    pub fn intersect(&self, world: &mut World) -> Result<PointKey> {
        let (lead, follow) = if self.first.ndim() == 0 {
            (&self.first, &self.second)
        } else if self.second.ndim() == 0 || self.second.ndim() == 1 {
            (&self.second, &self.first)
        } else {
            (&self.first, &self.second)
        };

        let point = lead.subdivide(world, None)?;
        follow.subdivide(world, Some(point))?;
        trace!(
            ?point,
            lead = lead.ndim(),
            follow = follow.ndim(),
            "intersection resolved"
        );
        Ok(point)
    }
}

impl World {
    /// Computes the crossing of two simplices whose vertex counts sum to 5.
    ///
    /// Returns `Ok(None)` when they do not meet, meet only in a shared
    /// vertex, or are parallel. Fails with [`Error::DimensionMismatch`] for
    /// any other pairing of simplex kinds.
    pub fn intersect(
        &self,
        a: SimplexKey,
        b: SimplexKey,
        style: &StyleSets,
        tol: f64,
    ) -> Result<Option<Intersection>> {
        let found = a.simplex_type().vertex_count() + b.simplex_type().vertex_count();
        if found != 5 {
            return Err(Error::DimensionMismatch { found });
        }
        let first = self.simplex_points(a).ok_or_else(|| missing(a))?;
        let second = self.simplex_points(b).ok_or_else(|| missing(b))?;
        self.intersect_points(&first, &second, style, tol)
    }

    /// [`World::intersect`] on raw vertex lists, which need not span a
    /// simplex of the mesh yet.
    pub(crate) fn intersect_points(
        &self,
        first: &[PointKey],
        second: &[PointKey],
        style: &StyleSets,
        tol: f64,
    ) -> Result<Option<Intersection>> {
        let found = first.len() + second.len();
        if found != 5 || first.is_empty() || second.is_empty() {
            return Err(Error::DimensionMismatch { found });
        }

        let first_positions = self.positions(first)?;
        let second_positions = self.positions(second)?;
        let Some((s, t)) = solve_crossing(&first_positions, &second_positions) else {
            return Ok(None);
        };
        if !within_simplex(&s, tol) || !within_simplex(&t, tol) {
            return Ok(None);
        }

        let a = Subdivision::new(first[0], first[1..].iter().copied(), s, style.clone(), tol)?;
        let b = Subdivision::new(second[0], second[1..].iter().copied(), t, style.clone(), tol)?;
        match Intersection::new(a, b) {
            Ok(intersection) => Ok(Some(intersection)),
            Err(Error::DegenerateIntersection) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn positions(&self, keys: &[PointKey]) -> Result<SmallVec<[Point3<f64>; 4]>> {
        keys.iter()
            .map(|&k| self.position(k).ok_or(Error::PointNotFound(k)))
            .collect()
    }
}

fn missing(key: SimplexKey) -> Error {
    match key {
        SimplexKey::Point(k) => Error::PointNotFound(k),
        SimplexKey::Line(k) => Error::LineNotFound(k),
        SimplexKey::Face(k) => Error::FaceNotFound(k),
        SimplexKey::Tetrahedron(k) => Error::TetrahedronNotFound(k),
    }
}
