// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subdivision tasks.
//!
//! A [`Subdivision`] names a point inside a simplex by affine coordinates:
//! a base point, up to three end points, and one weight per end point. The
//! point sits at `base + Σ c_i (end_i - base)`.
//!
//! Before anything is split the task is *reduced*: weights that vanish
//! within tolerance are dropped, and when the base carries no weight the
//! frame is re-anchored on an end point. What is left names the lowest
//! dimensional simplex that really contains the point, which is the one
//! that gets re-triangulated.

use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::geometry::Coordinates;
use crate::keys::*;
use crate::style::StyleSets;
use crate::world::World;

/// A pending split of a simplex at an affinely-specified point.
#[derive(Debug, Clone, PartialEq)]
pub struct Subdivision {
    base_point: PointKey,
    end_points: SmallVec<[PointKey; 3]>,
    coordinates: Coordinates,
    style: StyleSets,
    tol: f64,
}

impl Subdivision {
    /// Creates a subdivision task.
    ///
    /// Fails with [`Error::CoordinateMismatch`] unless there is exactly one
    /// coordinate per end point.
    pub fn new(
        base_point: PointKey,
        end_points: impl IntoIterator<Item = PointKey>,
        coordinates: impl IntoIterator<Item = f64>,
        style: StyleSets,
        tol: f64,
    ) -> Result<Self> {
        let end_points: SmallVec<[PointKey; 3]> = end_points.into_iter().collect();
        let coordinates: Coordinates = coordinates.into_iter().collect();
        if end_points.len() != coordinates.len() {
            return Err(Error::CoordinateMismatch {
                coordinates: coordinates.len(),
                end_points: end_points.len(),
            });
        }
        Ok(Self {
            base_point,
            end_points,
            coordinates,
            style,
            tol,
        })
    }

    /// Dimension of the simplex spanned by base and end points.
    pub fn ndim(&self) -> usize {
        self.coordinates.len()
    }

    pub fn base_point(&self) -> PointKey {
        self.base_point
    }

    pub fn end_points(&self) -> &[PointKey] {
        &self.end_points
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn style(&self) -> &StyleSets {
        &self.style
    }

    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    /// Base point followed by the end points.
    pub fn vertices(&self) -> SmallVec<[PointKey; 4]> {
        std::iter::once(self.base_point)
            .chain(self.end_points.iter().copied())
            .collect()
    }

    // --- Coordinate checks ---

    pub fn coordinate_is_zero(&self, index: usize) -> bool {
        self.coordinates
            .get(index)
            .is_some_and(|c| c.abs() <= self.tol)
    }

    pub fn coordinate_is_unity(&self, index: usize) -> bool {
        self.coordinates
            .get(index)
            .is_some_and(|c| (c - 1.0).abs() <= self.tol)
    }

    /// `true` when the weights sum to one, leaving nothing on the base.
    pub fn basepoint_neglectable(&self) -> bool {
        (self.coordinates.iter().sum::<f64>() - 1.0).abs() <= self.tol
    }

    // --- Frame changes ---

    /// Re-expresses the same point with `new_base` as base.
    ///
    /// `new_base` must be the current base or one of the end points. The old
    /// base takes the vacated end-point slot with weight `1 - Σc`; the other
    /// weights are unchanged.
    pub fn switch_basepoint(&mut self, new_base: PointKey) -> Result<()> {
        if new_base == self.base_point {
            return Ok(());
        }
        let slot = self
            .end_points
            .iter()
            .position(|&p| p == new_base)
            .ok_or_else(|| {
                Error::StructuralInconsistency(format!(
                    "{new_base:?} is not a vertex of the subdivided simplex"
                ))
            })?;
        self.rebase(slot);
        Ok(())
    }

    fn rebase(&mut self, slot: usize) {
        let total: f64 = self.coordinates.iter().sum();
        std::mem::swap(&mut self.base_point, &mut self.end_points[slot]);
        self.coordinates[slot] = 1.0 - total;
    }

    fn neglect_coordinate(&mut self, index: usize) {
        self.coordinates.remove(index);
        self.end_points.remove(index);
    }

    /// Collapses vanishing weights.
    ///
    /// Zero weights are dropped first. Once none is left, a base carrying no
    /// weight is dropped too: the frame moves to the end point of unit weight
    /// (or the last end point if none is exactly unity), whose slot then
    /// holds `1 - Σc ≈ 0` and is dropped in turn.
    pub fn reduced(&self) -> Subdivision {
        let mut reduced = self.clone();
        loop {
            let n = reduced.ndim();
            if let Some(i) = (0..n).find(|&i| reduced.coordinate_is_zero(i)) {
                reduced.neglect_coordinate(i);
            } else if n > 0 && reduced.basepoint_neglectable() {
                let i = (0..n)
                    .find(|&i| reduced.coordinate_is_unity(i))
                    .unwrap_or(n - 1);
                reduced.rebase(i);
                reduced.neglect_coordinate(i);
            } else {
                return reduced;
            }
        }
    }

    // --- Point resolution ---

    /// Position of the point this task names.
    pub fn subdivision_position(&self, world: &World) -> Result<Point3<f64>> {
        let base = world
            .position(self.base_point)
            .ok_or(Error::PointNotFound(self.base_point))?;
        let mut position = base;
        for (&end, &c) in self.end_points.iter().zip(&self.coordinates) {
            let end = world.position(end).ok_or(Error::PointNotFound(end))?;
            position += (end - base) * c;
        }
        Ok(position)
    }

    /// Creates the point this task names, carrying the task's style.
    pub fn get_subdivision_point(&self, world: &mut World, visible: bool) -> Result<PointKey> {
        let position = self.subdivision_position(world)?;
        Ok(world.insert_point(position, self.style.clone(), visible))
    }

    /// The simplex spanned by base and end points, if it is in the mesh.
    ///
    /// Lines and faces may legitimately be missing: they belong to a
    /// candidate still being integrated. A missing tetrahedron is an error.
    pub fn target(&self, world: &World) -> Result<Option<SimplexKey>> {
        let v = self.vertices();
        match self.ndim() {
            0 => world
                .point(self.base_point)
                .map(|_| Some(SimplexKey::Point(self.base_point)))
                .ok_or(Error::PointNotFound(self.base_point)),
            1 => Ok(world.line_between(v[0], v[1]).map(SimplexKey::Line)),
            2 => Ok(world.face_between(v[0], v[1], v[2]).map(SimplexKey::Face)),
            3 => world
                .tetrahedron_between([v[0], v[1], v[2], v[3]])
                .map(|t| Some(SimplexKey::Tetrahedron(t)))
                .ok_or_else(|| Error::MissingSimplex(format!("tetrahedron {v:?}"))),
            n => Err(Error::DimensionOverflow(n)),
        }
    }

    /// Carries out an already reduced task and returns the split point.
    ///
    /// With `fixed_point` the split uses that point instead of creating a
    /// new one; this is how the second half of an intersection reuses the
    /// point made by the first. A task whose line or face is not in the mesh
    /// only produces its point.
    pub fn subdivide(&self, world: &mut World, fixed_point: Option<PointKey>) -> Result<PointKey> {
        let target = self.target(world)?;
        trace!(ndim = self.ndim(), ?target, ?fixed_point, "subdividing");

        let point = match (target, fixed_point) {
            (Some(SimplexKey::Point(p)), fixed) => {
                if fixed.is_some_and(|f| f != p) {
                    return Err(Error::StructuralInconsistency(format!(
                        "point subdivision of {p:?} handed a different point"
                    )));
                }
                world.attach_point_style(p, &self.style)?;
                return Ok(p);
            }
            (None, Some(p)) => return Ok(p),
            (None, None) => return self.get_subdivision_point(world, false),
            (Some(_), Some(p)) => p,
            (Some(_), None) => self.get_subdivision_point(world, true)?,
        };

        match target {
            Some(SimplexKey::Line(l)) => world.subdivide_line(l, point)?,
            Some(SimplexKey::Face(f)) => world.subdivide_face(f, point)?,
            Some(SimplexKey::Tetrahedron(t)) => world.subdivide_tetrahedron(t, point)?,
            _ => {}
        }
        debug!(?target, ?point, "simplex subdivided");
        Ok(point)
    }

    /// Reduces the task and carries it out.
    pub fn reduce(&self, world: &mut World) -> Result<PointKey> {
        self.reduced().subdivide(world, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn keys(world: &mut World, n: usize) -> Vec<PointKey> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                world.insert_point(Point3::new(x, x * x, 0.5 * x), StyleSets::default(), true)
            })
            .collect()
    }

    fn task(base: PointKey, ends: &[PointKey], coords: &[f64]) -> Subdivision {
        Subdivision::new(
            base,
            ends.iter().copied(),
            coords.iter().copied(),
            StyleSets::default(),
            1e-9,
        )
        .unwrap()
    }

    #[test]
    fn mismatched_coordinates_are_rejected() {
        let mut world = World::empty();
        let p = keys(&mut world, 3);
        let err = Subdivision::new(p[0], [p[1], p[2]], [0.5], StyleSets::default(), 1e-9);
        assert!(matches!(
            err,
            Err(Error::CoordinateMismatch {
                coordinates: 1,
                end_points: 2
            })
        ));
    }

    #[test]
    fn interior_task_does_not_reduce() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let t = task(p[0], &p[1..], &[0.25, 0.25, 0.25]);
        assert_eq!(t.reduced(), t);
    }

    #[test]
    fn zero_weights_are_dropped() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let reduced = task(p[0], &p[1..], &[0.0, 0.3, 1e-12]).reduced();
        assert_eq!(reduced.ndim(), 1);
        assert_eq!(reduced.base_point(), p[0]);
        assert_eq!(reduced.end_points(), &[p[2]]);
    }

    #[test]
    fn unit_weight_collapses_to_vertex() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let reduced = task(p[0], &p[1..], &[0.0, 1.0, 0.0]).reduced();
        assert_eq!(reduced.ndim(), 0);
        assert_eq!(reduced.base_point(), p[2]);
    }

    #[test]
    fn weightless_base_moves_to_opposite_edge() {
        let mut world = World::empty();
        let p = keys(&mut world, 3);
        let t = task(p[0], &p[1..], &[0.5, 0.5]);
        let reduced = t.reduced();
        assert_eq!(reduced.ndim(), 1);

        let mut span = reduced.vertices();
        span.sort_unstable();
        let mut expected = [p[1], p[2]];
        expected.sort_unstable();
        assert_eq!(span.as_slice(), &expected);
        assert_relative_eq!(
            reduced.subdivision_position(&world).unwrap(),
            t.subdivision_position(&world).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn reduction_preserves_position() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let t = task(p[0], &p[1..], &[0.2, 0.0, 0.8]);
        let reduced = t.reduced();
        assert_eq!(reduced.ndim(), 1);
        assert_relative_eq!(
            reduced.subdivision_position(&world).unwrap(),
            t.subdivision_position(&world).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn switch_basepoint_keeps_position() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let t = task(p[0], &p[1..], &[0.1, 0.2, 0.3]);
        let mut switched = t.clone();
        switched.switch_basepoint(p[2]).unwrap();

        assert_eq!(switched.base_point(), p[2]);
        assert_eq!(switched.end_points(), &[p[1], p[0], p[3]]);
        assert_relative_eq!(switched.coordinates()[1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(
            switched.subdivision_position(&world).unwrap(),
            t.subdivision_position(&world).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn switch_to_foreign_point_fails() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let mut t = task(p[0], &p[1..3], &[0.1, 0.2]);
        assert!(t.switch_basepoint(p[3]).is_err());
    }

    #[test]
    fn point_task_attaches_style() {
        let mut world = World::empty();
        let p = keys(&mut world, 1);
        let mut style = StyleSets::default();
        style.point.insert(crate::style::StyleToken(3));
        let t = Subdivision::new(p[0], std::iter::empty(), std::iter::empty(), style, 1e-9)
            .unwrap();

        assert_eq!(t.subdivide(&mut world, None).unwrap(), p[0]);
        assert_eq!(world.point(p[0]).unwrap().style.point.len(), 1);
        assert_eq!(world.point_count(), 1);
    }

    #[test]
    fn task_on_missing_line_only_makes_its_point() {
        let mut world = World::empty();
        let p = keys(&mut world, 2);
        let t = task(p[0], &p[1..], &[0.5]);

        let y = t.subdivide(&mut world, None).unwrap();
        assert_eq!(world.point_count(), 3);
        assert_eq!(world.line_count(), 0);
        assert!(!world.is_visible(y));
    }

    #[test]
    fn line_task_splits_the_line() {
        let mut world = World::empty();
        let p = keys(&mut world, 2);
        world.insert_line(p[0], p[1]).unwrap();

        let y = task(p[0], &p[1..], &[0.5]).reduce(&mut world).unwrap();
        assert_eq!(world.line_count(), 2);
        assert!(world.line_between(p[0], p[1]).is_none());
        assert!(world.line_between(p[0], y).is_some());
        assert!(world.is_visible(y));
    }

    #[test]
    fn missing_tetrahedron_is_an_error() {
        let mut world = World::empty();
        let p = keys(&mut world, 4);
        let t = task(p[0], &p[1..], &[0.25, 0.25, 0.25]);
        assert!(matches!(
            t.subdivide(&mut world, None),
            Err(Error::MissingSimplex(_))
        ));
    }
}
