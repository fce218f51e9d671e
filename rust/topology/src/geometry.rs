// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on simplices.
//!
//! Barycentric frames for point location, the small linear solve behind
//! line/face and point/tetrahedron crossings, and the usual lengths, areas
//! and volumes.

use nalgebra::{Matrix3, Point3, Vector3};
use smallvec::SmallVec;
use tracing::warn;

use crate::keys::*;
use crate::world::World;

/// Relative determinant threshold below which a frame counts as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Barycentric coordinates relative to a base point, one per end point.
pub type Coordinates = SmallVec<[f64; 3]>;

/// Affine frame of a tetrahedron: a base point and the inverse of the
/// matrix whose columns are the edge vectors leaving it.
///
/// A flat tetrahedron has no inverse. It then contains nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineBasis {
    pub origin: Point3<f64>,
    pub inverse: Option<Matrix3<f64>>,
}

impl AffineBasis {
    /// Builds the frame spanned by `origin` and three end points.
    pub fn new(origin: Point3<f64>, ends: [Point3<f64>; 3]) -> Self {
        let matrix = Matrix3::from_columns(&[
            ends[0] - origin,
            ends[1] - origin,
            ends[2] - origin,
        ]);
        let inverse = if is_singular(&matrix) {
            None
        } else {
            matrix.try_inverse()
        };
        if inverse.is_none() {
            warn!(?origin, "degenerate tetrahedron frame, containment disabled");
        }
        Self { origin, inverse }
    }

    /// Coordinates of `position` in this frame, if the frame is regular.
    pub fn coordinates(&self, position: &Point3<f64>) -> Option<Vector3<f64>> {
        self.inverse.map(|inv| inv * (position - self.origin))
    }

    /// Coordinates of `position` if it lies in the closed tetrahedron,
    /// inflated by `tol`.
    pub fn inside(&self, position: &Point3<f64>, tol: f64) -> Option<Vector3<f64>> {
        let coords = self.coordinates(position)?;
        within_simplex(coords.as_slice(), tol).then_some(coords)
    }
}

/// `true` if the coordinates describe a point of the closed simplex,
/// inflated by `tol`: each one in `[-tol, 1 + tol]` and their sum at most
/// `1 + tol`.
pub fn within_simplex(coords: &[f64], tol: f64) -> bool {
    coords.iter().all(|&c| c >= -tol && c <= 1.0 + tol)
        && coords.iter().sum::<f64>() <= 1.0 + tol
}

fn is_singular(matrix: &Matrix3<f64>) -> bool {
    let scale: f64 = matrix.column_iter().map(|c| c.norm()).product();
    scale == 0.0 || matrix.determinant().abs() <= SINGULAR_EPS * scale
}

/// Solves for the common point of two affine simplices whose vertex counts
/// sum to 5 (line and face, or point and tetrahedron).
///
/// Writing each simplex as base plus weighted edge vectors, the 3x3 system
/// `[A_dirs | -B_dirs] [s; t] = b0 - a0` gives the weights on both sides.
/// Returns `None` when the system is singular (parallel or degenerate
/// input). Feasibility of the weights is left to the caller.
pub fn solve_crossing(
    first: &[Point3<f64>],
    second: &[Point3<f64>],
) -> Option<(Coordinates, Coordinates)> {
    let (&a0, a_rest) = first.split_first()?;
    let (&b0, b_rest) = second.split_first()?;
    if a_rest.len() + b_rest.len() != 3 {
        return None;
    }

    let columns: SmallVec<[Vector3<f64>; 3]> = a_rest
        .iter()
        .map(|a| a - a0)
        .chain(b_rest.iter().map(|b| -(b - b0)))
        .collect();
    let matrix = Matrix3::from_columns(&columns[..]);
    if is_singular(&matrix) {
        return None;
    }

    let solution = matrix.lu().solve(&(b0 - a0))?;
    let split = a_rest.len();
    Some((
        solution.iter().take(split).copied().collect(),
        solution.iter().skip(split).copied().collect(),
    ))
}

impl World {
    /// Computes the Euclidean length of a line.
    pub fn line_length(&self, key: LineKey) -> Option<f64> {
        let [a, b] = self.lines.get(key)?.points;
        Some((self.position(b)? - self.position(a)?).norm())
    }

    /// Computes the area of a face.
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        let [a, b, c] = self.faces.get(key)?.points;
        let (a, b, c) = (self.position(a)?, self.position(b)?, self.position(c)?);
        Some((b - a).cross(&(c - a)).norm() * 0.5)
    }

    /// Computes the unsigned volume of a tetrahedron.
    pub fn tetrahedron_volume(&self, key: TetrahedronKey) -> Option<f64> {
        let [a, b, c, d] = self.tetrahedra.get(key)?.points;
        let a = self.position(a)?;
        let m = Matrix3::from_columns(&[
            self.position(b)? - a,
            self.position(c)? - a,
            self.position(d)? - a,
        ]);
        Some(m.determinant().abs() / 6.0)
    }

    /// Sum of all tetrahedron volumes.
    pub fn total_volume(&self) -> f64 {
        self.tetrahedra
            .keys()
            .filter_map(|t| self.tetrahedron_volume(t))
            .sum()
    }

    /// Barycentric coordinates of `position` in the tetrahedron's frame if the
    /// position lies inside it (boundary included, within `tol`).
    ///
    /// The coordinates weight the end points `points[1..4]` relative to the
    /// base `points[0]`.
    pub fn tetrahedron_inside(
        &self,
        key: TetrahedronKey,
        position: &Point3<f64>,
        tol: f64,
    ) -> Option<Vector3<f64>> {
        self.tetrahedra.get(key)?.basis.inside(position, tol)
    }
}
