// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh operations.

use crate::keys::{FaceKey, LineKey, PointKey, TetrahedronKey};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Point key not found in the world.
    #[error("point not found: {0:?}")]
    PointNotFound(PointKey),

    /// Line key not found in the world.
    #[error("line not found: {0:?}")]
    LineNotFound(LineKey),

    /// Face key not found in the world.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// Tetrahedron key not found in the world.
    #[error("tetrahedron not found: {0:?}")]
    TetrahedronNotFound(TetrahedronKey),

    /// A line was requested between a point and itself.
    #[error("line endpoints coincide: {0:?}")]
    CoincidentEndpoints(PointKey),

    /// The simplices handed to a constructor do not form the combinatorial
    /// closure of a face or tetrahedron.
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(String),

    /// Both subdivisions of an intersection reduce to existing points.
    #[error("degenerate intersection: both subdivisions reduce to points")]
    DegenerateIntersection,

    /// A subdivision implies a simplex of dimension greater than 3.
    #[error("subdivision of a {0}-dimensional simplex")]
    DimensionOverflow(usize),

    /// The two objects handed to an intersection do not have complementary
    /// dimensions.
    #[error("cannot intersect objects with {found} vertices in total, expected 5")]
    DimensionMismatch { found: usize },

    /// A subdivision got a different number of coordinates and end points.
    #[error("subdivision has {coordinates} coordinates but {end_points} end points")]
    CoordinateMismatch {
        coordinates: usize,
        end_points: usize,
    },

    /// A reduced subdivision targets a simplex that is not part of the mesh.
    #[error("no simplex spans the subdivision target: {0}")]
    MissingSimplex(String),

    /// Configuration parsing error.
    #[error("configuration error: {0}")]
    Config(String),
}
