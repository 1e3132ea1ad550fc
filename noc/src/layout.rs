// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Chiplet partitioning: how many compute chiplets, and the mesh shape
//! inside each of them.

use crate::config::MeshShape;
use crate::error::Error;
use std::fmt;

/// integer square root, rounded down
fn isqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    // correct for floating point rounding on large inputs
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// Shape of the compute meshes.
///
/// Compute router `i` lives in chiplet `i / per_chiplet()`, and within its
/// chiplet at row `(i % per_chiplet()) / cols`, column `(i % per_chiplet()) %
/// cols`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChipletLayout {
    pub chiplet_count: usize,
    pub rows: usize,
    pub cols: usize,
}

impl ChipletLayout {
    /// Derive the layout for `compute_count` compute endpoints.
    ///
    /// This is a pure function of its arguments: there is no search for a
    /// "best" factorization, a count that does not fit the requested shape
    /// is an error.
    pub fn partition(compute_count: usize, shape: &MeshShape) -> Result<Self, Error> {
        let layout = match *shape {
            MeshShape::Square => {
                let chiplet_count = isqrt(compute_count);
                if chiplet_count == 0 {
                    return Err(Error::shape(compute_count, "no compute endpoints"));
                }
                let per_chiplet = compute_count / chiplet_count;
                let rows = isqrt(per_chiplet);
                let cols = per_chiplet / rows;
                Self {
                    chiplet_count,
                    rows,
                    cols,
                }
            }
            MeshShape::Flat { rows } => {
                if rows == 0 {
                    return Err(Error::shape(compute_count, "mesh needs at least one row"));
                }
                if rows > compute_count {
                    return Err(Error::shape(
                        compute_count,
                        format!("{} rows exceed the number of compute endpoints", rows),
                    ));
                }
                Self {
                    chiplet_count: 1,
                    rows,
                    cols: compute_count / rows,
                }
            }
        };
        if layout.router_count() != compute_count {
            return Err(Error::shape(
                compute_count,
                format!(
                    "{} chiplet(s) of {} x {} routers cover {} endpoints",
                    layout.chiplet_count,
                    layout.rows,
                    layout.cols,
                    layout.router_count()
                ),
            ));
        }
        Ok(layout)
    }

    /// number of routers in one chiplet
    pub fn per_chiplet(&self) -> usize {
        self.rows * self.cols
    }

    /// number of compute routers over all chiplets
    pub fn router_count(&self) -> usize {
        self.chiplet_count * self.per_chiplet()
    }

    /// index of the compute router at (`row`, `col`) of `chiplet`
    pub fn router_index(&self, chiplet: usize, row: usize, col: usize) -> usize {
        chiplet * self.per_chiplet() + col + row * self.cols
    }

    /// the router that carries a chiplet's traffic to the rest of the system
    pub fn ingress(&self, chiplet: usize) -> usize {
        self.router_index(chiplet, 0, 0)
    }

    /// the four corner routers of the first chiplet:
    /// (0, cols - 1, N - cols, N - 1)
    pub fn corners(&self) -> [usize; 4] {
        let n = self.per_chiplet();
        [0, self.cols - 1, n - self.cols, n - 1]
    }
}

impl fmt::Display for ChipletLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} CPU chiplet(s), each a {} x {} mesh",
            self.chiplet_count, self.rows, self.cols
        )
    }
}
