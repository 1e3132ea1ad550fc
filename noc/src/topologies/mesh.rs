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

use super::{attach, linearize_index, LinkIdAllocator};
use crate::config::LinkProfile;
use crate::error::Error;
use crate::layout::ChipletLayout;
use crate::topology::{Link, PortDirection, Router, RouterId};
use itertools::iproduct;
use std::collections::BTreeSet;

/// weight of East/West links
pub const X_WEIGHT: usize = 1;
/// weight of North/South links
pub const Y_WEIGHT: usize = 2;

/// One pass over a chiplet mesh: every link leaving through `outport`.
struct Pass {
    outport: PortDirection,
    weight: usize,
}

/// in the order the links are created
const PASSES: [Pass; 4] = [
    Pass {
        outport: PortDirection::East,
        weight: X_WEIGHT,
    },
    Pass {
        outport: PortDirection::West,
        weight: X_WEIGHT,
    },
    Pass {
        outport: PortDirection::North,
        weight: Y_WEIGHT,
    },
    Pass {
        outport: PortDirection::South,
        weight: Y_WEIGHT,
    },
];

/// A 2-D mesh per chiplet, with no links between chiplets.
///
/// Routers of chiplet `c` are `c * per_chiplet .. (c + 1) * per_chiplet`,
/// laid out row by row. Each pair of neighbours is joined by two simplex
/// links, one per direction. Growing the column index goes East, growing the
/// row index goes North:
/// <pre>
///  ^   8 --- 9 --- 10 --- 11
///  |   |     |     |      |
/// row  4 --- 5 --- 6  --- 7
///  |   |     |     |      |
///  |   0 --- 1 --- 2  --- 3
///      < ------ col ------ >
/// </pre>
///
/// X links (East/West) weigh less than Y links (North/South), so a
/// shortest-weight route finishes its X hops before any Y hop: XY
/// dimension-order routing, which is deadlock free without per-dimension
/// virtual channels.
///
/// Per chiplet, links are created East, West, North then South bound; the
/// X passes walk the mesh row by row, the Y passes column by column. A mesh
/// with a single row (column) has no Y (X) links.
pub fn mesh_links(
    layout: &ChipletLayout,
    compute_count: usize,
    routers: &mut [Router],
    profile: &LinkProfile,
    link_ids: &mut LinkIdAllocator,
) -> Result<Vec<Link>, Error> {
    let (rows, cols) = (layout.rows, layout.cols);
    let dims = [cols, rows];
    let mut links = Vec::new();
    let mut visited = BTreeSet::new();

    for chiplet in 0..layout.chiplet_count {
        log::debug!("topology for CPU chiplet {}:", chiplet);
        let base = chiplet * layout.per_chiplet();
        let router = |row: usize, col: usize| RouterId(base + linearize_index(&[col, row], &dims));
        for (row, col) in iproduct!(0..rows, 0..cols) {
            visited.insert(router(row, col));
        }

        for pass in PASSES.iter() {
            let pairs: Vec<((usize, usize), (usize, usize))> = if pass.outport.is_x_axis() {
                iproduct!(0..rows, 0..cols)
                    .filter(|&(_, col)| col + 1 < cols)
                    .map(|(row, col)| ((row, col), (row, col + 1)))
                    .collect()
            } else {
                iproduct!(0..cols, 0..rows)
                    .filter(|&(_, row)| row + 1 < rows)
                    .map(|(col, row)| ((row, col), (row + 1, col)))
                    .collect()
            };
            // pairs are (lower, upper); East and North bound links go up
            let upward = matches!(pass.outport, PortDirection::East | PortDirection::North);
            for (lower, upper) in pairs {
                let (src, dst) = if upward { (lower, upper) } else { (upper, lower) };
                let link = Link::internal(
                    link_ids.get_next(),
                    router(src.0, src.1),
                    router(dst.0, dst.1),
                    profile,
                    pass.weight,
                )
                .with_ports(pass.outport, pass.outport.opposite());
                attach(routers, &link)?;
                links.push(link);
            }
        }
    }

    // every compute router, and nothing past them, sits on exactly one mesh
    let overflow = visited.iter().find(|r| r.0 >= compute_count);
    if visited.len() != compute_count || overflow.is_some() {
        return Err(Error::OrderingInvariantViolation(format!(
            "mesh covers {} distinct routers (first out of range: {:?}), expected {} compute routers",
            visited.len(),
            overflow,
            compute_count
        )));
    }
    Ok(links)
}
