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

use super::{attach, LinkIdAllocator, RouterRegions};
use crate::config::LinkProfile;
use crate::endpoint::{ClassifiedEndpoints, Region};
use crate::error::Error;
use crate::layout::ChipletLayout;
use crate::topology::{Link, Router, RouterId};

/// number of memory controllers, one per mesh corner
pub const CORNER_COUNT: usize = 4;

const INTERPOSER_WEIGHT: usize = 1;

/// Check that the endpoints fit the corner variant: a single mesh, exactly
/// four memory controllers, and nothing else besides compute endpoints.
pub fn check_corner_memory(
    classified: &ClassifiedEndpoints,
    layout: &ChipletLayout,
) -> Result<(), Error> {
    let memory_controllers = classified.memory_controllers.len();
    if memory_controllers != CORNER_COUNT {
        return Err(Error::CardinalityError {
            what: "memory controllers",
            expected: CORNER_COUNT,
            found: memory_controllers,
        });
    }
    if classified.non_compute_count() != CORNER_COUNT {
        return Err(Error::CardinalityError {
            what: "non-compute endpoints",
            expected: CORNER_COUNT,
            found: classified.non_compute_count(),
        });
    }
    if layout.chiplet_count != 1 {
        return Err(Error::shape(
            layout.router_count(),
            format!(
                "memory controllers attach to the corners of a single mesh, not {} chiplets",
                layout.chiplet_count
            ),
        ));
    }
    Ok(())
}

/// Attach the memory controller routers to the corners of the mesh.
///
/// Memory controller `k` is joined to corner `k`, in the order bottom-left
/// (0), bottom-right (cols - 1), top-left (N - cols), top-right (N - 1), by
/// a pair of interposer links: controller to corner, then back.
/// <pre>
///  MC2 = 12 -- 13 -- 14 -- 15 = MC3
///        |     |     |     |
///        8 --- 9 --- 10 -- 11
///        |     |     |     |
///        4 --- 5 --- 6 --- 7
///        |     |     |     |
///  MC0 = 0 --- 1 --- 2 --- 3 = MC1
/// </pre>
/// No extra router is involved.
pub fn corner_memory_links(
    layout: &ChipletLayout,
    regions: &RouterRegions,
    routers: &mut [Router],
    profile: &LinkProfile,
    link_ids: &mut LinkIdAllocator,
) -> Result<Vec<Link>, Error> {
    let memory_routers = regions
        .routers(Region::MemoryController)
        .collect::<Vec<_>>();
    if memory_routers.len() != CORNER_COUNT {
        return Err(Error::OrderingInvariantViolation(format!(
            "{} memory controller routers for {} corners",
            memory_routers.len(),
            CORNER_COUNT
        )));
    }

    let mut links = Vec::with_capacity(2 * CORNER_COUNT);
    for (mc, corner) in memory_routers.iter().zip(layout.corners().iter()) {
        let corner = RouterId(*corner);
        for (src, dst) in [(*mc, corner), (corner, *mc)].iter() {
            let link = Link::internal(link_ids.get_next(), *src, *dst, profile, INTERPOSER_WEIGHT)
                .with_clip();
            attach(routers, &link)?;
            links.push(link);
        }
    }
    Ok(links)
}
