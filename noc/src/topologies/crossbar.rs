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
use crate::endpoint::Region;
use crate::error::Error;
use crate::layout::ChipletLayout;
use crate::topology::{Link, Router, RouterId};

/// weight of the links to and from the aggregation router
const INTERPOSER_WEIGHT: usize = 1;

/// Join every chiplet to the aggregation router.
///
/// Each compute chiplet is attached through its ingress router (the first
/// router of the chiplet); every L2, memory controller and DMA router is
/// attached on its own. All attachments are a pair of simplex links, to the
/// aggregation router first, then back. They cross the interposer, so they
/// use the interposer profile and are marked as clock domain crossings.
/// <pre>
///  [chiplet 0] [chiplet 1] ... L2 L2 MC MC DMA
///       \          |           |  |  |  |  /
///        +---------+---- xbar -+--+--+--+-+
/// </pre>
pub fn crossbar_links(
    layout: &ChipletLayout,
    regions: &RouterRegions,
    routers: &mut [Router],
    profile: &LinkProfile,
    link_ids: &mut LinkIdAllocator,
) -> Result<Vec<Link>, Error> {
    let xbar = regions.aggregation.ok_or_else(|| {
        Error::OrderingInvariantViolation("no aggregation router allocated".to_string())
    })?;
    // the aggregation router is the last router, and the only one past the
    // endpoint routers
    if xbar.0 + 1 != routers.len() || regions.endpoint_router_count() != xbar.0 {
        return Err(Error::OrderingInvariantViolation(format!(
            "aggregation router {} is not the last of {} routers",
            xbar,
            routers.len()
        )));
    }
    // the first L2 router comes right after the compute routers
    let compute_count = layout.router_count();
    if regions.start(Region::L2Cache) != RouterId(compute_count) {
        return Err(Error::OrderingInvariantViolation(format!(
            "first L2 router is {}, expected {}",
            regions.start(Region::L2Cache),
            compute_count
        )));
    }

    log::debug!("connecting all chiplets to aggregation router {}", xbar);
    let mut links = Vec::new();
    let mut add_pair = |router: RouterId, routers: &mut [Router]| -> Result<(), Error> {
        for (src, dst) in [(router, xbar), (xbar, router)].iter() {
            let link = Link::internal(link_ids.get_next(), *src, *dst, profile, INTERPOSER_WEIGHT)
                .with_clip();
            attach(routers, &link)?;
            links.push(link);
        }
        Ok(())
    };

    for chiplet in 0..layout.chiplet_count {
        add_pair(RouterId(layout.ingress(chiplet)), routers)?;
    }

    let mut next = compute_count;
    for region in [Region::L2Cache, Region::MemoryController, Region::Dma].iter() {
        for router in regions.routers(*region) {
            if router.0 != next {
                return Err(Error::OrderingInvariantViolation(format!(
                    "{} router {} out of order, expected {}",
                    region, router, next
                )));
            }
            add_pair(router, routers)?;
            next += 1;
        }
    }
    // the walk over the non-compute routers ends at the aggregation router
    if next != xbar.0 {
        return Err(Error::OrderingInvariantViolation(format!(
            "non-compute routers end at {}, aggregation router is {}",
            next, xbar
        )));
    }

    Ok(links)
}
