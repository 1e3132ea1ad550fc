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

use super::{attach, router_mut, LinkIdAllocator, RouterRegions};
use crate::config::LinkProfile;
use crate::endpoint::{ClassifiedEndpoints, Region};
use crate::error::Error;
use crate::topology::{Link, Router};

/// Connect every endpoint to its own router.
///
/// Endpoints are visited in region order (compute, L2, memory controllers,
/// DMA), so external link ids follow router ids. The router takes its flit
/// width from the link profile: a link and the router it terminates on must
/// agree on the flit size.
pub fn external_links(
    classified: &ClassifiedEndpoints,
    regions: &RouterRegions,
    routers: &mut [Router],
    profile: &LinkProfile,
    link_ids: &mut LinkIdAllocator,
) -> Result<Vec<Link>, Error> {
    let mut links = Vec::with_capacity(classified.len());
    for region in Region::ALL.iter() {
        let endpoints = classified.region(*region);
        let region_routers = regions.routers(*region).collect::<Vec<_>>();
        if endpoints.len() != region_routers.len() {
            return Err(Error::OrderingInvariantViolation(format!(
                "{} {} endpoints but {} routers",
                endpoints.len(),
                region,
                region_routers.len()
            )));
        }
        for (endpoint, router) in endpoints.iter().zip(region_routers) {
            router_mut(routers, router)?.width = Some(profile.width);
            let link = Link::external(link_ids.get_next(), endpoint, router, profile);
            attach(routers, &link)?;
            links.push(link);
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::super::allocate_routers;
    use super::*;
    use crate::config::TopologyConfiguration;
    use crate::endpoint::{classify, Endpoint, EndpointId};
    use crate::topology::{LinkId, LinkKind, RouterId};

    #[test]
    fn one_link_per_endpoint() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let classified = classify(&[
            Endpoint::dma(90),
            Endpoint::compute(10).with_clock_domain(1),
            Endpoint::memory_controller(70),
            Endpoint::compute(11).with_clock_domain(1),
            Endpoint::l2_cache(50),
        ]);
        let config = TopologyConfiguration::default();
        let (mut routers, regions) = allocate_routers(&classified, &config);
        let mut ids = LinkIdAllocator::new();
        let links = external_links(
            &classified,
            &regions,
            &mut routers,
            &config.chiplet_link,
            &mut ids,
        )
        .unwrap();

        assert_eq!(links.len(), 5);
        assert_eq!(ids.count(), 5);
        let expected = [
            (10, Region::Compute),
            (11, Region::Compute),
            (50, Region::L2Cache),
            (70, Region::MemoryController),
            (90, Region::Dma),
        ];
        for (i, (link, (endpoint, region))) in links.iter().zip(expected.iter()).enumerate() {
            assert_eq!(link.id, LinkId(i));
            assert_eq!(
                link.kind,
                LinkKind::External {
                    endpoint: EndpointId(*endpoint),
                    region: *region,
                    router: RouterId(i)
                }
            );
            assert_eq!(link.latency, config.chiplet_link.latency);
            assert_eq!(link.width, config.chiplet_link.width);
            assert_eq!(routers[i].width, Some(config.chiplet_link.width));
            assert_eq!(routers[i].links, vec![LinkId(i)]);
        }
        assert!(links[0].clock_domain.is_some());
        assert!(links[2].clock_domain.is_none());

        // the aggregation router has no endpoint, so no width either
        assert_eq!(routers[5].width, None);
        assert!(routers[5].links.is_empty());
    }
}
