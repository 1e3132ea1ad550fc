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

use crate::config::{Aggregation, TopologyConfiguration};
use crate::endpoint::{ClassifiedEndpoints, Region};
use crate::topology::{Router, RouterId};

/// First router id of every region, and the aggregation router if any.
///
/// Routers are allocated in region order: compute, L2, memory controllers,
/// DMA, and the aggregation router last. The builders index into the router
/// array with these offsets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouterRegions {
    starts: [usize; 4],
    ends: [usize; 4],
    pub aggregation: Option<RouterId>,
}

impl RouterRegions {
    fn slot(region: Region) -> usize {
        match region {
            Region::Compute => 0,
            Region::L2Cache => 1,
            Region::MemoryController => 2,
            Region::Dma => 3,
        }
    }

    /// id of the first router of `region`
    pub fn start(&self, region: Region) -> RouterId {
        RouterId(self.starts[Self::slot(region)])
    }

    /// router ids of `region`, in endpoint order
    pub fn routers(&self, region: Region) -> impl Iterator<Item = RouterId> {
        let slot = Self::slot(region);
        (self.starts[slot]..self.ends[slot]).map(RouterId)
    }

    /// one past the last router serving an endpoint
    pub fn endpoint_router_count(&self) -> usize {
        self.ends[Self::slot(Region::Dma)]
    }
}

/// Allocate one router per classified endpoint, plus the aggregation router
/// for the crossbar variant.
pub fn allocate_routers(
    classified: &ClassifiedEndpoints,
    config: &TopologyConfiguration,
) -> (Vec<Router>, RouterRegions) {
    let mut routers = Vec::with_capacity(classified.len() + 1);
    let mut starts = [0; 4];
    let mut ends = [0; 4];
    for region in Region::ALL.iter() {
        let slot = RouterRegions::slot(*region);
        starts[slot] = routers.len();
        for _ in classified.region(*region) {
            routers.push(Router::new(routers.len(), config.router_latency));
        }
        ends[slot] = routers.len();
    }

    let aggregation = match config.aggregation {
        Aggregation::Crossbar => {
            let xbar = Router::new(routers.len(), config.aggregation_router_latency);
            let id = xbar.id;
            routers.push(xbar);
            Some(id)
        }
        Aggregation::CornerMemory => None,
    };

    (
        routers,
        RouterRegions {
            starts,
            ends,
            aggregation,
        },
    )
}
