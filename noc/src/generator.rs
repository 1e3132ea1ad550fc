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
use crate::endpoint::{classify, Endpoint};
use crate::error::Error;
use crate::layout::ChipletLayout;
use crate::topologies::{
    allocate_routers, check_corner_memory, corner_memory_links, crossbar_links, external_links,
    mesh_links, LinkIdAllocator,
};
use crate::topology::Topology;

/// Generate the topology connecting `endpoints`.
///
/// Endpoints are classified into compute, L2, memory controller and DMA
/// groups; every endpoint gets its own router and external link. The compute
/// routers are laid out as one or more meshes, which are then joined either
/// through an aggregation router or by wiring four memory controllers to the
/// mesh corners, as selected by `config.aggregation`.
///
/// Link ids are handed out in a fixed order: external links, then mesh links
/// chiplet by chiplet, then the aggregation links. The same input always
/// produces the same topology.
pub fn generate(endpoints: &[Endpoint], config: &TopologyConfiguration) -> Result<Topology, Error> {
    let classified = classify(endpoints);
    let compute_count = classified.compute.len();
    let layout = ChipletLayout::partition(compute_count, &config.mesh)?;
    if config.aggregation == Aggregation::CornerMemory {
        check_corner_memory(&classified, &layout)?;
    }

    log::info!(
        "Configuration: {}; {} L2, {} MC, {} DMA chiplet(s); {:?} aggregation",
        layout,
        classified.l2_cache.len(),
        classified.memory_controllers.len(),
        classified.dma.len(),
        config.aggregation
    );

    let (mut routers, regions) = allocate_routers(&classified, config);
    let mut link_ids = LinkIdAllocator::new();

    let external = external_links(
        &classified,
        &regions,
        &mut routers,
        &config.chiplet_link,
        &mut link_ids,
    )?;

    let mut internal = mesh_links(
        &layout,
        compute_count,
        &mut routers,
        &config.chiplet_link,
        &mut link_ids,
    )?;

    let aggregation = match config.aggregation {
        Aggregation::Crossbar => crossbar_links(
            &layout,
            &regions,
            &mut routers,
            &config.interposer_link,
            &mut link_ids,
        )?,
        Aggregation::CornerMemory => corner_memory_links(
            &layout,
            &regions,
            &mut routers,
            &config.interposer_link,
            &mut link_ids,
        )?,
    };
    internal.extend(aggregation);

    if link_ids.count() != external.len() + internal.len() {
        return Err(Error::OrderingInvariantViolation(format!(
            "{} link ids handed out for {} links",
            link_ids.count(),
            external.len() + internal.len()
        )));
    }
    log::info!(
        "{} routers, {} external links, {} internal links",
        routers.len(),
        external.len(),
        internal.len()
    );

    Ok(Topology::new(routers, external, internal))
}
