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

//! Reference chiplet systems, built from the YAML files in `configs/`.
//!
//! Without arguments, both reference systems are generated and summarized.
//! With two arguments, `<topology.yaml> <endpoints.yaml>`, that system is
//! generated instead and its graphviz rendering is printed.

use anyhow::Context;
use itertools::Itertools;
use noc::{generate, EndpointList, Region, Topology, TopologyConfiguration};

const CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/configs");

/// (name, topology configuration, endpoint list)
const REFERENCE_SYSTEMS: [(&str, &str, &str); 2] = [
    ("crossbar_16", "crossbar_16.yaml", "crossbar_16_endpoints.yaml"),
    ("corner_16", "corner_16.yaml", "corner_16_endpoints.yaml"),
];

fn build_system(config_file: &str, endpoints_file: &str) -> anyhow::Result<Topology> {
    let config = TopologyConfiguration::from_file(config_file)?;
    let list = EndpointList::from_file(endpoints_file)?;
    generate(&list.endpoints, &config)
        .with_context(|| format!("failed to generate {} from {}", config_file, endpoints_file))
}

fn summarize(name: &str, topo: &Topology) {
    let degrees = topo
        .routers()
        .iter()
        .map(|r| r.links.len())
        .counts()
        .into_iter()
        .sorted()
        .map(|(degree, count)| format!("{}x{}", count, degree))
        .join(", ");
    log::info!(
        "{}: {} routers, {} links ({} external); router degrees {}",
        name,
        topo.routers().len(),
        topo.link_count(),
        topo.external_links().len(),
        degrees
    );
    for region in Region::ALL.iter() {
        let attached = topo
            .external_links()
            .iter()
            .filter(|l| matches!(l.kind, noc::LinkKind::External { region: r, .. } if r == *region))
            .count();
        log::info!("{}:   {} {} endpoint(s)", name, attached, region);
    }
    log::debug!("{}", topo.to_graphviz());
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [config_file, endpoints_file] => {
            let topo = build_system(config_file, endpoints_file)?;
            summarize(config_file, &topo);
            println!("{}", topo.to_graphviz());
        }
        [] => {
            for (name, config_file, endpoints_file) in REFERENCE_SYSTEMS.iter() {
                let topo = build_system(
                    &format!("{}/{}", CONFIG_DIR, config_file),
                    &format!("{}/{}", CONFIG_DIR, endpoints_file),
                )?;
                summarize(name, &topo);
            }
        }
        _ => anyhow::bail!("usage: chiplet_systems [<topology.yaml> <endpoints.yaml>]"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noc::{EndpointId, LinkKind, RouterId};

    fn reference_system(name: &str) -> Topology {
        let (_, config_file, endpoints_file) = REFERENCE_SYSTEMS
            .iter()
            .find(|(n, _, _)| *n == name)
            .unwrap();
        build_system(
            &format!("{}/{}", CONFIG_DIR, config_file),
            &format!("{}/{}", CONFIG_DIR, endpoints_file),
        )
        .unwrap()
    }

    #[test]
    fn crossbar_16_system() {
        let _ = env_logger::builder().is_test(true).try_init();
        let topo = reference_system("crossbar_16");

        // 16 cores, 4 L2, 4 MC, 1 DMA, plus the crossbar; sequencers are not placed
        assert_eq!(topo.routers().len(), 26);
        assert_eq!(topo.external_links().len(), 25);
        // 4 chiplets of 2 x 2 with 8 mesh links each, 13 crossbar link pairs
        assert_eq!(topo.internal_links().len(), 32 + 26);
        assert!(topo.external_link_for(EndpointId(200)).is_none());

        let xbar = RouterId(25);
        assert_eq!(topo.router(xbar).unwrap().latency, 4);
        assert_eq!(topo.router(xbar).unwrap().width, None);
        for ingress in [0, 4, 8, 12].iter() {
            let links = topo.links_between(RouterId(*ingress), xbar);
            assert_eq!(links.len(), 1);
            assert_eq!(links[0].width, 64);
            assert_eq!(links[0].latency, 4);
            assert!(links[0].tx_clip && links[0].rx_clip);
        }
        // non-ingress cores only reach the crossbar through their mesh
        assert!(topo.links_between(RouterId(5), xbar).is_empty());

        let l2 = topo.external_link_for(EndpointId(50)).unwrap();
        assert!(matches!(
            l2.kind,
            LinkKind::External { region: Region::L2Cache, router: RouterId(16), .. }
        ));
        assert_eq!(l2.clock_domain, Some(noc::ClockDomain(1)));
    }

    #[test]
    fn corner_16_system() {
        let _ = env_logger::builder().is_test(true).try_init();
        let topo = reference_system("corner_16");

        assert_eq!(topo.routers().len(), 20);
        assert_eq!(topo.external_links().len(), 20);
        // 4 x 4 mesh: 24 links per axis, and 4 corner pairs
        assert_eq!(topo.internal_links().len(), 48 + 8);
        for (mc, corner) in [(16, 0), (17, 3), (18, 12), (19, 15)].iter() {
            assert_eq!(topo.links_between(RouterId(*mc), RouterId(*corner)).len(), 1);
            assert_eq!(topo.links_between(RouterId(*corner), RouterId(*mc)).len(), 1);
        }
        // corners have two mesh neighbours, two corner links and one core each way
        assert_eq!(topo.router(RouterId(0)).unwrap().links.len(), 4 + 2 + 1);
    }

    #[test]
    fn graphviz_names_every_router() {
        let topo = reference_system("corner_16");
        let dot = topo.to_graphviz();
        for r in topo.routers() {
            assert!(dot.contains(&format!("Router {}", r.id)));
        }
    }

    #[test]
    fn missing_files_are_reported() {
        let err = build_system("no_such_topology.yaml", "no_such_endpoints.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("no_such_topology.yaml"));
    }
}
