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

//! The generated topology: routers, and the external and internal links
//! between them.
//!
//! A `Topology` is the only output of the generator. It is built once and
//! never changes afterwards; network assembly instantiates the routers and
//! links it describes, and the route computation phase uses the internal
//! link weights to pick dimension-ordered paths.

use crate::config::LinkProfile;
use crate::endpoint::{ClockDomain, EndpointId, PlacedEndpoint, Region};
use crate::Cycle;
use petgraph::prelude::*;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RouterId(pub usize);

impl Display for RouterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LinkId(pub usize);

impl Display for LinkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Mesh port labels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PortDirection {
    North,
    South,
    East,
    West,
}

impl PortDirection {
    pub fn opposite(&self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// East/West ports are on the X axis, North/South on the Y axis.
    pub fn is_x_axis(&self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

impl Display for PortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkKind {
    /// endpoint <-> router
    External {
        endpoint: EndpointId,
        region: Region,
        router: RouterId,
    },
    /// router -> router
    Internal { src: RouterId, dst: RouterId },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub kind: LinkKind,
    pub latency: Cycle,
    /// flit width in bits
    pub width: usize,
    /// routing weight; route computation prefers lighter links
    pub weight: usize,
    pub src_outport: Option<PortDirection>,
    pub dst_inport: Option<PortDirection>,
    /// clock/voltage domain crossing on the transmit side
    pub tx_clip: bool,
    /// clock/voltage domain crossing on the receive side
    pub rx_clip: bool,
    /// clock domain of the endpoint, for external links
    pub clock_domain: Option<ClockDomain>,
}

impl Link {
    pub(crate) fn external(
        id: LinkId,
        endpoint: &PlacedEndpoint,
        router: RouterId,
        profile: &LinkProfile,
    ) -> Self {
        Self {
            id,
            kind: LinkKind::External {
                endpoint: endpoint.endpoint.id,
                region: endpoint.region,
                router,
            },
            latency: profile.latency,
            width: profile.width,
            weight: 1,
            src_outport: None,
            dst_inport: None,
            tx_clip: false,
            rx_clip: false,
            clock_domain: endpoint.endpoint.clock_domain,
        }
    }

    pub(crate) fn internal(
        id: LinkId,
        src: RouterId,
        dst: RouterId,
        profile: &LinkProfile,
        weight: usize,
    ) -> Self {
        Self {
            id,
            kind: LinkKind::Internal { src, dst },
            latency: profile.latency,
            width: profile.width,
            weight,
            src_outport: None,
            dst_inport: None,
            tx_clip: false,
            rx_clip: false,
            clock_domain: None,
        }
    }

    pub(crate) fn with_ports(self, src_outport: PortDirection, dst_inport: PortDirection) -> Self {
        Self {
            src_outport: Some(src_outport),
            dst_inport: Some(dst_inport),
            ..self
        }
    }

    /// mark both ends of the link as crossing a clock domain
    pub(crate) fn with_clip(self) -> Self {
        Self {
            tx_clip: true,
            rx_clip: true,
            ..self
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, LinkKind::External { .. })
    }

    /// source and destination routers of an internal link
    pub fn routers(&self) -> Option<(RouterId, RouterId)> {
        match self.kind {
            LinkKind::Internal { src, dst } => Some((src, dst)),
            LinkKind::External { .. } => None,
        }
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            LinkKind::External {
                endpoint,
                region,
                router,
            } => write!(f, "{}-{} connected to Router-{}", region, endpoint, router)?,
            LinkKind::Internal { src, dst } => {
                write!(f, "Router-{} connected to Router-{}", src, dst)?
            }
        }
        write!(
            f,
            " via Link-{} with latency={} (cycles) and bandwidth={} (bits)",
            self.id, self.latency, self.width
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Router {
    pub id: RouterId,
    /// pipeline latency
    pub latency: Cycle,
    /// flit width in bits; set by the external link that terminates here, so
    /// the router and that link agree on the flit size. Routers with no
    /// external link (the aggregation router) use the network default.
    pub width: Option<usize>,
    /// every link with this router at one of its ends, in link id order
    pub links: Vec<LinkId>,
}

impl Router {
    pub(crate) fn new(id: usize, latency: Cycle) -> Self {
        Self {
            id: RouterId(id),
            latency,
            width: None,
            links: Vec::new(),
        }
    }
}

/// Routers and links of a generated network.
///
/// Link ids form the contiguous range `0..link_count()`: external links come
/// first (in router order), followed by the internal links.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Topology {
    routers: Vec<Router>,
    external_links: Vec<Link>,
    internal_links: Vec<Link>,
}

impl Topology {
    pub(crate) fn new(
        routers: Vec<Router>,
        external_links: Vec<Link>,
        internal_links: Vec<Link>,
    ) -> Self {
        Self {
            routers,
            external_links,
            internal_links,
        }
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn external_links(&self) -> &[Link] {
        &self.external_links
    }

    pub fn internal_links(&self) -> &[Link] {
        &self.internal_links
    }

    pub fn router(&self, id: RouterId) -> Option<&Router> {
        self.routers.get(id.0)
    }

    pub fn link_count(&self) -> usize {
        self.external_links.len() + self.internal_links.len()
    }

    /// look up a link by id.
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        let external = self.external_links.len();
        if id.0 < external {
            self.external_links.get(id.0)
        } else {
            self.internal_links.get(id.0 - external)
        }
    }

    /// returns an iterator over all links, in link id order
    pub fn iter_links(&self) -> impl Iterator<Item = &Link> {
        self.external_links.iter().chain(self.internal_links.iter())
    }

    /// the link attaching `endpoint` to its router
    pub fn external_link_for(&self, endpoint: EndpointId) -> Option<&Link> {
        self.external_links.iter().find(|l| match l.kind {
            LinkKind::External { endpoint: e, .. } => e == endpoint,
            LinkKind::Internal { .. } => false,
        })
    }

    /// all internal links from `src` to `dst`
    pub fn links_between(&self, src: RouterId, dst: RouterId) -> Vec<&Link> {
        self.internal_links
            .iter()
            .filter(|l| l.routers() == Some((src, dst)))
            .collect()
    }

    /// The router graph: one node per router (node index == router id), one
    /// edge per internal link.
    pub fn to_graph(&self) -> DiGraph<RouterId, &Link> {
        let mut graph = DiGraph::with_capacity(self.routers.len(), self.internal_links.len());
        for router in self.routers.iter() {
            graph.add_node(router.id);
        }
        for link in self.internal_links.iter() {
            if let LinkKind::Internal { src, dst } = link.kind {
                graph.add_edge(NodeIndex::new(src.0), NodeIndex::new(dst.0), link);
            }
        }
        graph
    }

    /// Minimum total routing weight from `src` to every router reachable
    /// from it.
    pub fn route_costs(&self, src: RouterId) -> BTreeMap<RouterId, usize> {
        let graph = self.to_graph();
        if src.0 >= graph.node_count() {
            return BTreeMap::new();
        }
        petgraph::algo::dijkstra(&graph, NodeIndex::new(src.0), None, |e| e.weight().weight)
            .into_iter()
            .map(|(node, cost)| (graph[node], cost))
            .collect()
    }

    pub fn to_graphviz(&self) -> String {
        use petgraph::dot::{Config, Dot};

        let graph = self.to_graph();
        let port = |p: Option<PortDirection>| p.map(|p| p.to_string()).unwrap_or_default();
        // the attribute getters borrow `port` and `self`; render within this
        // statement, before they go out of scope
        let dot = format!(
            "{:?}",
            Dot::with_attr_getters(
                &graph,
                &[Config::NodeNoLabel, Config::EdgeNoLabel],
                &|_, edge| {
                    format!(
                        "label=\"Link {}\nw = {}\nlat = {}\"; headlabel=\"{}\"; taillabel=\"{}\"",
                        edge.weight().id,
                        edge.weight().weight,
                        edge.weight().latency,
                        port(edge.weight().dst_inport),
                        port(edge.weight().src_outport)
                    )
                },
                &|_, node| {
                    let router = &self.routers[node.1 .0];
                    format!("label=\"Router {}\nlat = {}\"", router.id, router.latency)
                },
            )
        );
        dot
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_graphviz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;

    fn line_of_three() -> Topology {
        let profile = LinkProfile::new(1, 64);
        let mut routers = (0..3).map(|i| Router::new(i, 1)).collect::<Vec<_>>();
        let placed = PlacedEndpoint {
            position: 0,
            region: Region::Compute,
            endpoint: Endpoint::compute(42).with_clock_domain(7),
        };
        let external = vec![Link::external(LinkId(0), &placed, RouterId(0), &profile)];
        routers[0].width = Some(64);
        let internal = vec![
            Link::internal(LinkId(1), RouterId(0), RouterId(1), &profile, 1)
                .with_ports(PortDirection::East, PortDirection::West),
            Link::internal(LinkId(2), RouterId(1), RouterId(2), &profile, 1)
                .with_ports(PortDirection::East, PortDirection::West),
            Link::internal(LinkId(3), RouterId(0), RouterId(2), &profile, 5),
        ];
        Topology::new(routers, external, internal)
    }

    #[test]
    fn port_direction() {
        assert_eq!(PortDirection::North.opposite(), PortDirection::South);
        assert_eq!(PortDirection::West.opposite(), PortDirection::East);
        assert!(PortDirection::East.is_x_axis());
        assert!(!PortDirection::South.is_x_axis());
    }

    #[test]
    fn lookup() {
        let topo = line_of_three();
        assert_eq!(topo.link_count(), 4);
        assert_eq!(topo.link(LinkId(0)).map(|l| l.is_external()), Some(true));
        assert_eq!(topo.link(LinkId(2)).and_then(|l| l.routers()), Some((RouterId(1), RouterId(2))));
        assert!(topo.link(LinkId(4)).is_none());
        let ext = topo.external_link_for(EndpointId(42)).unwrap();
        assert_eq!(ext.clock_domain, Some(ClockDomain(7)));
        assert!(topo.external_link_for(EndpointId(1)).is_none());
        assert_eq!(topo.links_between(RouterId(0), RouterId(2)).len(), 1);
        assert!(topo.links_between(RouterId(2), RouterId(0)).is_empty());
        assert_eq!(
            topo.iter_links().map(|l| l.id.0).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn link_display() {
        let topo = line_of_three();
        assert_eq!(
            topo.external_links()[0].to_string(),
            "CPU-42 connected to Router-0 via Link-0 with latency=1 (cycles) and bandwidth=64 (bits)"
        );
        assert_eq!(
            topo.internal_links()[0].to_string(),
            "Router-0 connected to Router-1 via Link-1 with latency=1 (cycles) and bandwidth=64 (bits)"
        );
    }

    #[test]
    fn route_costs_prefer_light_links() {
        let topo = line_of_three();
        let costs = topo.route_costs(RouterId(0));
        // two hops of weight 1 beat the direct link of weight 5
        assert_eq!(costs.get(&RouterId(2)), Some(&2));
        assert_eq!(costs.get(&RouterId(0)), Some(&0));
        // links are directed: nothing is reachable from the end of the line
        assert_eq!(topo.route_costs(RouterId(2)).len(), 1);
        assert!(topo.route_costs(RouterId(9)).is_empty());
    }

    #[test]
    fn test_graphviz() {
        let topo = line_of_three();
        let dot = topo.to_graphviz();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label=\"Router 2\nlat = 1\""));
        assert!(dot.contains("headlabel=\"West\"; taillabel=\"East\""));
        assert_eq!(dot, topo.to_string());
    }
}
