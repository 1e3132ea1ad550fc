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

//! Generator for hierarchical chiplet network-on-chip topologies.
//!
//! Given the endpoints of a system (cores, L2 slices, memory controllers and
//! DMA engines), [`generate`] builds the routers and links of a network where
//! the cores sit on 2-D meshes with XY routing weights, and the meshes are
//! joined either by a crossbar router or through memory controllers attached
//! to the mesh corners.

mod config;
mod endpoint;
mod error;
mod generator;
mod layout;
pub mod topologies;
mod topology;

// type to use for cycles
pub type Cycle = usize;

pub use crate::config::{Aggregation, LinkProfile, MeshShape, TopologyConfiguration};
pub use crate::config::{AGGREGATION_ROUTER_LATENCY, FLIT_WIDTH};
pub use crate::endpoint::{classify, ClassifiedEndpoints, PlacedEndpoint};
pub use crate::endpoint::{ClockDomain, Endpoint, EndpointId, EndpointKind, EndpointList, Region};
pub use crate::error::Error;
pub use crate::generator::generate;
pub use crate::layout::ChipletLayout;
pub use crate::topology::{Link, LinkId, LinkKind, PortDirection, Router, RouterId, Topology};
