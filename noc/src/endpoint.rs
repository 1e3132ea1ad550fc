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

//! Endpoint descriptors and their classification into router regions.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Stable identity of an endpoint, as assigned by system assembly.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference to the clock domain an endpoint runs in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct ClockDomain(pub u32);

/// The four groups of endpoints that get routers, in router allocation order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Region {
    Compute,
    L2Cache,
    MemoryController,
    Dma,
}

impl Region {
    /// All regions, in the order their routers (and external links) are
    /// allocated.
    pub const ALL: [Region; 4] = [
        Region::Compute,
        Region::L2Cache,
        Region::MemoryController,
        Region::Dma,
    ];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Compute => "CPU",
            Self::L2Cache => "L2",
            Self::MemoryController => "MC",
            Self::Dma => "DMA",
        };
        f.write_str(label)
    }
}

/// Endpoint type tag.
///
/// Descriptors carry a controller type name; the ones the generator knows how
/// to place map onto a [`Region`], anything else is kept as `Unplaced` so the
/// classifier can report it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointKind {
    Compute,
    L2Cache,
    MemoryController,
    Dma,
    Unplaced(String),
}

impl EndpointKind {
    pub fn region(&self) -> Option<Region> {
        match self {
            Self::Compute => Some(Region::Compute),
            Self::L2Cache => Some(Region::L2Cache),
            Self::MemoryController => Some(Region::MemoryController),
            Self::Dma => Some(Region::Dma),
            Self::Unplaced(_) => None,
        }
    }
}

impl From<&str> for EndpointKind {
    fn from(tag: &str) -> Self {
        match tag {
            "compute" | "L1Cache_Controller" => Self::Compute,
            "l2" | "L2Cache_Controller" => Self::L2Cache,
            "mc" | "Directory_Controller" => Self::MemoryController,
            "dma" | "DMA_Controller" => Self::Dma,
            other => Self::Unplaced(other.to_string()),
        }
    }
}

impl From<String> for EndpointKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<EndpointKind> for String {
    fn from(kind: EndpointKind) -> String {
        match kind {
            EndpointKind::Compute => "compute".to_string(),
            EndpointKind::L2Cache => "l2".to_string(),
            EndpointKind::MemoryController => "mc".to_string(),
            EndpointKind::Dma => "dma".to_string(),
            EndpointKind::Unplaced(tag) => tag,
        }
    }
}

/// An endpoint descriptor: what it is, who it is, and optionally which clock
/// domain it lives in.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub id: EndpointId,
    #[serde(default)]
    pub clock_domain: Option<ClockDomain>,
}

impl Endpoint {
    pub fn new(kind: EndpointKind, id: u64) -> Self {
        Self {
            kind,
            id: EndpointId(id),
            clock_domain: None,
        }
    }

    pub fn compute(id: u64) -> Self {
        Self::new(EndpointKind::Compute, id)
    }

    pub fn l2_cache(id: u64) -> Self {
        Self::new(EndpointKind::L2Cache, id)
    }

    pub fn memory_controller(id: u64) -> Self {
        Self::new(EndpointKind::MemoryController, id)
    }

    pub fn dma(id: u64) -> Self {
        Self::new(EndpointKind::Dma, id)
    }

    pub fn with_clock_domain(self, domain: u32) -> Self {
        Self {
            clock_domain: Some(ClockDomain(domain)),
            ..self
        }
    }
}

/// An endpoint that survived classification, with its position in the
/// original input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlacedEndpoint {
    pub position: usize,
    pub region: Region,
    pub endpoint: Endpoint,
}

/// Endpoints split into the four router regions, each in input order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassifiedEndpoints {
    pub compute: Vec<PlacedEndpoint>,
    pub l2_cache: Vec<PlacedEndpoint>,
    pub memory_controllers: Vec<PlacedEndpoint>,
    pub dma: Vec<PlacedEndpoint>,
}

impl ClassifiedEndpoints {
    pub fn region(&self, region: Region) -> &[PlacedEndpoint] {
        match region {
            Region::Compute => &self.compute,
            Region::L2Cache => &self.l2_cache,
            Region::MemoryController => &self.memory_controllers,
            Region::Dma => &self.dma,
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut Vec<PlacedEndpoint> {
        match region {
            Region::Compute => &mut self.compute,
            Region::L2Cache => &mut self.l2_cache,
            Region::MemoryController => &mut self.memory_controllers,
            Region::Dma => &mut self.dma,
        }
    }

    /// total number of classified endpoints
    pub fn len(&self) -> usize {
        Region::ALL.iter().map(|r| self.region(*r).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// endpoints that are not compute endpoints
    pub fn non_compute_count(&self) -> usize {
        self.len() - self.compute.len()
    }

    /// iterate over all endpoints in region order: compute, L2, MC, DMA.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedEndpoint> {
        Region::ALL.iter().flat_map(move |r| self.region(*r).iter())
    }
}

/// Split endpoints into the four router regions, preserving input order.
///
/// Endpoints with a type the generator does not place are dropped.
pub fn classify(endpoints: &[Endpoint]) -> ClassifiedEndpoints {
    let mut classified = ClassifiedEndpoints::default();
    for (position, endpoint) in endpoints.iter().enumerate() {
        match endpoint.kind.region() {
            Some(region) => classified.region_mut(region).push(PlacedEndpoint {
                position,
                region,
                endpoint: endpoint.clone(),
            }),
            None => log::warn!(
                "ignoring endpoint {} at position {}: unrecognized type {:?}",
                endpoint.id,
                position,
                endpoint.kind
            ),
        }
    }
    classified
}

/// A list of endpoint descriptors, as read from a file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EndpointList {
    pub endpoints: Vec<Endpoint>,
}

impl EndpointList {
    pub fn from_file(file_name: &str) -> anyhow::Result<Self> {
        let file = File::open(Path::new(file_name))
            .with_context(|| format!("endpoint list {} not found", file_name))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("malformed endpoint list {}", file_name))
    }

    pub fn from_str(list: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(list).context("malformed endpoint list")
    }
}
