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

use crate::Cycle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A default flit size, in bits.
pub const FLIT_WIDTH: usize = 128;

/// Pipeline latency of the aggregation router: a wider, higher radix switch.
pub const AGGREGATION_ROUTER_LATENCY: Cycle = 4;

/// latency and width shared by a class of links
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct LinkProfile {
    pub latency: Cycle,
    /// flit width in bits
    pub width: usize,
}

impl LinkProfile {
    pub fn new(latency: Cycle, width: usize) -> Self {
        Self { latency, width }
    }
}

/// How the compute endpoints are arranged into meshes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshShape {
    /// floor(sqrt(N)) chiplets, each a near-square mesh.
    Square,
    /// a single mesh with an explicit number of rows.
    Flat { rows: usize },
}

/// How the chiplets are joined together.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// every chiplet and every non-compute router hangs off one extra router.
    Crossbar,
    /// four memory controllers attach to the four corners of the mesh.
    CornerMemory,
}

/// Parameters for generating a topology.
///
/// constructed programmatically or read from a config file.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfiguration {
    /// links inside a chiplet, and between endpoints and their router
    pub chiplet_link: LinkProfile,
    /// links between chiplets, or to the aggregation router
    pub interposer_link: LinkProfile,
    pub router_latency: Cycle,
    pub aggregation_router_latency: Cycle,
    pub mesh: MeshShape,
    pub aggregation: Aggregation,
}

impl TopologyConfiguration {
    /// Compute chiplets arranged as square meshes, joined by a crossbar.
    pub fn hierarchical_crossbar() -> Self {
        Self::default()
    }

    /// One flat mesh with `rows` rows and memory controllers on its corners.
    pub fn corner_memory_mesh(rows: usize) -> Self {
        Self {
            mesh: MeshShape::Flat { rows },
            aggregation: Aggregation::CornerMemory,
            ..Default::default()
        }
    }

    pub fn from_file(file_name: &str) -> anyhow::Result<Self> {
        let file = File::open(Path::new(file_name))
            .with_context(|| format!("topology configuration {} not found", file_name))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("malformed topology configuration {}", file_name))
    }

    pub fn from_str(config: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(config).context("malformed topology configuration")
    }
}

impl Default for TopologyConfiguration {
    fn default() -> Self {
        Self {
            chiplet_link: LinkProfile::new(1, FLIT_WIDTH),
            interposer_link: LinkProfile::new(4, FLIT_WIDTH),
            router_latency: 1,
            aggregation_router_latency: AGGREGATION_ROUTER_LATENCY,
            mesh: MeshShape::Square,
            aggregation: Aggregation::Crossbar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_yaml_config() {
        let conf_str = "---
chiplet_link:
  latency: 2
  width: 64
interposer_link:
  latency: 8
  width: 32
router_latency: 3
mesh:
  flat:
    rows: 4
aggregation: corner_memory
";
        let config = TopologyConfiguration::from_str(conf_str).unwrap();
        assert_eq!(config.chiplet_link, LinkProfile::new(2, 64));
        assert_eq!(config.interposer_link, LinkProfile::new(8, 32));
        assert_eq!(config.router_latency, 3);
        // not in the file, so it keeps its default
        assert_eq!(config.aggregation_router_latency, AGGREGATION_ROUTER_LATENCY);
        assert_eq!(config.mesh, MeshShape::Flat { rows: 4 });
        assert_eq!(config.aggregation, Aggregation::CornerMemory);
    }

    #[test]
    fn read_yaml_square_config() {
        let config = TopologyConfiguration::from_str("mesh: square\naggregation: crossbar\n").unwrap();
        assert_eq!(config, TopologyConfiguration::hierarchical_crossbar());
    }

    #[test]
    fn reject_unknown_shape() {
        assert!(TopologyConfiguration::from_str("mesh: torus\n").is_err());
    }

    #[test]
    fn write_yaml_config() {
        let config = TopologyConfiguration::corner_memory_mesh(4);
        let text = serde_yaml::to_string(&config).unwrap();
        println!("{}", text);
        assert_eq!(TopologyConfiguration::from_str(&text).unwrap(), config);
    }
}
