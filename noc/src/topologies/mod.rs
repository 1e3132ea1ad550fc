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

//! Builders for the pieces of a topology.
//!
//! Each builder takes the router array and the link id allocator explicitly
//! and returns the links it created, so that the global link order is fixed
//! by the order in which the generator calls them.

use crate::error::Error;
use crate::topology::{Link, LinkId, LinkKind, Router, RouterId};

mod corner;
mod crossbar;
mod external;
mod mesh;
mod routers;

pub use corner::{check_corner_memory, corner_memory_links, CORNER_COUNT};
pub use crossbar::crossbar_links;
pub use external::external_links;
pub use mesh::{mesh_links, X_WEIGHT, Y_WEIGHT};
pub use routers::{allocate_routers, RouterRegions};

/// Hands out link ids: one counter for the whole topology, so ids are
/// contiguous and reflect construction order.
#[derive(Debug, Default)]
pub struct LinkIdAllocator {
    next: usize,
}

impl LinkIdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    // return the next available link id
    pub fn get_next(&mut self) -> LinkId {
        let id = LinkId(self.next);
        self.next += 1;
        id
    }

    /// number of ids handed out so far
    pub fn count(&self) -> usize {
        self.next
    }
}

/// return the linear index of the element in a multi-dimensional grid
/// The element is represented as a vector of coordinates in `dims`.
fn linearize_index(elem: &[usize], dims: &[usize]) -> usize {
    let mut index: usize = 0;
    for (d, c) in elem.iter().enumerate() {
        index += c * dims[0..d].iter().product::<usize>();
    }
    index
}

fn router_mut(routers: &mut [Router], id: RouterId) -> Result<&mut Router, Error> {
    let count = routers.len();
    routers.get_mut(id.0).ok_or_else(|| {
        Error::OrderingInvariantViolation(format!(
            "router {} out of range ({} routers)",
            id, count
        ))
    })
}

/// record the link on the routers at both of its ends, and log it.
fn attach(routers: &mut [Router], link: &Link) -> Result<(), Error> {
    match link.kind {
        LinkKind::External { router, .. } => router_mut(routers, router)?.links.push(link.id),
        LinkKind::Internal { src, dst } => {
            router_mut(routers, src)?.links.push(link.id);
            router_mut(routers, dst)?.links.push(link.id);
        }
    }
    log::debug!("{}", link);
    Ok(())
}
