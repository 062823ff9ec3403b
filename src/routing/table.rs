//! Ordered route table and change detection.

use std::collections::HashMap;
use std::ops::Deref;

use serde::Serialize;

use crate::routing::route::Route;

/// Ordered sequence of routes with unique hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// A route that lost to a later container carrying the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedDuplicate {
    pub kept: Route,
    pub dropped: Route,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from candidates in discovery order.
    ///
    /// Duplicate hosts are resolved last-discovered-wins: the surviving entry
    /// keeps the position of the host's first appearance and the upstream of
    /// its last appearance.
    pub fn from_candidates(
        candidates: impl IntoIterator<Item = Route>,
    ) -> (Self, Vec<DroppedDuplicate>) {
        let mut routes: Vec<Route> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut dropped = Vec::new();

        for route in candidates {
            match index.get(route.host()) {
                Some(&position) => {
                    let previous = std::mem::replace(&mut routes[position], route.clone());
                    if previous != route {
                        dropped.push(DroppedDuplicate {
                            kept: route,
                            dropped: previous,
                        });
                    }
                }
                None => {
                    index.insert(route.host().to_string(), routes.len());
                    routes.push(route);
                }
            }
        }

        (Self { routes }, dropped)
    }

    /// Hosts in table order.
    pub fn hosts(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.host().to_string()).collect()
    }

    /// Keep only routes accepted by the predicate, preserving order.
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Route) -> bool,
    {
        Self {
            routes: self.routes.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl Deref for RouteTable {
    type Target = [Route];

    fn deref(&self) -> &Self::Target {
        &self.routes
    }
}

/// Returns true when `new` differs from `old` in length, order or content.
///
/// Coarse on purpose: any difference regenerates the whole configuration.
pub fn diff(old: &RouteTable, new: &RouteTable) -> bool {
    old.len() != new.len() || old.iter().zip(new.iter()).any(|(a, b)| a != b)
}
