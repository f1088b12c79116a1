use std::cmp::Ordering;

use geo_types::{Coord, LineString};
use log::trace;

use crate::algorithm::SegmentIntersection;
use crate::error::Result;
use crate::noding::monotone_chain::MonotoneChainEdge;
use crate::utils::validate_coords;

/// A node inserted into a [`SegmentString`] during noding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentNode {
    pub coord: Coord<f64>,
    /// Index of the segment containing the node. A node lying exactly on a
    /// vertex is stored against the segment starting at that vertex.
    pub segment_index: usize,
    /// `false` when the node coincides with the start vertex of its segment.
    pub is_interior: bool,
}

/// One input ring or line to be noded.
///
/// Owns its coordinates and derived monotone chains. Noding only ever
/// appends nodes; the coordinate sequence itself is never modified.
#[derive(Clone, Debug)]
pub struct SegmentString {
    coords: Vec<Coord<f64>>,
    chains: MonotoneChainEdge,
    nodes: Vec<SegmentNode>,
    isolated: bool,
    data: Option<usize>,
}

impl SegmentString {
    /// Validates the coordinates and builds the monotone chain partition.
    pub fn new(coords: Vec<Coord<f64>>) -> Result<Self> {
        validate_coords(&coords)?;
        let chains = MonotoneChainEdge::new(&coords);
        Ok(Self {
            coords,
            chains,
            nodes: Vec::new(),
            isolated: true,
            data: None,
        })
    }

    /// Attaches a caller-defined tag which noded substrings inherit.
    pub fn with_data(mut self, data: usize) -> Self {
        self.data = Some(data);
        self
    }

    pub fn from_line_string(line: &LineString<f64>) -> Result<Self> {
        Self::new(line.0.clone())
    }

    pub fn data(&self) -> Option<usize> {
        self.data
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn coord(&self, i: usize) -> Coord<f64> {
        self.coords[i]
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.coords.len() - 1
    }

    pub fn segment(&self, i: usize) -> (Coord<f64>, Coord<f64>) {
        (self.coords[i], self.coords[i + 1])
    }

    pub fn is_closed(&self) -> bool {
        self.coords.first() == self.coords.last()
    }

    pub fn monotone_chains(&self) -> &MonotoneChainEdge {
        &self.chains
    }

    /// `true` until an intersection with any segment touches this string.
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    pub fn set_isolated(&mut self, isolated: bool) {
        self.isolated = isolated;
    }

    pub fn nodes(&self) -> &[SegmentNode] {
        &self.nodes
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.coords.clone())
    }

    /// Adds every intersection point of `li` as a node, reading the
    /// segment of the given input (`0` or `1`).
    pub fn add_intersections(&mut self, li: &SegmentIntersection, segment_index: usize) {
        for &pt in li.points() {
            self.add_intersection(pt, segment_index);
        }
    }

    /// Adds a node at `pt`, which must lie on segment `segment_index`.
    pub fn add_intersection(&mut self, pt: Coord<f64>, segment_index: usize) {
        let mut normalized = segment_index;
        let next = segment_index + 1;
        if next < self.coords.len() && pt == self.coords[next] {
            normalized = next;
        }
        self.push_node(pt, normalized);
    }

    fn push_node(&mut self, coord: Coord<f64>, segment_index: usize) {
        let is_interior = coord != self.coords[segment_index];
        trace!("node ({}, {}) on segment {segment_index}", coord.x, coord.y);
        self.nodes.push(SegmentNode {
            coord,
            segment_index,
            is_interior,
        });
    }

    /// Splits this string at its nodes (and endpoints).
    pub fn noded_substrings(&self) -> Vec<SegmentString> {
        let nodes = self.sorted_nodes();
        let mut out = Vec::with_capacity(nodes.len().saturating_sub(1));
        for w in nodes.windows(2) {
            if let Some(split) = self.split_between(&w[0], &w[1]) {
                out.push(split);
            }
        }
        out
    }

    /// Node list with both endpoints and collapse nodes added, ordered
    /// along the string and free of duplicates.
    fn sorted_nodes(&self) -> Vec<SegmentNode> {
        let last = self.coords.len() - 1;
        let mut nodes = Vec::with_capacity(self.nodes.len() + 2);
        nodes.push(SegmentNode {
            coord: self.coords[0],
            segment_index: 0,
            is_interior: false,
        });
        nodes.push(SegmentNode {
            coord: self.coords[last],
            segment_index: last,
            is_interior: false,
        });
        nodes.extend_from_slice(&self.nodes);
        self.sort_dedup(&mut nodes);

        let collapses = self.collapsed_vertices(&nodes);
        if !collapses.is_empty() {
            for index in collapses {
                nodes.push(SegmentNode {
                    coord: self.coords[index],
                    segment_index: index,
                    is_interior: false,
                });
            }
            self.sort_dedup(&mut nodes);
        }
        nodes
    }

    fn sort_dedup(&self, nodes: &mut Vec<SegmentNode>) {
        let coords = &self.coords;
        let along = |n: &SegmentNode| {
            let start = coords[n.segment_index];
            (n.coord.x - start.x).powi(2) + (n.coord.y - start.y).powi(2)
        };
        nodes.sort_by(|a, b| {
            a.segment_index
                .cmp(&b.segment_index)
                .then_with(|| along(a).partial_cmp(&along(b)).unwrap_or(Ordering::Equal))
        });
        nodes.dedup_by(|a, b| a.segment_index == b.segment_index && a.coord == b.coord);
    }

    /// Vertices at the tip of an `a, b, a` fold, either among the original
    /// vertices or formed by two equal nodes one vertex apart.
    fn collapsed_vertices(&self, nodes: &[SegmentNode]) -> Vec<usize> {
        let mut collapsed = Vec::new();
        for i in 0..self.coords.len().saturating_sub(2) {
            if self.coords[i] == self.coords[i + 2] {
                collapsed.push(i + 1);
            }
        }
        for w in nodes.windows(2) {
            let (n0, n1) = (&w[0], &w[1]);
            if n0.coord != n1.coord {
                continue;
            }
            let mut between = n1.segment_index - n0.segment_index;
            if !n1.is_interior {
                between = between.saturating_sub(1);
            }
            if between == 1 {
                collapsed.push(n0.segment_index + 1);
            }
        }
        collapsed
    }

    fn split_between(&self, n0: &SegmentNode, n1: &SegmentNode) -> Option<SegmentString> {
        let last_seg_start = self.coords[n1.segment_index];
        let use_end_node = n1.is_interior || n1.coord != last_seg_start;

        let mut pts = Vec::with_capacity(n1.segment_index - n0.segment_index + 2);
        pts.push(n0.coord);
        for i in (n0.segment_index + 1)..=n1.segment_index {
            pts.push(self.coords[i]);
        }
        if use_end_node {
            pts.push(n1.coord);
        }
        pts.dedup();
        if pts.len() < 2 {
            return None;
        }

        let chains = MonotoneChainEdge::new(&pts);
        Some(SegmentString {
            coords: pts,
            chains,
            nodes: Vec::new(),
            isolated: self.isolated,
            data: self.data,
        })
    }

    /// Maps every vertex through `f` and drops the repeated points this can
    /// produce. Returns `None` if fewer than two distinct points survive.
    /// Nodes are discarded; the tag and isolation flag are kept.
    pub(crate) fn map_coords<F>(&self, f: F) -> Option<SegmentString>
    where
        F: Fn(Coord<f64>) -> Coord<f64>,
    {
        let mut pts: Vec<Coord<f64>> = self.coords.iter().map(|&c| f(c)).collect();
        pts.dedup();
        if pts.len() < 2 {
            return None;
        }
        let mut mapped = Self::from_valid(pts, self.data);
        mapped.isolated = self.isolated;
        Some(mapped)
    }

    /// Builds a string from coordinates that are already known to be valid.
    pub(crate) fn from_valid(coords: Vec<Coord<f64>>, data: Option<usize>) -> Self {
        let chains = MonotoneChainEdge::new(&coords);
        Self {
            coords,
            chains,
            nodes: Vec::new(),
            isolated: true,
            data,
        }
    }
}

/// Collects the noded substrings of every string, in input order.
pub fn noded_substrings(strings: &[SegmentString]) -> Vec<SegmentString> {
    strings.iter().flat_map(SegmentString::noded_substrings).collect()
}
