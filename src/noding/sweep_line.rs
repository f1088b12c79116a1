//! Sweep-line driver for monotone chain intersection search.
//!
//! Building and querying are separate types: [`SweepLineBuilder`] collects
//! chains, and [`SweepLineBuilder::build`] sorts the events and pairs every
//! DELETE with its INSERT, producing an immutable
//! [`SimpleMcSweepLineIntersector`]. Adding chains later goes through
//! [`SimpleMcSweepLineIntersector::into_builder`], so a query can never see
//! stale pairing indices.

use std::cmp::Ordering;
use std::ops::Range;

use log::debug;

use crate::noding::monotone_chain::MonotoneChain;
use crate::noding::segment_intersector::SegmentIntersector;
use crate::noding::segment_string::SegmentString;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SweepLineEventKind {
    /// Start of a chain's x-extent. Chains with the same `Some` group are
    /// never compared; `None` is compared with everything.
    Insert {
        chain: MonotoneChain,
        group: Option<usize>,
        delete_index: usize,
    },
    /// End of a chain's x-extent.
    Delete { insert_index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepLineEvent {
    pub x: f64,
    pub kind: SweepLineEventKind,
    pair: usize,
}

impl SweepLineEvent {
    pub fn is_insert(&self) -> bool {
        matches!(self.kind, SweepLineEventKind::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.kind, SweepLineEventKind::Delete { .. })
    }

    fn rank(&self) -> u8 {
        match self.kind {
            SweepLineEventKind::Insert { .. } => 0,
            SweepLineEventKind::Delete { .. } => 1,
        }
    }

    fn same_group(&self, other: &SweepLineEvent) -> bool {
        match (self.kind, other.kind) {
            (
                SweepLineEventKind::Insert { group: Some(a), .. },
                SweepLineEventKind::Insert { group: Some(b), .. },
            ) => {
                a == b
            }
            _ => false,
        }
    }
}

/// Collects INSERT/DELETE events for chains before the sweep is built.
#[derive(Clone, Debug, Default)]
pub struct SweepLineBuilder {
    events: Vec<SweepLineEvent>,
    pairs: usize,
}

impl SweepLineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one event pair per monotone chain of `edges[edge]`.
    pub fn add_edge(&mut self, edges: &[SegmentString], edge: usize, group: Option<usize>) {
        let e = &edges[edge];
        let mce = e.monotone_chains();
        for chain in 0..mce.chain_count() {
            let min_x = mce.min_x(e.coords(), chain);
            let max_x = mce.max_x(e.coords(), chain);
            let pair = self.pairs;
            self.pairs += 1;
            self.events.push(SweepLineEvent {
                x: min_x,
                kind: SweepLineEventKind::Insert {
                    chain: MonotoneChain::new(edge, chain),
                    group,
                    delete_index: 0,
                },
                pair,
            });
            self.events.push(SweepLineEvent {
                x: max_x,
                kind: SweepLineEventKind::Delete { insert_index: 0 },
                pair,
            });
        }
    }

    /// Each edge in `range` becomes its own group, so chains of one edge are
    /// never compared with each other.
    pub fn add_self_group(&mut self, edges: &[SegmentString], range: Range<usize>) {
        for edge in range {
            self.add_edge(edges, edge, Some(edge));
        }
    }

    /// All edges in `range` share `group`.
    pub fn add_group(&mut self, edges: &[SegmentString], range: Range<usize>, group: usize) {
        for edge in range {
            self.add_edge(edges, edge, Some(group));
        }
    }

    /// Edges in `range` are compared with everything, including themselves.
    pub fn add_ungrouped(&mut self, edges: &[SegmentString], range: Range<usize>) {
        for edge in range {
            self.add_edge(edges, edge, None);
        }
    }

    /// Sorts by x (INSERT before DELETE on ties, otherwise stable) and
    /// links each event pair by position.
    pub fn build(self) -> SimpleMcSweepLineIntersector {
        let mut events = self.events;
        events.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.rank().cmp(&b.rank()))
        });

        let mut insert_pos = vec![0; self.pairs];
        let mut delete_pos = vec![0; self.pairs];
        for (i, ev) in events.iter().enumerate() {
            match ev.kind {
                SweepLineEventKind::Insert { .. } => insert_pos[ev.pair] = i,
                SweepLineEventKind::Delete { .. } => delete_pos[ev.pair] = i,
            }
        }
        for ev in events.iter_mut() {
            match &mut ev.kind {
                SweepLineEventKind::Insert { delete_index, .. } => {
                    *delete_index = delete_pos[ev.pair]
                }
                SweepLineEventKind::Delete { insert_index } => *insert_index = insert_pos[ev.pair],
            }
        }

        SimpleMcSweepLineIntersector {
            events,
            pairs: self.pairs,
        }
    }
}

/// Finds candidate intersecting segment pairs by only comparing chains
/// whose x-extents overlap.
#[derive(Clone, Debug)]
pub struct SimpleMcSweepLineIntersector {
    events: Vec<SweepLineEvent>,
    pairs: usize,
}

impl SimpleMcSweepLineIntersector {
    pub fn builder() -> SweepLineBuilder {
        SweepLineBuilder::new()
    }

    /// One set of edges. With `test_all_segments` every chain is compared
    /// with every other (self-intersections included); otherwise chains of
    /// the same edge are skipped.
    pub fn for_self_intersection(edges: &[SegmentString], test_all_segments: bool) -> Self {
        let mut builder = SweepLineBuilder::new();
        if test_all_segments {
            builder.add_ungrouped(edges, 0..edges.len());
        } else {
            builder.add_self_group(edges, 0..edges.len());
        }
        builder.build()
    }

    /// Two sets of edges stored in the same arena; only pairs from
    /// different sets are compared.
    pub fn for_cross_intersection(
        edges: &[SegmentString],
        set0: Range<usize>,
        set1: Range<usize>,
    ) -> Self {
        let mut builder = SweepLineBuilder::new();
        builder.add_group(edges, set0, 0);
        builder.add_group(edges, set1, 1);
        builder.build()
    }

    /// Reopens the event list to add more chains; the result has to be
    /// built again before it can be queried.
    pub fn into_builder(self) -> SweepLineBuilder {
        SweepLineBuilder {
            events: self.events,
            pairs: self.pairs,
        }
    }

    pub fn events(&self) -> &[SweepLineEvent] {
        &self.events
    }

    pub fn compute_intersections<SI: SegmentIntersector>(
        &self,
        edges: &mut [SegmentString],
        si: &mut SI,
    ) {
        let mut overlaps = 0usize;
        for (i, ev) in self.events.iter().enumerate() {
            if let SweepLineEventKind::Insert { delete_index, .. } = ev.kind {
                overlaps += self.process_overlaps(i, delete_index, ev, edges, si);
                if si.is_done() {
                    break;
                }
            }
        }
        debug!("sweep line: {} events, {overlaps} chain overlaps", self.events.len());
    }

    fn process_overlaps<SI: SegmentIntersector>(
        &self,
        start: usize,
        end: usize,
        ev0: &SweepLineEvent,
        edges: &mut [SegmentString],
        si: &mut SI,
    ) -> usize {
        let SweepLineEventKind::Insert { chain: mc0, .. } = ev0.kind else {
            return 0;
        };
        let mut overlaps = 0;
        for ev1 in &self.events[start..end] {
            if let SweepLineEventKind::Insert { chain: mc1, .. } = ev1.kind {
                if !ev0.same_group(ev1) {
                    mc0.compute_intersections(&mc1, edges, si);
                    overlaps += 1;
                    if si.is_done() {
                        break;
                    }
                }
            }
        }
        overlaps
    }
}
