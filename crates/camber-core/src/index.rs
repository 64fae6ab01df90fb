//! Bidirectional statement ↔ segment mapping.
//!
//! Every feature downstream of parsing (highlight sync, resume-from-click,
//! simulation) depends on this mapping staying exact, so it is built in the
//! same pass that emits segments and checked by [`ProgramIndex::is_consistent`].

/// Two total, consistent mappings between statement indices and segment
/// indices.
///
/// `statement_to_segments` has one (possibly empty) entry per statement;
/// `segment_to_statement` is total over segments. Invariant: for every
/// segment index `s`, `s` appears in the segment list of its owning
/// statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramIndex {
    statement_to_segments: Vec<Vec<usize>>,
    segment_to_statement: Vec<usize>,
}

impl ProgramIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the next statement slot (initially with no segments).
    ///
    /// Must be called once per statement, in statement order, before any
    /// segment of that statement is linked.
    pub fn push_statement(&mut self) -> usize {
        let index = self.statement_to_segments.len();
        self.statement_to_segments.push(Vec::new());
        index
    }

    /// Links the next segment index to `statement_index`.
    ///
    /// Segments must be linked in segment order; the returned value is the
    /// segment index that was assigned.
    pub fn link_segment(&mut self, statement_index: usize) -> usize {
        debug_assert!(statement_index < self.statement_to_segments.len());
        let segment_index = self.segment_to_statement.len();
        self.segment_to_statement.push(statement_index);
        self.statement_to_segments[statement_index].push(segment_index);
        segment_index
    }

    /// Number of statement slots.
    pub fn statement_count(&self) -> usize {
        self.statement_to_segments.len()
    }

    /// Number of linked segments.
    pub fn segment_count(&self) -> usize {
        self.segment_to_statement.len()
    }

    /// Segment indices belonging to a statement (empty for non-motion lines).
    pub fn segments_of(&self, statement_index: usize) -> &[usize] {
        self.statement_to_segments
            .get(statement_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The statement a segment traces back to.
    pub fn statement_of(&self, segment_index: usize) -> Option<usize> {
        self.segment_to_statement.get(segment_index).copied()
    }

    /// Verifies the bidirectional invariant in both directions.
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self
            .segment_to_statement
            .iter()
            .enumerate()
            .all(|(seg, &stmt)| self.segments_of(stmt).contains(&seg));
        let backward_ok = self
            .statement_to_segments
            .iter()
            .enumerate()
            .all(|(stmt, segs)| {
                segs.iter()
                    .all(|&seg| self.statement_of(seg) == Some(stmt))
            });
        forward_ok && backward_ok
    }
}
