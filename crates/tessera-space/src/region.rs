//! Run-length encoded coordinate sets.
//!
//! A [`Region`] stores its cells as [`Streak`]s, split across one index
//! level per axis:
//!
//! ```text
//! level D-1: (z, offset) (z, offset) ...      offsets into level D-2
//!   ...
//! level 1:   (y, offset) (y, offset) ...      offsets into level 0
//! level 0:   [x0, x1) [x2, x3) ...            the runs themselves
//! ```
//!
//! Each entry on level `d > 0` owns the contiguous slice of level `d - 1`
//! that starts at its offset and ends at the next entry's offset (or at
//! the end of level `d - 1` for the last entry). Runs sharing a parent
//! are sorted, never overlap, and never touch: inserting a run that
//! touches a neighbor fuses the two.

use std::fmt;
use std::ops::{Add, Sub};

use tessera_core::Coord;

use crate::coord_box::CoordBox;
use crate::streak::Streak;

/// A half-open run `[start, end)` on level 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Run {
    start: i32,
    end: i32,
}

impl Run {
    fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// An entry on level `d > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct IndexEntry {
    coord: i32,
    /// First child on level `d - 1`.
    offset: usize,
}

/// A set of `D`-dimensional grid coordinates.
///
/// Mutated only through whole-streak [`insert`](Region::insert) and
/// [`remove`](Region::remove). Both are total: degenerate streaks,
/// removals from an empty region, and removals of absent coordinates
/// are silent no-ops. The representation is canonical, so two regions
/// compare equal exactly when they hold the same cells.
///
/// # Examples
///
/// ```
/// use tessera_core::Coord;
/// use tessera_space::{Region, Streak};
///
/// let mut region = Region::<2>::new();
/// region.insert(Streak::new(Coord([0, 0]), 5));
/// region.insert(Streak::new(Coord([5, 0]), 10));
/// assert_eq!(region.size(), 1); // touching runs fuse
///
/// region.remove(Streak::new(Coord([3, 0]), 6));
/// let streaks: Vec<_> = region.iter().collect();
/// assert_eq!(
///     streaks,
///     vec![Streak::new(Coord([0, 0]), 3), Streak::new(Coord([6, 0]), 10)]
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Region<const D: usize> {
    runs: Vec<Run>,
    /// `indices[d - 1]` is the index level of axis `d`.
    indices: Vec<Vec<IndexEntry>>,
}

impl<const D: usize> Region<D> {
    const AT_LEAST_ONE_AXIS: () = assert!(D > 0, "a region needs at least one axis");

    /// Create an empty region.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::AT_LEAST_ONE_AXIS;
        Self {
            runs: Vec::new(),
            indices: vec![Vec::new(); D - 1],
        }
    }

    /// Number of streaks (not cells) in the region.
    pub fn size(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if the region holds no cells.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of cells in the region.
    pub fn cell_count(&self) -> u64 {
        self.runs
            .iter()
            .map(|r| (i64::from(r.end) - i64::from(r.start)) as u64)
            .sum()
    }

    /// Add every cell of `streak`, fusing with runs it touches or overlaps.
    pub fn insert(&mut self, streak: Streak<D>) {
        if streak.is_empty() {
            return;
        }
        let top = D - 1;
        let end = self.level_len(top);
        self.insert_at(top, &streak, 0, end);
    }

    /// Remove exactly the cells covered by `streak`.
    ///
    /// A run only partially covered keeps its uncovered head and tail.
    pub fn remove(&mut self, streak: Streak<D>) {
        if streak.is_empty() || self.is_empty() {
            return;
        }
        let top = D - 1;
        let end = self.level_len(top);
        self.remove_at(top, &streak, 0, end);
    }

    /// Add every cell of `bbox`.
    pub fn insert_box(&mut self, bbox: &CoordBox<D>) {
        for streak in bbox.streaks() {
            self.insert(streak);
        }
    }

    /// Returns `true` if `coord` is in the region.
    pub fn contains(&self, coord: &Coord<D>) -> bool {
        let mut start = 0;
        let mut end = self.level_len(D - 1);
        for dim in (1..D).rev() {
            let level = &self.indices[dim - 1];
            let c = coord[dim];
            let pos = start + level[start..end].partition_point(|e| e.coord <= c);
            if pos == start || level[pos - 1].coord != c {
                return false;
            }
            start = level[pos - 1].offset;
            end = self.child_end(dim, pos);
        }
        let runs = &self.runs[start..end];
        let pos = runs.partition_point(|r| r.start <= coord.x());
        pos > 0 && coord.x() < runs[pos - 1].end
    }

    /// Smallest box containing every cell. Empty regions yield an empty
    /// box at the origin.
    ///
    /// Extents wider than `i32::MAX` are clamped to it.
    pub fn bounding_box(&self) -> CoordBox<D> {
        if self.is_empty() {
            return CoordBox::default();
        }
        let mut min = Coord::origin();
        let mut extent = Coord::origin();
        let start = self.runs.iter().map(|r| r.start).min().unwrap_or(0);
        let end = self.runs.iter().map(|r| r.end).max().unwrap_or(0);
        min[0] = start;
        extent[0] = clamp_extent(i64::from(end) - i64::from(start));
        for d in 1..D {
            let level = &self.indices[d - 1];
            let lo = level.iter().map(|e| e.coord).min().unwrap_or(0);
            let hi = level.iter().map(|e| i64::from(e.coord) + 1).max().unwrap_or(0);
            min[d] = lo;
            extent[d] = clamp_extent(hi - i64::from(lo));
        }
        CoordBox::new(min, extent)
    }

    /// Iterate over the streaks in order of `(coord[D-1], ..., coord[1], x)`.
    pub fn iter(&self) -> StreakIter<'_, D> {
        StreakIter {
            region: self,
            positions: [0; D],
        }
    }

    /// Iterate over every cell, in streak order.
    pub fn coords(&self) -> impl Iterator<Item = Coord<D>> + '_ {
        self.iter()
            .flat_map(|s| (s.origin.x()..s.end_x).map(move |x| s.origin.with(0, x)))
    }

    /// Cells in `self` or `other`.
    pub fn union(&self, other: &Region<D>) -> Region<D> {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }

    /// Cells in `self` but not in `other`.
    pub fn difference(&self, other: &Region<D>) -> Region<D> {
        let mut out = self.clone();
        for streak in other.iter() {
            out.remove(streak);
        }
        out
    }

    /// Cells in both `self` and `other`.
    pub fn intersection(&self, other: &Region<D>) -> Region<D> {
        self.difference(&self.difference(other))
    }

    // ── index helpers ───────────────────────────────────────────────

    fn level_len(&self, dim: usize) -> usize {
        if dim == 0 {
            self.runs.len()
        } else {
            self.indices[dim - 1].len()
        }
    }

    /// End of the child range of the entry *before* `pos` on level `dim`:
    /// the offset of the entry at `pos`, or the end of the child level.
    fn child_end(&self, dim: usize, pos: usize) -> usize {
        self.indices[dim - 1]
            .get(pos)
            .map_or_else(|| self.level_len(dim - 1), |e| e.offset)
    }

    /// Shift the offsets of every entry on level `dim` from `from` onward
    /// by `delta`, restoring the partition after the child level changed
    /// size.
    fn inc_remainder(&mut self, dim: usize, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for entry in &mut self.indices[dim - 1][from..] {
            entry.offset = (entry.offset as isize + delta) as usize;
        }
    }

    // ── insertion ───────────────────────────────────────────────────

    /// Insert into the entries `[start, end)` of level `dim`. Returns the
    /// net number of entries added to level `dim`.
    fn insert_at(&mut self, dim: usize, streak: &Streak<D>, start: usize, end: usize) -> isize {
        if dim == 0 {
            let run = Run {
                start: streak.origin.x(),
                end: streak.end_x,
            };
            return self.insert_run(run, start, end);
        }

        let c = streak.origin[dim];
        let level = &self.indices[dim - 1];
        let pos = start + level[start..end].partition_point(|e| e.coord <= c);

        if pos > start && level[pos - 1].coord == c {
            let child_start = level[pos - 1].offset;
            let child_end = self.child_end(dim, pos);
            let delta = self.insert_at(dim - 1, streak, child_start, child_end);
            self.inc_remainder(dim, pos, delta);
            return 0;
        }

        let child_start = self.child_end(dim, pos);
        self.indices[dim - 1].insert(
            pos,
            IndexEntry {
                coord: c,
                offset: child_start,
            },
        );
        let delta = self.insert_at(dim - 1, streak, child_start, child_start);
        self.inc_remainder(dim, pos + 1, delta);
        1
    }

    /// Insert `run` among the runs `[start, end)`, fusing every run it
    /// touches or overlaps.
    fn insert_run(&mut self, mut run: Run, start: usize, end: usize) -> isize {
        let runs = &mut self.runs;
        let mut first = start + runs[start..end].partition_point(|r| r.start <= run.start);
        if first > start && runs[first - 1].end >= run.start {
            first -= 1;
        }

        let mut last = first;
        while last < end && runs[last].start <= run.end {
            run.start = run.start.min(runs[last].start);
            run.end = run.end.max(runs[last].end);
            last += 1;
        }

        runs.splice(first..last, std::iter::once(run));
        1 - (last - first) as isize
    }

    // ── removal ─────────────────────────────────────────────────────

    /// Remove from the entries `[start, end)` of level `dim`. Returns the
    /// net number of entries added to level `dim` (zero or negative on
    /// index levels, up to +1 on level 0 when a run splits).
    fn remove_at(&mut self, dim: usize, streak: &Streak<D>, start: usize, end: usize) -> isize {
        if dim == 0 {
            let cut = Run {
                start: streak.origin.x(),
                end: streak.end_x,
            };
            return self.remove_run(cut, start, end);
        }

        let c = streak.origin[dim];
        let level = &self.indices[dim - 1];
        let pos = start + level[start..end].partition_point(|e| e.coord <= c);
        if pos == start || level[pos - 1].coord != c {
            return 0;
        }

        let entry = pos - 1;
        let child_start = level[entry].offset;
        let child_end = self.child_end(dim, pos);
        let delta = self.remove_at(dim - 1, streak, child_start, child_end);

        if (child_end - child_start) as isize + delta == 0 {
            self.indices[dim - 1].remove(entry);
            self.inc_remainder(dim, entry, delta);
            -1
        } else {
            self.inc_remainder(dim, pos, delta);
            0
        }
    }

    /// Cut `cut` out of the runs `[start, end)`. Only runs sharing at
    /// least one cell with `cut` are touched.
    fn remove_run(&mut self, cut: Run, start: usize, end: usize) -> isize {
        let runs = &mut self.runs;
        let mut first = start + runs[start..end].partition_point(|r| r.start <= cut.start);
        if first > start && runs[first - 1].end > cut.start {
            first -= 1;
        }

        let mut last = first;
        while last < end && runs[last].start < cut.end {
            last += 1;
        }
        if first == last {
            return 0;
        }

        let head = Run {
            start: runs[first].start,
            end: cut.start,
        };
        let tail = Run {
            start: cut.end,
            end: runs[last - 1].end,
        };
        let kept = usize::from(!head.is_empty()) + usize::from(!tail.is_empty());
        runs.splice(
            first..last,
            [head, tail].into_iter().filter(|r| !r.is_empty()),
        );
        kept as isize - (last - first) as isize
    }
}

impl<const D: usize> Default for Region<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> fmt::Debug for Region<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("streaks", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<const D: usize> From<CoordBox<D>> for Region<D> {
    fn from(bbox: CoordBox<D>) -> Self {
        let mut region = Self::new();
        region.insert_box(&bbox);
        region
    }
}

fn clamp_extent(width: i64) -> i32 {
    i32::try_from(width).unwrap_or(i32::MAX)
}

impl<const D: usize> FromIterator<Streak<D>> for Region<D> {
    fn from_iter<I: IntoIterator<Item = Streak<D>>>(iter: I) -> Self {
        let mut region = Self::new();
        region.extend(iter);
        region
    }
}

impl<const D: usize> Extend<Streak<D>> for Region<D> {
    fn extend<I: IntoIterator<Item = Streak<D>>>(&mut self, iter: I) {
        for streak in iter {
            self.insert(streak);
        }
    }
}

impl<'a, const D: usize> IntoIterator for &'a Region<D> {
    type Item = Streak<D>;
    type IntoIter = StreakIter<'a, D>;

    fn into_iter(self) -> StreakIter<'a, D> {
        self.iter()
    }
}

impl<const D: usize> Add<&Region<D>> for &Region<D> {
    type Output = Region<D>;

    fn add(self, rhs: &Region<D>) -> Region<D> {
        self.union(rhs)
    }
}

impl<const D: usize> Sub<&Region<D>> for &Region<D> {
    type Output = Region<D>;

    fn sub(self, rhs: &Region<D>) -> Region<D> {
        self.difference(rhs)
    }
}

// ── StreakIter ──────────────────────────────────────────────────────

/// Forward iterator over the streaks of a [`Region`].
///
/// Holds one position per index level. Advancing past the last run of a
/// parent moves the parent on as well, cascading upward. Call
/// [`Region::iter`] again to restart.
#[derive(Clone, Debug)]
pub struct StreakIter<'a, const D: usize> {
    region: &'a Region<D>,
    positions: [usize; D],
}

impl<const D: usize> StreakIter<'_, D> {
    fn advance(&mut self) {
        let region = self.region;
        self.positions[0] += 1;
        if self.positions[0] == region.runs.len() {
            for d in 1..D {
                self.positions[d] = region.level_len(d);
            }
            return;
        }

        for d in 1..D {
            let parent_end = region.child_end(d, self.positions[d] + 1);
            if self.positions[d - 1] != parent_end {
                return;
            }
            self.positions[d] += 1;
        }
    }
}

impl<const D: usize> Iterator for StreakIter<'_, D> {
    type Item = Streak<D>;

    fn next(&mut self) -> Option<Streak<D>> {
        let region = self.region;
        let run = *region.runs.get(self.positions[0])?;

        let mut origin = Coord::origin();
        origin[0] = run.start;
        for d in 1..D {
            origin[d] = region.indices[d - 1][self.positions[d]].coord;
        }

        self.advance();
        Some(Streak::new(origin, run.end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.region.runs.len().saturating_sub(self.positions[0]);
        (remaining, Some(remaining))
    }
}

impl<const D: usize> ExactSizeIterator for StreakIter<'_, D> {}

impl<const D: usize> PartialEq for StreakIter<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.region, other.region)
            && (0..D)
                .rev()
                .all(|d| self.positions[d] == other.positions[d])
    }
}

#[cfg(test)]
impl<const D: usize> Region<D> {
    /// Panic unless every structural invariant holds.
    fn assert_invariants(&self) {
        assert_eq!(self.indices.len(), D - 1);
        for d in 1..D {
            let level = &self.indices[d - 1];
            assert_eq!(
                level.is_empty(),
                self.runs.is_empty(),
                "level {d} emptiness disagrees with level 0"
            );
            if let Some(first) = level.first() {
                assert_eq!(first.offset, 0, "level {d} does not start at offset 0");
            }
        }
        let top = D - 1;
        self.assert_range(top, 0, self.level_len(top));
    }

    fn assert_range(&self, dim: usize, start: usize, end: usize) {
        if dim == 0 {
            for run in &self.runs[start..end] {
                assert!(!run.is_empty(), "empty run {run:?}");
            }
            for pair in self.runs[start..end].windows(2) {
                assert!(
                    pair[0].end < pair[1].start,
                    "runs {:?} and {:?} touch or overlap",
                    pair[0],
                    pair[1]
                );
            }
            return;
        }

        let level = &self.indices[dim - 1];
        for pair in level[start..end].windows(2) {
            assert!(pair[0].coord < pair[1].coord, "level {dim} unsorted");
        }
        for i in start..end {
            let child_start = level[i].offset;
            let child_end = self.child_end(dim, i + 1);
            assert!(
                child_start < child_end,
                "level {dim} entry {i} owns no children"
            );
            if i > start {
                assert_eq!(child_start, self.child_end(dim, i));
            }
            self.assert_range(dim - 1, child_start, child_end);
        }
    }
}
