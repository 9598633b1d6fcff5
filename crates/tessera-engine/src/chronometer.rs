//! Per-node time accounting.

use std::fmt;
use std::time::{Duration, Instant};

/// What a slice of wall-clock time was spent on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeKind {
    /// Running the cell kernel.
    Compute,
    /// Waiting for ghost rows.
    Ghost,
    /// Rebalancing and migrating rows.
    Balance,
    /// Writers and steerers.
    Io,
}

impl TimeKind {
    /// Every kind, in display order.
    pub const ALL: [TimeKind; 4] = [Self::Compute, Self::Ghost, Self::Balance, Self::Io];

    fn index(self) -> usize {
        match self {
            Self::Compute => 0,
            Self::Ghost => 1,
            Self::Balance => 2,
            Self::Io => 3,
        }
    }
}

/// Accumulated durations per [`TimeKind`].
///
/// The load a node reports when rebalancing is its
/// [`ratio`](Chronometer::ratio) of compute time since the last reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chronometer {
    totals: [Duration; 4],
}

impl Chronometer {
    /// A chronometer with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elapsed` to `kind`.
    pub fn add(&mut self, kind: TimeKind, elapsed: Duration) {
        self.totals[kind.index()] += elapsed;
    }

    /// Run `f`, charging its duration to `kind`.
    pub fn time<R>(&mut self, kind: TimeKind, f: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        let out = f();
        self.add(kind, started.elapsed());
        out
    }

    /// Time recorded for `kind`.
    pub fn get(&self, kind: TimeKind) -> Duration {
        self.totals[kind.index()]
    }

    /// Time recorded across all kinds.
    pub fn total(&self) -> Duration {
        self.totals.iter().sum()
    }

    /// Share of the total spent on `kind`, in `[0, 1]`. Zero when nothing
    /// has been recorded.
    pub fn ratio(&self, kind: TimeKind) -> f64 {
        let total = self.total().as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        self.get(kind).as_secs_f64() / total
    }

    /// Forget everything recorded.
    pub fn reset(&mut self) {
        self.totals = [Duration::ZERO; 4];
    }
}

impl fmt::Display for Chronometer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in TimeKind::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind:?}: {:.3}ms", self.get(*kind).as_secs_f64() * 1e3)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chronometer_has_zero_ratio() {
        let c = Chronometer::new();
        assert_eq!(c.ratio(TimeKind::Compute), 0.0);
        assert_eq!(c.total(), Duration::ZERO);
    }

    #[test]
    fn ratio_is_share_of_total() {
        let mut c = Chronometer::new();
        c.add(TimeKind::Compute, Duration::from_millis(30));
        c.add(TimeKind::Ghost, Duration::from_millis(10));
        assert!((c.ratio(TimeKind::Compute) - 0.75).abs() < 1e-12);
        assert!((c.ratio(TimeKind::Ghost) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn add_accumulates_until_reset() {
        let mut a = Chronometer::new();
        a.add(TimeKind::Io, Duration::from_millis(5));
        a.add(TimeKind::Io, Duration::from_millis(7));
        assert_eq!(a.get(TimeKind::Io), Duration::from_millis(12));
        a.reset();
        assert_eq!(a, Chronometer::new());
    }

    #[test]
    fn time_returns_closure_result() {
        let mut c = Chronometer::new();
        let v = c.time(TimeKind::Compute, || 41 + 1);
        assert_eq!(v, 42);
    }

    #[test]
    fn display_lists_every_kind() {
        let s = Chronometer::new().to_string();
        assert!(s.starts_with("Compute: 0.000ms"));
        assert!(s.contains("Io"));
    }
}
