//! Count-dependent frame selection.
//!
//! Given a video's nominal frame count `N` (from its probe metadata) and the
//! number of frames actually extracted `A`, [`SelectionRules::plan`] decides
//! which frames survive and how they are grouped. Planning is pure: it only
//! computes an ordered list of numbered [`FrameGroup`]s. Applying a plan to a
//! folder on disk is the job of [`FrameSelector`](crate::FrameSelector).
//!
//! # Default table
//!
//! | `N`          | windows (0-based, half-open)                     |
//! |--------------|--------------------------------------------------|
//! | `A < 5` or `N <= 5` | discard the whole folder                  |
//! | `6..=9`      | `[1, 6)`                                         |
//! | `10..=19`    | `[0, A)`                                         |
//! | `20..=24`    | `[0, 20)`                                        |
//! | `25..=249`   | `[5, 25)`                                        |
//! | `250..=599`  | `[5, 26)`, `[A-26, A-5)`                         |
//! | `600..`      | `[5, 25)`, `[151, 171)`, `[297, 317)`, `[443, 463)`, `[589, 609)` |
//!
//! The two windows of the `250..=599` row are 21 frames wide each. That is
//! the observed behavior of the frame sets this tool has always produced,
//! so it is kept as is.
//!
//! # Example
//!
//! ```
//! use framesift::{SelectionPlan, SelectionRules};
//!
//! let plan = SelectionRules::default().plan(300, 300);
//! let SelectionPlan::Keep(groups) = plan else { panic!("expected groups") };
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[1].indices.first(), Some(&274));
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Range;

/// One window of frame indices, resolved against the available count `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameWindow {
    /// `[start, end)` with literal bounds, independent of `A`.
    Span {
        /// First index, inclusive.
        start: i64,
        /// Last index, exclusive.
        end: i64,
    },
    /// `[0, A)`: every available frame.
    All,
    /// `[A - start_back, A - end_back)`: a window anchored to the end.
    FromEnd {
        /// Distance of the inclusive start from `A`.
        start_back: i64,
        /// Distance of the exclusive end from `A`.
        end_back: i64,
    },
}

impl FrameWindow {
    /// Literal `[start, end)` window.
    pub const fn span(start: i64, end: i64) -> Self {
        FrameWindow::Span { start, end }
    }

    /// `len` frames starting at `start`.
    pub const fn starting_at(start: i64, len: i64) -> Self {
        FrameWindow::Span {
            start,
            end: start + len,
        }
    }

    /// Window anchored to the end of the available frames.
    pub const fn from_end(start_back: i64, end_back: i64) -> Self {
        FrameWindow::FromEnd {
            start_back,
            end_back,
        }
    }

    /// Resolve to a concrete index range for `available` frames.
    ///
    /// The result may extend outside `[0, available)`; see
    /// [`drop_out_of_range`].
    pub fn resolve(&self, available: usize) -> Range<i64> {
        let available = available as i64;
        match *self {
            FrameWindow::Span { start, end } => start..end,
            FrameWindow::All => 0..available,
            FrameWindow::FromEnd {
                start_back,
                end_back,
            } => (available - start_back)..(available - end_back),
        }
    }
}

impl Display for FrameWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            FrameWindow::Span { start, end } => write!(f, "[{start}, {end})"),
            FrameWindow::All => write!(f, "[0, A)"),
            FrameWindow::FromEnd {
                start_back,
                end_back,
            } => write!(f, "[A-{start_back}, A-{end_back})"),
        }
    }
}

/// Out-of-range policy: indices outside `[0, available)` are dropped
/// silently, never reported as errors. A window that falls partly or wholly
/// outside the available frames yields an under-filled (possibly empty)
/// group.
pub fn drop_out_of_range(range: Range<i64>, available: usize) -> Vec<usize> {
    let available = available as i64;
    range
        .filter(|&index| (0..available).contains(&index))
        .map(|index| index as usize)
        .collect()
}

/// A rule matching an inclusive band of nominal frame counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRule {
    /// Smallest nominal count this rule applies to.
    pub min: i64,
    /// Largest nominal count this rule applies to. `None` is unbounded.
    pub max: Option<i64>,
    /// Windows to keep, in subfolder order.
    pub windows: Vec<FrameWindow>,
}

impl SelectionRule {
    /// Rule for `min..=max`.
    pub fn between(min: i64, max: i64, windows: Vec<FrameWindow>) -> Self {
        Self {
            min,
            max: Some(max),
            windows,
        }
    }

    /// Rule for `min..`.
    pub fn at_least(min: i64, windows: Vec<FrameWindow>) -> Self {
        Self {
            min,
            max: None,
            windows,
        }
    }

    /// Whether `nominal` falls inside this rule's band.
    pub fn matches(&self, nominal: i64) -> bool {
        nominal >= self.min && self.max.is_none_or(|max| nominal <= max)
    }
}

impl Display for SelectionRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.max {
            Some(max) => write!(f, "{}..={max}:", self.min)?,
            None => write!(f, "{}..:", self.min)?,
        }
        for window in &self.windows {
            write!(f, " {window}")?;
        }
        Ok(())
    }
}

/// One numbered output group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGroup {
    /// 1-based subfolder number.
    pub number: usize,
    /// Indices into the sorted available frames, ascending.
    pub indices: Vec<usize>,
}

/// Why a folder is discarded outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Fewer frames were extracted than the minimum.
    TooFewAvailable {
        /// Frames found on disk.
        available: usize,
    },
    /// The source's nominal frame count is too small.
    NominalTooSmall {
        /// Nominal frame count from the metadata.
        nominal: i64,
    },
}

impl Display for DiscardReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match *self {
            DiscardReason::TooFewAvailable { available } => {
                write!(f, "only {available} frames available")
            }
            DiscardReason::NominalTooSmall { nominal } => {
                write!(f, "nominal frame count {nominal} is too small")
            }
        }
    }
}

/// Outcome of planning a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPlan {
    /// Remove the whole folder.
    Discard(DiscardReason),
    /// No rule covers the nominal count; leave the folder unsorted.
    Unmatched,
    /// Keep these groups; everything else at the top level is deleted.
    Keep(Vec<FrameGroup>),
}

impl SelectionPlan {
    /// Total number of frames kept by this plan.
    pub fn kept_frames(&self) -> usize {
        match self {
            SelectionPlan::Keep(groups) => groups.iter().map(|group| group.indices.len()).sum(),
            _ => 0,
        }
    }
}

/// The full selection policy: discard thresholds plus an ordered rule table.
///
/// The first rule whose band contains `N` wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRules {
    /// Folders with fewer available frames than this are discarded.
    pub min_available: usize,
    /// Folders whose nominal count is at or below this are discarded.
    pub max_discarded_nominal: i64,
    /// Rule bands, checked in order.
    pub rules: Vec<SelectionRule>,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            min_available: 5,
            max_discarded_nominal: 5,
            rules: vec![
                SelectionRule::between(6, 9, vec![FrameWindow::span(1, 6)]),
                SelectionRule::between(10, 19, vec![FrameWindow::All]),
                SelectionRule::between(20, 24, vec![FrameWindow::span(0, 20)]),
                SelectionRule::between(25, 249, vec![FrameWindow::span(5, 25)]),
                SelectionRule::between(
                    250,
                    599,
                    vec![FrameWindow::span(5, 26), FrameWindow::from_end(26, 5)],
                ),
                SelectionRule::at_least(
                    600,
                    [5, 151, 297, 443, 589]
                        .into_iter()
                        .map(|start| FrameWindow::starting_at(start, 20))
                        .collect(),
                ),
            ],
        }
    }
}

impl SelectionRules {
    /// Rules with the given thresholds and no bands.
    pub fn new(min_available: usize, max_discarded_nominal: i64) -> Self {
        Self {
            min_available,
            max_discarded_nominal,
            rules: Vec::new(),
        }
    }

    /// Append a band.
    #[must_use]
    pub fn with_rule(mut self, rule: SelectionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The first rule matching `nominal`, if any.
    pub fn rule_for(&self, nominal: i64) -> Option<&SelectionRule> {
        self.rules.iter().find(|rule| rule.matches(nominal))
    }

    /// Decide what to keep for a folder with nominal count `nominal` and
    /// `available` extracted frames. An index claimed by an earlier group
    /// is left out of later ones.
    pub fn plan(&self, nominal: i64, available: usize) -> SelectionPlan {
        if available < self.min_available {
            return SelectionPlan::Discard(DiscardReason::TooFewAvailable { available });
        }
        if nominal <= self.max_discarded_nominal {
            return SelectionPlan::Discard(DiscardReason::NominalTooSmall { nominal });
        }

        let Some(rule) = self.rule_for(nominal) else {
            return SelectionPlan::Unmatched;
        };

        // A frame moves into at most one group; overlapping windows on a
        // short extraction leave the later group under-filled.
        let mut claimed = HashSet::new();
        let groups = rule
            .windows
            .iter()
            .enumerate()
            .map(|(position, window)| FrameGroup {
                number: position + 1,
                indices: drop_out_of_range(window.resolve(available), available)
                    .into_iter()
                    .filter(|&index| claimed.insert(index))
                    .collect(),
            })
            .collect();

        SelectionPlan::Keep(groups)
    }
}

impl Display for SelectionRules {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(
            f,
            "discard: A < {} or N <= {}",
            self.min_available, self.max_discarded_nominal
        )?;
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameWindow, drop_out_of_range};

    #[test]
    fn from_end_resolves_against_available() {
        assert_eq!(FrameWindow::from_end(26, 5).resolve(300), 274..295);
        assert_eq!(FrameWindow::All.resolve(7), 0..7);
        assert_eq!(FrameWindow::starting_at(589, 20).resolve(0), 589..609);
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        assert_eq!(drop_out_of_range(-3..2, 10), vec![0, 1]);
        assert_eq!(drop_out_of_range(8..12, 10), vec![8, 9]);
        assert!(drop_out_of_range(20..25, 10).is_empty());
    }

    #[test]
    fn window_display() {
        assert_eq!(FrameWindow::span(5, 26).to_string(), "[5, 26)");
        assert_eq!(FrameWindow::from_end(26, 5).to_string(), "[A-26, A-5)");
    }
}
