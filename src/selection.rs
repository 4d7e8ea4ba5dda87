//! The selection store: canonical chosen ranges plus the view state.

use crate::consts::DEFAULT_SPAN;
use crate::parse::{parse_multi, parse_single};
use crate::range::{DateRange, collapse};
use crate::view::VisibleWindow;
use crate::{Day, today};

/// Raw attribute values a picker is constructed from.
///
/// `view`, `chosen` and `span` carry attribute text verbatim; anything
/// unparseable is sanitized away during construction rather than reported,
/// the way a widget must treat markup it does not control.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionConfig<'a> {
    pub view: Option<&'a str>,
    pub chosen: Option<&'a str>,
    pub span: Option<&'a str>,
    pub multiple: bool,
}

/// Canonical selection state for one picker instance.
///
/// The store exclusively owns the chosen set and the view state. Every
/// mutation rebuilds the chosen list, installs it before returning, and
/// hands back the new snapshot; repainting is entirely the caller's
/// decision. Between any two calls the chosen set is sorted, pairwise
/// disjoint and non-adjacent, and holds at most one single-day entry when
/// multi-select is off.
#[derive(Debug, Clone)]
pub struct Selection {
    chosen: Vec<DateRange>,
    view: Day,
    span: u32,
    multiple: bool,
    no_toggle: bool,
}

impl Selection {
    pub fn new(config: SelectionConfig<'_>) -> Self {
        let raw_ranges = config
            .chosen
            .map(parse_multi)
            .and_then(Result::ok)
            .unwrap_or_default();
        let view = sanitize_view(config.view, &raw_ranges);
        let span = config.span.map_or(DEFAULT_SPAN, parse_span);

        let mut selection = Self {
            chosen: Vec::new(),
            view,
            span,
            multiple: config.multiple,
            no_toggle: false,
        };
        selection.chosen = selection.sanitized(raw_ranges);
        selection
    }

    /// The canonical chosen set.
    pub fn chosen(&self) -> &[DateRange] {
        &self.chosen
    }

    /// The day anchoring the visible window.
    pub const fn view(&self) -> Day {
        self.view
    }

    /// Number of months shown at once.
    pub const fn span(&self) -> u32 {
        self.span
    }

    pub const fn multiple(&self) -> bool {
        self.multiple
    }

    pub const fn no_toggle(&self) -> bool {
        self.no_toggle
    }

    /// Replaces the chosen set from attribute text.
    ///
    /// The text goes through [`parse_multi`] and collapsing; unparseable
    /// text resets the selection to empty rather than keeping the stale
    /// set, so the widget and its attribute never disagree.
    pub fn set_chosen(&mut self, text: &str) -> &[DateRange] {
        let ranges = if self.no_toggle {
            Vec::new()
        } else {
            parse_multi(text).unwrap_or_default()
        };
        self.chosen = self.sanitized(ranges);
        &self.chosen
    }

    /// Replaces the chosen set from already-typed ranges.
    pub fn set_chosen_ranges(&mut self, ranges: Vec<DateRange>) -> &[DateRange] {
        let ranges = if self.no_toggle { Vec::new() } else { ranges };
        self.chosen = self.sanitized(ranges);
        &self.chosen
    }

    /// Empties the chosen set.
    pub fn clear_chosen(&mut self) -> &[DateRange] {
        self.chosen.clear();
        &self.chosen
    }

    /// Adds a day to the selection.
    ///
    /// With `append` set and multi-select on, the day joins the existing
    /// set as a new singleton and the set recollapses; otherwise the day
    /// replaces the whole selection.
    pub fn add_date(&mut self, day: Day, append: bool) -> &[DateRange] {
        if self.no_toggle {
            return &self.chosen;
        }
        let mut ranges = if append && self.multiple {
            self.chosen.clone()
        } else {
            Vec::new()
        };
        ranges.push(DateRange::from(day));
        self.chosen = self.sanitized(ranges);
        &self.chosen
    }

    /// Removes a day from the selection.
    ///
    /// The range containing the day is dropped and, when the day was
    /// strictly inside a span, the two leftover sub-ranges are re-inserted.
    /// A day outside every range is a no-op.
    pub fn remove_date(&mut self, day: Day) -> &[DateRange] {
        if self.no_toggle {
            return &self.chosen;
        }
        let Some(index) = self.chosen.iter().position(|range| range.contains(day)) else {
            return &self.chosen;
        };
        let removed = self.chosen[index];

        let mut ranges: Vec<DateRange> = self
            .chosen
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, range)| *range)
            .collect();

        if let DateRange::Span { start, end } = removed {
            if let Some(before) = day.prev() {
                if before >= start {
                    ranges.push(DateRange::from_endpoints(start, before));
                }
            }
            if let Some(after) = day.next() {
                if after <= end {
                    ranges.push(DateRange::from_endpoints(after, end));
                }
            }
        }

        self.chosen = self.sanitized(ranges);
        &self.chosen
    }

    /// Checks whether the day falls within any chosen range, both
    /// endpoints inclusive.
    pub fn has_chosen(&self, day: Day) -> bool {
        self.chosen.iter().any(|range| range.contains(day))
    }

    /// Removes the day if it is chosen, adds it otherwise.
    pub fn toggle(&mut self, day: Day, append_if_adding: bool) -> &[DateRange] {
        if self.has_chosen(day) {
            self.remove_date(day)
        } else {
            self.add_date(day, append_if_adding)
        }
    }

    /// Replaces the view date from attribute text.
    ///
    /// Unparseable text falls back to the first chosen day, then to
    /// [`today`]. The chosen set is never touched.
    pub fn set_view(&mut self, text: &str) -> Day {
        self.view = sanitize_view(Some(text), &self.chosen);
        self.view
    }

    /// Replaces the view date with an already-typed day.
    pub fn set_view_day(&mut self, day: Day) -> Day {
        self.view = day;
        self.view
    }

    /// Moves the view one month forward.
    pub fn next_month(&mut self) -> Day {
        self.view = self.view.add_months(1);
        self.view
    }

    /// Moves the view one month back.
    pub fn prev_month(&mut self) -> Day {
        self.view = self.view.add_months(-1);
        self.view
    }

    /// Replaces the span from attribute text. Unparseable or negative
    /// input sanitizes to 0, which renders no months.
    pub fn set_span(&mut self, text: &str) -> u32 {
        self.span = parse_span(text);
        self.span
    }

    /// Switches multi-select on or off.
    ///
    /// Turning it off truncates the chosen set to the start day of its
    /// first range, the same rule [`Selection::set_chosen`] applies.
    pub fn set_multiple(&mut self, multiple: bool) -> &[DateRange] {
        self.multiple = multiple;
        let taken = std::mem::take(&mut self.chosen);
        self.chosen = self.sanitized(taken);
        &self.chosen
    }

    /// Locks or unlocks toggling. While locked, every mutation of the
    /// chosen set is a no-op; locking also clears the current selection.
    pub fn set_no_toggle(&mut self, no_toggle: bool) -> &[DateRange] {
        self.no_toggle = no_toggle;
        if no_toggle {
            self.chosen.clear();
        }
        &self.chosen
    }

    /// The attribute text for the current selection.
    ///
    /// With multi-select on this is JSON: an array of ISO day strings and
    /// `[startIso, endIso]` pairs. Otherwise it is the ISO string of the
    /// sole chosen day, or empty when nothing is chosen.
    pub fn serialize(&self) -> String {
        if self.multiple {
            serde_json::to_string(&self.chosen).unwrap_or_default()
        } else {
            self.chosen
                .first()
                .map(|range| range.start().to_string())
                .unwrap_or_default()
        }
    }

    /// The month window derived from the view date and span.
    pub fn visible_window(&self) -> VisibleWindow {
        VisibleWindow::of(self.view, self.span)
    }

    /// First day of the earliest visible month.
    pub fn first_visible_month(&self) -> Day {
        self.visible_window().first_month()
    }

    /// First day of the latest visible month.
    pub fn last_visible_month(&self) -> Day {
        self.visible_window().last_month()
    }

    /// Checks whether the day is on a visible row; see
    /// [`VisibleWindow::contains`].
    pub fn has_visible_date(&self, day: Day, months_only: bool) -> bool {
        self.visible_window().contains(day, months_only)
    }

    /// Collapses to canonical form and enforces the single-selection rule:
    /// when multi-select is off only the first range's start day survives.
    fn sanitized(&self, ranges: Vec<DateRange>) -> Vec<DateRange> {
        let collapsed = collapse(ranges);
        if self.multiple {
            collapsed
        } else {
            collapsed
                .first()
                .map(|range| vec![DateRange::from(range.start())])
                .unwrap_or_default()
        }
    }
}

/// View-date sanitization: a parseable supplied value wins, then the first
/// day of the chosen ranges, then today.
fn sanitize_view(raw: Option<&str>, ranges: &[DateRange]) -> Day {
    if let Some(text) = raw {
        if let Ok(day) = parse_single(text) {
            return day;
        }
    }
    match ranges.first() {
        Some(range) => range.start(),
        None => today(),
    }
}

/// Span attribute parsing: a non-negative integer, anything else is 0.
fn parse_span(text: &str) -> u32 {
    text.trim().parse::<u32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{day, single, span};
    use crate::today;

    fn assert_canonical(ranges: &[DateRange]) {
        for range in ranges {
            if let DateRange::Span { start, end } = range {
                assert!(start < end, "span endpoints must be ordered: {range}");
            }
        }
        for pair in ranges.windows(2) {
            let bound = pair[0].end().next().expect("test data stays in range");
            assert!(
                pair[1].start() > bound,
                "ranges must stay sorted, disjoint and non-adjacent: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }

    fn multi(chosen: &str) -> Selection {
        Selection::new(SelectionConfig {
            chosen: Some(chosen),
            multiple: true,
            ..SelectionConfig::default()
        })
    }

    #[test]
    fn test_new_defaults() {
        let selection = Selection::new(SelectionConfig::default());
        assert!(selection.chosen().is_empty());
        assert_eq!(selection.view(), today());
        assert_eq!(selection.span(), 1);
        assert!(!selection.multiple());
        assert!(!selection.no_toggle());
    }

    #[test]
    fn test_new_parses_attributes() {
        let selection = Selection::new(SelectionConfig {
            view: Some("2024-02-15"),
            chosen: Some(r#"["2024-01-05",["2024-02-01","2024-02-03"]]"#),
            span: Some("3"),
            multiple: true,
        });
        assert_eq!(selection.view(), day("2024-02-15"));
        assert_eq!(selection.span(), 3);
        assert_eq!(
            selection.chosen(),
            &[single("2024-01-05"), span("2024-02-01", "2024-02-03")]
        );
    }

    #[test]
    fn test_new_view_falls_back_to_first_chosen() {
        let selection = Selection::new(SelectionConfig {
            chosen: Some(r#"[["2024-02-01","2024-02-03"]]"#),
            multiple: true,
            ..SelectionConfig::default()
        });
        assert_eq!(selection.view(), day("2024-02-01"));

        // the fallback uses the list as supplied, before any sorting
        let unsorted = Selection::new(SelectionConfig {
            chosen: Some(r#"["2024-03-01","2024-01-05"]"#),
            multiple: true,
            ..SelectionConfig::default()
        });
        assert_eq!(unsorted.view(), day("2024-03-01"));
    }

    #[test]
    fn test_new_view_falls_back_to_today() {
        let selection = Selection::new(SelectionConfig {
            view: Some("not a date"),
            ..SelectionConfig::default()
        });
        assert_eq!(selection.view(), today());
    }

    #[test]
    fn test_new_bad_chosen_attribute_is_empty() {
        let selection = Selection::new(SelectionConfig {
            chosen: Some(r#"["2024-01-05","garbage"]"#),
            multiple: true,
            ..SelectionConfig::default()
        });
        assert!(selection.chosen().is_empty());
    }

    #[test]
    fn test_new_bad_span_attribute_is_zero() {
        let selection = Selection::new(SelectionConfig {
            span: Some("lots"),
            ..SelectionConfig::default()
        });
        assert_eq!(selection.span(), 0);
    }

    #[test]
    fn test_new_single_select_truncates() {
        let selection = Selection::new(SelectionConfig {
            chosen: Some(r#"[["2024-02-01","2024-02-03"],"2024-01-05"]"#),
            multiple: false,
            ..SelectionConfig::default()
        });
        // sorted first, so the January day leads, and only its start stays
        assert_eq!(selection.chosen(), &[single("2024-01-05")]);
    }

    #[test]
    fn test_set_chosen_collapses() {
        let mut selection = multi("[]");
        selection.set_chosen(r#"[["2024-01-01","2024-01-03"],["2024-01-04","2024-01-05"]]"#);
        assert_eq!(selection.chosen(), &[span("2024-01-01", "2024-01-05")]);
        assert_canonical(selection.chosen());
    }

    #[test]
    fn test_set_chosen_parse_failure_empties() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        assert!(!selection.chosen().is_empty());
        selection.set_chosen("definitely not dates");
        assert!(selection.chosen().is_empty());
    }

    #[test]
    fn test_set_chosen_ranges_typed() {
        let mut selection = multi("[]");
        selection.set_chosen_ranges(vec![
            span("2024-01-04", "2024-01-05"),
            span("2024-01-01", "2024-01-03"),
        ]);
        assert_eq!(selection.chosen(), &[span("2024-01-01", "2024-01-05")]);
    }

    #[test]
    fn test_add_date_replaces_without_append() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        selection.add_date(day("2024-03-01"), false);
        assert_eq!(selection.chosen(), &[single("2024-03-01")]);
    }

    #[test]
    fn test_add_date_appends_in_multi_mode() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        selection.add_date(day("2024-03-01"), true);
        assert_eq!(
            selection.chosen(),
            &[single("2024-01-05"), single("2024-03-01")]
        );

        // an appended neighbor merges into the existing range
        selection.add_date(day("2024-01-06"), true);
        assert_eq!(
            selection.chosen(),
            &[span("2024-01-05", "2024-01-06"), single("2024-03-01")]
        );
        assert_canonical(selection.chosen());
    }

    #[test]
    fn test_add_date_append_ignored_in_single_mode() {
        let mut selection = Selection::new(SelectionConfig {
            chosen: Some("2024-01-05"),
            ..SelectionConfig::default()
        });
        selection.add_date(day("2024-03-01"), true);
        assert_eq!(selection.chosen(), &[single("2024-03-01")]);
    }

    #[test]
    fn test_remove_date_splits_interior() {
        let mut selection = multi(r#"[["2024-01-01","2024-01-10"]]"#);
        selection.remove_date(day("2024-01-05"));
        assert_eq!(
            selection.chosen(),
            &[span("2024-01-01", "2024-01-04"), span("2024-01-06", "2024-01-10")]
        );
        assert_canonical(selection.chosen());
    }

    #[test]
    fn test_remove_date_at_span_edges() {
        let mut selection = multi(r#"[["2024-01-01","2024-01-10"]]"#);
        selection.remove_date(day("2024-01-01"));
        assert_eq!(selection.chosen(), &[span("2024-01-02", "2024-01-10")]);

        selection.remove_date(day("2024-01-10"));
        assert_eq!(selection.chosen(), &[span("2024-01-02", "2024-01-09")]);
    }

    #[test]
    fn test_remove_date_shrinks_pair_to_single() {
        let mut selection = multi(r#"[["2024-01-01","2024-01-02"]]"#);
        selection.remove_date(day("2024-01-01"));
        assert_eq!(selection.chosen(), &[single("2024-01-02")]);
    }

    #[test]
    fn test_remove_date_drops_single() {
        let mut selection = multi(r#"["2024-01-05","2024-03-01"]"#);
        selection.remove_date(day("2024-01-05"));
        assert_eq!(selection.chosen(), &[single("2024-03-01")]);
    }

    #[test]
    fn test_remove_date_outside_is_noop() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        selection.remove_date(day("2024-07-01"));
        assert_eq!(selection.chosen(), &[single("2024-01-05")]);
    }

    #[test]
    fn test_has_chosen() {
        let selection = multi(r#"[["2024-01-01","2024-01-10"],"2024-03-01"]"#);
        assert!(selection.has_chosen(day("2024-01-01")));
        assert!(selection.has_chosen(day("2024-01-10")));
        assert!(selection.has_chosen(day("2024-03-01")));
        assert!(!selection.has_chosen(day("2024-01-11")));
        assert!(!selection.has_chosen(day("2024-02-29")));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut selection = multi("[]");
        selection.toggle(day("2024-01-05"), true);
        assert!(selection.has_chosen(day("2024-01-05")));
        selection.toggle(day("2024-01-05"), true);
        assert!(!selection.has_chosen(day("2024-01-05")));
    }

    #[test]
    fn test_mutation_sequence_stays_canonical() {
        let mut selection = multi("[]");
        selection.set_chosen(r#"[["2024-01-03","2024-01-06"]]"#);
        selection.add_date(day("2024-01-07"), true);
        selection.add_date(day("2024-01-01"), true);
        selection.toggle(day("2024-01-02"), true);
        selection.remove_date(day("2024-01-04"));
        selection.toggle(day("2024-02-29"), true);
        assert_canonical(selection.chosen());
        assert_eq!(
            selection.chosen(),
            &[
                span("2024-01-01", "2024-01-03"),
                span("2024-01-05", "2024-01-07"),
                single("2024-02-29"),
            ]
        );
    }

    #[test]
    fn test_set_view_priority() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        assert_eq!(selection.set_view("2024-06-15"), day("2024-06-15"));
        // unparseable input falls back to the first chosen day
        assert_eq!(selection.set_view("garbage"), day("2024-01-05"));

        selection.clear_chosen();
        assert_eq!(selection.set_view("garbage"), today());
    }

    #[test]
    fn test_view_navigation() {
        let mut selection = multi("[]");
        selection.set_view_day(day("2024-01-31"));
        assert_eq!(selection.next_month(), day("2024-03-02"));
        selection.set_view_day(day("2024-03-15"));
        assert_eq!(selection.prev_month(), day("2024-02-15"));
    }

    #[test]
    fn test_set_span() {
        let mut selection = multi("[]");
        assert_eq!(selection.set_span("3"), 3);
        assert_eq!(selection.set_span(" 0 "), 0);
        assert_eq!(selection.set_span("-2"), 0);
        assert_eq!(selection.set_span("abc"), 0);
    }

    #[test]
    fn test_set_multiple_off_truncates() {
        let mut selection = multi(r#"[["2024-02-01","2024-02-03"],"2024-01-05"]"#);
        assert_eq!(selection.chosen().len(), 2);
        selection.set_multiple(false);
        assert_eq!(selection.chosen(), &[single("2024-01-05")]);
    }

    #[test]
    fn test_set_multiple_on_keeps_selection() {
        let mut selection = Selection::new(SelectionConfig {
            chosen: Some("2024-01-05"),
            ..SelectionConfig::default()
        });
        selection.set_multiple(true);
        assert_eq!(selection.chosen(), &[single("2024-01-05")]);
        selection.add_date(day("2024-03-01"), true);
        assert_eq!(selection.chosen().len(), 2);
    }

    #[test]
    fn test_no_toggle_freezes_selection() {
        let mut selection = multi(r#"["2024-01-05"]"#);
        selection.set_no_toggle(true);
        assert!(selection.chosen().is_empty());

        selection.add_date(day("2024-03-01"), true);
        selection.toggle(day("2024-03-02"), true);
        selection.set_chosen(r#"["2024-03-03"]"#);
        assert!(selection.chosen().is_empty());

        selection.set_no_toggle(false);
        selection.add_date(day("2024-03-01"), true);
        assert_eq!(selection.chosen(), &[single("2024-03-01")]);
    }

    #[test]
    fn test_serialize_multi() {
        let selection = multi(r#"["2024-01-05",["2024-02-01","2024-02-03"]]"#);
        assert_eq!(
            selection.serialize(),
            r#"["2024-01-05",["2024-02-01","2024-02-03"]]"#
        );
        // the attribute text round-trips
        let mut other = multi("[]");
        other.set_chosen(&selection.serialize());
        assert_eq!(other.chosen(), selection.chosen());
    }

    #[test]
    fn test_serialize_single() {
        let selection = Selection::new(SelectionConfig {
            chosen: Some("2024-01-05"),
            ..SelectionConfig::default()
        });
        assert_eq!(selection.serialize(), "2024-01-05");
    }

    #[test]
    fn test_serialize_empty() {
        let none = Selection::new(SelectionConfig::default());
        assert_eq!(none.serialize(), "");

        let empty_multi = multi("[]");
        assert_eq!(empty_multi.serialize(), "[]");
    }

    #[test]
    fn test_visibility_delegates() {
        let mut selection = multi("[]");
        selection.set_view_day(day("2024-02-15"));
        selection.set_span("3");
        assert_eq!(selection.first_visible_month(), day("2024-01-01"));
        assert_eq!(selection.last_visible_month(), day("2024-03-01"));
        assert!(selection.has_visible_date(day("2024-03-31"), true));
        assert!(!selection.has_visible_date(day("2023-12-31"), true));
        assert!(selection.has_visible_date(day("2023-12-31"), false));
    }
}
