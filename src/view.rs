use crate::Day;

/// The window of whole months laid out around a view date.
///
/// `span` months are centered on the view date by floor division, so odd
/// spans put the view month in the middle and even spans show one more
/// month before it than after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    first_month: Day,
    last_month: Day,
}

impl VisibleWindow {
    /// Computes the window for a view date and month span.
    ///
    /// A span of 0 renders no months but still anchors the window on the
    /// view month, so membership tests stay well-defined.
    pub fn of(view: Day, span: u32) -> Self {
        let first_month = view.add_months(-i64::from(span / 2)).first_of_month();
        let last_month = first_month.add_months(i64::from(span.saturating_sub(1)));
        Self {
            first_month,
            last_month,
        }
    }

    /// First day of the earliest visible month
    pub const fn first_month(&self) -> Day {
        self.first_month
    }

    /// First day of the latest visible month
    pub const fn last_month(&self) -> Day {
        self.last_month
    }

    /// Checks whether `day` falls on a visible row, both bounds inclusive.
    ///
    /// With `months_only` the window is exactly the whole months; otherwise
    /// it widens to the leading and trailing week-padding rows that show
    /// days from the adjacent months.
    pub fn contains(&self, day: Day, months_only: bool) -> bool {
        let start = if months_only {
            self.first_month
        } else {
            self.first_month.start_of_week()
        };
        let month_end = self.last_month.last_of_month();
        let end = if months_only {
            month_end
        } else {
            month_end.end_of_week()
        };
        start <= day && day <= end
    }
}
