//! Reporting-day windows and order selection strategies
//!
//! The two strategies are intentionally distinct: one selects by modification time
//! in server-local time on this side, the other asks the upstream service for
//! orders created during the UTC day. When the local and UTC calendar days differ
//! they can disagree on which orders belong to "today".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::orders::{Order, OrderQuery};

/// Upstream sort spec used by the last-modified strategy
const LAST_MODIFIED_SORT: &str = "lastModifiedAt desc";

/// Inclusive instant range covering one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Calendar date in the window's own time zone
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// `00:00:00.000 ..= 23:59:59.999` of the day containing `now`, in `now`'s zone
    pub fn local_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let date = now.date_naive();
        let midnight = date.and_time(NaiveTime::MIN);
        let last_milli = midnight + Duration::days(1) - Duration::milliseconds(1);

        Self {
            date,
            start: resolve_start(&tz, midnight),
            end: resolve_end(&tz, last_milli),
        }
    }

    /// `00:00:00 ..= 23:59:59` of the UTC day containing `now`
    pub fn utc_day(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let start = date.and_time(NaiveTime::MIN).and_utc();

        Self {
            date,
            start,
            end: start + Duration::days(1) - Duration::seconds(1),
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Upstream predicate selecting orders created inside this window
    pub fn created_at_predicate(&self) -> String {
        format!(
            "createdAt >= \"{}\" and createdAt <= \"{}\"",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ"),
        )
    }
}

fn resolve_start<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // midnight skipped by a DST jump
        LocalResult::None => resolve_start(tz, naive + Duration::hours(1)),
    }
}

fn resolve_end<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(_, latest) => latest.with_timezone(&Utc),
        LocalResult::None => resolve_end(tz, naive - Duration::hours(1)),
    }
}

/// Which orders make up a day's export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStrategy {
    /// Fetch everything sorted by `lastModifiedAt`, keep the local day here
    LastModifiedLocal,
    /// Ask upstream for orders created during the UTC day
    CreatedAtUtc,
}

impl FilterStrategy {
    /// Reporting day for an export triggered at `now`
    pub fn window(self, now: DateTime<Utc>) -> DateWindow {
        match self {
            Self::LastModifiedLocal => DateWindow::local_day(&now.with_timezone(&Local)),
            Self::CreatedAtUtc => DateWindow::utc_day(now),
        }
    }

    /// Upstream query for the given day
    pub fn query(self, window: &DateWindow, limit: Option<u32>) -> OrderQuery {
        match self {
            Self::LastModifiedLocal => OrderQuery::Sorted {
                sort: vec![LAST_MODIFIED_SORT.to_string()],
                limit,
            },
            Self::CreatedAtUtc => OrderQuery::Filtered {
                predicate: window.created_at_predicate(),
                limit,
            },
        }
    }

    /// Local selection step; upstream already filtered for [`Self::CreatedAtUtc`]
    pub fn select(self, window: &DateWindow, orders: Vec<Order>) -> Vec<Order> {
        match self {
            Self::LastModifiedLocal => orders
                .into_iter()
                .filter(|order| window.contains(order.last_modified_at))
                .collect(),
            Self::CreatedAtUtc => orders,
        }
    }

    /// Whether [`Self::select`] does any work
    pub fn filters_locally(self) -> bool {
        matches!(self, Self::LastModifiedLocal)
    }

    pub fn default_prefix(self) -> &'static str {
        match self {
            Self::LastModifiedLocal => "daily-orders/last-modified",
            Self::CreatedAtUtc => "daily-orders/created-at",
        }
    }

    pub fn default_file_suffix(self) -> &'static str {
        match self {
            Self::LastModifiedLocal => ".csv",
            Self::CreatedAtUtc => "-orders.csv",
        }
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastModifiedLocal => write!(f, "last-modified"),
            Self::CreatedAtUtc => write!(f, "created-at"),
        }
    }
}

impl FromStr for FilterStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-modified" | "last_modified" | "client" => Ok(Self::LastModifiedLocal),
            "created-at" | "created_at" | "server" => Ok(Self::CreatedAtUtc),
            other => Err(format!(
                "unknown export strategy '{other}' (expected 'last-modified' or 'created-at')"
            )),
        }
    }
}
