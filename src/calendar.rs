use crate::error::StatsError;
use crate::util::days_in_month;

/// Selectable day range of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarBound {
    pub month: u32,
    pub min_day: u32,
    pub max_day: u32,
}

/// Months and days a query may ask for, derived once from the loaded data.
///
/// Inner months span their full length; the first and last month are cut at
/// the earliest and latest observed day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    bounds: Vec<CalendarBound>,
}

impl Calendar {
    pub fn from_dates<I>(year: i32, dates: I) -> Option<Calendar>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut dates = dates.into_iter().peekable();
        let first = *dates.peek()?;
        let (earliest, latest) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

        let mut bounds = Vec::new();
        for month in earliest.0..=latest.0 {
            let length = days_in_month(year, month)?;
            let min_day = if month == earliest.0 { earliest.1 } else { 1 };
            let max_day = if month == latest.0 { latest.1 } else { length };
            bounds.push(CalendarBound { month, min_day, max_day: max_day.min(length) });
        }
        Some(Calendar { bounds })
    }

    pub fn months(&self) -> Vec<u32> {
        self.bounds.iter().map(|b| b.month).collect()
    }

    pub fn bound(&self, month: u32) -> Option<&CalendarBound> {
        self.bounds.iter().find(|b| b.month == month)
    }

    pub fn validate(&self, month: u32, day: u32) -> Result<(), StatsError> {
        match self.bound(month) {
            Some(b) if (b.min_day..=b.max_day).contains(&day) => Ok(()),
            _ => Err(StatsError::DateOutOfRange { month, day }),
        }
    }
}
