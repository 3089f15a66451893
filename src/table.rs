use crate::types::{CaseRow, Dated, PopulationRow, VaccinationRow};
use std::collections::BTreeMap;

/// Rows in source order plus a `(month, day) -> row indices` index built once.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
    by_date: BTreeMap<(u32, u32), Vec<usize>>,
}

impl<R: Dated> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        let mut by_date: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
        for (idx, row) in rows.iter().enumerate() {
            by_date.entry(row.date()).or_default().push(idx);
        }
        Table { rows, by_date }
    }

    /// Rows sampled on the given date, in source order.
    pub fn rows_on(&self, month: u32, day: u32) -> impl Iterator<Item = &R> + '_ {
        self.by_date
            .get(&(month, day))
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rows[idx])
    }

    /// Earliest and latest sampled dates, regardless of row order.
    pub fn date_range(&self) -> Option<((u32, u32), (u32, u32))> {
        let first = *self.by_date.keys().next()?;
        let last = *self.by_date.keys().next_back()?;
        Some((first, last))
    }

    pub fn dates(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.by_date.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The three source tables, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Tables {
    pub vaccinations: Table<VaccinationRow>,
    pub populations: Table<PopulationRow>,
    pub cases: Table<CaseRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(month: u32, day: u32, zone_id: u8) -> CaseRow {
        CaseRow { month, day, zone_id }
    }

    #[test]
    fn lookup_preserves_source_order_across_interleaved_dates() {
        let table = Table::new(vec![
            case(11, 15, 3),
            case(11, 14, 0),
            case(11, 15, 1),
            case(11, 15, 3),
        ]);
        let zones: Vec<u8> = table.rows_on(11, 15).map(|r| r.zone_id).collect();
        assert_eq!(zones, vec![3, 1, 3]);
        assert_eq!(table.rows_on(2, 30).count(), 0);
        assert_eq!(table.rows_on(11, 14).count(), 1);
    }

    #[test]
    fn date_range_ignores_row_order() {
        // Exports list the most recent date first.
        let table = Table::new(vec![case(11, 20, 0), case(3, 2, 0), case(7, 1, 4)]);
        assert_eq!(table.date_range(), Some(((3, 2), (11, 20))));
        assert_eq!(table.len(), 3);
        assert_eq!(Table::<CaseRow>::new(Vec::new()).date_range(), None);
    }
}
