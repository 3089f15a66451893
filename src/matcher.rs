// Date matching over an indexed table.
//
// Some exports repeat the same snapshot on consecutive lines. A run of
// matched rows that share the identity key collapses to its first row.
use crate::error::StatsError;
use crate::table::Table;
use crate::types::Dated;

/// Rows dated `(month, day)`, in source order, with adjacent rows that share
/// `identity` collapsed to the first of the run.
pub fn match_rows<R, K, F>(
    table: &Table<R>,
    month: u32,
    day: u32,
    identity: F,
) -> Result<Vec<&R>, StatsError>
where
    R: Dated,
    K: PartialEq,
    F: Fn(&R) -> K,
{
    let mut matched: Vec<&R> = Vec::new();
    let mut last_key: Option<K> = None;
    for row in table.rows_on(month, day) {
        let key = identity(row);
        if last_key.as_ref() == Some(&key) {
            continue;
        }
        matched.push(row);
        last_key = Some(key);
    }
    if matched.is_empty() {
        return Err(StatsError::NoDataForDate { month, day });
    }
    Ok(matched)
}

/// `match_rows` keyed on the whole row. Only exact repeats collapse; two
/// adjacent rows for one zone with different values are both kept, so the
/// join sees the conflict.
pub fn match_snapshot_rows<R>(table: &Table<R>, month: u32, day: u32) -> Result<Vec<&R>, StatsError>
where
    R: Dated + Copy + PartialEq,
{
    match_rows(table, month, day, |r| *r)
}

/// Every row dated `(month, day)`. Repeated rows are kept; an empty result is
/// not an error.
pub fn match_all<R: Dated>(table: &Table<R>, month: u32, day: u32) -> Vec<&R> {
    table.rows_on(month, day).collect()
}
