use crate::error::Result;
use crate::transform::UnmatchedCandidate;
use csv::WriterBuilder;
use std::collections::BTreeMap;
use std::path::Path;

// One line per dropped candidate, for curating the typo lists.
pub fn write_unmatched_report(rows: &[UnmatchedCandidate], path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(["row", "row_id", "column", "rank", "candidate"])?;

    for unmatched in rows {
        let row_num = unmatched.row.to_string();
        writer.write_record([
            row_num.as_str(),
            unmatched.row_id.as_str(),
            unmatched.column.as_str(),
            unmatched.rank.label(),
            unmatched.candidate.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Most frequent unmatched candidates, most common first, ties alphabetical.
pub fn top_unmatched(rows: &[UnmatchedCandidate], limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for unmatched in rows {
        *counts.entry(unmatched.candidate.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(candidate, count)| (candidate.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}
