//! Rewrites the taxon columns of each survey row.
use crate::csv_handler::{ColumnConfig, Table};
use crate::error::{CrateError, Result};
use crate::taxon::index::Rank;
use crate::taxon::normalizer::Normalizer;
use crate::taxon::resolver::{MatchStats, Resolution, Resolver};
use log::info;

/// Positions of the taxon columns once the genus column is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub family: usize,
    pub genus: usize,
    pub species: usize,
}

/// Ensures the genus column exists, inserting it right before the species column.
pub fn prepare_columns(table: &mut Table, columns: &ColumnConfig) -> Result<ColumnLayout> {
    table.require_column(&columns.family)?;
    let species = table.require_column(&columns.species)?;
    if table.column_index(&columns.genus).is_none() {
        info!(
            "Inserting '{}' column before '{}'",
            columns.genus, columns.species
        );
        table.insert_column(species, &columns.genus);
    } else {
        info!("Reusing existing '{}' column", columns.genus);
    }

    Ok(ColumnLayout {
        family: table.require_column(&columns.family)?,
        genus: table.require_column(&columns.genus)?,
        species: table.require_column(&columns.species)?,
    })
}

/// A candidate that resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedCandidate {
    pub row: usize,
    pub row_id: String,
    pub column: String,
    pub rank: Rank,
    pub candidate: String,
}

#[derive(Debug, Clone, Default)]
pub struct RowOutcome {
    pub stats: MatchStats,
    pub unmatched: Vec<UnmatchedCandidate>,
}

pub struct RowTransformer<'a> {
    normalizer: &'a Normalizer,
    resolver: &'a Resolver<'a>,
    columns: &'a ColumnConfig,
    layout: ColumnLayout,
}

impl<'a> RowTransformer<'a> {
    pub fn new(
        normalizer: &'a Normalizer,
        resolver: &'a Resolver<'a>,
        columns: &'a ColumnConfig,
        layout: ColumnLayout,
    ) -> Self {
        Self {
            normalizer,
            resolver,
            columns,
            layout,
        }
    }

    /// Cleans one row in place. `row_num` is the 1-based CSV line, header included.
    pub fn transform_row(&self, row: &mut [String], row_num: usize) -> Result<RowOutcome> {
        let family_raw = self.cell(row, self.layout.family, &self.columns.family, row_num)?;
        let genus_raw = self.cell(row, self.layout.genus, &self.columns.genus, row_num)?;
        let species_raw = self.cell(row, self.layout.species, &self.columns.species, row_num)?;
        let row_id = row.first().cloned().unwrap_or_default();

        let mut outcome = RowOutcome::default();

        let family_present = !family_raw.trim().is_empty();
        let mut families = Vec::new();
        if family_present {
            let resolution = self
                .resolver
                .resolve_families(&self.normalizer.candidates(&family_raw));
            families = resolution.names.clone();
            self.absorb(
                &mut outcome,
                resolution,
                &self.columns.family,
                Rank::Family,
                row_num,
                &row_id,
            );
        }

        let mut genus_candidates = self.normalizer.candidates(&genus_raw);
        let species_candidates = self.normalizer.candidates(&species_raw);
        genus_candidates.extend(species_candidates.iter().cloned());
        let genera = self.resolver.resolve_genera(&genus_candidates);
        for family in &genera.families {
            if !families.contains(family) {
                families.push(family.clone());
            }
        }
        row[self.layout.genus] = genera.joined();
        self.absorb(
            &mut outcome,
            genera,
            &self.columns.genus,
            Rank::Genus,
            row_num,
            &row_id,
        );

        if family_present || !families.is_empty() {
            row[self.layout.family] = families.join(", ");
        }

        if !species_raw.trim().is_empty() {
            let species = self.resolver.resolve_species(&species_candidates);
            row[self.layout.species] = species.joined();
            self.absorb(
                &mut outcome,
                species,
                &self.columns.species,
                Rank::Species,
                row_num,
                &row_id,
            );
        }

        Ok(outcome)
    }

    fn cell(&self, row: &[String], at: usize, column: &str, row_num: usize) -> Result<String> {
        row.get(at).cloned().ok_or_else(|| CrateError::MissingField {
            column: column.to_string(),
            row: row_num,
        })
    }

    fn absorb(
        &self,
        outcome: &mut RowOutcome,
        resolution: Resolution,
        column: &str,
        rank: Rank,
        row_num: usize,
        row_id: &str,
    ) {
        outcome.stats += resolution.stats;
        outcome
            .unmatched
            .extend(resolution.unmatched.into_iter().map(|candidate| UnmatchedCandidate {
                row: row_num,
                row_id: row_id.to_string(),
                column: column.to_string(),
                rank,
                candidate,
            }));
    }
}

/// Cleans every row of the table, returning the combined outcome.
pub fn transform_table(
    table: &mut Table,
    transformer: &RowTransformer<'_>,
    mut on_row: impl FnMut(usize),
) -> Result<RowOutcome> {
    let mut total = RowOutcome::default();
    for (index, row) in table.rows.iter_mut().enumerate() {
        let outcome = transformer.transform_row(row, index + 2)?;
        total.stats += outcome.stats;
        total.unmatched.extend(outcome.unmatched);
        on_row(index);
    }
    Ok(total)
}
