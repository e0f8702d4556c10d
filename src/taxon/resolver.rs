//! Resolves normalized candidates to canonical names and aggregates them per cell.
use crate::taxon::index::{MatchKind, MatchMode, Rank, TaxonMatch, TaxonomyIndex};
use log::debug;
use std::ops::AddAssign;

/// Per-kind tally of resolution outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub exact: usize,
    pub typo: usize,
    pub contained: usize,
    pub unmatched: usize,
}

impl MatchStats {
    pub fn candidates(&self) -> usize {
        self.exact + self.typo + self.contained + self.unmatched
    }

    fn record(&mut self, kind: Option<MatchKind>) {
        match kind {
            Some(MatchKind::Exact) => self.exact += 1,
            Some(MatchKind::Typo) => self.typo += 1,
            Some(MatchKind::Contained) => self.contained += 1,
            None => self.unmatched += 1,
        }
    }
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: Self) {
        self.exact += other.exact;
        self.typo += other.typo;
        self.contained += other.contained;
        self.unmatched += other.unmatched;
    }
}

/// Outcome of resolving one cell's candidates at one rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical names, de-duplicated, in first-seen order.
    pub names: Vec<String>,
    /// Parent families inferred from genus matches.
    pub families: Vec<String>,
    pub unmatched: Vec<String>,
    pub stats: MatchStats,
}

impl Resolution {
    pub fn joined(&self) -> String {
        self.names.join(", ")
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

pub struct Resolver<'a> {
    index: &'a TaxonomyIndex,
    mode: MatchMode,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a TaxonomyIndex, mode: MatchMode) -> Self {
        Self { index, mode }
    }

    pub fn resolve_families(&self, candidates: &[String]) -> Resolution {
        self.resolve(Rank::Family, candidates)
    }

    /// Resolves genera and collects the family each matched genus belongs to.
    pub fn resolve_genera(&self, candidates: &[String]) -> Resolution {
        self.resolve(Rank::Genus, candidates)
    }

    pub fn resolve_species(&self, candidates: &[String]) -> Resolution {
        self.resolve(Rank::Species, candidates)
    }

    fn lookup(&self, rank: Rank, candidate: &str) -> Option<TaxonMatch<'a>> {
        match rank {
            Rank::Family => self.index.family(candidate),
            Rank::Genus => self.index.genus(candidate, self.mode),
            Rank::Species => self.index.species(candidate, self.mode),
        }
    }

    fn resolve(&self, rank: Rank, candidates: &[String]) -> Resolution {
        let mut resolution = Resolution::default();
        for candidate in candidates {
            let found = self.lookup(rank, candidate);
            resolution.stats.record(found.as_ref().map(|m| m.kind));

            let Some(found) = found else {
                debug!("no {} match: {}", rank.label(), candidate);
                resolution.unmatched.push(candidate.clone());
                continue;
            };
            let label = found.rank.label();
            match found.kind {
                MatchKind::Typo => debug!("{} typo: {} -> {}", label, candidate, found.name),
                _ => debug!("{} match: {} -> {}", label, candidate, found.name),
            }

            push_unique(&mut resolution.names, found.name);
            if rank == Rank::Genus {
                if let Some(family) = found.family {
                    push_unique(&mut resolution.families, family);
                }
            }
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxon::index::tests::sample_records;
    use crate::taxon::normalizer::Normalizer;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn resolves_mixed_family_cell() {
        let index = TaxonomyIndex::new(&sample_records());
        let resolver = Resolver::new(&index, MatchMode::Substring);
        let resolution = resolver.resolve_families(&strings(&[
            "Acroporidae",
            "Pocilloporiidae",
            "Acroporidae",
            "Seagrass",
        ]));
        assert_eq!(resolution.names, vec!["Acroporidae", "Pocilloporidae"]);
        assert_eq!(resolution.joined(), "Acroporidae, Pocilloporidae");
        assert_eq!(resolution.unmatched, vec!["Seagrass"]);
        assert!(resolution.families.is_empty());
        assert_eq!(
            resolution.stats,
            MatchStats {
                exact: 2,
                typo: 1,
                contained: 0,
                unmatched: 1
            }
        );
        assert_eq!(resolution.stats.candidates(), 4);
    }

    #[test]
    fn genera_infer_parent_families() {
        let index = TaxonomyIndex::new(&sample_records());
        let resolver = Resolver::new(&index, MatchMode::Substring);
        let candidates = Normalizer::default()
            .candidates("Acropora sp., staghorn acropora, Porities and pocillopora damicornis");
        let resolution = resolver.resolve_genera(&candidates);
        assert_eq!(resolution.names, vec!["Acropora", "Porites", "Pocillopora"]);
        assert_eq!(
            resolution.families,
            vec!["Acroporidae", "Poritidae", "Pocilloporidae"]
        );
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn species_resolution_drops_genus_only_candidates() {
        let index = TaxonomyIndex::new(&sample_records());
        let resolver = Resolver::new(&index, MatchMode::Substring);
        let resolution =
            resolver.resolve_species(&strings(&["Pocillopora Damicornis", "Acropora"]));
        assert_eq!(resolution.names, vec!["Pocillopora damicornis"]);
        assert_eq!(resolution.unmatched, vec!["Acropora"]);
    }

    #[test]
    fn unknown_candidates_contribute_nothing() {
        let index = TaxonomyIndex::new(&sample_records());
        let resolver = Resolver::new(&index, MatchMode::Token);
        let resolution = resolver.resolve_genera(&strings(&["Seagrass", "Pocilloporidae"]));
        assert!(resolution.names.is_empty());
        assert!(resolution.families.is_empty());
        assert_eq!(resolution.joined(), "");
        assert_eq!(resolution.stats.unmatched, 2);
    }

    #[test]
    fn stats_accumulate() {
        let mut total = MatchStats::default();
        total += MatchStats {
            exact: 1,
            typo: 2,
            contained: 0,
            unmatched: 1,
        };
        total += MatchStats {
            exact: 0,
            typo: 1,
            contained: 3,
            unmatched: 0,
        };
        assert_eq!(total.candidates(), 8);
        assert_eq!(total.typo, 3);
    }
}
