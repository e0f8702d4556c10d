//! In-memory lookup over the classification, built once per run.
use crate::taxon::model::TaxonRecord;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Family,
    Genus,
    Species,
}

impl Rank {
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }
}

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Typo,
    Contained,
}

/// How loosely genus and species names may be found inside a candidate.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Canonical name anywhere in the candidate, even inside a longer word.
    #[default]
    #[value(name = "substring")]
    Substring,
    /// Canonical name as a whole word sequence in the candidate.
    #[value(name = "token")]
    Token,
    /// Only exact names and listed typos.
    #[value(name = "exact")]
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonMatch<'a> {
    pub rank: Rank,
    pub name: &'a str,
    /// Parent family of a genus or species match.
    pub family: Option<&'a str>,
    pub kind: MatchKind,
}

#[derive(Debug)]
struct Entry {
    name: String,
    key: String,
    words: Vec<String>,
    parent: Option<usize>,
}

#[derive(Debug)]
struct Level {
    rank: Rank,
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
    by_typo: HashMap<String, usize>,
}

impl Level {
    fn new(rank: Rank) -> Self {
        Self {
            rank,
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_typo: HashMap::new(),
        }
    }

    fn push(
        &mut self,
        name: String,
        aliases: &[&str],
        typos: &[String],
        parent: Option<usize>,
        parent_label: &str,
    ) -> usize {
        let id = self.entries.len();
        let key = name.to_lowercase();

        for alias in std::iter::once(name.as_str()).chain(aliases.iter().copied()) {
            let alias_key = alias.trim().to_lowercase();
            if alias_key.is_empty() {
                continue;
            }
            match self.by_name.get(&alias_key) {
                Some(&existing) if existing == id => {}
                Some(_) => {
                    warn!(
                        "{} '{}' (under '{}') is already indexed; keeping the first occurrence",
                        self.rank.label(),
                        alias.trim(),
                        parent_label
                    );
                }
                None => {
                    self.by_name.insert(alias_key, id);
                }
            }
        }
        for typo in typos {
            let typo_key = typo.trim().to_lowercase();
            if typo_key.is_empty() {
                continue;
            }
            match self.by_typo.get(&typo_key) {
                Some(&existing) if existing == id => {}
                Some(&existing) => {
                    warn!(
                        "{} typo '{}' already maps to '{}'; ignoring it for '{}'",
                        self.rank.label(),
                        typo.trim(),
                        self.entries[existing].name,
                        name
                    );
                }
                None => {
                    self.by_typo.insert(typo_key, id);
                }
            }
        }

        self.entries.push(Entry {
            words: words_of(&key),
            name,
            key,
            parent,
        });
        id
    }

    fn lookup(&self, candidate: &str, mode: MatchMode) -> Option<(usize, MatchKind)> {
        let key = candidate.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(&id) = self.by_name.get(&key) {
            return Some((id, MatchKind::Exact));
        }
        if let Some(&id) = self.by_typo.get(&key) {
            return Some((id, MatchKind::Typo));
        }

        let position = match mode {
            MatchMode::Exact => None,
            MatchMode::Substring => self.entries.iter().position(|e| key.contains(&e.key)),
            MatchMode::Token => {
                let words = words_of(&key);
                self.entries
                    .iter()
                    .position(|e| contains_words(&words, &e.words))
            }
        };
        position.map(|id| (id, MatchKind::Contained))
    }
}

fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

/// Canonical `Genus epithet` form of a species record.
pub fn canonical_species_name(genus_name: &str, species_name: &str) -> String {
    let epithet = species_name.split_whitespace().last().unwrap_or("");
    if genus_name.trim().is_empty() {
        species_name.trim().to_string()
    } else if epithet.is_empty() {
        String::new()
    } else {
        format!("{} {}", genus_name.trim(), epithet.to_lowercase())
    }
}

/// Family, genus and species levels of the classification, in table order.
#[derive(Debug)]
pub struct TaxonomyIndex {
    families: Level,
    genera: Level,
    species: Level,
}

impl TaxonomyIndex {
    pub fn new(records: &[TaxonRecord]) -> Self {
        let mut index = Self {
            families: Level::new(Rank::Family),
            genera: Level::new(Rank::Genus),
            species: Level::new(Rank::Species),
        };

        for record in records {
            let family_name = record.family_name.trim();
            let family_id = (!family_name.is_empty()).then(|| {
                index
                    .families
                    .push(family_name.to_string(), &[], &record.family_typos, None, "")
            });

            for genus in &record.genera {
                let genus_name = genus.genus_name.trim();
                let genus_id = (!genus_name.is_empty()).then(|| {
                    index.genera.push(
                        genus_name.to_string(),
                        &[],
                        &genus.genus_typos,
                        family_id,
                        family_name,
                    )
                });

                for species in &genus.genus_species {
                    let canonical = canonical_species_name(genus_name, &species.species_name);
                    if canonical.is_empty() {
                        continue;
                    }
                    index.species.push(
                        canonical,
                        &[species.species_name.as_str()],
                        &species.species_typos,
                        genus_id,
                        genus_name,
                    );
                }
            }
        }

        index
    }

    /// Families match on exact names and typos only.
    pub fn family(&self, candidate: &str) -> Option<TaxonMatch<'_>> {
        self.families
            .lookup(candidate, MatchMode::Exact)
            .map(|(id, kind)| TaxonMatch {
                rank: Rank::Family,
                name: &self.families.entries[id].name,
                family: None,
                kind,
            })
    }

    pub fn genus(&self, candidate: &str, mode: MatchMode) -> Option<TaxonMatch<'_>> {
        self.genera.lookup(candidate, mode).map(|(id, kind)| {
            let entry = &self.genera.entries[id];
            TaxonMatch {
                rank: Rank::Genus,
                name: &entry.name,
                family: self.family_of_genus(entry.parent),
                kind,
            }
        })
    }

    pub fn species(&self, candidate: &str, mode: MatchMode) -> Option<TaxonMatch<'_>> {
        self.species.lookup(candidate, mode).map(|(id, kind)| {
            let entry = &self.species.entries[id];
            let family = entry
                .parent
                .and_then(|genus_id| self.family_of_genus(self.genera.entries[genus_id].parent));
            TaxonMatch {
                rank: Rank::Species,
                name: &entry.name,
                family,
                kind,
            }
        })
    }

    fn family_of_genus(&self, family_id: Option<usize>) -> Option<&str> {
        family_id.map(|id| self.families.entries[id].name.as_str())
    }

    pub fn family_count(&self) -> usize {
        self.families.entries.len()
    }

    pub fn genus_count(&self) -> usize {
        self.genera.entries.len()
    }

    pub fn species_count(&self) -> usize {
        self.species.entries.len()
    }
}
