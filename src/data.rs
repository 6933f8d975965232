//! Data Loading and Management
//!
//! `GuildData` is the read-only Attribute Store (one `SpeciesAttributes` per
//! plant), the Relationship Store (one `RelationshipSets` per plant) and the
//! three shared lookup tables. Tables are loaded from CSV with Polars or
//! assembled in memory through `GuildDataBuilder`.
//!
//! Organism columns accept either Arrow list columns or pipe-separated
//! strings ("org1|org2|org3"). Integer identifier columns (CSV inference of
//! numeric taxon keys) are read as strings; any other column type is an
//! error rather than an empty set.

use crate::species::{
    ClimateEnvelope, ClimateRange, CsrStrategy, GrowthForm, RelationshipSets, SpeciesAttributes,
    StressExposure,
};
use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// Organism ID → set of organism IDs
pub type Lookup = FxHashMap<String, FxHashSet<String>>;

/// Shared (not per-species) interaction lookups
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    /// Herbivore ID → known predator IDs
    pub herbivore_predators: Lookup,
    /// Herbivore ID → known entomopathogenic fungus IDs
    pub insect_parasites: Lookup,
    /// Pathogen ID → known antagonist (mycoparasite) IDs
    pub pathogen_antagonists: Lookup,
}

/// Main data holder for guild scoring
#[derive(Debug, Clone, Default)]
pub struct GuildData {
    species: FxHashMap<String, SpeciesAttributes>,
    relationships: FxHashMap<String, RelationshipSets>,
    lookups: LookupTables,
    empty: RelationshipSets,
}

/// Locations of the six input tables
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub plants: PathBuf,
    pub organisms: PathBuf,
    pub fungi: PathBuf,
    pub herbivore_predators: PathBuf,
    pub insect_parasites: PathBuf,
    pub pathogen_antagonists: PathBuf,
}

impl DataPaths {
    /// Standard file names inside one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            plants: dir.join("plants.csv"),
            organisms: dir.join("organisms.csv"),
            fungi: dir.join("fungi.csv"),
            herbivore_predators: dir.join("herbivore_predators.csv"),
            insect_parasites: dir.join("insect_fungal_parasites.csv"),
            pathogen_antagonists: dir.join("pathogen_antagonists.csv"),
        }
    }
}

const ORGANISM_COLUMNS: [&str; 4] = ["herbivores", "pollinators", "flower_visitors", "predators"];

const FUNGI_COLUMNS: [&str; 8] = [
    "pathogenic_fungi",
    "pathogenic_fungi_host_specific",
    "amf_fungi",
    "emf_fungi",
    "endophytic_fungi",
    "saprotrophic_fungi",
    "mycoparasite_fungi",
    "entomopathogenic_fungi",
];

impl GuildData {
    /// Load all six tables from CSV files
    pub fn load(paths: &DataPaths, phylo_dimensions: usize) -> Result<Self> {
        let plants = read_csv(&paths.plants)?;
        let organisms = read_csv(&paths.organisms)?;
        let fungi = read_csv(&paths.fungi)?;
        let herbivore_predators = read_csv(&paths.herbivore_predators)?;
        let insect_parasites = read_csv(&paths.insect_parasites)?;
        let pathogen_antagonists = read_csv(&paths.pathogen_antagonists)?;

        Self::from_frames(
            &plants,
            &organisms,
            &fungi,
            &herbivore_predators,
            &insect_parasites,
            &pathogen_antagonists,
            phylo_dimensions,
        )
    }

    /// Build the stores from already-loaded frames
    pub fn from_frames(
        plants: &DataFrame,
        organisms: &DataFrame,
        fungi: &DataFrame,
        herbivore_predators: &DataFrame,
        insect_parasites: &DataFrame,
        pathogen_antagonists: &DataFrame,
        phylo_dimensions: usize,
    ) -> Result<Self> {
        let species = parse_plants(plants, phylo_dimensions)?;

        let mut relationships: FxHashMap<String, RelationshipSets> = FxHashMap::default();
        parse_relationships(organisms, &ORGANISM_COLUMNS, &mut relationships)
            .context("Failed to parse organisms table")?;
        parse_relationships(fungi, &FUNGI_COLUMNS, &mut relationships)
            .context("Failed to parse fungi table")?;

        let lookups = LookupTables {
            herbivore_predators: parse_lookup(herbivore_predators, "herbivore", "predators")?,
            insect_parasites: parse_lookup(insect_parasites, "herbivore", "entomopathogenic_fungi")?,
            pathogen_antagonists: parse_lookup(pathogen_antagonists, "pathogen", "antagonists")?,
        };

        tracing::info!(
            plants = species.len(),
            relationship_records = relationships.len(),
            herbivore_predators = lookups.herbivore_predators.len(),
            insect_parasites = lookups.insect_parasites.len(),
            pathogen_antagonists = lookups.pathogen_antagonists.len(),
            "loaded guild data"
        );

        Ok(Self {
            species,
            relationships,
            lookups,
            empty: RelationshipSets::default(),
        })
    }

    /// Attribute-store lookup
    pub fn attributes(&self, id: &str) -> Option<&SpeciesAttributes> {
        self.species.get(id)
    }

    /// Relationship-store lookup; a plant with no record has no documented
    /// interactions
    pub fn relationships(&self, id: &str) -> &RelationshipSets {
        self.relationships.get(id).unwrap_or(&self.empty)
    }

    pub fn lookups(&self) -> &LookupTables {
        &self.lookups
    }

    pub fn contains(&self, id: &str) -> bool {
        self.species.contains_key(id)
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// All species identifiers, sorted
    pub fn species_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.species.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

/// In-memory construction of `GuildData` from typed records
#[derive(Debug, Default)]
pub struct GuildDataBuilder {
    data: GuildData,
}

impl GuildDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an attribute record
    pub fn species(mut self, attributes: SpeciesAttributes) -> Self {
        self.data.species.insert(attributes.id.clone(), attributes);
        self
    }

    /// Add (or replace) a relationship record
    pub fn relationships(mut self, id: impl Into<String>, sets: RelationshipSets) -> Self {
        self.data.relationships.insert(id.into(), sets);
        self
    }

    pub fn herbivore_predators<I, S>(mut self, herbivore: impl Into<String>, predators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_lookup(&mut self.data.lookups.herbivore_predators, herbivore.into(), predators);
        self
    }

    pub fn insect_parasites<I, S>(mut self, herbivore: impl Into<String>, fungi: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_lookup(&mut self.data.lookups.insect_parasites, herbivore.into(), fungi);
        self
    }

    pub fn pathogen_antagonists<I, S>(mut self, pathogen: impl Into<String>, antagonists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_lookup(&mut self.data.lookups.pathogen_antagonists, pathogen.into(), antagonists);
        self
    }

    /// Finish the stores, applying the same record checks as the CSV loader
    ///
    /// A non-finite or non-positive height is an error; a CSR triple that is
    /// not a percentage split is dropped, leaving the species without a
    /// strategy.
    pub fn build(mut self) -> Result<GuildData> {
        for attributes in self.data.species.values_mut() {
            checked_height(&attributes.id, Some(attributes.height_m))?;
            if attributes.strategy.is_some_and(|s| !s.is_valid()) {
                tracing::warn!(
                    species = %attributes.id,
                    "CSR components are not a percentage split; strategy treated as missing"
                );
                attributes.strategy = None;
            }
        }
        Ok(self.data)
    }
}

fn checked_height(id: &str, height_m: Option<f64>) -> Result<f64> {
    height_m
        .filter(|h| h.is_finite() && *h > 0.0)
        .with_context(|| format!("Plant '{}' has no valid height_m", id))
}

fn extend_lookup<I, S>(lookup: &mut Lookup, key: String, values: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lookup.entry(key).or_default().extend(values.into_iter().map(Into::into));
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {}", path.display()))
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;
    let cast = column
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' is not string-like", name))?;
    Ok(cast.str()?.clone())
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;
    let cast = column
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    Ok(cast.f64()?.clone())
}

fn optional_f64_column(df: &DataFrame, name: &str) -> Result<Option<Float64Chunked>> {
    if df.column(name).is_err() {
        return Ok(None);
    }
    f64_column(df, name).map(Some)
}

fn value_at(column: &Option<Float64Chunked>, idx: usize) -> Option<f64> {
    column
        .as_ref()
        .and_then(|c| c.get(idx))
        .filter(|v| v.is_finite())
}

/// Interpret a nitrogen-fixation cell: booleans, 0/1, or a rating label
pub fn parse_nitrogen_flag(label: &str) -> bool {
    matches!(
        label.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1" | "high" | "moderate-high"
    )
}

fn nitrogen_flags(df: &DataFrame) -> Result<Vec<bool>> {
    let Ok(column) = df.column("nitrogen_fixation") else {
        return Ok(vec![false; df.height()]);
    };

    let flags = match column.dtype() {
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.map_or(false, parse_nitrogen_flag))
            .collect(),
        _ => f64_column(df, "nitrogen_fixation")?
            .into_iter()
            .map(|v| v.map_or(false, |x| x > 0.0))
            .collect(),
    };
    Ok(flags)
}

fn parse_plants(
    df: &DataFrame,
    phylo_dimensions: usize,
) -> Result<FxHashMap<String, SpeciesAttributes>> {
    let ids = string_column(df, "wfo_taxon_id")?;
    let csr_c = optional_f64_column(df, "CSR_C")?;
    let csr_s = optional_f64_column(df, "CSR_S")?;
    let csr_r = optional_f64_column(df, "CSR_R")?;
    let heights = f64_column(df, "height_m")?;
    let growth_forms = string_column(df, "growth_form")?;
    let light_prefs = optional_f64_column(df, "light_pref")?;
    let soil_ph = optional_f64_column(df, "soil_ph_mean")?;
    let nitrogen = nitrogen_flags(df)?;

    let temp_min = f64_column(df, "temp_annual_min")?;
    let temp_max = f64_column(df, "temp_annual_max")?;
    let coldest_min = f64_column(df, "temp_coldest_min")?;
    let coldest_max = f64_column(df, "temp_coldest_max")?;
    let precip_min = optional_f64_column(df, "precip_annual_min")?;
    let precip_max = optional_f64_column(df, "precip_annual_max")?;
    let drought = optional_f64_column(df, "drought_days")?;
    let frost = optional_f64_column(df, "frost_days")?;
    let heat = optional_f64_column(df, "heat_days")?;
    let cold_spell = optional_f64_column(df, "cold_spell_days")?;

    let mut phylo_columns = Vec::with_capacity(phylo_dimensions);
    for dim in 1..=phylo_dimensions {
        if let Some(column) = optional_f64_column(df, &format!("phylo_ev{}", dim))? {
            phylo_columns.push(column);
        }
    }
    if !phylo_columns.is_empty() && phylo_columns.len() < phylo_dimensions {
        tracing::warn!(
            found = phylo_columns.len(),
            expected = phylo_dimensions,
            "plants table has fewer phylogenetic eigenvector columns than configured"
        );
    }

    let mut species = FxHashMap::default();
    let mut invalid_strategies = Vec::new();

    for idx in 0..df.height() {
        let Some(id) = ids.get(idx) else {
            continue;
        };

        let height_m = checked_height(id, heights.get(idx))?;

        let climate_value = |column: &Float64Chunked, name: &str| -> Result<f64> {
            column
                .get(idx)
                .filter(|v| v.is_finite())
                .with_context(|| format!("Plant '{}' has no {}", id, name))
        };

        let precipitation = match (value_at(&precip_min, idx), value_at(&precip_max, idx)) {
            (Some(min), Some(max)) => Some(ClimateRange::new(min, max)),
            _ => None,
        };

        let embedding: Option<Vec<f64>> = if phylo_columns.is_empty() {
            None
        } else {
            phylo_columns.iter().map(|c| c.get(idx)).collect()
        };

        let components = (value_at(&csr_c, idx), value_at(&csr_s, idx), value_at(&csr_r, idx));
        let strategy = CsrStrategy::from_components(components.0, components.1, components.2);
        if strategy.is_none() && components.0.is_some() && components.1.is_some() && components.2.is_some() {
            invalid_strategies.push(id.to_string());
        }

        let attributes = SpeciesAttributes {
            id: id.to_string(),
            strategy,
            height_m,
            growth_form: GrowthForm::parse(growth_forms.get(idx).unwrap_or("")),
            light_preference: value_at(&light_prefs, idx),
            nitrogen_fixation: nitrogen[idx],
            soil_ph_mean: value_at(&soil_ph, idx),
            phylo_embedding: embedding,
            climate: ClimateEnvelope {
                temperature: ClimateRange::new(
                    climate_value(&temp_min, "temp_annual_min")?,
                    climate_value(&temp_max, "temp_annual_max")?,
                ),
                winter_hardiness: ClimateRange::new(
                    climate_value(&coldest_min, "temp_coldest_min")?,
                    climate_value(&coldest_max, "temp_coldest_max")?,
                ),
                precipitation,
                stress: StressExposure {
                    drought: value_at(&drought, idx),
                    frost: value_at(&frost, idx),
                    heat: value_at(&heat, idx),
                    cold_spell: value_at(&cold_spell, idx),
                },
            },
        };

        if species.insert(id.to_string(), attributes).is_some() {
            bail!("Duplicate plant row for '{}'", id);
        }
    }

    if !invalid_strategies.is_empty() {
        tracing::warn!(
            count = invalid_strategies.len(),
            species = ?invalid_strategies,
            "CSR components are not a percentage split; strategy treated as missing"
        );
    }

    Ok(species)
}

/// An organism column, cast once to string or list-of-string form
enum OrganismColumn {
    Lists(ListChunked),
    Strings(StringChunked),
}

/// String, all-null or integer identifiers
fn is_identifier_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Null) || dtype.is_integer()
}

impl OrganismColumn {
    fn new(column: &Column) -> Result<Self> {
        let name = column.name();
        match column.dtype() {
            DataType::List(inner) if is_identifier_dtype(inner) => {
                let cast = column
                    .cast(&DataType::List(Box::new(DataType::String)))
                    .with_context(|| format!("Column '{}' cannot be read as organism lists", name))?;
                Ok(OrganismColumn::Lists(cast.list()?.clone()))
            }
            dtype if is_identifier_dtype(dtype) => {
                let cast = column
                    .cast(&DataType::String)
                    .with_context(|| format!("Column '{}' cannot be read as organism IDs", name))?;
                Ok(OrganismColumn::Strings(cast.str()?.clone()))
            }
            other => bail!(
                "Column '{}' has type {}; expected organism IDs as strings, integers or lists",
                name,
                other
            ),
        }
    }

    /// Organisms listed in one cell
    fn organisms_at(&self, idx: usize) -> FxHashSet<String> {
        let mut organisms = FxHashSet::default();

        match self {
            OrganismColumn::Lists(lists) => {
                if let Some(items) = lists.get_as_series(idx) {
                    if let Ok(items) = items.str() {
                        for org in items.into_iter().flatten().map(str::trim) {
                            if !org.is_empty() {
                                organisms.insert(org.to_string());
                            }
                        }
                    }
                }
            }
            OrganismColumn::Strings(values) => {
                if let Some(value) = values.get(idx) {
                    for org in value.split('|').map(str::trim).filter(|s| !s.is_empty()) {
                        organisms.insert(org.to_string());
                    }
                }
            }
        }

        organisms
    }
}

fn parse_relationships(
    df: &DataFrame,
    columns: &[&str],
    relationships: &mut FxHashMap<String, RelationshipSets>,
) -> Result<()> {
    let ids = string_column(df, "plant_wfo_id")?;

    let mut present = Vec::with_capacity(columns.len());
    for &name in columns {
        if let Ok(column) = df.column(name) {
            present.push((name, OrganismColumn::new(column)?));
        }
    }

    for idx in 0..df.height() {
        let Some(id) = ids.get(idx) else {
            continue;
        };
        let sets = relationships.entry(id.to_string()).or_default();

        for (name, column) in &present {
            let organisms = column.organisms_at(idx);
            let target = match *name {
                "herbivores" => &mut sets.herbivores,
                "pollinators" => &mut sets.pollinators,
                "flower_visitors" => &mut sets.flower_visitors,
                "predators" => &mut sets.predators,
                "pathogenic_fungi" => &mut sets.pathogenic_fungi,
                "pathogenic_fungi_host_specific" => &mut sets.host_specific_pathogens,
                "amf_fungi" => &mut sets.amf_fungi,
                "emf_fungi" => &mut sets.emf_fungi,
                "endophytic_fungi" => &mut sets.endophytic_fungi,
                "saprotrophic_fungi" => &mut sets.saprotrophic_fungi,
                "mycoparasite_fungi" => &mut sets.mycoparasite_fungi,
                "entomopathogenic_fungi" => &mut sets.entomopathogenic_fungi,
                other => bail!("Unknown relationship column '{}'", other),
            };
            target.extend(organisms);
        }
    }

    Ok(())
}

/// Key → pipe-separated values, e.g. herbivore_id → "predator1|predator2"
fn parse_lookup(df: &DataFrame, key_col: &str, value_col: &str) -> Result<Lookup> {
    let keys = string_column(df, key_col)?;
    let values = OrganismColumn::new(
        df.column(value_col)
            .with_context(|| format!("Column '{}' not found", value_col))?,
    )?;

    let mut map: Lookup = FxHashMap::default();
    for idx in 0..df.height() {
        if let Some(key) = keys.get(idx) {
            let entries = values.organisms_at(idx);
            if !entries.is_empty() {
                map.entry(key.to_string()).or_default().extend(entries);
            }
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nitrogen_flag() {
        assert!(parse_nitrogen_flag("Yes"));
        assert!(parse_nitrogen_flag("High"));
        assert!(parse_nitrogen_flag("moderate-high"));
        assert!(parse_nitrogen_flag("1"));
        assert!(!parse_nitrogen_flag("No"));
        assert!(!parse_nitrogen_flag("Low"));
        assert!(!parse_nitrogen_flag(""));
    }

    #[test]
    fn test_pipe_separated_cells() {
        let df = df! {
            "plant_wfo_id" => ["p1", "p2"],
            "herbivores" => [Some("aphid|beetle| |moth"), None],
        }
        .unwrap();

        let mut relationships = FxHashMap::default();
        parse_relationships(&df, &ORGANISM_COLUMNS, &mut relationships).unwrap();

        assert_eq!(relationships["p1"].herbivores.len(), 3);
        assert!(relationships["p1"].herbivores.contains("moth"));
        assert!(relationships["p2"].herbivores.is_empty());
        // Missing optional columns leave sets empty
        assert!(relationships["p1"].predators.is_empty());
    }

    #[test]
    fn test_missing_relationship_record_is_empty() {
        let data = GuildDataBuilder::new().build().unwrap();
        assert!(data.relationships("unknown").herbivores.is_empty());
        assert!(data.attributes("unknown").is_none());
    }

    #[test]
    fn test_builder_merges_lookup_entries() {
        let data = GuildDataBuilder::new()
            .herbivore_predators("aphid", ["ladybird"])
            .herbivore_predators("aphid", ["lacewing"])
            .build().unwrap();

        assert_eq!(data.lookups().herbivore_predators["aphid"].len(), 2);
    }

    #[test]
    fn test_integer_identifier_cells() {
        let df = df! {
            "plant_wfo_id" => ["p1", "p2"],
            "herbivores" => [Some(12345i64), None],
        }
        .unwrap();

        let mut relationships = FxHashMap::default();
        parse_relationships(&df, &ORGANISM_COLUMNS, &mut relationships).unwrap();

        assert!(relationships["p1"].herbivores.contains("12345"));
        assert!(relationships["p2"].herbivores.is_empty());
    }

    #[test]
    fn test_non_identifier_column_rejected() {
        let df = df! {
            "plant_wfo_id" => ["p1"],
            "pollinators" => [0.5],
        }
        .unwrap();

        let mut relationships = FxHashMap::default();
        let err = parse_relationships(&df, &ORGANISM_COLUMNS, &mut relationships).unwrap_err();
        assert!(err.to_string().contains("pollinators"));
    }

    fn record(id: &str, height_m: f64) -> SpeciesAttributes {
        SpeciesAttributes {
            id: id.to_string(),
            strategy: None,
            height_m,
            growth_form: GrowthForm::Herb,
            light_preference: None,
            nitrogen_fixation: false,
            soil_ph_mean: None,
            phylo_embedding: None,
            climate: ClimateEnvelope {
                temperature: ClimateRange::new(5.0, 20.0),
                winter_hardiness: ClimateRange::new(-10.0, 0.0),
                precipitation: None,
                stress: StressExposure::default(),
            },
        }
    }

    #[test]
    fn test_builder_rejects_invalid_height() {
        assert!(GuildDataBuilder::new().species(record("nan", f64::NAN)).build().is_err());
        assert!(GuildDataBuilder::new().species(record("flat", 0.0)).build().is_err());
        assert!(GuildDataBuilder::new().species(record("ok", 0.3)).build().is_ok());
    }

    #[test]
    fn test_builder_drops_invalid_strategy() {
        let mut inflated = record("inflated", 1.0);
        inflated.strategy = Some(CsrStrategy { c: 90.0, s: 90.0, r: 90.0 });
        let mut valid = record("valid", 1.0);
        valid.strategy = Some(CsrStrategy { c: 70.0, s: 20.0, r: 10.0 });

        let data = GuildDataBuilder::new().species(inflated).species(valid).build().unwrap();

        assert!(data.attributes("inflated").unwrap().strategy.is_none());
        assert!(data.attributes("valid").unwrap().strategy.is_some());
    }
}
