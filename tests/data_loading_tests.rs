// Data Loading Tests
//
// Purpose: parse in-memory Polars frames (and a CSV round trip through a
// temp directory) into the attribute and relationship stores.
// Run with: cargo test --test data_loading_tests

use approx::assert_relative_eq;
use guild_scorer_engine::{
    DataPaths, GrowthForm, GuildData, GuildScorer, GuildWarning, NegativeFactor,
};
use polars::prelude::*;
use std::fs;

fn plants_frame() -> DataFrame {
    df! {
        "wfo_taxon_id" => ["wfo-1", "wfo-2", "wfo-3"],
        "CSR_C" => [Some(65.0), Some(20.0), None],
        "CSR_S" => [Some(20.0), Some(20.0), None],
        "CSR_R" => [Some(15.0), Some(60.0), None],
        "height_m" => [12.0, 0.4, 2.5],
        "growth_form" => ["tree", "herb", "shrub/tree"],
        "light_pref" => [Some(0.6), Some(-0.7), None],
        "nitrogen_fixation" => ["No", "High", "Yes"],
        "soil_ph_mean" => [Some(6.2), Some(7.0), None],
        "phylo_ev1" => [Some(0.1), Some(-0.4), None],
        "phylo_ev2" => [Some(0.3), Some(0.2), Some(0.5)],
        "temp_annual_min" => [4.0, 6.0, 5.0],
        "temp_annual_max" => [18.0, 22.0, 19.0],
        "temp_coldest_min" => [-20.0, -8.0, -12.0],
        "temp_coldest_max" => [-2.0, 2.0, 0.0],
        "drought_days" => [Some(30.0), Some(110.0), None],
    }
    .unwrap()
}

fn organisms_frame() -> DataFrame {
    df! {
        "plant_wfo_id" => ["wfo-1", "wfo-2"],
        "herbivores" => [Some("aphid|moth"), Some("aphid")],
        "pollinators" => [Some("bee"), None],
        "flower_visitors" => [None::<&str>, Some("bee|hoverfly")],
    }
    .unwrap()
}

fn fungi_frame() -> DataFrame {
    df! {
        "plant_wfo_id" => ["wfo-1", "wfo-3"],
        "pathogenic_fungi" => ["venturia|nectria", "nectria"],
        "pathogenic_fungi_host_specific" => ["venturia", ""],
        "amf_fungi" => ["", "glomus"],
        "emf_fungi" => ["tuber", ""],
        "endophytic_fungi" => ["", ""],
        "saprotrophic_fungi" => ["", ""],
        "mycoparasite_fungi" => ["", "trichoderma"],
        "entomopathogenic_fungi" => ["", "beauveria"],
    }
    .unwrap()
}

fn lookup_frames() -> (DataFrame, DataFrame, DataFrame) {
    (
        df! {
            "herbivore" => ["aphid", "moth"],
            "predators" => ["ladybird|hoverfly", "bat"],
        }
        .unwrap(),
        df! {
            "herbivore" => ["aphid"],
            "entomopathogenic_fungi" => ["beauveria"],
        }
        .unwrap(),
        df! {
            "pathogen" => ["nectria"],
            "antagonists" => ["trichoderma"],
        }
        .unwrap(),
    )
}

fn load_from_frames() -> GuildData {
    let (predators, parasites, antagonists) = lookup_frames();
    GuildData::from_frames(
        &plants_frame(),
        &organisms_frame(),
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    )
    .unwrap()
}

#[test]
fn test_attribute_store_parsing() {
    let data = load_from_frames();
    assert_eq!(data.species_count(), 3);

    let oak = data.attributes("wfo-1").unwrap();
    let strategy = oak.strategy.unwrap();
    assert_relative_eq!(strategy.c, 65.0);
    assert_eq!(oak.growth_form, GrowthForm::Tree);
    assert!(!oak.nitrogen_fixation);
    assert_eq!(oak.phylo_embedding, Some(vec![0.1, 0.3]));
    assert_relative_eq!(oak.climate.winter_hardiness.min, -20.0);
    assert_eq!(oak.climate.stress.drought, Some(30.0));
    assert!(oak.climate.precipitation.is_none());

    let herb = data.attributes("wfo-2").unwrap();
    assert!(herb.nitrogen_fixation);
    assert_eq!(herb.light_preference, Some(-0.7));

    // Null CSR triple is absent, never zero
    let shrub = data.attributes("wfo-3").unwrap();
    assert!(shrub.strategy.is_none());
    assert_eq!(shrub.growth_form, GrowthForm::Tree);
    assert!(shrub.soil_ph_mean.is_none());
    assert!(shrub.phylo_embedding.is_none());
    assert!(shrub.climate.stress.drought.is_none());
}

#[test]
fn test_relationship_store_parsing() {
    let data = load_from_frames();

    let oak = data.relationships("wfo-1");
    assert_eq!(oak.herbivores.len(), 2);
    assert!(oak.pollinators.contains("bee"));
    assert!(oak.host_specific_pathogens.contains("venturia"));
    assert!(oak.emf_fungi.contains("tuber"));
    assert!(oak.amf_fungi.is_empty());

    let herb = data.relationships("wfo-2");
    assert_eq!(herb.flower_visitors.len(), 2);
    assert!(herb.pathogenic_fungi.is_empty());

    let shrub = data.relationships("wfo-3");
    assert!(shrub.herbivores.is_empty());
    assert!(shrub.mycoparasite_fungi.contains("trichoderma"));

    let lookups = data.lookups();
    assert_eq!(lookups.herbivore_predators["aphid"].len(), 2);
    assert!(lookups.insect_parasites["aphid"].contains("beauveria"));
    assert!(lookups.pathogen_antagonists["nectria"].contains("trichoderma"));
}

#[test]
fn test_list_columns_accepted() {
    let herbivores = Series::new(
        "herbivores".into(),
        &[
            Series::new("".into(), ["aphid", "moth"]),
            Series::new("".into(), ["aphid"]),
        ],
    );
    let mut organisms = df! { "plant_wfo_id" => ["wfo-1", "wfo-2"] }.unwrap();
    organisms.with_column(herbivores).unwrap();

    let (predators, parasites, antagonists) = lookup_frames();
    let data = GuildData::from_frames(
        &plants_frame(),
        &organisms,
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    )
    .unwrap();

    assert_eq!(data.relationships("wfo-1").herbivores.len(), 2);
    assert!(data.relationships("wfo-2").herbivores.contains("aphid"));
}

#[test]
fn test_numeric_organism_ids_kept() {
    let organisms = df! {
        "plant_wfo_id" => ["wfo-1", "wfo-2"],
        "herbivores" => [12345i64, 12345i64],
    }
    .unwrap();
    let predators = df! {
        "herbivore" => [12345i64],
        "predators" => [777i64],
    }
    .unwrap();
    let (_, parasites, antagonists) = lookup_frames();

    let data = GuildData::from_frames(
        &plants_frame(),
        &organisms,
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    )
    .unwrap();

    assert!(data.relationships("wfo-1").herbivores.contains("12345"));
    assert!(data.relationships("wfo-2").herbivores.contains("12345"));
    assert!(data.lookups().herbivore_predators["12345"].contains("777"));

    // The shared pest now registers as herbivore overlap
    let scorer = GuildScorer::with_defaults(data).unwrap();
    let raw = scorer.compute_raw_scores(&["wfo-1", "wfo-2"]).unwrap();
    assert_relative_eq!(raw.n2_herbivore_overlap, 0.5, epsilon = 1e-12);
}

#[test]
fn test_unreadable_organism_column_is_an_error() {
    let organisms = df! {
        "plant_wfo_id" => ["wfo-1", "wfo-2"],
        "herbivores" => [true, false],
    }
    .unwrap();
    let (predators, parasites, antagonists) = lookup_frames();

    let err = GuildData::from_frames(
        &plants_frame(),
        &organisms,
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("herbivores"));
}

#[test]
fn test_csr_triple_off_percentage_treated_as_missing() {
    let plants = df! {
        "wfo_taxon_id" => ["wfo-1", "wfo-2"],
        "CSR_C" => [90.0, 70.0],
        "CSR_S" => [90.0, 20.0],
        "CSR_R" => [90.0, 10.0],
        "height_m" => [1.0, 1.0],
        "growth_form" => ["herb", "herb"],
        "temp_annual_min" => [4.0, 4.0],
        "temp_annual_max" => [18.0, 18.0],
        "temp_coldest_min" => [-5.0, -5.0],
        "temp_coldest_max" => [0.0, 0.0],
    }
    .unwrap();
    let (predators, parasites, antagonists) = lookup_frames();

    let data = GuildData::from_frames(
        &plants,
        &organisms_frame(),
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    )
    .unwrap();

    assert!(data.attributes("wfo-1").unwrap().strategy.is_none());
    assert!(data.attributes("wfo-2").unwrap().strategy.is_some());

    let scorer = GuildScorer::with_defaults(data).unwrap();
    let breakdown = scorer.score_guild(&["wfo-1", "wfo-2"]).unwrap();
    assert!(breakdown
        .warnings
        .contains(&GuildWarning::MissingStrategy { species: vec!["wfo-1".to_string()] }));
    assert_eq!(breakdown.negative_score(NegativeFactor::StrategyConflict), Some(0.0));
}

#[test]
fn test_duplicate_plant_rows_rejected() {
    let plants = df! {
        "wfo_taxon_id" => ["wfo-1", "wfo-1"],
        "height_m" => [1.0, 1.0],
        "growth_form" => ["herb", "herb"],
        "temp_annual_min" => [4.0, 4.0],
        "temp_annual_max" => [18.0, 18.0],
        "temp_coldest_min" => [-5.0, -5.0],
        "temp_coldest_max" => [0.0, 0.0],
    }
    .unwrap();
    let (predators, parasites, antagonists) = lookup_frames();

    let result = GuildData::from_frames(
        &plants,
        &organisms_frame(),
        &fungi_frame(),
        &predators,
        &parasites,
        &antagonists,
        2,
    );
    assert!(result.is_err());
}

#[test]
fn test_csv_files_score_end_to_end() {
    let dir = std::env::temp_dir().join(format!("guild_scorer_csv_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let paths = DataPaths::in_dir(&dir);

    let (predators, parasites, antagonists) = lookup_frames();
    let frames = [
        (&paths.plants, plants_frame()),
        (&paths.organisms, organisms_frame()),
        (&paths.fungi, fungi_frame()),
        (&paths.herbivore_predators, predators),
        (&paths.insect_parasites, parasites),
        (&paths.pathogen_antagonists, antagonists),
    ];
    for (path, mut frame) in frames {
        let mut file = fs::File::create(path).unwrap();
        CsvWriter::new(&mut file).finish(&mut frame).unwrap();
    }

    let data = GuildData::load(&paths, 2).unwrap();
    assert_eq!(data.species_count(), 3);
    assert!(data.relationships("wfo-1").herbivores.contains("moth"));

    let scorer = GuildScorer::with_defaults(data).unwrap();
    let breakdown = scorer.score_guild(&["wfo-1", "wfo-2", "wfo-3"]).unwrap();
    assert!(!breakdown.is_vetoed());

    fs::remove_dir_all(&dir).ok();
}
