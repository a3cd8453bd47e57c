use std::fs;

use biosim::{scenario::ScenarioLoader, SimError, Species};
use tempfile::tempdir;

#[test]
fn bundled_scenario_runs_with_hook() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader
        .load("scenarios/small_island.yaml")
        .expect("scenario should load");
    let mut engine = scenario.build_engine().expect("engine builds");
    assert!(engine.num_animals_per_species().unwrap().get(Species::Carnivore) > 0);

    let mut years = Vec::new();
    engine
        .run_with_hook(6, |snapshot| years.push(snapshot.year))
        .expect("run succeeds");
    assert_eq!(years, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(scenario.years(None), 60);
}

#[test]
fn unknown_parameter_keys_are_rejected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("bad.yaml");
    fs::write(
        &path,
        "name: bad\nseed: 1\nmap: \"OOO\\nOJO\\nOOO\"\nspecies:\n  Herbivore:\n    wings: 2.0\n",
    )
    .unwrap();
    let err = ScenarioLoader::new(temp.path())
        .load("bad.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("wings"));
}

#[test]
fn invalid_scenario_values_surface_as_simulation_errors() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("alpha.yaml"),
        "name: alpha\nseed: 1\nmap: \"OOO\\nOSO\\nOOO\"\nlandscapes:\n  S:\n    alpha: 1.5\n",
    )
    .unwrap();
    let scenario = ScenarioLoader::new(temp.path())
        .load("alpha.yaml")
        .expect("parses");
    assert!(matches!(
        scenario.build_engine(),
        Err(SimError::Configuration(_))
    ));
}

#[test]
fn missing_file_has_context() {
    let temp = tempdir().expect("tempdir");
    let err = ScenarioLoader::new(temp.path())
        .load("nope.yaml")
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read scenario file"));
}
