use std::fs;
use std::path::Path;

use chainconf_tools::config::ConfigInputs;
use chainconf_tools::extensions::{
    load_extensions, DirectorySource, ExtensionError, ExtensionSource,
};
use chainconf_tools::{Network, TaskRegistry};
use tempfile::TempDir;

fn write_task(dir: &Path, file: &str, name: &str) {
    let body = format!(
        "name = \"{name}\"\ndescription = \"{name} task\"\nprogram = \"true\"\nnetwork = \"sepolia\"\n"
    );
    fs::write(dir.join(file), body).unwrap();
}

fn tasks_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_task(dir.path(), "verify.toml", "verify");
    write_task(dir.path(), "deploy.toml", "deploy");
    write_task(dir.path(), "accounts.toml", "accounts");
    fs::write(dir.path().join("README.md"), "not a task").unwrap();
    fs::write(dir.path().join("notes.toml.bak"), "garbage =").unwrap();
    fs::create_dir(dir.path().join("nested.toml")).unwrap();
    dir
}

fn inputs_with_skip(value: Option<&str>) -> ConfigInputs {
    let value = value.map(str::to_string);
    ConfigInputs::from_lookup(move |name| {
        if name == "SKIP_LOAD" {
            value.clone()
        } else {
            None
        }
    })
}

#[test]
fn loads_every_manifest_once_in_name_order() {
    let dir = tasks_dir();
    let source = DirectorySource::new(dir.path());
    let mut registry = TaskRegistry::new();

    let loaded = load_extensions(&source, false, &mut registry).unwrap();

    assert_eq!(loaded, 3);
    let names: Vec<&str> = registry.iter().map(|t| t.manifest.name.as_str()).collect();
    assert_eq!(names, vec!["accounts", "deploy", "verify"]);
    let deploy = registry.get("deploy").unwrap();
    assert_eq!(deploy.origin, "deploy.toml");
    assert_eq!(deploy.manifest.network, Some(Network::Sepolia));
}

#[test]
fn skip_flag_true_loads_nothing() {
    let dir = tasks_dir();
    let inputs = inputs_with_skip(Some("true"));
    let mut registry = TaskRegistry::new();

    let loaded =
        load_extensions(&DirectorySource::new(dir.path()), inputs.skip_load, &mut registry)
            .unwrap();

    assert_eq!(loaded, 0);
    assert!(registry.is_empty());
}

#[test]
fn other_skip_values_load_everything() {
    let dir = tasks_dir();
    for value in [None, Some("false"), Some("True"), Some("1")] {
        let inputs = inputs_with_skip(value);
        let mut registry = TaskRegistry::new();
        let loaded =
            load_extensions(&DirectorySource::new(dir.path()), inputs.skip_load, &mut registry)
                .unwrap();
        assert_eq!(loaded, 3, "SKIP_LOAD={value:?}");
    }
}

#[test]
fn discovery_is_restartable() {
    let dir = tasks_dir();
    let source = DirectorySource::new(dir.path());
    let first = source.discover().unwrap();
    let second = source.discover().unwrap();
    assert_eq!(first, second);

    write_task(dir.path(), "balance.toml", "balance");
    let third = source.discover().unwrap();
    assert_eq!(third.len(), 4);
    assert_eq!(third[1].id, "balance.toml");
}

#[test]
fn custom_suffix() {
    let dir = tasks_dir();
    fs::write(
        dir.path().join("extra.task"),
        "name = \"extra\"\nprogram = \"true\"\n",
    )
    .unwrap();
    let source = DirectorySource::new(dir.path()).with_suffix(".task");
    let ids: Vec<String> = source.discover().unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["extra.task"]);
}

#[test]
fn malformed_manifest_aborts_loading() {
    let dir = tasks_dir();
    fs::write(dir.path().join("broken.toml"), "name = \"broken\"\nprogram = ").unwrap();
    let mut registry = TaskRegistry::new();

    let err = load_extensions(&DirectorySource::new(dir.path()), false, &mut registry)
        .unwrap_err();

    assert!(matches!(err, ExtensionError::Parse { ref id, .. } if id == "broken.toml"));
}

#[test]
fn duplicate_task_names_abort_loading() {
    let dir = tasks_dir();
    write_task(dir.path(), "zz-deploy.toml", "deploy");
    let mut registry = TaskRegistry::new();

    let err = load_extensions(&DirectorySource::new(dir.path()), false, &mut registry)
        .unwrap_err();

    assert!(matches!(
        err,
        ExtensionError::DuplicateTask { ref existing, .. } if existing == "deploy.toml"
    ));
}

#[test]
fn missing_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("tasks");
    let mut registry = TaskRegistry::new();

    let err = load_extensions(&DirectorySource::new(&missing), false, &mut registry).unwrap_err();

    assert!(matches!(err, ExtensionError::Discover { ref path, .. } if path == &missing));
}

#[cfg(unix)]
#[test]
fn symlinked_manifests_are_loaded() {
    let shared = TempDir::new().unwrap();
    write_task(shared.path(), "deploy.toml", "deploy");
    let dir = TempDir::new().unwrap();
    std::os::unix::fs::symlink(shared.path().join("deploy.toml"), dir.path().join("deploy.toml"))
        .unwrap();
    let mut registry = TaskRegistry::new();

    let loaded = load_extensions(&DirectorySource::new(dir.path()), false, &mut registry).unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(registry.get("deploy").unwrap().origin, "deploy.toml");
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_fatal() {
    let dir = TempDir::new().unwrap();
    let link = dir.path().join("gone.toml");
    std::os::unix::fs::symlink(dir.path().join("missing-target.toml"), &link).unwrap();
    let mut registry = TaskRegistry::new();

    let err = load_extensions(&DirectorySource::new(dir.path()), false, &mut registry).unwrap_err();

    assert!(matches!(err, ExtensionError::Discover { ref path, .. } if path == &link));
}
