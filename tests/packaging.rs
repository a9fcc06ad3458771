use flutter_app_bundler::bundler::{
    BuildFlags, Environment, Error, PackageType, Profile,
    environment::ENGINE_FRAMEWORK,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

const FIXTURE_MANIFEST: &str = include_str!("fixtures/Cargo.toml");

/// `<root>/app/rust` holding only the fixture manifest.
fn bare_project(root: &Path) -> PathBuf {
    let project = root.join("app").join("rust");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("Cargo.toml"), FIXTURE_MANIFEST).unwrap();
    project
}

/// Adds every input the app bundle needs.
fn complete_project(root: &Path) -> PathBuf {
    let project = bare_project(root);

    fs::create_dir_all(project.join("assets")).unwrap();
    fs::write(project.join("assets/icon.icns"), "icns").unwrap();
    fs::write(project.join("assets/icudtl.dat"), "icu").unwrap();

    let output = project.join("target/release");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("flutter-demo"), "binary v1").unwrap();

    let framework = project
        .join("target/flutter-engine/1.12.13")
        .join(ENGINE_FRAMEWORK);
    fs::create_dir_all(framework.join("Versions/A")).unwrap();
    fs::write(framework.join("Versions/A/FlutterEmbedder"), "engine").unwrap();

    let assets = root.join("app/build/flutter_assets");
    fs::create_dir_all(&assets).unwrap();
    fs::write(assets.join("AssetManifest.json"), "{}").unwrap();
    fs::write(assets.join("kernel_blob.bin"), "kernel v1").unwrap();

    project
}

fn release_env(project: &Path) -> Environment {
    Environment::discover(&BuildFlags::new(project).profile(Profile::Release)).unwrap()
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

#[test]
fn prepare_never_mutates_its_input() {
    let tmp = tempfile::tempdir().unwrap();
    let env = release_env(&bare_project(tmp.path()));
    let snapshot = env.clone();

    for package_type in PackageType::ALL {
        let prepared = package_type.prepare(&env);
        assert_eq!(env, snapshot, "{package_type} changed its input");
        assert_ne!(prepared, env, "{package_type} derived nothing");
    }
}

#[tokio::test]
async fn build_without_prepare_is_a_missing_prerequisite() {
    let tmp = tempfile::tempdir().unwrap();
    let env = release_env(&complete_project(tmp.path()));

    for package_type in PackageType::ALL {
        let err = package_type.build(&env).await.unwrap_err();
        assert!(
            matches!(err, Error::PrerequisiteMissing { .. }),
            "{package_type}: {err:?}"
        );
    }
    assert_eq!(files_under(env.output_dir()), vec![PathBuf::from("flutter-demo")]);
}

#[tokio::test]
async fn missing_prerequisites_write_no_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let env = release_env(&bare_project(tmp.path()));

    for package_type in PackageType::ALL {
        let prepared = package_type.prepare(&env);
        let err = package_type.build(&prepared).await.unwrap_err();
        assert!(
            matches!(err, Error::PrerequisiteMissing { .. }),
            "{package_type}: {err:?}"
        );
    }
    assert!(!env.output_dir().exists());
}

#[tokio::test]
async fn app_bundle_rebuild_contains_only_second_run() {
    let tmp = tempfile::tempdir().unwrap();
    let project = complete_project(tmp.path());
    let env = release_env(&project);
    let prepared = PackageType::AppBundle.prepare(&env);

    let first = PackageType::AppBundle.build(&prepared).await.unwrap();
    assert_eq!(first.path, env.output_dir().join("flutter-demo.app"));
    let first_files = files_under(&first.path);
    assert!(first_files.contains(&PathBuf::from("Contents/Resources/flutter_assets/kernel_blob.bin")));

    let assets = tmp.path().join("app/build/flutter_assets");
    fs::remove_file(assets.join("kernel_blob.bin")).unwrap();
    fs::write(assets.join("isolate_snapshot_data"), "snapshot v2").unwrap();
    fs::write(env.binary_path(), "binary v2").unwrap();

    let second = PackageType::AppBundle.build(&prepared).await.unwrap();
    assert_eq!(second.path, first.path);
    assert_ne!(second.checksum, first.checksum);

    let second_files = files_under(&second.path);
    assert!(!second_files.contains(&PathBuf::from("Contents/Resources/flutter_assets/kernel_blob.bin")));
    assert!(second_files.contains(&PathBuf::from("Contents/Resources/flutter_assets/isolate_snapshot_data")));
    assert_eq!(
        fs::read_to_string(second.path.join("Contents/MacOS/flutter-demo")).unwrap(),
        "binary v2"
    );

    let plist = fs::read_to_string(second.path.join("Contents/Info.plist")).unwrap();
    assert!(plist.contains("com.example.flutter-demo"));
}

#[tokio::test]
async fn dmg_requires_the_app_bundle() {
    let tmp = tempfile::tempdir().unwrap();
    let env = release_env(&complete_project(tmp.path()));
    let prepared = PackageType::Dmg.prepare(&env);

    let err = PackageType::Dmg.build(&prepared).await.unwrap_err();
    match err {
        Error::PrerequisiteMissing { path, .. } => {
            assert_eq!(path, env.output_dir().join("flutter-demo.app"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!env.output_dir().join("flutter-demo.dmg").exists());
}
