use std::{fs, path::PathBuf};

use tempfile::tempdir;

use foundry::canvas::Canvas;
use foundry_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo canvases live at the workspace root
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: &PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        orientation: None,
        spacing: None,
        no_organize: false,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_json_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir
            .path()
            .join(demo_path.file_name().unwrap());

        if let Err(e) = run(&args_for(demo_path, &output_path)) {
            failed_demos.push((demo_path.clone(), e.to_string()));
            continue;
        }

        let written = fs::read_to_string(&output_path).expect("output was written");
        let canvas: Canvas = serde_json::from_str(&written).expect("output is a canvas");
        if canvas.bounds().is_none() {
            failed_demos.push((demo_path.clone(), "canvas has no bounds".to_string()));
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_json_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir
            .path()
            .join(format!("error_{}", demo_path.file_name().unwrap().to_string_lossy()));

        if run(&args_for(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_layout_is_deterministic() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("plant.json");
    let first = temp_dir.path().join("first.json");
    let second = temp_dir.path().join("second.json");

    run(&args_for(&input, &first)).unwrap();
    run(&args_for(&input, &second)).unwrap();

    assert_eq!(
        fs::read_to_string(first).unwrap(),
        fs::read_to_string(second).unwrap()
    );
}

#[test]
fn e2e_row_layout_override() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("chain.json");
    let output = temp_dir.path().join("rows.json");

    let mut args = args_for(&input, &output);
    args.no_organize = true;
    run(&args).unwrap();

    let canvas: Canvas = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    let first = canvas.nodes().next().expect("demo has nodes");
    assert_eq!(first.position().x(), 80.0);
    assert_eq!(first.position().y(), 130.0);
}
