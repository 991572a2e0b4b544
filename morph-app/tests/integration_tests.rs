use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::fs;
#[cfg(feature = "hdf5")]
use std::path::Path;
use std::process::Command; // Run programs
use tempfile::tempdir; // Create temporary directories for testing

#[cfg(feature = "hdf5")]
const KPC: f64 = 3.085_677_581_491_367e19;

// Writes a 4x4x8 snapshot split into 2x2x2 sub-grids.
#[cfg(feature = "hdf5")]
fn create_snapshot(dir: &Path, time: u32) -> std::path::PathBuf {
    use hdf5::types::VarLenUnicode;

    let path = dir.join(format!("disc_patch_reference_{time:03}.hdf5"));
    let n = 4 * 4 * 8;
    let file = hdf5::File::create(&path).expect("Failed to create snapshot");

    let header = file.create_group("Header").unwrap();
    header
        .new_attr::<f64>()
        .shape([3])
        .create("BoxSize")
        .unwrap()
        .write_raw(&[KPC, KPC, 2.0 * KPC])
        .unwrap();

    let parameters = file.create_group("Parameters").unwrap();
    for (name, value) in [
        ("DensityGrid:number of cells", "[4, 4, 8]"),
        ("DensitySubGridCreator:number of subgrids", "[2, 2, 2]"),
    ] {
        let value: VarLenUnicode = value.parse().unwrap();
        parameters
            .new_attr::<VarLenUnicode>()
            .create(name)
            .unwrap()
            .write_scalar(&value)
            .unwrap();
    }

    let gas = file.create_group("PartType0").unwrap();
    let velocities: Vec<f64> = (0..n)
        .flat_map(|i| [0.0, 0.0, (i as f64 - 64.0) * 1.0e3])
        .collect();
    gas.new_dataset::<f64>()
        .shape([n, 3])
        .create("Velocities")
        .unwrap()
        .write_raw(&velocities)
        .unwrap();
    let temperature: Vec<f64> = (0..n).map(|i| 1.0e4 + (time as f64) * 100.0 + i as f64).collect();
    for (name, values) in [
        ("Temperature", temperature),
        ("NumberDensity", vec![1.0e6; n]),
        ("NeutralFractionH", vec![0.5; n]),
    ] {
        gas.new_dataset::<f64>()
            .shape([n])
            .create(name)
            .unwrap()
            .write_raw(&values)
            .unwrap();
    }
    path
}

#[cfg(feature = "hdf5")]
#[test]
fn test_terminal_run_with_stats() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let series = tmp_dir.path().join("run_a");
    fs::create_dir(&series)?;
    create_snapshot(&series, 0);
    create_snapshot(&series, 1);
    let stats = tmp_dir.path().join("stats.csv");

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.env("RUST_LOG", "info").env("NO_COLOR", "1");
    cmd.arg("--snapshot-dir")
        .arg(&series)
        .arg("--start")
        .arg("0")
        .arg("--end")
        .arg("1")
        .arg("--renderer")
        .arg("terminal")
        .arg("--stats-csv")
        .arg(&stats);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 Myr"))
        .stdout(predicate::str::contains("1 Myr"))
        .stdout(predicate::str::contains("Temp (K)"))
        .stdout(predicate::str::contains("2 frames rendered"));

    let text = fs::read_to_string(&stats)?;
    let lines: Vec<&str> = text.lines().collect();
    // header + 2 frames x 4 panels
    assert_eq!(lines.len(), 9);
    assert!(lines[1].starts_with("run_a,0,temperature,4,8,"));
    assert!(text.contains("velocity_z"));
    Ok(())
}

#[cfg(feature = "hdf5")]
#[test]
fn test_slice_mode_with_resolution() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    create_snapshot(tmp_dir.path(), 0);
    let stats = tmp_dir.path().join("stats.csv");

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d")
        .arg(tmp_dir.path())
        .arg("--end")
        .arg("0")
        .arg("--image-mode")
        .arg("slice")
        .arg("--resolution")
        .arg("2x3")
        .arg("--renderer")
        .arg("terminal")
        .arg("--stats-csv")
        .arg(&stats);
    cmd.assert().success();

    let text = fs::read_to_string(&stats)?;
    assert!(text.lines().skip(1).all(|line| line.contains(",2,3,")));
    Ok(())
}

#[cfg(feature = "hdf5")]
#[test]
fn test_slice_index_out_of_range_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    create_snapshot(tmp_dir.path(), 0);

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d")
        .arg(tmp_dir.path())
        .arg("--end")
        .arg("0")
        .arg("--image-mode")
        .arg("slice")
        .arg("--slice-index")
        .arg("4")
        .arg("--renderer")
        .arg("terminal");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));
    Ok(())
}

#[cfg(feature = "hdf5")]
#[test]
fn test_png_frames_are_written() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let series_a = tmp_dir.path().join("run_a");
    let series_b = tmp_dir.path().join("run_b");
    for series in [&series_a, &series_b] {
        fs::create_dir(series)?;
        create_snapshot(series, 0);
    }
    let out = tmp_dir.path().join("plots");

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d")
        .arg(&series_a)
        .arg(&series_b)
        .arg("--end")
        .arg("0")
        .arg("--output-dir")
        .arg(&out);
    cmd.assert().success();

    for series in ["run_a", "run_b"] {
        let png = fs::read(out.join(series).join("savename_000.png"))?;
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
    Ok(())
}

#[test]
fn test_missing_snapshot_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("--snapshot-dir")
        .arg(tmp_dir.path())
        .arg("--end")
        .arg("0")
        .arg("--renderer")
        .arg("terminal");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("disc_patch_reference_000.hdf5"));
    Ok(())
}

#[test]
fn test_skip_missing_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.env("NO_COLOR", "1");
    cmd.arg("--snapshot-dir")
        .arg(tmp_dir.path())
        .arg("--end")
        .arg("2")
        .arg("--renderer")
        .arg("terminal")
        .arg("--skip-missing");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 frames rendered"))
        .stdout(predicate::str::contains("3 skipped"));
    Ok(())
}

#[test]
fn test_invalid_resolution_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d").arg(".").arg("--resolution").arg("12");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid resolution"));
    Ok(())
}

#[test]
fn test_start_after_end_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d")
        .arg(".")
        .arg("--start")
        .arg("5")
        .arg("--end")
        .arg("1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not exceed"));
    Ok(())
}

#[test]
fn test_missing_render_settings_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let mut cmd = Command::cargo_bin("disc-morph")?;
    cmd.arg("-d")
        .arg(tmp_dir.path())
        .arg("--config")
        .arg(tmp_dir.path().join("render.toml"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Render settings file not found"));
    Ok(())
}
