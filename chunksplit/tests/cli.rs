use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

/// Generate a small single-channel WAV file for testing.
///
/// The fixtures are produced on the fly by emitting a PCM RIFF header followed by
/// procedurally generated sine-wave samples. This keeps the repository free from
/// committed binary assets while still exercising the audio pipeline end-to-end.
fn write_test_tone<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    duration_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let total_samples = (sample_rate as u64 * duration_ms).div_ceil(1_000);
    let mut samples = Vec::with_capacity(total_samples as usize * 2);

    for n in 0..total_samples {
        let theta = (n as f32 / sample_rate as f32) * 2.0 * std::f32::consts::PI * 440.0;
        let sample = (theta.sin() * i16::MAX as f32 * 0.5) as i16;
        samples.extend_from_slice(&sample.to_le_bytes());
    }

    let mut file = File::create(path)?;
    let data_len = samples.len() as u32;
    let chunk_size = 36u32 + data_len;
    file.write_all(b"RIFF")?;
    file.write_all(&chunk_size.to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?; // PCM header size
    file.write_all(&1u16.to_le_bytes())?; // audio format = PCM
    file.write_all(&1u16.to_le_bytes())?; // channels
    file.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * 2;
    file.write_all(&byte_rate.to_le_bytes())?;
    file.write_all(&2u16.to_le_bytes())?; // block align
    file.write_all(&16u16.to_le_bytes())?; // bits per sample
    file.write_all(b"data")?;
    file.write_all(&data_len.to_le_bytes())?;
    file.write_all(&samples)?;
    Ok(())
}

fn file_names(dir: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    Ok(names)
}

#[test]
fn cli_splits_audio_into_chunks_with_remainder() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let input_path = input_dir.path().join("input.wav");
    write_test_tone(&input_path, 44_100, 1_100)?;

    let output_dir = tempdir()?;
    let output_path = output_dir.path().join("chunks");

    Command::cargo_bin("chunksplit")?
        .arg("--arquivo")
        .arg(&input_path)
        .arg("--pasta")
        .arg(&output_path)
        .args(["--duracao", "400ms"])
        .assert()
        .success()
        .stderr(predicate::str::contains("exported chunk 3/3"));

    assert_eq!(
        file_names(&output_path)?,
        vec!["part_01.mp3", "part_02.mp3", "part_03.mp3"]
    );

    Ok(())
}

#[test]
fn cli_reports_missing_input_file() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;
    let output_path = output_dir.path().join("never-created");

    Command::cargo_bin("chunksplit")?
        .args(["--arquivo", "missing.wav", "--pasta"])
        .arg(&output_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("input file not found"));

    assert!(!output_path.exists());

    Ok(())
}

#[test]
fn cli_prints_usage_for_incomplete_arguments() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("chunksplit")?
        .args(["--arquivo", "song.mp3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--interface").and(predicate::str::contains("--pasta")));

    Ok(())
}

#[test]
fn cli_rejects_invalid_duration() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("chunksplit")?
        .args(["--arquivo", "song.mp3", "--pasta", "out", "--duracao", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--duracao"));

    Ok(())
}

#[test]
fn cli_dry_run_prints_plan_without_creating_files() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let input_path = input_dir.path().join("input.wav");
    write_test_tone(&input_path, 44_100, 1_100)?;

    let output_dir = tempdir()?;

    let assert = Command::cargo_bin("chunksplit")?
        .arg("--arquivo")
        .arg(&input_path)
        .arg("--pasta")
        .arg(output_dir.path())
        .args(["--duracao", "0.4", "--dry-run"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Dry run: would generate 3 chunk(s):"));
    for name in ["part_01.mp3", "part_02.mp3", "part_03.mp3"] {
        let needle = format!("  {}", output_dir.path().join(name).display());
        assert!(stdout.contains(&needle), "missing dry-run entry for {needle}");
    }

    assert!(
        file_names(output_dir.path())?.is_empty(),
        "dry run should not create files"
    );

    Ok(())
}
