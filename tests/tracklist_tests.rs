// Integration tests for HepMC3 track-list conversion
//
// Events are written with the HepMC3 writer, then converted with the same
// entry point the `hepmc-tracklist` binary uses.

use camino::Utf8PathBuf;
use minbias::models::event::status;
use minbias::models::{CrossSection, EventRecord, GeneratedEvent, TrackListSettings};
use minbias::physics::LorentzVector;
use minbias::services::tracklist::convert_file;
use minbias::{EventSink, HepMc3Writer};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// A K0S decaying at (x, y) into a pi+ pi- pair, plus one prompt pion.
fn displaced_decay(x: f64, y: f64) -> GeneratedEvent {
    let mut record = EventRecord::new();
    let b1 = record.add_particle(
        2212,
        status::BEAM,
        LorentzVector::from_args(6800.0, 0.0, 0.0, 6800.0),
        0.938272,
        None,
    );
    let b2 = record.add_particle(
        2212,
        status::BEAM,
        LorentzVector::from_args(6800.0, 0.0, 0.0, -6800.0),
        0.938272,
        None,
    );
    let primary = record.add_vertex(vec![b1, b2], LorentzVector::new());
    record.add_particle(
        211,
        status::FINAL,
        LorentzVector::on_shell(0.4, 0.3, 0.1, 0.13957),
        0.13957,
        Some(primary),
    );
    let k_short = record.add_particle(
        310,
        status::DECAYED,
        LorentzVector::on_shell(1.0, 1.0, 0.5, 0.497611),
        0.497611,
        Some(primary),
    );
    let decay = record.add_vertex(vec![k_short], LorentzVector::from_args(0.3, x, y, 2.0));
    record.add_particle(
        211,
        status::FINAL,
        LorentzVector::on_shell(0.7, 0.2, 0.3, 0.13957),
        0.13957,
        Some(decay),
    );
    record.add_particle(
        -211,
        status::FINAL,
        LorentzVector::on_shell(0.3, 0.8, 0.2, 0.13957),
        0.13957,
        Some(decay),
    );

    GeneratedEvent {
        number: 0,
        process_code: 101,
        pt_hat: 0.0,
        weight: 1.0,
        n_mpi: 1,
        cross_section: CrossSection::default(),
        record,
    }
}

fn write_events(path: &Utf8PathBuf, events: &[GeneratedEvent]) {
    let mut writer = HepMc3Writer::create(path).unwrap();
    for event in events {
        writer.write_event(event).unwrap();
    }
    writer.finish().unwrap();
}

fn paths(temp_dir: &TempDir) -> (Utf8PathBuf, Utf8PathBuf) {
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (dir.join("events.hepmc"), dir.join("tracks.txt"))
}

#[test]
fn test_only_pixel_region_tracks_are_kept() {
    let temp_dir = TempDir::new().unwrap();
    let (input, output) = paths(&temp_dir);
    // Decays at R = 50 mm (inside) and R = 200 mm (outside)
    write_events(&input, &[displaced_decay(30.0, 40.0), displaced_decay(200.0, 0.0)]);

    let count = convert_file(&input, &output, &TrackListSettings::default()).unwrap();

    assert_eq!(count, 2);
    let text = fs::read_to_string(&output).unwrap();
    let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split(' ').collect()).collect();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), 7);
        assert_eq!(row[3], "0");
        assert_eq!(row[4], "30.00000");
        assert_eq!(row[5], "40.00000");
    }
}

#[test]
fn test_nparticles_limit() {
    let temp_dir = TempDir::new().unwrap();
    let (input, output) = paths(&temp_dir);
    let events: Vec<GeneratedEvent> = (0..5).map(|_| displaced_decay(50.0, 0.0)).collect();
    write_events(&input, &events);

    let settings = TrackListSettings {
        nparticles: 3,
        ..Default::default()
    };
    assert_eq!(convert_file(&input, &output, &settings).unwrap(), 3);

    let all = TrackListSettings {
        nparticles: -1,
        ..Default::default()
    };
    assert_eq!(convert_file(&input, &output, &all).unwrap(), 10);
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 10);
}

#[test]
fn test_float_precision() {
    let temp_dir = TempDir::new().unwrap();
    let (input, output) = paths(&temp_dir);
    write_events(&input, &[displaced_decay(50.0, 0.0)]);

    let settings = TrackListSettings {
        float_precision: 2,
        ..Default::default()
    };
    convert_file(&input, &output, &settings).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.contains(" 0 50.00 0.00 "), "row was {}", first);
}

#[test]
fn test_missing_input_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let (input, output) = paths(&temp_dir);

    let err = convert_file(&input, &output, &TrackListSettings::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("events.hepmc"));
    assert!(!output.exists());
}

#[test]
fn test_tracklist_binary() {
    let temp_dir = TempDir::new().unwrap();
    let (input, output) = paths(&temp_dir);
    write_events(&input, &[displaced_decay(50.0, 0.0)]);

    let status = Command::new(env!("CARGO_BIN_EXE_hepmc-tracklist"))
        .args(["-i", input.as_str(), "-o", output.as_str(), "-n", "-1", "-p", "3"])
        .status()
        .unwrap();

    assert!(status.success());
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| l.contains(" 0 50.000 0.000 ")));
}
