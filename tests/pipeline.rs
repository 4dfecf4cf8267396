//! End-to-end tests: dump file in, dataset artifact out.

use sniff2img::transcoder::core::{run, survey, transcode};
use sniff2img::transcoder::store::{load, ArtifactFormat, NpyDtype};
use sniff2img::{Error, ImageConfig, MarkerRule};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Three packets whose bodies are all "Hello".
const HELLO_DUMP: &str = "\
12:00:00.000001 IP 10.0.0.1.80 > 10.0.0.2.51000: Flags [P.], length 5
\t0x0000:  4865 6c6c 6f                             Hello
12:00:00.000002 IP 10.0.0.1.80 > 10.0.0.2.51000: Flags [P.], length 5
\t0x0000:  4865 6c6c 6f                             Hello
12:00:00.000003 IP 10.0.0.1.80 > 10.0.0.2.51000: Flags [P.], length 5
\t0x0000:  4865 6c6c 6f                             Hello
";

fn write_dump(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("capture.txt");
    fs::write(&path, text).unwrap();
    path
}

fn two_packets() -> ImageConfig {
    ImageConfig::builder().packet_count(2).build().unwrap()
}

#[test]
fn test_hello_scenario() {
    let transcoded = transcode(HELLO_DUMP, &two_packets()).unwrap();
    let dataset = transcoded.dataset;

    assert_eq!(dataset.shape(), (48, 64));
    for packet in 0..2 {
        let grid = dataset.packet(packet);
        assert_eq!(&grid.row(0)[..5], &[72, 101, 108, 108, 111]);
        assert!(grid.row(0)[5..].iter().all(|&v| v == 255));
        assert!(grid.cells()[32..].iter().all(|&v| v == 255));
    }
    assert_eq!(transcoded.packets_found, 3);
    assert_eq!(transcoded.malformed, 0);
}

#[test]
fn test_crlf_dump_matches_lf_dump() {
    let crlf = HELLO_DUMP.replace('\n', "\r\n");
    let lf = transcode(HELLO_DUMP, &two_packets()).unwrap();
    let crlf = transcode(&crlf, &two_packets()).unwrap();
    assert_eq!(lf.dataset, crlf.dataset);
}

#[test]
fn test_single_packet_is_insufficient() {
    let dump = "10:00 IP a > b: length 1\n\t0x0000:  ff  .\n";
    let err = transcode(dump, &two_packets()).unwrap_err();
    assert!(matches!(err, Error::InsufficientPackets { found: 1, expected: 2 }));
}

#[test]
fn test_invalid_hex_digit_is_padded() {
    let dump = "10:00 IP a > b\n\t0x0000:  4g  ..\n";
    let config = ImageConfig::builder().packet_count(1).build().unwrap();
    let transcoded = transcode(dump, &config).unwrap();

    assert_eq!(transcoded.malformed, 1);
    assert!(transcoded.dataset.data.iter().all(|&v| v == 255));
}

#[test]
fn test_run_writes_loadable_npy() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);
    let output = dir.path().join("images.npy");

    let summary = run(&input, &output, &two_packets(), None, NpyDtype::U8).unwrap();

    assert_eq!(summary.format, ArtifactFormat::Npy);
    assert_eq!((summary.rows, summary.width), (48, 64));
    assert_eq!(summary.packets_rasterized, 2);
    assert_eq!(summary.packets_found, 3);

    let reloaded = load(&output, 32).unwrap();
    let expected = transcode(HELLO_DUMP, &two_packets()).unwrap().dataset;
    assert_eq!(reloaded, expected);
}

#[test]
fn test_run_json_round_trip() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);
    let output = dir.path().join("images.json");

    let summary = run(&input, &output, &two_packets(), None, NpyDtype::U8).unwrap();
    assert_eq!(summary.format, ArtifactFormat::Json);

    let reloaded = load(&output, 32).unwrap();
    assert_eq!(reloaded.shape(), (48, 64));
    assert_eq!(reloaded.get(0, 32), 72);
}

#[test]
fn test_runs_are_deterministic() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);
    let first = dir.path().join("first.npy");
    let second = dir.path().join("second.npy");

    let a = run(&input, &first, &two_packets(), None, NpyDtype::U8).unwrap();
    let b = run(&input, &second, &two_packets(), None, NpyDtype::U8).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn test_failed_build_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);
    let output = dir.path().join("images.npy");
    let config = ImageConfig::builder().packet_count(5).build().unwrap();

    let err = run(&input, &output, &config, None, NpyDtype::U8).unwrap_err();

    assert!(matches!(err, Error::InsufficientPackets { found: 3, expected: 5 }));
    assert!(!output.exists());
}

#[test]
fn test_missing_dump_is_unreadable() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("images.npy");

    let err = run(&dir.path().join("nope.txt"), &output, &two_packets(), None, NpyDtype::U8)
        .unwrap_err();

    assert!(matches!(err, Error::UnreadableDump { .. }));
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_is_persist_failure() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);
    let output = dir.path().join("no").join("such").join("dir.npy");

    let err = run(&input, &output, &two_packets(), None, NpyDtype::U8).unwrap_err();
    assert!(matches!(err, Error::PersistFailure { .. }));
}

#[test]
fn test_survey_lists_records() {
    let dir = tempdir().unwrap();
    let input = write_dump(dir.path(), HELLO_DUMP);

    let survey = survey(&input, &ImageConfig::default()).unwrap();
    assert_eq!(survey.packets_found, 3);
    assert_eq!(survey.payload_digits, vec![10, 10, 10]);
    assert_eq!(survey.odd_payloads, 0);
}

#[test]
fn test_header_marker_ignores_ip_in_ascii_column() {
    // "IP" shows up in the ASCII rendering of 0x4950.
    let dump = "\
10:00 IP a > b: length 4
\t0x0000:  4950 0102  IP..
10:00 IP b > a: length 1
\t0x0000:  ff  .
";
    let substring = ImageConfig::builder().packet_count(2).build().unwrap();
    let header = ImageConfig::builder()
        .packet_count(2)
        .marker(MarkerRule::Header)
        .build()
        .unwrap();

    let loose = transcode(dump, &substring).unwrap();
    assert_eq!(loose.packets_found, 3);
    assert_eq!(loose.dataset.get(0, 0), 255);

    let strict = transcode(dump, &header).unwrap();
    assert_eq!(strict.packets_found, 2);
    assert_eq!(strict.dataset.get(0, 0), 0x49);
    assert_eq!(strict.dataset.get(0, 32), 0xff);
}
