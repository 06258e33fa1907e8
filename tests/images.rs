use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use mkrom::cli::Args;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn run_cmd(argv: &[&str]) -> anyhow::Result<()> {
    let args = Args::try_parse_from(std::iter::once("mkrom").chain(argv.iter().copied()))
        .map_err(anyhow::Error::new)?;
    mkrom::run(args)
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

fn with_source(dir: &TempDir, bytes: &[u8]) -> (PathBuf, PathBuf) {
    let source = dir.path().join("in.bin");
    fs::write(&source, bytes).expect("write source");
    (source, dir.path().join("out.bin"))
}

#[test]
fn pad_fills_to_requested_size() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &[0xaa; 100]);

    run_cmd(&["-q", "pad", "1024", path_str(&source), path_str(&destination)]).expect("pad");

    let out = fs::read(&destination).expect("read output");
    let mut expected = vec![0xaa; 100];
    expected.resize(1024, 0);
    assert_eq!(out, expected);
}

#[test]
fn pad_accepts_suffixed_size() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &[1, 2, 3]);

    run_cmd(&["-q", "pad", "2k", path_str(&source), path_str(&destination)]).expect("pad");

    assert_eq!(fs::metadata(&destination).expect("stat").len(), 2048);
}

#[test]
fn pad_failure_leaves_no_output() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &[0; 1025]);

    let err = run_cmd(&["-q", "pad", "1k", path_str(&source), path_str(&destination)])
        .expect_err("must fail");

    assert!(format!("{err:#}").ends_with("image is too big: 1 extra bytes"));
    assert!(!destination.exists());
}

#[test]
fn invalid_size_is_a_usage_failure() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &[0; 4]);

    let err = run_cmd(&["pad", "12q", path_str(&source), path_str(&destination)])
        .expect_err("must fail");

    assert!(err.to_string().contains("12q: invalid size."));
    assert!(!destination.exists());
}

#[test]
fn stc_writes_prefixed_cartridge() {
    let dir = TempDir::new().expect("tempdir");
    let image = (0..1000u32).map(|v| (v % 251) as u8).collect::<Vec<_>>();
    let (source, destination) = with_source(&dir, &image);

    run_cmd(&["-q", "stc", path_str(&source), path_str(&destination)]).expect("stc");

    let out = fs::read(&destination).expect("read output");
    assert_eq!(out.len(), 128 * 1024);
    assert_eq!(&out[..4], &[0; 4]);
    assert_eq!(&out[4..1004], image.as_slice());
    assert!(out[1004..].iter().all(|&b| b == 0));
}

#[test]
fn stc_rejects_oversized_image() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &vec![0x55; 200_000]);

    let err = run_cmd(&["-q", "stc", path_str(&source), path_str(&destination)])
        .expect_err("must fail");

    assert_eq!(
        format!("{err:#}"),
        format!("{}: image is too big: 68932 extra bytes", source.display())
    );
    assert!(!destination.exists());
}

#[test]
fn pak3_pads_and_patches_full_rom() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &vec![0xa5; 256 * 1024]);

    run_cmd(&["-q", "pak3", path_str(&source), path_str(&destination)]).expect("pak3");

    let out = fs::read(&destination).expect("read output");
    assert_eq!(out.len(), 512 * 1024);
    assert!(out[..0x40000].iter().all(|&b| b == 0xa5));
    assert!(out[0x40000..0x40030].iter().all(|&b| b == 0));
    assert_eq!(&out[0x40030..0x40036], &[0x4e, 0xf9, 0x00, 0xe0, 0x00, 0x00]);
    assert!(out[0x40036..].iter().all(|&b| b == 0));
}

#[test]
fn pak3_rejects_image_over_256k() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &vec![0; 256 * 1024 + 10]);

    let err = run_cmd(&["-q", "pak3", path_str(&source), path_str(&destination)])
        .expect_err("must fail");

    assert!(format!("{err:#}").ends_with("image is too big: 10 extra bytes"));
    assert!(!destination.exists());
}

#[test]
fn existing_destination_is_replaced() {
    let dir = TempDir::new().expect("tempdir");
    let (source, destination) = with_source(&dir, &[9; 8]);
    fs::write(&destination, vec![0xff; 64]).expect("write stale output");

    run_cmd(&["-q", "pad", "16", path_str(&source), path_str(&destination)]).expect("pad");

    let mut expected = vec![9; 8];
    expected.resize(16, 0);
    assert_eq!(fs::read(&destination).expect("read output"), expected);
}
