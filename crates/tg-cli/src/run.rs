//! The actual CLI driver, separated from `main` so it can be exercised in
//! tests without touching `std::process::exit`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use tg_common::ScanError;
use tg_scan::{cache, scan, CancellationToken, MapProvider};
use tg_source::Package;

use crate::args::CliArgs;
use crate::config::{self, FileConfig};
use crate::manifest;

/// Exit code `scan()`'s error variants map to (§12 "the CLI maps that to a
/// process exit code").
fn exit_code_for(err: &ScanError) -> i32 {
    match err {
        ScanError::Config(_) => 2,
        ScanError::FrontEnd { .. } => 3,
        ScanError::OutOfScope { .. } => 4,
        ScanError::Cancelled => 130,
    }
}

/// Runs one CLI invocation to completion. Returns the process exit code;
/// never calls `std::process::exit` itself so callers (tests, `main`) stay
/// in control of the process.
pub fn run(args: CliArgs) -> anyhow::Result<i32> {
    let file_config = match &args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let options = match config::resolve(&args, file_config) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            return Ok(exit_code_for(&err));
        }
    };

    crate::logging::init(options.log_level, args.trace_tree);

    let cache_path = args.cache.clone();
    let manifest_mtimes = source_mtimes(&args.packages)?;

    if let Some(path) = &cache_path {
        if let Some(payload) = try_cache_hit(path, &manifest_mtimes)? {
            write_output(&args, &payload)?;
            return Ok(0);
        }
    }

    let mut packages: FxHashMap<String, Arc<dyn Package>> = FxHashMap::default();
    for manifest_path in &args.packages {
        let package = manifest::load(manifest_path)?;
        packages.insert(package.path().to_string(), Arc::new(package));
    }

    let provider = Arc::new(MapProvider::new(packages.clone()));
    let cancellation = CancellationToken::new();

    let result = match scan(options, provider, &packages, &[], &cancellation) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "scan failed");
            return Ok(exit_code_for(&err));
        }
    };

    let tree = tg_serializer::serialize(&result.graph, &result.values, &result.packages, &result.basics);
    let payload = if args.pretty {
        tg_serializer::writer::to_pretty_string(&tree)?.into_bytes()
    } else {
        tg_serializer::writer::to_compact_string(&tree)?.into_bytes()
    };

    if let Some(path) = &cache_path {
        let envelope = cache::write(&payload, SystemTime::now())
            .map_err(|err| anyhow::anyhow!("failed to build cache envelope: {err}"))?;
        std::fs::write(path, envelope)?;
    }

    write_output(&args, &payload)?;
    Ok(0)
}

fn source_mtimes(paths: &[PathBuf]) -> anyhow::Result<Vec<SystemTime>> {
    let mut mtimes = Vec::with_capacity(paths.len());
    for path in paths {
        mtimes.push(std::fs::metadata(path)?.modified()?);
    }
    Ok(mtimes)
}

/// Reads the cache envelope at `path`, if any, and returns its already
/// serialized payload when it is still fresh with respect to
/// `manifest_mtimes`. A cache hit skips scanning entirely: the payload
/// stored in the envelope *is* the serialized output tree (§6 "Cache
/// file"), so there is nothing further to reconstruct before writing it
/// back out.
fn try_cache_hit(path: &PathBuf, manifest_mtimes: &[SystemTime]) -> anyhow::Result<Option<Vec<u8>>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let envelope = match cache::read(&bytes) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable cache file");
            return Ok(None);
        }
    };

    if cache::is_stale(envelope.timestamp, manifest_mtimes.iter().copied()) {
        return Ok(None);
    }

    Ok(Some(envelope.payload))
}

fn write_output(args: &CliArgs, payload: &[u8]) -> anyhow::Result<()> {
    match &args.output {
        Some(path) => {
            std::fs::write(path, payload)?;
        }
        None => {
            std::io::stdout().write_all(payload)?;
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn write_manifest(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn end_to_end_scan_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = write_manifest(
            &dir,
            "pkg.json",
            r#"{
                "path": "example.com/mod/p",
                "shortName": "p",
                "types": [
                    { "name": "Widget", "exported": true, "underlying": {
                        "kind": "struct",
                        "fields": [ { "name": "Name", "type": { "kind": "basic", "name": "string" }, "exported": true } ]
                    } }
                ]
            }"#,
        );
        let output_path = dir.path().join("out.json");

        let args = CliArgs::parse_from([
            "tg",
            manifest_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
        ]);
        let code = run(args).expect("run should succeed");
        assert_eq!(code, 0);

        let output = std::fs::read_to_string(&output_path).unwrap();
        let tree: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(tree["types"]["example.com/mod/p.Widget"].is_object());
    }

    #[test]
    fn missing_packages_argument_exits_with_config_code() {
        let args = CliArgs::parse_from(["tg"]);
        let code = run(args).expect("run should not error, just report config failure");
        assert_eq!(code, 2);
    }

    #[test]
    fn cache_hit_skips_rescanning() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = write_manifest(
            &dir,
            "pkg.json",
            r#"{ "path": "example.com/mod/p", "shortName": "p", "types": [] }"#,
        );
        let cache_path = dir.path().join("cache.bin");
        let output_path = dir.path().join("out.json");

        let args = CliArgs::parse_from([
            "tg",
            manifest_path.to_str().unwrap(),
            "--cache",
            cache_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
        ]);
        run(args).expect("first run should succeed");
        assert!(cache_path.exists());

        let args_again = CliArgs::parse_from([
            "tg",
            manifest_path.to_str().unwrap(),
            "--cache",
            cache_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
        ]);
        let code = run(args_again).expect("second run should hit the cache");
        assert_eq!(code, 0);
    }
}
