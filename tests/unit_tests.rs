// tests/unit_tests.rs
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use sbg_bench::batch::{build_pattern, BatchConfig, PatternParams};
use sbg_bench::bench::{list_grid_files, run_bench, BenchOptions, ReadMode};
use sbg_bench::error::GridError;
use sbg_bench::io::{
    decode_cell, encode_cell, synthetic_values, write_grid, GridRead, GridReader, MmapGrid,
    NODATA_OUT, NODATA_RAW,
};
use sbg_bench::processing::patterns::{IndexPattern, Random, Sequential, Strided};
use sbg_bench::processing::ParallelScanner;
use sbg_bench::utils::GridCache;

/// Helper function to write a grid file with the given cell values
fn write_test_grid(dir: &TempDir, name: &str, values: &[i32]) -> PathBuf {
    let path = dir.path().join(name);
    write_grid(&path, values).expect("failed to write test grid");
    path
}

/// Test decoding of ordinary (non-sentinel) bit patterns
#[test]
fn test_decode_plain_values() {
    let cases = [0i32, 1, -1, 5, 42, 99999, -11000, i32::MAX, i32::MIN + 1];
    for value in cases {
        assert_eq!(
            decode_cell(value.to_le_bytes()),
            value,
            "plain value {} must decode unchanged",
            value
        );
    }
}

/// Test that the nodata sentinel decodes to the placeholder
#[test]
fn test_decode_nodata_sentinel() {
    assert_eq!(decode_cell([0x00, 0x00, 0x00, 0x80]), NODATA_OUT);
    assert_eq!(decode_cell(NODATA_RAW.to_le_bytes()), 99999);
}

/// Round-trip: encode then decode returns the input for every non-sentinel value
#[test]
fn test_encode_decode_round_trip() {
    let cases = [0i32, 1, -1, 5, 42, 99999, -10000, i32::MAX, i32::MIN + 1];
    for value in cases {
        assert_eq!(decode_cell(encode_cell(value)), value);
    }
}

/// Encoding is raw: the sentinel writes its own bit pattern, not the placeholder
#[test]
fn test_encode_sentinel_is_raw() {
    assert_eq!(encode_cell(NODATA_RAW), [0x00, 0x00, 0x00, 0x80]);
}

/// A file holding [5, nodata, 42] reads back as [5, 99999, 42]
#[test]
fn test_read_values_with_nodata() {
    let dir = TempDir::new().unwrap();
    let path = write_test_grid(&dir, "bathy.sbg", &[5, NODATA_RAW, 42]);

    let mut reader = GridReader::open(&path).unwrap();
    assert_eq!(reader.cell_count(), 3);
    assert_eq!(reader.read_values(&[0, 1, 2]).unwrap(), vec![5, 99999, 42]);
}

/// Output order follows input order, duplicates included
#[test]
fn test_read_values_preserves_order() {
    let dir = TempDir::new().unwrap();
    let path = write_test_grid(&dir, "bathy.sbg", &[5, NODATA_RAW, 42]);

    let mut reader = GridReader::open(&path).unwrap();
    assert_eq!(reader.read_values(&[2, 0, 1]).unwrap(), vec![42, 5, 99999]);
    assert_eq!(
        reader.read_values(&[1, 1, 0]).unwrap(),
        vec![99999, 99999, 5]
    );
}

/// Reads past the end fail loudly instead of returning zeroed data
#[test]
fn test_out_of_range_and_truncated_reads() {
    let dir = TempDir::new().unwrap();
    // 10 bytes: two whole cells plus a trailing partial cell
    let path = dir.path().join("short.sbg");
    fs::write(&path, [1u8, 0, 0, 0, 2, 0, 0, 0, 3, 0]).unwrap();

    let mut reader = GridReader::open(&path).unwrap();
    assert_eq!(reader.cell_count(), 2);
    assert_eq!(reader.read_values(&[0, 1]).unwrap(), vec![1, 2]);

    // Cell 2 starts inside the file but is cut short
    assert!(matches!(
        reader.read_value(2),
        Err(GridError::TruncatedRead { index: 2, .. })
    ));
    // Cell 3 starts past the end entirely
    assert!(matches!(
        reader.read_value(3),
        Err(GridError::SeekOutOfRange { index: 3, .. })
    ));
    // A batch aborts on the first bad index
    assert!(reader.read_values(&[0, 2, 1]).is_err());
}

/// Opening a missing file reports FileNotFound for both readers
#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.sbg");

    assert!(matches!(
        GridReader::open(&path),
        Err(GridError::FileNotFound { .. })
    ));
    assert!(matches!(
        MmapGrid::open(&path),
        Err(GridError::FileNotFound { .. })
    ));
}

/// The mmap reader agrees with the seek reader cell for cell
#[test]
fn test_mmap_matches_seek() {
    let dir = TempDir::new().unwrap();
    let values = synthetic_values(512, 7, 0.1);
    let path = write_test_grid(&dir, "layer.sbg", &values);

    let indices: Vec<u64> = (0..512).step_by(13).collect();

    let mut seek = GridReader::open(&path).unwrap();
    let mut mmap = MmapGrid::open(&path).unwrap();
    assert_eq!(seek.cell_count(), mmap.cell_count());
    assert_eq!(
        seek.read_values(&indices).unwrap(),
        mmap.read_values(&indices).unwrap()
    );
}

/// The mmap reader enforces the same bounds as the seek reader
#[test]
fn test_mmap_bounds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.sbg");
    fs::write(&path, [1u8, 0, 0, 0, 2, 0, 0, 0, 3, 0]).unwrap();

    let mut grid = MmapGrid::open(&path).unwrap();
    assert!(matches!(
        grid.read_value(2),
        Err(GridError::TruncatedRead { .. })
    ));
    assert!(matches!(
        grid.read_value(3),
        Err(GridError::SeekOutOfRange { .. })
    ));
}

/// The cache hands out one shared reader per path
#[test]
fn test_grid_cache() {
    let dir = TempDir::new().unwrap();
    let path_a = write_test_grid(&dir, "a.sbg", &[1, 2, 3]);
    let path_b = write_test_grid(&dir, "b.sbg", &[4, 5, 6]);

    let cache = GridCache::new();
    assert!(cache.is_empty());

    let first = cache.get_reader(&path_a).unwrap();
    let second = cache.get_reader(&path_a).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    cache.get_reader(&path_b).unwrap();
    assert_eq!(cache.len(), 2);

    assert_eq!(first.lock().read_values(&[2, 0]).unwrap(), vec![3, 1]);

    cache.clear();
    assert!(cache.is_empty());
}

/// Strided reproduces the classic start + i*step sampling
#[test]
fn test_strided_pattern() {
    let pattern = Strided::new(10000, 3, None);
    assert_eq!(pattern.name(), "strided");
    assert_eq!(
        pattern.generate(5),
        vec![10000, 10003, 10006, 10009, 10012]
    );

    let named = Strided::new(0, 1, Some("dense".to_string()));
    assert_eq!(named.name(), "dense");
    assert_eq!(named.generate(3), vec![0, 1, 2]);
}

#[test]
fn test_sequential_pattern() {
    let pattern = Sequential::new(7, None);
    assert_eq!(pattern.name(), "sequential");
    assert_eq!(pattern.generate(4), vec![7, 8, 9, 10]);
}

/// Random patterns are seed-deterministic and stay inside their bound
#[test]
fn test_random_pattern() {
    let pattern = Random::new(42, 1000, None);
    let first = pattern.generate(200);
    let second = pattern.generate(200);
    assert_eq!(first, second);
    assert!(first.iter().all(|&i| i < 1000));
}

/// The parallel scanner returns the same per-file values as direct reads
#[test]
fn test_scanner_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let grids = [
        write_test_grid(&dir, "a.sbg", &[10, 11, NODATA_RAW, 13]),
        write_test_grid(&dir, "b.sbg", &[20, 21, 22, 23]),
        write_test_grid(&dir, "c.sbg", &[NODATA_RAW, 31, 32, 33]),
    ];
    let indices = vec![3, 0, 2];

    let mut expected = Vec::new();
    for path in &grids {
        expected.push(GridReader::open(path).unwrap().read_values(&indices).unwrap());
    }

    let scanner = ParallelScanner::new(&grids, Some(2)).unwrap();
    assert_eq!(scanner.grids(), 3);

    let (tx, rx) = flume::unbounded();
    scanner.run(
        Arc::new(indices),
        Box::new(move |grid_idx, values| {
            tx.send((grid_idx, values)).unwrap();
        }),
    );

    let mut results = vec![Vec::new(); grids.len()];
    for _ in 0..grids.len() {
        let (grid_idx, values) = rx.recv().unwrap();
        results[grid_idx] = values.unwrap();
    }
    scanner.join();

    assert_eq!(results, expected);
}

/// A full bench run produces a coherent report in every mode
#[test]
fn test_run_bench_modes_agree() {
    let dir = TempDir::new().unwrap();
    write_test_grid(&dir, "a.sbg", &synthetic_values(256, 1, 0.2));
    write_test_grid(&dir, "b.sbg", &synthetic_values(256, 2, 0.2));

    let paths = list_grid_files(dir.path(), Some("sbg")).unwrap();
    assert_eq!(paths.len(), 2);

    let pattern = Strided::new(0, 5, None);
    let mut reports = Vec::new();
    for mode in [ReadMode::Seek, ReadMode::Cached, ReadMode::Mmap] {
        let opts = BenchOptions {
            outer: 2,
            inner: 10,
            mode,
            threads: None,
        };
        reports.push(run_bench(&paths, &pattern, &opts).unwrap());
    }

    for report in &reports {
        assert_eq!(report.files, 2);
        assert_eq!(report.total_reads, 2 * 10 * 2);
        assert!(report.ns_per_read > 0.0);
        assert_eq!(report.first_values, reports[0].first_values);
    }

    let parallel_opts = BenchOptions {
        outer: 2,
        inner: 10,
        mode: ReadMode::Seek,
        threads: Some(2),
    };
    let parallel = run_bench(&paths, &pattern, &parallel_opts).unwrap();
    assert_eq!(parallel.first_values, reports[0].first_values);
}

/// Worker fan-out only combines with seek mode
#[test]
fn test_run_bench_rejects_threads_with_mmap() {
    let dir = TempDir::new().unwrap();
    write_test_grid(&dir, "a.sbg", &[1, 2, 3]);
    let paths = list_grid_files(dir.path(), Some("sbg")).unwrap();

    let opts = BenchOptions {
        outer: 1,
        inner: 1,
        mode: ReadMode::Mmap,
        threads: Some(2),
    };
    assert!(run_bench(&paths, &Sequential::new(0, None), &opts).is_err());
}

/// A bench run aborts on the first unreadable index
#[test]
fn test_run_bench_aborts_on_short_file() {
    let dir = TempDir::new().unwrap();
    write_test_grid(&dir, "tiny.sbg", &[1, 2]);
    let paths = list_grid_files(dir.path(), Some("sbg")).unwrap();

    let opts = BenchOptions {
        outer: 1,
        inner: 5,
        mode: ReadMode::Seek,
        threads: None,
    };
    let err = run_bench(&paths, &Sequential::new(0, None), &opts).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GridError>(),
        Some(GridError::SeekOutOfRange { .. })
    ));
}

/// Directory listing filters by extension and sorts for stable ordering
#[test]
fn test_list_grid_files() {
    let dir = TempDir::new().unwrap();
    write_test_grid(&dir, "b.sbg", &[1]);
    write_test_grid(&dir, "a.sbg", &[2]);
    fs::write(dir.path().join("notes.txt"), "not a grid").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let grids = list_grid_files(dir.path(), Some("sbg")).unwrap();
    let names: Vec<_> = grids
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.sbg", "b.sbg"]);

    let all = list_grid_files(dir.path(), None).unwrap();
    assert_eq!(all.len(), 3);
}

/// Synthetic fixtures are seed-deterministic with the requested nodata share
#[test]
fn test_synthetic_values() {
    let first = synthetic_values(10_000, 42, 0.5);
    let second = synthetic_values(10_000, 42, 0.5);
    assert_eq!(first, second);

    let nodata = first.iter().filter(|&&v| v == NODATA_RAW).count();
    assert!(nodata > 3_000 && nodata < 7_000, "nodata count {}", nodata);

    let none = synthetic_values(1_000, 42, 0.0);
    assert!(none.iter().all(|&v| v != NODATA_RAW));
}

/// Batch configs parse with global defaults and per-run overrides
#[test]
fn test_batch_config_parse() {
    let raw = r#"{
        "global": { "outer": 3, "mode": "cached" },
        "runs": [
            { "dir": "data/sbg_10m" },
            { "dir": "data/sbg_5m", "inner": 50, "pattern": { "start": 0, "step": 2 } },
            { "dir": "data/sbg_1m", "mode": "mmap", "pattern": { "seed": 9, "max_index": 100 } }
        ]
    }"#;

    let config: BatchConfig = serde_json::from_str(raw).unwrap();
    assert_eq!(config.global.outer, 3);
    assert_eq!(config.global.inner, 10000);
    assert_eq!(config.global.mode, ReadMode::Cached);
    assert_eq!(config.global.extension, "sbg");
    assert_eq!(config.runs.len(), 3);

    assert!(config.runs[0].pattern.is_none());
    assert_eq!(build_pattern(config.runs[0].pattern.as_ref()).name(), "strided");

    assert!(matches!(
        config.runs[1].pattern,
        Some(PatternParams::StridedParams { start: 0, step: 2 })
    ));
    assert!(matches!(
        config.runs[2].pattern,
        Some(PatternParams::RandomParams { seed: 9, max_index: 100 })
    ));
    assert_eq!(config.runs[2].mode, Some(ReadMode::Mmap));
}

/// The default pattern matches the historical strided sampling
#[test]
fn test_default_pattern_indices() {
    let pattern = build_pattern(None);
    let indices = pattern.generate(3);
    assert_eq!(indices, vec![10000, 10003, 10006]);
}
