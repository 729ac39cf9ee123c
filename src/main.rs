// src/main.rs
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use sbg_bench::batch::process_batch;
use sbg_bench::bench::{list_grid_files, run_bench, BenchOptions};
use sbg_bench::cli::{Cli, Commands, PatternKind};
use sbg_bench::io::{synthetic_values, write_grid, GridRead, GridReader, MmapGrid};
use sbg_bench::processing::patterns::{IndexPattern, Random, Sequential, Strided};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Bench {
            dir,
            outer,
            inner,
            pattern,
            start,
            step,
            seed,
            max_index,
            mode,
            threads,
            extension,
        } => {
            let paths = list_grid_files(dir, Some(extension))?;
            anyhow::ensure!(
                !paths.is_empty(),
                "no .{} files found in {}",
                extension,
                dir.display()
            );

            let pattern: Box<dyn IndexPattern> = match pattern {
                PatternKind::Strided => Box::new(Strided::new(*start, *step, None)),
                PatternKind::Sequential => Box::new(Sequential::new(*start, None)),
                PatternKind::Random => {
                    let max_index = match max_index {
                        Some(max) => *max,
                        None => smallest_cell_count(&paths)?,
                    };
                    Box::new(Random::new(*seed, max_index, None))
                }
            };

            let opts = BenchOptions {
                outer: *outer,
                inner: *inner,
                mode: *mode,
                threads: *threads,
            };
            let report = run_bench(&paths, pattern.as_ref(), &opts)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print_summary();
            }
        }

        Commands::Read { file, indices, mmap } => {
            let values = if *mmap {
                let mut grid = MmapGrid::open(file)?;
                grid.read_values(indices)?
            } else {
                let mut reader = GridReader::open(file)?;
                reader.read_values(indices)?
            };

            for (index, value) in indices.iter().zip(&values) {
                println!("{index}\t{value}");
            }
        }

        Commands::Generate {
            output,
            cells,
            seed,
            nodata_ratio,
        } => {
            let values = synthetic_values(*cells, *seed, *nodata_ratio);
            write_grid(output, &values)?;
            println!("Wrote {} cells to {}", cells, output.display());
        }

        Commands::Batch { config } => {
            process_batch(config)?;
        }
    }

    Ok(())
}

/// Safe upper bound for random indices: every file can satisfy them.
fn smallest_cell_count(paths: &[PathBuf]) -> Result<u64> {
    let mut smallest = u64::MAX;
    for path in paths {
        smallest = smallest.min(GridReader::open(path)?.cell_count());
    }
    Ok(smallest.max(1))
}
