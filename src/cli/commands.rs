//! Subcommand implementations.
//!
//! Every command reads whole files, splits them into frames (skippable
//! frames are stepped over) and prints one report line per unit of work on
//! stdout. Library errors are wrapped with the file they came from; the
//! wrapped [`ZlitsError`] stays reachable through the `anyhow` chain so
//! [`exit_code`] can tell a defect from bad input.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::bench::bench_literals;
use crate::cli::args::{Cli, Command};
use crate::cli::constants::{EXIT_DEFECT, EXIT_ERROR, EXIT_OK};
use crate::config::{HUF_SYMBOLVALUE_MAX, HUF_TABLELOG_DEFAULT, HUF_TABLELOG_MAX, RECOMPRESS_CAPACITY};
use crate::error::ZlitsError;
use crate::frame::{parse_frame_header, split_frames, walk_blocks, IterationCommand};
use crate::literals::{for_each_literals_block, LiteralsBlockType, LiteralsCompressor};
use crate::probe;
use crate::util::expand_inputs;
use crate::xxhash::literals_digest;
use crate::{displaylevel, displayout};

/// Run the subcommand selected on the command line.
pub fn run(cli: &Cli, nb_workers: usize) -> Result<()> {
    let files = expand_inputs(cli.files(), cli.recursive).context("cannot expand input list")?;
    for (i, f) in files.iter().enumerate() {
        displaylevel!(4, "{} {}\n", i, f.display());
    }
    match &cli.command {
        Command::Blocks { .. } => run_blocks(&files),
        Command::Literals { .. } => run_literals(&files),
        Command::Recompress {
            suspect_uncompressible,
            ..
        } => run_recompress(&files, *suspect_uncompressible, nb_workers),
        Command::Bench { iters, .. } => run_bench(&files, *iters),
        Command::Probe => run_probe(),
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let defect = err
        .chain()
        .any(|c| c.downcast_ref::<ZlitsError>().is_some_and(|z| z.is_defect()));
    if defect {
        EXIT_DEFECT
    } else {
        EXIT_ERROR
    }
}

/// Exit code for the outcome of [`run`].
pub fn outcome_code(res: &Result<()>) -> i32 {
    match res {
        Ok(()) => EXIT_OK,
        Err(e) => exit_code(e),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

fn frames_of<'a>(path: &Path, data: &'a [u8]) -> Result<Vec<&'a [u8]>> {
    split_frames(data).with_context(|| format!("{}: not a sequence of zstd frames", path.display()))
}

// ── blocks ────────────────────────────────────────────────────────────────────

fn run_blocks(files: &[PathBuf]) -> Result<()> {
    let mut total = 0usize;
    for path in files {
        let data = read_input(path)?;
        for (f, frame) in frames_of(path, &data)?.into_iter().enumerate() {
            let fh = parse_frame_header(frame).with_context(|| format!("{}#{}", path.display(), f))?;
            displaylevel!(
                3,
                "{}#{}: window {} content {:?} checksum {}\n",
                path.display(),
                f,
                fh.window_size,
                fh.content_size,
                fh.checksum_flag
            );
            let mut index = 0usize;
            walk_blocks(frame, |block, ty| {
                displayout!(
                    "{}#{} block {:>4}  {:<10} {:>7}  last={}\n",
                    path.display(),
                    f,
                    index,
                    ty.name(),
                    block.len(),
                    block[0] & 1
                );
                index += 1;
                Ok(IterationCommand::Continue)
            })
            .with_context(|| format!("{}#{} block {}", path.display(), f, index))?;
            total += index;
        }
    }
    displaylevel!(2, "{} files, {} blocks\n", files.len(), total);
    Ok(())
}

// ── literals ──────────────────────────────────────────────────────────────────

fn run_literals(files: &[PathBuf]) -> Result<()> {
    let mut sections = 0usize;
    let mut regenerated = 0u64;
    for path in files {
        let data = read_input(path)?;
        for (f, frame) in frames_of(path, &data)?.into_iter().enumerate() {
            let mut index = 0usize;
            for_each_literals_block(frame, |section, literals, ty| {
                displayout!(
                    "{}#{} literals {:>4}  {:<10} {:>7} -> {:>7}  xxh64 {:016x}\n",
                    path.display(),
                    f,
                    index,
                    ty.name(),
                    section.len(),
                    literals.len(),
                    literals_digest(literals)
                );
                index += 1;
                regenerated += literals.len() as u64;
                Ok(IterationCommand::Continue)
            })
            .with_context(|| format!("{}#{} literals {}", path.display(), f, index))?;
            sections += index;
        }
    }
    displaylevel!(2, "{} sections, {} literal bytes\n", sections, regenerated);
    Ok(())
}

// ── recompress ────────────────────────────────────────────────────────────────

/// Per-file totals of a recompression run.
#[derive(Debug, Default, Clone, Copy)]
struct RecompressReport {
    sections: usize,
    literals: u64,
    stored: u64,
    recompressed: u64,
    /// Output sections by encoding: raw, rle, compressed, repeat.
    by_type: [usize; 4],
}

fn recompress_file(ctx: &mut LiteralsCompressor, path: &Path, suspect: bool) -> Result<RecompressReport> {
    let data = read_input(path)?;
    let mut report = RecompressReport::default();
    for (f, frame) in frames_of(path, &data)?.into_iter().enumerate() {
        for_each_literals_block(frame, |section, literals, _| {
            let size = ctx.recompress(literals, suspect)?;
            let out_ty = LiteralsBlockType::from_bits(ctx.output()[0]);
            displaylevel!(
                4,
                "{}#{}: {} -> {} bytes as {}, next table {}\n",
                path.display(),
                f,
                section.len(),
                size,
                out_ty.name(),
                ctx.tables().repeat.name()
            );
            report.sections += 1;
            report.literals += literals.len() as u64;
            report.stored += section.len() as u64;
            report.recompressed += size as u64;
            report.by_type[out_ty as usize] += 1;
            Ok(IterationCommand::Continue)
        })
        .with_context(|| format!("{}#{}", path.display(), f))?;
    }
    Ok(report)
}

fn run_recompress(files: &[PathBuf], suspect: bool, nb_workers: usize) -> Result<()> {
    let threads = crate::cli::op_mode::resolve_nb_workers(nb_workers);
    displaylevel!(3, "recompressing with {} worker(s)\n", threads);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot start worker pool")?;

    // One context per worker, tables reset per file so each report is
    // independent of how files were scheduled.
    let results: Vec<Result<RecompressReport>> = pool.install(|| {
        files
            .par_iter()
            .map_init(LiteralsCompressor::new, |ctx, path| match ctx {
                Ok(ctx) => {
                    ctx.reset_tables();
                    recompress_file(ctx, path, suspect)
                }
                Err(e) => Err(anyhow::Error::new(*e).context("cannot allocate recompression context")),
            })
            .collect()
    });

    let mut total = RecompressReport::default();
    for (path, res) in files.iter().zip(results) {
        let r = res?;
        displayout!(
            "{}: {} sections, {} literal bytes, stored {} -> recompressed {} ({:.3})  raw {} rle {} huf {} repeat {}\n",
            path.display(),
            r.sections,
            r.literals,
            r.stored,
            r.recompressed,
            ratio(r.recompressed, r.stored),
            r.by_type[0],
            r.by_type[1],
            r.by_type[2],
            r.by_type[3]
        );
        total.sections += r.sections;
        total.literals += r.literals;
        total.stored += r.stored;
        total.recompressed += r.recompressed;
    }
    displaylevel!(
        2,
        "{} files, {} sections: stored {} -> recompressed {} ({:.3})\n",
        files.len(),
        total.sections,
        total.stored,
        total.recompressed,
        ratio(total.recompressed, total.stored)
    );
    Ok(())
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

// ── bench ─────────────────────────────────────────────────────────────────────

fn run_bench(files: &[PathBuf], iters: u32) -> Result<()> {
    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        inputs.push(read_input(path)?);
    }
    let mut frames = Vec::new();
    for (path, data) in files.iter().zip(&inputs) {
        frames.extend(frames_of(path, data)?);
    }
    displaylevel!(3, "{} frames, {} passes\n", frames.len(), iters.max(1));

    let r = bench_literals(&frames, iters).context("benchmark failed")?;
    displayout!(
        "{} frames, {} sections, {} literal bytes: decode {:.1} MB/s, recompress {:.1} MB/s, ratio {:.3}\n",
        r.frames,
        r.sections,
        r.literals_bytes,
        r.decode_mb_s(),
        r.recompress_mb_s(),
        r.ratio()
    );
    Ok(())
}

// ── probe ─────────────────────────────────────────────────────────────────────

fn run_probe() -> Result<()> {
    displayout!(
        "compression table (max symbol {}): {} u64 words\n",
        HUF_SYMBOLVALUE_MAX,
        probe::sizeof_compression_table(HUF_SYMBOLVALUE_MAX as usize)
    );
    for log in [HUF_TABLELOG_DEFAULT, HUF_TABLELOG_MAX] {
        displayout!(
            "decompression table (log {}): {} u32 words\n",
            log,
            probe::sizeof_decompression_table(log)
        );
    }
    displayout!(
        "table build workspace: {} u32 words\n",
        probe::sizeof_table_build_workspace()
    );
    displayout!("recompression capacity: {} bytes\n", RECOMPRESS_CAPACITY);
    displayout!("fast bit ops: {}\n", probe::has_fast_bit_ops());
    Ok(())
}
