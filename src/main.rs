//! csrmult - sparse matrix multiplication on CSR text files
//!
//! # Usage
//!
//! ```bash
//! # Multiply two matrices with the default implementation
//! csrmult multiply -a a.txt -b b.txt -o c.txt
//!
//! # Use the 4-lane kernel and time 10 repetitions
//! csrmult multiply -a a.txt -b b.txt -o c.txt -V 3 -B10
//!
//! # Write a random 1000x1000 matrix with ~1% density
//! csrmult generate --rows 1000 --cols 1000 --density 0.01 --seed 7 -o m.txt
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use csrmult::constants::NUMBER_OF_IMPLEMENTATIONS;
use csrmult::{
    generate, multiply_with_config, read_matrix_file, write_matrix_file, Algorithm,
    SparseMatrixCSR, SpgemmConfig,
};

/// Sparse matrix multiplication in CSR format
#[derive(Parser, Debug)]
#[command(name = "csrmult")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Multiply two matrices read from files and write the product
    Multiply {
        /// Input file containing matrix A
        #[arg(short = 'a', value_name = "FILE")]
        matrix_a: PathBuf,

        /// Input file containing matrix B
        #[arg(short = 'b', value_name = "FILE")]
        matrix_b: PathBuf,

        /// Output file for the resulting matrix
        #[arg(short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Implementation to use (0-5)
        #[arg(
            short = 'V',
            long = "implementation",
            default_value_t = 0,
            value_parser = clap::value_parser!(u8).range(0..NUMBER_OF_IMPLEMENTATIONS as i64)
        )]
        implementation: u8,

        /// Measure the time of n multiplications and print it
        #[arg(
            short = 'B',
            long = "benchmark",
            value_name = "N",
            num_args = 0..=1,
            default_missing_value = "1",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        benchmark: Option<u64>,

        /// Override the detected number of hardware threads
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Write a random matrix to a file
    Generate {
        /// Number of rows
        #[arg(long)]
        rows: usize,

        /// Number of columns
        #[arg(long)]
        cols: usize,

        /// Expected fraction of stored entries per row
        #[arg(long, default_value_t = 0.01)]
        density: f64,

        /// Seed for the random number generator
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output file
        #[arg(short = 'o', value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")?;

    match cli.command {
        Commands::Multiply {
            matrix_a,
            matrix_b,
            output,
            implementation,
            benchmark,
            threads,
        } => run_multiply(matrix_a, matrix_b, output, implementation, benchmark, threads),
        Commands::Generate {
            rows,
            cols,
            density,
            seed,
            output,
        } => run_generate(rows, cols, density, seed, output),
    }
}

fn run_multiply(
    matrix_a: PathBuf,
    matrix_b: PathBuf,
    output: PathBuf,
    implementation: u8,
    benchmark: Option<u64>,
    threads: Option<usize>,
) -> Result<()> {
    let algorithm = Algorithm::try_from(implementation)?;
    let config = match threads {
        Some(n) => SpgemmConfig::with_threads(n),
        None => SpgemmConfig::default(),
    };

    let a: SparseMatrixCSR<f32> = read_matrix_file(&matrix_a)
        .with_context(|| format!("File \"{}\" is not correctly formatted", matrix_a.display()))?;
    let b: SparseMatrixCSR<f32> = read_matrix_file(&matrix_b)
        .with_context(|| format!("File \"{}\" is not correctly formatted", matrix_b.display()))?;
    debug!(%algorithm, a_nnz = a.nnz(), b_nnz = b.nnz(), "inputs loaded");

    let result = match benchmark {
        Some(repetitions) => {
            let start = Instant::now();
            let result = multiply_with_config(&a, &b, algorithm, &config)?;
            for _ in 1..repetitions {
                // Every repetition is released right away
                multiply_with_config(&a, &b, algorithm, &config)?;
            }
            let elapsed = start.elapsed().as_secs_f64();
            println!("Took {} seconds to multiply", elapsed);
            result
        }
        None => multiply_with_config(&a, &b, algorithm, &config)?,
    };

    write_matrix_file(&output, &result)
        .with_context(|| format!("Error writing to file \"{}\"", output.display()))?;
    info!(nnz = result.nnz(), output = %output.display(), "product written");

    Ok(())
}

fn run_generate(rows: usize, cols: usize, density: f64, seed: u64, output: PathBuf) -> Result<()> {
    let matrix: SparseMatrixCSR<f32> = generate(rows, cols, density, seed)?;

    write_matrix_file(&output, &matrix)
        .with_context(|| format!("Error writing to file \"{}\"", output.display()))?;
    info!(rows, cols, nnz = matrix.nnz(), output = %output.display(), "matrix generated");

    Ok(())
}
