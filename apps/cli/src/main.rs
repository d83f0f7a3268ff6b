//! DropCraft CLI
//!
//! Build cumulative Merkle distributions, look up and verify proofs, and
//! dry-run multi-round payouts.

mod eligibility;
mod simulate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use dropcraft_core::{hash_hex, parse_amount, Address, Amount};
use dropcraft_logging::LogLevel;
use dropcraft_merkle::{verify_hex, ClaimIndex, Distribution};

/// DropCraft - cumulative Merkle reward distribution
#[derive(Parser)]
#[command(name = "dropcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Explicit log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a distribution file from an eligibility list
    Build {
        /// Eligibility list (`address[,amount]` per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Entitlement for lines without an amount
        #[arg(long, value_parser = parse_amount)]
        amount: Option<Amount>,

        /// Where to write the distribution JSON
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the entitlement and proof for one address
    Proof {
        /// Distribution file
        #[arg(short, long)]
        distribution: PathBuf,

        /// Claimant address
        #[arg(short, long)]
        address: Address,
    },

    /// Check an (address, amount, proof) triple against a root
    Verify {
        /// Merkle root (0x hex)
        #[arg(short, long)]
        root: String,

        /// Claimant address
        #[arg(short, long)]
        address: String,

        /// Total entitlement certified for the address
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,

        /// Proof elements, leaf to root (0x hex); none for a single-leaf tree
        #[arg(short, long, num_args = 0..)]
        proof: Vec<String>,
    },

    /// Install distribution files as successive rounds and claim every delta
    Simulate {
        /// Distributor config JSON (address, admin, token, initialRoot)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Distribution files, one per round, in order
        #[arg(short, long, required = true, num_args = 1..)]
        distribution: Vec<PathBuf>,

        /// Reserve to fund (defaults to the largest round total)
        #[arg(long, value_parser = parse_amount)]
        reserve: Option<Amount>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .unwrap_or_else(|| LogLevel::from_flags(cli.quiet, cli.verbose));
    dropcraft_logging::init(level);

    match cli.command {
        Commands::Build {
            input,
            amount,
            output,
        } => build(&input, amount, &output),
        Commands::Proof {
            distribution,
            address,
        } => proof_cmd(&distribution, &address),
        Commands::Verify {
            root,
            address,
            amount,
            proof,
        } => verify(&root, &address, amount, &proof),
        Commands::Simulate {
            config,
            distribution,
            reserve,
        } => simulate_cmd(config.as_deref(), &distribution, reserve),
    }
}

fn build(input: &Path, amount: Option<Amount>, output: &Path) -> Result<()> {
    let leaves = eligibility::load(input, amount)?;
    let distribution = Distribution::build(leaves).context("Failed to build distribution")?;

    distribution
        .to_file()
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Distribution written to {}", output.display());

    println!("Merkle root: {}", hash_hex(&distribution.root()));
    println!("Addresses:   {}", distribution.len());
    println!("Total:       {}", distribution.total());
    println!("Depth:       {}", distribution.tree().depth());
    Ok(())
}

fn proof_cmd(path: &Path, address: &Address) -> Result<()> {
    let index = ClaimIndex::load(path)
        .with_context(|| format!("Failed to load distribution {}", path.display()))?;
    let (amount, proof) = index.claim_for(address)?;

    let output = serde_json::json!({
        "merkleRoot": hash_hex(&index.root()),
        "address": address,
        "amount": amount.to_string(),
        "proof": proof.to_hex(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn verify(root: &str, address: &str, amount: Amount, proof: &[String]) -> Result<()> {
    if verify_hex(root, address, amount, proof)? {
        println!("Valid: {} is entitled to {} under {}", address, amount, root);
        Ok(())
    } else {
        bail!("Invalid Merkle proof for {} ({}) under {}", address, amount, root)
    }
}

fn simulate_cmd(config: Option<&Path>, files: &[PathBuf], reserve: Option<Amount>) -> Result<()> {
    let config = simulate::load_config(config)?;

    let rounds = files
        .iter()
        .map(|path| {
            ClaimIndex::load(path).with_context(|| format!("Failed to load distribution {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = simulate::run(config, &rounds, reserve)?;

    println!("DropCraft Simulation");
    println!("====================");
    println!("{:<6} {:<12} {:<10} {:<10} {:<20}", "ROUND", "ROOT", "PAID TO", "REJECTED", "AMOUNT");
    println!("{}", "-".repeat(60));
    for round in &report.rounds {
        println!(
            "{:<6} {:<12} {:<10} {:<10} {:<20}",
            round.round,
            &hash_hex(&round.root)[..10],
            round.claimants,
            round.rejected,
            round.paid
        );
    }

    println!("\nEvents:");
    for event in &report.events {
        println!("  {}", event);
    }
    println!("\nReserve remaining: {}", report.reserve_remaining);
    Ok(())
}
