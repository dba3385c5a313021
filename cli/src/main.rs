// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Command-line driver: feeds a file of tokens, one per line, through a stream summary and
//! prints the resulting buckets and heavy hitters.
//!
//! ```bash
//! streamsummary 100 tokens.txt --top 5
//! RUST_LOG=streamsummary=trace streamsummary 100 tokens.txt
//! ```

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use streamsummary::frequencies::StreamSummary;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Approximate the most frequent lines of a file in bounded memory.
#[derive(Debug, Parser)]
#[command(name = "streamsummary", version, about)]
struct Args {
    /// Maximum number of distinct items to track
    capacity: usize,

    /// Input file; blank lines and lines starting with '#' are skipped
    input: PathBuf,

    /// Number of heavy hitters to print
    #[arg(short, long, default_value_t = 10)]
    top: usize,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let mut summary = StreamSummary::new(args.capacity)?;
    let added = feed(BufReader::new(file), &mut summary)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!(
        added,
        tracked = summary.len(),
        max_error = summary.maximum_error(),
        "finished reading input"
    );

    print!("{summary}");
    println!();
    println!("top {} items (item, estimate, lower bound):", args.top);
    for row in summary.top_k(args.top) {
        println!("{}\t{}\t{}", row.item(), row.estimate(), row.lower_bound());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Adds every item line of `reader` to `summary` and returns how many were added.
fn feed<R: BufRead>(reader: R, summary: &mut StreamSummary<String>) -> std::io::Result<u64> {
    let mut added = 0;
    for line in reader.lines() {
        let line = line?;
        if let Some(item) = parse_item(&line) {
            summary.add(item.to_string());
            added += 1;
        }
    }
    Ok(added)
}

fn parse_item(line: &str) -> Option<&str> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(line)
    }
}
