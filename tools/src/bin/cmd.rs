// Command line utility for running louvain community detection on an edge list

use anyhow::{Context, Error};
use clap::{value_parser, Arg, ArgAction, Command};
use log::info;
use louvain::{compute_modularity, get_partition_with_options, LouvainOptions, DEFAULT_DEPTH};
use louvain_tools::edge_list::{read_links, read_partition, write_partition, write_partition_file};
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

pub fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("louvain-cmd")
        .arg(
            Arg::new("INPUT")
                .help("edge list to cluster: `source target [weight]` lines, or a .json array of links")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("DEPTH")
                .help("Levels of refinement of large communities, negative for no limit")
                .short('d')
                .long("depth")
                .default_value("0")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("MAX_SWEEPS")
                .help("Maximum number of local moving sweeps per level")
                .long("max-sweeps")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("PARALLEL")
                .help("Refine sibling communities in parallel")
                .long("parallel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("SCORE")
                .help("Only report the modularity of this partition (`node community` lines)")
                .long("score")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("Where to write the partition, gzipped if it ends in .gz. Defaults to stdout")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let input: &PathBuf = matches.get_one("INPUT").unwrap();
    let depth: i32 = matches.get_one("DEPTH").copied().unwrap_or(DEFAULT_DEPTH);
    let options = LouvainOptions {
        max_sweeps: matches.get_one("MAX_SWEEPS").copied(),
        parallel_refinement: matches.get_flag("PARALLEL"),
    };

    let links = read_links(input)?;
    info!("read {} links from {}", links.len(), input.display());

    if let Some(score) = matches.get_one::<PathBuf>("SCORE") {
        let partition = read_partition(score)?;
        let modularity =
            compute_modularity(&links, Some(&partition)).with_context(|| score.display().to_string())?;
        println!("{modularity}");
        return Ok(());
    }

    let now = Instant::now();
    let partition = get_partition_with_options(&links, depth, options);
    info!("clustering time: {:.2?}", now.elapsed());

    let modularity = compute_modularity(&links, Some(&partition))?;
    info!("modularity: {modularity:.6}");

    match matches.get_one::<PathBuf>("OUTPUT") {
        Some(path) => write_partition_file(&partition, path)?,
        None => {
            let mut writer = BufWriter::new(stdout().lock());
            write_partition(&partition, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}
