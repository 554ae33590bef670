//! exprtree demo - builds record predicates as expression trees and runs them

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use exprtree::sample::{
    age_between_tree, min_age_tree, names, sample_registry, sample_students, Student,
};
use log::info;
use std::sync::Arc;

/// Filter sample students with predicates built as expression trees
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Lower bound (exclusive) of the teenager age range
    #[arg(long, default_value = "12")]
    teen_min: i32,

    /// Upper bound (exclusive) of the teenager age range
    #[arg(long, default_value = "20")]
    teen_max: i32,

    /// Minimum age of an adult
    #[arg(long, default_value = "18")]
    adult_age: i32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let registry = Arc::new(sample_registry());
    let students = sample_students();
    info!("loaded {} students", students.len());

    let teenager = age_between_tree(args.teen_min, args.teen_max)
        .context("Failed to build teenager predicate")?;
    let is_teenager = teenager.compile(&registry);
    let selected = is_teenager
        .filter(&students)
        .context("Failed to evaluate teenager predicate")?;
    println!("expression tree: {}", teenager);
    println!("{}", names(&selected));

    let adult =
        min_age_tree(&registry, args.adult_age).context("Failed to build adult predicate")?;
    let is_adult = adult.compile(&registry).into_fn::<Student>();
    let selected: Vec<_> = students.iter().filter(|s| is_adult(*s)).collect();
    println!("manually built expression tree: {}", adult);
    println!("{}", names(&selected));

    Ok(())
}
