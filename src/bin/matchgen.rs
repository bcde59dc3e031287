use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use clap::Parser;

use matchrp::driver::{self, GenConfig};
use matchrp::Problem;

#[derive(Parser, Debug)]
#[command(name = "matchgen", version, about = "Random matching-instance generator")]
struct Args {
    /// output problem file
    out: PathBuf,

    #[arg(long, default_value_t = 1000)]
    residents: usize,

    #[arg(long, default_value_t = 100)]
    programs: usize,

    /// Probability that consecutive residents pair into a couple
    #[arg(long = "couple-rate", default_value_t = 0.02)]
    couple_rate: f64,

    /// Applications per resident at full competitiveness
    #[arg(long = "list-len", default_value_t = 12)]
    list_len: usize,

    /// Rank-order list dispersion: 0 = reference order, 1 = uniform shuffle
    #[arg(long, default_value_t = 0.25)]
    dispersion: f64,

    #[arg(long, default_value_t = 20140413)]
    seed: u64,

    /// Binary instance cache: load it if present, save into it otherwise
    #[arg(long)]
    cache: Option<PathBuf>,
}

fn main() {
    exit(run());
}

fn run() -> i32 {
    let args = Args::parse();
    let prob = load_or_generate(&args);

    let start = Instant::now();
    let file = match File::create(&args.out) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot create {}: {}", args.out.display(), e);
            return 1;
        }
    };
    let mut w = BufWriter::new(file);
    if let Err(e) = prob.write_problem(&mut w) {
        eprintln!("error writing {}: {}", args.out.display(), e);
        return 1;
    }
    println!("Saved problem to {} in {:.2?}.", args.out.display(), start.elapsed());
    0
}

fn load_or_generate(args: &Args) -> Problem {
    if let Some(cache) = &args.cache {
        if cache.exists() {
            let start = Instant::now();
            match Problem::open(&cache.display().to_string()) {
                Ok(prob) => {
                    println!("Loaded data from {} in {:.2?}.", cache.display(), start.elapsed());
                    return prob;
                }
                Err(e) => eprintln!("ignoring unreadable cache {}: {}", cache.display(), e),
            }
        }
    }

    let cfg = GenConfig {
        residents: args.residents,
        programs: args.programs,
        couple_rate: args.couple_rate,
        list_len: args.list_len,
        dispersion: args.dispersion,
    };
    let start = Instant::now();
    let prob = driver::generate_instance(&cfg, args.seed, true);
    println!(
        "Created {} residents ({} couples) and {} programs in {:.2?}.",
        args.residents,
        prob.couples.len(),
        args.programs,
        start.elapsed()
    );

    if let Some(cache) = &args.cache {
        let start = Instant::now();
        match prob.save(&cache.display().to_string()) {
            Ok(()) => println!("Saved data to {} in {:.2?}.", cache.display(), start.elapsed()),
            Err(e) => eprintln!("could not save cache {}: {}", cache.display(), e),
        }
    }
    prob
}
