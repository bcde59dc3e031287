use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use matchrp::verifier::{self, MatchFile};
use matchrp::Problem;

#[derive(Parser, Debug)]
#[command(name = "matchchk", version, about = "Stability checker for residency matchings")]
struct Args {
    /// matching problem spec file
    problem: PathBuf,

    /// match spec file to verify
    match_file: PathBuf,

    /// Verbosity level (0=silent, 1=some, 2=more)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=2))]
    verb: u32,
}

fn main() {
    exit(run());
}

fn run() -> i32 {
    let args = Args::parse();

    let mut prob = match Problem::from_path(&args.problem) {
        Ok(p) => p,
        Err(e) => {
            println!("Problems reading problem file: \"{}\"", args.problem.display());
            println!("{}", e);
            return 1;
        }
    };
    let mf = match MatchFile::from_path(&args.match_file) {
        Ok(m) => m,
        Err(e) => {
            println!("Problems reading match file: \"{}\"", args.match_file.display());
            println!("{}", e);
            return 1;
        }
    };
    if let Err(e) = mf.apply(&mut prob) {
        println!("Problems reading match file: \"{}\"", args.match_file.display());
        println!("{}", e);
        return 1;
    }

    if args.verb > 0 {
        println!("Inputed problem:");
        print!("{}", prob);
    }

    if !mf.found {
        println!("No match found.");
        return 0;
    }
    let errors = verifier::check(&mut prob);
    if errors.is_empty() {
        println!("Match ok.");
        prob.print_summary();
        0
    } else {
        println!("ERROR: Unstable Match.");
        for e in &errors {
            println!("{}", e);
        }
        1
    }
}
