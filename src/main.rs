use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use matchrp::matcher::{self, MatchStatus};
use matchrp::{driver, MatchOptions, Problem};

#[derive(Parser, Debug)]
#[command(name = "matchrp", version, about = "Roth-Peranson residency matcher with couples")]
struct Args {
    /// matching problem spec file
    problem: PathBuf,

    /// Limit on CPU time allowed in seconds (-1 no limit)
    #[arg(long = "cpu-lim", default_value_t = -1)]
    cpu_lim: i64,

    /// Limit on memory usage in megabytes (-1 no limit)
    #[arg(long = "mem-lim", default_value_t = -1)]
    mem_lim: i64,

    /// Matching algorithm (0 = Roth-Peranson)
    #[arg(long, default_value_t = 0)]
    algo: u32,

    /// Rounds of couple-order re-randomization after a cycle (0 = off)
    #[arg(long, default_value_t = 0)]
    rnd: u32,

    /// Verbosity level
    #[arg(long, default_value_t = 0)]
    verb: u32,
}

fn main() {
    exit(run());
}

fn run() -> i32 {
    let args = Args::parse();
    println!("#matchrp {}", env!("CARGO_PKG_VERSION"));
    if args.algo != 0 {
        println!("#ERROR: algorithm {} is not built into this binary", args.algo);
        return 1;
    }
    if args.rnd == 0 {
        println!("#matchrp using Roth Peranson 1999 algorithm with static couple ordering");
    } else {
        println!("#matchrp using Roth Peranson 1999 algorithm with re-randomization of couple ordering");
    }

    set_resource_limits(args.cpu_lim, args.mem_lim);
    install_signal_handlers();

    let mut prob = match Problem::from_path(&args.problem) {
        Ok(p) => p,
        Err(e) => {
            println!("Problems reading input file: \"{}\"", args.problem.display());
            println!("{}", e);
            return 1;
        }
    };
    if args.verb > 0 {
        println!("#Problem Read:");
        if args.verb > 2 {
            print!("{}", prob);
        }
    }

    let opts = MatchOptions { rnd: args.rnd, verb: args.verb, ..Default::default() };
    let status = driver::solve(&mut prob, &opts);
    matcher::print_stats();
    if status == MatchStatus::Cycle {
        println!("#cycle detected: visit cap exceeded, no matching found");
    }
    println!("#Final Match");
    let out = io::stdout();
    if let Err(e) = prob.write_match(&mut out.lock(), status == MatchStatus::Matched) {
        eprintln!("error writing match: {}", e);
        return 1;
    }
    if args.verb > 0 && status == MatchStatus::Matched {
        prob.print_summary();
    }
    let _ = io::stdout().flush();
    0
}

/// Apply --cpu-lim / --mem-lim through rlimits; exceeding them arrives as a
/// signal.
fn set_resource_limits(cpu_s: i64, mem_mb: i64) {
    unsafe {
        if cpu_s >= 0 {
            let mut rl = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
            if libc::getrlimit(libc::RLIMIT_CPU, &mut rl) == 0
                && (rl.rlim_max == libc::RLIM_INFINITY || (cpu_s as libc::rlim_t) < rl.rlim_max)
            {
                rl.rlim_cur = cpu_s as libc::rlim_t;
                if libc::setrlimit(libc::RLIMIT_CPU, &rl) == -1 {
                    println!("# WARNING! Could not set resource limit: CPU-time.");
                }
            }
        }
        if mem_mb >= 0 {
            let new_lim = (mem_mb as libc::rlim_t).saturating_mul(1024 * 1024);
            let mut rl = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
            if libc::getrlimit(libc::RLIMIT_AS, &mut rl) == 0
                && (rl.rlim_max == libc::RLIM_INFINITY || new_lim < rl.rlim_max)
            {
                rl.rlim_cur = new_lim;
                if libc::setrlimit(libc::RLIMIT_AS, &rl) == -1 {
                    println!("# WARNING! Could not set resource limit: Virtual memory.");
                }
            }
        }
    }
}

/// Dump the search counters and bail. Only async-signal-safe calls: the
/// counters are atomics and everything is written with raw write(2). Rust
/// aborts on allocation failure, so SIGABRT doubles as the out-of-memory
/// path and exits with the sentinel code 100; every other signal exits 1.
extern "C" fn stats_and_exit(sig: libc::c_int) {
    write_bytes(1, b"#ERROR: Caught Signal ");
    write_bytes(1, signal_name(sig).as_bytes());
    write_bytes(1, b" (");
    write_dec(1, sig as u64);
    write_bytes(1, b")\n");
    matcher::write_stats_raw(1);
    let code = if sig == libc::SIGABRT { 100 } else { 1 };
    unsafe { libc::_exit(code) }
}

fn signal_name(sig: libc::c_int) -> &'static str {
    match sig {
        libc::SIGINT => "SIGINT",
        libc::SIGTERM => "SIGTERM",
        libc::SIGXCPU => "SIGXCPU",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGABRT => "SIGABRT",
        _ => "UNKNOWN",
    }
}

fn write_bytes(fd: i32, buf: &[u8]) {
    unsafe {
        libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len());
    }
}

fn write_dec(fd: i32, mut v: u64) {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    write_bytes(fd, &buf[i..]);
}

fn install_signal_handlers() {
    let handler: extern "C" fn(libc::c_int) = stats_and_exit;
    for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGXCPU, libc::SIGSEGV, libc::SIGABRT] {
        unsafe {
            libc::signal(sig, handler as libc::sighandler_t);
        }
    }
}
