use std::env;
use std::time::Instant;

use serde::Serialize;
use seqalign::aligner::{align_banded, align_global};
use seqalign::motif::BitapPattern;
use seqalign::mutations::generator::{generate_mutations, MutationModel};
use seqalign::{
    AffineGapAlignmentScoring, AlignmentScoring, BandedAlignerParameters, BioSequence,
    LinearGapAlignmentScoring, NucleotideSequence, Range,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

const MATCH_SCORE: i32 = 5;
const MISMATCH_SCORE: i32 = -4;
const GAP_PENALTY: i32 = -5;

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("align_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Sequence Alignment Scaling Probe");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
    eprintln!("  wall_s         wall-clock seconds");
    eprintln!("  rss_delta_kib  resident memory growth in KiB");
    eprintln!("  status         'passed' = matches a naive baseline (sizes up to {})", options.verify_limit);
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/4] Full global alignment (linear and affine gaps)...");
    measurements.extend(run_global(&options, &mut sys));
    eprintln!();

    eprintln!("[2/4] Banded global alignment of related reads...");
    measurements.extend(run_banded(&options, &mut sys));
    eprintln!();

    eprintln!("[3/4] Bitap exact search...");
    measurements.extend(run_bitap(&options, &mut sys));
    eprintln!();

    eprintln!("[4/4] Mutation combine and replay...");
    measurements.extend(run_mutations(&mut sys));
    eprintln!();

    print_summary(&measurements);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("align_probe output error: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 1024usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = parse_limit(value)?;
            } else if arg == "--verify-limit" {
                let value: String = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = parse_limit(&value)?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --features probe --bin align_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Longest input checked against a naive baseline (default: 1024)
  -h, --help                    Print this help message
"
        );
    }
}

fn parse_limit(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| "verify limit must be a positive integer".to_string())
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => serde_json::to_string_pretty(measurements)
                .map(|text| println!("{text}"))
                .map_err(|e| e.to_string()),
        }
    }
}

#[derive(Clone, Serialize)]
struct Measurement {
    scenario: &'static str,
    size: String,
    wall_s: f64,
    rss_delta_kib: u64,
    status: VerificationStatus,
    detail: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

fn verdict(expected: i64, got: i64) -> (VerificationStatus, Option<String>) {
    if expected == got {
        (VerificationStatus::Passed, None)
    } else {
        (VerificationStatus::Failed, Some(format!("expected {expected}, got {got}")))
    }
}

fn report(m: &Measurement, what: &str) {
    eprintln!(
        "{} {what}, time={:.3}s, status={}",
        m.status.icon(),
        m.wall_s,
        m.status.label()
    );
}

fn run_global(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[256, 512, 1024, 2048, 4096];
    let linear = AlignmentScoring::Linear(
        LinearGapAlignmentScoring::symmetric(MATCH_SCORE, MISMATCH_SCORE, GAP_PENALTY).expect("valid scores"),
    );
    let affine = AlignmentScoring::Affine(AffineGapAlignmentScoring::nucleotide_default());
    let mut out = Vec::new();

    for (scenario, scoring) in [("global_linear", &linear), ("global_affine", &affine)] {
        for (idx, &len) in SIZES.iter().enumerate() {
            eprint!("      [{}/{}] {scenario} size {len}... ", idx + 1, SIZES.len());
            let mut score = 0;
            let m = measure(scenario, format!("len={len}"), sys, || {
                let (a, b) = random_pair(len, 0.1);
                let al = align_global(scoring, &a, &b);
                score = al.score() as i64;
                if scoring.is_affine() || len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                verdict(full_nw_score(a.codes(), b.codes()), score)
            });
            report(&m, &format!("score={score}"));
            out.push(m);
        }
    }
    out
}

fn run_banded(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[1024, 4096, 16384, 65536];
    let scoring = LinearGapAlignmentScoring::symmetric(MATCH_SCORE, MISMATCH_SCORE, GAP_PENALTY).expect("valid scores");
    let params = BandedAlignerParameters::builder(scoring.clone()).with_width(32).build();

    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] banded size {len}... ", idx + 1, SIZES.len());
            let mut score = 0;
            let m = measure("banded_linear", format!("len={len},width=32"), sys, || {
                let (a, b) = random_pair(len, 0.002);
                let al = match align_banded(&params, &a, Range::of_length(a.size()), &b, Range::of_length(b.size())) {
                    Ok(al) => al,
                    Err(e) => return (VerificationStatus::Failed, Some(e.to_string())),
                };
                score = al.score() as i64;
                if len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                let full = align_global(&AlignmentScoring::Linear(scoring.clone()), &a, &b);
                verdict(full.score() as i64, score)
            });
            report(&m, &format!("score={score}"));
            m
        })
        .collect()
}

fn run_bitap(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[1 << 16, 1 << 20, 1 << 22];

    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] bitap text {len}... ", idx + 1, SIZES.len());
            let mut found = None;
            let m = measure("bitap_exact", format!("text={len},pattern=32"), sys, || {
                let mut rng = StdRng::seed_from_u64(len as u64);
                let text = random_dna(&mut rng, len);
                let start = len - len / 3;
                let pattern = match text.get_range(start, start + 32) {
                    Ok(p) => p,
                    Err(e) => return (VerificationStatus::Failed, Some(e.to_string())),
                };
                let compiled = match BitapPattern::from_sequence(&pattern) {
                    Ok(p) => p,
                    Err(e) => return (VerificationStatus::Failed, Some(e.to_string())),
                };
                found = compiled.exact_search(&text);
                if len > options.verify_limit * 1024 {
                    return (VerificationStatus::NotChecked, None);
                }
                let naive = text
                    .codes()
                    .windows(32)
                    .position(|w| w == pattern.codes())
                    .map_or(-1, |p| p as i64);
                verdict(naive, found.map_or(-1, |p| p as i64))
            });
            report(&m, &format!("found={found:?}"));
            m
        })
        .collect()
}

fn run_mutations(sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[10_000, 100_000, 1_000_000];
    let model = MutationModel::uniform(4, 0.01, 0.002, 0.002).expect("valid rates");

    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] combine size {len}... ", idx + 1, SIZES.len());
            let mut edits = 0;
            let m = measure("mutations_combine", format!("len={len}"), sys, || {
                let mut rng = StdRng::seed_from_u64(7);
                let s1 = random_dna(&mut rng, len);
                let m1 = generate_mutations(&s1, &model, &mut rng);
                let replay = m1.mutate(&s1).and_then(|s2| {
                    let m2 = generate_mutations(&s2, &model, &mut rng);
                    let s3 = m2.mutate(&s2)?;
                    let combined = m1.combine_with(&m2)?;
                    edits = combined.size();
                    Ok(combined.mutate(&s1)? == s3)
                });
                match replay {
                    Ok(true) => (VerificationStatus::Passed, None),
                    Ok(false) => (VerificationStatus::Failed, Some("combined edits replay differently".into())),
                    Err(e) => (VerificationStatus::Failed, Some(e.to_string())),
                }
            });
            report(&m, &format!("edits={edits}"));
            m
        })
        .collect()
}

fn print_summary(measurements: &[Measurement]) {
    let count = |status| measurements.iter().filter(|m| m.status == status).count();
    let (passed, failed, not_checked) = (
        count(VerificationStatus::Passed),
        count(VerificationStatus::Failed),
        count(VerificationStatus::NotChecked),
    );

    eprintln!("{}", "=".repeat(80));
    eprintln!(
        "{} runs: {passed} passed, {failed} failed, {not_checked} not checked",
        measurements.len()
    );
    for m in measurements.iter().filter(|m| m.status == VerificationStatus::Failed) {
        eprintln!("  ✗ {} ({}): {}", m.scenario, m.size, m.detail.as_deref().unwrap_or(""));
    }
    eprintln!("{}", "=".repeat(80));
    eprintln!();
}

fn measure<F>(scenario: &'static str, size: String, sys: &mut System, compute: F) -> Measurement
where
    F: FnOnce() -> (VerificationStatus, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        status,
        detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size,wall_s,rss_delta_kib,status,detail");
    for m in measurements {
        let detail = m.detail.as_ref().map(|s| s.replace('"', "'")).unwrap_or_default();
        println!(
            "{},\"{}\",{:.3},{},{},\"{}\"",
            m.scenario,
            m.size,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let col1 = measurements.iter().map(|m| m.scenario.len()).fold("scenario".len(), usize::max);
    let col2 = measurements.iter().map(|m| m.size.len()).fold("size".len(), usize::max);

    println!(
        "{:<col1$}  {:<col2$}  {:>12}  {:>14}  {:>12}  detail",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    println!("{:-<col1$}  {:-<col2$}  {:-<12}  {:-<14}  {:-<12}  {:-<12}", "", "", "", "", "", "");
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>12.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.size,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            m.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

fn random_dna(rng: &mut StdRng, len: usize) -> NucleotideSequence {
    const ALPHABET: &[u8] = b"ACGT";
    let text: String = (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    text.parse().expect("ACGT text")
}

/// A random reference and a copy edited at roughly `rate` per letter.
fn random_pair(len: usize, rate: f64) -> (NucleotideSequence, NucleotideSequence) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = random_dna(&mut rng, len);
    let model = MutationModel::uniform(4, rate, rate / 4.0, rate / 4.0).expect("valid rates");
    let b = generate_mutations(&a, &model, &mut rng)
        .mutate(&a)
        .expect("generated edits apply");
    (a, b)
}

fn full_nw_score(s: &[u8], t: &[u8]) -> i64 {
    let n = s.len();
    let m = t.len();
    let mut dp = vec![vec![0i64; m + 1]; n + 1];
    for i in 1..=n {
        dp[i][0] = dp[i - 1][0] + GAP_PENALTY as i64;
    }
    for j in 1..=m {
        dp[0][j] = dp[0][j - 1] + GAP_PENALTY as i64;
    }
    for i in 1..=n {
        for j in 1..=m {
            let score = if s[i - 1] == t[j - 1] { MATCH_SCORE } else { MISMATCH_SCORE };
            let diag = dp[i - 1][j - 1] + score as i64;
            let up = dp[i - 1][j] + GAP_PENALTY as i64;
            let left = dp[i][j - 1] + GAP_PENALTY as i64;
            dp[i][j] = diag.max(up).max(left);
        }
    }
    dp[n][m]
}
