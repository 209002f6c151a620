use std::{
    cell::RefCell,
    cmp::Ordering,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Merge pre-sorted text files into a single sorted stream on stdout.
#[derive(Parser, Debug)]
#[command(name = "kway-merge")]
struct Args {
    /// Input files, each already sorted line by line
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Compare lines (or keys) numerically
    #[arg(short, long, env = "KWAY_NUMERIC")]
    numeric: bool,

    /// Inputs are sorted in descending order
    #[arg(short, long)]
    reverse: bool,

    /// Split each line into key and value at the first occurrence of this character and only
    /// compare keys
    #[arg(short, long, env = "KWAY_DELIMITER")]
    delimiter: Option<char>,

    /// Stop after this many lines
    #[arg(long, env = "KWAY_LIMIT")]
    limit: Option<usize>,

    /// Treat missing files as empty inputs instead of failing
    #[arg(long)]
    skip_missing: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = run(&args, &mut out)?;
    out.flush()?;

    info!(lines = written, "merge complete");

    Ok(())
}

fn run<W: Write>(args: &Args, out: &mut W) -> anyhow::Result<usize> {
    let failure: Rc<RefCell<Option<(PathBuf, io::Error)>>> = Rc::new(RefCell::new(None));

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        sources.push(open_source(path, args.skip_missing, &failure)?);
    }

    let numeric = args.numeric;
    let reverse = args.reverse;
    let order = move |a: &str, b: &str| {
        let ord = compare_lines(a, b, numeric);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    };
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut written = 0;
    match args.delimiter {
        None => {
            let merged =
                kway_merge::merge_optional_by(|a: &String, b: &String| order(a, b), sources);
            for line in merged.take(limit) {
                check(&failure)?;
                writeln!(out, "{}", line)?;
                written += 1;
            }
        }
        Some(delimiter) => {
            let sources = sources.into_iter().map(|source| {
                source.map(|lines| lines.map(move |line| split_pair(line, delimiter)))
            });
            let merged = kway_merge::merge_optional_pairs_by(
                |k1: &String, _: &Option<String>, k2: &String, _: &Option<String>| order(k1, k2),
                sources,
            );
            for (key, value) in merged.take(limit) {
                check(&failure)?;
                match value {
                    Some(value) => writeln!(out, "{}{}{}", key, delimiter, value)?,
                    None => writeln!(out, "{}", key)?,
                }
                written += 1;
            }
        }
    }
    check(&failure)?;

    Ok(written)
}

fn open_source(
    path: &Path,
    skip_missing: bool,
    failure: &Rc<RefCell<Option<(PathBuf, io::Error)>>>,
) -> anyhow::Result<Option<Lines>> {
    match File::open(path) {
        Ok(file) => Ok(Some(Lines {
            path: path.to_path_buf(),
            inner: BufReader::new(file).lines(),
            failure: failure.clone(),
        })),
        Err(e) if skip_missing && e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "input file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to open {}", path.display())),
    }
}

fn check(failure: &Rc<RefCell<Option<(PathBuf, io::Error)>>>) -> anyhow::Result<()> {
    match failure.borrow_mut().take() {
        Some((path, e)) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        None => Ok(()),
    }
}

fn compare_lines(a: &str, b: &str, numeric: bool) -> Ordering {
    if !numeric {
        return a.cmp(b);
    }

    // Lines that don't parse as numbers sort before all numbers.
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Err(_), Ok(_)) => Ordering::Less,
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn split_pair(line: String, delimiter: char) -> (String, Option<String>) {
    match line.split_once(delimiter) {
        Some((key, value)) => (key.to_string(), Some(value.to_string())),
        None => (line, None),
    }
}

/// Lines of one input file. A read error ends the source and is parked in `failure` so the
/// merge loop can report it.
struct Lines {
    path: PathBuf,
    inner: io::Lines<BufReader<File>>,
    failure: Rc<RefCell<Option<(PathBuf, io::Error)>>>,
}

impl Iterator for Lines {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(line) => Some(line),
            Err(e) => {
                let mut failure = self.failure.borrow_mut();
                if failure.is_none() {
                    *failure = Some((self.path.clone(), e));
                }
                None
            }
        }
    }
}
