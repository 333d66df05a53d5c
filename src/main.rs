mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use gmdp::entropy::{MAX_FLOOR_BITS, MIN_FLOOR_BITS, clamp_floor};
use gmdp::wordlist::DEFAULT_WORDLIST_PATH;
use gmdp::{ClassSet, KeystreamRng, Strategy, Wordlist, generate};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Above this many passwords, show a progress bar on stderr.
const PROGRESS_THRESHOLD: u32 = 1000;

const LONG_ABOUT: &str = "\
Generates passwords from a minimum entropy rather than a length.

The entropy (log2 of the number of passwords the scheme could have produced)
is computed exactly, unit by unit:
  - a block of 4 uppercase letters counts for log2(26^4) bits
  - a BIP39 fragment counts for 11 bits = log2(2048); its case is not counted

By default passwords are built from blocks of 4 characters of the same class,
which avoids switching layouts on smartphone virtual keyboards. With --bip39,
letter blocks are the first 4 letters of words from a BIP39 list; the full
words are listed in the JSON output as a memory aid.";

const EXAMPLES: &str = "\
Examples:
  gmdp
      One password of at least 70 bits, in block mode

  gmdp --raw --chars=uld --brief --many=10
      Ten uniformly sampled passwords of upper, lower and digit characters

  gmdp --chars=uld --bip39 --brief
      Same classes with BIP39 fragments: slightly longer, easier to remember";

#[derive(Parser)]
#[command(
    name = "gmdp",
    version,
    about = "Password generator with exact entropy accounting",
    long_about = LONG_ABOUT,
    after_long_help = EXAMPLES
)]
struct Cli {
    /// Draw every character from the whole pool instead of building blocks
    #[arg(long, conflicts_with = "bip39")]
    raw: bool,

    /// Use fragments of BIP39 words for letter blocks
    #[arg(long)]
    bip39: bool,

    /// BIP39 wordlist to use (exactly 2048 lines)
    #[arg(
        long = "bip39lst",
        value_name = "PATH",
        env = "GMDP_WORDLIST",
        default_value = DEFAULT_WORDLIST_PATH
    )]
    wordlist: PathBuf,

    /// Print only the passwords, one per line
    #[arg(long, conflicts_with = "pretty")]
    brief: bool,

    /// Print a human-readable report instead of JSON
    #[arg(long)]
    pretty: bool,

    /// Minimum entropy in bits, clamped to 40..=1024
    #[arg(long, value_name = "BITS", default_value_t = 70.0)]
    bits: f64,

    /// Character classes: u=upper, l=lower, d=digit, p=punctuation
    #[arg(long, value_name = "SET", default_value = "ludp")]
    chars: ClassSet,

    /// Number of passwords to generate
    #[arg(
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    many: u32,

    /// Prompt for a secret seed; the same seed and options give the same passwords
    #[arg(long)]
    seeded: bool,
}

impl Cli {
    fn strategy(&self) -> Strategy {
        if self.raw {
            Strategy::Uniform
        } else {
            Strategy::Block
        }
    }

    fn format(&self) -> ui::OutputFormat {
        if self.brief {
            ui::OutputFormat::Brief
        } else if self.pretty {
            ui::OutputFormat::Pretty
        } else {
            ui::OutputFormat::Json
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn progress_bar(count: u32) -> ProgressBar {
    if count <= PROGRESS_THRESHOLD {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(u64::from(count));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Everything generation needs, validated before the first password is drawn.
struct Plan {
    strategy: Strategy,
    classes: ClassSet,
    floor: f64,
    wordlist: Option<Wordlist>,
}

impl Plan {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let floor = effective_floor(cli.bits)?;

        let strategy = cli.strategy();
        if strategy == Strategy::Block && cli.chars.len() < 2 {
            anyhow::bail!(
                "Block mode needs at least two character classes (try --chars=ul), or use --raw"
            );
        }

        let wordlist = if cli.bip39 {
            let list = Wordlist::load(&cli.wordlist).context("Cannot use the BIP39 wordlist")?;
            Some(list)
        } else {
            None
        };

        Ok(Self {
            strategy,
            classes: cli.chars,
            floor,
            wordlist,
        })
    }
}

fn effective_floor(bits: f64) -> Result<f64> {
    if !bits.is_finite() {
        anyhow::bail!("--bits must be a finite number, got {}", bits);
    }

    let floor = clamp_floor(bits);
    if floor != bits {
        tracing::warn!(
            requested = bits,
            used = floor,
            "entropy floor outside {}..={} bits, clamped",
            MIN_FLOOR_BITS,
            MAX_FLOOR_BITS
        );
    }
    Ok(floor)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let plan = Plan::from_cli(&cli)?;

    let mut rng = if cli.seeded {
        let seed = ui::prompt_seed()?;
        KeystreamRng::from_seed(seed.as_bytes())
    } else {
        KeystreamRng::from_entropy().context("Failed to seed the random generator")?
    };

    let progress = progress_bar(cli.many);
    let mut results = Vec::with_capacity(cli.many as usize);
    for i in 0..cli.many {
        let result = generate(
            plan.strategy,
            plan.classes,
            plan.floor,
            plan.wordlist.as_ref(),
            &mut rng,
        )
        .with_context(|| format!("Failed to generate password {}", i + 1))?;
        results.push(result);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let request = ui::RequestInfo {
        classes: plan.classes,
        floor: plan.floor,
        strategy: plan.strategy,
        wordlist: plan.wordlist.is_some(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ui::render(
        &mut out,
        &results,
        cli.format(),
        &request,
        &ui::DisplayOptions::detect(),
    )?;

    Ok(())
}
