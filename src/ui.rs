use anyhow::{Context, Result};
use console::Style;
use gmdp::{ClassSet, GenerationResult, Strategy};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MIN_SAFE_ENTROPY: f64 = 70.0;
pub const PARANOID_ENTROPY: f64 = 128.0;

pub const MIN_SAFE_PASSWORD_LENGTH: usize = 12;

const JSON_INDENT: &[u8] = b"   ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Brief,
    Pretty,
}

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
}

impl DisplayOptions {
    pub fn detect() -> Self {
        Self {
            unicode_support: supports_unicode::on(supports_unicode::Stream::Stdout),
            color_support: supports_color::on(supports_color::Stream::Stdout).is_some(),
        }
    }
}

/// What the passwords were asked for, shown alongside them in pretty mode.
pub struct RequestInfo {
    pub classes: ClassSet,
    pub floor: f64,
    pub strategy: Strategy,
    pub wordlist: bool,
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn tree_prefixes(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("├─", "└─")
    } else {
        ("|-", "`-")
    }
}

/// Label for an entropy level and whether it counts as safe.
pub fn strength_label(bits: f64) -> (&'static str, bool) {
    if bits >= PARANOID_ENTROPY {
        ("Paranoid", true)
    } else if bits >= MIN_SAFE_ENTROPY {
        ("Strong", true)
    } else {
        ("Weak", false)
    }
}

fn normalize_seed(s: &str) -> String {
    s.trim().nfc().collect()
}

pub fn prompt_seed() -> Result<Zeroizing<String>> {
    let seed = Zeroizing::new(rpassword::prompt_password("Seed: ").context("Failed to read seed")?);
    let normalized = Zeroizing::new(normalize_seed(&seed));

    if normalized.is_empty() {
        anyhow::bail!("Seed cannot be empty");
    }

    Ok(normalized)
}

pub fn render<W: Write>(
    out: &mut W,
    results: &[GenerationResult],
    format: OutputFormat,
    request: &RequestInfo,
    options: &DisplayOptions,
) -> Result<()> {
    match format {
        OutputFormat::Brief => write_brief(out, results),
        OutputFormat::Json => write_json(out, results),
        OutputFormat::Pretty => write_pretty(out, results, request, options),
    }
}

fn write_brief<W: Write>(out: &mut W, results: &[GenerationResult]) -> Result<()> {
    for result in results {
        writeln!(out, "{}", result.password)?;
    }
    Ok(())
}

fn write_json<W: Write>(out: &mut W, results: &[GenerationResult]) -> Result<()> {
    let mut serializer =
        Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(JSON_INDENT));
    results
        .serialize(&mut serializer)
        .context("Failed to serialize passwords")?;
    writeln!(out)?;
    Ok(())
}

fn write_pretty<W: Write>(
    out: &mut W,
    results: &[GenerationResult],
    request: &RequestInfo,
    options: &DisplayOptions,
) -> Result<()> {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (branch, last) = tree_prefixes(options.unicode_support);

    let styled = |secure: bool| {
        if !options.color_support {
            Style::new()
        } else if secure {
            Style::new().green()
        } else {
            Style::new().yellow()
        }
    };

    let strategy = match (request.strategy, request.wordlist) {
        (Strategy::Uniform, _) => "Uniform",
        (Strategy::Block, false) => "Blocks of 4",
        (Strategy::Block, true) => "Blocks of 4 (BIP39 fragments)",
    };

    for (i, result) in results.iter().enumerate() {
        writeln!(out, "Out[{}]:\n{}\n", i, result.password)?;

        let (status_text, entropy_secure) = strength_label(result.bits);
        let entropy_style = styled(entropy_secure);
        let entropy_status = if entropy_secure { check_ok } else { check_warn };

        let length = result.password.chars().count();
        let length_secure = length >= MIN_SAFE_PASSWORD_LENGTH;
        let length_style = styled(length_secure);
        let length_status = if length_secure { check_ok } else { check_warn };

        let mut lines = vec![
            format!(
                "Entropy    {} {} bits ({}, floor {:.0})",
                entropy_style.apply_to(format!("[{}]", entropy_status)),
                entropy_style.apply_to(format!("{:.1}", result.bits)),
                entropy_style.apply_to(status_text),
                request.floor
            ),
            format!(
                "Length     {} {} {}",
                length_style.apply_to(format!("[{}]", length_status)),
                length_style.apply_to(length),
                if length == 1 { "char" } else { "chars" }
            ),
            format!("Classes    {}", request.classes),
            format!("Strategy   {}", strategy),
        ];
        if let Some(words) = &result.fragments {
            lines.push(format!("Mnemonic   {}", words.join(" ")));
        }

        writeln!(out, "Stats:")?;
        let count = lines.len();
        for (j, line) in lines.iter().enumerate() {
            let prefix = if j + 1 == count { last } else { branch };
            writeln!(out, "  {} {}", prefix, line)?;
        }
        writeln!(out)?;
    }

    Ok(())
}
