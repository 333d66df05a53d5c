use crate::charclass::{CharClass, ClassSet};
use crate::entropy::Entropy;
use crate::rng::RandomSource;
use crate::wordlist::{Wordlist, fragment};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Characters per block in the block strategy.
pub const BLOCK_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every character drawn from the union of the requested classes.
    Uniform,
    /// Single-class blocks of four, optionally separated by punctuation.
    Block,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("At least one character class must be requested")]
    EmptyClassSet,
    #[error("Block generation needs at least 2 character classes, got {found}")]
    TooFewClasses { found: usize },
    #[error("Entropy floor must be a finite number of bits, got {0}")]
    InvalidFloor(f64),
    #[error(
        "Internal error: no class can follow the previous block \
         (requested \"{requested}\", covered \"{coverage}\")"
    )]
    NoEligibleClass {
        requested: ClassSet,
        coverage: ClassSet,
        previous: Option<CharClass>,
    },
}

/// A generated password with its exact entropy.
///
/// Serializes as `{"mdp": ..., "bits": ..., "mnemo": [...]}`; `mnemo` only
/// appears when wordlist fragments were used.
#[derive(Debug, Clone, PartialEq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct GenerationResult {
    #[serde(rename = "mdp")]
    pub password: String,
    pub bits: f64,
    /// Full words whose fragments were embedded, in emission order.
    #[serde(rename = "mnemo", skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Vec<String>>,
}

pub fn generate<R: RandomSource>(
    strategy: Strategy,
    classes: ClassSet,
    floor: f64,
    wordlist: Option<&Wordlist>,
    rng: &mut R,
) -> Result<GenerationResult, GenerateError> {
    match strategy {
        Strategy::Uniform => generate_uniform(classes, floor, rng),
        Strategy::Block => generate_blocks(classes, floor, wordlist, rng),
    }
}

fn check_floor(floor: f64) -> Result<(), GenerateError> {
    if floor.is_finite() {
        Ok(())
    } else {
        Err(GenerateError::InvalidFloor(floor))
    }
}

/// Draws characters uniformly from the union of `classes` until the password
/// carries at least `floor` bits and every class has appeared.
pub fn generate_uniform<R: RandomSource>(
    classes: ClassSet,
    floor: f64,
    rng: &mut R,
) -> Result<GenerationResult, GenerateError> {
    check_floor(floor)?;
    if classes.is_empty() {
        return Err(GenerateError::EmptyClassSet);
    }

    let universe = classes.universe();
    let mut password = String::new();
    let mut entropy = Entropy::new();
    let mut coverage = ClassSet::empty();

    while !entropy.reaches(floor) || coverage != classes {
        let c = *rng.pick(&universe);
        password.push(c);
        entropy.add_pool_draw(universe.len());
        if let Some(class) = CharClass::of(c) {
            coverage.insert(class);
        }
    }

    debug!(
        classes = %classes,
        length = password.len(),
        bits = entropy.bits(),
        "uniform password generated"
    );

    Ok(GenerationResult {
        password,
        bits: entropy.bits(),
        fragments: None,
    })
}

/// Classes allowed for the next block.
///
/// Until every requested class has shown up, only uncovered ones qualify.
/// Afterwards any non-punctuation class does, except a second digit block.
/// The previous block's class is never repeated.
fn eligible_classes(
    requested: ClassSet,
    coverage: ClassSet,
    previous: Option<CharClass>,
    digit_used: bool,
) -> ClassSet {
    let mut eligible = requested.without(CharClass::Punct);

    if coverage == requested {
        if digit_used {
            eligible = eligible.without(CharClass::Digit);
        }
    } else {
        eligible = eligible.difference(coverage);
    }

    match previous {
        Some(class) => eligible.without(class),
        None => eligible,
    }
}

/// Builds a password from single-class blocks of [`BLOCK_LEN`] characters.
///
/// When punctuation is requested, one punctuation character separates
/// consecutive blocks. With a wordlist, letter blocks are replaced by the
/// case-folded fragment of a random word.
pub fn generate_blocks<R: RandomSource>(
    classes: ClassSet,
    floor: f64,
    wordlist: Option<&Wordlist>,
    rng: &mut R,
) -> Result<GenerationResult, GenerateError> {
    check_floor(floor)?;
    if classes.is_empty() {
        return Err(GenerateError::EmptyClassSet);
    }
    if classes.len() < 2 {
        return Err(GenerateError::TooFewClasses {
            found: classes.len(),
        });
    }

    let separated = classes.contains(CharClass::Punct);

    let mut password = String::new();
    let mut entropy = Entropy::new();
    let mut words = Vec::new();

    let mut coverage = ClassSet::empty();
    let mut previous: Option<CharClass> = None;
    let mut digit_used = false;

    while !entropy.reaches(floor) || coverage != classes {
        if separated && previous.is_some() {
            password.push(*rng.pick(CharClass::Punct.chars()));
            entropy.add_character(CharClass::Punct);
            coverage.insert(CharClass::Punct);
        }

        let eligible: Vec<CharClass> = eligible_classes(classes, coverage, previous, digit_used)
            .iter()
            .collect();
        if eligible.is_empty() {
            return Err(GenerateError::NoEligibleClass {
                requested: classes,
                coverage,
                previous,
            });
        }
        let class = *rng.pick(&eligible);

        match wordlist {
            Some(list) if class != CharClass::Digit => {
                let word = list.word(rng.below(list.len()));
                let piece = fragment(word);
                if class == CharClass::Upper {
                    password.push_str(&piece.to_uppercase());
                } else {
                    password.push_str(&piece.to_lowercase());
                }
                entropy.add_word_fragment();
                words.push(word.to_string());
            }
            _ => {
                for _ in 0..BLOCK_LEN {
                    password.push(*rng.pick(class.chars()));
                    entropy.add_character(class);
                }
            }
        }
        trace!(class = %class, bits = entropy.bits(), "block emitted");

        if class == CharClass::Digit {
            digit_used = true;
        }
        previous = Some(class);
        coverage.insert(class);
    }

    debug!(
        classes = %classes,
        length = password.chars().count(),
        bits = entropy.bits(),
        fragments = words.len(),
        "block password generated"
    );

    Ok(GenerationResult {
        password,
        bits: entropy.bits(),
        fragments: wordlist.map(|_| words),
    })
}
