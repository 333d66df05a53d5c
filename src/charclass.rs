use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const UPPER: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const LOWER: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const DIGIT: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

const PUNCT: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '+', '=', '~', '[', ']', '{', '}',
    '|', ':', ';', '\\', '<', '>', ',', '.', '?', '/',
];

/// One of the four disjoint character classes a password is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    Punct,
}

impl CharClass {
    pub const ALL: [CharClass; 4] = [
        CharClass::Upper,
        CharClass::Lower,
        CharClass::Digit,
        CharClass::Punct,
    ];

    pub fn chars(self) -> &'static [char] {
        match self {
            CharClass::Upper => UPPER,
            CharClass::Lower => LOWER,
            CharClass::Digit => DIGIT,
            CharClass::Punct => PUNCT,
        }
    }

    pub fn cardinality(self) -> usize {
        self.chars().len()
    }

    /// Returns the class `c` belongs to, if any.
    pub fn of(c: char) -> Option<CharClass> {
        Self::ALL.into_iter().find(|class| class.chars().contains(&c))
    }

    /// Single-letter code used on the command line (`u`, `l`, `d`, `p`).
    pub fn letter(self) -> char {
        match self {
            CharClass::Upper => 'u',
            CharClass::Lower => 'l',
            CharClass::Digit => 'd',
            CharClass::Punct => 'p',
        }
    }

    pub fn from_letter(letter: char) -> Option<CharClass> {
        Self::ALL.into_iter().find(|class| class.letter() == letter)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharClass::Upper => "upper",
            CharClass::Lower => "lower",
            CharClass::Digit => "digit",
            CharClass::Punct => "punct",
        };
        f.write_str(name)
    }
}

/// A set of character classes, stored as a 4-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassSet(u8);

impl ClassSet {
    pub const fn empty() -> Self {
        ClassSet(0)
    }

    pub const fn all() -> Self {
        ClassSet(0b1111)
    }

    pub fn contains(self, class: CharClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn insert(&mut self, class: CharClass) {
        self.0 |= class.bit();
    }

    #[must_use]
    pub fn with(self, class: CharClass) -> Self {
        ClassSet(self.0 | class.bit())
    }

    #[must_use]
    pub fn without(self, class: CharClass) -> Self {
        ClassSet(self.0 & !class.bit())
    }

    #[must_use]
    pub fn difference(self, other: ClassSet) -> Self {
        ClassSet(self.0 & !other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates in registry order: upper, lower, digit, punct.
    pub fn iter(self) -> impl Iterator<Item = CharClass> {
        CharClass::ALL
            .into_iter()
            .filter(move |class| self.contains(*class))
    }

    /// Union of the member classes' characters, in registry order.
    pub fn universe(self) -> Vec<char> {
        self.iter()
            .flat_map(|class| class.chars().iter().copied())
            .collect()
    }
}

impl FromIterator<CharClass> for ClassSet {
    fn from_iter<I: IntoIterator<Item = CharClass>>(iter: I) -> Self {
        iter.into_iter().fold(ClassSet::empty(), ClassSet::with)
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter().try_for_each(|class| write!(f, "{}", class.letter()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseClassSetError {
    #[error("Unknown character class \"{0}\" (expected u, l, d or p)")]
    UnknownClass(char),
    #[error("At least one character class is required")]
    Empty,
}

impl FromStr for ClassSet {
    type Err = ParseClassSetError;

    /// Parses letter codes such as `"ludp"`. Repeated letters are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let set = s
            .chars()
            .map(|c| CharClass::from_letter(c).ok_or(ParseClassSetError::UnknownClass(c)))
            .collect::<Result<ClassSet, _>>()?;

        if set.is_empty() {
            return Err(ParseClassSetError::Empty);
        }
        Ok(set)
    }
}
