use crate::charclass::CharClass;

/// Bits credited for one wordlist fragment: log2(2048).
///
/// Upper/lower case folding of the fragment is not counted.
pub const WORD_FRAGMENT_BITS: f64 = 11.0;

pub const MIN_FLOOR_BITS: f64 = 40.0;
pub const MAX_FLOOR_BITS: f64 = 1024.0;

/// Brings a user-supplied entropy floor into `[40, 1024]`.
///
/// Generators never call this; they honor whatever floor they are given.
pub fn clamp_floor(bits: f64) -> f64 {
    bits.clamp(MIN_FLOOR_BITS, MAX_FLOOR_BITS)
}

/// Running total of the information content of emitted units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Entropy {
    bits: f64,
}

impl Entropy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(&self) -> f64 {
        self.bits
    }

    /// One character drawn uniformly from a pool of `size` characters.
    pub fn add_pool_draw(&mut self, size: usize) {
        self.bits += (size as f64).log2();
    }

    /// One character drawn uniformly from `class`.
    pub fn add_character(&mut self, class: CharClass) {
        self.add_pool_draw(class.cardinality());
    }

    pub fn add_word_fragment(&mut self) {
        self.bits += WORD_FRAGMENT_BITS;
    }

    pub fn reaches(&self, floor: f64) -> bool {
        self.bits >= floor
    }
}
