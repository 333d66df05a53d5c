pub mod charclass;
pub mod entropy;
pub mod generator;
pub mod rng;
pub mod wordlist;

pub use charclass::{CharClass, ClassSet, ParseClassSetError};
pub use entropy::{Entropy, clamp_floor};
pub use generator::{
    GenerateError, GenerationResult, Strategy, generate, generate_blocks, generate_uniform,
};
pub use rng::{KeystreamRng, RandomSource};
pub use wordlist::{Wordlist, WordlistError};
