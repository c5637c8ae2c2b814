//! The seam between input generation and whatever consumes the inputs.
//!
//! A [`Fuzzer`] produces strings, a [`Runner`] feeds them to a target and reports an [`Outcome`].
//! ```
//! use treefuzz::fuzzer::{Fuzzer, FunctionRunner, Outcome, RandomFuzzer};
//!
//! let mut fuzzer = RandomFuzzer::new(1, 5, 'a' as u32, 26, Some(7)).unwrap();
//! let mut runner = FunctionRunner::new(|input: &str| input.parse::<u32>());
//! let (_, outcome) = fuzzer.run(&mut runner).unwrap();
//! assert_eq!(outcome, Outcome::Fail);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Write;

use rand::{rngs::StdRng, Rng};

use crate::{
    config::make_rng,
    error::{Error, GenerationError},
};

/// Result of feeding one input to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The target accepted the input
    Pass,
    /// The target failed on the input
    Fail,
    /// Nothing can be said about the input
    Unresolved,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
            Outcome::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}

/// Consumes generated inputs.
pub trait Runner {
    /// What the runner reports besides the outcome.
    type Output;

    /// Run the target with `input`.
    fn run(&mut self, input: &str) -> (Self::Output, Outcome);
}

/// Returns every input unchanged without judging it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRunner;

impl Runner for NullRunner {
    type Output = String;

    fn run(&mut self, input: &str) -> (String, Outcome) {
        (input.to_string(), Outcome::Unresolved)
    }
}

/// Writes every input as a line to a stream.
pub struct PrintRunner<W: Write> {
    stream: W,
}

impl<W: Write> PrintRunner<W> {
    /// Print to `stream`.
    pub fn new(stream: W) -> Self {
        Self {
            stream,
        }
    }

    /// Give the stream back.
    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> Runner for PrintRunner<W> {
    type Output = String;

    fn run(&mut self, input: &str) -> (String, Outcome) {
        if let Err(e) = writeln!(self.stream, "{}", input) {
            log::error!("Could not print input: {}", e);
        }

        (input.to_string(), Outcome::Unresolved)
    }
}

/// Calls a function with every input. `Ok` means [`Outcome::Pass`], `Err` means [`Outcome::Fail`].
pub struct FunctionRunner<F> {
    function: F,
}

impl<F> FunctionRunner<F> {
    /// Wrap `function`.
    pub fn new(function: F) -> Self {
        Self {
            function,
        }
    }
}

impl<F, T, E> Runner for FunctionRunner<F>
where
    F: FnMut(&str) -> Result<T, E>,
{
    type Output = Option<T>;

    fn run(&mut self, input: &str) -> (Option<T>, Outcome) {
        match (self.function)(input) {
            Ok(result) => (Some(result), Outcome::Pass),
            Err(_) => (None, Outcome::Fail),
        }
    }
}

/// Produces inputs.
pub trait Fuzzer {
    /// Create the next input.
    fn fuzz(&mut self) -> Result<String, Error>;

    /// Create an input and feed it to `runner`.
    fn run<R: Runner>(&mut self, runner: &mut R) -> Result<(R::Output, Outcome), Error> {
        let input = self.fuzz()?;
        Ok(runner.run(&input))
    }

    /// Do [`run`](Fuzzer::run) `trials` times.
    fn runs<R: Runner>(&mut self, runner: &mut R, trials: usize) -> Result<Vec<(R::Output, Outcome)>, Error> {
        (0..trials).map(|_| self.run(runner)).collect()
    }
}

/// Produces strings of random length made of random characters.
#[derive(Debug)]
pub struct RandomFuzzer {
    min_length: usize,
    max_length: usize,
    char_start: u32,
    char_range: u32,
    rng: StdRng,
}

impl RandomFuzzer {
    /// Strings of `min_length..=max_length` characters from `char_start..char_start + char_range`.
    ///
    /// The range must be non-empty and consist of valid `char`s only.
    pub fn new(
        min_length: usize,
        max_length: usize,
        char_start: u32,
        char_range: u32,
        seed: Option<u64>,
    ) -> Result<Self, GenerationError> {
        if min_length > max_length {
            return Err(GenerationError::InvalidBounds {
                min: min_length,
                max: max_length,
            });
        }

        let valid = char_start
            .checked_add(char_range)
            .filter(|&end| end > char_start && end - 1 <= char::MAX as u32)
            .is_some_and(|end| end <= SURROGATES.0 || char_start > SURROGATES.1);

        if !valid {
            return Err(GenerationError::InvalidCharRange {
                start: char_start,
                range: char_range,
            });
        }

        Ok(Self {
            min_length,
            max_length,
            char_start,
            char_range,
            rng: make_rng(seed),
        })
    }
}

/// Code points that are not `char`s.
const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

impl Default for RandomFuzzer {
    fn default() -> Self {
        Self {
            min_length: 10,
            max_length: 100,
            char_start: 32,
            char_range: 32,
            rng: make_rng(None),
        }
    }
}

impl Fuzzer for RandomFuzzer {
    fn fuzz(&mut self) -> Result<String, Error> {
        let length = self.rng.random_range(self.min_length..=self.max_length);
        let (start, end) = (self.char_start, self.char_start + self.char_range);

        // The range was checked in new(), so nothing is dropped here
        Ok((0..length)
            .filter_map(|_| char::from_u32(self.rng.random_range(start..end)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_fuzzer() {
        let mut fuzzer = RandomFuzzer::new(20, 20, 32, 32, Some(0)).unwrap();

        for _ in 0..10 {
            let input = fuzzer.fuzz().unwrap();
            assert_eq!(input.chars().count(), 20);
            assert!(input.chars().all(|c| (' '..'@').contains(&c)));
        }

        assert!(RandomFuzzer::new(2, 1, 32, 32, None).is_err());
    }

    #[test]
    fn test_char_range() {
        for (start, range) in [(u32::MAX, 1), (32, 0), (0xD800, 32), (0xD000, 0x1000), (0x10FFFF, 2)] {
            assert_eq!(
                RandomFuzzer::new(1, 1, start, range, Some(0)).unwrap_err(),
                GenerationError::InvalidCharRange { start, range },
            );
        }

        for (start, range) in [(0xD000, 0x800), (0xE000, 32), (0x10FFFF, 1)] {
            let mut fuzzer = RandomFuzzer::new(5, 5, start, range, Some(0)).unwrap();
            assert_eq!(fuzzer.fuzz().unwrap().chars().count(), 5);
        }
    }

    #[test]
    fn test_print_runner() {
        let mut fuzzer = RandomFuzzer::new(3, 3, 'a' as u32, 1, Some(1)).unwrap();
        let mut runner = PrintRunner::new(Vec::new());
        let results = fuzzer.runs(&mut runner, 2).unwrap();

        assert_eq!(results, vec![
            ("aaa".to_string(), Outcome::Unresolved),
            ("aaa".to_string(), Outcome::Unresolved),
        ]);
        assert_eq!(runner.into_inner(), b"aaa\naaa\n");
    }

    #[test]
    fn test_function_runner() {
        let mut runner = FunctionRunner::new(|input: &str| input.parse::<u8>());
        assert_eq!(runner.run("12"), (Some(12), Outcome::Pass));
        assert_eq!(runner.run("x"), (None, Outcome::Fail));
        assert_eq!(NullRunner.run("x"), ("x".to_string(), Outcome::Unresolved));
        assert_eq!(Outcome::Unresolved.to_string(), "UNRESOLVED");
    }
}
