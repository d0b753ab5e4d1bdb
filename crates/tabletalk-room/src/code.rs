//! Room code generation.

use rand::Rng;
use tabletalk_protocol::{RoomCode, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};

/// Source of candidate room codes.
///
/// The registry checks candidates against active rooms and retries on
/// collision. A generator never needs to know which codes are taken.
pub trait CodeGenerator: Send + 'static {
    /// Produces the next candidate code.
    fn generate(&mut self) -> RoomCode;
}

impl CodeGenerator for Box<dyn CodeGenerator> {
    fn generate(&mut self) -> RoomCode {
        (**self).generate()
    }
}

/// Uniform draws of [`ROOM_CODE_LEN`] characters from
/// [`ROOM_CODE_ALPHABET`] (36^4 ≈ 1.68M codes).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeGenerator for RandomCodes {
    fn generate(&mut self) -> RoomCode {
        let mut rng = rand::rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect();
        RoomCode::from(code)
    }
}

/// Hands out a fixed sequence of codes, repeating the last one once the
/// sequence runs out. Falls back to [`RandomCodes`] if built empty.
///
/// Useful for tests and demos that need predictable codes.
#[derive(Debug, Clone)]
pub struct ScriptedCodes {
    codes: Vec<RoomCode>,
    next: usize,
}

impl ScriptedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RoomCode>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&mut self) -> RoomCode {
        let Some(last) = self.codes.len().checked_sub(1) else {
            return RandomCodes.generate();
        };
        let code = self.codes[self.next.min(last)].clone();
        self.next += 1;
        code
    }
}
