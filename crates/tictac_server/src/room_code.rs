//! Short, human-typable room codes.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument};

/// Symbols a room code may contain. `0`, `O`, `1` and `I` are left out so a
/// code read aloud or off a screen can't be mistyped.
pub const ROOM_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters per room code.
pub const ROOM_CODE_LEN: usize = 4;

/// Identifier of a live room, e.g. `K7QM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalises client input: surrounding whitespace dropped, upper-cased.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// The code as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code has the generated shape: four alphabet symbols.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ROOM_CODE_LEN && self.0.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
    }
}

/// Draws codes from [`ROOM_CODE_ALPHABET`] until `is_taken` rejects none.
///
/// Each character is drawn uniformly and independently. There is no retry
/// cap: the expected number of draws stays close to one while the registry
/// holds far fewer than 32^4 rooms, but the worst case is unbounded.
#[instrument(skip_all)]
pub fn generate_room_code<R, F>(rng: &mut R, is_taken: F) -> RoomCode
where
    R: Rng + ?Sized,
    F: Fn(&RoomCode) -> bool,
{
    loop {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let pick = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                char::from(ROOM_CODE_ALPHABET[pick])
            })
            .collect();
        let code = RoomCode(code);
        if !is_taken(&code) {
            return code;
        }
        debug!(%code, "Room code already in use, drawing again");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_excludes_ambiguous_glyphs() {
        for glyph in [b'0', b'O', b'1', b'I'] {
            assert!(!ROOM_CODE_ALPHABET.contains(&glyph));
        }
        let unique: HashSet<_> = ROOM_CODE_ALPHABET.iter().collect();
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_generated_codes_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let code = generate_room_code(&mut rng, |_| false);
            assert!(code.is_well_formed(), "{code}");
        }
    }

    #[test]
    fn test_taken_code_is_redrawn() {
        let first = generate_room_code(&mut StdRng::seed_from_u64(42), |_| false);
        let second = generate_room_code(&mut StdRng::seed_from_u64(42), |code| *code == first);
        assert_ne!(first, second);
        assert!(second.is_well_formed());
    }

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(RoomCode::normalize("  k7qm\n").as_str(), "K7QM");
    }
}
