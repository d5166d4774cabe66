use rand::Rng;

/// Alphabet for entry identifiers: digits plus uppercase letters, minus the
/// confusable I, L, O and V.
const LETTERS: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTUWXYZ";

pub const GUID_LEN: usize = 21;

/// A fresh random identifier, e.g. for a new worklog file name.
pub fn guid() -> String {
    let mut rng = rand::rng();
    (0..GUID_LEN)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}
