use crate::*;
use rand::Rng;

/// Six characters from an alphabet without look-alikes, shared out of band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn random() -> Self {
        let ref mut rng = rand::rng();
        Self(
            (0..ROOM_CODE_LEN)
                .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
                .collect(),
        )
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RoomCode {
    type Error = anyhow::Error;
    /// Accepts lowercase input; anything outside the alphabet is refused,
    /// which also keeps codes safe to use as file names.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let upper = s.to_ascii_uppercase();
        if upper.len() != ROOM_CODE_LEN {
            return Err(anyhow::anyhow!("room code must be {} characters", ROOM_CODE_LEN));
        }
        if !upper.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)) {
            return Err(anyhow::anyhow!("invalid room code {}", s));
        }
        Ok(Self(upper))
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn random_codes_use_the_alphabet() {
        for _ in 0..100 {
            let code = RoomCode::random();
            assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
            assert!(code.as_str().bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
            assert!(!code.as_str().contains(['0', 'O', '1', 'I']));
        }
    }
    #[test]
    fn parsing_normalises_case_and_rejects_lookalikes() {
        assert_eq!(RoomCode::try_from("abc234").unwrap().as_str(), "ABC234");
        assert!(RoomCode::try_from("ABC230").is_err());
        assert!(RoomCode::try_from("ABCD").is_err());
        assert!(RoomCode::try_from("../etc").is_err());
    }
}
