use rand::Rng;
use rand::distr::Alphanumeric;

/// Generate a short random alphanumeric id
pub(crate) fn short_id(len: usize) -> String {
    rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_requested_length() {
        assert_eq!(short_id(12).len(), 12);
        assert!(short_id(0).is_empty());
    }

    #[test]
    fn alphanumeric_only() {
        assert!(short_id(64).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_differ() {
        assert_ne!(short_id(16), short_id(16));
    }
}
