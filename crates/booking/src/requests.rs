/// Monotonic sequence for in-flight fetches of one logical query.
///
/// Responses may resolve out of order; a result is applied only while its
/// token is still the latest issued, so superseded responses are discarded
/// instead of overwriting fresher state. This is also the de-facto
/// cancellation mechanism; there is no wire-level cancel.
#[derive(Debug, Default)]
pub struct RequestSeq {
    issued: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestSeq {
    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_issued_wins() {
        let mut seq = RequestSeq::default();
        let r1 = seq.begin();
        let r2 = seq.begin();

        // R1 resolving after R2 was issued is stale.
        assert!(!seq.is_current(r1));
        assert!(seq.is_current(r2));
    }

    #[test]
    fn token_stays_current_until_superseded() {
        let mut seq = RequestSeq::default();
        let r1 = seq.begin();
        assert!(seq.is_current(r1));

        seq.begin();
        assert!(!seq.is_current(r1));
    }
}
