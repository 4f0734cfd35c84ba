//! Human-readable reference numbers handed to customers.

use chrono::NaiveDate;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Order,
    Repair,
}

impl ReferenceKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Order => "CMD",
            Self::Repair => "REP",
        }
    }
}

/// `PREFIX-YYYYMMDD-NNNN`, e.g. `REP-20250123-1234`.
pub fn generate<R: Rng>(kind: ReferenceKind, date: NaiveDate, rng: &mut R) -> String {
    let suffix: u16 = rng.gen_range(0..10_000);
    format!("{}-{}-{:04}", kind.prefix(), date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_reference_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2025, 1, 23).unwrap();
        for _ in 0..50 {
            let r = generate(ReferenceKind::Repair, date, &mut rng);
            assert!(r.starts_with("REP-20250123-"), "{r}");
            assert_eq!(r.len(), "REP-20250123-1234".len());
            assert!(r[13..].bytes().all(|b| b.is_ascii_digit()));
        }
        assert!(generate(ReferenceKind::Order, date, &mut rng).starts_with("CMD-20250123-"));
    }
}
