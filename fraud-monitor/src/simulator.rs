//! Random transaction generator for exercising the monitor

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::models::TransactionRequest;

const TRANSACTION_TYPES: &[&str] = &["Transfer", "Withdrawal", "Deposit", "Payment"];
const DEVICES: &[&str] = &["iOS", "Android", "Web", "NewDevice", "MobileApp"];
const LOCATIONS: &[&str] = &[
    "NG-LAGOS",
    "NG-ABUJA",
    "NG-KANO",
    "NG-PORT-HARCOURT",
    "US-NEW-YORK",
    "UK-LONDON",
];

pub struct TransactionGenerator {
    rng: StdRng,
}

impl TransactionGenerator {
    /// Seeded generators are reproducible; `None` seeds from entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn next_request(&mut self) -> TransactionRequest {
        TransactionRequest {
            sender_account_number: self.account_number(),
            receiver_account_number: self.account_number(),
            transaction_type: self.pick(TRANSACTION_TYPES),
            amount: Decimal::from(self.rng.gen_range(10_000i64..5_000_000)),
            location: Some(self.pick(LOCATIONS)),
            device: Some(self.pick(DEVICES)),
            ip_address: Some(format!(
                "192.168.{}.{}",
                self.rng.gen_range(1u8..255),
                self.rng.gen_range(1u8..255)
            )),
        }
    }

    pub fn batch(&mut self, count: usize) -> Vec<TransactionRequest> {
        (0..count).map(|_| self.next_request()).collect()
    }

    fn account_number(&mut self) -> String {
        format!("ACC{}", self.rng.gen_range(1_000_000u32..10_000_000))
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }
}

impl Iterator for TransactionGenerator {
    type Item = TransactionRequest;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_request())
    }
}
