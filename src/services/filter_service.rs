use crate::models::TransactionRecord;

/// Default notable-fee threshold in lamports
pub const DEFAULT_FEE_THRESHOLD: u64 = 1_000_000;

/// Decides which transactions are worth an alert.
///
/// Implementations must return a sub-sequence of `records` in the original order.
pub trait MevStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify<'a>(&self, records: &'a [TransactionRecord]) -> Vec<&'a TransactionRecord>;
}

/// Flags any transaction whose fee is strictly above a fixed threshold.
/// Records without a fee count as zero and are never flagged.
#[derive(Debug, Clone, Copy)]
pub struct FeeThresholdStrategy {
    threshold: u64,
}

impl FeeThresholdStrategy {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl Default for FeeThresholdStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_THRESHOLD)
    }
}

impl MevStrategy for FeeThresholdStrategy {
    fn name(&self) -> &'static str {
        "fee-threshold"
    }

    fn classify<'a>(&self, records: &'a [TransactionRecord]) -> Vec<&'a TransactionRecord> {
        records
            .iter()
            .filter(|record| record.fee_or_zero() > self.threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(signature: &str, fee: Option<u64>) -> TransactionRecord {
        let record = TransactionRecord::new(signature);
        match fee {
            Some(fee) => record.with_fee(fee),
            None => record,
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let strategy = FeeThresholdStrategy::default();
        assert!(strategy.classify(&[]).is_empty());
    }

    #[test]
    fn test_selects_strictly_above_threshold_in_order() {
        let records = vec![
            record("a", Some(2_000_000)),
            record("b", Some(500)),
            record("c", Some(1_000_000)),
            record("d", Some(1_000_001)),
            record("e", Some(5_000_000)),
        ];

        let notable = FeeThresholdStrategy::new(1_000_000).classify(&records);
        let signatures: Vec<&str> = notable.iter().map(|r| r.signature.as_str()).collect();
        assert_eq!(signatures, vec!["a", "d", "e"]);
    }

    #[test]
    fn test_missing_fee_is_never_selected() {
        let records = vec![record("a", None), record("b", None)];
        assert!(FeeThresholdStrategy::new(0).classify(&records).is_empty());
    }

    #[test]
    fn test_output_is_subsequence_with_fees_above_threshold() {
        let threshold = 1_000;
        let records: Vec<TransactionRecord> = (0..50u64)
            .map(|i| {
                let fee = if i % 7 == 0 { None } else { Some((i * 7919) % 3_000) };
                record(&format!("sig{}", i), fee)
            })
            .collect();

        let notable = FeeThresholdStrategy::new(threshold).classify(&records);

        // Every selected record comes from the input, after the previous selection
        let mut cursor = 0;
        for selected in &notable {
            let position = records[cursor..]
                .iter()
                .position(|r| std::ptr::eq(r, *selected))
                .expect("selected record must come from the input in order");
            cursor += position + 1;
            assert!(selected.fee_or_zero() > threshold);
        }

        let expected = records.iter().filter(|r| r.fee_or_zero() > threshold).count();
        assert_eq!(notable.len(), expected);
    }
}
