// services/fees.rs
//
// All monetary values are integers in minor units (e.g. cents) to avoid
// floating-point precision issues. Each derived field is rounded half-up
// independently; sums are never rounded.
use serde::{Deserialize, Serialize};

use crate::service::error::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    pub fixed_fee_minor: i64,
    pub fee_rate: f64,
    pub tax_rate: f64,
}

impl FeeConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.fixed_fee_minor < 0 {
            return Err(ServiceError::Configuration(format!(
                "fixed fee must be >= 0, got {}",
                self.fixed_fee_minor
            )));
        }
        if !(0.0..=1.0).contains(&self.fee_rate) || !self.fee_rate.is_finite() {
            return Err(ServiceError::Configuration(format!(
                "fee rate must be within [0, 1], got {}",
                self.fee_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.tax_rate) || !self.tax_rate.is_finite() {
            return Err(ServiceError::Configuration(format!(
                "tax rate must be within [0, 1], got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }
}

/// Itemized money breakdown for funding one contract.
///
/// Invariant: total_provider_payment_minor ==
/// amount_received_minor + platform_fee_minor + total_tax_minor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub service_amount_minor: i64,
    pub platform_fee_minor: i64,
    pub provider_tax_minor: i64,
    pub tasker_tax_minor: i64,
    pub total_tax_minor: i64,
    pub total_provider_payment_minor: i64,
    pub amount_received_minor: i64,
}

fn round_half_up(value: f64) -> i64 {
    // Inputs are non-negative products, so round() is round-half-up here.
    value.round() as i64
}

pub fn compute_fee_breakdown(
    service_amount_minor: i64,
    config: &FeeConfig,
) -> Result<FeeBreakdown, ServiceError> {
    if service_amount_minor <= 0 {
        return Err(ServiceError::Validation(format!(
            "service amount must be a positive integer in minor units, got {}",
            service_amount_minor
        )));
    }
    config.validate()?;

    let platform_fee_minor =
        round_half_up(service_amount_minor as f64 * config.fee_rate) + config.fixed_fee_minor;

    let provider_taxable_minor = service_amount_minor + platform_fee_minor;
    let provider_tax_minor = round_half_up(provider_taxable_minor as f64 * config.tax_rate);

    // The tasker bears no tax under the current model.
    let tasker_tax_minor = 0;
    let total_tax_minor = provider_tax_minor + tasker_tax_minor;

    let total_provider_payment_minor = service_amount_minor + platform_fee_minor + provider_tax_minor;

    // The tasker always receives the full listed amount, no deduction.
    let amount_received_minor = service_amount_minor;

    Ok(FeeBreakdown {
        service_amount_minor,
        platform_fee_minor,
        provider_tax_minor,
        tasker_tax_minor,
        total_tax_minor,
        total_provider_payment_minor,
        amount_received_minor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_config() -> FeeConfig {
        FeeConfig {
            fixed_fee_minor: 500,
            fee_rate: 0.10,
            tax_rate: 0.13,
        }
    }

    #[test]
    fn test_itemized_breakdown_for_100_units() {
        // $100.00 service, $5.00 fixed fee, 10% fee, 13% tax
        let breakdown = compute_fee_breakdown(10_000, &standard_config()).unwrap();

        assert_eq!(breakdown.platform_fee_minor, 1_500);
        assert_eq!(breakdown.provider_tax_minor, 1_495); // round(11500 * 0.13)
        assert_eq!(breakdown.tasker_tax_minor, 0);
        assert_eq!(breakdown.total_tax_minor, 1_495);
        assert_eq!(breakdown.total_provider_payment_minor, 12_995);
        assert_eq!(breakdown.amount_received_minor, 10_000);
    }

    #[test]
    fn test_conservation_law_holds_across_amounts() {
        let config = standard_config();
        for amount in [1, 7, 99, 100, 2_499, 10_000, 123_456, 99_999_999] {
            let b = compute_fee_breakdown(amount, &config).unwrap();
            assert_eq!(
                b.total_provider_payment_minor,
                b.amount_received_minor + b.platform_fee_minor + b.total_tax_minor,
                "conservation broken for amount {}",
                amount
            );
        }
    }

    #[test]
    fn test_conservation_law_with_awkward_rates() {
        let config = FeeConfig {
            fixed_fee_minor: 37,
            fee_rate: 0.0333,
            tax_rate: 0.0775,
        };
        for amount in 1..=2_000 {
            let b = compute_fee_breakdown(amount, &config).unwrap();
            assert_eq!(
                b.total_provider_payment_minor,
                b.amount_received_minor + b.platform_fee_minor + b.total_tax_minor
            );
        }
    }

    #[test]
    fn test_fee_is_monotonic_in_service_amount() {
        let config = standard_config();
        let mut prev_fee = 0;
        let mut prev_total = 0;
        for amount in 1..=5_000 {
            let b = compute_fee_breakdown(amount, &config).unwrap();
            assert!(b.platform_fee_minor >= prev_fee);
            assert!(b.total_provider_payment_minor >= prev_total);
            prev_fee = b.platform_fee_minor;
            prev_total = b.total_provider_payment_minor;
        }
    }

    #[test]
    fn test_tasker_always_receives_full_amount() {
        let configs = [
            standard_config(),
            FeeConfig { fixed_fee_minor: 0, fee_rate: 0.0, tax_rate: 0.0 },
            FeeConfig { fixed_fee_minor: 10_000, fee_rate: 1.0, tax_rate: 1.0 },
        ];
        for config in &configs {
            for amount in [1, 500, 10_000] {
                let b = compute_fee_breakdown(amount, config).unwrap();
                assert_eq!(b.amount_received_minor, amount);
            }
        }
    }

    #[test]
    fn test_zero_and_negative_amounts_are_rejected() {
        let config = standard_config();
        assert!(matches!(
            compute_fee_breakdown(0, &config),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            compute_fee_breakdown(-100, &config),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_out_of_range_rates_are_configuration_errors() {
        let bad_fee_rate = FeeConfig { fixed_fee_minor: 0, fee_rate: 1.5, tax_rate: 0.1 };
        let bad_tax_rate = FeeConfig { fixed_fee_minor: 0, fee_rate: 0.1, tax_rate: -0.1 };
        let bad_fixed = FeeConfig { fixed_fee_minor: -1, fee_rate: 0.1, tax_rate: 0.1 };

        assert!(matches!(
            compute_fee_breakdown(1_000, &bad_fee_rate),
            Err(ServiceError::Configuration(_))
        ));
        assert!(matches!(
            compute_fee_breakdown(1_000, &bad_tax_rate),
            Err(ServiceError::Configuration(_))
        ));
        assert!(matches!(
            compute_fee_breakdown(1_000, &bad_fixed),
            Err(ServiceError::Configuration(_))
        ));
    }

    #[test]
    fn test_rounding_is_half_up_per_field() {
        // 50 * 0.01 = 0.5 rounds up to 1
        let config = FeeConfig { fixed_fee_minor: 0, fee_rate: 0.01, tax_rate: 0.0 };
        let b = compute_fee_breakdown(50, &config).unwrap();
        assert_eq!(b.platform_fee_minor, 1);
    }
}
