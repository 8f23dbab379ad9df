use crate::core::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Tolerance of the payout conservation check, absolute for payouts up to 1
/// and relative to the larger leg beyond that.
pub const CONSERVATION_TOLERANCE: f64 = 1e-4;

/// Largest accepted leverage.
pub const MAX_LEVERAGE: f64 = 1e6;

/// How the collateral is split between the two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutFormula {
    /// Both legs share the collateral valued at the final rate.
    #[default]
    Symmetric,
    /// Legacy exploratory variant: legs share the collateral valued at the
    /// start rate and the whole FX revaluation of the collateral is paid to
    /// the EURshort leg. Kept for comparison with earlier studies only.
    PremiumSplit,
}

/// Redemption values of one EURlong and one EURshort certificate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapPayout {
    pub eur_long: f64,
    pub eur_short: f64,
    /// Collateral backing the pair, valued in USD at the final rate.
    pub collateral: f64,
}

impl SwapPayout {
    pub fn total(&self) -> f64 {
        self.eur_long + self.eur_short
    }
}

/// A leveraged EUR/USD swap certificate pair.
///
/// Investors buy one EURlong and one EURshort certificate at a price of 1
/// each. The 2 USD raised are held as collateral, a share
/// `usd_asset_allocation` in USD deposits and the rest converted to EUR
/// deposits at the start rate. At maturity the EURlong leg gains
/// `leverage` times the relative EUR appreciation and the EURshort leg
/// loses the same amount, so the two legs always redeem the whole
/// collateral between them.
///
/// # Examples
///
/// ```
/// use swap_payout_sim::contract::swap::SwapContract;
///
/// let contract = SwapContract::new(1.0, 0.5, 5.0).unwrap();
///
/// // No exchange-rate movement: each certificate returns its purchase price.
/// let flat = contract.payout(1.0);
/// assert!((flat.eur_long - 1.0).abs() < 1e-12);
/// assert!((flat.eur_short - 1.0).abs() < 1e-12);
///
/// // EUR up 10% with 5x leverage.
/// let up = contract.payout(1.1);
/// assert!((up.eur_long - 1.575).abs() < 1e-12);
/// assert!((up.eur_short - 0.525).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SwapContractFields")]
pub struct SwapContract {
    start_exchange_rate: f64,
    usd_asset_allocation: f64,
    leverage: f64,
    return_on_euro_deposits: f64,
    return_on_usd_deposits: f64,
    formula: PayoutFormula,
}

#[derive(Deserialize)]
struct SwapContractFields {
    start_exchange_rate: f64,
    usd_asset_allocation: f64,
    leverage: f64,
    return_on_euro_deposits: f64,
    return_on_usd_deposits: f64,
    formula: PayoutFormula,
}

impl TryFrom<SwapContractFields> for SwapContract {
    type Error = SimulationError;

    fn try_from(fields: SwapContractFields) -> Result<Self> {
        Ok(
            Self::new(fields.start_exchange_rate, fields.usd_asset_allocation, fields.leverage)?
                .with_deposit_returns(fields.return_on_euro_deposits, fields.return_on_usd_deposits)?
                .with_formula(fields.formula),
        )
    }
}

impl SwapContract {
    /// Create a contract with zero deposit returns and the symmetric formula.
    ///
    /// Fails with [`SimulationError::InvalidParameter`] unless
    /// `1 < leverage <= MAX_LEVERAGE`, `0 <= usd_asset_allocation <= 1` and
    /// `start_exchange_rate > 0`.
    pub fn new(start_exchange_rate: f64, usd_asset_allocation: f64, leverage: f64) -> Result<Self> {
        if !(start_exchange_rate.is_finite() && start_exchange_rate > 0.0) {
            return Err(SimulationError::invalid(
                "start_exchange_rate",
                start_exchange_rate,
                "must be positive",
            ));
        }
        validate_allocation(usd_asset_allocation)?;
        validate_leverage(leverage)?;
        Ok(Self {
            start_exchange_rate,
            usd_asset_allocation,
            leverage,
            return_on_euro_deposits: 0.0,
            return_on_usd_deposits: 0.0,
            formula: PayoutFormula::default(),
        })
    }

    /// Set the interest earned on the EUR and USD deposits over the term.
    pub fn with_deposit_returns(
        mut self,
        return_on_euro_deposits: f64,
        return_on_usd_deposits: f64,
    ) -> Result<Self> {
        validate_deposit_return("return_on_euro_deposits", return_on_euro_deposits)?;
        validate_deposit_return("return_on_usd_deposits", return_on_usd_deposits)?;
        self.return_on_euro_deposits = return_on_euro_deposits;
        self.return_on_usd_deposits = return_on_usd_deposits;
        Ok(self)
    }

    pub fn with_formula(mut self, formula: PayoutFormula) -> Self {
        self.formula = formula;
        self
    }

    // --- Accessors ---

    pub fn start_exchange_rate(&self) -> f64 {
        self.start_exchange_rate
    }

    pub fn usd_asset_allocation(&self) -> f64 {
        self.usd_asset_allocation
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    pub fn formula(&self) -> PayoutFormula {
        self.formula
    }

    /// EUR and USD deposit balances at maturity, before conversion.
    fn deposits_at_maturity(&self) -> (f64, f64) {
        let euro = 2.0 * (1.0 - self.usd_asset_allocation) / self.start_exchange_rate;
        let usd = 2.0 * self.usd_asset_allocation;
        (
            euro * (1.0 + self.return_on_euro_deposits),
            usd * (1.0 + self.return_on_usd_deposits),
        )
    }

    /// USD value of the collateral at maturity, with EUR deposits converted
    /// at `exchange_rate`.
    pub fn collateral_value(&self, exchange_rate: f64) -> f64 {
        let (euro, usd) = self.deposits_at_maturity();
        usd + euro * exchange_rate
    }

    /// EURlong and EURshort payout factors. They always sum to 2.
    pub fn payout_factors(&self, final_exchange_rate: f64) -> (f64, f64) {
        let change = (final_exchange_rate - self.start_exchange_rate) / self.start_exchange_rate;
        let long = 1.0 + self.leverage * change;
        (long, 2.0 - long)
    }

    /// Redemption values for one terminal exchange rate.
    ///
    /// # Panics
    ///
    /// Panics if the legs do not redeem the collateral within
    /// [`CONSERVATION_TOLERANCE`]. That can only happen through a defect
    /// in this function.
    pub fn payout(&self, final_exchange_rate: f64) -> SwapPayout {
        let collateral = self.collateral_value(final_exchange_rate);
        let (long_factor, short_factor) = self.payout_factors(final_exchange_rate);

        let (eur_long, eur_short) = match self.formula {
            PayoutFormula::Symmetric => (
                long_factor * collateral / 2.0,
                short_factor * collateral / 2.0,
            ),
            PayoutFormula::PremiumSplit => {
                let collateral_ex_premium = self.collateral_value(self.start_exchange_rate);
                let forex_premium = collateral - collateral_ex_premium;
                (
                    long_factor * collateral_ex_premium / 2.0,
                    short_factor * collateral_ex_premium / 2.0 + forex_premium,
                )
            }
        };

        assert!(
            (eur_long + eur_short - collateral).abs()
                <= CONSERVATION_TOLERANCE * eur_long.abs().max(eur_short.abs()).max(1.0),
            "payout conservation violated: {} + {} != {} at rate {}",
            eur_long,
            eur_short,
            collateral,
            final_exchange_rate
        );

        SwapPayout {
            eur_long,
            eur_short,
            collateral,
        }
    }

    /// Elementwise [`payout`](Self::payout) over terminal exchange rates.
    pub fn payout_series(&self, final_exchange_rates: &[f64]) -> Vec<SwapPayout> {
        final_exchange_rates
            .iter()
            .map(|&rate| self.payout(rate))
            .collect()
    }
}

/// One-shot payout of a certificate pair over several terminal rates.
pub fn payout_currency_swap(
    final_exchange_rates: &[f64],
    start_exchange_rate: f64,
    usd_asset_allocation: f64,
    leverage: f64,
    return_on_euro_deposits: f64,
    return_on_usd_deposits: f64,
) -> Result<Vec<SwapPayout>> {
    let contract = SwapContract::new(start_exchange_rate, usd_asset_allocation, leverage)?
        .with_deposit_returns(return_on_euro_deposits, return_on_usd_deposits)?;
    Ok(contract.payout_series(final_exchange_rates))
}

pub(crate) fn validate_leverage(leverage: f64) -> Result<()> {
    if !(leverage.is_finite() && leverage > 1.0) {
        return Err(SimulationError::invalid(
            "leverage",
            leverage,
            "must be greater than 1",
        ));
    }
    if leverage > MAX_LEVERAGE {
        return Err(SimulationError::invalid(
            "leverage",
            leverage,
            "must not exceed 1e6",
        ));
    }
    Ok(())
}

pub(crate) fn validate_allocation(allocation: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&allocation) {
        return Err(SimulationError::invalid(
            "usd_asset_allocation",
            allocation,
            "must lie in [0, 1]",
        ));
    }
    Ok(())
}

pub(crate) fn validate_deposit_return(name: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > -1.0) {
        return Err(SimulationError::invalid(
            name,
            value,
            "must be finite and greater than -1",
        ));
    }
    Ok(())
}
