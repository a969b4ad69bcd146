//! Linear electricity tariff: a fixed daily service charge plus a flat
//! per-kWh rate. Both rates are configured in cents; costs are in dollars.

/// Cents per dollar.
const CENTS_PER_DOLLAR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    /// Consumption rate, cents per kWh.
    pub rate_c_per_kwh: f64,
    /// Fixed service charge, cents per day.
    pub daily_charge_c: f64,
}

impl Tariff {
    pub fn new(rate_c_per_kwh: f64, daily_charge_c: f64) -> Self {
        Self {
            rate_c_per_kwh,
            daily_charge_c,
        }
    }

    /// Daily service charge in dollars.
    pub fn service_charge(&self) -> f64 {
        self.daily_charge_c / CENTS_PER_DOLLAR
    }

    /// Consumption cost of `kwh` in dollars.
    pub fn usage_cost(&self, kwh: f64) -> f64 {
        kwh * self.rate_c_per_kwh / CENTS_PER_DOLLAR
    }

    /// Total cost of one day that used `kwh`, in dollars.
    ///
    /// ```
    /// use jemena_core::tariff::Tariff;
    ///
    /// let tariff = Tariff::new(20.0, 50.0);
    /// assert!((tariff.daily_cost(10.0) - 2.50).abs() < 1e-9);
    /// ```
    pub fn daily_cost(&self, kwh: f64) -> f64 {
        self.service_charge() + self.usage_cost(kwh)
    }
}
