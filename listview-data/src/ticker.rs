//! Simulated live metrics for the FX board.
//!
//! Each `step` moves every pair's price by a seeded random return and
//! recomputes `change` against the session open, so a pair can cross from
//! gainers to losers between ticks. Feed the stepped pairs back through
//! `ListView::replace_records`; criteria are untouched.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::samples::CurrencyPair;

/// Default per-tick volatility (fraction of price).
pub const DEFAULT_VOLATILITY: f64 = 0.002;

pub struct Ticker {
    rng: StdRng,
    volatility: f64,
}

impl Ticker {
    pub fn new(seed: u64, volatility: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            volatility: volatility.abs(),
        }
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Advance every pair by one tick.
    pub fn step(&mut self, pairs: &mut [CurrencyPair]) {
        for pair in pairs.iter_mut() {
            let u: f64 = self.rng.gen_range(-1.0..=1.0);
            pair.price = (pair.price * (1.0 + self.volatility * u)).max(f64::EPSILON);
            pair.change = if pair.open > 0.0 {
                round2((pair.price / pair.open - 1.0) * 100.0)
            } else {
                0.0
            };
            let jitter: f64 = self.rng.gen_range(0.9..=1.1);
            pair.volume = (pair.volume * jitter).round();
        }
        tracing::debug!(pairs = pairs.len(), "ticker step");
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(42, DEFAULT_VOLATILITY)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::forex_pairs;

    #[test]
    fn same_seed_same_walk() {
        let mut a = forex_pairs();
        let mut b = forex_pairs();
        let mut ta = Ticker::new(7, 0.01);
        let mut tb = Ticker::new(7, 0.01);
        for _ in 0..20 {
            ta.step(&mut a);
            tb.step(&mut b);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn change_tracks_open() {
        let mut pairs = forex_pairs();
        let mut t = Ticker::new(1, 0.05);
        for _ in 0..10 {
            t.step(&mut pairs);
        }
        for p in &pairs {
            let expected = round2((p.price / p.open - 1.0) * 100.0);
            assert!((p.change - expected).abs() < 1e-9, "{}", p.symbol);
            assert!(p.price > 0.0);
            assert!(p.volume >= 0.0);
        }
    }

    #[test]
    fn zero_volatility_keeps_prices() {
        let mut pairs = forex_pairs();
        let before: Vec<f64> = pairs.iter().map(|p| p.price).collect();
        Ticker::new(3, 0.0).step(&mut pairs);
        let after: Vec<f64> = pairs.iter().map(|p| p.price).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn ticks_feed_the_view_without_touching_criteria() {
        use listview_core::ListView;

        let mut pairs = forex_pairs();
        let mut view = ListView::new(pairs.clone(), CurrencyPair::schema());
        view.toggle_category("movement", "gainers");
        let criteria = view.criteria().clone();

        let mut t = Ticker::new(11, 0.02);
        t.step(&mut pairs);
        view.replace_records(pairs.clone());

        assert_eq!(view.criteria(), &criteria);
        let expected: Vec<&str> = pairs
            .iter()
            .filter(|p| p.change > 0.0)
            .map(|p| p.symbol.as_str())
            .collect();
        let got: Vec<&str> = view.rows().map(|p| p.symbol.as_str()).collect();
        assert_eq!(got, expected);
    }
}
