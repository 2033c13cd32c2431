//! Modelo de ejemplo: valor presente de un seguro temporal.
//!
//! Las tasas de mortalidad se eligen con un `Dispatcher` por (tabla, sexo);
//! el resto de los steps son cálculos actuariales directos.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use footings_core::{step, Argument, Attribute, Model, ModelDecl, ValueKind};
use footings_dispatch::{Dispatcher, DispatcherKeyError};

/// Edad de emisión y años a proyectar.
#[derive(Debug, Clone, Copy)]
pub struct MortalityQuery {
    pub issue_age: u32,
    pub years: u32,
}

fn gompertz(a: f64, b: f64) -> impl Fn(MortalityQuery) -> Vec<f64> + Send + Sync + 'static {
    move |q: MortalityQuery| {
        (0..q.years).map(|t| (a * (b * f64::from(q.issue_age + t)).exp()).min(1.0))
                    .collect()
    }
}

/// Tasas de mortalidad anuales por (tabla, sexo).
pub static MORTALITY: Lazy<Dispatcher<MortalityQuery, Vec<f64>>> = Lazy::new(|| {
    let tables = Dispatcher::new("mortality", ["table", "gender"]);
    let registrations = [(gompertz(0.000_05, 0.09), json!({"table": "2017-CSO", "gender": "M"})),
                         (gompertz(0.000_03, 0.09), json!({"table": "2017-CSO", "gender": "F"})),
                         (gompertz(0.000_07, 0.088), json!({"table": "2001-CSO", "gender": "M"})),
                         (gompertz(0.000_04, 0.088), json!({"table": "2001-CSO", "gender": "F"}))];
    for (rates, keys) in registrations {
        if let Err(e) = tables.register(rates, keys) {
            log::error!("{e}");
        }
    }
    if let Err(e) = tables.register(|q: MortalityQuery| vec![0.01; q.years as usize],
                                    json!({"table": "flat", "gender": ["M", "F", "U"]}))
    {
        log::error!("{e}");
    }
    tables
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReserve {
    pub issue_age: u32,
    pub gender: String,
    pub table: String,
    pub benefit: f64,
    pub interest_rate: f64,
    pub term: u32,
    pub mortality: Vec<f64>,
    pub survival: Vec<f64>,
    pub discount: Vec<f64>,
    pub pv_benefits: f64,
    pub net_premium: f64,
}

impl TermReserve {
    pub fn new(issue_age: u32, gender: &str, table: &str, benefit: f64, interest_rate: f64, term: u32) -> Self {
        Self { issue_age,
               gender: gender.to_string(),
               table: table.to_string(),
               benefit,
               interest_rate,
               term,
               mortality: Vec::new(),
               survival: Vec::new(),
               discount: Vec::new(),
               pv_benefits: 0.0,
               net_premium: 0.0 }
    }

    fn get_mortality(&mut self) -> Result<(), DispatcherKeyError> {
        let query = MortalityQuery { issue_age: self.issue_age,
                                     years: self.term };
        self.mortality = MORTALITY.call_key(&[self.table.as_str(), self.gender.as_str()], query)?;
        Ok(())
    }

    fn calc_survival(&mut self) {
        let mut alive = 1.0;
        self.survival = self.mortality
                            .iter()
                            .map(|q| {
                                let start = alive;
                                alive *= 1.0 - q;
                                start
                            })
                            .collect();
    }

    fn calc_discount(&mut self) {
        let v = 1.0 / (1.0 + self.interest_rate);
        self.discount = (1..=self.term).map(|t| v.powi(t as i32)).collect();
    }

    fn calc_pv_benefits(&mut self) {
        let pv: f64 = self.survival
                          .iter()
                          .zip(&self.mortality)
                          .zip(&self.discount)
                          .map(|((s, q), d)| s * q * d)
                          .sum();
        self.pv_benefits = self.benefit * pv;
    }

    fn calc_net_premium(&mut self) {
        // anualidad anticipada: pagos al inicio de cada año mientras vive
        let v = 1.0 / (1.0 + self.interest_rate);
        let annuity: f64 = self.survival.iter().enumerate().map(|(t, s)| s * v.powi(t as i32)).sum();
        self.net_premium = if annuity > 0.0 { self.pv_benefits / annuity } else { 0.0 };
    }
}

impl Model for TermReserve {
    fn declare() -> ModelDecl<Self> {
        ModelDecl::new("TermReserve")
            .doc("Present value of benefits and net level premium for a term life policy.")
            .attribute(Attribute::input("issue_age").argument(Argument::new().dtype(ValueKind::Integer)
                                                                             .min_val(0.0)
                                                                             .max_val(120.0)
                                                                             .description("Age at issue.")))
            .attribute(Attribute::input("gender").argument(Argument::new().allowed(["M", "F", "U"])
                                                                          .description("Gender code.")))
            .attribute(Attribute::input("table").argument(Argument::new().dtype(ValueKind::String)
                                                                         .min_len(1)
                                                                         .description("Mortality table name.")))
            .attribute(Attribute::input("benefit").argument(Argument::new().dtype(ValueKind::Number)
                                                                           .min_val(0.0)
                                                                           .description("Death benefit.")))
            .attribute(Attribute::constant("interest_rate").argument(Argument::new().dtype(ValueKind::Number)
                                                                                    .min_val(0.0)
                                                                                    .max_val(1.0)
                                                                                    .description("Annual valuation rate.")))
            .attribute(Attribute::constant("term").argument(Argument::new().dtype(ValueKind::Integer)
                                                                           .min_val(1.0)
                                                                           .description("Projection years.")))
            .attribute(Attribute::intermediate("mortality").description("Annual mortality rates."))
            .attribute(Attribute::intermediate("survival").description("Probability of being alive at the start of each year."))
            .attribute(Attribute::intermediate("discount").description("End-of-year discount factors."))
            .attribute(Attribute::output("pv_benefits").description("Present value of death benefits."))
            .attribute(Attribute::output("net_premium").description("Net level annual premium."))
            .step(step(TermReserve::get_mortality).uses(["table", "gender", "issue_age", "term"])
                                                  .impacts(["mortality"])
                                                  .doc("Look up mortality rates by table and gender."))
            .step(step(TermReserve::calc_survival).uses(["mortality"])
                                                  .impacts(["survival"])
                                                  .doc("Accumulate survival probabilities."))
            .step(step(TermReserve::calc_discount).uses(["interest_rate", "term"])
                                                  .impacts(["discount"])
                                                  .doc("Compute discount factors."))
            .step(step(TermReserve::calc_pv_benefits).uses(["benefit", "survival", "mortality", "discount"])
                                                     .impacts(["pv_benefits"])
                                                     .doc("Discount expected death benefits."))
            .step(step(TermReserve::calc_net_premium).uses(["pv_benefits", "survival", "interest_rate"])
                                                     .impacts(["net_premium"])
                                                     .doc("Spread the benefit value over expected premium payments."))
            .steps(["get_mortality", "calc_survival", "calc_discount", "calc_pv_benefits", "calc_net_premium"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_table_is_registered_for_every_gender() {
        for g in ["M", "F", "U"] {
            assert!(MORTALITY.contains(&["flat", g]));
        }
        assert_eq!(MORTALITY.len(), 7);
    }

    #[test]
    fn gompertz_rates_grow_with_age() {
        let rates = MORTALITY.call_key(&["2017-CSO", "M"], MortalityQuery { issue_age: 40, years: 3 }).unwrap();
        assert_eq!(rates.len(), 3);
        assert!(rates[0] < rates[1] && rates[1] < rates[2]);
    }
}
