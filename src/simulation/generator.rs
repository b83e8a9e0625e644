use crate::data::{MovementKind, MovementRecord};
use crate::utils::config::GeneratorConfig;
use anyhow::{bail, Result};
use chrono::{Duration, Local, NaiveDate};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Poisson;
use std::collections::HashMap;
use tracing::{debug, info};

/// Synthetic movement record generator
///
/// Produces daily inflow/outflow pairs for every (unit, material) and
/// injects occasional anomalous outflows of large magnitude.
///
/// Algorithm:
/// 1. For each day, unit and material: inflow ~ Poisson(inflow_mean),
///    outflow ~ -Poisson(outflow_mean)
/// 2. With probability `anomaly_rate` add an outflow with quantity
///    uniform in [anomaly_min, anomaly_max)
/// 3. Draw one unit cost per material, uniform in [unit_cost_min, unit_cost_max)
/// 4. Attach costs and movement values, order by date
pub struct RecordGenerator {
    config: GeneratorConfig,
}

impl RecordGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Unit identifiers `U01`, `U02`, ...
    pub fn unit_ids(&self) -> Vec<String> {
        (1..=self.config.n_units).map(|u| format!("U{:02}", u)).collect()
    }

    /// Material identifiers `MAT-001`, `MAT-002`, ...
    pub fn material_ids(&self) -> Vec<String> {
        (1..=self.config.n_materials).map(|m| format!("MAT-{:03}", m)).collect()
    }

    fn validate(&self) -> Result<()> {
        let c = &self.config;
        if c.n_units == 0 || c.n_materials == 0 || c.days == 0 {
            bail!("generator needs at least one unit, material and day");
        }
        if c.n_units > 99 || c.n_materials > 999 {
            bail!("identifier patterns allow at most 99 units and 999 materials");
        }
        if !(c.anomaly_rate >= 0.0 && c.anomaly_rate <= 1.0) {
            bail!("anomaly_rate must be within [0, 1], got {}", c.anomaly_rate);
        }
        if c.anomaly_min >= c.anomaly_max {
            bail!("anomaly range [{}, {}) is empty", c.anomaly_min, c.anomaly_max);
        }
        if !(c.unit_cost_min > 0.0 && c.unit_cost_min < c.unit_cost_max && c.unit_cost_max.is_finite()) {
            bail!(
                "unit cost range [{}, {}) must be positive and non-empty",
                c.unit_cost_min,
                c.unit_cost_max
            );
        }
        Ok(())
    }

    /// Generate the full dataset. Deterministic for a fixed seed and end date.
    pub fn generate(&self) -> Result<Vec<MovementRecord>> {
        self.validate()?;
        let c = &self.config;

        let inflow_dist = Poisson::new(c.inflow_mean)
            .map_err(|e| anyhow::anyhow!("invalid inflow_mean {}: {}", c.inflow_mean, e))?;
        let outflow_dist = Poisson::new(c.outflow_mean)
            .map_err(|e| anyhow::anyhow!("invalid outflow_mean {}: {}", c.outflow_mean, e))?;

        let mut rng = StdRng::seed_from_u64(c.seed);
        let end = c.end_date.unwrap_or_else(|| Local::now().date_naive());
        let start = end - Duration::days(c.days as i64 - 1);

        let units = self.unit_ids();
        let materials = self.material_ids();

        let mut rows: Vec<(NaiveDate, usize, usize, MovementKind, i64)> = Vec::new();
        let mut injected = 0usize;

        for day in 0..c.days {
            let date = start + Duration::days(day as i64);
            for u in 0..units.len() {
                for m in 0..materials.len() {
                    let in_qty: f64 = inflow_dist.sample(&mut rng);
                    let out_qty: f64 = outflow_dist.sample(&mut rng);
                    rows.push((date, u, m, MovementKind::Inflow, in_qty as i64));
                    rows.push((date, u, m, MovementKind::Outflow, -(out_qty as i64)));

                    if rng.gen::<f64>() < c.anomaly_rate {
                        let anomaly = rng.gen_range(c.anomaly_min..c.anomaly_max);
                        rows.push((date, u, m, MovementKind::Outflow, anomaly));
                        injected += 1;
                    }
                }
            }
        }

        let cost_map: HashMap<usize, f64> = (0..materials.len())
            .map(|m| (m, rng.gen_range(c.unit_cost_min..c.unit_cost_max)))
            .collect();

        let mut records: Vec<MovementRecord> = rows
            .into_iter()
            .map(|(date, u, m, kind, qty)| {
                MovementRecord::new(date, &units[u], &materials[m], kind, qty, cost_map[&m])
            })
            .collect();
        records.sort_by_key(|r| r.date);

        debug!(?cost_map, "unit costs drawn");
        info!(
            records = records.len(),
            injected,
            start = %start,
            end = %end,
            "generated synthetic movement dataset"
        );

        Ok(records)
    }
}
