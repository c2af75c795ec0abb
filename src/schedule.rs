//! Per-unit price schedule export

use crate::models::{PricingModel, PurchaseRequest};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One schedule row: the price of unit `quantity` and the running total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Units bought so far, including this one
    pub quantity: u64,
    /// Price of this unit alone
    pub unit_price: f64,
    /// Cumulative price for `quantity` units
    pub cumulative_price: f64,
}

/// Largest quantity a schedule is produced for
pub const MAX_SCHEDULE_ROWS: u64 = 1_000_000;

/// Rows for quantities `1..=request.quantity()`, each priced with the same time context.
///
/// Rows are produced lazily; the quantity is checked against [`MAX_SCHEDULE_ROWS`] up front.
pub fn schedule_rows<'a>(
    model: &'a PricingModel,
    request: &'a PurchaseRequest,
) -> Result<impl Iterator<Item = Result<Row>> + 'a> {
    let q = request.quantity();
    ensure!(q.fract() == 0.0, "schedule needs an integral quantity (got {})", q);
    ensure!(
        q <= MAX_SCHEDULE_ROWS as f64,
        "schedule is limited to {} rows (quantity {})",
        MAX_SCHEDULE_ROWS,
        q
    );
    let mut prev = 0.0;
    Ok((1..=q as u64).map(move |i| -> Result<Row> {
        let c = model.cumulative_price(&request.with_quantity(i as f64))?.value();
        let row = Row { quantity: i, unit_price: c - prev, cumulative_price: c };
        prev = c;
        Ok(row)
    }))
}

/// Writes the schedule as CSV with an explicit header, streaming one row at a time.
pub fn write_schedule<W: Write>(out: W, model: &PricingModel, request: &PurchaseRequest) -> Result<usize> {
    let rows = schedule_rows(model, request)?;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(["quantity", "unit_price", "cumulative_price"])?;
    let mut written = 0;
    for row in rows {
        wtr.serialize(row?)?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}
