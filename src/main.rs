use gda::cli::{Args, Quote};
use gda::encoding::encode_price;
use gda::models::{PricingModel, PurchaseRequest};
use gda::schedule::write_schedule;
use gda::verifier::{verify_continuous, verify_discrete, verify_linear, Report};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const VERIFY_PANELS: u64 = 1_000;

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn verify(model: &PricingModel, request: &PurchaseRequest) -> Result<Report> {
    match (model, request) {
        (PricingModel::ExponentialDiscrete(m), PurchaseRequest::Discrete(r)) => verify_discrete(m, r),
        (PricingModel::ExponentialContinuous(m), PurchaseRequest::Continuous(r)) => {
            verify_continuous(m, r, VERIFY_PANELS)
        }
        (PricingModel::LinearEquivalent(m), PurchaseRequest::Continuous(r)) => verify_linear(m, r, VERIFY_PANELS),
        _ => Err(anyhow!("{} cannot verify this request shape", model.name())),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let (model, request) = args.into_quote()?;
    debug!(?model, ?request, "parsed quote");

    let price = model
        .cumulative_price(&request)
        .with_context(|| format!("{} pricing failed", model.name()))?;
    let encoded = encode_price(price)?;

    // Side outputs run before the word is printed, so any failure leaves stdout empty.
    if args.verify {
        let rep = verify(&model, &request)?;
        info!(
            steps = rep.steps,
            numeric = rep.numeric,
            closed = rep.closed,
            rel_err = rep.rel_err,
            monotone = rep.monotone_ok,
            "[{}] verification",
            model.name()
        );
        if !rep.monotone_ok {
            warn!("[{}] marginal price is not monotone over the purchase", model.name());
        }
    }

    if let Some(path) = &args.schedule {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let rows = write_schedule(BufWriter::new(file), &model, &request)?;
        info!(rows, path = %path.display(), "wrote schedule");
    }

    if args.json {
        let quote = Quote { model, request, price, encoded };
        println!("{}", serde_json::to_string(&quote)?);
    } else {
        println!("{encoded}");
    }
    Ok(())
}
