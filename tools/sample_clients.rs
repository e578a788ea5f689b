//! Sample Client Generator
//!
//! Emits random client profiles for exercising the churn service, as JSON
//! lines or as a ready `{"clientes": [...]}` batch payload.

use churn_risk_pipeline::types::client::{
    AddOnService, ClientRecord, Contract, InternetService, PaymentMethod, YesNo,
};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One record per line
    Lines,
    /// Single `{"clientes": [...]}` document
    Batch,
}

#[derive(Parser)]
#[command(name = "sample-clients")]
#[command(about = "Generate random client profiles", long_about = None)]
struct Args {
    /// Number of records
    #[arg(short, long, default_value = "20")]
    count: usize,

    /// Share of high-risk profiles
    #[arg(long, default_value = "0.3")]
    high_rate: f64,

    /// Share of medium-risk profiles
    #[arg(long, default_value = "0.3")]
    medium_rate: f64,

    #[arg(short, long, value_enum, default_value = "lines")]
    format: OutputFormat,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Client profile generator
struct ClientGenerator {
    rng: StdRng,
}

impl ClientGenerator {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// New month-to-month fiber client paying by electronic check
    fn generate_high(&mut self) -> ClientRecord {
        let tenure = self.rng.gen_range(0..=6);
        let monthly = self.amount(70.0..110.0);

        ClientRecord {
            tenure,
            monthly_charges: monthly,
            total_charges: self.total(tenure, monthly),
            contract: Contract::MonthToMonth,
            internet_service: InternetService::FiberOptic,
            payment_method: PaymentMethod::ElectronicCheck,
            online_security: AddOnService::No,
            tech_support: AddOnService::No,
            paperless_billing: YesNo::Yes,
            senior_citizen: self.rng.gen_bool(0.3) as i64,
        }
    }

    fn generate_medium(&mut self) -> ClientRecord {
        let tenure = self.rng.gen_range(6..=24);
        let monthly = self.amount(55.0..85.0);
        let contract = if self.rng.gen_bool(0.7) {
            Contract::MonthToMonth
        } else {
            Contract::OneYear
        };
        let payment_method = self.choice(&[
            PaymentMethod::ElectronicCheck,
            PaymentMethod::MailedCheck,
            PaymentMethod::BankTransfer,
        ]);

        ClientRecord {
            tenure,
            monthly_charges: monthly,
            total_charges: self.total(tenure, monthly),
            contract,
            internet_service: InternetService::Dsl,
            payment_method,
            online_security: AddOnService::No,
            tech_support: self.choice(&[AddOnService::No, AddOnService::Yes]),
            paperless_billing: YesNo::Yes,
            senior_citizen: self.rng.gen_bool(0.15) as i64,
        }
    }

    /// Long-tenure client on a two-year contract with automatic payment
    fn generate_low(&mut self) -> ClientRecord {
        let tenure = self.rng.gen_range(36..=72);
        let monthly = self.amount(20.0..70.0);
        let internet_service = self.choice(&[InternetService::Dsl, InternetService::NoService]);
        let add_on = match internet_service {
            InternetService::NoService => AddOnService::NoInternetService,
            _ => AddOnService::Yes,
        };

        ClientRecord {
            tenure,
            monthly_charges: monthly,
            total_charges: self.total(tenure, monthly),
            contract: Contract::TwoYear,
            internet_service,
            payment_method: self.choice(&[PaymentMethod::CreditCard, PaymentMethod::BankTransfer]),
            online_security: add_on,
            tech_support: add_on,
            paperless_billing: YesNo::No,
            senior_citizen: self.rng.gen_bool(0.1) as i64,
        }
    }

    fn amount(&mut self, range: std::ops::Range<f64>) -> f64 {
        (self.rng.gen_range(range) * 100.0).round() / 100.0
    }

    /// Accumulated charges with some drift from the current monthly price
    fn total(&mut self, tenure: i64, monthly: f64) -> f64 {
        let drift = self.rng.gen_range(0.9..1.1);
        ((tenure as f64 * monthly * drift) * 100.0).round() / 100.0
    }

    fn choice<T: Copy>(&mut self, choices: &[T]) -> T {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_clients=info".parse()?),
        )
        .init();

    let args = Args::parse();
    if args.high_rate < 0.0 || args.medium_rate < 0.0 || args.high_rate + args.medium_rate > 1.0 {
        anyhow::bail!("high and medium rates must be non-negative and sum to at most 1");
    }

    let mut generator = ClientGenerator::new(args.seed);
    let (mut high, mut medium, mut low) = (0, 0, 0);

    let mut records = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let roll: f64 = generator.rng.gen();
        let record = if roll < args.high_rate {
            high += 1;
            generator.generate_high()
        } else if roll < args.high_rate + args.medium_rate {
            medium += 1;
            generator.generate_medium()
        } else {
            low += 1;
            generator.generate_low()
        };
        record.validate()?;
        records.push(record);
    }

    match args.format {
        OutputFormat::Lines => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        OutputFormat::Batch => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "clientes": records }))?
            );
        }
    }

    info!(
        count = args.count,
        high = high,
        medium = medium,
        low = low,
        "Generated client profiles"
    );

    Ok(())
}
