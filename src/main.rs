use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::debug;
use rust_decimal::Decimal;

use loan_calculator::{LoanError, LoanRequest, LoanResult, calculate_loan};

/// Flags that may also be spelled with a single leading dash.
const LONG_FLAGS: [&str; 6] = ["principal", "payment", "periods", "interest", "type", "output"];

/// Annuity and differentiated loan calculator
#[derive(Parser, Debug)]
#[command(
    name = "loan-calculator",
    version,
    about = "Annuity and differentiated loan calculator",
    long_about = "Computes the missing loan parameter from the other three. Pass 0 (or leave \
                  out) the value to solve for: principal, monthly payment or number of months \
                  for annuity loans, or the payment schedule for differentiated loans."
)]
struct Cli {
    /// Loan amount (0 = solve for it)
    #[arg(long, allow_negative_numbers = true)]
    principal: Option<Decimal>,

    /// Monthly payment (0 = solve for it; must be 0 for diff loans)
    #[arg(long, allow_negative_numbers = true)]
    payment: Option<Decimal>,

    /// Number of monthly payments (0 = solve for it)
    #[arg(long, allow_negative_numbers = true)]
    periods: Option<Decimal>,

    /// Annual interest rate, in percent
    #[arg(long, allow_negative_numbers = true)]
    interest: Option<Decimal>,

    /// Loan type: "annuity" or "diff"
    #[arg(long = "type")]
    loan_type: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn request(&self) -> LoanRequest {
        LoanRequest {
            principal: self.principal,
            payment: self.payment,
            periods: self.periods,
            interest: self.interest,
            loan_type: self.loan_type.clone(),
        }
    }
}

/// Rewrites `-principal=100` style flags to `--principal=100`.
///
/// Negative numbers and unknown flags are left alone for clap to handle.
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || arg.starts_with("--") {
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(flag) if LONG_FLAGS.contains(&flag.split('=').next().unwrap_or_default()) => {
                    format!("-{arg}")
                }
                _ => arg,
            }
        })
        .collect()
}

fn print_result(format: &OutputFormat, result: &LoanResult) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for line in result.lines() {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result).context("failed to serialize loan result")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let request = cli.request();
    debug!("loan request: {request:?}");

    let result = calculate_loan(&request)?;
    print_result(&cli.output, &result)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    if let Err(e) = run(&cli) {
        match e.downcast_ref::<LoanError>() {
            Some(loan_error) => println!("{loan_error}"),
            None => eprintln!("error: {e:#}"),
        }
        process::exit(1);
    }
}
