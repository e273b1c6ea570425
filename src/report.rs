use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::annuity::LoanTerm;
use crate::differentiated::AmortizationEntry;

/// Outcome of a loan calculation, tagged with the value that was solved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "solved", rename_all = "snake_case")]
pub enum LoanResult {
    Principal {
        principal: Decimal,
        overpayment: Decimal,
    },
    Payment {
        payment: Decimal,
    },
    Term {
        term: LoanTerm,
        overpayment: Decimal,
    },
    Differentiated {
        payments: Vec<AmortizationEntry>,
        overpayment: Decimal,
    },
}

impl LoanResult {
    /// Renders the result as the lines printed to the user.
    pub fn lines(&self) -> Vec<String> {
        match self {
            LoanResult::Principal {
                principal,
                overpayment,
            } => vec![
                format!("Your loan principal = {}!", whole(*principal)),
                overpayment_line(*overpayment),
            ],
            LoanResult::Payment { payment } => {
                vec![format!("Your monthly payment = {}!", whole(*payment))]
            }
            LoanResult::Term { term, overpayment } => vec![
                format!("It will take {term} to repay the loan"),
                overpayment_line(*overpayment),
            ],
            LoanResult::Differentiated {
                payments,
                overpayment,
            } => {
                let mut lines: Vec<String> = payments
                    .iter()
                    .map(|entry| format!("Month {}: payment is {}", entry.month, whole(entry.payment)))
                    .collect();
                lines.push(String::new());
                lines.push(overpayment_line(*overpayment));
                lines
            }
        }
    }
}

fn overpayment_line(overpayment: Decimal) -> String {
    format!("Overpayment = {}", whole(overpayment))
}

/// Rounds to a whole currency unit for display, ties to even.
fn whole(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .normalize()
}
