//! Statistics and chart series derived from the loaded records.

use std::collections::BTreeMap;

use time::{Date, Month, UtcOffset};

use crate::records::{Category, Employee, Transaction};

/// The number of days the average daily expense is spread over.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    /// Sum of the non-negative amounts.
    pub total_income: f64,
    /// Sum of the magnitudes of the negative amounts.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub total_balance: f64,
    /// The share of income not spent, as a percentage. Zero without income.
    pub savings_rate: f64,
    /// Expenses spread over [DAYS_PER_MONTH] days.
    pub avg_daily_expense: f64,
    /// How many transactions the totals cover.
    pub transaction_count: usize,
}

impl DashboardStats {
    /// Total `transactions` in a single pass.
    ///
    /// A zero amount counts as income.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (total_income, total_expenses) =
            transactions
                .iter()
                .fold((0.0, 0.0), |(income, expenses), transaction| {
                    if transaction.amount >= 0.0 {
                        (income + transaction.amount, expenses)
                    } else {
                        (income, expenses + transaction.amount.abs())
                    }
                });

        let total_balance = total_income - total_expenses;
        let savings_rate = if total_income > 0.0 {
            total_balance / total_income * 100.0
        } else {
            0.0
        };

        Self {
            total_income,
            total_expenses,
            total_balance,
            savings_rate,
            avg_daily_expense: total_expenses / DAYS_PER_MONTH,
            transaction_count: transactions.len(),
        }
    }
}

/// Totals over the payroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmployeeStats {
    /// How many employees there are.
    pub employee_count: usize,
    /// The sum of all salaries.
    pub total_payroll: f64,
    /// The mean salary, zero without employees.
    pub average_salary: f64,
}

impl EmployeeStats {
    /// Total `employees`.
    pub fn from_employees(employees: &[Employee]) -> Self {
        let total_payroll: f64 = employees.iter().map(|employee| employee.salary).sum();
        let average_salary = if employees.is_empty() {
            0.0
        } else {
            total_payroll / employees.len() as f64
        };

        Self {
            employee_count: employees.len(),
            total_payroll,
            average_salary,
        }
    }
}

/// The spending categories charted, in display order. Everything else is
/// folded into "Other".
pub const SPENDING_CATEGORIES: [&str; 6] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Utilities",
    "Other",
];

/// Expense totals per category, in [SPENDING_CATEGORIES] order.
///
/// Income is ignored. Expenses in categories not listed count as "Other".
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<(&'static str, f64)> {
    let mut totals = [0.0; SPENDING_CATEGORIES.len()];
    let other = SPENDING_CATEGORIES.len() - 1;

    for transaction in transactions.iter().filter(|t| t.amount < 0.0) {
        let index = match transaction.category {
            Category::FoodAndDining => 0,
            Category::Transportation => 1,
            Category::Shopping => 2,
            Category::Entertainment => 3,
            Category::Utilities => 4,
            Category::Income | Category::Other(_) => other,
        };
        totals[index] += transaction.amount.abs();
    }

    SPENDING_CATEGORIES.into_iter().zip(totals).collect()
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotals {
    /// The first day of the month.
    pub month: Date,
    /// Sum of the non-negative amounts.
    pub income: f64,
    /// Sum of the magnitudes of the negative amounts.
    pub expenses: f64,
}

/// Income and expenses per calendar month, oldest first.
///
/// Months are taken from when each transaction happened, in `local_offset`.
/// Transactions without a date are left out, and months without any
/// transactions are not listed.
pub fn monthly_totals(transactions: &[Transaction], local_offset: UtcOffset) -> Vec<MonthlyTotals> {
    let mut totals: BTreeMap<Date, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let Some(occurred_at) = transaction.occurred_at else {
            continue;
        };
        // Day 1 exists in every month.
        let Ok(month) = occurred_at.to_offset(local_offset).date().replace_day(1) else {
            continue;
        };
        let entry = totals.entry(month).or_default();

        if transaction.amount >= 0.0 {
            entry.0 += transaction.amount;
        } else {
            entry.1 += transaction.amount.abs();
        }
    }

    totals
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyTotals {
            month,
            income,
            expenses,
        })
        .collect()
}

/// Three-letter month labels for `months`, e.g. "Jan", "Feb".
pub fn format_month_labels(months: &[Date]) -> Vec<String> {
    let month_to_str = |date: &Date| {
        match date.month() {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
        .to_string()
    };

    months.iter().map(month_to_str).collect()
}
