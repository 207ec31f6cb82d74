//! Display fragments built from records and statistics.
//!
//! Each fragment is computed from its inputs alone and turned into markup
//! with `into_html`.

use maud::{Markup, html};
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    dashboard::aggregation::{DashboardStats, EmployeeStats},
    html::{CARD_STYLE, format_currency, format_currency_rounded},
    records::{Category, Employee, RECENCY_WINDOW, Transaction, TransactionType},
    session::Session,
};

/// How many transactions the overview lists.
pub const RECENT_TRANSACTION_COUNT: usize = 5;

/// Avatar background colours, cycled through by card position.
pub const AVATAR_PALETTE: [&str; 6] = [
    "#3B82F6", "#10B981", "#8B5CF6", "#F59E0B", "#EF4444", "#06B6D4",
];

pub const NO_TRANSACTIONS: &str = "No transactions yet. Add your first transaction!";
pub const NO_RECENT_TRANSACTIONS: &str = "No recent transactions";
pub const NO_EMPLOYEES: &str = "No employees yet. Add your first employee!";

/// How much of a transaction to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDetail {
    /// Everything, including the date.
    Full,
    /// The compact overview row without the date.
    Recent,
}

/// One row of a transaction list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionItem {
    pub description: String,
    pub category: String,
    /// Font Awesome icon name, without the `fa-` prefix.
    pub icon: &'static str,
    pub icon_class: &'static str,
    /// Signed amount, e.g. "+$4,100.00" or "-$4.50".
    pub amount_text: String,
    /// "positive" or "negative".
    pub amount_class: &'static str,
    /// The local date as d/m/yyyy, or "N/A". `None` for [ItemDetail::Recent].
    pub date_text: Option<String>,
}

impl TransactionItem {
    pub fn from_transaction(
        transaction: &Transaction,
        detail: ItemDetail,
        local_offset: UtcOffset,
    ) -> Self {
        let (icon, icon_class) = transaction_icon(transaction.kind, &transaction.category);
        let amount_class = if transaction.amount >= 0.0 {
            "positive"
        } else {
            "negative"
        };
        let date_text = match detail {
            ItemDetail::Full => Some(format_short_date(transaction.occurred_at, local_offset)),
            ItemDetail::Recent => None,
        };

        Self {
            description: transaction.description.clone(),
            category: transaction.category.to_string(),
            icon,
            icon_class,
            amount_text: format_signed_amount(transaction.amount),
            amount_class,
            date_text,
        }
    }

    pub fn into_html(self) -> Markup {
        html!(
            li class="transaction-item flex items-center gap-4 py-3" {
                div class={ "transaction-icon " (self.icon_class) } {
                    i class={ "fas fa-" (self.icon) } {}
                }

                div class="flex-1 min-w-0" {
                    p class="font-medium truncate" { (self.description) }
                    p class="text-sm text-gray-500 dark:text-gray-400" {
                        (self.category)
                        @if let Some(date) = &self.date_text {
                            " • " span class="transaction-date" { (date) }
                        }
                    }
                }

                span class={ "transaction-amount font-semibold " (self.amount_class) } {
                    (self.amount_text)
                }
            }
        )
    }
}

/// The icon and icon class for a transaction.
///
/// Income always gets the income icon. Expenses are looked up by category.
fn transaction_icon(kind: TransactionType, category: &Category) -> (&'static str, &'static str) {
    if kind == TransactionType::Income {
        return ("arrow-up", "income");
    }

    match category {
        Category::FoodAndDining => ("utensils", "food"),
        Category::Transportation => ("car", "transport"),
        Category::Shopping => ("shopping-bag", "shopping"),
        Category::Entertainment => ("film", "entertainment"),
        Category::Utilities => ("bolt", "utilities"),
        Category::Income => ("receipt", "income"),
        Category::Other(_) => ("receipt", "shopping"),
    }
}

/// Format `amount` with a leading sign, e.g. "+$4,100.00" or "-$4.50".
pub fn format_signed_amount(amount: f64) -> String {
    let sign = if amount >= 0.0 { "+" } else { "-" };

    format!("{sign}{}", format_currency(amount.abs()))
}

/// Short local date, e.g. "5/1/2025".
const SHORT_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day padding:none]/[month padding:none]/[year]");

/// Format the local date of `date` as d/m/yyyy, or "N/A" without a date.
pub fn format_short_date(date: Option<OffsetDateTime>, local_offset: UtcOffset) -> String {
    let Some(date) = date else {
        return "N/A".to_owned();
    };

    date.to_offset(local_offset)
        .date()
        .format(SHORT_DATE_FORMAT)
        .unwrap_or_else(|error| {
            tracing::error!("could not format date {date}: {error}");
            "N/A".to_owned()
        })
}

/// A card on the employee grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeCard {
    pub name: String,
    pub position: String,
    pub department: String,
    /// Up to two upper-case initials.
    pub initials: String,
    pub avatar_color: &'static str,
    /// Whole dollars, e.g. "$90,000".
    pub salary_text: String,
    /// e.g. "92%".
    pub performance_text: String,
}

impl EmployeeCard {
    /// Build the card for the employee at `index` in the grid.
    pub fn from_employee(employee: &Employee, index: usize) -> Self {
        Self {
            name: employee.name.clone(),
            position: employee.position.clone(),
            department: employee.department.clone(),
            initials: initials(&employee.name),
            avatar_color: AVATAR_PALETTE[index % AVATAR_PALETTE.len()],
            salary_text: format_currency_rounded(employee.salary),
            performance_text: format!("{}%", employee.metrics.performance),
        }
    }

    pub fn into_html(self) -> Markup {
        html!(
            div class={ "employee-card " (CARD_STYLE) } {
                div class="flex items-center gap-4 mb-4" {
                    div
                        class="employee-avatar flex items-center justify-center w-12 h-12 rounded-full text-white font-bold"
                        style={ "background: " (self.avatar_color) }
                    {
                        (self.initials)
                    }

                    div {
                        h4 class="font-semibold" { (self.name) }
                        p class="text-sm text-gray-500 dark:text-gray-400" { (self.position) }
                    }
                }

                div class="space-y-1 text-sm" {
                    p { "Department: " (self.department) }
                    p { "Salary: " (self.salary_text) }
                    p title="Placeholder score assigned when the employee was added" {
                        "Performance: " (self.performance_text)
                    }
                }
            }
        )
    }
}

/// The first character of each word in `name`, keeping the first two,
/// upper-cased.
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.graphemes(true).next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// The transaction statistics as display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLabels {
    pub total_balance: String,
    pub total_income: String,
    pub total_expenses: String,
    pub savings_rate: String,
    pub avg_daily_expense: String,
    pub transaction_count: String,
}

impl StatLabels {
    pub fn from_stats(stats: &DashboardStats) -> Self {
        Self {
            total_balance: format_currency(stats.total_balance),
            total_income: format_currency(stats.total_income),
            total_expenses: format_currency(stats.total_expenses),
            savings_rate: format!("{:.1}%", stats.savings_rate),
            avg_daily_expense: format_currency(stats.avg_daily_expense),
            transaction_count: stats.transaction_count.to_string(),
        }
    }

    /// The four headline cards on the overview.
    pub fn overview_html(&self) -> Markup {
        html!(
            div id="stats" class="grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-4 gap-4 mb-6" {
                (stat_card("total-balance", "Total Balance", "wallet", &self.total_balance))
                (stat_card("total-income", "Total Income", "arrow-up", &self.total_income))
                (stat_card("total-expenses", "Total Expenses", "arrow-down", &self.total_expenses))
                (stat_card("savings-rate", "Savings Rate", "piggy-bank", &self.savings_rate))
            }
        )
    }

    /// The figures shown beside the analytics chart.
    pub fn analytics_html(&self) -> Markup {
        html!(
            div class="grid grid-cols-1 sm:grid-cols-2 gap-4 mb-6" {
                (stat_card("avg-daily", "Avg Daily Expense", "calendar-day", &self.avg_daily_expense))
                (stat_card("total-transactions", "Total Transactions", "list", &self.transaction_count))
            }
            p class="text-xs text-gray-500 dark:text-gray-400 mb-4" {
                "Statistics cover your " (RECENCY_WINDOW) " most recent transactions."
            }
        )
    }
}

/// The employee statistics as display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeStatLabels {
    pub employee_count: String,
    pub total_payroll: String,
    pub average_salary: String,
}

impl EmployeeStatLabels {
    pub fn from_stats(stats: &EmployeeStats) -> Self {
        Self {
            employee_count: stats.employee_count.to_string(),
            total_payroll: format_currency_rounded(stats.total_payroll),
            average_salary: format_currency_rounded(stats.average_salary),
        }
    }

    pub fn into_html(self) -> Markup {
        html!(
            div id="employee-stats" class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-6" {
                (stat_card("total-employees", "Total Employees", "users", &self.employee_count))
                (stat_card("total-payroll", "Total Payroll", "money-bill-wave", &self.total_payroll))
                (stat_card("avg-salary", "Average Salary", "chart-line", &self.average_salary))
            }
        )
    }
}

fn stat_card(id: &str, title: &str, icon: &str, value: &str) -> Markup {
    html!(
        div class=(CARD_STYLE) {
            div class="flex items-center justify-between mb-2" {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
                i class={ "fas fa-" (icon) " text-gray-400" } {}
            }
            p id=(id) class="text-2xl font-bold" { (value) }
        }
    )
}

/// Who is signed in, for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    pub display_name: String,
    pub email: String,
    /// The first two characters of the display name, upper-cased.
    pub avatar_text: String,
    /// "Welcome back, <first name>!"
    pub greeting: String,
}

impl UserBadge {
    pub fn from_session(session: &Session) -> Self {
        let display_name = session.display_name.clone();
        let first_name = display_name
            .split_whitespace()
            .next()
            .unwrap_or(&display_name)
            .to_owned();
        let avatar_text = display_name
            .graphemes(true)
            .take(2)
            .collect::<String>()
            .to_uppercase();

        Self {
            greeting: format!("Welcome back, {first_name}!"),
            avatar_text,
            email: session.email.clone(),
            display_name,
        }
    }

    pub fn into_html(self) -> Markup {
        html!(
            div class="flex flex-wrap items-center justify-between gap-4 mb-6" {
                h1 id="greeting" class="text-2xl font-bold" { (self.greeting) }

                div class="flex items-center gap-3" {
                    div class="text-right" {
                        p id="user-name" class="font-medium" { (self.display_name) }
                        p id="user-email" class="text-sm text-gray-500 dark:text-gray-400" { (self.email) }
                    }
                    div
                        id="user-avatar"
                        class="flex items-center justify-center w-10 h-10 rounded-full bg-blue-600 text-white font-bold"
                    {
                        (self.avatar_text)
                    }
                }
            }
        )
    }
}

/// Every loaded transaction, with dates.
pub fn transaction_list(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    item_list(
        "transactions-list",
        transactions,
        ItemDetail::Full,
        local_offset,
        NO_TRANSACTIONS,
    )
}

/// The [RECENT_TRANSACTION_COUNT] newest transactions, without dates.
pub fn recent_transaction_list(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTION_COUNT)];

    item_list(
        "recent-transactions",
        recent,
        ItemDetail::Recent,
        local_offset,
        NO_RECENT_TRANSACTIONS,
    )
}

fn item_list(
    id: &str,
    transactions: &[Transaction],
    detail: ItemDetail,
    local_offset: UtcOffset,
    empty_message: &str,
) -> Markup {
    html!(
        div id=(id) {
            @if transactions.is_empty() {
                p class="empty-state" { (empty_message) }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700" {
                    @for transaction in transactions {
                        (TransactionItem::from_transaction(transaction, detail, local_offset).into_html())
                    }
                }
            }
        }
    )
}

/// A card for every employee.
pub fn employee_list(employees: &[Employee]) -> Markup {
    html!(
        div id="employees-list" {
            @if employees.is_empty() {
                p class="empty-state" { (NO_EMPLOYEES) }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-4" {
                    @for (index, employee) in employees.iter().enumerate() {
                        (EmployeeCard::from_employee(employee, index).into_html())
                    }
                }
            }
        }
    )
}



#[cfg(test)]
mod stat_label_tests {
    use crate::{
        dashboard::aggregation::{DashboardStats, EmployeeStats},
        records::Category,
        test_utils::{test_employee, test_transaction},
    };

    use super::{EmployeeStatLabels, StatLabels};

    #[test]
    fn salary_and_rent_labels() {
        let stats = DashboardStats::from_transactions(&[
            test_transaction("Salary", 4100.0, Category::Income, None),
            test_transaction("Rent", -3200.0, Category::Utilities, None),
        ]);

        let labels = StatLabels::from_stats(&stats);

        assert_eq!(labels.total_balance, "$900.00");
        assert_eq!(labels.total_income, "$4,100.00");
        assert_eq!(labels.total_expenses, "$3,200.00");
        assert_eq!(labels.savings_rate, "22.0%");
        assert_eq!(labels.avg_daily_expense, "$106.67");
        assert_eq!(labels.transaction_count, "2");
    }

    #[test]
    fn empty_labels() {
        let labels = StatLabels::from_stats(&DashboardStats::from_transactions(&[]));

        assert_eq!(labels.total_balance, "$0.00");
        assert_eq!(labels.savings_rate, "0.0%");
        assert_eq!(labels.transaction_count, "0");
    }

    #[test]
    fn employee_labels_round_to_whole_dollars() {
        let stats = EmployeeStats::from_employees(&[
            test_employee("Jane Doe", 90_000.0),
            test_employee("John Smith", 124_001.0),
        ]);

        let labels = EmployeeStatLabels::from_stats(&stats);

        assert_eq!(labels.employee_count, "2");
        assert_eq!(labels.total_payroll, "$214,001");
        assert_eq!(labels.average_salary, "$107,001");
    }
}


#[cfg(test)]
mod list_tests {
    use scraper::{Html, Selector};
    use time::UtcOffset;

    use crate::{records::Category, test_utils::test_transaction};

    use super::{
        NO_EMPLOYEES, NO_RECENT_TRANSACTIONS, NO_TRANSACTIONS, employee_list,
        recent_transaction_list, transaction_list,
    };

    #[track_caller]
    fn assert_single_placeholder(html: &str, want: &str) {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse(".empty-state").unwrap();
        let placeholders: Vec<_> = fragment.select(&selector).collect();

        assert_eq!(placeholders.len(), 1, "want one placeholder in {html}");
        assert_eq!(placeholders[0].text().collect::<String>(), want);
    }

    #[test]
    fn empty_lists_render_one_placeholder() {
        assert_single_placeholder(
            &transaction_list(&[], UtcOffset::UTC).into_string(),
            NO_TRANSACTIONS,
        );
        assert_single_placeholder(
            &recent_transaction_list(&[], UtcOffset::UTC).into_string(),
            NO_RECENT_TRANSACTIONS,
        );
        assert_single_placeholder(&employee_list(&[]).into_string(), NO_EMPLOYEES);
    }

    #[test]
    fn recent_list_shows_first_five() {
        let transactions: Vec<_> = (0..8)
            .map(|i| test_transaction(&format!("T{i}"), 1.0, Category::Income, None))
            .collect();

        let html = recent_transaction_list(&transactions, UtcOffset::UTC).into_string();
        let fragment = Html::parse_fragment(&html);
        let items = fragment
            .select(&Selector::parse(".transaction-item").unwrap())
            .count();

        assert_eq!(items, 5);
        assert!(html.contains("T4"));
        assert!(!html.contains("T5"));
    }
}
