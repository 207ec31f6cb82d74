//! Chart options for the dashboard canvases.
//!
//! There are three charts:
//! - **Spending**: a doughnut of expenses by category
//! - **Trends**: monthly income and expenses as lines
//! - **Analytics**: monthly income and expenses as bars
//!
//! By default the charts show fixed sample datasets. With
//! [ChartSource::Live] they are derived from the loaded transactions instead.
//! Each chart is generated as JSON configuration for the ECharts library.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AreaStyle, AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};
use time::{Date, UtcOffset};

use crate::{
    config::ChartSource,
    dashboard::aggregation::{
        MonthlyTotals, format_month_labels, monthly_totals, spending_by_category,
    },
    html::HeadElement,
    records::Transaction,
};

/// The canvas for the spending doughnut.
pub const SPENDING_CHART: &str = "spending-chart";
/// The canvas for the income and expense lines.
pub const TRENDS_CHART: &str = "trends-chart";
/// The canvas for the monthly comparison bars.
pub const ANALYTICS_CHART: &str = "analytics-chart";

/// Sample spending per category, used unless live charts are enabled.
pub const PLACEHOLDER_SPENDING: [(&str, f64); 6] = [
    ("Food & Dining", 850.0),
    ("Transportation", 420.0),
    ("Shopping", 680.0),
    ("Entertainment", 290.0),
    ("Utilities", 380.0),
    ("Other", 230.0),
];
/// The slice colours of the spending doughnut, in category order.
pub const SPENDING_COLORS: [&str; 6] = [
    "#F59E0B", "#06B6D4", "#8B5CF6", "#10B981", "#EF4444", "#6B7280",
];

/// Sample months for the trends chart.
pub const PLACEHOLDER_TRENDS_MONTHS: [&str; 5] = ["Jan", "Feb", "Mar", "Apr", "May"];
/// Sample monthly income for the trends chart.
pub const PLACEHOLDER_TRENDS_INCOME: [f64; 5] = [4100.0, 4200.0, 4150.0, 4300.0, 4200.0];
/// Sample monthly expenses for the trends chart.
pub const PLACEHOLDER_TRENDS_EXPENSES: [f64; 5] = [3200.0, 3100.0, 3300.0, 3180.0, 3180.0];

/// Sample months for the analytics chart.
pub const PLACEHOLDER_ANALYTICS_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
/// Sample monthly income for the analytics chart.
pub const PLACEHOLDER_ANALYTICS_INCOME: [f64; 6] =
    [4100.0, 4200.0, 4150.0, 4300.0, 4200.0, 4400.0];
/// Sample monthly expenses for the analytics chart.
pub const PLACEHOLDER_ANALYTICS_EXPENSES: [f64; 6] =
    [3200.0, 3100.0, 3300.0, 3180.0, 3180.0, 3250.0];

const INCOME_COLOR: &str = "#10B981";
const EXPENSE_COLOR: &str = "#EF4444";

/// A dashboard chart with its HTML container ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Amounts per category for the spending doughnut.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSeries {
    /// Category names.
    pub labels: Vec<String>,
    /// The amount spent per category.
    pub values: Vec<f64>,
}

impl SpendingSeries {
    /// The sample dataset.
    pub fn placeholder() -> Self {
        Self {
            labels: PLACEHOLDER_SPENDING
                .iter()
                .map(|(label, _)| label.to_string())
                .collect(),
            values: PLACEHOLDER_SPENDING.iter().map(|(_, value)| *value).collect(),
        }
    }

    /// Spending per category over `transactions`.
    pub fn live(transactions: &[Transaction]) -> Self {
        let spending = spending_by_category(transactions);

        Self {
            labels: spending.iter().map(|(label, _)| label.to_string()).collect(),
            values: spending.iter().map(|(_, value)| *value).collect(),
        }
    }
}

/// Monthly income and expenses for the trends and analytics charts.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeExpenseSeries {
    /// Three-letter month names, oldest first.
    pub labels: Vec<String>,
    /// Income per month.
    pub income: Vec<f64>,
    /// Expenses per month.
    pub expenses: Vec<f64>,
    /// Whether the value axis may start above zero so the gap between
    /// income and expenses stands out.
    pub scaled_axis: bool,
}

impl IncomeExpenseSeries {
    fn placeholder(labels: &[&str], income: &[f64], expenses: &[f64]) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
            income: income.to_vec(),
            expenses: expenses.to_vec(),
            scaled_axis: true,
        }
    }

    /// The last `months` months that have transactions.
    pub fn live(transactions: &[Transaction], local_offset: UtcOffset, months: usize) -> Self {
        let totals = monthly_totals(transactions, local_offset);
        let recent: &[MonthlyTotals] = &totals[totals.len().saturating_sub(months)..];
        let dates: Vec<Date> = recent.iter().map(|totals| totals.month).collect();

        Self {
            labels: format_month_labels(&dates),
            income: recent.iter().map(|totals| totals.income).collect(),
            expenses: recent.iter().map(|totals| totals.expenses).collect(),
            scaled_axis: false,
        }
    }
}

/// Build the options for every dashboard canvas.
pub fn build_charts(
    source: ChartSource,
    transactions: &[Transaction],
    local_offset: UtcOffset,
) -> Vec<DashboardChart> {
    let (spending, trends, analytics) = match source {
        ChartSource::Placeholder => (
            SpendingSeries::placeholder(),
            IncomeExpenseSeries::placeholder(
                &PLACEHOLDER_TRENDS_MONTHS,
                &PLACEHOLDER_TRENDS_INCOME,
                &PLACEHOLDER_TRENDS_EXPENSES,
            ),
            IncomeExpenseSeries::placeholder(
                &PLACEHOLDER_ANALYTICS_MONTHS,
                &PLACEHOLDER_ANALYTICS_INCOME,
                &PLACEHOLDER_ANALYTICS_EXPENSES,
            ),
        ),
        ChartSource::Live => (
            SpendingSeries::live(transactions),
            IncomeExpenseSeries::live(transactions, local_offset, PLACEHOLDER_TRENDS_MONTHS.len()),
            IncomeExpenseSeries::live(
                transactions,
                local_offset,
                PLACEHOLDER_ANALYTICS_MONTHS.len(),
            ),
        ),
    };

    vec![
        DashboardChart {
            id: SPENDING_CHART,
            options: spending_chart(&spending).to_string(),
        },
        DashboardChart {
            id: TRENDS_CHART,
            options: trends_chart(&trends).to_string(),
        },
        DashboardChart {
            id: ANALYTICS_CHART,
            options: analytics_chart(&analytics).to_string(),
        },
    ]
}

/// The charts bound on one rendered page.
///
/// Binding a canvas that is already bound does nothing, so a section that is
/// shown twice does not initialize its chart twice.
#[derive(Debug, Default)]
pub struct ChartRegistry<'a> {
    bound: Vec<&'a DashboardChart>,
}

impl<'a> ChartRegistry<'a> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `chart` to its canvas. Returns `false` if the canvas was already
    /// bound.
    pub fn bind(&mut self, chart: &'a DashboardChart) -> bool {
        if self.bound.iter().any(|bound| bound.id == chart.id) {
            return false;
        }

        self.bound.push(chart);
        true
    }

    /// Bind the chart for canvas `id` from `charts`, if there is one.
    pub fn bind_id(&mut self, charts: &'a [DashboardChart], id: &str) -> bool {
        charts
            .iter()
            .find(|chart| chart.id == id)
            .is_some_and(|chart| self.bind(chart))
    }

    /// The bound charts in binding order.
    pub fn charts(&self) -> &[&'a DashboardChart] {
        &self.bound
    }

    /// The script that draws every bound chart.
    pub fn into_script(self) -> HeadElement {
        charts_script(&self.bound)
    }
}

/// Renders the HTML container for a dashboard chart.
pub fn chart_container(id: &str) -> Markup {
    html!(
        div
            id=(id)
            class="min-h-[320px] w-full rounded dark:bg-gray-100"
        {}
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing. A canvas that already hosts a chart instance is
/// left alone.
fn charts_script(charts: &[&DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom || echarts.getInstanceByDom(chartDom)) {{
                        return;
                    }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn spending_chart(series: &SpendingSeries) -> Chart {
    let data: Vec<(f64, &str)> = series
        .values
        .iter()
        .zip(&series.labels)
        .map(|(value, label)| (*value, label.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Spending by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .color(SPENDING_COLORS.iter().map(|color| Color::from(*color)).collect())
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["45%", "70%"])
                .data(data),
        )
}

pub(super) fn trends_chart(series: &IncomeExpenseSeries) -> Chart {
    income_expense_axes(Title::new().text("Income vs Expenses"), series)
        .series(
            Line::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .area_style(AreaStyle::new().opacity(0.1))
                .data(series.income.clone()),
        )
        .series(
            Line::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR))
                .area_style(AreaStyle::new().opacity(0.1))
                .data(series.expenses.clone()),
        )
}

pub(super) fn analytics_chart(series: &IncomeExpenseSeries) -> Chart {
    income_expense_axes(Title::new().text("Monthly Comparison"), series)
        .series(
            bar::Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR).border_radius(6))
                .data(series.income.clone()),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSE_COLOR).border_radius(6))
                .data(series.expenses.clone()),
        )
}

fn income_expense_axes(title: Title, series: &IncomeExpenseSeries) -> Chart {
    Chart::new()
        .title(title)
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("12%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(series.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .scale(series.scaled_axis)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
