//! Route handlers for the dashboard sections.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    Error,
    dashboard::{
        DashboardState,
        charts::{ANALYTICS_CHART, ChartRegistry, SPENDING_CHART, TRENDS_CHART, chart_container},
        forms::modal_view,
        loader::load_dashboard,
        render::{
            EmployeeStatLabels, StatLabels, UserBadge, employee_list, recent_transaction_list,
            transaction_list,
        },
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base_with_toast},
    navigation::{DashboardRegions, Modal, NavBar, Page, Section, ViewEffect},
    notification::current_toast,
    session::Session,
};

/// Display the overview section.
pub async fn get_overview_page(State(state): State<DashboardState>) -> Response {
    show_section(&state, Section::Overview).await
}

/// Display the transactions section.
pub async fn get_transactions_page(State(state): State<DashboardState>) -> Response {
    show_section(&state, Section::Transactions).await
}

/// Display the employees section.
pub async fn get_employees_page(State(state): State<DashboardState>) -> Response {
    show_section(&state, Section::Employees).await
}

/// Display the analytics section.
pub async fn get_analytics_page(State(state): State<DashboardState>) -> Response {
    show_section(&state, Section::Analytics).await
}

async fn show_section(state: &DashboardState, section: Section) -> Response {
    let effects = match state.view.lock() {
        Ok(mut view) => {
            let mut effects = view.show_page(Page::Dashboard);
            effects.extend(view.show_section(section));
            effects
        }
        Err(error) => {
            tracing::error!("could not lock view state: {error}");
            return Error::LockError("view state").into_response();
        }
    };

    if effects.contains(&ViewEffect::ReloadDashboard) {
        load_dashboard(state).await;
    }

    let Some(session) = state.session.current() else {
        return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
    };

    let (regions, modal) = match state.view.lock() {
        Ok(view) => (view.regions().clone(), view.modal()),
        Err(error) => {
            tracing::error!("could not lock view state: {error}");
            return Error::LockError("view state").into_response();
        }
    };

    let charts = regions.charts.clone().unwrap_or_default();
    let mut registry = ChartRegistry::new();
    match section {
        Section::Overview => {
            registry.bind_id(&charts, SPENDING_CHART);
            registry.bind_id(&charts, TRENDS_CHART);
        }
        Section::Analytics if effects.contains(&ViewEffect::InitializeCharts) => {
            registry.bind_id(&charts, ANALYTICS_CHART);
        }
        _ => {}
    }

    let content = dashboard_view(
        &session,
        section,
        &regions,
        modal,
        state.local_offset(),
    );
    let scripts = [registry.into_script()];

    base_with_toast(
        section.title(),
        &scripts,
        &content,
        current_toast(&state.notifier),
    )
    .into_response()
}

fn dashboard_view(
    session: &Session,
    section: Section,
    regions: &DashboardRegions,
    modal: Option<Modal>,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(section.endpoint()).into_html();
    let badge = UserBadge::from_session(session).into_html();

    let section_content = match section {
        Section::Overview => overview_view(regions, local_offset),
        Section::Transactions => transactions_view(regions, local_offset),
        Section::Employees => employees_view(regions),
        Section::Analytics => analytics_view(regions),
    };

    html!(
        (nav_bar)

        main id="dashboard-page" class=(PAGE_CONTAINER_STYLE)
        {
            (badge)

            section id={ (section_id(section)) "-section" } class="section active"
            {
                (section_content)
            }
        }

        div id="modal-container"
        {
            @if let Some(modal) = modal {
                (modal_view(modal))
            }
        }
    )
}

fn section_id(section: Section) -> &'static str {
    match section {
        Section::Overview => "overview",
        Section::Transactions => "transactions",
        Section::Employees => "employees",
        Section::Analytics => "analytics",
    }
}

fn overview_view(regions: &DashboardRegions, local_offset: UtcOffset) -> Markup {
    let stats = StatLabels::from_stats(&regions.stats.unwrap_or_default());
    let transactions = regions.transactions.as_deref().unwrap_or_default();

    html!(
        (stats.overview_html())

        div class="grid grid-cols-1 xl:grid-cols-2 gap-4 mb-6"
        {
            div class=(CARD_STYLE) { (chart_container(SPENDING_CHART)) }
            div class=(CARD_STYLE) { (chart_container(TRENDS_CHART)) }
        }

        div class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-lg font-semibold" { "Recent Transactions" }
                a
                    href=(endpoints::DASHBOARD_TRANSACTIONS_VIEW)
                    class="text-sm text-blue-600 hover:text-blue-500 dark:text-blue-500"
                {
                    "View all"
                }
            }

            (recent_transaction_list(transactions, local_offset))
        }
    )
}

fn transactions_view(regions: &DashboardRegions, local_offset: UtcOffset) -> Markup {
    let transactions = regions.transactions.as_deref().unwrap_or_default();

    html!(
        div class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-lg font-semibold" { "All Transactions" }
                (open_modal_button(endpoints::TRANSACTION_MODAL, "add-transaction-btn", "Add Transaction"))
            }

            (transaction_list(transactions, local_offset))
        }
    )
}

fn employees_view(regions: &DashboardRegions) -> Markup {
    let stats = EmployeeStatLabels::from_stats(&regions.employee_stats.unwrap_or_default());
    let employees = regions.employees.as_deref().unwrap_or_default();

    html!(
        (stats.into_html())

        div class="flex items-center justify-between mb-4"
        {
            h2 class="text-lg font-semibold" { "Team" }
            (open_modal_button(endpoints::EMPLOYEE_MODAL, "add-employee-btn", "Add Employee"))
        }

        (employee_list(employees))
    )
}

fn analytics_view(regions: &DashboardRegions) -> Markup {
    let stats = StatLabels::from_stats(&regions.stats.unwrap_or_default());

    html!(
        (stats.analytics_html())

        div class=(CARD_STYLE) { (chart_container(ANALYTICS_CHART)) }
    )
}

fn open_modal_button(endpoint: &str, id: &str, text: &str) -> Markup {
    html!(
        button
            type="button"
            id=(id)
            hx-get=(endpoint)
            hx-target="#modal-container"
            hx-swap="innerHTML"
            class={ "w-auto! " (BUTTON_PRIMARY_STYLE) }
        {
            i class="fas fa-plus mr-2" {}
            (text)
        }
    )
}
