//! Which page, dashboard section and modal the user is looking at, the data
//! mounted in the dashboard regions, and the navigation bar.

use maud::{Markup, html};

use crate::{
    dashboard::{DashboardChart, DashboardStats, EmployeeStats},
    endpoints,
    records::{Employee, Transaction},
};

/// The top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// The public landing page.
    Landing,
    /// The sign-in and sign-up forms.
    Auth,
    /// The dashboard, only reachable with an active session.
    Dashboard,
}

/// The sections of the dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    /// Stats, recent transactions and the overview charts.
    #[default]
    Overview,
    /// The full transaction list.
    Transactions,
    /// The employee stats and cards.
    Employees,
    /// The monthly comparison chart.
    Analytics,
}

impl Section {
    /// Every section in navigation order.
    pub const ALL: [Section; 4] = [
        Section::Overview,
        Section::Transactions,
        Section::Employees,
        Section::Analytics,
    ];

    /// The heading shown for the section.
    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Transactions => "Transactions",
            Section::Employees => "Employees",
            Section::Analytics => "Analytics",
        }
    }

    /// The route that shows the section.
    pub fn endpoint(self) -> &'static str {
        match self {
            Section::Overview => endpoints::DASHBOARD_VIEW,
            Section::Transactions => endpoints::DASHBOARD_TRANSACTIONS_VIEW,
            Section::Employees => endpoints::DASHBOARD_EMPLOYEES_VIEW,
            Section::Analytics => endpoints::DASHBOARD_ANALYTICS_VIEW,
        }
    }
}

/// The overlays that can be opened on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// The form for recording a transaction.
    AddTransaction,
    /// The form for recording an employee.
    AddEmployee,
}

/// Work the caller must do after a view transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    /// Fetch the dashboard data again.
    ReloadDashboard,
    /// Bind the analytics chart to its canvas.
    InitializeCharts,
}

/// The data shown in the dashboard.
///
/// A region is `None` until its first load completes.
#[derive(Debug, Clone, Default)]
pub struct DashboardRegions {
    /// The most recent transactions, newest first.
    pub transactions: Option<Vec<Transaction>>,
    /// Every employee.
    pub employees: Option<Vec<Employee>>,
    /// Statistics over `transactions`.
    pub stats: Option<DashboardStats>,
    /// Statistics over `employees`.
    pub employee_stats: Option<EmployeeStats>,
    /// Chart options for every canvas.
    pub charts: Option<Vec<DashboardChart>>,
}

/// A completed fetch, ready to be written to its region.
#[derive(Debug, Clone)]
pub enum RegionUpdate {
    /// The transaction list.
    Transactions(Vec<Transaction>),
    /// The employee list and its statistics.
    Employees(Vec<Employee>, EmployeeStats),
    /// The transaction statistics.
    Stats(DashboardStats),
    /// The chart options.
    Charts(Vec<DashboardChart>),
}

/// The page, section and modal on screen, plus the mounted dashboard
/// regions.
#[derive(Debug, Clone)]
pub struct ViewState {
    page: Page,
    section: Section,
    modal: Option<Modal>,
    regions: DashboardRegions,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: Page::Landing,
            section: Section::Overview,
            modal: None,
            regions: DashboardRegions::default(),
        }
    }
}

impl ViewState {
    /// The active page.
    pub fn page(&self) -> Page {
        self.page
    }

    /// The active dashboard section.
    pub fn section(&self) -> Section {
        self.section
    }

    /// The open modal, if any.
    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    /// The mounted dashboard data.
    pub fn regions(&self) -> &DashboardRegions {
        &self.regions
    }

    /// Switch to `page`.
    ///
    /// Entering the dashboard always asks for a reload. Leaving it closes any
    /// open modal and unmounts the dashboard regions.
    pub fn show_page(&mut self, page: Page) -> Vec<ViewEffect> {
        if self.page == Page::Dashboard && page != Page::Dashboard {
            self.modal = None;
            self.regions = DashboardRegions::default();
        }

        self.page = page;

        match page {
            Page::Dashboard => vec![ViewEffect::ReloadDashboard],
            Page::Landing | Page::Auth => Vec::new(),
        }
    }

    /// Switch the dashboard to `section`.
    pub fn show_section(&mut self, section: Section) -> Vec<ViewEffect> {
        self.section = section;

        match section {
            Section::Analytics => vec![ViewEffect::InitializeCharts],
            _ => Vec::new(),
        }
    }

    /// Open `modal`, replacing any modal that is already open.
    ///
    /// Modals only exist on the dashboard, so this does nothing on other
    /// pages and returns `false`.
    pub fn open_modal(&mut self, modal: Modal) -> bool {
        if self.page != Page::Dashboard {
            return false;
        }

        self.modal = Some(modal);
        true
    }

    /// Close the open modal.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// A click on the dimmed area around a modal closes it.
    pub fn backdrop_click(&mut self) {
        self.close_modal();
    }

    /// Write a completed fetch into its region.
    ///
    /// Returns `false` and drops the update if the dashboard is no longer on
    /// screen.
    pub fn write_region(&mut self, update: RegionUpdate) -> bool {
        if self.page != Page::Dashboard {
            return false;
        }

        match update {
            RegionUpdate::Transactions(transactions) => {
                self.regions.transactions = Some(transactions)
            }
            RegionUpdate::Employees(employees, stats) => {
                self.regions.employees = Some(employees);
                self.regions.employee_stats = Some(stats);
            }
            RegionUpdate::Stats(stats) => self.regions.stats = Some(stats),
            RegionUpdate::Charts(charts) => self.regions.charts = Some(charts),
        }

        true
    }
}

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    icon: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_desktop_html(self) -> Markup {
        let style = if self.is_current {
            "flex items-center gap-2 py-2 px-3 text-white bg-blue-700 rounded-sm
            lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "flex items-center gap-2 py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
            lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
            dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                i class={ "fas fa-" (self.icon) } {}
                (self.title)
            }
        )
    }

    fn into_bottom_html(self) -> Markup {
        let style = if self.is_current {
            "flex w-full min-w-0 flex-col items-center justify-center gap-1 rounded-lg
            bg-blue-50 px-2 py-2 text-xs font-semibold text-blue-700 shadow-sm
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "flex w-full min-w-0 flex-col items-center justify-center gap-1 rounded-lg
            px-2 py-2 text-xs font-semibold text-gray-600 hover:bg-blue-50/70
            hover:text-blue-700 dark:text-gray-300 dark:hover:bg-blue-900/20"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                i class={ "fas fa-" (self.icon) } {}
                span class="truncate" { (self.title) }
            }
        )
    }
}

/// The dashboard navigation: a top bar on large screens and a bottom bar on
/// small ones.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a section's route matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = Section::ALL
            .into_iter()
            .map(|section| Link {
                url: section.endpoint(),
                title: section.title(),
                icon: section_icon(section),
                is_current: active_endpoint == section.endpoint(),
            })
            .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        let links = self.links;

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        i class="fas fa-chart-line text-2xl text-blue-600" {}

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Finboard"
                        }
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in links.clone() {
                                li { (link.into_desktop_html()) }
                            }
                        }
                    }

                    a
                        href=(endpoints::LOG_OUT)
                        id="logout-btn"
                        class="flex items-center gap-2 px-3 py-2 text-sm font-medium text-gray-700
                            rounded hover:bg-gray-100 dark:text-gray-200 dark:hover:bg-gray-700"
                    {
                        i class="fas fa-sign-out-alt" {}
                        "Log out"
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-4 gap-2 px-4 py-3 rounded-xl border border-gray-200
                        bg-white/95 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                        aria-label="Sections"
                    {
                        @for link in links {
                            li class="min-w-0" { (link.into_bottom_html()) }
                        }
                    }
                }
            }
        )
    }
}

fn section_icon(section: Section) -> &'static str {
    match section {
        Section::Overview => "home",
        Section::Transactions => "exchange-alt",
        Section::Employees => "users",
        Section::Analytics => "chart-bar",
    }
}

#[cfg(test)]
mod view_state_tests {
    use crate::dashboard::{DashboardStats, EmployeeStats};

    use super::{Modal, Page, RegionUpdate, Section, ViewEffect, ViewState};

    fn on_dashboard() -> ViewState {
        let mut view = ViewState::default();
        view.show_page(Page::Dashboard);
        view
    }

    #[test]
    fn starts_on_landing_page() {
        let view = ViewState::default();

        assert_eq!(view.page(), Page::Landing);
        assert_eq!(view.section(), Section::Overview);
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn entering_dashboard_reloads() {
        let mut view = ViewState::default();

        assert_eq!(
            view.show_page(Page::Dashboard),
            vec![ViewEffect::ReloadDashboard]
        );
        assert_eq!(
            view.show_page(Page::Dashboard),
            vec![ViewEffect::ReloadDashboard]
        );
        assert_eq!(view.show_page(Page::Auth), vec![]);
    }

    #[test]
    fn analytics_initializes_charts() {
        let mut view = on_dashboard();

        assert_eq!(
            view.show_section(Section::Analytics),
            vec![ViewEffect::InitializeCharts]
        );
        assert_eq!(view.show_section(Section::Employees), vec![]);
        assert_eq!(view.section(), Section::Employees);
    }

    #[test]
    fn at_most_one_modal_is_open() {
        let mut view = on_dashboard();

        assert!(view.open_modal(Modal::AddTransaction));
        assert!(view.open_modal(Modal::AddEmployee));

        assert_eq!(view.modal(), Some(Modal::AddEmployee));
    }

    #[test]
    fn close_and_backdrop_click_close_modal() {
        let mut view = on_dashboard();

        view.open_modal(Modal::AddTransaction);
        view.close_modal();
        assert_eq!(view.modal(), None);

        view.open_modal(Modal::AddEmployee);
        view.backdrop_click();
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn modals_need_the_dashboard() {
        let mut view = ViewState::default();

        assert!(!view.open_modal(Modal::AddTransaction));
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn leaving_dashboard_closes_modal_and_unmounts_regions() {
        let mut view = on_dashboard();
        view.open_modal(Modal::AddTransaction);
        view.write_region(RegionUpdate::Transactions(Vec::new()));

        view.show_page(Page::Landing);

        assert_eq!(view.modal(), None);
        assert!(view.regions().transactions.is_none());
    }

    #[test]
    fn writes_to_unmounted_regions_are_dropped() {
        let mut view = ViewState::default();

        let written = view.write_region(RegionUpdate::Stats(DashboardStats::from_transactions(
            &[],
        )));

        assert!(!written);
        assert!(view.regions().stats.is_none());
    }

    #[test]
    fn writes_to_mounted_regions_are_kept() {
        let mut view = on_dashboard();

        assert!(view.write_region(RegionUpdate::Employees(
            Vec::new(),
            EmployeeStats::from_employees(&[])
        )));
        assert!(view.regions().employees.is_some());
        assert!(view.regions().employee_stats.is_some());
    }
}
