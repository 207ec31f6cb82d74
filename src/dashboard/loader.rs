//! Fetching the dashboard data and writing it into the view.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use time::UtcOffset;

use crate::{
    AppState,
    config::AppConfig,
    dashboard::{
        aggregation::{DashboardStats, EmployeeStats},
        charts::build_charts,
    },
    navigation::{RegionUpdate, ViewState},
    notification::Notifier,
    records::{RecordStore, Transaction},
    session::SessionManager,
    timezone::get_local_offset,
};

/// The state needed for loading and showing the dashboard.
#[derive(Clone)]
pub struct DashboardState {
    /// Reads and writes the signed-in principal's records.
    pub records: RecordStore,
    /// Who is signed in.
    pub session: SessionManager,
    /// What is on screen.
    pub view: Arc<Mutex<ViewState>>,
    /// The toast slot.
    pub notifier: Arc<Mutex<Notifier>>,
    /// Server settings.
    pub config: AppConfig,
}

impl DashboardState {
    /// Borrow the dashboard's parts of `state`.
    pub fn from_app_state(state: &AppState) -> Self {
        Self {
            records: state.records.clone(),
            session: state.session.clone(),
            view: state.view.clone(),
            notifier: state.notifier.clone(),
            config: state.config.clone(),
        }
    }

    /// The configured timezone's offset, falling back to UTC for an unknown
    /// timezone.
    pub fn local_offset(&self) -> UtcOffset {
        get_local_offset(&self.config.local_timezone).unwrap_or_else(|| {
            tracing::warn!(
                "unknown timezone \"{}\", falling back to UTC",
                self.config.local_timezone
            );
            UtcOffset::UTC
        })
    }
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self::from_app_state(state)
    }
}

/// Fetch everything the dashboard shows and write it into the view.
///
/// Without a session this does nothing. Otherwise the transactions, the
/// employees and the statistics are fetched concurrently, each written to its
/// region as soon as it arrives. A failed fetch leaves its region empty rather
/// than failing the whole load. The charts are built once all three are done.
pub async fn load_dashboard(state: &DashboardState) {
    if !state.session.is_active() {
        tracing::debug!("no session, skipping dashboard load");
        return;
    }

    let transactions = async {
        let transactions = fetch_transactions(state).await;
        write_region(state, RegionUpdate::Transactions(transactions.clone()));
        transactions
    };

    let employees = async {
        let employees = state.records.query_employees().await.unwrap_or_else(|error| {
            tracing::error!("could not load employees: {error}");
            Vec::new()
        });
        let stats = EmployeeStats::from_employees(&employees);
        write_region(state, RegionUpdate::Employees(employees, stats));
    };

    let stats = async {
        let transactions = fetch_transactions(state).await;
        let stats = DashboardStats::from_transactions(&transactions);
        write_region(state, RegionUpdate::Stats(stats));
    };

    let (transactions, (), ()) = tokio::join!(transactions, employees, stats);

    let charts = build_charts(
        state.config.chart_source,
        &transactions,
        state.local_offset(),
    );
    write_region(state, RegionUpdate::Charts(charts));
}

async fn fetch_transactions(state: &DashboardState) -> Vec<Transaction> {
    state
        .records
        .query_transactions()
        .await
        .unwrap_or_else(|error| {
            tracing::error!("could not load transactions: {error}");
            Vec::new()
        })
}

fn write_region(state: &DashboardState, update: RegionUpdate) {
    match state.view.lock() {
        Ok(mut view) => {
            if !view.write_region(update) {
                tracing::debug!("dashboard is not mounted, dropping region update");
            }
        }
        Err(error) => tracing::error!("could not lock view state: {error}"),
    }
}

#[cfg(test)]
mod load_dashboard_tests {
    use std::sync::{Arc, Mutex};

    use time::macros::datetime;

    use rusqlite::Connection;

    use crate::{
        backend::{DocumentStore, Principal, PrincipalId, SqliteDocumentStore},
        config::AppConfig,
        navigation::{Page, ViewState},
        notification::Notifier,
        records::{Category, EMPLOYEES, NewTransaction, RecordStore, TransactionType},
        session::SessionManager,
        test_utils::{FailingCollectionStore, FailingDocumentStore, test_app_state},
    };

    use super::{DashboardState, load_dashboard};

    fn principal() -> Principal {
        Principal {
            id: PrincipalId::new("1"),
            email: "jane@example.com".to_owned(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn no_session_leaves_regions_empty() {
        let state = DashboardState::from_app_state(&test_app_state());
        state.view.lock().unwrap().show_page(Page::Dashboard);

        load_dashboard(&state).await;

        let view = state.view.lock().unwrap();
        assert!(view.regions().transactions.is_none());
        assert!(view.regions().charts.is_none());
    }

    #[tokio::test]
    async fn fills_every_region() {
        let state = DashboardState::from_app_state(&test_app_state());
        state.session.apply(Some(&principal()));
        state.view.lock().unwrap().show_page(Page::Dashboard);
        state
            .records
            .create_transaction(NewTransaction::new(
                "Salary",
                4100.0,
                Category::Income,
                TransactionType::Income,
                datetime!(2025-01-01 9:00 UTC),
            ))
            .await
            .unwrap();

        load_dashboard(&state).await;

        let view = state.view.lock().unwrap();
        let regions = view.regions();
        assert_eq!(regions.transactions.as_ref().unwrap().len(), 1);
        assert_eq!(regions.stats.unwrap().total_income, 4100.0);
        assert_eq!(regions.employees.as_ref().unwrap().len(), 0);
        assert_eq!(regions.employee_stats.unwrap().employee_count, 0);
        assert_eq!(regions.charts.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failing_store_degrades_to_empty() {
        let state = state_over(Arc::new(FailingDocumentStore));

        load_dashboard(&state).await;

        let view = state.view.lock().unwrap();
        let regions = view.regions();
        assert_eq!(regions.transactions.as_ref().unwrap().len(), 0);
        assert_eq!(regions.stats.unwrap().transaction_count, 0);
        assert_eq!(regions.employees.as_ref().unwrap().len(), 0);
        assert!(regions.charts.is_some());
    }

    fn state_over(store: Arc<dyn DocumentStore>) -> DashboardState {
        let session = SessionManager::new();
        session.apply(Some(&principal()));
        let view = Arc::new(Mutex::new(ViewState::default()));
        view.lock().unwrap().show_page(Page::Dashboard);

        DashboardState {
            records: RecordStore::new(store, session.clone()),
            session,
            view,
            notifier: Arc::new(Mutex::new(Notifier::new())),
            config: AppConfig::default(),
        }
    }

    #[tokio::test]
    async fn one_failed_fetch_does_not_block_the_others() {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let documents = SqliteDocumentStore::new(Arc::new(Mutex::new(connection)))
            .expect("Could not create document store");
        let state = state_over(Arc::new(FailingCollectionStore {
            inner: documents,
            failing_collection: EMPLOYEES,
        }));
        for (description, amount, kind) in [
            ("Salary", 4100.0, TransactionType::Income),
            ("Rent", 3200.0, TransactionType::Expense),
        ] {
            state
                .records
                .create_transaction(NewTransaction::new(
                    description,
                    amount,
                    Category::Shopping,
                    kind,
                    datetime!(2025-01-01 9:00 UTC),
                ))
                .await
                .unwrap();
        }

        load_dashboard(&state).await;

        let view = state.view.lock().unwrap();
        let regions = view.regions();
        assert_eq!(regions.transactions.as_ref().unwrap().len(), 2);
        let stats = regions.stats.unwrap();
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.total_balance, 900.0);
        assert_eq!(regions.employees.as_ref().unwrap().len(), 0);
        assert_eq!(regions.employee_stats.unwrap().employee_count, 0);
        assert_eq!(regions.charts.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unmounted_dashboard_drops_results() {
        let state = DashboardState::from_app_state(&test_app_state());
        state.session.apply(Some(&principal()));

        load_dashboard(&state).await;

        let view = state.view.lock().unwrap();
        assert!(view.regions().transactions.is_none());
        assert!(view.regions().stats.is_none());
    }
}
