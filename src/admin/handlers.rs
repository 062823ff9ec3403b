use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::certs::CertState;
use crate::routing::Route;
use crate::scheduler::{ControllerState, CycleSummary};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub state: ControllerState,
    pub table_version: u64,
    pub routes: usize,
    pub last_cycle: Option<CycleSummary>,
}

#[derive(Serialize)]
pub struct RouteList {
    pub table_version: u64,
    pub routes: Vec<Route>,
}

#[derive(Serialize)]
pub struct CertStatus {
    pub host: String,
    pub state: CertState,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.store.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        state: state.status.state(),
        table_version: snapshot.version,
        routes: snapshot.table.len(),
        last_cycle: state.status.last_cycle().map(|c| (*c).clone()),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<RouteList> {
    let snapshot = state.store.snapshot();
    Json(RouteList {
        table_version: snapshot.version,
        routes: snapshot.table.to_vec(),
    })
}

pub async fn get_certs(State(state): State<AdminState>) -> Json<Vec<CertStatus>> {
    let snapshot = state.store.snapshot();
    let mut statuses = Vec::with_capacity(snapshot.table.len());
    for host in snapshot.table.hosts() {
        let cert_state = state.certs.inspect(&host).await;
        statuses.push(CertStatus {
            host,
            state: cert_state,
        });
    }
    Json(statuses)
}
