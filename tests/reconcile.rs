mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::Notify;

use common::{container, Harness};
use reprox::certs::CertState;
use reprox::config::ScheduleConfig;
use reprox::discovery::LabelKeys;
use reprox::render::NginxRenderer;
use reprox::routing::RouteStore;
use reprox::scheduler::{CycleError, CycleOutcome, Reconciler, RenewalTask, StatusBoard, SweepOutcome};

struct Wired {
    reconciler: Reconciler,
    store: Arc<RouteStore>,
    trigger: Arc<Notify>,
    status: Arc<StatusBoard>,
}

fn wire(h: &Harness) -> Wired {
    let store = Arc::new(RouteStore::new());
    let trigger = Arc::new(Notify::new());
    let status = Arc::new(StatusBoard::new());
    let reconciler = Reconciler::new(
        h.source.clone(),
        LabelKeys::default(),
        store.clone(),
        h.certs.clone(),
        NginxRenderer::new(h.layout()),
        h.gate.clone(),
        trigger.clone(),
        status.clone(),
    );
    Wired {
        reconciler,
        store,
        trigger,
        status,
    }
}

#[tokio::test]
async fn test_new_container_is_routed_with_fallback_cert() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);

    let outcome = w.reconciler.run_cycle().await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied { version: 1, routes: 1 });

    let snapshot = w.store.snapshot();
    assert_eq!(snapshot.table.len(), 1);
    assert_eq!(snapshot.table[0].host(), "a.example.com");
    assert_eq!(snapshot.table[0].upstream(), "web1");

    let config = h.config_contents().unwrap();
    assert!(config.contains("server_name a.example.com;"));
    assert!(config.contains("proxy_pass http://web1;"));

    assert_eq!(h.supervisor.reloads(), 1);
    assert!(h.supervisor.missing_certs.lock().unwrap().is_empty());
    assert_eq!(h.certs.inspect("a.example.com").await, CertState::SelfSigned);
}

#[tokio::test]
async fn test_unchanged_discovery_skips_write_and_reload() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();

    let before = std::fs::metadata(&h.config_path).unwrap().modified().unwrap();
    let outcome = w.reconciler.run_cycle().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Unchanged);
    assert_eq!(h.supervisor.reloads(), 1);
    assert_eq!(w.store.snapshot().version, 1);
    let after = std::fs::metadata(&h.config_path).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_duplicate_host_last_discovered_wins() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();

    h.source.set(vec![
        container("/web1", "a.example.com"),
        container("/web2", "a.example.com"),
    ]);
    w.reconciler.run_cycle().await.unwrap();

    let snapshot = w.store.snapshot();
    assert_eq!(snapshot.table.len(), 1);
    assert_eq!(snapshot.table[0].upstream(), "web2");

    let config = h.config_contents().unwrap();
    assert_eq!(config.matches("server_name a.example.com;").count(), 2);
    assert!(config.contains("proxy_pass http://web2;"));
    assert!(!config.contains("proxy_pass http://web1;"));
}

#[tokio::test]
async fn test_acme_failure_keeps_fallback_material() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();

    let paths = h.layout().paths("a.example.com");
    let key_before = std::fs::read(&paths.key).unwrap();
    let chain_before = std::fs::read(&paths.chain).unwrap();

    h.issuer.fail_issue.store(true, Ordering::SeqCst);
    let mut renewal = RenewalTask::new(
        w.store.clone(),
        h.certs.clone(),
        h.gate.clone(),
        ScheduleConfig::default(),
        w.trigger.clone(),
    );
    assert_eq!(renewal.sweep().await, SweepOutcome::Failed);

    assert_eq!(std::fs::read(&paths.key).unwrap(), key_before);
    assert_eq!(std::fs::read(&paths.chain).unwrap(), chain_before);
    assert_eq!(h.certs.inspect("a.example.com").await, CertState::SelfSigned);
    assert_eq!(h.supervisor.reloads(), 1);

    // The next cycle still runs normally.
    assert_eq!(w.reconciler.run_cycle().await.unwrap(), CycleOutcome::Unchanged);
}

#[tokio::test]
async fn test_discovery_failure_leaves_state_untouched() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();
    let config_before = h.config_contents().unwrap();

    h.source.fail(true);
    let err = w.reconciler.run_cycle().await.unwrap_err();
    assert!(matches!(err, CycleError::Discovery(_)));

    assert_eq!(w.store.snapshot().version, 1);
    assert_eq!(w.store.snapshot().table.hosts(), vec!["a.example.com"]);
    assert_eq!(h.config_contents().unwrap(), config_before);
    assert_eq!(h.supervisor.reloads(), 1);

    assert!(w.reconciler.tick().await.is_none());
    let summary = w.status.last_cycle().unwrap();
    assert_eq!(summary.outcome, "failed");
    assert!(summary.error.is_some());
}

#[tokio::test]
async fn test_removed_container_drops_route() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![
        container("/web1", "a.example.com"),
        container("/web2", "b.example.com"),
    ]);
    w.reconciler.run_cycle().await.unwrap();

    h.source.set(vec![container("/web2", "b.example.com")]);
    let outcome = w.reconciler.run_cycle().await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied { version: 2, routes: 1 });

    let config = h.config_contents().unwrap();
    assert!(!config.contains("a.example.com"));
    assert!(config.contains("server_name b.example.com;"));
    // Material is never deleted.
    assert!(h.layout().paths("a.example.com").chain.exists());
}

#[tokio::test]
async fn test_failed_reload_is_retried_next_cycle() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);

    h.supervisor.fail_reload.store(true, Ordering::SeqCst);
    let err = w.reconciler.run_cycle().await.unwrap_err();
    assert!(matches!(err, CycleError::Reload(_)));
    assert_eq!(w.store.snapshot().version, 0);

    h.supervisor.fail_reload.store(false, Ordering::SeqCst);
    let outcome = w.reconciler.run_cycle().await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied { version: 1, routes: 1 });
}

#[tokio::test]
async fn test_host_without_material_is_withheld() {
    let h = Harness::new();
    let w = wire(&h);
    h.issuer
        .fail_self_signed_for
        .lock()
        .unwrap()
        .push("bad.example.com".to_string());
    h.source.set(vec![
        container("/web1", "a.example.com"),
        container("/web2", "bad.example.com"),
    ]);

    let outcome = w.reconciler.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Partial {
            applied: true,
            version: 1,
            routes: 1,
            withheld: vec!["bad.example.com".to_string()],
        }
    );

    assert_eq!(w.store.snapshot().table.hosts(), vec!["a.example.com"]);
    let config = h.config_contents().unwrap();
    assert!(!config.contains("bad.example.com"));
    assert!(h.supervisor.missing_certs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_withheld_host_is_reported_when_table_unchanged() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();

    h.issuer
        .fail_self_signed_for
        .lock()
        .unwrap()
        .push("bad.example.com".to_string());
    h.source.set(vec![
        container("/web1", "a.example.com"),
        container("/web2", "bad.example.com"),
    ]);

    let outcome = w.reconciler.tick().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Partial {
            applied: false,
            version: 1,
            routes: 1,
            withheld: vec!["bad.example.com".to_string()],
        }
    );
    assert_eq!(h.supervisor.reloads(), 1);

    let summary = w.status.last_cycle().unwrap();
    assert_eq!(summary.outcome, "partial");
    assert!(summary.error.as_deref().unwrap().contains("bad.example.com"));
}

#[tokio::test]
async fn test_failed_write_skips_reload() {
    let h = Harness::new();
    let w = wire(&h);
    // A directory at the target path makes the final rename fail.
    std::fs::create_dir_all(&h.config_path).unwrap();
    h.source.set(vec![container("/web1", "a.example.com")]);

    let err = w.reconciler.run_cycle().await.unwrap_err();

    assert!(matches!(err, CycleError::Write(_)));
    assert_eq!(h.supervisor.reloads(), 0);
    assert_eq!(w.store.snapshot().version, 0);
    assert!(h.config_path.is_dir());
}

#[tokio::test]
async fn test_unlabeled_containers_produce_no_routes() {
    let h = Harness::new();
    let w = wire(&h);
    let mut plain = container("/db", "ignored");
    plain.labels.clear();
    h.source.set(vec![plain]);

    // Empty discovery matches the initial empty table.
    assert_eq!(w.reconciler.run_cycle().await.unwrap(), CycleOutcome::Unchanged);
    assert!(h.config_contents().is_none());
    assert_eq!(h.supervisor.reloads(), 0);
}

#[tokio::test]
async fn test_successful_sweep_reloads_once() {
    let h = Harness::new();
    let w = wire(&h);
    h.source.set(vec![container("/web1", "a.example.com")]);
    w.reconciler.run_cycle().await.unwrap();

    let mut renewal = RenewalTask::new(
        w.store.clone(),
        h.certs.clone(),
        h.gate.clone(),
        ScheduleConfig::default(),
        w.trigger.clone(),
    );
    assert_eq!(renewal.sweep().await, SweepOutcome::Succeeded);
    assert_eq!(h.certs.inspect("a.example.com").await, CertState::Trusted);
    assert_eq!(h.supervisor.reloads(), 2);

    // Same material again: no reload.
    assert_eq!(renewal.sweep().await, SweepOutcome::Succeeded);
    assert_eq!(h.supervisor.reloads(), 2);
}

#[tokio::test]
async fn test_sweep_without_routes_is_idle() {
    let h = Harness::new();
    let w = wire(&h);
    let mut renewal = RenewalTask::new(
        w.store.clone(),
        h.certs.clone(),
        h.gate.clone(),
        ScheduleConfig::default(),
        w.trigger.clone(),
    );
    assert_eq!(renewal.sweep().await, SweepOutcome::Idle);
    assert!(h.issuer.issued.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_sweeps_retry_sooner_than_interval() {
    let h = Harness::new();
    let w = wire(&h);
    let schedule = ScheduleConfig::default();
    let renewal = RenewalTask::new(
        w.store.clone(),
        h.certs.clone(),
        h.gate.clone(),
        schedule.clone(),
        w.trigger.clone(),
    );

    assert_eq!(renewal.next_delay(0), schedule.renewal_interval());
    let retry = renewal.next_delay(1);
    assert!(retry >= std::time::Duration::from_secs(3600));
    assert!(retry < schedule.renewal_interval());
}
