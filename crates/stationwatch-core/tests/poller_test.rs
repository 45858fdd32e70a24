#![allow(clippy::unwrap_used)]

// Poller cycle tests against a scripted in-memory device client.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use url::Url;

use stationwatch_api::{DeviceClient, Error, RawDevice, RawDeviceList};
use stationwatch_core::{
    CoreError, CycleStage, MacAddress, Monitor, Poller, PollerConfig, SESSION_REFRESH_CYCLES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Login,
    Logout,
    Fetch,
}

enum Reply {
    Data(RawDeviceList),
    Empty,
    Structural,
    Transport,
    Hang,
}

#[derive(Default)]
struct Script {
    fetches: VecDeque<Reply>,
    logins: VecDeque<bool>,
    logout_fails: bool,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
struct ScriptedClient(Arc<Mutex<Script>>);

impl ScriptedClient {
    fn push_fetch(&self, reply: Reply) {
        self.0.lock().unwrap().fetches.push_back(reply);
    }

    fn push_login(&self, ok: bool) {
        self.0.lock().unwrap().logins.push_back(ok);
    }

    fn fail_logout(&self) {
        self.0.lock().unwrap().logout_fails = true;
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    fn clear_calls(&self) {
        self.0.lock().unwrap().calls.clear();
    }
}

impl DeviceClient for ScriptedClient {
    async fn login(&self, _username: &str, _password: &SecretString) -> Result<(), Error> {
        let ok = {
            let mut script = self.0.lock().unwrap();
            script.calls.push(Call::Login);
            script.logins.pop_front().unwrap_or(true)
        };
        if ok {
            Ok(())
        } else {
            Err(Error::Authentication {
                message: "invalid credentials".into(),
            })
        }
    }

    async fn logout(&self) -> Result<(), Error> {
        let fails = {
            let mut script = self.0.lock().unwrap();
            script.calls.push(Call::Logout);
            script.logout_fails
        };
        if fails {
            Err(Error::Http {
                status: 500,
                message: "logout rejected".into(),
            })
        } else {
            Ok(())
        }
    }

    async fn fetch_devices(&self) -> Result<Option<RawDeviceList>, Error> {
        let reply = {
            let mut script = self.0.lock().unwrap();
            script.calls.push(Call::Fetch);
            script
                .fetches
                .pop_front()
                .unwrap_or_else(|| Reply::Data(RawDeviceList::default()))
        };
        match reply {
            Reply::Data(list) => Ok(Some(list)),
            Reply::Empty => Ok(None),
            Reply::Structural => Err(Error::Deserialization {
                message: "expected value at line 1 column 1".into(),
                body: "<html><body>Please log in</body></html>".into(),
            }),
            Reply::Transport => Err(Error::Http {
                status: 503,
                message: "connection refused".into(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

fn config(filter: Option<&str>) -> PollerConfig {
    let mut config = PollerConfig::new(
        Url::parse("http://192.168.0.1").unwrap(),
        "admin",
        SecretString::from("hunter2"),
    );
    config.mac_filter = filter.map(String::from);
    config.call_timeout = Duration::from_secs(5);
    config
}

fn lan(macs: &[&str]) -> RawDeviceList {
    RawDeviceList::new(macs.iter().map(|m| RawDevice::with_mac(*m)).collect(), vec![])
}

async fn logged_in(client: &ScriptedClient, filter: Option<&str>) -> Poller<ScriptedClient> {
    let mut poller = Poller::new(client.clone(), &config(filter));
    poller.login().await.unwrap();
    client.clear_calls();
    poller
}

fn macs(list: &[stationwatch_core::DeviceRecord]) -> Vec<&str> {
    list.iter()
        .map(|d| d.mac.as_ref().map_or("", MacAddress::as_str))
        .collect()
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn normalizes_macs_without_filter() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Data(lan(&["AA:BB:CC:11:22:33"])));
    let mut poller = logged_in(&client, None).await;

    let snap = poller.poll().await.unwrap().unwrap();

    assert_eq!(macs(&snap.lan), vec!["aa:bb:cc:11:22:33"]);
    assert!(snap.wlan.is_empty());
    assert_eq!(snap.cycle, 1);
    assert_eq!(client.calls(), vec![Call::Fetch]);
}

#[tokio::test]
async fn filter_keeps_only_listed_macs() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Data(lan(&["AA:BB:CC:11:22:33", "DE:AD:BE:EF:00:01"])));
    let mut poller = logged_in(&client, Some("aa:bb:cc:11:22:33")).await;

    let snap = poller.poll().await.unwrap().unwrap();

    assert_eq!(macs(&snap.lan), vec!["aa:bb:cc:11:22:33"]);
}

#[tokio::test]
async fn structural_error_recovers_with_one_relogin() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Structural);
    client.push_fetch(Reply::Data(RawDeviceList::new(
        vec![RawDevice::with_mac("AA:BB:CC:11:22:33")],
        vec![RawDevice::with_mac("DE:AD:BE:EF:00:01")],
    )));
    let mut poller = logged_in(&client, Some("AA:BB:CC:11:22:33")).await;

    let snap = poller.poll().await.unwrap().unwrap();

    assert_eq!(macs(&snap.lan), vec!["aa:bb:cc:11:22:33"]);
    assert!(snap.wlan.is_empty(), "recovery data must be filtered too");
    assert!(poller.is_authenticated());
    assert_eq!(client.calls(), vec![Call::Fetch, Call::Login, Call::Fetch]);
}

#[tokio::test]
async fn failed_recovery_fetch_is_fatal() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Structural);
    client.push_fetch(Reply::Transport);
    let mut poller = logged_in(&client, None).await;

    let err = poller.poll().await.unwrap_err();

    assert_eq!(err.cycle, 1);
    assert_eq!(err.stage, CycleStage::RecoveryFetch);
    assert!(err.source.is_transport());
    assert_eq!(client.calls(), vec![Call::Fetch, Call::Login, Call::Fetch]);
}

#[tokio::test]
async fn transport_error_is_fatal_without_relogin() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Transport);
    let mut poller = logged_in(&client, None).await;

    let err = poller.poll().await.unwrap_err();

    assert_eq!(err.stage, CycleStage::Fetch);
    assert!(!err.recovery_attempted());
    assert!(poller.is_authenticated());
    assert_eq!(client.calls(), vec![Call::Fetch]);
}

// ── Recovery edges ──────────────────────────────────────────────────

#[tokio::test]
async fn failed_relogin_leaves_session_unauthenticated() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Structural);
    let mut poller = logged_in(&client, None).await;
    client.push_login(false);

    let err = poller.poll().await.unwrap_err();

    assert_eq!(err.stage, CycleStage::RecoveryLogin);
    assert!(matches!(err.source, CoreError::AuthenticationFailed { .. }));
    assert!(!poller.is_authenticated());
    assert_eq!(client.calls(), vec![Call::Fetch, Call::Login]);
}

#[tokio::test]
async fn second_structural_error_is_not_retried() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Structural);
    client.push_fetch(Reply::Structural);
    let mut poller = logged_in(&client, None).await;

    let err = poller.poll().await.unwrap_err();

    assert_eq!(err.stage, CycleStage::RecoveryFetch);
    assert!(err.source.is_session_expired());
    assert_eq!(client.calls(), vec![Call::Fetch, Call::Login, Call::Fetch]);
}

#[tokio::test]
async fn empty_listing_is_not_an_error() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Empty);
    let mut poller = logged_in(&client, None).await;

    assert!(poller.poll().await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn hung_fetch_times_out_as_transport_failure() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Hang);
    let mut poller = logged_in(&client, None).await;

    let err = poller.poll().await.unwrap_err();

    assert_eq!(err.stage, CycleStage::Fetch);
    assert!(matches!(err.source, CoreError::Timeout { timeout_secs: 5 }));
    assert_eq!(client.calls(), vec![Call::Fetch]);
}

// ── Session refresh cadence ─────────────────────────────────────────

#[tokio::test]
async fn refreshes_session_before_every_twentieth_fetch() {
    let client = ScriptedClient::default();
    let mut poller = logged_in(&client, None).await;

    for _ in 0..(SESSION_REFRESH_CYCLES * 2) {
        poller.poll().await.unwrap();
    }

    let calls = client.calls();
    let rotations: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == Call::Logout)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(rotations.len(), 2);

    // 19 plain fetches, then logout + login + fetch for cycle 20.
    assert_eq!(rotations[0], 19);
    assert_eq!(&calls[19..22], &[Call::Logout, Call::Login, Call::Fetch]);
    assert_eq!(rotations[1], 19 + 3 + 19);
    assert_eq!(poller.cycle_count(), SESSION_REFRESH_CYCLES * 2);
}

#[tokio::test]
async fn refresh_continues_after_logout_failure() {
    let client = ScriptedClient::default();
    client.fail_logout();
    let mut poller = logged_in(&client, None).await;

    for _ in 0..SESSION_REFRESH_CYCLES {
        poller.poll().await.unwrap();
    }

    let tail = &client.calls()[19..];
    assert_eq!(tail, &[Call::Logout, Call::Login, Call::Fetch]);
    assert!(poller.is_authenticated());
}

#[tokio::test]
async fn refresh_fetches_even_when_login_fails() {
    let client = ScriptedClient::default();
    let mut poller = logged_in(&client, None).await;

    for _ in 1..SESSION_REFRESH_CYCLES {
        poller.poll().await.unwrap();
    }
    client.push_login(false);
    client.push_fetch(Reply::Data(lan(&["DE-AD-BE-EF-00-01"])));

    let snap = poller.poll().await.unwrap().unwrap();

    assert_eq!(macs(&snap.lan), ["de:ad:be:ef:00:01"]);
    let tail = &client.calls()[19..];
    assert_eq!(tail, &[Call::Logout, Call::Login, Call::Fetch]);
    assert!(!poller.is_authenticated());
}

#[tokio::test]
async fn logout_failure_still_clears_session() {
    let client = ScriptedClient::default();
    client.fail_logout();
    let mut poller = logged_in(&client, None).await;

    assert!(poller.logout().await.is_err());
    assert!(!poller.is_authenticated());
}

#[tokio::test]
async fn failed_login_stays_unauthenticated() {
    let client = ScriptedClient::default();
    client.push_login(false);
    let mut poller = Poller::new(client.clone(), &config(None));

    let err = poller.login().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(!poller.is_authenticated());
}

// ── Monitor ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn monitor_keeps_last_snapshot_across_failures() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Data(lan(&["AA:BB:CC:11:22:33"])));
    client.push_fetch(Reply::Transport);
    client.push_fetch(Reply::Data(lan(&["DE:AD:BE:EF:00:01"])));

    let monitor = Monitor::start(Poller::new(client.clone(), &config(None)))
        .await
        .unwrap();
    let first = monitor.state();
    assert_eq!(first.cycles, 1);
    assert_eq!(macs(&first.snapshot.as_ref().unwrap().lan), vec!["aa:bb:cc:11:22:33"]);

    let mut rx = monitor.subscribe();

    rx.changed().await.unwrap();
    let failed = rx.borrow_and_update().clone();
    assert_eq!(failed.cycles, 2);
    assert_eq!(failed.consecutive_failures, 1);
    assert!(failed.is_stale());
    assert_eq!(macs(&failed.snapshot.as_ref().unwrap().lan), vec!["aa:bb:cc:11:22:33"]);

    rx.changed().await.unwrap();
    let recovered = rx.borrow_and_update().clone();
    assert_eq!(recovered.cycles, 3);
    assert!(recovered.last_error.is_none());
    assert_eq!(macs(&recovered.snapshot.as_ref().unwrap().lan), vec!["de:ad:be:ef:00:01"]);

    monitor.shutdown().await;
    assert_eq!(client.calls().last(), Some(&Call::Logout));
}

#[tokio::test]
async fn monitor_start_fails_on_rejected_login() {
    let client = ScriptedClient::default();
    client.push_login(false);

    let err = Monitor::start(Poller::new(client.clone(), &config(None)))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(client.calls(), vec![Call::Login]);
}

#[tokio::test]
async fn monitor_start_fails_on_first_cycle_and_logs_out() {
    let client = ScriptedClient::default();
    client.push_fetch(Reply::Transport);

    let err = Monitor::start(Poller::new(client.clone(), &config(None)))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, CoreError::Cycle(_)));
    assert!(err.root().is_transport());
    assert_eq!(client.calls(), vec![Call::Login, Call::Fetch, Call::Logout]);
}
