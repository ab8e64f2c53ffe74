use std::path::PathBuf;

use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::json;

const BIN: &str = "evdash";

/// No configuration file there, we get the defaults.
///
fn empty_home() -> PathBuf {
    std::env::temp_dir().join("evdash-no-home")
}

fn evdash(api: &MockServer, geo: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.env("HOME", empty_home())
        .env_remove("RUST_LOG")
        .arg("--api-url")
        .arg(api.base_url())
        .arg("--geocoder-url")
        .arg(geo.base_url())
        .arg("--delay")
        .arg("0s");
    cmd
}

fn body() -> serde_json::Value {
    json!({
        "data": [{
            "vehicle_id": "V1",
            "registration_number": "DL01AB1234",
            "timestamp": "2024-03-15T10:20:30Z",
            "latitude": 28.6139,
            "longitude": 77.209,
            "speed": 42.5,
            "odometer": 1234.5,
            "battery_soc": 15,
            "ignition_status": true,
            "charging_status": 0,
            "distance_to_empty": 40.0,
            "vehicle_status": "moving",
            "oem_provider": "Tata"
        }],
        "pagination": {"page": 1, "per_page": 10, "total_pages": 1, "total_records": 1}
    })
}

fn new_delhi(geo: &MockServer) -> httpmock::Mock<'_> {
    geo.mock(|when, then| {
        when.method(GET)
            .path("/reverse")
            .query_param("lat", "28.6139")
            .query_param("lon", "77.209");
        then.status(200)
            .json_body(json!({"address": {"city": "New Delhi", "state": "Delhi"}}));
    })
}

#[test]
fn test_empty_args() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.assert().failure();
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-h").assert().success();
}

#[test]
fn test_version_opt() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-V").assert().failure();
}

#[test]
fn test_version_keyword() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("version").assert().success();
}

#[test]
fn test_bad_keyword() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("bouh").assert().failure();
}

#[test]
fn test_completion() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("completion").arg("bash").assert().success();
}

#[test]
fn test_missing_config() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args(["-c", "/nonexistent/evdash.hcl", "vehicles"])
        .assert()
        .failure();
}

#[test]
fn test_vehicles() {
    let api = MockServer::start();
    let geo = MockServer::start();
    let m = api.mock(|when, then| {
        when.method(GET)
            .path("/dashboard/data")
            .query_param("page", "1")
            .query_param("limit", "10")
            .query_param("oem_provider", "Tata")
            .query_param("start_date", "2024-03-15T00:00:00.000Z")
            .query_param("end_date", "2024-03-15T23:59:59.999Z");
        then.status(200).json_body(body());
    });
    let r = new_delhi(&geo);

    let out = evdash(&api, &geo)
        .args(["vehicles", "--range", "2024-03-15", "-p", "Tata", "--links"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let page = String::from_utf8_lossy(&out.stdout);
    assert!(page.contains("15 Mar 2024 15:50:30"));
    assert!(page.contains("New Delhi"));
    assert!(!page.contains("New Delhi, Delhi"));
    assert!(page.contains("15% (low)"));
    assert!(page.contains("https://www.google.com/maps?q=28.6139,77.209"));
    assert!(page.contains("Page 1 of 1 | prev: disabled | next: disabled"));
    m.assert();
    r.assert();
}

#[test]
fn test_vehicles_no_geocode() {
    let api = MockServer::start();
    let geo = MockServer::start();
    let _m = api.mock(|when, then| {
        when.method(GET).path("/dashboard/data");
        then.status(200).json_body(body());
    });
    let r = new_delhi(&geo);

    let out = evdash(&api, &geo)
        .args(["vehicles", "--no-geocode"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Loading..."));
    r.assert_hits(0);
}

#[test]
fn test_vehicles_api_error() {
    let api = MockServer::start();
    let geo = MockServer::start();
    let _m = api.mock(|when, then| {
        when.method(GET).path("/dashboard/data");
        then.status(500);
    });

    let out = evdash(&api, &geo).arg("vehicles").output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        "Error loading vehicles data",
        String::from_utf8_lossy(&out.stdout).trim()
    );
}

#[test]
fn test_resolve() {
    let api = MockServer::start();
    let geo = MockServer::start();
    let r = new_delhi(&geo);

    let out = evdash(&api, &geo)
        .args(["resolve", "28.6139", "77.2090"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        "28.6139, 77.2090: New Delhi, Delhi",
        String::from_utf8_lossy(&out.stdout).trim()
    );
    r.assert();
}

#[test]
fn test_resolve_out_of_range() {
    let api = MockServer::start();
    let geo = MockServer::start();

    evdash(&api, &geo)
        .args(["resolve", "91", "0"])
        .assert()
        .failure();
}

#[test]
fn test_dashboard_stdin() {
    let api = MockServer::start();
    let geo = MockServer::start();
    let _m = api.mock(|when, then| {
        when.method(GET).path("/dashboard/data");
        then.status(200).json_body(body());
    });
    let r = new_delhi(&geo);

    let out = evdash(&api, &geo)
        .args(["dashboard", "--start", "/"])
        .write_stdin("next\nprovider all\nshow\nquit\n")
        .output()
        .unwrap();
    assert!(out.status.success());

    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("Redirected to /vehicles"));
    assert!(text.contains("Next is disabled"));
    assert!(text.contains("Filters: begin=- end=- provider=all vehicle=-"));
    r.assert();
}
