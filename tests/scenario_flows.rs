//! Review and address confirmation scenarios against emulated applications

use std::time::Duration;

use serde_json::{Value, json};
use tempfile::TempDir;

use device_harness::backend::{AppModel, BackendError, EmulatorBackend};
use device_harness::navigator::{NavigatorConfig, WaitTimings};
use device_harness::snapshot::list_snaps;
use device_harness::{
    Device, NavError, NavigateWithScenario, Navigator, ScenarioOptions, SnapshotCase, Transport,
    pack_apdu,
};

const SIGN_CLA: u8 = 0xE0;
const SIGN_INS: u8 = 0x04;

fn sign_command() -> Value {
    json!({
        "cla": SIGN_CLA,
        "ins": SIGN_INS,
        "prompt": "review",
        "approve_on": ["signed"],
        "reject_on": ["rejected"],
        "response": "9f01"
    })
}

/// Button application: Review, Amount, Approve, Reject
fn nano_app(secondary_confirmation: bool) -> Value {
    let approve_to = if secondary_confirmation { "confirm" } else { "signed" };
    json!({
        "name": "nano-signer",
        "home": "home",
        "screens": [
            { "id": "home", "lines": ["Signer", "is ready"] },
            { "id": "review", "lines": ["Review", "transaction"], "right": "amount" },
            { "id": "amount", "lines": ["Amount", "10 COIN"], "left": "review", "right": "approve" },
            { "id": "approve", "lines": ["Approve"], "left": "amount", "right": "reject", "both": approve_to },
            { "id": "reject", "lines": ["Reject"], "left": "approve", "both": "rejected" },
            { "id": "confirm", "lines": ["Confirm", "again?"], "both": "signed" },
            { "id": "signed", "lines": ["Signed"] },
            { "id": "rejected", "lines": ["Rejected"] }
        ],
        "commands": [sign_command()]
    })
}

/// Stax application: taps through the review, holds to sign
fn stax_app() -> Value {
    let next = json!({ "x": 300, "y": 580, "w": 100, "h": 60, "to": "" });
    let tap_next = |to: &str| {
        let mut region = next.clone();
        region["to"] = json!(to);
        region
    };
    json!({
        "name": "stax-signer",
        "home": "home",
        "screens": [
            { "id": "home", "lines": ["Signer"] },
            { "id": "review", "lines": ["Review transaction"], "touch": [tap_next("amount")] },
            { "id": "amount", "lines": ["Amount", "10 COIN"], "touch": [tap_next("sign")] },
            { "id": "sign", "lines": ["Sign transaction?", "Hold to sign"], "touch": [
                { "x": 100, "y": 490, "w": 200, "h": 50, "to": "signed", "min_delay_ms": 1000 },
                { "x": 0, "y": 580, "w": 80, "h": 60, "to": "reject_choice" }
            ] },
            { "id": "reject_choice", "lines": ["Reject transaction?"], "touch": [
                { "x": 100, "y": 490, "w": 200, "h": 50, "to": "rejected" }
            ] },
            { "id": "signed", "lines": ["Transaction signed"], "touch": [
                { "x": 0, "y": 100, "w": 400, "h": 300, "to": "home" }
            ] },
            { "id": "rejected", "lines": ["Transaction rejected"], "touch": [
                { "x": 0, "y": 100, "w": 400, "h": 300, "to": "home" }
            ] }
        ],
        "commands": [sign_command()]
    })
}

/// Flex application: swipes through the address, confirms or cancels
fn flex_address_app() -> Value {
    let dismiss = json!([{ "x": 100, "y": 200, "w": 280, "h": 150, "to": "home" }]);
    json!({
        "name": "flex-address",
        "home": "home",
        "start": "verify",
        "screens": [
            { "id": "home", "lines": ["Wallet"] },
            { "id": "verify", "lines": ["Verify address"], "swipe_left": "address" },
            { "id": "address", "lines": ["0x1234", "abcd"], "swipe_left": "confirm", "swipe_right": "verify" },
            { "id": "confirm", "lines": ["Confirm"], "touch": [
                { "x": 100, "y": 400, "w": 280, "h": 70, "to": "verified" },
                { "x": 0, "y": 500, "w": 110, "h": 60, "to": "cancelled" }
            ] },
            { "id": "verified", "lines": ["Address verified"], "touch": dismiss.clone() },
            { "id": "cancelled", "lines": ["Address rejected"], "touch": dismiss }
        ]
    })
}

fn config(golden_run: bool) -> NavigatorConfig {
    NavigatorConfig::default()
        .golden_run(golden_run)
        .timings(WaitTimings::none())
        .poll_interval(Duration::from_millis(1))
        .screen_change_timeout(Duration::from_millis(300))
}

fn scenario(device: Device, app: Value, root: &std::path::Path, golden_run: bool) -> NavigateWithScenario<EmulatorBackend> {
    let model = AppModel::from_value(app).expect("Invalid application model");
    let backend = EmulatorBackend::new(device, model)
        .expect("Failed to start emulator")
        .with_poll_interval(Duration::from_millis(1));
    let navigator = Navigator::for_device(backend, device, config(golden_run)).expect("Failed to build navigator");
    NavigateWithScenario::new(navigator, "sign_tx", root)
}

fn start_signing(scenario: &mut NavigateWithScenario<EmulatorBackend>) -> device_harness::PendingExchange {
    scenario
        .navigator_mut()
        .backend_mut()
        .exchange_async_raw(&pack_apdu(SIGN_CLA, SIGN_INS, 0, 0, &[0x01, 0x02]).expect("Failed to pack APDU"))
        .expect("Failed to send APDU")
}

#[test]
fn test_nano_review_approve_records_and_replays() {
    let temp = TempDir::new().unwrap();

    for golden_run in [true, false] {
        let mut scenario = scenario(Device::NanoSP, nano_app(false), temp.path(), golden_run);
        let pending = start_signing(&mut scenario);

        let steps = scenario.review_approve(ScenarioOptions::default()).expect("Review failed");
        assert_eq!(steps, 2);

        let rapdu = scenario
            .navigator_mut()
            .backend_mut()
            .complete_exchange(pending)
            .expect("Exchange failed");
        assert_eq!(rapdu.status, 0x9000);
        assert_eq!(rapdu.data, vec![0x9f, 0x01]);
    }

    let case = SnapshotCase::new(temp.path(), "sign_tx");
    assert_eq!(list_snaps(&case.golden_dir(Device::NanoSP)).unwrap().len(), 4);
    assert_eq!(list_snaps(&case.tmp_dir(Device::NanoSP)).unwrap().len(), 4);
}

#[test]
fn test_nano_review_reject() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::NanoX, nano_app(false), temp.path(), true);
    let pending = start_signing(&mut scenario);

    let steps = scenario
        .review_reject(ScenarioOptions::default().test_name("reject_tx"))
        .expect("Review failed");
    assert_eq!(steps, 3);

    let err = scenario
        .navigator_mut()
        .backend_mut()
        .complete_exchange(pending)
        .unwrap_err();
    match err {
        BackendError::Status(exception) => assert_eq!(exception.status, 0x6985),
        other => panic!("Expected a rejection status, got {:?}", other),
    }
    let case = SnapshotCase::new(temp.path(), "reject_tx");
    assert_eq!(list_snaps(&case.golden_dir(Device::NanoX)).unwrap().len(), 5);
}

#[test]
fn test_nano_secondary_confirmation() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::NanoS, nano_app(true), temp.path(), false)
        .with_secondary_confirmation(true);
    let pending = start_signing(&mut scenario);

    scenario
        .review_approve(ScenarioOptions::default().do_comparison(false))
        .expect("Review failed");
    assert_eq!(scenario.navigator_mut().backend_mut().current_screen(), "signed");
    assert!(scenario.navigator_mut().backend_mut().complete_exchange(pending).is_ok());
}

#[test]
fn test_stax_review_approve_holds_to_sign() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::Stax, stax_app(), temp.path(), true);
    let pending = start_signing(&mut scenario);

    let steps = scenario.review_approve(ScenarioOptions::default()).expect("Review failed");
    assert_eq!(steps, 2);
    // Status screen dismissed
    assert_eq!(scenario.navigator_mut().backend_mut().current_screen(), "home");

    let rapdu = scenario.navigator_mut().backend_mut().complete_exchange(pending).unwrap();
    assert_eq!(rapdu.status, 0x9000);

    let case = SnapshotCase::new(temp.path(), "sign_tx");
    // Review, amount, sign, signed, home
    assert_eq!(list_snaps(&case.golden_dir(Device::Stax)).unwrap().len(), 5);
}

#[test]
fn test_stax_review_reject_confirms_choice() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::Stax, stax_app(), temp.path(), false);
    let pending = start_signing(&mut scenario);

    scenario
        .review_reject(ScenarioOptions::default().do_comparison(false))
        .expect("Review failed");
    assert_eq!(scenario.navigator_mut().backend_mut().current_screen(), "home");
    assert!(matches!(
        scenario.navigator_mut().backend_mut().complete_exchange(pending),
        Err(BackendError::Status(_))
    ));
}

#[test]
fn test_flex_address_flows() {
    let temp = TempDir::new().unwrap();

    let mut approve = scenario(Device::Flex, flex_address_app(), temp.path(), false);
    let steps = approve
        .address_review_approve(ScenarioOptions::default().do_comparison(false))
        .expect("Address approval failed");
    assert_eq!(steps, 2);
    assert_eq!(approve.navigator_mut().backend_mut().current_screen(), "home");

    let mut reject = scenario(Device::Flex, flex_address_app(), temp.path(), false);
    reject
        .address_review_reject(ScenarioOptions::default().do_comparison(false))
        .expect("Address rejection failed");
    assert_eq!(reject.navigator_mut().backend_mut().input_count(), 4);
}

#[test]
fn test_custom_screen_text_replaces_pattern() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::NanoX, nano_app(false), temp.path(), false);
    start_signing(&mut scenario);

    // Stops on the amount screen: the validation click does nothing there
    let err = scenario
        .review_approve(
            ScenarioOptions::default()
                .do_comparison(false)
                .custom_screen_text("^10 COIN$"),
        )
        .unwrap_err();
    assert!(matches!(err, NavError::Backend(BackendError::ScreenChangeTimeout)));
}

#[test]
fn test_comparison_needs_goldens() {
    let temp = TempDir::new().unwrap();
    let mut scenario = scenario(Device::NanoX, nano_app(false), temp.path(), false);
    start_signing(&mut scenario);

    let err = scenario.review_approve(ScenarioOptions::default()).unwrap_err();
    assert!(matches!(err, NavError::GoldenDirMissing(_)));
}
