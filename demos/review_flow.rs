//! Example running a transaction review on an emulated Nano X application,
//! first recording its goldens, then checking a second run against them

use device_harness::backend::{AppModel, EmulatorBackend};
use device_harness::navigator::NavigatorConfig;
use device_harness::snapshot::list_snaps;
use device_harness::{Device, NavigateWithScenario, NavigationReport, Navigator, ScenarioOptions, SnapshotCase, Transport, pack_apdu};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let device = Device::NanoX;

    for golden_run in [true, false] {
        let backend = EmulatorBackend::new(device, signer_app()?)?;
        let navigator = Navigator::for_device(backend, device, NavigatorConfig::default().golden_run(golden_run))?;
        let mut scenario = NavigateWithScenario::new(navigator, "sign_tx", root.path());

        let pending = scenario
            .navigator_mut()
            .backend_mut()
            .exchange_async_raw(&pack_apdu(0xE0, 0x04, 0x00, 0x00, b"tx")?)?;

        let report = NavigationReport::start(device, Some("sign_tx".to_string()), golden_run);
        let outcome = scenario.review_approve(ScenarioOptions::default());
        let report = report.finish(&outcome);

        let rapdu = scenario.navigator_mut().backend_mut().complete_exchange(pending)?;
        println!(
            "{} run: success={} steps={} in {} ms, response {}",
            if golden_run { "Golden" } else { "Comparison" },
            report.success,
            report.steps,
            report.duration_ms,
            hex::encode(rapdu.to_bytes())
        );
    }

    let case = SnapshotCase::new(root.path(), "sign_tx");
    println!("\nGolden frames:");
    for snap in list_snaps(&case.golden_dir(device))? {
        println!("  {}", snap.display());
    }

    Ok(())
}

fn signer_app() -> Result<AppModel, Box<dyn std::error::Error>> {
    let model = AppModel::from_value(json!({
        "name": "signer",
        "home": "home",
        "screens": [
            { "id": "home", "lines": ["Signer", "is ready"] },
            { "id": "review", "lines": ["Review", "transaction"], "right": "amount" },
            { "id": "amount", "lines": ["Amount", "10 COIN"], "left": "review", "right": "approve" },
            { "id": "approve", "lines": ["Approve"], "left": "amount", "right": "reject", "both": "signed" },
            { "id": "reject", "lines": ["Reject"], "left": "approve", "both": "rejected" },
            { "id": "signed", "lines": ["Signed"] },
            { "id": "rejected", "lines": ["Rejected"] }
        ],
        "commands": [
            { "cla": 224, "ins": 4, "prompt": "review", "approve_on": ["signed"], "reject_on": ["rejected"], "response": "9000aa" }
        ]
    }))?;
    Ok(model)
}
