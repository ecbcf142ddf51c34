use renewable_charge::config::Config;
use renewable_charge::feedback::{ChargeFeedback, RecordingStrip};
use renewable_charge::{CycleOutcome, CycleState, EnergyPackage, Garage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn garage_with_strips() -> (Garage, HashMap<String, Arc<RecordingStrip>>) {
    let mut strips = HashMap::new();
    let garage = Garage::from_config(&Config::default(), |player| {
        let strip = Arc::new(RecordingStrip::new());
        strips.insert(player.name.clone(), Arc::clone(&strip));
        strip as Arc<dyn ChargeFeedback>
    })
    .expect("default config is valid");
    (garage, strips)
}

#[test]
fn builds_cars_and_players_from_config() {
    let (garage, strips) = garage_with_strips();
    assert_eq!(garage.cars().len(), 4);
    assert_eq!(garage.players().len(), 4);
    assert_eq!(strips.len(), 4);

    let fall = garage.player("fall").expect("fall seat");
    assert_eq!(fall.color().r, 255);
    assert_eq!(fall.color().g, 80);
    assert!(garage.player("autumn").is_none());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.cars[0].battery_capacity_wh = 0;
    let result = Garage::from_config(&config, |_| {
        Arc::new(RecordingStrip::new()) as Arc<dyn ChargeFeedback>
    });
    assert!(result.is_err());
}

#[test]
fn every_chip_of_a_car_resolves_to_it() {
    let (garage, _) = garage_with_strips();
    let a = garage.find_by_chip("53A2B1C4").expect("first chip");
    let b = garage.find_by_chip("53A2B1C5").expect("second chip");
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.name(), "tesla_model_3");

    assert!(garage.find_by_chip("53A2B1C4:53A2B1C5").is_none());
    assert!(garage.find_by_chip("DEADBEEF").is_none());
}

#[test]
fn assign_sets_owner() {
    let (garage, _) = garage_with_strips();
    let spring = Arc::clone(garage.player("spring").unwrap());

    let car = garage.assign(&spring, "7F10E2D9").unwrap();
    assert_eq!(car.name(), "renault_zoe");
    assert_eq!(car.owner().unwrap().name(), "spring");
    assert_eq!(car.snapshot().owner.as_deref(), Some("spring"));
}

#[test]
fn assign_unknown_chip_fails() {
    let (garage, _) = garage_with_strips();
    let winter = Arc::clone(garage.player("winter").unwrap());

    let err = garage.assign(&winter, "00000000").unwrap_err();
    assert!(err.to_string().contains("00000000"));
    assert!(garage.cars().iter().all(|car| car.owner().is_none()));
}

#[test]
fn reassigning_a_car_moves_feedback_to_new_owner() {
    let (garage, strips) = garage_with_strips();
    let winter = Arc::clone(garage.player("winter").unwrap());
    let summer = Arc::clone(garage.player("summer").unwrap());

    let car = garage.assign(&winter, "A4C0FF12").unwrap();
    car.charge(100).unwrap();
    garage.assign(&summer, "A4C0FF12").unwrap();
    let report = car.charge(100).unwrap();
    renewable_charge::feedback::render(&report);

    assert!(strips["winter"].frames().is_empty());
    let frame = strips["summer"].last_frame().expect("summer frame");
    assert_eq!(frame.color, summer.color());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_stops_running_cycles() {
    let (garage, strips) = garage_with_strips();
    for (player, car) in garage.players().iter().zip(garage.cars()) {
        garage.assign(player, &car.chip_ids()[0]).unwrap();
    }

    let zoe = garage.find_by_chip("7F10E2D9").unwrap();
    let fiat = garage.find_by_chip("0B9E6D31").unwrap();
    assert!(zoe.claim_package(EnergyPackage::new(2000), None));
    assert!(fiat.claim_package(EnergyPackage::new(2000), None));

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(garage.cancel_all(), 2);
    assert_eq!(garage.cancel_all(), 0);

    for car in garage.cars() {
        car.wait_until_idle().await;
    }
    assert_eq!(
        zoe.cycle_state(),
        CycleState::Finished(CycleOutcome::Cancelled)
    );
    assert_eq!(zoe.charged_capacity_wh(), 600);
    assert_eq!(strips["spring"].frames().len(), 6);
    assert!(strips["winter"].frames().is_empty());
}
