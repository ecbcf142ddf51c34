use anyhow::{Context, Result};
use renewable_charge::feedback::{ChargeFeedback, LoggingStrip};
use renewable_charge::{ChargeProgress, Config, EnergyPackage, Garage, ProgressCallback};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    renewable_charge::logging::init_logging(&config.logging)?;

    info!("Renewable Charge {} starting up", env!("APP_VERSION"));

    let garage = Garage::from_config(&config, |player| {
        Arc::new(LoggingStrip::new(&player.name)) as Arc<dyn ChargeFeedback>
    })?;

    // Seat N drives car N, like pressing keys 1-4 on the selection screen
    for (player, car) in garage.players().iter().zip(garage.cars()) {
        if let Some(chip) = car.chip_ids().first() {
            garage.assign(player, chip)?;
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["status"] => {
                for car in garage.cars() {
                    println!("{}", serde_json::to_string(&car.snapshot())?);
                }
            }
            ["cancel", chip] => match garage.find_by_chip(chip) {
                Some(car) if car.cancel_charge() => println!("{}: cancelling", car.name()),
                Some(car) => println!("{}: not charging", car.name()),
                None => println!("unknown chip {chip}"),
            },
            [chip, size] => {
                let Some(car) = garage.find_by_chip(chip) else {
                    println!("unknown chip {chip}");
                    continue;
                };
                let Ok(size_wh) = size.parse::<u32>() else {
                    println!("invalid package size {size}");
                    continue;
                };

                let name = car.name().to_string();
                let on_every_charge: ProgressCallback = Box::new(move |progress: &ChargeProgress| {
                    match serde_json::to_string(progress) {
                        Ok(json) => println!("{name}: {json}"),
                        Err(e) => warn!("Failed to encode progress: {e}"),
                    }
                });
                if car.claim_package(EnergyPackage::new(size_wh), Some(on_every_charge)) {
                    println!("{}: charging {size_wh} Wh", car.name());
                } else {
                    println!("{}: busy, try again later", car.name());
                }
            }
            _ => println!("usage: <chip> <package_wh> | cancel <chip> | status | quit"),
        }
    }

    let cancelled = garage.cancel_all();
    for car in garage.cars() {
        car.wait_until_idle().await;
    }
    info!("Shutdown complete, {cancelled} charge cycles cancelled");
    Ok(())
}
