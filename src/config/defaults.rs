use super::*;

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            time_blocked_per_charged_kwh: 10.0,
            tick_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/renewable-charge.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            charging: ChargingConfig::default(),
            logging: LoggingConfig::default(),
            cars: vec![
                CarConfig {
                    chip_ids: "53A2B1C4:53A2B1C5".to_string(),
                    name: "tesla_model_3".to_string(),
                    battery_capacity_wh: 60_000,
                    max_range_km: 491,
                },
                CarConfig {
                    chip_ids: "7F10E2D9".to_string(),
                    name: "renault_zoe".to_string(),
                    battery_capacity_wh: 52_000,
                    max_range_km: 395,
                },
                CarConfig {
                    chip_ids: "A4C0FF12".to_string(),
                    name: "vw_id3".to_string(),
                    battery_capacity_wh: 58_000,
                    max_range_km: 426,
                },
                CarConfig {
                    chip_ids: "0B9E6D31".to_string(),
                    name: "fiat_500e".to_string(),
                    battery_capacity_wh: 42_000,
                    max_range_km: 320,
                },
            ],
            players: vec![
                PlayerConfig {
                    name: "winter".to_string(),
                    color: [0, 0, 255],
                },
                PlayerConfig {
                    name: "spring".to_string(),
                    color: [0, 255, 0],
                },
                PlayerConfig {
                    name: "summer".to_string(),
                    color: [255, 255, 0],
                },
                PlayerConfig {
                    name: "fall".to_string(),
                    color: [255, 80, 0],
                },
            ],
        }
    }
}
