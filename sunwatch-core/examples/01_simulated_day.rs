//! Simulated Day Example
//!
//! Drives a synthetic 24 hours of solar telemetry through the interpretation
//! layer and prints what a downstream consumer would see every half hour.
//!
//! ## What You'll Learn
//!
//! - Building a `TelemetryLayer` with a reference timezone
//! - Feeding frames from a host loop with a controllable clock
//! - Reading the published energy and day/night views
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_day
//! ```

use sunwatch_core::{
    calendar::ZonedCalendar,
    power::voltage_for_soc,
    time::FixedTime,
    BatteryChemistry, ChannelReading, DayNightConfig, EstimatorConfig, LightTick, PowerTick,
    TelemetryFrame, TelemetryLayer, TimeSource,
};

/// 2024-06-01T00:00:00Z
const START_MS: u64 = 1_717_200_000_000;
const STEP_MS: u64 = 2000;
const CAPACITY_WH: f32 = 9.4;

fn main() {
    println!("Sunwatch Simulated Day");
    println!("======================\n");

    let chemistry = BatteryChemistry::LithiumIon;
    let energy_config = EstimatorConfig::default()
        .with_chemistry(chemistry)
        .with_capacity_wh(CAPACITY_WH);

    let mut layer =
        TelemetryLayer::new(energy_config, DayNightConfig::default(), ZonedCalendar::utc());
    let mut clock = FixedTime::new(START_MS);

    // Toy battery model: true SoC drives the resting voltage the anchor sees
    let mut true_soc = 0.35f32;
    let mut noise = 0x2545_f491u32;

    println!("time   light  in_W  out_W  state        path           soc   conf  day  sunset_h");

    let ticks = 24 * 3600 * 1000 / STEP_MS;
    for i in 0..ticks {
        clock.advance(STEP_MS);
        let minute = ((clock.now() - START_MS) / 60_000) as f32 % 1440.0;

        let sun = daylight(minute);
        let input_w = 3.0 * sun;
        let output_w = if (18.0 * 60.0..23.0 * 60.0).contains(&minute) {
            0.6
        } else {
            0.02
        };

        noise ^= noise << 13;
        noise ^= noise >> 17;
        noise ^= noise << 5;
        let jitter = ((noise >> 8) as f32 / 16_777_216.0 - 0.5) * 0.04;

        let dt_h = STEP_MS as f32 / 3_600_000.0;
        true_soc = (true_soc + (input_w - output_w) * dt_h / CAPACITY_WH).clamp(0.0, 1.0);

        let frame = TelemetryFrame {
            timestamp: clock.now(),
            power: PowerTick::new(Some(STEP_MS))
                .with_input(ChannelReading::new(input_w + jitter, 6.0, (input_w / 6.0).max(0.0)))
                .with_output(ChannelReading::new(output_w + jitter, 5.0, output_w / 5.0))
                .with_battery_voltage(voltage_for_soc(true_soc, &chemistry)),
            light: LightTick::new(Some(STEP_MS), 900.0 * sun + 1.5),
        };

        let view = layer.tick(&frame);

        if (i + 1) % 900 == 0 {
            let e = &view.energy;
            let d = &view.daynight;
            println!(
                "{:02}:{:02}  {:5.0}  {:4.2}  {:5.2}  {:<11}  {:<13}  {:4.2}  {:4.2}  {:<3}  \
                 {:5.2}",
                (minute / 60.0) as u32,
                (minute % 60.0) as u32,
                d.light_ema,
                e.input.ema_w,
                e.output.ema_w,
                e.power_state,
                e.power_path_state,
                e.soc_est,
                e.soc_confidence,
                if d.is_day { "yes" } else { "no" },
                d.hours_to_sunset,
            );
        }
    }

    let view = layer.view();
    println!();
    println!("End of day:");
    println!("  Energy in:        {:.2} Wh", view.energy.rolling_wh_in);
    println!("  Energy out:       {:.2} Wh", view.energy.rolling_wh_out);
    println!("  Estimated SoC:    {:.2} (true {:.2})", view.energy.soc_est, true_soc);
    println!("  Learned sunset:   minute {:.0}", view.daynight.learned_end_minute);
}

/// Clear-sky profile, sunrise 06:00, sunset 20:00
fn daylight(minute: f32) -> f32 {
    const SUNRISE: f32 = 360.0;
    const SUNSET: f32 = 1200.0;
    if minute <= SUNRISE || minute >= SUNSET {
        return 0.0;
    }
    (core::f32::consts::PI * (minute - SUNRISE) / (SUNSET - SUNRISE)).sin()
}
