use anyhow::Result;

use sheetswipe_core::{AppConfig, GestureMetrics, SheetGeometry};
use sheetswipe_motion::dismiss_duration_ms;

pub struct DecideArgs {
    pub dy: f64,
    pub height: f64,
    pub vy: f64,
    pub max_velocity: f64,
    pub total_ms: f64,
    pub consistent: bool,
}

pub fn run(config: &AppConfig, args: DecideArgs) -> Result<()> {
    let geometry = SheetGeometry::new(args.height)?;
    let height = geometry.height_px();
    let dismissal = &config.dismissal;

    let blended = dismissal.blended_velocity(args.dy, args.total_ms);
    let metrics = GestureMetrics {
        dy: args.dy,
        velocity: blended,
        max_history_velocity: args.max_velocity,
        has_consistent_high_velocity: args.consistent,
        total_time_ms: args.total_ms,
    };

    let swipe = dismissal.should_dismiss_swipe(
        args.dy,
        blended,
        args.max_velocity,
        args.consistent,
        height,
    );
    let short = dismissal.should_dismiss_short_gesture(
        args.dy,
        blended,
        args.max_velocity,
        args.total_ms,
        height,
    );
    let verdict = dismissal.evaluate_release(&metrics, height);

    println!("Percent dragged:    {:.1}%", geometry.percent_dragged(args.dy) * 100.0);
    println!("Platform velocity:  {:.1}", args.vy);
    println!("Blended velocity:   {:.1}", blended);
    println!("Swipe rule:         {}", swipe);
    println!("Short gesture rule: {}", short);

    if verdict.should_dismiss {
        let duration = dismiss_duration_ms(verdict.effective_velocity, &config.animation);
        println!(
            "\nDismiss (effective velocity {:.2}, exit {:.0}ms)",
            verdict.effective_velocity, duration
        );
    } else {
        println!("\nSpring back");
    }

    Ok(())
}
