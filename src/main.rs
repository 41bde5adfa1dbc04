use anyhow::Result;
use enclosure_thermal_sim::config::Config;
use enclosure_thermal_sim::report::{self, RunSummary};
use enclosure_thermal_sim::telemetry::{self, init_tracing};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let pid = cfg.pid.parameters();

    info!(
        preset = %cfg.pid.preset,
        kp = pid.kp,
        ki = pid.ki,
        kd = pid.kd,
        setpoint = pid.setpoint,
        seed = %cfg.seed.kind,
        "configuration loaded"
    );

    let cancel = CancellationToken::new();
    let engine = cfg.engine().with_cancellation(cancel.clone());
    let watcher = telemetry::cancel_on_shutdown(cancel.clone());

    let outcome = tokio::task::spawn_blocking(move || engine.run()).await?;
    cancel.cancel();
    watcher.await?;

    let result = outcome?;
    let summary = RunSummary::from_result(&result);
    info!(
        run_id = %summary.run_id,
        steps = summary.steps,
        final_temperature = summary.final_temperature,
        min_temperature = summary.min_temperature,
        max_temperature = summary.max_temperature,
        peak_output = summary.peak_output,
        mean_output = summary.mean_output,
        "run summary"
    );

    match &cfg.output.path {
        Some(path) => {
            report::write_to_path(path, cfg.output.format, &summary, &result)?;
            info!(path = %path.display(), format = %cfg.output.format, "series written");
        }
        None => warn!("no output.path configured, series not written"),
    }

    Ok(())
}
