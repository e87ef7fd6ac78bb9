use crate::error::{CliError, Result};
use crate::ui;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use service_proxy::{GatewayHealth, HealthStatus};
use tokio::runtime::Runtime;

pub fn execute(config: Option<String>, json: bool) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;

    rt.block_on(execute_async(config, json))
}

async fn execute_async(config: Option<String>, json: bool) -> Result<()> {
    let registry = crate::load_registry(config.as_deref())?;
    let health = registry.health_all().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        ui::section_header("Service Health");
        println!("{}", render_table(&health));
        if health.is_healthy() {
            ui::success_message("All services are healthy");
        } else {
            ui::warning_message("Some services are unhealthy");
        }
    }

    if health.is_healthy() {
        Ok(())
    } else {
        Err(CliError::Degraded(
            health
                .unhealthy_services()
                .into_iter()
                .map(str::to_string)
                .collect(),
        ))
    }
}

fn render_table(health: &GatewayHealth) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Service", "Status", "Latency", "Error"]);

    for (name, report) in &health.services {
        let color = match report.status {
            HealthStatus::Healthy => Color::Green,
            HealthStatus::Unhealthy => Color::Red,
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(report.status.to_string()).fg(color),
            Cell::new(format!("{} ms", report.response_time_ms)),
            Cell::new(report.error.as_deref().unwrap_or("-")),
        ]);
    }

    table
}
