use crate::{
    config::AppConfig,
    http_client::{DeviceClient, ReqwestDeviceClient},
    render::{Renderer, print_config, print_networks},
    shell::Shell,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use epd_config_ui_core::{
    ActionEvent, ConfigEvent, ConfigFormData, DashboardEvent, Event, Model, WifiEvent,
};
use log::info;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "epd-config")]
#[command(about = "Configuration client for the EPD clock", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow the device log and reachability until interrupted
    Watch,
    /// Print the device configuration
    Show,
    /// Change configuration fields and save them
    Set {
        /// Field assignments, e.g. mqtt_port=8883 or wifi_pass=secret
        #[arg(value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Scan for Wi-Fi networks
    Scan {
        /// Copy this network into the configuration
        #[arg(long)]
        select: Option<String>,

        /// Save the configuration after selecting
        #[arg(long, requires = "select")]
        save: bool,
    },
    /// Reboot the device
    Reboot {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Test the MQTT connection with the saved settings
    MqttTest,
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let client = ReqwestDeviceClient::new(&config.device)?;
    info!("using device at {}", config.device.url);

    let show_dashboard = matches!(cli.command, Commands::Watch);
    let mut shell = Shell::new(client, config.polling.clone(), Renderer::stdout(show_dashboard));

    match cli.command {
        Commands::Watch => watch(&mut shell, &config).await,
        Commands::Show => {
            let view = load_config(&mut shell).await?;
            print_config(&view, &mut io::stdout()).context("failed to print configuration")
        }
        Commands::Set { assignments } => set(&mut shell, &assignments).await,
        Commands::Scan { select, save } => scan(&mut shell, select, save).await,
        Commands::Reboot { yes } => reboot(&mut shell, yes).await,
        Commands::MqttTest => {
            shell.dispatch(Event::Action(ActionEvent::MqttTest))?;
            let view = shell.run_until(|view| !view.is_loading).await?;
            ensure_no_error(&view)
        }
    }
}

async fn watch<C, W>(shell: &mut Shell<C, W>, config: &AppConfig) -> Result<()>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    shell.dispatch(Event::Dashboard(DashboardEvent::SetSource(
        config.polling.source,
    )))?;
    shell.dispatch(Event::Initialize)?;
    shell.start_timers();

    tokio::select! {
        result = shell.run_until(|_| false) => result.map(|_| ()),
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            info!("stopped watching");
            Ok(())
        }
    }
}

async fn load_config<C, W>(shell: &mut Shell<C, W>) -> Result<Model>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    shell.dispatch(Event::Config(ConfigEvent::Load))?;
    let view = shell.run_until(|view| !view.is_loading).await?;
    ensure_no_error(&view)?;
    Ok(view)
}

async fn save_config<C, W>(shell: &mut Shell<C, W>) -> Result<()>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    shell.dispatch(Event::Config(ConfigEvent::Save))?;
    let view = shell.run_until(|view| !view.is_loading).await?;
    ensure_no_error(&view)
}

async fn set<C, W>(shell: &mut Shell<C, W>, assignments: &[String]) -> Result<()>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    let view = load_config(shell).await?;
    let form_data = apply_assignments(&view.config_form.form_data, assignments)?;

    shell.dispatch(Event::Config(ConfigEvent::FormUpdate { form_data }))?;
    if !shell.view().config_form_dirty {
        info!("nothing to save");
        return Ok(());
    }

    save_config(shell).await
}

async fn scan<C, W>(shell: &mut Shell<C, W>, select: Option<String>, save: bool) -> Result<()>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    if save {
        load_config(shell).await?;
    }

    shell.dispatch(Event::Wifi(WifiEvent::Scan))?;
    let view = shell.run_until(|view| !view.wifi_scan.scanning).await?;
    ensure_no_error(&view)?;
    print_networks(&view, &mut io::stdout()).context("failed to print networks")?;

    let Some(ssid) = select else {
        return Ok(());
    };
    if !view.wifi_scan.networks.iter().any(|ap| ap.ssid == ssid) {
        bail!("failed to select network: {ssid} was not found");
    }
    shell.dispatch(Event::Wifi(WifiEvent::SelectNetwork { ssid }))?;

    if save {
        save_config(shell).await?;
    }
    Ok(())
}

async fn reboot<C, W>(shell: &mut Shell<C, W>, yes: bool) -> Result<()>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    shell.dispatch(Event::Action(ActionEvent::RequestReboot))?;

    if !yes && !confirm("Reboot the device?").await? {
        shell.dispatch(Event::Action(ActionEvent::CancelReboot))?;
        info!("reboot cancelled");
        return Ok(());
    }

    shell.dispatch(Event::Action(ActionEvent::ConfirmReboot))?;
    let view = shell.run_until(|view| !view.is_loading).await?;
    ensure_no_error(&view)
}

async fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("failed to read confirmation")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Apply `KEY=VALUE` assignments to the form and encode it for `FormUpdate`
pub fn apply_assignments(form_data: &ConfigFormData, assignments: &[String]) -> Result<String> {
    let mut value = serde_json::to_value(form_data).context("failed to encode form data")?;
    let Some(fields) = value.as_object_mut() else {
        bail!("failed to encode form data: not an object");
    };

    for assignment in assignments {
        let Some((key, raw)) = assignment.split_once('=') else {
            bail!("failed to parse assignment {assignment}: expected KEY=VALUE");
        };
        let Some(field) = fields.get_mut(key.trim()) else {
            bail!("failed to parse assignment {assignment}: unknown field {key}");
        };

        *field = if field.is_boolean() {
            let enabled: bool = raw
                .trim()
                .parse()
                .with_context(|| format!("failed to parse {key}: expected true or false"))?;
            serde_json::Value::Bool(enabled)
        } else {
            serde_json::Value::String(raw.to_string())
        };
    }

    serde_json::to_string(&value).context("failed to encode form data")
}

fn ensure_no_error(view: &Model) -> Result<()> {
    match &view.status {
        Some(status) if status.is_error() => bail!("{}", status.text),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_update_matching_fields() {
        let form = ConfigFormData::default();

        let json = apply_assignments(
            &form,
            &[
                "mqtt_port=8883".to_string(),
                "mqtt_enabled=true".to_string(),
                "wifi_pass=a=b".to_string(),
            ],
        )
        .unwrap();
        let updated: ConfigFormData = serde_json::from_str(&json).unwrap();

        assert_eq!(updated.mqtt_port, "8883");
        assert!(updated.mqtt_enabled);
        assert_eq!(updated.wifi_pass, "a=b");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = apply_assignments(&ConfigFormData::default(), &["color=red".to_string()]);

        assert!(result.is_err());
    }

    #[test]
    fn assignment_without_value_is_rejected() {
        let result = apply_assignments(&ConfigFormData::default(), &["mqtt_port".to_string()]);

        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_scan_with_save() {
        let cli = Cli::try_parse_from(["epd-config", "scan", "--select", "home", "--save"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Scan { select: Some(ref ssid), save: true } if ssid == "home"
        ));
    }

    #[test]
    fn cli_rejects_save_without_select() {
        assert!(Cli::try_parse_from(["epd-config", "scan", "--save"]).is_err());
    }
}
