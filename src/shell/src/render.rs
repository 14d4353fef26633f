use epd_config_ui_core::{Model, StatusMessage, StatusSeverity};
use std::io::{self, Write};

/// Prints view model changes to a terminal
///
/// The log panel is append-only here: when the new text extends the old one
/// only the tail is printed, otherwise the whole text is printed again.
pub struct Renderer<W: Write> {
    out: W,
    show_dashboard: bool,
    last_status: Option<StatusMessage>,
    last_logs: String,
    last_logs_revision: u32,
    last_reachable: bool,
}

impl Renderer<io::Stdout> {
    pub fn stdout(show_dashboard: bool) -> Self {
        Self::new(io::stdout(), show_dashboard)
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, show_dashboard: bool) -> Self {
        Self {
            out,
            show_dashboard,
            last_status: None,
            last_logs: String::new(),
            last_logs_revision: 0,
            last_reachable: false,
        }
    }

    pub fn render(&mut self, view: &Model) -> io::Result<()> {
        if view.status != self.last_status {
            if let Some(status) = &view.status {
                writeln!(self.out, "{} {}", severity_tag(status.severity), status.text)?;
            }
            self.last_status = view.status.clone();
        }

        if self.show_dashboard {
            self.render_dashboard(view)?;
        }

        self.out.flush()
    }

    fn render_dashboard(&mut self, view: &Model) -> io::Result<()> {
        let dashboard = &view.dashboard;

        if dashboard.reachable != self.last_reachable {
            if dashboard.reachable {
                writeln!(self.out, "[reachable]")?;
            }
            self.last_reachable = dashboard.reachable;
        }

        if dashboard.logs_revision == self.last_logs_revision {
            return Ok(());
        }

        match dashboard.logs.strip_prefix(self.last_logs.as_str()) {
            Some(tail) if !self.last_logs.is_empty() => write!(self.out, "{tail}")?,
            _ => write!(self.out, "{}", dashboard.logs)?,
        }
        self.last_logs = dashboard.logs.clone();
        self.last_logs_revision = dashboard.logs_revision;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn severity_tag(severity: StatusSeverity) -> &'static str {
    match severity {
        StatusSeverity::Info => "[info]",
        StatusSeverity::Success => "[ok]",
        StatusSeverity::Error => "[error]",
    }
}

/// Human readable dump of the loaded configuration; secrets are never shown
pub fn print_config(view: &Model, out: &mut impl Write) -> io::Result<()> {
    let form = &view.config_form.form_data;

    if let Some(version) = &view.config_form.app_version {
        writeln!(out, "app_version            = {version}")?;
    }
    for (key, value) in [
        ("wifi_ssid", form.wifi_ssid.as_str()),
        ("mqtt_enabled", if form.mqtt_enabled { "true" } else { "false" }),
        ("mqtt_host", form.mqtt_host.as_str()),
        ("mqtt_port", form.mqtt_port.as_str()),
        ("mqtt_user", form.mqtt_user.as_str()),
        ("mqtt_topic", form.mqtt_topic.as_str()),
        ("interactive_timeout_ms", form.interactive_timeout_ms.as_str()),
        ("deepsleep_interval_s", form.deepsleep_interval_s.as_str()),
        ("device_name", form.device_name.as_str()),
        ("admin_user", form.admin_user.as_str()),
        ("tz_string", form.tz_string.as_str()),
        ("temp_offset_c", form.temp_offset_c.as_str()),
        ("hum_offset_pct", form.hum_offset_pct.as_str()),
    ] {
        writeln!(out, "{key:<22} = {value}")?;
    }
    // sensor settings only exist on firmware that reports them
    for (key, value) in [
        ("measure_interval_ms", form.measure_interval_ms.as_str()),
        ("measure_offset_cm", form.measure_offset_cm.as_str()),
        ("avg_alpha", form.avg_alpha.as_str()),
        ("median_n", form.median_n.as_str()),
        ("median_delay_ms", form.median_delay_ms.as_str()),
        ("filter_min_cm", form.filter_min_cm.as_str()),
        ("filter_max_cm", form.filter_max_cm.as_str()),
    ] {
        if !value.is_empty() {
            writeln!(out, "{key:<22} = {value}")?;
        }
    }

    Ok(())
}

/// Print the scan result the way the selector shows it
pub fn print_networks(view: &Model, out: &mut impl Write) -> io::Result<()> {
    for option in view.wifi_scan.options.iter().skip(1) {
        writeln!(out, "  {}", option.label)?;
    }
    Ok(())
}
