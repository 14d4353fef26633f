use crate::{config::PollingConfig, http_client::DeviceClient, render::Renderer};
use anyhow::{Context, Result};
use crux_core::{Core, Request};
use crux_http::protocol::{HttpRequest, HttpResult};
use epd_config_ui_core::{App, DashboardEvent, Effect, Event, Model};
use log::debug;
use std::{io::Write, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

/// Work items consumed by the shell loop in arrival order
pub enum ShellMessage {
    Event(Event),
    HttpResolved {
        request: Request<HttpRequest>,
        result: HttpResult,
    },
}

/// Single owner of the core; every state change happens on the task running it
///
/// HTTP effects and timers run as independent tasks that report back through
/// the message channel, so overlapping completions are applied in the order
/// they arrive.
pub struct Shell<C, W>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    core: Core<App>,
    client: Arc<C>,
    polling: PollingConfig,
    renderer: Renderer<W>,
    tx: UnboundedSender<ShellMessage>,
    rx: UnboundedReceiver<ShellMessage>,
    scheduled_pulse: u32,
    timers: Vec<JoinHandle<()>>,
}

impl<C, W> Shell<C, W>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    pub fn new(client: C, polling: PollingConfig, renderer: Renderer<W>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            core: Core::new(),
            client: Arc::new(client),
            polling,
            renderer,
            tx,
            rx,
            scheduled_pulse: 0,
            timers: Vec::new(),
        }
    }

    pub fn view(&self) -> Model {
        self.core.view()
    }

    /// Feed an event into the core and execute the resulting effects
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        let effects = self.core.process_event(event);
        self.process_effects(effects)
    }

    /// Process messages until `done` holds for the view model
    pub async fn run_until(&mut self, done: impl Fn(&Model) -> bool) -> Result<Model> {
        loop {
            let view = self.core.view();
            if done(&view) {
                return Ok(view);
            }

            let message = self
                .rx
                .recv()
                .await
                .context("failed to receive shell message: channel closed")?;
            self.handle_message(message)?;
        }
    }

    /// Start the poll timer and, for the legacy source, the liveness ping
    ///
    /// The first poll is expected to be issued by `Event::Initialize`.
    pub fn start_timers(&mut self) {
        let poll = self.spawn_timer(self.polling.poll_interval, || {
            Event::Dashboard(DashboardEvent::Tick)
        });
        self.timers.push(poll);

        if self.polling.source.needs_ping() {
            let ping = self.spawn_timer(self.polling.ping_interval, || {
                Event::Dashboard(DashboardEvent::PingTick)
            });
            self.timers.push(ping);
        }
    }

    fn spawn_timer(&self, period: Duration, event: fn() -> Event) -> JoinHandle<()> {
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.send(ShellMessage::Event(event())).is_err() {
                    break;
                }
            }
        })
    }

    fn handle_message(&mut self, message: ShellMessage) -> Result<()> {
        match message {
            ShellMessage::Event(event) => self.dispatch(event),
            ShellMessage::HttpResolved {
                mut request,
                result,
            } => {
                let effects = self
                    .core
                    .resolve(&mut request, result)
                    .map_err(|e| anyhow::anyhow!("failed to resolve HTTP effect: {e:?}"))?;
                self.process_effects(effects)
            }
        }
    }

    fn process_effects(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Render(_) => {
                    let view = self.core.view();
                    self.renderer
                        .render(&view)
                        .context("failed to render view")?;
                    self.schedule_reachable_expiry(&view);
                }
                Effect::Http(request) => self.spawn_request(request),
            }
        }

        Ok(())
    }

    fn spawn_request(&self, request: Request<HttpRequest>) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = client.execute(request.operation.clone()).await;
            if tx
                .send(ShellMessage::HttpResolved { request, result })
                .is_err()
            {
                debug!("dropping HTTP result: shell stopped");
            }
        });
    }

    /// Clear the reachability indicator once its window elapsed
    fn schedule_reachable_expiry(&mut self, view: &Model) {
        let pulse = view.dashboard.reachable_pulse;
        if !view.dashboard.reachable || pulse == self.scheduled_pulse {
            return;
        }
        self.scheduled_pulse = pulse;

        let tx = self.tx.clone();
        let window = self.polling.reachable_indicator;
        tokio::spawn(async move {
            time::sleep(window).await;
            let _ = tx.send(ShellMessage::Event(Event::Dashboard(
                DashboardEvent::ReachableExpired { pulse },
            )));
        });
    }
}

impl<C, W> Drop for Shell<C, W>
where
    C: DeviceClient + Send + Sync + 'static,
    W: Write,
{
    fn drop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::MockDeviceClient;
    use crux_http::protocol::HttpResponse;
    use epd_config_ui_core::{ActionEvent, ConfigEvent, DashboardSource, WifiEvent};

    fn shell(client: MockDeviceClient) -> Shell<MockDeviceClient, Vec<u8>> {
        Shell::new(
            client,
            PollingConfig {
                reachable_indicator: Duration::from_millis(10),
                ..Default::default()
            },
            Renderer::new(Vec::new(), true),
        )
    }

    fn respond(status: u16, body: &str) -> HttpResult {
        HttpResult::Ok(HttpResponse::status(status).body(body.as_bytes().to_vec()).build())
    }

    fn has_header(request: &HttpRequest, name: &str, value: &str) -> bool {
        request
            .headers
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case(name) && h.value == value)
    }

    fn legacy_shell(client: MockDeviceClient) -> Shell<MockDeviceClient, Vec<u8>> {
        let mut shell = shell(client);
        shell
            .dispatch(Event::Dashboard(DashboardEvent::SetSource(
                DashboardSource::Legacy,
            )))
            .expect("failed to dispatch");
        shell
    }

    #[tokio::test]
    async fn config_load_goes_to_config_endpoint() {
        let mut client = MockDeviceClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == "GET"
                    && request.url.ends_with("/api/config")
                    && has_header(request, "Cache-Control", "no-store")
            })
            .times(1)
            .returning(|_| Box::pin(async { respond(200, r#"{"wifi_ssid":"home"}"#) }));
        let mut shell = shell(client);

        shell
            .dispatch(Event::Config(ConfigEvent::Load))
            .expect("failed to dispatch");
        let view = shell
            .run_until(|view| !view.is_loading)
            .await
            .expect("failed to run shell");

        assert_eq!(view.config_form.form_data.wifi_ssid, "home");
        assert!(view.config_form.loaded);
    }

    #[tokio::test]
    async fn transport_failure_becomes_status_message() {
        let mut client = MockDeviceClient::new();
        client.expect_execute().times(1).returning(|_| {
            Box::pin(async {
                HttpResult::Err(crux_http::HttpError::Io("connection refused".to_string()))
            })
        });
        let mut shell = shell(client);

        shell
            .dispatch(Event::Action(ActionEvent::MqttTest))
            .expect("failed to dispatch");
        let view = shell
            .run_until(|view| !view.is_loading)
            .await
            .expect("failed to run shell");

        assert!(view.status.as_ref().is_some_and(|s| s.is_error()));
    }

    #[tokio::test]
    async fn reachable_indicator_clears_after_window() {
        let mut client = MockDeviceClient::new();
        client
            .expect_execute()
            .returning(|_| Box::pin(async { respond(200, r#"{"ok":true,"logs":"boot\n"}"#) }));
        let mut shell = shell(client);

        shell
            .dispatch(Event::Dashboard(DashboardEvent::Tick))
            .expect("failed to dispatch");
        shell
            .run_until(|view| view.dashboard.reachable)
            .await
            .expect("failed to run shell");
        let view = shell
            .run_until(|view| !view.dashboard.reachable)
            .await
            .expect("failed to run shell");

        assert_eq!(view.dashboard.logs, "boot\n");
    }

    #[tokio::test]
    async fn legacy_tick_reads_plain_text_log() {
        let mut client = MockDeviceClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == "GET"
                    && request.url.ends_with("/api/logs")
                    && has_header(request, "Cache-Control", "no-store")
            })
            .times(1)
            .returning(|_| Box::pin(async { respond(200, "boot\nwifi up\n") }));
        let mut shell = legacy_shell(client);

        shell
            .dispatch(Event::Dashboard(DashboardEvent::Tick))
            .expect("failed to dispatch");
        let view = shell
            .run_until(|view| view.dashboard.reachable)
            .await
            .expect("failed to run shell");

        assert_eq!(view.dashboard.logs, "boot\nwifi up\n");
        assert_eq!(view.dashboard.logs_revision, 1);
    }

    #[tokio::test]
    async fn legacy_ping_posts_page_marker() {
        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel();
        let mut client = MockDeviceClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == "POST"
                    && request.url.ends_with("/ping")
                    && request.body == b"page=config"
                    && has_header(request, "Content-Type", "application/x-www-form-urlencoded")
            })
            .times(1)
            .returning(move |_| {
                let _ = sent_tx.send(());
                Box::pin(async { respond(200, "") })
            });
        let mut shell = legacy_shell(client);

        shell
            .dispatch(Event::Dashboard(DashboardEvent::PingTick))
            .expect("failed to dispatch");

        time::timeout(Duration::from_secs(1), sent_rx.recv())
            .await
            .expect("ping was not sent");
    }

    #[tokio::test]
    async fn consolidated_source_sends_no_ping() {
        let mut client = MockDeviceClient::new();
        client.expect_execute().never();
        let mut shell = shell(client);

        shell
            .dispatch(Event::Dashboard(DashboardEvent::PingTick))
            .expect("failed to dispatch");

        assert!(shell.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn save_ack_follows_truthiness_of_ok() {
        for (body, saved) in [
            (r#"{"ok":1}"#, true),
            (r#"{"ok":"yes"}"#, true),
            (r#"{"ok":0}"#, false),
            (r#"{"ok":""}"#, false),
            (r#"{"err":"flash full"}"#, false),
        ] {
            let mut client = MockDeviceClient::new();
            client
                .expect_execute()
                .withf(|request| request.method == "POST" && request.url.ends_with("/api/config"))
                .times(1)
                .returning(move |_| Box::pin(async move { respond(200, body) }));
            let mut shell = shell(client);

            shell
                .dispatch(Event::Config(ConfigEvent::Save))
                .expect("failed to dispatch");
            let view = shell
                .run_until(|view| !view.is_loading)
                .await
                .expect("failed to run shell");

            let status = view.status.expect("missing status");
            assert_eq!(!status.is_error(), saved, "{body}");
        }
    }

    #[tokio::test]
    async fn scan_control_is_reenabled_on_http_error() {
        let mut client = MockDeviceClient::new();
        client
            .expect_execute()
            .returning(|_| Box::pin(async { respond(500, r#"{"ok":false,"err":"busy"}"#) }));
        let mut shell = shell(client);

        shell
            .dispatch(Event::Wifi(WifiEvent::Scan))
            .expect("failed to dispatch");
        let view = shell
            .run_until(|view| !view.wifi_scan.scanning)
            .await
            .expect("failed to run shell");

        let status = view.status.expect("missing status");
        assert!(status.is_error());
        assert!(status.text.starts_with("Wi-Fi scan failed: HTTP 500"));
        assert!(status.text.ends_with("(busy)"));
    }
}
