mod actions;
mod config;
mod dashboard;
mod ui;
mod wifi;

use crux_core::Command;

use crate::events::{ConfigEvent, DashboardEvent, Event};
use crate::model::Model;
use crate::Effect;

/// Main update dispatcher - routes events to domain-specific handlers
pub fn update(event: Event, model: &mut Model) -> Command<Effect, Event> {
    match event {
        // Page open: authoritative config plus the immediate first poll
        Event::Initialize => Command::all([
            config::handle(ConfigEvent::Load, model),
            dashboard::handle(DashboardEvent::Tick, model),
        ]),

        Event::Config(event) => config::handle(event, model),
        Event::Dashboard(event) => dashboard::handle(event, model),
        Event::Wifi(event) => wifi::handle(event, model),
        Event::Action(event) => actions::handle(event, model),
        Event::Ui(event) => ui::handle(event, model),
    }
}
