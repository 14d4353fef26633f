use anyhow::Result;
use crux_core::typegen::TypeGen;
use epd_config_ui_core::{
    events::{ActionEvent, ConfigEvent, DashboardEvent, UiEvent, WifiEvent},
    types::{DashboardSource, StatusSeverity},
    App,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=../app");

    let mut gen = TypeGen::new();

    gen.register_app::<App>()?;

    // Explicitly register domain event enums to ensure all variants are traced
    gen.register_type::<ConfigEvent>()?;
    gen.register_type::<DashboardEvent>()?;
    gen.register_type::<WifiEvent>()?;
    gen.register_type::<ActionEvent>()?;
    gen.register_type::<UiEvent>()?;

    gen.register_type::<DashboardSource>()?;
    gen.register_type::<StatusSeverity>()?;

    let output_root = PathBuf::from("./generated");

    gen.typescript("shared_types", output_root.join("typescript"))?;

    Ok(())
}
