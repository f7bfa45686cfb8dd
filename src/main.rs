use facet::AppConfig;

fn main() -> anyhow::Result<()> {
    facet::init_logging();

    let mut config = AppConfig::new().title("Facet").size(1280, 720);

    // Arbitrary startup tint, e.g. FACET_TINT="#40c0ff". Malformed values
    // are ignored at parse time, keeping the default in effect.
    if let Ok(tint) = std::env::var("FACET_TINT") {
        config.controls.tint_color = tint;
    }

    facet::run(config)
}
