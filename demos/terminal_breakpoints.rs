//! Classifies the terminal width (in columns) and prints breakpoint
//! transitions while you resize the window. Stops after 30 seconds.
//!
//! Run with `cargo run --example terminal_breakpoints`.

use std::time::{Duration, Instant};

use viewport_classifier::{
    ClassifierConfig, FileSink, Logger, RangeDefinition, ResizeBus, TerminalResizePump,
    TerminalViewport, ViewportClassifier, WidthDefinitions,
};

fn column_definitions() -> WidthDefinitions {
    let mut defs = WidthDefinitions::new();
    for (name, def) in [
        ("narrow", RangeDefinition::inclusive(0.0, 79.0)),
        ("standard", RangeDefinition::inclusive(80.0, 119.0)),
        ("wide", RangeDefinition::at_least(120.0)),
    ] {
        let label = name.to_string();
        let leaving = label.clone();
        defs.insert(
            label.clone(),
            def.on_enter(move |c| println!("entered {label} at {} columns", c.width()))
                .on_leave(move |c| println!("left {leaving} at {} columns", c.width())),
        );
    }
    defs
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = std::env::temp_dir().join("terminal_breakpoints.jsonl");
    let config = ClassifierConfig::new()
        .with_width_definitions(column_definitions())
        .with_height_change(|c| println!("rows now {}", c.height()))
        .with_logger(Logger::new(FileSink::new(&log_path, 1 << 20)?));

    let viewport = TerminalViewport::new();
    let mut bus = ResizeBus::new();
    let watched = ViewportClassifier::watch(config, viewport.clone(), &mut bus)?;
    let pump = TerminalResizePump::new(viewport);

    println!("logging to {}", log_path.display());
    let deadline = Instant::now() + Duration::from_secs(30);
    while Instant::now() < deadline {
        pump.pump(&mut bus, Duration::from_millis(200))?;
    }

    let classifier = watched.cancel(&mut bus);
    if let Ok(guard) = classifier.lock() {
        let active: Vec<_> = guard.active_breakpoints().collect();
        println!("final breakpoints: {active:?}");
    }
    Ok(())
}
