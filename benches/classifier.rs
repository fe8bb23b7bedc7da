use criterion::{Criterion, black_box, criterion_group, criterion_main};
use viewport_classifier::logging::{LogEvent, LogSink};
use viewport_classifier::{
    ClassifierConfig, Logger, LoggingResult, Phase, RangeDefinition, SharedViewport,
    ViewportClassifier, WidthDefinitions,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

fn resize_sweep(c: &mut Criterion) {
    let widths = sweep_widths();
    c.bench_function("resize_sweep_builtins", |b| {
        let viewport = SharedViewport::new(0, 600);
        let mut classifier = build_classifier(viewport.clone(), None);
        b.iter(|| {
            for width in widths.iter().copied() {
                viewport.set_size(black_box(width), 600);
                classifier.handle_resize();
            }
        });
    });
}

fn resize_sweep_many_breakpoints(c: &mut Criterion) {
    let widths = sweep_widths();
    let mut defs = WidthDefinitions::new();
    for idx in 0..64u32 {
        let min = f64::from(idx * 40);
        defs.insert(
            format!("band_{idx}"),
            RangeDefinition::inclusive(min, min + 79.0).while_inside(|c| {
                black_box(c.width());
            }),
        );
    }

    c.bench_function("resize_sweep_64_bands_logged", |b| {
        let viewport = SharedViewport::new(0, 600);
        let mut classifier = build_classifier(viewport.clone(), Some(defs.clone()));
        classifier
            .set_callback("laptop", Phase::Enter, |c| {
                black_box(c.height());
            })
            .expect("laptop callback");
        b.iter(|| {
            for width in widths.iter().copied() {
                viewport.set_size(black_box(width), 600);
                classifier.handle_resize();
            }
        });
    });
}

fn build_classifier(viewport: SharedViewport, defs: Option<WidthDefinitions>) -> ViewportClassifier {
    let mut config = ClassifierConfig::new().with_logger(Logger::new(NullSink));
    config.width_definitions = defs;
    config.enable_metrics();
    ViewportClassifier::new(config, viewport).expect("classifier")
}

fn sweep_widths() -> Vec<u32> {
    (0..=2560).step_by(16).chain((0..=2560).rev().step_by(16)).collect()
}

criterion_group!(benches, resize_sweep, resize_sweep_many_breakpoints);
criterion_main!(benches);
