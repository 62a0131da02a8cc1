use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wglu_stats_core::{HeadlessPipeline, ManualClock, StatsConfig, StatsOverlay};

fn bench_push_sample(c: &mut Criterion) {
    for (label, cfg) in [("compact", StatsConfig::compact()), ("wide", StatsConfig::wide())] {
        let mut overlay =
            StatsOverlay::new(HeadlessPipeline::default(), ManualClock::new(0.0), cfg).unwrap();
        let mut value = 0.0;
        c.bench_function(&format!("push_sample/{label}"), |b| {
            b.iter(|| {
                value = (value + 7.0) % 130.0;
                overlay.push_sample(black_box(value));
                overlay.pipeline_mut().take_commands();
            })
        });
    }
}

fn bench_frame_loop(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let mut overlay =
        StatsOverlay::new(HeadlessPipeline::default(), &clock, StatsConfig::wide()).unwrap();
    c.bench_function("frame_loop/wide", |b| {
        b.iter(|| {
            overlay.begin_frame();
            clock.advance(11.125);
            black_box(overlay.end_frame());
            overlay.pipeline_mut().take_commands();
        })
    });
}

criterion_group!(benches, bench_push_sample, bench_frame_loop);
criterion_main!(benches);
