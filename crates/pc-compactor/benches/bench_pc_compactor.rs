use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pc_compactor::{normalize_preset, CompactorPipeline};
use pc_core::{
    GenerativeMode, HeuristicTokenCounter, ImportancePruner, PipelineConfig, PipelinePreset,
    PrunedText,
};
use rand::seq::SliceRandom;
use std::sync::Arc;

const NOISE: &[&str] = &[
    "sooooo", "!!!", "???", "......", "\u{2014}\u{2014}", "\u{1F602}\u{1F602}\u{1F602}", "\u{200B}",
    "https://example.com/docs/42", "ops@example.com", "2026", "Caf\u{00e9}", "e\u{0301}",
    "\u{FF26}\u{FF55}\u{FF4C}\u{FF4C}",
];

fn generate_text(size_kb: usize) -> String {
    let base = "The quick brown fox jumps over the lazy dog. \
        Summarize the incident report for the on-call team, keeping timestamps, \
        service names and the remediation steps that were taken during the outage. ";
    let mut rng = rand::thread_rng();
    let mut text = String::with_capacity(size_kb * 1024);
    while text.len() < size_kb * 1024 {
        text.push_str(base);
        if let Some(noise) = NOISE.choose(&mut rng) {
            text.push_str(noise);
            text.push(' ');
        }
    }
    text
}

struct HeadPruner;

impl ImportancePruner for HeadPruner {
    fn prune(&self, text: &str, target_ratio: f64) -> anyhow::Result<PrunedText> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let keep = (words.len() as f64 * target_ratio).ceil() as usize;
        Ok(PrunedText::plain(words[..keep].join(" ")))
    }
}

fn bench_normalize(c: &mut Criterion) {
    let text_1k = generate_text(1);
    let text_10k = generate_text(10);
    let text_100k = generate_text(100);

    for &(name, preset) in &[
        ("llm", PipelinePreset::Llm),
        ("light", PipelinePreset::Light),
        ("storage", PipelinePreset::Storage),
    ] {
        c.bench_function(&format!("normalize_{name}_1kb"), |b| {
            b.iter(|| black_box(normalize_preset(black_box(&text_1k), preset)))
        });
        c.bench_function(&format!("normalize_{name}_10kb"), |b| {
            b.iter(|| black_box(normalize_preset(black_box(&text_10k), preset)))
        });
        c.bench_function(&format!("normalize_{name}_100kb"), |b| {
            b.iter(|| black_box(normalize_preset(black_box(&text_100k), preset)))
        });
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let text_10k = generate_text(10);
    let config = PipelineConfig {
        generative_mode: GenerativeMode::Never,
        ..PipelineConfig::default()
    };
    let pipeline = CompactorPipeline::builder(Arc::new(HeuristicTokenCounter::new()))
        .config(config)
        .pruner(Arc::new(HeadPruner))
        .build()
        .unwrap();
    c.bench_function("pipeline_rule_extractive_10kb", |b| {
        b.iter(|| black_box(pipeline.compress(black_box(&text_10k))))
    });
}

criterion_group!(benches, bench_normalize, bench_pipeline);
criterion_main!(benches);
