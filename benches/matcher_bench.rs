use criterion::{black_box, criterion_group, criterion_main, Criterion};
use podscan::{
    KeywordMatcher, KeywordSet, MatchMode, MatchRecord, ReportGenerator, Transcript,
    TranscriptSegment, WordEntry,
};

fn build_transcript(segments: usize) -> Transcript {
    let texts = [
        "today we talk about technology and its impact",
        "the economy has been shifting for a decade",
        "artificial intelligence keeps showing up in the news",
        "nothing of interest was said in this part",
    ];

    let segs = (0..segments)
        .map(|i| {
            let text = texts[i % texts.len()];
            let start = i as f64 * 5.0;
            let words = text
                .split_whitespace()
                .enumerate()
                .map(|(j, w)| WordEntry {
                    word: w.to_string(),
                    start: start + j as f64 * 0.4,
                    end: Some(start + j as f64 * 0.4 + 0.3),
                })
                .collect();
            TranscriptSegment {
                start,
                end: start + 5.0,
                text: text.to_string(),
                words,
            }
        })
        .collect();

    Transcript { segments: segs, language: Some("en".to_string()) }
}

fn bench_matcher(c: &mut Criterion) {
    let keywords = KeywordSet::new(["technology", "AI", "economy"]);
    let small = build_transcript(50);
    let large = build_transcript(2000); // roughly a three-hour episode

    c.bench_function("segment_mode_small", |b| {
        let matcher = KeywordMatcher::new(MatchMode::Segment);
        b.iter(|| black_box(matcher.find_keywords(&small, &keywords)))
    });

    c.bench_function("segment_mode_large", |b| {
        let matcher = KeywordMatcher::new(MatchMode::Segment);
        b.iter(|| black_box(matcher.find_keywords(&large, &keywords)))
    });

    c.bench_function("word_mode_large", |b| {
        let matcher = KeywordMatcher::new(MatchMode::Word);
        b.iter(|| black_box(matcher.find_keywords(&large, &keywords)))
    });
}

fn bench_report(c: &mut Criterion) {
    let records: Vec<MatchRecord> = (0..500)
        .map(|i| MatchRecord {
            keyword: "technology".to_string(),
            time: i as f64 * 7.3,
            context: "today we talk about technology and its impact".to_string(),
        })
        .collect();

    c.bench_function("report_generation", |b| {
        b.iter(|| {
            let mut generator = ReportGenerator::new().with_context(true);
            generator.add_records(records.iter().cloned());
            black_box(generator.generate())
        })
    });
}

criterion_group!(benches, bench_matcher, bench_report);
criterion_main!(benches);
