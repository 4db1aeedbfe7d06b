//! E2E tests for the merge engine's ordering and filtering guarantees.

mod helpers;

use lw_core::{MemoryLogSource, SegmentOptions, TimestampSpec, segment};

use helpers::{TestHarness, run_with, stamp, stamped};

const T0: i64 = 1_463_369_696_789;

fn bracketed() -> SegmentOptions {
    SegmentOptions::new(TimestampSpec::delimited("yyyy-MM-dd HH:mm:ss,SSS", "[", "]").unwrap())
}

fn mixed_lines() -> Vec<String> {
    vec![
        "banner before any timestamp".into(),
        format!("{} one", stamp(T0 + 300)),
        "  continuation".into(),
        format!("{} two", stamp(T0 + 100)),
        format!("{} three", stamp(T0 + 100)),
        "[not-a-time] still three".into(),
        format!("{} four", stamp(T0 + 900)),
    ]
}

/// Entry count equals the number of timestamp lines from the first match on.
#[test]
fn e2e_entry_count_matches_timestamp_lines() {
    let lines = mixed_lines();
    let spec = TimestampSpec::delimited("yyyy-MM-dd HH:mm:ss,SSS", "[", "]").unwrap();
    let matched = lines.iter().filter(|l| spec.match_line(l).is_some()).count();

    let entries = segment("mixed", lines, &bracketed());
    assert_eq!(entries.len(), matched);
    assert_eq!(entries.len(), 4);
    // file order, not time order, within one source
    let instants: Vec<_> = entries.iter().map(|e| e.instant - T0).collect();
    assert_eq!(instants, vec![300, 100, 100, 900]);
}

/// Every input line from the first timestamp on lands in exactly one payload.
#[test]
fn e2e_payloads_partition_input() {
    let lines = mixed_lines();
    let entries = segment("mixed", lines.clone(), &bracketed());
    let rebuilt: String = entries.iter().map(|e| e.payload.as_str()).collect();
    let expected: String = lines[1..].iter().map(|l| format!("{l}\n")).collect();
    assert_eq!(rebuilt, expected);
}

/// A window spanning min..max instants returns the same entries.
#[test]
fn e2e_filter_round_trip() {
    let unfiltered = segment("mixed", mixed_lines(), &bracketed());
    let min = unfiltered.iter().map(|e| e.instant).min().unwrap();
    let max = unfiltered.iter().map(|e| e.instant).max().unwrap();
    let bare = |ms: i64| stamp(ms).trim_matches(['[', ']']).to_string();

    let (start, end) = (bare(min), bare(max));
    let options = bracketed()
        .with_window(Some(start.as_str()), Some(end.as_str()))
        .unwrap();
    let filtered = segment("mixed", mixed_lines(), &options);

    assert_eq!(filtered, unfiltered);
}

/// Offsetting a source by +N is the same as writing its timestamps N ms later.
#[tokio::test]
async fn e2e_offset_equals_shifted_timestamps() {
    const N: i64 = 3_725;
    let raw = [(T0, "a"), (T0 + 40, "b"), (T0 + 5_000, "c")];
    let shifted: Vec<_> = raw.iter().map(|(ms, t)| (ms + N, *t)).collect();
    let other = [(T0 + 3_760, "x"), (T0 + 8_000, "y")];

    let h = TestHarness::new();
    let raw_path = h.write_log("raw.log", &stamped(&raw));
    let shifted_path = h.write_log("shifted.log", &stamped(&shifted));
    let other_path = h.write_log("other.log", &stamped(&other));

    let mut with_offset = h.config(&[raw_path, other_path.clone()]);
    with_offset.offsets = vec![N];
    let pre_shifted = h.config(&[shifted_path, other_path]);

    let (a, _) = h.run(&with_offset).await.unwrap();
    let (b, _) = h.run(&pre_shifted).await.unwrap();

    let key = |log: &lw_core::MergedLog| {
        log.entries
            .iter()
            .map(|e| (e.instant, e.payload.rsplit_once(' ').unwrap().1.to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&a), key(&b));
    // display text stays as written
    assert_eq!(a.entries[0].display_text, "2016-05-16 03:34:56,789");
}

/// Equal instants keep source order on every run.
#[tokio::test]
async fn e2e_merge_stability() {
    let source = MemoryLogSource::new()
        .with_source("A", stamped(&[(T0, "from A")]))
        .with_source("B", stamped(&[(T0, "from B")]));
    let h = TestHarness::new();
    let config = h.config(&["A".to_string(), "B".to_string()]);

    for _ in 0..25 {
        let (log, _) = run_with(&config, &source).await.unwrap();
        let order: Vec<_> = log.entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }
}

/// Many sources segmented in parallel still merge in deterministic order.
#[tokio::test]
async fn e2e_many_sources_deterministic() {
    let mut source = MemoryLogSource::new();
    let mut names = Vec::new();
    for i in 0..16i64 {
        let name = format!("node-{i:02}");
        let lines = stamped(&[(T0 + i % 3, "tick"), (T0 + 100 - i, "tock")]);
        source.add_source(&name, lines);
        names.push(name);
    }
    let h = TestHarness::new();
    let config = h.config(&names);

    let (first, _) = run_with(&config, &source).await.unwrap();
    let (second, _) = run_with(&config, &source).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 32);
    assert_eq!(first.sources, names);
    assert!(first.entries.windows(2).all(|w| w[0].instant <= w[1].instant));
}
