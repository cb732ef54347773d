use std::collections::HashSet;

use coroutine_stacks::dump::{self, Coroutine};
use coroutine_stacks::tree;
use pretty_assertions::assert_eq;
use rand::prelude::*;
use rand::rngs::SmallRng;

const STATES: &[&str] = &["RUNNING", "SUSPENDED", "CREATED"];
const FRAMES: &[&str] = &[
    "at kotlinx.coroutines.BuildersKt.runBlocking(Builders.kt:1)",
    "at kotlinx.coroutines.DelayKt.delay(Delay.kt:160)",
    "at kotlinx.coroutines.channels.BufferedChannel.receive(BufferedChannel.kt:667)",
    "at MainKt.main(Main.kt:4)",
    "at MainKt$main$1.invokeSuspend(Main.kt:12)",
    "at MainKt.worker(Main.kt:20)",
];

fn random_coroutines(rng: &mut SmallRng) -> Vec<Coroutine> {
    let n = rng.gen_range(1..40);
    (0..n)
        .map(|_| Coroutine {
            state: STATES.choose(rng).unwrap().to_string(),
            stack_trace: (0..rng.gen_range(0..7))
                .map(|_| FRAMES.choose(rng).unwrap().to_string())
                .collect(),
        })
        .collect()
}

fn header_count(line: &str) -> Option<usize> {
    let (count, rest) = line.trim_start_matches('\t').split_once(' ')?;
    if rest.starts_with("Coroutine") {
        count.parse().ok()
    } else {
        None
    }
}

#[test]
fn rendering_is_deterministic() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let coroutines = random_coroutines(&mut rng);
        assert_eq!(tree::render(&coroutines), tree::render(&coroutines));
    }
}

#[test]
fn top_level_groups_cover_every_coroutine_once() {
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..200 {
        let coroutines = random_coroutines(&mut rng);
        let out = tree::render(&coroutines);
        let top_level: usize = out
            .lines()
            .filter(|line| !line.starts_with('\t'))
            .map(|line| header_count(line).expect("unindented lines are headers"))
            .sum();
        assert_eq!(top_level, coroutines.len(), "\n{}", out);
    }
}

#[test]
fn every_distinct_suffix_is_printed_once() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..200 {
        let coroutines = random_coroutines(&mut rng);
        let mut suffixes = HashSet::new();
        for c in &coroutines {
            for depth in 1..=c.stack_trace.len() {
                suffixes.insert(&c.stack_trace[c.stack_trace.len() - depth..]);
            }
        }
        let out = tree::render(&coroutines);
        let frame_lines = out.lines().filter(|l| header_count(l).is_none()).count();
        assert_eq!(frame_lines, suffixes.len(), "\n{}", out);
    }
}

#[test]
fn rendered_dump_round_trips_through_the_parser() {
    let mut rng = SmallRng::seed_from_u64(1234);
    for _ in 0..50 {
        let coroutines = random_coroutines(&mut rng);
        let mut text = String::new();
        for (i, c) in coroutines.iter().enumerate() {
            text.push_str(&format!(
                "\"coroutine#{}\":StandaloneCoroutine, state: {}\n",
                i, c.state
            ));
            for frame in &c.stack_trace {
                text.push('\t');
                text.push_str(frame);
                text.push('\n');
            }
        }
        assert_eq!(dump::parse(&text).unwrap(), coroutines);
    }
}

#[test]
fn identical_traces_share_one_header() {
    let trace: Vec<String> = FRAMES[..3].iter().map(|f| f.to_string()).collect();
    let coroutines = vec![
        Coroutine {
            state: "RUNNING".to_string(),
            stack_trace: trace.clone(),
        },
        Coroutine {
            state: "SUSPENDED".to_string(),
            stack_trace: trace,
        },
    ];
    let out = tree::render(&coroutines);
    let headers: Vec<_> = out.lines().filter(|l| header_count(l).is_some()).collect();
    assert_eq!(headers, vec!["2 Coroutines RUNNING, SUSPENDED,"]);
    assert!(out.lines().skip(1).all(|l| l.starts_with('\t') && !l.starts_with("\t\t")));
}
