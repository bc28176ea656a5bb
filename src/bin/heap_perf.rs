//! Heap performance harness.
//!
//! Times the core operations of one heap variant over seeded random
//! workloads, averaged over several runs:
//!
//! ```bash
//! cargo run --release --features perf-harness --bin heap_perf -- \
//!     --heap two_three_heap
//! ```
//!
//! An unknown `--heap` value is fatal. For statistically careful
//! cross-variant comparisons use `cargo bench` instead; this binary is
//! the quick, single-variant loop.

use std::process;
use std::time::{Duration, Instant};

use addressable_heaps::{AddressableHeap, HeapFactory};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

const RANDOM_SEED: u64 = 12345;

#[derive(Parser)]
#[command(about = "Time heap operations for one variant")]
struct Args {
    /// One of {binary_heap, binomial_heap, weak_heap, pairing_heap,
    /// two_three_heap, fibonacci_heap, thin_heap}.
    #[arg(long)]
    heap: String,

    /// Elements resident while measuring.
    #[arg(long, default_value_t = 50_000)]
    num_elements: usize,

    /// Operations per measured run.
    #[arg(long, default_value_t = 200_000)]
    num_operations: usize,

    /// Timed runs to average over (after one warm-up).
    #[arg(long, default_value_t = 10)]
    num_runs: usize,
}

struct PerfParams {
    num_elements: usize,
    num_operations: usize,
}

type Runner = fn(&HeapFactory<i64, usize>, &PerfParams) -> (Duration, String);

fn random_key(rng: &mut StdRng) -> i64 {
    rng.gen_range(0..1_000_000_000)
}

/// Times pushes alone.
fn run_add(factory: &HeapFactory<i64, usize>, params: &PerfParams) -> (Duration, String) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut heap = factory.build();

    let start = Instant::now();
    for id in 0..params.num_elements {
        heap.push(random_key(&mut rng), id).expect("fresh ids");
    }
    (start.elapsed(), "Add".to_string())
}

/// Times pops of a pre-filled heap.
fn run_pop_minimum(factory: &HeapFactory<i64, usize>, params: &PerfParams) -> (Duration, String) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut heap = factory.build();
    for id in 0..params.num_elements {
        heap.push(random_key(&mut rng), id).expect("fresh ids");
    }

    let start = Instant::now();
    for _ in 0..params.num_elements {
        heap.pop().expect("heap still has elements");
    }
    (start.elapsed(), "PopMinimum".to_string())
}

/// Times a full sort: push everything, pop everything.
fn run_add_and_pop(factory: &HeapFactory<i64, usize>, params: &PerfParams) -> (Duration, String) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut heap = factory.build();

    let start = Instant::now();
    for id in 0..params.num_elements {
        heap.push(random_key(&mut rng), id).expect("fresh ids");
    }
    for _ in 0..params.num_elements {
        heap.pop().expect("heap still has elements");
    }
    (start.elapsed(), "AddAndPopMinimum".to_string())
}

/// Times random decrease-keys against a resident population.
fn run_reduce_key(factory: &HeapFactory<i64, usize>, params: &PerfParams) -> (Duration, String) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut heap = factory.build();
    for id in 0..params.num_elements {
        heap.push(random_key(&mut rng), id).expect("fresh ids");
    }

    let start = Instant::now();
    for _ in 0..params.num_operations {
        let id = rng.gen_range(0..params.num_elements);
        let key = *heap.get(id).expect("id is resident");
        let new_key = (key - rng.gen_range(0..100)).max(0);
        heap.decrease_key(id, new_key).expect("key does not increase");
    }
    (start.elapsed(), "ReduceKey".to_string())
}

/// Times a mixed workload of every operation.
fn run_all_operations(
    factory: &HeapFactory<i64, usize>,
    params: &PerfParams,
) -> (Duration, String) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut heap = factory.build();

    let mut id_counter = 0usize;
    let mut num_adds = 0u64;
    let mut num_pops = 0u64;
    let mut num_reduce_keys = 0u64;

    let start = Instant::now();
    for _ in 0..params.num_operations {
        if !heap.is_empty() {
            heap.pop();
            num_pops += 1;
        }

        heap.push(random_key(&mut rng), id_counter).expect("fresh ids");
        id_counter += 1;
        num_adds += 1;

        if heap.len() < params.num_elements {
            heap.push(random_key(&mut rng), id_counter).expect("fresh ids");
            id_counter += 1;
            num_adds += 1;
        }

        let id = rng.gen_range(0..id_counter);
        if let Some(&key) = heap.get(id) {
            let new_key = (key - rng.gen_range(0..1000)).max(0);
            heap.decrease_key(id, new_key).expect("key does not increase");
            num_reduce_keys += 1;
        }
    }
    while heap.pop().is_some() {
        num_pops += 1;
    }

    (
        start.elapsed(),
        format!("AllOperations(adds: {num_adds}, pops: {num_pops}, reduce-keys: {num_reduce_keys})"),
    )
}

/// Runs one workload several times and reports the average.
fn run_averaged(runner: Runner, factory: &HeapFactory<i64, usize>, params: &PerfParams, num_runs: usize) {
    // Warm up once; keep its report string.
    let (_, report) = runner(factory, params);

    let mut total = Duration::ZERO;
    for _ in 0..num_runs {
        total += runner(factory, params).0;
    }

    let average_ms = total.as_millis() / num_runs as u128;
    println!("({num_runs} runs) {average_ms} ms. {report}");
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let factory = HeapFactory::<i64, usize>::by_name(&args.heap).unwrap_or_else(|| {
        eprintln!("unknown heap: {:?}", args.heap);
        process::exit(1);
    });

    let params = PerfParams {
        num_elements: args.num_elements,
        num_operations: args.num_operations,
    };

    info!(
        heap = factory.name(),
        num_elements = params.num_elements,
        num_operations = params.num_operations,
        "perf testing"
    );
    println!(
        "Perf testing {} (elements: {}, operations: {})",
        factory.name(),
        params.num_elements,
        params.num_operations
    );

    let runners: [Runner; 5] = [
        run_add,
        run_pop_minimum,
        run_add_and_pop,
        run_reduce_key,
        run_all_operations,
    ];
    for runner in runners {
        run_averaged(runner, &factory, &params, args.num_runs);
    }
}
