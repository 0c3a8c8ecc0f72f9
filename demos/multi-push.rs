//! Several producer threads push into one shared BCQueue, then the queue is printed and torn down.
//!
//! Run with `--features tracing -- --verbose` to see the queue's own debug output.

use clap::{Parser, ValueEnum};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use yep_bcq::{BCQueue, BCQueueError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Reject values that find the queue full
    Try,
    /// Wait for space
    Blocking,
}

/// Multiple producers sharing one bounded circular queue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Queue capacity (total number of slots)
    #[arg(short = 'd', long, default_value = "20")]
    capacity: usize,

    /// Number of producer threads
    #[arg(short = 'p', long, default_value = "2")]
    producer_threads: usize,

    /// Values pushed by each producer (defaults to capacity / producer_threads)
    #[arg(short = 'n', long)]
    per_producer: Option<usize>,

    /// Number of consumer threads draining the queue while producers run
    #[arg(short = 'c', long, default_value = "0")]
    consumer_threads: usize,

    /// What producers do when the queue is full
    #[arg(long, value_enum, default_value_t = Policy::Try)]
    policy: Policy,

    /// Enable verbose logging
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    if args.verbose {
        yep_bcq::init_tracing();
    }

    if args.producer_threads == 0 {
        panic!("At least one producer thread is required");
    }

    let per_producer = args
        .per_producer
        .unwrap_or(args.capacity / args.producer_threads);

    if args.policy == Policy::Blocking
        && args.consumer_threads == 0
        && per_producer * args.producer_threads > args.capacity
    {
        panic!("blocking producers would wait forever without a consumer");
    }

    println!("Starting multi-push with:");
    println!("  Capacity: {}", args.capacity);
    println!("  Producer threads: {}", args.producer_threads);
    println!("  Values per producer: {per_producer}");
    println!("  Consumer threads: {}", args.consumer_threads);
    println!("  Policy: {:?}", args.policy);

    let queue = match BCQueue::new(args.capacity) {
        Ok(queue) => queue,
        Err(e) => {
            eprintln!("Failed to create queue: {e}");
            std::process::exit(1);
        }
    };

    // every producer draws from the same even-number sequence: 2, 4, 6, ...
    let next_value = AtomicI64::new(0);
    let dropped = AtomicUsize::new(0);
    let pushed = AtomicUsize::new(0);
    let consumed = AtomicUsize::new(0);
    let total = per_producer * args.producer_threads;

    thread::scope(|s| {
        for i in 0..args.producer_threads {
            let queue = &queue;
            let next_value = &next_value;
            let dropped = &dropped;
            let pushed = &pushed;
            let policy = args.policy;
            let verbose = args.verbose;
            thread::Builder::new()
                .name(format!("producer_{i}"))
                .spawn_scoped(s, move || {
                    for _ in 0..per_producer {
                        let value = next_value.fetch_add(2, Ordering::AcqRel) + 2;
                        let result = match policy {
                            Policy::Try => queue.try_push(value),
                            Policy::Blocking => queue.push(value),
                        };
                        match result {
                            Ok(()) => {
                                pushed.fetch_add(1, Ordering::AcqRel);
                                if verbose {
                                    println!("producer_{i} pushed {value}");
                                }
                            }
                            Err(e) if e.error() == BCQueueError::Full => {
                                dropped.fetch_add(1, Ordering::AcqRel);
                                let reason = e.to_string();
                                println!("producer_{i}: {reason}, dropping {}", e.into_inner());
                            }
                            Err(e) => panic!("producer_{i} error: {e:?}"),
                        }
                    }
                })
                .unwrap();
        }

        for i in 0..args.consumer_threads {
            let queue = &queue;
            let consumed = &consumed;
            let pushed = &pushed;
            let dropped = &dropped;
            let verbose = args.verbose;
            thread::Builder::new()
                .name(format!("consumer_{i}"))
                .spawn_scoped(s, move || {
                    // stop once every value has been either consumed or dropped
                    while consumed.load(Ordering::Acquire) + dropped.load(Ordering::Acquire)
                        < total
                    {
                        match queue.pop_timeout(Duration::from_millis(10)) {
                            Ok(value) => {
                                consumed.fetch_add(1, Ordering::AcqRel);
                                if verbose {
                                    println!("consumer_{i} popped {value}");
                                }
                            }
                            Err(BCQueueError::Timeout) => {
                                if pushed.load(Ordering::Acquire) + dropped.load(Ordering::Acquire)
                                    == total
                                    && queue.is_empty()
                                {
                                    break;
                                }
                            }
                            Err(e) => panic!("consumer_{i} error: {e:?}"),
                        }
                    }
                })
                .unwrap();
        }
    });

    println!("{}", queue.snapshot());
    println!(
        "pushed={} consumed={} dropped={} remaining={}",
        pushed.load(Ordering::Acquire),
        consumed.load(Ordering::Acquire),
        dropped.load(Ordering::Acquire),
        queue.len()
    );

    let remaining = queue.destroy();
    if args.verbose {
        println!("destroyed queue holding {} values", remaining.len());
    }
}
