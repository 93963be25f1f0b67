//! Benchmarks for the delegate rule book.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- signer_quote
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use delegate_book::error::SettlementError;
use delegate_book::{
    Address, Order, OrderFulfillment, Party, QuoteEngine, RuleBook, SettlementEngine,
    SettlementReceipt,
};

// ============================================================================
// HELPER FUNCTIONS - Deterministic book generation
// ============================================================================

fn weth() -> Address {
    Address::from_low_u64(0xe1)
}

fn dai() -> Address {
    Address::from_low_u64(0xda)
}

/// Book with `count` rules on one pair, each worse than the last.
///
/// Rule `i` offers 10_000 sender for `1_000 + i` signer, so every insert
/// walks to the tail.
fn populate_descending(count: usize) -> RuleBook {
    let mut book = RuleBook::with_capacity(count);
    for i in 0..count as u64 {
        book.create_rule(weth(), dai(), 10_000, 1_000 + i).unwrap();
    }
    book
}

/// Book with `count` rules at pseudo-random rates.
fn populate_random(count: usize, seed: u64) -> RuleBook {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = RuleBook::with_capacity(count);
    for _ in 0..count {
        book.create_rule(
            weth(),
            dai(),
            rng.gen_range(1_000..=100_000),
            rng.gen_range(1_000..=100_000),
        )
        .unwrap();
    }
    book
}

struct AcceptAll;

impl SettlementEngine for AcceptAll {
    fn settle(&self, order: &Order, _required: u64) -> Result<SettlementReceipt, SettlementError> {
        Ok(SettlementReceipt::new(
            order.nonce,
            order.signer.wallet.unwrap_or_default(),
            order.sender.wallet.unwrap_or_default(),
            order.signer.token,
            order.sender.token,
            order.signer.amount,
            order.sender.amount,
        ))
    }
}

// ============================================================================
// BENCHMARK: Rule Insertion
// ============================================================================

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_rule");
    group.measurement_time(Duration::from_secs(5));

    for depth in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("tail_of", depth), &depth, |b, &depth| {
            b.iter_batched(
                || populate_descending(depth),
                |mut book| black_box(book.create_rule(weth(), dai(), 10_000, 1_000_000)),
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("head_of_1k", |b| {
        b.iter_batched(
            || populate_descending(1_000),
            |mut book| black_box(book.create_rule(weth(), dai(), 10_000, 1)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("delete_middle_of_1k", |b| {
        b.iter_batched(
            || populate_descending(1_000),
            |mut book| black_box(book.delete_rule(500)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Multi-Level Quoting
// ============================================================================

fn bench_quotes(c: &mut Criterion) {
    let mut group = c.benchmark_group("signer_quote");
    group.measurement_time(Duration::from_secs(5));

    let book = populate_descending(1_000);
    let quotes = QuoteEngine::new(&book);

    for levels in [1u64, 10, 100, 1_000] {
        // Each rule holds 10_000 sender; stop half way into the last level
        let request = levels * 10_000 - 5_000;
        group.throughput(Throughput::Elements(levels));
        group.bench_with_input(BenchmarkId::new("levels", levels), &request, |b, &request| {
            b.iter(|| black_box(quotes.signer_side_quote(black_box(request), weth(), dai())));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("sender_quote");
    let book = populate_random(1_000, 42);
    let quotes = QuoteEngine::new(&book);
    let (_, signer_capacity) = book.capacity(weth(), dai());
    group.bench_function("half_of_1k_book", |b| {
        b.iter(|| black_box(quotes.sender_side_quote(black_box(signer_capacity / 2), dai(), weth())));
    });
    group.finish();
}

// ============================================================================
// BENCHMARK: Order Fulfillment
// ============================================================================

fn bench_fulfillment(c: &mut Criterion) {
    let mut group = c.benchmark_group("provide_order");
    group.measurement_time(Duration::from_secs(5));

    let filler = OrderFulfillment::new(Address::from_low_u64(0x77));

    for levels in [1u64, 10, 100] {
        group.bench_with_input(BenchmarkId::new("sweep", levels), &levels, |b, &levels| {
            b.iter_batched(
                || {
                    let book = populate_descending(200);
                    let request = levels * 10_000 - 5_000;
                    let quote = QuoteEngine::new(&book).signer_side_quote(request, weth(), dai());
                    let order = Order::new(
                        1,
                        0,
                        Party::new(Some(Address::from_low_u64(0x71)), dai(), quote),
                        Party::new(None, weth(), request),
                    );
                    (book, order)
                },
                |(mut book, order)| black_box(filler.provide_order(&mut book, &order, &AcceptAll)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: State Root
// ============================================================================

fn bench_state_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_root");
    group.sample_size(50);

    let book = populate_random(10_000, 12345);
    group.bench_function("10k_rules", |b| {
        b.iter(|| black_box(book.state_root()));
    });

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_insertion,
    bench_quotes,
    bench_fulfillment,
    bench_state_root
);

criterion_main!(benches);
