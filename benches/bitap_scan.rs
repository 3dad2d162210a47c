use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use seqalign::motif::{BitapMatcher, BitapPattern};
use seqalign::{BioSequence, Motif, NucleotideSequence};

fn random_dna(rng: &mut StdRng, len: usize) -> NucleotideSequence {
    const ALPHABET: &[u8] = b"ACGT";
    let text: String = (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    text.parse().expect("ACGT text")
}

fn bench_bitap(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let text = random_dna(&mut rng, 1 << 20);
    let pattern = text.get_range(700_000, 700_024).expect("inside text");
    let exact = BitapPattern::from_sequence(&pattern).expect("pattern fits a word");
    let degenerate = Motif::<NucleotideSequence>::parse("ATTRGACANNNNGTCA")
        .and_then(|m| m.to_bitap_pattern())
        .expect("valid motif");

    let mut group = c.benchmark_group("bitap_scan");
    group.bench_function("exact_1m", |b| b.iter(|| black_box(exact.exact_search(&text))));
    for k in [1usize, 2] {
        group.bench_function(format!("mismatch_{k}_1m"), |b| {
            b.iter(|| {
                let m = exact.mismatch_only_matcher(k, &text, 0, text.size()).expect("valid interval");
                black_box(m.hits().count())
            })
        });
        group.bench_function(format!("indel_{k}_1m"), |b| {
            b.iter(|| {
                let m = exact
                    .mismatch_and_indel_matcher_last(k, &text, 0, text.size())
                    .expect("valid interval");
                black_box(m.hits().count())
            })
        });
    }
    group.bench_function("degenerate_motif_1m", |b| b.iter(|| black_box(degenerate.exact_search(&text))));
    group.finish();
}

criterion_group!(benches, bench_bitap);
criterion_main!(benches);
