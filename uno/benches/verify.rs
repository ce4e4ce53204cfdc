use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use merlin::Transcript;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use tos_curve25519::Scalar;
use tos_uno::proofs::{BalanceProof, ShieldCommitmentProof};
use tos_uno::{schnorr, KeyPair, PedersenOpening};

fn bench_schnorr_verify(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
    let keypair = KeyPair::generate(&mut rng).expect("keygen");
    let msg = b"benchmark message";
    let sig = keypair.sign(&mut rng, msg).expect("sign");

    let mut g = c.benchmark_group("schnorr_verify");
    g.throughput(Throughput::Elements(1));
    g.bench_function(BenchmarkId::from_parameter("single"), |b| {
        b.iter(|| {
            schnorr::verify(black_box(&sig), keypair.public(), msg).expect("verify");
        });
    });
    g.finish();
}

fn bench_shield_verify(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let keypair = KeyPair::generate(&mut rng).expect("keygen");
    let amount = 1_000u64;
    let (ct, opening) = keypair.public().encrypt(&mut rng, amount).expect("encrypt");

    let mut t = Transcript::new(b"bench");
    let proof =
        ShieldCommitmentProof::new(&mut rng, &opening, keypair.public(), &mut t).expect("prove");

    let mut g = c.benchmark_group("shield_proof_verify");
    g.throughput(Throughput::Elements(1));
    g.bench_function(BenchmarkId::from_parameter("shield"), |b| {
        b.iter(|| {
            let mut t = Transcript::new(b"bench");
            proof
                .verify(ct.commitment(), ct.handle(), keypair.public(), amount, &mut t)
                .expect("verify");
            black_box(());
        });
    });
    g.finish();
}

fn bench_balance_verify(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
    let keypair = KeyPair::generate(&mut rng).expect("keygen");
    let amount = 1_000u64;
    let opening_one = PedersenOpening::from_scalar(Scalar::ONE);
    let source_ct = keypair.public().encrypt_with_opening(amount, &opening_one);

    let proof = BalanceProof::new(&mut rng, &keypair, amount, &source_ct).expect("prove");

    let mut g = c.benchmark_group("balance_proof_verify");
    g.throughput(Throughput::Elements(1));
    g.bench_function(BenchmarkId::from_parameter("balance"), |b| {
        b.iter(|| {
            proof
                .verify(keypair.public(), black_box(&source_ct))
                .expect("verify");
        });
    });
    g.finish();
}

criterion_group!(benches, bench_schnorr_verify, bench_shield_verify, bench_balance_verify);
criterion_main!(benches);
