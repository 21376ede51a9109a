use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::OsRng;

use eots_crypto::{eots_sign, eots_verify, rand_gen, schnorr_sign, schnorr_verify, xonly_public_key};
use eots_types::SecretKey;

fn setup_key() -> SecretKey {
    let pair = rand_gen(&mut OsRng);
    SecretKey(*pair.secret.as_bytes())
}

fn rand_gen_bench(c: &mut Criterion) {
    c.bench_function("rand_gen", |b| b.iter(|| rand_gen(&mut OsRng)));
}

fn eots_sign_bench(c: &mut Criterion) {
    let sk = setup_key();
    let nonce = rand_gen(&mut OsRng);
    let msg = [42u8; 32];

    c.bench_function("eots_sign_32B", |b| {
        b.iter(|| eots_sign(&sk, &nonce.secret, black_box(&msg)))
    });
}

fn eots_verify_bench(c: &mut Criterion) {
    let sk = setup_key();
    let pk = xonly_public_key(sk.as_bytes()).unwrap();
    let nonce = rand_gen(&mut OsRng);
    let msg = [42u8; 32];
    let sig = eots_sign(&sk, &nonce.secret, &msg).unwrap();

    c.bench_function("eots_verify_32B", |b| {
        b.iter(|| eots_verify(&pk, &nonce.public, black_box(&msg), &sig))
    });
}

fn schnorr_sign_bench(c: &mut Criterion) {
    let sk = setup_key();
    let msg = [42u8; 32];

    c.bench_function("schnorr_sign_32B", |b| {
        b.iter(|| schnorr_sign(&sk, black_box(&msg), &mut OsRng))
    });
}

fn schnorr_verify_bench(c: &mut Criterion) {
    let sk = setup_key();
    let pk = xonly_public_key(sk.as_bytes()).unwrap();
    let msg = [42u8; 32];
    let sig = schnorr_sign(&sk, &msg, &mut OsRng).unwrap();

    c.bench_function("schnorr_verify_32B", |b| {
        b.iter(|| schnorr_verify(&pk, black_box(&msg), &sig))
    });
}

criterion_group!(
    benches,
    rand_gen_bench,
    eots_sign_bench,
    eots_verify_bench,
    schnorr_sign_bench,
    schnorr_verify_bench,
);
criterion_main!(benches);
