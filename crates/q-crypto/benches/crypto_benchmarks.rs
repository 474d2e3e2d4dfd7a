// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Performance benchmarks for the record-protection primitives
//!
//! Run with: cargo +nightly bench --package q-crypto --features bench

#![cfg(feature = "bench")]
#![cfg_attr(feature = "bench", feature(test))]

extern crate test;

use q_common::Timeout;
use q_crypto::{constant_time_eq, Aes256Ctr, Aes256Key, CryptoService, CtrIv, Hash, Sha256, SoftwareEngine};
use test::Bencher;

/// Benchmark SHA-256 over one 64-byte record slot
#[bench]
fn bench_sha256_64b(b: &mut Bencher) {
    let data = [0u8; 64];
    b.iter(|| Sha256::hash(test::black_box(&data)));
}

#[bench]
fn bench_sha256_1kb(b: &mut Bencher) {
    let data = vec![0u8; 1024];
    b.iter(|| Sha256::hash(test::black_box(&data)));
}

/// Benchmark AES-256-CTR over one 64-byte record slot
#[bench]
fn bench_aes256_ctr_64b(b: &mut Bencher) {
    let key = Aes256Key::new([0x42; 32]);
    let iv = CtrIv::new([0u8; 16]);
    let mut data = [0u8; 64];
    b.iter(|| Aes256Ctr::apply(&key, &iv, test::black_box(&mut data)));
}

#[bench]
fn bench_aes256_ctr_1kb(b: &mut Bencher) {
    let key = Aes256Key::new([0x42; 32]);
    let iv = CtrIv::new([0u8; 16]);
    let mut data = vec![0u8; 1024];
    b.iter(|| Aes256Ctr::apply(&key, &iv, test::black_box(&mut data)));
}

/// Benchmark the service path a record write takes: lock, hash, lock, encrypt
#[bench]
fn bench_service_seal_64b(b: &mut Bencher) {
    let service = CryptoService::new(SoftwareEngine::new());
    let key = Aes256Key::new([0x42; 32]);
    let iv = CtrIv::new([0u8; 16]);
    let mut slot = [0u8; 64];
    b.iter(|| {
        let digest = service.hash(&slot[32..], Timeout::NoWait).unwrap();
        slot[..32].copy_from_slice(&digest);
        service.aes_ctr(&key, &iv, &mut slot, Timeout::NoWait).unwrap();
    });
}

/// Benchmark digest comparison
#[bench]
fn bench_constant_time_eq_32(b: &mut Bencher) {
    let a = [0xAAu8; 32];
    let b_data = [0xAAu8; 32];
    b.iter(|| constant_time_eq(test::black_box(&a), test::black_box(&b_data)));
}
