// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-crypto
//!
//! Known-answer vectors for the primitives, plus the shared service's
//! locking and error mapping.

mod hash_tests {
    use q_crypto::hash::Sha256;
    use q_crypto::traits::Hash;

    #[test]
    fn test_sha256_empty_input() {
        // FIPS 180-4: SHA-256("")
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855").unwrap();
        assert_eq!(Sha256::hash(&[]).as_ref(), expected.as_slice());
    }

    #[test]
    fn test_sha256_abc() {
        // FIPS 180-4: SHA-256("abc")
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad").unwrap();
        assert_eq!(Sha256::hash(b"abc").as_ref(), expected.as_slice());
    }
}

mod cipher_tests {
    use q_crypto::cipher::{Aes256Ctr, Aes256Key, CtrIv};

    #[test]
    fn test_aes256_ctr_sp800_38a_vector() {
        // NIST SP 800-38A F.5.5 CTR-AES256.Encrypt, first two blocks
        let key = Aes256Key::from_slice(
            &hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4").unwrap(),
        )
        .unwrap();
        let iv: [u8; 16] = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff")
            .unwrap()
            .try_into()
            .unwrap();
        let mut data =
            hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51").unwrap();

        Aes256Ctr::apply(&key, &CtrIv::new(iv), &mut data).unwrap();
        assert_eq!(
            hex::encode(&data),
            "601ec313775789a5b7a7f504bbf3d228f443e3ca4d62b59aca84e990cacaf5c5"
        );
    }
}

mod service_tests {
    use q_common::{Error, Timeout};
    use q_crypto::{
        Aes256Key, CryptoEngine, CryptoError, CryptoResult, CryptoService, CtrIv, LogKeys,
        SoftwareEngine,
    };

    struct FaultyEngine;

    impl CryptoEngine for FaultyEngine {
        fn sha256(&mut self, _data: &[u8]) -> CryptoResult<[u8; 32]> {
            Err(CryptoError::HardwareFault)
        }

        fn aes256_ctr(&mut self, _key: &Aes256Key, _iv: &CtrIv, _data: &mut [u8]) -> CryptoResult<()> {
            Err(CryptoError::HardwareFault)
        }
    }

    #[test]
    fn test_service_hash_and_cipher() {
        let service = CryptoService::new(SoftwareEngine::new());
        let digest = service.hash(b"abc", Timeout::NoWait).unwrap();
        assert_eq!(digest[0], 0xba);

        let keys = LogKeys::new([3u8; 32], [4u8; 8]);
        let mut data = [0x55u8; 40];
        service
            .aes_ctr(keys.key(), &CtrIv::new([0u8; 16]), &mut data, Timeout::NoWait)
            .unwrap();
        service
            .aes_ctr(keys.key(), &CtrIv::new([0u8; 16]), &mut data, Timeout::NoWait)
            .unwrap();
        assert_eq!(data, [0x55u8; 40]);

        let engine = service.into_inner();
        assert_eq!(engine.hash_ops(), 1);
        assert_eq!(engine.cipher_ops(), 2);
    }

    #[test]
    fn test_service_busy_while_engine_held() {
        let service = CryptoService::new(SoftwareEngine::new());
        let result = service.with_engine(Timeout::NoWait, |_engine| {
            service.hash(b"nested", Timeout::Spins(10))
        });
        assert_eq!(result.unwrap(), Err(Error::Busy));
    }

    #[test]
    fn test_engine_fault_maps_to_crypto_error() {
        let service = CryptoService::new(FaultyEngine);
        assert_eq!(service.hash(b"x", Timeout::NoWait), Err(Error::CryptoError));
    }

    #[test]
    fn test_log_keys_debug_hides_material() {
        let keys = LogKeys::new([0xAB; 32], [0xCD; 8]);
        assert_eq!(format!("{keys:?}"), "LogKeys(..)");
        assert_eq!(keys.nonce(), &[0xCD; 8]);
    }
}
