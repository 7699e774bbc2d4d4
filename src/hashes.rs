use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single sha256.
pub fn sha256(preimage: &[u8]) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&Sha256::digest(preimage));
    buf
}

/// Bitcoin's double-sha256.
pub fn hash256(preimage: &[u8]) -> [u8; 32] {
    sha256(&sha256(preimage))
}

/// Bitcoin's `ripemd160(sha256(x))`, used for key hashes and fingerprints.
pub fn hash160(preimage: &[u8]) -> [u8; 20] {
    let mut buf = [0u8; 20];
    buf.copy_from_slice(&Ripemd160::digest(Sha256::digest(preimage)));
    buf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_matches_known_digests() {
        // sha256("abc") and hash160 of the generator point, both well known.
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap()
        );
        let generator =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();
        assert_eq!(
            hash160(&generator).to_vec(),
            hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap()
        );
        assert_eq!(
            hash256(b"hello").to_vec(),
            hex::decode("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50")
                .unwrap()
        );
    }
}
