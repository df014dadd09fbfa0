//! Disposable Ed25519 keypairs for signature round-trip tests. Not for any real use: these keys never touch disk and exist only
//! for the duration of a test process.
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::SigningKey;

/// A freshly generated Ed25519 keypair, PEM-encoded the way
/// `egp_sign::SignatureService` expects.
pub struct Ed25519KeyPairPem {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

pub fn generate_ed25519_keypair() -> Ed25519KeyPairPem {
    let mut csprng = ed25519_dalek::rand_core::OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let private_key_pem = signing_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
    let public_key_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    Ed25519KeyPairPem {
        private_key_pem,
        public_key_pem,
    }
}
