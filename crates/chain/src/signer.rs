//! Builds the signer the bot submits liquidations with, from
//! [`liq_types::config::SignerConfig`] (spec.md §6/§9).

use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use liq_types::config::SignerConfig;

/// Constructs a [`PrivateKeySigner`] from either a raw private key or a
/// mnemonic phrase plus account index, per spec.md §6. An out-of-range
/// account number is rejected at config-validation time
/// ([`liq_types::config::BotConfig::validate`]), not here.
pub fn build_signer(cfg: &SignerConfig) -> eyre::Result<PrivateKeySigner> {
    match cfg {
        SignerConfig::PrivateKey(key) => {
            let key = key.strip_prefix("0x").unwrap_or(key);
            key.parse::<PrivateKeySigner>()
                .map_err(|err| eyre::eyre!("invalid private key: {err}"))
        }
        SignerConfig::Mnemonic { phrase, account_number } => MnemonicBuilder::<English>::default()
            .phrase(phrase.as_str())
            .derivation_path(SignerConfig::hd_path(*account_number))
            .map_err(|err| eyre::eyre!("invalid derivation path: {err}"))?
            .build()
            .map_err(|err| eyre::eyre!("failed to derive signer from mnemonic: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_a_stable_address_from_the_same_mnemonic_and_account() {
        let cfg = SignerConfig::Mnemonic {
            phrase: "test test test test test test test test test test test junk".to_string(),
            account_number: 0
        };

        let first = build_signer(&cfg).unwrap();
        let second = build_signer(&cfg).unwrap();
        assert_eq!(first.address(), second.address());
    }

    #[test]
    fn different_account_numbers_derive_different_addresses() {
        let phrase = "test test test test test test test test test test test junk".to_string();
        let a = build_signer(&SignerConfig::Mnemonic { phrase: phrase.clone(), account_number: 0 }).unwrap();
        let b = build_signer(&SignerConfig::Mnemonic { phrase, account_number: 1 }).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn accepts_a_private_key_with_or_without_0x_prefix() {
        let raw = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let with_prefix = format!("0x{raw}");

        let a = build_signer(&SignerConfig::PrivateKey(raw.to_string())).unwrap();
        let b = build_signer(&SignerConfig::PrivateKey(with_prefix)).unwrap();
        assert_eq!(a.address(), b.address());
    }
}
