//! ERC-1967 proxy wiring.
//!
//! In upgradeable-proxy mode the implementation contract is deployed first,
//! then a proxy whose constructor takes `(address implementation, bytes
//! initData)` and delegate-calls the implementation with `initData`. The
//! proxy address is the stable, user-facing address; the implementation
//! behind it can be replaced later by an upgrade manager.

use alloy_core::primitives::{Address, B256, Bytes, b256, keccak256};

/// Name of the proxy artifact the build toolchain emits when the
/// OpenZeppelin upgrades tooling is in use.
pub const DEFAULT_PROXY_CONTRACT: &str = "ERC1967Proxy";

/// Storage slot holding the implementation address behind an ERC-1967
/// proxy: `keccak256("eip1967.proxy.implementation") - 1`.
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// Calldata for a zero-argument `initialize()` call.
pub fn default_initializer_calldata() -> Bytes {
    Bytes::copy_from_slice(&selector("initialize()"))
}

/// First four bytes of the keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// ABI-encode the `(address implementation, bytes initData)` constructor
/// arguments of the ERC-1967 proxy.
///
/// Layout: two head words (the padded address and the offset to the dynamic
/// `bytes`), then the `bytes` length word and the right-padded payload.
pub fn encode_constructor_args(implementation: Address, init_data: &Bytes) -> Vec<u8> {
    let padded_len = init_data.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(96 + padded_len);

    // Head word 1: implementation address, left-padded to 32 bytes.
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(implementation.as_slice());

    // Head word 2: offset to the `bytes` data, 2 head words * 32 bytes = 64.
    out.extend_from_slice(&abi_word(64));

    // Tail: length-prefixed payload, right-padded to a word boundary.
    out.extend_from_slice(&abi_word(init_data.len() as u64));
    out.extend_from_slice(init_data);
    out.resize(96 + padded_len, 0);

    out
}

/// Interpret an ERC-1967 slot value as the address stored in its low 20 bytes.
pub fn address_from_slot(value: B256) -> Address {
    Address::from_slice(&value[12..])
}

fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
