use derive_more::derive::AsRef;
use fixed_hash::construct_fixed_hash;
use impl_serde::impl_fixed_hash_serde;

pub use ethereum_types::H256;

use crate::uint256::Uint256;

pub const PUBLIC_KEY_SIZE: usize = 48;
pub const SIGNATURE_SIZE: usize = 96;

pub const GENESIS_SLOT: Slot = 0;

pub type Slot = u64;
pub type Epoch = u64;
pub type ValidatorIndex = u64;
pub type Gwei = u64;
pub type Gas = u64;
pub type UnixSeconds = u64;

pub type ExecutionBlockNumber = u64;
pub type ExecutionBlockHash = H256;
pub type Root = H256;
pub type Wei = Uint256;

construct_fixed_hash! {
    #[derive(AsRef)]
    pub struct PublicKeyBytes(PUBLIC_KEY_SIZE);
}

impl_fixed_hash_serde!(PublicKeyBytes, PUBLIC_KEY_SIZE);

construct_fixed_hash! {
    #[derive(AsRef)]
    pub struct SignatureBytes(SIGNATURE_SIZE);
}

impl_fixed_hash_serde!(SignatureBytes, SIGNATURE_SIZE);

pub type ExecutionAddress = ethereum_types::H160;
