// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod signed_message;

pub use signed_message::SignedMessage;

use crate::networks::ChainConfig;
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::message::Message;
use num_traits::Signed;
use std::sync::LazyLock;
use thiserror::Error;

const ZERO_ADDRESS: Address = Address::new_id(0);

/// Total supply cap; a message can never move more than this.
static TOTAL_SUPPLY: LazyLock<TokenAmount> =
    LazyLock::new(|| TokenAmount::from_whole(2_000_000_000));

/// Upper bound on the encoded parameters of a single message.
pub const MESSAGE_PARAMS_SIZE_LIMIT: usize = 64 << 10;

/// A structurally invalid message, naming the violated field. Syntax
/// rejection is independent of the election path: signatures and on-chain
/// applicability are checked by other collaborators.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("Message version {0} not supported")]
    Version(u64),
    #[error("Message 'to' address is not set")]
    ToAddressNotSet,
    #[error("Message value cannot be negative")]
    NegativeValue,
    #[error("Message value cannot be greater than total token supply")]
    ValueAboveSupply,
    #[error("Message gas_fee_cap cannot be negative")]
    NegativeGasFeeCap,
    #[error("Message gas_premium cannot be negative")]
    NegativeGasPremium,
    #[error("Message gas_premium cannot be greater than gas_fee_cap")]
    GasPremiumAboveFeeCap,
    #[error("Message gas limit {0} above block gas limit {1}")]
    GasLimitAboveBlockLimit(u64, u64),
    #[error("Message parameters exceed maximum size: {0} > {1}")]
    ParamsTooLarge(usize, usize),
    #[error("Message signature is empty")]
    EmptySignature,
}

/// Stateless structural validation of an unsigned message. Pure function of
/// the message and the chain parameters; safe to run concurrently across a
/// validation pipeline.
pub fn validate_unsigned_message_syntax(
    msg: &Message,
    config: &ChainConfig,
) -> Result<(), MessageError> {
    if msg.version != 0 {
        return Err(MessageError::Version(msg.version));
    }
    if msg.to == ZERO_ADDRESS {
        return Err(MessageError::ToAddressNotSet);
    }
    if msg.value.atto().is_negative() {
        return Err(MessageError::NegativeValue);
    }
    if msg.value > *TOTAL_SUPPLY {
        return Err(MessageError::ValueAboveSupply);
    }
    if msg.gas_fee_cap.atto().is_negative() {
        return Err(MessageError::NegativeGasFeeCap);
    }
    if msg.gas_premium.atto().is_negative() {
        return Err(MessageError::NegativeGasPremium);
    }
    if msg.gas_premium > msg.gas_fee_cap {
        return Err(MessageError::GasPremiumAboveFeeCap);
    }
    if msg.gas_limit > config.block_gas_limit {
        return Err(MessageError::GasLimitAboveBlockLimit(
            msg.gas_limit,
            config.block_gas_limit,
        ));
    }
    if msg.params.bytes().len() > MESSAGE_PARAMS_SIZE_LIMIT {
        return Err(MessageError::ParamsTooLarge(
            msg.params.bytes().len(),
            MESSAGE_PARAMS_SIZE_LIMIT,
        ));
    }
    Ok(())
}

/// Structural validation of a signed message: the unsigned checks plus a
/// present signature. Does not verify the signature itself.
pub fn validate_signed_message_syntax(
    smsg: &SignedMessage,
    config: &ChainConfig,
) -> Result<(), MessageError> {
    validate_unsigned_message_syntax(smsg.message(), config)?;
    if smsg.signature().bytes().is_empty() {
        return Err(MessageError::EmptySignature);
    }
    Ok(())
}
