//! OnRamp logs read from an EVM node through alloy.

use alloy_network::Network;
use alloy_primitives::{Address as EvmAddress, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use alloy_sol_types::{sol, SolEvent};
use async_trait::async_trait;
use std::marker::PhantomData;
use tracing::{debug, instrument, Instrument};

use crate::error::Result;
use crate::events::Cursor;
use crate::onramp::OnRampEvent;
use crate::protocol::{
    Address, ChainFamily, ChainSelector, ExtraArgs, Message, OrderingMode, RampMessageHeader,
    RampTokenAmount,
};
use crate::spans;
use crate::traits::EventSource;

/// Blocks scanned per `eth_getLogs` call by default
pub const DEFAULT_BLOCK_RANGE: u64 = 2_000;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct EvmRampMessageHeader {
        bytes32 messageId;
        uint64 sourceChainSelector;
        uint64 destChainSelector;
        uint64 sequenceNumber;
        uint64 nonce;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct EVM2AnyTokenTransfer {
        address sourcePoolAddress;
        bytes destTokenAddress;
        bytes extraData;
        uint256 amount;
        bytes destExecData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct EVM2AnyRampMessage {
        EvmRampMessageHeader header;
        address sender;
        bytes data;
        bytes receiver;
        bytes extraArgs;
        address feeToken;
        uint256 feeTokenAmount;
        uint256 feeValueJuels;
        EVM2AnyTokenTransfer[] tokenAmounts;
    }

    /// Emitted by an EVM OnRamp for every accepted message
    #[derive(Debug, PartialEq, Eq)]
    event CCIPMessageSent(
        uint64 indexed destChainSelector,
        uint64 indexed sequenceNumber,
        EVM2AnyRampMessage message
    );
}

/// [`EventSource`] over the `CCIPMessageSent` logs of one OnRamp lane.
///
/// The cursor is the next block to scan. Each call reads at most
/// `block_range` blocks up to the chain head, so a caller that keeps
/// passing back the returned cursor sees every message exactly once.
///
/// # Examples
///
/// ```rust,no_run
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
/// use ccip_rs::{AlloyOnRampLogSource, ChainFamily, ChainSelector, Cursor, EventSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("https://eth.llamarpc.com").await?;
/// let source = AlloyOnRampLogSource::new(
///     provider,
///     address!("69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284"),
///     ChainSelector::new(15971525489660198786),
///     ChainFamily::Evm,
/// );
/// let (events, next) = source.next_batch(Cursor::new(21_000_000), 100).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyOnRampLogSource<N, P> {
    provider: P,
    on_ramp: EvmAddress,
    dest_chain_selector: ChainSelector,
    receiver_family: ChainFamily,
    block_range: u64,
    _network: PhantomData<N>,
}

impl<N, P> AlloyOnRampLogSource<N, P>
where
    N: Network,
    P: Provider<N>,
{
    pub fn new(
        provider: P,
        on_ramp: EvmAddress,
        dest_chain_selector: ChainSelector,
        receiver_family: ChainFamily,
    ) -> Self {
        Self {
            provider,
            on_ramp,
            dest_chain_selector,
            receiver_family,
            block_range: DEFAULT_BLOCK_RANGE,
            _network: PhantomData,
        }
    }

    pub fn with_block_range(mut self, block_range: u64) -> Self {
        self.block_range = block_range.max(1);
        self
    }

    pub fn inner(&self) -> &P {
        &self.provider
    }

    fn filter(&self, from_block: u64, to_block: u64) -> Filter {
        Filter::new()
            .address(self.on_ramp)
            .event_signature(CCIPMessageSent::SIGNATURE_HASH)
            .topic1(B256::from(U256::from(self.dest_chain_selector.as_u64())))
            .from_block(from_block)
            .to_block(to_block)
    }

    fn decode(&self, log: &Log) -> Result<OnRampEvent> {
        let event = CCIPMessageSent::decode_log(&log.inner)?;
        let message = to_message(&event.data.message, self.on_ramp, self.receiver_family)?;
        Ok(OnRampEvent::CcipMessageSent {
            dest_chain_selector: ChainSelector::new(event.data.destChainSelector),
            sequence_number: event.data.sequenceNumber,
            message,
        })
    }
}

#[async_trait]
impl<N, P> EventSource<OnRampEvent> for AlloyOnRampLogSource<N, P>
where
    N: Network,
    P: Provider<N> + Send + Sync,
{
    #[instrument(skip(self), fields(on_ramp = %self.on_ramp))]
    async fn next_batch(&self, from: Cursor, limit: usize) -> Result<(Vec<OnRampEvent>, Cursor)> {
        let head = self.provider.get_block_number().await?;
        let from_block = from.position();
        if from_block > head || limit == 0 {
            return Ok((Vec::new(), from));
        }
        let to_block = head.min(from_block.saturating_add(self.block_range - 1));

        let span = spans::get_logs(self.dest_chain_selector, from_block, to_block);
        let logs = self
            .provider
            .get_logs(&self.filter(from_block, to_block))
            .instrument(span.clone())
            .await?;
        span.record("log_count", logs.len() as u64);

        let (logs, next_block) = fit_to_limit(logs, limit, to_block);
        let events = logs.iter().map(|log| self.decode(log)).collect::<Result<Vec<_>>>()?;
        debug!(
            from_block = from_block,
            next_block = next_block,
            event_count = events.len(),
            event = "onramp_logs_read"
        );
        Ok((events, Cursor::new(next_block)))
    }
}

/// Trims `logs` to at most `limit` entries without splitting a block,
/// unless a single block alone holds more than `limit` logs. Returns the
/// kept logs and the next block to scan.
fn fit_to_limit(mut logs: Vec<Log>, limit: usize, to_block: u64) -> (Vec<Log>, u64) {
    if logs.len() <= limit {
        return (logs, to_block + 1);
    }
    let block_of = |log: &Log| log.block_number.unwrap_or(to_block);
    let cut_block = block_of(&logs[limit]);
    let first_block = block_of(&logs[0]);

    if cut_block == first_block {
        logs.retain(|log| block_of(log) == first_block);
        return (logs, first_block + 1);
    }
    logs.retain(|log| block_of(log) < cut_block);
    (logs, cut_block)
}

fn to_message(
    sent: &EVM2AnyRampMessage,
    on_ramp: EvmAddress,
    receiver_family: ChainFamily,
) -> Result<Message> {
    let extra_args = ExtraArgs::decode(&sent.extraArgs)?;
    let token_amounts = sent
        .tokenAmounts
        .iter()
        .map(|t| {
            Ok(RampTokenAmount {
                source_pool_address: Address::evm(t.sourcePoolAddress),
                dest_token_address: Address::new(receiver_family, t.destTokenAddress.clone())?,
                extra_data: t.extraData.clone(),
                amount: t.amount,
                dest_exec_data: t.destExecData.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Message {
        header: RampMessageHeader {
            message_id: sent.header.messageId,
            source_chain_selector: ChainSelector::new(sent.header.sourceChainSelector),
            dest_chain_selector: ChainSelector::new(sent.header.destChainSelector),
            sequence_number: sent.header.sequenceNumber,
            ordering: OrderingMode::from_wire_nonce(sent.header.nonce),
        },
        on_ramp: Address::evm(on_ramp),
        sender: Address::evm(sent.sender),
        receiver: Address::new(receiver_family, sent.receiver.clone())?,
        data: sent.data.clone(),
        gas_limit: extra_args.gas_limit,
        token_amounts,
    })
}
