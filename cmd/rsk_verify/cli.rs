use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand as ClapSubcommand};
use eyre::eyre;
use rsk_common::{
    Address, H256,
    types::{
        Network, ProofResponse, RpcBlock, RpcReceipt, compute_block_hash, compute_receipts_root,
        compute_transactions_root,
    },
};
use rsk_trie::key_mapper::{account_code_key, account_key, account_storage_key};
use tracing::{Level, info, warn};

use crate::utils::{self, read_rpc_json_file};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "rsk-verify", author, version = VERSION_STRING, about = "Verifies RSK block hashes, trie roots and state proofs", long_about = None)]
pub struct CLI {
    #[command(flatten)]
    pub opts: Options,
    #[command(subcommand)]
    pub command: Subcommand,
}

#[derive(ClapParser, Debug)]
pub struct Options {
    #[arg(long = "log.level", default_value_t = Level::INFO, value_name = "LOG_LEVEL", global = true)]
    pub log_level: Level,
    #[arg(
        long = "network",
        default_value_t = Network::Regtest,
        value_name = "NETWORK",
        help = "Network whose header rules apply: mainnet, testnet or regtest",
        global = true
    )]
    pub network: Network,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            network: Network::default(),
        }
    }
}

#[derive(ClapSubcommand, Debug)]
pub enum Subcommand {
    #[command(
        name = "verify-block",
        about = "Recompute the hash and trie roots of a block returned by eth_getBlockByNumber"
    )]
    VerifyBlock {
        #[arg(long = "block", value_name = "BLOCK_JSON")]
        block: PathBuf,
        #[arg(
            long = "receipts",
            value_name = "RECEIPTS_JSON",
            help = "JSON array with the receipt of every transaction, in block order"
        )]
        receipts: Option<PathBuf>,
    },
    #[command(
        name = "verify-proof",
        about = "Verify an eth_getProof response against a state root"
    )]
    VerifyProof {
        #[arg(long = "proof", value_name = "PROOF_JSON")]
        proof: PathBuf,
        #[arg(long = "state-root", value_name = "STATE_ROOT", value_parser = utils::parse_h256)]
        state_root: H256,
    },
    #[command(name = "trie-key", about = "Print the unified trie keys of an account")]
    TrieKey {
        #[arg(long = "address", value_name = "ADDRESS", value_parser = utils::parse_address)]
        address: Address,
        #[arg(long = "slot", value_name = "STORAGE_SLOT", value_parser = utils::parse_h256)]
        slot: Option<H256>,
    },
}

impl Subcommand {
    pub fn run(self, opts: &Options) -> eyre::Result<()> {
        match self {
            Subcommand::VerifyBlock { block, receipts } => {
                let block: RpcBlock = read_rpc_json_file(block)?;
                let receipts: Option<Vec<RpcReceipt>> =
                    receipts.map(read_rpc_json_file).transpose()?;
                verify_block(&block, receipts.as_deref(), opts.network)
            }
            Subcommand::VerifyProof { proof, state_root } => {
                let proof: ProofResponse = read_rpc_json_file(proof)?;
                verify_proof(&proof, state_root)
            }
            Subcommand::TrieKey { address, slot } => {
                println!("account: 0x{}", hex::encode(account_key(&address)));
                println!("code:    0x{}", hex::encode(account_code_key(&address)));
                if let Some(slot) = slot {
                    println!(
                        "storage: 0x{}",
                        hex::encode(account_storage_key(&address, &slot))
                    );
                }
                Ok(())
            }
        }
    }
}

/// Logs a computed value next to the reported one and returns whether they match.
fn check(what: &str, expected: H256, computed: H256) -> bool {
    if expected == computed {
        info!(expected = ?expected, "{what} matches");
        true
    } else {
        warn!(expected = ?expected, computed = ?computed, "{what} mismatch");
        false
    }
}

pub fn verify_block(
    block: &RpcBlock,
    receipts: Option<&[RpcReceipt]>,
    network: Network,
) -> eyre::Result<()> {
    info!(
        number = block.number,
        transactions = block.transactions.len(),
        %network,
        "Verifying block"
    );
    let config = network.block_hash_config(block.number);
    let mut mismatches = 0;

    let block_hash = compute_block_hash(&block.to_header_input(), config)?;
    if !check("Block hash", block.hash, block_hash) {
        mismatches += 1;
    }

    let transactions_root = compute_transactions_root(&block.to_transactions())?;
    if !check("Transactions root", block.transactions_root, transactions_root) {
        mismatches += 1;
    }

    if let Some(receipts) = receipts {
        if receipts.len() != block.transactions.len() {
            warn!(
                receipts = receipts.len(),
                transactions = block.transactions.len(),
                "Receipt count differs from transaction count"
            );
        }
        let receipts: Vec<_> = receipts.iter().map(RpcReceipt::to_receipt).collect();
        let receipts_root = compute_receipts_root(&receipts)?;
        if !check("Receipts root", block.receipts_root, receipts_root) {
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        return Err(eyre!("{mismatches} value(s) of block {} did not match", block.number));
    }
    Ok(())
}

pub fn verify_proof(proof: &ProofResponse, state_root: H256) -> eyre::Result<()> {
    let result = proof.verify(state_root)?;

    match (&result.account.error, result.account_state()?) {
        (Some(err), _) => warn!(address = ?proof.address, %err, "Account proof is invalid"),
        (None, Some(state)) => info!(
            address = ?proof.address,
            nonce = state.nonce,
            balance = %state.balance,
            contract = proof.is_contract(),
            "Account proof is valid"
        ),
        (None, None) => info!(address = ?proof.address, "Account proof is valid, account is absent"),
    }

    for (slot, storage) in &result.storage {
        match &storage.error {
            Some(err) => warn!(slot = ?slot, %err, "Storage proof is invalid"),
            None => info!(
                slot = ?slot,
                value = %format!("0x{}", hex::encode(storage.value.as_deref().unwrap_or_default())),
                "Storage proof is valid"
            ),
        }
    }

    if !result.all_valid {
        return Err(eyre!("Proof for {:?} did not verify", proof.address));
    }
    Ok(())
}
