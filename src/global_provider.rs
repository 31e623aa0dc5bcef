use crate::{
    commitment::{commitment_hash, encode_nonce},
    constants::chain::MAX_UINT96,
    types::{Balances, CreateAuction, MergedAuction},
    Config, Erc20, Erc721, SealedBidAuction,
};
use anyhow::{bail, Context, Result};
use ethers::{
    core::k256::ecdsa::SigningKey,
    middleware::SignerMiddleware,
    providers::{Middleware, Provider, Ws},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer, Wallet},
    types::{Address, TransactionReceipt, U256, U64},
};
use log::{debug, info};
use std::sync::Arc;
use tokio::try_join;

type SignerClient = SignerMiddleware<Arc<Provider<Ws>>, Wallet<SigningKey>>;

/// Write side: every call here signs and sends a transaction with the
/// configured wallet and waits for it to be mined.
pub struct GlobalProvider {
    pub local_wallet: LocalWallet,
    pub provider: Arc<Provider<Ws>>,
    pub signer_provider: Arc<SignerClient>,
    pub auction: SealedBidAuction<SignerClient>,
    explorer_tx_url: String,
}

impl GlobalProvider {
    pub async fn try_new(config: &Config) -> Result<GlobalProvider> {
        let mnemonic = config
            .mnemonic
            .as_deref()
            .context("MNEMONIC is required to send transactions")?;

        let provider = Provider::<Ws>::connect(&config.wss_rpc_url).await?;
        let provider = Arc::new(provider);

        info!("connected to provider at: {}", config.wss_rpc_url);

        let local_wallet = MnemonicBuilder::<English>::default()
            .phrase(mnemonic)
            .build()?;

        let signer_provider = SignerMiddleware::new_with_provider_chain(provider.clone(), local_wallet)
            .await?;
        let signer_provider = Arc::new(signer_provider);

        info!("wallet address: {:?}", signer_provider.address());

        let auction =
            SealedBidAuction::new(config.auction_contract, signer_provider.clone());

        Ok(GlobalProvider {
            local_wallet: signer_provider.signer().clone(),
            provider,
            signer_provider,
            auction,
            explorer_tx_url: config.explorer_tx_url.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.local_wallet.address()
    }

    pub async fn create_auction(&self, params: &CreateAuction) -> Result<TransactionReceipt> {
        let erc721 = Erc721::new(params.token_contract, self.signer_provider.clone());

        let owner = erc721.owner_of(params.token_id).await?;
        if owner != self.address() {
            bail!("You are not the owner of the token");
        }

        if !self.is_nft_approved(params.token_contract, params.token_id).await? {
            bail!("auction contract is not approved to transfer the token, approve it first");
        }

        let call = self.auction.create_auction(
            params.token_contract,
            params.token_id,
            params.erc20_token,
            U256::from(params.start_time),
            U256::from(params.bid_period),
            U256::from(params.reveal_period),
            params.reserve_price,
        );
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "creating auction for {:?} #{} starting at {}",
                params.token_contract, params.token_id, params.start_time
            ))
            .await?;

        self.check_receipt(receipt, "create auction")
    }

    pub async fn is_nft_approved(&self, token_contract: Address, token_id: U256) -> Result<bool> {
        let erc721 = Erc721::new(token_contract, self.signer_provider.clone());
        let approved = erc721.get_approved(token_id).await?;

        Ok(approved == self.auction.address())
    }

    pub async fn approve_nft(
        &self,
        token_contract: Address,
        token_id: U256,
    ) -> Result<TransactionReceipt> {
        let erc721 = Erc721::new(token_contract, self.signer_provider.clone());

        let call = erc721.approve(self.auction.address(), token_id);
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "approving auction contract to transfer {:?} #{}",
                token_contract, token_id
            ))
            .await?;

        self.check_receipt(receipt, "approve nft")
    }

    /// Commits to `bid_value` for the auction's current generation and
    /// returns the commitment. Approves the bid token first when the
    /// allowance is short.
    pub async fn commit_bid(
        &self,
        auction: &MergedAuction,
        bid_value: U256,
        nonce: &str,
    ) -> Result<[u8; 20]> {
        let info = &auction.contract_info;
        let balances = self
            .get_balances(info.erc20_token, auction.event.token_contract)
            .await?;

        if !balances.can_cover_bid(bid_value) {
            bail!("bid value is greater than balance");
        }

        let commitment = commitment_hash(
            nonce,
            bid_value,
            auction.event.token_contract,
            auction.event.token_id,
            info.index,
        )?;

        debug!("commitment is 0x{}", hex::encode(commitment));

        if !balances.is_allowance_enough(bid_value) {
            info!("allowance too low, approving the auction contract first");
            self.erc20_approve(info.erc20_token, U256::MAX).await?;
        }

        let call = self.auction.commit_bid(
            auction.event.token_contract,
            auction.event.token_id,
            commitment,
            bid_value,
        );
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "committing bid on {:?} #{}",
                auction.event.token_contract, auction.event.token_id
            ))
            .await?;

        self.check_receipt(receipt, "commit bid")?;

        Ok(commitment)
    }

    pub async fn reveal_bid(
        &self,
        auction: &MergedAuction,
        bid_value: U256,
        nonce: &str,
    ) -> Result<TransactionReceipt> {
        if bid_value > U256::from(MAX_UINT96) {
            bail!("bid value {} does not fit in uint96", bid_value);
        }

        let nonce = encode_nonce(nonce)?;

        let call = self.auction.reveal_bid(
            auction.event.token_contract,
            auction.event.token_id,
            bid_value.as_u128(),
            nonce,
        );
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "revealing bid on {:?} #{}",
                auction.event.token_contract, auction.event.token_id
            ))
            .await?;

        self.check_receipt(receipt, "reveal bid")
    }

    /// Only the seller may settle an auction.
    pub async fn end_auction(&self, auction: &MergedAuction) -> Result<TransactionReceipt> {
        if !auction.contract_info.is_seller(self.address()) {
            bail!("Only the seller can end the auction");
        }

        let call = self
            .auction
            .end_auction(auction.event.token_contract, auction.event.token_id);
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "ending auction on {:?} #{}",
                auction.event.token_contract, auction.event.token_id
            ))
            .await?;

        self.check_receipt(receipt, "end auction")
    }

    pub async fn get_balances(
        &self,
        erc20_token: Address,
        erc721_token: Address,
    ) -> Result<Balances> {
        let address = self.address();
        let spender = self.auction.address();

        let (eth, erc20_balance, erc721_balance, erc20_allowance) = try_join!(
            self.get_eth_balance(address),
            self.get_erc20_balance(erc20_token, address),
            self.get_erc721_balance(erc721_token, address),
            self.get_erc20_allowance(erc20_token, address, spender)
        )?;

        let balances = Balances {
            eth,
            erc20: erc20_balance,
            erc721: erc721_balance,
            erc20_allowance,
        };

        debug!("{:?}", balances);

        Ok(balances)
    }

    async fn get_eth_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address, None).await?)
    }

    async fn get_erc20_balance(&self, erc20_token: Address, address: Address) -> Result<U256> {
        let erc20 = Erc20::new(erc20_token, self.signer_provider.clone());
        Ok(erc20.balance_of(address).await?)
    }

    async fn get_erc721_balance(&self, erc721_token: Address, address: Address) -> Result<U256> {
        let erc721 = Erc721::new(erc721_token, self.signer_provider.clone());
        Ok(erc721.balance_of(address).await?)
    }

    async fn get_erc20_allowance(
        &self,
        erc20_token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        let erc20 = Erc20::new(erc20_token, self.signer_provider.clone());
        Ok(erc20.allowance(owner, spender).await?)
    }

    async fn erc20_approve(
        &self,
        erc20_token: Address,
        amount: U256,
    ) -> Result<TransactionReceipt> {
        let erc20 = Erc20::new(erc20_token, self.signer_provider.clone());

        let call = erc20.approve(self.auction.address(), amount);
        let pending = call.send().await?;
        self.log_tx_url(*pending);

        let receipt = pending
            .log_msg(format!(
                "approving auction contract to spend {} of {:?}",
                amount, erc20_token
            ))
            .await?;

        self.check_receipt(receipt, "erc20 approval")
    }

    fn log_tx_url(&self, tx_hash: ethers::types::TxHash) {
        info!("{}{:?}", self.explorer_tx_url, tx_hash);
    }

    fn check_receipt(
        &self,
        receipt: Option<TransactionReceipt>,
        action: &str,
    ) -> Result<TransactionReceipt> {
        let receipt = match receipt {
            Some(receipt) => receipt,
            None => bail!("{action} transaction was dropped before being mined"),
        };

        if receipt.status != Some(U64::from(1)) {
            bail!("{action} transaction failed");
        }

        info!(
            "{action} transaction mined in block {:?}",
            receipt.block_number
        );

        Ok(receipt)
    }
}
