use anyhow::{anyhow, bail, Context, Result};
use ethers::types::{Address, U256};
use log::{info, warn};
use sealed_bid_client::{
    chain_provider::ChainProvider,
    feed::{AuctionFeed, DuplicatePolicy},
    global_provider::GlobalProvider,
    types::{CreateAuctionParams, MergedAuction, Phase, TokenType},
    utils::{load_token_registry, now_unix, render_rows, AuctionRow, TokenRegistry},
    Config,
};
use serde::Deserialize;

/// Inputs of a single action, read from `AUCTION_*` env vars.
#[derive(Deserialize, Debug, Default)]
struct ActionArgs {
    token_type: Option<String>,
    token_contract: Option<Address>,
    token_id: Option<String>,
    erc20_token: Option<Address>,
    start_time: Option<u64>,
    bid_period: Option<u64>,
    reveal_period: Option<u64>,
    reserve_price: Option<String>,
    bid_value: Option<String>,
    nonce: Option<String>,
}

fn parse_amount(value: &Option<String>) -> Result<Option<U256>> {
    value
        .as_deref()
        .map(|v| U256::from_dec_str(v).map_err(|e| anyhow!("invalid number {v}: {e}")))
        .transpose()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config: Config = envy::from_env()?;
    let args: ActionArgs = envy::prefixed("AUCTION_").from_env()?;

    let command = std::env::var("COMMAND").context("Missing COMMAND env var")?;

    match command.as_str() {
        "create" => create(&config, &args).await,
        "approve-nft" => approve_nft(&config, &args).await,
        "commit" => commit(&config, &args).await,
        "reveal" => reveal(&config, &args).await,
        "end" => end(&config, &args).await,
        "balances" => balances(&config, &args).await,
        "list" => list(&config).await,
        _ => bail!("unknown command: {command}"),
    }
}

async fn create(config: &Config, args: &ActionArgs) -> Result<()> {
    let defaults = CreateAuctionParams::default();

    let params = CreateAuctionParams {
        token_type: args
            .token_type
            .as_deref()
            .map(str::parse::<TokenType>)
            .transpose()?,
        token_contract: args.token_contract,
        token_id: parse_amount(&args.token_id)?,
        erc20_token: args.erc20_token,
        start_time: args.start_time,
        bid_period: args.bid_period.or(defaults.bid_period),
        reveal_period: args.reveal_period.or(defaults.reveal_period),
        reserve_price: parse_amount(&args.reserve_price)?.or(defaults.reserve_price),
    };

    let auction = params.validate()?;

    let global_provider = GlobalProvider::try_new(config).await?;
    global_provider.create_auction(&auction).await?;

    info!("auction created");

    Ok(())
}

async fn approve_nft(config: &Config, args: &ActionArgs) -> Result<()> {
    let (token_contract, token_id) = token_of(args)?;

    let global_provider = GlobalProvider::try_new(config).await?;

    if global_provider.is_nft_approved(token_contract, token_id).await? {
        info!(
            "auction contract is already approved for {:?} #{}",
            token_contract, token_id
        );
        return Ok(());
    }

    global_provider.approve_nft(token_contract, token_id).await?;

    Ok(())
}

async fn commit(config: &Config, args: &ActionArgs) -> Result<()> {
    let (bid_value, nonce) = bid_of(args)?;
    let (_feed, auction) = load_auction(config, args, Phase::AcceptingBids).await?;

    let global_provider = GlobalProvider::try_new(config).await?;
    let commitment = global_provider
        .commit_bid(&auction, bid_value, nonce)
        .await?;

    info!("bid committed: 0x{}", hex::encode(commitment));

    Ok(())
}

async fn reveal(config: &Config, args: &ActionArgs) -> Result<()> {
    let (bid_value, nonce) = bid_of(args)?;
    let (_feed, auction) = load_auction(config, args, Phase::RevealWindow).await?;

    let global_provider = GlobalProvider::try_new(config).await?;
    global_provider.reveal_bid(&auction, bid_value, nonce).await?;

    info!("bid revealed");

    Ok(())
}

async fn end(config: &Config, args: &ActionArgs) -> Result<()> {
    let (mut feed, auction) = load_auction(config, args, Phase::NeedsSettlement).await?;

    let global_provider = GlobalProvider::try_new(config).await?;
    global_provider.end_auction(&auction).await?;

    let key = auction.key();
    if feed.mark_ended(&key) {
        if let Some(auction) = feed.find(&key) {
            let row = AuctionRow::new(
                auction,
                now_unix(),
                feed.bid_count(auction),
                &registry_of(config).await,
            );
            info!("{row}");
        }
    }

    Ok(())
}

async fn balances(config: &Config, args: &ActionArgs) -> Result<()> {
    let erc20_token = args
        .erc20_token
        .context("AUCTION_ERC20_TOKEN is required")?;
    let erc721_token = args
        .token_contract
        .context("AUCTION_TOKEN_CONTRACT is required")?;

    let global_provider = GlobalProvider::try_new(config).await?;
    let balances = global_provider
        .get_balances(erc20_token, erc721_token)
        .await?;

    info!("eth: {}", balances.eth);
    info!("erc20 {:?}: {}", erc20_token, balances.erc20);
    info!("erc721 {:?}: {}", erc721_token, balances.erc721);
    info!(
        "erc20 allowance for the auction contract: {}",
        balances.erc20_allowance
    );

    Ok(())
}

async fn list(config: &Config) -> Result<()> {
    let feed = load_feed(config).await?;
    let registry = registry_of(config).await;

    for row in render_rows(&feed, now_unix(), &registry) {
        println!("{row}");
    }

    Ok(())
}

async fn load_feed(config: &Config) -> Result<AuctionFeed> {
    let chain = ChainProvider::try_new(&config.wss_rpc_url, config.auction_contract).await?;

    let mut feed = AuctionFeed::new(DuplicatePolicy::from_flag(config.dedupe_live_events));
    feed.load_history(&chain, config.from_block).await?;
    feed.load_bid_history(&chain, config.from_block).await?;

    Ok(feed)
}

/// Current generation of the requested token, refused unless it is in `expected`.
async fn load_auction(
    config: &Config,
    args: &ActionArgs,
    expected: Phase,
) -> Result<(AuctionFeed, MergedAuction)> {
    let (token_contract, token_id) = token_of(args)?;
    let feed = load_feed(config).await?;

    let auction = match feed.latest_for_token(token_contract, token_id) {
        Some(auction) => auction.clone(),
        None => bail!("no auction found for {:?} #{}", token_contract, token_id),
    };

    let phase = Phase::resolve(now_unix(), &auction);
    if phase != expected {
        bail!(
            "auction #{} is at \"{}\", expected \"{}\"",
            auction.event.auction_index,
            phase,
            expected
        );
    }

    Ok((feed, auction))
}

fn token_of(args: &ActionArgs) -> Result<(Address, U256)> {
    let token_contract = args
        .token_contract
        .context("AUCTION_TOKEN_CONTRACT is required")?;
    let token_id = parse_amount(&args.token_id)?
        .context("AUCTION_TOKEN_ID is required")?;

    Ok((token_contract, token_id))
}

fn bid_of(args: &ActionArgs) -> Result<(U256, &str)> {
    let bid_value = parse_amount(&args.bid_value)?
        .context("AUCTION_BID_VALUE is required")?;
    let nonce = args.nonce.as_deref().context("AUCTION_NONCE is required")?;

    Ok((bid_value, nonce))
}

async fn registry_of(config: &Config) -> TokenRegistry {
    match &config.tokens_file {
        Some(path) => load_token_registry(path).await.unwrap_or_else(|e| {
            warn!("could not load token registry from {}: {}", path, e);
            TokenRegistry::default()
        }),
        None => TokenRegistry::default(),
    }
}
