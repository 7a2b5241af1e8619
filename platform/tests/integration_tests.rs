//! End-to-end flows through a wired deployment: identity verification,
//! gated transfers, marketplace settlement, recovery, and rental income.

use brix_identity::Claim;
use brix_market::MarketError;
use brix_platform::{Deployment, IssuerConfig, PlatformConfig};
use brix_token::TokenError;
use brix_types::{Address, ClaimTopic, CountryCode, Timestamp};

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

const OWNER: u8 = 1;
const CUSTODY: u8 = 2;
const FEES: u8 = 3;
const ISSUER: u8 = 7;
const TOKEN: u8 = 10;
const ALICE: u8 = 20;
const BOB: u8 = 21;
const RECOVERY_A: u8 = 30;
const RECOVERY_B: u8 = 31;

fn config() -> PlatformConfig {
    PlatformConfig::from_toml_str(&format!(
        r#"
            owner = "{}"
            token_address = "{}"
            market_custody = "{}"
            fee_recipient = "{}"
            token_name = "Maple Street 12"
            token_symbol = "MPL12"
            required_claim_topics = [1]
            recovery_addresses = ["{}", "{}"]

            [[trusted_issuers]]
            address = "{}"
            topics = [1]
        "#,
        addr(OWNER),
        addr(TOKEN),
        addr(CUSTODY),
        addr(FEES),
        addr(RECOVERY_A),
        addr(RECOVERY_B),
        addr(ISSUER),
    ))
    .expect("config parses")
}

fn kyc_claim() -> Claim {
    Claim {
        topic: ClaimTopic::new(1),
        scheme: 1,
        issuer: addr(ISSUER),
        signature: vec![0xAA],
        data: vec![],
        uri: String::new(),
    }
}

/// Register an account with its identity contract and attest KYC for it.
fn verify(dep: &mut Deployment, account: u8, identity: u8) {
    dep.register_investor(&addr(account), &addr(identity), CountryCode::new(840))
        .unwrap();
    dep.attest(&addr(account), kyc_claim()).unwrap();
}

/// Fully wired deployment with custody, Alice, and Bob all verified.
fn deployment() -> Deployment {
    let mut dep = Deployment::from_config(&config()).unwrap();
    verify(&mut dep, CUSTODY, 102);
    verify(&mut dep, ALICE, 120);
    verify(&mut dep, BOB, 121);
    dep
}

#[test]
fn registration_without_claims_is_not_verified() {
    let mut dep = Deployment::from_config(&config()).unwrap();
    dep.register_investor(&addr(ALICE), &addr(120), CountryCode::new(840))
        .unwrap();
    assert!(!dep.is_verified(&addr(ALICE)));

    let err = dep.mint(&addr(ALICE), 100).unwrap_err();
    assert!(err.to_string().contains("not verified"));

    dep.attest(&addr(ALICE), kyc_claim()).unwrap();
    assert!(dep.is_verified(&addr(ALICE)));
    dep.mint(&addr(ALICE), 100).unwrap();
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 100);
}

#[test]
fn transfers_are_gated_on_the_recipient() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();

    // addr(99) was never registered.
    assert!(dep.transfer(&addr(ALICE), &addr(99), 100).is_err());
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 1_000);

    dep.transfer(&addr(ALICE), &addr(BOB), 100).unwrap();
    assert_eq!(dep.token.balance_of(&addr(BOB)), 100);
}

#[test]
fn frozen_tokens_stay_put() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();
    dep.token
        .freeze_tokens(&addr(OWNER), &addr(ALICE), 400)
        .unwrap();

    let err = dep.transfer(&addr(ALICE), &addr(BOB), 700).unwrap_err();
    assert!(err.to_string().contains("insufficient balance"));

    dep.transfer(&addr(ALICE), &addr(BOB), 600).unwrap();
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 400);
    assert_eq!(dep.token.frozen_of(&addr(ALICE)), 400);
}

#[test]
fn marketplace_settlement_splits_the_fee() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();

    // 100 tokens at 10 each; buy 40: total 400, 1% fee = 4, seller nets 396.
    let listing = dep.create_listing(&addr(ALICE), 100, 10).unwrap();
    assert_eq!(dep.token.balance_of(&addr(CUSTODY)), 100);

    dep.purchase_listing(&addr(BOB), listing, 40, 400).unwrap();
    assert_eq!(dep.token.balance_of(&addr(BOB)), 40);
    assert_eq!(dep.token.balance_of(&addr(CUSTODY)), 60);
    assert_eq!(dep.cash.balance(&addr(FEES)), 4);
    assert_eq!(dep.cash.balance(&addr(ALICE)), 396);
    assert_eq!(dep.market.listing(listing).unwrap().amount, 60);
}

#[test]
fn unverified_buyer_cannot_purchase() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();
    let listing = dep.create_listing(&addr(ALICE), 100, 10).unwrap();

    let err = dep.purchase_listing(&addr(99), listing, 10, 100).unwrap_err();
    assert!(matches!(
        err,
        brix_platform::PlatformError::Market(MarketError::Token(
            TokenError::RecipientNotVerified(_)
        ))
    ));
    assert_eq!(dep.token.balance_of(&addr(CUSTODY)), 100);
}

#[test]
fn rejected_offer_refunds_exactly_the_escrow() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();
    let listing = dep.create_listing(&addr(ALICE), 100, 10).unwrap();

    // Bob bids on 5 tokens at the list price: 50 locked.
    let offer = dep
        .create_offer(
            &addr(BOB),
            listing,
            5,
            10,
            50,
            Timestamp::new(1_000),
            Timestamp::new(1),
        )
        .unwrap();
    assert_eq!(dep.market.held_funds(), 50);

    dep.reject_offer(&addr(ALICE), offer).unwrap();
    assert_eq!(dep.cash.balance(&addr(BOB)), 50);
    assert_eq!(dep.market.held_funds(), 0);
}

#[test]
fn accepted_offer_delivers_and_pays() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 1_000).unwrap();
    let listing = dep.create_listing(&addr(ALICE), 100, 10).unwrap();

    let offer = dep
        .create_offer(
            &addr(BOB),
            listing,
            20,
            8,
            160,
            Timestamp::new(1_000),
            Timestamp::new(1),
        )
        .unwrap();
    dep.accept_offer(&addr(ALICE), offer, Timestamp::new(500))
        .unwrap();

    assert_eq!(dep.token.balance_of(&addr(BOB)), 20);
    assert_eq!(dep.cash.balance(&addr(FEES)), 1); // 1% of 160, truncated
    assert_eq!(dep.cash.balance(&addr(ALICE)), 159);
    assert_eq!(dep.market.listing(listing).unwrap().amount, 80);
}

#[test]
fn two_of_two_recovery_moves_the_whole_balance() {
    let mut dep = deployment();
    verify(&mut dep, 22, 122); // the replacement wallet
    dep.mint(&addr(ALICE), 500).unwrap();

    // First approval alone moves nothing.
    dep.recover_account(&addr(RECOVERY_A), &addr(ALICE), &addr(22))
        .unwrap();
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 500);

    dep.recover_account(&addr(RECOVERY_B), &addr(ALICE), &addr(22))
        .unwrap();
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 0);
    assert_eq!(dep.token.balance_of(&addr(22)), 500);
}

#[test]
fn recovery_to_unverified_wallet_is_blocked() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 500).unwrap();

    dep.recover_account(&addr(RECOVERY_A), &addr(ALICE), &addr(99))
        .unwrap();
    let err = dep
        .recover_account(&addr(RECOVERY_B), &addr(ALICE), &addr(99))
        .unwrap_err();
    assert!(err.to_string().contains("not verified"));
    assert_eq!(dep.token.balance_of(&addr(ALICE)), 500);
}

#[test]
fn rental_income_accrues_pro_rata() {
    let mut dep = deployment();
    dep.mint(&addr(ALICE), 600).unwrap();
    dep.mint(&addr(BOB), 400).unwrap();

    dep.receive_income(1_000).unwrap();
    assert_eq!(dep.distribute_income(Timestamp::new(50)).unwrap(), 1_000);

    assert_eq!(dep.claim_income(&addr(ALICE)).unwrap(), 600);
    assert_eq!(dep.claim_income(&addr(BOB)).unwrap(), 400);
    assert_eq!(dep.cash.balance(&addr(ALICE)), 600);
    assert_eq!(dep.cash.balance(&addr(BOB)), 400);

    // Nothing accrues twice.
    assert!(dep.claim_income(&addr(ALICE)).is_err());
}

#[test]
fn full_lifecycle_from_toml_config() {
    let mut dep = deployment();

    dep.mint(&addr(ALICE), 1_000).unwrap();
    let listing = dep.create_listing(&addr(ALICE), 200, 5).unwrap();
    dep.purchase_listing(&addr(BOB), listing, 200, 1_000).unwrap();

    dep.receive_income(500).unwrap();
    dep.distribute_income(Timestamp::new(10)).unwrap();

    // Alice holds 800, Bob 200 of the 1000 supply.
    assert_eq!(dep.claim_income(&addr(ALICE)).unwrap(), 400);
    assert_eq!(dep.claim_income(&addr(BOB)).unwrap(), 100);

    // Fee on the 1000-unit settlement at 1% was 10.
    assert_eq!(dep.cash.balance(&addr(FEES)), 10);
    assert_eq!(dep.token.total_supply(), 1_000);
}
