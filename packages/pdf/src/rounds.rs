//! Auction round scanner.
//!
//! Applies a fixed pattern to the raw text of a page. Each match becomes an
//! [`AuctionRound`]; the optional trailing deposit is only kept when it is
//! plausible.

use std::sync::LazyLock;

use maegak_pdf_models::AuctionRound;
use regex::Regex;

use crate::patterns::strip_separators;

/// Round number, date, minimum price and an optional deposit of at least
/// seven characters so a following round number is never read as one.
static ROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+회)\s+(\d{4}\.\d{2}\.\d{2})\s+([\d,]+)(?:\s+([\d,]{7,}))?")
        .unwrap_or_else(|_| unreachable!())
});

/// Keeps `deposit` only when it is numerically below `min_price`.
fn plausible_deposit(deposit: &str, min_price: &str) -> String {
    let deposit = strip_separators(deposit);
    match (deposit.parse::<u128>(), min_price.parse::<u128>()) {
        (Ok(d), Ok(p)) if d < p => deposit,
        _ => String::new(),
    }
}

/// Extracts the auction rounds in `text`, unique by round number and date.
#[must_use]
pub fn scan_rounds(text: &str) -> Vec<AuctionRound> {
    let mut rounds: Vec<AuctionRound> = Vec::new();

    for caps in ROUND.captures_iter(text) {
        let min_bid_price = strip_separators(&caps[3]);
        let bid_deposit = caps
            .get(4)
            .map(|m| plausible_deposit(m.as_str(), &min_bid_price))
            .unwrap_or_default();

        let round = AuctionRound {
            round_no: caps[1].to_owned(),
            auction_date: caps[2].to_owned(),
            min_bid_price,
            bid_deposit,
        };

        if !rounds.iter().any(|r| r.same_round(&round)) {
            rounds.push(round);
        }
    }

    log::debug!("Round pattern matched {} rounds", rounds.len());

    rounds
}
