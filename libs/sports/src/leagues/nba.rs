//! NBA shares ESPN's basketball scoreboard schema with WNBA; see
//! [`crate::leagues::wnba::EspnBasketballClient`] for the parser.

use fetcher::ResilientFetcher;

use crate::leagues::wnba::EspnBasketballClient;

pub fn client(fetcher: ResilientFetcher) -> EspnBasketballClient {
    EspnBasketballClient::nba(fetcher)
}
