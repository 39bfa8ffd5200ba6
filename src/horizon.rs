//! Typed request builders for Horizon's REST endpoints (spec §4.11).
//!
//! HTTP client choice and response-body parsing are explicitly out of
//! scope (spec §1 Non-goals) — Horizon DTOs are plain, uninteresting value
//! types. What this module owns is URL assembly: typed filters, cursor
//! pagination, and ordering, built the way `HorizonClient` in
//! `kingksjo-StellarRoute`'s `crates/indexer/src/horizon/client.rs` builds
//! its request parameters, generalized from that crate's single orderbook
//! endpoint to the full Horizon surface this library targets.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid horizon base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Cursor-based pagination shared by every collection endpoint.
#[derive(Clone, Debug, Default)]
pub struct Pagination {
    pub cursor: Option<String>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Pagination {
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(cursor) = &self.cursor {
            pairs.append_pair("cursor", cursor);
        }
        if let Some(order) = self.order {
            pairs.append_pair("order", order.as_str());
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetFilter<'a> {
    Native,
    Credit { code: &'a str, issuer: &'a str },
}

impl AssetFilter<'_> {
    fn apply(self, prefix: &str, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        match self {
            AssetFilter::Native => {
                pairs.append_pair(&format!("{prefix}_asset_type"), "native");
            }
            AssetFilter::Credit { code, issuer } => {
                let asset_type = if code.len() <= 4 {
                    "credit_alphanum4"
                } else {
                    "credit_alphanum12"
                };
                pairs.append_pair(&format!("{prefix}_asset_type"), asset_type);
                pairs.append_pair(&format!("{prefix}_asset_code"), code);
                pairs.append_pair(&format!("{prefix}_asset_issuer"), issuer);
            }
        }
    }
}

/// Builds request URLs against a single Horizon instance.
#[derive(Clone, Debug)]
pub struct HorizonRequests {
    base_url: Url,
}

impl HorizonRequests {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
        })
    }

    fn path(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn root(&self) -> Result<Url, Error> {
        Ok(self.base_url.clone())
    }

    pub fn health(&self) -> Result<Url, Error> {
        self.path(&["health"])
    }

    pub fn fee_stats(&self) -> Result<Url, Error> {
        self.path(&["fee_stats"])
    }

    pub fn account(&self, account_id: &str) -> Result<Url, Error> {
        self.path(&["accounts", account_id])
    }

    pub fn transaction(&self, hash: &str) -> Result<Url, Error> {
        self.path(&["transactions", hash])
    }

    pub fn transactions(
        &self,
        for_account: Option<&str>,
        include_failed: bool,
        page: &Pagination,
    ) -> Result<Url, Error> {
        let mut url = match for_account {
            Some(id) => self.path(&["accounts", id, "transactions"])?,
            None => self.path(&["transactions"])?,
        };
        if include_failed {
            url.query_pairs_mut().append_pair("include_failed", "true");
        }
        page.apply(&mut url);
        Ok(url)
    }

    pub fn operations(
        &self,
        for_account: Option<&str>,
        for_transaction: Option<&str>,
        page: &Pagination,
    ) -> Result<Url, Error> {
        let mut url = match (for_account, for_transaction) {
            (Some(id), _) => self.path(&["accounts", id, "operations"])?,
            (None, Some(hash)) => self.path(&["transactions", hash, "operations"])?,
            (None, None) => self.path(&["operations"])?,
        };
        page.apply(&mut url);
        Ok(url)
    }

    pub fn effects(&self, for_account: Option<&str>, page: &Pagination) -> Result<Url, Error> {
        let mut url = match for_account {
            Some(id) => self.path(&["accounts", id, "effects"])?,
            None => self.path(&["effects"])?,
        };
        page.apply(&mut url);
        Ok(url)
    }

    pub fn offers(&self, for_account: Option<&str>, page: &Pagination) -> Result<Url, Error> {
        let mut url = match for_account {
            Some(id) => self.path(&["accounts", id, "offers"])?,
            None => self.path(&["offers"])?,
        };
        page.apply(&mut url);
        Ok(url)
    }

    pub fn trades(
        &self,
        base: Option<AssetFilter<'_>>,
        counter: Option<AssetFilter<'_>>,
        offer_id: Option<&str>,
        page: &Pagination,
    ) -> Result<Url, Error> {
        let mut url = self.path(&["trades"])?;
        if let Some(base) = base {
            base.apply("base", &mut url);
        }
        if let Some(counter) = counter {
            counter.apply("counter", &mut url);
        }
        if let Some(offer_id) = offer_id {
            url.query_pairs_mut().append_pair("offer_id", offer_id);
        }
        page.apply(&mut url);
        Ok(url)
    }

    pub fn liquidity_pools(&self, for_account: Option<&str>, page: &Pagination) -> Result<Url, Error> {
        let mut url = self.path(&["liquidity_pools"])?;
        if let Some(id) = for_account {
            url.query_pairs_mut().append_pair("account", id);
        }
        page.apply(&mut url);
        Ok(url)
    }

    pub fn claimable_balances(
        &self,
        claimant: Option<&str>,
        sponsor: Option<&str>,
        page: &Pagination,
    ) -> Result<Url, Error> {
        let mut url = self.path(&["claimable_balances"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(claimant) = claimant {
                pairs.append_pair("claimant", claimant);
            }
            if let Some(sponsor) = sponsor {
                pairs.append_pair("sponsor", sponsor);
            }
        }
        page.apply(&mut url);
        Ok(url)
    }

    pub fn assets(
        &self,
        code: Option<&str>,
        issuer: Option<&str>,
        page: &Pagination,
    ) -> Result<Url, Error> {
        let mut url = self.path(&["assets"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(code) = code {
                pairs.append_pair("asset_code", code);
            }
            if let Some(issuer) = issuer {
                pairs.append_pair("asset_issuer", issuer);
            }
        }
        page.apply(&mut url);
        Ok(url)
    }

    pub fn order_book(&self, selling: AssetFilter<'_>, buying: AssetFilter<'_>, limit: Option<u32>) -> Result<Url, Error> {
        let mut url = self.path(&["order_book"])?;
        selling.apply("selling", &mut url);
        buying.apply("buying", &mut url);
        if let Some(limit) = limit {
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }

    pub fn strict_send_paths(
        &self,
        source: AssetFilter<'_>,
        source_amount: &str,
        destination_account: &str,
        destination_assets: &[AssetFilter<'_>],
    ) -> Result<Url, Error> {
        let mut url = self.path(&["paths", "strict-send"])?;
        source.apply("source", &mut url);
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("source_amount", source_amount);
        pairs.append_pair("destination_account", destination_account);
        for asset in destination_assets {
            append_path_asset(&mut pairs, "destination_assets", *asset);
        }
        drop(pairs);
        Ok(url)
    }

    pub fn strict_receive_paths(
        &self,
        destination: AssetFilter<'_>,
        destination_amount: &str,
        source_account: &str,
        source_assets: &[AssetFilter<'_>],
    ) -> Result<Url, Error> {
        let mut url = self.path(&["paths", "strict-receive"])?;
        destination.apply("destination", &mut url);
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("destination_amount", destination_amount);
        pairs.append_pair("source_account", source_account);
        for asset in source_assets {
            append_path_asset(&mut pairs, "source_assets", *asset);
        }
        drop(pairs);
        Ok(url)
    }

    pub fn ledgers(&self, page: &Pagination) -> Result<Url, Error> {
        let mut url = self.path(&["ledgers"])?;
        page.apply(&mut url);
        Ok(url)
    }

    pub fn ledger(&self, sequence: u32) -> Result<Url, Error> {
        self.path(&["ledgers", &sequence.to_string()])
    }
}

fn append_path_asset(
    pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    field: &str,
    asset: AssetFilter<'_>,
) {
    // Horizon's strict-path endpoints accept a repeatable, comma-joined
    // `destination_assets[]`/`source_assets[]`-style single field per asset
    // in canonical `code:issuer` form; native is the literal "native".
    let value = match asset {
        AssetFilter::Native => "native".to_string(),
        AssetFilter::Credit { code, issuer } => format!("{code}:{issuer}"),
    };
    pairs.append_pair(field, &value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests() -> HorizonRequests {
        HorizonRequests::new("https://horizon-testnet.stellar.org").unwrap()
    }

    #[test]
    fn account_url_has_no_query() {
        let url = requests()
            .account("GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://horizon-testnet.stellar.org/accounts/GCEZWKCA5VLDNRLN3RPRJMRZOX3Z6G5CHCGSNFHEYVXM3XOJMDS674JZ"
        );
    }

    #[test]
    fn transactions_for_account_includes_pagination() {
        let page = Pagination {
            cursor: Some("123".to_string()),
            order: Some(Order::Desc),
            limit: Some(10),
        };
        let url = requests()
            .transactions(Some("GABC"), true, &page)
            .unwrap();
        assert!(url.path().starts_with("/accounts/GABC/transactions"));
        let query: std::collections::HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(query.get("cursor").unwrap(), "123");
        assert_eq!(query.get("order").unwrap(), "desc");
        assert_eq!(query.get("limit").unwrap(), "10");
        assert_eq!(query.get("include_failed").unwrap(), "true");
    }

    #[test]
    fn order_book_encodes_both_asset_sides() {
        let url = requests()
            .order_book(
                AssetFilter::Native,
                AssetFilter::Credit {
                    code: "USDC",
                    issuer: "GISSUER",
                },
                Some(5),
            )
            .unwrap();
        let query: std::collections::HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(query.get("selling_asset_type").unwrap(), "native");
        assert_eq!(query.get("buying_asset_type").unwrap(), "credit_alphanum4");
        assert_eq!(query.get("buying_asset_code").unwrap(), "USDC");
        assert_eq!(query.get("buying_asset_issuer").unwrap(), "GISSUER");
        assert_eq!(query.get("limit").unwrap(), "5");
    }

    #[test]
    fn credit_alphanum12_is_chosen_for_long_codes() {
        let mut url = requests().root().unwrap();
        AssetFilter::Credit {
            code: "LONGASSETCODE",
            issuer: "GISSUER",
        }
        .apply("selling", &mut url);
        let query: std::collections::HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(query.get("selling_asset_type").unwrap(), "credit_alphanum12");
    }

    #[test]
    fn strict_send_paths_lists_every_destination_asset() {
        let url = requests()
            .strict_send_paths(
                AssetFilter::Native,
                "100.0000000",
                "GDEST",
                &[AssetFilter::Native, AssetFilter::Credit { code: "USDC", issuer: "GISSUER" }],
            )
            .unwrap();
        let values: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == "destination_assets")
            .map(|(_, v)| v.to_string())
            .collect();
        assert_eq!(values, vec!["native".to_string(), "USDC:GISSUER".to_string()]);
    }

    #[test]
    fn health_and_root_have_no_extra_segments() {
        let r = requests();
        assert_eq!(r.health().unwrap().path(), "/health");
        assert_eq!(r.root().unwrap().path(), "/");
    }
}
