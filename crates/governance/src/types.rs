//! Records delivered by the indexing layer
//!
//! Field names follow the indexer's camelCase JSON. Big integers arrive as
//! decimal strings, small ones as numbers or strings depending on the
//! indexer version, so numeric fields accept both. Every field defaults so
//! partially populated records still deserialize, and a malformed number
//! reads as absent instead of failing the whole record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ResolveError, ResolveResult};

/// A proposal as stored by the indexer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Proposal {
    /// Indexer record id
    pub id: String,
    /// On-chain proposal id
    pub proposal_id: String,
    /// Position in the processing queue, once sponsored
    #[serde(deserialize_with = "lenient::optional")]
    pub proposal_index: Option<u64>,
    pub applicant: Option<String>,
    pub proposer: Option<String>,
    pub member_address: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub shares_requested: u128,
    #[serde(deserialize_with = "lenient::number")]
    pub loot_requested: u128,
    #[serde(deserialize_with = "lenient::number")]
    pub tribute_offered: u128,
    pub tribute_token: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub payment_requested: u128,
    pub payment_token: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub starting_period: u64,
    pub processed: bool,
    pub sponsored: bool,
    pub cancelled: bool,
    pub aborted: bool,
    pub did_pass: Option<bool>,
    #[serde(deserialize_with = "lenient::number")]
    pub yes_votes: u128,
    #[serde(deserialize_with = "lenient::number")]
    pub no_votes: u128,
    pub token_to_whitelist: Option<String>,
    pub member_to_kick: Option<String>,
    pub whitelist: bool,
    pub guildkick: bool,
    /// JSON text, or a `0x`-prefixed content hash
    pub details: String,
    /// Owning organization; read-only
    pub moloch: Option<DaoRecord>,
}

/// The organization record a proposal points back to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaoRecord {
    pub id: String,
    #[serde(deserialize_with = "lenient::optional")]
    pub voting_period_length: Option<u64>,
    #[serde(deserialize_with = "lenient::optional")]
    pub grace_period_length: Option<u64>,
    /// Length of one period in seconds; 0 when unknown
    #[serde(deserialize_with = "lenient::number")]
    pub period_duration: u64,
    pub version: Option<RawVersion>,
    pub deposit_token: Option<Token>,
    pub token_balances: Vec<TokenBalance>,
}

/// A token known to the indexer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    pub token_address: String,
    pub symbol: Option<String>,
    #[serde(deserialize_with = "lenient::optional")]
    pub decimals: Option<u32>,
}

/// Balance of one token held by the organization or one of its members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenBalance {
    pub token: Token,
    pub guild_bank: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub token_balance: u128,
}

impl TokenBalance {
    /// Symbol shown for treasury balances; `None` for member balances
    pub fn display_symbol(&self) -> Option<&str> {
        if self.guild_bank {
            self.token.symbol.as_deref()
        } else {
            None
        }
    }

    /// Decimals shown for treasury balances; `None` for member balances
    pub fn display_decimals(&self) -> Option<u32> {
        if self.guild_bank {
            self.token.decimals
        } else {
            None
        }
    }
}

/// Version tag as it appears in indexer data: `1`, `"2"`, `"2x"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVersion {
    Number(u64),
    Text(String),
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawVersion::Number(n) => write!(f, "{}", n),
            RawVersion::Text(s) => f.write_str(s),
        }
    }
}

/// Governance contract generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaoVersion {
    /// Original contract: proposals enter voting on submission
    #[serde(rename = "1")]
    V1,
    /// Proposals must be sponsored before voting
    #[serde(rename = "2")]
    V2,
    /// Variant of version 2 with its own ABI
    #[serde(rename = "2x")]
    V2x,
}

impl DaoVersion {
    /// Whether proposals need an explicit sponsorship before voting
    pub fn requires_sponsorship(self) -> bool {
        !matches!(self, DaoVersion::V1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DaoVersion::V1 => "1",
            DaoVersion::V2 => "2",
            DaoVersion::V2x => "2x",
        }
    }

    /// Resolve an indexer version tag
    pub fn from_raw(raw: &RawVersion) -> ResolveResult<Self> {
        match raw {
            RawVersion::Number(1) => Ok(DaoVersion::V1),
            RawVersion::Number(2) => Ok(DaoVersion::V2),
            RawVersion::Number(n) => Err(ResolveError::UnknownVersion(n.to_string())),
            RawVersion::Text(s) => s.parse(),
        }
    }
}

impl FromStr for DaoVersion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(DaoVersion::V1),
            "2" => Ok(DaoVersion::V2),
            "2x" => Ok(DaoVersion::V2x),
            other => Err(ResolveError::UnknownVersion(other.to_string())),
        }
    }
}

impl fmt::Display for DaoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the period arithmetic needs about an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoMetadata {
    pub current_period: u64,
    pub voting_period_length: u64,
    pub grace_period_length: u64,
    pub version: DaoVersion,
}

impl DaoMetadata {
    /// Combine the cached current period with an organization record.
    ///
    /// The version tag is resolved here, once, so downstream code only ever
    /// sees a `DaoVersion`.
    pub fn resolve(current_period: Option<u64>, dao: Option<&DaoRecord>) -> ResolveResult<Self> {
        let current_period = current_period.ok_or(ResolveError::MissingMetadata)?;
        let dao = dao.ok_or(ResolveError::MissingMetadata)?;
        let raw = dao.version.as_ref().ok_or(ResolveError::MissingMetadata)?;

        Ok(Self {
            current_period,
            voting_period_length: dao
                .voting_period_length
                .ok_or(ResolveError::MissingMetadata)?,
            grace_period_length: dao
                .grace_period_length
                .ok_or(ResolveError::MissingMetadata)?,
            version: DaoVersion::from_raw(raw)?,
        })
    }
}

/// Deserializers for numbers that may arrive as JSON numbers, decimal
/// strings or `null`.
///
/// Blank strings read as absent. Anything else that is not a whole number
/// in range is logged and read as absent too.
pub(crate) mod lenient {
    use std::str::FromStr;

    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};
    use tracing::warn;

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    fn from_float<T: TryFrom<u128>>(f: f64) -> Option<T> {
        if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u128::MAX as f64 {
            T::try_from(f as u128).ok()
        } else {
            None
        }
    }

    fn convert<T>(value: &NumberOrText) -> Option<T>
    where
        T: FromStr + TryFrom<u128>,
    {
        match value {
            NumberOrText::Number(n) => T::try_from(u128::from(*n)).ok(),
            NumberOrText::Float(f) => from_float(*f),
            NumberOrText::Text(s) => {
                let s = s.trim();
                s.parse::<T>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(from_float))
            }
            NumberOrText::Other(_) => None,
        }
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + TryFrom<u128> + Default,
    {
        Ok(optional(deserializer)?.unwrap_or_default())
    }

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + TryFrom<u128>,
    {
        let value = match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(value) => value,
            None => return Ok(None),
        };
        if matches!(&value, NumberOrText::Text(s) if s.trim().is_empty()) {
            return Ok(None);
        }

        let converted = convert(&value);
        if converted.is_none() {
            warn!("Ignoring malformed number {:?}", value);
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proposal_from_indexer_json() {
        let proposal: Proposal = serde_json::from_value(json!({
            "id": "0xdao-proposal-7",
            "proposalId": "7",
            "proposalIndex": "3",
            "applicant": "0xabc",
            "sharesRequested": "100",
            "tributeOffered": "5000000000000000000000",
            "paymentRequested": 0,
            "startingPeriod": "42",
            "sponsored": true,
            "details": "{\"title\":\"hello\"}",
            "moloch": {
                "id": "0xdao",
                "votingPeriodLength": "35",
                "gracePeriodLength": 35,
                "version": "2x",
                "tokenBalances": [
                    { "token": { "tokenAddress": "0xweth", "symbol": "WETH", "decimals": "18" },
                      "guildBank": true, "tokenBalance": "12" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(proposal.proposal_index, Some(3));
        assert_eq!(proposal.tribute_offered, 5_000_000_000_000_000_000_000);
        assert_eq!(proposal.starting_period, 42);
        let dao = proposal.moloch.as_ref().unwrap();
        assert_eq!(dao.voting_period_length, Some(35));
        assert_eq!(dao.token_balances[0].token.decimals, Some(18));
        assert_eq!(dao.version, Some(RawVersion::Text("2x".to_string())));
    }

    #[test]
    fn test_sparse_record_defaults() {
        let proposal: Proposal = serde_json::from_value(json!({
            "proposalId": "1",
            "yesVotes": null
        }))
        .unwrap();
        assert_eq!(proposal.yes_votes, 0);
        assert!(proposal.applicant.is_none());
        assert!(proposal.moloch.is_none());
    }

    #[test]
    fn test_malformed_numbers_read_as_absent() {
        let proposal: Proposal = serde_json::from_value(json!({
            "proposalId": "8",
            "proposalIndex": "  ",
            "tributeOffered": 5e21,
            "sharesRequested": 12.0,
            "yesVotes": "1e3",
            "noVotes": -4,
            "paymentRequested": { "hex": "0x01" },
            "startingPeriod": "soon",
            "moloch": {
                "votingPeriodLength": "",
                "gracePeriodLength": 2.5,
                "periodDuration": "17280",
                "version": "2"
            }
        }))
        .unwrap();

        assert_eq!(proposal.proposal_index, None);
        assert_eq!(proposal.tribute_offered, 5_000_000_000_000_000_000_000);
        assert_eq!(proposal.shares_requested, 12);
        assert_eq!(proposal.yes_votes, 1_000);
        assert_eq!(proposal.no_votes, 0);
        assert_eq!(proposal.payment_requested, 0);
        assert_eq!(proposal.starting_period, 0);

        let dao = proposal.moloch.as_ref().unwrap();
        assert_eq!(dao.voting_period_length, None);
        assert_eq!(dao.grace_period_length, None);
        assert_eq!(dao.period_duration, 17_280);
        assert_eq!(
            DaoMetadata::resolve(Some(3), Some(dao)),
            Err(ResolveError::MissingMetadata)
        );
    }

    #[test]
    fn test_version_resolution() {
        assert_eq!(DaoVersion::from_raw(&RawVersion::Number(1)), Ok(DaoVersion::V1));
        assert_eq!(DaoVersion::from_raw(&RawVersion::Text("2".into())), Ok(DaoVersion::V2));
        assert_eq!(DaoVersion::from_raw(&RawVersion::Text("2x".into())), Ok(DaoVersion::V2x));
        assert!(DaoVersion::from_raw(&RawVersion::Number(3)).is_err());
        assert!(DaoVersion::V2x.requires_sponsorship());
        assert!(!DaoVersion::V1.requires_sponsorship());
    }

    #[test]
    fn test_metadata_requires_every_piece() {
        let dao = DaoRecord {
            voting_period_length: Some(5),
            grace_period_length: Some(3),
            version: Some(RawVersion::Number(2)),
            ..Default::default()
        };

        assert_eq!(DaoMetadata::resolve(None, Some(&dao)), Err(ResolveError::MissingMetadata));
        assert_eq!(DaoMetadata::resolve(Some(4), None), Err(ResolveError::MissingMetadata));

        let no_grace = DaoRecord { grace_period_length: None, ..dao.clone() };
        assert_eq!(
            DaoMetadata::resolve(Some(4), Some(&no_grace)),
            Err(ResolveError::MissingMetadata)
        );

        let meta = DaoMetadata::resolve(Some(4), Some(&dao)).unwrap();
        assert_eq!(meta.version, DaoVersion::V2);
        assert_eq!(meta.current_period, 4);
    }

    #[test]
    fn test_member_balances_hide_display_fields() {
        let mut balance = TokenBalance {
            token: Token {
                token_address: "0xdai".into(),
                symbol: Some("DAI".into()),
                decimals: Some(18),
            },
            guild_bank: false,
            token_balance: 1,
        };
        assert_eq!(balance.display_symbol(), None);
        assert_eq!(balance.display_decimals(), None);

        balance.guild_bank = true;
        assert_eq!(balance.display_symbol(), Some("DAI"));
        assert_eq!(balance.display_decimals(), Some(18));
    }
}
