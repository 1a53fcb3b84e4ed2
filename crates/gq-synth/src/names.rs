//! Fixed entity name lists combined with random numeric fields

/// Default correlation universe; the synthetic matrix is always this size
pub const DEFAULT_ASSETS: [&str; 10] = [
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "AVAX", "DOT", "MATIC", "LINK",
];

/// Exchanges used for exposure rows
pub const EXCHANGES: [&str; 8] = [
    "Binance", "Coinbase", "Kraken", "OKX", "Bybit", "Bitfinex", "KuCoin", "Gemini",
];

/// Chains used for entities and threats
pub const CHAINS: [&str; 6] = ["ethereum", "solana", "bsc", "arbitrum", "polygon", "base"];

/// Labels for known entities
pub const ENTITY_LABELS: [&str; 6] = [
    "Exchange hot wallet",
    "Market maker",
    "Bridge contract",
    "Whale",
    "Mixer deposit",
    "DAO treasury",
];

/// Threat categories
pub const THREAT_CATEGORIES: [&str; 6] = [
    "wash_trading",
    "flash_loan",
    "rug_pull",
    "phishing",
    "sanctions_exposure",
    "oracle_manipulation",
];

/// Contract counterparties
pub const COUNTERPARTIES: [&str; 5] = [
    "Acme Capital",
    "Globex Markets",
    "Initech Custody",
    "Umbrella Ventures",
    "Stark Liquidity",
];

/// Contract titles
pub const CONTRACT_TITLES: [&str; 5] = [
    "Enterprise data license",
    "Threat intel feed",
    "API access agreement",
    "Custody monitoring SLA",
    "Compliance reporting addendum",
];
