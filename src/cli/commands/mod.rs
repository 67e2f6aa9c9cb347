use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn validator_amount() -> ValueParser {
    ValueParser::from(move |amount: &str| -> std::result::Result<f64, String> {
        let parsed = amount
            .parse::<f64>()
            .map_err(|_| "invalid amount".to_string())?;
        if parsed > 0.0 && parsed.is_finite() {
            Ok(parsed)
        } else {
            Err("amount must be a positive number of SOL".to_string())
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("walletgate")
        .about("Wallet authentication via on-chain micro-payments")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("WALLETGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("rpc-url")
                .short('r')
                .long("rpc-url")
                .help("Ledger JSON-RPC endpoint")
                .default_value("https://api.devnet.solana.com")
                .env("WALLETGATE_RPC_URL"),
        )
        .arg(
            Arg::new("receiver")
                .long("receiver")
                .help("Address that receives the authentication micro-payments")
                .env("WALLETGATE_RECEIVER")
                .required(true),
        )
        .arg(
            Arg::new("base-amount")
                .long("base-amount")
                .help("Base verification amount in SOL; the per-request perturbation is layered on top")
                .default_value("0.00001")
                .env("WALLETGATE_BASE_AMOUNT")
                .value_parser(validator_amount()),
        )
        .arg(
            Arg::new("session-timeout")
                .long("session-timeout")
                .help("Seconds before a pending authentication request expires")
                .default_value("300")
                .env("WALLETGATE_SESSION_TIMEOUT")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("sweep-interval")
                .long("sweep-interval")
                .help("Seconds between sweeps of expired pending requests")
                .default_value("60")
                .env("WALLETGATE_SWEEP_INTERVAL")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("scan-limit")
                .long("scan-limit")
                .help("How many recent receiver transactions one status poll scans")
                .default_value("20")
                .env("WALLETGATE_SCAN_LIMIT")
                .value_parser(clap::value_parser!(u64).range(1..=1000)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("WALLETGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
