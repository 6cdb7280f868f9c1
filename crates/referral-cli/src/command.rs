//! Command-line parsing for the `referral` binary.

use std::path::PathBuf;

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a referral edge. No referrer makes the customer a root.
    Add {
        customer_id: String,
        referrer_id: Option<String>,
    },
    /// List direct referrals of a customer.
    Referrals { customer_id: String },
    /// Three-level referral summary of a customer.
    Summary { customer_id: String },
    /// Top roots by direct referral count.
    Leaderboard,
    /// Edge and root counts.
    Stats,
    Help,
}

/// Parse arguments after the program name.
pub fn parse(args: &[String]) -> Result<Command, String> {
    let arg = |i: usize| args.get(i).map(String::as_str);

    match arg(0) {
        None | Some("help") | Some("--help") | Some("-h") => Ok(Command::Help),
        Some("add") => {
            let customer_id = arg(1).ok_or("Usage: referral add <customer-id> [referrer-id]")?;
            if args.len() > 3 {
                return Err("Usage: referral add <customer-id> [referrer-id]".into());
            }
            Ok(Command::Add {
                customer_id: customer_id.to_string(),
                referrer_id: arg(2).map(str::to_string),
            })
        }
        Some("referrals") => Ok(Command::Referrals {
            customer_id: single_id(args, "referrals")?,
        }),
        Some("summary") => Ok(Command::Summary {
            customer_id: single_id(args, "summary")?,
        }),
        Some("leaderboard") => Ok(Command::Leaderboard),
        Some("stats") => Ok(Command::Stats),
        Some(other) => Err(format!(
            "Unknown command: {}. Use 'referral help' for usage.",
            other
        )),
    }
}

fn single_id(args: &[String], command: &str) -> Result<String, String> {
    match args {
        [_, id] => Ok(id.clone()),
        _ => Err(format!("Usage: referral {} <customer-id>", command)),
    }
}

pub fn print_help() {
    println!("referral: customer referral forest queries");
    println!();
    println!("Usage: referral <command>");
    println!();
    println!("Commands:");
    println!("  add <customer> [referrer]   Record a referral (no referrer = root)");
    println!("  referrals <customer>        List direct referrals");
    println!("  summary <customer>          Three-level referral counts");
    println!("  leaderboard                 Top roots by direct referrals");
    println!("  stats                       Edge and root counts");
    println!("  help                        Show this help message");
}

/// Data directory from `REFERRAL_DATA_DIR`, defaulting to `./data`.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var("REFERRAL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse(&args(&["add", "bob", "alice"])).unwrap(),
            Command::Add {
                customer_id: "bob".into(),
                referrer_id: Some("alice".into()),
            }
        );
        assert_eq!(
            parse(&args(&["add", "root"])).unwrap(),
            Command::Add {
                customer_id: "root".into(),
                referrer_id: None,
            }
        );
        assert!(parse(&args(&["add"])).is_err());
        assert!(parse(&args(&["add", "a", "b", "c"])).is_err());
    }

    #[test]
    fn test_parse_queries() {
        assert_eq!(
            parse(&args(&["summary", "alice"])).unwrap(),
            Command::Summary {
                customer_id: "alice".into()
            }
        );
        assert_eq!(
            parse(&args(&["referrals", "alice"])).unwrap(),
            Command::Referrals {
                customer_id: "alice".into()
            }
        );
        assert!(parse(&args(&["summary"])).is_err());
        assert_eq!(parse(&args(&["leaderboard"])).unwrap(), Command::Leaderboard);
    }

    #[test]
    fn test_parse_help_and_unknown() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&args(&["-h"])).unwrap(), Command::Help);
        assert!(parse(&args(&["frobnicate"])).unwrap_err().contains("Unknown command"));
    }
}
